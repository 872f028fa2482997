//! Blocking TCP server: an accept loop and a lobby thread per connection.
//!
//! The lobby registers a unique username, sends the joinable tables, and
//! then creates or joins a table. Once a table holds the connection, the
//! lobby thread exits.

use std::{
    io,
    net::{SocketAddr, TcpListener, TcpStream},
    sync::Arc,
    thread,
    time::Duration,
};

use super::{messages::CREATE_TABLE_ID, utils};
use crate::{
    game::entities::Username,
    table::{
        PlayerStream, TableConfig, TableId, TableManager, manager::DEFAULT_SCHEDULER_INTERVAL,
    },
};

/// Everything needed to run a server.
#[derive(Clone, Debug)]
pub struct BlackjackConfig {
    pub table: TableConfig,
    pub scheduler_interval: Duration,
}

impl Default for BlackjackConfig {
    fn default() -> Self {
        Self {
            table: TableConfig::default(),
            scheduler_interval: DEFAULT_SCHEDULER_INTERVAL,
        }
    }
}

/// Binds `addr`, starts the table scheduler, and serves connections until
/// the process exits.
///
/// # Errors
///
/// Returns an error if the listener can't be bound or the scheduler thread
/// can't be spawned. Failures of individual connections are only logged.
pub fn run(addr: SocketAddr, config: BlackjackConfig) -> io::Result<()> {
    let listener = TcpListener::bind(addr)?;
    let manager = Arc::new(TableManager::new(config.table, config.scheduler_interval));
    manager.spawn_scheduler()?;
    log::info!("Listening on {}", listener.local_addr()?);
    serve(&listener, &manager)
}

/// Accepts connections and hands each one to its own lobby thread. Returns
/// once the manager is shut down and another connection arrives.
pub fn serve(listener: &TcpListener, manager: &Arc<TableManager>) -> io::Result<()> {
    for stream in listener.incoming() {
        if manager.is_shut_down() {
            break;
        }
        match stream {
            Ok(stream) => spawn_lobby(manager, stream),
            Err(error) => log::warn!("Failed to accept a connection: {}", error),
        }
    }
    Ok(())
}

fn spawn_lobby(manager: &Arc<TableManager>, stream: TcpStream) {
    let peer = stream
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |addr| addr.to_string());
    log::debug!("Accepted connection from {}", peer);

    let manager = Arc::clone(manager);
    let spawned = thread::Builder::new()
        .name(format!("lobby-{peer}"))
        .spawn(move || {
            if let Err(error) = handle_connection(&*manager, stream) {
                log::debug!("Connection from {} left the lobby: {}", peer, error);
            }
        });
    if let Err(error) = spawned {
        log::error!("Couldn't spawn a lobby thread, dropping connection: {}", error);
    }
}

/// Registers the connection's username, then creates or joins a table.
///
/// Usernames are read until one is free; each is answered with whether it
/// was taken. The joinable tables are sent once, then table ids are read
/// until a create (`-1`) or a successful join, each answered with whether
/// the player got a seat.
///
/// # Errors
///
/// Returns an error if the connection fails before a table takes it.
pub fn handle_connection<S: PlayerStream>(
    manager: &TableManager<S>,
    mut stream: S,
) -> io::Result<()> {
    let reservation = loop {
        let requested: String = utils::read_value(&mut stream)?;
        let username = Username::new(&requested);
        match manager.reserve_name(&username) {
            Some(reservation) => {
                utils::write_value(&mut stream, false)?;
                break reservation;
            }
            None => {
                log::debug!("Username {:?} is unavailable", username.as_str());
                utils::write_value(&mut stream, true)?;
            }
        }
    };
    let username = reservation.username().clone();
    log::info!("{} registered", username);

    utils::write_value(&mut stream, manager.list_joinable_tables().as_str())?;

    loop {
        let table_id: TableId = utils::read_value(&mut stream)?;
        if table_id == CREATE_TABLE_ID {
            utils::write_value(&mut stream, true)?;
            manager.create_table(&username, stream);
            return Ok(());
        }

        match manager.join_table(table_id, &username) {
            Ok(ticket) => {
                // Answer before the table owns the stream.
                utils::write_value(&mut stream, true)?;
                if let Err(error) = ticket.admit(stream) {
                    log::warn!(
                        "{} couldn't be handed to table {}: {}",
                        username,
                        table_id,
                        error
                    );
                }
                return Ok(());
            }
            Err(error) => {
                log::debug!("{} couldn't join table {}: {}", username, table_id, error);
                utils::write_value(&mut stream, false)?;
            }
        }
    }
}
