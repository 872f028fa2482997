//! Table manager for creating, joining, and starting table actors.

use super::{
    TableId,
    actor::{PlayerStream, TableActor, TableHandle},
    config::TableConfig,
    lock,
    messages::{JoinError, TableMessage},
};
use crate::game::{
    display,
    entities::{Shoe, Username},
};
use std::{
    collections::{BTreeMap, HashSet, VecDeque},
    io,
    net::TcpStream,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

/// How long the scheduler waits between passes over the pending tables.
pub const DEFAULT_SCHEDULER_INTERVAL: Duration = Duration::from_secs(5);

/// Times a table's thread may fail to spawn before the table is torn down.
pub const MAX_SPAWN_ATTEMPTS: u32 = 3;

/// A name held by a connection that has registered but not yet joined a
/// table. The name is released when the reservation drops.
#[derive(Debug)]
pub struct NameReservation {
    username: Username,
    reserved: Arc<Mutex<HashSet<Username>>>,
}

impl NameReservation {
    pub fn username(&self) -> &Username {
        &self.username
    }
}

impl Drop for NameReservation {
    fn drop(&mut self) {
        lock(&self.reserved).remove(&self.username);
    }
}

/// A seat claimed at a table, waiting for the player's connection. Dropping
/// the ticket without admitting gives the seat back.
pub struct SeatTicket<S: PlayerStream> {
    handle: TableHandle<S>,
    username: Option<Username>,
}

impl<S: PlayerStream> SeatTicket<S> {
    pub fn table_id(&self) -> TableId {
        self.handle.table_id()
    }

    /// Hands the connection to the table. The player is seated at the
    /// start of the table's next round.
    pub fn admit(mut self, stream: S) -> Result<(), JoinError> {
        let Some(username) = self.username.take() else {
            return Err(JoinError::Closed(self.handle.table_id()));
        };
        let message = TableMessage::JoinTable {
            username: username.clone(),
            stream,
        };
        self.handle.send(message).inspect_err(|_| {
            self.handle.unregister(&username);
        })
    }
}

impl<S: PlayerStream> Drop for SeatTicket<S> {
    fn drop(&mut self) {
        if let Some(username) = self.username.take() {
            self.handle.unregister(&username);
        }
    }
}

/// A created table whose thread hasn't started yet.
struct PendingTable<S> {
    handle: TableHandle<S>,
    /// Taken by the table thread once it runs. Stays put if the spawn fails.
    actor: Arc<Mutex<Option<TableActor<S>>>>,
    attempts: u32,
}

/// Table manager for managing multiple table instances
pub struct TableManager<S = TcpStream> {
    /// Configuration every new table is created with
    config: TableConfig,

    /// Active table handles
    tables: Mutex<BTreeMap<TableId, TableHandle<S>>>,

    /// Next table ID
    next_table_id: Mutex<TableId>,

    /// Tables waiting for enough players to start
    pending: Mutex<VecDeque<PendingTable<S>>>,

    /// Names held by connections still in the lobby
    reserved: Arc<Mutex<HashSet<Username>>>,

    scheduler_interval: Duration,

    shutdown: AtomicBool,
}

impl<S: PlayerStream> TableManager<S> {
    /// Create a new table manager
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for every table
    /// * `scheduler_interval` - Pause between scheduler passes
    ///
    /// # Returns
    ///
    /// * `TableManager` - New table manager instance
    pub fn new(config: TableConfig, scheduler_interval: Duration) -> Self {
        Self {
            config,
            tables: Mutex::new(BTreeMap::new()),
            next_table_id: Mutex::new(0),
            pending: Mutex::new(VecDeque::new()),
            reserved: Arc::new(Mutex::new(HashSet::new())),
            scheduler_interval,
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    fn handles(&self) -> Vec<TableHandle<S>> {
        lock(&self.tables).values().cloned().collect()
    }

    fn is_registered(&self, username: &Username) -> bool {
        self.handles()
            .iter()
            .any(|handle| handle.has_name(username))
    }

    /// Whether `username` is reserved in the lobby or registered at a table.
    pub fn is_name_taken(&self, username: &Username) -> bool {
        lock(&self.reserved).contains(username) || self.is_registered(username)
    }

    /// Reserves `username` for a connection in the lobby. Returns `None` if
    /// the name is empty or already in use anywhere on the server.
    pub fn reserve_name(&self, username: &Username) -> Option<NameReservation> {
        if username.is_empty() {
            return None;
        }
        let mut reserved = lock(&self.reserved);
        if reserved.contains(username) || self.is_registered(username) {
            return None;
        }
        reserved.insert(username.clone());
        Some(NameReservation {
            username: username.clone(),
            reserved: Arc::clone(&self.reserved),
        })
    }

    fn next_id(&self) -> TableId {
        let mut next_id = lock(&self.next_table_id);
        let table_id = *next_id;
        *next_id += 1;
        table_id
    }

    /// Create a new table seated with its creator
    ///
    /// The table starts once a second player registers and the scheduler
    /// picks it up.
    ///
    /// # Returns
    ///
    /// * `TableId` - The new table's id
    pub fn create_table(&self, username: &Username, stream: S) -> TableId {
        let table_id = self.next_id();
        let (actor, handle) = TableActor::new(table_id, self.config.clone());
        self.insert_table(actor, handle, username, stream)
    }

    /// Create a new table whose game deals from `shoe`.
    pub fn create_table_with_shoe(&self, username: &Username, stream: S, shoe: Shoe) -> TableId {
        let table_id = self.next_id();
        let (actor, handle) = TableActor::with_shoe(table_id, self.config.clone(), shoe);
        self.insert_table(actor, handle, username, stream)
    }

    fn insert_table(
        &self,
        mut actor: TableActor<S>,
        handle: TableHandle<S>,
        username: &Username,
        stream: S,
    ) -> TableId {
        let table_id = handle.table_id();
        // A fresh table has no names yet.
        if let Err(error) = actor.seat_creator(username.clone(), stream) {
            log::error!("Table {}: {}", table_id, error);
        }

        lock(&self.tables).insert(table_id, handle.clone());
        lock(&self.pending).push_back(PendingTable {
            handle,
            actor: Arc::new(Mutex::new(Some(actor))),
            attempts: 0,
        });

        log::info!("{} created table {}", username, table_id);
        table_id
    }

    /// Claims a seat at a table
    ///
    /// # Errors
    ///
    /// Fails if the table doesn't exist, is over or full, or already has a
    /// player named `username`.
    pub fn join_table(
        &self,
        table_id: TableId,
        username: &Username,
    ) -> Result<SeatTicket<S>, JoinError> {
        let handle = lock(&self.tables)
            .get(&table_id)
            .cloned()
            .ok_or(JoinError::NoSuchTable(table_id))?;
        handle.try_register(username)?;
        log::info!("{} joined table {}", username, table_id);
        Ok(SeatTicket {
            handle,
            username: Some(username.clone()),
        })
    }

    /// Tables a new player could join, with their rosters.
    pub fn list_joinable_tables(&self) -> String {
        let rows: Vec<(TableId, Vec<Username>)> = self
            .handles()
            .into_iter()
            .filter(TableHandle::is_joinable)
            .map(|handle| (handle.table_id(), handle.names()))
            .collect();
        display::roster(rows.iter().map(|(table_id, names)| (*table_id, names.iter().collect())))
    }

    /// Get table count
    pub fn table_count(&self) -> usize {
        lock(&self.tables).len()
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    pub fn has_table(&self, table_id: TableId) -> bool {
        lock(&self.tables).contains_key(&table_id)
    }

    fn remove_table(&self, table_id: TableId) {
        if lock(&self.tables).remove(&table_id).is_some() {
            log::info!("Table {} removed", table_id);
        }
    }

    /// One scheduler pass: starts every pending table that is ready and
    /// puts the rest back. Returns how many tables were started.
    pub fn start_ready_tables(self: &Arc<Self>) -> usize {
        let drained: Vec<PendingTable<S>> = lock(&self.pending).drain(..).collect();
        let mut waiting = Vec::new();
        let mut started = 0;

        for mut pending in drained {
            if !pending.handle.is_ready() {
                waiting.push(pending);
                continue;
            }
            let table_id = pending.handle.table_id();
            match self.spawn_table(&pending) {
                Ok(()) => started += 1,
                Err(error) => {
                    pending.attempts += 1;
                    if pending.attempts >= MAX_SPAWN_ATTEMPTS {
                        log::error!(
                            "Table {}: giving up after {} failed starts: {}",
                            table_id,
                            pending.attempts,
                            error
                        );
                        self.remove_table(table_id);
                    } else {
                        log::warn!("Table {}: failed to start: {}", table_id, error);
                        waiting.push(pending);
                    }
                }
            }
        }

        lock(&self.pending).extend(waiting);
        started
    }

    fn spawn_table(self: &Arc<Self>, pending: &PendingTable<S>) -> io::Result<()> {
        let table_id = pending.handle.table_id();
        let slot = Arc::clone(&pending.actor);
        let manager = Arc::clone(self);
        thread::Builder::new()
            .name(format!("table-{table_id}"))
            .spawn(move || {
                let actor = lock(&slot).take();
                if let Some(actor) = actor {
                    actor.run();
                }
                manager.remove_table(table_id);
            })?;
        Ok(())
    }

    /// Spawns the scheduler thread, which runs a pass every interval until
    /// [`shutdown`](Self::shutdown).
    pub fn spawn_scheduler(self: &Arc<Self>) -> io::Result<thread::JoinHandle<()>> {
        let manager = Arc::clone(self);
        thread::Builder::new()
            .name("table-scheduler".to_string())
            .spawn(move || {
                log::info!(
                    "Table scheduler running every {:?}",
                    manager.scheduler_interval
                );
                while !manager.is_shut_down() {
                    thread::sleep(manager.scheduler_interval);
                    let started = manager.start_ready_tables();
                    if started > 0 {
                        log::debug!("Started {} tables", started);
                    }
                }
                log::info!("Table scheduler stopped");
            })
    }

    /// Stops the scheduler after its current pass.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}
