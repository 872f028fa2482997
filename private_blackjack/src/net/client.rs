//! A low-level TCP blackjack client.
//!
//! This client is blocking and so is primarily used as a testing utility
//! rather than an actual blackjack client.

use anyhow::{Error, bail};
use std::{
    net::{SocketAddr, TcpStream},
    thread,
    time::Duration,
};

use super::{
    super::{
        game::entities::{Action, RoundStatus, Username},
        table::TableId,
    },
    messages::{CREATE_TABLE_ID, QUIT_BET},
    utils,
};

/// Default timeout for reading from the server.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for writing to the server.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// A blocking TCP client for connecting to a blackjack server.
///
/// Each method sends or receives exactly one protocol message, so callers
/// drive the round sequence themselves.
pub struct Client {
    /// The username associated with this client.
    pub username: Username,
    /// The underlying TCP stream.
    pub stream: TcpStream,
}

impl Client {
    /// Open a TCP connection to the server.
    ///
    /// Tries three times with decreasing timeouts (1s, 500ms, 100ms).
    ///
    /// # Errors
    ///
    /// Returns an error if no attempt connects.
    pub fn open(addr: &SocketAddr) -> Result<TcpStream, Error> {
        let mut connect_timeouts = vec![
            Duration::from_millis(100),
            Duration::from_millis(500),
            Duration::from_secs(1),
        ];
        while let Some(connect_timeout) = connect_timeouts.pop() {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(READ_TIMEOUT))?;
                    stream.set_write_timeout(Some(WRITE_TIMEOUT))?;
                    return Ok(stream);
                }
                _ => thread::sleep(connect_timeout),
            }
        }
        bail!("couldn't connect to {addr}")
    }

    /// Connect to a blackjack server and register a username.
    ///
    /// # Arguments
    ///
    /// * `username` - The username for this client
    /// * `addr` - The server socket address
    ///
    /// # Returns
    ///
    /// Returns the connected client and the list of joinable tables.
    ///
    /// # Errors
    ///
    /// Returns an error if unable to connect or if the name is taken.
    pub fn connect(username: Username, addr: &SocketAddr) -> Result<(Self, String), Error> {
        let mut stream = Self::open(addr)?;
        if Self::register(&mut stream, &username)? {
            bail!("username {username} is taken");
        }
        let tables: String = utils::read_value(&mut stream)?;
        Ok((Self { username, stream }, tables))
    }

    /// Sends a username. Returns whether the server reported it taken.
    pub fn register(stream: &mut TcpStream, username: &Username) -> Result<bool, Error> {
        utils::write_value(stream, username.as_str())?;
        Ok(utils::read_value(stream)?)
    }

    /// Asks for a new table. Returns whether the server accepted.
    pub fn create_table(&mut self) -> Result<bool, Error> {
        self.join_table(CREATE_TABLE_ID)
    }

    /// Asks to join a table. Returns whether the server accepted.
    pub fn join_table(&mut self, table_id: TableId) -> Result<bool, Error> {
        utils::write_value(&mut self.stream, table_id)?;
        Ok(utils::read_value(&mut self.stream)?)
    }

    pub fn bet(&mut self, amount: i32) -> Result<(), Error> {
        utils::write_value(&mut self.stream, amount)?;
        Ok(())
    }

    /// Leaves the table. Only valid in place of a bet.
    pub fn quit(&mut self) -> Result<(), Error> {
        self.bet(QUIT_BET)
    }

    pub fn take_action(&mut self, action: Action) -> Result<(), Error> {
        self.send_action_code(action.code())
    }

    /// Sends a raw action code, valid or not.
    pub fn send_action_code(&mut self, code: i32) -> Result<(), Error> {
        utils::write_value(&mut self.stream, code)?;
        Ok(())
    }

    /// Receives a bool signal: round start, turn prompt, or next round.
    pub fn recv_signal(&mut self) -> Result<bool, Error> {
        Ok(utils::read_value(&mut self.stream)?)
    }

    pub fn recv_status(&mut self) -> Result<RoundStatus, Error> {
        let code: u8 = utils::read_value(&mut self.stream)?;
        match RoundStatus::try_from(code) {
            Ok(status) => Ok(status),
            Err(code) => bail!("invalid round status {code}"),
        }
    }

    /// Receives display text: hands, a player's name, or the scoreboard.
    pub fn recv_text(&mut self) -> Result<String, Error> {
        Ok(utils::read_value(&mut self.stream)?)
    }
}
