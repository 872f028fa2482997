//! Table actor message types.

use thiserror::Error;

use super::TableId;
use crate::game::entities::Username;

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage<S> {
    /// A player whose seat was reserved, handing over their connection.
    /// Admitted at the next round boundary.
    JoinTable { username: Username, stream: S },
}

/// Reasons a player can't join a table.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum JoinError {
    #[error("table {0} does not exist")]
    NoSuchTable(TableId),
    #[error("table {0} is over")]
    TableOver(TableId),
    #[error("table {0} is full")]
    TableFull(TableId),
    #[error("{0} is already registered at this table")]
    NameTaken(Username),
    #[error("table {0} is closed")]
    Closed(TableId),
}
