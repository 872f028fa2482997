//! Table module providing multi-table support with an actor model.
//!
//! This module implements:
//! - TableActor: owns one table's game and player connections and plays its rounds
//! - TableManager: registry of tables, name reservations, and the start scheduler
//! - Message-based admission through each table's mailbox
//!
//! ## Architecture
//!
//! Each running table has its own thread. Other threads reach a table only
//! through its [`TableHandle`]: the registered names, the ready and over
//! flags, and the mailbox sender. The active connections and the rule engine
//! belong to the actor alone.

use std::sync::{Mutex, MutexGuard};

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{PlayerStream, TableActor, TableHandle};
pub use config::TableConfig;
pub use manager::{NameReservation, SeatTicket, TableManager};
pub use messages::{JoinError, TableMessage};

/// Table identifier, as sent over the wire.
pub type TableId = i32;

/// Locks a mutex, recovering the data if another thread panicked while
/// holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("recovering from a poisoned lock");
        poisoned.into_inner()
    })
}
