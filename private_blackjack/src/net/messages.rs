//! Sentinel values of the wire protocol.
//!
//! Every message is a single primitive: a bool signal, an i32 (table id, bet,
//! or action code), a u8 round status, or length-prefixed text. Actions and
//! round statuses are encoded through [`Action::code`] and
//! [`RoundStatus::code`].
//!
//! [`Action::code`]: crate::game::entities::Action::code
//! [`RoundStatus::code`]: crate::game::entities::RoundStatus::code

use crate::table::TableId;

/// Table id a client sends to create a new table instead of joining one.
pub const CREATE_TABLE_ID: TableId = -1;

/// Bet a client sends to leave the table.
pub const QUIT_BET: i32 = -1;
