//! Table rules and limits shared by the engine, the table actor, and the wire protocol.

use super::entities::Chips;

/// Number of seats at every table.
pub const NUM_SEATS: usize = 4;

/// Number of standard decks in a freshly built shoe.
pub const DEFAULT_NUM_DECKS: usize = 4;

/// Cards in one standard deck.
pub const DECK_SIZE: usize = 52;

/// Balance every player receives when seated.
pub const DEFAULT_BALANCE: Chips = 500;

/// Smallest accepted bet.
pub const MIN_BET: i32 = 2;

/// Largest accepted bet.
pub const MAX_BET: i32 = 10;

/// Bets must be a multiple of this.
pub const BET_INCREMENT: i32 = 2;

/// Best possible hand total.
pub const BLACKJACK: u32 = 21;

/// The dealer keeps drawing until reaching at least this total.
pub const DEALER_STANDS_ON: u32 = 17;

/// Usernames are truncated to this many bytes.
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Minimum number of registered players before a table is started.
pub const MIN_PLAYERS: usize = 2;
