//! Blackjack rules and the text views built from them.
//!
//! - [`entities`]: cards, the shoe, players, and seats
//! - [`engine`]: the per-table rule engine
//! - [`display`]: hands, scoreboard, and roster text

pub mod constants;
pub mod display;
pub mod engine;
pub mod entities;

pub use engine::{BetOutcome, Contender, Game, GameError, GameSettings, Outcome, Settlement};
