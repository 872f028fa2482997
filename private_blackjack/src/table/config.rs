//! Table configuration.

use std::time::Duration;

use crate::game::{
    GameSettings,
    constants::{DEFAULT_BALANCE, DEFAULT_NUM_DECKS, MAX_BET},
    entities::Chips,
};

/// Largest shoe a table may be configured with.
pub const MAX_NUM_DECKS: usize = 8;

/// Table configuration shared by every table a manager creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Number of decks in the shoe (default: 4)
    pub num_decks: usize,

    /// Balance each player is seated with (default: $500)
    pub starting_balance: Chips,

    /// Pause between round phases so players can read the table
    pub display_wait: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            num_decks: DEFAULT_NUM_DECKS,
            starting_balance: DEFAULT_BALANCE,
            display_wait: Duration::from_secs(3),
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.num_decks == 0 || self.num_decks > MAX_NUM_DECKS {
            return Err(format!("Number of decks must be between 1 and {MAX_NUM_DECKS}"));
        }

        if self.starting_balance < MAX_BET.unsigned_abs() {
            return Err(format!(
                "Starting balance must cover the maximum bet of ${MAX_BET}"
            ));
        }

        Ok(())
    }

    /// Rule parameters for a new game at this table.
    pub fn game_settings(&self) -> GameSettings {
        GameSettings {
            num_decks: self.num_decks,
            starting_balance: self.starting_balance,
        }
    }

    /// Configuration without pacing delays.
    pub fn instant() -> Self {
        Self {
            display_wait: Duration::ZERO,
            ..Self::default()
        }
    }
}
