//! # Private Blackjack
//!
//! A multi-table blackjack server library. Remote players register a unique
//! name, then create or join a table of up to four seats. Each table runs on
//! its own thread through repeated rounds of betting, turns, dealer play,
//! and settlement.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, the shoe, and the rule engine
//! - [`table`]: table actors, the table registry, and the start scheduler
//! - [`net`]: wire codec, lobby handshake, accept loop, and a blocking client
//!
//! ## Example
//!
//! ```
//! use private_blackjack::{Game, GameSettings, entities::Username};
//!
//! let mut game = Game::new(GameSettings::default());
//! game.add_player(Username::new("alice")).unwrap();
//! game.add_player(Username::new("bob")).unwrap();
//! game.start_round().unwrap();
//! assert_eq!(game.round(), 1);
//! ```

/// Networking components for client-server communication.
pub mod net;
pub use net::{client::Client, messages, server, utils};

/// Core game logic and entities.
pub mod game;
pub use game::{
    BetOutcome, Game, GameError, GameSettings, Outcome, Settlement,
    constants::{self, DEFAULT_BALANCE, NUM_SEATS},
    display, entities,
};

/// Table actors and the table registry.
pub mod table;
pub use table::{JoinError, TableActor, TableConfig, TableId, TableManager};
