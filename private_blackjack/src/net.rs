//! Networking layer for client-server communication.
//!
//! This module provides blocking TCP networking over a primitive wire
//! protocol encoded with bincode. The server runs one thread per
//! connection while it is in the lobby.

/// Blocking TCP client for driving a blackjack server.
pub mod client;

/// Protocol sentinel values.
pub mod messages;

/// Accept loop and lobby handshake.
pub mod server;

/// Utilities for encoding and decoding wire values.
pub mod utils;
