//! # Hangman Game Server Library
//!
//! This library provides the authoritative server for a small multiplayer
//! hangman game played over raw TCP. Clients pick solo or duel mode with their
//! first byte and then send one letter per guess; the server answers with
//! short text notices and snapshots of the word being guessed.
//!
//! ## Core Responsibilities
//!
//! ### Connection Multiplexing
//! A single server loop owns the listener, every connection and every game.
//! It accepts sockets, reassembles frames from whatever bytes arrive, applies
//! them to the right game and writes the resulting frames back, without
//! dedicating a thread to any connection.
//!
//! ### Game Rules
//! Each game is a small state machine: `Initializing` until the mode byte
//! arrives, `Matching` while a duel waits for an opponent, `Turn1`/`Turn2`
//! while guesses are accepted, and `Ended` once the word is found or six
//! guesses have missed. A letter can only ever be guessed once per game.
//!
//! ### Matchmaking
//! Duel games waiting for an opponent are paired in arrival order, once per
//! loop iteration. The earlier game survives and the later game's player
//! joins it as player 2.
//!
//! ### Admission Control
//! When the number of games in a turn state reaches the configured ceiling,
//! new connections get a `server-overloaded` notice and are closed before
//! they are ever registered.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! The binary runs on a current-thread tokio runtime. Per-connection reader
//! tasks only forward raw bytes to the loop over a channel and writer tasks
//! only drain an outbound queue, so game state has exactly one owner and
//! needs no locking. A bounded poll interval guarantees matchmaking and
//! reaping progress even when no socket is active.
//!
//! ### Side-Effect Free Transitions
//! Game transitions never touch sockets. They queue frames on an
//! [`game::Outbox`] in protocol order and the loop delivers them afterwards,
//! which keeps the state machine testable without a network.
//!
//! ## Module Organization
//!
//! - [`config`]: runtime settings and their validation
//! - [`words`]: candidate secret words
//! - [`game`]: the per-game state machine
//! - [`registry`]: all live games and the connection → game mapping
//! - [`matchmaker`]: pairing of waiting duel games
//! - [`client_manager`]: per-connection buffers, queues and activity tracking
//! - [`network`]: the listener and the event loop tying everything together
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//! use server::words::WordList;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         bind_addr: "127.0.0.1:9001".to_string(),
//!         ..ServerConfig::default()
//!     };
//!     let mut server = Server::bind(config, WordList::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod game;
pub mod matchmaker;
pub mod network;
pub mod registry;
pub mod words;
