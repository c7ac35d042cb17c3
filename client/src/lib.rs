//! # Hangman Console Client
//!
//! This library holds the client side of the hangman game: it speaks the
//! byte protocol from the `shared` crate over a TCP stream, keeps a small
//! local picture of the game, and asks the player for letters on the console.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Local view of the game rebuilt from server snapshots:
//! - The revealed pattern as last sent by the server
//! - Correct and incorrect letters seen so far
//! - Whether a guess is expected after the latest snapshot
//!
//! ### Input Module (`input`)
//! Console prompts and validation:
//! - The "Two Player? (y/n)" question
//! - Single-letter guesses, refusing repeats before they reach the server
//!
//! ### Network Module (`network`)
//! Communication with the server:
//! - A framed [`network::Session`] over any async byte stream
//! - The [`network::play`] loop that drives one game to its end
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::Prompt;
//! use client::network::{play, Session};
//! use shared::Mode;
//!
//! # async fn run() -> Result<(), client::network::ClientError> {
//! let stream = tokio::net::TcpStream::connect("127.0.0.1:9001").await?;
//! let mut session = Session::new(stream);
//! let mut prompt = Prompt::new(tokio::io::stdin());
//! play(&mut session, &mut prompt, Mode::Solo).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The server is authoritative for every rule. The client only filters out
//! input that could never be a valid guess and letters it has already seen.

pub mod game;
pub mod input;
pub mod network;
