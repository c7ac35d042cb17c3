//! Wire protocol shared by the hangman server and the console client.
//!
//! The protocol is byte-oriented and rides on a plain TCP stream:
//!
//! - server → client text frame: `[len][ascii bytes]`
//! - server → client state frame: `[0x00][word_len][num_incorrect][revealed][incorrect]`
//! - client → server mode selector (first byte only): `0x00` solo, `0x02` duel
//! - client → server guess: `[0x01][letter]`
//!
//! Frames are never escaped or checksummed. Decoding works against a
//! [`ConnectionBuffer`] and reports "need more bytes" as `Ok(None)`, separately
//! from malformed input.

mod buffer;
mod frame;
pub mod messages;

pub use buffer::{BufferOverflow, ConnectionBuffer};
pub use frame::{ClientFrame, FrameError, GameView, Mode, ServerFrame};
pub use messages::{GAME_OVER, SERVER_OVERLOADED};

/// Leading byte of a state frame.
pub const STATE_FLAG: u8 = 0x00;
/// Leading byte of a client guess frame.
pub const GUESS_TAG: u8 = 0x01;
/// Mode selector for a single-player game.
pub const MODE_SOLO: u8 = 0x00;
/// Mode selector for a two-player game.
pub const MODE_DUEL: u8 = 0x02;

/// Longest payload a length-prefixed frame can carry.
pub const MAX_FRAME_PAYLOAD: usize = u8::MAX as usize;
/// Symbol used for unrevealed positions of the word.
pub const PLACEHOLDER: u8 = b'_';
/// Number of misses that loses the game.
pub const MAX_INCORRECT_GUESSES: usize = 6;
