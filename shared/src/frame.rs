//! Encoding and decoding of the frames exchanged between client and server

use crate::{
    ConnectionBuffer, GUESS_TAG, MAX_FRAME_PAYLOAD, MODE_DUEL, MODE_SOLO, PLACEHOLDER, STATE_FLAG,
};
use thiserror::Error;

/// Reasons a frame could not be encoded or decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("payload of {0} bytes does not fit a one-byte length prefix")]
    TextTooLong(usize),
    #[error("text frames carry ASCII only")]
    NonAscii,
    #[error("unexpected frame tag {0:#04x}")]
    UnexpectedTag(u8),
    #[error("guess byte {0:#04x} is not a lowercase ASCII letter")]
    InvalidLetter(u8),
    #[error("invalid multiplayer mode {0}")]
    InvalidMode(u8),
}

/// Game mode picked by the first byte a client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Solo,
    Duel,
}

impl Mode {
    pub fn from_byte(byte: u8) -> Result<Self, FrameError> {
        match byte {
            MODE_SOLO => Ok(Mode::Solo),
            MODE_DUEL => Ok(Mode::Duel),
            other => Err(FrameError::InvalidMode(other)),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Mode::Solo => MODE_SOLO,
            Mode::Duel => MODE_DUEL,
        }
    }
}

/// Snapshot of a game as shown to a player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameView {
    /// The word with `_` at every position not guessed yet
    pub revealed: Vec<u8>,
    /// Letters guessed wrong so far
    pub incorrect: Vec<u8>,
}

impl GameView {
    pub fn word_len(&self) -> usize {
        self.revealed.len()
    }

    pub fn num_incorrect(&self) -> usize {
        self.incorrect.len()
    }

    /// True once no placeholder is left in the revealed pattern
    pub fn is_solved(&self) -> bool {
        !self.revealed.contains(&PLACEHOLDER)
    }

    pub fn revealed_str(&self) -> String {
        String::from_utf8_lossy(&self.revealed).into_owned()
    }
}

/// A frame sent from the server to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerFrame {
    Text(String),
    State(GameView),
}

impl ServerFrame {
    pub fn text(message: impl Into<String>) -> Self {
        ServerFrame::Text(message.into())
    }

    /// Appends the wire form of this frame to `out`
    pub fn encode_into(&self, out: &mut Vec<u8>) -> Result<(), FrameError> {
        match self {
            ServerFrame::Text(message) => {
                if !message.is_ascii() {
                    return Err(FrameError::NonAscii);
                }
                out.push(length_byte(message.len())?);
                out.extend_from_slice(message.as_bytes());
            }
            ServerFrame::State(view) => {
                out.push(STATE_FLAG);
                out.push(length_byte(view.revealed.len())?);
                out.push(length_byte(view.incorrect.len())?);
                out.extend_from_slice(&view.revealed);
                out.extend_from_slice(&view.incorrect);
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        let mut out = Vec::new();
        self.encode_into(&mut out)?;
        Ok(out)
    }

    /// Takes the next complete server frame off the head of `buffer`
    ///
    /// A leading `0x00` always selects the state shape, so an empty text frame
    /// cannot be represented on the wire.
    pub fn decode(buffer: &mut ConnectionBuffer) -> Result<Option<Self>, FrameError> {
        let Some(first) = buffer.peek(0) else {
            return Ok(None);
        };

        if first == STATE_FLAG {
            let (Some(word_len), Some(num_incorrect)) = (buffer.peek(1), buffer.peek(2)) else {
                return Ok(None);
            };
            let word_len = word_len as usize;
            let total = 3 + word_len + num_incorrect as usize;
            let Some(mut bytes) = buffer.take_exactly(total) else {
                return Ok(None);
            };
            let incorrect = bytes.split_off(3 + word_len);
            let revealed = bytes.split_off(3);
            return Ok(Some(ServerFrame::State(GameView {
                revealed,
                incorrect,
            })));
        }

        let Some(mut bytes) = buffer.take_exactly(1 + first as usize) else {
            return Ok(None);
        };
        let payload = bytes.split_off(1);
        if !payload.is_ascii() {
            return Err(FrameError::NonAscii);
        }
        Ok(Some(ServerFrame::Text(
            String::from_utf8_lossy(&payload).into_owned(),
        )))
    }
}

/// A frame sent from a client to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFrame {
    Mode(Mode),
    Guess(u8),
}

impl ClientFrame {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ClientFrame::Mode(mode) => vec![mode.as_byte()],
            ClientFrame::Guess(letter) => vec![GUESS_TAG, *letter],
        }
    }

    /// Takes the single unframed mode byte that opens a session
    ///
    /// The byte is consumed even when it names no known mode.
    pub fn decode_mode(buffer: &mut ConnectionBuffer) -> Result<Option<Self>, FrameError> {
        let Some(bytes) = buffer.take_exactly(1) else {
            return Ok(None);
        };
        Mode::from_byte(bytes[0]).map(|mode| Some(ClientFrame::Mode(mode)))
    }

    /// Takes one `[0x01][letter]` guess frame
    ///
    /// Both bytes are consumed once available, whether or not they are valid.
    pub fn decode_guess(buffer: &mut ConnectionBuffer) -> Result<Option<Self>, FrameError> {
        let Some(bytes) = buffer.take_exactly(2) else {
            return Ok(None);
        };
        match (bytes[0], bytes[1]) {
            (GUESS_TAG, letter) if letter.is_ascii_lowercase() => {
                Ok(Some(ClientFrame::Guess(letter)))
            }
            (GUESS_TAG, letter) => Err(FrameError::InvalidLetter(letter)),
            (tag, _) => Err(FrameError::UnexpectedTag(tag)),
        }
    }
}

fn length_byte(len: usize) -> Result<u8, FrameError> {
    if len > MAX_FRAME_PAYLOAD {
        return Err(FrameError::TextTooLong(len));
    }
    Ok(len as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(bytes: &[u8]) -> ConnectionBuffer {
        let mut buffer = ConnectionBuffer::new();
        buffer.append(bytes).unwrap();
        buffer
    }

    #[test]
    fn test_text_frame_layout() {
        let bytes = ServerFrame::text("Correct!").encode().unwrap();
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[1..], b"Correct!");
    }

    #[test]
    fn test_state_frame_layout() {
        let frame = ServerFrame::State(GameView {
            revealed: b"c__".to_vec(),
            incorrect: b"z".to_vec(),
        });
        assert_eq!(frame.encode().unwrap(), vec![0, 3, 1, b'c', b'_', b'_', b'z']);
    }

    #[test]
    fn test_text_too_long() {
        let long = "x".repeat(256);
        assert_eq!(
            ServerFrame::text(long).encode(),
            Err(FrameError::TextTooLong(256))
        );
        assert!(ServerFrame::text("x".repeat(255)).encode().is_ok());
    }

    #[test]
    fn test_non_ascii_text_rejected() {
        assert_eq!(ServerFrame::text("héllo").encode(), Err(FrameError::NonAscii));
    }

    #[test]
    fn test_state_frame_roundtrip() {
        let view = GameView {
            revealed: b"e_e_ha__".to_vec(),
            incorrect: b"zqx".to_vec(),
        };
        let mut buffer = buffer_of(&ServerFrame::State(view.clone()).encode().unwrap());

        let decoded = ServerFrame::decode(&mut buffer).unwrap().unwrap();
        match decoded {
            ServerFrame::State(decoded) => {
                assert_eq!(decoded.word_len(), 8);
                assert_eq!(decoded.num_incorrect(), 3);
                assert_eq!(decoded, view);
            }
            other => panic!("Unexpected frame {:?}", other),
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_state_frame_waits() {
        let bytes = ServerFrame::State(GameView {
            revealed: b"dog".to_vec(),
            incorrect: vec![],
        })
        .encode()
        .unwrap();

        for cut in 0..bytes.len() {
            let mut buffer = buffer_of(&bytes[..cut]);
            assert_eq!(ServerFrame::decode(&mut buffer), Ok(None));
            assert_eq!(buffer.len(), cut, "bytes consumed at cut {}", cut);
        }
    }

    #[test]
    fn test_decode_consecutive_frames() {
        let mut bytes = ServerFrame::text("Your turn!").encode().unwrap();
        ServerFrame::State(GameView {
            revealed: b"___".to_vec(),
            incorrect: vec![],
        })
        .encode_into(&mut bytes)
        .unwrap();
        let mut buffer = buffer_of(&bytes);

        assert_eq!(
            ServerFrame::decode(&mut buffer).unwrap(),
            Some(ServerFrame::text("Your turn!"))
        );
        assert!(matches!(
            ServerFrame::decode(&mut buffer).unwrap(),
            Some(ServerFrame::State(_))
        ));
        assert_eq!(ServerFrame::decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_game_view_solved() {
        let open = GameView {
            revealed: b"c_t".to_vec(),
            incorrect: vec![],
        };
        let solved = GameView {
            revealed: b"cat".to_vec(),
            incorrect: vec![],
        };
        assert!(!open.is_solved());
        assert!(solved.is_solved());
        assert_eq!(solved.revealed_str(), "cat");
    }

    #[test]
    fn test_decode_mode() {
        let mut buffer = buffer_of(&[MODE_DUEL, MODE_SOLO, 7]);
        assert_eq!(
            ClientFrame::decode_mode(&mut buffer),
            Ok(Some(ClientFrame::Mode(Mode::Duel)))
        );
        assert_eq!(
            ClientFrame::decode_mode(&mut buffer),
            Ok(Some(ClientFrame::Mode(Mode::Solo)))
        );
        assert_eq!(
            ClientFrame::decode_mode(&mut buffer),
            Err(FrameError::InvalidMode(7))
        );
        assert!(buffer.is_empty());
        assert_eq!(ClientFrame::decode_mode(&mut buffer), Ok(None));
    }

    #[test]
    fn test_decode_guess() {
        let mut buffer = buffer_of(&[GUESS_TAG, b'q', 5, b'a', GUESS_TAG, b'A', GUESS_TAG]);
        assert_eq!(
            ClientFrame::decode_guess(&mut buffer),
            Ok(Some(ClientFrame::Guess(b'q')))
        );
        assert_eq!(
            ClientFrame::decode_guess(&mut buffer),
            Err(FrameError::UnexpectedTag(5))
        );
        assert_eq!(
            ClientFrame::decode_guess(&mut buffer),
            Err(FrameError::InvalidLetter(b'A'))
        );
        assert_eq!(ClientFrame::decode_guess(&mut buffer), Ok(None));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_client_frame_encoding() {
        assert_eq!(ClientFrame::Mode(Mode::Solo).encode(), vec![0]);
        assert_eq!(ClientFrame::Mode(Mode::Duel).encode(), vec![2]);
        assert_eq!(ClientFrame::Guess(b'e').encode(), vec![1, b'e']);
    }
}
