//! Framed session with the server and the client's game loop

use crate::game::ClientGameState;
use crate::input::{parse_letter, Prompt};
use log::{debug, info, warn};
use shared::messages::{ALREADY_GUESSED, INVALID_DATA};
use shared::{
    BufferOverflow, ClientFrame, ConnectionBuffer, FrameError, Mode, ServerFrame, GAME_OVER,
};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_CHUNK: usize = 1024;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server sent a malformed frame: {0}")]
    Frame(#[from] FrameError),
    #[error("server sent too much unparsed data: {0}")]
    Overflow(#[from] BufferOverflow),
    #[error("input closed before the game ended")]
    InputClosed,
}

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// The server sent the game-over sentinel
    GameOver { last_notice: Option<String> },
    /// The server closed the connection without it
    Closed,
}

/// Frame-level view of a byte stream to the server
pub struct Session<S> {
    stream: S,
    buffer: ConnectionBuffer,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Session<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: ConnectionBuffer::with_limit(4 * READ_CHUNK),
        }
    }

    pub async fn send(&mut self, frame: ClientFrame) -> Result<(), ClientError> {
        debug!("Sending {:?}", frame);
        self.stream.write_all(&frame.encode()).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Waits for the next complete frame; `None` once the server closed
    pub async fn next_frame(&mut self) -> Result<Option<ServerFrame>, ClientError> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = ServerFrame::decode(&mut self.buffer)? {
                return Ok(Some(frame));
            }
            let len = self.stream.read(&mut chunk).await?;
            if len == 0 {
                if !self.buffer.is_empty() {
                    warn!("Server closed with {} bytes unparsed", self.buffer.len());
                }
                return Ok(None);
            }
            self.buffer.append(&chunk[..len])?;
        }
    }

    /// Shuts down our side of the connection
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

/// Plays one game: sends `mode`, then prints what the server says and asks
/// for a letter whenever a snapshot leaves one to guess
pub async fn play<S, R>(
    session: &mut Session<S>,
    prompt: &mut Prompt<R>,
    mode: Mode,
) -> Result<SessionEnd, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    session.send(ClientFrame::Mode(mode)).await?;
    info!("Requested {:?} game", mode);

    let mut state = ClientGameState::new();
    let mut last_notice = None;

    while let Some(frame) = session.next_frame().await? {
        match frame {
            ServerFrame::Text(message) => {
                println!("{}", message);
                if message == GAME_OVER {
                    state.game_over = true;
                    session.close().await?;
                    return Ok(SessionEnd::GameOver { last_notice });
                }
                // the previous guess was refused, so it is still our turn
                let retry = message == ALREADY_GUESSED || message == INVALID_DATA;
                last_notice = Some(message);
                if retry && state.needs_guess() {
                    guess(session, prompt, &state).await?;
                }
            }
            ServerFrame::State(view) => {
                state.apply_view(&view);
                print!("{}", state.render());
                if state.needs_guess() {
                    guess(session, prompt, &state).await?;
                }
            }
        }
    }

    println!("Server closed the connection");
    Ok(SessionEnd::Closed)
}

async fn guess<S, R>(
    session: &mut Session<S>,
    prompt: &mut Prompt<R>,
    state: &ClientGameState,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    R: AsyncRead + Unpin,
{
    let guessed = state.guessed();
    let letter = prompt
        .ask_until("Letter to guess: ", |line| parse_letter(line, &guessed))
        .await?
        .ok_or(ClientError::InputClosed)?;
    session.send(ClientFrame::Guess(letter)).await
}
