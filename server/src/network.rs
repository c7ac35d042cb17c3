//! Server network layer: the connection multiplexer and its event loop

use crate::client_manager::ClientManager;
use crate::config::{ConfigError, ServerConfig};
use crate::game::{rejection_text, ConnectionId, GameId, GameState, Outbox};
use crate::matchmaker;
use crate::registry::GameRegistry;
use crate::words::WordList;
use log::{debug, error, info, warn};
use shared::{ClientFrame, ServerFrame, SERVER_OVERLOADED};
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};

const LISTEN_BACKLOG: u32 = 5;
const READ_CHUNK: usize = 1024;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot resolve bind address {0}")]
    Resolve(String),
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),
}

/// Messages sent from connection reader tasks to the server loop
#[derive(Debug)]
pub enum ServerMessage {
    DataReceived {
        client_id: ConnectionId,
        data: Vec<u8>,
    },
    ClientDisconnected {
        client_id: ConnectionId,
        reason: String,
    },
}

/// Owns the listener, every connection and every game
///
/// Only [`Server::run`] mutates this state, on a single control flow. Socket
/// reads and writes happen in small per-connection tasks that never look at
/// game state: readers forward bytes as [`ServerMessage`]s, writers drain the
/// connection's outbound queue.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    clients: ClientManager,
    games: GameRegistry,
    words: WordList,
    outbox: Outbox,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn bind(config: ServerConfig, words: WordList) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = tokio::net::lookup_host(&config.bind_addr)
            .await?
            .next()
            .ok_or_else(|| ServerError::Resolve(config.bind_addr.clone()))?;
        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4()?,
            SocketAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(LISTEN_BACKLOG)?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener,
            clients: ClientManager::new(config.max_buffer),
            games: GameRegistry::new(),
            words,
            outbox: Outbox::new(),
            config,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Main server loop
    ///
    /// Each iteration waits for a new connection, a connection event or the
    /// poll interval, drains every event already queued, then runs the
    /// matchmaker and reaps finished games.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let mut poll = interval(self.config.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Server started (max {} active games, {} words)",
            self.config.max_active_games,
            self.words.len()
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, addr)) => self.handle_connection(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                },

                message = self.server_rx.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = poll.tick() => {},
            }

            while let Ok(message) = self.server_rx.try_recv() {
                self.handle_message(message);
            }

            self.run_matchmaker();
            self.reap();
        }

        Ok(())
    }

    /// Admits or refuses a freshly accepted connection
    fn handle_connection(&mut self, stream: TcpStream, addr: SocketAddr) {
        let active = self.games.active_count();
        if active >= self.config.max_active_games {
            warn!(
                "Refusing {}: {} active games already running",
                addr, active
            );
            tokio::spawn(reject(stream));
            return;
        }

        if let Err(e) = stream.set_nodelay(true) {
            debug!("Could not set TCP_NODELAY for {}: {}", addr, e);
        }
        let (read_half, write_half) = stream.into_split();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        let client_id = self.clients.add_client(addr, outbound_tx);
        tokio::spawn(write_loop(client_id, write_half, outbound_rx));
        let reader = tokio::spawn(read_loop(client_id, read_half, self.server_tx.clone()));
        self.clients.attach_reader(client_id, reader);

        self.games.create_game(client_id);
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::DataReceived { client_id, data } => {
                let Some(client) = self.clients.get_mut(client_id) else {
                    debug!("Dropping {} bytes from closed client {}", data.len(), client_id);
                    return;
                };
                if let Err(e) = client.receive(&data) {
                    warn!("Client {} overflowed its buffer: {}", client_id, e);
                    self.end_game_of(client_id);
                    return;
                }
                self.drain_frames(client_id);
                self.flush();
            }
            ServerMessage::ClientDisconnected { client_id, reason } => {
                if self.clients.get_mut(client_id).is_some() {
                    info!("Client {} went away: {}", client_id, reason);
                    self.end_game_of(client_id);
                }
            }
        }
    }

    /// Feeds every complete frame buffered for `client_id` to its game
    fn drain_frames(&mut self, client_id: ConnectionId) {
        loop {
            let Some(game_id) = self.games.game_of(client_id) else {
                return;
            };
            let Some(client) = self.clients.get_mut(client_id) else {
                return;
            };
            let Some(state) = self.games.get(game_id).map(|game| game.state()) else {
                return;
            };
            // input after the game is over is ignored, malformed or not
            if state == GameState::Ended {
                return;
            }
            let initializing = state == GameState::Initializing;

            let decoded = if initializing {
                ClientFrame::decode_mode(&mut client.buffer)
            } else {
                ClientFrame::decode_guess(&mut client.buffer)
            };

            match decoded {
                Ok(None) => return,
                Ok(Some(frame)) => {
                    debug!("Client {} sent {:?}", client_id, frame);
                    if let Some(game) = self.games.get_mut(game_id) {
                        game.apply_client_input(
                            client_id,
                            frame,
                            &mut self.words,
                            &mut self.outbox,
                        );
                    }
                }
                Err(e) => {
                    warn!("Client {} sent invalid data: {}", client_id, e);
                    self.outbox.text(client_id, rejection_text(&e));
                }
            }
        }
    }

    /// Writes everything game transitions produced, in order
    fn flush(&mut self) {
        for dispatch in self.outbox.drain() {
            self.clients.send_frame(dispatch.to, &dispatch.frame);
        }
    }

    fn run_matchmaker(&mut self) {
        let started = matchmaker::run(&mut self.games, &mut self.words, &mut self.outbox);
        if started > 0 {
            debug!("Matchmaking started {} game(s)", started);
        }
        self.flush();
    }

    /// Ends idle games, then closes every ended game
    fn reap(&mut self) {
        if let Some(timeout) = self.config.idle_timeout {
            let silent: HashSet<ConnectionId> =
                self.clients.check_timeouts(timeout).into_iter().collect();
            let idle: Vec<(GameId, ConnectionId)> = self
                .games
                .iter()
                .filter(|game| game.state() != GameState::Ended)
                .filter(|game| game.players().iter().all(|p| silent.contains(p)))
                .map(|game| (game.id(), game.active_player().unwrap_or(game.player1())))
                .collect();

            for (game_id, waiting_on) in idle {
                info!("Game {} timed out waiting on client {}", game_id, waiting_on);
                if let Some(game) = self.games.get_mut(game_id) {
                    game.end_by_timeout(&mut self.outbox);
                }
            }
            self.flush();
        }

        for game_id in self.games.ended_ids() {
            self.close_game(game_id);
        }
    }

    /// Tears down the game `client_id` belongs to because the client is gone
    fn end_game_of(&mut self, client_id: ConnectionId) {
        match self.games.game_of(client_id) {
            Some(game_id) => {
                if let Some(game) = self.games.get_mut(game_id) {
                    game.end_by_disconnect(client_id, &mut self.outbox);
                }
                self.flush();
                self.close_game(game_id);
            }
            None => {
                self.clients.remove_client(&client_id);
            }
        }
    }

    /// Forgets a game and closes all of its connections
    fn close_game(&mut self, game_id: GameId) {
        if let Some(game) = self.games.remove_game(game_id) {
            for player in game.players() {
                self.clients.remove_client(&player);
            }
            debug!(
                "Closed game {} ({} games, {} clients left)",
                game_id,
                self.games.len(),
                self.clients.len()
            );
        }
    }
}

/// Forwards everything read from one socket to the server loop
async fn read_loop(
    client_id: ConnectionId,
    mut reader: OwnedReadHalf,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let mut buffer = [0u8; READ_CHUNK];

    loop {
        let message = match reader.read(&mut buffer).await {
            Ok(0) => ServerMessage::ClientDisconnected {
                client_id,
                reason: "connection closed by peer".to_string(),
            },
            Ok(len) => ServerMessage::DataReceived {
                client_id,
                data: buffer[..len].to_vec(),
            },
            Err(e) => ServerMessage::ClientDisconnected {
                client_id,
                reason: e.to_string(),
            },
        };

        let closing = matches!(message, ServerMessage::ClientDisconnected { .. });
        if server_tx.send(message).is_err() || closing {
            break;
        }
    }
}

/// Writes queued frames to one socket until the queue is closed, then shuts
/// the socket down
async fn write_loop(
    client_id: ConnectionId,
    mut writer: OwnedWriteHalf,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    while let Some(bytes) = outbound.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            debug!("Write to client {} failed: {}", client_id, e);
            return;
        }
    }
    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of client {} failed: {}", client_id, e);
    }
}

/// Tells a connection the server is full and closes it
async fn reject(mut stream: TcpStream) {
    let notice = match ServerFrame::text(SERVER_OVERLOADED).encode() {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Cannot encode overload notice: {}", e);
            return;
        }
    };
    if let Err(e) = stream.write_all(&notice).await {
        debug!("Failed to send overload notice: {}", e);
        return;
    }
    if let Err(e) = stream.shutdown().await {
        debug!("Failed to close refused connection: {}", e);
    }
}
