//! Per-connection I/O state for the game server
//!
//! This module tracks everything the server loop needs to talk to one socket:
//! - the receive buffer holding bytes not yet parsed into a frame
//! - the outbound queue drained by the connection's writer task
//! - the reader task handle, so a connection can be cut off at any time
//! - the time of the last inbound bytes, for the optional idle timeout
//!
//! Which game a connection plays in is tracked by the game registry, not here.

use crate::game::ConnectionId;
use log::{error, info};
use shared::{BufferOverflow, ConnectionBuffer, ServerFrame};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Represents one accepted socket
///
/// Dropping a client closes its connection: the reader task is aborted and
/// the writer task flushes what is still queued before shutting the socket.
#[derive(Debug)]
pub struct Client {
    /// Unique connection identifier assigned by the server
    pub id: ConnectionId,
    /// Peer address, for logging
    pub addr: SocketAddr,
    /// Last time we received any bytes from this client
    pub last_seen: Instant,
    /// Bytes received but not yet decoded
    pub buffer: ConnectionBuffer,
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    reader: Option<JoinHandle<()>>,
}

impl Client {
    pub fn new(
        id: ConnectionId,
        addr: SocketAddr,
        max_buffer: usize,
        outbound: mpsc::UnboundedSender<Vec<u8>>,
    ) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            buffer: ConnectionBuffer::with_limit(max_buffer),
            outbound,
            reader: None,
        }
    }

    /// Buffers freshly read bytes and marks the client as active
    pub fn receive(&mut self, data: &[u8]) -> Result<(), BufferOverflow> {
        self.last_seen = Instant::now();
        self.buffer.append(data)
    }

    /// Checks if the client has been silent for longer than `timeout`
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }

    /// Queues encoded bytes for the writer task
    ///
    /// Returns false once the writer has gone away.
    pub fn send(&self, bytes: Vec<u8>) -> bool {
        self.outbound.send(bytes).is_ok()
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Manages all open connections
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<ConnectionId, Client>,
    /// Next available ID for new connections
    next_client_id: ConnectionId,
    /// Receive buffer limit handed to every new client
    max_buffer: usize,
}

impl ClientManager {
    pub fn new(max_buffer: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_buffer,
        }
    }

    /// Registers a new connection and returns its ID
    ///
    /// `outbound` is the sending side of the queue the connection's writer
    /// task drains.
    pub fn add_client(
        &mut self,
        addr: SocketAddr,
        outbound: mpsc::UnboundedSender<Vec<u8>>,
    ) -> ConnectionId {
        let client_id = self.next_client_id;
        self.next_client_id += 1;

        let client = Client::new(client_id, addr, self.max_buffer, outbound);
        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, client);

        client_id
    }

    /// Hands the reader task to the client so removal can stop it
    pub fn attach_reader(&mut self, client_id: ConnectionId, reader: JoinHandle<()>) {
        match self.clients.get_mut(&client_id) {
            Some(client) => client.reader = Some(reader),
            None => reader.abort(),
        }
    }

    /// Removes and closes a connection
    ///
    /// Returns true if the client was found, false if it was already gone.
    pub fn remove_client(&mut self, client_id: &ConnectionId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!("Client {} ({}) disconnected", client.id, client.addr);
            true
        } else {
            false
        }
    }

    pub fn get_mut(&mut self, client_id: ConnectionId) -> Option<&mut Client> {
        self.clients.get_mut(&client_id)
    }

    /// Encodes `frame` and queues it for `client_id`
    pub fn send_frame(&self, client_id: ConnectionId, frame: &ServerFrame) {
        let Some(client) = self.clients.get(&client_id) else {
            return;
        };
        match frame.encode() {
            Ok(bytes) => {
                if !client.send(bytes) {
                    error!("Writer for client {} is gone, frame dropped", client_id);
                }
            }
            Err(e) => error!("Cannot encode frame for client {}: {}", client_id, e),
        }
    }

    /// Lists clients silent for longer than `timeout`
    ///
    /// Nothing is removed here; the caller ends their games, which closes
    /// them.
    pub fn check_timeouts(&self, timeout: Duration) -> Vec<ConnectionId> {
        self.clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_client_creation() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let client = Client::new(1, test_addr(), 16, tx);

        assert_eq!(client.id, 1);
        assert_eq!(client.addr, test_addr());
        assert!(client.buffer.is_empty());
    }

    #[test]
    fn test_client_receive_respects_limit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut client = Client::new(1, test_addr(), 4, tx);

        assert!(client.receive(&[1, 2, 3]).is_ok());
        assert!(client.receive(&[4, 5]).is_err());
        assert_eq!(client.buffer.len(), 3);
    }

    #[test]
    fn test_client_timeout() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut client = Client::new(1, test_addr(), 16, tx);

        assert!(!client.is_timed_out(Duration::from_secs(1)));

        client.last_seen = Instant::now() - Duration::from_secs(2);
        assert!(client.is_timed_out(Duration::from_secs(1)));

        client.receive(&[0]).unwrap();
        assert!(!client.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_add_multiple_clients() {
        let mut manager = ClientManager::new(16);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let client_id1 = manager.add_client(test_addr(), tx1);
        let client_id2 = manager.add_client(test_addr2(), tx2);

        assert_eq!(client_id1, 1);
        assert_eq!(client_id2, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_remove_client() {
        let mut manager = ClientManager::new(16);
        let (tx, _rx) = mpsc::unbounded_channel();
        let client_id = manager.add_client(test_addr(), tx);

        assert!(manager.remove_client(&client_id));
        assert!(manager.is_empty());
        assert!(!manager.remove_client(&client_id));
    }

    #[test]
    fn test_send_frame_queues_encoded_bytes() {
        let mut manager = ClientManager::new(16);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client_id = manager.add_client(test_addr(), tx);

        manager.send_frame(client_id, &ServerFrame::text("Correct!"));
        manager.send_frame(999, &ServerFrame::text("nobody"));

        let bytes = rx.try_recv().unwrap();
        assert_eq!(bytes[0], 8);
        assert_eq!(&bytes[1..], b"Correct!");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_removal_closes_outbound_queue() {
        let mut manager = ClientManager::new(16);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let client_id = manager.add_client(test_addr(), tx);

        manager.send_frame(client_id, &ServerFrame::text("Game Over!"));
        manager.remove_client(&client_id);

        assert!(rx.try_recv().is_ok());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_check_timeouts() {
        let mut manager = ClientManager::new(16);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let quiet = manager.add_client(test_addr(), tx1);
        let _busy = manager.add_client(test_addr2(), tx2);

        manager.get_mut(quiet).unwrap().last_seen = Instant::now() - Duration::from_secs(10);

        assert_eq!(manager.check_timeouts(Duration::from_secs(5)), vec![quiet]);
        assert_eq!(manager.len(), 2);
    }
}
