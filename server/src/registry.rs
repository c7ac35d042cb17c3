//! Live games and the connection → game mapping
//!
//! The registry belongs to the server loop and is lent to the matchmaker by
//! `&mut`; nothing else holds on to it. It keeps three things consistent:
//!
//! - every game, keyed by a monotonically increasing [`GameId`]
//! - which game each connection currently plays in
//! - which waiting games were already told to wait for an opponent

use crate::game::{ConnectionId, Game, GameId, GameState, Outbox};
use crate::words::WordSource;
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
pub struct GameRegistry {
    games: BTreeMap<GameId, Game>,
    by_connection: HashMap<ConnectionId, GameId>,
    waiting_notified: HashSet<GameId>,
    next_game_id: GameId,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            next_game_id: 1,
            ..Self::default()
        }
    }

    /// Opens a game in `Initializing` for a newly accepted connection
    pub fn create_game(&mut self, player1: ConnectionId) -> GameId {
        let id = self.next_game_id;
        self.next_game_id += 1;

        self.games.insert(id, Game::new(id, player1));
        self.by_connection.insert(player1, id);
        debug!("Created game {} for connection {}", id, player1);
        id
    }

    pub fn game_of(&self, connection: ConnectionId) -> Option<GameId> {
        self.by_connection.get(&connection).copied()
    }

    pub fn get(&self, id: GameId) -> Option<&Game> {
        self.games.get(&id)
    }

    pub fn get_mut(&mut self, id: GameId) -> Option<&mut Game> {
        self.games.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Games in which a player is currently expected to guess
    pub fn active_count(&self) -> usize {
        self.games.values().filter(|g| g.is_active()).count()
    }

    /// Games waiting for an opponent, longest-waiting first
    pub fn matching_ids(&self) -> Vec<GameId> {
        let mut waiting: Vec<&Game> = self
            .games
            .values()
            .filter(|g| g.state() == GameState::Matching)
            .collect();
        waiting.sort_by_key(|g| (g.created_at(), g.id()));
        waiting.into_iter().map(Game::id).collect()
    }

    pub fn ended_ids(&self) -> Vec<GameId> {
        self.games
            .values()
            .filter(|g| g.state() == GameState::Ended)
            .map(Game::id)
            .collect()
    }

    /// Records that `id` got its waiting notice; false if it already had one
    pub fn mark_waiting_notified(&mut self, id: GameId) -> bool {
        self.waiting_notified.insert(id)
    }

    /// Folds the waiting game `absorbed` into `survivor` as its second player
    ///
    /// # Panics
    ///
    /// Panics if either game is missing or `survivor` cannot take a second
    /// player.
    pub fn absorb(
        &mut self,
        survivor: GameId,
        absorbed: GameId,
        words: &mut dyn WordSource,
        outbox: &mut Outbox,
    ) {
        assert_ne!(survivor, absorbed, "a game cannot absorb itself");
        let joining = self
            .games
            .remove(&absorbed)
            .unwrap_or_else(|| panic!("game {} vanished before matching", absorbed));
        self.waiting_notified.remove(&absorbed);

        let player2 = joining.player1();
        let game = self
            .games
            .get_mut(&survivor)
            .unwrap_or_else(|| panic!("game {} vanished before matching", survivor));
        game.add_second_player(player2, words, outbox);

        self.waiting_notified.remove(&survivor);
        self.by_connection.insert(player2, survivor);
    }

    /// Drops a game and forgets every connection mapped to it
    pub fn remove_game(&mut self, id: GameId) -> Option<Game> {
        let game = self.games.remove(&id)?;
        for player in game.players() {
            if self.by_connection.get(&player) == Some(&id) {
                self.by_connection.remove(&player);
            }
        }
        self.waiting_notified.remove(&id);
        Some(game)
    }
}
