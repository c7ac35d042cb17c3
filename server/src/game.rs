//! Per-game state machine
//!
//! A [`Game`] advances only through [`Game::apply_client_input`],
//! [`Game::add_second_player`], [`Game::end_by_disconnect`] and
//! [`Game::end_by_timeout`]. None of them
//! touch sockets: every frame a transition produces is pushed onto an
//! [`Outbox`] in the order it has to reach the wire, and the server loop
//! delivers it afterwards.

use crate::words::WordSource;
use log::{debug, info};
use shared::{
    ClientFrame, FrameError, GameView, Mode, ServerFrame, MAX_INCORRECT_GUESSES, PLACEHOLDER,
};
use std::collections::BTreeSet;
use std::time::Instant;

pub use shared::messages::*;

/// Identifies one accepted connection for the lifetime of the server
pub type ConnectionId = u32;
/// Identifies one game; ids grow with creation order
pub type GameId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the mode byte
    Initializing,
    /// Duel game waiting for an opponent
    Matching,
    Turn1,
    Turn2,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

/// One frame addressed to one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub to: ConnectionId,
    pub frame: ServerFrame,
}

/// Ordered frames produced by game transitions, waiting to be written
#[derive(Debug, Default)]
pub struct Outbox {
    dispatches: Vec<Dispatch>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, to: ConnectionId, frame: ServerFrame) {
        self.dispatches.push(Dispatch { to, frame });
    }

    pub fn text(&mut self, to: ConnectionId, message: &str) {
        self.send(to, ServerFrame::text(message));
    }

    pub fn is_empty(&self) -> bool {
        self.dispatches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dispatches.len()
    }

    /// Hands out everything queued so far, oldest first
    pub fn drain(&mut self) -> std::vec::Drain<'_, Dispatch> {
        self.dispatches.drain(..)
    }

    /// Frames queued for a single connection, in send order
    pub fn frames_for(&self, to: ConnectionId) -> Vec<&ServerFrame> {
        self.dispatches
            .iter()
            .filter(|d| d.to == to)
            .map(|d| &d.frame)
            .collect()
    }
}

/// Text a client gets back for a frame that failed to decode
pub fn rejection_text(error: &FrameError) -> &'static str {
    match error {
        FrameError::InvalidMode(_) => INVALID_MODE,
        _ => INVALID_DATA,
    }
}

/// A single hangman match, solo or duel
#[derive(Debug)]
pub struct Game {
    id: GameId,
    state: GameState,
    multiplayer: bool,
    player1: ConnectionId,
    player2: Option<ConnectionId>,
    word: Vec<u8>,
    revealed: Vec<u8>,
    correct: BTreeSet<u8>,
    incorrect: BTreeSet<u8>,
    created_at: Instant,
}

impl Game {
    /// Creates a game in `Initializing` for a freshly accepted connection
    pub fn new(id: GameId, player1: ConnectionId) -> Self {
        Self {
            id,
            state: GameState::Initializing,
            multiplayer: false,
            player1,
            player2: None,
            word: Vec::new(),
            revealed: Vec::new(),
            correct: BTreeSet::new(),
            incorrect: BTreeSet::new(),
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_multiplayer(&self) -> bool {
        self.multiplayer
    }

    pub fn player1(&self) -> ConnectionId {
        self.player1
    }

    pub fn player2(&self) -> Option<ConnectionId> {
        self.player2
    }

    pub fn players(&self) -> Vec<ConnectionId> {
        std::iter::once(self.player1).chain(self.player2).collect()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// True while a player is expected to guess
    pub fn is_active(&self) -> bool {
        matches!(self.state, GameState::Turn1 | GameState::Turn2)
    }

    pub fn revealed(&self) -> &[u8] {
        &self.revealed
    }

    pub fn correct_guesses(&self) -> &BTreeSet<u8> {
        &self.correct
    }

    pub fn incorrect_guesses(&self) -> &BTreeSet<u8> {
        &self.incorrect
    }

    pub fn view(&self) -> GameView {
        GameView {
            revealed: self.revealed.clone(),
            incorrect: self.incorrect.iter().copied().collect(),
        }
    }

    /// Connection whose guess is accepted next, if any
    pub fn active_player(&self) -> Option<ConnectionId> {
        match self.state {
            GameState::Turn1 => Some(self.player1),
            GameState::Turn2 => self.player2,
            _ => None,
        }
    }

    /// Advances the game on one decoded client frame
    pub fn apply_client_input(
        &mut self,
        from: ConnectionId,
        input: ClientFrame,
        words: &mut dyn WordSource,
        outbox: &mut Outbox,
    ) {
        match self.state {
            GameState::Initializing => self.on_mode(from, input, words, outbox),
            GameState::Matching => outbox.text(from, NOT_YOUR_TURN),
            GameState::Turn1 | GameState::Turn2 => self.on_guess(from, input, outbox),
            GameState::Ended => {}
        }
    }

    /// Attaches the opponent found by matchmaking and starts the duel
    ///
    /// # Panics
    ///
    /// Panics unless this is a duel game still waiting in `Matching`.
    pub fn add_second_player(
        &mut self,
        player2: ConnectionId,
        words: &mut dyn WordSource,
        outbox: &mut Outbox,
    ) {
        assert!(self.multiplayer, "game {} is not a duel", self.id);
        assert!(
            self.player2.is_none() && self.state == GameState::Matching,
            "game {} already has a second player",
            self.id
        );

        self.player2 = Some(player2);
        self.start_round(words);
        info!(
            "Game {} started: connection {} vs connection {}",
            self.id, self.player1, player2
        );

        outbox.text(self.player1, GAME_STARTING);
        outbox.text(player2, GAME_STARTING);
        self.inform_turn(outbox);
    }

    /// Ends the game because `gone` is no longer reachable
    ///
    /// Remaining participants of an unfinished game are told the game is over.
    pub fn end_by_disconnect(&mut self, gone: ConnectionId, outbox: &mut Outbox) {
        if self.state == GameState::Ended {
            return;
        }
        let unfinished = self.is_active();
        self.state = GameState::Ended;

        if unfinished {
            for player in self.players().into_iter().filter(|p| *p != gone) {
                outbox.text(player, OPPONENT_DISCONNECTED);
                outbox.text(player, GAME_OVER);
            }
        }
        info!("Game {} ended: connection {} went away", self.id, gone);
    }

    /// Ends the game because nobody in it has sent anything for too long
    ///
    /// Every participant of a game past mode selection is told why, then gets
    /// the game-over sentinel.
    pub fn end_by_timeout(&mut self, outbox: &mut Outbox) {
        if matches!(self.state, GameState::Ended | GameState::Initializing) {
            self.state = GameState::Ended;
            return;
        }
        self.state = GameState::Ended;

        for player in self.players() {
            outbox.text(player, TIMED_OUT);
            outbox.text(player, GAME_OVER);
        }
        info!("Game {} ended: no input before the idle timeout", self.id);
    }

    fn on_mode(
        &mut self,
        from: ConnectionId,
        input: ClientFrame,
        words: &mut dyn WordSource,
        outbox: &mut Outbox,
    ) {
        match input {
            ClientFrame::Mode(Mode::Solo) => {
                self.multiplayer = false;
                self.start_round(words);
                info!("Game {} started solo for connection {}", self.id, from);
                outbox.text(from, GAME_STARTING);
                self.inform_turn(outbox);
            }
            ClientFrame::Mode(Mode::Duel) => {
                self.multiplayer = true;
                self.state = GameState::Matching;
                debug!("Game {} waiting for an opponent", self.id);
            }
            ClientFrame::Guess(_) => outbox.text(from, INVALID_MODE),
        }
    }

    fn on_guess(&mut self, from: ConnectionId, input: ClientFrame, outbox: &mut Outbox) {
        if self.active_player() != Some(from) {
            outbox.text(from, NOT_YOUR_TURN);
            return;
        }
        let ClientFrame::Guess(letter) = input else {
            outbox.text(from, INVALID_DATA);
            return;
        };
        if self.correct.contains(&letter) || self.incorrect.contains(&letter) {
            outbox.text(from, ALREADY_GUESSED);
            return;
        }

        if self.word.contains(&letter) {
            for (slot, _) in self
                .revealed
                .iter_mut()
                .zip(&self.word)
                .filter(|(_, w)| **w == letter)
            {
                *slot = letter;
            }
            self.correct.insert(letter);
            outbox.text(from, CORRECT);
        } else {
            self.incorrect.insert(letter);
            outbox.text(from, INCORRECT);
        }
        debug!(
            "Game {}: connection {} guessed '{}', now {}",
            self.id,
            from,
            letter as char,
            String::from_utf8_lossy(&self.revealed)
        );

        if self.multiplayer {
            self.state = match self.state {
                GameState::Turn1 => GameState::Turn2,
                _ => GameState::Turn1,
            };
        }

        match self.outcome() {
            Some(outcome) => self.finish(outcome, outbox),
            None => self.inform_turn(outbox),
        }
    }

    /// Loss is checked before win
    fn outcome(&self) -> Option<Outcome> {
        if self.incorrect.len() >= MAX_INCORRECT_GUESSES {
            Some(Outcome::Loss)
        } else if self.word.iter().all(|letter| self.correct.contains(letter)) {
            Some(Outcome::Win)
        } else {
            None
        }
    }

    fn start_round(&mut self, words: &mut dyn WordSource) {
        self.word = words.pick();
        self.revealed = vec![PLACEHOLDER; self.word.len()];
        self.state = GameState::Turn1;
    }

    fn finish(&mut self, outcome: Outcome, outbox: &mut Outbox) {
        self.state = GameState::Ended;
        let verdict = match outcome {
            Outcome::Win => YOU_WIN,
            Outcome::Loss => YOU_LOSE,
        };
        let view = self.view();
        for player in self.players() {
            outbox.send(player, ServerFrame::State(view.clone()));
            outbox.text(player, verdict);
            outbox.text(player, GAME_OVER);
        }
        info!(
            "Game {} over ({:?}), word was {}",
            self.id,
            outcome,
            String::from_utf8_lossy(&self.word)
        );
    }

    /// Solo: the state frame only. Duel: turn prompts to both, then the state
    /// frame to the player about to act.
    fn inform_turn(&self, outbox: &mut Outbox) {
        let Some(player2) = self.player2.filter(|_| self.multiplayer) else {
            outbox.send(self.player1, ServerFrame::State(self.view()));
            return;
        };

        let (active, waiting, active_number) = match self.state {
            GameState::Turn2 => (player2, self.player1, 2),
            _ => (self.player1, player2, 1),
        };
        outbox.text(active, YOUR_TURN);
        outbox.text(waiting, &waiting_on_player(active_number));
        outbox.send(active, ServerFrame::State(self.view()));
    }
}
