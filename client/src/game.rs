use shared::{GameView, MAX_INCORRECT_GUESSES, PLACEHOLDER};
use std::collections::BTreeSet;

/// What the client knows about its game, rebuilt from state frames
#[derive(Debug, Clone, Default)]
pub struct ClientGameState {
    pub revealed: Vec<u8>,
    pub correct: BTreeSet<u8>,
    pub incorrect: BTreeSet<u8>,
    pub game_over: bool,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_view(&mut self, view: &GameView) {
        self.revealed = view.revealed.clone();
        self.correct.extend(view.revealed.iter().filter(|b| **b != PLACEHOLDER));
        self.incorrect.extend(view.incorrect.iter().copied());
    }

    /// Every letter either player has tried so far
    pub fn guessed(&self) -> BTreeSet<u8> {
        self.correct.union(&self.incorrect).copied().collect()
    }

    /// True when the last snapshot leaves a guess to make
    pub fn needs_guess(&self) -> bool {
        !self.game_over
            && !self.revealed.is_empty()
            && self.revealed.contains(&PLACEHOLDER)
            && self.incorrect.len() < MAX_INCORRECT_GUESSES
    }

    pub fn render(&self) -> String {
        let incorrect: Vec<String> = self
            .incorrect
            .iter()
            .map(|b| (*b as char).to_string())
            .collect();
        format!(
            "{}\nIncorrect guesses: {}\n",
            String::from_utf8_lossy(&self.revealed),
            incorrect.join(" ")
        )
    }
}
