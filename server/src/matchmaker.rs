//! Pairing of duel games waiting for an opponent

use crate::game::{Outbox, WAITING_FOR_OPPONENT};
use crate::registry::GameRegistry;
use crate::words::WordSource;
use log::{debug, info};

/// Pairs waiting games, longest-waiting first
///
/// The earlier game of each pair survives and the later one's player joins it
/// as player 2. A game still waiting afterwards gets the waiting notice once
/// over its whole lifetime. Returns the number of games started.
pub fn run(registry: &mut GameRegistry, words: &mut dyn WordSource, outbox: &mut Outbox) -> usize {
    let waiting = registry.matching_ids();
    let mut pairs = waiting.chunks_exact(2);
    let mut started = 0;

    for pair in &mut pairs {
        let (survivor, absorbed) = (pair[0], pair[1]);
        info!("Matched game {} with game {}", survivor, absorbed);
        registry.absorb(survivor, absorbed, words, outbox);
        started += 1;
    }

    for &id in pairs.remainder() {
        if !registry.mark_waiting_notified(id) {
            continue;
        }
        if let Some(game) = registry.get(id) {
            debug!("Game {} is waiting for an opponent", id);
            outbox.text(game.player1(), WAITING_FOR_OPPONENT);
        }
    }

    started
}
