//! Performance benchmarks for the protocol codec and game logic

use server::game::{Game, Outbox};
use server::matchmaker;
use server::registry::GameRegistry;
use server::words::WordList;
use shared::{ClientFrame, ConnectionBuffer, GameView, Mode, ServerFrame};
use std::time::Instant;

/// Benchmarks text frame encoding and decoding through a connection buffer
#[test]
fn benchmark_text_frame_codec() {
    let frame = ServerFrame::text("Letter has already been guessed!");
    let iterations = 100_000;
    let mut buffer = ConnectionBuffer::new();
    let start = Instant::now();

    for _ in 0..iterations {
        let bytes = frame.encode().unwrap();
        buffer.append(&bytes).unwrap();
        let decoded = ServerFrame::decode(&mut buffer).unwrap();
        assert!(decoded.is_some());
    }

    let duration = start.elapsed();
    println!(
        "Text frame codec: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(buffer.is_empty());
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks decoding a long stream of state frames delivered in small chunks
#[test]
fn benchmark_state_frame_stream() {
    let frame = ServerFrame::State(GameView {
        revealed: b"aa_dw_lf".to_vec(),
        incorrect: b"xyz".to_vec(),
    });
    let single = frame.encode().unwrap();
    let frames = 20_000;
    let stream: Vec<u8> = single.iter().copied().cycle().take(single.len() * frames).collect();

    let mut buffer = ConnectionBuffer::new();
    let mut decoded = 0;
    let start = Instant::now();

    for chunk in stream.chunks(7) {
        buffer.append(chunk).unwrap();
        while let Some(frame) = ServerFrame::decode(&mut buffer).unwrap() {
            if let ServerFrame::State(view) = frame {
                assert_eq!(view.num_incorrect(), 3);
            }
            decoded += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "State frame stream: {} frames in {:?} ({:.2} ns/frame)",
        decoded,
        duration,
        duration.as_nanos() as f64 / decoded as f64
    );

    assert_eq!(decoded, frames);
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks the server side of client input: buffering and guess decoding
#[test]
fn benchmark_guess_decoding() {
    let guesses: Vec<u8> = (b'a'..=b'z')
        .flat_map(|letter| ClientFrame::Guess(letter).encode())
        .collect();
    let iterations = 10_000;
    let mut buffer = ConnectionBuffer::with_limit(4096);
    let start = Instant::now();

    for _ in 0..iterations {
        buffer.append(&guesses).unwrap();
        let mut count = 0;
        while let Some(ClientFrame::Guess(_)) = ClientFrame::decode_guess(&mut buffer).unwrap() {
            count += 1;
        }
        assert_eq!(count, 26);
    }

    let duration = start.elapsed();
    println!(
        "Guess decoding: {} batches in {:?} ({:.2} μs/batch)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    assert!(duration.as_millis() < 2000);
}

/// Benchmarks complete solo games played through the game state machine
#[test]
fn benchmark_solo_games() {
    let mut words = WordList::default();
    let mut outbox = Outbox::new();
    let games = 5_000;
    let start = Instant::now();

    for id in 0..games {
        let mut game = Game::new(id, 1);
        game.apply_client_input(1, ClientFrame::Mode(Mode::Solo), &mut words, &mut outbox);
        for letter in b"etaoinshrdlcumwfgypbvkjxqz" {
            if !game.is_active() {
                break;
            }
            game.apply_client_input(1, ClientFrame::Guess(*letter), &mut words, &mut outbox);
        }
        assert!(!game.is_active());
        assert!(outbox.drain().count() > 0);
    }

    let duration = start.elapsed();
    println!(
        "Solo games: {} games in {:?} ({:.2} μs/game)",
        games,
        duration,
        duration.as_micros() as f64 / games as f64
    );

    assert!(duration.as_millis() < 5000);
}

/// Benchmarks pairing a large queue of waiting duel players
#[test]
fn benchmark_matchmaking() {
    let mut words = WordList::default();
    let mut outbox = Outbox::new();
    let mut registry = GameRegistry::new();
    let players = 2_000u32;

    for connection in 0..players {
        let id = registry.create_game(connection);
        if let Some(game) = registry.get_mut(id) {
            game.apply_client_input(
                connection,
                ClientFrame::Mode(Mode::Duel),
                &mut words,
                &mut outbox,
            );
        }
    }

    let start = Instant::now();
    let started = matchmaker::run(&mut registry, &mut words, &mut outbox);
    let duration = start.elapsed();

    println!(
        "Matchmaking: {} games started in {:?}",
        started, duration
    );

    assert_eq!(started, players as usize / 2);
    assert_eq!(registry.active_count(), players as usize / 2);
    assert!(duration.as_millis() < 1000);
}
