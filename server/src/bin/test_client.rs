//! Scripted probe for a running server: plays one solo game by guessing
//! letters in frequency order and prints every frame it receives.

use shared::{ClientFrame, ConnectionBuffer, Mode, ServerFrame, GAME_OVER};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const GUESS_ORDER: &[u8] = b"etaoinshrdlcumwfgypbvkjxqz";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:9001".to_string());

    let mut stream = TcpStream::connect(&server_addr).await?;
    println!("Connected to {}", server_addr);

    stream
        .write_all(&ClientFrame::Mode(Mode::Solo).encode())
        .await?;

    let mut buffer = ConnectionBuffer::new();
    let mut guesses = GUESS_ORDER.iter().copied();
    let mut chunk = [0u8; 1024];

    loop {
        let len = stream.read(&mut chunk).await?;
        if len == 0 {
            println!("Server closed the connection");
            return Ok(());
        }
        buffer.append(&chunk[..len])?;

        while let Some(frame) = ServerFrame::decode(&mut buffer)? {
            match frame {
                ServerFrame::Text(message) => {
                    println!("Text: {}", message);
                    if message == GAME_OVER {
                        stream.shutdown().await?;
                        return Ok(());
                    }
                }
                ServerFrame::State(view) => {
                    println!(
                        "State: {} (incorrect: {})",
                        view.revealed_str(),
                        String::from_utf8_lossy(&view.incorrect)
                    );
                    if view.is_solved() || view.num_incorrect() >= shared::MAX_INCORRECT_GUESSES {
                        continue;
                    }
                    if let Some(letter) = guesses.next() {
                        println!("Guessing '{}'", letter as char);
                        stream.write_all(&ClientFrame::Guess(letter).encode()).await?;
                    }
                }
            }
        }
    }
}
