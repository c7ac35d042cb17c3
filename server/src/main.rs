use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use server::words::WordList;
use std::path::PathBuf;
use std::time::Duration;

/// Parses command-line arguments, then runs the server loop until it fails or
/// Ctrl+C is pressed.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command line arguments
    #[derive(Parser, Debug)]
    #[command(author, version, about)]
    struct Args {
        /// Server IP address to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// Server port to listen on
        #[arg(short, long, default_value = "9001")]
        port: u16,
        /// Active games allowed before new connections are refused
        #[arg(short = 'm', long, default_value = "3")]
        max_active_games: usize,
        /// Longest wait between matchmaking passes, in milliseconds
        #[arg(long, default_value = "5000")]
        poll_interval_ms: u64,
        /// Close games whose players stay silent this many seconds
        #[arg(long)]
        idle_timeout_secs: Option<u64>,
        /// Unparsed bytes kept per connection before it is dropped
        #[arg(long, default_value = "4096")]
        max_buffer: usize,
        /// File with one candidate word per line
        #[arg(short, long)]
        words: Option<PathBuf>,
    }

    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        max_active_games: args.max_active_games,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        idle_timeout: args.idle_timeout_secs.map(Duration::from_secs),
        max_buffer: args.max_buffer,
    };
    let words = match &args.words {
        Some(path) => WordList::from_file(path)?,
        None => WordList::default(),
    };

    let mut server = Server::bind(config, words).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
