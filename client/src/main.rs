use clap::{Parser, ValueEnum};
use client::input::{parse_mode_answer, Prompt};
use client::network::{play, Session, SessionEnd};
use log::info;
use shared::Mode;
use tokio::net::TcpStream;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Solo,
    Duel,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Solo => Mode::Solo,
            ModeArg::Duel => Mode::Duel,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:9001")]
    server: String,

    /// Game mode; asked interactively when omitted
    #[arg(short = 'm', long, value_enum)]
    mode: Option<ModeArg>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut prompt = Prompt::new(tokio::io::stdin());

    let mode = match args.mode {
        Some(mode) => mode.into(),
        None => match prompt.ask_until("Two Player? (y/n)\n", parse_mode_answer).await? {
            Some(mode) => mode,
            None => return Ok(()),
        },
    };

    info!("Connecting to: {}", args.server);
    let stream = TcpStream::connect(&args.server).await?;
    stream.set_nodelay(true)?;
    let mut session = Session::new(stream);

    match play(&mut session, &mut prompt, mode).await? {
        SessionEnd::GameOver { last_notice } => {
            info!("Game finished, last notice: {:?}", last_notice)
        }
        SessionEnd::Closed => info!("Connection closed by server"),
    }

    Ok(())
}
