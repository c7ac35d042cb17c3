//! Console prompts and validation of what the player types

use shared::Mode;
use std::collections::BTreeSet;
use std::io::Write;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Please enter y/n")]
    NotYesNo,
    #[error("Error! Please guess one letter.")]
    NotOneLetter,
    #[error("Error! Letter {0} has been guessed before, please guess another letter.")]
    AlreadyGuessed(char),
}

/// Reads the answer to "Two Player? (y/n)"
pub fn parse_mode_answer(line: &str) -> Result<Mode, InputError> {
    match line.trim() {
        "y" => Ok(Mode::Duel),
        "n" => Ok(Mode::Solo),
        _ => Err(InputError::NotYesNo),
    }
}

/// Reads a single letter guess, lowercased
///
/// Letters in `guessed` are refused before they ever reach the server.
pub fn parse_letter(line: &str, guessed: &BTreeSet<u8>) -> Result<u8, InputError> {
    let mut chars = line.trim().chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(InputError::NotOneLetter);
    };
    if !c.is_ascii_alphabetic() {
        return Err(InputError::NotOneLetter);
    }

    let letter = c.to_ascii_lowercase() as u8;
    if guessed.contains(&letter) {
        return Err(InputError::AlreadyGuessed(c.to_ascii_uppercase()));
    }
    Ok(letter)
}

/// Line-oriented prompt over any async reader, usually stdin
pub struct Prompt<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> Prompt<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Prints `question` and waits for one line; `None` once input is closed
    pub async fn ask(&mut self, question: &str) -> std::io::Result<Option<String>> {
        print!("{}", question);
        std::io::stdout().flush()?;
        self.lines.next_line().await
    }

    /// Asks until the answer parses, printing the reason for each rejection
    pub async fn ask_until<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Result<T, InputError>,
    ) -> std::io::Result<Option<T>> {
        while let Some(line) = self.ask(question).await? {
            match parse(&line) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => println!("{}", e),
            }
        }
        Ok(None)
    }
}
