//! Candidate secret words

use crate::config::ConfigError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared::MAX_FRAME_PAYLOAD;
use std::path::Path;

pub const DEFAULT_WORDS: [&str; 8] = [
    "dog", "cat", "elephant", "wasp", "tiger", "lion", "aardwolf", "boar",
];

/// Anything that can hand out a secret word for a new game
pub trait WordSource {
    fn pick(&mut self) -> Vec<u8>;
}

/// Uniformly random choice from a fixed, validated list
#[derive(Debug)]
pub struct WordList {
    words: Vec<Vec<u8>>,
    rng: StdRng,
}

impl WordList {
    /// Builds a list from raw entries
    ///
    /// Entries are trimmed and lowercased. Blank lines are skipped; anything
    /// that is not purely ASCII letters or does not fit a state frame is
    /// rejected.
    pub fn new<I, S>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words = Vec::new();
        for entry in entries {
            let word = entry.as_ref().trim().to_ascii_lowercase();
            if word.is_empty() {
                continue;
            }
            if !word.bytes().all(|b| b.is_ascii_lowercase()) || word.len() > MAX_FRAME_PAYLOAD {
                return Err(ConfigError::InvalidWord(word));
            }
            words.push(word.into_bytes());
        }

        if words.is_empty() {
            return Err(ConfigError::EmptyWordList);
        }

        Ok(Self {
            words,
            rng: StdRng::from_entropy(),
        })
    }

    /// Reads one word per line from `path`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::WordFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(contents.lines())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for WordList {
    fn default() -> Self {
        Self {
            words: DEFAULT_WORDS.iter().map(|w| w.as_bytes().to_vec()).collect(),
            rng: StdRng::from_entropy(),
        }
    }
}

impl WordSource for WordList {
    fn pick(&mut self) -> Vec<u8> {
        self.words
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_WORDS[0].as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_list_picks_known_word() {
        let mut words = WordList::default();
        assert_eq!(words.len(), DEFAULT_WORDS.len());

        for _ in 0..20 {
            let word = words.pick();
            assert!(DEFAULT_WORDS.iter().any(|w| w.as_bytes() == word.as_slice()));
        }
    }

    #[test]
    fn test_entries_are_normalised() {
        let mut words = WordList::new(["  Cat ", "", "\t"]).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words.pick(), b"cat".to_vec());
    }

    #[test]
    fn test_rejects_non_letters() {
        assert!(matches!(
            WordList::new(["ok", "no-way"]),
            Err(ConfigError::InvalidWord(w)) if w == "no-way"
        ));
    }

    #[test]
    fn test_rejects_oversized_word() {
        let long = "a".repeat(MAX_FRAME_PAYLOAD + 1);
        assert!(matches!(
            WordList::new([long]),
            Err(ConfigError::InvalidWord(_))
        ));
    }

    #[test]
    fn test_rejects_empty_list() {
        let entries: [&str; 0] = [];
        assert!(matches!(
            WordList::new(entries),
            Err(ConfigError::EmptyWordList)
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = WordList::from_file(Path::new("/nonexistent/hangman/words.txt"));
        assert!(matches!(result, Err(ConfigError::WordFile { .. })));
    }
}
