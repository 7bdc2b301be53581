//! Typing prompts.

use rand::seq::IndexedRandom;

/// The prompts a fresh server deals from.
pub const DEFAULT_SENTENCES: [&str; 5] = [
    "The quick brown fox jumps over the lazy dog.",
    "Typing fast is a skill worth mastering.",
    "JavaScript powers interactive web experiences.",
    "Socket.IO enables real-time communication.",
    "Frontend and backend must work together.",
];

/// Source of the sentence players type each round.
///
/// Any `FnMut() -> String` closure is a provider, which is how tests pin
/// the prompt sequence.
pub trait SentenceProvider: Send + 'static {
    fn next_sentence(&mut self) -> String;
}

impl<F> SentenceProvider for F
where
    F: FnMut() -> String + Send + 'static,
{
    fn next_sentence(&mut self) -> String {
        self()
    }
}

/// A fixed list of prompts, drawn uniformly at random with repetition.
#[derive(Debug, Clone)]
pub struct SentenceCorpus {
    sentences: Vec<String>,
}

impl SentenceCorpus {
    /// Builds a corpus. Returns `None` if `sentences` is empty.
    pub fn new<I, S>(sentences: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sentences: Vec<String> =
            sentences.into_iter().map(Into::into).collect();
        if sentences.is_empty() {
            return None;
        }
        Some(Self { sentences })
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }
}

impl Default for SentenceCorpus {
    fn default() -> Self {
        Self {
            sentences: DEFAULT_SENTENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SentenceProvider for SentenceCorpus {
    fn next_sentence(&mut self) -> String {
        // Non-empty by construction.
        self.sentences
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default()
    }
}
