//! Spelling correction: a pluggable, trait-based corrector behind the
//! `/spelling/correct-spelling` endpoint.
//!
//! Default: `DictionaryCorrector`, a frequency-ranked dictionary searched at
//! edit distance one, then two. `AppState` holds an `Arc<dyn SpellingCorrector>`
//! so a different backend can be swapped in at startup.

pub mod handlers;

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

const BUNDLED_WORDS: &str = include_str!("../../data/words.txt");
const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

pub trait SpellingCorrector: Send + Sync {
    fn is_known(&self, word: &str) -> bool;

    /// Most likely intended spelling of `word`, if any candidate is known.
    fn correct(&self, word: &str) -> Option<String>;
}

/// Splits `text` on whitespace, replaces every unknown word that has a
/// suggestion, and rejoins with single spaces.
pub fn correct_text(corrector: &dyn SpellingCorrector, text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            if corrector.is_known(word) {
                word.to_string()
            } else {
                corrector
                    .correct(word)
                    .unwrap_or_else(|| word.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct DictionaryCorrector {
    frequencies: HashMap<String, u64>,
}

impl DictionaryCorrector {
    pub fn bundled() -> Self {
        Self::from_frequency_list(BUNDLED_WORDS)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
        let corrector = Self::from_frequency_list(&text);
        info!(
            "Loaded {} dictionary words from {}",
            corrector.len(),
            path.display()
        );
        Ok(corrector)
    }

    /// Parses `word [count]` lines. Blank lines and `#` comments are skipped.
    /// A line without a count ranks by position, earlier meaning more common.
    pub fn from_frequency_list(text: &str) -> Self {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        let total = lines.len() as u64;
        let mut frequencies = HashMap::with_capacity(lines.len());
        for (rank, line) in lines.into_iter().enumerate() {
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };
            let count = parts
                .next()
                .and_then(|c| c.parse::<u64>().ok())
                .unwrap_or(total - rank as u64);

            let entry = frequencies.entry(word.to_lowercase()).or_insert(0);
            *entry = (*entry).max(count);
        }

        Self { frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    fn best_known<I: IntoIterator<Item = String>>(&self, candidates: I) -> Option<String> {
        candidates
            .into_iter()
            .filter_map(|w| self.frequencies.get(&w).map(|&count| (w, count)))
            // highest count wins; ties go to the alphabetically first word
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(word, _)| word)
    }
}

impl SpellingCorrector for DictionaryCorrector {
    fn is_known(&self, word: &str) -> bool {
        self.frequencies.contains_key(&word.to_lowercase())
    }

    fn correct(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        if self.frequencies.contains_key(&word) {
            return Some(word);
        }

        let first = edits1(&word);
        if let Some(best) = self.best_known(first.iter().cloned()) {
            return Some(best);
        }

        let second: HashSet<String> = first.iter().flat_map(|w| edits1(w)).collect();
        self.best_known(second)
    }
}

/// Every string one delete, transpose, replace, or insert away from `word`.
fn edits1(word: &str) -> HashSet<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = HashSet::new();

    for i in 0..=chars.len() {
        let (left, right) = chars.split_at(i);
        let left: String = left.iter().collect();

        if !right.is_empty() {
            out.insert(format!("{left}{}", right[1..].iter().collect::<String>()));
        }
        if right.len() > 1 {
            out.insert(format!(
                "{left}{}{}{}",
                right[1],
                right[0],
                right[2..].iter().collect::<String>()
            ));
        }
        for c in ALPHABET.chars() {
            if !right.is_empty() {
                out.insert(format!(
                    "{left}{c}{}",
                    right[1..].iter().collect::<String>()
                ));
            }
            out.insert(format!("{left}{c}{}", right.iter().collect::<String>()));
        }
    }

    out.remove(word);
    out
}
