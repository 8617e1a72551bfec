//! Word frequencies over review texts.

use itertools::Itertools;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

const BUILTIN_STOPWORDS: &str = include_str!("../assets/stopwords.txt");

/// Shortest token that counts as a word.
pub const MIN_WORD_LENGTH: usize = 3;

/// Filler words left out of the human-readable reasons sentence.
pub const REASON_EXCLUSIONS: &[&str] = &["the", "and", "was", "very", "also", "just", "really"];

/// How many words go into the reasons sentence.
pub const REASON_WORDS: usize = 5;

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b[a-z]{{{MIN_WORD_LENGTH},}}\b")).expect("valid word pattern")
});

static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    BUILTIN_STOPWORDS
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase alphabetic words of at least [MIN_WORD_LENGTH] letters.
///
/// A word must be delimited by non-word characters on both sides,
/// so `abc123` yields nothing.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> {
    let text = text.to_lowercase();
    WORD.find_iter(&text)
        .map(|m| m.as_str().to_owned())
        .collect_vec()
        .into_iter()
}

/// Counts words in order of first appearance.
#[derive(Default)]
pub struct WordCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, u64)>,
}

impl WordCounter {
    pub fn new() -> WordCounter {
        WordCounter::default()
    }

    pub fn feed_text(&mut self, text: &str) {
        for word in tokenize(text) {
            if is_stopword(&word) {
                continue;
            }
            match self.index.get(&word) {
                Some(&i) => self.counts[i].1 += 1,
                None => {
                    self.index.insert(word.clone(), self.counts.len());
                    self.counts.push((word, 1));
                }
            }
        }
    }

    /// Most frequent words first; equal counts keep their first-seen order.
    pub fn top(self, n: usize) -> Vec<(String, u64)> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
    }
}

/// The `n` most frequent non-stopwords of the texts.
pub fn frequencies<'a, I>(texts: I, n: usize) -> Vec<(String, u64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counter = WordCounter::new();
    for text in texts {
        counter.feed_text(text);
    }
    counter.top(n)
}

pub fn dominant_words<'a, I>(texts: I, n: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    frequencies(texts, n)
        .into_iter()
        .map(|(w, _)| w)
        .collect_vec()
}

/// A one-line explanation built from the leading dominant words.
pub fn reasons_sentence(words: &[String]) -> String {
    let reasons = words
        .iter()
        .filter(|w| !REASON_EXCLUSIONS.contains(&w.as_str()))
        .take(REASON_WORDS)
        .collect_vec();
    if reasons.is_empty() {
        "No recurring themes in these reviews.".to_owned()
    } else {
        format!(
            "Reviewers most often mention {}.",
            reasons.iter().join(", ")
        )
    }
}
