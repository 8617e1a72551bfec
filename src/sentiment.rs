//! Lexicon-based polarity scoring and sentiment labels.

use crate::errors::{self, Result};
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

const BUILTIN_LEXICON: &str = include_str!("../assets/lexicon.tsv");

/// A negated word contributes this multiple of its polarity.
const NEGATION_FACTOR: f64 = -0.5;

/// Words that do not break a negation or intensifier chain.
const ARTICLES: &[&str] = &["a", "an", "the"];

/// Letters, digits and apostrophes, so that `didn't` stays one word.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{Alphabetic}\p{N}']+").expect("valid token pattern"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub const ALL: [Sentiment; 3] = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

    /// Sign rule: exact zero is its own bucket, there is no deadband.
    pub fn from_polarity(polarity: f64) -> Sentiment {
        if polarity > 0.0 {
            Sentiment::Positive
        } else if polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "Positive"),
            Sentiment::Negative => write!(f, "Negative"),
            Sentiment::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Anything that can turn a text into one overall polarity in `[-1, 1]`.
pub trait Scorer {
    fn polarity(&self, text: &str) -> f64;
}

impl<F> Scorer for F
where
    F: Fn(&str) -> f64,
{
    fn polarity(&self, text: &str) -> f64 {
        self(text)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Entry {
    Polarity(f64),
    Intensifier(f64),
    Negation,
}

/// Word polarities together with intensifiers and negations.
#[derive(Clone, Debug)]
pub struct Lexicon {
    entries: HashMap<String, Entry>,
}

impl Lexicon {
    /// Parse a lexicon in the tab-separated `kind, word, value` format.
    ///
    /// Kinds are `p` (polarity), `i` (intensifier) and `n` (negation, no value).
    /// Empty lines and lines starting with `#` are ignored.
    pub fn parse(data: &str) -> Result<Lexicon> {
        let mut entries = HashMap::new();
        for (i, line) in data.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            let bad_line = || errors::bad_data(format!("lexicon line {}: '{line}'", i + 1));
            let (kind, word) = match fields.as_slice() {
                [kind, word, ..] => (*kind, word.to_lowercase()),
                _ => return Err(bad_line()),
            };
            let value = || -> Result<f64> {
                fields
                    .get(2)
                    .and_then(|v| v.parse::<f64>().ok())
                    .ok_or_else(bad_line)
            };
            let entry = match kind {
                "p" => {
                    let p = value()?;
                    if !(-1.0..=1.0).contains(&p) {
                        return Err(bad_line());
                    }
                    Entry::Polarity(p)
                }
                "i" => Entry::Intensifier(value()?),
                "n" => Entry::Negation,
                _ => return Err(bad_line()),
            };
            entries.insert(word, entry);
        }
        debug!(target: "revsent", "lexicon: {} entries", entries.len());
        Ok(Lexicon { entries })
    }

    /// The lexicon shipped with the crate.
    pub fn builtin() -> Lexicon {
        Lexicon::parse(BUILTIN_LEXICON).expect("built-in lexicon is valid")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Lexicon::builtin()
    }
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str().trim_matches('\''))
        .filter(|w| !w.is_empty())
}

impl Scorer for Lexicon {
    /// Mean polarity of the scored words, with intensifiers and negations
    /// applied to the word that follows them.
    fn polarity(&self, text: &str) -> f64 {
        let text = text.to_lowercase();
        let mut total = 0.0;
        let mut scored = 0;
        let mut multiplier = 1.0;
        let mut negated = false;
        for word in words(&text) {
            match self.entries.get(word) {
                Some(Entry::Negation) => negated = true,
                Some(Entry::Intensifier(m)) => multiplier *= m,
                Some(Entry::Polarity(p)) => {
                    let mut p = p * multiplier;
                    if negated {
                        p *= NEGATION_FACTOR;
                    }
                    total += p.clamp(-1.0, 1.0);
                    scored += 1;
                    multiplier = 1.0;
                    negated = false;
                }
                None => {
                    if !ARTICLES.contains(&word) {
                        multiplier = 1.0;
                        negated = false;
                    }
                }
            }
        }
        if scored == 0 {
            0.0
        } else {
            (total / scored as f64).clamp(-1.0, 1.0)
        }
    }
}

/// Assigns sentiment labels, scoring each distinct text only once.
pub struct Labeler<S = Lexicon> {
    scorer: S,
    memo: HashMap<String, Sentiment>,
}

impl Labeler<Lexicon> {
    pub fn builtin() -> Labeler<Lexicon> {
        Labeler::new(Lexicon::builtin())
    }
}

impl<S: Scorer> Labeler<S> {
    pub fn new(scorer: S) -> Labeler<S> {
        Labeler {
            scorer,
            memo: HashMap::new(),
        }
    }

    pub fn label(&mut self, text: &str) -> Sentiment {
        if let Some(&s) = self.memo.get(text) {
            return s;
        }
        let s = Sentiment::from_polarity(self.scorer.polarity(text));
        self.memo.insert(text.to_owned(), s);
        s
    }

    pub fn polarity(&self, text: &str) -> f64 {
        self.scorer.polarity(text)
    }

    /// Number of distinct texts scored so far.
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }
}
