//! Hand-written conclusions for each rating.

use crate::errors::{self, Result};
use crate::filter::{MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BUILTIN_CONCLUSIONS: &str = include_str!("../assets/conclusions.json");

/// How per-rating summaries get their words and conclusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConclusionMode {
    /// Look up the conclusion table.
    #[default]
    Static,
    /// Compute dominant words from the reviews themselves.
    Live,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Conclusion {
    pub words: Vec<String>,
    pub conclusion: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConclusionTable {
    entries: BTreeMap<u8, Conclusion>,
}

impl ConclusionTable {
    /// Parse a JSON object keyed by rating; every rating must be present.
    pub fn parse(data: &str) -> Result<ConclusionTable> {
        let entries: BTreeMap<u8, Conclusion> = serde_json::from_str(data)?;
        for rating in MIN_RATING..=MAX_RATING {
            if !entries.contains_key(&rating) {
                return Err(errors::bad_data(format!(
                    "conclusion table has no entry for rating {rating}"
                )));
            }
        }
        Ok(ConclusionTable { entries })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ConclusionTable> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|e| {
            errors::data_source_unavailable(format!("{}: {e}", path.display()))
        })?;
        ConclusionTable::parse(&data)
    }

    pub fn builtin() -> ConclusionTable {
        ConclusionTable::parse(BUILTIN_CONCLUSIONS).expect("built-in conclusion table is valid")
    }

    pub fn get(&self, rating: u8) -> Option<&Conclusion> {
        self.entries.get(&rating)
    }
}

impl Default for ConclusionTable {
    fn default() -> Self {
        ConclusionTable::builtin()
    }
}
