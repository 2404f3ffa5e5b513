//! The phoneme table: the external data asset mapping IPA symbols (and a
//! handful of tied-grapheme windows, for affricates) to acoustic parameters
//! and phonological class flags.
//!
//! The table is data, not code, and is meant to be supplied externally for
//! full phonetic coverage. This crate embeds a reduced but genuine fixture
//! covering every symbol the normalizer's rewrite targets, so the pipeline
//! is runnable end to end without a caller having to supply their own table
//! first.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::error::TableError;
use crate::frame::AcousticFrame;

const EMBEDDED_TABLE_JSON: &str = include_str!("table_data.json");

/// Phonological class flags carried by a table entry.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PhonemeClass {
    #[serde(rename = "vowel")]
    pub is_vowel: bool,
    #[serde(rename = "voiced")]
    pub is_voiced: bool,
    #[serde(rename = "stop")]
    pub is_stop: bool,
    #[serde(rename = "affricate")]
    pub is_affricate: bool,
    #[serde(rename = "liquid")]
    pub is_liquid: bool,
    #[serde(rename = "nasal")]
    pub is_nasal: bool,
    #[serde(rename = "semivowel")]
    pub is_semivowel: bool,
    #[serde(rename = "tap")]
    pub is_tap: bool,
    #[serde(rename = "trill")]
    pub is_trill: bool,
    /// Set on entries (currently just `h`) whose own acoustic parameters
    /// are meaningless in isolation and must be copied from a neighbour by
    /// the H-Corrector.
    #[serde(rename = "copy_adjacent")]
    pub copy_adjacent: bool,
}

/// One row of the table: a symbol's base acoustic frame plus its class.
#[derive(Debug, Clone)]
pub struct PhonemeEntry {
    pub class: PhonemeClass,
    pub frame: AcousticFrame,
    /// Names of the `frame` fields this table row actually set, as opposed
    /// to ones silently filled in by [`AcousticFrame`]'s `Default`. The
    /// H-Corrector needs this to tell a field `/h/` genuinely specifies
    /// (its own `cf1`/`cf2`/`aspiration_amplitude`) from one it left blank
    /// for the adjacent vowel to supply.
    pub defined_frame_fields: HashSet<String>,
}

/// On-disk shape of one table row, before its `frame` object is split into
/// a full [`AcousticFrame`] and the set of keys it actually named.
#[derive(Debug, Clone, Deserialize)]
struct RawPhonemeEntry {
    #[serde(default)]
    class: PhonemeClass,
    #[serde(default)]
    frame: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawTable(HashMap<String, RawPhonemeEntry>);

/// A loaded phoneme table, keyed by IPA symbol (including 3-character tied
/// windows such as `"t͡ʃ"` for affricates that get their own combined entry).
#[derive(Debug)]
pub struct PhonemeTable {
    entries: HashMap<String, PhonemeEntry>,
    symbols: HashSet<String>,
}

impl PhonemeTable {
    pub fn from_json(text: &str) -> Result<Self, TableError> {
        let raw: RawTable = serde_json::from_str(text)?;
        if raw.0.is_empty() {
            return Err(TableError::Empty);
        }
        let mut entries = HashMap::with_capacity(raw.0.len());
        for (symbol, raw_entry) in raw.0 {
            let defined_frame_fields = raw_entry.frame.keys().cloned().collect();
            let frame: AcousticFrame =
                serde_json::from_value(serde_json::Value::Object(raw_entry.frame))?;
            entries.insert(
                symbol,
                PhonemeEntry {
                    class: raw_entry.class,
                    frame,
                    defined_frame_fields,
                },
            );
        }
        let symbols = entries.keys().cloned().collect();
        Ok(PhonemeTable { entries, symbols })
    }

    pub fn from_path(path: &std::path::Path) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The crate's embedded default fixture, loaded once.
    pub fn embedded() -> &'static PhonemeTable {
        static TABLE: OnceLock<PhonemeTable> = OnceLock::new();
        TABLE.get_or_init(|| {
            Self::from_json(EMBEDDED_TABLE_JSON)
                .expect("embedded phoneme table asset is well-formed")
        })
    }

    pub fn get(&self, symbol: &str) -> Option<&PhonemeEntry> {
        self.entries.get(symbol)
    }

    /// Precomputed membership test, avoiding a repeated `if x in data` scan.
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries whose class flags satisfy `predicate`, e.g. all
    /// nasals.
    pub fn filter<'a>(
        &'a self,
        predicate: impl Fn(&PhonemeClass) -> bool + 'a,
    ) -> impl Iterator<Item = (&'a str, &'a PhonemeEntry)> + 'a {
        self.entries
            .iter()
            .filter(move |(_, entry)| predicate(&entry.class))
            .map(|(symbol, entry)| (symbol.as_str(), entry))
    }
}
