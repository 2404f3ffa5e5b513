//! Language tag resolution shared by the Normalizer's dialect gating and the
//! Timer's stress-slowdown table.

use std::collections::HashMap;

/// Canonicalize a raw language tag: underscores to hyphens, lowercased, and
/// `None`/empty treated as `""` (which every resolver below maps to the
/// `"default"` row).
pub fn normalize_tag(tag: Option<&str>) -> String {
    tag.unwrap_or("").replace('_', "-").to_lowercase()
}

/// Resolve `tag` against `table` by progressively trimming trailing
/// hyphen-separated segments (`"en-us"` → `"en-us"` → `"en"` → `"default"`),
/// a BCP-47-ish fallback shared by the per-language stress table and the
/// Normalizer's dialect gating. `table` must define a `"default"` row.
pub fn resolve_lang_table<'a, T>(tag: &str, table: &'a HashMap<&str, T>) -> &'a T {
    let mut candidate = tag;
    loop {
        if let Some(value) = table.get(candidate) {
            return value;
        }
        match candidate.rfind('-') {
            Some(idx) => candidate = &candidate[..idx],
            None => break,
        }
    }
    table
        .get("default")
        .expect("language table must define a \"default\" entry")
}

pub fn is_english(tag: &str) -> bool {
    tag.is_empty() || tag.starts_with("en")
}

pub fn is_portuguese(tag: &str) -> bool {
    tag.starts_with("pt")
}

pub fn is_hungarian(tag: &str) -> bool {
    tag.starts_with("hu")
}

pub fn is_german(tag: &str) -> bool {
    tag.starts_with("de")
}

pub fn is_french(tag: &str) -> bool {
    tag.starts_with("fr")
}

pub fn is_danish(tag: &str) -> bool {
    tag.starts_with("da")
}

pub fn is_romanian(tag: &str) -> bool {
    tag.starts_with("ro")
}

pub fn is_polish(tag: &str) -> bool {
    tag.starts_with("pl")
}

pub fn is_spanish(tag: &str) -> bool {
    tag.starts_with("es")
}

pub fn is_italian(tag: &str) -> bool {
    tag.starts_with("it")
}

/// English dialects that keep a rhotic /r/ in coda position: `en`, `en-gb`,
/// and `en-uk` are non-rhotic; every other `en-*` tag is rhotic. An empty tag
/// is not English here (matching the Normalizer's and Timer's
/// `tag.starts_with("en")` check, not the Segmenter's empty-is-English
/// default).
pub fn is_rhotic_english(tag: &str) -> bool {
    tag.starts_with("en") && !(tag == "en" || tag.starts_with("en-gb") || tag.starts_with("en-uk"))
}
