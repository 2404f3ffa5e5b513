//! Normalizer: turns raw eSpeak-flavoured phoneme/IPA text into a stable IPA
//! stream the Segmenter can tokenize against the phoneme table.
//!
//! Every rewrite target and its ordering relative to the others is
//! load-bearing (later passes can depend on substitutions made by earlier
//! ones), so the sequence below is deliberate rather than a tidier
//! regrouping.

use crate::lang;
use crate::table::PhonemeTable;

struct LangFlags {
    tag: String,
    is_english: bool,
    is_rhotic_english: bool,
    is_non_rhotic_english: bool,
    is_hungarian: bool,
    is_polish: bool,
    is_spanish: bool,
    is_portuguese: bool,
    is_french: bool,
    is_german: bool,
    is_italian: bool,
    is_danish: bool,
    is_romanian: bool,
}

impl LangFlags {
    fn resolve(language: Option<&str>) -> Self {
        let tag = lang::normalize_tag(language);
        // Strict `starts_with("en")`, not `lang::is_english`'s
        // empty-tag-is-English default — an unrecognised/empty tag takes
        // the `default` cadence, not the English normalization path (§7).
        let is_english = tag.starts_with("en");
        let is_rhotic_english = lang::is_rhotic_english(&tag);
        let is_non_rhotic_english = is_english && !is_rhotic_english;
        LangFlags {
            is_english,
            is_rhotic_english,
            is_non_rhotic_english,
            is_hungarian: lang::is_hungarian(&tag),
            is_polish: lang::is_polish(&tag),
            is_spanish: lang::is_spanish(&tag),
            is_portuguese: lang::is_portuguese(&tag),
            is_french: lang::is_french(&tag),
            is_german: lang::is_german(&tag),
            is_italian: lang::is_italian(&tag),
            is_danish: lang::is_danish(&tag),
            is_romanian: lang::is_romanian(&tag),
            tag,
        }
    }
}

/// Apply `pairs` to `text` in order, each replacement building on the
/// previous one's output (not a single simultaneous pass).
fn apply_sequential(mut text: String, pairs: &[(&str, String)]) -> String {
    for (from, to) in pairs {
        if !from.is_empty() {
            text = text.replace(from, to.as_str());
        }
    }
    text
}

/// Replace every `R` at the start of the text or right after whitespace with
/// `x` (Brazilian Portuguese word-initial strong R).
fn replace_word_initial_r(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_boundary = true;
    for ch in text.chars() {
        if ch == 'R' && at_boundary {
            out.push('x');
        } else {
            out.push(ch);
        }
        at_boundary = ch.is_whitespace();
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pick `preferred` if the table defines it, otherwise fall back to
/// `fallback` and log the degradation — one of the "guarded by
/// table-membership tests" approximations described in spec §7; the
/// substitution itself is silent to the caller, but worth a diagnostic.
fn table_fallback<'a>(table: &PhonemeTable, preferred: &'a str, fallback: &'a str) -> &'a str {
    if table.contains(preferred) {
        preferred
    } else {
        log::debug!("normalizer: table lacks {preferred:?}, falling back to {fallback:?}");
        fallback
    }
}

fn build_multi_map(f: &LangFlags, table: &PhonemeTable) -> Vec<(String, String)> {
    let mut multi: Vec<(String, String)> = Vec::new();
    let set = |m: &mut Vec<(String, String)>, k: &str, v: &str| {
        if let Some(existing) = m.iter_mut().find(|(key, _)| key == k) {
            existing.1 = v.to_string();
        } else {
            m.push((k.to_string(), v.to_string()));
        }
    };

    set(&mut multi, "**", "ɾ");
    set(&mut multi, "*", "ɾ");
    set(&mut multi, "tʃ", "t͡ʃ");
    set(&mut multi, "dʒ", "d͡ʒ");
    set(&mut multi, "tɕ", "t͡ɕ");
    set(&mut multi, "dʑ", "d͡ʑ");
    set(&mut multi, "t͡S", "t͡ʃ");
    set(&mut multi, "d͡Z", "d͡ʒ");
    set(&mut multi, "ts", "t͡s");
    set(&mut multi, "dz", "d͡z");
    set(&mut multi, "S;", "ɕ");
    set(&mut multi, "Z;", "ʑ");
    set(&mut multi, "ts;", "t͡ɕ");
    set(&mut multi, "dz;", "d͡ʑ");
    set(&mut multi, "n^", "ɲ");
    set(&mut multi, "l^", "ʎ");
    set(&mut multi, "lj", if f.is_portuguese { "ʎ" } else { "lj" });
    set(&mut multi, "RR2", "r");
    set(&mut multi, "R2", "r");
    set(&mut multi, "I2", "ɪ");
    set(
        &mut multi,
        "I#",
        if f.is_english && f.is_rhotic_english { "ᵻ" } else { "ɪ" },
    );
    set(
        &mut multi,
        "I2#",
        if f.is_english && f.is_rhotic_english { "ᵻ" } else { "ɪ" },
    );
    set(&mut multi, "e#", "ɛ");
    set(&mut multi, "@L", "əl");

    if f.is_german {
        set(&mut multi, "C", if table.contains("ç") { "ç" } else { "x" });
    }

    if f.is_portuguese {
        set(&mut multi, "rr", "x");
        set(&mut multi, "aI", "a͡i");
        set(&mut multi, "eI", "e͡i");
        set(&mut multi, "oI", "o͡i");
        set(&mut multi, "aU", "a͡u");
        set(&mut multi, "eU", "e͡u");
        set(&mut multi, "EU", "ɛ͡u");
        set(&mut multi, "ow", "o͡u");
    }

    if f.is_hungarian {
        set(&mut multi, "eː", "ᴇː");
        set(&mut multi, "Aː", "A");
    }

    set(&mut multi, "tS", "t͡ʃ");
    set(&mut multi, "dZ", "d͡ʒ");

    if f.is_english {
        set(&mut multi, "aI", "ɑ͡ɪ");
        set(&mut multi, "aU", "ɑ͡ʊ");
        set(&mut multi, "OI", "ɔ͡ɪ");
        set(&mut multi, "aa", if f.is_rhotic_english { "æ" } else { "ɑː" });
        set(&mut multi, "oU", if f.is_rhotic_english { "o͡ʊ" } else { "ə͡ʊ" });
        set(&mut multi, "eI", if f.is_rhotic_english { "e͡i" } else { "e͡ɪ" });
        if f.is_rhotic_english {
            set(&mut multi, "t#", "ɾ");
            set(&mut multi, "d#", "ɾ");
        }
    }

    if f.is_english && f.is_rhotic_english {
        set(&mut multi, "ɜː", "ɝː");
        set(&mut multi, "ɜ", "ɝ");
    }

    if f.is_english {
        if f.is_rhotic_english {
            set(&mut multi, "3ː", "ɝː");
            set(&mut multi, "3", "ɚ");
            set(&mut multi, "A@", "ɑɹ");
            set(&mut multi, "O@", "ɔːɹ");
            set(&mut multi, "o@", "ɔːɹ");
            set(&mut multi, "i@3", "ɪɹ");
            set(&mut multi, "i@", "ɪɹ");
            set(&mut multi, "e@", "ɛɹ");
        } else {
            set(&mut multi, "3ː", "ɜː");
            set(&mut multi, "3", "ə");
            set(&mut multi, "A@", "ɑː");
            set(&mut multi, "O@", if table.contains("O") { "Oː" } else { "ɔː" });
            set(&mut multi, "o@", if table.contains("O") { "Oː" } else { "ɔː" });
            set(&mut multi, "i@3", "ɪə");
            set(&mut multi, "i@", "ɪə");
            set(&mut multi, "e@", "ɛə");
        }
    }

    if f.is_german {
        set(&mut multi, "ɐ", "ɐ");
        set(&mut multi, "ɐ̯", "ɐ");
        set(&mut multi, "R2", "ɐ");
        set(&mut multi, "@2", "ɐ");
    }

    // Sort descending by character length so longer windows match first;
    // stable sort preserves the insertion order above among same-length keys.
    multi.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    multi
}

fn build_ascii_pairs(f: &LangFlags, table: &PhonemeTable) -> Vec<(String, String)> {
    let mut ascii: Vec<(String, String)> = Vec::new();
    let set = |m: &mut Vec<(String, String)>, k: &str, v: &str| {
        if let Some(existing) = m.iter_mut().find(|(key, _)| key == k) {
            existing.1 = v.to_string();
        } else {
            m.push((k.to_string(), v.to_string()));
        }
    };

    set(&mut ascii, "@", "ə");
    set(&mut ascii, "E", "ɛ");
    set(
        &mut ascii,
        "O",
        if f.is_portuguese && table.contains("ᴐ") {
            "ᴐ"
        } else if f.is_english && f.is_non_rhotic_english && table.contains("O") {
            "O"
        } else {
            "ɔ"
        },
    );
    set(&mut ascii, "V", "ʌ");
    set(&mut ascii, "U", if f.is_portuguese { "u" } else { "ʊ" });
    set(&mut ascii, "I", if f.is_portuguese { "i" } else { "ɪ" });
    set(&mut ascii, "J", "j");
    set(&mut ascii, "?", if table.contains("ʔ") { "ʔ" } else { "" });
    set(&mut ascii, "N", "ŋ");
    set(&mut ascii, "T", "θ");
    set(&mut ascii, "D", "ð");
    set(&mut ascii, "B", "b");
    set(&mut ascii, "Q", "g");
    set(&mut ascii, "x", if f.is_german { "x" } else { "h" });
    set(&mut ascii, "&", "ɐ");
    set(&mut ascii, "Y", "ø");
    set(&mut ascii, "W", "œ");

    if f.is_portuguese {
        set(&mut ascii, "y", "j");
    }

    if f.is_hungarian {
        set(&mut ascii, "a", "ᴀ");
        set(&mut ascii, "A", "ᴒ");
    } else {
        set(&mut ascii, "A", "ɑ");
    }

    set(&mut ascii, "S", "ʃ");
    set(&mut ascii, "Z", "ʒ");

    if f.is_polish {
        set(&mut ascii, "R", "r");
    }
    if f.is_portuguese {
        set(&mut ascii, "R", "ɾ");
    }
    if f.is_polish {
        set(&mut ascii, "R", "r");
        set(&mut ascii, "y", "ɨ");
    }
    if f.is_romanian {
        set(&mut ascii, "y", "ɨ");
    }
    if f.is_danish {
        set(&mut ascii, "R", if table.contains("ʁ") { "ʁ" } else { "r" });
    }
    if f.is_german && table.contains("ɐ") {
        set(&mut ascii, "3", "ɐ");
    }
    if f.is_german {
        set(&mut ascii, "C", if table.contains("ç") { "ç" } else { "x" });
    }

    if f.is_english {
        set(&mut ascii, "0", if f.is_rhotic_english { "ɑ" } else { "ɒ" });
    } else {
        set(&mut ascii, "0", "ɒ");
    }

    ascii
}

/// Turn raw phoneme/IPA text into a stable IPA stream the Segmenter can
/// tokenize. Total over all inputs: unrecognised material is dropped, never
/// rejected.
pub fn normalize_ipa(text: &str, language: Option<&str>, table: &PhonemeTable) -> String {
    let f = LangFlags::resolve(language);
    let mut text = text.replace('\u{35c}', "\u{361}");

    for c in ["[", "]", "(", ")", "{", "}", "/", "\\"] {
        text = text.replace(c, "");
    }
    text = text.replace("||", " ");
    text = text.replace('|', "");
    text = text.replace('%', "");
    text = text.replace('=', "");
    text = text.replace('!', "");

    text = text.replace("_:", " ");
    text = text.replace('_', " ");
    text = text.replace('-', "");

    text = text.trim().replace('\'', "ˈ").replace(',', "ˌ");
    text = text.replace(':', "ː");

    if f.is_portuguese {
        text = text.replace("&U~", "ãᴜ");
        text = text.replace("U~", "ᴜ");
        text = text.replace("&~", "ã");
        text = text.replace("a~", "ã");
        text = text.replace("o~", "õ");
        text = text.replace("u~", "ũ");
        text = text.replace("e~", "ẽ");
        text = text.replace("i~", "ĩ");

        text = text.replace("ɐ̃ʊ̃", "ãᴜ");
        text = text.replace("ɐ̃", "ã");
        text = text.replace("ʊ̃", "ᴜ");
    }

    text = text.replace('ʲ', "");
    text = text.replace('\u{303}', "");
    text = text.replace('~', "");

    let multi = build_multi_map(&f, table);

    if f.is_german {
        text = text.replace("ɐ̯", "ɐ");
    }
    if f.is_portuguese {
        text = replace_word_initial_r(&text);
    }

    for (k, v) in &multi {
        text = text.replace(k.as_str(), v.as_str());
    }

    text = text.replace('2', "");

    let ascii = build_ascii_pairs(&f, table);
    for (k, v) in &ascii {
        text = text.replace(k.as_str(), v.as_str());
    }

    if f.is_english && f.is_non_rhotic_english && table.contains("O") {
        text = text.replace('ɔ', "O");
    }
    if f.is_portuguese && table.contains("ᴐ") {
        text = text.replace('ɔ', "ᴐ");
    }

    text = text.replace(';', "");
    text = text.replace('^', "");

    text = text.replace("l̩", "əl");
    text = text.replace("ɫ̩", "əl");
    text = text.replace("ə͡l", "əl");
    text = text.replace("ʊ͡l", "əl");

    if !table.contains("ᵻ") {
        log::debug!("normalizer: table lacks 'ᵻ', falling back to 'ɪ'");
        text = text.replace('ᵻ', "ɪ");
    }

    text = text.replace('˞', "ɹ");
    let syllabic_r_fallback = table_fallback(table, "ɚ", "əɹ");
    text = text.replace("ɹ̩", syllabic_r_fallback);
    text = text.replace("r̩", syllabic_r_fallback);

    if !table.contains("ɚ") {
        log::debug!("normalizer: table lacks 'ɚ', expanding to 'əɹ'");
        text = text.replace('ɚ', "əɹ");
    }
    if !table.contains("ɝ") {
        log::debug!("normalizer: table lacks 'ɝ', expanding to 'ɜɹ'");
        text = text.replace('ɝ', "ɜɹ");
    }

    if f.is_english {
        text = text.replace('r', "ɹ");
    }
    if !f.is_english && (f.is_french || f.is_german) && table.contains("ʁ") {
        text = text.replace('r', "ʁ");
    }

    let x_fallback = if f.is_german && table.contains("x") {
        "x"
    } else {
        if f.is_german {
            log::debug!("normalizer: table lacks 'x', falling back to 'h' for ich-/ach-Laut");
        }
        "h"
    };
    let o_barred_fallback = if table.contains("ɵ") {
        "ɵ"
    } else if table.contains("ø") {
        log::debug!("normalizer: table lacks 'ɵ', falling back to 'ø'");
        "ø"
    } else {
        log::debug!("normalizer: table lacks 'ɵ' and 'ø', falling back to 'o'");
        "o"
    };

    let repl: &[(&str, &str)] = &[
        ("ɕ", table_fallback(table, "ɕ", "ʃ")),
        ("ʑ", table_fallback(table, "ʑ", "ʒ")),
        ("ʂ", table_fallback(table, "ʂ", "ʃ")),
        ("ʐ", table_fallback(table, "ʐ", "ʒ")),
        ("t͡ɕ", table_fallback(table, "t͡ɕ", "t͡ʃ")),
        ("d͡ʑ", table_fallback(table, "d͡ʑ", "d͡ʒ")),
        ("β", "b"),
        ("ɣ", "g"),
        ("x", x_fallback),
        ("ʝ", "j"),
        ("ʎ", table_fallback(table, "ʎ", "l")),
        ("c", "k"),
        ("ɟ", "g"),
        ("ɲ", table_fallback(table, "ɲ", "n")),
        ("ɘ", table_fallback(table, "ɘ", "ə")),
        ("ɵ", o_barred_fallback),
        ("ɤ", table_fallback(table, "ɤ", "ʌ")),
    ];
    for (k, v) in repl {
        text = text.replace(k, v);
    }

    let has_all_nasal_vowels =
        table.contains("ã") && table.contains("õ") && table.contains("ũ");
    if !(f.is_portuguese && has_all_nasal_vowels) {
        text = text
            .replace('ã', "a")
            .replace('ẽ', "e")
            .replace('ĩ', "i")
            .replace('õ', "o")
            .replace('ũ', "u");
    }

    if f.is_english {
        text = text.replace('a', "æ");
    }

    text = text.replace('#', "");

    collapse_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PhonemeTable {
        PhonemeTable::embedded()
    }

    #[test]
    fn strips_wrapper_punctuation_and_utility_codes() {
        let out = normalize_ipa("[h%ə=l|ˈoʊ]", Some("en-us"), table());
        assert!(!out.contains('['));
        assert!(!out.contains('%'));
        assert!(!out.contains('='));
    }

    #[test]
    fn english_diphthong_price_ties_to_open_back_vowel() {
        let out = normalize_ipa("haI", Some("en-us"), table());
        assert!(out.contains("ɑ͡ɪ"));
    }

    #[test]
    fn rhotic_vs_non_rhotic_english_bath_vowel_differs() {
        let us = normalize_ipa("kaast", Some("en-us"), table());
        let gb = normalize_ipa("kaast", Some("en-gb"), table());
        assert!(us.contains('æ'));
        assert!(gb.contains("ɑː"));
    }

    #[test]
    fn english_bare_r_becomes_approximant() {
        let out = normalize_ipa("red", Some("en-us"), table());
        assert!(out.contains('ɹ'));
        assert!(!out.contains('r'));
    }

    #[test]
    fn hungarian_short_a_and_long_a_map_to_distinct_internal_vowels() {
        let out_short = normalize_ipa("A", Some("hu"), table());
        let out_long = normalize_ipa("a:", Some("hu"), table());
        assert!(out_short.contains('ᴒ'));
        assert!(out_long.contains('ᴀ'));
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(normalize_ipa("", Some("en"), table()), "");
    }

    #[test]
    fn collapses_internal_whitespace() {
        let out = normalize_ipa("p   t", Some("en"), table());
        assert_eq!(out, "p t");
    }

    #[test]
    fn stress_and_length_markers_survive() {
        let out = normalize_ipa("'si:", Some("en"), table());
        assert!(out.contains('ˈ'));
        assert!(out.contains('ː'));
    }
}
