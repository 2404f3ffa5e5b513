//! Segmenter: tokenizes normalized IPA text into phoneme occurrences, and the
//! H-Corrector that follows it.
//!
//! The character-scan in `scan` advances by a window width that depends on
//! tie bars and length markers; `ipa_to_phonemes` then builds word/syllable
//! structure, English aspiration insertion, and pre-stop gap insertion on
//! top of that token stream.

use crate::frame::AcousticFrame;
use crate::table::{PhonemeClass, PhonemeEntry, PhonemeTable};
use crate::unit::{Annotations, PendingStress, SilenceKind, SilenceTiming, Unit};

const TIE_BAR: char = '\u{361}';
const LENGTH_MARK: char = 'ː';
const PRIMARY_STRESS: char = 'ˈ';
const SECONDARY_STRESS: char = 'ˌ';

struct ScannedPhoneme<'a> {
    entry: &'a PhonemeEntry,
    stress: u8,
    tied_to: bool,
    tied_from: bool,
    lengthened: bool,
    char: Option<char>,
}

/// One tokenizer tick: either a mapped phoneme, or `None` for an unmapped
/// character (dropped downstream, never rejected).
enum Scanned<'a> {
    Mapped(ScannedPhoneme<'a>),
    Unmapped,
}

/// Tokenize `text` against `table`, yielding one entry per consumed window.
/// Space characters are *not* yielded (the caller tracks word boundaries by
/// splitting on them beforehand via [`scan`]'s caller).
fn scan<'a>(text: &str, table: &'a PhonemeTable) -> Vec<(char, Scanned<'a>)> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = Vec::new();
    let mut pos = 0usize;
    let mut pending = PendingStress::Idle;

    while pos < len {
        let c = chars[pos];
        if c == PRIMARY_STRESS {
            pending = PendingStress::Seen(1);
            pos += 1;
            continue;
        }
        if c == SECONDARY_STRESS {
            pending = PendingStress::Seen(2);
            pos += 1;
            continue;
        }

        let next = chars.get(pos + 1).copied();
        let is_tied_to = next == Some(TIE_BAR);
        let is_lengthened = next == Some(LENGTH_MARK);
        let is_tied_from = pos > 0 && chars[pos - 1] == TIE_BAR;

        let mut entry = None;
        let mut consumed = 1usize;

        if is_tied_to {
            if pos + 3 <= len {
                let window: String = chars[pos..pos + 3].iter().collect();
                entry = table.get(&window);
            }
            consumed = if entry.is_some() { 3 } else { 2 };
        } else if is_lengthened {
            if pos + 2 <= len {
                let window: String = chars[pos..pos + 2].iter().collect();
                entry = table.get(&window);
            }
            consumed = 2;
        }

        if entry.is_none() {
            entry = table.get(&c.to_string());
        }

        let Some(entry) = entry else {
            log::debug!("segmenter: unmapped symbol {c:?} dropped, no table entry");
            out.push((c, Scanned::Unmapped));
            pos += consumed;
            continue;
        };

        let stress = pending.take();
        out.push((
            c,
            Scanned::Mapped(ScannedPhoneme {
                entry,
                stress,
                tied_to: !is_tied_from && is_tied_to,
                tied_from: is_tied_from,
                lengthened: is_lengthened,
                char: Some(c),
            }),
        ));
        pos += consumed;
    }

    out
}

fn annotations_from(entry: &PhonemeEntry, scanned: &ScannedPhoneme) -> Annotations {
    let class: PhonemeClass = entry.class;
    Annotations {
        is_vowel: class.is_vowel,
        is_voiced: class.is_voiced,
        is_stop: class.is_stop,
        is_affricate: class.is_affricate,
        is_liquid: class.is_liquid,
        is_nasal: class.is_nasal,
        is_semivowel: class.is_semivowel,
        is_tap: class.is_tap,
        is_trill: class.is_trill,
        stress: 0,
        syllable_start: false,
        word_start: false,
        tied_to: scanned.tied_to,
        tied_from: scanned.tied_from,
        lengthened: scanned.lengthened,
        post_stop_aspiration: false,
        copy_adjacent: class.copy_adjacent,
        defined_frame_fields: std::collections::HashSet::new(),
        char: scanned.char,
        duration_ms: 0.0,
        fade_duration_ms: 0.0,
        voice_pitch: 0.0,
        end_voice_pitch: 0.0,
    }
}

fn make_aspiration_unit(h_entry: &PhonemeEntry) -> Unit {
    let mut a = Annotations::default();
    a.is_voiced = h_entry.class.is_voiced;
    a.post_stop_aspiration = true;
    a.copy_adjacent = true;
    a.char = None;
    a.defined_frame_fields = h_entry.defined_frame_fields.clone();
    Unit::Phoneme(h_entry.frame, a)
}

/// Segment normalized IPA text into ordered units: word/syllable marking,
/// English post-stop aspiration insertion, and pre-stop gap insertion.
pub fn ipa_to_phonemes(text: &str, language: Option<&str>, table: &PhonemeTable) -> Vec<Unit> {
    let tag = crate::lang::normalize_tag(language);
    let is_english = crate::lang::is_english(&tag);

    let mut units: Vec<Unit> = Vec::new();
    let mut new_word = true;
    // Mirrors the source's `lastPhoneme`/`syllableStartPhoneme` variables:
    // indices into `units` of the two most recently relevant real phonemes.
    let mut last_index: Option<usize> = None;
    let mut syllable_start_index: Option<usize> = None;

    for (c, scanned) in scan(text, table) {
        if c == ' ' {
            new_word = true;
            continue;
        }
        let ScannedPhoneme {
            entry,
            stress,
            tied_to,
            tied_from,
            lengthened,
            char,
        } = match scanned {
            Scanned::Mapped(p) => p,
            Scanned::Unmapped => continue,
        };
        let scanned_for_annotations = ScannedPhoneme {
            entry,
            stress: 0,
            tied_to,
            tied_from,
            lengthened,
            char,
        };
        let mut annotations = annotations_from(entry, &scanned_for_annotations);

        let last_is_vowel = last_index.map(|i| units[i].is_vowel()).unwrap_or(false);
        let last_exists = last_index.is_some();

        if last_exists && !last_is_vowel && annotations.is_vowel {
            let i = last_index.unwrap();
            if let Some(a) = units[i].annotations_mut() {
                a.syllable_start = true;
            }
            syllable_start_index = Some(i);
        } else if stress == 1 && last_exists && last_is_vowel {
            annotations.syllable_start = true;
            // `syllable_start_index` is finalized once this phoneme's index
            // is known, right before the final `stress`/gap decision below.
        }
        let current_is_syllable_start_by_hiatus = annotations.syllable_start && stress == 1;

        if is_english {
            if let Some(i) = last_index {
                let last_ok = units[i]
                    .annotations()
                    .map(|a| a.is_stop && !a.is_voiced)
                    .unwrap_or(false);
                if last_ok && annotations.is_voiced && !annotations.is_stop && !annotations.is_affricate
                {
                    let h_entry = table
                        .get("h")
                        .expect("embedded table must define 'h' for aspiration insertion");
                    units.push(make_aspiration_unit(h_entry));
                    last_index = Some(units.len() - 1);
                }
            }
        }

        if new_word {
            new_word = false;
            annotations.word_start = true;
            annotations.syllable_start = true;
        }

        let is_stop_or_affricate = annotations.is_stop || annotations.is_affricate;

        // Decide the pre-stop gap *before* pushing the phoneme, so indices
        // never shift under us (the source inserts a sibling record; we just
        // push both in final order).
        if stress == 0 && is_stop_or_affricate {
            units.push(Unit::Silence(SilenceKind::PreStopGap, SilenceTiming::default()));
        }

        let frame: AcousticFrame = entry.frame;
        units.push(Unit::Phoneme(frame, annotations));
        let this_index = units.len() - 1;

        if current_is_syllable_start_by_hiatus || units[this_index]
            .annotations()
            .map(|a| a.word_start)
            .unwrap_or(false)
        {
            syllable_start_index = Some(this_index);
        }

        if stress != 0 {
            let target = syllable_start_index.unwrap_or(this_index);
            if let Some(a) = units[target].annotations_mut() {
                a.stress = stress;
            }
        }

        last_index = Some(this_index);
    }

    units
}

/// H-Corrector: phonemes marked `copy_adjacent` (currently only inserted
/// aspiration) fill in every frame field their own table row left undefined
/// from the next non-silence neighbour, falling back to the previous one.
/// Fields the row defined for itself (e.g. `/h/`'s own `cf1`/`cf2`/
/// `aspiration_amplitude`) are left untouched.
pub fn correct_h_phonemes(units: &mut [Unit]) {
    let len = units.len();
    for index in 0..len {
        let needs_copy = matches!(&units[index], Unit::Phoneme(_, a) if a.copy_adjacent);
        if !needs_copy {
            continue;
        }
        let next_frame = units
            .get(index + 1)
            .and_then(|u| match u {
                Unit::Phoneme(frame, _) => Some(*frame),
                Unit::Silence(..) => None,
            });
        let prev_frame = if index > 0 {
            match &units[index - 1] {
                Unit::Phoneme(frame, _) => Some(*frame),
                Unit::Silence(..) => None,
            }
        } else {
            None
        };
        if let Some(neighbor) = next_frame.or(prev_frame) {
            if let Unit::Phoneme(frame, annotations) = &mut units[index] {
                *frame = frame.merge_undefined_from(&annotations.defined_frame_fields, &neighbor);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PhonemeTable {
        PhonemeTable::embedded()
    }

    #[test]
    fn empty_text_yields_no_units() {
        assert!(ipa_to_phonemes("", Some("en"), table()).is_empty());
    }

    #[test]
    fn consonant_before_vowel_is_syllable_start() {
        let units = ipa_to_phonemes("pi", Some("en"), table());
        let Unit::Phoneme(_, a) = &units[0] else { panic!("expected phoneme") };
        assert!(a.syllable_start);
    }

    #[test]
    fn stop_gets_a_pre_stop_gap_inserted() {
        let units = ipa_to_phonemes("pi", Some("en"), table());
        assert!(matches!(units[0], Unit::Silence(SilenceKind::PreStopGap, _)));
    }

    #[test]
    fn english_aspiration_inserted_after_voiceless_stop_before_voiced() {
        // p (voiceless stop) + i (voiced vowel) -> synthetic 'h' aspiration in between.
        let units = ipa_to_phonemes("pi", Some("en"), table());
        let has_aspiration = units
            .iter()
            .any(|u| matches!(u, Unit::Phoneme(_, a) if a.post_stop_aspiration));
        assert!(has_aspiration);
    }

    #[test]
    fn tied_diphthong_marks_onset_and_offglide() {
        let units = ipa_to_phonemes("ɑ͡ɪ", Some("en"), table());
        let phonemes: Vec<&Annotations> = units
            .iter()
            .filter_map(|u| u.annotations())
            .collect();
        assert!(phonemes.iter().any(|a| a.tied_to));
        assert!(phonemes.iter().any(|a| a.tied_from));
    }

    #[test]
    fn word_start_marks_first_phoneme_of_each_word() {
        let units = ipa_to_phonemes("pi ti", Some("en"), table());
        let word_starts: Vec<_> = units
            .iter()
            .filter_map(|u| u.annotations())
            .filter(|a| a.word_start)
            .collect();
        assert_eq!(word_starts.len(), 2);
    }

    #[test]
    fn unmapped_character_is_silently_dropped() {
        let units = ipa_to_phonemes("p\u{2603}i", Some("en"), table());
        // Snowman has no table entry; only p/i (plus aspiration/gap) remain.
        assert!(units.iter().all(|u| u.annotations().is_none()
            || u.annotations().unwrap().char != Some('\u{2603}')));
    }

    #[test]
    fn correct_h_phonemes_keeps_its_own_fields_and_copies_the_rest_from_next_neighbour() {
        let mut units = ipa_to_phonemes("pi", Some("en"), table());
        correct_h_phonemes(&mut units);
        let aspiration = units
            .iter()
            .find(|u| matches!(u, Unit::Phoneme(_, a) if a.post_stop_aspiration))
            .unwrap();
        let Unit::Phoneme(frame, _) = aspiration else { unreachable!() };
        let h_entry = table().get("h").unwrap();
        let i_entry = table().get("i").unwrap();
        // cf1 is one of /h/'s own defined fields; the merge leaves it alone.
        assert_eq!(frame.cf1, h_entry.frame.cf1);
        // cf3 is left at AcousticFrame::default() by /h/'s table row, so the
        // H-Corrector fills it in from the following vowel instead.
        assert_eq!(frame.cf3, i_entry.frame.cf3);
    }
}
