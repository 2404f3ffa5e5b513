//! Timer: assigns each unit a duration and fade, in milliseconds, by
//! walking the segmented sequence once and applying a per-language,
//! per-stress override cascade.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::lang::{self, resolve_lang_table};
use crate::unit::{SilenceKind, Unit};

/// (primary, secondary) stress-slowdown divisors, by language tag. English
/// keeps a more pronounced slowdown on stressed syllables; everything else
/// gets a milder one.
fn stress_slowdown_table() -> &'static HashMap<&'static str, (f64, f64)> {
    static TABLE: OnceLock<HashMap<&'static str, (f64, f64)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("default", (1.4, 1.1)),
            ("en", (1.4, 1.1)),
            ("en-us", (1.4, 1.1)),
            ("en-gb", (1.4, 1.1)),
            ("en-uk", (1.4, 1.1)),
            ("en-ca", (1.4, 1.1)),
            ("en-us-nyc", (1.4, 1.1)),
            ("hu", (1.25, 1.07)),
            ("pl", (1.25, 1.07)),
            ("es", (1.25, 1.07)),
            ("pt", (1.25, 1.07)),
            ("fr", (1.25, 1.07)),
            ("de", (1.25, 1.07)),
            ("it", (1.25, 1.07)),
            ("da", (1.25, 1.07)),
            ("ro", (1.25, 1.07)),
        ])
    })
}

/// Assign `duration_ms`/`fade_duration_ms` on every unit in place, applying
/// the full per-stress, per-language override cascade.
pub fn calculate_phoneme_times(units: &mut [Unit], base_speed: f64, language: Option<&str>) {
    let tag = lang::normalize_tag(language);
    let (primary_div, secondary_div) = *resolve_lang_table(&tag, stress_slowdown_table());
    // Strict `starts_with("en")`, not `lang::is_english`'s empty-tag-is-English
    // default — a malformed/empty tag falls back to `default` cadence.
    let is_english = tag.starts_with("en");
    let is_hungarian = lang::is_hungarian(&tag);

    let mut speed = base_speed;
    let mut last_was_liquid_or_semivowel = false;
    let mut last_tied_to_open_back = false;

    for index in 0..units.len() {
        let next_is_word_start = units
            .get(index + 1)
            .and_then(|u| u.annotations())
            .map(|a| a.word_start)
            .unwrap_or(true);
        let next_is_liquid_or_nasal = units
            .get(index + 1)
            .and_then(|u| u.annotations())
            .map(|a| a.is_liquid || a.is_nasal)
            .unwrap_or(false);
        let next_is_liquid = units
            .get(index + 1)
            .and_then(|u| u.annotations())
            .map(|a| a.is_liquid)
            .unwrap_or(false);

        let Unit::Phoneme(_, annotations) = &mut units[index] else {
            // A gap is a dataless record in the source too: it falls through
            // the same cascade as a phoneme would, hits the `_preStopGap`
            // check before any vowel/consonant branch can apply, and keeps
            // the untouched default fade. Its duration still depends on
            // whatever `speed` the last syllable-start phoneme set.
            let duration = if matches!(units[index], Unit::Silence(SilenceKind::PreStopGap, _)) {
                41.0 / speed
            } else {
                60.0 / speed
            };
            let fade = 10.0 / speed;
            units[index].set_timing(duration, fade);
            last_was_liquid_or_semivowel = false;
            last_tied_to_open_back = false;
            continue;
        };

        if annotations.syllable_start {
            speed = if annotations.stress != 0 {
                if annotations.stress == 1 {
                    base_speed / primary_div
                } else {
                    base_speed / secondary_div
                }
            } else {
                base_speed
            };
        }

        let mut duration = 60.0 / speed;
        let mut fade = 10.0 / speed;

        if annotations.post_stop_aspiration {
            duration = 20.0 / speed;
        } else if annotations.is_tap || annotations.is_trill {
            duration = if annotations.is_trill {
                22.0 / speed
            } else {
                (14.0 / speed).min(14.0)
            };
            fade = 0.001;
        } else if annotations.is_stop {
            duration = (6.0 / speed).min(6.0);
            fade = 0.001;
        } else if annotations.is_affricate {
            duration = 24.0 / speed;
            fade = 0.001;
        } else if !annotations.is_voiced {
            duration = 45.0 / speed;
        } else if annotations.is_vowel {
            if last_was_liquid_or_semivowel {
                fade = 25.0 / speed;
            }
            if annotations.tied_to {
                duration = if is_english && annotations.char == Some('ɑ') {
                    42.0 / speed
                } else {
                    40.0 / speed
                };
            } else if annotations.tied_from {
                if is_english
                    && matches!(annotations.char, Some('ɪ') | Some('ʊ'))
                    && last_tied_to_open_back
                {
                    duration = 24.0 / speed;
                    fade = 18.0 / speed;
                } else {
                    duration = 20.0 / speed;
                    fade = 20.0 / speed;
                }
            } else if speed == base_speed
                && !annotations.syllable_start
                && !next_is_word_start
                && next_is_liquid_or_nasal
            {
                duration = if next_is_liquid { 30.0 / speed } else { 40.0 / speed };
            }
        } else {
            duration = 30.0 / speed;
            if annotations.is_liquid || annotations.is_semivowel {
                fade = 20.0 / speed;
            }
        }

        if is_hungarian && annotations.is_vowel && annotations.char == Some('ᴒ') && !annotations.lengthened {
            duration *= 0.85;
        }

        if is_english && annotations.is_vowel && annotations.char == Some('u') && annotations.lengthened
        {
            if next_is_word_start || units.get(index + 1).is_none() {
                duration *= 0.80;
                fade = fade.min(14.0 / speed);
            }
        }

        if annotations.lengthened {
            duration *= if is_hungarian { 1.3 } else { 1.05 };
        }

        annotations.duration_ms = duration;
        annotations.fade_duration_ms = fade;

        last_was_liquid_or_semivowel = annotations.is_liquid || annotations.is_semivowel;
        last_tied_to_open_back = is_english && annotations.tied_to && annotations.char == Some('ɑ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::{correct_h_phonemes, ipa_to_phonemes};
    use crate::table::PhonemeTable;

    fn table() -> &'static PhonemeTable {
        PhonemeTable::embedded()
    }

    #[test]
    fn stop_consonant_gets_a_short_duration() {
        let mut units = ipa_to_phonemes("pi", Some("en"), table());
        correct_h_phonemes(&mut units);
        calculate_phoneme_times(&mut units, 1.0, Some("en"));
        let stop = units
            .iter()
            .find_map(|u| u.annotations().filter(|a| a.is_stop))
            .unwrap();
        assert!(stop.duration_ms <= 6.0);
    }

    #[test]
    fn pre_stop_gap_silence_gets_a_fixed_duration_for_the_prevailing_speed() {
        let mut units = ipa_to_phonemes("pi", Some("en"), table());
        correct_h_phonemes(&mut units);
        calculate_phoneme_times(&mut units, 1.0, Some("en"));
        assert!(matches!(units[0], Unit::Silence(SilenceKind::PreStopGap, _)));
        assert_eq!(units[0].duration_ms(), 41.0);
    }

    #[test]
    fn stressed_syllable_slows_the_whole_syllable() {
        let mut units = ipa_to_phonemes("ˈpi", Some("en"), table());
        correct_h_phonemes(&mut units);
        calculate_phoneme_times(&mut units, 1.0, Some("en"));
        let vowel = units
            .iter()
            .find_map(|u| u.annotations().filter(|a| a.is_vowel))
            .unwrap();
        assert!(vowel.duration_ms > 60.0);
    }

    #[test]
    fn hungarian_short_a_is_shortened() {
        let mut units = ipa_to_phonemes("A", Some("hu"), table());
        calculate_phoneme_times(&mut units, 1.0, Some("hu"));
        let vowel = units
            .iter()
            .find_map(|u| u.annotations().filter(|a| a.is_vowel))
            .unwrap();
        assert!(vowel.duration_ms < 60.0);
    }
}
