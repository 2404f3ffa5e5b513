//! Emitter: runs the full pipeline (normalize, segment, H-correct, time,
//! intonate) and yields one `(frame, duration, fade)` triple per unit.
//!
//! The stages ahead of emission all need the whole unit list in hand (the
//! Segmenter looks behind itself, the Timer and Intonation Engine both scan
//! ranges), so they run eagerly. The emitter itself is the pipeline's one
//! genuinely pull-based stage — it doesn't build an output buffer, it hands
//! the caller one frame at a time and is cancelled by being dropped.

use crate::frame::AcousticFrame;
use crate::intonation::calculate_phoneme_pitches;
use crate::normalize::normalize_ipa;
use crate::segment::{correct_h_phonemes, ipa_to_phonemes};
use crate::table::PhonemeTable;
use crate::timing::calculate_phoneme_times;
use crate::unit::Unit;

/// A single synthesizer instruction: `None` holds silence, `Some` a formant
/// frame, each lasting `duration_ms` and fading in over `fade_ms`.
pub type Frame = (Option<AcousticFrame>, f64, f64);

/// Finite, non-restartable iterator over a pipeline invocation's frames.
/// Dropping it mid-iteration is how a caller cancels synthesis; there is no
/// other cancellation mechanism because the pipeline has no internal timers
/// or blocking I/O to interrupt.
pub struct Frames {
    units: std::vec::IntoIter<Unit>,
}

impl Iterator for Frames {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        let unit = self.units.next()?;
        let duration_ms = unit.duration_ms();
        let fade_ms = unit.fade_duration_ms();
        Some(match unit {
            Unit::Silence(..) => (None, duration_ms, fade_ms),
            Unit::Phoneme(mut frame, annotations) => {
                frame.voice_pitch = annotations.voice_pitch;
                frame.end_voice_pitch = annotations.end_voice_pitch;
                (Some(frame), duration_ms, fade_ms)
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.units.size_hint()
    }
}

impl std::iter::ExactSizeIterator for Frames {
    fn len(&self) -> usize {
        self.units.len()
    }
}

/// Run the full text-to-frames pipeline and return an iterator over every
/// unit's frame and timing, in order.
///
/// The returned iterator is empty if the normalized text produced no
/// phoneme occurrences at all (blank input, or every character unmapped).
pub fn generate_frames_and_timing(
    text: &str,
    speed: f64,
    base_pitch: f64,
    inflection: f64,
    clause_type: Option<char>,
    language: Option<&str>,
    table: &PhonemeTable,
) -> Frames {
    let normalized = normalize_ipa(text, language, table);
    let mut units = ipa_to_phonemes(&normalized, language, table);
    if !units.is_empty() {
        correct_h_phonemes(&mut units);
        calculate_phoneme_times(&mut units, speed, language);
        calculate_phoneme_pitches(&mut units, base_pitch, inflection, clause_type);
    }

    Frames {
        units: units.into_iter(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> &'static PhonemeTable {
        PhonemeTable::embedded()
    }

    #[test]
    fn empty_text_yields_no_frames() {
        let frames: Vec<_> =
            generate_frames_and_timing("", 1.0, 100.0, 0.5, Some('.'), Some("en"), table()).collect();
        assert!(frames.is_empty());
    }

    #[test]
    fn text_with_only_unmapped_characters_yields_no_frames() {
        let frames: Vec<_> = generate_frames_and_timing(
            "\u{2603}",
            1.0,
            100.0,
            0.5,
            Some('.'),
            Some("en"),
            table(),
        )
        .collect();
        assert!(frames.is_empty());
    }

    #[test]
    fn stop_before_vowel_emits_a_leading_silence_then_voiced_frames() {
        let frames: Vec<_> =
            generate_frames_and_timing("pi", 1.0, 100.0, 0.5, Some('.'), Some("en"), table()).collect();
        let (first_frame, first_duration, _) = &frames[0];
        assert!(first_frame.is_none());
        assert!(*first_duration > 0.0);
        assert!(frames.iter().any(|(f, _, _)| f.is_some()));
    }

    #[test]
    fn every_frame_carries_the_emitter_gains() {
        let frames =
            generate_frames_and_timing("pi", 1.0, 100.0, 0.5, Some('.'), Some("en"), table());
        for (frame, _, _) in frames {
            if let Some(frame) = frame {
                assert_eq!(frame.pre_formant_gain, 1.0);
                assert_eq!(frame.output_gain, 1.5);
            }
        }
    }

    #[test]
    fn higher_speed_shortens_every_duration() {
        let slow_total: f64 =
            generate_frames_and_timing("ˈpi", 1.0, 100.0, 0.5, Some('.'), Some("en"), table())
                .map(|(_, d, _)| d)
                .sum();
        let fast_total: f64 =
            generate_frames_and_timing("ˈpi", 2.0, 100.0, 0.5, Some('.'), Some("en"), table())
                .map(|(_, d, _)| d)
                .sum();
        assert!(fast_total < slow_total);
    }

    #[test]
    fn frames_iterator_can_be_dropped_early_to_cancel() {
        let mut frames =
            generate_frames_and_timing("ˈpi tu", 1.0, 100.0, 0.5, Some('.'), Some("en"), table());
        assert!(frames.next().is_some());
        // Dropping the remainder here is the cancellation mechanism; nothing
        // further needs to happen for it to take effect.
    }

    #[test]
    fn frames_iterator_reports_exact_remaining_length() {
        let mut frames =
            generate_frames_and_timing("pi", 1.0, 100.0, 0.5, Some('.'), Some("en"), table());
        let total = frames.len();
        assert!(total > 0);
        frames.next();
        assert_eq!(frames.len(), total - 1);
    }
}
