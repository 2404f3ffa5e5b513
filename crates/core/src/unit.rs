//! The per-occurrence record threaded through the pipeline.
//!
//! A phoneme occurrence is not a synthesizer frame with extra fields bolted
//! on; it is a frame plus a side channel of private, pipeline-internal state
//! that never reaches the synthesizer. Keeping them as two fields on one enum
//! variant (instead of a string-keyed map with leading-underscore keys) makes
//! every later stage's mutations explicit in the type.

use crate::frame::AcousticFrame;

/// Why a gap of silence was inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceKind {
    /// A generic silence record (e.g. representing a literal IPA space).
    Gap,
    /// Inserted immediately before a stop or affricate's closure.
    PreStopGap,
}

/// Pending lexical stress not yet attached to a phoneme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingStress {
    #[default]
    Idle,
    Seen(u8),
}

impl PendingStress {
    pub fn take(&mut self) -> u8 {
        match std::mem::take(self) {
            PendingStress::Idle => 0,
            PendingStress::Seen(level) => level,
        }
    }
}

/// Per-occurrence pipeline-internal bookkeeping, mirroring the table's class
/// flags plus state written by each stage downstream of segmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    pub is_vowel: bool,
    pub is_voiced: bool,
    pub is_stop: bool,
    pub is_affricate: bool,
    pub is_liquid: bool,
    pub is_nasal: bool,
    pub is_semivowel: bool,
    pub is_tap: bool,
    pub is_trill: bool,

    pub stress: u8,
    pub syllable_start: bool,
    pub word_start: bool,
    pub tied_to: bool,
    pub tied_from: bool,
    pub lengthened: bool,
    pub post_stop_aspiration: bool,
    pub copy_adjacent: bool,
    /// The table row's own defined `AcousticFrame` field names, carried only
    /// on `copy_adjacent` occurrences so the H-Corrector knows which fields
    /// are meaningful on their own versus which to fill in from a neighbour.
    pub defined_frame_fields: std::collections::HashSet<String>,
    /// The resolved grapheme this occurrence was segmented from, `None` for
    /// synthetic records (inserted aspiration, pre-stop gaps).
    pub char: Option<char>,

    /// Set by the Timer.
    pub duration_ms: f64,
    pub fade_duration_ms: f64,
    /// Set by the Intonation Engine.
    pub voice_pitch: f64,
    pub end_voice_pitch: f64,
}

/// Duration/fade assigned to a silence record by the Timer. Unlike a
/// phoneme, a gap has no other annotation to carry, but its duration is
/// still a function of the prevailing speed at the point it was reached
/// (a stressed syllable's pre-stop gap is shorter), so it cannot be a
/// fixed constant either.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SilenceTiming {
    pub duration_ms: f64,
    pub fade_duration_ms: f64,
}

/// A phoneme occurrence or a span of silence, in pipeline order.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    Silence(SilenceKind, SilenceTiming),
    Phoneme(AcousticFrame, Annotations),
}

impl Unit {
    pub fn is_vowel(&self) -> bool {
        matches!(self, Unit::Phoneme(_, a) if a.is_vowel)
    }

    pub fn is_silence(&self) -> bool {
        matches!(self, Unit::Silence(..))
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        match self {
            Unit::Phoneme(_, a) => Some(a),
            Unit::Silence(..) => None,
        }
    }

    pub fn annotations_mut(&mut self) -> Option<&mut Annotations> {
        match self {
            Unit::Phoneme(_, a) => Some(a),
            Unit::Silence(..) => None,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        match self {
            Unit::Phoneme(_, a) => a.duration_ms,
            Unit::Silence(_, t) => t.duration_ms,
        }
    }

    pub fn fade_duration_ms(&self) -> f64 {
        match self {
            Unit::Phoneme(_, a) => a.fade_duration_ms,
            Unit::Silence(_, t) => t.fade_duration_ms,
        }
    }

    pub fn set_timing(&mut self, duration_ms: f64, fade_duration_ms: f64) {
        match self {
            Unit::Phoneme(_, a) => {
                a.duration_ms = duration_ms;
                a.fade_duration_ms = fade_duration_ms;
            }
            Unit::Silence(_, t) => {
                t.duration_ms = duration_ms;
                t.fade_duration_ms = fade_duration_ms;
            }
        }
    }
}
