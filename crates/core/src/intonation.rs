//! Intonation Engine: walks a timed unit sequence once more and assigns a
//! pitch contour, split into pre-head/head/nucleus/tail regions, with
//! `apply_pitch_path` doing the actual per-region pitch-ramp math.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::unit::Unit;

/// One clause type's intonation shape. Values are percentages of the base
/// pitch's octave range, not absolute Hz.
#[derive(Debug, Clone, Copy)]
pub struct IntonationParams {
    pub pre_head_start: f64,
    pub pre_head_end: f64,
    pub head_extend_from: usize,
    pub head_start: f64,
    pub head_end: f64,
    pub head_steps: &'static [f64],
    pub head_stress_end_delta: f64,
    pub head_unstressed_run_start_delta: f64,
    pub head_unstressed_run_end_delta: f64,
    pub nucleus0_start: f64,
    pub nucleus0_end: f64,
    pub nucleus_start: f64,
    pub nucleus_end: f64,
    pub tail_start: f64,
    pub tail_end: f64,
}

const PERIOD_HEAD_STEPS: [f64; 9] = [100.0, 75.0, 50.0, 25.0, 0.0, 63.0, 38.0, 13.0, 0.0];
const COMMA_HEAD_STEPS: [f64; 9] = [100.0, 75.0, 50.0, 25.0, 0.0, 63.0, 38.0, 13.0, 0.0];
const QUESTION_HEAD_STEPS: [f64; 8] = [100.0, 75.0, 50.0, 20.0, 60.0, 35.0, 11.0, 0.0];
const EXCLAMATION_HEAD_STEPS: [f64; 8] = [100.0, 75.0, 50.0, 16.0, 82.0, 50.0, 32.0, 16.0];

/// The four clause-type intonation shapes, keyed by terminal punctuation.
/// Values are transcribed verbatim from the reference implementation;
/// nothing here is tunable without changing the contour's character.
fn intonation_param_table() -> &'static HashMap<char, IntonationParams> {
    static TABLE: OnceLock<HashMap<char, IntonationParams>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            (
                '.',
                IntonationParams {
                    pre_head_start: 46.0,
                    pre_head_end: 57.0,
                    head_extend_from: 4,
                    head_start: 80.0,
                    head_end: 50.0,
                    head_steps: &PERIOD_HEAD_STEPS,
                    head_stress_end_delta: -16.0,
                    head_unstressed_run_start_delta: -8.0,
                    head_unstressed_run_end_delta: -5.0,
                    nucleus0_start: 64.0,
                    nucleus0_end: 8.0,
                    nucleus_start: 70.0,
                    nucleus_end: 18.0,
                    tail_start: 24.0,
                    tail_end: 8.0,
                },
            ),
            (
                ',',
                IntonationParams {
                    pre_head_start: 46.0,
                    pre_head_end: 57.0,
                    head_extend_from: 4,
                    head_start: 80.0,
                    head_end: 60.0,
                    head_steps: &COMMA_HEAD_STEPS,
                    head_stress_end_delta: -16.0,
                    head_unstressed_run_start_delta: -8.0,
                    head_unstressed_run_end_delta: -5.0,
                    nucleus0_start: 34.0,
                    nucleus0_end: 52.0,
                    nucleus_start: 78.0,
                    nucleus_end: 34.0,
                    tail_start: 34.0,
                    tail_end: 52.0,
                },
            ),
            (
                '?',
                IntonationParams {
                    pre_head_start: 45.0,
                    pre_head_end: 56.0,
                    head_extend_from: 3,
                    head_start: 75.0,
                    head_end: 43.0,
                    head_steps: &QUESTION_HEAD_STEPS,
                    head_stress_end_delta: -16.0,
                    head_unstressed_run_start_delta: -7.0,
                    head_unstressed_run_end_delta: 0.0,
                    nucleus0_start: 34.0,
                    nucleus0_end: 68.0,
                    nucleus_start: 86.0,
                    nucleus_end: 21.0,
                    tail_start: 34.0,
                    tail_end: 68.0,
                },
            ),
            (
                '!',
                IntonationParams {
                    pre_head_start: 46.0,
                    pre_head_end: 57.0,
                    head_extend_from: 3,
                    head_start: 90.0,
                    head_end: 50.0,
                    head_steps: &EXCLAMATION_HEAD_STEPS,
                    head_stress_end_delta: -16.0,
                    head_unstressed_run_start_delta: -9.0,
                    head_unstressed_run_end_delta: 0.0,
                    nucleus0_start: 92.0,
                    nucleus0_end: 4.0,
                    nucleus_start: 92.0,
                    nucleus_end: 80.0,
                    tail_start: 76.0,
                    tail_end: 4.0,
                },
            ),
        ])
    })
}

fn resolve_intonation_params(clause_type: Option<char>) -> &'static IntonationParams {
    let table = intonation_param_table();
    table
        .get(&clause_type.unwrap_or('.'))
        .or_else(|| table.get(&'.'))
        .expect("intonation param table always defines '.'")
}

/// An explicit index-based replacement for a cycling generator: returns the
/// next head-stress step percentage, walking `steps` once and then looping
/// forever over `steps[extend_from..]`.
fn next_head_step(steps: &[f64], extend_from: usize, counter: &mut usize) -> f64 {
    let value = if *counter < steps.len() {
        steps[*counter]
    } else {
        let tail = &steps[extend_from..];
        let offset = (*counter - steps.len()) % tail.len();
        tail[offset]
    };
    *counter += 1;
    value
}

/// Ramp pitch linearly over `[start_index, end_index)`, in proportion to
/// cumulative voiced duration rather than unit count, so unvoiced stretches
/// don't distort the contour's timing.
pub fn apply_pitch_path(
    units: &mut [Unit],
    start_index: usize,
    end_index: usize,
    base_pitch: f64,
    inflection: f64,
    start_pitch_percent: f64,
    end_pitch_percent: f64,
) {
    let start_pitch = base_pitch * 2f64.powf(((start_pitch_percent - 50.0) / 50.0) * inflection);
    let end_pitch = base_pitch * 2f64.powf(((end_pitch_percent - 50.0) / 50.0) * inflection);

    let mut voiced_duration = 0.0;
    for unit in &units[start_index..end_index] {
        if let Some(a) = unit.annotations() {
            if a.is_voiced {
                voiced_duration += a.duration_ms;
            }
        }
    }

    let pitch_delta = end_pitch - start_pitch;
    let mut cur_duration = 0.0;
    let mut cur_pitch = start_pitch;

    for unit in &mut units[start_index..end_index] {
        if let Unit::Phoneme(_, a) = unit {
            a.voice_pitch = cur_pitch;
            if a.is_voiced {
                cur_duration += a.duration_ms;
                let pitch_ratio = cur_duration / voiced_duration;
                cur_pitch = start_pitch + pitch_delta * pitch_ratio;
            }
            a.end_voice_pitch = cur_pitch;
        }
    }
}

/// Assign `voice_pitch`/`end_voice_pitch` across the whole sequence, scanning
/// it in pre-head/head/nucleus/tail regions.
pub fn calculate_phoneme_pitches(
    units: &mut [Unit],
    base_pitch: f64,
    inflection: f64,
    clause_type: Option<char>,
) {
    if units.is_empty() {
        return;
    }
    let params = *resolve_intonation_params(clause_type);

    let pre_head_start = 0usize;
    let mut pre_head_end = units.len();
    for (index, unit) in units.iter().enumerate() {
        if let Some(a) = unit.annotations() {
            if a.syllable_start && a.stress == 1 {
                pre_head_end = index;
                break;
            }
        }
    }
    if pre_head_end > pre_head_start {
        apply_pitch_path(
            units,
            pre_head_start,
            pre_head_end,
            base_pitch,
            inflection,
            params.pre_head_start,
            params.pre_head_end,
        );
    }

    let search_end = units.len();
    let mut nucleus_start = units.len();
    let mut nucleus_end = units.len();
    let mut tail_start = units.len();
    let tail_end = units.len();

    for index in (pre_head_end..search_end).rev() {
        if let Some(a) = units[index].annotations() {
            if a.syllable_start {
                if a.stress == 1 {
                    nucleus_start = index;
                    break;
                } else {
                    nucleus_end = index;
                    tail_start = index;
                }
            }
        }
    }

    let has_tail = tail_end > tail_start;
    if has_tail {
        apply_pitch_path(
            units,
            tail_start,
            tail_end,
            base_pitch,
            inflection,
            params.tail_start,
            params.tail_end,
        );
    }
    if nucleus_end > nucleus_start {
        if has_tail {
            apply_pitch_path(
                units,
                nucleus_start,
                nucleus_end,
                base_pitch,
                inflection,
                params.nucleus_start,
                params.nucleus_end,
            );
        } else {
            apply_pitch_path(
                units,
                nucleus_start,
                nucleus_end,
                base_pitch,
                inflection,
                params.nucleus0_start,
                params.nucleus0_end,
            );
        }
    }

    if pre_head_end < nucleus_start {
        let head_start_pitch = params.head_start;
        let head_end_pitch = params.head_end;
        let mut last_head_stress_start: Option<usize> = None;
        let mut last_head_unstressed_run_start: Option<usize> = None;
        let mut stress_end_pitch = 0.0;
        let mut step_counter = 0usize;

        for index in pre_head_end..=nucleus_start {
            let (syllable_start, syllable_stress) = match units[index].annotations() {
                Some(a) => (a.syllable_start, a.stress == 1),
                None => (false, false),
            };
            if !syllable_start {
                continue;
            }
            if let Some(start) = last_head_stress_start {
                let step_pct = next_head_step(params.head_steps, params.head_extend_from, &mut step_counter);
                let stress_start_pitch =
                    head_end_pitch + ((head_start_pitch - head_end_pitch) / 100.0) * step_pct;
                stress_end_pitch = stress_start_pitch + params.head_stress_end_delta;
                apply_pitch_path(
                    units,
                    start,
                    index,
                    base_pitch,
                    inflection,
                    stress_start_pitch,
                    stress_end_pitch,
                );
                last_head_stress_start = None;
            }
            if syllable_stress {
                if let Some(run_start) = last_head_unstressed_run_start {
                    let unstressed_run_start_pitch =
                        stress_end_pitch + params.head_unstressed_run_start_delta;
                    let unstressed_run_end_pitch =
                        stress_end_pitch + params.head_unstressed_run_end_delta;
                    apply_pitch_path(
                        units,
                        run_start,
                        index,
                        base_pitch,
                        inflection,
                        unstressed_run_start_pitch,
                        unstressed_run_end_pitch,
                    );
                    last_head_unstressed_run_start = None;
                }
                last_head_stress_start = Some(index);
            } else if last_head_unstressed_run_start.is_none() {
                last_head_unstressed_run_start = Some(index);
            }
        }
    }
}
