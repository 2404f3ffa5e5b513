//! The fixed acoustic control frame passed to a formant synthesizer.

use serde::{Deserialize, Serialize};

/// One instant of synthesizer control state.
///
/// Field order and names are bit-exact with the native synthesizer's frame
/// layout; nothing here is free to rename or reorder without breaking callers
/// downstream of this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcousticFrame {
    pub voice_pitch: f64,
    pub vibrato_pitch_offset: f64,
    pub vibrato_speed: f64,
    pub voice_turbulence_amplitude: f64,
    pub glottal_open_quotient: f64,
    pub voice_amplitude: f64,
    pub aspiration_amplitude: f64,
    pub cf1: f64,
    pub cf2: f64,
    pub cf3: f64,
    pub cf4: f64,
    pub cf5: f64,
    pub cf6: f64,
    pub cf_n0: f64,
    pub cf_np: f64,
    pub cb1: f64,
    pub cb2: f64,
    pub cb3: f64,
    pub cb4: f64,
    pub cb5: f64,
    pub cb6: f64,
    pub cb_n0: f64,
    pub cb_np: f64,
    pub ca_np: f64,
    pub frication_amplitude: f64,
    pub pf1: f64,
    pub pf2: f64,
    pub pf3: f64,
    pub pf4: f64,
    pub pf5: f64,
    pub pf6: f64,
    pub pb1: f64,
    pub pb2: f64,
    pub pb3: f64,
    pub pb4: f64,
    pub pb5: f64,
    pub pb6: f64,
    pub pa1: f64,
    pub pa2: f64,
    pub pa3: f64,
    pub pa4: f64,
    pub pa5: f64,
    pub pa6: f64,
    pub parallel_bypass: f64,
    pub pre_formant_gain: f64,
    pub output_gain: f64,
    pub end_voice_pitch: f64,
}

impl Default for AcousticFrame {
    fn default() -> Self {
        AcousticFrame {
            voice_pitch: 0.0,
            vibrato_pitch_offset: 0.0,
            vibrato_speed: 0.0,
            voice_turbulence_amplitude: 0.0,
            glottal_open_quotient: 0.0,
            voice_amplitude: 0.0,
            aspiration_amplitude: 0.0,
            cf1: 0.0,
            cf2: 0.0,
            cf3: 0.0,
            cf4: 3300.0,
            cf5: 3750.0,
            cf6: 4900.0,
            cf_n0: 280.0,
            cf_np: 280.0,
            cb1: 60.0,
            cb2: 90.0,
            cb3: 150.0,
            cb4: 200.0,
            cb5: 200.0,
            cb6: 500.0,
            cb_n0: 100.0,
            cb_np: 100.0,
            ca_np: 0.0,
            frication_amplitude: 0.0,
            pf1: 0.0,
            pf2: 0.0,
            pf3: 0.0,
            pf4: 0.0,
            pf5: 0.0,
            pf6: 0.0,
            pb1: 0.0,
            pb2: 0.0,
            pb3: 0.0,
            pb4: 0.0,
            pb5: 0.0,
            pb6: 0.0,
            pa1: 0.0,
            pa2: 0.0,
            pa3: 0.0,
            pa4: 0.0,
            pa5: 0.0,
            pa6: 0.0,
            parallel_bypass: 0.0,
            pre_formant_gain: 1.0,
            output_gain: 1.5,
            end_voice_pitch: 0.0,
        }
    }
}

impl AcousticFrame {
    /// Merge `self` with `neighbor`: every field named in `defined` keeps
    /// `self`'s own value, every other field is taken from `neighbor`.
    ///
    /// Used by the H-Corrector to fill in the fields a synthetic `/h/`
    /// occurrence's table row left at `AcousticFrame::default()`, without
    /// clobbering the handful of fields (`cf1`, `cf2`, `aspiration_amplitude`)
    /// that row genuinely specifies for aspiration noise.
    pub fn merge_undefined_from(
        &self,
        defined: &std::collections::HashSet<String>,
        neighbor: &AcousticFrame,
    ) -> AcousticFrame {
        let pick = |name: &str, mine: f64, theirs: f64| {
            if defined.contains(name) {
                mine
            } else {
                theirs
            }
        };
        AcousticFrame {
            voice_pitch: pick("voice_pitch", self.voice_pitch, neighbor.voice_pitch),
            vibrato_pitch_offset: pick(
                "vibrato_pitch_offset",
                self.vibrato_pitch_offset,
                neighbor.vibrato_pitch_offset,
            ),
            vibrato_speed: pick("vibrato_speed", self.vibrato_speed, neighbor.vibrato_speed),
            voice_turbulence_amplitude: pick(
                "voice_turbulence_amplitude",
                self.voice_turbulence_amplitude,
                neighbor.voice_turbulence_amplitude,
            ),
            glottal_open_quotient: pick(
                "glottal_open_quotient",
                self.glottal_open_quotient,
                neighbor.glottal_open_quotient,
            ),
            voice_amplitude: pick("voice_amplitude", self.voice_amplitude, neighbor.voice_amplitude),
            aspiration_amplitude: pick(
                "aspiration_amplitude",
                self.aspiration_amplitude,
                neighbor.aspiration_amplitude,
            ),
            cf1: pick("cf1", self.cf1, neighbor.cf1),
            cf2: pick("cf2", self.cf2, neighbor.cf2),
            cf3: pick("cf3", self.cf3, neighbor.cf3),
            cf4: pick("cf4", self.cf4, neighbor.cf4),
            cf5: pick("cf5", self.cf5, neighbor.cf5),
            cf6: pick("cf6", self.cf6, neighbor.cf6),
            cf_n0: pick("cf_n0", self.cf_n0, neighbor.cf_n0),
            cf_np: pick("cf_np", self.cf_np, neighbor.cf_np),
            cb1: pick("cb1", self.cb1, neighbor.cb1),
            cb2: pick("cb2", self.cb2, neighbor.cb2),
            cb3: pick("cb3", self.cb3, neighbor.cb3),
            cb4: pick("cb4", self.cb4, neighbor.cb4),
            cb5: pick("cb5", self.cb5, neighbor.cb5),
            cb6: pick("cb6", self.cb6, neighbor.cb6),
            cb_n0: pick("cb_n0", self.cb_n0, neighbor.cb_n0),
            cb_np: pick("cb_np", self.cb_np, neighbor.cb_np),
            ca_np: pick("ca_np", self.ca_np, neighbor.ca_np),
            frication_amplitude: pick(
                "frication_amplitude",
                self.frication_amplitude,
                neighbor.frication_amplitude,
            ),
            pf1: pick("pf1", self.pf1, neighbor.pf1),
            pf2: pick("pf2", self.pf2, neighbor.pf2),
            pf3: pick("pf3", self.pf3, neighbor.pf3),
            pf4: pick("pf4", self.pf4, neighbor.pf4),
            pf5: pick("pf5", self.pf5, neighbor.pf5),
            pf6: pick("pf6", self.pf6, neighbor.pf6),
            pb1: pick("pb1", self.pb1, neighbor.pb1),
            pb2: pick("pb2", self.pb2, neighbor.pb2),
            pb3: pick("pb3", self.pb3, neighbor.pb3),
            pb4: pick("pb4", self.pb4, neighbor.pb4),
            pb5: pick("pb5", self.pb5, neighbor.pb5),
            pb6: pick("pb6", self.pb6, neighbor.pb6),
            pa1: pick("pa1", self.pa1, neighbor.pa1),
            pa2: pick("pa2", self.pa2, neighbor.pa2),
            pa3: pick("pa3", self.pa3, neighbor.pa3),
            pa4: pick("pa4", self.pa4, neighbor.pa4),
            pa5: pick("pa5", self.pa5, neighbor.pa5),
            pa6: pick("pa6", self.pa6, neighbor.pa6),
            parallel_bypass: pick("parallel_bypass", self.parallel_bypass, neighbor.parallel_bypass),
            pre_formant_gain: pick(
                "pre_formant_gain",
                self.pre_formant_gain,
                neighbor.pre_formant_gain,
            ),
            output_gain: pick("output_gain", self.output_gain, neighbor.output_gain),
            end_voice_pitch: pick("end_voice_pitch", self.end_voice_pitch, neighbor.end_voice_pitch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_frame_has_emitter_gains() {
        let f = AcousticFrame::default();
        assert_eq!(f.pre_formant_gain, 1.0);
        assert_eq!(f.output_gain, 1.5);
        assert_eq!(f.voice_pitch, 0.0);
    }

    #[test]
    fn json_roundtrip_preserves_fields() {
        let mut f = AcousticFrame::default();
        f.voice_pitch = 140.0;
        f.cf1 = 480.0;
        let json = serde_json::to_string(&f).unwrap();
        let back: AcousticFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(f, back);
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let back: AcousticFrame = serde_json::from_str("{\"cf1\": 500.0}").unwrap();
        assert_eq!(back.cf1, 500.0);
        assert_eq!(back.pre_formant_gain, 1.0);
    }

    #[test]
    fn merge_undefined_from_keeps_defined_fields_and_borrows_the_rest() {
        let mut own = AcousticFrame::default();
        own.cf1 = 500.0;
        own.cf2 = 1500.0;
        own.aspiration_amplitude = 40.0;

        let mut neighbor = AcousticFrame::default();
        neighbor.cf1 = 280.0;
        neighbor.cf3 = 2890.0;
        neighbor.voice_amplitude = 62.0;

        let mut defined = std::collections::HashSet::new();
        defined.insert("cf1".to_string());
        defined.insert("cf2".to_string());
        defined.insert("aspiration_amplitude".to_string());

        let merged = own.merge_undefined_from(&defined, &neighbor);
        assert_eq!(merged.cf1, 500.0, "defined field keeps its own value");
        assert_eq!(merged.cf2, 1500.0, "defined field keeps its own value");
        assert_eq!(merged.aspiration_amplitude, 40.0, "defined field keeps its own value");
        assert_eq!(merged.cf3, 2890.0, "undefined field borrows the neighbour's value");
        assert_eq!(merged.voice_amplitude, 62.0, "undefined field borrows the neighbour's value");
    }
}
