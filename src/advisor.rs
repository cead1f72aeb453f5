//! Parameter suggestions from simple signal features.
//!
//! Nothing here runs on the audio thread. A UI or control thread measures a block of input with
//! [`SignalFeatures::analyze`], asks the [`VoiceAdvisor`] for a pitch/distortion pair, and pushes
//! the pitch into a [`ShifterControl`](crate::ShifterControl) if it wants to follow the suggestion.

use std::fmt;
use std::str::FromStr;

/// Energy and brightness of a block of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalFeatures {
    /// Root mean square amplitude.
    pub rms: f32,
    /// Sign changes per sample, in [0, 1).
    pub zero_crossing_rate: f32,
}

impl SignalFeatures {
    pub fn new(rms: f32, zero_crossing_rate: f32) -> Self {
        Self {
            rms,
            zero_crossing_rate,
        }
    }

    /// Measure a block. An empty block has no energy and no crossings.
    pub fn analyze(samples: &[f32]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let len = samples.len() as f32;

        let rms = (samples.iter().map(|x| x * x).sum::<f32>() / len).sqrt();
        let crossings = samples
            .windows(2)
            .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
            .count();

        Self {
            rms,
            zero_crossing_rate: crossings as f32 / len,
        }
    }
}

/// Pitch ratio and distortion amount suggested for a voice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suggestion {
    pub label: &'static str,
    pub pitch: f32,
    pub distortion: f32,
}

/// One linear scoring node and the preset it stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisorNode {
    pub label: &'static str,
    pub weights: [f32; 2],
    pub bias: f32,
    pub pitch: f32,
    pub distortion: f32,
}

impl AdvisorNode {
    #[inline]
    fn score(&self, rms: f32, zcr: f32) -> f32 {
        self.weights[0] * rms + self.weights[1] * zcr + self.bias
    }
}

const NODES: [AdvisorNode; 3] = [
    AdvisorNode {
        label: "grave",
        weights: [1.4, -0.8],
        bias: -0.2,
        pitch: 0.55,
        distortion: 0.48,
    },
    AdvisorNode {
        label: "oscuro",
        weights: [1.1, -0.2],
        bias: -0.05,
        pitch: 0.65,
        distortion: 0.35,
    },
    AdvisorNode {
        label: "metálico",
        weights: [0.8, 0.6],
        bias: 0.12,
        pitch: 0.75,
        distortion: 0.62,
    },
];

const PITCH_RANGE: (f32, f32) = (0.35, 0.85);
const DISTORTION_RANGE: (f32, f32) = (0.2, 0.9);

/// Linear classifier over [`SignalFeatures`] choosing among fixed voice presets.
///
/// The highest-scoring node wins (the earlier node on ties) and its preset is nudged by the score,
/// then clamped to a range that keeps the voice intelligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceAdvisor;

impl VoiceAdvisor {
    pub fn nodes(&self) -> &'static [AdvisorNode] {
        &NODES
    }

    pub fn suggest(&self, features: SignalFeatures) -> Suggestion {
        let rms = finite_or_zero(features.rms);
        let zcr = finite_or_zero(features.zero_crossing_rate);

        let mut best = &NODES[0];
        let mut best_score = best.score(rms, zcr);
        for node in &NODES[1..] {
            let score = node.score(rms, zcr);
            if score > best_score {
                best = node;
                best_score = score;
            }
        }

        Suggestion {
            label: best.label,
            pitch: (best.pitch + best_score * 0.05).clamp(PITCH_RANGE.0, PITCH_RANGE.1),
            distortion: (best.distortion + best_score * 0.04).clamp(DISTORTION_RANGE.0, DISTORTION_RANGE.1),
        }
    }
}

#[inline]
fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Named presets for the whole voice chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceProfile {
    Warden,
    Leviathan,
    Shadow,
}

/// Settings of a [`VoiceProfile`]. Only `pitch` is consumed by the shifter; the distortion and
/// low-pass values are for whatever effects follow it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileParams {
    pub pitch: f32,
    pub distortion: f32,
    pub lowpass_hz: f32,
}

impl VoiceProfile {
    pub const ALL: [VoiceProfile; 3] = [VoiceProfile::Warden, VoiceProfile::Leviathan, VoiceProfile::Shadow];

    pub fn name(&self) -> &'static str {
        match self {
            VoiceProfile::Warden => "warden",
            VoiceProfile::Leviathan => "leviathan",
            VoiceProfile::Shadow => "shadow",
        }
    }

    pub fn params(&self) -> ProfileParams {
        match self {
            VoiceProfile::Warden => ProfileParams {
                pitch: 0.62,
                distortion: 0.45,
                lowpass_hz: 1400.0,
            },
            VoiceProfile::Leviathan => ProfileParams {
                pitch: 0.45,
                distortion: 0.65,
                lowpass_hz: 950.0,
            },
            VoiceProfile::Shadow => ProfileParams {
                pitch: 0.58,
                distortion: 0.38,
                lowpass_hz: 1100.0,
            },
        }
    }
}

impl fmt::Display for VoiceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VoiceProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VoiceProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == s)
            .ok_or_else(|| UnknownProfile(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown voice profile: {0}")]
pub struct UnknownProfile(pub String);
