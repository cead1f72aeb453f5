//! Real-time pitch shifting over a bounded circular history buffer.
//!
//! Input blocks are appended to a [`HistoryBuffer`] and read back by a fractional cursor that
//! advances by the pitch ratio on every output sample. The cursor is kept between a minimum and a
//! maximum lag behind the write position, so memory stays bounded and the audio callback never
//! reads unwritten or overwritten history. Nothing in [`PitchShifter::process_into`] allocates,
//! locks or fails.
//!
//! ```no_run
//! use pitchmask::{PitchShifterBuilder, Ratio};
//!
//! let mut shifter = PitchShifterBuilder::new(48000)?
//!     .delay_bounds(0.05, 0.45)
//!     .build()?;
//!
//! let input = [0.0f32; 128];
//! let mut output = [0.0f32; 128];
//! shifter.process_into(&input, &mut output, Ratio::Constant(0.7));
//! # Ok::<(), pitchmask::ShifterError>(())
//! ```

use thiserror::Error;

pub mod advisor;
pub mod control;
pub mod history;
pub mod shifter;

pub use advisor::{AdvisorNode, ProfileParams, SignalFeatures, Suggestion, UnknownProfile, VoiceAdvisor, VoiceProfile};
pub use control::{SharedPitchShifter, ShifterControl};
pub use history::HistoryBuffer;
pub use shifter::{
    BlockStatus, PitchShifter, PitchShifterBuilder, Ratio, DEFAULT_HISTORY_SECONDS, DEFAULT_MAX_DELAY_SECONDS,
    DEFAULT_MIN_DELAY_SECONDS, DEFAULT_RATIO, MAX_RATIO, MIN_RATIO,
};

/// Error types for PitchShifter setup and shared access
#[derive(Debug, Error, PartialEq)]
pub enum ShifterError {
    #[error("Unsupported sample rate: {0}")]
    UnsupportedSampleRate(u32),
    #[error("Invalid history length: {0} seconds")]
    InvalidHistoryLength(f64),
    #[error("Invalid delay bounds: need 0 < {min} < {max} < {capacity} samples")]
    InvalidDelayBounds {
        min: usize,
        max: usize,
        capacity: usize,
    },
    #[error("Invalid ratio range: [{min}, {max}]")]
    InvalidRatioRange {
        min: f32,
        max: f32,
    },
    #[error("Default ratio {0} is not finite or lies outside the ratio range")]
    InvalidDefaultRatio(f32),
    #[error("Another thread is already processing or resetting this shifter")]
    ProcessInProgress,
}
