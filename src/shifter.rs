use std::sync::Arc;

use crate::control::ShifterControl;
use crate::history::HistoryBuffer;
use crate::ShifterError;

/// Seconds of input kept in the history buffer by default.
pub const DEFAULT_HISTORY_SECONDS: f64 = 4.0;
/// Smallest lag between the write and read cursors, in seconds.
pub const DEFAULT_MIN_DELAY_SECONDS: f64 = 0.05;
/// Largest lag between the write and read cursors, in seconds.
pub const DEFAULT_MAX_DELAY_SECONDS: f64 = 0.45;
/// Ratio used when the caller supplies a non-finite value.
pub const DEFAULT_RATIO: f32 = 0.7;
pub const MIN_RATIO: f32 = 0.25;
pub const MAX_RATIO: f32 = 2.5;

/// Pitch ratio for one block, either held for the whole block or given per output sample.
///
/// A ratio below 1.0 reads the history more slowly than it is written and lowers the pitch; a
/// ratio above 1.0 raises it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio<'a> {
    Constant(f32),
    /// One value per output sample. A single-element slice is held for the whole block, and
    /// indices past the end of a longer slice fall back to the default ratio.
    PerSample(&'a [f32]),
}

impl Ratio<'_> {
    /// Raw (unclamped) ratio for output sample `index`. Missing values come back as NaN.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        match self {
            Ratio::Constant(ratio) => *ratio,
            Ratio::PerSample([ratio]) => *ratio,
            Ratio::PerSample(ratios) => ratios.get(index).copied().unwrap_or(f32::NAN),
        }
    }
}

impl From<f32> for Ratio<'_> {
    fn from(ratio: f32) -> Self {
        Ratio::Constant(ratio)
    }
}

impl<'a> From<&'a [f32]> for Ratio<'a> {
    fn from(ratios: &'a [f32]) -> Self {
        Ratio::PerSample(ratios)
    }
}

/// What [`PitchShifter::process_into`] did with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// The block was written to the history and output was rendered.
    Processed,
    /// The input or output block was empty. Output was silenced and the state left untouched.
    Skipped,
}

/// Builder for configuring and creating a PitchShifter instance.
#[derive(Debug, Clone)]
pub struct PitchShifterBuilder {
    sample_rate: u32,
    history_seconds: f64,
    min_delay_seconds: f64,
    max_delay_seconds: f64,
    default_ratio: f32,
    min_ratio: f32,
    max_ratio: f32,
}

impl PitchShifterBuilder {
    pub fn new(sample_rate: u32) -> Result<Self, ShifterError> {
        if sample_rate == 0 {
            return Err(ShifterError::UnsupportedSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            history_seconds: DEFAULT_HISTORY_SECONDS,
            min_delay_seconds: DEFAULT_MIN_DELAY_SECONDS,
            max_delay_seconds: DEFAULT_MAX_DELAY_SECONDS,
            default_ratio: DEFAULT_RATIO,
            min_ratio: MIN_RATIO,
            max_ratio: MAX_RATIO,
        })
    }

    pub fn history_seconds(mut self, seconds: f64) -> Self {
        self.history_seconds = seconds;
        self
    }

    /// Lag window of the read cursor, in seconds. Converted to whole samples by flooring.
    pub fn delay_bounds(mut self, min_seconds: f64, max_seconds: f64) -> Self {
        self.min_delay_seconds = min_seconds;
        self.max_delay_seconds = max_seconds;
        self
    }

    pub fn default_ratio(mut self, ratio: f32) -> Self {
        self.default_ratio = ratio;
        self
    }

    pub fn ratio_range(mut self, min: f32, max: f32) -> Self {
        self.min_ratio = min;
        self.max_ratio = max;
        self
    }

    pub fn build(self) -> Result<PitchShifter, ShifterError> {
        let result = self.validate();
        match &result {
            Ok(shifter) => tracing::debug!(
                "Configured pitch shifter: {} Hz, {} history samples, lag window [{}, {}]",
                shifter.sample_rate,
                shifter.capacity(),
                shifter.min_delay,
                shifter.max_delay,
            ),
            Err(e) => tracing::warn!("Rejected pitch shifter configuration: {}", e),
        }
        result
    }

    fn validate(self) -> Result<PitchShifter, ShifterError> {
        if !self.history_seconds.is_finite() || self.history_seconds <= 0.0 {
            return Err(ShifterError::InvalidHistoryLength(self.history_seconds));
        }

        let rate = self.sample_rate as f64;
        // Float-to-int casts saturate, and NaN becomes 0.
        let capacity = (rate * self.history_seconds).floor() as usize;
        let min_delay = (rate * self.min_delay_seconds).floor() as usize;
        let max_delay = (rate * self.max_delay_seconds).floor() as usize;
        if min_delay == 0 || min_delay >= max_delay || max_delay >= capacity {
            return Err(ShifterError::InvalidDelayBounds {
                min: min_delay,
                max: max_delay,
                capacity,
            });
        }

        let (min_ratio, max_ratio) = (self.min_ratio, self.max_ratio);
        if !min_ratio.is_finite() || !max_ratio.is_finite() || min_ratio <= 0.0 || min_ratio > max_ratio {
            return Err(ShifterError::InvalidRatioRange {
                min: min_ratio,
                max: max_ratio,
            });
        }
        if !(min_ratio..=max_ratio).contains(&self.default_ratio) {
            return Err(ShifterError::InvalidDefaultRatio(self.default_ratio));
        }

        Ok(PitchShifter {
            history: HistoryBuffer::new(capacity),
            read_cursor: 0.0,
            initialized: false,
            sample_rate: self.sample_rate,
            min_delay,
            max_delay,
            default_ratio: self.default_ratio,
            min_ratio,
            max_ratio,
            control: None,
        })
    }
}

/// A real-time pitch shifter reading a circular history buffer with a fractional cursor.
///
/// Every processed block is appended to the history, then the read cursor advances by the
/// (clamped) ratio once per output sample and the output is linearly interpolated from the
/// history. The cursor is held between `min_delay` and `max_delay` samples behind the write
/// cursor. When a ratio pushes it against either bound the output skips or repeats history
/// instead of reading past the newest sample or into overwritten data.
#[derive(Debug)]
pub struct PitchShifter {
    history: HistoryBuffer,
    read_cursor: f64,
    initialized: bool,
    sample_rate: u32,
    min_delay: usize,
    max_delay: usize,
    default_ratio: f32,
    min_ratio: f32,
    max_ratio: f32,
    control: Option<Arc<ShifterControl>>,
}

impl PitchShifter {
    /// Create a shifter with the default history length, lag window and ratio range.
    pub fn new(sample_rate: u32) -> Result<Self, ShifterError> {
        PitchShifterBuilder::new(sample_rate)?.build()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples the history buffer holds.
    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn min_delay(&self) -> usize {
        self.min_delay
    }

    pub fn max_delay(&self) -> usize {
        self.max_delay
    }

    pub fn default_ratio(&self) -> f32 {
        self.default_ratio
    }

    pub fn ratio_range(&self) -> (f32, f32) {
        (self.min_ratio, self.max_ratio)
    }

    pub fn write_cursor(&self) -> u64 {
        self.history.write_cursor()
    }

    pub fn read_cursor(&self) -> f64 {
        self.read_cursor
    }

    /// Distance from the read cursor back to the write cursor, in samples.
    pub fn lag(&self) -> f64 {
        self.history.write_cursor() as f64 - self.read_cursor
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Attach a control handle. Its pending reset is consumed at the start of each block.
    pub fn attach_control(&mut self, control: Arc<ShifterControl>) {
        self.control = Some(control);
    }

    pub fn control(&self) -> Option<&Arc<ShifterControl>> {
        self.control.as_ref()
    }

    /// Rewind both cursors. The next processed block seeds a fresh lag.
    ///
    /// History storage is kept; positions from before the reset read as silence.
    pub fn reset(&mut self) {
        self.history.rewind();
        self.read_cursor = 0.0;
        self.initialized = false;
    }

    /// Process a single block of audio samples.
    ///
    /// An output buffer will be automatically allocated and returned, so this is not meant for
    /// the audio thread. Use [`process_into`](Self::process_into) there.
    pub fn process(&mut self, input: &[f32], ratio: Ratio<'_>) -> Vec<f32> {
        let mut output = vec![0.0; input.len()];
        self.process_into(input, &mut output, ratio);
        output
    }

    /// Process a single block with the ratio currently published by the attached control, or
    /// the default ratio when no control is attached.
    pub fn process_controlled_into(&mut self, input: &[f32], output: &mut [f32]) -> BlockStatus {
        let ratio = self
            .control
            .as_ref()
            .map_or(self.default_ratio, |control| control.ratio());
        self.process_into(input, output, Ratio::Constant(ratio))
    }

    /// Process a single block of audio samples into a pre-allocated output buffer.
    ///
    /// The whole input is written to the history; `min(input.len(), output.len())` samples are
    /// rendered and any remaining output is zeroed. Never allocates and never fails: invalid
    /// ratios are replaced or clamped, and an empty block is skipped.
    pub fn process_into(&mut self, input: &[f32], output: &mut [f32], ratio: Ratio<'_>) -> BlockStatus {
        if input.is_empty() || output.is_empty() {
            output.fill(0.0);
            return BlockStatus::Skipped;
        }

        if self.control.as_ref().is_some_and(|control| control.take_reset()) {
            self.reset();
        }

        self.history.write_block(input);
        let write_cursor = self.history.write_cursor() as f64;

        if !self.initialized {
            let seed_lag = (2 * self.min_delay).min(self.max_delay);
            self.read_cursor = write_cursor - seed_lag as f64;
            self.initialized = true;
        }

        // The window only depends on the write cursor, which is fixed for the rest of the block.
        let lower = write_cursor - self.max_delay as f64;
        let upper = write_cursor - self.min_delay as f64;
        self.read_cursor = self.read_cursor.clamp(lower, upper);

        let rendered = input.len().min(output.len());
        for (i, sample) in output[..rendered].iter_mut().enumerate() {
            let step = self.sanitize_ratio(ratio.at(i)) as f64;
            self.read_cursor = (self.read_cursor + step).clamp(lower, upper);
            *sample = self.history.read_interpolated(self.read_cursor);
        }
        output[rendered..].fill(0.0);

        BlockStatus::Processed
    }

    #[inline]
    fn sanitize_ratio(&self, ratio: f32) -> f32 {
        let ratio = if ratio.is_finite() { ratio } else { self.default_ratio };
        ratio.clamp(self.min_ratio, self.max_ratio)
    }
}
