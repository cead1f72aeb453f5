//! Hand-off between a control thread and the audio thread.
//!
//! The audio thread owns the [`PitchShifter`]. A control thread only ever touches a
//! [`ShifterControl`]: it publishes a ratio and requests resets, and the shifter picks both up at
//! the start of its next block. Callers that really need to share the shifter itself can use
//! [`SharedPitchShifter`], which refuses contended access instead of blocking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atomic_float::AtomicF32;
use parking_lot::{Mutex, MutexGuard};

use crate::shifter::{BlockStatus, PitchShifter, Ratio, DEFAULT_RATIO};
use crate::ShifterError;

/// Lock-free ratio and reset flag shared between a control thread and the audio thread.
#[derive(Debug)]
pub struct ShifterControl {
    ratio: AtomicF32,
    reset_requested: AtomicBool,
}

impl ShifterControl {
    pub fn new(ratio: f32) -> Self {
        Self {
            ratio: AtomicF32::new(ratio),
            reset_requested: AtomicBool::new(false),
        }
    }

    /// Publish the ratio used by [`PitchShifter::process_controlled_into`]. It is sanitized by
    /// the shifter, so any value is accepted here.
    #[inline]
    pub fn set_ratio(&self, ratio: f32) {
        self.ratio.store(ratio, Ordering::Release);
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio.load(Ordering::Acquire)
    }

    /// Ask the shifter to reset before its next block. Requests made before that block is
    /// processed collapse into one reset.
    pub fn request_reset(&self) {
        tracing::debug!("Pitch shifter reset requested");
        self.reset_requested.store(true, Ordering::Release);
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_requested.load(Ordering::Acquire)
    }

    /// Consume a pending reset request.
    #[inline]
    pub fn take_reset(&self) -> bool {
        self.reset_requested.swap(false, Ordering::AcqRel)
    }
}

impl Default for ShifterControl {
    fn default() -> Self {
        Self::new(DEFAULT_RATIO)
    }
}

/// A [`PitchShifter`] that can be shared between threads.
///
/// Processing and resetting go through `try_lock`: a call that finds another thread inside the
/// shifter returns [`ShifterError::ProcessInProgress`] rather than waiting for it.
#[derive(Debug)]
pub struct SharedPitchShifter {
    shifter: Mutex<PitchShifter>,
    control: Arc<ShifterControl>,
}

impl SharedPitchShifter {
    /// Wrap a shifter, attaching a fresh control handle if it does not have one yet.
    pub fn new(mut shifter: PitchShifter) -> Self {
        let control = match shifter.control().cloned() {
            Some(control) => control,
            None => {
                let control = Arc::new(ShifterControl::new(shifter.default_ratio()));
                shifter.attach_control(control.clone());
                control
            }
        };
        Self {
            shifter: Mutex::new(shifter),
            control,
        }
    }

    pub fn control(&self) -> &Arc<ShifterControl> {
        &self.control
    }

    pub fn process(&self, input: &[f32], ratio: Ratio<'_>) -> Result<Vec<f32>, ShifterError> {
        let mut shifter = self.try_lock()?;
        Ok(shifter.process(input, ratio))
    }

    pub fn process_into(
        &self,
        input: &[f32],
        output: &mut [f32],
        ratio: Ratio<'_>,
    ) -> Result<BlockStatus, ShifterError> {
        let mut shifter = self.try_lock()?;
        Ok(shifter.process_into(input, output, ratio))
    }

    pub fn process_controlled_into(&self, input: &[f32], output: &mut [f32]) -> Result<BlockStatus, ShifterError> {
        let mut shifter = self.try_lock()?;
        Ok(shifter.process_controlled_into(input, output))
    }

    pub fn reset(&self) -> Result<(), ShifterError> {
        self.try_lock()?.reset();
        Ok(())
    }

    /// Blocking access to the shifter, for non-real-time callers such as a UI thread reading
    /// cursor positions. Never call this from the audio callback.
    pub fn lock(&self) -> MutexGuard<'_, PitchShifter> {
        self.shifter.lock()
    }

    pub fn into_inner(self) -> PitchShifter {
        self.shifter.into_inner()
    }

    fn try_lock(&self) -> Result<MutexGuard<'_, PitchShifter>, ShifterError> {
        self.shifter.try_lock().ok_or(ShifterError::ProcessInProgress)
    }
}
