/// Fixed-capacity ring of the most recent input samples.
///
/// Positions are absolute: the write cursor counts every sample ever written since the last
/// [`rewind`](HistoryBuffer::rewind), and the physical slot of a position is that position modulo
/// the capacity. Only the last `capacity` positions hold meaningful data. Reading anything older
/// returns whatever has since been written over it, so callers have to keep their read positions
/// inside `write_cursor - capacity..write_cursor`.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: Vec<f32>,
    write_cursor: u64,
}

impl HistoryBuffer {
    /// Allocate a zeroed buffer. A capacity of zero is bumped to one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            write_cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Absolute number of samples written since the last rewind.
    pub fn write_cursor(&self) -> u64 {
        self.write_cursor
    }

    #[inline]
    pub fn write(&mut self, sample: f32) {
        let slot = (self.write_cursor % self.samples.len() as u64) as usize;
        self.samples[slot] = sample;
        self.write_cursor += 1;
    }

    pub fn write_block(&mut self, block: &[f32]) {
        for &sample in block {
            self.write(sample);
        }
    }

    /// Move the write cursor back to zero without touching storage.
    ///
    /// Old contents stay in memory but read as silence until they are written again.
    pub fn rewind(&mut self) {
        self.write_cursor = 0;
    }

    /// Sample stored at an absolute position, or silence if that position has not been written.
    #[inline]
    pub fn sample_at(&self, index: i64) -> f32 {
        if index < 0 || index as u64 >= self.write_cursor {
            return 0.0;
        }
        self.samples[self.slot(index)]
    }

    /// Linearly interpolated read at a fractional absolute position.
    ///
    /// Integer positions return the stored sample exactly.
    #[inline]
    pub fn read_interpolated(&self, position: f64) -> f32 {
        let base = position.floor();
        let frac = (position - base) as f32;
        let base = base as i64;

        let s0 = self.sample_at(base);
        let s1 = self.sample_at(base + 1);
        s0 + (s1 - s0) * frac
    }

    #[inline]
    fn slot(&self, index: i64) -> usize {
        let capacity = self.samples.len() as i64;
        (((index % capacity) + capacity) % capacity) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integer_reads_are_exact() {
        let mut buffer = HistoryBuffer::new(8);
        for i in 0..6 {
            buffer.write(i as f32 * 0.1);
        }

        for i in 0..6 {
            assert_eq!(buffer.read_interpolated(i as f64), i as f32 * 0.1);
        }
    }

    #[test]
    fn test_fractional_read_interpolates() {
        let mut buffer = HistoryBuffer::new(4);
        buffer.write_block(&[0.0, 1.0, -1.0]);

        assert_relative_eq!(buffer.read_interpolated(0.25), 0.25);
        assert_relative_eq!(buffer.read_interpolated(1.5), 0.0);
        assert_relative_eq!(buffer.read_interpolated(1.75), -0.5);
    }

    #[test]
    fn test_wraparound() {
        let mut buffer = HistoryBuffer::new(4);
        buffer.write_block(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        assert_eq!(buffer.write_cursor(), 6);
        assert_eq!(buffer.sample_at(5), 6.0);
        assert_eq!(buffer.sample_at(4), 5.0);
        assert_eq!(buffer.sample_at(2), 3.0);
        // Interpolation across the physical end of the ring
        assert_relative_eq!(buffer.read_interpolated(3.5), 4.5);
    }

    #[test]
    fn test_unwritten_positions_are_silent() {
        let mut buffer = HistoryBuffer::new(4);
        buffer.write_block(&[0.5, 0.5]);

        assert_eq!(buffer.sample_at(-1), 0.0);
        assert_eq!(buffer.sample_at(2), 0.0);
        assert_relative_eq!(buffer.read_interpolated(-0.5), 0.25);
        assert_relative_eq!(buffer.read_interpolated(1.5), 0.25);
    }

    #[test]
    fn test_rewind_hides_stale_contents() {
        let mut buffer = HistoryBuffer::new(4);
        buffer.write_block(&[0.9, 0.9, 0.9, 0.9]);
        buffer.rewind();

        assert_eq!(buffer.write_cursor(), 0);
        for position in -4..4 {
            assert_eq!(buffer.read_interpolated(position as f64), 0.0);
        }

        buffer.write(0.1);
        assert_eq!(buffer.sample_at(0), 0.1);
        assert_eq!(buffer.sample_at(1), 0.0);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut buffer = HistoryBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
        buffer.write(0.3);
        buffer.write(0.4);
        assert_eq!(buffer.sample_at(1), 0.4);
    }
}
