//! Arrival-time checks for audio blocks within one segment.

/// Classification of a block's timestamp against the sample clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timing {
    /// First block of the segment; it defines the reference time.
    SegmentStart,
    /// Within the jitter threshold.
    OnTime,
    /// Arrived later than the samples written so far account for.
    Late {
        /// Seconds since segment start according to the record timestamp.
        actual: f64,
        /// Seconds since segment start according to the sample count.
        expected: f64,
    },
    /// Arrived earlier than the samples written so far account for.
    Early {
        /// Seconds since segment start according to the record timestamp.
        actual: f64,
        /// Seconds since segment start according to the sample count.
        expected: f64,
    },
}

/// Tracks expected vs. actual timing of the blocks of one segment.
#[derive(Debug, Clone)]
pub struct TimingValidator {
    segment_start: f64,
    sample_count: u64,
    threshold: f64,
}

impl TimingValidator {
    /// Create a validator flagging deviations above `threshold` seconds.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            segment_start: 0.0,
            sample_count: 0,
            threshold,
        }
    }

    /// Check one block and account for its samples.
    ///
    /// The first block only establishes the segment start.
    pub fn observe(&mut self, timestamp: f64, sample_rate: u32, block_samples: u32) -> Timing {
        let timing = if self.sample_count == 0 || sample_rate == 0 {
            self.segment_start = timestamp;
            Timing::SegmentStart
        } else {
            let actual = timestamp - self.segment_start;
            #[allow(clippy::cast_precision_loss)]
            let expected = self.sample_count as f64 / f64::from(sample_rate);
            if actual - expected > self.threshold {
                Timing::Late { actual, expected }
            } else if expected - actual > self.threshold {
                Timing::Early { actual, expected }
            } else {
                Timing::OnTime
            }
        };
        self.sample_count += u64::from(block_samples);
        timing
    }

    /// Timestamp of the first block of the segment.
    #[must_use]
    pub fn segment_start(&self) -> f64 {
        self.segment_start
    }

    /// Samples accounted for so far.
    #[must_use]
    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }
}
