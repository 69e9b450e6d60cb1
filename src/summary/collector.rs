//! Cross-segment statistics of an audio stream.

use super::SummaryReport;
use crate::audio::AudioBlockSpec;

/// Timestamp and duration of one processed record.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RecordPoint {
    timestamp: f64,
    duration: f64,
}

/// Running min/max of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    min: f64,
    max: f64,
}

fn include(span: &mut Option<Span>, value: f64) {
    match span {
        Some(span) => {
            span.min = span.min.min(value);
            span.max = span.max.max(value);
        }
        None => {
            *span = Some(Span {
                min: value,
                max: value,
            });
        }
    }
}

/// Aggregates per-record statistics for the summary.
#[derive(Debug, Clone, Default)]
pub struct SummaryCollector {
    first: Option<RecordPoint>,
    last: Option<RecordPoint>,
    record_count: u64,
    mid_duration: Option<Span>,
    gap: Option<Span>,
    miss_count: u32,
    first_sample_weight: f64,
    last_sample_weight: f64,
    sample_count: u64,
    first_spec: Option<AudioBlockSpec>,
    last_spec: Option<AudioBlockSpec>,
    status: Option<String>,
}

impl SummaryCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one written record.
    ///
    /// `frames_written` may be lower than the block's announced sample count for
    /// truncated blocks; only written frames count towards the total duration.
    pub fn record(&mut self, timestamp: f64, spec: &AudioBlockSpec, frames_written: u32) {
        let point = RecordPoint {
            timestamp,
            duration: spec.duration(),
        };

        if let Some(prev) = self.last {
            // The previous record is interior once it is neither first nor last.
            if self.record_count >= 2 {
                include(&mut self.mid_duration, prev.duration);
            }
            include(&mut self.gap, timestamp - (prev.timestamp + prev.duration));
            self.weigh_timestamp_semantics(prev, point);
        } else {
            self.first = Some(point);
        }

        self.last = Some(point);
        self.record_count += 1;
        self.sample_count += u64::from(frames_written);
        self.first_spec.get_or_insert(*spec);
        self.last_spec = Some(*spec);
    }

    /// Compare the step between two records with both durations.
    ///
    /// With block-start timestamps the step matches the previous block's
    /// duration; with block-end timestamps it matches the current one. Only
    /// pairs of different durations carry evidence, weighted by how much the
    /// durations differ.
    fn weigh_timestamp_semantics(&mut self, prev: RecordPoint, current: RecordPoint) {
        let weight = (current.duration - prev.duration).abs();
        if weight <= f64::EPSILON {
            return;
        }
        let step = current.timestamp - prev.timestamp;
        if (step - prev.duration).abs() <= (step - current.duration).abs() {
            self.first_sample_weight += weight;
        } else {
            self.last_sample_weight += weight;
        }
    }

    /// Count an expected block that could not be used.
    pub fn miss(&mut self) {
        self.miss_count += 1;
    }

    /// Record a terminal failure; the first failure wins.
    pub fn fail(&mut self, status: impl Into<String>) {
        if self.status.is_none() {
            self.status = Some(status.into());
        }
    }

    /// Number of records accounted for.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Number of missed blocks so far.
    #[must_use]
    pub fn miss_count(&self) -> u32 {
        self.miss_count
    }

    /// Terminal failure, if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Seconds of audio written, based on the last spec's sample rate.
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        match self.last_spec {
            #[allow(clippy::cast_precision_loss)]
            Some(spec) if spec.sample_rate > 0 => {
                self.sample_count as f64 / f64::from(spec.sample_rate)
            }
            _ => 0.0,
        }
    }

    /// Fill the statistics of `report`.
    ///
    /// A recorded failure replaces the status and suppresses the timing
    /// statistics; the audio format fields are kept.
    #[must_use]
    pub fn report(&self, mut report: SummaryReport) -> SummaryReport {
        if let Some(status) = &self.status {
            report.status.clone_from(status);
        }

        if let Some(spec) = self.last_spec {
            report.audio_channel_count = Some(spec.channel_count);
            report.audio_sample_rate = Some(spec.sample_rate);
            report.audio_bits_per_sample = Some(spec.bits_per_sample);
            report.audio_sample_format = Some(spec.sample_format.to_string());
        }
        report.first_audio_block_spec = self.first_spec.map(|spec| spec.to_string());

        if !report.is_success() {
            return report;
        }

        if let (Some(first), Some(last)) = (self.first, self.last) {
            report.first_audio_record_timestamp = Some(first.timestamp);
            report.last_audio_record_timestamp = Some(last.timestamp);
            report.first_audio_record_duration = Some(first.duration);
            report.last_audio_record_duration = Some(last.duration);
        }
        if let Some(span) = self.mid_duration {
            report.min_mid_audio_record_duration = Some(span.min);
            report.max_mid_audio_record_duration = Some(span.max);
        }
        if let Some(span) = self.gap {
            report.min_audio_record_gap = Some(span.min);
            report.max_audio_record_gap = Some(span.max);
        }
        report.total_audio_duration = Some(self.total_duration());
        report.audio_record_miss_count = Some(self.miss_count);

        let total_weight = self.first_sample_weight + self.last_sample_weight;
        if total_weight > 0.0 {
            report.first_sample_timestamp_ratio = Some(self.first_sample_weight / total_weight);
        }

        report
    }
}
