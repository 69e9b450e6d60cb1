//! Per-stream record handler.

use std::ops::ControlFlow;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use super::{ExtractOptions, Record, RecordContent};
use crate::audio::{AudioFormat, Rollover, SegmentWriter};
use crate::error::Result;
use crate::summary::{SummaryCollector, SummaryReport};

/// Drives segment writing and statistics for one audio stream.
///
/// Records are pushed in with [`AudioTrackExtractor::on_record`]; the
/// extractor owns the running count of output files.
pub struct AudioTrackExtractor {
    writer: SegmentWriter,
    collector: SummaryCollector,
    output_files: Vec<PathBuf>,
}

impl AudioTrackExtractor {
    /// Create an extractor writing segments of `stream_id` into `folder`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, stream_id: &str, options: &ExtractOptions) -> Self {
        let mut writer = SegmentWriter::new(folder, stream_id, options.variant)
            .with_jitter_threshold(options.jitter_threshold);
        if let Some(cap) = options.max_segment_size {
            writer = writer.with_size_cap(cap);
        }
        Self {
            writer,
            collector: SummaryCollector::new(),
            output_files: Vec::new(),
        }
    }

    /// Handle one record.
    ///
    /// Returns `Break` after a fatal output error; the failure is kept for
    /// the summary and no further records should be delivered.
    pub fn on_record(&mut self, record: &Record<'_>) -> ControlFlow<()> {
        match self.ingest(record) {
            Ok(()) => ControlFlow::Continue(()),
            Err(e) => {
                error!("Audio extraction stopped: {e}");
                self.collector.fail(e.with_sources());
                ControlFlow::Break(())
            }
        }
    }

    /// Handle one record, propagating fatal errors.
    ///
    /// # Errors
    ///
    /// Returns an error if an output segment cannot be created or written.
    pub fn ingest(&mut self, record: &Record<'_>) -> Result<()> {
        match record.content {
            RecordContent::Audio { spec, data } => {
                if spec.audio_format != AudioFormat::Pcm {
                    info!(
                        "Skipping non-PCM audio block at {:.3}: {spec}",
                        record.timestamp
                    );
                    self.collector.miss();
                    return Ok(());
                }

                let ingested = self.writer.ingest(record.timestamp, &spec, data)?;
                match ingested.rollover {
                    Some(Rollover::FormatChange) => {
                        debug!("Audio format changed at {:.3}: {spec}", record.timestamp);
                        self.collector.miss();
                    }
                    Some(Rollover::First | Rollover::SizeCap) | None => {}
                }
                if ingested.segments_created() > 0
                    && let Some(path) = self.writer.current_path()
                {
                    self.output_files.push(path.to_path_buf());
                }
                self.collector
                    .record(record.timestamp, &spec, ingested.frames_written);
            }
            RecordContent::Unsupported { audio, description } => {
                if audio {
                    warn!(
                        "Audio block skipped at {:.3}, content: {description}",
                        record.timestamp
                    );
                    self.collector.miss();
                }
            }
        }
        Ok(())
    }

    /// Record a failure that happened outside the extractor, such as a
    /// container read error.
    pub fn fail(&mut self, status: impl Into<String>) {
        self.collector.fail(status);
    }

    /// Number of output files created so far.
    #[must_use]
    pub fn output_file_count(&self) -> u32 {
        self.writer.segment_count()
    }

    /// Output files created so far.
    #[must_use]
    pub fn output_files(&self) -> &[PathBuf] {
        &self.output_files
    }

    /// Statistics gathered so far.
    #[must_use]
    pub fn collector(&self) -> &SummaryCollector {
        &self.collector
    }

    /// Finalize the open segment and fill `report`.
    #[must_use]
    pub fn finish(mut self, report: SummaryReport) -> SummaryReport {
        if let Err(e) = self.writer.close() {
            error!("{e}");
            self.collector.fail(e.with_sources());
        }

        let mut report = self.collector.report(report);
        report.output_file_count = self.writer.segment_count();
        report.output_files = std::mem::take(&mut self.output_files);
        report
    }
}
