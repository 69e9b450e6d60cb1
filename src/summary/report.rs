//! Serializable extraction summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::status;
use crate::error::{Error, Result};

/// Summary of one extraction run, written next to the audio output.
///
/// Timing statistics are only present for successful runs. Audio format
/// fields are present whenever at least one block was seen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Input container path or URI.
    pub input: String,
    /// Requested output path.
    pub output: PathBuf,
    /// Identifier of the extracted stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    /// Flavor of the extracted stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_flavor: Option<String>,
    /// Earliest image record timestamp in the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_image_timestamp: Option<f64>,
    /// Latest image record timestamp in the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_image_timestamp: Option<f64>,
    /// `"success"` or a description of the failure.
    pub status: String,
    /// When the extraction ran.
    pub extraction_date: DateTime<Utc>,
    /// Segment files produced, in creation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub output_files: Vec<PathBuf>,
    /// Number of segment files produced.
    pub output_file_count: u32,
    /// Timestamp of the first audio record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_audio_record_timestamp: Option<f64>,
    /// Timestamp of the last audio record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_audio_record_timestamp: Option<f64>,
    /// Duration of the first audio record in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_audio_record_duration: Option<f64>,
    /// Duration of the last audio record in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_audio_record_duration: Option<f64>,
    /// Shortest record that is neither first nor last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_mid_audio_record_duration: Option<f64>,
    /// Longest record that is neither first nor last.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_mid_audio_record_duration: Option<f64>,
    /// Smallest gap between the end of a record and the next record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_audio_record_gap: Option<f64>,
    /// Largest gap between the end of a record and the next record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_audio_record_gap: Option<f64>,
    /// Seconds of audio written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_audio_duration: Option<f64>,
    /// Skipped blocks plus format discontinuities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_record_miss_count: Option<u32>,
    /// Evidence that record timestamps mark the first sample of a block
    /// (1.0) rather than the end of it (0.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_sample_timestamp_ratio: Option<f64>,
    /// Channel count of the last block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_channel_count: Option<u16>,
    /// Sample rate of the last block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_sample_rate: Option<u32>,
    /// Bits per sample of the last block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bits_per_sample: Option<u16>,
    /// Sample format of the last block.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_sample_format: Option<String>,
    /// Description of the first block's layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_audio_block_spec: Option<String>,
}

impl SummaryReport {
    /// Create a successful report with no statistics.
    #[must_use]
    pub fn new(input: impl Into<String>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            stream_id: None,
            stream_flavor: None,
            first_image_timestamp: None,
            last_image_timestamp: None,
            status: status::SUCCESS.to_string(),
            extraction_date: Utc::now(),
            output_files: Vec::new(),
            output_file_count: 0,
            first_audio_record_timestamp: None,
            last_audio_record_timestamp: None,
            first_audio_record_duration: None,
            last_audio_record_duration: None,
            min_mid_audio_record_duration: None,
            max_mid_audio_record_duration: None,
            min_audio_record_gap: None,
            max_audio_record_gap: None,
            total_audio_duration: None,
            audio_record_miss_count: None,
            first_sample_timestamp_ratio: None,
            audio_channel_count: None,
            audio_sample_rate: None,
            audio_bits_per_sample: None,
            audio_sample_format: None,
            first_audio_block_spec: None,
        }
    }

    /// Create a report for a run that failed before any data was written.
    #[must_use]
    pub fn failed(
        input: impl Into<String>,
        output: impl Into<PathBuf>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            status: status.into(),
            ..Self::new(input, output)
        }
    }

    /// Whether the extraction succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == status::SUCCESS
    }
}

/// Path of the summary file for an output path: `<output>.json`.
#[must_use]
pub fn summary_path(output: &Path) -> PathBuf {
    let mut path = output.as_os_str().to_owned();
    path.push(".");
    path.push(crate::constants::SUMMARY_EXTENSION);
    PathBuf::from(path)
}

/// Write the summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be created, serialization fails, or
/// the buffered bytes cannot be flushed to disk.
pub fn write_summary(path: &Path, report: &SummaryReport) -> Result<()> {
    let io_error = |source: std::io::Error| Error::SummaryIo {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report).map_err(|e| Error::SummaryWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    writer.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_summary_path_appends_extension() {
        assert_eq!(
            summary_path(Path::new("out/track.wav")),
            PathBuf::from("out/track.wav.json")
        );
    }

    #[test]
    fn test_failed_report_omits_statistics() {
        let report = SummaryReport::failed("in.mkv", "out.wav", status::NO_AUDIO_TRACK);
        assert!(!report.is_success());

        let json = serde_json::to_value(&report).expect("serialize");
        assert_eq!(json["status"], "No audio track found.");
        assert!(json.get("total_audio_duration").is_none());
        assert!(json.get("output_files").is_none());
        assert_eq!(json["output_file_count"], 0);
    }

    #[test]
    fn test_write_summary_roundtrip() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("track.wav.json");

        let mut report = SummaryReport::new("in.mkv", dir.path().join("track.wav"));
        report.stream_id = Some("1".to_string());
        report.total_audio_duration = Some(0.3);
        write_summary(&path, &report).expect("write summary");

        let content = std::fs::read_to_string(&path).expect("read file");
        let parsed: SummaryReport = serde_json::from_str(&content).expect("parse JSON");
        assert_eq!(parsed, report);
        assert!(parsed.is_success());
    }

    #[test]
    fn test_write_summary_missing_folder() {
        let dir = tempdir().expect("create temp dir");
        let path = dir.path().join("missing").join("track.wav.json");

        let result = write_summary(&path, &SummaryReport::new("in.mkv", "track.wav"));
        match result {
            Err(Error::SummaryIo { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected SummaryIo, got {other:?}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_summary_reports_full_disk() {
        // Writes to /dev/full succeed into the buffer and fail on flush.
        let result = write_summary(
            Path::new("/dev/full"),
            &SummaryReport::new("in.mkv", "track.wav"),
        );
        assert!(matches!(result, Err(Error::SummaryIo { .. })));
    }
}
