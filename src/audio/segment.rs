//! Segmented WAV output for one audio stream.
//!
//! A [`SegmentWriter`] keeps at most one output file open. Before each block
//! it decides whether the block fits the open file; if not, the file is
//! finalized and a new one is started.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::header::{WavVariant, create_header, finalize_header};
use super::timing::{Timing, TimingValidator};
use super::AudioBlockSpec;
use crate::constants::{DEFAULT_JITTER_THRESHOLD, SEQUENCE_WIDTH};
use crate::error::{Error, Result};

/// Why a new segment was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// No segment was open.
    First,
    /// The block layout differs from the open segment's.
    FormatChange,
    /// The block would push the file to the size cap.
    SizeCap,
}

/// Result of ingesting one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    /// Set when this block opened a new segment.
    pub rollover: Option<Rollover>,
    /// Frames copied into the segment.
    pub frames_written: u32,
    /// Whether the source buffer held fewer frames than announced.
    pub truncated: bool,
    /// Timing classification of the block.
    pub timing: Timing,
}

impl Ingested {
    /// Number of output files created by this call.
    #[must_use]
    pub fn segments_created(&self) -> u32 {
        u32::from(self.rollover.is_some())
    }
}

/// A closed segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedSegment {
    /// Path of the finalized file.
    pub path: PathBuf,
    /// Bytes of sample data in the file.
    pub data_size: u64,
}

/// The currently open output file.
struct Segment {
    file: BufWriter<File>,
    path: PathBuf,
    spec: AudioBlockSpec,
    position: u64,
    timing: TimingValidator,
}

/// Writes the blocks of one stream into a sequence of WAV/W64 files.
pub struct SegmentWriter {
    folder: PathBuf,
    stream_id: String,
    variant: WavVariant,
    size_cap: u64,
    jitter_threshold: f64,
    sequence: u32,
    current: Option<Segment>,
    frame_buffer: Vec<u8>,
}

impl SegmentWriter {
    /// Create a writer placing segments of `stream_id` into `folder`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, stream_id: impl Into<String>, variant: WavVariant) -> Self {
        Self {
            folder: folder.into(),
            stream_id: stream_id.into(),
            variant,
            size_cap: variant.size_cap(),
            jitter_threshold: DEFAULT_JITTER_THRESHOLD,
            sequence: 0,
            current: None,
            frame_buffer: Vec::new(),
        }
    }

    /// Lower the file size at which segments roll over.
    ///
    /// The cap never exceeds the variant's own limit.
    #[must_use]
    pub fn with_size_cap(mut self, cap: u64) -> Self {
        self.size_cap = cap.min(self.variant.size_cap());
        self
    }

    /// Set the tolerance in seconds used to flag early or late blocks.
    #[must_use]
    pub fn with_jitter_threshold(mut self, threshold: f64) -> Self {
        self.jitter_threshold = threshold;
        self
    }

    /// Effective size cap in bytes.
    #[must_use]
    pub fn size_cap(&self) -> u64 {
        self.size_cap
    }

    /// Number of segments created so far.
    #[must_use]
    pub fn segment_count(&self) -> u32 {
        self.sequence
    }

    /// Path of the open segment, if any.
    #[must_use]
    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_ref().map(|segment| segment.path.as_path())
    }

    /// Write position of the open segment, if any.
    #[must_use]
    pub fn current_position(&self) -> Option<u64> {
        self.current.as_ref().map(|segment| segment.position)
    }

    /// File name of a segment.
    ///
    /// Format: `{stream}-{sequence:04}-{timestamp:.3}.{ext}`
    /// Example: `214-1-0002-12.345.wav`
    #[must_use]
    pub fn segment_file_name(&self, sequence: u32, timestamp: f64) -> String {
        format!(
            "{}-{sequence:0width$}-{timestamp:.3}.{}",
            self.stream_id,
            self.variant.extension(),
            width = SEQUENCE_WIDTH
        )
    }

    /// Decide whether a block with `spec`, adding `incoming` bytes, needs a
    /// new segment.
    fn rollover_reason(&self, spec: &AudioBlockSpec, incoming: u64) -> Option<Rollover> {
        let Some(segment) = &self.current else {
            return Some(Rollover::First);
        };
        if !segment.spec.is_compatible_with(spec) {
            return Some(Rollover::FormatChange);
        }
        if exceeds_cap(segment.position, incoming, self.size_cap) {
            return Some(Rollover::SizeCap);
        }
        None
    }

    /// Append one block to the stream.
    ///
    /// Starts a new segment first when none is open, the layout changed, or
    /// the block would reach the size cap. A buffer shorter than the
    /// announced sample count is copied up to its last whole frame.
    ///
    /// # Errors
    ///
    /// Returns an error if a segment cannot be created, written or
    /// finalized. Such errors are fatal for the stream.
    pub fn ingest(&mut self, timestamp: f64, spec: &AudioBlockSpec, data: &[u8]) -> Result<Ingested> {
        self.frame_buffer.clear();
        let frames_written = copy_frames(
            data,
            spec.frame_size() as usize,
            spec.stride() as usize,
            spec.sample_count as usize,
            &mut self.frame_buffer,
        );
        let truncated = frames_written < spec.sample_count as usize;
        if truncated {
            warn!(
                "Malformed audio block at {timestamp:.3}: {} of {} frames available",
                frames_written, spec.sample_count
            );
        }

        let rollover = self.rollover_reason(spec, self.frame_buffer.len() as u64);
        if let Some(reason) = rollover {
            debug!("Rollover at {timestamp:.3}: {reason:?}");
            self.open(timestamp, spec)?;
        }

        let segment = self.current.as_mut().ok_or_else(|| Error::Internal {
            message: "no open segment after rollover".to_string(),
        })?;
        segment
            .file
            .write_all(&self.frame_buffer)
            .map_err(|e| Error::SegmentWrite {
                path: segment.path.clone(),
                source: e,
            })?;
        segment.position += self.frame_buffer.len() as u64;

        let timing = segment
            .timing
            .observe(timestamp, segment.spec.sample_rate, spec.sample_count);
        match timing {
            Timing::Late { actual, expected } => {
                warn!("Audio block at {actual:.3}s is late, expected at {expected:.3}s");
            }
            Timing::Early { actual, expected } => {
                warn!("Audio block at {actual:.3}s is early, expected at {expected:.3}s");
            }
            Timing::SegmentStart | Timing::OnTime => {}
        }

        Ok(Ingested {
            rollover,
            frames_written: u32::try_from(frames_written).unwrap_or(spec.sample_count),
            truncated,
            timing,
        })
    }

    /// Finalize the open segment and start a new one.
    fn open(&mut self, timestamp: f64, spec: &AudioBlockSpec) -> Result<()> {
        self.close()?;

        let path = self
            .folder
            .join(self.segment_file_name(self.sequence, timestamp));
        info!("Writing {}", path.display());

        let file = File::create(&path).map_err(|e| Error::SegmentCreate {
            path: path.clone(),
            source: e,
        })?;
        let mut file = BufWriter::new(file);
        let header = create_header(spec, self.variant);
        file.write_all(&header).map_err(|e| Error::SegmentWrite {
            path: path.clone(),
            source: e,
        })?;

        self.current = Some(Segment {
            file,
            path,
            spec: *spec,
            position: header.len() as u64,
            timing: TimingValidator::new(self.jitter_threshold),
        });
        self.sequence += 1;
        Ok(())
    }

    /// Finalize and close the open segment.
    ///
    /// Does nothing when no segment is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be patched.
    pub fn close(&mut self) -> Result<Option<ClosedSegment>> {
        let Some(mut segment) = self.current.take() else {
            return Ok(None);
        };

        let data_size =
            finalize_header(&mut segment.file, self.variant).map_err(|e| Error::SegmentFinalize {
                path: segment.path.clone(),
                source: e,
            })?;
        debug!(
            "Closed {} ({} bytes of audio data)",
            segment.path.display(),
            data_size
        );

        Ok(Some(ClosedSegment {
            path: segment.path,
            data_size,
        }))
    }
}

impl Drop for SegmentWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to finalize segment on teardown: {e}");
        }
    }
}

/// Whether appending `incoming` bytes at `position` reaches `cap`.
#[must_use]
pub fn exceeds_cap(position: u64, incoming: u64, cap: u64) -> bool {
    position.saturating_add(incoming) >= cap
}

/// Copy up to `count` frames of `frame_size` bytes, stepping `stride` bytes
/// through `src`, into `out`.
///
/// Padding between frames is dropped. Stops at the first frame that does not
/// fit entirely in `src`. Returns the number of frames copied.
pub fn copy_frames(
    src: &[u8],
    frame_size: usize,
    stride: usize,
    count: usize,
    out: &mut Vec<u8>,
) -> usize {
    if frame_size == 0 {
        return 0;
    }
    let stride = stride.max(frame_size);
    out.reserve(count.saturating_mul(frame_size).min(src.len()));

    let mut copied = 0;
    for frame in src.chunks(stride).take(count) {
        let Some(samples) = frame.get(..frame_size) else {
            break;
        };
        out.extend_from_slice(samples);
        copied += 1;
    }
    copied
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::SampleFormat;
    use tempfile::TempDir;

    fn mono16(samples: u32) -> AudioBlockSpec {
        AudioBlockSpec::pcm(SampleFormat::SignedInt, 1, 16_000, 16, samples)
    }

    #[test]
    fn test_copy_frames_packed() {
        let src: Vec<u8> = (0..8).collect();
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 2, 2, 4, &mut out), 4);
        assert_eq!(out, src);
    }

    #[test]
    fn test_copy_frames_drops_padding() {
        let src = [1, 2, 0, 0, 3, 4, 0, 0, 5, 6, 0, 0];
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 2, 4, 3, &mut out), 3);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_copy_frames_stops_at_partial_frame() {
        let src = [1, 2, 0, 0, 3, 4, 0, 0, 5];
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 2, 4, 3, &mut out), 2);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_frames_last_frame_without_padding() {
        // The last frame does not need its trailing padding to be present.
        let src = [1, 2, 0, 0, 3, 4];
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 2, 4, 2, &mut out), 2);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_frames_honours_count() {
        let src = [0u8; 100];
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 4, 4, 3, &mut out), 3);
        assert_eq!(out.len(), 12);
    }

    #[test]
    fn test_copy_frames_huge_frame_short_buffer() {
        // 65535 channels of 65535-bit samples against an 8-byte block.
        let src = [0u8; 8];
        let mut out = Vec::new();
        assert_eq!(copy_frames(&src, 65_535 * 8192, 0, 1600, &mut out), 0);
        assert!(out.is_empty());
        assert!(out.capacity() <= 1024);
    }

    #[test]
    fn test_exceeds_cap_boundaries() {
        for cap in [WavVariant::Wav.size_cap(), WavVariant::Wav64.size_cap()] {
            let position = 1000;
            assert!(!exceeds_cap(position, cap - 1 - position, cap));
            assert!(exceeds_cap(position, cap - position, cap));
            assert!(exceeds_cap(position, cap + 1 - position, cap));
        }
        assert!(exceeds_cap(u64::MAX, 1, u64::MAX));
    }

    #[test]
    fn test_segment_file_name() {
        let writer = SegmentWriter::new("/tmp", "214-1", WavVariant::Wav);
        assert_eq!(writer.segment_file_name(2, 12.3456), "214-1-0002-12.346.wav");
        let writer = SegmentWriter::new("/tmp", "7", WavVariant::Wav64);
        assert_eq!(writer.segment_file_name(0, 0.0), "7-0000-0.000.w64");
    }

    #[test]
    fn test_size_cap_is_clamped_to_variant() {
        let writer = SegmentWriter::new("/tmp", "1", WavVariant::Wav).with_size_cap(u64::MAX);
        assert_eq!(writer.size_cap(), WavVariant::Wav.size_cap());
        let writer = SegmentWriter::new("/tmp", "1", WavVariant::Wav).with_size_cap(1000);
        assert_eq!(writer.size_cap(), 1000);
    }

    #[test]
    fn test_rollover_reasons() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav);
        let block = vec![0u8; 3200];

        let first = writer.ingest(0.0, &mono16(1600), &block).unwrap();
        assert_eq!(first.rollover, Some(Rollover::First));

        let same = writer.ingest(0.1, &mono16(1600), &block).unwrap();
        assert_eq!(same.rollover, None);
        assert_eq!(same.segments_created(), 0);

        let stereo = AudioBlockSpec {
            channel_count: 2,
            ..mono16(800)
        };
        let changed = writer.ingest(0.2, &stereo, &block).unwrap();
        assert_eq!(changed.rollover, Some(Rollover::FormatChange));
        assert_eq!(changed.segments_created(), 1);
        assert_eq!(writer.segment_count(), 2);
    }

    #[test]
    fn test_size_cap_rollover_at_boundary() {
        // Header (44) + two blocks of 100 bytes ends at 244.
        for (cap, expected) in [
            (245, None),
            (244, Some(Rollover::SizeCap)),
            (243, Some(Rollover::SizeCap)),
        ] {
            let dir = TempDir::new().unwrap();
            let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav).with_size_cap(cap);
            let block = vec![0u8; 100];

            writer.ingest(0.0, &mono16(50), &block).unwrap();
            let second = writer.ingest(0.1, &mono16(50), &block).unwrap();
            assert_eq!(second.rollover, expected, "cap {cap}");
        }
    }

    #[test]
    fn test_timing_is_checked_within_segment() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav);
        let block = vec![0u8; 3200];

        // Each block holds 100 ms of audio.
        let first = writer.ingest(0.0, &mono16(1600), &block).unwrap();
        assert_eq!(first.timing, Timing::SegmentStart);

        let on_time = writer.ingest(0.105, &mono16(1600), &block).unwrap();
        assert_eq!(on_time.timing, Timing::OnTime);

        let late = writer.ingest(0.215, &mono16(1600), &block).unwrap();
        assert!(matches!(late.timing, Timing::Late { .. }), "{:?}", late.timing);

        let early = writer.ingest(0.28, &mono16(1600), &block).unwrap();
        assert!(
            matches!(early.timing, Timing::Early { .. }),
            "{:?}",
            early.timing
        );
    }

    #[test]
    fn test_format_change_restarts_timing() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav);
        let stereo = AudioBlockSpec {
            channel_count: 2,
            ..mono16(1600)
        };

        writer.ingest(0.0, &mono16(1600), &[0u8; 3200]).unwrap();
        writer.ingest(0.1, &mono16(1600), &[0u8; 3200]).unwrap();
        // Far off the old segment's clock, but it opens a new segment.
        let changed = writer.ingest(0.5, &stereo, &[0u8; 6400]).unwrap();
        assert_eq!(changed.rollover, Some(Rollover::FormatChange));
        assert_eq!(changed.timing, Timing::SegmentStart);

        let next = writer.ingest(0.6, &stereo, &[0u8; 6400]).unwrap();
        assert_eq!(next.timing, Timing::OnTime);
    }

    #[test]
    fn test_size_cap_rollover_starts_fresh_segment() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav).with_size_cap(244);
        let block = vec![0u8; 100];

        writer.ingest(0.0, &mono16(50), &block).unwrap();
        let second = writer.ingest(0.9, &mono16(50), &block).unwrap();
        assert_eq!(second.rollover, Some(Rollover::SizeCap));
        assert_eq!(second.timing, Timing::SegmentStart);
        assert_eq!(writer.segment_count(), 2);
        assert_eq!(writer.current_position(), Some(144));
        assert!(
            writer
                .current_path()
                .unwrap()
                .ends_with("1-0001-0.900.wav")
        );
    }

    #[test]
    fn test_close_without_segment_is_noop() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav);
        assert_eq!(writer.close().unwrap(), None);
        assert_eq!(writer.segment_count(), 0);
    }

    #[test]
    fn test_close_reports_data_size() {
        let dir = TempDir::new().unwrap();
        let mut writer = SegmentWriter::new(dir.path(), "1", WavVariant::Wav);
        writer.ingest(0.0, &mono16(4), &[0u8; 8]).unwrap();
        let closed = writer.close().unwrap().unwrap();
        assert_eq!(closed.data_size, 8);
        assert_eq!(std::fs::metadata(&closed.path).unwrap().len(), 52);
    }

    #[test]
    fn test_create_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut writer = SegmentWriter::new(missing, "1", WavVariant::Wav);
        let result = writer.ingest(0.0, &mono16(4), &[0u8; 8]);
        assert!(matches!(result, Err(Error::SegmentCreate { .. })));
    }
}
