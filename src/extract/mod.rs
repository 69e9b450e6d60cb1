//! Audio track extraction.
//!
//! A [`RecordSource`] pushes the records of the audio stream into an
//! [`AudioTrackExtractor`], which writes segment files and gathers the
//! statistics reported in the summary.

mod extractor;
mod record;
mod track;

pub use extractor::AudioTrackExtractor;
pub use record::{Record, RecordContent, RecordSource, StreamInfo, StreamKind};
pub use track::{extract_audio_track, output_path_for};

use crate::audio::WavVariant;
use crate::constants::DEFAULT_JITTER_THRESHOLD;

/// Settings of one extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Output container flavour.
    pub variant: WavVariant,
    /// Tolerance in seconds before blocks are flagged early or late.
    pub jitter_threshold: f64,
    /// Optional lower size cap for segment files, in bytes.
    pub max_segment_size: Option<u64>,
    /// Show a progress spinner while records are processed.
    pub show_progress: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            variant: WavVariant::Wav,
            jitter_threshold: DEFAULT_JITTER_THRESHOLD,
            max_segment_size: None,
            show_progress: false,
        }
    }
}
