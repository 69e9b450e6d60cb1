//! Container reader interface.
//!
//! A [`RecordSource`] owns the iteration over a container and pushes the
//! records of one stream, in timestamp order, into a handler.

use std::ops::ControlFlow;

use crate::audio::AudioBlockSpec;
use crate::error::Result;

/// Kind of data a stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Audio blocks.
    Audio,
    /// Image frames.
    Image,
    /// Anything else.
    Other,
}

/// Description of one stream in a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    /// Stream identifier, used in output file names.
    pub id: String,
    /// What the stream carries.
    pub kind: StreamKind,
    /// Optional free-form flavor passed through to the summary.
    pub flavor: Option<String>,
}

impl StreamInfo {
    /// Describe an audio stream.
    #[must_use]
    pub fn audio(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: StreamKind::Audio,
            flavor: None,
        }
    }
}

/// Payload of one record.
#[derive(Debug, Clone, Copy)]
pub enum RecordContent<'a> {
    /// An audio block and its raw bytes.
    Audio {
        /// Layout of the block.
        spec: AudioBlockSpec,
        /// Raw block bytes, `spec.stride()` bytes per frame.
        data: &'a [u8],
    },
    /// A content block the reader could not interpret.
    Unsupported {
        /// Whether the block was meant to be audio.
        audio: bool,
        /// Reader's description of the block.
        description: &'a str,
    },
}

/// One timestamped record of a stream.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    /// Stream-relative timestamp in seconds.
    pub timestamp: f64,
    /// Record payload.
    pub content: RecordContent<'a>,
}

/// A demultiplexing container reader.
pub trait RecordSource {
    /// Path or URI of the container, for the summary.
    fn path_or_uri(&self) -> String;

    /// Streams present in the container.
    fn streams(&self) -> Vec<StreamInfo>;

    /// Push every record of `stream` into `handler`, in timestamp order.
    ///
    /// Iteration stops early when the handler returns `ControlFlow::Break`.
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read.
    fn read_records(
        &mut self,
        stream: &str,
        handler: &mut dyn FnMut(&Record<'_>) -> ControlFlow<()>,
    ) -> Result<()>;

    /// Earliest and latest image timestamps in the container, if known.
    fn image_time_range(&mut self) -> Option<(f64, f64)> {
        None
    }
}
