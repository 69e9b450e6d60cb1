//! Audio segmentation engine.
//!
//! Turns a stream of PCM blocks into one or more WAV/W64 files while
//! checking that blocks arrive on the sample clock.

mod header;
mod segment;
mod spec;
mod timing;

pub use header::{WavVariant, create_header, finalize_header, format_code};
pub use segment::{ClosedSegment, Ingested, Rollover, SegmentWriter, copy_frames, exceeds_cap};
pub use spec::{AudioBlockSpec, AudioFormat, SampleFormat};
pub use timing::{Timing, TimingValidator};
