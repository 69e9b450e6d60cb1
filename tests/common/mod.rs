//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use trackwav::audio::{AudioBlockSpec, SampleFormat};
use trackwav::extract::{Record, RecordContent, RecordSource, StreamInfo};

/// In-memory container delivering pre-built audio blocks.
pub struct MemorySource {
    pub streams: Vec<StreamInfo>,
    pub blocks: Vec<(f64, AudioBlockSpec, Vec<u8>)>,
    pub image_range: Option<(f64, f64)>,
}

impl MemorySource {
    pub fn single_stream(id: &str) -> Self {
        Self {
            streams: vec![StreamInfo::audio(id)],
            blocks: Vec::new(),
            image_range: None,
        }
    }

    /// Append a block whose bytes are a ramp so content can be checked.
    pub fn push(&mut self, timestamp: f64, spec: AudioBlockSpec) {
        let len = (spec.stride() * spec.sample_count) as usize;
        let data = (0..len).map(|i| (i % 251) as u8).collect();
        self.blocks.push((timestamp, spec, data));
    }
}

impl RecordSource for MemorySource {
    fn path_or_uri(&self) -> String {
        "memory://recording".to_string()
    }

    fn streams(&self) -> Vec<StreamInfo> {
        self.streams.clone()
    }

    fn read_records(
        &mut self,
        _stream: &str,
        handler: &mut dyn FnMut(&Record<'_>) -> ControlFlow<()>,
    ) -> trackwav::Result<()> {
        for (timestamp, spec, data) in &self.blocks {
            let record = Record {
                timestamp: *timestamp,
                content: RecordContent::Audio {
                    spec: *spec,
                    data,
                },
            };
            if handler(&record).is_break() {
                break;
            }
        }
        Ok(())
    }

    fn image_time_range(&mut self) -> Option<(f64, f64)> {
        self.image_range
    }
}

pub fn mono16(samples: u32) -> AudioBlockSpec {
    AudioBlockSpec::pcm(SampleFormat::SignedInt, 1, 16_000, 16, samples)
}

pub fn stereo16(samples: u32) -> AudioBlockSpec {
    AudioBlockSpec::pcm(SampleFormat::SignedInt, 2, 16_000, 16, samples)
}

/// Segment files in `dir` with the given extension, sorted by name.
pub fn segment_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .expect("read output dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .collect();
    files.sort();
    files
}

/// Write a 16-bit PCM WAV input file with hound.
pub fn write_input_wav(path: &Path, channels: u16, sample_rate: u32, frames: u32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create input wav");
    for i in 0..frames * u32::from(channels) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        writer
            .write_sample(((i % 2000) as i16) - 1000)
            .expect("write sample");
    }
    writer.finalize().expect("finalize input wav");
}
