//! Audio block layout descriptors.

use std::fmt;

use serde::Serialize;

/// Encoding of an audio block as delivered by the container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// Unknown or not yet set.
    #[default]
    Undefined,
    /// Uncompressed samples.
    Pcm,
    /// Opus-compressed packets.
    Opus,
}

/// Representation of individual samples inside a PCM block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleFormat {
    /// Unknown or not yet set.
    #[default]
    Undefined,
    /// Signed integer samples.
    SignedInt,
    /// Unsigned integer samples.
    UnsignedInt,
    /// IEEE floating point samples.
    Float,
    /// ITU G.711 A-law companded samples.
    ALaw,
    /// ITU G.711 µ-law companded samples.
    MuLaw,
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "undefined"),
            Self::SignedInt => write!(f, "int"),
            Self::UnsignedInt => write!(f, "uint"),
            Self::Float => write!(f, "float"),
            Self::ALaw => write!(f, "alaw"),
            Self::MuLaw => write!(f, "mulaw"),
        }
    }
}

/// Layout of one audio block: what the samples are and how they sit in the
/// source buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AudioBlockSpec {
    /// Block encoding.
    pub audio_format: AudioFormat,
    /// Sample representation.
    pub sample_format: SampleFormat,
    /// Number of interleaved channels.
    pub channel_count: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per individual sample.
    pub bits_per_sample: u16,
    /// Number of sample frames in the block.
    pub sample_count: u32,
    /// Bytes between consecutive frames in the source buffer, 0 when packed.
    pub sample_block_stride: u32,
}

impl AudioBlockSpec {
    /// Describe a packed PCM block.
    #[must_use]
    pub fn pcm(
        sample_format: SampleFormat,
        channel_count: u16,
        sample_rate: u32,
        bits_per_sample: u16,
        sample_count: u32,
    ) -> Self {
        Self {
            audio_format: AudioFormat::Pcm,
            sample_format,
            channel_count,
            sample_rate,
            bits_per_sample,
            sample_count,
            sample_block_stride: 0,
        }
    }

    /// Set an explicit source stride.
    #[must_use]
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.sample_block_stride = stride;
        self
    }

    /// Bytes used by one sample once rounded up to whole bytes.
    #[must_use]
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from(self.bits_per_sample).div_ceil(8)
    }

    /// Bytes of one tightly packed frame (all channels of one sample).
    #[must_use]
    pub fn frame_size(&self) -> u32 {
        self.bytes_per_sample() * u32::from(self.channel_count)
    }

    /// Step between frames in the source buffer.
    #[must_use]
    pub fn stride(&self) -> u32 {
        if self.sample_block_stride == 0 {
            self.frame_size()
        } else {
            self.sample_block_stride
        }
    }

    /// Whether samples are IEEE floats.
    #[must_use]
    pub fn is_ieee_float(&self) -> bool {
        self.sample_format == SampleFormat::Float
    }

    /// Duration of the block in seconds, 0 when the rate is unknown.
    #[must_use]
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.sample_count) / f64::from(self.sample_rate)
    }

    /// Whether both specs can share one output file.
    ///
    /// Sample count and stride are per-block details and are ignored. An
    /// undefined spec is compatible with nothing.
    #[must_use]
    pub fn is_compatible_with(&self, other: &Self) -> bool {
        self.audio_format != AudioFormat::Undefined
            && self.audio_format == other.audio_format
            && self.sample_format == other.sample_format
            && self.channel_count == other.channel_count
            && self.bits_per_sample == other.bits_per_sample
            && self.sample_rate == other.sample_rate
    }
}

impl fmt::Display for AudioBlockSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format = match self.audio_format {
            AudioFormat::Undefined => "undefined",
            AudioFormat::Pcm => "pcm",
            AudioFormat::Opus => "opus",
        };
        write!(
            f,
            "{format}/{}{}/{}ch/{}Hz/{} samples",
            self.sample_format, self.bits_per_sample, self.channel_count, self.sample_rate,
            self.sample_count
        )?;
        if self.sample_block_stride != 0 && self.sample_block_stride != self.frame_size() {
            write!(f, "/stride {}", self.sample_block_stride)?;
        }
        Ok(())
    }
}
