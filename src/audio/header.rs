//! WAV and Wave64 header encoding.
//!
//! Headers are written once when a segment is opened, with both size fields
//! zeroed, and patched once when the segment is closed and the amount of
//! sample data is known.
//!
//! WAV layout:
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    36 + data_size (placeholder 0)
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16
//! [20-21]  format code (1 PCM, 3 float, 6 A-law, 7 µ-law)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = sample_rate * channels * bytes_per_sample
//! [32-33]  block_align = channels * bytes_per_sample
//! [34-35]  bits_per_sample
//! [36-39]  "data"
//! [40-43]  data_size (placeholder 0)
//! ```
//!
//! Wave64 carries the same chunks with GUID tags and 64-bit sizes that
//! include the 24-byte chunk header.

use std::io::{self, Seek, SeekFrom, Write};

use serde::{Deserialize, Serialize};

use super::AudioBlockSpec;
use crate::constants::{format_code, w64, wav};

/// Output container flavour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WavVariant {
    /// Classic RIFF WAV, 32-bit sizes.
    #[default]
    Wav,
    /// Sony Wave64, 64-bit sizes.
    Wav64,
}

impl WavVariant {
    /// Header size in bytes.
    #[must_use]
    pub const fn header_size(self) -> u64 {
        match self {
            Self::Wav => wav::HEADER_SIZE,
            Self::Wav64 => w64::HEADER_SIZE,
        }
    }

    /// File size at which a segment must roll over.
    #[must_use]
    pub const fn size_cap(self) -> u64 {
        match self {
            Self::Wav => wav::SIZE_CAP,
            Self::Wav64 => w64::SIZE_CAP,
        }
    }

    /// File extension without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => wav::EXTENSION,
            Self::Wav64 => w64::EXTENSION,
        }
    }
}

impl std::fmt::Display for WavVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wav => write!(f, "wav"),
            Self::Wav64 => write!(f, "wav64"),
        }
    }
}

/// Select the `fmt ` format code for a spec.
///
/// Float wins over the companded formats; anything else is plain PCM.
#[must_use]
pub fn format_code(spec: &AudioBlockSpec) -> u16 {
    use super::SampleFormat;

    if spec.is_ieee_float() {
        format_code::IEEE_FLOAT
    } else if spec.sample_format == SampleFormat::ALaw {
        format_code::A_LAW
    } else if spec.sample_format == SampleFormat::MuLaw {
        format_code::MU_LAW
    } else {
        format_code::PCM
    }
}

/// Build the 16-byte `fmt ` chunk payload.
fn fmt_payload(spec: &AudioBlockSpec) -> [u8; 16] {
    let bytes_per_sample = spec.bytes_per_sample();
    let byte_rate = spec
        .sample_rate
        .wrapping_mul(u32::from(spec.channel_count))
        .wrapping_mul(bytes_per_sample);
    #[allow(clippy::cast_possible_truncation)]
    let block_align = (u32::from(spec.channel_count) * bytes_per_sample) as u16;

    let mut fmt = [0u8; 16];
    fmt[0..2].copy_from_slice(&format_code(spec).to_le_bytes());
    fmt[2..4].copy_from_slice(&spec.channel_count.to_le_bytes());
    fmt[4..8].copy_from_slice(&spec.sample_rate.to_le_bytes());
    fmt[8..12].copy_from_slice(&byte_rate.to_le_bytes());
    fmt[12..14].copy_from_slice(&block_align.to_le_bytes());
    fmt[14..16].copy_from_slice(&spec.bits_per_sample.to_le_bytes());
    fmt
}

/// Create a header for `spec` with both size fields zeroed.
#[must_use]
pub fn create_header(spec: &AudioBlockSpec, variant: WavVariant) -> Vec<u8> {
    let fmt = fmt_payload(spec);
    #[allow(clippy::cast_possible_truncation)]
    let mut header = Vec::with_capacity(variant.header_size() as usize);

    match variant {
        WavVariant::Wav => {
            header.extend_from_slice(b"RIFF");
            header.extend_from_slice(&0u32.to_le_bytes());
            header.extend_from_slice(b"WAVE");
            header.extend_from_slice(b"fmt ");
            header.extend_from_slice(&wav::FMT_CHUNK_SIZE.to_le_bytes());
            header.extend_from_slice(&fmt);
            header.extend_from_slice(b"data");
            header.extend_from_slice(&0u32.to_le_bytes());
        }
        WavVariant::Wav64 => {
            let fmt_chunk_size = w64::CHUNK_HEADER_SIZE + fmt.len() as u64;
            header.extend_from_slice(&w64::RIFF_GUID);
            header.extend_from_slice(&0u64.to_le_bytes());
            header.extend_from_slice(&w64::WAVE_GUID);
            header.extend_from_slice(&w64::FMT_GUID);
            header.extend_from_slice(&fmt_chunk_size.to_le_bytes());
            header.extend_from_slice(&fmt);
            header.extend_from_slice(&w64::DATA_GUID);
            header.extend_from_slice(&0u64.to_le_bytes());
        }
    }

    header
}

/// Patch the size fields of a header written by [`create_header`].
///
/// The current position of `out` is taken as the end of the sample data.
/// Returns the size of the sample data in bytes. The position is left at the
/// last patched field; callers close the file afterwards.
///
/// # Errors
///
/// Returns an error if seeking or writing fails, or if the position is
/// before the end of the header.
pub fn finalize_header<W: Write + Seek>(out: &mut W, variant: WavVariant) -> io::Result<u64> {
    let end = out.stream_position()?;
    let data_size = end.checked_sub(variant.header_size()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file position {end} is inside the {variant} header"),
        )
    })?;

    match variant {
        WavVariant::Wav => {
            // A single block larger than the cap still lands in one segment.
            let (Ok(riff_size), Ok(data_size_u32)) = (
                u32::try_from(wav::RIFF_SIZE_BASE + data_size),
                u32::try_from(data_size),
            ) else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{data_size} bytes of sample data do not fit a RIFF size field"),
                ));
            };
            out.seek(SeekFrom::Start(wav::RIFF_SIZE_OFFSET))?;
            out.write_all(&riff_size.to_le_bytes())?;
            out.seek(SeekFrom::Start(wav::DATA_SIZE_OFFSET))?;
            out.write_all(&data_size_u32.to_le_bytes())?;
        }
        WavVariant::Wav64 => {
            out.seek(SeekFrom::Start(w64::RIFF_SIZE_OFFSET))?;
            out.write_all(&end.to_le_bytes())?;
            out.seek(SeekFrom::Start(w64::DATA_SIZE_OFFSET))?;
            out.write_all(&(w64::CHUNK_HEADER_SIZE + data_size).to_le_bytes())?;
        }
    }
    out.flush()?;

    Ok(data_size)
}
