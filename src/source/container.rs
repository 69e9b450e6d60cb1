//! Container reading using symphonia.

use std::fs::File;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use symphonia::core::audio::{AudioBufferRef, SampleBuffer, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::ConvertibleSample;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::TimeBase;
use tracing::{debug, warn};

use crate::audio::{AudioBlockSpec, SampleFormat};
use crate::error::{Error, Result};
use crate::extract::{Record, RecordContent, RecordSource, StreamInfo, StreamKind};

/// A media container read with symphonia.
///
/// Each decoded packet of the selected track becomes one record holding
/// interleaved little-endian PCM.
pub struct ContainerSource {
    path: PathBuf,
    format: Box<dyn FormatReader>,
}

impl ContainerSource {
    /// Open and probe a container file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its format is not
    /// recognized.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::InputOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

        // Create hint from file extension
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| Error::InputOpen {
                path: path.to_path_buf(),
                source: Box::new(e),
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            format: probed.format,
        })
    }

    fn read_error(&self, source: symphonia::core::errors::Error) -> Error {
        Error::RecordRead {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

fn is_audio_track(track: &Track) -> bool {
    track.codec_params.codec != CODEC_TYPE_NULL && track.codec_params.sample_rate.is_some()
}

impl RecordSource for ContainerSource {
    fn path_or_uri(&self) -> String {
        self.path.display().to_string()
    }

    fn streams(&self) -> Vec<StreamInfo> {
        let codecs = symphonia::default::get_codecs();
        self.format
            .tracks()
            .iter()
            .map(|track| StreamInfo {
                id: track.id.to_string(),
                kind: if is_audio_track(track) {
                    StreamKind::Audio
                } else {
                    StreamKind::Other
                },
                flavor: codecs
                    .get_codec(track.codec_params.codec)
                    .map(|codec| codec.short_name.to_string()),
            })
            .collect()
    }

    fn read_records(
        &mut self,
        stream: &str,
        handler: &mut dyn FnMut(&Record<'_>) -> ControlFlow<()>,
    ) -> Result<()> {
        let track = self
            .format
            .tracks()
            .iter()
            .find(|track| track.id.to_string() == stream)
            .ok_or_else(|| Error::StreamNotFound {
                id: stream.to_string(),
            })?;
        let track_id = track.id;
        let time_base = track.codec_params.time_base;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(0);

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| Error::InputOpen {
                path: self.path.clone(),
                source: Box::new(e),
            })?;

        let mut block = Vec::new();
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(symphonia::core::errors::Error::ResetRequired) => {
                    warn!("Track list changed mid-stream, stopping at this point");
                    break;
                }
                Err(e) => return Err(self.read_error(e)),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let timestamp = packet_time(packet.ts(), time_base, sample_rate);
            let flow = match decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = interleave_pcm(decoded, &mut block);
                    handler(&Record {
                        timestamp,
                        content: RecordContent::Audio { spec, data: &block },
                    })
                }
                Err(symphonia::core::errors::Error::DecodeError(reason)) => {
                    debug!("Undecodable packet at {timestamp:.3}: {reason}");
                    handler(&Record {
                        timestamp,
                        content: RecordContent::Unsupported {
                            audio: true,
                            description: reason,
                        },
                    })
                }
                Err(e) => return Err(self.read_error(e)),
            };

            if flow.is_break() {
                break;
            }
        }

        Ok(())
    }
}

/// Convert a packet timestamp to seconds.
#[allow(clippy::cast_precision_loss)]
fn packet_time(ts: u64, time_base: Option<TimeBase>, sample_rate: u32) -> f64 {
    match time_base {
        Some(time_base) => {
            let time = time_base.calc_time(ts);
            time.seconds as f64 + time.frac
        }
        None if sample_rate > 0 => ts as f64 / f64::from(sample_rate),
        None => 0.0,
    }
}

fn interleaved<S: ConvertibleSample>(decoded: AudioBufferRef<'_>) -> SampleBuffer<S> {
    let mut buffer = SampleBuffer::<S>::new(decoded.capacity() as u64, *decoded.spec());
    buffer.copy_interleaved_ref(decoded);
    buffer
}

/// Write a decoded buffer into `out` as interleaved little-endian PCM and
/// describe the result.
///
/// 8-bit unsigned stays 8-bit unsigned, other integer widths below 24 bits
/// widen to 16-bit, 24-bit stays 24-bit packed, 32-bit stays 32-bit and
/// floats keep their width.
fn interleave_pcm(decoded: AudioBufferRef<'_>, out: &mut Vec<u8>) -> AudioBlockSpec {
    let signal = *decoded.spec();
    let frames = decoded.frames();
    out.clear();

    let (sample_format, bits_per_sample) = match decoded {
        AudioBufferRef::U8(_) => {
            out.extend_from_slice(interleaved::<u8>(decoded).samples());
            (SampleFormat::UnsignedInt, 8)
        }
        AudioBufferRef::S8(_) | AudioBufferRef::U16(_) | AudioBufferRef::S16(_) => {
            for sample in interleaved::<i16>(decoded).samples() {
                out.extend_from_slice(&sample.to_le_bytes());
            }
            (SampleFormat::SignedInt, 16)
        }
        AudioBufferRef::U24(_) | AudioBufferRef::S24(_) => {
            for sample in interleaved::<i32>(decoded).samples() {
                out.extend_from_slice(&(sample >> 8).to_le_bytes()[..3]);
            }
            (SampleFormat::SignedInt, 24)
        }
        AudioBufferRef::U32(_) | AudioBufferRef::S32(_) => {
            for sample in interleaved::<i32>(decoded).samples() {
                out.extend_from_slice(&sample.to_le_bytes());
            }
            (SampleFormat::SignedInt, 32)
        }
        AudioBufferRef::F32(_) => {
            for sample in interleaved::<f32>(decoded).samples() {
                out.extend_from_slice(&sample.to_le_bytes());
            }
            (SampleFormat::Float, 32)
        }
        AudioBufferRef::F64(_) => {
            for sample in interleaved::<f64>(decoded).samples() {
                out.extend_from_slice(&sample.to_le_bytes());
            }
            (SampleFormat::Float, 64)
        }
    };

    AudioBlockSpec::pcm(
        sample_format,
        u16::try_from(signal.channels.count()).unwrap_or(u16::MAX),
        signal.rate,
        bits_per_sample,
        u32::try_from(frames).unwrap_or(u32::MAX),
    )
}
