//! Audio file I/O for Segmix
//!
//! Handles importing and exporting WAV files around the transformation
//! engine. The source format (sample rate, bit depth, int/float) is captured
//! on import and reused on export, so a transformed file keeps the container
//! characteristics of its input — there is no internal format conversion.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{Result, SegmixError};

/// Source format captured on import and applied on export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth: 16, 24, or 32
    pub bits_per_sample: u16,
    /// Integer or float sample encoding
    pub sample_format: SampleFormat,
}

impl Default for WavFormat {
    fn default() -> Self {
        WavFormat {
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        }
    }
}

/// Import a WAV file into an [`AudioBuffer`], capturing its format
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a valid WAV file
/// * `UnsupportedFormat` - If the audio has more than 2 channels or an
///   unsupported bit depth
pub fn import_wav(path: &Path) -> Result<(AudioBuffer, WavFormat)> {
    if !path.exists() {
        return Err(SegmixError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| SegmixError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout = ChannelLayout::from_count(channels).ok_or(SegmixError::UnsupportedFormat {
        format: format!("{}-channel audio (only mono/stereo supported)", channels),
    })?;

    let format = WavFormat {
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        sample_format: spec.sample_format,
    };

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    if interleaved.len() % channels != 0 {
        return Err(SegmixError::InvalidAudio {
            reason: format!(
                "Sample count {} is not divisible by channel count {}",
                interleaved.len(),
                channels
            ),
            source: None,
        });
    }

    let frames = interleaved.len() / channels;
    let mut buffer = AudioBuffer::new(frames, layout, spec.sample_rate);

    for (i, frame) in interleaved.chunks_exact(channels).enumerate() {
        for (ch, &sample) in frame.iter().enumerate() {
            buffer.samples[ch][i] = sample;
        }
    }

    Ok((buffer, format))
}

/// Export an [`AudioBuffer`] to a WAV file with the given format
///
/// The buffer's own sample rate must match the format; callers that obtained
/// both from [`import_wav`] and only sliced/concatenated in between satisfy
/// this automatically.
pub fn export_wav(buffer: &AudioBuffer, path: &Path, format: WavFormat) -> Result<()> {
    if buffer.sample_rate != format.sample_rate {
        return Err(SegmixError::InvalidAudio {
            reason: format!(
                "Buffer sample rate {} Hz does not match export format {} Hz",
                buffer.sample_rate, format.sample_rate
            ),
            source: None,
        });
    }

    let spec = WavSpec {
        channels: buffer.channels() as u16,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: format.sample_format,
    };

    let mut writer = WavWriter::create(path, spec)
        .map_err(|e| SegmixError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

    let frames = buffer.len();
    match (format.sample_format, format.bits_per_sample) {
        (SampleFormat::Float, 32) => {
            for i in 0..frames {
                for ch in &buffer.samples {
                    write_sample(&mut writer, ch[i])?;
                }
            }
        }
        (SampleFormat::Int, 16) => {
            for i in 0..frames {
                for ch in &buffer.samples {
                    let scaled = (ch[i] * 32767.0).clamp(-32768.0, 32767.0) as i16;
                    write_sample(&mut writer, scaled)?;
                }
            }
        }
        (SampleFormat::Int, 24) => {
            for i in 0..frames {
                for ch in &buffer.samples {
                    // 24-bit stored as i32 in hound
                    let scaled = (ch[i] * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                    write_sample(&mut writer, scaled)?;
                }
            }
        }
        (SampleFormat::Int, 32) => {
            for i in 0..frames {
                for ch in &buffer.samples {
                    let scaled = (ch[i] as f64 * 2147483647.0)
                        .clamp(-2147483648.0, 2147483647.0) as i32;
                    write_sample(&mut writer, scaled)?;
                }
            }
        }
        (_, bits) => {
            return Err(SegmixError::UnsupportedFormat {
                format: format!("{}-bit {:?} audio", bits, format.sample_format),
            });
        }
    }

    writer
        .finalize()
        .map_err(|e| SegmixError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

    Ok(())
}

/// Generate a test tone (sine wave)
///
/// Creates a mono AudioBuffer containing a sine wave at the specified
/// frequency. Useful for testing transformation pipelines.
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_frames = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_frames, ChannelLayout::Mono, sample_rate);

    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    for (i, sample) in buffer.samples[0].iter_mut().enumerate() {
        *sample = (angular_freq * i as f32).sin();
    }

    buffer
}

fn write_sample<S: hound::Sample, W: std::io::Write + std::io::Seek>(
    writer: &mut WavWriter<W>,
    sample: S,
) -> Result<()> {
    writer
        .write_sample(sample)
        .map_err(|e| SegmixError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}

/// Read samples from a WAV reader and convert to f32 in [-1, 1]
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| SegmixError::InvalidAudio {
                reason: format!("Failed to read float samples: {}", e),
                source: Some(Box::new(e)),
            }),
        SampleFormat::Int => match bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| SegmixError::InvalidAudio {
                    reason: format!("Failed to read 16-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| SegmixError::InvalidAudio {
                    reason: format!("Failed to read 24-bit samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| SegmixError::InvalidAudio {
                    reason: format!("Failed to read 32-bit int samples: {}", e),
                    source: Some(Box::new(e)),
                }),
            _ => Err(SegmixError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
