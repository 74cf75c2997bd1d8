//! Audio Buffer Management
//!
//! The central data model: an ordered, sliceable, concatenable view over
//! decoded audio. Cut points are expressed in milliseconds and converted to
//! frame offsets against the buffer's own sample rate, so all boundary
//! arithmetic lives here and nowhere else.
//!
//! Every operation is pure: slicing, concatenation, and repetition return a
//! new buffer and leave the source untouched.

use crate::error::{Result, SegmixError};

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for all segment transformations
///
/// Stores audio as non-interleaved 32-bit floating point samples; each
/// channel is a separate `Vec<f32>`. The sample rate is carried with the
/// buffer so millisecond offsets stay meaningful across sources with
/// different rates — there is no internal resampling.
///
/// # Example
/// ```
/// use segmix::engine::buffer::{AudioBuffer, ChannelLayout};
///
/// // One second of silence at 48kHz, stereo
/// let buffer = AudioBuffer::silent(1000, ChannelLayout::Stereo, 48000);
/// assert_eq!(buffer.len_ms(), 1000);
/// assert_eq!(buffer.channels(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is frames
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a zeroed buffer with the given frame count
    pub fn new(num_frames: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        let samples = vec![vec![0.0_f32; num_frames]; layout.num_channels()];
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a silent buffer of the given duration in milliseconds
    pub fn silent(duration_ms: u64, layout: ChannelLayout, sample_rate: u32) -> Self {
        let frames = ms_to_frames(duration_ms, sample_rate);
        Self::new(frames, layout, sample_rate)
    }

    /// Create a silent buffer matching another buffer's layout and rate
    pub fn silent_like(duration_ms: u64, like: &AudioBuffer) -> Self {
        let frames = ms_to_frames(duration_ms, like.sample_rate);
        let samples = vec![vec![0.0_f32; frames]; like.channels()];
        Self {
            samples,
            sample_rate: like.sample_rate,
        }
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of frames (samples per channel)
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer has no frames
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in whole milliseconds (floor)
    #[inline]
    pub fn len_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Get the channel layout
    pub fn channel_layout(&self) -> Option<ChannelLayout> {
        ChannelLayout::from_count(self.channels())
    }

    /// Get immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Get mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Convert a millisecond offset into a frame offset for this buffer
    #[inline]
    pub fn frame_at_ms(&self, ms: u64) -> usize {
        ms_to_frames(ms, self.sample_rate)
    }

    /// Slice the buffer over `[start_ms, end_ms)`
    ///
    /// Offsets are clamped to the buffer bounds, and `end_ms` is clamped to
    /// be at least `start_ms`, so this never panics. For in-range offsets the
    /// result covers exactly the frame span of `[start_ms, end_ms)`.
    pub fn slice_ms(&self, start_ms: u64, end_ms: u64) -> AudioBuffer {
        let len = self.len();
        let start = self.frame_at_ms(start_ms).min(len);
        let end = self.frame_at_ms(end_ms).clamp(start, len);

        let samples = self
            .samples
            .iter()
            .map(|ch| ch[start..end].to_vec())
            .collect();

        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Concatenate another buffer after this one
    ///
    /// Frame-exact append: the result length is the sum of both lengths with
    /// no gap or overlap. Channel counts and sample rates must match.
    pub fn concat(&self, other: &AudioBuffer) -> Result<AudioBuffer> {
        if self.channels() != other.channels() {
            return Err(SegmixError::InvalidAudio {
                reason: format!(
                    "Cannot concatenate {}-channel and {}-channel buffers",
                    self.channels(),
                    other.channels()
                ),
                source: None,
            });
        }
        if self.sample_rate != other.sample_rate {
            return Err(SegmixError::InvalidAudio {
                reason: format!(
                    "Cannot concatenate buffers at {} Hz and {} Hz",
                    self.sample_rate, other.sample_rate
                ),
                source: None,
            });
        }

        let samples = self
            .samples
            .iter()
            .zip(other.samples.iter())
            .map(|(a, b)| {
                let mut ch = Vec::with_capacity(a.len() + b.len());
                ch.extend_from_slice(a);
                ch.extend_from_slice(b);
                ch
            })
            .collect();

        Ok(AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
        })
    }

    /// Repeat the buffer `times` times by direct concatenation
    ///
    /// Each repetition boundary is a hard edit; no crossfade is applied.
    pub fn repeated(&self, times: u32) -> AudioBuffer {
        let frames = self.len();
        let samples = self
            .samples
            .iter()
            .map(|ch| {
                let mut out = Vec::with_capacity(frames * times as usize);
                for _ in 0..times {
                    out.extend_from_slice(ch);
                }
                out
            })
            .collect();

        AudioBuffer {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// Check if all samples are finite (not NaN or Infinity)
    pub fn is_finite(&self) -> bool {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .all(|s| s.is_finite())
    }

    /// Peak absolute sample value across all channels
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|s| s.abs())
            .fold(0.0_f32, f32::max)
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new(0, ChannelLayout::Stereo, 48000)
    }
}

/// Convert a millisecond duration to a frame count at the given rate (floor)
#[inline]
pub fn ms_to_frames(ms: u64, sample_rate: u32) -> usize {
    (ms * sample_rate as u64 / 1000) as usize
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const RATE: u32 = 48000;

    fn ramp_buffer(frames: usize) -> AudioBuffer {
        // Mono buffer whose sample value equals its frame index
        let samples: Vec<f32> = (0..frames).map(|i| i as f32).collect();
        AudioBuffer {
            samples: vec![samples],
            sample_rate: RATE,
        }
    }

    #[test]
    fn test_silent_length() {
        let buffer = AudioBuffer::silent(1500, ChannelLayout::Stereo, RATE);
        assert_eq!(buffer.len(), 72000);
        assert_eq!(buffer.len_ms(), 1500);
        assert_eq!(buffer.channels(), 2);
        assert!(buffer.samples.iter().flatten().all(|&s| s == 0.0));
    }

    #[test_case(0, 1000, 48000; "full second")]
    #[test_case(250, 750, 24000; "interior span")]
    #[test_case(500, 500, 0; "empty span")]
    fn test_slice_span(start: u64, end: u64, expected_frames: usize) {
        let buffer = AudioBuffer::silent(1000, ChannelLayout::Mono, RATE);
        let slice = buffer.slice_ms(start, end);
        assert_eq!(slice.len(), expected_frames);
        assert_eq!(slice.len_ms(), end - start);
    }

    #[test]
    fn test_slice_preserves_content() {
        let buffer = ramp_buffer(48000);
        let slice = buffer.slice_ms(100, 200);
        // Frame at 100ms is 4800
        assert_eq!(slice.channel(0)[0], 4800.0);
        assert_eq!(slice.len(), 4800);
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        let buffer = AudioBuffer::silent(1000, ChannelLayout::Mono, RATE);
        // End past the buffer clamps to the buffer length
        assert_eq!(buffer.slice_ms(500, 5000).len_ms(), 500);
        // Start past the buffer yields an empty slice
        assert!(buffer.slice_ms(2000, 3000).is_empty());
        // Inverted range yields an empty slice, no panic
        assert!(buffer.slice_ms(800, 200).is_empty());
    }

    #[test]
    fn test_concat_exact_length() {
        let a = AudioBuffer::silent(300, ChannelLayout::Stereo, RATE);
        let b = AudioBuffer::silent(700, ChannelLayout::Stereo, RATE);
        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.len(), a.len() + b.len());
        assert_eq!(joined.len_ms(), 1000);
    }

    #[test]
    fn test_concat_preserves_order() {
        let mut a = AudioBuffer::new(10, ChannelLayout::Mono, RATE);
        a.channel_mut(0).fill(1.0);
        let mut b = AudioBuffer::new(10, ChannelLayout::Mono, RATE);
        b.channel_mut(0).fill(2.0);

        let joined = a.concat(&b).unwrap();
        assert_eq!(joined.channel(0)[9], 1.0);
        assert_eq!(joined.channel(0)[10], 2.0);
    }

    #[test]
    fn test_concat_channel_mismatch() {
        let a = AudioBuffer::silent(100, ChannelLayout::Mono, RATE);
        let b = AudioBuffer::silent(100, ChannelLayout::Stereo, RATE);
        assert!(a.concat(&b).is_err());
    }

    #[test]
    fn test_concat_rate_mismatch() {
        let a = AudioBuffer::silent(100, ChannelLayout::Mono, 44100);
        let b = AudioBuffer::silent(100, ChannelLayout::Mono, RATE);
        assert!(a.concat(&b).is_err());
    }

    #[test]
    fn test_repeated() {
        let buffer = ramp_buffer(100);
        let tripled = buffer.repeated(3);
        assert_eq!(tripled.len(), 300);
        // Repetition boundaries are hard edits: the pattern restarts
        assert_eq!(tripled.channel(0)[99], 99.0);
        assert_eq!(tripled.channel(0)[100], 0.0);
        assert_eq!(tripled.channel(0)[200], 0.0);
    }

    #[test]
    fn test_repeated_once_is_identity_length() {
        let buffer = ramp_buffer(250);
        assert_eq!(buffer.repeated(1).len(), 250);
    }

    #[test]
    fn test_len_ms_non_divisible_rate() {
        // 44.1kHz: 441 frames = 10ms exactly, 450 frames = 10.2ms -> floor 10
        let buffer = AudioBuffer {
            samples: vec![vec![0.0; 450]],
            sample_rate: 44100,
        };
        assert_eq!(buffer.len_ms(), 10);
    }

    #[test]
    fn test_channel_layout() {
        assert_eq!(ChannelLayout::Mono.num_channels(), 1);
        assert_eq!(ChannelLayout::Stereo.num_channels(), 2);
        assert_eq!(ChannelLayout::from_count(1), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_count(2), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_count(6), None);
    }

    #[test]
    fn test_is_finite_and_peak() {
        let mut buffer = AudioBuffer::new(10, ChannelLayout::Mono, RATE);
        buffer.channel_mut(0)[3] = -0.8;
        assert!(buffer.is_finite());
        assert_eq!(buffer.peak(), 0.8);

        buffer.channel_mut(0)[5] = f32::NAN;
        assert!(!buffer.is_finite());
    }
}
