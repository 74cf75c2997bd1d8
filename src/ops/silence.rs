//! SilenceInjector: pad a buffer with silence
//!
//! The position is a typed enum, so an unrecognized spelling is rejected at
//! parse time with `InvalidArgument` instead of silently passing the input
//! through unchanged.

use clap::ValueEnum;

use crate::engine::AudioBuffer;
use crate::error::{Result, SegmixError};

/// Where the silent padding goes relative to the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SilencePosition {
    /// Silence, then the track
    #[value(alias = "a")]
    Before,
    /// The track, then silence
    #[value(alias = "d")]
    After,
    /// Silence on both sides
    #[value(alias = "b")]
    Both,
}

impl SilencePosition {
    /// Parse from the CLI spellings (`before`/`after`/`both` and the legacy
    /// one-letter forms `a`/`d`/`b`)
    pub fn parse(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true).map_err(|_| {
            SegmixError::invalid_argument(format!(
                "unrecognized silence position {:?} (expected before, after, or both)",
                s
            ))
        })
    }
}

/// Concatenate silence of `silence_s` seconds around `buffer`
///
/// The silent padding matches the buffer's channel count and sample rate.
/// Negative durations are rejected with `InvalidArgument`.
pub fn add_silence(
    buffer: &AudioBuffer,
    silence_s: f64,
    position: SilencePosition,
) -> Result<AudioBuffer> {
    if silence_s < 0.0 {
        return Err(SegmixError::invalid_argument(
            "silence duration must be >= 0",
        ));
    }

    let silence = AudioBuffer::silent_like((silence_s * 1000.0) as u64, buffer);

    match position {
        SilencePosition::Before => silence.concat(buffer),
        SilencePosition::After => buffer.concat(&silence),
        SilencePosition::Both => silence.concat(buffer)?.concat(&silence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChannelLayout;
    use test_case::test_case;

    const RATE: u32 = 48000;

    fn unity_buffer(ms: u64) -> AudioBuffer {
        let mut buffer = AudioBuffer::silent(ms, ChannelLayout::Stereo, RATE);
        for ch in 0..2 {
            buffer.channel_mut(ch).fill(1.0);
        }
        buffer
    }

    #[test_case(SilencePosition::Before, 2000 + 3000; "before")]
    #[test_case(SilencePosition::After, 2000 + 3000; "after")]
    #[test_case(SilencePosition::Both, 2000 + 6000; "both")]
    fn test_silence_lengths(position: SilencePosition, expected_ms: u64) {
        let buffer = unity_buffer(2000);
        let padded = add_silence(&buffer, 3.0, position).unwrap();
        assert_eq!(padded.len_ms(), expected_ms);
        assert_eq!(padded.channels(), 2);
    }

    #[test]
    fn test_silence_placement() {
        let buffer = unity_buffer(1000);
        let silence_frames = (RATE as u64) as usize; // 1s

        let before = add_silence(&buffer, 1.0, SilencePosition::Before).unwrap();
        assert_eq!(before.channel(0)[0], 0.0);
        assert_eq!(before.channel(0)[silence_frames], 1.0);

        let after = add_silence(&buffer, 1.0, SilencePosition::After).unwrap();
        assert_eq!(after.channel(0)[0], 1.0);
        assert_eq!(after.channel(0)[after.len() - 1], 0.0);

        let both = add_silence(&buffer, 1.0, SilencePosition::Both).unwrap();
        assert_eq!(both.channel(0)[0], 0.0);
        assert_eq!(both.channel(0)[silence_frames], 1.0);
        assert_eq!(both.channel(0)[both.len() - 1], 0.0);
    }

    #[test]
    fn test_zero_silence_is_identity_length() {
        let buffer = unity_buffer(1500);
        let padded = add_silence(&buffer, 0.0, SilencePosition::Both).unwrap();
        assert_eq!(padded.len_ms(), 1500);
    }

    #[test]
    fn test_negative_silence_rejected() {
        let buffer = unity_buffer(1000);
        assert!(matches!(
            add_silence(&buffer, -1.0, SilencePosition::After),
            Err(SegmixError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!(
            SilencePosition::parse("before").unwrap(),
            SilencePosition::Before
        );
        assert_eq!(SilencePosition::parse("a").unwrap(), SilencePosition::Before);
        assert_eq!(SilencePosition::parse("d").unwrap(), SilencePosition::After);
        assert_eq!(SilencePosition::parse("b").unwrap(), SilencePosition::Both);
        assert!(SilencePosition::parse("middle").is_err());
    }
}
