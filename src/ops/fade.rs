//! Fader: linear fade-in/fade-out envelopes
//!
//! A fade never changes a buffer's length. When the two ramps overlap
//! (`fade_in_ms + fade_out_ms > len_ms`) the composed gain at each frame is
//! the product of both ramps; that choice is fixed here and relied on by the
//! shuffle and loop pipelines.

use crate::engine::AudioBuffer;

/// Divisor for the per-chunk tail fade in the shuffle pipeline (5% of chunk)
pub const CHUNK_FADE_DIVISOR: u64 = 20;

/// Flat edge fade applied to reassembled and looped tracks, in milliseconds
pub const EDGE_FADE_MS: u64 = 50;

/// Fraction of a trimmed track faded out at the trim point by [`auto_fade`]
const TRIM_FADE_FRACTION: f64 = 0.125;

/// Parameters for the batch fade operation
#[derive(Debug, Clone)]
pub struct FadeOptions {
    /// Trim the source to this many seconds before fading, if set
    pub max_duration_s: Option<f64>,
    /// Edge fade length in seconds (applied at both ends)
    pub fade_duration_s: f64,
}

impl Default for FadeOptions {
    fn default() -> Self {
        FadeOptions {
            max_duration_s: None,
            fade_duration_s: 1.0,
        }
    }
}

/// Apply linear fade envelopes to the head and tail of a buffer
///
/// Fade-in ramps gain 0→1 over the first `fade_in_ms`; fade-out ramps 1→0
/// over the last `fade_out_ms`. Ramp lengths longer than the buffer are
/// clamped to it. Returns a new buffer of identical length.
pub fn fade(buffer: &AudioBuffer, fade_in_ms: u64, fade_out_ms: u64) -> AudioBuffer {
    let mut out = buffer.clone();
    let len = out.len();
    if len == 0 {
        return out;
    }

    let in_frames = out.frame_at_ms(fade_in_ms).min(len);
    let out_frames = out.frame_at_ms(fade_out_ms).min(len);

    for ch in &mut out.samples {
        for (i, sample) in ch.iter_mut().enumerate() {
            let mut gain = 1.0_f32;
            if i < in_frames {
                gain *= i as f32 / in_frames as f32;
            }
            if i >= len - out_frames {
                gain *= (len - i) as f32 / out_frames as f32;
            }
            *sample *= gain;
        }
    }

    out
}

/// The batch fade pipeline: optional trim with a softened cut, then edge fades
///
/// When `max_duration_s` is set and the source exceeds it, the buffer is
/// truncated and a fade-out over 12.5% of the trimmed length is applied so
/// the trim point does not land as a hard cut. The flat
/// `fade_duration_s` fade-in/fade-out is applied afterwards in either case.
pub fn auto_fade(buffer: &AudioBuffer, opts: &FadeOptions) -> AudioBuffer {
    let trimmed = match opts.max_duration_s {
        Some(max) if buffer.duration_secs() > max => {
            let cut = buffer.slice_ms(0, (max * 1000.0) as u64);
            let trim_fade_ms = (cut.len_ms() as f64 * TRIM_FADE_FRACTION) as u64;
            fade(&cut, 0, trim_fade_ms)
        }
        _ => buffer.clone(),
    };

    let edge_ms = (opts.fade_duration_s * 1000.0) as u64;
    fade(&trimmed, edge_ms, edge_ms)
}
