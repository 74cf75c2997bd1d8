//! Shuffler + reassembly: the chunk-shuffle pipeline
//!
//! Gate → optional trim → chunk → per-chunk tail fade → uniform random
//! permutation → concatenate → global edge fades. Every permutation of the N
//! chunks is equally likely, including the identity.
//!
//! Each chunk gets a 5% tail fade-out but no fade-in, so interior chunk
//! boundaries are preceded by a short fade yet never followed by one. The
//! residual click at the start of each chunk after the first is a preserved
//! characteristic of the output, not something this pipeline smooths over.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::ops::chunk::{chunk, RemainderPolicy};
use crate::ops::fade::{fade, CHUNK_FADE_DIVISOR, EDGE_FADE_MS};
use crate::ops::{gate, OpOutcome};

/// Parameters for the shuffle operation
#[derive(Debug, Clone)]
pub struct ShuffleOptions {
    /// Sources shorter than this are skipped (seconds)
    pub min_duration_s: f64,
    /// Trim sources longer than this before chunking, if set (seconds)
    pub max_duration_s: Option<f64>,
    /// Number of equal-length chunks to cut
    pub num_chunks: u32,
    /// What to do with the equal-split remainder
    pub remainder: RemainderPolicy,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        ShuffleOptions {
            min_duration_s: 0.0,
            max_duration_s: None,
            num_chunks: 8,
            remainder: RemainderPolicy::default(),
        }
    }
}

/// Run the shuffle pipeline over a decoded buffer
///
/// Returns [`OpOutcome::Skipped`] when the source duration falls below
/// `min_duration_s`. The permutation is drawn from the supplied `rng` so
/// callers can seed it; the batch runner passes `rand::thread_rng()`.
pub fn shuffle_reassemble(
    buffer: &AudioBuffer,
    opts: &ShuffleOptions,
    rng: &mut impl Rng,
) -> Result<OpOutcome> {
    if let Some(skip) = gate(buffer.duration_secs(), opts.min_duration_s) {
        return Ok(OpOutcome::Skipped(skip));
    }

    let trimmed = match opts.max_duration_s {
        Some(max) if buffer.duration_secs() > max => buffer.slice_ms(0, (max * 1000.0) as u64),
        _ => buffer.clone(),
    };

    let mut chunks = chunk(&trimmed, opts.num_chunks, opts.remainder)?;

    // 5% tail fade on every chunk; fade-in is deliberately not applied
    for c in &mut chunks {
        let tail_ms = c.buffer.len_ms() / CHUNK_FADE_DIVISOR;
        c.buffer = fade(&c.buffer, 0, tail_ms);
    }

    // Fisher-Yates: uniform over all num_chunks! orderings
    chunks.shuffle(rng);

    let mut reassembled = AudioBuffer {
        samples: vec![Vec::new(); trimmed.channels()],
        sample_rate: trimmed.sample_rate,
    };
    for c in &chunks {
        reassembled = reassembled.concat(&c.buffer)?;
    }

    Ok(OpOutcome::Rendered(fade(
        &reassembled,
        EDGE_FADE_MS,
        EDGE_FADE_MS,
    )))
}
