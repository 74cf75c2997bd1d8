//! Chunker: split a buffer into N contiguous equal-length pieces
//!
//! Chunk length is `floor(len_ms / num_chunks)`; chunk *i* covers
//! `[i * len, (i+1) * len)`. Under the default [`RemainderPolicy::Drop`] the
//! trailing `len_ms mod num_chunks` milliseconds are silently discarded, for
//! output parity with the historical behavior; [`RemainderPolicy::ExtendLast`]
//! folds the remainder into the final chunk instead.

use clap::ValueEnum;

use crate::engine::AudioBuffer;
use crate::error::{Result, SegmixError};

/// What to do with the `len_ms mod num_chunks` tail the equal split leaves over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RemainderPolicy {
    /// Discard the tail; every chunk has identical length
    #[default]
    Drop,
    /// Extend the last chunk to the end of the buffer
    ExtendLast,
}

/// One contiguous slice of a buffer, tagged with its pre-shuffle position
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Original index in `0..num_chunks`
    pub index: usize,
    /// The slice itself
    pub buffer: AudioBuffer,
}

/// Split `buffer` into exactly `num_chunks` contiguous pieces
///
/// Fails with `InvalidArgument` when `num_chunks` is zero.
pub fn chunk(
    buffer: &AudioBuffer,
    num_chunks: u32,
    policy: RemainderPolicy,
) -> Result<Vec<Chunk>> {
    if num_chunks == 0 {
        return Err(SegmixError::invalid_argument("num_chunks must be > 0"));
    }

    let total_ms = buffer.len_ms();
    let chunk_ms = total_ms / num_chunks as u64;

    let mut chunks = Vec::with_capacity(num_chunks as usize);
    for i in 0..num_chunks as u64 {
        let start = i * chunk_ms;
        let end = if i == num_chunks as u64 - 1 && policy == RemainderPolicy::ExtendLast {
            total_ms
        } else {
            (i + 1) * chunk_ms
        };
        chunks.push(Chunk {
            index: i as usize,
            buffer: buffer.slice_ms(start, end),
        });
    }

    Ok(chunks)
}
