//! Segment transformation operations
//!
//! The four algorithms that make up the core: chunk-shuffle, fade
//! application, loop synthesis, and silence insertion. All of them operate on
//! [`crate::engine::AudioBuffer`] values and are pure — file I/O stays in
//! `engine::io` and orchestration in `batch`.

pub mod chunk;
pub mod fade;
pub mod looper;
pub mod shuffle;
pub mod silence;

pub use chunk::{chunk, Chunk, RemainderPolicy};
pub use fade::{auto_fade, fade, FadeOptions, EDGE_FADE_MS};
pub use looper::{loop_in_memory, InMemoryLoop, LoopSpec, LoopStrategy};
pub use shuffle::{shuffle_reassemble, ShuffleOptions};
pub use silence::{add_silence, SilencePosition};

use crate::engine::AudioBuffer;

/// A file excluded from output by a duration gate
///
/// This is a reported outcome, not an error: the batch continues and nothing
/// is written for the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Skip {
    /// Probed or decoded source duration in seconds
    pub duration_s: f64,
    /// The gate the source fell below
    pub min_duration_s: f64,
}

impl std::fmt::Display for Skip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "duration {:.2}s below minimum {:.2}s",
            self.duration_s, self.min_duration_s
        )
    }
}

/// Result of a buffer-level operation that may skip its input
#[derive(Debug, Clone)]
pub enum OpOutcome {
    /// The transformed buffer, ready for export
    Rendered(AudioBuffer),
    /// The input fell below the duration gate; nothing to export
    Skipped(Skip),
}

impl OpOutcome {
    /// Unwrap the rendered buffer, panicking on a skip (test helper)
    #[cfg(test)]
    pub fn rendered(self) -> AudioBuffer {
        match self {
            OpOutcome::Rendered(buffer) => buffer,
            OpOutcome::Skipped(skip) => panic!("expected rendered output, got skip: {}", skip),
        }
    }
}

/// Apply the minimum-duration gate shared by the shuffle and loop pipelines
pub(crate) fn gate(duration_s: f64, min_duration_s: f64) -> Option<Skip> {
    if duration_s < min_duration_s {
        Some(Skip {
            duration_s,
            min_duration_s,
        })
    } else {
        None
    }
}
