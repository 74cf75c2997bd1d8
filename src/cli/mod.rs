//! Command-line interface definitions
//!
//! One subcommand per batch operation, mirroring the parameter sets of the
//! transformation pipelines. A `--max-duration` of 0 means "unset", matching
//! the historical prompt behavior where pressing Enter left the trim off.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::ops::chunk::RemainderPolicy;
use crate::ops::silence::SilencePosition;

/// Batch audio segment transformer
#[derive(Parser, Debug)]
#[command(name = "segmix", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reorder time-sliced fragments of each track
    Shuffle {
        /// Input folder containing tracks
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Skip tracks shorter than this many seconds
        #[arg(long, default_value_t = 0.0)]
        min_duration: f64,

        /// Trim tracks longer than this many seconds (0 = no trim)
        #[arg(long, default_value_t = 0.0)]
        max_duration: f64,

        /// Number of equal-length chunks to cut
        #[arg(long, default_value_t = 8)]
        num_chunks: u32,

        /// What to do with the equal-split remainder
        #[arg(long, value_enum, default_value_t = RemainderPolicy::Drop)]
        remainder: RemainderPolicy,
    },

    /// Apply fade-in/fade-out envelopes to each track
    Fade {
        /// Input folder containing tracks
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Trim tracks longer than this many seconds (0 = no trim)
        #[arg(long, default_value_t = 0.0)]
        max_duration: f64,

        /// Fade length in seconds, applied at both ends
        #[arg(long, default_value_t = 1.0)]
        fade_duration: f64,
    },

    /// Repeat each track with seamless edge fades
    Loop {
        /// Input folder containing tracks
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Skip tracks shorter than this many seconds
        #[arg(long, default_value_t = 0.0)]
        min_duration: f64,

        /// Trim tracks longer than this many seconds (0 = no trim)
        #[arg(long, default_value_t = 0.0)]
        max_duration: f64,

        /// Number of repetitions
        #[arg(long, default_value_t = 4)]
        iterations: u32,

        /// Edge fade length in seconds
        #[arg(long, default_value_t = 1.0)]
        fade_duration: f64,

        /// Concatenate via ffmpeg instead of decoding in-process
        #[arg(long)]
        streamed: bool,
    },

    /// Pad each track with silence
    Silence {
        /// Input folder containing tracks
        #[arg(short, long, default_value = ".")]
        input: PathBuf,

        /// Silence duration in seconds
        #[arg(long)]
        duration: f64,

        /// Where the silence goes
        #[arg(long, value_enum)]
        position: SilencePosition,
    },
}

/// Normalize the CLI's "0 means unset" trim convention
pub fn optional_duration(max_duration: f64) -> Option<f64> {
    if max_duration > 0.0 {
        Some(max_duration)
    } else {
        None
    }
}
