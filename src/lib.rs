//! Segmix - Batch Audio Segment Transformer
//!
//! Models an audio track as an ordered, sliceable, concatenable buffer with
//! millisecond-resolution cut points, and provides four transformations over
//! it: chunk-shuffle, fade envelopes, loop synthesis (in-memory or via an
//! external ffmpeg concatenation), and silence padding.
//!
//! # Architecture
//!
//! - `engine`: the [`engine::AudioBuffer`] data model plus WAV I/O and
//!   ffprobe duration probing
//! - `ops`: the pure transformation algorithms
//! - `batch`: directory scanning and file-at-a-time orchestration
//! - `cli`: the clap command surface

pub mod batch;
pub mod cli;
pub mod engine;
pub mod error;
pub mod ops;

pub use error::{Result, SegmixError};
