//! Audio engine: the buffer model and its I/O collaborators

pub mod buffer;
pub mod io;
pub mod probe;

pub use buffer::{AudioBuffer, ChannelLayout};
pub use io::{export_wav, import_wav, WavFormat};
