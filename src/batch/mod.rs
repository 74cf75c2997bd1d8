//! Batch runner: file-at-a-time orchestration over a directory
//!
//! Scans the input folder for recognized audio files, runs one pipeline per
//! file, and writes results into a per-operation subdirectory (`shuffled/`,
//! `faded/`, `looped/`, `silenced/`) next to the sources. Processing is
//! single-threaded and synchronous; every failure is scoped to its file and
//! logged, and the batch carries on. Only directory-level setup errors abort
//! a run.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use rand::thread_rng;

use crate::engine::io::{export_wav, import_wav};
use crate::engine::AudioBuffer;
use crate::error::{Result, SegmixError};
use crate::ops::fade::{auto_fade, FadeOptions};
use crate::ops::looper::{LoopOutcome, LoopSpec, LoopStrategy};
use crate::ops::shuffle::{shuffle_reassemble, ShuffleOptions};
use crate::ops::silence::{add_silence, SilencePosition};
use crate::ops::OpOutcome;

/// File extensions the scanner recognizes (case-insensitive)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac"];

/// Per-run tally, reported at the end of each batch
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files transformed and written
    pub succeeded: usize,
    /// Files excluded by a duration gate
    pub skipped: usize,
    /// Files whose pipeline failed
    pub failed: usize,
}

/// Check whether a path carries a recognized audio extension
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| e.eq_ignore_ascii_case(s))
        })
        .unwrap_or(false)
}

/// List recognized audio files directly inside `input_dir`, sorted by name
///
/// An unreadable or missing input directory is fatal for the whole run.
pub fn scan_input(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        return Err(SegmixError::invalid_argument(format!(
            "input path is not a directory: {}",
            input_dir.display()
        )));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported(p))
        .collect();

    files.sort();
    Ok(files)
}

/// Create (if needed) and return the output subdirectory for an operation
fn prepare_output_dir(input_dir: &Path, subdir: &str) -> Result<PathBuf> {
    let dir = input_dir.join(subdir);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Output path for one file: `<out_dir>/<prefix>_<input name>`
fn output_path(out_dir: &Path, prefix: &str, input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    out_dir.join(format!("{}_{}", prefix, name))
}

fn progress_bar(len: usize, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(message);
    pb
}

/// Outcome of one file inside a batch
enum FileResult {
    Written(PathBuf),
    Skipped(String),
}

/// Shared driver: run `process` over every recognized file and tally results
fn run_batch<F>(input_dir: &Path, subdir: &str, message: &'static str, mut process: F) -> Result<BatchSummary>
where
    F: FnMut(&Path, &Path) -> Result<FileResult>,
{
    let files = scan_input(input_dir)?;
    if files.is_empty() {
        info!("No audio files found in {}", input_dir.display());
        return Ok(BatchSummary::default());
    }

    let out_dir = prepare_output_dir(input_dir, subdir)?;
    let pb = progress_bar(files.len(), message);
    let mut summary = BatchSummary::default();

    for file in &files {
        let name = file.file_name().map(|n| n.to_string_lossy().into_owned());
        let name = name.as_deref().unwrap_or("?");

        match process(file, &out_dir) {
            Ok(FileResult::Written(path)) => {
                info!("Wrote {}", path.display());
                summary.succeeded += 1;
            }
            Ok(FileResult::Skipped(reason)) => {
                info!("Skipping {} ({})", name, reason);
                summary.skipped += 1;
            }
            Err(e) => {
                error!("Failed {}: {}", name, e);
                summary.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("done");
    info!(
        "{}: {} succeeded, {} skipped, {} failed",
        message, summary.succeeded, summary.skipped, summary.failed
    );
    Ok(summary)
}

/// Decode one WAV source for an in-memory pipeline
///
/// Recognized non-WAV extensions are reported per file as unsupported; the
/// batch continues.
fn decode_wav(path: &Path) -> Result<(AudioBuffer, crate::engine::WavFormat)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if ext != "wav" {
        return Err(SegmixError::UnsupportedFormat {
            format: format!(".{} (in-memory pipelines decode WAV only)", ext),
        });
    }
    import_wav(path)
}

/// Shuffle every track in a folder into `shuffled/`
pub fn run_shuffle(input_dir: &Path, opts: &ShuffleOptions) -> Result<BatchSummary> {
    let mut rng = thread_rng();
    run_batch(input_dir, "shuffled", "Shuffling files", |file, out_dir| {
        let (buffer, format) = decode_wav(file)?;
        match shuffle_reassemble(&buffer, opts, &mut rng)? {
            OpOutcome::Rendered(out) => {
                let path = output_path(out_dir, "shuffled", file);
                export_wav(&out, &path, format)?;
                Ok(FileResult::Written(path))
            }
            OpOutcome::Skipped(skip) => Ok(FileResult::Skipped(skip.to_string())),
        }
    })
}

/// Fade every track in a folder into `faded/`
pub fn run_fade(input_dir: &Path, opts: &FadeOptions) -> Result<BatchSummary> {
    run_batch(input_dir, "faded", "Fading files", |file, out_dir| {
        let (buffer, format) = decode_wav(file)?;
        let out = auto_fade(&buffer, opts);
        let path = output_path(out_dir, "faded", file);
        export_wav(&out, &path, format)?;
        Ok(FileResult::Written(path))
    })
}

/// Loop every track in a folder into `looped/` using the given strategy
pub fn run_loop(
    input_dir: &Path,
    spec: &LoopSpec,
    strategy: &dyn LoopStrategy,
) -> Result<BatchSummary> {
    spec.validate()?;
    info!("Looping with the {} strategy", strategy.name());

    run_batch(input_dir, "looped", "Looping files", |file, out_dir| {
        if !strategy.accepts(file) {
            return Err(SegmixError::UnsupportedFormat {
                format: format!(
                    "{} (not accepted by the {} strategy)",
                    file.display(),
                    strategy.name()
                ),
            });
        }
        let path = output_path(out_dir, "looped", file);
        match strategy.render(file, &path, spec)? {
            LoopOutcome::Exported => Ok(FileResult::Written(path)),
            LoopOutcome::Skipped(skip) => Ok(FileResult::Skipped(skip.to_string())),
        }
    })
}

/// Pad every track in a folder with silence into `silenced/`
pub fn run_silence(
    input_dir: &Path,
    silence_s: f64,
    position: SilencePosition,
) -> Result<BatchSummary> {
    if silence_s < 0.0 {
        return Err(SegmixError::invalid_argument(
            "silence duration must be >= 0",
        ));
    }

    run_batch(input_dir, "silenced", "Adding silence", |file, out_dir| {
        let (buffer, format) = decode_wav(file)?;
        let out = add_silence(&buffer, silence_s, position)?;
        let path = output_path(out_dir, "silenced", file);
        export_wav(&out, &path, format)?;
        Ok(FileResult::Written(path))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::io::generate_test_tone;
    use crate::engine::WavFormat;
    use tempfile::tempdir;

    fn write_tone(dir: &Path, name: &str, secs: f32) {
        let tone = generate_test_tone(440.0, secs, 48000);
        export_wav(&tone, &dir.join(name), WavFormat::default()).unwrap();
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a.wav")));
        assert!(is_supported(Path::new("a.MP3")));
        assert!(is_supported(Path::new("a.flac")));
        assert!(!is_supported(Path::new("a.txt")));
        assert!(!is_supported(Path::new("noext")));
    }

    #[test]
    fn test_scan_input_filters_and_sorts() {
        let dir = tempdir().unwrap();
        write_tone(dir.path(), "b.wav", 0.2);
        write_tone(dir.path(), "a.wav", 0.2);
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let files = scan_input(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav"]);
    }

    #[test]
    fn test_scan_input_missing_dir_is_fatal() {
        let result = scan_input(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(SegmixError::InvalidArgument { .. })));
    }

    #[test]
    fn test_run_silence_writes_outputs() {
        let dir = tempdir().unwrap();
        write_tone(dir.path(), "tone.wav", 1.0);

        let summary = run_silence(dir.path(), 1.0, SilencePosition::Both).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 0);

        let out = dir.path().join("silenced").join("silenced_tone.wav");
        let (buffer, _) = import_wav(&out).unwrap();
        assert_eq!(buffer.len_ms(), 3000);
    }

    #[test]
    fn test_run_shuffle_skips_short_files() {
        let dir = tempdir().unwrap();
        write_tone(dir.path(), "short.wav", 3.0);

        let opts = ShuffleOptions {
            min_duration_s: 5.0,
            ..ShuffleOptions::default()
        };
        let summary = run_shuffle(dir.path(), &opts).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.succeeded, 0);
        // No file written for the skip
        assert!(!dir
            .path()
            .join("shuffled")
            .join("shuffled_short.wav")
            .exists());
    }

    #[test]
    fn test_run_fade_counts_unsupported_as_failed() {
        let dir = tempdir().unwrap();
        write_tone(dir.path(), "good.wav", 1.0);
        // Recognized extension, but not decodable by the in-memory pipeline
        fs::write(dir.path().join("song.mp3"), b"not really an mp3").unwrap();

        let opts = FadeOptions::default();
        let summary = run_fade(dir.path(), &opts).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_output_path_prefix() {
        let out = output_path(Path::new("/out"), "looped", Path::new("/in/track.wav"));
        assert_eq!(out, PathBuf::from("/out/looped_track.wav"));
    }
}
