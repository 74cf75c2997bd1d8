//! Looper: N-times repetition of a (possibly trimmed) track
//!
//! Two interchangeable strategies implement [`LoopStrategy`]:
//!
//! * [`InMemoryLoop`] decodes the file, repeats the buffer by direct
//!   concatenation (hard seams) and applies flat edge fades. Simple and
//!   fully testable; the default.
//! * [`StreamedLoop`] never decodes. It builds an ffmpeg concat-demuxer
//!   repetition and applies the edge fades as declarative `afade` filters,
//!   computing the fade-out start from total looped duration. Useful for
//!   large files and non-WAV containers.
//!
//! Both apply fades only at the very start and very end of the result, never
//! at repetition seams.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use crate::engine::buffer::AudioBuffer;
use crate::engine::io::{export_wav, import_wav};
use crate::engine::probe::probe_duration;
use crate::error::{Result, SegmixError};
use crate::ops::fade::fade;
use crate::ops::{gate, OpOutcome, Skip};

/// Parameters for loop synthesis
#[derive(Debug, Clone)]
pub struct LoopSpec {
    /// Sources shorter than this are skipped (seconds)
    pub min_duration_s: f64,
    /// Trim sources longer than this before looping, if set (seconds)
    pub max_duration_s: Option<f64>,
    /// Number of repetitions of the (trimmed) source
    pub iterations: u32,
    /// Flat fade-in/fade-out applied to the whole result (seconds)
    pub fade_s: f64,
}

impl Default for LoopSpec {
    fn default() -> Self {
        LoopSpec {
            min_duration_s: 0.0,
            max_duration_s: None,
            iterations: 4,
            fade_s: 1.0,
        }
    }
}

impl LoopSpec {
    /// Reject parameter combinations no strategy can honor
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(SegmixError::invalid_argument("iterations must be >= 1"));
        }
        if self.fade_s < 0.0 {
            return Err(SegmixError::invalid_argument("fade duration must be >= 0"));
        }
        Ok(())
    }
}

/// Result of rendering one file through a loop strategy
#[derive(Debug)]
pub enum LoopOutcome {
    /// Output file written
    Exported,
    /// Source fell below the duration gate; nothing written
    Skipped(Skip),
}

/// A way of turning one source file into an N-times looped output file
pub trait LoopStrategy {
    /// Strategy name for log lines
    fn name(&self) -> &'static str;

    /// Whether this strategy can handle the given source file
    fn accepts(&self, _input: &Path) -> bool {
        true
    }

    /// Render `input` into `output` per `spec`
    fn render(&self, input: &Path, output: &Path, spec: &LoopSpec) -> Result<LoopOutcome>;
}

// ============================================================================
// Strategy A: in-memory repetition
// ============================================================================

/// Repeat a decoded buffer by concatenation, then fade the edges
///
/// The buffer-level core of [`InMemoryLoop`], exposed for direct use and for
/// tests. Output frame count is exactly `iterations * trimmed frames`; the
/// edge fades do not change length.
pub fn loop_in_memory(buffer: &AudioBuffer, spec: &LoopSpec) -> Result<OpOutcome> {
    spec.validate()?;

    if let Some(skip) = gate(buffer.duration_secs(), spec.min_duration_s) {
        return Ok(OpOutcome::Skipped(skip));
    }

    let trimmed = match spec.max_duration_s {
        Some(max) if buffer.duration_secs() > max => buffer.slice_ms(0, (max * 1000.0) as u64),
        _ => buffer.clone(),
    };

    let looped = trimmed.repeated(spec.iterations);
    let fade_ms = (spec.fade_s * 1000.0) as u64;

    Ok(OpOutcome::Rendered(fade(&looped, fade_ms, fade_ms)))
}

/// In-process loop strategy: decode, repeat, fade, encode
#[derive(Debug, Default)]
pub struct InMemoryLoop;

impl LoopStrategy for InMemoryLoop {
    fn name(&self) -> &'static str {
        "in-memory"
    }

    // Decoding goes through hound, so only WAV sources qualify
    fn accepts(&self, input: &Path) -> bool {
        input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("wav"))
            .unwrap_or(false)
    }

    fn render(&self, input: &Path, output: &Path, spec: &LoopSpec) -> Result<LoopOutcome> {
        let (buffer, format) = import_wav(input)?;
        match loop_in_memory(&buffer, spec)? {
            OpOutcome::Rendered(looped) => {
                export_wav(&looped, output, format)?;
                Ok(LoopOutcome::Exported)
            }
            OpOutcome::Skipped(skip) => Ok(LoopOutcome::Skipped(skip)),
        }
    }
}

// ============================================================================
// Strategy B: external-process stream concatenation
// ============================================================================

/// ffmpeg-based loop strategy for files too large (or too exotic) to decode
///
/// Intermediate files live under `scratch`, which the batch runner scopes to
/// one run via a temporary directory; per-file intermediates are additionally
/// removed as soon as the file is done.
#[derive(Debug)]
pub struct StreamedLoop {
    scratch: PathBuf,
}

impl StreamedLoop {
    /// Create a streamed strategy writing intermediates under `scratch`
    pub fn new(scratch: impl Into<PathBuf>) -> Self {
        StreamedLoop {
            scratch: scratch.into(),
        }
    }
}

impl LoopStrategy for StreamedLoop {
    fn name(&self) -> &'static str {
        "streamed"
    }

    fn render(&self, input: &Path, output: &Path, spec: &LoopSpec) -> Result<LoopOutcome> {
        spec.validate()?;

        let duration = probe_duration(input)?;
        if let Some(skip) = gate(duration, spec.min_duration_s) {
            return Ok(LoopOutcome::Skipped(skip));
        }

        let stem = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());

        // Trim to an intermediate file with a softened cut, when needed
        let (source, single_duration, intermediate) = match spec.max_duration_s {
            Some(max) if duration > max => {
                let trimmed = self.scratch.join(format!("trimmed_{}", stem));
                let tail = trim_tail_fade_s(max);
                run_ffmpeg(
                    Command::new("ffmpeg")
                        .args(["-y", "-v", "error", "-i"])
                        .arg(input)
                        .args(["-t", &format_secs(max), "-af"])
                        .arg(format!(
                            "afade=t=out:st={}:d={}",
                            format_secs(max - tail),
                            format_secs(tail)
                        ))
                        .arg(&trimmed),
                )?;
                (trimmed.clone(), max, Some(trimmed))
            }
            _ => (input.to_path_buf(), duration, None),
        };

        let result = self.export_looped(&source, output, single_duration, spec, &stem);

        // Intermediate cleanup happens whether the export succeeded or not
        if let Some(path) = intermediate {
            if let Err(e) = fs::remove_file(&path) {
                debug!("could not remove intermediate {}: {}", path.display(), e);
            }
        }

        result.map(|_| LoopOutcome::Exported)
    }
}

impl StreamedLoop {
    fn export_looped(
        &self,
        source: &Path,
        output: &Path,
        single_duration: f64,
        spec: &LoopSpec,
        stem: &str,
    ) -> Result<()> {
        let list_path = self.scratch.join(format!("concat_{}.txt", stem));
        let absolute = fs::canonicalize(source).unwrap_or_else(|_| source.to_path_buf());
        let mut list = fs::File::create(&list_path)?;
        write!(list, "{}", concat_list_contents(&absolute, spec.iterations))?;

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-v", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path);
        if let Some(filter) = loop_fade_filter(single_duration, spec.iterations, spec.fade_s) {
            cmd.arg("-af").arg(filter);
        }
        cmd.arg(output);

        let result = run_ffmpeg(&mut cmd);

        if let Err(e) = fs::remove_file(&list_path) {
            debug!("could not remove concat list {}: {}", list_path.display(), e);
        }

        result
    }
}

/// Tail fade applied at the trim point: `min(1s, max_duration / 8)`
fn trim_tail_fade_s(max_duration_s: f64) -> f64 {
    (max_duration_s / 8.0).min(1.0)
}

/// Concat-demuxer list: the source repeated `iterations` times
fn concat_list_contents(source: &Path, iterations: u32) -> String {
    let escaped = source.to_string_lossy().replace('\'', "'\\''");
    let mut contents = String::new();
    for _ in 0..iterations {
        contents.push_str(&format!("file '{}'\n", escaped));
    }
    contents
}

/// Global edge fades over the virtual concatenation
///
/// Fade-in at time 0; fade-out starting at `iterations * duration - fade_s`.
/// Returns `None` when `fade_s` is zero (no filter needed).
fn loop_fade_filter(single_duration_s: f64, iterations: u32, fade_s: f64) -> Option<String> {
    if fade_s <= 0.0 {
        return None;
    }
    let total = single_duration_s * iterations as f64;
    let fade_out_start = (total - fade_s).max(0.0);
    Some(format!(
        "afade=t=in:st=0:d={},afade=t=out:st={}:d={}",
        format_secs(fade_s),
        format_secs(fade_out_start),
        format_secs(fade_s)
    ))
}

/// Format seconds for ffmpeg arguments without scientific notation
fn format_secs(secs: f64) -> String {
    let s = format!("{:.6}", secs);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn run_ffmpeg(cmd: &mut Command) -> Result<()> {
    debug!("running {:?}", cmd);
    let output = cmd.output().map_err(|e| SegmixError::ExternalTool {
        tool: "ffmpeg",
        reason: format!("failed to launch: {}", e),
    })?;

    if !output.status.success() {
        return Err(SegmixError::ExternalTool {
            tool: "ffmpeg",
            reason: format!(
                "exit status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ChannelLayout;
    use pretty_assertions::assert_eq;

    const RATE: u32 = 48000;

    fn unity_buffer(ms: u64) -> AudioBuffer {
        let mut buffer = AudioBuffer::silent(ms, ChannelLayout::Mono, RATE);
        buffer.channel_mut(0).fill(1.0);
        buffer
    }

    #[test]
    fn test_loop_length_is_iterations_times_trimmed() {
        let buffer = unity_buffer(2000);
        let spec = LoopSpec {
            iterations: 3,
            fade_s: 0.5,
            ..LoopSpec::default()
        };

        let out = loop_in_memory(&buffer, &spec).unwrap().rendered();
        assert_eq!(out.len(), buffer.len() * 3);
        assert_eq!(out.len_ms(), 6000);
    }

    #[test]
    fn test_loop_trims_first() {
        let buffer = unity_buffer(10_000);
        let spec = LoopSpec {
            max_duration_s: Some(4.0),
            iterations: 2,
            fade_s: 0.0,
            ..LoopSpec::default()
        };

        let out = loop_in_memory(&buffer, &spec).unwrap().rendered();
        assert_eq!(out.len_ms(), 8000);
    }

    #[test]
    fn test_loop_gate_skips() {
        let buffer = unity_buffer(3000);
        let spec = LoopSpec {
            min_duration_s: 5.0,
            ..LoopSpec::default()
        };

        match loop_in_memory(&buffer, &spec).unwrap() {
            OpOutcome::Skipped(skip) => assert_eq!(skip.min_duration_s, 5.0),
            OpOutcome::Rendered(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_loop_fades_only_outer_edges() {
        let buffer = unity_buffer(2000);
        let spec = LoopSpec {
            iterations: 3,
            fade_s: 1.0,
            ..LoopSpec::default()
        };

        let out = loop_in_memory(&buffer, &spec).unwrap().rendered();
        let rep_frames = buffer.len();

        // Outer edges faded
        assert_eq!(out.channel(0)[0], 0.0);
        assert!(out.channel(0)[out.len() - 1] < 0.001);
        // First repetition seam is a hard edit: both sides at full level
        assert_eq!(out.channel(0)[rep_frames - 1], 1.0);
        assert_eq!(out.channel(0)[rep_frames], 1.0);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let buffer = unity_buffer(1000);
        let spec = LoopSpec {
            iterations: 0,
            ..LoopSpec::default()
        };
        assert!(loop_in_memory(&buffer, &spec).is_err());
    }

    #[test]
    fn test_fade_filter_timestamps() {
        // 10s source, 3 iterations, 1s fade: fade-out starts at 29s
        let filter = loop_fade_filter(10.0, 3, 1.0).unwrap();
        assert_eq!(filter, "afade=t=in:st=0:d=1,afade=t=out:st=29:d=1");
    }

    #[test]
    fn test_fade_filter_zero_fade_is_none() {
        assert_eq!(loop_fade_filter(10.0, 3, 0.0), None);
    }

    #[test]
    fn test_trim_tail_fade() {
        assert_eq!(trim_tail_fade_s(4.0), 0.5);
        assert_eq!(trim_tail_fade_s(80.0), 1.0);
    }

    #[test]
    fn test_concat_list() {
        let contents = concat_list_contents(Path::new("/music/take 1.wav"), 3);
        assert_eq!(
            contents,
            "file '/music/take 1.wav'\nfile '/music/take 1.wav'\nfile '/music/take 1.wav'\n"
        );
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let contents = concat_list_contents(Path::new("/music/it's.wav"), 1);
        assert_eq!(contents, "file '/music/it'\\''s.wav'\n");
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(29.0), "29");
        assert_eq!(format_secs(0.5), "0.5");
        assert_eq!(format_secs(3.875), "3.875");
    }
}
