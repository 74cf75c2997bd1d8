//! Track duration probing via ffprobe
//!
//! Used by the streamed loop strategy, which must gate on duration without
//! decoding the file. The in-memory pipelines gate on the decoded buffer
//! instead and never touch this module.
//!
//! Subprocess calls block with no timeout; a hung ffprobe hangs the batch.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, SegmixError};

/// Probe a track's duration in seconds
///
/// Runs `ffprobe -show_entries format=duration` and parses the single float
/// it prints. An abnormal exit or unparseable output is an `ExternalTool`
/// error, which aborts that file's pipeline only.
pub fn probe_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .map_err(|e| SegmixError::ExternalTool {
            tool: "ffprobe",
            reason: format!("failed to launch: {}", e),
        })?;

    if !output.status.success() {
        return Err(SegmixError::ExternalTool {
            tool: "ffprobe",
            reason: format!(
                "exit status {} for {}: {}",
                output.status,
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| SegmixError::ExternalTool {
            tool: "ffprobe",
            reason: format!("unparseable duration {:?} for {}", stdout.trim(), path.display()),
        })
}

/// Check whether ffmpeg is available on this system
pub fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_file_is_external_tool_error() {
        if !ffmpeg_available() {
            return; // no toolchain on this machine; nothing to assert
        }
        let result = probe_duration(Path::new("/nonexistent/track.wav"));
        assert!(matches!(
            result,
            Err(SegmixError::ExternalTool { tool: "ffprobe", .. })
        ));
    }
}
