//! Video preview extraction via ffprobe/ffmpeg child processes.
//!
//! Both invocations run under a hard timeout so a hung decoder cannot block
//! its task forever.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio::process::Command;
use tokio::time::timeout;

use crate::image::THUMB_SIZE;

/// Probe the total duration of `input` in seconds.
pub async fn probe_duration(ffprobe_path: &str, input: &Path, limit: Duration) -> Result<f64> {
    let mut command = Command::new(ffprobe_path);
    command
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(input)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = timeout(limit, command.output())
        .await
        .map_err(|_| anyhow!("ffprobe timed out after {}s", limit.as_secs()))?
        .context("Failed to execute ffprobe")?;

    if !output.status.success() {
        return Err(anyhow!(
            "ffprobe failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    let probe: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("Failed to parse ffprobe output")?;

    probe["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| anyhow!("Could not parse duration from ffprobe output"))
}

/// Extract a single frame at `seek_seconds` into `output`, scaled to fit
/// within [`THUMB_SIZE`] preserving aspect ratio (no upscaling).
pub async fn extract_frame(
    ffmpeg_path: &str,
    input: &Path,
    output_path: &Path,
    seek_seconds: f64,
    limit: Duration,
) -> Result<()> {
    let scale = format!(
        "scale={size}:{size}:force_original_aspect_ratio=decrease",
        size = THUMB_SIZE
    );

    let mut command = Command::new(ffmpeg_path);
    command
        .arg("-y")
        .args(["-ss", &seek_seconds.to_string()])
        .arg("-i")
        .arg(input)
        .args(["-vframes", "1", "-vf", &scale])
        .arg(output_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let output = timeout(limit, command.output())
        .await
        .map_err(|_| anyhow!("ffmpeg timed out after {}s", limit.as_secs()))?
        .context("Failed to execute ffmpeg")?;

    if !output.status.success() {
        return Err(anyhow!(
            "ffmpeg failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }

    Ok(())
}
