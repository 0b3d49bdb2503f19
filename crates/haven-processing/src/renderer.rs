//! Rendering seam between the thumbnail state machine and the decoders.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use haven_core::Config;

use crate::{image, video};

/// Produces the actual preview bitmaps. The [`crate::Thumbnailer`] is
/// written against this trait so tests can count or fail decode attempts
/// without touching real decoders.
#[async_trait]
pub trait ThumbRenderer: Send + Sync {
    /// Decode the image at `input` and write its preview to `output`.
    async fn render_image(&self, input: &Path, output: &Path) -> Result<()>;

    /// Probe the video at `input`, extract one frame and write it to
    /// `output`.
    async fn render_video(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Production renderer: `image` crate for stills, ffprobe/ffmpeg for video.
pub struct MediaRenderer {
    ffmpeg_path: String,
    ffprobe_path: String,
    decoder_timeout: Duration,
}

impl MediaRenderer {
    pub fn new(ffmpeg_path: String, ffprobe_path: String, decoder_timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            ffprobe_path,
            decoder_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ffmpeg_path.clone(),
            config.ffprobe_path.clone(),
            Duration::from_secs(config.decoder_timeout_secs),
        )
    }
}

#[async_trait]
impl ThumbRenderer for MediaRenderer {
    async fn render_image(&self, input: &Path, output: &Path) -> Result<()> {
        image::render_thumb(input, output).await
    }

    async fn render_video(&self, input: &Path, output: &Path) -> Result<()> {
        let duration =
            video::probe_duration(&self.ffprobe_path, input, self.decoder_timeout).await?;

        // Seek to 20% of the integral duration for a representative frame.
        let seek_seconds = duration.floor() * 20.0 / 100.0;

        video::extract_frame(
            &self.ffmpeg_path,
            input,
            output,
            seek_seconds,
            self.decoder_timeout,
        )
        .await
    }
}
