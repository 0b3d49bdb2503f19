//! Thumbnail generation state machine.
//!
//! A thumbnail for `<identifier>.<ext>` lives at `thumbs/<identifier>.png`
//! and is in one of three states: absent, present (real bitmap), or a
//! placeholder — a symlink to a shared "unavailable" image standing in for a
//! thumbnail that failed to generate. A placeholder is never trusted as
//! freshly generated: it is unlinked before any new attempt.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use haven_core::{ext, Config, ThumbSettings};

use crate::renderer::{MediaRenderer, ThumbRenderer};

/// Thumbnail generation errors. Decode failures are not errors — they are
/// absorbed into the placeholder state; only filesystem operations on the
/// thumbnail path itself can fail a call.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("thumbnail filesystem operation failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a [`Thumbnailer::generate`] call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbOutcome {
    /// A fresh bitmap was rendered and written.
    Generated,
    /// A real thumbnail already existed and `force` was not set.
    AlreadyExists,
    /// Rendering failed; the thumbnail now links to the shared
    /// "unavailable" image.
    Placeholder,
    /// The extension is not thumbnail-eligible under current settings.
    Ineligible,
}

impl ThumbOutcome {
    /// Whether a thumbnail file (real or placeholder) now exists for the
    /// upload — the boolean the deletion and purge paths care about.
    pub fn is_usable(&self) -> bool {
        !matches!(self, ThumbOutcome::Ineligible)
    }
}

/// Generates and repairs upload previews.
pub struct Thumbnailer {
    uploads_dir: PathBuf,
    thumbs_dir: PathBuf,
    placeholder_path: PathBuf,
    settings: ThumbSettings,
    renderer: Arc<dyn ThumbRenderer>,
}

impl Thumbnailer {
    pub fn new(
        uploads_dir: PathBuf,
        thumbs_dir: PathBuf,
        placeholder_path: PathBuf,
        settings: ThumbSettings,
        renderer: Arc<dyn ThumbRenderer>,
    ) -> Self {
        Self {
            uploads_dir,
            thumbs_dir,
            placeholder_path,
            settings,
            renderer,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.uploads_dir.clone(),
            config.thumbs_dir(),
            config.placeholder_path.clone(),
            config.thumbs,
            Arc::new(MediaRenderer::from_config(config)),
        )
    }

    /// Whether `extension` is thumbnail-eligible under current settings.
    pub fn eligible(&self, extension: &str) -> bool {
        self.settings.may_generate(extension)
    }

    /// Where the thumbnail for upload `name` lives.
    pub fn thumb_path(&self, name: &str) -> PathBuf {
        self.thumbs_dir.join(format!("{}.png", ext::identifier(name)))
    }

    /// Ensure a usable thumbnail exists for upload `name`.
    ///
    /// Without `force`, an existing real thumbnail short-circuits; an
    /// existing placeholder is unlinked and regeneration is attempted
    /// regardless. Concurrent calls for the same file may race on the
    /// existence check — callers needing per-file exclusion must serialize
    /// per identifier.
    pub async fn generate(&self, name: &str, force: bool) -> Result<ThumbOutcome, ThumbnailError> {
        let extension = ext::extname(name);
        if !self.settings.may_generate(&extension) {
            return Ok(ThumbOutcome::Ineligible);
        }

        let thumb_path = self.thumb_path(name);

        match tokio::fs::symlink_metadata(&thumb_path).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                // Never trust a placeholder as already generated.
                tokio::fs::remove_file(&thumb_path)
                    .await
                    .map_err(|source| ThumbnailError::Io {
                        path: thumb_path.clone(),
                        source,
                    })?;
            }
            Ok(_) if !force => return Ok(ThumbOutcome::AlreadyExists),
            Ok(_) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(ThumbnailError::Io {
                    path: thumb_path,
                    source,
                })
            }
        }

        let input = self.uploads_dir.join(name);
        let rendered = if ext::is_image_extension(&extension) {
            self.renderer.render_image(&input, &thumb_path).await
        } else {
            self.renderer.render_video(&input, &thumb_path).await
        };

        match rendered {
            Ok(()) => {
                tracing::debug!(file = %name, thumb = %thumb_path.display(), "Thumbnail generated");
                Ok(ThumbOutcome::Generated)
            }
            Err(error) => {
                tracing::warn!(
                    file = %name,
                    error = %error,
                    "Thumbnail generation failed, linking placeholder"
                );
                symlink(&self.placeholder_path, &thumb_path)
                    .await
                    .map_err(|source| ThumbnailError::Io {
                        path: thumb_path,
                        source,
                    })?;
                Ok(ThumbOutcome::Placeholder)
            }
        }
    }
}

#[cfg(unix)]
async fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(original, link).await
}

#[cfg(windows)]
async fn symlink(original: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink_file(original, link).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;
    use async_trait::async_trait;
    use tempfile::{tempdir, TempDir};

    /// Counts decode attempts and optionally fails them all.
    struct MockRenderer {
        image_calls: AtomicUsize,
        video_calls: AtomicUsize,
        fail: bool,
    }

    impl MockRenderer {
        fn new(fail: bool) -> Self {
            Self {
                image_calls: AtomicUsize::new(0),
                video_calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ThumbRenderer for MockRenderer {
        async fn render_image(&self, _input: &Path, output: &Path) -> anyhow::Result<()> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("decode failed");
            }
            tokio::fs::write(output, b"fake png").await?;
            Ok(())
        }

        async fn render_video(&self, _input: &Path, output: &Path) -> anyhow::Result<()> {
            self.video_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                bail!("probe failed");
            }
            tokio::fs::write(output, b"fake png").await?;
            Ok(())
        }
    }

    struct Fixture {
        _dir: TempDir,
        thumbnailer: Thumbnailer,
        renderer: Arc<MockRenderer>,
    }

    fn fixture(fail: bool) -> Fixture {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let thumbs = uploads.join("thumbs");
        let placeholder = dir.path().join("unavailable.png");
        std::fs::create_dir_all(&thumbs).unwrap();
        std::fs::write(&placeholder, b"placeholder").unwrap();

        let renderer = Arc::new(MockRenderer::new(fail));
        let thumbnailer = Thumbnailer::new(
            uploads,
            thumbs,
            placeholder,
            ThumbSettings::default(),
            renderer.clone(),
        );

        Fixture {
            _dir: dir,
            thumbnailer,
            renderer,
        }
    }

    #[tokio::test]
    async fn generates_then_short_circuits_without_force() {
        let fx = fixture(false);

        let first = fx.thumbnailer.generate("abc.png", false).await.unwrap();
        assert_eq!(first, ThumbOutcome::Generated);

        let second = fx.thumbnailer.generate("abc.png", false).await.unwrap();
        assert_eq!(second, ThumbOutcome::AlreadyExists);

        // the second call performed no decode work
        assert_eq!(fx.renderer.image_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_regenerates_existing_thumbnail() {
        let fx = fixture(false);

        fx.thumbnailer.generate("abc.png", false).await.unwrap();
        let outcome = fx.thumbnailer.generate("abc.png", true).await.unwrap();

        assert_eq!(outcome, ThumbOutcome::Generated);
        assert_eq!(fx.renderer.image_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn decode_failure_links_placeholder_and_reports_usable() {
        let fx = fixture(true);

        let outcome = fx.thumbnailer.generate("abc.png", false).await.unwrap();
        assert_eq!(outcome, ThumbOutcome::Placeholder);
        assert!(outcome.is_usable());

        let meta = tokio::fs::symlink_metadata(fx.thumbnailer.thumb_path("abc.png"))
            .await
            .unwrap();
        assert!(meta.file_type().is_symlink());
    }

    #[tokio::test]
    async fn stale_placeholder_is_never_trusted() {
        let fx = fixture(false);
        let thumb = fx.thumbnailer.thumb_path("abc.png");

        // a previous run left a placeholder behind
        symlink(&fx.thumbnailer.placeholder_path, &thumb)
            .await
            .unwrap();

        let outcome = fx.thumbnailer.generate("abc.png", false).await.unwrap();
        assert_eq!(outcome, ThumbOutcome::Generated);
        assert_eq!(fx.renderer.image_calls.load(Ordering::SeqCst), 1);

        let meta = tokio::fs::symlink_metadata(&thumb).await.unwrap();
        assert!(!meta.file_type().is_symlink());
    }

    #[tokio::test]
    async fn video_extensions_use_the_video_path() {
        let fx = fixture(false);

        let outcome = fx.thumbnailer.generate("clip.mp4", false).await.unwrap();
        assert_eq!(outcome, ThumbOutcome::Generated);
        assert_eq!(fx.renderer.video_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.renderer.image_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ineligible_extension_attempts_no_render() {
        let fx = fixture(false);

        let outcome = fx.thumbnailer.generate("doc.pdf", false).await.unwrap();
        assert_eq!(outcome, ThumbOutcome::Ineligible);
        assert!(!outcome.is_usable());
        assert_eq!(fx.renderer.image_calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.renderer.video_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disabled_video_thumbs_make_videos_ineligible() {
        let dir = tempdir().unwrap();
        let thumbs = dir.path().join("thumbs");
        std::fs::create_dir_all(&thumbs).unwrap();
        let renderer = Arc::new(MockRenderer::new(false));

        let thumbnailer = Thumbnailer::new(
            dir.path().to_path_buf(),
            thumbs,
            dir.path().join("unavailable.png"),
            ThumbSettings {
                image: true,
                video: false,
            },
            renderer.clone(),
        );

        let outcome = thumbnailer.generate("clip.mp4", false).await.unwrap();
        assert_eq!(outcome, ThumbOutcome::Ineligible);
        assert_eq!(renderer.video_calls.load(Ordering::SeqCst), 0);
    }
}
