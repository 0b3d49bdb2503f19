//! Configuration module
//!
//! Env-driven configuration for the upload lifecycle services: filesystem
//! layout, thumbnail toggles, domains, CDN credentials and decoder paths.

use std::env;
use std::path::PathBuf;

use crate::ext;

const DEFAULT_UPLOADS_DIR: &str = "uploads";
const DEFAULT_PLACEHOLDER_PATH: &str = "public/images/unavailable.png";
const DEFAULT_DECODER_TIMEOUT_SECS: u64 = 30;

/// Which thumbnail types are enabled.
#[derive(Debug, Clone, Copy)]
pub struct ThumbSettings {
    pub image: bool,
    pub video: bool,
}

impl ThumbSettings {
    /// Config-driven eligibility predicate over a resolved extension.
    pub fn may_generate(&self, extension: &str) -> bool {
        (self.image && ext::is_image_extension(extension))
            || (self.video && ext::is_video_extension(extension))
    }
}

impl Default for ThumbSettings {
    fn default() -> Self {
        Self {
            image: true,
            video: true,
        }
    }
}

/// Cloudflare API credentials; cache purging is possible only when all three
/// values are configured.
#[derive(Clone, Debug)]
pub struct CloudflareConfig {
    pub api_key: String,
    pub email: String,
    pub zone_id: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding original uploads, named `<identifier>.<ext>`.
    pub uploads_dir: PathBuf,
    /// Shared "unavailable" image that placeholder thumbnails link to.
    pub placeholder_path: PathBuf,
    pub thumbs: ThumbSettings,
    /// Public domain serving uploads, e.g. `https://i.example.com`.
    pub content_domain: String,
    /// Domain serving non-upload pages; `"home"` purges its bare root.
    pub home_domain: String,
    pub cloudflare: Option<CloudflareConfig>,
    /// Automatically purge the CDN cache after bulk deletions.
    pub purge_cache: bool,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    /// Hard cap on a single external decoder invocation.
    pub decoder_timeout_secs: u64,
    pub database_url: String,
}

impl Config {
    /// Directory holding generated thumbnails, `<identifier>.png`.
    pub fn thumbs_dir(&self) -> PathBuf {
        self.uploads_dir.join("thumbs")
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let content_domain = env::var("CONTENT_DOMAIN")
            .map_err(|_| anyhow::anyhow!("CONTENT_DOMAIN must be set"))?;
        let home_domain = env::var("HOME_DOMAIN").unwrap_or_else(|_| content_domain.clone());

        let cloudflare = match (
            env::var("CLOUDFLARE_API_KEY").ok(),
            env::var("CLOUDFLARE_EMAIL").ok(),
            env::var("CLOUDFLARE_ZONE_ID").ok(),
        ) {
            (Some(api_key), Some(email), Some(zone_id)) => Some(CloudflareConfig {
                api_key,
                email,
                zone_id,
            }),
            _ => None,
        };

        let config = Config {
            uploads_dir: env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| DEFAULT_UPLOADS_DIR.to_string())
                .into(),
            placeholder_path: env::var("THUMB_PLACEHOLDER_PATH")
                .unwrap_or_else(|_| DEFAULT_PLACEHOLDER_PATH.to_string())
                .into(),
            thumbs: ThumbSettings {
                image: env::var("GENERATE_IMAGE_THUMBS")
                    .unwrap_or_else(|_| "true".to_string())
                    .to_lowercase()
                    .parse()
                    .unwrap_or(true),
                video: env::var("GENERATE_VIDEO_THUMBS")
                    .unwrap_or_else(|_| "true".to_string())
                    .to_lowercase()
                    .parse()
                    .unwrap_or(true),
            },
            content_domain,
            home_domain,
            cloudflare,
            purge_cache: env::var("PURGE_CACHE")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            decoder_timeout_secs: env::var("DECODER_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_DECODER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_DECODER_TIMEOUT_SECS),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.content_domain.is_empty() || self.content_domain.ends_with('/') {
            return Err(anyhow::anyhow!(
                "CONTENT_DOMAIN must be non-empty and carry no trailing slash"
            ));
        }

        if self.home_domain.is_empty() || self.home_domain.ends_with('/') {
            return Err(anyhow::anyhow!(
                "HOME_DOMAIN must be non-empty and carry no trailing slash"
            ));
        }

        if self.purge_cache && self.cloudflare.is_none() {
            return Err(anyhow::anyhow!(
                "PURGE_CACHE=true requires CLOUDFLARE_API_KEY, CLOUDFLARE_EMAIL and CLOUDFLARE_ZONE_ID"
            ));
        }

        if self.decoder_timeout_secs == 0 {
            return Err(anyhow::anyhow!("DECODER_TIMEOUT_SECS must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            uploads_dir: "uploads".into(),
            placeholder_path: DEFAULT_PLACEHOLDER_PATH.into(),
            thumbs: ThumbSettings::default(),
            content_domain: "https://i.example.com".to_string(),
            home_domain: "https://example.com".to_string(),
            cloudflare: None,
            purge_cache: false,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            decoder_timeout_secs: 30,
            database_url: "postgresql://localhost/haven".to_string(),
        }
    }

    #[test]
    fn validate_accepts_base_config() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_trailing_slash_domain() {
        let mut config = base_config();
        config.content_domain = "https://i.example.com/".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_purge_without_credentials() {
        let mut config = base_config();
        config.purge_cache = true;
        assert!(config.validate().is_err());

        config.cloudflare = Some(CloudflareConfig {
            api_key: "key".to_string(),
            email: "ops@example.com".to_string(),
            zone_id: "zone".to_string(),
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn thumb_settings_gate_each_set() {
        let both = ThumbSettings::default();
        assert!(both.may_generate(".png"));
        assert!(both.may_generate(".mkv"));
        assert!(!both.may_generate(".tar.gz"));

        let images_only = ThumbSettings {
            image: true,
            video: false,
        };
        assert!(images_only.may_generate(".png"));
        assert!(!images_only.may_generate(".mkv"));

        let videos_only = ThumbSettings {
            image: false,
            video: true,
        };
        assert!(!videos_only.may_generate(".png"));
        assert!(videos_only.may_generate(".mkv"));
    }
}
