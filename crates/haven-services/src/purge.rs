//! CDN cache purge client.
//!
//! Purges cached copies of deleted uploads (and their thumbnails) from the
//! Cloudflare edge. Purging is best-effort: the client never fails the
//! caller, it reports one result per submitted batch instead.

use std::time::Duration;

use anyhow::Context;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use haven_core::{ext, CloudflareConfig, Config, ThumbSettings};

/// Documented cap on URLs per purge request.
const MAX_BATCH_URLS: usize = 30;
const DEFAULT_API_BASE: &str = "https://api.cloudflare.com";
const HTTP_TIMEOUT_SECS: u64 = 30;

/// Outcome of one purge batch: the URLs it covered and any errors, either
/// API-reported (`"<code>: <message>"`) or transport-level.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeBatchResult {
    pub success: bool,
    pub files: Vec<String>,
    pub errors: Vec<String>,
}

#[derive(Serialize)]
struct PurgeRequest<'a> {
    files: &'a [String],
}

#[derive(Deserialize)]
struct PurgeApiResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<PurgeApiError>,
}

#[derive(Deserialize)]
struct PurgeApiError {
    code: i64,
    message: String,
}

/// Batched, strictly sequential purge submitter.
pub struct CachePurger {
    http: Client,
    credentials: Option<CloudflareConfig>,
    content_domain: String,
    home_domain: String,
    thumbs: ThumbSettings,
    api_base: String,
}

impl CachePurger {
    pub fn new(
        credentials: Option<CloudflareConfig>,
        content_domain: String,
        home_domain: String,
        thumbs: ThumbSettings,
    ) -> Result<Self, anyhow::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client for cache purging")?;

        Ok(Self {
            http,
            credentials,
            content_domain,
            home_domain,
            thumbs,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, anyhow::Error> {
        Self::new(
            config.cloudflare.clone(),
            config.content_domain.clone(),
            config.home_domain.clone(),
            config.thumbs,
        )
    }

    /// Point the client at a different API host (tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Purge the cached copies of `names`.
    ///
    /// Upload names resolve against the content domain; with
    /// `include_thumbs`, thumbnail URLs for eligible extensions are appended
    /// after the files. Non-upload names resolve against the home domain,
    /// with the literal `"home"` mapping to its bare root.
    ///
    /// Returns one result per batch of at most [`MAX_BATCH_URLS`] URLs,
    /// in submission order. Never fails: missing credentials or an empty
    /// input produce a single synthetic failure result without any network
    /// I/O, and a failed batch does not cancel the remaining ones.
    pub async fn purge(
        &self,
        names: &[String],
        upload_path: bool,
        include_thumbs: bool,
    ) -> Vec<PurgeBatchResult> {
        let Some(credentials) = &self.credentials else {
            return vec![Self::unavailable()];
        };
        if names.is_empty() {
            return vec![Self::unavailable()];
        }

        let urls = self.build_urls(names, upload_path, include_thumbs);
        let endpoint = format!(
            "{}/client/v4/zones/{}/purge_cache",
            self.api_base, credentials.zone_id
        );

        let mut results = Vec::with_capacity(urls.len().div_ceil(MAX_BATCH_URLS));
        // Strictly sequential by contract: each batch's response (or
        // failure) is observed before the next batch is submitted.
        for batch in urls.chunks(MAX_BATCH_URLS) {
            results.push(self.purge_batch(&endpoint, credentials, batch).await);
        }
        results
    }

    fn build_urls(
        &self,
        names: &[String],
        upload_path: bool,
        include_thumbs: bool,
    ) -> Vec<String> {
        let mut urls = Vec::with_capacity(names.len());
        let mut thumb_urls = Vec::new();

        for name in names {
            if upload_path {
                urls.push(format!("{}/{}", self.content_domain, name));
                if include_thumbs && self.thumbs.may_generate(&ext::extname(name)) {
                    thumb_urls.push(format!(
                        "{}/thumbs/{}.png",
                        self.content_domain,
                        ext::identifier(name)
                    ));
                }
            } else if name == "home" {
                urls.push(self.home_domain.clone());
            } else {
                urls.push(format!("{}/{}", self.home_domain, name));
            }
        }

        urls.extend(thumb_urls);
        urls
    }

    async fn purge_batch(
        &self,
        endpoint: &str,
        credentials: &CloudflareConfig,
        batch: &[String],
    ) -> PurgeBatchResult {
        let mut result = PurgeBatchResult {
            success: false,
            files: batch.to_vec(),
            errors: Vec::new(),
        };

        match self.submit(endpoint, credentials, batch).await {
            Ok(response) => {
                result.success = response.success;
                result.errors = response
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .collect();
            }
            Err(error) => result.errors.push(error.to_string()),
        }

        result
    }

    async fn submit(
        &self,
        endpoint: &str,
        credentials: &CloudflareConfig,
        batch: &[String],
    ) -> Result<PurgeApiResponse, reqwest::Error> {
        self.http
            .post(endpoint)
            .header("X-Auth-Email", &credentials.email)
            .header("X-Auth-Key", &credentials.api_key)
            .json(&PurgeRequest { files: batch })
            .send()
            .await?
            .json::<PurgeApiResponse>()
            .await
    }

    fn unavailable() -> PurgeBatchResult {
        PurgeBatchResult {
            success: false,
            files: Vec::new(),
            errors: vec!["cache purge unavailable: no URLs or missing CDN credentials".to_string()],
        }
    }
}
