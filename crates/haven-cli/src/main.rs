//! haven-thumbs — generate or repair upload thumbnails.
//!
//! Walks the uploads directory and runs the thumbnail generator over every
//! eligible file, turning undecodable media into placeholders as it goes.

use anyhow::Context;
use clap::Parser;

use haven_cli::init_tracing;
use haven_core::{ext, Config};
use haven_processing::{ThumbOutcome, Thumbnailer};

#[derive(Parser)]
#[command(name = "haven-thumbs", about = "Generate or repair upload thumbnails")]
struct Cli {
    /// Regenerate thumbnails that already exist
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    tokio::fs::create_dir_all(config.thumbs_dir())
        .await
        .context("Failed to create thumbs directory")?;

    let thumbnailer = Thumbnailer::from_config(&config);

    let mut generated = 0usize;
    let mut placeholders = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    let mut entries = tokio::fs::read_dir(&config.uploads_dir)
        .await
        .with_context(|| format!("Failed to read {}", config.uploads_dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            tracing::warn!(path = %entry.path().display(), "Skipping non-UTF-8 filename");
            continue;
        };
        if !thumbnailer.eligible(&ext::extname(&name)) {
            continue;
        }

        match thumbnailer.generate(&name, cli.force).await {
            Ok(ThumbOutcome::Generated) => generated += 1,
            Ok(ThumbOutcome::AlreadyExists) => skipped += 1,
            Ok(ThumbOutcome::Placeholder) => placeholders += 1,
            Ok(ThumbOutcome::Ineligible) => {}
            Err(error) => {
                failed += 1;
                tracing::error!(file = %name, error = %error, "Thumbnail generation failed");
            }
        }
    }

    tracing::info!(generated, placeholders, skipped, failed, "Thumbnail pass complete");
    Ok(())
}
