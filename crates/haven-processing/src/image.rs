//! Image thumbnail rendering.

use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{imageops, DynamicImage, GenericImageView, ImageReader, RgbaImage};

/// Thumbnail edge length; every generated preview is exactly this square.
pub const THUMB_SIZE: u32 = 200;

/// Decode `input` and write a [`THUMB_SIZE`] PNG preview to `output`.
///
/// Decode and encode run on the blocking pool; this is the CPU-bound part of
/// thumbnail generation.
pub async fn render_thumb(input: &Path, output: &Path) -> Result<()> {
    let input = input.to_path_buf();
    let output = output.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<()> {
        let img = ImageReader::open(&input)
            .with_context(|| format!("Failed to open image {}", input.display()))?
            .with_guessed_format()?
            .decode()
            .with_context(|| format!("Failed to decode image {}", input.display()))?;

        let thumb = fit_to_canvas(&img);
        thumb
            .save_with_format(&output, image::ImageFormat::Png)
            .with_context(|| format!("Failed to write thumbnail {}", output.display()))?;
        Ok(())
    })
    .await
    .context("Image render task panicked")?
}

/// Fit a decoded image onto a transparent [`THUMB_SIZE`] square canvas.
///
/// Oversized images are scaled down aspect-preserving ("contain"); an
/// exactly [`THUMB_SIZE`]-square image passes through unchanged; smaller
/// images are padded symmetrically with transparent borders (floor/ceil
/// split when the padding is odd) rather than upscaled.
pub fn fit_to_canvas(img: &DynamicImage) -> RgbaImage {
    let (width, height) = img.dimensions();

    if width == THUMB_SIZE && height == THUMB_SIZE {
        return img.to_rgba8();
    }

    let scaled = if width > THUMB_SIZE || height > THUMB_SIZE {
        img.resize(THUMB_SIZE, THUMB_SIZE, FilterType::Lanczos3)
    } else {
        img.clone()
    };

    let (w, h) = scaled.dimensions();
    let mut canvas = RgbaImage::new(THUMB_SIZE, THUMB_SIZE);
    let left = i64::from((THUMB_SIZE - w) / 2);
    let top = i64::from((THUMB_SIZE - h) / 2);
    imageops::overlay(&mut canvas, &scaled.to_rgba8(), left, top);
    canvas
}
