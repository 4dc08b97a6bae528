//! Uploaded post images: validation and storage under the media root.

use std::path::Path;

use anyhow::Context as _;
use image::ImageFormat;
use uuid::Uuid;

use crate::AppResult;

pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// An upload that decoded as an image.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Decodes `bytes` fully; a recognised header alone is not enough.
pub fn inspect(bytes: &[u8]) -> Result<ImageFormat, &'static str> {
    let format = image::guess_format(bytes).map_err(|_| INVALID_IMAGE)?;
    image::load_from_memory_with_format(bytes, format).map_err(|_| INVALID_IMAGE)?;
    Ok(format)
}

/// [`inspect`] off the async runtime; decoding is CPU bound.
pub async fn inspect_upload(bytes: Vec<u8>) -> AppResult<Result<ImageUpload, &'static str>> {
    let checked = tokio::task::spawn_blocking(move || inspect(&bytes).map(|format| ImageUpload { bytes, format }))
        .await
        .context("image decoding task")?;
    Ok(checked)
}

/// Writes the image to `<media_root>/posts/` under a fresh name and returns
/// the path relative to the media root.
pub async fn save(media_root: &Path, upload: &ImageUpload) -> AppResult<String> {
    let ext = upload.format.extensions_str().first().copied().unwrap_or("img");
    let relative = format!("posts/{}.{ext}", Uuid::now_v7().simple());

    tokio::fs::create_dir_all(media_root.join("posts")).await?;
    tokio::fs::write(media_root.join(&relative), &upload.bytes).await?;

    tracing::info!(path = %relative, size = upload.bytes.len(), "stored image");
    Ok(relative)
}

#[cfg(test)]
pub(crate) fn png_bytes() -> Vec<u8> {
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::new_rgba8(100, 100)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
