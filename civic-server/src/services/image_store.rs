//! Image Store
//!
//! Content-addressed local image storage. Uploads are validated, re-encoded
//! as JPEG and saved under `{work_dir}/uploads/images/{sha256}.jpg`, which
//! makes duplicate uploads idempotent. The returned URL is stable and served
//! by the image API route.

use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::io::Cursor;

use crate::utils::AppError;

/// Maximum file size (5MB)
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// JPEG quality for stored images
const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone)]
pub struct ImageStore {
    images_dir: PathBuf,
}

impl ImageStore {
    pub fn new(work_dir: &Path) -> Self {
        Self {
            images_dir: work_dir.join("uploads/images"),
        }
    }

    /// Store image bytes, returning the stable URL for the saved file
    ///
    /// Idempotent: identical content maps to the same filename. Writes go
    /// through a tmp file plus rename so a crash never leaves a partial
    /// image behind.
    pub fn store(&self, data: &[u8]) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::validation("Empty image provided".to_string()));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::validation(format!(
                "Image too large. Maximum size is {} bytes ({}MB)",
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        let img = image::load_from_memory(data)
            .map_err(|e| AppError::validation(format!("Invalid image: {}", e)))?;
        let compressed = compress_to_jpeg(&img)?;

        let hash = hex::encode(Sha256::digest(&compressed));
        let filename = format!("{hash}.jpg");
        let file_path = self.images_dir.join(&filename);
        let url = format!("/api/image/{filename}");

        if file_path.exists() {
            tracing::debug!(hash = %hash, "Duplicate image detected, returning existing file");
            return Ok(url);
        }

        fs::create_dir_all(&self.images_dir)
            .map_err(|e| AppError::internal(format!("Failed to create images directory: {}", e)))?;

        // Atomic write: tmp file + rename
        let tmp_path = self.images_dir.join(format!("{filename}.tmp"));
        fs::write(&tmp_path, &compressed)
            .map_err(|e| AppError::internal(format!("Failed to write image: {}", e)))?;
        fs::rename(&tmp_path, &file_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            AppError::internal(format!("Failed to finalize image: {}", e))
        })?;

        tracing::info!(hash = %hash, size = compressed.len(), "Image stored");
        Ok(url)
    }

    /// Resolve a stored filename to its on-disk path
    ///
    /// Rejects anything that is not a plain filename.
    pub fn path_for(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains("..")
            || filename.contains('/')
            || filename.contains('\\')
        {
            return None;
        }
        let path = self.images_dir.join(filename);
        path.exists().then_some(path)
    }
}

/// Re-encode as JPEG with the fixed quality setting
fn compress_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| AppError::internal(format!("Failed to compress image: {}", e)))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 30, 30]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn store_is_idempotent_for_identical_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let url1 = store.store(&png_bytes()).unwrap();
        let url2 = store.store(&png_bytes()).unwrap();

        assert_eq!(url1, url2);
        assert!(url1.starts_with("/api/image/"));
        assert!(url1.ends_with(".jpg"));
    }

    #[test]
    fn rejects_empty_and_garbage_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(store.store(&[]).is_err());
        assert!(store.store(b"definitely not an image").is_err());
    }

    #[test]
    fn path_for_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        assert!(store.path_for("../secret.jpg").is_none());
        assert!(store.path_for("a/b.jpg").is_none());
        assert!(store.path_for("").is_none());
    }

    #[test]
    fn path_for_finds_stored_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let url = store.store(&png_bytes()).unwrap();
        let filename = url.rsplit('/').next().unwrap();
        assert!(store.path_for(filename).is_some());
        assert!(store.path_for("missing.jpg").is_none());
    }
}
