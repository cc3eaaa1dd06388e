//! Downloaded image handling: local file naming and dimension checks

use std::path::{Path, PathBuf};

use crate::error::{ImageError, Result};
use crate::types::ImageMimeType;

/// Smallest width or height the platform accepts, in pixels
pub const MIN_DIMENSION: u32 = 4;

/// Largest width or height the platform accepts, in pixels
pub const MAX_DIMENSION: u32 = 8192;

/// Local path for the image filling `rank`, e.g. `pic3.png`
pub fn image_path(dir: &Path, rank: usize, mime_type: ImageMimeType) -> PathBuf {
    dir.join(format!("pic{}.{}", rank, mime_type.extension()))
}

/// Whether both sides fall inside `[MIN_DIMENSION, MAX_DIMENSION]`
pub fn within_bounds(width: u32, height: u32) -> bool {
    let ok = |side: u32| (MIN_DIMENSION..=MAX_DIMENSION).contains(&side);
    ok(width) && ok(height)
}

/// Read pixel dimensions from the image header without decoding pixels
///
/// The format is sniffed from the file contents, not its extension. Returns
/// `None` if the file cannot be read or is not a recognisable image.
pub fn read_dimensions(path: &Path) -> Option<(u32, u32)> {
    let dimensions = image::ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(image::ImageError::from)
        .and_then(|reader| reader.into_dimensions());

    match dimensions {
        Ok(dimensions) => Some(dimensions),
        Err(e) => {
            tracing::debug!("Could not read dimensions of {}: {}", path.display(), e);
            None
        }
    }
}

/// Write downloaded bytes to `path`
pub async fn save_image(path: &Path, bytes: &[u8]) -> Result<()> {
    tokio::fs::write(path, bytes).await.map_err(|source| {
        ImageError::Io {
            path: path.display().to_string(),
            source,
        }
        .into()
    })
}

/// Remove a rejected download so no later rank picks it up
pub async fn discard_image(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove rejected image {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn test_image_path_uses_rank_and_extension() {
        let dir = Path::new("/tmp/imgcast");
        assert_eq!(
            image_path(dir, 1, ImageMimeType::Jpeg),
            PathBuf::from("/tmp/imgcast/pic1.jpg")
        );
        assert_eq!(
            image_path(dir, 5, ImageMimeType::Png),
            PathBuf::from("/tmp/imgcast/pic5.png")
        );
    }

    #[test]
    fn test_within_bounds_edges() {
        assert!(within_bounds(4, 4));
        assert!(within_bounds(8192, 8192));
        assert!(within_bounds(4, 8192));
        assert!(within_bounds(640, 480));

        assert!(!within_bounds(3, 100));
        assert!(!within_bounds(100, 3));
        assert!(!within_bounds(8193, 100));
        assert!(!within_bounds(100, 8193));
        assert!(!within_bounds(0, 0));
    }

    #[test]
    fn test_read_dimensions_png() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "a.png", 12, 7);
        assert_eq!(read_dimensions(&path), Some((12, 7)));
    }

    #[test]
    fn test_read_dimensions_at_boundaries() {
        let dir = TempDir::new().unwrap();

        let small = write_png(dir.path(), "small.png", 4, 4);
        let (w, h) = read_dimensions(&small).unwrap();
        assert!(within_bounds(w, h));

        let tiny = write_png(dir.path(), "tiny.png", 3, 10);
        let (w, h) = read_dimensions(&tiny).unwrap();
        assert!(!within_bounds(w, h));

        let wide = write_png(dir.path(), "wide.png", 8192, 4);
        let (w, h) = read_dimensions(&wide).unwrap();
        assert!(within_bounds(w, h));

        let too_wide = write_png(dir.path(), "too_wide.png", 8193, 4);
        let (w, h) = read_dimensions(&too_wide).unwrap();
        assert!(!within_bounds(w, h));
    }

    #[test]
    fn test_read_dimensions_ignores_extension() {
        let dir = TempDir::new().unwrap();
        let png = write_png(dir.path(), "real.png", 9, 5);
        let misnamed = dir.path().join("pic1.jpg");
        std::fs::copy(&png, &misnamed).unwrap();

        assert_eq!(read_dimensions(&misnamed), Some((9, 5)));
    }

    #[test]
    fn test_read_dimensions_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert_eq!(read_dimensions(&path), None);
    }

    #[tokio::test]
    async fn test_save_and_discard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pic1.jpg");

        save_image(&path, b"bytes").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");

        discard_image(&path).await;
        assert!(!path.exists());

        // discarding twice is quiet
        discard_image(&path).await;
    }

    #[tokio::test]
    async fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("pic1.png");
        let err = save_image(&path, b"x").await.unwrap_err();
        assert!(err.to_string().contains("Failed to write image"));
    }
}
