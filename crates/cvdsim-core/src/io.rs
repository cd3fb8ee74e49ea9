//! Loading and saving images on disk.

use std::path::Path;

use image::RgbImage;

use crate::error::{Result, SimError};
use crate::image::SimImage;

/// Load an image from disk as 8-bit RGB.
///
/// Supports the formats the `image` crate decodes (PNG, JPEG, ...). Alpha is
/// dropped and single-channel sources are expanded to three channels.
pub fn load_image(path: &Path) -> Result<SimImage<u8>> {
    let decoded = image::open(path).map_err(|source| SimError::Load {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "loaded image"
    );
    Ok(SimImage::from_rgb_image(decoded.into_rgb8()))
}

/// Encode `image` to `path`. The format follows the file extension.
pub fn save_image(image: &SimImage<u8>, path: &Path) -> Result<()> {
    save_rgb(&image.to_rgb_image(), path)
}

pub(crate) fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    image.save(path).map_err(|source| SimError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "saved image"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ChannelOrder;

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_image(Path::new("/nonexistent/cvdsim/input.png")).unwrap_err();
        assert!(matches!(err, SimError::Load { .. }));
    }

    #[test]
    fn test_png_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.png");
        let pixels = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [12, 34, 56]];
        let image = SimImage::from_pixels(2, 2, ChannelOrder::Rgb, &pixels).unwrap();

        save_image(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded, image);
    }

    #[test]
    fn test_bgr_saved_as_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bgr.png");
        let image = SimImage::filled(1, 1, ChannelOrder::Bgr, [0u8, 0, 255]);

        save_image(&image, &path).unwrap();
        let loaded = load_image(&path).unwrap();

        assert_eq!(loaded.order(), ChannelOrder::Rgb);
        assert_eq!(loaded.pixel(0, 0), Some([255, 0, 0]));
    }

    #[test]
    fn test_unknown_extension_is_save_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.notaformat");
        let image = SimImage::filled(1, 1, ChannelOrder::Rgb, [0u8, 0, 0]);
        let err = save_image(&image, &path).unwrap_err();
        assert!(matches!(err, SimError::Save { .. }));
    }
}
