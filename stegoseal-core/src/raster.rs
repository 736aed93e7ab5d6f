//! Raster I/O collaborators.
//!
//! Thin wrappers around the `image` crate that the sealing flows use to get
//! from a file on disk to the raw RGBA buffer the codec operates on. PNG is
//! supported for both reading and writing; JPEG is read-only, since its
//! lossy compression destroys the LSB plane a sealed image depends on.

use std::path::Path;

use image::{ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::Result;

/// Open the image at `path` and convert it to a non-premultiplied RGBA
/// buffer (4 bytes per pixel, row-major).
pub fn open_rgba(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path)?;
    let rgba = img.to_rgba8();
    debug!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "Decoded image"
    );
    Ok(rgba)
}

/// Save an RGBA buffer as PNG.
///
/// Only PNG is offered on the write side: a lossless format is a
/// correctness requirement, not a preference, because every payload bit
/// lives in the LSB plane.
pub fn save_png(path: &Path, image: &RgbaImage) -> Result<()> {
    image.save_with_format(path, ImageFormat::Png)?;
    debug!(path = %path.display(), "Saved PNG");
    Ok(())
}
