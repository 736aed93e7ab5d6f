use thiserror::Error;

/// Errors surfaced by the sealing and verification flows.
///
/// Decode-side anomalies that are confined to a single chunk (a malformed
/// embedded proof) are deliberately *not* represented here: the decode flow
/// converts them into a per-chunk tampered verdict and keeps going.
#[derive(Error, Debug)]
pub enum StegosealError {
    #[error("chunk capacity exceeded: proof needs {needed} bytes, chunk holds {available}")]
    CapacityExceeded { needed: usize, available: usize },

    #[error("chunk bounds {x},{y} {w}x{h} exceed image dimensions {image_w}x{image_h}")]
    InvalidBounds {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        image_w: u32,
        image_h: u32,
    },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StegosealError>;
