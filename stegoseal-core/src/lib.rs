//! Stegoseal Core - Tamper-evident image sealing library
//!
//! This crate embeds a tamper-evidence proof inside an image using
//! least-significant-bit steganography, and can later verify whether the
//! image was altered and localize which regions changed.
//!
//! # How it works
//!
//! The image is partitioned into a grid of rectangular chunks. Every chunk
//! is hashed over its most significant bits (the LSBs are zeroed first, so
//! the digest is insensitive to what will be stored there), a Merkle tree
//! is built over all chunk digests, and each chunk's sibling path is
//! written into that chunk's own LSBs. Verification recomputes a root per
//! chunk from its embedded path; chunks disagreeing with the majority root
//! are reported as tampered, by grid coordinate.
//!
//! Sealing survives only lossless storage (PNG). Any pixel-value edit that
//! touches a chunk's most significant bits changes its recomputed root;
//! resizing or recompression destroys the proofs entirely.
//!
//! # Example
//!
//! ```no_run
//! use stegoseal_core::{open_rgba, save_png, seal_image, verify_image, GridConfig};
//!
//! # fn example() -> stegoseal_core::Result<()> {
//! let src = open_rgba("photo.png".as_ref())?;
//!
//! let sealed = seal_image(&src, &GridConfig::default())?;
//! save_png("photo.sealed.png".as_ref(), &sealed.image)?;
//!
//! let report = verify_image(&sealed.image, &GridConfig::default())?;
//! assert!(report.is_authentic());
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod decode;
pub mod encode;
pub mod error;
pub mod grid;
pub mod merkle;
pub mod raster;

// Re-export main types for convenience
pub use chunk::{Chunk, ChunkRect, LSB_CHANNELS};
pub use decode::{verify_image, GridCoord, RootGroup, Verdict, VerifyReport};
pub use encode::{seal_image, SealOutcome};
pub use error::{Result, StegosealError};
pub use grid::{GridConfig, GridLayout};
pub use merkle::{verify_proof, Digest, MerkleTree, ProofStep, Side};
pub use raster::{open_rgba, save_png};
