//! The sealing (encode) flow.
//!
//! Partition -> hash all chunks -> build tree -> embed each chunk's proof
//! into its own LSBs -> recompose the output image. The flow is
//! all-or-nothing: a proof that does not fit its chunk aborts the whole
//! seal, since a half-embedded image is useless and would itself read as
//! tampered.
//!
//! Chunk hashing and proof embedding are independent per chunk and run on
//! the rayon pool; the tree build and the final recompose are the two join
//! barriers.

use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::chunk::Chunk;
use crate::error::{Result, StegosealError};
use crate::grid::{GridConfig, GridLayout};
use crate::merkle::{self, Digest, MerkleTree};

/// Result of sealing an image.
pub struct SealOutcome {
    /// The sealed image: source pixels with per-chunk proofs in the LSBs.
    pub image: RgbaImage,
    /// The grid the image was partitioned into.
    pub layout: GridLayout,
    /// Merkle root over all chunk content digests.
    pub root: Digest,
}

/// Seal `src`: embed a Merkle sibling path into every chunk of the image.
pub fn seal_image(src: &RgbaImage, config: &GridConfig) -> Result<SealOutcome> {
    let layout = GridLayout::compute(src.width(), src.height(), config);
    info!(
        chunks = layout.chunk_count(),
        count_x = layout.count_x(),
        count_y = layout.count_y(),
        "Partitioned image"
    );

    let mut chunks = layout
        .cells()
        .map(|(cx, cy, rect)| Chunk::extract(src, rect, cx, cy))
        .collect::<Result<Vec<_>>>()?;

    let hashes: Vec<Digest> = chunks.par_iter().map(Chunk::content_hash).collect();

    let tree = MerkleTree::build(&hashes);
    debug!(root = %hex::encode(tree.root()), "Built merkle tree");

    chunks
        .par_iter_mut()
        .enumerate()
        .try_for_each(|(leaf, chunk)| {
            let payload = merkle::encode_proof(&tree.proof_for(leaf));
            let written = chunk.write_lsb(&payload);
            if written < payload.len() {
                return Err(StegosealError::CapacityExceeded {
                    needed: payload.len(),
                    available: chunk.max_payload_bytes(),
                });
            }
            Ok(())
        })?;

    let mut image = RgbaImage::new(src.width(), src.height());
    for chunk in &chunks {
        chunk.blit_into(&mut image);
    }

    Ok(SealOutcome {
        image,
        layout,
        root: tree.root(),
    })
}
