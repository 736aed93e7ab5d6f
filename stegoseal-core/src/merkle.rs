//! Merkle tree construction, sibling-path proofs, and the embedded proof
//! wire format.
//!
//! The tree is built over the ordered list of chunk content digests. Each
//! leaf's proof is the minimal sibling path needed to recompute the root,
//! and is what gets serialized into that chunk's own LSBs.
//!
//! # Odd-node policy
//!
//! Levels with an odd node count **promote** the unpaired node: it is
//! carried up unchanged rather than hashed against a duplicate of itself.
//! Build and verification both assume this policy; a promoted level
//! contributes no step to the affected leaf's proof, so proofs can be
//! shorter than the nominal tree depth.

use sha2::{Digest as _, Sha256};

/// A SHA-256 digest.
pub type Digest = [u8; HASH_LEN];

/// Byte length of one digest.
pub const HASH_LEN: usize = 32;

/// Byte length of the path-count header preceding the serialized steps.
pub const PATH_COUNT_LEN: usize = 1;

/// Serialized byte length of one proof step: side flag plus sibling digest.
pub const PROOF_STEP_LEN: usize = 1 + HASH_LEN;

/// Which side of the running hash a sibling concatenates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }
}

/// One step of a leaf-to-root sibling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofStep {
    pub side: Side,
    pub sibling: Digest,
}

/// Hash of two child digests in fixed left/right order.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// A Merkle tree retaining every level, leaves first.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Build a tree over `leaves` in order. A single leaf is its own root.
    ///
    /// # Panics
    ///
    /// Panics if `leaves` is empty; the grid always produces at least one
    /// chunk.
    pub fn build(leaves: &[Digest]) -> Self {
        assert!(!leaves.is_empty(), "merkle tree needs at least one leaf");

        let mut levels = vec![leaves.to_vec()];
        while levels.last().unwrap().len() > 1 {
            let prev = levels.last().unwrap();
            let mut next = Vec::with_capacity(prev.len().div_ceil(2));
            for pair in prev.chunks(2) {
                match pair {
                    [left, right] => next.push(hash_pair(left, right)),
                    // Odd node: promoted unchanged.
                    [single] => next.push(*single),
                    _ => unreachable!(),
                }
            }
            levels.push(next);
        }

        Self { levels }
    }

    pub fn root(&self) -> Digest {
        self.levels.last().unwrap()[0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Sibling path for `leaf_index`, leaf-to-root order.
    ///
    /// At each level the sibling's digest is recorded together with the
    /// side it concatenates on. Levels where the node is promoted (no
    /// sibling) are skipped.
    ///
    /// # Panics
    ///
    /// Panics if `leaf_index` is out of range.
    pub fn proof_for(&self, leaf_index: usize) -> Vec<ProofStep> {
        assert!(leaf_index < self.leaf_count(), "leaf index out of range");

        let mut steps = Vec::new();
        let mut index = leaf_index;

        for level in &self.levels[..self.levels.len() - 1] {
            if index % 2 == 0 {
                if index + 1 < level.len() {
                    steps.push(ProofStep {
                        side: Side::Right,
                        sibling: level[index + 1],
                    });
                }
                // else: promoted, no step at this level.
            } else {
                steps.push(ProofStep {
                    side: Side::Left,
                    sibling: level[index - 1],
                });
            }
            index /= 2;
        }

        steps
    }
}

/// Recompute a root from a leaf digest and its sibling path.
pub fn verify_proof(leaf: &Digest, steps: &[ProofStep]) -> Digest {
    let mut running = *leaf;
    for step in steps {
        running = match step.side {
            Side::Left => hash_pair(&step.sibling, &running),
            Side::Right => hash_pair(&running, &step.sibling),
        };
    }
    running
}

/// Serialize a proof to the embedded wire format:
/// `u8 path_count`, then `path_count` entries of `u8 side || 32-byte
/// sibling digest`, in leaf-to-root order.
///
/// # Panics
///
/// Panics if the proof has more than 255 steps, which would require a tree
/// over more leaves than any image has pixels.
pub fn encode_proof(steps: &[ProofStep]) -> Vec<u8> {
    assert!(steps.len() <= u8::MAX as usize, "proof depth exceeds u8");

    let mut buf = Vec::with_capacity(PATH_COUNT_LEN + steps.len() * PROOF_STEP_LEN);
    buf.push(steps.len() as u8);
    for step in steps {
        buf.push(step.side as u8);
        buf.extend_from_slice(&step.sibling);
    }
    buf
}

/// Parse `count` serialized steps from `buf` (the bytes after the
/// path-count header). Returns `None` if the buffer has the wrong length
/// or a side flag is neither 0 nor 1.
pub fn decode_steps(buf: &[u8], count: usize) -> Option<Vec<ProofStep>> {
    if buf.len() != count * PROOF_STEP_LEN {
        return None;
    }

    let mut steps = Vec::with_capacity(count);
    for entry in buf.chunks_exact(PROOF_STEP_LEN) {
        let side = Side::from_byte(entry[0])?;
        let mut sibling = [0u8; HASH_LEN];
        sibling.copy_from_slice(&entry[1..]);
        steps.push(ProofStep { side, sibling });
    }
    Some(steps)
}
