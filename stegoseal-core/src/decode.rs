//! The verification (decode) flow.
//!
//! Partition identically to the seal -> read each chunk's embedded proof
//! -> recompute a root per chunk from its own content digest -> group the
//! roots -> the most frequent root is canonical -> chunks disagreeing with
//! it are tampered, reported by grid coordinate.
//!
//! A chunk whose embedded proof is malformed (path count that cannot fit
//! its capacity, truncated entry, side flag outside 0/1) is
//! tampered-by-default: its root computation is abandoned and it lands in
//! the non-canonical bucket. This is deliberate policy, not error
//! swallowing: tampering is exactly what corrupts embedded proofs, and one
//! damaged chunk must never prevent a verdict on the rest of the image.
//!
//! Majority voting is a heuristic, not a cryptographic guarantee: an
//! attacker who rewrites more than half the chunks consistently owns the
//! canonical root. The flow makes no attempt to defend against that; it
//! localizes accidental and casual edits.

use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chunk::Chunk;
use crate::error::Result;
use crate::grid::{GridConfig, GridLayout};
use crate::merkle::{self, Digest, PATH_COUNT_LEN, PROOF_STEP_LEN};

/// Grid coordinates of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCoord {
    pub cx: usize,
    pub cy: usize,
}

/// Overall verdict for an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every chunk agrees on one root.
    Authentic,
    /// A majority root exists; the chunks outside it are listed.
    Tampered,
    /// No two chunks agree on any root, so there is nothing to vote with.
    Unverifiable,
}

/// One group of chunks sharing a recomputed root.
#[derive(Debug, Clone, Serialize)]
pub struct RootGroup {
    /// Hex-encoded root digest.
    pub root: String,
    pub count: usize,
    pub chunks: Vec<GridCoord>,
}

/// The full verification report.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub verdict: Verdict,
    pub count_x: usize,
    pub count_y: usize,
    /// Hex-encoded canonical root, absent when unverifiable.
    pub canonical_root: Option<String>,
    /// Root groups in first-seen (chunk iteration) order.
    pub root_groups: Vec<RootGroup>,
    /// Chunks with malformed embedded proofs, a subset of `tampered`.
    pub malformed: Vec<GridCoord>,
    /// All non-canonical chunks, in chunk iteration order.
    pub tampered: Vec<GridCoord>,
}

impl VerifyReport {
    pub fn is_authentic(&self) -> bool {
        self.verdict == Verdict::Authentic
    }
}

/// Verify `src` and localize tampering.
///
/// Never fails on per-chunk anomalies; only collaborator-level problems
/// (an unreadable image was handled by the caller, invalid bounds cannot
/// occur for a computed grid) surface as errors.
pub fn verify_image(src: &RgbaImage, config: &GridConfig) -> Result<VerifyReport> {
    let layout = GridLayout::compute(src.width(), src.height(), config);
    info!(
        chunks = layout.chunk_count(),
        count_x = layout.count_x(),
        count_y = layout.count_y(),
        "Partitioned image"
    );
    if layout.is_degenerate() {
        warn!("Single-chunk image: no tamper localization possible");
    }

    let mut chunks = layout
        .cells()
        .map(|(cx, cy, rect)| Chunk::extract(src, rect, cx, cy))
        .collect::<Result<Vec<_>>>()?;

    // Per-chunk root recomputation is independent; the grouping below is
    // the join barrier.
    let roots: Vec<Option<Digest>> = chunks
        .par_iter_mut()
        .map(|chunk| recompute_root(chunk))
        .collect();

    Ok(build_report(&layout, &chunks, &roots))
}

/// Read the embedded proof from `chunk` and walk it up from the chunk's
/// own content digest. `None` means the proof is malformed.
fn recompute_root(chunk: &mut Chunk) -> Option<Digest> {
    let mut header = [0u8; PATH_COUNT_LEN];
    if chunk.read_lsb(&mut header) < header.len() {
        return None;
    }
    let path_count = header[0] as usize;

    // A tampered header can claim far more entries than the chunk could
    // ever hold; reject before reading.
    if PATH_COUNT_LEN + path_count * PROOF_STEP_LEN > chunk.max_payload_bytes() {
        debug!(
            coord = ?chunk.coord(),
            path_count, "Claimed path count exceeds chunk capacity"
        );
        return None;
    }

    let mut buf = vec![0u8; path_count * PROOF_STEP_LEN];
    if chunk.read_lsb(&mut buf) < buf.len() {
        return None;
    }

    let steps = merkle::decode_steps(&buf, path_count)?;
    Some(merkle::verify_proof(&chunk.content_hash(), &steps))
}

fn build_report(layout: &GridLayout, chunks: &[Chunk], roots: &[Option<Digest>]) -> VerifyReport {
    // Group in chunk iteration order so the first-seen tie-break is
    // deterministic. Group counts are small; a linear scan is fine.
    let mut groups: Vec<(Digest, Vec<GridCoord>)> = Vec::new();
    let mut malformed = Vec::new();

    for (chunk, root) in chunks.iter().zip(roots) {
        let (cx, cy) = chunk.coord();
        let coord = GridCoord { cx, cy };
        match root {
            Some(root) => match groups.iter_mut().find(|(r, _)| r == root) {
                Some((_, members)) => members.push(coord),
                None => groups.push((*root, vec![coord])),
            },
            None => malformed.push(coord),
        }
    }

    // Canonical root: largest group, first-seen on ties (strictly-greater
    // update keeps the earlier group). A lone group is canonical whatever
    // its size; otherwise a "majority" of one (every root distinct)
    // verifies nothing.
    let mut best: Option<usize> = None;
    for (i, (_, members)) in groups.iter().enumerate() {
        if best.is_none_or(|b| members.len() > groups[b].1.len()) {
            best = Some(i);
        }
    }
    let canonical = match best {
        Some(i) if groups[i].1.len() > 1 || groups.len() == 1 => Some(i),
        _ => None,
    };

    let tampered: Vec<GridCoord> = chunks
        .iter()
        .zip(roots)
        .filter_map(|(chunk, root)| {
            let (cx, cy) = chunk.coord();
            let coord = GridCoord { cx, cy };
            let canonical_root = canonical.map(|i| groups[i].0);
            match root {
                Some(r) if Some(*r) == canonical_root => None,
                _ => Some(coord),
            }
        })
        .collect();

    let verdict = if canonical.is_none() {
        Verdict::Unverifiable
    } else if tampered.is_empty() {
        Verdict::Authentic
    } else {
        Verdict::Tampered
    };

    VerifyReport {
        verdict,
        count_x: layout.count_x(),
        count_y: layout.count_y(),
        canonical_root: canonical.map(|i| hex::encode(groups[i].0)),
        root_groups: groups
            .into_iter()
            .map(|(root, members)| RootGroup {
                root: hex::encode(root),
                count: members.len(),
                chunks: members,
            })
            .collect(),
        malformed,
        tampered,
    }
}
