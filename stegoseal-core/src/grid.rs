//! Chunk-grid partitioning.
//!
//! Decides how many rectangular chunks an image is split into and where
//! their boundaries lie. The tension: more chunks give finer tamper
//! localization, but every chunk must hold its own Merkle proof in its own
//! LSBs, and proofs grow with the tree depth while per-chunk capacity
//! shrinks with the chunk count. The computation finds the largest feasible
//! count, backs off by a configurable safety margin, and splits the count
//! into a near-square grid.

use tracing::{debug, warn};

use crate::chunk::{ChunkRect, LSB_CHANNELS};
use crate::merkle::{HASH_LEN, PATH_COUNT_LEN};

/// Bits needed per proof step: one sibling digest plus its side flag.
const STEP_BITS: usize = HASH_LEN * 8 + 1;

/// Tuning knobs for the grid computation.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    /// Headroom subtracted from the maximum feasible chunk count before
    /// the grid is laid out. The default of 20 is an empirical guard
    /// against rounding edge effects in the capacity estimate; it has not
    /// been derived from first principles, which is why it is a parameter
    /// rather than a constant.
    pub safety_margin: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { safety_margin: 20 }
    }
}

/// A computed chunk grid: `count_x * count_y` rectangles that exactly tile
/// the image, stored in chunk iteration order (outer `cx`, inner `cy`).
/// That order also defines the Merkle leaf order.
#[derive(Debug, Clone)]
pub struct GridLayout {
    count_x: usize,
    count_y: usize,
    rects: Vec<ChunkRect>,
}

impl GridLayout {
    /// Partition a `width x height` image.
    ///
    /// Images too small to give even two chunks enough proof space fall
    /// back to a degenerate 1x1 grid: the image still gets sealed, but a
    /// single chunk cannot localize tampering (and has no majority to
    /// vote with).
    pub fn compute(width: u32, height: u32, config: &GridConfig) -> Self {
        let total_bits = width as usize * height as usize * LSB_CHANNELS;

        let count = feasible_chunk_count(total_bits).saturating_sub(config.safety_margin);
        if count < 2 {
            warn!(
                width,
                height, "Image too small for a multi-chunk grid, tamper localization disabled"
            );
            return Self::single(width, height);
        }

        let (count_x, count_y) = balance_factors(count);
        debug!(count, count_x, count_y, "Computed chunk grid");

        let mut rects = Vec::with_capacity(count);
        for cx in 0..count_x {
            let (w, x) = axis_extent(width, count_x, cx);
            for cy in 0..count_y {
                let (h, y) = axis_extent(height, count_y, cy);
                rects.push(ChunkRect { x, y, w, h });
            }
        }

        Self {
            count_x,
            count_y,
            rects,
        }
    }

    fn single(width: u32, height: u32) -> Self {
        Self {
            count_x: 1,
            count_y: 1,
            rects: vec![ChunkRect {
                x: 0,
                y: 0,
                w: width,
                h: height,
            }],
        }
    }

    pub fn count_x(&self) -> usize {
        self.count_x
    }

    pub fn count_y(&self) -> usize {
        self.count_y
    }

    pub fn chunk_count(&self) -> usize {
        self.rects.len()
    }

    /// A single chunk means no majority vote and no localization.
    pub fn is_degenerate(&self) -> bool {
        self.rects.len() == 1
    }

    pub fn rect(&self, cx: usize, cy: usize) -> ChunkRect {
        self.rects[cx * self.count_y + cy]
    }

    /// Iterate cells in chunk iteration order (outer `cx`, inner `cy`),
    /// which is also the Merkle leaf order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, ChunkRect)> + '_ {
        self.rects.iter().enumerate().map(|(i, &rect)| {
            let cx = i / self.count_y;
            let cy = i % self.count_y;
            (cx, cy, rect)
        })
    }
}

/// Size and offset of chunk `i` of `count` along an axis of `extent`
/// pixels. The division remainder is absorbed one pixel at a time by the
/// first `extent % count` chunks, so sizes differ by at most one.
fn axis_extent(extent: u32, count: usize, i: usize) -> (u32, u32) {
    let count = count as u32;
    let i = i as u32;
    let base = extent / count;
    let rem = extent % count;
    if i < rem {
        (base + 1, i * (base + 1))
    } else {
        (base, rem + i * base)
    }
}

/// Largest even chunk count whose per-chunk proof still fits into the
/// per-chunk LSB capacity.
///
/// For a trial count `n`, a chunk must store one proof step per tree level
/// (`ceil(log2(n))` of them) plus the one-byte path-count header. Available
/// space per chunk is the total LSB capacity divided by `n`, reduced by the
/// bits clipped away when the division does not come out even, and rounded
/// down to whole bytes since the codec writes byte-at-a-time.
fn feasible_chunk_count(total_bits: usize) -> usize {
    let mut count = 2;
    loop {
        let needed_bits = ceil_log2(count) * STEP_BITS + PATH_COUNT_LEN * 8;
        let clipped = total_bits % count;
        let usable_bytes = (total_bits / count).saturating_sub(clipped) / 8;

        if needed_bits * count > total_bits || needed_bits > usable_bytes * 8 {
            break;
        }
        count += 2;
    }
    count - 2
}

/// ceil(log2(n)) for n >= 1.
fn ceil_log2(n: usize) -> usize {
    if n <= 1 {
        0
    } else {
        ((n - 1).ilog2() + 1) as usize
    }
}

/// Split `n` into two factors as close to each other as possible: take the
/// prime factors largest-first and multiply each onto whichever side is
/// currently smaller. A near-square grid keeps chunk aspect ratios close
/// to the image's own.
fn balance_factors(n: usize) -> (usize, usize) {
    let mut count_x = 1;
    let mut count_y = 1;
    for f in prime_factors(n).into_iter().rev() {
        if count_x <= count_y {
            count_x *= f;
        } else {
            count_y *= f;
        }
    }
    (count_x, count_y)
}

/// Prime factorization in ascending order; `prime_factors(1)` is empty.
fn prime_factors(mut n: usize) -> Vec<usize> {
    let mut factors = Vec::new();

    while n % 2 == 0 {
        factors.push(2);
        n /= 2;
    }

    let mut i = 3;
    while i * i <= n {
        while n % i == 0 {
            factors.push(i);
            n /= i;
        }
        i += 2;
    }

    if n > 2 {
        factors.push(n);
    }

    factors
}
