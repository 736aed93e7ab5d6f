//! Visual overlays for chunk grids and tamper verdicts.
//!
//! Overlays are presentation only: they blend a translucent color over
//! chunk rectangles of a copy of the source image, leaving the sealed
//! image itself untouched.

use image::RgbaImage;
use stegoseal_core::{ChunkRect, GridCoord, GridLayout};

/// Overlay opacity, out of 255.
const OVERLAY_ALPHA: u16 = 80;

const RED: [u8; 3] = [255, 0, 0];
const BLUE: [u8; 3] = [0, 0, 255];

/// Alpha-blend `color` over every pixel of `rect`.
fn blend_rect(img: &mut RgbaImage, rect: ChunkRect, color: [u8; 3]) {
    for y in rect.y..rect.y + rect.h {
        for x in rect.x..rect.x + rect.w {
            let px = img.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended =
                    (color[c] as u16 * OVERLAY_ALPHA + px.0[c] as u16 * (255 - OVERLAY_ALPHA))
                        / 255;
                px.0[c] = blended as u8;
            }
        }
    }
}

/// Checkerboard overlay showing the chunk grid of a freshly sealed image:
/// alternating translucent blue and red cells.
pub fn grid_overlay(src: &RgbaImage, layout: &GridLayout) -> RgbaImage {
    let mut img = src.clone();
    for (cx, cy, rect) in layout.cells() {
        let color = if (cx % 2 == 0) == (cy % 2 == 0) {
            BLUE
        } else {
            RED
        };
        blend_rect(&mut img, rect, color);
    }
    img
}

/// Overlay highlighting tampered chunks in translucent red.
pub fn tamper_overlay(src: &RgbaImage, layout: &GridLayout, tampered: &[GridCoord]) -> RgbaImage {
    let mut img = src.clone();
    for coord in tampered {
        blend_rect(&mut img, layout.rect(coord.cx, coord.cy), RED);
    }
    img
}
