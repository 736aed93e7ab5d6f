//! Encode (seal) command implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::{debug, info};

use stegoseal_core::{open_rgba, save_png, seal_image, GridConfig};

use crate::overlay;

/// File stem of the input, used to name both output files.
fn output_stem(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sealed")
        .to_string()
}

/// Execute the encode command.
pub fn execute(input: PathBuf, outdir: PathBuf, margin: usize, quiet: bool) -> Result<()> {
    let rgba = open_rgba(&input)
        .with_context(|| format!("Failed to read image: {}", input.display()))?;

    info!(
        path = %input.display(),
        width = rgba.width(),
        height = rgba.height(),
        "Read image"
    );

    let config = GridConfig {
        safety_margin: margin,
    };
    let outcome = seal_image(&rgba, &config).context("Failed to seal image")?;
    debug!(root = %hex::encode(outcome.root), "Sealed image");

    fs::create_dir_all(&outdir)
        .with_context(|| format!("Failed to write output directory: {}", outdir.display()))?;

    let stem = output_stem(&input);
    let sealed_path = outdir.join(format!("{stem}.png"));
    let overlay_path = outdir.join(format!("{stem}.overlay.png"));

    save_png(&sealed_path, &outcome.image)
        .with_context(|| format!("Failed to write sealed image: {}", sealed_path.display()))?;

    let grid_img = overlay::grid_overlay(&rgba, &outcome.layout);
    save_png(&overlay_path, &grid_img)
        .with_context(|| format!("Failed to write overlay image: {}", overlay_path.display()))?;

    info!(
        sealed = %sealed_path.display(),
        overlay = %overlay_path.display(),
        "Wrote output files"
    );

    if !quiet {
        println!();
        println!("{}", "Image sealed".green().bold());
        println!();
        println!("   {} {}", "Sealed image:".dimmed(), sealed_path.display());
        println!("   {} {}", "Grid overlay:".dimmed(), overlay_path.display());
        println!(
            "   {} {} x {} chunks",
            "Chunk grid:".dimmed(),
            outcome.layout.count_x(),
            outcome.layout.count_y()
        );
        println!(
            "   {} {}",
            "Merkle root:".dimmed(),
            hex::encode(outcome.root)
        );
        if outcome.layout.is_degenerate() {
            println!();
            println!(
                "{}",
                "Image too small for a multi-chunk grid; tampering cannot be localized".yellow()
            );
        }
    }

    Ok(())
}
