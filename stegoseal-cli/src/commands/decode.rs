//! Decode (verify) command implementation.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tracing::info;

use stegoseal_core::{
    open_rgba, save_png, verify_image, GridConfig, GridLayout, Verdict, VerifyReport,
};

use crate::overlay;

/// Execute the decode command.
pub fn execute(input: PathBuf, margin: usize, json: bool, quiet: bool) -> Result<()> {
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
    let report = verify_image(&rgba, &config).context("Failed to verify image")?;

    // Overlay goes next to the input, marking the non-canonical chunks.
    let layout = GridLayout::compute(rgba.width(), rgba.height(), &config);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("decoded")
        .to_string();
    let overlay_path = input
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join(format!("{stem}.overlay.png"));

    let overlay_img = overlay::tamper_overlay(&rgba, &layout, &report.tampered);
    save_png(&overlay_path, &overlay_img)
        .with_context(|| format!("Failed to write overlay image: {}", overlay_path.display()))?;

    info!(overlay = %overlay_path.display(), verdict = ?report.verdict, "Verification complete");

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        print_report(&report, &overlay_path);
    }

    match report.verdict {
        Verdict::Authentic => Ok(()),
        Verdict::Tampered => bail!(
            "verification failed: {} of {} chunks tampered",
            report.tampered.len(),
            report.count_x * report.count_y
        ),
        Verdict::Unverifiable => bail!("verification failed: image unverifiable, no majority root"),
    }
}

fn print_report(report: &VerifyReport, overlay_path: &std::path::Path) {
    println!();
    match report.verdict {
        Verdict::Authentic => {
            println!("{}", "╔════════════════════════════════════════╗".green());
            println!(
                "{}",
                "║              AUTHENTIC                 ║".green().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".green());
            println!();
            println!(
                "   {} all {} chunks agree",
                "Chunks:".dimmed(),
                report.count_x * report.count_y
            );
            if let Some(root) = &report.canonical_root {
                println!("   {} {}", "Canonical root:".dimmed(), root);
            }
            print_root_table(report);
        }
        Verdict::Tampered | Verdict::Unverifiable => {
            println!("{}", "╔════════════════════════════════════════╗".red());
            println!(
                "{}",
                "║              TAMPERED                  ║".red().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".red());
            println!();
            match &report.canonical_root {
                Some(root) => println!("   {} {}", "Canonical root:".dimmed(), root),
                None => println!(
                    "   {} {}",
                    "Canonical root:".dimmed(),
                    "none, no two chunks agree".red()
                ),
            }
            println!(
                "   {} {} of {}",
                "Tampered chunks:".dimmed(),
                report.tampered.len().to_string().red(),
                report.count_x * report.count_y
            );
            for coord in &report.tampered {
                println!("      chunk ({}, {})", coord.cx, coord.cy);
            }
            print_root_table(report);
        }
    }
    println!();
    println!("   {} {}", "Overlay:".dimmed(), overlay_path.display());
}

fn print_root_table(report: &VerifyReport) {
    println!();
    println!("   {:>5}  {}", "Count".dimmed(), "Root".dimmed());
    for group in &report.root_groups {
        println!("   {:>5}  {}", group.count, group.root);
    }
}
