//! Stegoseal CLI - tamper-evident image sealing tool.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod overlay;

use exit_codes::ExitCode;

#[derive(Parser)]
#[command(name = "stegoseal")]
#[command(
    author,
    version,
    about = "Tamper-evident image sealing via LSB steganography",
    long_about = None,
    after_help = "Exit codes:\n  \
         0   success / image authentic\n  \
         65  image tampered or unverifiable\n  \
         66  cannot read input image\n  \
         74  cannot write output file\n  \
         1   any other error"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress user-facing output (logs still go to stderr)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Control colored output
    #[arg(long, global = true, value_enum, default_value = "auto")]
    color: ColorMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Seal an image: embed per-chunk Merkle proofs into its LSBs
    Encode {
        /// Path to the image to seal (PNG or JPEG)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Directory for the sealed image and its chunk-grid overlay
        #[arg(value_name = "OUTDIR")]
        outdir: PathBuf,

        /// Safety margin subtracted from the maximum feasible chunk count
        #[arg(long, default_value_t = 20)]
        margin: usize,
    },

    /// Verify a sealed image and localize tampered regions
    Decode {
        /// Path to the sealed image (PNG)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Safety margin; must match the value used when sealing
        #[arg(long, default_value_t = 20)]
        margin: usize,

        /// Emit the verification report as JSON instead of a banner
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }

    // Logs go to stderr so stdout stays clean for verdicts and JSON.
    let filter = if cli.verbose {
        "stegoseal_cli=debug,stegoseal_core=debug,info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli);

    if let Err(err) = result {
        let exit = ExitCode::from_anyhow(&err);
        eprintln!("Error: {:#}", err);
        process::exit(exit.code);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Encode {
            input,
            outdir,
            margin,
        } => commands::encode::execute(input, outdir, margin, cli.quiet),
        Commands::Decode {
            input,
            margin,
            json,
        } => commands::decode::execute(input, margin, json, cli.quiet),
    }
}
