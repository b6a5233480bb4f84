//! sdkgen
//!
//! Generates a typed Rust client SDK from an IR document.

use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sdkgen_gen::config::GeneratorConfig;
use sdkgen_gen::errors::GeneratorError;
use sdkgen_gen::output::generate_and_write;
use sdkgen_gen::parser::load_ir;

/// sdkgen - transforms API IR documents into typed Rust client SDKs
#[derive(Parser, Debug)]
#[command(name = "sdkgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// IR document (JSON) describing the API
    #[arg(long)]
    ir: PathBuf,

    /// Output directory for generated code
    #[arg(short, long, default_value = "sdk/src")]
    output: PathBuf,

    /// Generator configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SDK version sent in platform headers; overrides the configuration
    #[arg(long)]
    sdk_version: Option<String>,

    /// Print generated code without writing files
    #[arg(long)]
    dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// `RUST_LOG` wins over the `-v` count.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    if let Some(version) = cli.sdk_version {
        config.sdk_version = Some(version);
    }

    let ir = load_ir(&cli.ir)?;
    info!(api = %ir.api_name, output = %cli.output.display(), "generating sdk");

    let files = generate_and_write(&ir, &config, &cli.output, cli.dry_run)?;

    if !cli.dry_run {
        println!(
            "{} {} files for {} to {}",
            "Generated".green().bold(),
            files.len(),
            ir.api_name.original().cyan(),
            cli.output.display()
        );
        if cli.verbose > 0 {
            for file in &files {
                println!("  {}", file.path.display());
            }
        }
    }

    Ok(())
}
