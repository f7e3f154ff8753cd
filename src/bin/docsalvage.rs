//! Command-line front end for docsalvage.
//!
//! # Usage
//!
//! ```bash
//! # Print the text of one document
//! docsalvage report.doc
//!
//! # Several documents, heuristics restricted to two strategies
//! docsalvage a.doc b.doc --strategy utf16-interleave --strategy frequency
//!
//! # YAML report of how the text was chosen
//! docsalvage --report -v damaged.doc
//! ```

use clap::Parser;
use docsalvage::{ExtractOptions, Extractor, HeuristicStrategy};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Recover plain text from legacy Word (.doc) files
#[derive(Parser, Debug)]
#[command(name = "docsalvage")]
#[command(version, about, long_about = None)]
struct Args {
    /// Files to extract
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Heuristic strategy to run (repeatable; default: all)
    #[arg(long = "strategy", value_enum)]
    strategies: Vec<HeuristicStrategy>,

    /// Skip piece-table decoding and use heuristics only
    #[arg(long)]
    no_structural: bool,

    /// Run strategies on one thread
    #[arg(long)]
    sequential: bool,

    /// YAML file with extraction options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a YAML report instead of the bare text
    #[arg(long)]
    report: bool,

    /// Log stage decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_options(args: &Args) -> Result<ExtractOptions, String> {
    let mut options = match &args.config {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            serde_saphyr::from_str::<ExtractOptions>(&yaml)
                .map_err(|e| format!("{}: {}", path.display(), e))?
        }
        None => ExtractOptions::default(),
    };

    if !args.strategies.is_empty() {
        options.strategies = args.strategies.clone();
    }
    if args.no_structural {
        options.structural = false;
    }
    if args.sequential {
        options.use_parallel = false;
    }
    Ok(options)
}

fn run_one(extractor: &Extractor, path: &Path, report: bool) -> Result<String, String> {
    let data = std::fs::read(path).map_err(|e| e.to_string())?;
    if report {
        let extraction = extractor
            .extract_with_report(&data)
            .map_err(|e| e.to_string())?;
        serde_saphyr::to_string(&extraction).map_err(|e| e.to_string())
    } else {
        extractor.extract_text(&data).map_err(|e| e.to_string())
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let options = match load_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("docsalvage: invalid config {}", e);
            return ExitCode::FAILURE;
        }
    };
    let extractor = Extractor::new(options);
    let with_headers = args.files.len() > 1;
    let mut failed = false;

    for (i, path) in args.files.iter().enumerate() {
        if with_headers {
            if i > 0 {
                println!();
            }
            println!("==> {} <==", path.display());
        }
        match run_one(&extractor, path, args.report) {
            Ok(output) => println!("{}", output.trim_end()),
            Err(e) => {
                eprintln!("docsalvage: {}: {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
