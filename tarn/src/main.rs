//! Tarn CLI

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tarn::error::{report_error, TarnError};
use tarn::{Config, Interpreter, ParseTree};

#[derive(Parser)]
#[command(name = "tarn", version, about = "Tarn - tree-walking script evaluator")]
struct Cli {
    /// Log function entry and exit (same as RUST_LOG=tarn=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a parse tree
    Run {
        /// Parse tree in JSON form
        file: PathBuf,
        /// Program source, for error reports with context
        #[arg(long)]
        source: Option<PathBuf>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Program flag as key=value, readable through flag(key)
        #[arg(long = "flag", value_name = "KEY=VALUE")]
        flags: Vec<String>,
        /// Arguments passed to the program, readable through argv()
        #[arg(last = true)]
        args: Vec<String>,
    },
    /// Decode and validate a parse tree without running it
    Check {
        file: PathBuf,
    },
    /// Print an indented outline of a parse tree
    Tree {
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run {
            file,
            source,
            config,
            flags,
            args,
        } => run_file(&file, source.as_deref(), config.as_deref(), &flags, args),
        Command::Check { file } => check_file(&file),
        Command::Tree { file } => print_tree(&file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        for detail in e.details() {
            eprintln!("  {detail}");
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr; program output owns stdout
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tarn=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn load_tree(path: &Path) -> tarn::Result<ParseTree> {
    let text = std::fs::read_to_string(path)?;
    let tree = ParseTree::from_json(&text)?;
    tree.validate().map_err(TarnError::Validation)?;
    Ok(tree)
}

fn run_file(
    path: &Path,
    source: Option<&Path>,
    config: Option<&Path>,
    flags: &[String],
    args: Vec<String>,
) -> tarn::Result<()> {
    let tree = load_tree(path)?;
    let mut config = match config {
        Some(config) => Config::load(config)?,
        None => Config::default(),
    };
    config.apply_flags(flags.iter().map(String::as_str))?;
    tracing::debug!(nodes = tree.len(), file = %path.display(), "loaded tree");

    let mut interp = Interpreter::with_config(tree, config).with_args(args);
    match (interp.run_program(), source) {
        (Ok(_), _) => Ok(()),
        (Err(e), Some(source)) => {
            let text = std::fs::read_to_string(source)?;
            report_error(&source.display().to_string(), &text, &e)?;
            std::process::exit(1);
        }
        (Err(e), None) => Err(e.into()),
    }
}

fn check_file(path: &Path) -> tarn::Result<()> {
    let tree = load_tree(path)?;
    println!("✓ {} is a well-formed tree ({} nodes)", path.display(), tree.len());
    Ok(())
}

fn print_tree(path: &Path) -> tarn::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let tree = ParseTree::from_json(&text)?;
    print!("{}", tree.outline());
    Ok(())
}
