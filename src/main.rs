//! Quickmatch CLI
//!
//! A command-line interface for the Quickmatch compiler and evaluator.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use quickmatch::ir::lowered_matches;
use quickmatch::repl::{Repl, ReplConfig};
use quickmatch::{LowerOptions, Runtime, RuntimeConfig, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quickmatch")]
#[command(author, version, about = "Pattern-matching compiler and evaluator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source file to run
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Maximum nested call depth
    #[arg(long, value_name = "N", global = true)]
    max_call_depth: Option<usize>,

    /// Message raised when no clause matches
    #[arg(long, value_name = "MESSAGE", global = true)]
    failure_message: Option<String>,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a REPL (Read-Eval-Print-Loop)
    Repl {
        /// Print the lowered IR of every match before its result
        #[arg(long)]
        show_ir: bool,

        /// History file (defaults to ~/.quickmatch_history)
        #[arg(long, value_name = "PATH")]
        history: Option<PathBuf>,
    },

    /// Run a source file
    Run {
        /// The file to run
        file: PathBuf,
    },

    /// Evaluate source code and print the result
    Eval {
        /// The code to evaluate
        code: String,
    },

    /// Print the lowered IR of every match expression as JSON
    Lower {
        /// The file or code to lower
        input: String,
    },

    /// Parse and display the AST
    Parse {
        /// The file or code to parse
        input: String,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = runtime_config(&cli);

    match cli.command {
        Some(Commands::Repl { show_ir, history }) => {
            let mut repl_config = ReplConfig::default().with_show_ir(show_ir);
            if history.is_some() {
                repl_config = repl_config.with_history_file(history);
            }
            start_repl(repl_config, config)
        }
        Some(Commands::Run { file }) => run_file(&file, config),
        Some(Commands::Eval { code }) => eval_code(&code, config),
        Some(Commands::Lower { input }) => show_lowered(&input, config),
        Some(Commands::Parse { input }) => show_ast(&input),
        None => match cli.file {
            Some(file) => run_file(&file, config),
            None => start_repl(ReplConfig::default(), config),
        },
    }
}

fn runtime_config(cli: &Cli) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    if let Some(depth) = cli.max_call_depth {
        config = config.with_max_call_depth(depth);
    }
    if let Some(message) = &cli.failure_message {
        config = config.with_lower_options(LowerOptions::default().with_failure_message(message));
    }
    config
}

fn start_repl(repl_config: ReplConfig, config: RuntimeConfig) -> anyhow::Result<()> {
    let mut repl = Repl::with_runtime(repl_config, Runtime::with_config(config))?;
    repl.run()?;
    Ok(())
}

/// Read `input` as a file when one exists at that path, else treat it as code
fn read_input(input: &str) -> anyhow::Result<String> {
    let path = Path::new(input);
    if path.is_file() {
        fs::read_to_string(path).with_context(|| format!("Error reading '{}'", input))
    } else {
        Ok(input.to_string())
    }
}

fn run_file(path: &Path, config: RuntimeConfig) -> anyhow::Result<()> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Error reading '{}'", path.display()))?;
    let mut runtime = Runtime::with_config(config);
    runtime
        .eval(&source)
        .map_err(|e| anyhow!("{}", e.with_source_context(&source)))?;
    Ok(())
}

fn eval_code(code: &str, config: RuntimeConfig) -> anyhow::Result<()> {
    let mut runtime = Runtime::with_config(config);
    let value = runtime
        .eval(code)
        .map_err(|e| anyhow!("{}", e.with_source_context(code)))?;
    if !matches!(value, Value::Undefined) {
        println!("{}", value.to_display_string());
    }
    Ok(())
}

fn show_lowered(input: &str, config: RuntimeConfig) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let program = Runtime::with_config(config)
        .lower(&source)
        .map_err(|e| anyhow!("{}", e.with_source_context(&source)))?;
    let matches = lowered_matches(&program);
    println!("{}", serde_json::to_string_pretty(&matches)?);
    Ok(())
}

fn show_ast(input: &str) -> anyhow::Result<()> {
    let source = read_input(input)?;
    let program = quickmatch::parser::parse(&source)
        .map_err(|e| anyhow!("{}", e.with_source_context(&source)))?;
    println!("{:#?}", program);
    Ok(())
}
