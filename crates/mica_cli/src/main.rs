//! mica: run mica programs or start an interactive session.
//!
//! Usage:
//!   mica [options] [FILE]
//!
//! Without a file, reads submissions from standard input.

mod render;
mod repl;

use bumpalo::Bump;
use clap::Parser as ClapParser;
use mica_compiler::{evaluator_options, Compilation};
use mica_evaluator::{StdConsole, Variables};
use mica_options::CompilerOptions;
use mica_parser::SyntaxTree;
use miette::{IntoDiagnostic, WrapErr};
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use render::{print_diagnostics, print_error, print_evaluate_error, stderr_is_terminal};

/// Exit status when the program has diagnostics.
const EXIT_DIAGNOSTICS: u8 = 2;
/// Exit status when evaluation fails at runtime.
const EXIT_RUNTIME_ERROR: u8 = 3;
/// Exit status when evaluation hits a bug in the toolchain.
const EXIT_INTERNAL_ERROR: u8 = 70;

#[derive(ClapParser, Debug)]
#[command(name = "mica", version, about = "mica - a small statically typed scripting language")]
struct Cli {
    /// Program to run. Starts the interactive prompt when omitted.
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Path to a mica.json configuration file.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Print the lowered program before running it.
    #[arg(long = "emit-tree")]
    emit_tree: bool,

    /// Print the control-flow graph of FUNCTION (or of the top-level
    /// statements) in Graphviz format instead of running.
    #[arg(long, value_name = "FUNCTION", num_args = 0..=1, default_missing_value = "")]
    cfg: Option<String>,

    /// Abort after executing this many statements.
    #[arg(long = "step-limit")]
    step_limit: Option<u64>,

    /// Maximum nesting of function calls.
    #[arg(long = "max-call-depth")]
    max_call_depth: Option<usize>,

    /// Seed for the `random` builtin.
    #[arg(long)]
    seed: Option<u64>,

    /// Print diagnostics one per line without source snippets.
    #[arg(long)]
    plain: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let options = match load_options(&cli) {
        Ok(options) => options,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(options.log_level.as_deref());

    let pretty = !cli.plain && stderr_is_terminal();
    match &cli.file {
        Some(path) => match run_file(path, &cli, &options, pretty) {
            Ok(code) => code,
            Err(report) => {
                eprintln!("{report:?}");
                ExitCode::FAILURE
            }
        },
        None => match repl::run(&options, pretty) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                print_error(&err.to_string());
                ExitCode::FAILURE
            }
        },
    }
}

/// `mica.json` (explicit path, or discovered in the working directory),
/// with command-line flags applied on top.
fn load_options(cli: &Cli) -> miette::Result<CompilerOptions> {
    let mut options = match &cli.config {
        Some(path) => mica_options::load_config_file(path),
        None => mica_options::discover_config("."),
    }
    .into_diagnostic()
    .wrap_err("failed to load configuration")?;

    if cli.emit_tree {
        options.emit_tree = true;
    }
    if cli.step_limit.is_some() {
        options.step_limit = cli.step_limit;
    }
    if cli.max_call_depth.is_some() {
        options.max_call_depth = cli.max_call_depth;
    }
    if cli.seed.is_some() {
        options.random_seed = cli.seed;
    }
    Ok(options)
}

/// Install the `tracing` subscriber. `MICA_LOG` wins over the configured
/// level; the fallback is `warn`.
fn init_logging(log_level: Option<&str>) {
    let filter = EnvFilter::try_from_env("MICA_LOG")
        .or_else(|_| EnvFilter::try_new(log_level.unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &str, cli: &Cli, options: &CompilerOptions, pretty: bool) -> miette::Result<ExitCode> {
    let text = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read '{path}'"))?;

    let arena = Bump::new();
    let compilation = Compilation::new(SyntaxTree::parse(&arena, &text));
    let mut stdout = std::io::stdout().lock();

    if let Some(function) = &cli.cfg {
        let function = (!function.is_empty()).then_some(function.as_str());
        let found = compilation.emit_control_flow_graph(function, &mut stdout).into_diagnostic()?;
        if !found {
            print_error(&format!("no function named '{}'", function.unwrap_or_default()));
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let diagnostics = compilation.diagnostics();
    if !diagnostics.is_empty() {
        print_diagnostics(&diagnostics, path, &text, pretty);
        return Ok(ExitCode::from(EXIT_DIAGNOSTICS));
    }

    if options.emit_tree {
        compilation.emit_tree(&mut stdout).into_diagnostic()?;
        stdout.flush().into_diagnostic()?;
    }
    drop(stdout);

    let mut variables = Variables::default();
    match compilation.evaluate_with(&mut variables, &mut StdConsole, evaluator_options(options)) {
        Ok(result) if !result.diagnostics.is_empty() => {
            print_diagnostics(&result.diagnostics, path, &text, pretty);
            Ok(ExitCode::from(EXIT_DIAGNOSTICS))
        }
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            print_evaluate_error(&err);
            let code = if err.is_internal() { EXIT_INTERNAL_ERROR } else { EXIT_RUNTIME_ERROR };
            Ok(ExitCode::from(code))
        }
    }
}
