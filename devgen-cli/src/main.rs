//! # devgen
//!
//! ## Usage
//!
//! ```bash
//! # Generate CRDs and deep-copy methods for the types under ./api
//! devgen crds deepcopy paths=./api
//!
//! # Send only the CRDs somewhere else
//! devgen crds deepcopy paths=./api output:crds:artifacts:config=deploy/crds
//!
//! # Which markers does the crds generator understand?
//! devgen crds -ww
//!
//! # Initialize configuration
//! devgen --init-config
//! ```

use clap::Parser;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use tracing::debug;

use devgen::output::WriteOutcome;
use devgen::{
    ExecutionRuntime, HelpLevel, HelpPresenter, OptionsRegistry, RunReport, RuntimeBuilder,
};
use devgen_cli::{
    cli::Cli,
    config::{CliArgs, ConfigManager},
    error::{CliError, CliResult},
    logging,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            if e.is_usage_error() {
                eprintln!("\n{}", Cli::usage());
            }
            print_hint();
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    if cli.version {
        println!("devgen {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if let Some(path) = &cli.init_config {
        return cmd_init(path, cli.force);
    }

    let config = ConfigManager::load(cli.config.as_deref())?;
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            no_color: cli.no_color,
        },
    );
    if !config.logging.color {
        colored::control::set_override(false);
    }
    logging::init(&config.logging);

    let options = OptionsRegistry::builtin()?;

    if let Some(level) = cli.help_level() {
        return cmd_help(&options, level);
    }
    if let Some(level) = cli.which_markers_level() {
        return cmd_which_markers(&options, &cli.options, level);
    }

    let tokens = ConfigManager::tokens(&config, &cli.options);
    cmd_generate(&options, &tokens)
}

/// Usage plus the options documentation grouped by role.
fn cmd_help(options: &OptionsRegistry, level: HelpLevel) -> CliResult<()> {
    let docs = HelpPresenter::by_role(options).render(level)?;
    if level == HelpLevel::Json {
        print!("{}", docs);
        return Ok(());
    }
    eprintln!("{}", Cli::long_help());
    eprintln!("\n{}\n", "Options".bold());
    eprint!("{}", docs);
    Ok(())
}

/// Markers accepted by the generators and rules named on the command line.
fn cmd_which_markers(
    options: &OptionsRegistry,
    tokens: &[String],
    level: HelpLevel,
) -> CliResult<()> {
    let registry = options.filtered(tokens)?;
    let docs = HelpPresenter::by_category(&registry).render(level)?;
    if level == HelpLevel::Json {
        print!("{}", docs);
    } else {
        eprint!("{}", docs);
    }
    Ok(())
}

fn cmd_generate(options: &OptionsRegistry, tokens: &[String]) -> CliResult<()> {
    debug!(?tokens, "applying options");
    let config = RuntimeBuilder::new(options).build(tokens)?;
    let names: Vec<&str> = config.tasks.iter().map(|t| t.name.as_str()).collect();
    eprintln!(
        "{} {}",
        "Running generators:".cyan(), names.join(", ").green()
    );

    let report = ExecutionRuntime::new(config, options).run();
    print_report(&report);

    if report.had_errors() {
        let failed = report.source_errors.len() + report.failures().count();
        return Err(CliError::GenerationFailed { failed });
    }
    Ok(())
}

/// Init command implementation.
fn cmd_init(path: &Path, force: bool) -> CliResult<()> {
    ConfigManager::init(path, force)?;
    eprintln!(
        "{} Created configuration file: {}",
        "✓".green(), path.display()
    );
    Ok(())
}

fn print_report(report: &RunReport) {
    for error in &report.source_errors {
        eprintln!("{} {}", "Source error:".red(), error);
    }
    for generator in &report.generators {
        match &generator.outcome {
            Ok(outcomes) => {
                eprintln!("{} {}", "✓".green(), generator.name.bold());
                for outcome in outcomes {
                    if let WriteOutcome::Written { path, bytes } = outcome {
                        eprintln!("    {} ({} bytes)", path.display(), bytes);
                    }
                }
            }
            Err(e) => eprintln!("{} {}: {}", "✗".red(), generator.name.bold(), e),
        }
    }
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

/// Point at the marker and usage documentation for the same arguments.
fn print_hint() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = args.join(" ");
    eprintln!(
        "run `devgen {args} -w` to see all available markers, or `devgen {args} -h` for usage",
        args = args
    );
}
