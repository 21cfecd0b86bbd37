//! Command line surface.

use clap::{ArgAction, CommandFactory, Parser};
use std::path::PathBuf;

use devgen::HelpLevel;

use crate::config::CONFIG_FILENAME;

/// Run marker-driven code generators over API type definitions.
///
/// Every positional argument is an option marker: a generator to run
/// (`crds`, `deepcopy:headerFile=hack/boilerplate.txt`), where its output
/// goes (`output:crds:artifacts:config=deploy`, `output:dir=out`) or a
/// common option (`paths=./api`, `filter=*_types.rs`).
#[derive(Debug, Parser)]
#[command(name = "devgen", version)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Print the markers accepted by the named generators and output rules
    /// (repeat up to -wwww for more detail and JSON)
    #[arg(short = 'w', long = "which-markers", action = ArgAction::Count)]
    pub which_markers: u8,

    /// Print usage and option documentation (repeat up to -hhhh for more
    /// detail and JSON)
    #[arg(short = 'h', long = "detailed-help", action = ArgAction::Count)]
    pub detailed_help: u8,

    /// Print usage
    #[arg(long)]
    pub help: bool,

    /// Print version
    #[arg(long)]
    pub version: bool,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default configuration file and exit
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = CONFIG_FILENAME)]
    pub init_config: Option<PathBuf>,

    /// Overwrite an existing file with --init-config
    #[arg(long)]
    pub force: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Option markers
    #[arg(value_name = "OPTION")]
    pub options: Vec<String>,
}

impl Cli {
    /// Requested usage detail, if any. `--help` is the summary level.
    pub fn help_level(&self) -> Option<HelpLevel> {
        if self.help && self.detailed_help == 0 {
            return Some(HelpLevel::Summary);
        }
        HelpLevel::from_count(self.detailed_help)
    }

    pub fn which_markers_level(&self) -> Option<HelpLevel> {
        HelpLevel::from_count(self.which_markers)
    }

    /// One-line usage.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }

    /// Usage with the flag descriptions.
    pub fn long_help() -> String {
        Self::command().render_help().to_string()
    }
}
