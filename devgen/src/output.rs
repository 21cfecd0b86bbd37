//! Output rules: where a generator's artifacts are written.
//!
//! The set of output forms is closed. Each form is registered under a name
//! (`dir`, `none`, `stdout`, `artifacts`) and configured from a marker
//! value into an [`OutputRule`], which then opens one destination per
//! artifact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::OutputError;
use crate::generator::{Artifact, ArtifactKind};
use crate::markers::{ArgKind, FieldSpec, MarkerHelp, MarkerSchema, MarkerValue};

/// Directory that receives configuration artifacts when no output rule is
/// given.
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// A named output strategy, before configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputForm {
    /// `output:dir=<path>`: every artifact into one directory.
    Dir,
    /// `output:none`: discard.
    Nothing,
    /// `output:stdout`: write artifacts to standard output.
    Stdout,
    /// `output:artifacts:config=<path>[,code=<path>]`: route by artifact kind.
    Artifacts,
}

#[derive(Debug, Deserialize)]
struct ArtifactsOptions {
    config: PathBuf,
    #[serde(default)]
    code: Option<PathBuf>,
}

impl OutputForm {
    pub fn name(&self) -> &'static str {
        match self {
            OutputForm::Dir => "dir",
            OutputForm::Nothing => "none",
            OutputForm::Stdout => "stdout",
            OutputForm::Artifacts => "artifacts",
        }
    }

    /// Shape of the marker that configures this form.
    pub fn schema(&self) -> MarkerSchema {
        match self {
            OutputForm::Dir => MarkerSchema::value(ArgKind::String),
            OutputForm::Nothing | OutputForm::Stdout => MarkerSchema::empty(),
            OutputForm::Artifacts => MarkerSchema::fields(vec![
                FieldSpec::required("config", ArgKind::String)
                    .with_help("directory for configuration artifacts such as CRD manifests"),
                FieldSpec::optional("code", ArgKind::String).with_help(
                    "directory for code artifacts (default: next to the source files)",
                ),
            ]),
        }
    }

    pub fn help(&self) -> MarkerHelp {
        let help = MarkerHelp::new("output", self.summary());
        match self {
            OutputForm::Stdout => help.advanced(),
            OutputForm::Artifacts => help.with_details(
                "Code artifacts land in the package directory of the source file they were \
                 generated from, unless code=<dir> is given. Configuration artifacts land in \
                 config=<dir>.",
            ),
            _ => help,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            OutputForm::Dir => "outputs each artifact to the given directory",
            OutputForm::Nothing => "skips outputting anything",
            OutputForm::Stdout => "outputs everything to standard output",
            OutputForm::Artifacts => {
                "outputs code next to its sources and configuration to a directory"
            }
        }
    }

    /// Build the rule from an already parsed marker value.
    ///
    /// The error is a bare message; the caller attaches the token.
    pub fn configure(&self, value: &MarkerValue) -> Result<OutputRule, String> {
        match self {
            OutputForm::Dir => value
                .as_str()
                .map(|dir| OutputRule::Directory(PathBuf::from(dir)))
                .ok_or_else(|| "expected a directory path".to_string()),
            OutputForm::Nothing => Ok(OutputRule::Nothing),
            OutputForm::Stdout => Ok(OutputRule::Stdout),
            OutputForm::Artifacts => {
                let options: ArtifactsOptions = value.decode().map_err(|e| e.to_string())?;
                Ok(OutputRule::Artifacts {
                    config: options.config,
                    code: options.code,
                })
            }
        }
    }
}

/// Fixed mapping from output rule name to form, in registration order.
#[derive(Debug, Clone)]
pub struct OutputRuleRegistry {
    forms: Vec<OutputForm>,
}

impl OutputRuleRegistry {
    pub fn new(forms: Vec<OutputForm>) -> Self {
        Self { forms }
    }

    /// Every output form shipped with devgen.
    pub fn builtin() -> Self {
        Self::new(vec![
            OutputForm::Dir,
            OutputForm::Nothing,
            OutputForm::Stdout,
            OutputForm::Artifacts,
        ])
    }

    pub fn get(&self, name: &str) -> Option<OutputForm> {
        self.forms.iter().copied().find(|f| f.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = OutputForm> + '_ {
        self.forms.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.forms.iter().map(OutputForm::name)
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

impl Default for OutputRuleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// A configured destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputRule {
    Directory(PathBuf),
    Nothing,
    Stdout,
    Artifacts {
        config: PathBuf,
        code: Option<PathBuf>,
    },
}

impl Default for OutputRule {
    /// Used for generators that have no output rule at all.
    fn default() -> Self {
        OutputRule::Artifacts {
            config: PathBuf::from(DEFAULT_CONFIG_DIR),
            code: None,
        }
    }
}

/// What happened to one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written to a file.
    Written { path: PathBuf, bytes: usize },
    /// Written to standard output.
    Streamed { bytes: usize },
    /// Dropped by `output:none`.
    Discarded,
}

impl WriteOutcome {
    /// File the artifact was written to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            WriteOutcome::Written { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn bytes(&self) -> usize {
        match self {
            WriteOutcome::Written { bytes, .. } | WriteOutcome::Streamed { bytes } => *bytes,
            WriteOutcome::Discarded => 0,
        }
    }
}

impl OutputRule {
    pub fn form(&self) -> OutputForm {
        match self {
            OutputRule::Directory(_) => OutputForm::Dir,
            OutputRule::Nothing => OutputForm::Nothing,
            OutputRule::Stdout => OutputForm::Stdout,
            OutputRule::Artifacts { .. } => OutputForm::Artifacts,
        }
    }

    /// File path the artifact goes to, or `None` for non-file destinations.
    pub fn destination(&self, artifact: &Artifact) -> Option<PathBuf> {
        match self {
            OutputRule::Directory(dir) => Some(dir.join(&artifact.name)),
            OutputRule::Nothing | OutputRule::Stdout => None,
            OutputRule::Artifacts { config, code } => Some(match artifact.kind {
                ArtifactKind::Config => config.join(&artifact.name),
                ArtifactKind::Code => match (code, &artifact.package) {
                    (Some(dir), _) => dir.join(&artifact.name),
                    (None, Some(package)) => package.join(&artifact.name),
                    (None, None) => artifact.name.clone(),
                },
            }),
        }
    }

    /// Open the destination for one artifact, creating parent directories.
    pub fn open(&self, artifact: &Artifact) -> Result<Box<dyn Write>, OutputError> {
        match self {
            OutputRule::Nothing => Ok(Box::new(io::sink())),
            OutputRule::Stdout => Ok(Box::new(io::stdout())),
            _ => {
                let path = self
                    .destination(artifact)
                    .unwrap_or_else(|| artifact.name.clone());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|e| OutputError::Open {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;
                }
                let file = fs::File::create(&path).map_err(|e| OutputError::Open {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(Box::new(io::BufWriter::new(file)))
            }
        }
    }

    /// Open the destination and write the artifact to it.
    pub fn write(&self, artifact: &Artifact) -> Result<WriteOutcome, OutputError> {
        let mut out = self.open(artifact)?;
        let target = self
            .destination(artifact)
            .unwrap_or_else(|| artifact.name.clone());
        out.write_all(&artifact.contents)
            .and_then(|_| out.flush())
            .map_err(|e| OutputError::Write {
                path: target.clone(),
                source: e,
            })?;

        let bytes = artifact.contents.len();
        Ok(match self {
            OutputRule::Nothing => WriteOutcome::Discarded,
            OutputRule::Stdout => WriteOutcome::Streamed { bytes },
            _ => WriteOutcome::Written {
                path: target,
                bytes,
            },
        })
    }
}
