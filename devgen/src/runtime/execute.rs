//! Running an [`ExecutableConfiguration`].

use tracing::{debug, info, warn};

use crate::error::{GeneratorFailure, SourceError};
use crate::generator::GenerationContext;
use crate::markers::Registry;
use crate::options::OptionsRegistry;
use crate::output::WriteOutcome;
use crate::runtime::builder::ExecutableConfiguration;
use crate::source::SourceTree;

/// Result of one generator.
#[derive(Debug)]
pub struct GeneratorReport {
    pub name: String,
    pub outcome: Result<Vec<WriteOutcome>, GeneratorFailure>,
}

impl GeneratorReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Everything that happened during a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Files that could not be loaded. Generators still ran on the rest.
    pub source_errors: Vec<SourceError>,
    /// One entry per generator, in execution order.
    pub generators: Vec<GeneratorReport>,
}

impl RunReport {
    /// True if any source file failed to load or any generator failed.
    pub fn had_errors(&self) -> bool {
        !self.source_errors.is_empty() || self.generators.iter().any(|g| !g.is_success())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &GeneratorFailure)> {
        self.generators
            .iter()
            .filter_map(|g| g.outcome.as_ref().err().map(|e| (g.name.as_str(), e)))
    }

    pub fn get(&self, name: &str) -> Option<&GeneratorReport> {
        self.generators.iter().find(|g| g.name == name)
    }
}

/// Runs every task of a configuration, in order, one at a time.
#[derive(Debug)]
pub struct ExecutionRuntime {
    config: ExecutableConfiguration,
    source_markers: Registry,
}

impl ExecutionRuntime {
    /// Prepare a run; the source markers of the selected generators are
    /// taken from `options`.
    pub fn new(config: ExecutableConfiguration, options: &OptionsRegistry) -> Self {
        let source_markers = options.source_markers(config.tasks.iter().map(|t| t.name.as_str()));
        Self {
            config,
            source_markers,
        }
    }

    pub fn config(&self) -> &ExecutableConfiguration {
        &self.config
    }

    /// Load the sources once and run every generator against them.
    ///
    /// A failing generator does not stop the others. Its artifacts are
    /// written one by one until the first output error.
    pub fn run(self) -> RunReport {
        let (sources, source_errors) = SourceTree::load(
            &self.config.roots,
            self.config.filter.as_deref(),
            &self.source_markers,
        );
        for error in &source_errors {
            warn!(error = %error, "failed to load source");
        }
        debug!(
            files = sources.files().len(),
            types = sources.types().count(),
            "loaded sources"
        );

        let ctx = GenerationContext {
            roots: &self.config.roots,
            sources: &sources,
        };

        let mut generators = Vec::with_capacity(self.config.tasks.len());
        for task in &self.config.tasks {
            info!(generator = %task.name, "running generator");
            let outcome = task
                .generator
                .generate(&ctx, &task.options)
                .map_err(GeneratorFailure::from)
                .and_then(|artifacts| {
                    let mut written = Vec::with_capacity(artifacts.len());
                    for artifact in &artifacts {
                        let outcome = task.output.write(artifact)?;
                        debug!(
                            generator = %task.name,
                            artifact = %artifact.name.display(),
                            bytes = outcome.bytes(),
                            "wrote artifact"
                        );
                        written.push(outcome);
                    }
                    Ok(written)
                });

            match &outcome {
                Ok(written) => {
                    info!(generator = %task.name, artifacts = written.len(), "generator finished")
                }
                Err(e) => warn!(generator = %task.name, error = %e, "generator failed"),
            }
            generators.push(GeneratorReport {
                name: task.name.clone(),
                outcome,
            });
        }

        RunReport {
            source_errors,
            generators,
        }
    }
}
