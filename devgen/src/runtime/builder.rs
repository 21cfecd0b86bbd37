//! Raw option tokens to an [`ExecutableConfiguration`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::error::OptionsError;
use crate::generator::Generator;
use crate::markers::MarkerValue;
use crate::options::{OptionRole, OptionsRegistry, ResolvedOption};
use crate::output::OutputRule;

/// Label used in errors about the `output:<form>` defaults.
const DEFAULT_OUTPUT: &str = "default output";

/// One generator to run, with everything it needs.
#[derive(Clone)]
pub struct GeneratorTask {
    pub name: String,
    pub generator: Arc<dyn Generator>,
    pub options: MarkerValue,
    pub output: OutputRule,
}

impl fmt::Debug for GeneratorTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorTask")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("output", &self.output)
            .finish()
    }
}

/// The resolved plan for one invocation.
#[derive(Debug, Clone)]
pub struct ExecutableConfiguration {
    /// Generators in the order they were first activated.
    pub tasks: Vec<GeneratorTask>,
    /// Source roots, `.` unless `paths` was given.
    pub roots: Vec<PathBuf>,
    pub filter: Option<String>,
}

impl ExecutableConfiguration {
    pub fn task(&self, name: &str) -> Option<&GeneratorTask> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// An activated output marker: the marker name (for error messages) and
/// the configured rule.
type ActiveOutput = (String, OutputRule);

/// Applies tokens in order against an [`OptionsRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct RuntimeBuilder<'a> {
    options: &'a OptionsRegistry,
}

impl<'a> RuntimeBuilder<'a> {
    pub fn new(options: &'a OptionsRegistry) -> Self {
        Self { options }
    }

    /// Parse the tokens and resolve every generator's output rule.
    ///
    /// A later token for the same marker replaces an earlier one. Fails on
    /// the first token that does not parse, when no generator is activated,
    /// when an output override names a generator that is not activated, and
    /// when two different forms compete for the same generator.
    pub fn build<S: AsRef<str>>(
        &self,
        tokens: &[S],
    ) -> Result<ExecutableConfiguration, OptionsError> {
        let mut generators: Vec<(String, MarkerValue)> = Vec::new();
        let mut overrides: Vec<(String, ActiveOutput)> = Vec::new();
        let mut default_output: Option<ActiveOutput> = None;
        let mut roots: Option<Vec<PathBuf>> = None;
        let mut filter: Option<String> = None;

        for token in tokens {
            let token = token.as_ref();
            let ResolvedOption { name, role, value } = self.options.parse(token)?;
            debug!(token, marker = %name, "resolved option");

            match role {
                OptionRole::Generator(generator) => {
                    match generators.iter_mut().find(|(n, _)| *n == generator) {
                        Some(entry) => entry.1 = value,
                        None => generators.push((generator, value)),
                    }
                }
                OptionRole::Output { generator, form } => {
                    let rule = form
                        .configure(&value)
                        .map_err(|message| OptionsError::invalid(token, message))?;
                    match generator {
                        Some(generator) => {
                            let existing = overrides.iter_mut().find(|(g, _)| *g == generator);
                            match existing {
                                Some((_, active)) => {
                                    replace_output(&generator, active, name, rule)?
                                }
                                None => overrides.push((generator, (name, rule))),
                            }
                        }
                        None => match default_output.as_mut() {
                            Some(active) => replace_output(DEFAULT_OUTPUT, active, name, rule)?,
                            None => default_output = Some((name, rule)),
                        },
                    }
                }
                OptionRole::Paths => {
                    let list = value.as_list().unwrap_or_default();
                    roots = Some(list.into_iter().map(PathBuf::from).collect());
                }
                OptionRole::Filter => {
                    filter = value.as_str().map(str::to_string);
                }
            }
        }

        if generators.is_empty() {
            return Err(OptionsError::NoGenerators);
        }
        if let Some((generator, _)) = overrides
            .iter()
            .find(|(g, _)| !generators.iter().any(|(n, _)| n == g))
        {
            return Err(OptionsError::NonInvokedGenerator {
                generator: generator.clone(),
            });
        }

        let mut tasks = Vec::with_capacity(generators.len());
        for (name, options) in generators {
            let generator = self
                .options
                .generators()
                .get(&name)
                .cloned()
                .ok_or_else(|| OptionsError::unknown(&name))?;
            let output = overrides
                .iter()
                .find(|(g, _)| *g == name)
                .map(|(_, (_, rule))| rule.clone())
                .or_else(|| default_output.as_ref().map(|(_, rule)| rule.clone()))
                .unwrap_or_default();
            debug!(generator = %name, output = ?output, "resolved output rule");
            tasks.push(GeneratorTask {
                name,
                generator,
                options,
                output,
            });
        }

        let roots = match roots {
            Some(roots) if !roots.is_empty() => roots,
            _ => vec![PathBuf::from(".")],
        };

        Ok(ExecutableConfiguration {
            tasks,
            roots,
            filter,
        })
    }
}

/// Last write wins for the same output marker; a different form is a
/// conflict.
fn replace_output(
    generator: &str,
    active: &mut ActiveOutput,
    name: String,
    rule: OutputRule,
) -> Result<(), OptionsError> {
    if active.1.form() != rule.form() {
        return Err(OptionsError::AmbiguousOutput {
            generator: generator.to_string(),
            first: active.0.clone(),
            second: name,
        });
    }
    *active = (name, rule);
    Ok(())
}
