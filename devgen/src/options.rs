//! The flat namespace of command line options.
//!
//! [`OptionsRegistry`] merges, in this order:
//!
//! 1. one marker per generator, named after the generator, whose schema is
//!    the generator's options schema;
//! 2. for every generator and output form, `output:<generator>:<form>`;
//! 3. for every output form, `output:<form>`;
//! 4. the common runtime markers `paths` and `filter`.
//!
//! Any name collision aborts construction with a [`RegistryError`]. The
//! registry also keeps the source markers each generator reads, so that a
//! `-w` query can show them next to the generator's options.

use std::collections::BTreeMap;

use crate::error::{OptionsError, RegistryError};
use crate::generator::{register_common_markers, GeneratorRegistry};
use crate::markers::{
    ArgKind, MarkerDefinition, MarkerHelp, MarkerSchema, MarkerScope, MarkerValue, Registry,
};
use crate::output::{OutputForm, OutputRuleRegistry};

/// Source roots to load (`paths=./api;./other`).
pub const PATHS_MARKER: &str = "paths";
/// Glob restricting the files loaded from each root.
pub const FILTER_MARKER: &str = "filter";

/// What a registered option does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionRole {
    /// Activates the named generator.
    Generator(String),
    /// Selects an output form, for one generator or as the default.
    Output {
        generator: Option<String>,
        form: OutputForm,
    },
    Paths,
    Filter,
}

/// One parsed command line token.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOption {
    /// Name of the marker the token resolved to.
    pub name: String,
    pub role: OptionRole,
    pub value: MarkerValue,
}

/// Every command line option, built once at startup.
#[derive(Debug, Clone)]
pub struct OptionsRegistry {
    registry: Registry,
    roles: BTreeMap<String, OptionRole>,
    generators: GeneratorRegistry,
    outputs: OutputRuleRegistry,
    common_source_markers: Registry,
    source_markers: BTreeMap<String, Registry>,
}

impl OptionsRegistry {
    pub fn new(
        generators: GeneratorRegistry,
        outputs: OutputRuleRegistry,
    ) -> Result<Self, RegistryError> {
        let mut registry = Registry::new();
        let mut roles = BTreeMap::new();

        for (name, generator) in generators.iter() {
            registry.register_with_help(
                MarkerDefinition::new(name, MarkerScope::Package, generator.options_schema())?,
                generator.help(),
            )?;
            roles.insert(name.to_string(), OptionRole::Generator(name.to_string()));

            for form in outputs.iter() {
                let marker = format!("output:{}:{}", name, form.name());
                registry.register_with_help(
                    MarkerDefinition::new(marker.as_str(), MarkerScope::Package, form.schema())?,
                    Some(form.help()),
                )?;
                roles.insert(
                    marker,
                    OptionRole::Output {
                        generator: Some(name.to_string()),
                        form,
                    },
                );
            }
        }

        for form in outputs.iter() {
            let marker = format!("output:{}", form.name());
            registry.register_with_help(
                MarkerDefinition::new(marker.as_str(), MarkerScope::Package, form.schema())?,
                Some(form.help()),
            )?;
            roles.insert(
                marker,
                OptionRole::Output {
                    generator: None,
                    form,
                },
            );
        }

        registry.register_with_help(
            MarkerDefinition::new(
                PATHS_MARKER,
                MarkerScope::Package,
                MarkerSchema::value(ArgKind::StringList),
            )?,
            Some(MarkerHelp::new(
                "common",
                "source roots to load (default: the current directory)",
            )),
        )?;
        roles.insert(PATHS_MARKER.to_string(), OptionRole::Paths);
        let filter_help = MarkerHelp::new(
            "common",
            "only load files matching this glob, relative to each root",
        );
        registry.register_with_help(
            MarkerDefinition::new(
                FILTER_MARKER,
                MarkerScope::Package,
                MarkerSchema::value(ArgKind::String),
            )?,
            Some(filter_help.advanced()),
        )?;
        roles.insert(FILTER_MARKER.to_string(), OptionRole::Filter);

        // Source markers share one namespace across all generators.
        let mut common_source_markers = Registry::new();
        register_common_markers(&mut common_source_markers)?;
        let mut all_source_markers = common_source_markers.clone();
        let mut source_markers = BTreeMap::new();
        for (name, generator) in generators.iter() {
            generator.register_markers(&mut all_source_markers)?;
            let mut own = Registry::new();
            generator.register_markers(&mut own)?;
            source_markers.insert(name.to_string(), own);
        }

        Ok(Self {
            registry,
            roles,
            generators,
            outputs,
            common_source_markers,
            source_markers,
        })
    }

    /// Registry over every built-in generator and output form.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(GeneratorRegistry::builtin(), OutputRuleRegistry::builtin())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn generators(&self) -> &GeneratorRegistry {
        &self.generators
    }

    pub fn outputs(&self) -> &OutputRuleRegistry {
        &self.outputs
    }

    pub fn role(&self, name: &str) -> Option<&OptionRole> {
        self.roles.get(name)
    }

    /// Resolve and parse one raw token.
    pub fn parse(&self, token: &str) -> Result<ResolvedOption, OptionsError> {
        let token = token.trim();
        let token = token.strip_prefix('+').unwrap_or(token);

        let definition = self
            .registry
            .lookup(token, MarkerScope::Package)
            .ok_or_else(|| OptionsError::unknown(token))?;
        let role = self
            .roles
            .get(definition.name())
            .ok_or_else(|| OptionsError::unknown(token))?;
        let value = definition
            .parse(token)
            .map_err(|message| OptionsError::invalid(token, message))?;

        Ok(ResolvedOption {
            name: definition.name().to_string(),
            role: role.clone(),
            value,
        })
    }

    /// Source markers read by the named generators, plus the common ones.
    pub fn source_markers<'a>(&self, generators: impl IntoIterator<Item = &'a str>) -> Registry {
        let mut registry = self.common_source_markers.clone();
        for name in generators {
            if let Some(own) = self.source_markers.get(name) {
                registry.extend_from(own);
            }
        }
        registry
    }

    /// Registry for a `-w` query over the given tokens.
    ///
    /// Holds the option markers the tokens name and the source markers of
    /// every generator among them. With no tokens, holds everything.
    pub fn filtered<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Registry, OptionsError> {
        if tokens.is_empty() {
            let mut registry = self.registry.clone();
            registry.extend_from(&self.source_markers(self.generators.names()));
            return Ok(registry);
        }

        let mut options = Registry::new();
        let mut generators = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim();
            let token = token.strip_prefix('+').unwrap_or(token);
            let definition = self
                .registry
                .lookup(token, MarkerScope::Package)
                .ok_or_else(|| OptionsError::unknown(token))?;
            if options.contains(definition.name()) {
                continue;
            }
            options
                .copy_from(&self.registry, definition.name())
                .map_err(|e| OptionsError::invalid(token, e.to_string()))?;
            if let Some(OptionRole::Generator(name)) = self.roles.get(definition.name()) {
                generators.push(name.as_str());
            }
        }

        if !generators.is_empty() {
            options.extend_from(&self.source_markers(generators));
        }
        Ok(options)
    }
}
