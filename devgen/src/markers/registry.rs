//! Insertion-ordered marker registry.
//!
//! The registry maps marker names to definitions and carries the optional
//! help for each. Names are unique across all scopes: registering a name
//! twice is an error, never an override.

use std::collections::HashMap;

use crate::error::RegistryError;
use crate::markers::definition::{MarkerDefinition, MarkerScope};
use crate::markers::help::MarkerHelp;

/// Ordered collection of marker definitions.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Definitions in registration order.
    definitions: Vec<MarkerDefinition>,

    /// Marker name -> position in `definitions`.
    index: HashMap<String, usize>,

    /// Marker name -> help.
    help: HashMap<String, MarkerHelp>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition.
    ///
    /// Fails with [`RegistryError::DuplicateMarker`] if the name is taken,
    /// leaving the registry unchanged.
    pub fn register(&mut self, definition: MarkerDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateMarker {
                name: definition.name().to_string(),
            });
        }
        self.index
            .insert(definition.name().to_string(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    /// Register a definition together with its help, if any.
    pub fn register_with_help(
        &mut self,
        definition: MarkerDefinition,
        help: Option<MarkerHelp>,
    ) -> Result<(), RegistryError> {
        let name = definition.name().to_string();
        self.register(definition)?;
        if let Some(help) = help {
            self.add_help(&name, help);
        }
        Ok(())
    }

    /// Attach help to a registered marker. Returns false if the name is
    /// unknown.
    pub fn add_help(&mut self, name: &str, help: MarkerHelp) -> bool {
        if !self.index.contains_key(name) {
            return false;
        }
        self.help.insert(name.to_string(), help);
        true
    }

    /// Get a definition by exact name.
    pub fn get(&self, name: &str) -> Option<&MarkerDefinition> {
        self.index.get(name).map(|&i| &self.definitions[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn help_for(&self, name: &str) -> Option<&MarkerHelp> {
        self.help.get(name)
    }

    /// Find the definition a raw token refers to.
    ///
    /// A leading `+` is ignored. Among definitions of the given scope whose
    /// name is a prefix of the token ending at a `:` or `=` boundary, the
    /// longest wins.
    pub fn lookup(&self, token: &str, scope: MarkerScope) -> Option<&MarkerDefinition> {
        let token = token.strip_prefix('+').unwrap_or(token);
        self.definitions
            .iter()
            .filter(|d| d.scope() == scope && d.matches(token))
            .max_by_key(|d| d.name().len())
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &MarkerDefinition> {
        self.definitions.iter()
    }

    /// Definitions paired with their help, in registration order.
    pub fn iter_with_help(&self) -> impl Iterator<Item = (&MarkerDefinition, Option<&MarkerHelp>)> {
        self.definitions
            .iter()
            .map(move |d| (d, self.help.get(d.name())))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Copy the given marker (with its help) from another registry.
    pub fn copy_from(&mut self, other: &Registry, name: &str) -> Result<(), RegistryError> {
        match other.get(name) {
            Some(definition) => {
                self.register_with_help(definition.clone(), other.help_for(name).cloned())
            }
            None => Ok(()),
        }
    }

    /// Copy every marker of `other` whose name is not registered here yet.
    pub fn extend_from(&mut self, other: &Registry) {
        for (definition, help) in other.iter_with_help() {
            if self.contains(definition.name()) {
                continue;
            }
            let name = definition.name().to_string();
            self.index.insert(name.clone(), self.definitions.len());
            self.definitions.push(definition.clone());
            if let Some(help) = help {
                self.help.insert(name, help.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::definition::{ArgKind, MarkerSchema};

    fn def(name: &str) -> MarkerDefinition {
        MarkerDefinition::new(name, MarkerScope::Package, MarkerSchema::empty()).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut reg = Registry::new();
        reg.register(def("crds")).unwrap();
        assert!(reg.contains("crds"));
        assert_eq!(reg.get("crds").unwrap().name(), "crds");
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_duplicate_is_rejected_and_registry_unchanged() {
        let mut reg = Registry::new();
        reg.register(def("crds")).unwrap();
        let err = reg.register(def("crds")).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateMarker {
                name: "crds".to_string()
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_duplicate_across_scopes_is_rejected() {
        let mut reg = Registry::new();
        reg.register(def("optional")).unwrap();
        let field = MarkerDefinition::new("optional", MarkerScope::Field, MarkerSchema::flag());
        assert!(reg.register(field.unwrap()).is_err());
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut reg = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            reg.register(def(name)).unwrap();
        }
        let names: Vec<_> = reg.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_lookup_prefers_longest_name() {
        let mut reg = Registry::new();
        reg.register(def("output:artifacts")).unwrap();
        reg.register(def("output:crds:artifacts")).unwrap();
        reg.register(def("crds")).unwrap();

        let found = reg
            .lookup("output:crds:artifacts:config=out", MarkerScope::Package)
            .unwrap();
        assert_eq!(found.name(), "output:crds:artifacts");

        let found = reg.lookup("+crds", MarkerScope::Package).unwrap();
        assert_eq!(found.name(), "crds");

        assert!(reg.lookup("output:crds", MarkerScope::Package).is_none());
        assert!(reg.lookup("crds", MarkerScope::Type).is_none());
    }

    #[test]
    fn test_help_is_best_effort() {
        let mut reg = Registry::new();
        reg.register_with_help(def("none"), None).unwrap();
        assert!(reg.help_for("none").is_none());

        assert!(reg.add_help("none", MarkerHelp::new("output rules", "discard output")));
        assert_eq!(reg.help_for("none").unwrap().summary, "discard output");
        assert!(!reg.add_help("missing", MarkerHelp::default()));
    }

    #[test]
    fn test_copy_from() {
        let mut source = Registry::new();
        let paths = MarkerDefinition::new(
            "paths",
            MarkerScope::Package,
            MarkerSchema::value(ArgKind::StringList),
        )
        .unwrap();
        source
            .register_with_help(paths, Some(MarkerHelp::new("", "roots")))
            .unwrap();

        let mut target = Registry::new();
        target.copy_from(&source, "paths").unwrap();
        target.copy_from(&source, "absent").unwrap();
        assert_eq!(target.len(), 1);
        assert_eq!(target.help_for("paths").unwrap().summary, "roots");
    }

    #[test]
    fn test_extend_from_skips_existing() {
        let mut source = Registry::new();
        source.register(def("crds")).unwrap();
        source
            .register_with_help(def("schemas"), Some(MarkerHelp::new("generators", "json")))
            .unwrap();

        let mut target = Registry::new();
        target.register(def("crds")).unwrap();
        target.extend_from(&source);
        target.extend_from(&source);

        let names: Vec<_> = target.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["crds", "schemas"]);
        assert_eq!(target.help_for("schemas").unwrap().summary, "json");
    }
}
