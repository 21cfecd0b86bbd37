//! Marker documentation at four levels of detail.
//!
//! The presenter works on a snapshot of a [`Registry`] (or of the options
//! registry, grouped by role) taken once at construction. Rendering is a
//! pure function of that snapshot and the [`HelpLevel`].

use std::collections::BTreeMap;
use std::fmt::Write as _;

use colored::Colorize;
use serde::Serialize;

use crate::markers::{FieldSpec, MarkerHelp, MarkerSchema, MarkerScope, Registry};
use crate::options::{OptionRole, OptionsRegistry};

/// Widest marker column in the summary table.
const MAX_NAME_WIDTH: usize = 40;

/// How much documentation to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HelpLevel {
    /// One line per marker, grouped by category.
    Summary,
    /// Full documentation of every common marker.
    Detailed,
    /// Detailed, plus advanced markers and arguments.
    Full,
    /// Machine readable dump of everything.
    Json,
}

impl HelpLevel {
    /// Level for a repeated flag (`-w`, `-ww`, ...). Zero means no help.
    pub fn from_count(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(HelpLevel::Summary),
            2 => Some(HelpLevel::Detailed),
            3 => Some(HelpLevel::Full),
            _ => Some(HelpLevel::Json),
        }
    }
}

/// Documentation of one marker.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerDoc {
    pub name: String,
    pub scope: MarkerScope,
    /// Usage with every argument, advanced ones included.
    pub usage: String,
    pub schema: MarkerSchema,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<MarkerHelp>,
}

impl MarkerDoc {
    fn is_advanced(&self) -> bool {
        self.help.as_ref().is_some_and(|h| h.advanced)
    }

    fn summary(&self) -> &str {
        self.help.as_ref().map(|h| h.summary.as_str()).unwrap_or("")
    }

    fn label(&self, full: bool) -> String {
        format!("+{}{}", self.name, self.schema.usage(full))
    }
}

/// Markers sharing a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryDocs {
    pub category: String,
    pub markers: Vec<MarkerDoc>,
}

/// Renders marker documentation.
#[derive(Debug, Clone)]
pub struct HelpPresenter {
    categories: Vec<CategoryDocs>,
}

impl HelpPresenter {
    /// Group markers by their help category, both sorted by name.
    pub fn by_category(registry: &Registry) -> Self {
        let mut grouped: BTreeMap<String, Vec<MarkerDoc>> = BTreeMap::new();
        for (definition, help) in registry.iter_with_help() {
            let category = help.map(|h| h.category.clone()).unwrap_or_default();
            grouped.entry(category).or_default().push(MarkerDoc {
                name: definition.name().to_string(),
                scope: definition.scope(),
                usage: definition.schema().usage(true),
                schema: definition.schema().clone(),
                help: help.cloned(),
            });
        }

        let categories = grouped
            .into_iter()
            .map(|(category, mut markers)| {
                markers.sort_by(|a, b| a.name.cmp(&b.name));
                CategoryDocs { category, markers }
            })
            .collect();
        Self { categories }
    }

    /// Group command line options by what they do, in registration order.
    ///
    /// Per-generator output overrides only show up at the full level.
    pub fn by_role(options: &OptionsRegistry) -> Self {
        let titles = ["generators", "output rules", "common options"];
        let mut groups: Vec<Vec<MarkerDoc>> = vec![Vec::new(); titles.len()];

        for (definition, help) in options.registry().iter_with_help() {
            let Some(role) = options.role(definition.name()) else {
                continue;
            };
            let mut help = help.cloned();
            let group = match role {
                OptionRole::Generator(_) => 0,
                OptionRole::Output { generator, .. } => {
                    if let (Some(generator), Some(h)) = (generator, help.as_mut()) {
                        h.summary = format!("{} ({} only)", h.summary, generator);
                        h.advanced = true;
                    }
                    1
                }
                OptionRole::Paths | OptionRole::Filter => 2,
            };
            groups[group].push(MarkerDoc {
                name: definition.name().to_string(),
                scope: definition.scope(),
                usage: definition.schema().usage(true),
                schema: definition.schema().clone(),
                help,
            });
        }

        let categories = titles
            .iter()
            .zip(groups)
            .filter(|(_, markers)| !markers.is_empty())
            .map(|(title, markers)| CategoryDocs {
                category: title.to_string(),
                markers,
            })
            .collect();
        Self { categories }
    }

    pub fn categories(&self) -> &[CategoryDocs] {
        &self.categories
    }

    /// Render at the given level.
    pub fn render(&self, level: HelpLevel) -> Result<String, serde_json::Error> {
        match level {
            HelpLevel::Json => serde_json::to_string_pretty(&self.categories).map(|mut s| {
                s.push('\n');
                s
            }),
            HelpLevel::Summary => Ok(self.render_summary()),
            HelpLevel::Detailed => Ok(self.render_detailed(false)),
            HelpLevel::Full => Ok(self.render_detailed(true)),
        }
    }

    fn render_summary(&self) -> String {
        let mut out = String::new();
        for category in &self.categories {
            let markers: Vec<&MarkerDoc> = category
                .markers
                .iter()
                .filter(|m| !m.is_advanced())
                .collect();
            if markers.is_empty() {
                continue;
            }
            heading(&mut out, &category.category);

            let labels: Vec<String> = markers.iter().map(|m| m.label(false)).collect();
            let width = labels
                .iter()
                .map(String::len)
                .max()
                .unwrap_or(0)
                .min(MAX_NAME_WIDTH);
            for (marker, label) in markers.iter().zip(labels) {
                let pad = " ".repeat(width.saturating_sub(label.len()));
                let _ = writeln!(out, "  {}{}  {}", label.green(), pad, marker.summary());
            }
            out.push('\n');
        }
        out
    }

    fn render_detailed(&self, full: bool) -> String {
        let mut out = String::new();
        for category in &self.categories {
            let markers: Vec<&MarkerDoc> = category
                .markers
                .iter()
                .filter(|m| full || !m.is_advanced())
                .collect();
            if markers.is_empty() {
                continue;
            }
            heading(&mut out, &category.category);

            for marker in markers {
                let _ = writeln!(
                    out,
                    "+{}{}  ({})",
                    marker.name.green().bold(), marker.schema.usage(full), marker.scope.as_str()
                );
                if let Some(help) = &marker.help {
                    if !help.summary.is_empty() {
                        let _ = writeln!(out, "    {}", help.summary);
                    }
                    if !help.details.is_empty() {
                        let _ = writeln!(out, "    {}", help.details);
                    }
                }
                if let MarkerSchema::Fields { fields } = &marker.schema {
                    for field in fields.iter().filter(|f| full || !f.advanced) {
                        render_field(&mut out, field);
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}

fn heading(out: &mut String, category: &str) {
    if category.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}\n", category.bold());
}

fn render_field(out: &mut String, field: &FieldSpec) {
    let optional = if field.optional { " (optional)" } else { "" };
    let _ = write!(
        out,
        "      {} <{}>{}",
        field.name.cyan(), field.kind.type_name(), optional
    );
    if let Some(help) = &field.help {
        let _ = write!(out, "  {}", help);
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markers::{ArgKind, MarkerDefinition};

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register_with_help(
            MarkerDefinition::new(
                "crds",
                MarkerScope::Package,
                MarkerSchema::fields(vec![
                    FieldSpec::optional("group", ArgKind::String).with_help("API group"),
                    FieldSpec::optional("secret", ArgKind::Bool).advanced(),
                ]),
            )
            .unwrap(),
            Some(MarkerHelp::new("generators", "generates CRDs").with_details("One per root.")),
        )
        .unwrap();
        reg.register_with_help(
            MarkerDefinition::new("output:stdout", MarkerScope::Package, MarkerSchema::empty())
                .unwrap(),
            Some(MarkerHelp::new("output", "prints everything").advanced()),
        )
        .unwrap();
        reg.register(
            MarkerDefinition::new("bare", MarkerScope::Package, MarkerSchema::flag()).unwrap(),
        )
        .unwrap();
        reg
    }

    #[test]
    fn test_level_from_count() {
        assert_eq!(HelpLevel::from_count(0), None);
        assert_eq!(HelpLevel::from_count(1), Some(HelpLevel::Summary));
        assert_eq!(HelpLevel::from_count(3), Some(HelpLevel::Full));
        assert_eq!(HelpLevel::from_count(9), Some(HelpLevel::Json));
    }

    #[test]
    fn test_summary_hides_advanced() {
        colored::control::set_override(false);
        let out = HelpPresenter::by_category(&registry())
            .render(HelpLevel::Summary)
            .unwrap();
        assert!(out.contains("generators\n"));
        assert!(out.contains("+crds:[group=<string>]  "));
        assert!(!out.contains("secret"));
        assert!(out.contains("generates CRDs"));
        assert!(!out.contains("One per root."));
        assert!(!out.contains("output:stdout"));
        assert!(out.contains("+bare[=<bool>]"));
    }

    #[test]
    fn test_detailed_and_full() {
        colored::control::set_override(false);
        let presenter = HelpPresenter::by_category(&registry());

        let detailed = presenter.render(HelpLevel::Detailed).unwrap();
        assert!(detailed.contains("+crds:[group=<string>]  (package)"));
        assert!(detailed.contains("One per root."));
        assert!(detailed.contains("group <string> (optional)  API group"));
        assert!(!detailed.contains("secret"));
        assert!(!detailed.contains("output:stdout"));

        let full = presenter.render(HelpLevel::Full).unwrap();
        assert!(full.contains("+crds:[group=<string>],[secret=<bool>]  (package)"));
        assert!(full.contains("secret <bool> (optional)"));
        assert!(full.contains("+output:stdout  (package)"));
    }

    #[test]
    fn test_json_dump() {
        let json = HelpPresenter::by_category(&registry())
            .render(HelpLevel::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let categories: Vec<_> = value
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["category"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(categories, vec!["", "generators", "output"]);
        assert_eq!(value[1]["markers"][0]["name"], "crds");
        assert_eq!(value[1]["markers"][0]["schema"]["shape"], "fields");
        assert_eq!(
            value[1]["markers"][0]["usage"],
            ":[group=<string>],[secret=<bool>]"
        );
        assert_eq!(value[2]["markers"][0]["help"]["advanced"], true);
    }

    #[test]
    fn test_by_role_groups_options() {
        colored::control::set_override(false);
        let options = OptionsRegistry::builtin().unwrap();
        let presenter = HelpPresenter::by_role(&options);
        let titles: Vec<_> = presenter
            .categories()
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(titles, vec!["generators", "output rules", "common options"]);
        assert_eq!(presenter.categories()[0].markers[0].name, "overrides");

        let summary = presenter.render(HelpLevel::Summary).unwrap();
        assert!(summary.contains("+output:dir=<string>"));
        assert!(!summary.contains("+output:crds:dir"));

        let full = presenter.render(HelpLevel::Full).unwrap();
        assert!(full.contains("(crds only)"));
    }

    #[test]
    fn test_rendering_is_idempotent() {
        colored::control::set_override(false);
        let presenter = HelpPresenter::by_category(&registry());
        for level in [
            HelpLevel::Summary,
            HelpLevel::Detailed,
            HelpLevel::Full,
            HelpLevel::Json,
        ] {
            assert_eq!(
                presenter.render(level).unwrap(),
                presenter.render(level).unwrap()
            );
        }
    }
}
