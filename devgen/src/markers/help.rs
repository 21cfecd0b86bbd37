//! Structured help attached to marker definitions.

use serde::Serialize;

/// Documentation for one marker.
///
/// Help is optional: a definition without help is still valid and lands
/// in the unnamed category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerHelp {
    /// Grouping used by the help presenter (e.g. "generators").
    pub category: String,
    /// One-line description.
    pub summary: String,
    /// Longer description shown at the detailed level.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub details: String,
    /// Less common markers, only shown at the full level.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub advanced: bool,
}

impl MarkerHelp {
    pub fn new(category: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            summary: summary.into(),
            details: String::new(),
            advanced: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    /// Same help under a different category.
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
