//! Name sanitization and registry filter construction.
//!
//! A [`SearchQuery`] is immutable once built. Building is the only place a filter
//! expression is assembled, so an empty name is rejected before any network call.

pub mod error;


pub use error::QueryError;

use std::fmt;

use crate::registry::RegistrySchema;

/// Which mark features a search stream should match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkFeatureFilter {
    /// Word marks only.
    Word,
    /// Everything except word marks (figurative, combined, shape, ...).
    NonWord,
    /// No feature restriction.
    Any,
}

impl fmt::Display for MarkFeatureFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Word => write!(f, "word"),
            Self::NonWord => write!(f, "non_word"),
            Self::Any => write!(f, "any"),
        }
    }
}

/// Strips everything except ASCII letters, digits and whitespace, then collapses
/// whitespace runs to a single space and trims.
///
/// Idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A validated, ready-to-send registry search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    raw_name: String,
    sanitized_name: String,
    nice_class: Option<u32>,
    mark_feature: MarkFeatureFilter,
    filter: String,
}

impl SearchQuery {
    /// Sanitizes `raw_name` and assembles the RSQL-style filter for `schema`.
    ///
    /// # Errors
    ///
    /// [`QueryError::EmptyQuery`] if nothing alphanumeric survives sanitization.
    pub fn build(
        raw_name: &str,
        nice_class: Option<u32>,
        mark_feature: MarkFeatureFilter,
        schema: &RegistrySchema,
    ) -> Result<Self, QueryError> {
        let sanitized_name = sanitize(raw_name);
        if sanitized_name.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        Ok(Self::assemble(
            raw_name.to_string(),
            sanitized_name,
            nice_class,
            mark_feature,
            schema,
        ))
    }

    fn assemble(
        raw_name: String,
        sanitized_name: String,
        nice_class: Option<u32>,
        mark_feature: MarkFeatureFilter,
        schema: &RegistrySchema,
    ) -> Self {
        let mut filter = format!("{}==*{}*", schema.name_path, sanitized_name);

        if let Some(class) = nice_class {
            filter.push_str(&format!(" and {}=={}", schema.nice_classes_field, class));
        }

        match mark_feature {
            MarkFeatureFilter::Word => filter.push_str(&format!(
                " and {}=={}",
                schema.mark_feature_field, schema.word_feature_value
            )),
            MarkFeatureFilter::NonWord => {
                filter.push_str(&format!(
                    " and {}!={}",
                    schema.mark_feature_field, schema.word_feature_value
                ));
                if let Some((field, value)) = schema.figurative_basis {
                    filter.push_str(&format!(" and {field}=={value}"));
                }
            }
            MarkFeatureFilter::Any => {}
        }

        Self {
            raw_name,
            sanitized_name,
            nice_class,
            mark_feature,
            filter,
        }
    }

    /// Returns a copy of this query restricted to another mark feature.
    pub fn with_mark_feature(&self, mark_feature: MarkFeatureFilter, schema: &RegistrySchema) -> Self {
        Self::assemble(
            self.raw_name.clone(),
            self.sanitized_name.clone(),
            self.nice_class,
            mark_feature,
            schema,
        )
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn sanitized_name(&self) -> &str {
        &self.sanitized_name
    }

    pub fn nice_class(&self) -> Option<u32> {
        self.nice_class
    }

    pub fn mark_feature(&self) -> MarkFeatureFilter {
        self.mark_feature
    }

    /// The filter expression sent as the registry's `query` parameter.
    pub fn filter(&self) -> &str {
        &self.filter
    }
}
