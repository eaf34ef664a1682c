//! Types for category resolution and typeahead.

use serde::{Deserialize, Serialize};

use super::text::build_prefix_expression;

/// A free-text query prepared for the text store.
///
/// The trimmed text is bound to the plain-match and similarity predicates;
/// the prefix expression, when present, to the prefix-match predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    pub text: String,
    pub prefix_expression: Option<String>,
}

impl TextQuery {
    /// Prepare `raw` for querying; `None` if it is blank after trimming.
    pub fn new(raw: &str) -> Option<Self> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            text: text.to_string(),
            prefix_expression: build_prefix_expression(text),
        })
    }
}

/// Outcome of resolving free text to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuery {
    pub category_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_slug: Option<String>,
}

/// A category typeahead entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySuggestion {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// A subcategory typeahead entry, with its parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategorySuggestion {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub category_id: String,
    pub category_name: String,
    pub category_slug: String,
}

/// A scored category row returned by the text store.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryMatch {
    pub category: CategorySuggestion,
    pub score: f64,
}

/// A scored subcategory row returned by the text store.
#[derive(Debug, Clone, PartialEq)]
pub struct SubcategoryMatch {
    pub subcategory: SubcategorySuggestion,
    pub score: f64,
}

/// Typeahead results across both tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySearchResults {
    pub categories: Vec<CategorySuggestion>,
    pub subcategories: Vec<SubcategorySuggestion>,
}

impl CategorySearchResults {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.subcategories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len() + self.subcategories.len()
    }
}
