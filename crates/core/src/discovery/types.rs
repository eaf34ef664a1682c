//! Search request types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Filters for a single search. Built per request and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    /// Subcategory slug. Accepted but not used to narrow candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Free text resolved to a category before fetching candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Time window as `HH:MM-HH:MM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_address: Option<String>,
    /// Country of `location_address`; the configured default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}

impl SearchFilters {
    /// Free text, trimmed, when non-blank.
    pub fn query_text(&self) -> Option<&str> {
        non_blank(self.free_text_query.as_deref())
    }

    /// Time window, trimmed, when non-blank.
    pub fn window(&self) -> Option<&str> {
        non_blank(self.time_window.as_deref())
    }

    /// Location address, trimmed, when non-blank.
    pub fn address(&self) -> Option<&str> {
        non_blank(self.location_address.as_deref())
    }

    /// Requested country, trimmed, when non-blank.
    pub fn country(&self) -> Option<&str> {
        non_blank(self.country_code.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_fields_count_as_absent() {
        let filters = SearchFilters {
            free_text_query: Some("   ".to_string()),
            time_window: Some("".to_string()),
            location_address: Some(" Av. Italia 2000 ".to_string()),
            ..Default::default()
        };
        assert_eq!(filters.query_text(), None);
        assert_eq!(filters.window(), None);
        assert_eq!(filters.address(), Some("Av. Italia 2000"));
        assert_eq!(filters.country(), None);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let filters: SearchFilters = serde_json::from_str(
            r#"{"categoryId":"cat-plumbing","date":"2026-03-02","timeWindow":"09:00-12:00"}"#,
        )
        .unwrap();
        assert_eq!(filters.category_id.as_deref(), Some("cat-plumbing"));
        assert_eq!(filters.date, NaiveDate::from_ymd_opt(2026, 3, 2));
        assert_eq!(filters.window(), Some("09:00-12:00"));
    }
}
