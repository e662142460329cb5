use serde::{Deserialize, Serialize};

/// A single choosable value of a [`FilterDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterValue {
    pub value: String,
    #[serde(default)]
    pub value_name: Option<String>,
}

impl FilterValue {
    /// Human-readable label, falling back to the raw value.
    #[must_use]
    pub fn label(&self) -> &str {
        self.value_name.as_deref().unwrap_or(&self.value)
    }
}

/// A filter the operator can apply to a collection's products, as returned by
/// `GET /Collection/{id}/GetFiltersForConstants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub values: Vec<FilterValue>,
    #[serde(default)]
    pub comparison_type: i32,
}

impl FilterDefinition {
    #[must_use]
    pub fn find_value(&self, value: &str) -> Option<&FilterValue> {
        self.values.iter().find(|v| v.value == value)
    }
}

/// A criterion sent with a products request. At most one per filter `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedFilter {
    pub id: String,
    pub value: String,
    pub comparison_type: i32,
}

impl SelectedFilter {
    #[must_use]
    pub fn new(id: impl Into<String>, value: impl Into<String>, comparison_type: i32) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            comparison_type,
        }
    }
}
