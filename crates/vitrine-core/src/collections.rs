use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub lang_code: String,
}

/// One of the criteria that define a collection in the remote catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriterion {
    pub id: String,
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub value_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub comparison_type: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionFilters {
    #[serde(default)]
    pub use_or_logic: bool,
    #[serde(default)]
    pub filters: Vec<FilterCriterion>,
}

/// A named product grouping from `GET /Collection/GetAll`. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub info: CollectionInfo,
    #[serde(default)]
    pub filters: Option<CollectionFilters>,
    #[serde(default)]
    pub sales_channel_id: Option<i64>,
}

impl Collection {
    /// Renders the defining criteria as `title: value` joined by the
    /// collection's logic operator, e.g. `"Color: Red OR Size: M"`.
    #[must_use]
    pub fn criteria_summary(&self) -> Option<String> {
        let filters = self.filters.as_ref().filter(|f| !f.filters.is_empty())?;
        let joiner = if filters.use_or_logic { " OR " } else { " AND " };
        Some(
            filters
                .filters
                .iter()
                .map(|c| {
                    format!(
                        "{}: {}",
                        c.title,
                        c.value_name.as_deref().unwrap_or(&c.value)
                    )
                })
                .collect::<Vec<_>>()
                .join(joiner),
        )
    }
}
