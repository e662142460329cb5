//! Filter state for a collection's product listing.
//!
//! Three pieces live here: the filter definitions fetched from the gateway,
//! the `selected` criteria sent with every products request, and a draft of
//! free-form inputs that only reaches the listing through
//! [`FilterEngine::apply_draft`].

use std::fmt;
use std::str::FromStr;

use tokio::sync::broadcast;
use vitrine_core::{FilterDefinition, ProductsQuery, SelectedFilter, DEFAULT_PAGE_SIZE};

use crate::events::{EventHub, FilterEvent};

/// Filter id the backend uses for the model year.
pub const YEAR_FILTER_ID: &str = "5";
/// Filter id the backend uses for the warehouse.
pub const WAREHOUSE_FILTER_ID: &str = "warehouse";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Unsorted,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 5] = [
        SortOrder::Unsorted,
        SortOrder::NameAsc,
        SortOrder::NameDesc,
        SortOrder::PriceAsc,
        SortOrder::PriceDesc,
    ];

    /// Wire value; empty for [`SortOrder::Unsorted`].
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Unsorted => "",
            SortOrder::NameAsc => "nameAsc",
            SortOrder::NameDesc => "nameDesc",
            SortOrder::PriceAsc => "priceAsc",
            SortOrder::PriceDesc => "priceDesc",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Unsorted => "None",
            SortOrder::NameAsc => "A-Z",
            SortOrder::NameDesc => "Z-A",
            SortOrder::PriceAsc => "Price (ascending)",
            SortOrder::PriceDesc => "Price (descending)",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown sort order \"{s}\""))
    }
}

/// Operator inputs not yet applied to the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterDraft {
    pub stock: String,
    pub product_code: String,
    pub sort_order: SortOrder,
    pub all_sizes_in_stock: bool,
    pub min_stock: String,
    pub max_stock: String,
    pub warehouse: String,
    pub year: String,
    /// Filter id picked in the general-purpose filter selector.
    pub general_type: String,
    pub general_value: String,
}

#[derive(Debug)]
pub struct FilterEngine {
    definitions: Vec<FilterDefinition>,
    selected: Vec<SelectedFilter>,
    draft: FilterDraft,
    applied: Vec<String>,
    page_size: u32,
    loading: bool,
    error: Option<String>,
    events: EventHub<FilterEvent>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl FilterEngine {
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            definitions: Vec::new(),
            selected: Vec::new(),
            draft: FilterDraft::default(),
            applied: Vec::new(),
            page_size,
            loading: false,
            error: None,
            events: EventHub::default(),
        }
    }

    #[must_use]
    pub fn definitions(&self) -> &[FilterDefinition] {
        &self.definitions
    }

    #[must_use]
    pub fn selected(&self) -> &[SelectedFilter] {
        &self.selected
    }

    #[must_use]
    pub fn draft(&self) -> &FilterDraft {
        &self.draft
    }

    /// Human-readable lines describing the last applied draft.
    #[must_use]
    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FilterEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn definition(&self, id: &str) -> Option<&FilterDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    /// Definitions offered in the general-purpose selector. Year and
    /// warehouse have dedicated inputs and are left out.
    pub fn general_filter_options(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.id != YEAR_FILTER_ID && d.id != WAREHOUSE_FILTER_ID)
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn set_definitions(&mut self, definitions: Vec<FilterDefinition>) {
        self.loading = false;
        self.error = None;
        self.definitions = definitions;
        self.events.emit(FilterEvent::DefinitionsLoaded {
            count: self.definitions.len(),
        });
    }

    /// Records a failed definitions fetch. Previously loaded definitions are
    /// kept.
    pub fn fail(&mut self, message: &str) {
        self.loading = false;
        self.error = Some(message.to_owned());
        self.events.emit(FilterEvent::Failed {
            message: message.to_owned(),
        });
    }

    /// Inserts or replaces the criterion for `id`.
    pub fn set_selected(&mut self, id: &str, value: &str, comparison_type: i32) {
        self.upsert(SelectedFilter::new(id, value, comparison_type));
        self.events.emit(FilterEvent::SelectionChanged);
    }

    /// Removes the criterion for `id` and clears whichever draft input is
    /// bound to it. Returns `true` when a criterion was removed.
    pub fn clear_selected(&mut self, id: &str) -> bool {
        let removed = self.remove_entry(id);
        if id == YEAR_FILTER_ID {
            self.draft.year.clear();
        } else if id == WAREHOUSE_FILTER_ID {
            self.draft.warehouse.clear();
        } else if id == self.draft.general_type {
            self.draft.general_value.clear();
        }
        self.events.emit(FilterEvent::SelectionChanged);
        removed
    }

    /// Switches the general filter to another definition. The value chosen
    /// for the previous type is dropped from both the draft and `selected`.
    pub fn set_general_filter_type(&mut self, id: &str) {
        if self.draft.general_type == id {
            return;
        }
        let previous = std::mem::replace(&mut self.draft.general_type, id.to_owned());
        if !previous.is_empty() {
            self.remove_entry(&previous);
        }
        self.draft.general_value.clear();
        self.events.emit(FilterEvent::DraftChanged);
    }

    /// Sets the value for the current general filter type. Ignored while no
    /// type is chosen.
    pub fn set_general_filter_value(&mut self, value: &str) {
        if self.draft.general_type.is_empty() {
            return;
        }
        self.draft.general_value = value.to_owned();
        let id = self.draft.general_type.clone();
        self.bind(&id, value);
    }

    pub fn set_year(&mut self, value: &str) {
        self.draft.year = value.to_owned();
        self.bind(YEAR_FILTER_ID, value);
    }

    pub fn set_warehouse(&mut self, value: &str) {
        self.draft.warehouse = value.to_owned();
        self.bind(WAREHOUSE_FILTER_ID, value);
    }

    pub fn set_stock(&mut self, value: &str) {
        self.draft.stock = value.to_owned();
        self.events.emit(FilterEvent::DraftChanged);
    }

    pub fn set_product_code(&mut self, value: &str) {
        self.draft.product_code = value.to_owned();
        self.events.emit(FilterEvent::DraftChanged);
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.draft.sort_order = order;
        self.events.emit(FilterEvent::DraftChanged);
    }

    pub fn set_all_sizes_in_stock(&mut self, enabled: bool) {
        self.draft.all_sizes_in_stock = enabled;
        self.events.emit(FilterEvent::DraftChanged);
    }

    pub fn set_min_stock(&mut self, value: &str) {
        self.draft.min_stock = value.to_owned();
        self.events.emit(FilterEvent::DraftChanged);
    }

    pub fn set_max_stock(&mut self, value: &str) {
        self.draft.max_stock = value.to_owned();
        self.events.emit(FilterEvent::DraftChanged);
    }

    /// Commits the draft: rebuilds the applied lines and returns the query
    /// to refetch with, starting again from page 1.
    pub fn apply_draft(&mut self) -> ProductsQuery {
        self.applied = self.describe_draft();
        tracing::debug!(
            lines = self.applied.len(),
            selected = self.selected.len(),
            "filters applied"
        );
        self.events.emit(FilterEvent::Applied {
            lines: self.applied.clone(),
        });
        self.query(1)
    }

    /// Resets selected criteria, draft and applied lines.
    pub fn clear_all(&mut self) {
        self.selected.clear();
        self.draft = FilterDraft::default();
        self.applied.clear();
        self.events.emit(FilterEvent::Cleared);
    }

    /// Products query for `page` carrying the current criteria.
    #[must_use]
    pub fn query(&self, page: u32) -> ProductsQuery {
        ProductsQuery {
            page: page.max(1),
            ..ProductsQuery::with_filters(self.page_size, self.selected.clone())
        }
    }

    /// One `title: label` line per selected criterion, in selection order.
    #[must_use]
    pub fn describe_selected(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|sel| {
                let definition = self.definition(&sel.id);
                let title = definition.map_or(sel.id.as_str(), |d| d.title.as_str());
                let label = definition
                    .and_then(|d| d.find_value(&sel.value))
                    .map_or(sel.value.as_str(), |v| v.label());
                format!("{title}: {label}")
            })
            .collect()
    }

    fn describe_draft(&self) -> Vec<String> {
        let draft = &self.draft;
        let mut lines = Vec::new();
        if !draft.stock.is_empty() {
            lines.push(format!("Stock: {}", draft.stock));
        }
        if !draft.product_code.is_empty() {
            lines.push(format!("Product code: {}", draft.product_code));
        }
        if draft.sort_order != SortOrder::Unsorted {
            lines.push(format!("Sort: {}", draft.sort_order.label()));
        }
        if draft.all_sizes_in_stock {
            lines.push("All sizes in stock".to_owned());
        }
        if !draft.min_stock.is_empty() {
            lines.push(format!("Min stock: {}", draft.min_stock));
        }
        if !draft.max_stock.is_empty() {
            lines.push(format!("Max stock: {}", draft.max_stock));
        }
        if !draft.warehouse.is_empty() {
            let label = self.value_label(WAREHOUSE_FILTER_ID, &draft.warehouse);
            lines.push(format!("Warehouse: {label}"));
        }
        if !draft.year.is_empty() {
            let label = self.value_label(YEAR_FILTER_ID, &draft.year);
            lines.push(format!("Year: {label}"));
        }
        if !draft.general_type.is_empty() && !draft.general_value.is_empty() {
            let found = self.definition(&draft.general_type).and_then(|d| {
                d.find_value(&draft.general_value)
                    .map(|v| format!("{}: {}", d.title, v.label()))
            });
            lines.extend(found);
        }
        lines
    }

    fn value_label<'a>(&'a self, id: &str, value: &'a str) -> &'a str {
        self.definition(id)
            .and_then(|d| d.find_value(value))
            .map_or(value, |v| v.label())
    }

    /// Mirrors a draft input into `selected`: a non-empty value with a known
    /// definition is upserted using that definition's comparison type,
    /// anything else removes the criterion.
    fn bind(&mut self, id: &str, value: &str) {
        let comparison_type = self.definition(id).map(|d| d.comparison_type);
        match comparison_type {
            Some(comparison_type) if !value.is_empty() => {
                self.upsert(SelectedFilter::new(id, value, comparison_type));
            }
            _ => {
                self.remove_entry(id);
            }
        }
        self.events.emit(FilterEvent::SelectionChanged);
    }

    fn upsert(&mut self, filter: SelectedFilter) {
        if let Some(existing) = self.selected.iter_mut().find(|s| s.id == filter.id) {
            *existing = filter;
        } else {
            self.selected.push(filter);
        }
    }

    fn remove_entry(&mut self, id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s.id != id);
        self.selected.len() != before
    }
}

#[cfg(test)]
#[path = "filters_test.rs"]
mod tests;
