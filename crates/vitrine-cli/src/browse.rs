//! Read-only catalog commands: collections, products and filters.

use std::sync::Arc;

use clap::Args;
use vitrine_core::AppConfig;
use vitrine_engine::{
    CatalogSource, CollectionScreen, FilterEngine, SortOrder, WAREHOUSE_FILTER_ID, YEAR_FILTER_ID,
};
use vitrine_gateway::CatalogClient;
use vitrine_pins::LocalPinStore;

const NAME_WIDTH: usize = 40;

/// Free-form listing inputs, applied together with `--filter` criteria.
#[derive(Debug, Default, Clone, PartialEq, Eq, Args)]
pub struct DraftArgs {
    #[arg(long)]
    pub stock: Option<String>,
    #[arg(long)]
    pub product_code: Option<String>,
    /// nameAsc, nameDesc, priceAsc or priceDesc
    #[arg(long)]
    pub sort: Option<SortOrder>,
    #[arg(long)]
    pub all_sizes_in_stock: bool,
    #[arg(long)]
    pub min_stock: Option<String>,
    #[arg(long)]
    pub max_stock: Option<String>,
}

impl DraftArgs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, engine: &mut FilterEngine) {
        if let Some(stock) = &self.stock {
            engine.set_stock(stock);
        }
        if let Some(code) = &self.product_code {
            engine.set_product_code(code);
        }
        if let Some(order) = self.sort {
            engine.set_sort_order(order);
        }
        if self.all_sizes_in_stock {
            engine.set_all_sizes_in_stock(true);
        }
        if let Some(min) = &self.min_stock {
            engine.set_min_stock(min);
        }
        if let Some(max) = &self.max_stock {
            engine.set_max_stock(max);
        }
    }
}

/// List every collection with its defining criteria.
///
/// # Errors
///
/// Returns an error if the collections request fails.
pub(crate) async fn run_collections(client: &CatalogClient) -> anyhow::Result<()> {
    let collections = client.get_collections().await?;
    if collections.is_empty() {
        println!("no collections found");
        return Ok(());
    }

    println!("{:<8}{:<32}CRITERIA", "ID", "NAME");
    for collection in &collections {
        println!(
            "{:<8}{:<32}{}",
            collection.id,
            truncate(&collection.info.name, 30),
            collection.criteria_summary().unwrap_or_default()
        );
    }
    Ok(())
}

/// List one page of products, marking pinned ones with `*`.
///
/// # Errors
///
/// Returns an error if a filter argument is malformed or refers to an
/// unknown filter, or if a fetch fails.
pub(crate) async fn run_products(
    config: &AppConfig,
    client: &Arc<CatalogClient>,
    collection_id: i64,
    page: u32,
    filters: &[String],
    draft: &DraftArgs,
) -> anyhow::Result<()> {
    let store = Arc::new(LocalPinStore::new(&config.pin_store_path));
    let source: Arc<dyn CatalogSource> = client.clone();
    let mut screen = CollectionScreen::new(collection_id, source, store, config.page_size);
    screen.enter().await?;

    if !filters.is_empty() || !draft.is_empty() {
        for raw in filters {
            let (id, value) = parse_filter_arg(raw)?;
            select_filter(screen.filters_mut(), id, value)?;
        }
        draft.apply_to(screen.filters_mut());
        screen.apply_filters().await?;
    }
    if page > 1 {
        screen.go_to_page(page).await?;
    }

    for line in screen.filters().applied() {
        println!("applied {line}");
    }
    for line in screen.filters().describe_selected() {
        println!("filter  {line}");
    }

    let catalog = screen.catalog();
    if catalog.items().is_empty() {
        println!("no products found");
        return Ok(());
    }
    println!("{:<3}{:<28}{:<NAME_WIDTH$}STOCK", "", "KEY", "NAME");
    for product in catalog.items() {
        let key = product.key();
        let marker = if screen.curation().is_pinned(&key) { "*" } else { "" };
        let stock = if product.out_of_stock { "out" } else { "in" };
        println!(
            "{marker:<3}{key:<28}{:<NAME_WIDTH$}{stock}",
            truncate(&product.display_name(10), NAME_WIDTH - 2)
        );
    }
    println!(
        "page {} of {} ({} products)",
        catalog.page(),
        catalog.total_pages(),
        catalog.total()
    );
    Ok(())
}

/// List the filters and their values for a collection.
///
/// # Errors
///
/// Returns an error if the filters request fails.
pub(crate) async fn run_filters(
    client: &CatalogClient,
    collection_id: i64,
) -> anyhow::Result<()> {
    let definitions = client.get_filters(collection_id).await?;
    if definitions.is_empty() {
        println!("no filters for collection {collection_id}");
        return Ok(());
    }
    for definition in &definitions {
        println!("{} ({})", definition.title, definition.id);
        for value in &definition.values {
            if value.label() == value.value {
                println!("    {}", value.value);
            } else {
                println!("    {:<16}{}", value.value, value.label());
            }
        }
    }
    Ok(())
}

/// Splits an `id=value` filter argument.
pub(crate) fn parse_filter_arg(raw: &str) -> anyhow::Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((id, value)) if !id.trim().is_empty() => Ok((id.trim(), value.trim())),
        _ => anyhow::bail!("filter \"{raw}\" must look like ID=VALUE"),
    }
}

/// Routes a filter argument to the matching input of the filter engine.
pub(crate) fn select_filter(
    engine: &mut FilterEngine,
    id: &str,
    value: &str,
) -> anyhow::Result<()> {
    let Some(definition) = engine.definition(id) else {
        anyhow::bail!("unknown filter \"{id}\"; run `vitrine filters` to list them");
    };
    let comparison_type = definition.comparison_type;
    match id {
        YEAR_FILTER_ID => engine.set_year(value),
        WAREHOUSE_FILTER_ID => engine.set_warehouse(value),
        _ => engine.set_selected(id, value, comparison_type),
    }
    Ok(())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use vitrine_core::{FilterDefinition, SelectedFilter};

    use super::*;

    fn engine() -> FilterEngine {
        let mut engine = FilterEngine::new(36);
        engine.set_definitions(vec![
            FilterDefinition {
                id: "color".to_string(),
                title: "Color".to_string(),
                values: Vec::new(),
                comparison_type: 1,
            },
            FilterDefinition {
                id: YEAR_FILTER_ID.to_string(),
                title: "Year".to_string(),
                values: Vec::new(),
                comparison_type: 3,
            },
        ]);
        engine
    }

    #[test]
    fn parses_filter_arguments() {
        assert_eq!(parse_filter_arg("color=red").unwrap(), ("color", "red"));
        assert_eq!(parse_filter_arg(" size = m ").unwrap(), ("size", "m"));
        assert!(parse_filter_arg("color").is_err());
        assert!(parse_filter_arg("=red").is_err());
    }

    #[test]
    fn year_argument_goes_through_year_input() {
        let mut engine = engine();
        select_filter(&mut engine, YEAR_FILTER_ID, "2024").unwrap();

        assert_eq!(engine.draft().year, "2024");
        assert_eq!(
            engine.selected(),
            &[SelectedFilter::new(YEAR_FILTER_ID, "2024", 3)]
        );
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let mut engine = engine();
        let err = select_filter(&mut engine, "fabric", "linen").unwrap_err();
        assert!(err.to_string().contains("unknown filter"));
    }

    #[test]
    fn draft_args_reach_applied_lines() {
        let mut engine = engine();
        let draft = DraftArgs {
            stock: Some("5".to_string()),
            sort: Some(SortOrder::NameDesc),
            all_sizes_in_stock: true,
            ..DraftArgs::default()
        };
        assert!(!draft.is_empty());

        draft.apply_to(&mut engine);
        engine.apply_draft();

        assert_eq!(
            engine.applied(),
            ["Stock: 5", "Sort: Z-A", "All sizes in stock"]
        );
    }

    #[test]
    fn empty_draft_args_leave_engine_untouched() {
        let mut engine = engine();
        let draft = DraftArgs::default();
        assert!(draft.is_empty());

        draft.apply_to(&mut engine);
        engine.apply_draft();

        assert!(engine.applied().is_empty());
    }

    #[test]
    fn truncate_counts_characters() {
        assert_eq!(truncate("çiçekli elbise", 6), "çiçekl...");
        assert_eq!(truncate("short", 6), "short");
    }
}
