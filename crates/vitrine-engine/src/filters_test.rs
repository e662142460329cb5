use vitrine_core::{FilterDefinition, FilterValue, SelectedFilter};

use super::*;

fn value(value: &str, name: Option<&str>) -> FilterValue {
    FilterValue {
        value: value.to_string(),
        value_name: name.map(str::to_string),
    }
}

fn definition(
    id: &str,
    title: &str,
    comparison_type: i32,
    values: Vec<FilterValue>,
) -> FilterDefinition {
    FilterDefinition {
        id: id.to_string(),
        title: title.to_string(),
        values,
        comparison_type,
    }
}

fn engine() -> FilterEngine {
    let mut engine = FilterEngine::new(36);
    engine.set_definitions(vec![
        definition(
            "color",
            "Color",
            1,
            vec![value("red", Some("Red")), value("blue", None)],
        ),
        definition("size", "Size", 2, vec![value("m", Some("Medium"))]),
        definition(YEAR_FILTER_ID, "Year", 3, vec![value("2024", Some("Season 2024"))]),
        definition(
            WAREHOUSE_FILTER_ID,
            "Warehouse",
            4,
            vec![value("ist", Some("Istanbul"))],
        ),
    ]);
    engine
}

#[test]
fn sort_order_parses_wire_values() {
    assert_eq!("nameAsc".parse::<SortOrder>(), Ok(SortOrder::NameAsc));
    assert_eq!("PRICEDESC".parse::<SortOrder>(), Ok(SortOrder::PriceDesc));
    assert_eq!("".parse::<SortOrder>(), Ok(SortOrder::Unsorted));
    assert!("newest".parse::<SortOrder>().is_err());
}

#[test]
fn set_selected_keeps_one_entry_per_id() {
    let mut engine = engine();
    engine.set_selected("color", "red", 1);
    engine.set_selected("size", "m", 2);
    engine.set_selected("color", "blue", 1);

    assert_eq!(
        engine.selected(),
        &[
            SelectedFilter::new("color", "blue", 1),
            SelectedFilter::new("size", "m", 2),
        ]
    );
}

#[test]
fn general_type_switch_clears_previous_value() {
    let mut engine = engine();
    engine.set_general_filter_type("color");
    engine.set_general_filter_value("red");
    assert_eq!(engine.selected(), &[SelectedFilter::new("color", "red", 1)]);

    engine.set_general_filter_type("size");

    assert!(engine.selected().iter().all(|s| s.id != "color"));
    assert!(engine.selected().iter().all(|s| s.id != "size"));
    assert_eq!(engine.draft().general_type, "size");
    assert!(engine.draft().general_value.is_empty());
}

#[test]
fn general_type_without_value_adds_nothing() {
    let mut engine = engine();
    engine.set_general_filter_type("color");

    assert!(engine.selected().is_empty());
    engine.apply_draft();
    assert!(engine.applied().is_empty());
}

#[test]
fn general_value_without_type_is_ignored() {
    let mut engine = engine();
    engine.set_general_filter_value("red");

    assert!(engine.selected().is_empty());
    assert!(engine.draft().general_value.is_empty());
}

#[test]
fn unknown_general_type_does_not_select() {
    let mut engine = engine();
    engine.set_general_filter_type("material");
    engine.set_general_filter_value("cotton");

    assert!(engine.selected().is_empty());
}

#[test]
fn emptying_a_bound_input_removes_its_criterion() {
    let mut engine = engine();
    engine.set_year("2024");
    assert_eq!(engine.selected(), &[SelectedFilter::new(YEAR_FILTER_ID, "2024", 3)]);

    engine.set_year("");

    assert!(engine.selected().is_empty());
}

#[test]
fn clear_selected_resets_bound_draft() {
    let mut engine = engine();
    engine.set_year("2024");
    engine.set_warehouse("ist");
    engine.set_general_filter_type("color");
    engine.set_general_filter_value("red");

    assert!(engine.clear_selected(YEAR_FILTER_ID));
    assert!(engine.clear_selected(WAREHOUSE_FILTER_ID));
    assert!(engine.clear_selected("color"));

    assert!(engine.selected().is_empty());
    assert!(engine.draft().year.is_empty());
    assert!(engine.draft().warehouse.is_empty());
    assert!(engine.draft().general_value.is_empty());
    assert!(!engine.clear_selected("color"));
}

#[test]
fn apply_draft_describes_inputs_in_order() {
    let mut engine = engine();
    engine.set_stock("10");
    engine.set_product_code("AB12");
    engine.set_sort_order(SortOrder::NameDesc);
    engine.set_all_sizes_in_stock(true);
    engine.set_min_stock("2");
    engine.set_max_stock("50");
    engine.set_warehouse("ist");
    engine.set_year("2024");
    engine.set_general_filter_type("color");
    engine.set_general_filter_value("blue");

    let query = engine.apply_draft();

    assert_eq!(
        engine.applied(),
        &[
            "Stock: 10",
            "Product code: AB12",
            "Sort: Z-A",
            "All sizes in stock",
            "Min stock: 2",
            "Max stock: 50",
            "Warehouse: Istanbul",
            "Year: Season 2024",
            "Color: blue",
        ]
    );
    assert_eq!(query.page, 1);
    assert_eq!(query.page_size, 36);
    assert_eq!(query.additional_filters.len(), 3);
}

#[test]
fn apply_draft_skips_general_line_for_unknown_value() {
    let mut engine = engine();
    engine.set_general_filter_type("color");
    engine.set_general_filter_value("green");

    engine.apply_draft();

    assert!(engine.applied().is_empty());
}

#[test]
fn clear_all_resets_everything() {
    let mut engine = engine();
    engine.set_stock("3");
    engine.set_year("2024");
    engine.set_selected("size", "m", 2);
    engine.apply_draft();

    engine.clear_all();

    assert!(engine.selected().is_empty());
    assert!(engine.applied().is_empty());
    assert_eq!(engine.draft(), &FilterDraft::default());
    assert!(engine.query(1).additional_filters.is_empty());
}

#[test]
fn describe_selected_uses_titles_and_labels() {
    let mut engine = engine();
    engine.set_selected("color", "red", 1);
    engine.set_selected("fabric", "linen", 0);

    assert_eq!(engine.describe_selected(), vec!["Color: Red", "fabric: linen"]);
}

#[test]
fn general_options_exclude_dedicated_filters() {
    let engine = engine();
    let ids: Vec<&str> = engine.general_filter_options().map(|d| d.id.as_str()).collect();

    assert_eq!(ids, vec!["color", "size"]);
}

#[test]
fn query_never_requests_page_zero() {
    let engine = engine();
    assert_eq!(engine.query(0).page, 1);
    assert_eq!(engine.query(4).page, 4);
}

#[test]
fn failed_load_keeps_previous_definitions() {
    let mut engine = engine();
    engine.begin_loading();
    engine.fail("unexpected HTTP status 500");

    assert!(!engine.is_loading());
    assert_eq!(engine.definitions().len(), 4);
    assert_eq!(engine.error(), Some("unexpected HTTP status 500"));
}
