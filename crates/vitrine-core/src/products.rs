use serde::{Deserialize, Serialize};

use crate::filters::SelectedFilter;

/// Page size used by the collection screen when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 36;

/// Builds the composite identity of a product variant: `productCode-colorCode`.
#[must_use]
pub fn product_key(product_code: &str, color_code: &str) -> String {
    format!("{product_code}-{color_code}")
}

/// A product variant as returned by the collection products endpoint.
///
/// Records are immutable once fetched and replaced wholesale on every page
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_code: String,
    pub color_code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub out_of_stock: bool,
    #[serde(default, rename = "isSaleB2B")]
    pub is_sale_b2b: bool,
    #[serde(default)]
    pub image_url: String,
}

impl Product {
    /// Returns the composite key `productCode-colorCode`.
    #[must_use]
    pub fn key(&self) -> String {
        product_key(&self.product_code, &self.color_code)
    }

    /// Display label: the product name, or the product code truncated to
    /// `max_code_chars` characters with an ellipsis.
    #[must_use]
    pub fn display_name(&self, max_code_chars: usize) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_owned();
        }
        if self.product_code.chars().count() > max_code_chars {
            let head: String = self.product_code.chars().take(max_code_chars).collect();
            format!("{head}...")
        } else {
            self.product_code.clone()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageMeta {
    #[serde(default)]
    pub total_product: u64,
}

/// One page of products for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Vec<Product>,
    #[serde(default)]
    pub meta: ProductPageMeta,
}

/// Request body for `POST /Collection/{id}/GetProductsForConstants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsQuery {
    pub page: u32,
    pub page_size: u32,
    pub additional_filters: Vec<SelectedFilter>,
}

impl Default for ProductsQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            additional_filters: Vec::new(),
        }
    }
}

impl ProductsQuery {
    #[must_use]
    pub fn with_filters(page_size: u32, additional_filters: Vec<SelectedFilter>) -> Self {
        Self {
            page: 1,
            page_size,
            additional_filters,
        }
    }

    /// Number of pages needed to show `total` products at this page size.
    #[must_use]
    pub fn total_pages(&self, total: u64) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        total.div_ceil(u64::from(self.page_size)).max(1)
    }
}
