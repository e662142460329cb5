//! Collection, product, and filter-definition endpoints.

use reqwest::Method;
use vitrine_core::{Collection, FilterDefinition, ProductPage, ProductsQuery};

use crate::error::GatewayError;

use super::CatalogClient;

impl CatalogClient {
    /// Lists every collection (`GET /Collection/GetAll`).
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and payload errors from the request.
    pub async fn get_collections(&self) -> Result<Vec<Collection>, GatewayError> {
        self.send_json::<(), _>(Method::GET, "Collection/GetAll", None, "collections")
            .await
    }

    /// Fetches one page of products for a collection with the given filters
    /// (`POST /Collection/{id}/GetProductsForConstants`).
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and payload errors from the request.
    pub async fn get_products(
        &self,
        collection_id: i64,
        query: &ProductsQuery,
    ) -> Result<ProductPage, GatewayError> {
        let path = format!("Collection/{collection_id}/GetProductsForConstants");
        let context = format!("products of collection {collection_id} (page {})", query.page);
        let page: ProductPage = self
            .send_json(Method::POST, &path, Some(query), &context)
            .await?;
        tracing::debug!(
            collection_id,
            page = query.page,
            returned = page.data.len(),
            total = page.meta.total_product,
            "fetched product page"
        );
        Ok(page)
    }

    /// Fetches the filter definitions usable for a collection
    /// (`GET /Collection/{id}/GetFiltersForConstants`).
    ///
    /// # Errors
    ///
    /// Propagates transport, status, and payload errors from the request.
    pub async fn get_filters(
        &self,
        collection_id: i64,
    ) -> Result<Vec<FilterDefinition>, GatewayError> {
        let path = format!("Collection/{collection_id}/GetFiltersForConstants");
        let context = format!("filters of collection {collection_id}");
        self.send_json::<(), _>(Method::GET, &path, None, &context)
            .await
    }
}
