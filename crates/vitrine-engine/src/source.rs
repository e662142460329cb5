use async_trait::async_trait;
use vitrine_core::{FilterDefinition, ProductPage, ProductsQuery};
use vitrine_gateway::{CatalogClient, GatewayError};

/// Read side of the remote catalog that the collection screen depends on.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn products(
        &self,
        collection_id: i64,
        query: &ProductsQuery,
    ) -> Result<ProductPage, GatewayError>;

    async fn filters(&self, collection_id: i64) -> Result<Vec<FilterDefinition>, GatewayError>;
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn products(
        &self,
        collection_id: i64,
        query: &ProductsQuery,
    ) -> Result<ProductPage, GatewayError> {
        self.get_products(collection_id, query).await
    }

    async fn filters(&self, collection_id: i64) -> Result<Vec<FilterDefinition>, GatewayError> {
        self.get_filters(collection_id).await
    }
}
