//! Collection screen: wires the catalog, filter and curation engines to one
//! collection and keeps the pinned view in step with the product listing.

use std::sync::Arc;

use vitrine_core::ProductsQuery;
use vitrine_pins::PinStore;

use crate::catalog::ProductCatalog;
use crate::curation::CurationEngine;
use crate::error::EngineError;
use crate::filters::FilterEngine;
use crate::source::CatalogSource;

pub struct CollectionScreen {
    collection_id: i64,
    source: Arc<dyn CatalogSource>,
    catalog: ProductCatalog,
    filters: FilterEngine,
    curation: CurationEngine,
}

impl std::fmt::Debug for CollectionScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionScreen")
            .field("collection_id", &self.collection_id)
            .field("catalog", &self.catalog)
            .field("filters", &self.filters)
            .field("curation", &self.curation)
            .finish_non_exhaustive()
    }
}

impl CollectionScreen {
    #[must_use]
    pub fn new(
        collection_id: i64,
        source: Arc<dyn CatalogSource>,
        store: Arc<dyn PinStore>,
        page_size: u32,
    ) -> Self {
        Self {
            collection_id,
            source,
            catalog: ProductCatalog::new(collection_id, page_size),
            filters: FilterEngine::new(page_size),
            curation: CurationEngine::new(collection_id, store),
        }
    }

    #[must_use]
    pub fn collection_id(&self) -> i64 {
        self.collection_id
    }

    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    /// Draft edits go through here; call [`CollectionScreen::apply_filters`]
    /// to refetch.
    pub fn filters_mut(&mut self) -> &mut FilterEngine {
        &mut self.filters
    }

    #[must_use]
    pub fn curation(&self) -> &CurationEngine {
        &self.curation
    }

    pub fn curation_mut(&mut self) -> &mut CurationEngine {
        &mut self.curation
    }

    /// Loads the first page of products, the filter definitions and the
    /// stored pins concurrently. Each failure is recorded on its own engine;
    /// the others still complete.
    ///
    /// # Errors
    ///
    /// Returns the first failure in products, filters, pins order.
    pub async fn enter(&mut self) -> Result<(), EngineError> {
        let source = Arc::clone(&self.source);
        let collection_id = self.collection_id;
        let query = self.filters.query(1);
        self.filters.begin_loading();

        tracing::info!(collection_id, "loading collection screen");
        let (products, definitions, pins) = tokio::join!(
            self.catalog.fetch(source.as_ref(), query),
            source.filters(collection_id),
            self.curation.load(),
        );

        let definitions = match definitions {
            Ok(definitions) => {
                self.filters.set_definitions(definitions);
                Ok(())
            }
            Err(source) => {
                self.filters.fail(&source.to_string());
                Err(EngineError::Fetch {
                    resource: "filters",
                    collection_id,
                    source,
                })
            }
        };
        self.curation.recompute_view(self.catalog.items());

        products?;
        definitions?;
        pins
    }

    /// Applies the filter draft and refetches from page 1.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`] when the products fetch fails.
    pub async fn apply_filters(&mut self) -> Result<(), EngineError> {
        let query = self.filters.apply_draft();
        self.load_products(query).await
    }

    /// Clears every filter and refetches from page 1.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`] when the products fetch fails.
    pub async fn clear_filters(&mut self) -> Result<(), EngineError> {
        self.filters.clear_all();
        let query = self.filters.query(1);
        self.load_products(query).await
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`] when the products fetch fails.
    pub async fn go_to_page(&mut self, page: u32) -> Result<(), EngineError> {
        let query = self.filters.query(page);
        self.load_products(query).await
    }

    /// Refetches the current page with the current criteria.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`] when the products fetch fails.
    pub async fn refresh(&mut self) -> Result<(), EngineError> {
        let query = self.filters.query(self.catalog.page());
        self.load_products(query).await
    }

    async fn load_products(&mut self, query: ProductsQuery) -> Result<(), EngineError> {
        let source = Arc::clone(&self.source);
        if self.catalog.fetch(source.as_ref(), query).await? {
            self.curation.recompute_view(self.catalog.items());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "screen_test.rs"]
mod tests;
