//! Product listing state with a stale-response guard.
//!
//! Every fetch takes a ticket carrying a monotonically increasing sequence
//! number. Only the reply for the most recently issued ticket is applied;
//! replies for older tickets are dropped whether they succeeded or failed.

use tokio::sync::broadcast;
use vitrine_core::{Product, ProductPage, ProductsQuery};
use vitrine_gateway::GatewayError;

use crate::error::EngineError;
use crate::events::{CatalogEvent, EventHub};
use crate::source::CatalogSource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: ProductsQuery,
}

#[derive(Debug)]
pub struct ProductCatalog {
    collection_id: i64,
    items: Vec<Product>,
    total: u64,
    query: ProductsQuery,
    loading: bool,
    error: Option<String>,
    latest_seq: u64,
    events: EventHub<CatalogEvent>,
}

impl ProductCatalog {
    #[must_use]
    pub fn new(collection_id: i64, page_size: u32) -> Self {
        Self {
            collection_id,
            items: Vec::new(),
            total: 0,
            query: ProductsQuery {
                page_size,
                ..ProductsQuery::default()
            },
            loading: false,
            error: None,
            latest_seq: 0,
            events: EventHub::default(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Query of the latest issued fetch.
    #[must_use]
    pub fn query(&self) -> &ProductsQuery {
        &self.query
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.query.page
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        self.query.total_pages(self.total)
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
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.events.subscribe()
    }

    /// Issues a new ticket. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self, query: ProductsQuery) -> FetchTicket {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        self.query = query.clone();
        self.events.emit(CatalogEvent::Loading { page: query.page });
        FetchTicket {
            seq: self.latest_seq,
            query,
        }
    }

    #[must_use]
    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    /// Applies a fetch reply. Returns `Ok(false)` when the ticket is stale
    /// and the reply was discarded, `Ok(true)` when the listing was replaced.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Fetch`] for a failed current fetch. The
    /// previous listing is left in place.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ProductPage, GatewayError>,
    ) -> Result<bool, EngineError> {
        if !self.is_current(ticket) {
            tracing::debug!(
                collection_id = self.collection_id,
                seq = ticket.seq,
                latest = self.latest_seq,
                "discarding stale products response"
            );
            self.events
                .emit(CatalogEvent::StaleDiscarded { seq: ticket.seq });
            return Ok(false);
        }
        self.loading = false;

        match result {
            Ok(page) => {
                self.items = page.data;
                self.total = page.meta.total_product;
                self.events.emit(CatalogEvent::Loaded {
                    page: ticket.query.page,
                    count: self.items.len(),
                    total: self.total,
                });
                Ok(true)
            }
            Err(source) => {
                let message = source.to_string();
                tracing::warn!(
                    collection_id = self.collection_id,
                    error = %message,
                    "products fetch failed"
                );
                self.error = Some(message.clone());
                self.events.emit(CatalogEvent::Failed { message });
                Err(EngineError::Fetch {
                    resource: "products",
                    collection_id: self.collection_id,
                    source,
                })
            }
        }
    }

    /// Fetches `query` from `source` and applies the reply.
    ///
    /// # Errors
    ///
    /// See [`ProductCatalog::complete_fetch`].
    pub async fn fetch(
        &mut self,
        source: &dyn CatalogSource,
        query: ProductsQuery,
    ) -> Result<bool, EngineError> {
        let ticket = self.begin_fetch(query);
        let result = source.products(self.collection_id, &ticket.query).await;
        self.complete_fetch(&ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use vitrine_core::ProductPageMeta;

    use super::*;

    fn page(codes: &[&str], total: u64) -> ProductPage {
        ProductPage {
            data: codes
                .iter()
                .map(|code| Product {
                    product_code: (*code).to_string(),
                    color_code: "01".to_string(),
                    name: None,
                    out_of_stock: false,
                    is_sale_b2b: false,
                    image_url: String::new(),
                })
                .collect(),
            meta: ProductPageMeta {
                total_product: total,
            },
        }
    }

    fn query(page: u32) -> ProductsQuery {
        ProductsQuery {
            page,
            ..ProductsQuery::default()
        }
    }

    #[test]
    fn applies_current_response() {
        let mut catalog = ProductCatalog::new(3, 36);
        let ticket = catalog.begin_fetch(query(1));
        assert!(catalog.is_loading());

        let applied = catalog.complete_fetch(&ticket, Ok(page(&["A", "B"], 80))).unwrap();

        assert!(applied);
        assert!(!catalog.is_loading());
        assert_eq!(catalog.items().len(), 2);
        assert_eq!(catalog.total(), 80);
        assert_eq!(catalog.total_pages(), 3);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut catalog = ProductCatalog::new(3, 36);
        let first = catalog.begin_fetch(query(1));
        let second = catalog.begin_fetch(query(2));

        assert!(catalog
            .complete_fetch(&second, Ok(page(&["NEW"], 40)))
            .unwrap());
        assert!(!catalog
            .complete_fetch(&first, Ok(page(&["OLD"], 10)))
            .unwrap());

        assert_eq!(catalog.items()[0].product_code, "NEW");
        assert_eq!(catalog.page(), 2);
        assert_eq!(catalog.total(), 40);
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut catalog = ProductCatalog::new(3, 36);
        let first = catalog.begin_fetch(query(1));
        let second = catalog.begin_fetch(query(1));

        let stale = catalog.complete_fetch(
            &first,
            Err(GatewayError::EmptyPayload {
                context: "products".to_string(),
            }),
        );

        assert!(matches!(stale, Ok(false)));
        assert!(catalog.error().is_none());
        assert!(catalog.is_loading());
        assert!(catalog.complete_fetch(&second, Ok(page(&[], 0))).unwrap());
    }

    #[test]
    fn failure_keeps_previous_listing() {
        let mut catalog = ProductCatalog::new(3, 36);
        let ok = catalog.begin_fetch(query(1));
        catalog.complete_fetch(&ok, Ok(page(&["A"], 1))).unwrap();

        let failing = catalog.begin_fetch(query(2));
        let err = catalog
            .complete_fetch(
                &failing,
                Err(GatewayError::UnexpectedStatus {
                    status: 500,
                    url: "http://api.test/Collection/3".to_string(),
                }),
            )
            .unwrap_err();

        assert!(matches!(err, EngineError::Fetch { resource: "products", .. }));
        assert_eq!(catalog.items().len(), 1);
        assert!(catalog.error().is_some_and(|e| e.contains("500")));
        assert!(!catalog.is_loading());
    }
}
