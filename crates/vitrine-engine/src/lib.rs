//! State engines for the collection curation screen.
//!
//! Each engine is a plain struct mutated through `&mut self` and exposes a
//! `subscribe()` channel so a presentation layer can react to changes
//! without shared global state.

pub mod catalog;
pub mod curation;
pub mod error;
pub mod events;
pub mod filters;
pub mod removal;
pub mod screen;
pub mod source;

pub use catalog::{FetchTicket, ProductCatalog};
pub use curation::{CommitTicket, CurationEngine, PinDiff};
pub use error::EngineError;
pub use events::{CatalogEvent, CurationEvent, EventHub, FilterEvent};
pub use filters::{FilterDraft, FilterEngine, SortOrder, WAREHOUSE_FILTER_ID, YEAR_FILTER_ID};
pub use removal::{RemovalConfirmation, RemovalState};
pub use screen::CollectionScreen;
pub use source::CatalogSource;
