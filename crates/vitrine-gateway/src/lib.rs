pub mod client;
pub mod envelope;
pub mod error;
pub mod session;

pub use client::CatalogClient;
pub use envelope::ApiEnvelope;
pub use error::GatewayError;
pub use session::{Session, TokenPair};
