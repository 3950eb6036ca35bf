pub mod client;
pub mod errors;
pub mod identity;
pub mod pipeline;
pub mod rotation;
pub mod types;

pub use client::{DEFAULT_BLOCK_MARKERS, HttpFetcher};
pub use errors::FetchError;
pub use identity::{Identity, IdentityPool};
pub use rotation::{Fetched, RotatingFetcher};
pub use types::{Charset, RawDocument};
