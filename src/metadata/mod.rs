pub mod client;
pub mod errors;
pub mod types;

pub use client::MetadataEnricher;
pub use errors::MetadataUnavailable;
pub use types::{ApiMetadata, MetadataOrigin, SongKey, song_id_from_url};
