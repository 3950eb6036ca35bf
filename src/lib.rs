pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod metadata;
pub mod model;
pub mod resolver;
pub mod response;
pub mod sources;

pub use model::{LyricsPage, LyricsText, SongRecord, SourceCandidate, SourceName};
pub use resolver::{LookupRequest, Resolver, ResolveError};
