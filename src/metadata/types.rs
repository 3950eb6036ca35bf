use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// URL shapes the aggregator uses for song pages, most specific last.
static SONG_ID_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"genius\.com/[^?#]*-(\d+)(?:[/?#]|$)",
        r"genius\.com/[^?#]*lyrics/(\d+)",
        r"genius\.com/(\d+)(?:[/?#]|$)",
        r"/songs/(\d+)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// What the enricher is asked to look up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongKey {
    Id(u64),
    Url(String),
}

impl SongKey {
    pub fn song_id(&self) -> Option<u64> {
        match self {
            SongKey::Id(id) => Some(*id),
            SongKey::Url(url) => song_id_from_url(url),
        }
    }
}

impl fmt::Display for SongKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongKey::Id(id) => write!(f, "id:{id}"),
            SongKey::Url(url) => f.write_str(url),
        }
    }
}

pub fn song_id_from_url(url: &str) -> Option<u64> {
    SONG_ID_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataOrigin {
    /// Fetched from the API for this request
    Live,
    /// Canned record returned when no credential is configured
    Sample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMetadata {
    pub id: u64,
    pub title: String,
    pub full_title: Option<String>,
    pub artist: Option<String>,
    pub artist_id: Option<u64>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub release_date: Option<String>,
    pub annotation_count: Option<u64>,
    pub pyongs_count: Option<u64>,
    pub lyrics_state: Option<String>,
    pub api_path: Option<String>,
    pub origin: MetadataOrigin,
}

impl ApiMetadata {
    pub fn sample() -> Self {
        Self {
            id: 10359264,
            title: "Not Like Us".to_string(),
            full_title: Some("Not Like Us by Kendrick Lamar".to_string()),
            artist: Some("Kendrick Lamar".to_string()),
            artist_id: Some(1421),
            url: Some("https://genius.com/Kendrick-lamar-not-like-us-lyrics".to_string()),
            image: Some(
                "https://images.genius.com/95cfea0187b37c7731e11d54b07d2415.1000x1000x1.png"
                    .to_string(),
            ),
            thumbnail: Some(
                "https://images.genius.com/95cfea0187b37c7731e11d54b07d2415.300x300x1.png"
                    .to_string(),
            ),
            release_date: Some("May 4, 2024".to_string()),
            annotation_count: Some(61),
            pyongs_count: Some(183),
            lyrics_state: Some("complete".to_string()),
            api_path: Some("/songs/10359264".to_string()),
            origin: MetadataOrigin::Sample,
        }
    }
}

/// --- Wire format of `GET /songs/{id}` ---

#[derive(Debug, Deserialize)]
pub(crate) struct SongEnvelope {
    pub response: SongBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SongBody {
    pub song: ApiSong,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiSong {
    pub id: u64,
    pub title: String,
    pub full_title: Option<String>,
    pub artist_names: Option<String>,
    pub primary_artist: Option<ApiArtist>,
    pub url: Option<String>,
    pub header_image_url: Option<String>,
    pub header_image_thumbnail_url: Option<String>,
    pub release_date_for_display: Option<String>,
    pub annotation_count: Option<u64>,
    pub pyongs_count: Option<u64>,
    pub lyrics_state: Option<String>,
    pub api_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiArtist {
    pub id: Option<u64>,
    pub name: Option<String>,
}

impl From<ApiSong> for ApiMetadata {
    fn from(song: ApiSong) -> Self {
        let (artist_id, artist_name) = match song.primary_artist {
            Some(artist) => (artist.id, artist.name),
            None => (None, None),
        };

        Self {
            id: song.id,
            title: song.title,
            full_title: song.full_title,
            artist: artist_name.or(song.artist_names),
            artist_id,
            url: song.url,
            image: song.header_image_url,
            thumbnail: song.header_image_thumbnail_url,
            release_date: song.release_date_for_display,
            annotation_count: song.annotation_count,
            pyongs_count: song.pyongs_count,
            lyrics_state: song.lyrics_state,
            api_path: song.api_path,
            origin: MetadataOrigin::Live,
        }
    }
}
