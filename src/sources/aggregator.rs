//! The large lyrics aggregator. Search goes through its internal JSON search
//! endpoint; lyrics come from the song page markup.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};
use url::Url;

use crate::extractor::{ExtractionCascade, ExtractionConfig, ExtractorError, Normalizer};
use crate::fetcher::RotatingFetcher;
use crate::metadata::song_id_from_url;
use crate::model::{LyricsPage, LyricsText, SourceCandidate, SourceName};
use crate::sources::{
    MAX_CANDIDATES, SourceAdapter, SourceSettings, errors::SourceError, first_attr, first_text,
};

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"h1[class*="SongHeader"]"#).unwrap());
static ANY_H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static ARTIST_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/artists/"]"#).unwrap());
static ARTIST_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="SongHeader__Artist"]"#).unwrap());
static COVER_ART: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"img[class*="SongHeader__CoverArt"]"#).unwrap());
static COVER_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"img[alt*="cover"]"#).unwrap());
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());
static RELEASE_LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class*="ReleaseDateLabel"]"#).unwrap());

static APP_SONG_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"genius://songs/(\d+)").unwrap());

/// --- Search wire format ---

#[derive(Debug, Deserialize)]
struct MultiSearch {
    response: MultiSearchBody,
}

#[derive(Debug, Deserialize)]
struct MultiSearchBody {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    result: HitResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HitResult {
    id: Option<u64>,
    title: Option<String>,
    primary_artist: Option<HitArtist>,
    url: Option<String>,
    song_art_image_thumbnail_url: Option<String>,
    language: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HitArtist {
    name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AggregatorSource {
    fetcher: RotatingFetcher,
    settings: SourceSettings,
    cascade: ExtractionCascade,
    normalizer: Normalizer,
}

impl AggregatorSource {
    pub fn new(fetcher: RotatingFetcher, settings: SourceSettings) -> Result<Self, ExtractorError> {
        Self::with_extraction(fetcher, settings, &Self::extraction_config())
    }

    pub fn with_extraction(
        fetcher: RotatingFetcher,
        settings: SourceSettings,
        config: &ExtractionConfig,
    ) -> Result<Self, ExtractorError> {
        Ok(Self {
            fetcher,
            settings,
            cascade: ExtractionCascade::new(config)?,
            normalizer: Normalizer::with_strip_selectors(&config.strip_selectors)?,
        })
    }

    /// Song pages split the lyrics over several sibling containers.
    pub fn extraction_config() -> ExtractionConfig {
        ExtractionConfig {
            container_selectors: vec![
                r#"[data-lyrics-container="true"]"#.to_string(),
                ".lyrics".to_string(),
            ],
            merge_containers: true,
            ..ExtractionConfig::default()
        }
    }

    fn search_url(&self, query: &str) -> Result<Url, SourceError> {
        let mut url = self.settings.base_url.join("api/search/multi")?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    fn scrape(&self, url: Url, body: &str) -> Result<LyricsPage, SourceError> {
        let document = Html::parse_document(body);

        let result = self.cascade.extract_from(&document);
        let (Some(html), Some(strategy)) = (result.html, result.strategy) else {
            return Err(SourceError::LyricsNotFound {
                url: url.to_string(),
            });
        };
        let lyrics = LyricsText::new(self.normalizer.normalize(&html)).ok_or_else(|| {
            SourceError::LyricsNotFound {
                url: url.to_string(),
            }
        })?;

        let song_id = APP_SONG_ID
            .captures(body)
            .and_then(|c| c[1].parse().ok())
            .or_else(|| song_id_from_url(url.as_str()));

        Ok(LyricsPage {
            title: first_text(&document, &[&*TITLE, &*ANY_H1]),
            artist: first_text(&document, &[&*ARTIST_LINK, &*ARTIST_LABEL]),
            thumbnail: first_attr(
                &document,
                &[
                    (&*COVER_ART, "src"),
                    (&*COVER_ALT, "src"),
                    (&*OG_IMAGE, "content"),
                ],
            ),
            release_date: first_text(&document, &[&*RELEASE_LABEL]),
            song_id,
            strategy,
            lyrics,
            url,
        })
    }
}

/// Song-section hits as candidates. Hits without a usable URL are dropped.
fn parse_search(body: &str, base: &Url) -> Result<Vec<SourceCandidate>, SourceError> {
    let search: MultiSearch = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed(format!("search response: {e}")))?;

    let Some(songs) = search
        .response
        .sections
        .into_iter()
        .find(|section| section.kind == "song")
    else {
        return Ok(Vec::new());
    };

    Ok(songs
        .hits
        .into_iter()
        .filter_map(|hit| {
            let result = hit.result;
            let url = base.join(result.url.as_deref()?.trim()).ok()?;
            Some(SourceCandidate {
                id: result.id,
                title: result.title.unwrap_or_default().trim().to_string(),
                artist: result.primary_artist.and_then(|a| a.name),
                url,
                thumbnail: result.song_art_image_thumbnail_url,
                language: result.language,
                source: SourceName::Aggregator,
            })
        })
        .take(MAX_CANDIDATES)
        .collect())
}

#[async_trait]
impl SourceAdapter for AggregatorSource {
    fn source(&self) -> SourceName {
        SourceName::Aggregator
    }

    fn handles(&self, url: &Url) -> bool {
        self.settings.same_site(url)
    }

    #[instrument(skip(self), fields(source = "aggregator"))]
    async fn search(&self, query: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        let url = self.search_url(query)?;
        let fetched = self
            .fetcher
            .fetch(url.as_str(), self.settings.search_timeout)
            .await?;

        let candidates = parse_search(&fetched.document.body, &fetched.document.url_final)?;
        if candidates.is_empty() {
            info!("search returned no songs");
            return Err(SourceError::SearchEmpty {
                query: query.to_string(),
            });
        }

        debug!(count = candidates.len(), "search candidates");
        Ok(candidates)
    }

    #[instrument(skip(self), fields(source = "aggregator"))]
    async fn extract_lyrics(&self, url: &str) -> Result<LyricsPage, SourceError> {
        let url = Url::parse(url)?;

        self.settings.courtesy_pause().await;
        let fetched = self
            .fetcher
            .fetch(url.as_str(), self.settings.page_timeout)
            .await?;

        let page = self.scrape(fetched.document.url_final, &fetched.document.body)?;
        info!(strategy = %page.strategy, attempts = fetched.attempts, "lyrics extracted");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::Strategy;
    use crate::fetcher::{HttpFetcher, IdentityPool};
    use std::sync::Arc;

    fn source() -> AggregatorSource {
        let fetcher = RotatingFetcher::new(HttpFetcher::new().unwrap(), Arc::new(IdentityPool::default()));
        AggregatorSource::new(
            fetcher,
            SourceSettings::new(Url::parse("https://genius.com").unwrap()),
        )
        .unwrap()
    }

    fn base() -> Url {
        Url::parse("https://genius.com").unwrap()
    }

    #[test]
    fn test_search_url_encodes_query() {
        let url = source().search_url("සඳ එළියේ & more").unwrap();
        assert_eq!(url.path(), "/api/search/multi");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "q");
        assert_eq!(value, "සඳ එළියේ & more");
    }

    #[test]
    fn test_parse_search_takes_song_section() {
        let body = r#"{"meta":{"status":200},"response":{"sections":[
            {"type":"top_hit","hits":[{"result":{"id":1,"url":"https://genius.com/top-hit-lyrics"}}]},
            {"type":"song","hits":[
                {"result":{"id":10,"title":"First","primary_artist":{"name":"Band"},"url":"https://genius.com/Band-first-lyrics","song_art_image_thumbnail_url":"https://images.genius.com/1.300x300x1.png","language":"en"}},
                {"result":{"id":11,"title":"No url"}},
                {"result":{"id":12,"title":"Second","url":"/Band-second-lyrics"}}
            ]},
            {"type":"artist","hits":[]}
        ]}}"#;

        let candidates = parse_search(body, &base()).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id, Some(10));
        assert_eq!(candidates[0].artist.as_deref(), Some("Band"));
        assert_eq!(candidates[0].language.as_deref(), Some("en"));
        assert_eq!(candidates[1].url.as_str(), "https://genius.com/Band-second-lyrics");
        assert!(candidates.iter().all(|c| c.source == SourceName::Aggregator));
    }

    #[test]
    fn test_parse_search_caps_results() {
        let hits: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"result":{{"id":{i},"title":"Song {i}","url":"https://genius.com/s-{i}-lyrics"}}}}"#))
            .collect();
        let body = format!(
            r#"{{"response":{{"sections":[{{"type":"song","hits":[{}]}}]}}}}"#,
            hits.join(",")
        );

        let candidates = parse_search(&body, &base()).unwrap();
        assert_eq!(candidates.len(), MAX_CANDIDATES);
        assert_eq!(candidates[0].id, Some(0));
        assert_eq!(candidates[4].id, Some(4));
    }

    #[test]
    fn test_parse_search_without_song_section() {
        let body = r#"{"response":{"sections":[{"type":"artist","hits":[]}]}}"#;
        assert!(parse_search(body, &base()).unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_rejects_garbage() {
        let err = parse_search("<html>not json</html>", &base()).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn test_scrape_song_page() {
        let body = r#"<html><head>
            <meta content="genius://songs/378195" name="twitter:app:url:iphone">
            <meta property="og:image" content="https://images.genius.com/og.1000x1000x1.jpg">
            </head><body>
            <h1 class="SongHeader__Title-sc-1">Sorry</h1>
            <a href="https://genius.com/artists/Justin-bieber">Justin Bieber</a>
            <span class="HeaderArtistAndTracklist__ReleaseDateLabel">October 22, 2015</span>
            <div data-lyrics-container="true">[Verse 1]<br>You gotta go and get angry</div>
            <div data-lyrics-container="true">[Chorus]<br>Is it too late now</div>
            </body></html>"#;

        let page = source()
            .scrape(Url::parse("https://genius.com/Justin-bieber-sorry-lyrics").unwrap(), body)
            .unwrap();

        assert_eq!(page.title.as_deref(), Some("Sorry"));
        assert_eq!(page.artist.as_deref(), Some("Justin Bieber"));
        assert_eq!(page.thumbnail.as_deref(), Some("https://images.genius.com/og.1000x1000x1.jpg"));
        assert_eq!(page.release_date.as_deref(), Some("October 22, 2015"));
        assert_eq!(page.song_id, Some(378195));
        assert_eq!(page.strategy, Strategy::StructuredContainer);
        assert_eq!(
            page.lyrics.as_str(),
            "[Verse 1]\nYou gotta go and get angry\n[Chorus]\nIs it too late now"
        );
    }

    #[test]
    fn test_scrape_without_lyrics() {
        let err = source()
            .scrape(
                Url::parse("https://genius.com/missing").unwrap(),
                "<html><body><h1>Not here</h1></body></html>",
            )
            .unwrap_err();
        assert!(matches!(err, SourceError::LyricsNotFound { .. }));
    }
}
