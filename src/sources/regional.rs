//! Regional lyrics blog running WordPress: search is the blog's `?s=` page,
//! lyrics live in the post body.

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, instrument};
use url::Url;

use crate::extractor::{ExtractionCascade, ExtractionConfig, ExtractorError, Normalizer};
use crate::fetcher::RotatingFetcher;
use crate::model::{LyricsPage, LyricsText, SourceCandidate, SourceName};
use crate::sources::{
    MAX_CANDIDATES, SourceAdapter, SourceSettings, errors::SourceError, first_attr, first_text,
    non_empty,
};

static POST: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article.post").unwrap());
static POST_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.entry-title a").unwrap());
static POST_THUMBNAIL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img.wp-post-image").unwrap());
static ENTRY_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.entry-title").unwrap());
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static OG_IMAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:image"]"#).unwrap());

#[derive(Debug, Clone)]
pub struct RegionalSource {
    fetcher: RotatingFetcher,
    settings: SourceSettings,
    cascade: ExtractionCascade,
    normalizer: Normalizer,
}

impl RegionalSource {
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

    /// The whole post body, minus the share and related-post widgets
    /// WordPress injects into it.
    pub fn extraction_config() -> ExtractionConfig {
        ExtractionConfig {
            container_selectors: vec![".entry-content".to_string()],
            strip_selectors: vec![".sharedaddy".to_string(), ".jp-relatedposts".to_string()],
            ..ExtractionConfig::default()
        }
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.settings.base_url.clone();
        url.query_pairs_mut().clear().append_pair("s", query);
        url
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

        Ok(LyricsPage {
            title: first_text(&document, &[&*ENTRY_TITLE])
                .or_else(|| first_attr(&document, &[(&*OG_TITLE, "content")])),
            artist: None,
            thumbnail: first_attr(&document, &[(&*OG_IMAGE, "content")]),
            release_date: None,
            song_id: None,
            strategy,
            lyrics,
            url,
        })
    }
}

/// Posts listed on a search results page. A page with posts but no usable
/// links means the theme changed under us.
fn parse_search(body: &str, base: &Url) -> Result<Vec<SourceCandidate>, SourceError> {
    let document = Html::parse_document(body);

    let mut posts = 0;
    let mut candidates = Vec::new();

    for post in document.select(&POST) {
        posts += 1;

        let Some(link) = post.select(&POST_LINK).next() else {
            continue;
        };
        let title = non_empty(Some(link.text().collect()));
        let url = link
            .value()
            .attr("href")
            .and_then(|href| base.join(href.trim()).ok());

        let (Some(title), Some(url)) = (title, url) else {
            continue;
        };

        candidates.push(SourceCandidate {
            id: None,
            title,
            artist: None,
            url,
            thumbnail: post
                .select(&POST_THUMBNAIL)
                .next()
                .and_then(|img| img.value().attr("src"))
                .map(str::to_string),
            language: None,
            source: SourceName::Regional,
        });

        if candidates.len() == MAX_CANDIDATES {
            break;
        }
    }

    if posts > 0 && candidates.is_empty() {
        return Err(SourceError::malformed(format!(
            "{posts} search results without a title link"
        )));
    }

    Ok(candidates)
}

#[async_trait]
impl SourceAdapter for RegionalSource {
    fn source(&self) -> SourceName {
        SourceName::Regional
    }

    fn handles(&self, url: &Url) -> bool {
        self.settings.same_site(url)
    }

    #[instrument(skip(self), fields(source = "regional"))]
    async fn search(&self, query: &str) -> Result<Vec<SourceCandidate>, SourceError> {
        let url = self.search_url(query);
        let fetched = self
            .fetcher
            .fetch(url.as_str(), self.settings.search_timeout)
            .await?;

        if !fetched.document.is_html() {
            return Err(SourceError::malformed(format!(
                "search page served as {}",
                fetched.document.content_type
            )));
        }

        let candidates = parse_search(&fetched.document.body, &fetched.document.url_final)?;
        if candidates.is_empty() {
            info!("search returned no posts");
            return Err(SourceError::SearchEmpty {
                query: query.to_string(),
            });
        }

        debug!(count = candidates.len(), "search candidates");
        Ok(candidates)
    }

    #[instrument(skip(self), fields(source = "regional"))]
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
