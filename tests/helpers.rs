#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use lyrics_engine::{
    config::Config,
    fetcher::{HttpFetcher, Identity, IdentityPool, RotatingFetcher},
    sources::SourceSettings,
};
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

pub const FIRST_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const SECOND_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15";

pub fn identity_pool() -> Arc<IdentityPool> {
    Arc::new(
        IdentityPool::new(vec![Identity::new(FIRST_AGENT), Identity::new(SECOND_AGENT)]).unwrap(),
    )
}

pub fn rotating_fetcher() -> RotatingFetcher {
    RotatingFetcher::new(HttpFetcher::new().unwrap(), identity_pool())
}

/// Settings pointed at a mock server, with no courtesy delay.
pub fn settings(server: &MockServer) -> SourceSettings {
    SourceSettings::new(Url::parse(&server.uri()).unwrap())
        .with_timeouts(Duration::from_secs(5), Duration::from_secs(5))
        .with_courtesy_delay(Duration::ZERO)
}

pub fn test_config(aggregator: &MockServer, regional: &MockServer, api: &MockServer) -> Config {
    Config::default()
        .with_aggregator_url(&aggregator.uri())
        .unwrap()
        .with_regional_url(&regional.uri())
        .unwrap()
        .with_aggregator_api_url(&api.uri())
        .unwrap()
        .with_timeouts(
            Duration::from_secs(5),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .with_courtesy_delay(Duration::ZERO)
}

pub fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(body.into().into_bytes(), "text/html; charset=utf-8")
}

pub fn song_page(title: &str, verses: &[&str]) -> String {
    let containers: String = verses
        .iter()
        .map(|verse| format!(r#"<div data-lyrics-container="true">{verse}</div>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>{title} Lyrics</title></head><body><h1 class="SongHeader__Title">{title}</h1>{containers}</body></html>"#
    )
}

pub fn multi_search(hits: &[(u64, &str, &str)]) -> serde_json::Value {
    let hits: Vec<serde_json::Value> = hits
        .iter()
        .map(|(id, title, url)| {
            serde_json::json!({
                "index": "song",
                "type": "song",
                "result": {
                    "id": id,
                    "title": title,
                    "primary_artist": {"id": 1, "name": "Test Artist"},
                    "url": url,
                    "song_art_image_thumbnail_url": format!("https://images.example/{id}.png"),
                    "language": "en"
                }
            })
        })
        .collect();

    serde_json::json!({
        "meta": {"status": 200},
        "response": {"sections": [
            {"type": "top_hit", "hits": []},
            {"type": "song", "hits": hits}
        ]}
    })
}

pub fn search_results(posts: &[(&str, &str)]) -> String {
    let posts: String = posts
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<article class="post type-post status-publish"><header class="entry-header"><h2 class="entry-title"><a href="{href}" rel="bookmark">{title}</a></h2></header></article>"#
            )
        })
        .collect();
    format!(r#"<!DOCTYPE html><html><body class="search"><main id="main">{posts}</main></body></html>"#)
}

pub fn post_page(title: &str, lyrics_html: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html><head><meta property="og:image" content="https://img.example/cover.jpg"></head><body><article class="post"><h1 class="entry-title">{title}</h1><div class="entry-content">{lyrics_html}<div class="sharedaddy"><h3>Share this:</h3></div></div></article></body></html>"#
    )
}
