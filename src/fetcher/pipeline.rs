use crate::fetcher::{
    errors::FetchError,
    types::{Charset, RawDocument, is_html_content_type},
};
use bytes::Bytes;
use encoding_rs::Encoding;
use regex::Regex;
use reqwest::{StatusCode, header::HeaderMap};
use std::sync::LazyLock;
use url::Url;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Decodes the body and rejects challenge pages. `block_markers` must already
/// be lowercase.
pub fn process_response(
    url_final: Url,
    status: StatusCode,
    headers: HeaderMap,
    body_bytes: Bytes,
    content_type: &str,
    block_markers: &[String],
) -> Result<RawDocument, FetchError> {
    let charset = detect_charset(content_type, &body_bytes);
    let body = decode_to_utf8(&body_bytes, &charset)?;

    // JSON bodies carry song titles and snippets that can legitimately
    // contain the markers, so only HTML is scanned.
    if is_html_content_type(content_type)
        && let Some(marker) = find_block_marker(&body, block_markers)
    {
        return Err(FetchError::Blocked {
            marker: marker.to_string(),
        });
    }

    Ok(RawDocument {
        url_final,
        status,
        headers,
        content_type: content_type.to_string(),
        body,
        charset,
    })
}

pub fn find_block_marker<'a>(body: &str, block_markers: &'a [String]) -> Option<&'a str> {
    let lowered = body.to_lowercase();
    block_markers
        .iter()
        .find(|marker| !marker.is_empty() && lowered.contains(marker.as_str()))
        .map(String::as_str)
}

fn detect_charset(content_type: &str, body_bytes: &[u8]) -> Charset {
    // 1. Content-Type header
    if let Some(encoding) = CHARSET_REGEX
        .captures(content_type)
        .and_then(|captures| encoding_from_capture(&captures))
    {
        return Charset::from_encoding(encoding);
    }

    // 2. <meta charset> / http-equiv in the first 4KB
    let search_bytes = &body_bytes[..body_bytes.len().min(4096)];
    let search_str = String::from_utf8_lossy(search_bytes);

    for regex in [&*META_CHARSET_REGEX, &*META_HTTP_EQUIV_REGEX] {
        if let Some(encoding) = regex
            .captures(&search_str)
            .and_then(|captures| encoding_from_capture(&captures))
        {
            return Charset::from_encoding(encoding);
        }
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, false);
    Charset::from_encoding(detector.guess(None, true))
}

fn encoding_from_capture(captures: &regex::Captures<'_>) -> Option<&'static Encoding> {
    let name = captures.get(1)?.as_str().to_lowercase();
    Encoding::for_label(name.as_bytes())
}

fn decode_to_utf8(body_bytes: &[u8], charset: &Charset) -> Result<String, FetchError> {
    let encoding = charset.encoding();
    let (decoded, _encoding, had_errors) = encoding.decode(body_bytes);

    if had_errors {
        return Err(FetchError::Charset(format!(
            "Failed to decode content with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}
