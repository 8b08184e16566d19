//! Media title fetcher
//!
//! Resolves a submitted media URL to the title shown on the page. YouTube
//! links go through the public oEmbed endpoint; any other http(s) page is
//! downloaded and its `og:title` (or `<title>`) is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const YOUTUBE_OEMBED_URL: &str = "https://www.youtube.com/oembed";

const YOUTUBE_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Title retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No title found at {0}")]
    MissingTitle(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Looks up the title of a media URL
#[async_trait]
pub trait TitleFetcher: Send + Sync {
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: String,
}

/// reqwest-backed fetcher used by the server
pub struct HttpTitleFetcher {
    client: reqwest::Client,
}

impl HttpTitleFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    async fn fetch_oembed_title(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching oEmbed title for {}", url);
        let response = self
            .client
            .get(YOUTUBE_OEMBED_URL)
            .query(&[("url", url.as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()?;

        let body: OEmbedResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(body.title)
    }

    async fn fetch_page_title(&self, url: &Url) -> Result<String, FetchError> {
        debug!("Fetching page title for {}", url);
        let html = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_html_title(&html).ok_or_else(|| FetchError::MissingTitle(url.to_string()))
    }
}

#[async_trait]
impl TitleFetcher for HttpTitleFetcher {
    async fn fetch_title(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_media_url(url)?;

        let raw = if is_youtube(&parsed) {
            self.fetch_oembed_title(&parsed).await?
        } else {
            self.fetch_page_title(&parsed).await?
        };

        let title = collapse_whitespace(&raw);
        if title.is_empty() {
            return Err(FetchError::MissingTitle(url.to_string()));
        }
        Ok(title)
    }
}

/// Parse and check that the URL is http(s)
pub fn parse_media_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

pub fn is_youtube(url: &Url) -> bool {
    url.host_str()
        .map(|host| YOUTUBE_HOSTS.contains(&host.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Page title from `og:title`, falling back to the `<title>` element
pub fn extract_html_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let og_title = Selector::parse(r#"meta[property="og:title"]"#)
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .filter_map(|meta| meta.value().attr("content"))
                .map(collapse_whitespace)
                .find(|content| !content.is_empty())
        });
    if og_title.is_some() {
        return og_title;
    }

    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .find(|text| !text.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_media_url_rejects_bad_input() {
        assert!(matches!(parse_media_url("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(
            parse_media_url("ftp://example.com/video"),
            Err(FetchError::UnsupportedScheme(ref s)) if s == "ftp"
        ));
        assert!(parse_media_url(" https://example.com/v ").is_ok());
    }

    #[test]
    fn test_is_youtube() {
        let yt = parse_media_url("https://www.youtube.com/watch?v=abc").unwrap();
        let short = parse_media_url("https://youtu.be/abc").unwrap();
        let other = parse_media_url("https://vimeo.com/123").unwrap();

        assert!(is_youtube(&yt));
        assert!(is_youtube(&short));
        assert!(!is_youtube(&other));
    }

    #[test]
    fn test_extract_prefers_og_title() {
        let html = r#"
            <html><head>
              <title>Site name</title>
              <meta property="og:title" content="Bach:  Cello Suite No. 1">
            </head><body></body></html>
        "#;
        assert_eq!(extract_html_title(html).as_deref(), Some("Bach: Cello Suite No. 1"));
    }

    #[test]
    fn test_extract_falls_back_to_title_element() {
        let html = "<html><head><title>\n  Chopin - Nocturne Op. 9\n</title></head></html>";
        assert_eq!(extract_html_title(html).as_deref(), Some("Chopin - Nocturne Op. 9"));
    }

    #[test]
    fn test_extract_without_title() {
        assert_eq!(extract_html_title("<html><body><p>hi</p></body></html>"), None);
    }

    #[test]
    fn test_client_creation() {
        assert!(HttpTitleFetcher::new(Duration::from_secs(5), "test-agent").is_ok());
    }
}
