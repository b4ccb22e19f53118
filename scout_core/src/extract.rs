//! Full page text for report sources.
//!
//! Search hits only carry a snippet. Before a report is written each source
//! url is fetched, its main content block located and converted to text.
//! Pages that cannot be fetched or hold too little text keep their snippet.

use crate::cache::{cache_key, CacheKind, CacheLayer};
use crate::config::Settings;
use crate::cpu_pool::spawn_cpu;
use crate::error::ProviderError;
use crate::providers::{http_client, truncate_chars};
use crate::report::SourceDocument;
use futures::{stream, StreamExt};
use htmd::HtmlToMarkdown;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Pages with less text than this are treated as failed extractions.
pub const MIN_ARTICLE_CHARS: usize = 200;
pub const MAX_CONTENT_CHARS: usize = 5000;

/// Main-content containers, most specific first. `body` is the last resort.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".post-content",
    "#post_content",
    ".article-content",
    ".entry-content",
    ".content-area",
    ".main-content",
    ".post-body",
    ".article__body",
    "[itemprop='articleBody']",
    ".story-body",
    ".content",
    "#content",
    ".container",
    ".page-content",
    "body",
];

/// Never part of the readable text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "aside", "form", "iframe", "svg",
    "img",
];

static MARKDOWN_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("MARKDOWN_LINK pattern is valid")
});
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("BLANK_LINES pattern is valid"));

/// How the text of a page was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// htmd conversion of the content block; keeps headings and lists
    Markdown,
    /// Visible text nodes of the content block, whitespace collapsed
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
    pub text: String,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub method: ExtractionMethod,
    /// Quality in `0.0..=1.0`, see `score_content`
    pub score: f64,
}

/// Quality of extracted text in `0.0..=1.0`.
///
/// Rewards a reasonable length, a real title, vocabulary diversity and
/// structure-preserving extraction.
pub fn score_content(text: &str, title: &str, method: ExtractionMethod) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let mut score: f64 = match words.len() {
        200..=5000 => 0.3,
        n if n > 5000 => 0.2,
        n if n >= 100 => 0.1,
        _ => 0.0,
    };
    if title.trim().chars().count() > 10 {
        score += 0.2;
    }
    let unique: HashSet<&str> = words.iter().copied().collect();
    let diversity = unique.len() as f64 / words.len() as f64;
    score += if diversity > 0.4 {
        0.3
    } else if diversity > 0.2 {
        0.2
    } else {
        0.1
    };
    if method == ExtractionMethod::Markdown {
        score += 0.2;
    }
    score.min(1.0)
}

fn first_match<'a>(html: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|raw| {
        let selector = Selector::parse(raw).ok()?;
        let found = html.select(&selector).next();
        found
    })
}

fn meta_content(html: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let content = html
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(str::trim)
        .filter(|content| !content.is_empty())
        .map(str::to_string);
    content
}

fn html_to_markdown(html: &str) -> String {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();
    let markdown = converter.convert(html).unwrap_or_default();
    let flattened = MARKDOWN_LINK.replace_all(&markdown, "$1");
    BLANK_LINES.replace_all(flattened.trim(), "\n\n").into_owned()
}

fn visible_text(element: ElementRef<'_>) -> String {
    let pieces: Vec<&str> = element
        .descendants()
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
            })
        })
        .filter_map(|node| node.value().as_text().map(|text| &**text))
        .collect();
    pieces.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Main content of an HTML page, or `None` when no candidate reaches
/// `MIN_ARTICLE_CHARS`. The markdown and plain-text renderings of the
/// content block compete on `score_content`.
pub fn extract_page(html: &str, url: &str) -> Option<ExtractedPage> {
    let document = Html::parse_document(html);
    let main = first_match(&document, CONTENT_SELECTORS)?;
    let title = first_match(&document, &["title"])
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let candidates = [
        (ExtractionMethod::Markdown, html_to_markdown(&main.html())),
        (ExtractionMethod::PlainText, visible_text(main)),
    ];
    let (method, text, score) = candidates
        .into_iter()
        .filter(|(_, text)| text.chars().count() >= MIN_ARTICLE_CHARS)
        .map(|(method, text)| {
            let text = truncate_chars(&text, MAX_CONTENT_CHARS);
            let score = score_content(&text, &title, method);
            (method, text, score)
        })
        // first candidate wins ties
        .fold(None::<(ExtractionMethod, String, f64)>, |best, candidate| match best {
            Some(best) if best.2 >= candidate.2 => Some(best),
            _ => Some(candidate),
        })?;

    Some(ExtractedPage {
        url: url.to_string(),
        word_count: text.split_whitespace().count(),
        title,
        text,
        author: meta_content(&document, "meta[name='author']"),
        published: meta_content(&document, "meta[property='article:published_time']"),
        method,
        score,
    })
}

impl SourceDocument {
    /// Take the page text in place of the snippet. Metadata already on the
    /// document wins over the page's.
    pub fn with_page(mut self, page: ExtractedPage) -> Self {
        self.text = page.text;
        if self.title.trim().is_empty() {
            self.title = page.title;
        }
        self.author = self.author.or(page.author);
        self.published = self.published.or(page.published);
        self
    }
}

/// Fetches source pages and fills `SourceDocument::text`.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    client: Client,
    cache: Option<CacheLayer>,
    timeout: Duration,
    concurrency: usize,
}

impl ContentExtractor {
    pub fn new(settings: &Settings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client()?,
            cache: None,
            timeout: settings.search_timeout(),
            concurrency: settings.max_concurrent_requests.max(1),
        })
    }

    /// Builder method to reuse extracted pages across runs.
    pub fn with_cache(mut self, cache: CacheLayer) -> Self {
        self.cache = Some(cache);
        self
    }

    fn key_for(url: &str) -> Option<String> {
        match cache_key(CacheKind::Content, &json!({ "url": url })) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(target: "scout.extract", url, error = %err, "could not derive content cache key");
                None
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ProviderError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(format!("{} after {}s", url, self.timeout.as_secs()))
                } else {
                    ProviderError::HttpRequest(e)
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                body: format!("fetching {}", url),
            });
        }
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();
        if !content_type.contains("html") {
            return Err(ProviderError::Unavailable(format!(
                "{} is {}, not an HTML page",
                url, content_type
            )));
        }
        resp.text().await.map_err(ProviderError::HttpRequest)
    }

    /// Fetch and extract one page, consulting the content cache first.
    pub async fn extract(&self, url: &str) -> Result<ExtractedPage, ProviderError> {
        let key = self.cache.as_ref().and_then(|_| Self::key_for(url));
        if let (Some(cache), Some(key)) = (&self.cache, key.as_deref()) {
            if let Some(page) = cache.get_json::<ExtractedPage>(CacheKind::Content, key).await {
                debug!(target: "scout.extract", url, "page served from cache");
                return Ok(page);
            }
        }

        let start = Instant::now();
        let html = self.fetch_html(url).await?;
        let bytes = html.len();
        let page_url = url.to_string();
        let page = spawn_cpu("extract page", move || {
            extract_page(&html, &page_url).ok_or_else(|| {
                ProviderError::EmptyResponse(format!("readable text at {}", page_url))
            })
        })
        .await?;
        debug!(
            target: "scout.extract",
            url,
            bytes,
            words = page.word_count,
            method = ?page.method,
            score = page.score,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "page extracted"
        );

        if let (Some(cache), Some(key)) = (&self.cache, key.as_deref()) {
            cache.put_json(CacheKind::Content, key, &page).await;
        }
        Ok(page)
    }

    /// Replace each document's snippet with its page text, keeping input
    /// order. Failed pages keep the snippet.
    pub async fn enrich(&self, documents: Vec<SourceDocument>) -> Vec<SourceDocument> {
        stream::iter(documents)
            .map(|doc| async move {
                match self.extract(&doc.url).await {
                    Ok(page) => doc.with_page(page),
                    Err(err) => {
                        warn!(target: "scout.extract", url = %doc.url, error = %err, "keeping snippet");
                        doc
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
