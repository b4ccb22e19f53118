//! Merging, ranking and display ordering of search hits from many providers.

use crate::types::{SearchHit, SearchOutcome};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

const TITLE_WEIGHT: f64 = 3.0;
const SNIPPET_WEIGHT: f64 = 2.0;
const AUTHORITY_BONUS: f64 = 2.0;
const AUTHORITY_MARKERS: &[&str] = &["edu", "gov", "org"];

/// Images without a quality hint rank as average.
const DEFAULT_IMAGE_QUALITY: f64 = 5.0;
const IMAGE_TITLE_WEIGHT: f64 = 2.0;
const IMAGE_TAG_WEIGHT: f64 = 1.5;
const HIGH_RESOLUTION_WIDTH: u64 = 1920;

/// Text hits emitted before each image when interleaving.
const TEXT_RUN: usize = 3;

fn provider_bonus(source: &str) -> f64 {
    if source.contains("Exa") {
        2.0
    } else if source.contains("Tavily") {
        1.5
    } else {
        0.0
    }
}

fn image_source_bonus(source: &str) -> f64 {
    if source.contains("Unsplash") {
        2.0
    } else if source.contains("Pixabay") {
        1.0
    } else {
        0.0
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn overlap(query: &HashSet<String>, text: &str) -> usize {
    let words = word_set(text);
    query.iter().filter(|w| words.contains(*w)).count()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Stateless ranking helpers shared by web and image search.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultAggregator;

impl ResultAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Keep the first hit seen for each url. Hits without a url are dropped.
    pub fn dedup_by_url(hits: impl IntoIterator<Item = SearchHit>) -> Vec<SearchHit> {
        let mut seen = HashSet::new();
        hits.into_iter()
            .filter(|hit| !hit.url.is_empty() && seen.insert(hit.url.clone()))
            .collect()
    }

    /// Relevance of a text hit for `query`.
    ///
    /// 3 per query word in the title, 2 per query word in the snippet,
    /// +2 for edu/gov/org domains, a provider bonus and the upstream score.
    pub fn relevance(hit: &SearchHit, query: &str) -> f64 {
        let query = word_set(query);
        Self::relevance_for(hit, &query)
    }

    fn relevance_for(hit: &SearchHit, query: &HashSet<String>) -> f64 {
        let mut score = TITLE_WEIGHT * overlap(query, &hit.title) as f64
            + SNIPPET_WEIGHT * overlap(query, &hit.snippet) as f64;
        if AUTHORITY_MARKERS.iter().any(|m| hit.domain.contains(m)) {
            score += AUTHORITY_BONUS;
        }
        score + provider_bonus(&hit.source_name) + hit.score
    }

    /// Concatenate provider lists in the given order, dedup by url and sort
    /// by relevance. Each returned hit carries its relevance in `score`.
    ///
    /// The sort is stable: equal scores keep aggregation order.
    pub fn merge(&self, lists: &[(String, Vec<SearchHit>)], query: &str) -> Vec<SearchHit> {
        let all = lists.iter().flat_map(|(_, hits)| hits.iter().cloned());
        let query_words = word_set(query);
        let mut merged: Vec<SearchHit> = Self::dedup_by_url(all)
            .into_iter()
            .map(|mut hit| {
                hit.score = Self::relevance_for(&hit, &query_words);
                hit
            })
            .collect();
        merged.sort_by(|a, b| descending(a.score, b.score));
        merged
    }

    /// `merge` over raw provider outcomes. Failed outcomes contribute nothing.
    pub fn merge_outcomes(&self, outcomes: &[SearchOutcome], query: &str) -> Vec<SearchHit> {
        let lists: Vec<(String, Vec<SearchHit>)> = outcomes
            .iter()
            .map(|o| (o.provider_name.clone(), o.hits.clone()))
            .collect();
        self.merge(&lists, query)
    }

    /// Display order: three text hits, then one image, repeating. Once either
    /// kind runs out the rest of the other follows in order.
    pub fn interleave(&self, ranked: Vec<SearchHit>) -> Vec<SearchHit> {
        let total = ranked.len();
        let (images, texts): (Vec<SearchHit>, Vec<SearchHit>) =
            ranked.into_iter().partition(SearchHit::is_image);
        let mut texts = texts.into_iter().peekable();
        let mut images = images.into_iter().peekable();

        let mut out = Vec::with_capacity(total);
        let mut slot = 0usize;
        while out.len() < total {
            let wants_text = slot % (TEXT_RUN + 1) != TEXT_RUN;
            let next = if wants_text && texts.peek().is_some() {
                texts.next()
            } else if images.peek().is_some() {
                images.next()
            } else {
                texts.next()
            };
            match next {
                Some(hit) => out.push(hit),
                None => break,
            }
            slot += 1;
        }
        out
    }

    /// Image score: quality hint, +2 per query word in the title, +1.5 per
    /// query word among the tags, a source bonus and +1 for wide images.
    pub fn image_score(hit: &SearchHit, query: &str) -> f64 {
        let query = word_set(query);
        Self::image_score_for(hit, &query)
    }

    fn image_score_for(hit: &SearchHit, query: &HashSet<String>) -> f64 {
        let quality = hit
            .extra
            .get("quality")
            .and_then(Value::as_f64)
            .unwrap_or(DEFAULT_IMAGE_QUALITY);

        let title = hit.title.to_lowercase();
        let title_matches = query.iter().filter(|w| title.contains(w.as_str())).count();

        let tags: Vec<String> = hit
            .extra
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| {
                tags.iter()
                    .filter_map(Value::as_str)
                    .map(|t| t.to_lowercase())
                    .collect()
            })
            .unwrap_or_default();
        let tag_matches = query
            .iter()
            .filter(|w| tags.iter().any(|t| t.contains(w.as_str())))
            .count();

        let wide = hit
            .extra
            .get("width")
            .and_then(Value::as_u64)
            .is_some_and(|w| w > HIGH_RESOLUTION_WIDTH);

        quality
            + IMAGE_TITLE_WEIGHT * title_matches as f64
            + IMAGE_TAG_WEIGHT * tag_matches as f64
            + image_source_bonus(&hit.source_name)
            + if wide { 1.0 } else { 0.0 }
    }

    /// Dedup image hits by url and order them by `image_score`.
    pub fn rank_images(&self, hits: Vec<SearchHit>, query: &str) -> Vec<SearchHit> {
        let query_words = word_set(query);
        let mut ranked: Vec<SearchHit> = Self::dedup_by_url(hits)
            .into_iter()
            .map(|mut hit| {
                hit.score = Self::image_score_for(&hit, &query_words);
                hit
            })
            .collect();
        ranked.sort_by(|a, b| descending(a.score, b.score));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(title: &str, url: &str, source: &str) -> SearchHit {
        SearchHit::new(title, url, source)
    }

    fn image(url: &str, source: &str, extra: Value) -> SearchHit {
        SearchHit::new("photo", url, source).as_image().with_extra(extra)
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let lists = vec![
            ("P1".to_string(), vec![hit("First title", "https://a.com/x", "P1")]),
            ("P2".to_string(), vec![hit("Second title", "https://a.com/x", "P2")]),
        ];
        let merged = ResultAggregator.merge(&lists, "anything");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "First title");
        assert_eq!(merged[0].source_name, "P1");
    }

    #[test]
    fn test_merge_dedups_every_url() {
        let urls = ["https://a.com/1", "https://a.com/2", "https://a.com/1", "https://a.com/3"];
        let lists = vec![
            ("P1".to_string(), urls.iter().map(|u| hit("t", u, "P1")).collect()),
            ("P2".to_string(), urls.iter().rev().map(|u| hit("t", u, "P2")).collect()),
        ];
        let merged = ResultAggregator.merge(&lists, "t");
        let distinct: HashSet<&str> = merged.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(merged.len(), 3);
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn test_merge_drops_empty_urls() {
        let lists = vec![("P1".to_string(), vec![hit("No link", "", "P1")])];
        assert!(ResultAggregator.merge(&lists, "link").is_empty());
    }

    #[test]
    fn test_relevance_components() {
        let plain = hit("climate change", "https://news.com/a", "SerpAPI")
            .with_snippet("solutions for climate");
        // 2 title words, 2 snippet words
        assert_eq!(ResultAggregator::relevance(&plain, "climate change solutions"), 10.0);

        let authority = hit("unrelated", "https://www.nasa.gov/a", "Exa").with_score(0.5);
        assert_eq!(
            ResultAggregator::relevance(&authority, "climate"),
            AUTHORITY_BONUS + 2.0 + 0.5
        );

        let tavily = hit("unrelated", "https://x.com", "Tavily");
        assert_eq!(ResultAggregator::relevance(&tavily, "climate"), 1.5);
    }

    #[test]
    fn test_merge_is_deterministic() {
        let lists = vec![
            (
                "Exa".to_string(),
                vec![
                    hit("rust async", "https://a.com/1", "Exa"),
                    hit("other", "https://a.com/2", "Exa"),
                ],
            ),
            (
                "You.com".to_string(),
                vec![
                    hit("other", "https://b.com/1", "You.com"),
                    hit("rust", "https://b.com/2", "You.com"),
                    hit("other", "https://b.com/3", "You.com"),
                ],
            ),
        ];
        let first = ResultAggregator.merge(&lists, "rust async");
        for _ in 0..10 {
            let again = ResultAggregator.merge(&lists, "rust async");
            let a: Vec<&str> = first.iter().map(|h| h.url.as_str()).collect();
            let b: Vec<&str> = again.iter().map(|h| h.url.as_str()).collect();
            assert_eq!(a, b);
        }
        assert_eq!(first[0].url, "https://a.com/1");
        // equal scores keep aggregation order
        assert_eq!(first[3].url, "https://b.com/1");
        assert_eq!(first[4].url, "https://b.com/3");
    }

    #[test]
    fn test_interleave_pattern() {
        let mut ranked: Vec<SearchHit> = (0..5)
            .map(|i| hit("t", &format!("https://t.com/{i}"), "Exa"))
            .collect();
        ranked.extend((0..3).map(|i| image(&format!("https://i.com/{i}"), "Unsplash", Value::Null)));

        let order: Vec<bool> = ResultAggregator
            .interleave(ranked)
            .iter()
            .map(SearchHit::is_image)
            .collect();
        assert_eq!(order, vec![false, false, false, true, false, false, true, true]);
    }

    #[test]
    fn test_interleave_text_only() {
        let ranked: Vec<SearchHit> = (0..6)
            .map(|i| hit("t", &format!("https://t.com/{i}"), "Exa"))
            .collect();
        assert_eq!(ResultAggregator.interleave(ranked.clone()), ranked);
    }

    #[test]
    fn test_rank_images() {
        let hits = vec![
            image(
                "https://pixabay.com/1",
                "Pixabay",
                json!({"quality": 7.0, "tags": ["mountain", "lake"]}),
            ),
            image("https://serp.com/1", "SerpAPI Images", json!({"quality": 5.0})),
            image(
                "https://unsplash.com/1",
                "Unsplash",
                json!({"quality": 9.0, "tags": [], "width": 4000}),
            ),
            image("https://serp.com/1", "SerpAPI Images", json!({"quality": 5.0})),
        ];
        let ranked = ResultAggregator.rank_images(hits, "mountain");
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].source_name, "Unsplash");
        assert_eq!(ranked[0].score, 9.0 + 2.0 + 1.0);
        assert_eq!(ranked[1].score, 7.0 + 1.5 + 1.0);
        assert_eq!(ranked[2].score, 5.0);
    }
}
