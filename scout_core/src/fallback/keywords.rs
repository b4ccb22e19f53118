//! Frequency keyword extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Corpus keywords considered before query terms are merged in.
const CORPUS_KEYWORDS: usize = 30;

/// Keywords returned after merging.
pub const MAX_KEYWORDS: usize = 20;

static NON_ALPHA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z\s]").expect("NON_ALPHA pattern is valid"));

/// Function words plus the research verbs that dominate web copy
/// without saying anything about the topic.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // function words
        "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from",
        "up", "about", "into", "through", "during", "before", "after", "above", "below",
        "between", "among", "is", "are", "was", "were", "be", "been", "being", "have", "has",
        "had", "do", "does", "did", "will", "would", "should", "could", "can", "may", "might",
        "must", "shall", "this", "that", "these", "those", "i", "you", "he", "she", "it", "we",
        "they", "them", "their", "there", "where", "when", "why", "how", "what", "which", "who",
        "whom", "whose", "if", "then", "than", "as", "so", "very", "just", "now", "here", "more",
        "most", "much", "many", "some", "any", "all", "no", "not", "only", "other", "another",
        "such", "like", "also", "its", "our", "your", "his", "her", "an", "a",
        // filler
        "said", "says", "according", "new", "first", "last", "one", "two", "three", "year",
        "years", "time", "way", "people", "make", "made", "get", "take", "go", "come", "see",
        "know", "think", "look", "use", "work", "find", "give", "tell", "ask", "seem", "feel",
        "try", "leave", "call", "used", "using", "uses", "based",
        // reporting verbs
        "include", "includes", "including", "included", "provide", "provides", "providing",
        "provided", "offer", "offers", "offering", "offered", "show", "shows", "showing",
        "showed", "shown", "demonstrate", "demonstrates", "demonstrating", "demonstrated",
        "indicate", "indicates", "indicating", "indicated", "reveal", "reveals", "revealing",
        "revealed", "suggest", "suggests", "suggesting", "suggested", "propose", "proposes",
        "proposing", "proposed", "explain", "explains", "explaining", "explained", "describe",
        "describes", "describing", "described", "discuss", "discusses", "discussing",
        "discussed", "address", "addresses", "addressing", "addressed", "examine", "examines",
        "examining", "examined", "analyze", "analyzes", "analyzing", "analyzed", "study",
        "studies", "studying", "studied", "research", "researches", "researching",
        "researched", "investigate", "investigates", "investigating", "investigated",
        "explore", "explores", "exploring", "explored", "review", "reviews", "reviewing",
        "reviewed", "evaluate", "evaluates", "evaluating", "evaluated", "assess", "assesses",
        "assessing", "assessed", "compare", "compares", "comparing", "compared",
        // change and causation verbs
        "develop", "develops", "developing", "developed", "create", "creates", "creating",
        "created", "build", "builds", "building", "built", "design", "designs", "designing",
        "designed", "implement", "implements", "implementing", "implemented", "apply",
        "applies", "applying", "applied", "utilize", "utilizes", "utilizing", "utilized",
        "affect", "affects", "affecting", "affected", "result", "results", "resulting",
        "resulted", "lead", "leads", "leading", "led", "cause", "causes", "causing", "caused",
        "produce", "produces", "producing", "produced", "generate", "generates", "generating",
        "generated", "contribute", "contributes", "contributing", "contributed", "support",
        "supports", "supporting", "supported", "enable", "enables", "enabling", "enabled",
        "help", "helps", "helping", "helped", "improve", "improves", "improving", "improved",
        "enhance", "enhances", "enhancing", "enhanced", "increase", "increases", "increasing",
        "increased", "decrease", "decreases", "decreasing", "decreased", "reduce", "reduces",
        "reducing", "reduced", "require", "requires", "requiring", "required", "need", "needs",
        "needing", "needed", "involve", "involves", "involving", "involved", "contain",
        "contains", "containing", "contained", "achieve", "achieves", "achieving", "achieved",
        "identify", "identifies", "identifying", "identified", "discover", "discovers",
        "discovering", "discovered", "finds", "finding", "found", "observe", "observes",
        "observing", "observed", "publish", "publishes", "publishing", "published", "announce",
        "announces", "announcing", "announced", "release", "releases", "releasing", "released",
    ]
    .into_iter()
    .collect()
});

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Lowercase alphabetic tokens of `content`.
pub fn tokenize(content: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let cleaned = NON_ALPHA.replace_all(&lower, " ");
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Significant query terms: lowercase, edge punctuation stripped, at least
/// two characters, not a stop word. Order and first occurrence preserved.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| w.chars().count() >= 2 && !is_stop_word(w))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

/// Most frequent non-stop words; ties keep first-seen order.
fn corpus_keywords(content: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, word) in tokenize(content).into_iter().enumerate() {
        if word.len() < 2 || is_stop_word(&word) {
            continue;
        }
        counts.entry(word).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));
    ranked.into_iter().take(limit).map(|(w, _)| w).collect()
}

/// Query terms first, then corpus keywords, deduplicated and capped.
pub fn extract_keywords(content: &str, query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query_terms(query)
        .into_iter()
        .chain(corpus_keywords(content, CORPUS_KEYWORDS))
        .filter(|w| seen.insert(w.clone()))
        .take(MAX_KEYWORDS)
        .collect()
}
