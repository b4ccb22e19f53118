//! Content-addressed result cache.
//!
//! Entries are keyed by the sha256 of a canonical JSON rendering of the
//! request, so two writers racing on one key write the same bytes.

use crate::config::Settings;
use crate::error::ProviderError;
use crate::historical::round2;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CACHE_EXTENSION: &str = "cache";

/// Cleanup trims the cache to this share of the size cap.
const EVICTION_TARGET: f64 = 0.8;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<CacheError> for ProviderError {
    fn from(err: CacheError) -> Self {
        ProviderError::Cache(err.to_string())
    }
}

/// Cache partitions, one subdirectory each on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Search,
    Content,
    Summaries,
    Images,
}

impl CacheKind {
    pub const ALL: [CacheKind; 4] = [
        CacheKind::Search,
        CacheKind::Content,
        CacheKind::Summaries,
        CacheKind::Images,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            CacheKind::Search => "search",
            CacheKind::Content => "content",
            CacheKind::Summaries => "summaries",
            CacheKind::Images => "images",
        }
    }
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for CacheKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheKind::ALL
            .into_iter()
            .find(|k| k.dir_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown cache kind '{}'", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindStats {
    pub files: usize,
    pub bytes: u64,
    pub size_mb: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub by_kind: BTreeMap<CacheKind, KindStats>,
    pub total_files: usize,
    pub total_size_mb: f64,
    pub max_size_mb: f64,
    pub expiry_hours: f64,
}

impl CacheStats {
    fn from_counts(counts: BTreeMap<CacheKind, (usize, u64)>, ttl: Duration, max_bytes: u64) -> Self {
        let mut stats = CacheStats {
            max_size_mb: round2(max_bytes as f64 / BYTES_PER_MB),
            expiry_hours: round2(ttl.as_secs_f64() / 3600.0),
            ..CacheStats::default()
        };
        let mut total_bytes = 0u64;
        for kind in CacheKind::ALL {
            let (files, bytes) = counts.get(&kind).copied().unwrap_or((0, 0));
            stats.total_files += files;
            total_bytes += bytes;
            stats.by_kind.insert(
                kind,
                KindStats {
                    files,
                    bytes,
                    size_mb: round2(bytes as f64 / BYTES_PER_MB),
                },
            );
        }
        stats.total_size_mb = round2(total_bytes as f64 / BYTES_PER_MB);
        stats
    }
}

/// Byte-level storage behind `CacheLayer`.
#[async_trait]
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Payload stored under `key`, unless missing or expired.
    async fn get(&self, kind: CacheKind, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    async fn put(&self, kind: CacheKind, key: &str, payload: Vec<u8>) -> Result<(), CacheError>;

    async fn remove(&self, kind: CacheKind, key: &str) -> Result<(), CacheError>;

    /// Drop every entry of `kind`, or of all kinds. Returns the count removed.
    async fn clear(&self, kind: Option<CacheKind>) -> Result<usize, CacheError>;

    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

/// Files under `<root>/<kind>/<key>.cache`, expired by mtime.
#[derive(Debug)]
pub struct DiskCache {
    root: PathBuf,
    ttl: Duration,
    max_bytes: u64,
}

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

struct CachedFile {
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

impl DiskCache {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            ttl,
            max_bytes,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.resolved_cache_dir(),
            settings.cache_ttl(),
            settings.cache_max_bytes(),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, kind: CacheKind, key: &str) -> PathBuf {
        self.root
            .join(kind.dir_name())
            .join(format!("{}.{}", key, CACHE_EXTENSION))
    }

    fn is_expired(&self, modified: SystemTime) -> bool {
        match modified.elapsed() {
            Ok(age) => age >= self.ttl,
            // mtime in the future: treat as fresh
            Err(_) => false,
        }
    }

    async fn list(&self, kind: CacheKind) -> Result<Vec<CachedFile>, CacheError> {
        let dir = self.root.join(kind.dir_name());
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            let meta = entry.metadata().await?;
            files.push(CachedFile {
                path,
                size: meta.len(),
                modified: meta.modified()?,
            });
        }
        Ok(files)
    }

    /// Remove expired entries, then the oldest ones while over the size cap.
    pub async fn cleanup(&self) -> Result<usize, CacheError> {
        let mut live = Vec::new();
        let mut removed = 0usize;
        let mut total = 0u64;
        for kind in CacheKind::ALL {
            for file in self.list(kind).await? {
                if self.is_expired(file.modified) {
                    remove_quietly(&file.path).await;
                    removed += 1;
                } else {
                    total += file.size;
                    live.push(file);
                }
            }
        }

        if total > self.max_bytes {
            let target = (self.max_bytes as f64 * EVICTION_TARGET) as u64;
            live.sort_by_key(|f| f.modified);
            for file in live {
                if total <= target {
                    break;
                }
                remove_quietly(&file.path).await;
                total = total.saturating_sub(file.size);
                removed += 1;
            }
        }

        if removed > 0 {
            info!(target: "scout.cache", removed, total_bytes = total, "cache cleanup");
        }
        Ok(removed)
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(target: "scout.cache", path = %path.display(), error = %err, "failed to remove cache file");
        }
    }
}

#[async_trait]
impl CacheStore for DiskCache {
    async fn get(&self, kind: CacheKind, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let path = self.entry_path(kind, key);
        let meta = match fs::metadata(&path).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if self.is_expired(meta.modified()?) {
            debug!(target: "scout.cache", %kind, key, "cache entry expired");
            remove_quietly(&path).await;
            return Ok(None);
        }
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, kind: CacheKind, key: &str, payload: Vec<u8>) -> Result<(), CacheError> {
        let path = self.entry_path(kind, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        // write-then-rename so readers never see a half-written entry
        let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp = path.with_extension(format!("{}.{}.tmp", std::process::id(), seq));
        fs::write(&tmp, &payload).await?;
        if let Err(err) = fs::rename(&tmp, &path).await {
            remove_quietly(&tmp).await;
            return Err(err.into());
        }
        debug!(target: "scout.cache", %kind, key, bytes = payload.len(), "wrote cache entry");
        self.cleanup().await?;
        Ok(())
    }

    async fn remove(&self, kind: CacheKind, key: &str) -> Result<(), CacheError> {
        remove_quietly(&self.entry_path(kind, key)).await;
        Ok(())
    }

    async fn clear(&self, kind: Option<CacheKind>) -> Result<usize, CacheError> {
        let kinds: Vec<CacheKind> = match kind {
            Some(kind) => vec![kind],
            None => CacheKind::ALL.to_vec(),
        };
        let mut removed = 0;
        for kind in kinds {
            for file in self.list(kind).await? {
                remove_quietly(&file.path).await;
                removed += 1;
            }
        }
        info!(target: "scout.cache", removed, "cache cleared");
        Ok(removed)
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let mut counts = BTreeMap::new();
        for kind in CacheKind::ALL {
            let files = self.list(kind).await?;
            let bytes = files.iter().map(|f| f.size).sum();
            counts.insert(kind, (files.len(), bytes));
        }
        Ok(CacheStats::from_counts(counts, self.ttl, self.max_bytes))
    }
}

/// In-process store for tests and `--no-cache`-style ephemeral runs.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(CacheKind, String), (Instant, Vec<u8>)>>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::config::DEFAULT_CACHE_EXPIRY_HOURS * 3600))
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, kind: CacheKind, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(kind, key.to_string()))
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, bytes)| bytes.clone()))
    }

    async fn put(&self, kind: CacheKind, key: &str, payload: Vec<u8>) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
        entries.insert((kind, key.to_string()), (Instant::now(), payload));
        Ok(())
    }

    async fn remove(&self, kind: CacheKind, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(&(kind, key.to_string()));
        Ok(())
    }

    async fn clear(&self, kind: Option<CacheKind>) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        match kind {
            Some(kind) => entries.retain(|(k, _), _| *k != kind),
            None => entries.clear(),
        }
        Ok(before - entries.len())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let entries = self.entries.read().await;
        let mut counts: BTreeMap<CacheKind, (usize, u64)> = BTreeMap::new();
        for ((kind, _), (_, bytes)) in entries.iter() {
            let slot = counts.entry(*kind).or_default();
            slot.0 += 1;
            slot.1 += bytes.len() as u64;
        }
        Ok(CacheStats::from_counts(counts, self.ttl, u64::MAX))
    }
}

/// Rebuild objects with sorted keys so the rendering is independent of
/// insertion order.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect::<Map<String, Value>>())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Key for `request` within `kind`: sha256 hex of canonical JSON.
pub fn cache_key<T: Serialize + ?Sized>(kind: CacheKind, request: &T) -> Result<String, CacheError> {
    let request = serde_json::to_value(request)?;
    let envelope = canonicalize(json!({ "kind": kind.dir_name(), "request": request }));
    Ok(sha256_hex(envelope.to_string().as_bytes()))
}

/// Stable hash of a document list, used to key summaries of that list.
pub fn content_hash<T: Serialize>(documents: &[T]) -> Result<String, CacheError> {
    let value = canonicalize(serde_json::to_value(documents)?);
    Ok(sha256_hex(value.to_string().as_bytes()))
}

/// Typed, failure-absorbing front end over a `CacheStore`.
///
/// Cache problems never fail a call: read errors are misses and write
/// errors are logged.
#[derive(Debug, Clone)]
pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn disk(settings: &Settings) -> Self {
        Self::new(Arc::new(DiskCache::from_settings(settings)))
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryCache::default()))
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub async fn get_bytes(&self, kind: CacheKind, key: &str) -> Option<Vec<u8>> {
        match self.store.get(kind, key).await {
            Ok(Some(bytes)) => {
                debug!(target: "scout.cache", %kind, key, "cache hit");
                Some(bytes)
            }
            Ok(None) => {
                debug!(target: "scout.cache", %kind, key, "cache miss");
                None
            }
            Err(err) => {
                warn!(target: "scout.cache", %kind, key, error = %err, "cache read failed");
                None
            }
        }
    }

    pub async fn put_bytes(&self, kind: CacheKind, key: &str, payload: Vec<u8>) {
        if let Err(err) = self.store.put(kind, key, payload).await {
            warn!(target: "scout.cache", %kind, key, error = %err, "cache write failed");
        }
    }

    /// Decode the entry under `key`. Entries that fail to decode are
    /// deleted and reported as a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, kind: CacheKind, key: &str) -> Option<T> {
        let bytes = self.get_bytes(kind, key).await?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(target: "scout.cache", %kind, key, error = %err, "corrupt cache entry dropped");
                if let Err(err) = self.store.remove(kind, key).await {
                    warn!(target: "scout.cache", %kind, key, error = %err, "failed to drop cache entry");
                }
                None
            }
        }
    }

    pub async fn put_json<T: Serialize + ?Sized>(&self, kind: CacheKind, key: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.put_bytes(kind, key, bytes).await,
            Err(err) => {
                warn!(target: "scout.cache", %kind, key, error = %err, "cache payload not serializable")
            }
        }
    }

    pub async fn clear(&self, kind: Option<CacheKind>) -> Result<usize, CacheError> {
        self.store.clear(kind).await
    }

    pub async fn stats(&self) -> Result<CacheStats, CacheError> {
        self.store.stats().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DAY: Duration = Duration::from_secs(24 * 3600);

    #[tokio::test]
    async fn test_disk_round_trip_is_byte_identical() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), DAY, 1024 * 1024);
        let payload = vec![0u8, 159, 146, 150, b'\n', 255];

        cache.put(CacheKind::Search, "k1", payload.clone()).await.unwrap();
        let read = cache.get(CacheKind::Search, "k1").await.unwrap();
        assert_eq!(read, Some(payload));
        assert!(dir.path().join("search").join("k1.cache").exists());
        assert_eq!(cache.get(CacheKind::Images, "k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disk_expired_entries_miss() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), Duration::ZERO, 1024 * 1024);
        // a zero TTL expires the entry as soon as cleanup runs
        cache.put(CacheKind::Content, "k", b"data".to_vec()).await.unwrap();
        assert_eq!(cache.get(CacheKind::Content, "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disk_evicts_oldest_over_cap() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), DAY, 100);
        for key in ["a", "b", "c"] {
            cache.put(CacheKind::Search, key, vec![1u8; 40]).await.unwrap();
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(cache.get(CacheKind::Search, "a").await.unwrap(), None);
        assert!(cache.get(CacheKind::Search, "b").await.unwrap().is_some());
        assert!(cache.get(CacheKind::Search, "c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_disk_clear_and_stats() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::new(dir.path(), DAY, 1024 * 1024);
        cache.put(CacheKind::Search, "a", vec![0; 10]).await.unwrap();
        cache.put(CacheKind::Images, "b", vec![0; 20]).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.by_kind[&CacheKind::Images].bytes, 20);
        assert_eq!(stats.expiry_hours, 24.0);
        assert_eq!(stats.max_size_mb, 1.0);

        assert_eq!(cache.clear(Some(CacheKind::Search)).await.unwrap(), 1);
        assert_eq!(cache.stats().await.unwrap().total_files, 1);
        assert_eq!(cache.clear(None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_layer_drops_corrupt_entries() {
        let layer = CacheLayer::memory();
        layer
            .put_bytes(CacheKind::Summaries, "k", b"not json".to_vec())
            .await;
        let value: Option<Vec<String>> = layer.get_json(CacheKind::Summaries, "k").await;
        assert!(value.is_none());
        assert!(layer.get_bytes(CacheKind::Summaries, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_layer_json_round_trip() {
        let layer = CacheLayer::memory();
        let hits = vec!["x".to_string(), "y".to_string()];
        layer.put_json(CacheKind::Search, "k", &hits).await;
        let read: Option<Vec<String>> = layer.get_json(CacheKind::Search, "k").await;
        assert_eq!(read, Some(hits));
    }

    #[test]
    fn test_cache_key_ignores_field_order() {
        let a = json!({"query": "rust", "params": {"limit": 5, "time": "week"}});
        let b = json!({"params": {"time": "week", "limit": 5}, "query": "rust"});
        let key_a = cache_key(CacheKind::Search, &a).unwrap();
        assert_eq!(key_a, cache_key(CacheKind::Search, &b).unwrap());
        assert_ne!(key_a, cache_key(CacheKind::Images, &a).unwrap());
        assert_eq!(key_a.len(), 64);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Summaries".parse::<CacheKind>(), Ok(CacheKind::Summaries));
        assert!("pictures".parse::<CacheKind>().is_err());
    }
}
