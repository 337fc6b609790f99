#![forbid(unsafe_code)]

//! Fetch collaborators for tree and leaf payloads.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ TreeSource                   │  what the store talks to
//! │  - JsonSource<T: Transport>  │  URL layout + JSON decoding
//! │  - MemorySource              │  in-memory, scripted failures
//! └──────────────────────────────┘
//!              │
//!              ▼
//! ┌──────────────────────────────┐
//! │ Transport                    │  moves bytes for a URL
//! │  - FileTransport             │  file:// and bare paths
//! │  - (embedder's HTTP client)  │
//! └──────────────────────────────┘
//! ```
//!
//! Sources are called from task threads, so both traits are `Send + Sync`.
//! Every failure comes back as a [`FetchError`] whose `Display` is the
//! message shown to the user.

use crate::config::SourceConfig;
use crate::error::{FetchError, FetchResult};
use arbor_core::{LeafPayload, TreeNodeData};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fetches whole-tree and per-leaf payloads.
pub trait TreeSource: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    fn fetch_tree(&self) -> FetchResult<Vec<TreeNodeData>>;

    fn fetch_leaf(&self, id: &str) -> FetchResult<LeafPayload>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────────────────────────────────────

/// Raw response from a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// `200 OK` with the given body.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_owned(),
            body: body.into(),
        }
    }

    /// Body-less response with the given status.
    #[must_use]
    pub fn with_status(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: Vec::new(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves the bytes behind a URL.
///
/// A transport only fails for transport-level problems. Non-success statuses
/// are returned as responses so the source can word the error.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> FetchResult<TransportResponse>;
}

/// Serves `file://` URLs and bare paths from the local filesystem.
///
/// A missing file is a `404 Not Found` response, not an error.
#[derive(Debug, Clone, Default)]
pub struct FileTransport;

impl FileTransport {
    /// Whether `url` is a `file://` URL or a bare path.
    #[must_use]
    pub fn can_serve(url: &str) -> bool {
        Self::path_for(url).is_ok()
    }

    fn path_for(url: &str) -> FetchResult<PathBuf> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if url.contains("://") {
            return Err(FetchError::Unavailable(format!(
                "file transport cannot serve {url}"
            )));
        }
        Ok(PathBuf::from(url))
    }
}

impl Transport for FileTransport {
    fn get(&self, url: &str) -> FetchResult<TransportResponse> {
        let path = Self::path_for(url)?;
        match std::fs::read(&path) {
            Ok(body) => Ok(TransportResponse::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "payload file missing");
                Ok(TransportResponse::with_status(404, "Not Found"))
            }
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// JsonSource
// ─────────────────────────────────────────────────────────────────────────────

/// JSON payloads at the URLs described by a [`SourceConfig`].
pub struct JsonSource<T> {
    config: SourceConfig,
    transport: T,
}

impl<T: Transport> JsonSource<T> {
    #[must_use]
    pub fn new(config: SourceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    #[must_use]
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn get_json<V: DeserializeOwned>(
        &self,
        url: &str,
        describe: impl FnOnce() -> String,
    ) -> FetchResult<V> {
        let response = self.transport.get(url)?;
        if !response.is_ok() {
            return Err(FetchError::status(
                response.status,
                format!("{}: {}", describe(), response.status_text),
            ));
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

impl JsonSource<FileTransport> {
    /// Local payloads laid out as `{dir}/data.json` and `{dir}/entries/{id}.json`.
    #[must_use]
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let tree_url = dir.join("data.json").display().to_string();
        let mut entry_base_url = dir.join("entries").display().to_string();
        entry_base_url.push(std::path::MAIN_SEPARATOR);
        Self::new(SourceConfig::new(tree_url, entry_base_url), FileTransport)
    }
}

impl<T: Transport> TreeSource for JsonSource<T> {
    fn name(&self) -> &str {
        "JsonSource"
    }

    fn fetch_tree(&self) -> FetchResult<Vec<TreeNodeData>> {
        self.get_json(&self.config.tree_url, || "Error fetching tree data".to_owned())
    }

    fn fetch_leaf(&self, id: &str) -> FetchResult<LeafPayload> {
        let url = self.config.entry_url(id);
        self.get_json(&url, || format!("Error fetching entry {id}"))
    }
}

impl<T> fmt::Debug for JsonSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSource")
            .field("config", &self.config)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MemorySource
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory source for tests and demos.
///
/// Failures can be queued per request kind; a queued failure is consumed by
/// the next matching call. Calls are counted so tests can check cache hits.
#[derive(Default)]
pub struct MemorySource {
    tree: Mutex<Vec<TreeNodeData>>,
    leaves: Mutex<HashMap<String, LeafPayload>>,
    tree_failures: Mutex<VecDeque<String>>,
    leaf_failures: Mutex<HashMap<String, VecDeque<String>>>,
    tree_calls: AtomicUsize,
    leaf_calls: AtomicUsize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `tree` from [`fetch_tree`](TreeSource::fetch_tree).
    #[must_use]
    pub fn with_tree(self, tree: Vec<TreeNodeData>) -> Self {
        *lock(&self.tree) = tree;
        self
    }

    /// Serve `payload` for leaf `id`.
    #[must_use]
    pub fn with_leaf(self, id: impl Into<String>, payload: LeafPayload) -> Self {
        lock(&self.leaves).insert(id.into(), payload);
        self
    }

    /// Make the next tree fetch fail with `message`.
    pub fn fail_next_tree(&self, message: impl Into<String>) {
        lock(&self.tree_failures).push_back(message.into());
    }

    /// Make the next fetch of leaf `id` fail with `message`.
    pub fn fail_next_leaf(&self, id: impl Into<String>, message: impl Into<String>) {
        lock(&self.leaf_failures)
            .entry(id.into())
            .or_default()
            .push_back(message.into());
    }

    #[must_use]
    pub fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn leaf_calls(&self) -> usize {
        self.leaf_calls.load(Ordering::SeqCst)
    }
}

// A panic while holding one of these locks leaves plain data behind, so
// recovering the guard is always safe.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl TreeSource for MemorySource {
    fn name(&self) -> &str {
        "MemorySource"
    }

    fn fetch_tree(&self) -> FetchResult<Vec<TreeNodeData>> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.tree_failures).pop_front() {
            return Err(FetchError::status(500, message));
        }
        Ok(lock(&self.tree).clone())
    }

    fn fetch_leaf(&self, id: &str) -> FetchResult<LeafPayload> {
        self.leaf_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = lock(&self.leaf_failures)
            .get_mut(id)
            .and_then(VecDeque::pop_front)
        {
            return Err(FetchError::status(500, message));
        }
        lock(&self.leaves).get(id).cloned().ok_or_else(|| {
            FetchError::status(404, format!("Error fetching entry {id}: Not Found"))
        })
    }
}

impl fmt::Debug for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySource")
            .field("leaves", &lock(&self.leaves).len())
            .field("tree_calls", &self.tree_calls())
            .field("leaf_calls", &self.leaf_calls())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedTransport(TransportResponse);

    impl Transport for FixedTransport {
        fn get(&self, _url: &str) -> FetchResult<TransportResponse> {
            Ok(self.0.clone())
        }
    }

    fn source(response: TransportResponse) -> JsonSource<FixedTransport> {
        JsonSource::new(SourceConfig::default(), FixedTransport(response))
    }

    #[test]
    fn tree_fetch_decodes_payload() {
        let src = source(TransportResponse::ok(
            r#"[{"id":"a","label":"A","children":[]}]"#,
        ));
        let tree = src.fetch_tree().unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn tree_fetch_status_message() {
        let src = source(TransportResponse::with_status(500, "Internal Server Error"));
        let err = src.fetch_tree().unwrap_err();
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(
            err.to_string(),
            "Error fetching tree data: Internal Server Error"
        );
    }

    #[test]
    fn leaf_fetch_status_message() {
        let src = source(TransportResponse::with_status(404, "Not Found"));
        let err = src.fetch_leaf("n1").unwrap_err();
        assert_eq!(err.to_string(), "Error fetching entry n1: Not Found");
    }

    #[test]
    fn leaf_fetch_decodes_payload() {
        let src = source(TransportResponse::ok(
            r#"{"description":"hello","createdBy":"ann"}"#,
        ));
        let leaf = src.fetch_leaf("n1").unwrap();
        assert_eq!(leaf.description, "hello");
        assert_eq!(leaf.created_by, "ann");
    }

    #[test]
    fn bad_json_is_decode_error() {
        let src = source(TransportResponse::ok("{not json"));
        assert!(matches!(src.fetch_tree(), Err(FetchError::Decode(_))));
    }

    #[test]
    fn file_transport_rejects_other_schemes() {
        let err = FileTransport.get("https://example.com/data.json").unwrap_err();
        assert!(matches!(err, FetchError::Unavailable(_)));
    }

    #[test]
    fn memory_source_failures_are_consumed() {
        let src = MemorySource::new().with_leaf("n1", LeafPayload::default());
        src.fail_next_leaf("n1", "boom");
        assert_eq!(src.fetch_leaf("n1").unwrap_err().to_string(), "boom");
        assert!(src.fetch_leaf("n1").is_ok());
        assert_eq!(src.leaf_calls(), 2);
        assert!(src.fetch_leaf("other").is_err());
    }

    #[test]
    fn memory_source_tree() {
        let src = MemorySource::new().with_tree(vec![TreeNodeData::new("x")]);
        src.fail_next_tree("down");
        assert!(src.fetch_tree().is_err());
        assert_eq!(src.fetch_tree().unwrap().len(), 1);
        assert_eq!(src.tree_calls(), 2);
    }
}
