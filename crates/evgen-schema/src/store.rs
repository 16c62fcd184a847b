//! # Document Store
//!
//! Keyed, memoizing loader for schema documents. The store knows the set of
//! enumerated documents up front and parses each one at most once, on first
//! request. It performs no reference handling and no merging.
//!
//! ## Concurrency
//!
//! Parsed trees live behind a `parking_lot::RwLock` and are handed out as
//! `Arc`s, so a populated store is a read-mostly cache that can be shared
//! across threads. [`DocumentStore::preload`] parses every enumerated
//! document in parallel before composition starts.
//!
//! ## Sources
//!
//! Reading text is delegated to a [`DocumentSource`]. [`FsSource`] reads
//! from disk; [`MemorySource`] serves documents held in memory and is what
//! the tests use.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use evgen_core::{parse_document, DocumentFormat, DocumentPath, SchemaTree};
use parking_lot::RwLock;

use crate::error::ComposeError;

/// Where document text comes from.
pub trait DocumentSource: Send + Sync {
    /// Read the full text of the document at `path`.
    fn read(&self, path: &DocumentPath) -> std::io::Result<String>;
}

/// Reads documents from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSource;

impl DocumentSource for FsSource {
    fn read(&self, path: &DocumentPath) -> std::io::Result<String> {
        std::fs::read_to_string(path.as_path())
    }
}

/// Serves documents from memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    documents: HashMap<DocumentPath, String>,
}

impl MemorySource {
    /// Empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document.
    pub fn insert(&mut self, path: DocumentPath, text: impl Into<String>) {
        self.documents.insert(path, text.into());
    }

    /// Paths of all held documents.
    pub fn paths(&self) -> impl Iterator<Item = &DocumentPath> {
        self.documents.keys()
    }
}

impl DocumentSource for MemorySource {
    fn read(&self, path: &DocumentPath) -> std::io::Result<String> {
        self.documents.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no in-memory document at {path}"),
            )
        })
    }
}

/// Enumerate the files matching a glob pattern as document keys.
///
/// Directories are skipped. The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns [`ComposeError::Glob`] for a malformed pattern and
/// [`ComposeError::Load`] if a matched entry cannot be read or its path
/// cannot be made absolute.
pub fn enumerate(pattern: &str) -> Result<Vec<DocumentPath>, ComposeError> {
    let entries = glob::glob(pattern).map_err(|e| ComposeError::Glob {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut paths = BTreeSet::new();
    for entry in entries {
        let entry = entry.map_err(|e| ComposeError::Glob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        if entry.is_dir() {
            continue;
        }
        let path = DocumentPath::from_fs(&entry).map_err(|e| ComposeError::Glob {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        paths.insert(path);
    }

    tracing::debug!(pattern, count = paths.len(), "enumerated schema documents");
    Ok(paths.into_iter().collect())
}

/// Memoizing document store over a fixed set of enumerated documents.
pub struct DocumentStore<S = FsSource> {
    source: S,
    known: BTreeSet<DocumentPath>,
    cache: RwLock<HashMap<DocumentPath, Arc<SchemaTree>>>,
}

impl<S> std::fmt::Debug for DocumentStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("documents", &self.known.len())
            .field("loaded", &self.cache.read().len())
            .finish()
    }
}

impl DocumentStore<FsSource> {
    /// Enumerate `pattern` on the filesystem and build a store over the matches.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NoDocuments`] if nothing matched.
    pub fn from_glob(pattern: &str) -> Result<Self, ComposeError> {
        let paths = enumerate(pattern)?;
        if paths.is_empty() {
            return Err(ComposeError::NoDocuments {
                pattern: pattern.to_string(),
            });
        }
        Ok(Self::new(FsSource, paths))
    }
}

impl DocumentStore<MemorySource> {
    /// Build a store serving every document held by `source`.
    pub fn in_memory(source: MemorySource) -> Self {
        let paths: Vec<DocumentPath> = source.paths().cloned().collect();
        Self::new(source, paths)
    }
}

impl<S: DocumentSource> DocumentStore<S> {
    /// Create a store over `paths`, reading through `source`.
    pub fn new(source: S, paths: impl IntoIterator<Item = DocumentPath>) -> Self {
        Self {
            source,
            known: paths.into_iter().collect(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Whether `path` is an enumerated document.
    pub fn contains(&self, path: &DocumentPath) -> bool {
        self.known.contains(path)
    }

    /// Enumerated document paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &DocumentPath> {
        self.known.iter()
    }

    /// Number of enumerated documents.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Returns true if no documents were enumerated.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Number of documents parsed so far.
    pub fn loaded_count(&self) -> usize {
        self.cache.read().len()
    }

    /// Load and parse the document at `path`, or return the memoized tree.
    ///
    /// # Errors
    ///
    /// Returns [`ComposeError::NotEnumerated`] for unknown paths,
    /// [`ComposeError::Load`] if the source cannot read the document, and
    /// [`ComposeError::Parse`] if the text is malformed.
    pub fn load(&self, path: &DocumentPath) -> Result<Arc<SchemaTree>, ComposeError> {
        if let Some(tree) = self.cache.read().get(path) {
            return Ok(Arc::clone(tree));
        }
        if !self.known.contains(path) {
            return Err(ComposeError::NotEnumerated { path: path.clone() });
        }

        let text = self.source.read(path).map_err(|e| ComposeError::Load {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let format = DocumentFormat::from_extension(path.extension());
        let tree = parse_document(&text, format).map_err(|cause| ComposeError::Parse {
            path: path.clone(),
            cause,
        })?;
        tracing::debug!(path = %path, "loaded schema document");

        // Another thread may have parsed the same document meanwhile; keep the first.
        let mut cache = self.cache.write();
        let entry = cache
            .entry(path.clone())
            .or_insert_with(|| Arc::new(tree));
        Ok(Arc::clone(entry))
    }

    /// Parse every enumerated document, spreading the work over scoped threads.
    ///
    /// Returns the number of documents parsed by this call. The first error
    /// (in path order) is returned; documents parsed before it stay cached.
    pub fn preload(&self) -> Result<usize, ComposeError> {
        let pending: Vec<&DocumentPath> = {
            let cache = self.cache.read();
            self.known.iter().filter(|p| !cache.contains_key(*p)).collect()
        };
        if pending.is_empty() {
            return Ok(0);
        }

        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .min(pending.len());
        let batch_size = pending.len().div_ceil(workers);

        std::thread::scope(|scope| {
            let handles: Vec<_> = pending
                .chunks(batch_size)
                .map(|batch| {
                    scope.spawn(move || batch.iter().try_for_each(|p| self.load(p).map(drop)))
                })
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(result) => result?,
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            Ok::<(), ComposeError>(())
        })?;

        tracing::debug!(count = pending.len(), "preloaded schema documents");
        Ok(pending.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> DocumentPath {
        DocumentPath::new(p).unwrap()
    }

    fn sample_source() -> MemorySource {
        let mut source = MemorySource::new();
        source.insert(path("/s/BaseType.yml"), "title: BaseType\ntype: object\n");
        source.insert(path("/s/raw.json"), r#"{"title": "raw", "type": "object"}"#);
        source.insert(path("/s/broken.yml"), "title: [unclosed\n");
        source
    }

    #[test]
    fn test_load_parses_yaml_and_json() {
        let store = DocumentStore::in_memory(sample_source());
        let base = store.load(&path("/s/BaseType.yml")).unwrap();
        assert_eq!(*base, json!({"title": "BaseType", "type": "object"}));
        let raw = store.load(&path("/s/raw.json")).unwrap();
        assert_eq!(raw["title"], "raw");
    }

    #[test]
    fn test_load_is_memoized() {
        let store = DocumentStore::in_memory(sample_source());
        let a = store.load(&path("/s/BaseType.yml")).unwrap();
        let b = store.load(&path("/s/BaseType.yml")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.loaded_count(), 1);
    }

    #[test]
    fn test_load_unknown_path() {
        let store = DocumentStore::in_memory(sample_source());
        let err = store.load(&path("/s/Nope.yml")).unwrap_err();
        assert!(matches!(err, ComposeError::NotEnumerated { .. }));
    }

    #[test]
    fn test_load_parse_error_names_document() {
        let store = DocumentStore::in_memory(sample_source());
        let err = store.load(&path("/s/broken.yml")).unwrap_err();
        match err {
            ComposeError::Parse { path: p, .. } => assert_eq!(p.as_str(), "/s/broken.yml"),
            other => panic!("expected Parse, got: {other}"),
        }
    }

    #[test]
    fn test_enumerated_but_unreadable() {
        let store = DocumentStore::new(MemorySource::new(), [path("/s/ghost.yml")]);
        let err = store.load(&path("/s/ghost.yml")).unwrap_err();
        assert!(matches!(err, ComposeError::Load { .. }));
    }

    #[test]
    fn test_preload_parses_everything_or_fails() {
        let mut source = MemorySource::new();
        for i in 0..16 {
            source.insert(path(&format!("/s/e{i}.yml")), format!("title: event {i}\n"));
        }
        let store = DocumentStore::in_memory(source);
        assert_eq!(store.preload().unwrap(), 16);
        assert_eq!(store.loaded_count(), 16);
        assert_eq!(store.preload().unwrap(), 0);

        let failing = DocumentStore::in_memory(sample_source());
        assert!(matches!(
            failing.preload().unwrap_err(),
            ComposeError::Parse { .. }
        ));
    }

    #[test]
    fn test_enumerate_glob_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("events");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(tmp.path().join("BaseType.yml"), "title: BaseType\n").unwrap();
        std::fs::write(nested.join("Post.yml"), "title: sends a post\n").unwrap();
        std::fs::write(nested.join("notes.txt"), "ignored").unwrap();

        let pattern = format!("{}/**/*.yml", tmp.path().display());
        let paths = enumerate(&pattern).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.as_str().ends_with("/events/Post.yml")));

        let store = DocumentStore::from_glob(&pattern).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_from_glob_without_matches() {
        let tmp = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.yml", tmp.path().display());
        let err = DocumentStore::from_glob(&pattern).unwrap_err();
        assert!(matches!(err, ComposeError::NoDocuments { .. }));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        let err = enumerate("schemas/[").unwrap_err();
        assert!(matches!(err, ComposeError::Glob { .. }));
    }
}
