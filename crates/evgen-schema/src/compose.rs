//! # Schema Composition
//!
//! Drives the resolution pipeline over the reference graph and produces one
//! self-contained schema per event.
//!
//! ## Algorithm
//!
//! For each enumerated document, depth first:
//!
//! 1. Load the raw tree from the [`DocumentStore`].
//! 2. Rewrite its `$ref`s to absolute keys, relative to its own directory.
//! 3. Resolve every document in its reference set first (step 1–5 applied
//!    recursively), collecting the results into a [`ResolutionMap`].
//! 4. Substitute every marker with its resolved content.
//! 5. Merge any `extends` base.
//!
//! Resolved documents are memoized in an arena keyed by [`DocumentPath`], so
//! a document reachable along several paths is resolved once. A document is
//! pushed onto an in-progress stack before its references are visited;
//! reaching a document that is already on the stack is a reference cycle.
//!
//! ## Failure
//!
//! Composition is fail-fast. The first missing reference, cycle, parse
//! failure, or malformed `extends` aborts the whole catalog.

use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap};

use evgen_core::{DocumentPath, SchemaTree, TITLE_KEY};

use crate::error::ComposeError;
use crate::merge::merge_extends;
use crate::resolve::{get_refs, resolve_reference_paths};
use crate::store::{DocumentSource, DocumentStore};
use crate::substitute::{substitute_refs, ResolutionMap};

/// A fully-resolved, inheritance-flattened event schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedEvent {
    /// Declared `title`, the event's display name.
    pub title: String,
    /// Document the event was declared in.
    pub source: DocumentPath,
    /// Resolved schema. Contains no reference markers and no `extends`.
    pub schema: SchemaTree,
}

/// Composed events keyed by title, in title order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCatalog {
    events: BTreeMap<String, ComposedEvent>,
}

impl EventCatalog {
    /// Look up an event by title.
    pub fn get(&self, title: &str) -> Option<&ComposedEvent> {
        self.events.get(title)
    }

    /// Events in title order.
    pub fn iter(&self) -> impl Iterator<Item = &ComposedEvent> {
        self.events.values()
    }

    /// Titles in order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the catalog holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn insert(&mut self, event: ComposedEvent) -> Result<(), ComposeError> {
        match self.events.entry(event.title.clone()) {
            btree_map::Entry::Occupied(existing) => Err(ComposeError::DuplicateTitle {
                title: event.title,
                first: existing.get().source.clone(),
                second: event.source,
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(event);
                Ok(())
            }
        }
    }
}

impl IntoIterator for EventCatalog {
    type Item = ComposedEvent;
    type IntoIter = btree_map::IntoValues<String, ComposedEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_values()
    }
}

/// Memoizing resolver over a [`DocumentStore`].
pub struct Composer<'s, S> {
    store: &'s DocumentStore<S>,
    resolved: HashMap<DocumentPath, SchemaTree>,
    in_progress: Vec<DocumentPath>,
}

impl<'s, S: DocumentSource> Composer<'s, S> {
    /// Create a composer reading from `store`.
    pub fn new(store: &'s DocumentStore<S>) -> Self {
        Self {
            store,
            resolved: HashMap::new(),
            in_progress: Vec::new(),
        }
    }

    /// Number of documents resolved so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Fully resolve one enumerated document.
    ///
    /// # Errors
    ///
    /// Any [`ComposeError`] raised while resolving the document or anything
    /// it transitively references.
    pub fn resolve(&mut self, path: &DocumentPath) -> Result<SchemaTree, ComposeError> {
        if !self.store.contains(path) {
            return Err(ComposeError::NotEnumerated { path: path.clone() });
        }
        self.resolve_document(path)
    }

    /// Absolute reference targets appearing directly in a document, without
    /// following them.
    pub fn direct_references(
        &self,
        path: &DocumentPath,
    ) -> Result<BTreeSet<DocumentPath>, ComposeError> {
        let raw = self.store.load(path)?;
        let tree = resolve_reference_paths(path.parent(), &raw);
        to_document_paths(path, get_refs(&tree))
    }

    /// Resolve every enumerated document and key the results by title.
    ///
    /// # Errors
    ///
    /// Fails on the first resolution error, on a document without a string
    /// `title`, and on two documents declaring the same title.
    pub fn compose_all(mut self) -> Result<EventCatalog, ComposeError> {
        let store = self.store;
        let mut catalog = EventCatalog::default();

        for path in store.paths() {
            let schema = self.resolve_document(path)?;
            let title = schema
                .get(TITLE_KEY)
                .and_then(|t| t.as_str())
                .ok_or_else(|| ComposeError::MissingTitle { path: path.clone() })?
                .to_string();
            catalog.insert(ComposedEvent {
                title,
                source: path.clone(),
                schema,
            })?;
        }

        tracing::info!(
            documents = store.len(),
            events = catalog.len(),
            "composed event catalog"
        );
        Ok(catalog)
    }

    fn resolve_document(&mut self, path: &DocumentPath) -> Result<SchemaTree, ComposeError> {
        if let Some(done) = self.resolved.get(path) {
            return Ok(done.clone());
        }
        if let Some(start) = self.in_progress.iter().position(|p| p == path) {
            let mut cycle = self.in_progress[start..].to_vec();
            cycle.push(path.clone());
            return Err(ComposeError::ReferenceCycle { cycle });
        }

        self.in_progress.push(path.clone());
        let result = self.resolve_uncached(path);
        self.in_progress.pop();

        let tree = result?;
        self.resolved.insert(path.clone(), tree.clone());
        Ok(tree)
    }

    fn resolve_uncached(&mut self, path: &DocumentPath) -> Result<SchemaTree, ComposeError> {
        let raw = self.store.load(path)?;
        let tree = resolve_reference_paths(path.parent(), &raw);
        let targets = to_document_paths(path, get_refs(&tree))?;

        let mut resolution = ResolutionMap::with_capacity(targets.len());
        for target in targets {
            if !self.store.contains(&target) {
                return Err(ComposeError::UnresolvedReference {
                    referrer: path.clone(),
                    target,
                });
            }
            let content = self.resolve_document(&target)?;
            resolution.insert(target, content);
        }

        let substituted = substitute_refs(&tree, &resolution);
        let merged = merge_extends(substituted, path)?;
        tracing::debug!(
            path = %path,
            references = resolution.len(),
            "resolved schema document"
        );
        Ok(merged)
    }
}

fn to_document_paths(
    referrer: &DocumentPath,
    refs: BTreeSet<String>,
) -> Result<BTreeSet<DocumentPath>, ComposeError> {
    refs.into_iter()
        .map(|reference| {
            DocumentPath::new(&reference).map_err(|cause| ComposeError::InvalidReference {
                referrer: referrer.clone(),
                reference,
                cause,
            })
        })
        .collect()
}
