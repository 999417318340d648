//! Annotation cache.
//!
//! [`AnnotationCache`] maps each document identity to the annotation set
//! produced by its most recent completed scan. It is the only owner of
//! [`DecorationHandle`]s: readers get handle-free [`ResolvedAnnotation`]
//! copies, so a handle can never outlive the record that owns it.
//!
//! # Release ordering
//!
//! Replacing or clearing a set releases every handle of the outgoing set
//! before the incoming records are installed, under a single lock
//! acquisition. Readers observe either the old set or the new one.
//!
//! # Generations
//!
//! Scans stamp themselves with a [`ScanTicket`] when they start. A set
//! remembers the generation that installed it; [`AnnotationCache::replace_if_current`]
//! refuses tickets older than that, so a slow scan cannot overwrite a fresher
//! one and a scan started before a document was reopened cannot resurrect
//! annotations that [`AnnotationCache::clear`] dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glimpse_primitives::{DocPosition, DocRange, DocumentUri, ViewId};
use glimpse_worker::GenerationClock;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::host::{DecorationId, DecorationRenderer, RenderRequest};

/// Exclusive owner of one renderer resource.
///
/// The resource is released exactly once: by [`release`](Self::release) or,
/// failing that, on drop.
pub struct DecorationHandle {
	id: DecorationId,
	renderer: Option<Arc<dyn DecorationRenderer>>,
}

impl DecorationHandle {
	/// Asks `renderer` for a new resource and takes ownership of it.
	pub fn acquire(renderer: &Arc<dyn DecorationRenderer>, request: RenderRequest<'_>) -> Self {
		let id = renderer.render(request);
		trace!(id = id.0, attached = ?request.attach_to, "preview.decoration.acquire");
		Self {
			id,
			renderer: Some(Arc::clone(renderer)),
		}
	}

	/// Renderer-side identifier.
	pub fn id(&self) -> DecorationId {
		self.id
	}

	/// Releases the resource now.
	pub fn release(mut self) {
		self.release_now();
	}

	fn release_now(&mut self) {
		if let Some(renderer) = self.renderer.take() {
			trace!(id = self.id.0, "preview.decoration.release");
			renderer.release(self.id);
		}
	}
}

impl Drop for DecorationHandle {
	fn drop(&mut self) {
		self.release_now();
	}
}

impl fmt::Debug for DecorationHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DecorationHandle")
			.field("id", &self.id)
			.field("live", &self.renderer.is_some())
			.finish()
	}
}

/// One image reference in one document, as rendered for one view.
#[derive(Debug)]
pub struct AnnotationRecord {
	range: DocRange,
	view: ViewId,
	display_path: String,
	original_path: String,
	handle: DecorationHandle,
}

impl AnnotationRecord {
	pub fn new(range: DocRange, view: ViewId, display_path: String, original_path: String, handle: DecorationHandle) -> Self {
		Self {
			range,
			view,
			display_path,
			original_path,
			handle,
		}
	}

	pub fn range(&self) -> DocRange {
		self.range
	}

	pub fn view(&self) -> ViewId {
		self.view
	}

	pub fn display_path(&self) -> &str {
		&self.display_path
	}

	pub fn original_path(&self) -> &str {
		&self.original_path
	}

	pub fn decoration(&self) -> DecorationId {
		self.handle.id()
	}

	/// Handle-free copy for readers outside the cache.
	pub fn resolved(&self) -> ResolvedAnnotation {
		ResolvedAnnotation {
			range: self.range,
			view: self.view,
			display_path: self.display_path.clone(),
			original_path: self.original_path.clone(),
		}
	}
}

/// Copy of an [`AnnotationRecord`] without its renderer resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAnnotation {
	pub range: DocRange,
	pub view: ViewId,
	pub display_path: String,
	pub original_path: String,
}

/// Ordered annotation records for one document.
#[derive(Debug, Default)]
pub struct DocumentAnnotationSet {
	records: Vec<AnnotationRecord>,
	generation: u64,
}

impl DocumentAnnotationSet {
	pub fn records(&self) -> &[AnnotationRecord] {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Generation of the scan or clear that produced this set.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// First record, in insertion order, whose range contains `pos`.
	pub fn find(&self, pos: DocPosition) -> Option<&AnnotationRecord> {
		self.records.iter().find(|record| record.range.contains(pos))
	}

	fn release_all(&mut self) -> usize {
		let released = self.records.len();
		for record in self.records.drain(..) {
			record.handle.release();
		}
		released
	}

	fn install(&mut self, records: Vec<AnnotationRecord>, generation: u64) -> usize {
		let released = self.release_all();
		self.records = records;
		self.generation = generation;
		released
	}
}

/// Point-in-time copy of a document's annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSnapshot {
	pub generation: u64,
	pub annotations: Vec<ResolvedAnnotation>,
}

/// Proof that a scan started at a given generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTicket {
	uri: DocumentUri,
	generation: u64,
}

impl ScanTicket {
	pub fn uri(&self) -> &DocumentUri {
		&self.uri
	}

	pub fn generation(&self) -> u64 {
		self.generation
	}
}

/// Result of [`AnnotationCache::replace_if_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
	/// The records were installed.
	Installed {
		/// Handles released from the previous set.
		released: usize,
		/// Records now cached.
		installed: usize,
	},
	/// A newer scan or clear already landed; the records were discarded.
	Stale {
		/// Generation of the set that was kept.
		current: u64,
	},
}

/// Registry of annotation sets keyed by document identity.
pub struct AnnotationCache {
	entries: Mutex<Entries>,
	clock: GenerationClock,
}

/// Sets plus the generations at which documents were forgotten.
#[derive(Default)]
struct Entries {
	sets: HashMap<DocumentUri, DocumentAnnotationSet>,
	/// Generation of the last `remove` per document without a set.
	removed: HashMap<DocumentUri, u64>,
	/// Generation of the last `clear_all`.
	cleared_all: u64,
}

impl Entries {
	/// Oldest generation a scan of `uri` must carry to install into a missing set.
	fn floor(&self, uri: &DocumentUri) -> u64 {
		self.removed.get(uri).copied().unwrap_or(0).max(self.cleared_all)
	}

	/// Returns the set for `uri`, creating one stamped at the document's floor.
	fn entry(&mut self, uri: &DocumentUri) -> &mut DocumentAnnotationSet {
		let floor = self.floor(uri);
		self.removed.remove(uri);
		self.sets.entry(uri.clone()).or_insert_with(|| DocumentAnnotationSet {
			records: Vec::new(),
			generation: floor,
		})
	}
}

impl Default for AnnotationCache {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for AnnotationCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AnnotationCache")
			.field("documents", &self.document_count())
			.field("generation", &self.clock.current())
			.finish()
	}
}

impl AnnotationCache {
	pub fn new() -> Self {
		Self {
			entries: Mutex::new(Entries::default()),
			clock: GenerationClock::new(),
		}
	}

	/// Returns the document's annotations, creating an empty set if absent.
	pub fn get_or_create(&self, uri: &DocumentUri) -> AnnotationSnapshot {
		let mut entries = self.entries.lock();
		snapshot_of(entries.entry(uri))
	}

	/// Returns the document's annotations without creating a set.
	pub fn snapshot(&self, uri: &DocumentUri) -> Option<AnnotationSnapshot> {
		self.entries.lock().sets.get(uri).map(snapshot_of)
	}

	/// Runs `f` against the document's set while holding the cache lock.
	///
	/// `f` must not call back into the cache.
	pub fn with_set<R>(&self, uri: &DocumentUri, f: impl FnOnce(&DocumentAnnotationSet) -> R) -> Option<R> {
		self.entries.lock().sets.get(uri).map(f)
	}

	/// Stamps the start of a scan for `uri`.
	pub fn begin_scan(&self, uri: &DocumentUri) -> ScanTicket {
		ScanTicket {
			uri: uri.clone(),
			generation: self.clock.next(),
		}
	}

	/// Releases the current set's handles and installs `records`, unconditionally.
	///
	/// Returns the number of handles released.
	pub fn replace(&self, uri: &DocumentUri, records: Vec<AnnotationRecord>) -> usize {
		let installed = records.len();
		let generation = self.clock.next();
		let released = self.entries.lock().entry(uri).install(records, generation);
		debug!(uri = %uri, released, installed, generation, "preview.cache.replace");
		released
	}

	/// Installs `records` unless a newer scan, clear, or removal already
	/// happened for the document.
	///
	/// Discarded records release their own handles. An empty result for a
	/// document the cache does not know leaves the cache untouched.
	pub fn replace_if_current(&self, ticket: &ScanTicket, records: Vec<AnnotationRecord>) -> ReplaceOutcome {
		let installed = records.len();
		let (outcome, rejected) = {
			let mut entries = self.entries.lock();
			let current = match entries.sets.get(&ticket.uri) {
				Some(set) => set.generation,
				None => entries.floor(&ticket.uri),
			};
			if current > ticket.generation {
				(ReplaceOutcome::Stale { current }, records)
			} else if records.is_empty() && !entries.sets.contains_key(&ticket.uri) {
				(ReplaceOutcome::Installed { released: 0, installed: 0 }, Vec::new())
			} else {
				let released = entries.entry(&ticket.uri).install(records, ticket.generation);
				(ReplaceOutcome::Installed { released, installed }, Vec::new())
			}
		};

		match outcome {
			ReplaceOutcome::Installed { released, installed } => {
				debug!(uri = %ticket.uri, released, installed, generation = ticket.generation, "preview.cache.replace");
			}
			ReplaceOutcome::Stale { current } => {
				debug!(
					uri = %ticket.uri,
					discarded = rejected.len(),
					generation = ticket.generation,
					current,
					"preview.cache.stale_scan"
				);
			}
		}
		drop(rejected);
		outcome
	}

	/// Releases the document's handles and leaves an empty set behind.
	///
	/// Scans that started before the clear can no longer install results.
	pub fn clear(&self, uri: &DocumentUri) -> usize {
		let generation = self.clock.next();
		let released = self.entries.lock().entry(uri).install(Vec::new(), generation);
		debug!(uri = %uri, released, generation, "preview.cache.clear");
		released
	}

	/// Releases the document's handles and forgets the document.
	///
	/// Scans that started before the removal can no longer install results.
	pub fn remove(&self, uri: &DocumentUri) -> usize {
		let generation = self.clock.next();
		let removed = {
			let mut entries = self.entries.lock();
			entries.removed.insert(uri.clone(), generation);
			entries.sets.remove(uri)
		};
		let released = removed.map_or(0, |mut set| set.release_all());
		debug!(uri = %uri, released, generation, "preview.cache.remove");
		released
	}

	/// Releases every handle and forgets every document.
	///
	/// Scans that started before the call can no longer install results.
	pub fn clear_all(&self) -> usize {
		let generation = self.clock.next();
		let drained: Vec<_> = {
			let mut entries = self.entries.lock();
			entries.cleared_all = generation;
			entries.removed.clear();
			entries.sets.drain().collect()
		};
		let documents = drained.len();
		let released = drained.into_iter().map(|(_, mut set)| set.release_all()).sum();
		debug!(documents, released, generation, "preview.cache.clear_all");
		released
	}

	/// Number of records cached for `uri`.
	pub fn record_count(&self, uri: &DocumentUri) -> usize {
		self.entries.lock().sets.get(uri).map_or(0, DocumentAnnotationSet::len)
	}

	/// Number of documents with a set, including empty ones.
	pub fn document_count(&self) -> usize {
		self.entries.lock().sets.len()
	}

	/// Number of records across all documents.
	pub fn total_records(&self) -> usize {
		self.entries.lock().sets.values().map(DocumentAnnotationSet::len).sum()
	}
}

fn snapshot_of(set: &DocumentAnnotationSet) -> AnnotationSnapshot {
	AnnotationSnapshot {
		generation: set.generation,
		annotations: set.records.iter().map(AnnotationRecord::resolved).collect(),
	}
}
