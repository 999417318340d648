//! Cursor position to annotation lookup.

use std::sync::Arc;

use glimpse_primitives::{DocPosition, DocumentUri};

use crate::cache::{AnnotationCache, AnnotationRecord, ResolvedAnnotation};

/// Maps a cursor position back to the cached annotation under it.
#[derive(Debug, Clone)]
pub struct PositionResolver {
	cache: Arc<AnnotationCache>,
}

impl PositionResolver {
	pub fn new(cache: Arc<AnnotationCache>) -> Self {
		Self { cache }
	}

	/// Returns the first annotation of `uri`, in insertion order, whose range contains `position`.
	pub fn resolve(&self, uri: &DocumentUri, position: DocPosition) -> Option<ResolvedAnnotation> {
		self.cache
			.with_set(uri, |set| set.find(position).map(AnnotationRecord::resolved))
			.flatten()
	}
}
