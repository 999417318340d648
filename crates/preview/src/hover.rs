//! Hover payloads for image annotations.
//!
//! A hover shows the referenced image, capped at the configured maximum
//! height, and its pixel dimensions when the prober can tell. Probing never
//! fails the hover: a rejected, panicking, or timed-out probe yields the same
//! payload without the dimensions line.

use std::fmt::Write as _;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use glimpse_primitives::{DocPosition, DocRange, Document, HostVersion, word_range_at};
use tracing::{debug, trace};

use crate::cache::ResolvedAnnotation;
use crate::error::ProbeError;
use crate::host::{ConfigSource, EditorHost, ImageDimensions, ImageProber};
use crate::resolve::PositionResolver;

/// Displayable hover content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverPayload {
	/// Markdown body.
	pub contents: String,
	/// Range the hover is anchored to.
	pub range: DocRange,
}

/// Builds the markdown image reference for an annotation.
pub fn image_markdown(annotation: &ResolvedAnnotation, max_height: u64) -> String {
	format!(
		"![{}]({}|height={})",
		annotation.original_path, annotation.display_path, max_height
	)
}

/// Turns the annotation under the cursor into a hover payload.
#[derive(Clone)]
pub struct HoverResponder {
	host: Arc<dyn EditorHost>,
	config: Arc<dyn ConfigSource>,
	prober: Arc<dyn ImageProber>,
	resolver: PositionResolver,
	min_host_version: HostVersion,
	probe_timeout: Option<Duration>,
}

impl std::fmt::Debug for HoverResponder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HoverResponder")
			.field("min_host_version", &self.min_host_version)
			.field("probe_timeout", &self.probe_timeout)
			.finish_non_exhaustive()
	}
}

impl HoverResponder {
	pub fn new(
		host: Arc<dyn EditorHost>,
		config: Arc<dyn ConfigSource>,
		prober: Arc<dyn ImageProber>,
		resolver: PositionResolver,
		min_host_version: HostVersion,
	) -> Self {
		Self {
			host,
			config,
			prober,
			resolver,
			min_host_version,
			probe_timeout: None,
		}
	}

	/// Bounds every dimension probe by `timeout`.
	#[must_use]
	pub fn with_probe_timeout(mut self, timeout: Option<Duration>) -> Self {
		self.probe_timeout = timeout;
		self
	}

	/// Builds the hover for `position` in `document`, if an annotation is there.
	pub async fn build_hover(&self, document: &Document, position: DocPosition) -> Option<HoverPayload> {
		let host_version = self.host.version();
		if !host_version.satisfies(self.min_host_version) {
			trace!(%host_version, floor = %self.min_host_version, "preview.hover.host_too_old");
			return None;
		}

		let annotation = self.resolver.resolve(document.uri(), position)?;
		let max_height = self.config.settings(document).effective_max_height();
		let mut contents = image_markdown(&annotation, max_height);

		match self.probe(&annotation.display_path).await {
			Ok(ImageDimensions { width, height }) => {
				let _ = write!(contents, "\n\n{width}x{height}");
			}
			Err(error) => {
				debug!(uri = %document.uri(), path = %annotation.display_path, %error, "preview.hover.probe_failed");
			}
		}

		Some(HoverPayload {
			contents,
			range: word_range_at(document.text(), position),
		})
	}

	async fn probe(&self, path: &str) -> Result<ImageDimensions, ProbeError> {
		let probe = AssertUnwindSafe(async { self.prober.probe(path).await }).catch_unwind();
		let outcome = match self.probe_timeout {
			Some(limit) => tokio::time::timeout(limit, probe)
				.await
				.map_err(|_| ProbeError::TimedOut(limit))?,
			None => probe.await,
		};
		outcome.unwrap_or(Err(ProbeError::Panicked))
	}
}

#[cfg(test)]
mod tests;
