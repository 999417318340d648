//! Scan coordination.
//!
//! [`ScanCoordinator::scan`] asks the decorator provider for a document's
//! image references, renders one decoration per reference per displaying
//! view, and hands the result to the [`AnnotationCache`].
//!
//! # Outcomes
//!
//! - No displaying views when the scan starts: nothing happens and the
//!   cached set is kept as is.
//! - Provider failure, or every view closed while the provider was working:
//!   the cached set is replaced by an empty one.
//! - A newer scan or a clear landed first: the result is discarded.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use glimpse_primitives::{Document, ViewId};
use tracing::{debug, warn};

use crate::cache::{AnnotationCache, AnnotationRecord, DecorationHandle, ReplaceOutcome, ScanTicket};
use crate::config::PreviewSettings;
use crate::error::ProviderError;
use crate::host::{ConfigSource, DecorationRenderer, DecorationStyle, DecoratorProvider, DecoratorResponse, EditorHost, RenderRequest};

/// What a scan did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
	/// The document had no displaying views; the cache was not touched.
	Skipped,
	/// Fresh records were installed.
	Installed {
		/// Number of records installed.
		records: usize,
		/// Number of handles released from the previous set.
		released: usize,
	},
	/// The provider failed or the views disappeared; the set was emptied.
	Cleared {
		/// Number of handles released from the previous set.
		released: usize,
	},
	/// A newer scan or clear already landed; nothing was installed.
	Stale,
}

/// Runs provider calls and installs their results.
#[derive(Clone)]
pub struct ScanCoordinator {
	host: Arc<dyn EditorHost>,
	config: Arc<dyn ConfigSource>,
	provider: Arc<dyn DecoratorProvider>,
	renderer: Arc<dyn DecorationRenderer>,
	cache: Arc<AnnotationCache>,
}

impl std::fmt::Debug for ScanCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ScanCoordinator").field("cache", &self.cache).finish()
	}
}

impl ScanCoordinator {
	pub fn new(
		host: Arc<dyn EditorHost>,
		config: Arc<dyn ConfigSource>,
		provider: Arc<dyn DecoratorProvider>,
		renderer: Arc<dyn DecorationRenderer>,
		cache: Arc<AnnotationCache>,
	) -> Self {
		Self {
			host,
			config,
			provider,
			renderer,
			cache,
		}
	}

	pub fn cache(&self) -> &Arc<AnnotationCache> {
		&self.cache
	}

	/// Scans `document` and updates the cache.
	pub async fn scan(&self, document: &Document) -> ScanOutcome {
		let uri = document.uri();
		if self.host.views_for(uri).is_empty() {
			debug!(uri = %uri, version = document.version(), "preview.scan.skipped");
			return ScanOutcome::Skipped;
		}

		let settings = self.config.settings(document);
		let ticket = self.cache.begin_scan(uri);

		let response = match self.decorate(document).await {
			Ok(response) => response,
			Err(error) => {
				warn!(uri = %uri, version = document.version(), %error, "preview.scan.provider_failed");
				return self.install_empty(&ticket);
			}
		};

		let views = self.host.views_for(uri);
		if views.is_empty() {
			debug!(uri = %uri, "preview.scan.views_gone");
			return self.install_empty(&ticket);
		}

		let records = self.synthesize(&response, &views, &settings);
		let count = records.len();
		debug!(
			uri = %uri,
			version = document.version(),
			images = response.images.len(),
			views = views.len(),
			generation = ticket.generation(),
			"preview.scan.complete"
		);

		match self.cache.replace_if_current(&ticket, records) {
			ReplaceOutcome::Installed { released, .. } => ScanOutcome::Installed { records: count, released },
			ReplaceOutcome::Stale { .. } => ScanOutcome::Stale,
		}
	}

	async fn decorate(&self, document: &Document) -> Result<DecoratorResponse, ProviderError> {
		let call = AssertUnwindSafe(async { self.provider.decorate(document).await });
		call.catch_unwind().await.unwrap_or(Err(ProviderError::Panicked))
	}

	/// Renders one record per image per view.
	fn synthesize(&self, response: &DecoratorResponse, views: &[ViewId], settings: &PreviewSettings) -> Vec<AnnotationRecord> {
		let mut records = Vec::with_capacity(response.images.len() * views.len());
		for item in &response.images {
			let style = DecorationStyle::for_image(&item.display_path, settings);
			for &view in views {
				let handle = DecorationHandle::acquire(
					&self.renderer,
					RenderRequest {
						style: &style,
						ranges: std::slice::from_ref(&item.range),
						attach_to: settings.show_image_preview_on_gutter.then_some(view),
					},
				);
				records.push(AnnotationRecord::new(
					item.range,
					view,
					item.display_path.clone(),
					item.original_path.clone(),
					handle,
				));
			}
		}
		records
	}

	fn install_empty(&self, ticket: &ScanTicket) -> ScanOutcome {
		match self.cache.replace_if_current(ticket, Vec::new()) {
			ReplaceOutcome::Installed { released, .. } => ScanOutcome::Cleared { released },
			ReplaceOutcome::Stale { .. } => ScanOutcome::Stale,
		}
	}
}
