//! Session-scoped preview service.
//!
//! [`PreviewService`] is created when the host activates the preview feature
//! and torn down with [`PreviewService::shutdown`]. It owns the annotation
//! cache and the rescan debouncer; nothing in this crate lives in globals.

use std::sync::Arc;
use std::time::Duration;

use glimpse_primitives::{DocPosition, Document, DocumentUri};
use glimpse_worker::{Debouncer, TaskClass};
use tracing::{debug, info};

use crate::cache::AnnotationCache;
use crate::config::PreviewConfig;
use crate::error::{Error, Result};
use crate::hover::{HoverPayload, HoverResponder};
use crate::host::{ConfigSource, DecorationRenderer, DecoratorProvider, EditorHost, ImageProber};
use crate::resolve::PositionResolver;
use crate::scan::{ScanCoordinator, ScanOutcome};

/// Owns every piece of per-session preview state.
pub struct PreviewService {
	pub(crate) host: Arc<dyn EditorHost>,
	pub(crate) cache: Arc<AnnotationCache>,
	pub(crate) coordinator: ScanCoordinator,
	pub(crate) scheduler: Debouncer<DocumentUri>,
	hover: HoverResponder,
	debounce: Duration,
}

impl std::fmt::Debug for PreviewService {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PreviewService")
			.field("cache", &self.cache)
			.field("scheduler", &self.scheduler)
			.field("debounce", &self.debounce)
			.finish_non_exhaustive()
	}
}

impl PreviewService {
	pub fn builder() -> PreviewServiceBuilder {
		PreviewServiceBuilder::default()
	}

	/// Schedules a rescan of `document` after the configured quiet period.
	///
	/// A pending rescan of the same document is replaced. May be called from
	/// threads without a tokio runtime.
	pub fn request_scan(&self, document: Document) {
		self.request_scan_after(document, self.debounce);
	}

	/// Schedules a rescan of `document` after `delay`.
	pub fn request_scan_after(&self, document: Document, delay: Duration) {
		let coordinator = self.coordinator.clone();
		let uri = document.uri().clone();
		debug!(uri = %uri, version = document.version(), ?delay, "preview.scan.requested");
		self.scheduler.schedule(uri, delay, async move {
			coordinator.scan(&document).await;
		});
	}

	/// Scans `document` immediately, bypassing the debouncer.
	pub async fn scan_now(&self, document: &Document) -> ScanOutcome {
		self.coordinator.scan(document).await
	}

	/// Drops a pending rescan of `uri`. Returns true if one was pending.
	pub fn cancel_scan(&self, uri: &DocumentUri) -> bool {
		self.scheduler.cancel(uri)
	}

	/// Number of documents with a rescan waiting for its quiet period.
	pub fn pending_scans(&self) -> usize {
		self.scheduler.pending_count()
	}

	/// Hover surface: the hover for `position` in `document`, if any.
	pub async fn hover(&self, document: &Document, position: DocPosition) -> Option<HoverPayload> {
		self.hover.build_hover(document, position).await
	}

	pub fn cache(&self) -> &Arc<AnnotationCache> {
		&self.cache
	}

	pub fn debounce(&self) -> Duration {
		self.debounce
	}

	/// Cancels pending rescans and releases every cached decoration.
	///
	/// Scans already talking to the provider are not interrupted, but their
	/// results are discarded when they arrive.
	pub fn shutdown(&self) {
		let cancelled = self.scheduler.cancel_all();
		let released = self.cache.clear_all();
		info!(cancelled, released, "preview.shutdown");
	}
}

/// Builder for [`PreviewService`].
#[derive(Default)]
pub struct PreviewServiceBuilder {
	host: Option<Arc<dyn EditorHost>>,
	provider: Option<Arc<dyn DecoratorProvider>>,
	renderer: Option<Arc<dyn DecorationRenderer>>,
	prober: Option<Arc<dyn ImageProber>>,
	config_source: Option<Arc<dyn ConfigSource>>,
	config: PreviewConfig,
}

impl PreviewServiceBuilder {
	#[must_use]
	pub fn host(mut self, host: Arc<dyn EditorHost>) -> Self {
		self.host = Some(host);
		self
	}

	#[must_use]
	pub fn provider(mut self, provider: Arc<dyn DecoratorProvider>) -> Self {
		self.provider = Some(provider);
		self
	}

	#[must_use]
	pub fn renderer(mut self, renderer: Arc<dyn DecorationRenderer>) -> Self {
		self.renderer = Some(renderer);
		self
	}

	#[must_use]
	pub fn prober(mut self, prober: Arc<dyn ImageProber>) -> Self {
		self.prober = Some(prober);
		self
	}

	/// Session configuration. Also used as the settings source unless
	/// [`config_source`](Self::config_source) is set.
	#[must_use]
	pub fn config(mut self, config: PreviewConfig) -> Self {
		self.config = config;
		self
	}

	/// Host-provided per-document settings.
	#[must_use]
	pub fn config_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
		self.config_source = Some(source);
		self
	}

	pub fn build(self) -> Result<PreviewService> {
		let host = self.host.ok_or(Error::MissingCollaborator("editor host"))?;
		let provider = self.provider.ok_or(Error::MissingCollaborator("decorator provider"))?;
		let renderer = self.renderer.ok_or(Error::MissingCollaborator("decoration renderer"))?;
		let prober = self.prober.ok_or(Error::MissingCollaborator("image prober"))?;
		let config = self.config;
		let settings: Arc<dyn ConfigSource> = match self.config_source {
			Some(source) => source,
			None => Arc::new(config.clone()),
		};

		let cache = Arc::new(AnnotationCache::new());
		let coordinator = ScanCoordinator::new(
			Arc::clone(&host),
			Arc::clone(&settings),
			provider,
			renderer,
			Arc::clone(&cache),
		);
		let hover = HoverResponder::new(
			Arc::clone(&host),
			settings,
			prober,
			PositionResolver::new(Arc::clone(&cache)),
			config.min_host_version,
		)
		.with_probe_timeout(config.probe_timeout);

		info!(debounce = ?config.debounce, min_host_version = %config.min_host_version, "preview.start");

		Ok(PreviewService {
			host,
			cache,
			coordinator,
			scheduler: Debouncer::new(TaskClass::Background),
			hover,
			debounce: config.debounce,
		})
	}
}
