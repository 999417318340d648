//! Host event dispatch.

use std::sync::Arc;

use glimpse_primitives::{Document, DocumentUri};
use glimpse_worker::TaskClass;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::service::PreviewService;

/// Editor-host notifications the preview reacts to.
#[derive(Debug, Clone)]
pub enum HostEvent {
	/// The document's text changed.
	TextChanged(Document),
	/// Focus moved to another editor, or to none.
	ActiveEditorChanged(Option<Document>),
	/// Workspace folders were added or removed.
	WorkspaceFoldersChanged,
	/// A document was opened, possibly under a previously used identity.
	DocumentOpened(Document),
	/// A document was closed.
	DocumentClosed(DocumentUri),
}

impl HostEvent {
	pub fn name(&self) -> &'static str {
		match self {
			Self::TextChanged(_) => "text_changed",
			Self::ActiveEditorChanged(_) => "active_editor_changed",
			Self::WorkspaceFoldersChanged => "workspace_folders_changed",
			Self::DocumentOpened(_) => "document_opened",
			Self::DocumentClosed(_) => "document_closed",
		}
	}
}

impl PreviewService {
	/// Maps a host event onto scheduler and cache operations.
	pub fn handle_event(&self, event: HostEvent) {
		trace!(event = event.name(), "preview.bridge.event");
		match event {
			HostEvent::TextChanged(document) | HostEvent::ActiveEditorChanged(Some(document)) => {
				self.request_scan(document);
			}
			HostEvent::ActiveEditorChanged(None) => {}
			HostEvent::WorkspaceFoldersChanged => {
				let visible = self.host.visible_documents();
				debug!(documents = visible.len(), "preview.bridge.rescan_visible");
				for document in visible {
					self.request_scan(document);
				}
			}
			HostEvent::DocumentOpened(document) => {
				self.cache.clear(document.uri());
				self.request_scan(document);
			}
			HostEvent::DocumentClosed(uri) => {
				self.cancel_scan(&uri);
				self.cache.remove(&uri);
			}
		}
	}
}

/// Feeds a host event channel into a [`PreviewService`].
#[derive(Debug)]
pub struct LifecycleBridge {
	service: Arc<PreviewService>,
	events: UnboundedReceiver<HostEvent>,
}

impl LifecycleBridge {
	pub fn new(service: Arc<PreviewService>, events: UnboundedReceiver<HostEvent>) -> Self {
		Self { service, events }
	}

	/// Runs the bridge on its own task. See [`run`](Self::run).
	pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<usize> {
		glimpse_worker::spawn(TaskClass::Interactive, self.run(shutdown))
	}

	/// Dispatches events until the channel closes or `shutdown` fires.
	///
	/// Returns the number of events handled.
	pub async fn run(mut self, shutdown: CancellationToken) -> usize {
		let mut handled = 0;
		loop {
			let event = tokio::select! {
				biased;
				_ = shutdown.cancelled() => {
					debug!(handled, "preview.bridge.shutdown");
					break;
				}
				event = self.events.recv() => event,
			};
			let Some(event) = event else {
				debug!(handled, "preview.bridge.closed");
				break;
			};
			self.service.handle_event(event);
			handled += 1;
		}
		handled
	}
}
