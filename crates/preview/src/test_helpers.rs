//! In-memory collaborators for tests.
//!
//! Enabled for this crate's unit tests and, for downstream crates, through
//! the `test-support` feature.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use glimpse_primitives::{DocRange, Document, DocumentUri, HostVersion, ViewId};
use parking_lot::Mutex;

use crate::error::{ProbeError, ProviderError};
use crate::host::{
	DecorationId, DecorationRenderer, DecorationStyle, DecoratorProvider, DecoratorResponse, EditorHost, ImageDimensions,
	ImageItem, ImageProber, RenderRequest,
};

/// Editor host with scriptable views, visible documents, and version.
#[derive(Debug)]
pub struct FakeHost {
	views: Mutex<HashMap<DocumentUri, Vec<ViewId>>>,
	visible: Mutex<Vec<Document>>,
	version: Mutex<HostVersion>,
}

impl FakeHost {
	pub fn new() -> Arc<Self> {
		Arc::new(Self {
			views: Mutex::new(HashMap::new()),
			visible: Mutex::new(Vec::new()),
			version: Mutex::new(HostVersion::new(1, 90, 0)),
		})
	}

	/// Displays `document` in `views` and marks it visible.
	pub fn show(&self, document: &Document, views: &[ViewId]) {
		self.views.lock().insert(document.uri().clone(), views.to_vec());
		let mut visible = self.visible.lock();
		visible.retain(|doc| doc.uri() != document.uri());
		visible.push(document.clone());
	}

	/// Removes every view of the document.
	pub fn hide(&self, uri: &DocumentUri) {
		self.views.lock().remove(uri);
		self.visible.lock().retain(|doc| doc.uri() != uri);
	}

	pub fn set_version(&self, version: HostVersion) {
		*self.version.lock() = version;
	}
}

impl EditorHost for FakeHost {
	fn views_for(&self, uri: &DocumentUri) -> Vec<ViewId> {
		self.views.lock().get(uri).cloned().unwrap_or_default()
	}

	fn visible_documents(&self) -> Vec<Document> {
		self.visible.lock().clone()
	}

	fn version(&self) -> HostVersion {
		*self.version.lock()
	}
}

/// Image file extensions recognized by [`TokenProvider`].
const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg"];

/// Decorator provider that reports every whitespace-delimited token ending
/// in an image extension.
///
/// Display paths are the token prefixed with `file:///workspace/`. Calls can
/// be made to fail or to wait before answering.
#[derive(Debug, Default)]
pub struct TokenProvider {
	calls: Mutex<Vec<(DocumentUri, u64)>>,
	failing: Mutex<bool>,
	delays: Mutex<Vec<Duration>>,
}

impl TokenProvider {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	/// Makes subsequent calls fail until reset.
	pub fn set_failing(&self, failing: bool) {
		*self.failing.lock() = failing;
	}

	/// Queues per-call delays, consumed in call order.
	pub fn push_delay(&self, delay: Duration) {
		self.delays.lock().push(delay);
	}

	/// `(uri, version)` of every call so far.
	pub fn calls(&self) -> Vec<(DocumentUri, u64)> {
		self.calls.lock().clone()
	}

	pub fn call_count(&self) -> usize {
		self.calls.lock().len()
	}

	/// Extracts image tokens from `document`.
	pub fn extract(document: &Document) -> Vec<ImageItem> {
		let mut items = Vec::new();
		for (line_idx, line) in document.text().lines().enumerate() {
			let chars: Vec<char> = line.chars().collect();
			let mut col = 0;
			while col < chars.len() {
				if chars[col].is_whitespace() {
					col += 1;
					continue;
				}
				let start = col;
				while col < chars.len() && !chars[col].is_whitespace() {
					col += 1;
				}
				let token: String = chars[start..col].iter().collect();
				if IMAGE_EXTENSIONS.iter().any(|ext| token.ends_with(ext)) {
					items.push(ImageItem {
						range: DocRange::on_line(line_idx as u32, start as u32, col as u32),
						display_path: format!("file:///workspace/{token}"),
						original_path: token,
					});
				}
			}
		}
		items
	}
}

#[async_trait]
impl DecoratorProvider for TokenProvider {
	async fn decorate(&self, document: &Document) -> Result<DecoratorResponse, ProviderError> {
		let delay = {
			let mut calls = self.calls.lock();
			calls.push((document.uri().clone(), document.version()));
			let mut delays = self.delays.lock();
			(!delays.is_empty()).then(|| delays.remove(0))
		};
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}
		if *self.failing.lock() {
			return Err(ProviderError::Failed("scripted failure".into()));
		}
		Ok(DecoratorResponse {
			images: Self::extract(document),
		})
	}
}

/// A decoration as the renderer saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDecoration {
	pub style: DecorationStyle,
	pub ranges: Vec<DocRange>,
	pub attached_to: Option<ViewId>,
}

#[derive(Debug, Default)]
struct RendererState {
	live: BTreeMap<DecorationId, RenderedDecoration>,
	created: usize,
	released: usize,
	bogus_releases: usize,
}

/// Renderer that records every resource it creates and releases.
///
/// Releasing an id that is not live is counted as a bogus release, which
/// catches both double releases and releases of foreign ids.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
	next: AtomicU64,
	state: Mutex<RendererState>,
}

impl RecordingRenderer {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn created_count(&self) -> usize {
		self.state.lock().created
	}

	pub fn released_count(&self) -> usize {
		self.state.lock().released
	}

	pub fn bogus_release_count(&self) -> usize {
		self.state.lock().bogus_releases
	}

	pub fn live_count(&self) -> usize {
		self.state.lock().live.len()
	}

	pub fn is_live(&self, id: DecorationId) -> bool {
		self.state.lock().live.contains_key(&id)
	}

	/// Live decorations in creation order.
	pub fn live(&self) -> Vec<(DecorationId, RenderedDecoration)> {
		self.state.lock().live.iter().map(|(id, deco)| (*id, deco.clone())).collect()
	}
}

impl DecorationRenderer for RecordingRenderer {
	fn render(&self, request: RenderRequest<'_>) -> DecorationId {
		let id = DecorationId(self.next.fetch_add(1, Ordering::Relaxed) + 1);
		let mut state = self.state.lock();
		state.created += 1;
		state.live.insert(
			id,
			RenderedDecoration {
				style: request.style.clone(),
				ranges: request.ranges.to_vec(),
				attached_to: request.attach_to,
			},
		);
		id
	}

	fn release(&self, id: DecorationId) {
		let mut state = self.state.lock();
		if state.live.remove(&id).is_some() {
			state.released += 1;
		} else {
			state.bogus_releases += 1;
		}
	}
}

/// Scripted behavior for [`FakeProber`].
#[derive(Debug, Clone)]
pub enum ProbeBehavior {
	/// Answer with these dimensions.
	Dimensions(ImageDimensions),
	/// Reject the probe.
	Fail,
	/// Panic inside the probe.
	Panic,
	/// Never answer.
	Hang,
}

/// Image prober answering according to a [`ProbeBehavior`].
#[derive(Debug)]
pub struct FakeProber {
	behavior: Mutex<ProbeBehavior>,
	probed: Mutex<Vec<String>>,
}

impl FakeProber {
	pub fn new(behavior: ProbeBehavior) -> Arc<Self> {
		Arc::new(Self {
			behavior: Mutex::new(behavior),
			probed: Mutex::new(Vec::new()),
		})
	}

	/// Prober answering `width`x`height` for every image.
	pub fn sized(width: u32, height: u32) -> Arc<Self> {
		Self::new(ProbeBehavior::Dimensions(ImageDimensions { width, height }))
	}

	pub fn set_behavior(&self, behavior: ProbeBehavior) {
		*self.behavior.lock() = behavior;
	}

	/// Paths probed so far.
	pub fn probed(&self) -> Vec<String> {
		self.probed.lock().clone()
	}
}

#[async_trait]
impl ImageProber for FakeProber {
	async fn probe(&self, path: &str) -> Result<ImageDimensions, ProbeError> {
		self.probed.lock().push(path.to_string());
		let behavior = self.behavior.lock().clone();
		match behavior {
			ProbeBehavior::Dimensions(dims) => Ok(dims),
			ProbeBehavior::Fail => Err(ProbeError::Unreadable {
				path: path.to_string(),
				reason: "scripted failure".into(),
			}),
			ProbeBehavior::Panic => panic!("scripted prober panic"),
			ProbeBehavior::Hang => std::future::pending().await,
		}
	}
}
