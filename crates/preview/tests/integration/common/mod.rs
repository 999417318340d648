//! Common utilities for preview integration tests.

use std::sync::Arc;
use std::time::Duration;

use glimpse_preview::test_helpers::{FakeHost, FakeProber, RecordingRenderer, TokenProvider};
use glimpse_preview::{HostEvent, LifecycleBridge, PreviewConfig, PreviewService};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Long enough for any default-debounced scan to land.
pub const SETTLE: Duration = Duration::from_millis(600);

/// A running preview session wired to in-memory collaborators.
pub struct Session {
	pub host: Arc<FakeHost>,
	pub provider: Arc<TokenProvider>,
	pub renderer: Arc<RecordingRenderer>,
	pub prober: Arc<FakeProber>,
	pub service: Arc<PreviewService>,
	pub events: UnboundedSender<HostEvent>,
	pub shutdown: CancellationToken,
	pub bridge: JoinHandle<usize>,
}

impl Session {
	/// Sends an event and lets the bridge dispatch it.
	pub async fn send(&self, event: HostEvent) {
		self.events.send(event).expect("bridge stopped");
		tokio::task::yield_now().await;
	}
}

/// Starts a session with `config` and a bridge draining its event channel.
pub fn start_session(config: PreviewConfig) -> Session {
	let _ = tracing_subscriber::fmt::try_init();
	let host = FakeHost::new();
	let provider = TokenProvider::new();
	let renderer = RecordingRenderer::new();
	let prober = FakeProber::sized(640, 480);
	let service = Arc::new(
		PreviewService::builder()
			.host(host.clone())
			.provider(provider.clone())
			.renderer(renderer.clone())
			.prober(prober.clone())
			.config(config)
			.build()
			.expect("all collaborators supplied"),
	);

	let (events, rx) = mpsc::unbounded_channel();
	let shutdown = CancellationToken::new();
	let bridge = LifecycleBridge::new(Arc::clone(&service), rx).spawn(shutdown.clone());

	Session {
		host,
		provider,
		renderer,
		prober,
		service,
		events,
		shutdown,
		bridge,
	}
}
