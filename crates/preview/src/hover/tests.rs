use std::sync::Arc;
use std::time::Duration;

use glimpse_primitives::{DocPosition, DocRange, Document, HostVersion, ViewId};
use pretty_assertions::assert_eq;

use super::*;
use crate::cache::AnnotationCache;
use crate::config::{MIN_HOST_VERSION, PreviewConfig};
use crate::scan::ScanCoordinator;
use crate::test_helpers::{FakeHost, FakeProber, ProbeBehavior, RecordingRenderer, TokenProvider};

const TEXT: &str = "Some text before it logo00.png after";

struct Harness {
	host: Arc<FakeHost>,
	prober: Arc<FakeProber>,
	responder: HoverResponder,
	document: Document,
}

async fn harness(config: PreviewConfig, prober: Arc<FakeProber>) -> Harness {
	let host = FakeHost::new();
	let config = Arc::new(config);
	let cache = Arc::new(AnnotationCache::new());
	let coordinator = ScanCoordinator::new(
		host.clone(),
		config.clone(),
		TokenProvider::new(),
		RecordingRenderer::new(),
		Arc::clone(&cache),
	);
	let document = Document::new("file:///workspace/readme.md", "markdown", 1, TEXT);
	host.show(&document, &[ViewId(1)]);
	coordinator.scan(&document).await;

	let responder = HoverResponder::new(
		host.clone(),
		config.clone(),
		prober.clone(),
		PositionResolver::new(cache),
		config.min_host_version,
	)
	.with_probe_timeout(config.probe_timeout);

	Harness {
		host,
		prober,
		responder,
		document,
	}
}

#[tokio::test]
async fn hover_includes_dimensions_when_probe_succeeds() {
	let h = harness(PreviewConfig::default(), FakeProber::sized(640, 480)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 24)).await.unwrap();

	assert_eq!(
		hover.contents,
		"![logo00.png](file:///workspace/logo00.png|height=100)\n\n640x480"
	);
	assert_eq!(hover.range, DocRange::on_line(0, 20, 30));
	assert_eq!(h.prober.probed(), vec!["file:///workspace/logo00.png".to_string()]);
}

#[tokio::test]
async fn probe_failure_falls_back_to_plain_image() {
	let h = harness(PreviewConfig::default(), FakeProber::new(ProbeBehavior::Fail)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 20)).await.unwrap();

	assert_eq!(hover.contents, "![logo00.png](file:///workspace/logo00.png|height=100)");
}

#[tokio::test]
async fn probe_panic_falls_back_to_plain_image() {
	let h = harness(PreviewConfig::default(), FakeProber::new(ProbeBehavior::Panic)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 30)).await.unwrap();

	assert!(hover.contents.starts_with("![logo00.png]"));
	assert!(!hover.contents.contains('\n'));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn probe_timeout_falls_back_to_plain_image() {
	let config = PreviewConfig {
		probe_timeout: Some(Duration::from_millis(250)),
		..PreviewConfig::default()
	};
	let h = harness(config, FakeProber::new(ProbeBehavior::Hang)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 25)).await.unwrap();

	assert_eq!(hover.contents, "![logo00.png](file:///workspace/logo00.png|height=100)");
}

#[tokio::test]
async fn negative_max_height_uses_default() {
	let config = PreviewConfig::from_toml_str("imagePreviewMaxHeight = -5").unwrap();
	let h = harness(config, FakeProber::sized(1, 1)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 22)).await.unwrap();

	assert!(hover.contents.contains("|height=100)"));
}

#[tokio::test]
async fn configured_max_height_is_embedded() {
	let config = PreviewConfig::from_toml_str("[languages.markdown]\nimagePreviewMaxHeight = 320").unwrap();
	let h = harness(config, FakeProber::sized(1, 1)).await;

	let hover = h.responder.build_hover(&h.document, DocPosition::new(0, 22)).await.unwrap();

	assert!(hover.contents.contains("|height=320)"));
}

#[tokio::test]
async fn no_hover_outside_annotations() {
	let h = harness(PreviewConfig::default(), FakeProber::sized(1, 1)).await;

	assert!(h.responder.build_hover(&h.document, DocPosition::new(0, 5)).await.is_none());
	assert!(h.responder.build_hover(&h.document, DocPosition::new(3, 0)).await.is_none());
	assert!(h.prober.probed().is_empty());
}

#[tokio::test]
async fn old_hosts_never_get_hovers() {
	let h = harness(PreviewConfig::default(), FakeProber::sized(1, 1)).await;
	h.host.set_version(HostVersion::new(MIN_HOST_VERSION.major, MIN_HOST_VERSION.minor - 1, 9));

	assert!(h.responder.build_hover(&h.document, DocPosition::new(0, 24)).await.is_none());

	h.host.set_version(MIN_HOST_VERSION);
	assert!(h.responder.build_hover(&h.document, DocPosition::new(0, 24)).await.is_some());
}

#[test]
fn markdown_embeds_label_path_and_height() {
	let annotation = ResolvedAnnotation {
		range: DocRange::on_line(0, 0, 1),
		view: ViewId(1),
		display_path: "https://example.com/a.png".into(),
		original_path: "./a.png".into(),
	};
	assert_eq!(image_markdown(&annotation, 42), "![./a.png](https://example.com/a.png|height=42)");
}
