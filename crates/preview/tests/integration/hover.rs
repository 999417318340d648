use glimpse_preview::test_helpers::ProbeBehavior;
use glimpse_preview::{HostEvent, PreviewConfig};
use glimpse_primitives::{DocPosition, DocRange, Document, HostVersion, ViewId};
use pretty_assertions::assert_eq;

use crate::common::{SETTLE, start_session};

#[tokio::test(start_paused = true)]
async fn hover_follows_the_cache() {
	let session = start_session(PreviewConfig::default());
	let document = Document::new("file:///workspace/readme.md", "markdown", 1, "intro\nsee img/cat.jpg end");
	session.host.show(&document, &[ViewId(1)]);

	assert!(session.service.hover(&document, DocPosition::new(1, 6)).await.is_none());

	session.send(HostEvent::DocumentOpened(document.clone())).await;
	tokio::time::sleep(SETTLE).await;

	let hover = session.service.hover(&document, DocPosition::new(1, 6)).await.unwrap();
	assert_eq!(
		hover.contents,
		"![img/cat.jpg](file:///workspace/img/cat.jpg|height=100)\n\n640x480"
	);
	assert_eq!(session.prober.probed(), vec!["file:///workspace/img/cat.jpg".to_string()]);
	assert_eq!(hover.range, DocRange::on_line(1, 4, 15));
}

#[tokio::test(start_paused = true)]
async fn hover_degrades_without_dimensions_or_old_host() {
	let session = start_session(PreviewConfig::default());
	let document = Document::new("file:///workspace/readme.md", "markdown", 1, "logo.png");
	session.host.show(&document, &[ViewId(1)]);
	session.service.scan_now(&document).await;

	session.prober.set_behavior(ProbeBehavior::Fail);
	let hover = session.service.hover(&document, DocPosition::new(0, 2)).await.unwrap();
	assert_eq!(hover.contents, "![logo.png](file:///workspace/logo.png|height=100)");

	session.host.set_version(HostVersion::new(1, 20, 3));
	assert!(session.service.hover(&document, DocPosition::new(0, 2)).await.is_none());
}
