use std::time::Duration;

use glimpse_preview::{HostEvent, PreviewConfig};
use glimpse_primitives::{DocRange, Document, ViewId};
use pretty_assertions::assert_eq;

use crate::common::{SETTLE, start_session};

const WITH_IMAGE: &str = "Some text before it logo00.png after";

fn readme(version: u64, text: &str) -> Document {
	Document::new("file:///workspace/readme.md", "markdown", version, text)
}

#[tokio::test(start_paused = true)]
async fn edit_removing_reference_releases_its_decoration() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, WITH_IMAGE);
	session.host.show(&document, &[ViewId(1)]);

	session.send(HostEvent::DocumentOpened(document.clone())).await;
	tokio::time::sleep(SETTLE).await;

	let snapshot = session.service.cache().snapshot(document.uri()).unwrap();
	assert_eq!(snapshot.annotations.len(), 1);
	assert_eq!(snapshot.annotations[0].range, DocRange::on_line(0, 20, 30));
	assert_eq!(snapshot.annotations[0].original_path, "logo00.png");
	assert_eq!(session.renderer.live_count(), 1);

	session
		.send(HostEvent::TextChanged(document.edited(2, "Some text before it after")))
		.await;
	tokio::time::sleep(SETTLE).await;

	assert_eq!(session.service.cache().record_count(document.uri()), 0);
	assert_eq!(session.renderer.released_count(), 1);
	assert_eq!(session.renderer.live_count(), 0);
	assert_eq!(session.renderer.bogus_release_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn typing_burst_scans_once_with_final_text() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, "");
	session.host.show(&document, &[ViewId(1)]);

	let target = "see logo.png";
	for (idx, _) in target.char_indices() {
		let version = idx as u64 + 1;
		session
			.send(HostEvent::TextChanged(document.edited(version, &target[..=idx])))
			.await;
		tokio::time::sleep(Duration::from_millis(80)).await;
	}
	tokio::time::sleep(SETTLE).await;

	assert_eq!(
		session.provider.calls(),
		vec![(document.uri().clone(), target.len() as u64)]
	);
	assert_eq!(session.service.cache().record_count(document.uri()), 1);
}

#[tokio::test(start_paused = true)]
async fn each_view_gets_its_own_decoration() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, "a.png b.svg");
	session.host.show(&document, &[ViewId(1), ViewId(2), ViewId(3)]);

	session.send(HostEvent::ActiveEditorChanged(Some(document.clone()))).await;
	tokio::time::sleep(SETTLE).await;

	let live = session.renderer.live();
	assert_eq!(live.len(), 6);
	let mut attached: Vec<_> = live.iter().filter_map(|(_, d)| d.attached_to).collect();
	attached.sort_by_key(|view| view.0);
	assert_eq!(
		attached,
		vec![ViewId(1), ViewId(1), ViewId(2), ViewId(2), ViewId(3), ViewId(3)]
	);
}

#[tokio::test(start_paused = true)]
async fn provider_failure_clears_previous_annotations() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, WITH_IMAGE);
	session.host.show(&document, &[ViewId(1)]);
	session.service.scan_now(&document).await;
	assert_eq!(session.renderer.live_count(), 1);

	session.provider.set_failing(true);
	session.send(HostEvent::TextChanged(document.edited(2, WITH_IMAGE))).await;
	tokio::time::sleep(SETTLE).await;

	assert_eq!(session.service.cache().record_count(document.uri()), 0);
	assert_eq!(session.renderer.live_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_scan_cannot_overwrite_newer_result() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, "old.png");
	session.host.show(&document, &[ViewId(1)]);
	session.provider.push_delay(Duration::from_secs(5));
	session.provider.push_delay(Duration::ZERO);

	session.send(HostEvent::TextChanged(document.clone())).await;
	tokio::time::sleep(SETTLE).await;
	session
		.send(HostEvent::TextChanged(document.edited(2, "new.png")))
		.await;
	tokio::time::sleep(Duration::from_secs(6)).await;

	assert_eq!(session.provider.call_count(), 2);
	let snapshot = session.service.cache().snapshot(document.uri()).unwrap();
	assert_eq!(snapshot.annotations.len(), 1);
	assert_eq!(snapshot.annotations[0].original_path, "new.png");
	assert_eq!(session.renderer.live_count(), 1);
	assert_eq!(session.renderer.created_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn workspace_change_and_close() {
	let session = start_session(PreviewConfig::default());
	let readme = readme(1, "a.png");
	let notes = Document::new("file:///workspace/notes.md", "markdown", 1, "b.png c.png");
	session.host.show(&readme, &[ViewId(1)]);
	session.host.show(&notes, &[ViewId(2)]);

	session.send(HostEvent::WorkspaceFoldersChanged).await;
	tokio::time::sleep(SETTLE).await;
	assert_eq!(session.service.cache().total_records(), 3);

	session.host.hide(notes.uri());
	session.send(HostEvent::DocumentClosed(notes.uri().clone())).await;

	assert_eq!(session.service.cache().document_count(), 1);
	assert_eq!(session.renderer.live_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_bridge_and_releases_everything() {
	let session = start_session(PreviewConfig::default());
	let document = readme(1, "a.png b.png");
	session.host.show(&document, &[ViewId(1)]);
	session.service.scan_now(&document).await;
	session.send(HostEvent::TextChanged(document.edited(2, "a.png"))).await;

	session.shutdown.cancel();
	session.service.shutdown();
	let handled = session.bridge.await.unwrap();
	tokio::time::sleep(SETTLE).await;

	assert_eq!(handled, 1);
	assert_eq!(session.provider.call_count(), 1);
	assert_eq!(session.renderer.live_count(), 0);
	assert_eq!(session.renderer.released_count(), 2);
	assert!(session.events.is_closed());
}
