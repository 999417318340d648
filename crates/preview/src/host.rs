//! Collaborator seams.
//!
//! The preview core never parses documents, draws decorations, decodes
//! images, or talks to the editor directly. Each of those is a trait object
//! supplied by the embedding host.

use async_trait::async_trait;
use glimpse_primitives::{DocRange, Document, DocumentUri, HostVersion, ViewId};

use crate::config::{GutterIconSize, PreviewSettings};
use crate::error::{ProbeError, ProviderError};

/// One image reference discovered in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageItem {
	/// Text range of the reference.
	pub range: DocRange,
	/// Resolved path or URI used to render the image.
	pub display_path: String,
	/// Path exactly as written in the source text.
	pub original_path: String,
}

/// Result of one decorator provider call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecoratorResponse {
	/// Discovered image references in document order.
	pub images: Vec<ImageItem>,
}

/// Extracts image references from document text.
///
/// Implementations must eventually resolve. Ranges must be well formed and
/// within document bounds.
#[async_trait]
pub trait DecoratorProvider: Send + Sync {
	/// Scans `document` for image references.
	async fn decorate(&self, document: &Document) -> Result<DecoratorResponse, ProviderError>;
}

/// Opaque identifier of a renderer-side decoration resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(pub u64);

/// Visual configuration for one decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationStyle {
	/// Image shown in the gutter.
	pub gutter_icon_path: String,
	/// Gutter fitting mode.
	pub gutter_icon_size: GutterIconSize,
	/// CSS-like text decoration for the reference text, if any.
	pub text_decoration: Option<&'static str>,
}

impl DecorationStyle {
	/// Builds the style for an image shown with `settings`.
	pub fn for_image(display_path: &str, settings: &PreviewSettings) -> Self {
		Self {
			gutter_icon_path: display_path.to_string(),
			gutter_icon_size: settings.gutter_icon_size,
			text_decoration: settings.show_underline.then_some("underline"),
		}
	}
}

/// Arguments for [`DecorationRenderer::render`].
#[derive(Debug, Clone, Copy)]
pub struct RenderRequest<'a> {
	/// Visual configuration.
	pub style: &'a DecorationStyle,
	/// Ranges the decoration covers.
	pub ranges: &'a [DocRange],
	/// View to attach the decoration to; `None` creates it detached.
	pub attach_to: Option<ViewId>,
}

/// Creates and disposes decoration resources.
///
/// Every id returned by [`render`](Self::render) is passed to
/// [`release`](Self::release) exactly once.
pub trait DecorationRenderer: Send + Sync {
	/// Creates a decoration, attaching it when requested.
	fn render(&self, request: RenderRequest<'_>) -> DecorationId;

	/// Detaches and disposes a decoration.
	fn release(&self, id: DecorationId);
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
	pub width: u32,
	pub height: u32,
}

/// Reads image dimensions from a path or URI.
#[async_trait]
pub trait ImageProber: Send + Sync {
	/// Probes the image at `path`.
	async fn probe(&self, path: &str) -> Result<ImageDimensions, ProbeError>;
}

/// Source of per-document settings.
pub trait ConfigSource: Send + Sync {
	/// Settings in effect for `document`.
	fn settings(&self, document: &Document) -> PreviewSettings;
}

/// The editor hosting the preview core.
pub trait EditorHost: Send + Sync {
	/// Views currently displaying the document, in host order.
	fn views_for(&self, uri: &DocumentUri) -> Vec<ViewId>;

	/// Snapshots of every currently visible document.
	fn visible_documents(&self) -> Vec<Document>;

	/// Host release, used for feature gating.
	fn version(&self) -> HostVersion;
}
