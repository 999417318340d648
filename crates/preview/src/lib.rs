#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Inline image previews for editor documents.
//!
//! A [`PreviewService`] keeps, per open document, the set of image references
//! a [`DecoratorProvider`] found in it, together with the gutter and underline
//! decorations created for each displaying view. Edits are coalesced by a
//! per-document debounce before the document is rescanned; each rescan
//! releases the previous decorations before installing the new ones. Hovering
//! a cached reference produces a markdown image preview, with pixel dimensions
//! when the [`ImageProber`] answers.
//!
//! Host notifications arrive as [`HostEvent`]s, either through
//! [`PreviewService::handle_event`] or a [`LifecycleBridge`] draining a channel.

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod hover;
pub mod resolve;
pub mod scan;
pub mod service;
#[cfg(any(test, feature = "test-support"))]
pub mod test_helpers;

pub use bridge::{HostEvent, LifecycleBridge};
pub use cache::{AnnotationCache, AnnotationRecord, DecorationHandle, ReplaceOutcome, ResolvedAnnotation, ScanTicket};
pub use config::{GutterIconSize, MIN_HOST_VERSION, PreviewConfig, PreviewSettings, SettingsOverride};
pub use error::{ConfigError, Error, ProbeError, ProviderError, Result};
pub use host::{
	ConfigSource, DecorationId, DecorationRenderer, DecorationStyle, DecoratorProvider, DecoratorResponse, EditorHost,
	ImageDimensions, ImageItem, ImageProber, RenderRequest,
};
pub use hover::{HoverPayload, HoverResponder};
pub use resolve::PositionResolver;
pub use scan::{ScanCoordinator, ScanOutcome};
pub use service::{PreviewService, PreviewServiceBuilder};
