//! Preview configuration.
//!
//! Settings are read per document through [`ConfigSource`], so hosts with
//! their own settings store can implement the trait directly. [`PreviewConfig`]
//! is the file-backed implementation, written in TOML:
//!
//! ```toml
//! debounceMs = 500
//! minHostVersion = "1.26"
//! probeTimeoutMs = 2000
//!
//! # Global settings
//! showImagePreviewOnGutter = true
//! showUnderline = true
//! imagePreviewMaxHeight = 100
//! gutterIconSize = "contain"
//!
//! # Language-specific overrides
//! [languages.markdown]
//! showUnderline = false
//! ```
//!
//! A negative `imagePreviewMaxHeight` is not an error; it reads back as
//! [`DEFAULT_MAX_HEIGHT`].

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use glimpse_primitives::{Document, HostVersion};
use glimpse_worker::DEFAULT_DEBOUNCE;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::host::ConfigSource;

/// Maximum hover image height used when the configured value is negative.
pub const DEFAULT_MAX_HEIGHT: u64 = 100;

/// Oldest host release that supports image hovers.
pub const MIN_HOST_VERSION: HostVersion = HostVersion::new(1, 26, 0);

/// How a gutter icon is fitted into the gutter cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GutterIconSize {
	/// Natural size.
	Auto,
	/// Scaled down to fit, preserving aspect ratio.
	#[default]
	Contain,
	/// Scaled to cover the cell, cropping if needed.
	Cover,
}

/// Per-document preview settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviewSettings {
	/// Attach gutter icons to editor views.
	pub show_image_preview_on_gutter: bool,
	/// Underline image references in the text.
	pub show_underline: bool,
	/// Maximum hover image height in pixels; negative means default.
	pub image_preview_max_height: i64,
	/// Gutter icon sizing mode.
	pub gutter_icon_size: GutterIconSize,
}

impl Default for PreviewSettings {
	fn default() -> Self {
		Self {
			show_image_preview_on_gutter: true,
			show_underline: true,
			image_preview_max_height: DEFAULT_MAX_HEIGHT as i64,
			gutter_icon_size: GutterIconSize::default(),
		}
	}
}

impl PreviewSettings {
	/// Max height with negative values replaced by [`DEFAULT_MAX_HEIGHT`].
	pub fn effective_max_height(&self) -> u64 {
		u64::try_from(self.image_preview_max_height).unwrap_or(DEFAULT_MAX_HEIGHT)
	}
}

/// Partial settings applied on top of the global ones for a language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsOverride {
	pub show_image_preview_on_gutter: Option<bool>,
	pub show_underline: Option<bool>,
	pub image_preview_max_height: Option<i64>,
	pub gutter_icon_size: Option<GutterIconSize>,
}

impl SettingsOverride {
	/// Returns `base` with every set field replaced.
	pub fn apply(&self, base: &PreviewSettings) -> PreviewSettings {
		PreviewSettings {
			show_image_preview_on_gutter: self
				.show_image_preview_on_gutter
				.unwrap_or(base.show_image_preview_on_gutter),
			show_underline: self.show_underline.unwrap_or(base.show_underline),
			image_preview_max_height: self
				.image_preview_max_height
				.unwrap_or(base.image_preview_max_height),
			gutter_icon_size: self.gutter_icon_size.unwrap_or(base.gutter_icon_size),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreviewConfig {
	#[serde(default = "default_debounce_ms")]
	debounce_ms: u64,
	#[serde(default)]
	min_host_version: Option<String>,
	#[serde(default)]
	probe_timeout_ms: Option<u64>,
	#[serde(default)]
	languages: HashMap<String, SettingsOverride>,
	#[serde(flatten)]
	settings: PreviewSettings,
}

fn default_debounce_ms() -> u64 {
	DEFAULT_DEBOUNCE.as_millis() as u64
}

/// Session-wide preview configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewConfig {
	/// Quiet period before a rescan runs.
	pub debounce: Duration,
	/// Hosts older than this never get image hovers.
	pub min_host_version: HostVersion,
	/// Upper bound on one dimension probe; `None` waits indefinitely.
	pub probe_timeout: Option<Duration>,
	/// Settings applied to every document.
	pub settings: PreviewSettings,
	/// Overrides keyed by host language id.
	pub languages: HashMap<String, SettingsOverride>,
}

impl Default for PreviewConfig {
	fn default() -> Self {
		Self {
			debounce: DEFAULT_DEBOUNCE,
			min_host_version: MIN_HOST_VERSION,
			probe_timeout: None,
			settings: PreviewSettings::default(),
			languages: HashMap::new(),
		}
	}
}

impl TryFrom<RawPreviewConfig> for PreviewConfig {
	type Error = ConfigError;

	fn try_from(raw: RawPreviewConfig) -> Result<Self, Self::Error> {
		let min_host_version = match raw.min_host_version {
			Some(version) => version.parse()?,
			None => MIN_HOST_VERSION,
		};
		Ok(Self {
			debounce: Duration::from_millis(raw.debounce_ms),
			min_host_version,
			probe_timeout: raw.probe_timeout_ms.map(Duration::from_millis),
			settings: raw.settings,
			languages: raw.languages,
		})
	}
}

impl PreviewConfig {
	/// Parses configuration from TOML text.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let raw: RawPreviewConfig = toml::from_str(input)?;
		raw.try_into()
	}

	/// Loads configuration from a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Loads configuration from `path`, falling back to defaults when the file is absent.
	pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
		match Self::load(path) {
			Err(ConfigError::Io { error, .. }) if error.kind() == std::io::ErrorKind::NotFound => {
				Ok(Self::default())
			}
			other => other,
		}
	}

	/// Effective settings for documents of `language_id`.
	pub fn settings_for(&self, language_id: &str) -> PreviewSettings {
		match self.languages.get(language_id) {
			Some(overrides) => overrides.apply(&self.settings),
			None => self.settings.clone(),
		}
	}
}

impl ConfigSource for PreviewConfig {
	fn settings(&self, document: &Document) -> PreviewSettings {
		self.settings_for(document.language_id())
	}
}
