//! Error types.
//!
//! None of these reach the hover surface or the user: provider failures
//! degrade to "no annotations", probe failures degrade to a hover without
//! dimensions, and malformed settings are corrected to defaults. They exist
//! so collaborators can report what went wrong and so the failures can be
//! logged with structure.

use std::path::PathBuf;
use std::time::Duration;

use glimpse_primitives::HostVersionError;

/// A convenient type alias for `Result` with `E` = [`enum@crate::Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by the service's setup paths.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
	/// A required collaborator was not supplied to the builder.
	#[error("missing collaborator: {0}")]
	MissingCollaborator(&'static str),
	/// Configuration could not be loaded.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Failure reported by a decorator provider.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProviderError {
	/// The provider could not produce annotations for the document.
	#[error("decorator provider failed: {0}")]
	Failed(String),
	/// Reading document-adjacent resources failed.
	#[error("decorator provider I/O: {0}")]
	Io(#[from] std::io::Error),
	/// The provider panicked while scanning.
	#[error("decorator provider panicked")]
	Panicked,
}

/// Failure reported while probing image dimensions.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ProbeError {
	/// The image could not be fetched or read.
	#[error("cannot read image {path}: {reason}")]
	Unreadable {
		/// Path or URI that was probed.
		path: String,
		/// Collaborator-provided reason.
		reason: String,
	},
	/// The image format is not understood by the prober.
	#[error("unsupported image format: {0}")]
	Unsupported(String),
	/// The prober did not answer within the configured limit.
	#[error("image probe timed out after {0:?}")]
	TimedOut(Duration),
	/// The prober panicked.
	#[error("image prober panicked")]
	Panicked,
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
	/// The file is not valid TOML or does not match the schema.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),
	/// `minHostVersion` could not be parsed.
	#[error(transparent)]
	HostVersion(#[from] HostVersionError),
}
