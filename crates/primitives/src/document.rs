use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use ropey::Rope;

/// Stable identity of a document, independent of the views displaying it.
///
/// Usually a URI string such as `file:///notes/readme.md`. Clones share the
/// same allocation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentUri(Arc<str>);

impl DocumentUri {
	/// Creates a new document identity.
	pub fn new(uri: impl AsRef<str>) -> Self {
		Self(Arc::from(uri.as_ref()))
	}

	/// Returns the identity as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for DocumentUri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for DocumentUri {
	fn from(value: &str) -> Self {
		Self::new(value)
	}
}

impl From<String> for DocumentUri {
	fn from(value: String) -> Self {
		Self(Arc::from(value))
	}
}

impl AsRef<str> for DocumentUri {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for DocumentUri {
	fn borrow(&self) -> &str {
		&self.0
	}
}

/// Identifier of one on-screen editor view.
///
/// A document may be displayed by several views at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "view#{}", self.0)
	}
}

/// Immutable snapshot of a document at one version.
///
/// Cloning is cheap: the rope shares its nodes and the identity is
/// reference counted.
#[derive(Debug, Clone)]
pub struct Document {
	uri: DocumentUri,
	language_id: Arc<str>,
	version: u64,
	text: Rope,
}

impl Document {
	/// Creates a snapshot from its parts.
	pub fn new(uri: impl Into<DocumentUri>, language_id: impl AsRef<str>, version: u64, text: &str) -> Self {
		Self {
			uri: uri.into(),
			language_id: Arc::from(language_id.as_ref()),
			version,
			text: Rope::from_str(text),
		}
	}

	/// Returns a snapshot of the same document with new content and a new version.
	#[must_use]
	pub fn edited(&self, version: u64, text: &str) -> Self {
		Self {
			uri: self.uri.clone(),
			language_id: Arc::clone(&self.language_id),
			version,
			text: Rope::from_str(text),
		}
	}

	/// Stable identity of the document.
	pub fn uri(&self) -> &DocumentUri {
		&self.uri
	}

	/// Host language identifier (for example `markdown`).
	pub fn language_id(&self) -> &str {
		&self.language_id
	}

	/// Host-assigned version of this snapshot.
	pub fn version(&self) -> u64 {
		self.version
	}

	/// Document content.
	pub fn text(&self) -> &Rope {
		&self.text
	}
}
