#![cfg_attr(test, allow(unused_crate_dependencies))]

//! Core types for inline annotation tracking: document coordinates, stable
//! document identities, immutable document snapshots, and host versions.

/// Immutable document snapshots and identities.
pub mod document;
/// Position and range types in line/character coordinates.
pub mod position;
/// Host version parsing and feature gating.
pub mod version;
/// Caret-local word range lookup.
pub mod word;

pub use document::{Document, DocumentUri, ViewId};
pub use position::{DocPosition, DocRange};
pub use ropey::Rope;
pub use version::{HostVersion, HostVersionError};
pub use word::word_range_at;
