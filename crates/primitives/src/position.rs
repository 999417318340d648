use std::fmt;

/// Position in a document in line/character coordinates.
///
/// Ordering follows document order: line first, then character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DocPosition {
	/// Zero-based line index.
	pub line: u32,
	/// Zero-based character offset in the line.
	pub character: u32,
}

impl DocPosition {
	/// Creates a new position.
	pub const fn new(line: u32, character: u32) -> Self {
		Self { line, character }
	}
}

impl fmt::Display for DocPosition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.line, self.character)
	}
}

/// Range between two document positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DocRange {
	/// Start position.
	pub start: DocPosition,
	/// End position.
	pub end: DocPosition,
}

impl DocRange {
	/// Creates a new range.
	pub const fn new(start: DocPosition, end: DocPosition) -> Self {
		Self { start, end }
	}

	/// Creates a range on a single line.
	pub const fn on_line(line: u32, start: u32, end: u32) -> Self {
		Self {
			start: DocPosition::new(line, start),
			end: DocPosition::new(line, end),
		}
	}

	/// Creates a zero-length range at a position.
	pub const fn point(pos: DocPosition) -> Self {
		Self { start: pos, end: pos }
	}

	/// Returns true when `start == end`.
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns true if `pos` lies within the range, both ends inclusive.
	///
	/// A caret sitting directly after the last character of an annotation
	/// still counts as "on" it.
	pub fn contains(&self, pos: DocPosition) -> bool {
		self.start <= pos && pos <= self.end
	}
}

impl fmt::Display for DocRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}..{}", self.start, self.end)
	}
}
