use ropey::Rope;

use crate::position::{DocPosition, DocRange};

/// Characters that extend a word run besides alphanumerics.
///
/// Paths and URLs stay in one piece so the hover anchor covers the whole
/// reference rather than a single path segment.
const WORD_PUNCTUATION: &[char] = &['_', '-', '.', '/', ':', '@', '~', '%'];

fn is_word_char(c: char) -> bool {
	c.is_alphanumeric() || WORD_PUNCTUATION.contains(&c)
}

/// Returns the word range surrounding `pos`.
///
/// Falls back to a zero-length range at `pos` when the caret is not touching
/// a word character or the position is out of bounds.
pub fn word_range_at(text: &Rope, pos: DocPosition) -> DocRange {
	let fallback = DocRange::point(pos);
	let line_idx = pos.line as usize;
	if line_idx >= text.len_lines() {
		return fallback;
	}

	let line: Vec<char> = text.line(line_idx).chars().filter(|c| *c != '\n' && *c != '\r').collect();
	let col = pos.character as usize;
	if col > line.len() {
		return fallback;
	}

	let touches_right = line.get(col).is_some_and(|c| is_word_char(*c));
	let touches_left = col > 0 && is_word_char(line[col - 1]);
	if !touches_right && !touches_left {
		return fallback;
	}

	let mut start = col;
	while start > 0 && is_word_char(line[start - 1]) {
		start -= 1;
	}
	let mut end = col;
	while end < line.len() && is_word_char(line[end]) {
		end += 1;
	}

	DocRange::on_line(pos.line, start as u32, end as u32)
}
