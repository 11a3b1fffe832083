use std::ops::Range;
use std::sync::Arc;

use seekpad_search::MatchSpan;

const ELLIPSIS: char = '\u{2026}';
const NEWLINE_MARKER: char = '\u{21b5}';

/// Editable text with a selection and caret, both in char offsets.
#[derive(Debug, Clone, Default)]
pub struct Document {
    text: String,
    char_len: usize,
    selection: Option<Range<usize>>,
    caret: usize,
}

impl Document {
    pub fn new(text: String) -> Self {
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            selection: None,
            caret: 0,
        }
    }

    pub fn char_len(&self) -> usize {
        self.char_len
    }

    /// Immutable copy of the current text for a search to run against.
    pub fn snapshot(&self) -> Arc<str> {
        Arc::from(self.text.as_str())
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    pub fn selected_text(&self) -> Option<&str> {
        let range = self.selection.as_ref()?;
        Some(&self.text[self.byte_index(range.start)..self.byte_index(range.end)])
    }

    /// Selects `span` and puts the caret at its end. Spans computed before an
    /// edit may run past the end of the text; they are clamped.
    pub fn select(&mut self, span: MatchSpan) {
        let start = span.start.min(self.char_len);
        let end = span.end().min(self.char_len);
        self.selection = Some(start..end);
        self.caret = end;
    }

    pub fn set_caret(&mut self, offset: usize) {
        self.selection = None;
        self.caret = offset.min(self.char_len);
    }

    /// Inserts `text` at a char offset and leaves the caret after it.
    pub fn insert(&mut self, offset: usize, text: &str) {
        let offset = offset.min(self.char_len);
        let byte = self.byte_index(offset);
        self.text.insert_str(byte, text);

        let inserted = text.chars().count();
        self.char_len += inserted;
        self.set_caret(offset + inserted);
    }

    /// 1-based line and column of a char offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut line = 1;
        let mut col = 1;
        for c in self.text.chars().take(offset) {
            if c == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// One-line excerpt of `span` with up to `context` chars on each side. The
    /// match itself is wrapped in brackets.
    pub fn excerpt(&self, span: MatchSpan, context: usize) -> String {
        let start = span.start.min(self.char_len);
        let end = span.end().min(self.char_len);
        let from = start.saturating_sub(context);
        let to = end.saturating_add(context).min(self.char_len);

        let mut out = String::new();
        if from > 0 {
            out.push(ELLIPSIS);
        }
        for (offset, c) in self.text.chars().enumerate().skip(from).take(to - from) {
            if offset == start {
                out.push('[');
            }
            if offset == end {
                out.push(']');
            }
            out.push(if c == '\n' { NEWLINE_MARKER } else { c });
        }
        if start == to {
            out.push('[');
        }
        if end == to {
            out.push(']');
        }
        if to < self.char_len {
            out.push(ELLIPSIS);
        }
        out
    }

    fn byte_index(&self, offset: usize) -> usize {
        self.text
            .char_indices()
            .nth(offset)
            .map_or(self.text.len(), |(i, _)| i)
    }
}
