use crate::matcher::{MatchSet, MatchSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Cyclic position within the most recent [`MatchSet`].
///
/// The cursor never re-runs a search. If the buffer changes after
/// [`reset`](Self::reset), the spans it hands out describe the old text until
/// the next search replaces them.
#[derive(Debug, Clone, Default)]
pub struct SearchCursor {
    matches: MatchSet,
    current_index: usize,
}

impl SearchCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, matches: MatchSet) {
        self.matches = matches;
        self.current_index = 0;
    }

    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current(&self) -> Option<MatchSpan> {
        self.matches.get(self.current_index)
    }

    /// 1-based index of the current match and the total, for "3 of 7" style
    /// counters.
    pub fn position(&self) -> Option<(usize, usize)> {
        if self.matches.is_empty() {
            return None;
        }
        Some((self.current_index + 1, self.matches.len()))
    }

    pub fn advance(&mut self, direction: Direction) -> Option<MatchSpan> {
        let len = self.matches.len();
        if len == 0 {
            return None;
        }

        self.current_index = match direction {
            Direction::Next => (self.current_index + 1) % len,
            Direction::Previous => {
                if self.current_index == 0 {
                    len - 1
                } else {
                    self.current_index - 1
                }
            }
        };
        self.current()
    }

    pub fn next(&mut self) -> Option<MatchSpan> {
        self.advance(Direction::Next)
    }

    pub fn previous(&mut self) -> Option<MatchSpan> {
        self.advance(Direction::Previous)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<MatchSpan> {
        if index < self.matches.len() {
            self.current_index = index;
            self.current()
        } else {
            None
        }
    }

    pub fn jump_to_first(&mut self) -> Option<MatchSpan> {
        self.jump_to(0)
    }

    pub fn jump_to_last(&mut self) -> Option<MatchSpan> {
        let index = self.matches.len().checked_sub(1)?;
        self.jump_to(index)
    }

    /// Moves to the first match starting at or after `offset`, wrapping to the
    /// first match when there is none.
    pub fn jump_to_nearest(&mut self, offset: usize) -> Option<MatchSpan> {
        if self.matches.is_empty() {
            return None;
        }

        let index = self.matches.first_at_or_after(offset).unwrap_or(0);
        self.jump_to(index)
    }

    pub fn is_current_match(&self, offset: usize) -> bool {
        self.current().is_some_and(|span| span.contains(offset))
    }

    pub fn is_any_match(&self, offset: usize) -> bool {
        self.matches.any_contains(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_with(starts: &[usize]) -> SearchCursor {
        let spans = starts.iter().map(|&s| MatchSpan::new(s, 2)).collect();
        let mut cursor = SearchCursor::new();
        cursor.reset(MatchSet::from_spans(spans));
        cursor
    }

    #[test]
    fn test_empty_cursor_is_inert() {
        let mut cursor = SearchCursor::new();
        assert!(cursor.is_empty());
        assert!(cursor.current().is_none());
        assert!(cursor.position().is_none());
        assert!(cursor.advance(Direction::Next).is_none());
        assert!(cursor.advance(Direction::Previous).is_none());
        assert!(cursor.jump_to_last().is_none());
        assert!(cursor.jump_to_nearest(0).is_none());
    }

    #[test]
    fn test_navigation() {
        let mut cursor = cursor_with(&[0, 10, 20]);

        assert_eq!(cursor.position(), Some((1, 3)));
        assert_eq!(cursor.current().unwrap().start, 0);

        cursor.next();
        assert_eq!(cursor.position(), Some((2, 3)));
        assert_eq!(cursor.current().unwrap().start, 10);

        cursor.next();
        assert_eq!(cursor.position(), Some((3, 3)));

        cursor.next();
        assert_eq!(cursor.position(), Some((1, 3)));

        cursor.previous();
        assert_eq!(cursor.position(), Some((3, 3)));
    }

    #[test]
    fn test_full_cycle_returns_to_start() {
        let mut cursor = cursor_with(&[1, 4, 9, 16, 25]);
        cursor.jump_to(2);
        let start = cursor.current();

        for _ in 0..cursor.count() {
            cursor.advance(Direction::Next);
        }
        assert_eq!(cursor.current(), start);

        for _ in 0..cursor.count() {
            cursor.advance(Direction::Previous);
        }
        assert_eq!(cursor.current(), start);
    }

    #[test]
    fn test_previous_from_first_wraps_to_last() {
        let mut cursor = cursor_with(&[0, 5, 10]);
        let span = cursor.advance(Direction::Previous).unwrap();
        assert_eq!(span.start, 10);
        assert_eq!(cursor.position(), Some((3, 3)));
    }

    #[test]
    fn test_single_match_cycles_onto_itself() {
        let mut cursor = cursor_with(&[7]);
        assert_eq!(cursor.next().unwrap().start, 7);
        assert_eq!(cursor.previous().unwrap().start, 7);
    }

    #[test]
    fn test_reset_returns_to_first() {
        let mut cursor = cursor_with(&[0, 5, 10]);
        cursor.jump_to_last();

        cursor.reset(MatchSet::from_spans(vec![MatchSpan::new(3, 1), MatchSpan::new(8, 1)]));
        assert_eq!(cursor.position(), Some((1, 2)));
        assert_eq!(cursor.current(), Some(MatchSpan::new(3, 1)));

        cursor.reset(MatchSet::new());
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_jump_to_out_of_range_keeps_index() {
        let mut cursor = cursor_with(&[0, 5]);
        cursor.next();
        assert!(cursor.jump_to(2).is_none());
        assert_eq!(cursor.position(), Some((2, 2)));
    }

    #[test]
    fn test_jump_to_nearest() {
        let mut cursor = cursor_with(&[0, 10, 20, 30]);

        cursor.jump_to_nearest(7);
        assert_eq!(cursor.current().unwrap().start, 10);

        cursor.jump_to_nearest(20);
        assert_eq!(cursor.current().unwrap().start, 20);

        cursor.jump_to_nearest(100);
        assert_eq!(cursor.current().unwrap().start, 0);
    }

    #[test]
    fn test_jump_to_last() {
        let mut cursor = cursor_with(&[0, 10, 20, 30]);

        cursor.jump_to_last();
        assert_eq!(cursor.current().unwrap().start, 30);

        cursor.jump_to_first();
        assert_eq!(cursor.current().unwrap().start, 0);
    }

    #[test]
    fn test_highlight_queries() {
        let mut cursor = cursor_with(&[0, 10]);
        assert!(cursor.is_current_match(1));
        assert!(!cursor.is_current_match(10));
        assert!(cursor.is_any_match(11));
        assert!(!cursor.is_any_match(5));

        cursor.next();
        assert!(cursor.is_current_match(10));
    }
}
