/// A single match, measured in characters from the start of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchSpan {
    pub start: usize,
    pub length: usize,
}

impl MatchSpan {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Offset one past the last character of the match. The caret lands here
    /// when the span is applied as a selection.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end()
    }
}

/// Ordered, non-overlapping matches produced by one search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
    spans: Vec<MatchSpan>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spans(spans: Vec<MatchSpan>) -> Self {
        debug_assert!(
            spans.windows(2).all(|w| w[0].start < w[1].start),
            "match spans must be strictly increasing"
        );
        Self { spans }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<MatchSpan> {
        self.spans.get(index).copied()
    }

    pub fn spans(&self) -> &[MatchSpan] {
        &self.spans
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchSpan> {
        self.spans.iter()
    }

    /// Spans that intersect `[start, end)`. Zero-length spans count when they
    /// sit inside the range.
    pub fn spans_in_range(&self, start: usize, end: usize) -> &[MatchSpan] {
        let first = self.spans.partition_point(|s| s.end() <= start && s.start < start);
        let last = self.spans.partition_point(|s| s.start < end);
        if first >= last {
            return &[];
        }
        &self.spans[first..last]
    }

    /// Index of the first span starting at or after `offset`.
    pub(crate) fn first_at_or_after(&self, offset: usize) -> Option<usize> {
        let index = self.spans.partition_point(|s| s.start < offset);
        (index < self.spans.len()).then_some(index)
    }

    pub(crate) fn any_contains(&self, offset: usize) -> bool {
        // Spans are sorted and disjoint, so only the last span starting at or
        // before `offset` can contain it.
        let index = self.spans.partition_point(|s| s.start <= offset);
        index
            .checked_sub(1)
            .and_then(|i| self.spans.get(i))
            .is_some_and(|s| s.contains(offset))
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a MatchSpan;
    type IntoIter = std::slice::Iter<'a, MatchSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}
