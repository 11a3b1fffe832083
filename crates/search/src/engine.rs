use log::debug;
use regex::{Regex, RegexBuilder};

use crate::cancel::CancelToken;
use crate::error::SearchError;
use crate::matcher::{MatchSet, MatchSpan};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    #[default]
    Literal,
    Pattern,
}

impl SearchMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Literal => Self::Pattern,
            Self::Pattern => Self::Literal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Pattern => "regex",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    pub case_sensitive: bool,
    pub mode: SearchMode,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            mode: SearchMode::Literal,
        }
    }
}

impl SearchConfig {
    pub fn with_mode(mode: SearchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Compiled query that can be run against any number of buffers.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    config: SearchConfig,
    query: String,
    compiled: Option<Regex>,
}

impl MatchFinder {
    /// Compiles `query` for `config`. An empty query compiles to a finder that
    /// never matches.
    pub fn new(query: &str, config: SearchConfig) -> Result<Self, SearchError> {
        if query.is_empty() {
            return Ok(Self {
                config,
                query: String::new(),
                compiled: None,
            });
        }

        let mut builder = match config.mode {
            SearchMode::Literal => {
                let mut builder = RegexBuilder::new(&regex::escape(query));
                // An escaped literal is never rejected for its size.
                builder.size_limit(usize::MAX);
                builder
            }
            SearchMode::Pattern => RegexBuilder::new(query),
        };

        let compiled = builder
            .case_insensitive(!config.case_sensitive)
            .build()
            .map_err(|e| {
                debug!("Rejected {} query {:?}: {}", config.mode.label(), query, e);
                SearchError::InvalidPattern {
                    pattern: query.to_string(),
                    message: e.to_string(),
                }
            })?;

        debug!(
            "Compiled {} query {:?} (case {})",
            config.mode.label(),
            query,
            if config.case_sensitive {
                "sensitive"
            } else {
                "insensitive"
            }
        );

        Ok(Self {
            config,
            query: query.to_string(),
            compiled: Some(compiled),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn has_pattern(&self) -> bool {
        self.compiled.is_some()
    }

    pub fn find(&self, buffer: &str) -> MatchSet {
        self.scan(buffer, || false).unwrap_or_default()
    }

    /// Like [`find`](Self::find), but gives up with [`SearchError::Cancelled`]
    /// once `token` is raised.
    pub fn find_with_cancel(
        &self,
        buffer: &str,
        token: &CancelToken,
    ) -> Result<MatchSet, SearchError> {
        self.scan(buffer, || token.is_cancelled())
            .ok_or(SearchError::Cancelled)
    }

    /// Returns `None` if `is_cancelled` fires before the scan completes.
    fn scan(&self, buffer: &str, is_cancelled: impl Fn() -> bool) -> Option<MatchSet> {
        let Some(regex) = &self.compiled else {
            return Some(MatchSet::new());
        };

        let mut spans = Vec::new();
        let mut offsets = CharOffsets::new(buffer);
        let mut pos = 0;

        while pos <= buffer.len() {
            if is_cancelled() {
                debug!("Search for {:?} cancelled at byte {}", self.query, pos);
                return None;
            }

            let Some(m) = regex.find_at(buffer, pos) else {
                break;
            };

            let start = offsets.char_offset(m.start());
            let end = offsets.char_offset(m.end());
            spans.push(MatchSpan::new(start, end - start));

            pos = if m.start() == m.end() {
                // Step over one character so an empty match cannot repeat.
                step_char(buffer, m.end())
            } else {
                m.end()
            };
        }

        debug!(
            "Found {} {} match(es) for {:?}",
            spans.len(),
            self.config.mode.label(),
            self.query
        );
        Some(MatchSet::from_spans(spans))
    }
}

/// One-shot search with the default (case-sensitive) configuration.
pub fn find(buffer: &str, query: &str, mode: SearchMode) -> Result<MatchSet, SearchError> {
    let finder = MatchFinder::new(query, SearchConfig::with_mode(mode))?;
    Ok(finder.find(buffer))
}

/// Byte offset just past the character at `byte`, or past the end of the
/// buffer when `byte` is already at the end.
fn step_char(buffer: &str, byte: usize) -> usize {
    buffer[byte..]
        .chars()
        .next()
        .map_or(buffer.len() + 1, |c| byte + c.len_utf8())
}

/// Converts monotonically increasing byte offsets into char offsets without
/// rescanning the buffer from the start each time.
struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    fn char_offset(&mut self, byte: usize) -> usize {
        debug_assert!(byte >= self.byte);
        self.chars += self.text[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}
