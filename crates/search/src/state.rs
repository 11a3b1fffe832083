use std::sync::Arc;

use log::{debug, warn};

use crate::cursor::{Direction, SearchCursor};
use crate::engine::{MatchFinder, SearchConfig, SearchMode};
use crate::error::SearchError;
use crate::matcher::{MatchSet, MatchSpan};
use crate::task::SearchTask;

/// Manages the search session lifecycle
#[derive(Default)]
pub struct SearchState {
    config: SearchConfig,
    query: String,
    cursor: SearchCursor,
    error: Option<SearchError>,
    pending: Option<SearchTask>,
    generation: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get current query string
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the search query. Takes effect on the next search.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn mode(&self) -> SearchMode {
        self.config.mode
    }

    pub fn set_mode(&mut self, mode: SearchMode) {
        self.config.mode = mode;
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.config.case_sensitive
    }

    /// Toggle regex mode
    pub fn toggle_regex_mode(&mut self) -> SearchMode {
        self.config.mode = self.config.mode.toggled();
        self.config.mode
    }

    /// Toggle case sensitivity
    pub fn toggle_case_sensitive(&mut self) -> bool {
        self.config.case_sensitive = !self.config.case_sensitive;
        self.config.case_sensitive
    }

    /// Error from the most recent search request, if it failed.
    pub fn error(&self) -> Option<&SearchError> {
        self.error.as_ref()
    }

    pub fn cursor(&self) -> &SearchCursor {
        &self.cursor
    }

    pub fn matches(&self) -> &MatchSet {
        self.cursor.matches()
    }

    pub fn current(&self) -> Option<MatchSpan> {
        self.cursor.current()
    }

    pub fn position(&self) -> Option<(usize, usize)> {
        self.cursor.position()
    }

    /// Run the current query over `buffer` on this thread and replace the
    /// results. On failure the previous results are kept.
    pub fn search(&mut self, buffer: &str) -> Result<(), SearchError> {
        self.cancel_search();
        self.generation = self.generation.wrapping_add(1);

        let finder = self.compile()?;
        self.apply(finder.find(buffer));
        Ok(())
    }

    /// Start the current query on the blocking pool, superseding any search
    /// still in flight. Returns the generation of the new search.
    ///
    /// A query that fails to compile is reported immediately and nothing is
    /// spawned.
    pub fn start_search(&mut self, buffer: Arc<str>) -> Result<u64, SearchError> {
        self.cancel_search();
        self.generation = self.generation.wrapping_add(1);

        let finder = self.compile()?;
        self.pending = Some(SearchTask::spawn(self.generation, finder, buffer));
        Ok(self.generation)
    }

    pub fn is_searching(&self) -> bool {
        self.pending.is_some()
    }

    /// The in-flight search, for the owner to await alongside other events.
    pub fn pending_mut(&mut self) -> Option<&mut SearchTask> {
        self.pending.as_mut()
    }

    /// Hand the in-flight search to the caller. It is no longer cancelled by
    /// [`cancel_search`](Self::cancel_search); its result can still be applied
    /// with [`finish_search`](Self::finish_search).
    pub fn take_pending(&mut self) -> Option<SearchTask> {
        self.pending.take()
    }

    /// Apply the outcome of search `generation`. Results from superseded
    /// searches are dropped. Returns whether the cursor was replaced.
    pub fn finish_search(
        &mut self,
        generation: u64,
        result: Result<MatchSet, SearchError>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping result of search #{} (latest is #{})",
                generation, self.generation
            );
            return false;
        }

        if self
            .pending
            .as_ref()
            .is_some_and(|task| task.generation() == generation)
        {
            self.pending = None;
        }

        match result {
            Ok(matches) => {
                self.apply(matches);
                true
            }
            Err(SearchError::Cancelled) => false,
            Err(e) => {
                warn!("Search #{} failed: {}", generation, e);
                self.error = Some(e);
                false
            }
        }
    }

    /// Block until the in-flight search completes and apply it.
    pub fn wait_for_search(&mut self) -> bool {
        let Some(task) = self.pending.take() else {
            return false;
        };
        let generation = task.generation();
        let result = task.wait();
        self.finish_search(generation, result)
    }

    pub fn cancel_search(&mut self) {
        if let Some(task) = self.pending.take() {
            task.cancel();
        }
    }

    /// Clear search state
    pub fn clear(&mut self) {
        self.cancel_search();
        self.query.clear();
        self.cursor.reset(MatchSet::new());
        self.error = None;
    }

    /// Navigate to next match
    pub fn next_match(&mut self) -> Option<MatchSpan> {
        self.cursor.advance(Direction::Next)
    }

    /// Navigate to previous match
    pub fn previous_match(&mut self) -> Option<MatchSpan> {
        self.cursor.advance(Direction::Previous)
    }

    /// Jump to the first match at or after a character offset
    pub fn jump_to_nearest(&mut self, offset: usize) -> Option<MatchSpan> {
        self.cursor.jump_to_nearest(offset)
    }

    fn compile(&mut self) -> Result<MatchFinder, SearchError> {
        MatchFinder::new(&self.query, self.config).inspect_err(|e| {
            self.error = Some(e.clone());
        })
    }

    fn apply(&mut self, matches: MatchSet) {
        debug!(
            "Applying {} match(es) for {:?}",
            matches.len(),
            self.query
        );
        self.error = None;
        self.cursor.reset(matches);
    }
}
