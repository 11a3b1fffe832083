use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use log::debug;

use crate::cancel::CancelToken;
use crate::engine::MatchFinder;
use crate::error::SearchError;
use crate::matcher::MatchSet;

/// A search running on the blocking thread pool.
///
/// Awaiting the task yields the finished [`MatchSet`]. Dropping it or calling
/// [`cancel`](Self::cancel) raises its token so the worker stops at the next
/// match boundary.
pub struct SearchTask {
    generation: u64,
    token: CancelToken,
    task: smol::Task<Result<MatchSet, SearchError>>,
}

impl SearchTask {
    pub fn spawn(generation: u64, finder: MatchFinder, buffer: Arc<str>) -> Self {
        Self::spawn_with_token(generation, finder, buffer, CancelToken::new())
    }

    pub(crate) fn spawn_with_token(
        generation: u64,
        finder: MatchFinder,
        buffer: Arc<str>,
        token: CancelToken,
    ) -> Self {
        debug!(
            "Spawning search #{} for {:?} over {} bytes",
            generation,
            finder.query(),
            buffer.len()
        );

        let worker_token = token.clone();
        let task = smol::unblock(move || finder.find_with_cancel(&buffer, &worker_token));

        Self {
            generation,
            token,
            task,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(&self) {
        debug!("Cancelling search #{}", self.generation);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Blocks the current thread until the search finishes.
    pub fn wait(self) -> Result<MatchSet, SearchError> {
        smol::block_on(self)
    }
}

impl Future for SearchTask {
    type Output = Result<MatchSet, SearchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx)
    }
}

impl Drop for SearchTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{SearchConfig, SearchMode};

    fn finder(query: &str, mode: SearchMode) -> MatchFinder {
        MatchFinder::new(query, SearchConfig::with_mode(mode)).unwrap()
    }

    #[test]
    fn test_task_resolves_to_matches() {
        let buffer: Arc<str> = Arc::from("one 1 two 22 three 333");
        let task = SearchTask::spawn(7, finder(r"\d+", SearchMode::Pattern), buffer);
        assert_eq!(task.generation(), 7);

        let set = task.wait().unwrap();
        let starts: Vec<usize> = set.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![4, 10, 19]);
    }

    #[test]
    fn test_cancelled_task_resolves_to_cancelled() {
        let token = CancelToken::new();
        token.cancel();

        let buffer: Arc<str> = Arc::from("aaaa");
        let task =
            SearchTask::spawn_with_token(1, finder("a", SearchMode::Literal), buffer, token);
        assert!(task.is_cancelled());
        assert_eq!(task.wait(), Err(SearchError::Cancelled));
    }

    #[test]
    fn test_cancel_stops_a_running_scan() {
        let buffer: Arc<str> = Arc::from("a".repeat(4_000_000));
        let task = SearchTask::spawn(3, finder("a", SearchMode::Literal), buffer);
        task.cancel();
        assert!(task.is_cancelled());
        assert_eq!(task.wait(), Err(SearchError::Cancelled));
    }

    #[test]
    fn test_dropping_task_raises_token() {
        let token = CancelToken::new();
        let buffer: Arc<str> = Arc::from("abc");
        let task = SearchTask::spawn_with_token(
            1,
            finder("b", SearchMode::Literal),
            buffer,
            token.clone(),
        );
        drop(task);
        assert!(token.is_cancelled());
    }
}
