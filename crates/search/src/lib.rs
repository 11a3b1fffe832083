//! In-document search for seekpad: match finding, cyclic navigation and
//! background search tasks.

mod cancel;
mod cursor;
mod engine;
mod error;
mod matcher;
mod state;
mod task;

pub use cancel::CancelToken;
pub use cursor::{Direction, SearchCursor};
pub use engine::{MatchFinder, SearchConfig, SearchMode, find};
pub use error::SearchError;
pub use matcher::{MatchSet, MatchSpan};
pub use state::SearchState;
pub use task::SearchTask;
