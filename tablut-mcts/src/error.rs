//! Search errors

use tablut_core::GameError;
use thiserror::Error;

use crate::oracle::OracleError;

/// Errors surfaced by the search. All indicate integration or internal
/// consistency problems; none are recovered from in place.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Search invariant violated: {0}")]
    Invariant(String),

    #[error("Cannot search from a finished game")]
    TerminalRoot,
}
