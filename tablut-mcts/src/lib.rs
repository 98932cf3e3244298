//! Tablut MCTS - Oracle-guided Monte Carlo Tree Search
//!
//! This crate provides the search used for self-play:
//! - Arena tree with per-edge N/W/Q/P statistics
//! - Q + UCT selection with prior-weighted exploration
//! - One oracle call per expansion, exact values at terminal positions
//! - Temperature-controlled root move distribution

pub mod config;
pub mod error;
pub mod oracle;
pub mod search;
pub mod tree;

pub use config::MctsConfig;
pub use error::SearchError;
pub use oracle::{Oracle, OracleError, Prediction, UniformOracle};
pub use search::{search_many, visit_distribution, Mcts, MoveProbability, SearchResult};
pub use tree::{Edge, EdgeId, MctsNode, MctsTree, NodeId};
