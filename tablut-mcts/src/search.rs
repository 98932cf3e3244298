//! MCTS search loop
//!
//! Implements the search:
//! 1. Root expansion - always, so priors exist even with no simulations
//! 2. Selection - Q + UCT descent to a leaf
//! 3. Expansion/evaluation - terminal result, or one oracle call
//! 4. Backpropagation - the same White-perspective value up to the root
//!
//! After the full simulation budget the root's visit counts give the move
//! distribution.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tablut_core::{GameState, Move, MoveIndex};

use crate::config::MctsConfig;
use crate::error::SearchError;
use crate::oracle::Oracle;
use crate::tree::{MctsTree, NodeId};

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Statistics for a single move at root
#[derive(Clone, Debug, PartialEq)]
pub struct MoveProbability {
    pub mv: Move,
    /// Share of the returned distribution
    pub probability: f32,
    /// N of the root edge
    pub visits: u32,
    /// Q of the root edge, White's perspective
    pub mean_value: f32,
}

/// Result of MCTS search
#[derive(Debug)]
pub struct SearchResult {
    /// The final tree after search
    pub tree: MctsTree,
    /// Simulations performed
    pub simulations: u32,
    /// One entry per root child, in move-generation order
    pub moves: Vec<MoveProbability>,
}

impl SearchResult {
    /// Highest-probability move (first on ties)
    pub fn best_move(&self) -> Option<Move> {
        let mut best: Option<&MoveProbability> = None;
        for entry in &self.moves {
            if best.map_or(true, |b| entry.probability > b.probability) {
                best = Some(entry);
            }
        }
        best.map(|entry| entry.mv)
    }

    /// Draw a move from the distribution
    pub fn sample_move<R: Rng>(&self, rng: &mut R) -> Option<Move> {
        let weights = WeightedIndex::new(self.moves.iter().map(|m| m.probability)).ok()?;
        Some(self.moves[weights.sample(rng)].mv)
    }

    /// Distribution laid out over the full move index (training target layout)
    pub fn policy_vector(&self) -> Result<Vec<f32>, SearchError> {
        let index = MoveIndex::global();
        let mut policy = vec![0.0; index.len()];
        for entry in &self.moves {
            policy[index.id(entry.mv)?] = entry.probability;
        }
        Ok(policy)
    }

    /// Get all moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(Move, u32)> {
        let mut moves: Vec<_> = self.moves.iter().map(|m| (m.mv, m.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }
}

// ============================================================================
// SEARCH ENGINE
// ============================================================================

/// MCTS engine driving an oracle
pub struct Mcts<O> {
    oracle: O,
    config: MctsConfig,
    rng: ChaCha8Rng,
}

impl<O: Oracle> Mcts<O> {
    pub fn new(oracle: O, config: MctsConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self {
            oracle,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Get the search configuration
    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Get the oracle used for expansions
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Search from `root` and return the root move distribution
    pub fn search(&mut self, root: &GameState) -> Result<SearchResult, SearchError> {
        self.search_tree(MctsTree::new(root.clone()))
    }

    /// Run the simulation budget on an existing tree.
    ///
    /// The root is expanded first if it has not been.
    pub fn search_tree(&mut self, mut tree: MctsTree) -> Result<SearchResult, SearchError> {
        let root = tree.root();
        if tree.node(root).state.result().is_over() {
            return Err(SearchError::TerminalRoot);
        }

        tracing::debug!("Starting search: {} simulations, c_puct={}",
                        self.config.simulations, self.config.c_puct);

        if !tree.node(root).is_expanded() {
            tree.expand(root, &self.oracle)?;
        }

        for _ in 0..self.config.simulations {
            let leaf = tree.select_leaf(root, self.config.c_puct, &mut self.rng)?;
            self.expand_and_evaluate(&mut tree, leaf)?;
        }

        let moves = collect_move_probabilities(&tree, self.config.tau);

        tracing::debug!("Search finished: {} nodes, {} root moves",
                        tree.len(), moves.len());

        Ok(SearchResult {
            tree,
            simulations: self.config.simulations,
            moves,
        })
    }

    /// Evaluate `node_id` and backpropagate the value through its parent edge.
    ///
    /// Terminal positions use their fixed result and skip the oracle. A node
    /// that was expanded but has no moves reuses its stored value.
    pub fn expand_and_evaluate(
        &mut self,
        tree: &mut MctsTree,
        node_id: NodeId,
    ) -> Result<(), SearchError> {
        let node = tree.node(node_id);
        let parent_edge = node.parent_edge;

        let value = match (node.state.result().value(), node.value) {
            (Some(terminal), _) => terminal,
            (None, Some(stored)) => stored,
            (None, None) => tree.expand(node_id, &self.oracle)?,
        };

        tree.backpropagate(parent_edge, value);
        Ok(())
    }
}

/// Run independent searches over many roots, one tree each.
///
/// With the `parallel` feature the searches run on the rayon pool. Seeds are
/// derived per root from `config.seed` so results do not depend on scheduling.
#[cfg(feature = "parallel")]
pub fn search_many<O: Oracle + Sync>(
    roots: &[GameState],
    oracle: &O,
    config: &MctsConfig,
) -> Vec<Result<SearchResult, SearchError>> {
    use rayon::prelude::*;

    let base = config.seed.unwrap_or_else(rand::random);
    roots
        .par_iter()
        .enumerate()
        .map(|(i, root)| {
            let config = config.clone().with_seed(base.wrapping_add(i as u64));
            Mcts::new(oracle, config).search(root)
        })
        .collect()
}

/// Run independent searches over many roots, one tree each.
#[cfg(not(feature = "parallel"))]
pub fn search_many<O: Oracle>(
    roots: &[GameState],
    oracle: &O,
    config: &MctsConfig,
) -> Vec<Result<SearchResult, SearchError>> {
    let base = config.seed.unwrap_or_else(rand::random);
    roots
        .iter()
        .enumerate()
        .map(|(i, root)| {
            let config = config.clone().with_seed(base.wrapping_add(i as u64));
            Mcts::new(oracle, config).search(root)
        })
        .collect()
}

// ============================================================================
// STATISTICS COLLECTION
// ============================================================================

/// Root move distribution from final visit counts
fn collect_move_probabilities(tree: &MctsTree, tau: f32) -> Vec<MoveProbability> {
    let edges: Vec<_> = tree
        .root_children()
        .iter()
        .map(|&(edge_id, _)| tree.edge(edge_id))
        .collect();

    let visits: Vec<u32> = edges.iter().map(|e| e.visits).collect();
    let probabilities = if visits.iter().all(|&n| n == 0) {
        // No simulations ran: fall back to the priors
        edges.iter().map(|e| e.prior).collect()
    } else {
        visit_distribution(&visits, tau)
    };

    edges
        .iter()
        .zip(probabilities)
        .filter_map(|(edge, probability)| {
            edge.mv.map(|mv| MoveProbability {
                mv,
                probability,
                visits: edge.visits,
                mean_value: edge.mean_value,
            })
        })
        .collect()
}

/// N^(1/tau) / sum(N^(1/tau)).
///
/// Counts are scaled by the maximum first so large exponents stay finite.
/// tau <= 0 splits all mass evenly between the most visited entries.
pub fn visit_distribution(visits: &[u32], tau: f32) -> Vec<f32> {
    let max = visits.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; visits.len()];
    }

    let weights: Vec<f64> = if tau <= 0.0 {
        visits.iter().map(|&n| if n == max { 1.0 } else { 0.0 }).collect()
    } else {
        let exponent = 1.0 / tau as f64;
        visits
            .iter()
            .map(|&n| (n as f64 / max as f64).powf(exponent))
            .collect()
    };

    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| (w / total) as f32).collect()
}

// ============================================================================
// TESTS
// ============================================================================
