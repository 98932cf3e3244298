//! MCTS tree structure and node management
//!
//! Uses arena allocation: the tree owns every node and edge, and they refer
//! to each other by index. Each edge carries the statistics for the move it
//! represents; each node owns its own copy of the position.
//!
//! The root node hangs off a root edge with no move. Its visit count is the
//! parent count the root's children see in the UCT term.

use rand::Rng;
use tablut_core::{GameState, Move, MoveIndex, Player};

use crate::error::SearchError;
use crate::oracle::Oracle;

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// Edge identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub const ROOT: EdgeId = EdgeId(0);
}

/// A candidate move and its search statistics
#[derive(Clone, Debug)]
pub struct Edge {
    /// Move played (None for the root edge)
    pub mv: Option<Move>,
    /// Node the move is played from (None for the root edge)
    pub parent: Option<NodeId>,
    /// Node reached by the move
    pub child: NodeId,
    /// N: visit count
    pub visits: u32,
    /// W: cumulative value, White's perspective
    pub total_value: f32,
    /// Q: W / N, 0 while unvisited
    pub mean_value: f32,
    /// P: normalized prior, set once at expansion
    pub prior: f32,
}

impl Edge {
    fn new(mv: Option<Move>, parent: Option<NodeId>, child: NodeId, prior: f32) -> Self {
        Self {
            mv,
            parent,
            child,
            visits: 0,
            total_value: 0.0,
            mean_value: 0.0,
            prior,
        }
    }

    /// Record one visit with `value`
    fn update(&mut self, value: f32) {
        self.visits += 1;
        self.total_value += value;
        self.mean_value = self.total_value / self.visits as f32;
    }
}

/// A position in the tree
#[derive(Clone, Debug)]
pub struct MctsNode {
    /// Position at this node
    pub state: GameState,
    /// Edge leading into this node
    pub parent_edge: EdgeId,
    /// Outgoing (edge, child) pairs in move-generation order
    pub children: Vec<(EdgeId, NodeId)>,
    /// Oracle value from this node's expansion
    pub value: Option<f32>,
}

impl MctsNode {
    fn new(state: GameState, parent_edge: EdgeId) -> Self {
        Self {
            state,
            parent_edge,
            children: Vec::new(),
            value: None,
        }
    }

    /// Not yet given children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Has the oracle been consulted for this node?
    pub fn is_expanded(&self) -> bool {
        self.value.is_some()
    }
}

// ============================================================================
// MCTS TREE (Tree Operations)
// ============================================================================

/// MCTS search tree with arena allocation
#[derive(Clone, Debug)]
pub struct MctsTree {
    nodes: Vec<MctsNode>,
    edges: Vec<Edge>,
}

impl MctsTree {
    /// Create a new tree with the given root state.
    ///
    /// The root edge starts with one visit so the exploration term is live
    /// on the first descent.
    pub fn new(root_state: GameState) -> Self {
        let mut root_edge = Edge::new(None, None, NodeId::ROOT, 1.0);
        root_edge.visits = 1;

        Self {
            nodes: vec![MctsNode::new(root_state, EdgeId::ROOT)],
            edges: vec![root_edge],
        }
    }

    /// Get the root node id
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get the edge leading into the root
    pub fn root_edge(&self) -> EdgeId {
        EdgeId::ROOT
    }

    /// Get a reference to a node
    pub fn node(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0]
    }

    /// Get a reference to an edge
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Root (edge, child) pairs
    pub fn root_children(&self) -> &[(EdgeId, NodeId)] {
        &self.node(self.root()).children
    }

    /// Every edge including the root edge
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    // ========================================================================
    // Expansion
    // ========================================================================

    /// Give `node_id` one child per legal move and set the children's priors
    /// from a single oracle call. Returns the oracle's value.
    ///
    /// Nothing is written to the tree unless the whole expansion succeeds.
    pub fn expand<O: Oracle + ?Sized>(
        &mut self,
        node_id: NodeId,
        oracle: &O,
    ) -> Result<f32, SearchError> {
        let node = self.node(node_id);
        if node.is_expanded() {
            return Err(SearchError::Invariant(format!(
                "node {} expanded twice",
                node_id.0
            )));
        }

        let index = MoveIndex::global();
        let state = &node.state;
        let moves = state.generate_moves();

        let prediction = oracle.predict(&state.to_network_input_multidim())?;
        prediction.validate(index.len())?;

        let mut priors = Vec::with_capacity(moves.len());
        for &mv in moves {
            priors.push(prediction.policy[index.id(mv)?]);
        }
        normalize_priors(&mut priors);

        let children: Vec<(Move, f32, GameState)> = moves
            .iter()
            .zip(priors)
            .map(|(&mv, prior)| {
                let mut child_state = state.clone();
                child_state.apply_move(mv);
                (mv, prior, child_state)
            })
            .collect();

        let mut links = Vec::with_capacity(children.len());
        for (mv, prior, child_state) in children {
            let child_id = NodeId(self.nodes.len());
            let edge_id = EdgeId(self.edges.len());
            self.edges.push(Edge::new(Some(mv), Some(node_id), child_id, prior));
            self.nodes.push(MctsNode::new(child_state, edge_id));
            links.push((edge_id, child_id));
        }

        tracing::trace!("Expanded node {} with {} children, value={:.3}",
                        node_id.0, links.len(), prediction.value);

        let node = &mut self.nodes[node_id.0];
        node.children = links;
        node.value = Some(prediction.value);

        Ok(prediction.value)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// UCT exploration term.
    ///
    /// c_puct * P * sqrt(parent_visits) / (1 + N), where `parent_visits` is the
    /// visit count of the edge leading into the parent node.
    pub fn uct(edge: &Edge, parent_visits: u32, c_puct: f32) -> f32 {
        c_puct * edge.prior * (parent_visits as f32).sqrt() / (1 + edge.visits) as f32
    }

    /// Descend from `start` to a leaf.
    ///
    /// At each node the child maximising Q + UCT is chosen, with Q negated
    /// when Black is to move. Exact ties are broken uniformly at random.
    pub fn select_leaf<R: Rng>(
        &self,
        start: NodeId,
        c_puct: f32,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let mut current = start;

        while !self.node(current).is_leaf() {
            current = self.select_child(current, c_puct, rng)?;
        }

        Ok(current)
    }

    fn select_child<R: Rng>(
        &self,
        node_id: NodeId,
        c_puct: f32,
        rng: &mut R,
    ) -> Result<NodeId, SearchError> {
        let node = self.node(node_id);
        let parent_visits = self.edge(node.parent_edge).visits;
        let black_to_move = node.state.turn() == Player::Black;

        let mut best_score = f32::NEG_INFINITY;
        let mut best: Vec<NodeId> = Vec::new();

        for &(edge_id, child_id) in &node.children {
            let edge = self.edge(edge_id);
            let q = if black_to_move { -edge.mean_value } else { edge.mean_value };
            let score = q + Self::uct(edge, parent_visits, c_puct);

            if score.is_nan() {
                continue;
            }
            if score > best_score {
                best_score = score;
                best.clear();
                best.push(child_id);
            } else if score == best_score {
                best.push(child_id);
            }
        }

        match best.len() {
            0 => Err(SearchError::Invariant(format!(
                "no scorable child under node {}",
                node_id.0
            ))),
            1 => Ok(best[0]),
            n => Ok(best[rng.gen_range(0..n)]),
        }
    }

    // ========================================================================
    // Backpropagation
    // ========================================================================

    /// Add `value` (White's perspective) to `edge_id` and every edge above it,
    /// up to and including the root edge. The sign is never flipped here.
    pub fn backpropagate(&mut self, edge_id: EdgeId, value: f32) {
        let mut current = Some(edge_id);

        while let Some(id) = current {
            let edge = &mut self.edges[id.0];
            edge.update(value);
            current = edge.parent.map(|parent| self.nodes[parent.0].parent_edge);
        }
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

/// Scale priors to sum to 1. Zero total mass falls back to uniform.
fn normalize_priors(priors: &mut [f32]) {
    if priors.is_empty() {
        return;
    }

    let total: f32 = priors.iter().sum();
    if total > 0.0 {
        for p in priors.iter_mut() {
            *p /= total;
        }
    } else {
        tracing::warn!("Oracle gave no mass to any of {} legal moves, using uniform priors",
                       priors.len());
        let uniform = 1.0 / priors.len() as f32;
        priors.fill(uniform);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{OracleError, Prediction, UniformOracle};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tablut_core::{NetworkInput, Square};

    /// Oracle that puts extra mass on one move id
    struct FavouriteOracle {
        favourite: usize,
        value: f32,
    }

    impl Oracle for FavouriteOracle {
        fn predict(&self, _input: &NetworkInput) -> Result<Prediction, OracleError> {
            let mut policy = vec![0.001; MoveIndex::global().len()];
            policy[self.favourite] = 0.5;
            Ok(Prediction { policy, value: self.value })
        }
    }

    fn mv(from: u8, to: u8) -> Move {
        Move::new(Square(from), Square(to))
    }

    #[test]
    fn test_tree_creation() {
        let tree = MctsTree::new(GameState::starting_position());

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.edge(tree.root_edge()).visits, 1);
        assert!(tree.edge(tree.root_edge()).parent.is_none());
    }

    #[test]
    fn test_expansion_creates_all_children() {
        let mut tree = MctsTree::new(GameState::starting_position());
        let value = tree.expand(NodeId::ROOT, &UniformOracle).unwrap();

        assert_eq!(value, 0.0);
        assert_eq!(tree.root_children().len(), 56);
        assert_eq!(tree.len(), 57);

        for &(edge_id, child_id) in tree.root_children() {
            let edge = tree.edge(edge_id);
            assert_eq!(edge.parent, Some(NodeId::ROOT));
            assert_eq!(edge.child, child_id);
            assert_eq!(tree.node(child_id).parent_edge, edge_id);
            assert_eq!(tree.node(child_id).state.turn(), Player::Black);
        }
    }

    #[test]
    fn test_priors_normalized() {
        let mut tree = MctsTree::new(GameState::starting_position());
        let favourite = MoveIndex::global().id(mv(22, 23)).unwrap();
        tree.expand(NodeId::ROOT, &FavouriteOracle { favourite, value: 0.3 }).unwrap();

        let total: f32 = tree
            .root_children()
            .iter()
            .map(|&(e, _)| tree.edge(e).prior)
            .sum();
        assert!((total - 1.0).abs() < 1e-5);

        let (top, _) = tree.root_children()[0];
        assert_eq!(tree.edge(top).mv, Some(mv(22, 23)));
        assert!(tree.edge(top).prior > 0.8);
    }

    #[test]
    fn test_children_own_their_positions() {
        let mut tree = MctsTree::new(GameState::starting_position());
        tree.expand(NodeId::ROOT, &UniformOracle).unwrap();

        let (_, first) = tree.root_children()[0];
        let (_, second) = tree.root_children()[1];
        assert_eq!(tree.node(first).state.piece_at(Square(23)), tablut_core::Piece::White);
        assert_eq!(tree.node(second).state.piece_at(Square(23)), tablut_core::Piece::Empty);
        assert_eq!(tree.node(NodeId::ROOT).state.piece_at(Square(22)), tablut_core::Piece::White);
    }

    #[test]
    fn test_double_expansion_rejected() {
        let mut tree = MctsTree::new(GameState::starting_position());
        tree.expand(NodeId::ROOT, &UniformOracle).unwrap();
        let err = tree.expand(NodeId::ROOT, &UniformOracle).unwrap_err();
        assert!(matches!(err, SearchError::Invariant(_)));
        assert_eq!(tree.len(), 57);
    }

    #[test]
    fn test_failed_oracle_leaves_tree_untouched() {
        struct Broken;
        impl Oracle for Broken {
            fn predict(&self, _input: &NetworkInput) -> Result<Prediction, OracleError> {
                Ok(Prediction { policy: vec![0.1; 3], value: 0.0 })
            }
        }

        let mut tree = MctsTree::new(GameState::starting_position());
        let err = tree.expand(NodeId::ROOT, &Broken).unwrap_err();
        assert!(matches!(err, SearchError::Oracle(OracleError::PolicyLength { .. })));
        assert_eq!(tree.len(), 1);
        assert!(!tree.node(NodeId::ROOT).is_expanded());
    }

    #[test]
    fn test_zero_mass_priors_fall_back_to_uniform() {
        let mut priors = vec![0.0; 4];
        normalize_priors(&mut priors);
        assert!(priors.iter().all(|&p| (p - 0.25).abs() < 1e-6));

        let mut empty: Vec<f32> = Vec::new();
        normalize_priors(&mut empty);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_uct_formula() {
        let mut edge = Edge::new(None, None, NodeId::ROOT, 0.5);
        assert!((MctsTree::uct(&edge, 4, 1.0) - 1.0).abs() < 1e-6);
        edge.visits = 3;
        assert!((MctsTree::uct(&edge, 16, 2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_on_leaf_returns_it() {
        let tree = MctsTree::new(GameState::starting_position());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(tree.select_leaf(NodeId::ROOT, 1.0, &mut rng).unwrap(), NodeId::ROOT);
    }

    #[test]
    fn test_select_follows_prior() {
        let mut tree = MctsTree::new(GameState::starting_position());
        let favourite = MoveIndex::global().id(mv(58, 59)).unwrap();
        tree.expand(NodeId::ROOT, &FavouriteOracle { favourite, value: 0.0 }).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let leaf = tree.select_leaf(NodeId::ROOT, 1.0, &mut rng).unwrap();
        let edge = tree.edge(tree.node(leaf).parent_edge);
        assert_eq!(edge.mv, Some(mv(58, 59)));
    }

    #[test]
    fn test_select_negates_q_for_black() {
        // Black to move: the child with the lowest Q is preferred
        let mut game = GameState::starting_position();
        game.apply_move(mv(22, 23));
        let mut tree = MctsTree::new(game);
        tree.expand(NodeId::ROOT, &UniformOracle).unwrap();

        let children = tree.root_children().to_vec();
        for (i, &(edge_id, _)) in children.iter().enumerate() {
            let value = if i == 5 { -1.0 } else { 1.0 };
            tree.backpropagate(edge_id, value);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let leaf = tree.select_leaf(NodeId::ROOT, 1.0, &mut rng).unwrap();
        assert_eq!(leaf, children[5].1);
    }

    #[test]
    fn test_backpropagation() {
        let mut tree = MctsTree::new(GameState::starting_position());
        tree.expand(NodeId::ROOT, &UniformOracle).unwrap();
        let (edge_id, child_id) = tree.root_children()[0];
        tree.expand(child_id, &UniformOracle).unwrap();
        let (grand_edge, _) = tree.node(child_id).children[0];

        tree.backpropagate(grand_edge, 1.0);
        tree.backpropagate(grand_edge, -0.5);

        let grand = tree.edge(grand_edge);
        assert_eq!(grand.visits, 2);
        assert_eq!(grand.total_value, 0.5);
        assert_eq!(grand.mean_value, 0.25);

        // Same value, unchanged sign, at every level
        let edge = tree.edge(edge_id);
        assert_eq!(edge.visits, 2);
        assert_eq!(edge.mean_value, 0.25);

        let root = tree.edge(tree.root_edge());
        assert_eq!(root.visits, 3);
        assert_eq!(root.total_value, 0.5);
    }
}
