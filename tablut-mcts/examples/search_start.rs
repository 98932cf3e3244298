//! Example to search the opening position with a uniform oracle
//!
//! Run with: cargo run -p tablut-mcts --example search_start
//! Set RUST_LOG=tablut_mcts=debug to see search progress.

use tablut_core::GameState;
use tablut_mcts::{Mcts, MctsConfig, UniformOracle};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = MctsConfig::with_simulations(400).with_seed(42);
    let mut mcts = Mcts::new(UniformOracle, config);

    let root = GameState::starting_position();
    let result = mcts.search(&root)?;

    println!("Searched {} simulations, {} nodes", result.simulations, result.tree.len());
    for (mv, visits) in result.moves_by_visits().into_iter().take(10) {
        println!("  {} -> {}: {} visits", mv.from, mv.to, visits);
    }
    if let Some(best) = result.best_move() {
        println!("Best move: {} -> {}", best.from, best.to);
    }

    Ok(())
}
