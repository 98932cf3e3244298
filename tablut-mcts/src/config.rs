//! Search configuration

use serde::{Deserialize, Serialize};

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Simulations per search (after the root expansion)
    pub simulations: u32,
    /// Exploration constant in the UCT term
    pub c_puct: f32,
    /// Temperature for the returned distribution. 1.0 is proportional to
    /// visits, values at or below 0.0 put all mass on the most visited moves.
    pub tau: f32,
    /// Seed for tie-breaking (None = random)
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            simulations: 100,
            c_puct: 1.0,
            tau: 1.0,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Default config with a given simulation budget
    pub fn with_simulations(simulations: u32) -> Self {
        Self {
            simulations,
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_c_puct(mut self, c_puct: f32) -> Self {
        self.c_puct = c_puct;
        self
    }

    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    /// Argmax-by-visits distribution (tau -> 0)
    pub fn greedy(self) -> Self {
        self.with_tau(0.0)
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
