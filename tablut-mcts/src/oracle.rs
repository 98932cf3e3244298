//! Oracle contract
//!
//! The oracle maps a four-plane position encoding to a policy over the whole
//! move index and a scalar value from White's perspective. In training this is
//! a neural network; it is opaque to the search.

use std::sync::Arc;

use tablut_core::{MoveIndex, NetworkInput};
use thiserror::Error;

/// Errors raised by, or detected in the output of, an oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Policy length {actual}, expected {expected}")]
    PolicyLength { expected: usize, actual: usize },

    #[error("Invalid policy entry at index {index}")]
    InvalidPolicy { index: usize },

    #[error("Invalid value estimate: {0}")]
    InvalidValue(f32),

    #[error("Oracle failed: {0}")]
    Failed(String),
}

/// Oracle output for one position
#[derive(Clone, Debug)]
pub struct Prediction {
    /// Prior mass per move id. Not normalized to the legal subset.
    pub policy: Vec<f32>,
    /// Expected outcome in roughly [-1, 1], White's perspective
    pub value: f32,
}

impl Prediction {
    /// Check shape and finiteness against a move index of `expected_len` ids
    pub fn validate(&self, expected_len: usize) -> Result<(), OracleError> {
        if self.policy.len() != expected_len {
            return Err(OracleError::PolicyLength {
                expected: expected_len,
                actual: self.policy.len(),
            });
        }
        if let Some(index) = self.policy.iter().position(|p| !p.is_finite() || *p < 0.0) {
            return Err(OracleError::InvalidPolicy { index });
        }
        if !self.value.is_finite() {
            return Err(OracleError::InvalidValue(self.value));
        }
        Ok(())
    }
}

/// Position evaluator consumed by the search.
///
/// Called once per expanded node; the search never assumes results are cached.
pub trait Oracle {
    fn predict(&self, input: &NetworkInput) -> Result<Prediction, OracleError>;
}

impl<O: Oracle + ?Sized> Oracle for &O {
    fn predict(&self, input: &NetworkInput) -> Result<Prediction, OracleError> {
        (**self).predict(input)
    }
}

impl<O: Oracle + ?Sized> Oracle for Box<O> {
    fn predict(&self, input: &NetworkInput) -> Result<Prediction, OracleError> {
        (**self).predict(input)
    }
}

impl<O: Oracle + ?Sized> Oracle for Arc<O> {
    fn predict(&self, input: &NetworkInput) -> Result<Prediction, OracleError> {
        (**self).predict(input)
    }
}

/// Equal mass on every move id and a neutral value.
/// Useful for exercising the search without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformOracle;

impl UniformOracle {
    pub fn new() -> Self {
        Self
    }
}

impl Oracle for UniformOracle {
    fn predict(&self, _input: &NetworkInput) -> Result<Prediction, OracleError> {
        let len = MoveIndex::global().len();
        Ok(Prediction {
            policy: vec![1.0 / len as f32; len],
            value: 0.0,
        })
    }
}
