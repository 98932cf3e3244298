//! Oracle input encoding
//!
//! Plane order is part of the oracle contract: White occupancy, Black
//! occupancy, King occupancy, then a turn plane (all ones when White is to
//! move). Squares are row-major within each plane.

use crate::board::{all_squares, NUM_SQUARES};
use crate::game::GameState;
use crate::pieces::{Piece, Player};

pub const NUM_PLANES: usize = 4;

/// Turn bits in the flat encoding
pub const FLAT_TURN_BITS: usize = 9;

/// Length of `GameState::to_network_input`
pub const FLAT_INPUT_LEN: usize = 3 * NUM_SQUARES + FLAT_TURN_BITS;

/// Binary planes over the 81 squares
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkInput {
    pub planes: [[u8; NUM_SQUARES]; NUM_PLANES],
}

impl NetworkInput {
    pub fn white(&self) -> &[u8; NUM_SQUARES] {
        &self.planes[0]
    }

    pub fn black(&self) -> &[u8; NUM_SQUARES] {
        &self.planes[1]
    }

    pub fn king(&self) -> &[u8; NUM_SQUARES] {
        &self.planes[2]
    }

    pub fn turn(&self) -> &[u8; NUM_SQUARES] {
        &self.planes[3]
    }

    /// Planes concatenated in order, as floats
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.planes
            .iter()
            .flat_map(|plane| plane.iter().map(|&bit| bit as f32))
            .collect()
    }
}

impl GameState {
    /// Four-plane encoding consumed by the oracle
    pub fn to_network_input_multidim(&self) -> NetworkInput {
        let mut planes = [[0u8; NUM_SQUARES]; NUM_PLANES];

        for sq in all_squares() {
            let plane = match self.piece_at(sq) {
                Piece::White => 0,
                Piece::Black => 1,
                Piece::King => 2,
                Piece::Empty => continue,
            };
            planes[plane][sq.index()] = 1;
        }

        if self.turn() == Player::White {
            planes[3] = [1; NUM_SQUARES];
        }

        NetworkInput { planes }
    }

    /// Flat encoding: three occupancy planes followed by nine turn bits
    pub fn to_network_input(&self) -> Vec<u8> {
        let planes = self.to_network_input_multidim();
        let turn_bit = u8::from(self.turn() == Player::White);

        let mut flat = Vec::with_capacity(FLAT_INPUT_LEN);
        for plane in &planes.planes[..3] {
            flat.extend_from_slice(plane);
        }
        flat.extend(std::iter::repeat(turn_bit).take(FLAT_TURN_BITS));
        flat
    }
}
