//! Hex coordinate system for the game board (cube coordinates)
//!
//! Fields are stored in a rectangular array; each one carries its cube
//! coordinate so range checks are a plain distance comparison.

use serde::{Deserialize, Serialize};

use crate::core::types::Position;

/// Cube hex coordinate, `q + r + s == 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl HexCoord {
    /// Build from axial (q, r); s is derived
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    /// Build from all three cube components, rejecting triples off the plane
    pub fn from_cube(q: i32, r: i32, s: i32) -> Option<Self> {
        (q + r + s == 0).then_some(Self { q, r, s })
    }

    /// Map a board column/row to its hex (odd-q column layout)
    pub fn from_position(pos: Position) -> Self {
        let q = pos.x;
        let r = pos.y - pos.x.div_euclid(2);
        Self::new(q, r)
    }

    /// Inverse of [`HexCoord::from_position`]
    pub fn to_position(&self) -> Position {
        Position::new(self.q, self.r + self.q.div_euclid(2))
    }

    /// Manhattan distance in hex space
    pub fn distance(&self, other: &Self) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s - other.s).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),
            HexCoord::new(self.q + 1, self.r - 1),
            HexCoord::new(self.q, self.r - 1),
            HexCoord::new(self.q - 1, self.r),
            HexCoord::new(self.q - 1, self.r + 1),
            HexCoord::new(self.q, self.r + 1),
        ]
    }

    /// Get all hexes within range, excluding self
    pub fn hexes_in_range(&self, range: u32) -> Vec<HexCoord> {
        let range = range as i32;
        let mut results = Vec::new();
        for q in -range..=range {
            for r in (-range).max(-q - range)..=range.min(-q + range) {
                if q == 0 && r == 0 {
                    continue;
                }
                results.push(HexCoord::new(self.q + q, self.r + r));
            }
        }
        results
    }
}
