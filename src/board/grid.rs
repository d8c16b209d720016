//! Rectangular field storage for the hex board
//!
//! Fields live in a row-major `Vec`; each one knows its cube coordinate and
//! holds at most one unit. Only the board actor owns a grid.

use crate::board::hex::HexCoord;
use crate::core::types::{Position, UnitId};

/// A single field on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub hex: HexCoord,
    pub unit: Option<UnitId>,
}

/// Fixed-size board of hex fields
#[derive(Debug, Clone)]
pub struct BoardGrid {
    width: u32,
    height: u32,
    fields: Vec<Field>,
}

impl BoardGrid {
    pub fn new(width: u32, height: u32) -> Self {
        let mut fields = Vec::with_capacity((width * height) as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                fields.push(Field {
                    hex: HexCoord::from_position(Position::new(x, y)),
                    unit: None,
                });
            }
        }
        Self {
            width,
            height,
            fields,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    pub fn field(&self, pos: Position) -> Option<&Field> {
        self.index(pos).map(|i| &self.fields[i])
    }

    /// Unit standing on `pos`, if any
    pub fn occupant(&self, pos: Position) -> Option<UnitId> {
        self.field(pos).and_then(|f| f.unit)
    }

    /// Put a unit on an empty on-board field
    ///
    /// Returns false (and changes nothing) if the field is off the board or taken.
    pub fn place(&mut self, pos: Position, unit: UnitId) -> bool {
        match self.index(pos) {
            Some(i) if self.fields[i].unit.is_none() => {
                self.fields[i].unit = Some(unit);
                true
            }
            _ => false,
        }
    }

    /// Empty a field, returning whoever stood there
    pub fn clear(&mut self, pos: Position) -> Option<UnitId> {
        let i = self.index(pos)?;
        self.fields[i].unit.take()
    }

    /// Find the field a unit stands on
    pub fn locate(&self, unit: UnitId) -> Option<Position> {
        self.fields
            .iter()
            .position(|f| f.unit == Some(unit))
            .map(|i| self.position_of(i))
    }

    /// Hex distance between two board positions
    pub fn distance(&self, a: Position, b: Position) -> u32 {
        HexCoord::from_position(a).distance(&HexCoord::from_position(b))
    }

    /// On-board positions within `range` of `center`, excluding the center, row-major order
    pub fn positions_within(&self, center: Position, range: u32) -> Vec<Position> {
        let mut positions: Vec<Position> = HexCoord::from_position(center)
            .hexes_in_range(range)
            .into_iter()
            .map(|h| h.to_position())
            .filter(|p| self.contains(*p))
            .collect();
        positions.sort_by_key(|p| (p.y, p.x));
        positions
    }

    /// Empty on-board neighbours of `pos`
    pub fn free_neighbours(&self, pos: Position) -> Vec<Position> {
        HexCoord::from_position(pos)
            .neighbors()
            .iter()
            .map(|h| h.to_position())
            .filter(|p| self.contains(*p) && self.occupant(*p).is_none())
            .collect()
    }

    /// Base locations in the order factions claim them
    pub fn spawn_corners(&self) -> [Position; 4] {
        let right = self.width as i32 - 2;
        let bottom = self.height as i32 - 2;
        [
            Position::new(1, 1),
            Position::new(1, bottom),
            Position::new(right, 1),
            Position::new(right, bottom),
        ]
    }

    /// Every occupied field in row-major order
    pub fn occupied(&self) -> impl Iterator<Item = (Position, UnitId)> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter_map(|(i, f)| f.unit.map(|u| (self.position_of(i), u)))
    }
}
