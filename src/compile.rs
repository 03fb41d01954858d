// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Opcode tables and per-tile operation compilation.

use rand::prelude::*;

use crate::block::{PixelBlock, Quadrant};
use crate::key::KeySnapshot;

/// Number of opcodes, and of slots in an opcode table.
pub const OPCODES: usize = 12;

const PAIRS: [(Quadrant, Quadrant); 6] = [
    (Quadrant::TopLeft, Quadrant::TopRight),
    (Quadrant::BottomLeft, Quadrant::BottomRight),
    (Quadrant::TopLeft, Quadrant::BottomLeft),
    (Quadrant::TopRight, Quadrant::BottomRight),
    (Quadrant::TopLeft, Quadrant::BottomRight),
    (Quadrant::BottomLeft, Quadrant::TopRight),
];

/// A transform between two quadrants of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Exchange the pixels of both quadrants.
    Swap(Quadrant, Quadrant),
    /// Perturb the channels of one quadrant, seeded by the other.
    ColorShift(Quadrant, Quadrant),
}

impl Opcode {
    /// Decodes `0..12`: six swaps followed by six color shifts over the same pairs.
    pub const fn from_index(index: u8) -> Self {
        let (a, b) = PAIRS[index as usize % 6];
        if (index as usize) < 6 {
            Self::Swap(a, b)
        } else {
            Self::ColorShift(a, b)
        }
    }

    pub fn index(self) -> u8 {
        let (base, pair) = match self {
            Self::Swap(a, b) => (0, (a, b)),
            Self::ColorShift(a, b) => (6, (a, b)),
        };
        let i = PAIRS.iter().position(|&p| p == pair).unwrap_or(0);
        base + i as u8
    }
}

/// Maps a table slot to an opcode.
pub type OpcodeTable = [Opcode; OPCODES];

/// Compiled transform program for one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub table: OpcodeTable,
    /// Table slots, not opcodes.
    pub sequence: Vec<u8>,
    pub block: PixelBlock,
}

impl Operation {
    /// Resolves the sequence through the table, in playback order.
    pub fn opcodes(&self) -> impl Iterator<Item = Opcode> + '_ {
        self.sequence.iter().map(|&slot| self.table[slot as usize])
    }
}

fn draw_slot<G: SeedableRng + Rng>(seed: u64) -> u8 {
    G::seed_from_u64(seed).gen_range(0..OPCODES as u8)
}

/// Builds the opcode table from the key average.
pub fn compile_table<G: SeedableRng + Rng>(average: u64) -> OpcodeTable {
    std::array::from_fn(|s| Opcode::from_index(draw_slot::<G>(average.wrapping_mul(s as u64 + 1))))
}

/// Builds an operation for `block` from a post-rehash key snapshot.
pub fn compile<G: SeedableRng + Rng>(snapshot: &KeySnapshot, block: PixelBlock) -> Operation {
    Operation {
        table: compile_table::<G>(snapshot.average),
        sequence: snapshot.values.iter().map(|&v| draw_slot::<G>(v)).collect(),
        block,
    }
}
