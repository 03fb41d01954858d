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

//! Key schedule: derives and re-derives the numeric node sequence of a key.

use std::fmt;
use std::marker::PhantomData;

use rand::prelude::*;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Hashes raw bytes into a word (first 8 bytes of SHA-256, little-endian).
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let digest = Sha256::digest(bytes);
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(word)
}

/// Hashes a word.
pub fn hash_word(v: u64) -> u64 {
    hash_bytes(&v.to_le_bytes())
}

/// Draws from `[-10, 10]` with zero remapped to `-1`, as a two's complement word.
fn signed_factor<G: Rng>(rng: &mut G) -> u64 {
    match rng.gen_range(-10i64..=10) {
        0 => -1i64 as u64,
        v => v as u64,
    }
}

/// Derived state of a key.
///
/// `G` is the generator driving [`KeySchedule::rehash`].
pub struct KeySchedule<G> {
    base_salt: u64,
    values: Vec<u64>,
    rehashes: u64,
    _generator: PhantomData<fn() -> G>,
}

impl<G> Clone for KeySchedule<G> {
    fn clone(&self) -> Self {
        Self {
            base_salt: self.base_salt,
            values: self.values.clone(),
            rehashes: self.rehashes,
            _generator: PhantomData,
        }
    }
}

impl<G> fmt::Debug for KeySchedule<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeySchedule")
            .field("base_salt", &self.base_salt)
            .field("values", &self.values)
            .field("rehashes", &self.rehashes)
            .finish()
    }
}

impl<G: SeedableRng + Rng> KeySchedule<G> {
    pub fn new(key: &str) -> Result<Self> {
        if key.is_empty() {
            return Err(Error::EmptyKey);
        }

        Ok(Self {
            base_salt: hash_bytes(key.as_bytes()),
            values: key.bytes().map(|c| hash_word(c.into())).collect(),
            rehashes: 0,
            _generator: PhantomData,
        })
    }

    /// Re-derives every node in place.
    ///
    /// Each node picks a second node (possibly already updated this round)
    /// whose value seeds the factor folded into it.
    pub fn rehash(&mut self) {
        self.rehashes += 1;

        let len = self.values.len() as u64;
        let mut rng = G::seed_from_u64(self.base_salt);

        for i in 0..self.values.len() {
            let salt = ((i as u64 + 1).wrapping_mul(self.base_salt) / self.rehashes)
                .wrapping_mul(signed_factor(&mut rng));

            rng = G::seed_from_u64(self.values[i].wrapping_add(1).wrapping_mul(salt));
            let j = rng.gen_range(0..len) as usize;

            rng = G::seed_from_u64(self.values[j].wrapping_add(1).wrapping_mul(salt));
            let factor = signed_factor(&mut rng);

            self.values[i] = hash_word(self.values[i].wrapping_add(1).wrapping_mul(factor));
        }
    }
}

impl<G> KeySchedule<G> {
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    pub fn rehashes(&self) -> u64 {
        self.rehashes
    }

    /// Integer mean of the nodes (wrapping sum).
    pub fn average(&self) -> u64 {
        let sum = self.values.iter().fold(0u64, |a, &v| a.wrapping_add(v));
        sum / self.values.len() as u64
    }

    pub fn average_hash(&self) -> u64 {
        hash_word(self.average())
    }

    /// Captures the state an operation is compiled from.
    pub fn snapshot(&self) -> KeySnapshot {
        KeySnapshot {
            average: self.average(),
            values: self.values.clone(),
        }
    }
}

/// Immutable post-rehash view of a key, safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySnapshot {
    pub average: u64,
    pub values: Vec<u64>,
}
