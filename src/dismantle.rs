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

use rand::prelude::*;
use tracing::{info, instrument};

use crate::block::PixelBlock;
use crate::decompose::{decompose, scales};
use crate::error::Result;
use crate::execute::execute;
use crate::key::KeySchedule;
use crate::pixel::PixelGrid;

/// Short-period generator.
pub type LightRng = rand_xoshiro::Xoroshiro64StarStar;

/// Long-period generator.
pub type HeavyRng = rand_xoshiro::Xoshiro256StarStar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weight {
    Light,
    Heavy,
}

/// Preset pairing of generator weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Complexity {
    /// Light key schedule, light color shift.
    Fast,
    /// Heavy key schedule, light color shift.
    #[default]
    Balanced,
    /// Heavy key schedule, heavy color shift.
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Generator for the key schedule and opcode generation.
    pub key_weight: Weight,
    /// Generator for color shift perturbation.
    pub shift_weight: Weight,
}

impl Default for Config {
    fn default() -> Self {
        Complexity::default().into()
    }
}

impl From<Complexity> for Config {
    fn from(c: Complexity) -> Self {
        let (key_weight, shift_weight) = match c {
            Complexity::Fast => (Weight::Light, Weight::Light),
            Complexity::Balanced => (Weight::Heavy, Weight::Light),
            Complexity::Complex => (Weight::Heavy, Weight::Heavy),
        };
        Self {
            key_weight,
            shift_weight,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.config = complexity.into();
        self
    }

    pub fn key_weight(mut self, weight: Weight) -> Self {
        self.config.key_weight = weight;
        self
    }

    pub fn shift_weight(mut self, weight: Weight) -> Self {
        self.config.shift_weight = weight;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Summary of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub scales: usize,
    pub operations: usize,
    pub opcodes: usize,
}

/// Main dismantle algorithm.
///
/// Scrambles the grid in place, deterministically for a given
/// (grid, key, config).
///
/// Parameters:
/// * `grid` : Pixel grid, owned by the caller.
/// * `key` : Non-empty key text.
/// * `config` : Generator weights, see [Complexity].
pub fn dismantle(grid: &mut PixelGrid<'_>, key: &str, config: &Config) -> Result<Stats> {
    match (config.key_weight, config.shift_weight) {
        (Weight::Light, Weight::Light) => dismantle_with::<LightRng, LightRng>(grid, key),
        (Weight::Light, Weight::Heavy) => dismantle_with::<LightRng, HeavyRng>(grid, key),
        (Weight::Heavy, Weight::Light) => dismantle_with::<HeavyRng, LightRng>(grid, key),
        (Weight::Heavy, Weight::Heavy) => dismantle_with::<HeavyRng, HeavyRng>(grid, key),
    }
}

/// [dismantle] with explicit generators.
///
/// `K` drives the key schedule and opcode generation, `S` drives color shifts.
#[instrument(level = "debug", skip_all, fields(width = grid.width(), height = grid.height()))]
pub fn dismantle_with<K, S>(grid: &mut PixelGrid<'_>, key: &str) -> Result<Stats>
where
    K: SeedableRng + Rng,
    S: SeedableRng + Rng,
{
    let mut key = KeySchedule::<K>::new(key)?;
    let root = PixelBlock::root(grid.width(), grid.height());

    let ops = decompose(&mut key, &root)?;

    let mut data = grid.view_mut();
    let opcodes: usize = ops.iter().map(|op| execute::<S>(&mut data, op)).sum();

    let stats = Stats {
        scales: scales(root.width, root.height).count(),
        operations: ops.len(),
        opcodes,
    };
    info!(
        scales = stats.scales,
        operations = stats.operations,
        opcodes = stats.opcodes,
        "dismantled"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn checker(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .flat_map(|i| {
                let v = if (i % width + i / width) % 2 == 0 { 0xff } else { 0x20 };
                [v, (i * 5) as u8, 0x80, 0xff]
            })
            .collect()
    }

    #[test]
    fn complexity_presets() {
        let c = Config::from(Complexity::Fast);
        assert_eq!((c.key_weight, c.shift_weight), (Weight::Light, Weight::Light));
        let c = Config::default();
        assert_eq!((c.key_weight, c.shift_weight), (Weight::Heavy, Weight::Light));
        let c = ConfigBuilder::new()
            .complexity(Complexity::Complex)
            .shift_weight(Weight::Light)
            .build();
        assert_eq!((c.key_weight, c.shift_weight), (Weight::Heavy, Weight::Light));
    }

    #[test]
    fn stats_count_work() {
        let mut buf = checker(4, 4);
        let mut grid = PixelGrid::new(&mut buf, 4, 4).unwrap();
        let stats = dismantle(&mut grid, "AB", &Config::default()).unwrap();
        assert_eq!(
            stats,
            Stats {
                scales: 2,
                operations: 20,
                opcodes: 40,
            }
        );
    }

    #[test]
    fn weights_change_output() {
        let run = |config: Config| {
            let mut buf = checker(16, 16);
            let mut grid = PixelGrid::new(&mut buf, 16, 16).unwrap();
            dismantle(&mut grid, "weights", &config).unwrap();
            buf
        };
        let fast = run(Complexity::Fast.into());
        assert_eq!(fast, run(Complexity::Fast.into()));
        assert_ne!(fast, run(Complexity::Complex.into()));
    }

    #[test]
    fn small_grid_is_untouched() {
        let mut buf = checker(1, 3);
        let original = buf.clone();
        let mut grid = PixelGrid::new(&mut buf, 1, 3).unwrap();
        let stats = dismantle(&mut grid, "key", &Config::default()).unwrap();
        assert_eq!(stats.operations, 0);
        assert_eq!(buf, original);
    }

    #[test]
    fn empty_key_rejected() {
        let mut buf = checker(4, 4);
        let mut grid = PixelGrid::new(&mut buf, 4, 4).unwrap();
        assert!(matches!(
            dismantle(&mut grid, "", &Config::default()),
            Err(Error::EmptyKey)
        ));
    }
}
