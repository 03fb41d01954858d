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

//! Recursive tiling of a block into per-scale operations.

use rand::prelude::*;
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::block::PixelBlock;
use crate::compile::{compile, Operation};
use crate::error::{Error, Result};
use crate::key::KeySchedule;

/// Halving scales from `(width, height)` while both stay at least 2.
pub fn scales(width: usize, height: usize) -> impl Iterator<Item = (usize, usize)> {
    std::iter::successors(Some((width, height)), |&(w, h)| Some((w / 2, h / 2)))
        .take_while(|&(w, h)| w >= 2 && h >= 2)
}

/// Tiles of `root` at one scale, row-major, stepping by half the scale.
///
/// Tiles running past the root edge are clipped to `extent - offset - 1`.
pub fn tiles(
    root: &PixelBlock,
    (width, height): (usize, usize),
) -> impl Iterator<Item = Result<PixelBlock>> + '_ {
    let clip = |offset: usize, size: usize, extent: usize| {
        if offset + size > extent {
            extent - offset - 1
        } else {
            size
        }
    };

    (0..root.height)
        .step_by((height / 2).max(1))
        .flat_map(move |y| {
            (0..root.width)
                .step_by((width / 2).max(1))
                .map(move |x| (x, y))
        })
        .map(move |(x, y)| {
            PixelBlock::new(
                root.x + x,
                root.y + y,
                clip(x, width, root.width),
                clip(y, height, root.height),
                root.parent_width,
                root.parent_height,
            )
        })
}

/// Decomposes `root` into operations, coarse to fine.
///
/// The key is rehashed exactly once per tile, sequentially and in tile
/// order; only compilation from the captured snapshots runs in parallel.
#[instrument(level = "debug", skip(key))]
pub fn decompose<G>(key: &mut KeySchedule<G>, root: &PixelBlock) -> Result<Vec<Operation>>
where
    G: SeedableRng + Rng,
{
    if root.is_empty() {
        return Err(Error::InvalidGeometry {
            width: root.width,
            height: root.height,
        });
    }

    let mut ops = Vec::new();
    for scale in scales(root.width, root.height) {
        let jobs = tiles(root, scale)
            .map(|block| {
                let block = block?;
                key.rehash();
                Ok((key.snapshot(), block))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            width = scale.0,
            height = scale.1,
            tiles = jobs.len(),
            "decomposed scale"
        );

        let compiled: Vec<_> = jobs
            .par_iter()
            .map(|(snapshot, block)| compile::<G>(snapshot, *block))
            .collect();
        ops.extend(compiled);
    }

    Ok(ops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeavyRng, LightRng};

    #[test]
    fn scales_halve_and_terminate() {
        let s: Vec<_> = scales(16, 10).collect();
        assert_eq!(s, vec![(16, 10), (8, 5), (4, 2)]);

        let s: Vec<_> = scales(1024, 1024).collect();
        assert_eq!(s.len(), 10);
        assert!(s.windows(2).all(|w| w[0] != w[1]));

        assert_eq!(scales(1, 100).count(), 0);
        assert_eq!(scales(2, 2).count(), 1);
    }

    #[test]
    fn tiles_are_row_major_and_clipped() {
        let root = PixelBlock::root(4, 4);
        let t: Vec<_> = tiles(&root, (4, 4)).map(Result::unwrap).collect();
        let origins: Vec<_> = t.iter().map(|b| (b.x, b.y)).collect();
        assert_eq!(origins, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
        assert_eq!((t[0].width, t[0].height), (4, 4));
        assert_eq!((t[1].width, t[1].height), (1, 4));
        assert_eq!((t[3].width, t[3].height), (1, 1));

        assert_eq!(tiles(&root, (2, 2)).count(), 16);
    }

    #[test]
    fn tiles_stay_inside_parent() {
        let root = PixelBlock::root(11, 7);
        for scale in scales(11, 7) {
            for b in tiles(&root, scale) {
                let b = b.unwrap();
                assert!(b.x + b.width <= 11 && b.y + b.height <= 7, "{b:?}");
            }
        }
    }

    #[test]
    fn one_rehash_per_tile() {
        let mut key = KeySchedule::<LightRng>::new("AB").unwrap();
        let ops = decompose(&mut key, &PixelBlock::root(4, 4)).unwrap();
        assert_eq!(ops.len(), 4 + 16);
        assert_eq!(key.rehashes(), 20);
    }

    #[test]
    fn parallel_matches_sequential_generation() {
        let root = PixelBlock::root(9, 6);
        let mut key = KeySchedule::<HeavyRng>::new("order matters").unwrap();
        let ops = decompose(&mut key, &root).unwrap();

        let mut key = KeySchedule::<HeavyRng>::new("order matters").unwrap();
        let mut expected = Vec::new();
        for scale in scales(9, 6) {
            for block in tiles(&root, scale) {
                key.rehash();
                expected.push(compile::<HeavyRng>(&key.snapshot(), block.unwrap()));
            }
        }
        assert_eq!(ops, expected);
    }

    #[test]
    fn empty_root_rejected() {
        let mut key = KeySchedule::<HeavyRng>::new("k").unwrap();
        let root = PixelBlock::root(0, 5);
        assert!(matches!(
            decompose(&mut key, &root),
            Err(Error::InvalidGeometry { width: 0, .. })
        ));
        assert_eq!(key.rehashes(), 0);
    }
}
