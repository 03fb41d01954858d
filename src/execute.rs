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

use ndarray::parallel::prelude::*;
use ndarray::prelude::*;
use rand::prelude::*;

use crate::block::{PixelBlock, Quadrant};
use crate::compile::{Opcode, Operation};
use crate::pixel::{Pixel, CHANNELS};

/// Per-pixel increment computed by a color shift.
#[derive(Debug, Clone, Copy, Default)]
struct Shift {
    into_first: bool,
    delta: [u8; CHANNELS],
}

/// Replays an operation against the grid. Returns the number of opcodes run.
pub fn execute<G>(grid: &mut ArrayViewMut3<'_, u8>, op: &Operation) -> usize
where
    G: SeedableRng + Rng,
{
    let mut n = 0;
    for opcode in op.opcodes() {
        apply::<G>(grid, &op.block, opcode);
        n += 1;
    }
    n
}

pub fn apply<G>(grid: &mut ArrayViewMut3<'_, u8>, block: &PixelBlock, opcode: Opcode)
where
    G: SeedableRng + Rng,
{
    match opcode {
        Opcode::Swap(a, b) => swap(grid, block, a, b),
        Opcode::ColorShift(a, b) => color_shift::<G>(grid, block, a, b),
    }
}

/// Exchanges two quadrants through a scratch copy of the second.
pub fn swap(grid: &mut ArrayViewMut3<'_, u8>, block: &PixelBlock, a: Quadrant, b: Quadrant) {
    let first = block.subblock(a);
    let second = block.subblock(b);

    let scratch = second.extract(&grid.view());
    PixelBlock::copy(grid, &second, &first);
    first.restore(grid, &scratch);
}

fn salt(width: usize, height: usize, x: usize, y: usize, a: Quadrant, b: Quadrant) -> u64 {
    let (ox1, oy1) = (a.is_right() as u64, a.is_bottom() as u64);
    let (ox2, oy2) = (b.is_right() as u64, b.is_bottom() as u64);

    ((width * height) as u64)
        .wrapping_mul(((x + 1) * (y + 1)) as u64)
        .wrapping_add(ox1)
        .wrapping_sub(oy2)
        .wrapping_add(oy1)
        .wrapping_add(ox2)
}

/// Perturbs the channels of one quadrant with values seeded by the other.
///
/// Per pixel, a drawn bit picks the direction. Each channel of the
/// destination is increased (mod 256) by a value seeded from the salt and
/// the matching source channel. Increments are computed in parallel from
/// the grid as it is before the shift, then added.
pub fn color_shift<G>(
    grid: &mut ArrayViewMut3<'_, u8>,
    block: &PixelBlock,
    a: Quadrant,
    b: Quadrant,
) where
    G: SeedableRng + Rng,
{
    let first = block.subblock(a);
    let second = block.subblock(b);

    let width = first.width.min(second.width);
    let height = first.height.min(second.height);
    if width == 0 || height == 0 {
        return;
    }

    let mut shifts = <Array2<Shift>>::default((height, width));
    let src = grid.view();
    par_azip!((index (y, x), shift in &mut shifts) {
        let salt = salt(width, height, x, y, a, b);
        let into_first = G::seed_from_u64(salt).gen_range(0..=1u8) == 1;
        let (sx, sy) = if into_first { second.at(x, y) } else { first.at(x, y) };

        shift.into_first = into_first;
        for (c, d) in shift.delta.iter_mut().enumerate() {
            let seed = salt.wrapping_mul(u64::from(src[[sy, sx, c]].max(1)));
            *d = G::seed_from_u64(seed).gen_range(0..=u8::MAX);
        }
    });

    apply_shifts(grid, &first, &second, &shifts);
}

/// Adds each computed increment to its destination pixel.
fn apply_shifts(
    grid: &mut ArrayViewMut3<'_, u8>,
    first: &PixelBlock,
    second: &PixelBlock,
    shifts: &Array2<Shift>,
) {
    for ((y, x), shift) in shifts.indexed_iter() {
        let (dx, dy) = if shift.into_first {
            first.at(x, y)
        } else {
            second.at(x, y)
        };
        Pixel::load(&*grid, dx, dy)
            .wrapping_add(shift.delta)
            .store(grid, dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::OPCODES;
    use crate::{HeavyRng, LightRng};

    fn gradient(width: usize, height: usize) -> Array3<u8> {
        Array3::from_shape_fn((height, width, CHANNELS), |(y, x, c)| {
            (y * 31 + x * 7 + c * 3) as u8
        })
    }

    #[test]
    fn swap_twice_restores() {
        let original = gradient(8, 8);
        let block = PixelBlock::new(2, 2, 4, 4, 8, 8).unwrap();

        for i in 0..6 {
            let Opcode::Swap(a, b) = Opcode::from_index(i) else {
                unreachable!()
            };
            let mut data = original.clone();
            swap(&mut data.view_mut(), &block, a, b);
            assert_ne!(data, original, "opcode {i}");
            swap(&mut data.view_mut(), &block, a, b);
            assert_eq!(data, original, "opcode {i}");
        }
    }

    #[test]
    fn swap_moves_quadrants() {
        let mut data = gradient(4, 4);
        let original = data.clone();
        let block = PixelBlock::new(0, 0, 4, 4, 5, 5).unwrap();
        swap(&mut data.view_mut(), &block, Quadrant::TopLeft, Quadrant::BottomRight);

        assert_eq!(data.slice(s![2..4, 2..4, ..]), original.slice(s![0..2, 0..2, ..]));
        assert_eq!(data.slice(s![0..2, 0..2, ..]), original.slice(s![2..4, 2..4, ..]));
        assert_eq!(data.slice(s![0..2, 2..4, ..]), original.slice(s![0..2, 2..4, ..]));
    }

    #[test]
    fn color_shift_touches_only_quadrants() {
        let original = gradient(10, 10);
        let mut data = original.clone();
        let block = PixelBlock::new(2, 2, 4, 4, 10, 10).unwrap();
        let (a, b) = (Quadrant::TopLeft, Quadrant::TopRight);
        color_shift::<HeavyRng>(&mut data.view_mut(), &block, a, b);

        assert_eq!(data.slice(s![4.., .., ..]), original.slice(s![4.., .., ..]));
        assert_eq!(data.slice(s![..2, .., ..]), original.slice(s![..2, .., ..]));
        assert_eq!(data.slice(s![.., ..2, ..]), original.slice(s![.., ..2, ..]));
        assert_eq!(data.slice(s![.., 6.., ..]), original.slice(s![.., 6.., ..]));
    }

    #[test]
    fn color_shift_is_deterministic() {
        let block = PixelBlock::root(16, 16);
        let run = || {
            let mut data = gradient(16, 16);
            let (a, b) = (Quadrant::BottomLeft, Quadrant::TopRight);
            color_shift::<LightRng>(&mut data.view_mut(), &block, a, b);
            data
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn salt_mixes_quadrant_selectors() {
        assert_eq!(salt(2, 2, 0, 0, Quadrant::TopLeft, Quadrant::TopRight), 5);
        assert_eq!(salt(2, 2, 1, 1, Quadrant::TopLeft, Quadrant::BottomLeft), 15);
        assert_eq!(salt(1, 1, 0, 0, Quadrant::TopLeft, Quadrant::BottomLeft), 0);
    }

    #[test]
    fn shift_increments_wrap_channels() {
        let mut data = Array3::<u8>::zeros((2, 4, CHANNELS));
        data.slice_mut(s![.., 2.., ..]).fill(250);
        let block = PixelBlock::root(4, 2);
        let first = block.subblock(Quadrant::TopLeft);
        let second = PixelBlock::new(2, 0, 2, 1, 4, 2).unwrap();

        let mut shifts = <Array2<Shift>>::default((1, 2));
        shifts[[0, 0]] = Shift {
            into_first: false,
            delta: [10, 5, 6, 0],
        };
        shifts[[0, 1]] = Shift {
            into_first: true,
            delta: [10, 0, 0, 255],
        };
        apply_shifts(&mut data.view_mut(), &first, &second, &shifts);

        assert_eq!(data.slice(s![0, 2, ..]).to_vec(), vec![4, 255, 0, 250]);
        assert_eq!(data.slice(s![0, 1, ..]).to_vec(), vec![10, 0, 0, 255]);
        assert_eq!(data.slice(s![0, 3, ..]).to_vec(), vec![250; 4]);
    }

    #[test]
    fn execute_counts_opcodes() {
        let op = Operation {
            table: std::array::from_fn(|i| Opcode::from_index(i as u8)),
            sequence: (0..OPCODES as u8).collect(),
            block: PixelBlock::root(6, 6),
        };
        let mut data = gradient(6, 6);
        assert_eq!(execute::<HeavyRng>(&mut data.view_mut(), &op), OPCODES);
    }
}
