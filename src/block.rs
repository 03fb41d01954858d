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

use ndarray::prelude::*;

use crate::error::{Error, Result};
use crate::pixel::CHANNELS;

/// One of the four halves of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    pub const fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    pub const fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// Rectangular view into a parent grid, by absolute origin and extent.
///
/// Holds no reference to the pixels; the grid is passed to every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelBlock {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    pub parent_width: usize,
    pub parent_height: usize,
}

impl PixelBlock {
    /// Checked constructor. The block must lie inside the parent.
    pub fn new(
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        parent_width: usize,
        parent_height: usize,
    ) -> Result<Self> {
        let fits = |o: usize, e: usize, p: usize| o.checked_add(e).is_some_and(|end| end <= p);
        if !fits(x, width, parent_width) || !fits(y, height, parent_height) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width,
                height,
                parent_width,
                parent_height,
            });
        }

        Ok(Self {
            x,
            y,
            width,
            height,
            parent_width,
            parent_height,
        })
    }

    /// Block covering the whole parent.
    pub fn root(width: usize, height: usize) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
            parent_width: width,
            parent_height: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns a half-size quadrant.
    ///
    /// A quadrant that would reach the parent edge is pulled inward to
    /// `parent - half - 1`, keeping its extent.
    pub fn subblock(&self, quadrant: Quadrant) -> Self {
        let half_w = self.width / 2;
        let half_h = self.height / 2;

        let clamp = |origin: usize, half: usize, parent: usize| {
            if origin + half >= parent {
                parent.saturating_sub(half + 1)
            } else {
                origin
            }
        };

        let x = self.x + if quadrant.is_right() { half_w } else { 0 };
        let y = self.y + if quadrant.is_bottom() { half_h } else { 0 };

        Self {
            x: clamp(x, half_w, self.parent_width),
            y: clamp(y, half_h, self.parent_height),
            width: half_w,
            height: half_h,
            parent_width: self.parent_width,
            parent_height: self.parent_height,
        }
    }

    /// Absolute grid coordinates of a block-relative position.
    pub fn at(&self, x: usize, y: usize) -> (usize, usize) {
        debug_assert!(x < self.width && y < self.height);
        (self.x + x, self.y + y)
    }

    /// Copies the overlapping extent of `src` onto `dest`, element by element.
    ///
    /// Both blocks address the same grid, and may overlap.
    pub fn copy(grid: &mut ArrayViewMut3<'_, u8>, dest: &Self, src: &Self) {
        let width = dest.width.min(src.width);
        let height = dest.height.min(src.height);

        for x in 0..width {
            for y in 0..height {
                let (sx, sy) = src.at(x, y);
                let (dx, dy) = dest.at(x, y);
                for c in 0..CHANNELS {
                    grid[[dy, dx, c]] = grid[[sy, sx, c]];
                }
            }
        }
    }

    /// Owned copy of the block's pixels, shaped `(height, width, 4)`.
    pub fn extract(&self, grid: &ArrayView3<'_, u8>) -> Array3<u8> {
        grid.slice(s![
            self.y..self.y + self.height,
            self.x..self.x + self.width,
            ..
        ])
        .to_owned()
    }

    /// Writes the overlapping extent of a scratch buffer back onto the block.
    pub fn restore(&self, grid: &mut ArrayViewMut3<'_, u8>, scratch: &Array3<u8>) {
        let height = self.height.min(scratch.shape()[0]);
        let width = self.width.min(scratch.shape()[1]);
        grid.slice_mut(s![self.y..self.y + height, self.x..self.x + width, ..])
            .assign(&scratch.slice(s![..height, ..width, ..]));
    }
}
