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

use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Width or height is zero.
    #[error("invalid geometry: {width}x{height} (width and height must be non-zero)")]
    InvalidGeometry { width: usize, height: usize },

    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    /// A block would reach outside of its parent grid.
    #[error("block ({x}, {y}) {width}x{height} exceeds parent grid {parent_width}x{parent_height}")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        parent_width: usize,
        parent_height: usize,
    },

    #[error("key must not be empty")]
    EmptyKey,

    #[error("texture error: {0}")]
    Texture(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn texture(msg: impl Into<String>) -> Self {
        Self::Texture(msg.into())
    }
}
