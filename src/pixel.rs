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

use std::ops::Div;

use ndarray::prelude::*;
use ndarray::{Data, DataMut};

use crate::error::{Error, Result};

/// Number of channels per pixel (RGBA).
pub const CHANNELS: usize = 4;

/// A single RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Default for Pixel {
    fn default() -> Self {
        Self::new(0, 0, 0, 0xff)
    }
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    pub const fn from_array([red, green, blue, alpha]: [u8; CHANNELS]) -> Self {
        Self::new(red, green, blue, alpha)
    }

    pub const fn to_array(self) -> [u8; CHANNELS] {
        [self.red, self.green, self.blue, self.alpha]
    }

    /// Channel-wise sum in the widened domain.
    pub fn sum(self, other: Self) -> WidePixel {
        WidePixel::from(self) + WidePixel::from(other)
    }

    /// Channel-wise mean of two pixels, truncated.
    pub fn average(self, other: Self) -> Self {
        (self.sum(other) / 2).narrow()
    }

    /// Adds `delta` to one channel, wrapping modulo 256.
    pub fn shifted(self, channel: usize, delta: u8) -> Self {
        let mut a = self.to_array();
        a[channel] = a[channel].wrapping_add(delta);
        Self::from_array(a)
    }

    /// Adds `delta` channel-wise, wrapping modulo 256.
    pub fn wrapping_add(self, delta: [u8; CHANNELS]) -> Self {
        delta
            .iter()
            .enumerate()
            .fold(self, |p, (c, &d)| p.shifted(c, d))
    }

    /// Reads the pixel at `(x, y)` of a `(height, width, 4)` array.
    pub(crate) fn load<S>(data: &ArrayBase<S, Ix3>, x: usize, y: usize) -> Self
    where
        S: Data<Elem = u8>,
    {
        Self::from_array(std::array::from_fn(|c| data[[y, x, c]]))
    }

    /// Writes the pixel at `(x, y)` of a `(height, width, 4)` array.
    pub(crate) fn store<S>(self, data: &mut ArrayBase<S, Ix3>, x: usize, y: usize)
    where
        S: DataMut<Elem = u8>,
    {
        for (c, v) in self.to_array().into_iter().enumerate() {
            data[[y, x, c]] = v;
        }
    }
}

/// Pixel with widened channels, used for intermediate arithmetic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WidePixel(pub [u64; CHANNELS]);

impl From<Pixel> for WidePixel {
    fn from(p: Pixel) -> Self {
        Self(p.to_array().map(u64::from))
    }
}

impl std::ops::Add for WidePixel {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o = o.wrapping_add(r);
        }
        Self(out)
    }
}

impl Div<u64> for WidePixel {
    type Output = Self;

    fn div(self, rhs: u64) -> Self {
        Self(self.0.map(|v| v / rhs))
    }
}

impl WidePixel {
    /// Narrows back to 8 bits per channel by truncation.
    pub fn narrow(self) -> Pixel {
        Pixel::from_array(self.0.map(|v| v as u8))
    }
}

/// Caller-owned RGBA pixel buffer, viewed as a `(height, width, 4)` array.
///
/// The grid never allocates or frees the backing buffer.
#[derive(Debug)]
pub struct PixelGrid<'a> {
    data: ArrayViewMut3<'a, u8>,
}

impl<'a> PixelGrid<'a> {
    /// Wraps a flat row-major RGBA buffer.
    pub fn new(buffer: &'a mut [u8], width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }

        let expected = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(CHANNELS))
            .ok_or(Error::InvalidGeometry { width, height })?;
        if buffer.len() != expected {
            return Err(Error::BufferSize {
                width,
                height,
                expected,
                actual: buffer.len(),
            });
        }

        let data = ArrayViewMut3::from_shape((height, width, CHANNELS), buffer)
            .map_err(|_| Error::InvalidGeometry { width, height })?;
        Ok(Self { data })
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Pixel {
        Pixel::load(&self.data, x, y)
    }

    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) {
        pixel.store(&mut self.data, x, y);
    }

    pub(crate) fn view_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        self.data.view_mut()
    }
}
