//! Library to deterministically dismantle an image with a key.
//!
//! The main entry is [dismantle]. It scrambles an RGBA pixel grid in place
//! such that:
//!
//! * The same (image, key, config) always yields the same output.
//! * The grid is split recursively into shrinking quadrant blocks, and at
//!   every scale each tile gets its own key-derived transform program.
//! * Transforms either swap two quadrants or perturb the color channels of
//!   one quadrant from the other (wrapping modulo 256).
//!
//! The scrambling is not meant to be cryptographically strong.

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

pub mod block;
pub mod compile;
pub mod decompose;
mod dismantle;
mod error;
pub mod execute;
pub mod glt;
pub mod key;
pub mod pixel;

#[doc(inline)]
pub use crate::dismantle::{
    dismantle, dismantle_with, Complexity, Config, ConfigBuilder, HeavyRng, LightRng, Stats,
    Weight,
};
pub use crate::error::{Error, Result};
pub use crate::glt::Texture;
pub use crate::key::KeySchedule;
pub use crate::pixel::{Pixel, PixelGrid};
