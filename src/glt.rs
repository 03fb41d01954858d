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

//! GLT texture container.
//!
//! Layout: a 6-byte signature (`00 'G' 'L' 'T' major minor`), then width,
//! height and pixel format as little-endian `u64`, then the raw pixels,
//! 4 bytes each.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::pixel::{PixelGrid, CHANNELS};

const MAGIC: [u8; 4] = [0, b'G', b'L', b'T'];
const VERSION: (u8, u8) = (1, 0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PixelFormat {
    #[default]
    Rgba,
    Bgra,
}

impl PixelFormat {
    /// Unknown codes read as RGBA.
    fn from_code(code: u64) -> Self {
        match code {
            1 => Self::Bgra,
            _ => Self::Rgba,
        }
    }

    fn code(self) -> u64 {
        match self {
            Self::Rgba => 0,
            Self::Bgra => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub format: PixelFormat,
    pub version: (u8, u8),
    /// Row-major pixels, 4 bytes each.
    pub data: Vec<u8>,
}

fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf).map_err(truncated("header"))?;
    Ok(u64::from_le_bytes(buf))
}

fn truncated(section: &'static str) -> impl Fn(std::io::Error) -> Error {
    move |e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::texture(format!("truncated {section}")),
        _ => Error::Io(e),
    }
}

impl Texture {
    /// New RGBA texture from raw pixels.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            version: VERSION,
            data,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let texture = Self::read(BufReader::new(File::open(path)?))?;
        debug!(
            path = %path.display(),
            width = texture.width,
            height = texture.height,
            "loaded texture"
        );
        Ok(texture)
    }

    pub fn read(mut reader: impl Read) -> Result<Self> {
        let mut signature = [0u8; 6];
        reader
            .read_exact(&mut signature)
            .map_err(truncated("signature"))?;
        if signature[..4] != MAGIC {
            return Err(Error::texture("invalid signature"));
        }

        let width = read_u64(&mut reader)?;
        let height = read_u64(&mut reader)?;
        let format = PixelFormat::from_code(read_u64(&mut reader)?);

        let size = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(CHANNELS as u64))
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| Error::texture(format!("texture size {width}x{height} overflows")))?;

        let mut data = Vec::new();
        reader.take(size as u64).read_to_end(&mut data)?;
        if data.len() != size {
            return Err(Error::texture("truncated pixel data"));
        }

        Ok(Self {
            width: width as usize,
            height: height as usize,
            format,
            version: (signature[4], signature[5]),
            data,
        })
    }

    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        if self.data.len() != self.width * self.height * CHANNELS {
            return Err(Error::BufferSize {
                width: self.width,
                height: self.height,
                expected: self.width * self.height * CHANNELS,
                actual: self.data.len(),
            });
        }

        writer.write_all(&MAGIC)?;
        writer.write_all(&[self.version.0, self.version.1])?;
        for v in [self.width as u64, self.height as u64, self.format.code()] {
            writer.write_all(&v.to_le_bytes())?;
        }
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Reverses the byte order of every pixel.
    pub fn flip_bytes(&mut self) {
        for px in self.data.chunks_exact_mut(CHANNELS) {
            px.reverse();
        }
    }

    /// Converts BGRA pixels to RGBA, in place.
    pub fn normalize_rgba(&mut self) {
        if self.format == PixelFormat::Bgra {
            for px in self.data.chunks_exact_mut(CHANNELS) {
                px.swap(0, 2);
            }
            self.format = PixelFormat::Rgba;
        }
    }

    pub fn grid(&mut self) -> Result<PixelGrid<'_>> {
        PixelGrid::new(&mut self.data, self.width, self.height)
    }
}
