//! Source textures and ball bitmaps as handed over by the asset loader.
//!
//! Texture coordinates are 8.8 fixed point and wrap in both directions; the
//! dimensions must be powers of two so wrapping is a mask.

use std::fmt;

use crate::background::Rgb12;
use crate::ball::SizeClass;
use crate::screen::DEPTH;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextureError {
    NotPowerOfTwo { width: usize, height: usize },
    SizeMismatch { expected: usize, actual: usize },
    PaletteIndex { index: u8, palette_len: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::NotPowerOfTwo { width, height } => {
                write!(f, "texture {width}x{height} is not a power of two in both axes")
            }
            TextureError::SizeMismatch { expected, actual } => {
                write!(f, "texture expects {expected} texels, got {actual}")
            }
            TextureError::PaletteIndex { index, palette_len } => {
                write!(f, "texel index {index} outside palette of {palette_len} colours")
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// Texture whose texels are ready-to-write colour words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    width: usize,
    height: usize,
    texels: Vec<Rgb12>,
}

impl Texture {
    pub fn new(width: usize, height: usize, texels: Vec<Rgb12>) -> Result<Self, TextureError> {
        if !width.is_power_of_two() || !height.is_power_of_two() {
            return Err(TextureError::NotPowerOfTwo { width, height });
        }
        if texels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                expected: width * height,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Expand colour-index pixels through `palette`.
    pub fn from_indexed(
        width: usize,
        height: usize,
        pixels: &[u8],
        palette: &[Rgb12],
    ) -> Result<Self, TextureError> {
        let texels = pixels
            .iter()
            .map(|&index| {
                palette
                    .get(index as usize)
                    .copied()
                    .ok_or(TextureError::PaletteIndex {
                        index,
                        palette_len: palette.len(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(width, height, texels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Nearest texel at 8.8 coordinates `(u, v)`; wraps.
    #[inline]
    pub fn texel(&self, u: i16, v: i16) -> Rgb12 {
        let x = (u >> 8) as usize & (self.width - 1);
        let y = (v >> 8) as usize & (self.height - 1);
        self.texels[y * self.width + x]
    }
}

/// Planar bitmap already resident in display memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    pub width: usize,
    pub height: usize,
    pub row_bytes: usize,
    /// Base address of each plane.
    pub planes: [u32; DEPTH],
}

/// One bitmap per ball size class.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BallBitmaps {
    pub small: Bitmap,
    pub large: Bitmap,
}

impl BallBitmaps {
    pub fn get(&self, size: SizeClass) -> &Bitmap {
        match size {
            SizeClass::Small => &self.small,
            SizeClass::Large => &self.large,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(
            Texture::new(3, 4, vec![0; 12]),
            Err(TextureError::NotPowerOfTwo { width: 3, height: 4 })
        );
        assert_eq!(
            Texture::new(4, 4, vec![0; 15]),
            Err(TextureError::SizeMismatch { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn texel_lookup_wraps() {
        let texels = (0..16).collect();
        let t = Texture::new(4, 4, texels).unwrap();
        assert_eq!(t.texel(0, 0), 0);
        assert_eq!(t.texel(3 << 8, 1 << 8), 7);
        // Fraction is dropped, coordinates wrap.
        assert_eq!(t.texel((5 << 8) | 0x80, 0), 1);
        assert_eq!(t.texel(-(1 << 8), -(1 << 8)), 15);
    }

    #[test]
    fn indexed_pixels_expand_through_palette() {
        let t = Texture::from_indexed(2, 1, &[1, 0], &[0x111, 0xabc]).unwrap();
        assert_eq!(t.texel(0, 0), 0xabc);
        assert_eq!(
            Texture::from_indexed(2, 1, &[1, 2], &[0, 0]),
            Err(TextureError::PaletteIndex { index: 2, palette_len: 2 })
        );
    }
}
