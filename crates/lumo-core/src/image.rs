//! 8-bit image buffer.

use crate::{Error, Result};

/// An owned 8-bit pixel grid, interleaved row-major.
///
/// `channels` is 1 (grayscale) or 3 (RGB). The single invariant is
/// `data.len() == width * height * channels`; constructors enforce it
/// so downstream code can size device buffers from the fields alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved channel count (1 or 3).
    pub channels: u8,
}

impl Image {
    /// Creates an image from raw interleaved bytes.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "zero extent"));
        }
        if channels != 1 && channels != 3 {
            return Err(Error::UnsupportedChannels { channels });
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "size overflow"))?;
        if data.len() != expected {
            return Err(Error::size_mismatch(expected, data.len()));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Creates a black image of the given size.
    pub fn new(width: u32, height: u32, channels: u8) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or_else(|| Error::invalid_dimensions(width, height, "size overflow"))?;
        Self::from_raw(vec![0; len], width, height, channels)
    }

    /// Number of pixels (not bytes).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Buffer length in bytes.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns the raw bytes.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Returns the pixel at (x, y) as a channel slice.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[u8]> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let c = self.channels as usize;
        let base = (y as usize * self.width as usize + x as usize) * c;
        Ok(&self.data[base..base + c])
    }

    /// Converts to a single-channel luma image.
    ///
    /// Grayscale images are returned unchanged. RGB uses the Rec.601
    /// integer weighting (77, 150, 29) / 256.
    pub fn to_luma(&self) -> Self {
        if self.channels == 1 {
            return self.clone();
        }
        let luma: Vec<u8> = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let y = 77 * px[0] as u32 + 150 * px[1] as u32 + 29 * px[2] as u32;
                (y >> 8) as u8
            })
            .collect();
        Self {
            data: luma,
            width: self.width,
            height: self.height,
            channels: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_validates_size() {
        assert!(Image::from_raw(vec![0; 12], 2, 2, 3).is_ok());
        let err = Image::from_raw(vec![0; 11], 2, 2, 3).unwrap_err();
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn zero_extent_rejected() {
        assert!(Image::from_raw(vec![], 0, 4, 1).is_err());
        assert!(Image::new(4, 0, 1).is_err());
    }

    #[test]
    fn unsupported_channels_rejected() {
        assert!(Image::from_raw(vec![0; 8], 2, 2, 2).is_err());
    }

    #[test]
    fn pixel_access() {
        let img = Image::from_raw(vec![1, 2, 3, 4], 2, 2, 1).unwrap();
        assert_eq!(img.pixel(1, 1).unwrap(), &[4]);
        assert!(img.pixel(2, 0).unwrap_err().is_bounds_error());
    }

    #[test]
    fn luma_conversion() {
        // Pure white stays white, pure black stays black.
        let img = Image::from_raw(vec![255, 255, 255, 0, 0, 0], 2, 1, 3).unwrap();
        let luma = img.to_luma();
        assert_eq!(luma.channels, 1);
        assert_eq!(luma.data()[0], 255);
        assert_eq!(luma.data()[1], 0);
    }
}
