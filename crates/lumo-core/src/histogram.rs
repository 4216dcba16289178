//! Intensity histogram, cumulative histogram and equalization LUT.
//!
//! These are the host-side counterparts of the device kernels in
//! `lumo-gpu`: [`Histogram::of`], [`CumulativeHistogram`] and
//! [`Lut::equalizing`] compute the same tables on the CPU so GPU
//! results can be checked bin for bin.

use rayon::prelude::*;

use crate::Image;

/// Number of intensity bins (8-bit input).
pub const BIN_COUNT: usize = 256;

/// Per-intensity pixel counts of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram(pub [u32; BIN_COUNT]);

impl Histogram {
    /// Bins every pixel of `image` by intensity.
    ///
    /// RGB input is converted to luma first so the counts match what
    /// the GPU pipeline sees after the CLI's luma pass.
    pub fn of(image: &Image) -> Self {
        let luma;
        let data = if image.channels == 1 {
            image.data()
        } else {
            luma = image.to_luma();
            luma.data()
        };

        let bins = data
            .par_chunks(4096)
            .fold(
                || [0u32; BIN_COUNT],
                |mut acc, chunk| {
                    for &px in chunk {
                        acc[px as usize] += 1;
                    }
                    acc
                },
            )
            .reduce(
                || [0u32; BIN_COUNT],
                |mut a, b| {
                    for (x, y) in a.iter_mut().zip(b.iter()) {
                        *x += y;
                    }
                    a
                },
            );

        Self(bins)
    }

    /// Total count across all bins.
    pub fn total(&self) -> u64 {
        self.0.iter().map(|&c| c as u64).sum()
    }

    /// Running totals of this histogram.
    pub fn cumulative(&self) -> CumulativeHistogram {
        let mut cum = [0u32; BIN_COUNT];
        let mut total = 0u32;
        for (c, &b) in cum.iter_mut().zip(self.0.iter()) {
            total += b;
            *c = total;
        }
        CumulativeHistogram(cum)
    }
}

/// Running per-intensity totals.
///
/// Monotone non-decreasing; the last bin equals the pixel count of the
/// source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeHistogram(pub [u32; BIN_COUNT]);

impl CumulativeHistogram {
    /// Total pixel count (the last bin).
    #[inline]
    pub fn total(&self) -> u32 {
        self.0[BIN_COUNT - 1]
    }
}

/// Per-intensity remapping table for contrast adjustment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut(pub [u8; BIN_COUNT]);

impl Lut {
    /// Identity mapping.
    pub fn identity() -> Self {
        let mut lut = [0u8; BIN_COUNT];
        for (i, v) in lut.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self(lut)
    }

    /// Derives the equalizing LUT from a cumulative histogram.
    ///
    /// `lut[i] = round(cum[i] * 255 / total)`. A zero total (empty
    /// histogram) yields the identity table rather than dividing by
    /// zero.
    pub fn equalizing(cum: &CumulativeHistogram) -> Self {
        let total = cum.total() as u64;
        if total == 0 {
            return Self::identity();
        }
        let mut lut = [0u8; BIN_COUNT];
        for (v, &c) in lut.iter_mut().zip(cum.0.iter()) {
            *v = ((c as u64 * 255 + total / 2) / total) as u8;
        }
        Self(lut)
    }

    /// Remaps every pixel of `image` through the table.
    pub fn apply(&self, image: &Image) -> Image {
        let data: Vec<u8> = image
            .data()
            .par_iter()
            .map(|&px| self.0[px as usize])
            .collect();
        // Same dimensions, so the size invariant carries over.
        Image::from_raw(data, image.width, image.height, image.channels)
            .expect("remap preserves buffer size")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Image;

    fn gradient_image() -> Image {
        // 16x16 with every intensity 0..=255 exactly once.
        let data: Vec<u8> = (0..=255).collect();
        Image::from_raw(data, 16, 16, 1).unwrap()
    }

    #[test]
    fn histogram_counts_every_pixel() {
        let hist = Histogram::of(&gradient_image());
        assert!(hist.0.iter().all(|&c| c == 1));
        assert_eq!(hist.total(), 256);
    }

    #[test]
    fn histogram_bins_rgb_as_luma() {
        let img = Image::from_raw(vec![255, 255, 255], 1, 1, 3).unwrap();
        let hist = Histogram::of(&img);
        assert_eq!(hist.0[255], 1);
        assert_eq!(hist.total(), 1);
    }

    #[test]
    fn cumulative_is_monotone_and_totals() {
        let cum = Histogram::of(&gradient_image()).cumulative();
        assert!(cum.0.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(cum.total(), 256);
        assert_eq!(cum.0[0], 1);
    }

    #[test]
    fn equalizing_gradient_is_near_identity() {
        // A flat histogram is already equalized.
        let cum = Histogram::of(&gradient_image()).cumulative();
        let lut = Lut::equalizing(&cum);
        for (i, &v) in lut.0.iter().enumerate() {
            assert!((v as i32 - i as i32).abs() <= 1, "bin {i}: {v}");
        }
    }

    #[test]
    fn constant_image_maps_to_white() {
        // cum[k] == total for the single occupied bin, so lut[k] = 255.
        let img = Image::from_raw(vec![42; 64], 8, 8, 1).unwrap();
        let cum = Histogram::of(&img).cumulative();
        let lut = Lut::equalizing(&cum);
        assert_eq!(lut.0[42], 255);

        let out = lut.apply(&img);
        assert!(out.data().iter().all(|&px| px == 255));
    }

    #[test]
    fn empty_histogram_yields_identity() {
        let cum = CumulativeHistogram([0; BIN_COUNT]);
        assert_eq!(Lut::equalizing(&cum), Lut::identity());
    }

    #[test]
    fn apply_preserves_dimensions() {
        let img = gradient_image();
        let out = Lut::identity().apply(&img);
        assert_eq!(out, img);
    }
}
