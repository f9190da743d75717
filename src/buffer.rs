// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A multi-channel pixel grid.  Each channel is a separate plane laid
//! out row-major, and the planes are stored one after another, so a
//! single row of a single channel is always a contiguous slice.  That
//! is what lets the renderer and the filter hand each task an
//! exclusive `&mut` slice of the rows it owns.

use crate::error::{RenderError, Result};
use num::clamp;

/// Smallest value a sample may hold.
pub const SAMPLE_MIN: i32 = 0;
/// Largest value a sample may hold.
pub const SAMPLE_MAX: i32 = 255;

/// Clamp a computed value into the legal sample range.
#[inline]
pub fn clamp_sample(value: i32) -> i32 {
    clamp(value, SAMPLE_MIN, SAMPLE_MAX)
}

/// A `channels x height x width` grid of samples in [0, 255].
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    channels: usize,
    height: usize,
    width: usize,
    data: Vec<i32>,
}

/// A band of consecutive rows across every channel.  `channels[c]`
/// holds `rows * width` samples of channel `c`.
pub struct Band<'a> {
    /// Index of the band's first row.
    pub first_row: usize,
    /// One mutable slice per channel.
    pub channels: Vec<&'a mut [i32]>,
}

/// A band of consecutive rows of a single channel.
pub struct ChannelBand<'a> {
    /// The channel this band belongs to.
    pub channel: usize,
    /// Index of the band's first row.
    pub first_row: usize,
    /// The band's samples, `rows * width` of them.
    pub samples: &'a mut [i32],
}

impl Image {
    /// The number of samples an image of this shape holds.  A zero
    /// dimension, or a shape whose sample count does not fit in a
    /// `usize`, is a configuration error.
    pub fn sample_count(channels: usize, height: usize, width: usize) -> Result<usize> {
        let count = channels
            .checked_mul(height)
            .and_then(|n| n.checked_mul(width))
            .filter(|&n| n > 0);
        count.ok_or(RenderError::InvalidDimensions {
            channels,
            height,
            width,
        })
    }

    /// A zero-filled image.
    pub fn new(channels: usize, height: usize, width: usize) -> Result<Image> {
        let count = Image::sample_count(channels, height, width)?;
        Ok(Image {
            channels,
            height,
            width,
            data: vec![0; count],
        })
    }

    /// Build an image from one flattened, row-major field per channel.
    /// Samples are clamped on the way in.
    pub fn from_planes(height: usize, width: usize, planes: &[Vec<i32>]) -> Result<Image> {
        let mut image = Image::new(planes.len(), height, width)?;
        for (channel, plane) in planes.iter().enumerate() {
            if plane.len() != height * width {
                return Err(RenderError::DimensionMismatch(
                    (planes.len(), height, width),
                    (channel, plane.len(), 1),
                ));
            }
            let start = channel * height * width;
            for (dst, src) in image.data[start..start + plane.len()]
                .iter_mut()
                .zip(plane.iter())
            {
                *dst = clamp_sample(*src);
            }
        }
        Ok(image)
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(channels, height, width)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    /// Rows per band, kept within `1..=height`.
    pub fn band_rows(&self, rows: usize) -> usize {
        rows.max(1).min(self.height)
    }

    fn offset(&self, channel: usize, row: usize, column: usize) -> Result<usize> {
        if channel >= self.channels || row >= self.height || column >= self.width {
            return Err(RenderError::OutOfBounds {
                channel,
                row,
                column,
                channels: self.channels,
                height: self.height,
                width: self.width,
            });
        }
        Ok((channel * self.height + row) * self.width + column)
    }

    /// Read one sample.
    pub fn get(&self, channel: usize, row: usize, column: usize) -> Result<i32> {
        let offset = self.offset(channel, row, column)?;
        Ok(self.data[offset])
    }

    /// Write one sample, clamped into [0, 255].
    pub fn set(&mut self, channel: usize, row: usize, column: usize, value: i32) -> Result<()> {
        let offset = self.offset(channel, row, column)?;
        self.data[offset] = clamp_sample(value);
        Ok(())
    }

    /// The flattened, row-major field of one channel.
    ///
    /// # Panics
    ///
    /// If `channel` is out of range.
    pub fn plane(&self, channel: usize) -> &[i32] {
        assert!(channel < self.channels, "channel {} out of range", channel);
        let size = self.height * self.width;
        &self.data[channel * size..(channel + 1) * size]
    }

    /// Copies of every channel's flattened field.
    pub fn planes(&self) -> Vec<Vec<i32>> {
        self.data
            .chunks(self.height * self.width)
            .map(|plane| plane.to_vec())
            .collect()
    }

    /// Split the image into bands of `rows` consecutive rows, each band
    /// carrying a mutable slice of every channel.  The last band may be
    /// shorter.  A `rows` larger than the image yields a single band.
    pub fn bands_mut(&mut self, rows: usize) -> Vec<Band<'_>> {
        let rows = self.band_rows(rows);
        let band_len = rows * self.width;
        let count = (self.height + rows - 1) / rows;
        let mut bands: Vec<Band<'_>> = (0..count)
            .map(|index| Band {
                first_row: index * rows,
                channels: Vec::with_capacity(self.channels),
            })
            .collect();
        for plane in self.data.chunks_mut(self.height * self.width) {
            for (band, samples) in bands.iter_mut().zip(plane.chunks_mut(band_len)) {
                band.channels.push(samples);
            }
        }
        bands
    }

    /// Split every channel into bands of `rows` consecutive rows; one
    /// entry per `(channel, band)`.
    pub fn channel_bands_mut(&mut self, rows: usize) -> Vec<ChannelBand<'_>> {
        let rows = self.band_rows(rows);
        let band_len = rows * self.width;
        let plane_len = self.height * self.width;
        self.data
            .chunks_mut(plane_len)
            .enumerate()
            .flat_map(|(channel, plane)| {
                plane
                    .chunks_mut(band_len)
                    .enumerate()
                    .map(move |(index, samples)| ChannelBand {
                        channel,
                        first_row: index * rows,
                        samples,
                    })
            })
            .collect()
    }

    /// Interleaved 8-bit RGB, row-major.  Images with fewer than three
    /// channels repeat their last channel; extra channels are ignored.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let plane_len = self.height * self.width;
        let last = self.channels - 1;
        let mut out = Vec::with_capacity(plane_len * 3);
        for pixel in 0..plane_len {
            for rgb in 0..3 {
                let channel = rgb.min(last);
                out.push(clamp_sample(self.data[channel * plane_len + pixel]) as u8);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_image_is_zeroed() {
        let image = Image::new(3, 2, 4).unwrap();
        assert_eq!(image.shape(), (3, 2, 4));
        assert!(image.planes().iter().all(|p| p.iter().all(|&s| s == 0)));
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Image::new(0, 2, 2).is_err());
        assert!(Image::new(1, 0, 2).is_err());
        assert!(Image::new(1, 2, 0).is_err());
    }

    #[test]
    fn oversized_shapes_are_rejected() {
        let side = 1usize << (usize::max_value().count_ones() / 2);
        assert_eq!(
            Image::new(3, side, side),
            Err(RenderError::InvalidDimensions {
                channels: 3,
                height: side,
                width: side
            })
        );
        assert_eq!(Image::sample_count(3, 2, 4), Ok(24));
    }

    #[test]
    fn huge_band_heights_become_one_band() {
        let mut image = Image::new(2, 5, 16).unwrap();
        for &rows in &[5, usize::max_value() / 2, usize::max_value()] {
            let bands = image.bands_mut(rows);
            assert_eq!(bands.len(), 1);
            assert!(bands[0].channels.iter().all(|c| c.len() == 80));
        }
        assert_eq!(image.channel_bands_mut(usize::max_value()).len(), 2);
        assert_eq!(image.channel_bands_mut(0).len(), 10);
    }

    #[test]
    fn set_clamps_into_sample_range() {
        let mut image = Image::new(1, 2, 2).unwrap();
        image.set(0, 0, 0, 300).unwrap();
        image.set(0, 1, 1, -12).unwrap();
        assert_eq!(image.get(0, 0, 0), Ok(255));
        assert_eq!(image.get(0, 1, 1), Ok(0));
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut image = Image::new(3, 2, 4).unwrap();
        assert!(image.get(3, 0, 0).is_err());
        assert!(image.get(0, 2, 0).is_err());
        assert!(image.get(0, 0, 4).is_err());
        match image.set(0, 0, 9, 1) {
            Err(RenderError::OutOfBounds { column, .. }) => assert_eq!(column, 9),
            other => panic!("expected OutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn clones_do_not_alias() {
        let mut a = Image::new(1, 2, 2).unwrap();
        let b = a.clone();
        a.set(0, 0, 0, 7).unwrap();
        assert_eq!(b.get(0, 0, 0), Ok(0));
    }

    #[test]
    fn bands_cover_every_row_of_every_channel() {
        let mut image = Image::new(2, 5, 3).unwrap();
        {
            let bands = image.bands_mut(2);
            assert_eq!(bands.len(), 3);
            assert_eq!(bands[2].first_row, 4);
            for band in bands {
                assert_eq!(band.channels.len(), 2);
                for (channel, samples) in band.channels.into_iter().enumerate() {
                    for sample in samples.iter_mut() {
                        *sample = (channel * 100 + band.first_row) as i32;
                    }
                }
            }
        }
        assert_eq!(image.get(0, 3, 1), Ok(2));
        assert_eq!(image.get(1, 4, 2), Ok(104));
    }

    #[test]
    fn channel_bands_are_per_channel_rows() {
        let mut image = Image::new(3, 4, 2).unwrap();
        let bands = image.channel_bands_mut(1);
        assert_eq!(bands.len(), 12);
        assert_eq!(bands[5].channel, 1);
        assert_eq!(bands[5].first_row, 1);
        assert!(bands.iter().all(|b| b.samples.len() == 2));
    }

    #[test]
    fn planes_round_trip_and_gray_expands_to_rgb() {
        let image = Image::from_planes(1, 2, &[vec![10, 400]]).unwrap();
        assert_eq!(image.planes(), vec![vec![10, 255]]);
        assert_eq!(image.to_rgb8(), vec![10, 10, 10, 255, 255, 255]);
        assert!(Image::from_planes(2, 2, &[vec![1, 2, 3]]).is_err());
    }
}
