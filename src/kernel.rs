// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convolution weights.  A table is an odd-sized square of non-negative
//! weights; the filter centres it on each pixel.  The Gaussian builder
//! evaluates the 2D normal density at integer offsets and does *not*
//! rescale the result, so a narrow sigma gives a table whose weights
//! sum to more than one and the filter brightens the image a little on
//! every step.  Use `normalized()` for an energy-preserving table.

use crate::error::{RenderError, Result};
use itertools::iproduct;
use std::f64::consts::PI;

/// Default table width.
pub const DEFAULT_KERNEL_WIDTH: usize = 5;
/// Default Gaussian spread.
pub const DEFAULT_SIGMA: f64 = 0.37;

/// The 2D normal density with standard deviation `sigma`, at `(x, y)`.
#[inline]
pub fn gaussian_density(x: f64, y: f64, sigma: f64) -> f64 {
    let two_sigma_sqr = 2.0 * sigma * sigma;
    (-(x * x + y * y) / two_sigma_sqr).exp() / (PI * two_sigma_sqr)
}

/// An immutable `width x width` table of weights, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct KernelTable {
    width: usize,
    weights: Vec<f64>,
}

impl KernelTable {
    /// Gaussian weights: `weight[a][b] = gaussian_density(a - d, b - d,
    /// sigma)` with `d = width / 2`.
    pub fn gaussian(width: usize, sigma: f64) -> Result<KernelTable> {
        check_width(width)?;
        if !(sigma > 0.0) || !sigma.is_finite() {
            return Err(RenderError::InvalidSigma(sigma));
        }
        let d = (width / 2) as f64;
        let weights = iproduct!(0..width, 0..width)
            .map(|(a, b)| gaussian_density(a as f64 - d, b as f64 - d, sigma))
            .collect();
        Ok(KernelTable { width, weights })
    }

    /// A table from explicit row-major weights, which must be finite and
    /// non-negative.
    pub fn from_weights(width: usize, weights: Vec<f64>) -> Result<KernelTable> {
        check_width(width)?;
        if weights.len() != width * width {
            return Err(RenderError::InvalidKernel(format!(
                "a {}x{} kernel needs {} weights, got {}",
                width,
                width,
                width * width,
                weights.len()
            )));
        }
        if let Some(bad) = weights.iter().find(|w| !(**w >= 0.0) || !w.is_finite()) {
            return Err(RenderError::InvalidKernel(format!(
                "weights must be finite and non-negative, found {}",
                bad
            )));
        }
        Ok(KernelTable { width, weights })
    }

    /// The 1x1 table of weight one.
    pub fn identity() -> KernelTable {
        KernelTable {
            width: 1,
            weights: vec![1.0],
        }
    }

    /// A copy scaled so the weights sum to one.  An all-zero table is
    /// returned unchanged.
    pub fn normalized(&self) -> KernelTable {
        let sum = self.sum();
        if sum <= 0.0 {
            return self.clone();
        }
        KernelTable {
            width: self.width,
            weights: self.weights.iter().map(|w| w / sum).collect(),
        }
    }

    /// Side length.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Distance from the centre to an edge, `width / 2`.
    pub fn displacement(&self) -> usize {
        self.width / 2
    }

    /// The weight at table position `(row, column)`.
    #[inline]
    pub fn weight(&self, row: usize, column: usize) -> f64 {
        self.weights[row * self.width + column]
    }

    /// One row of the table.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.weights[row * self.width..(row + 1) * self.width]
    }

    /// Total of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

fn check_width(width: usize) -> Result<()> {
    if width == 0 || width % 2 == 0 {
        return Err(RenderError::InvalidKernel(format!(
            "width must be odd and positive, got {}",
            width
        )));
    }
    Ok(())
}
