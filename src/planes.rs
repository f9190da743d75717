// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0,
//! and a rectangle on the complex plane with an arbitrary pair of
//! corners.  Only the pixel-to-point direction is needed: the
//! renderer asks, for every pixel, which `c` it should iterate.

use crate::error::{RenderError, Result};
use num::Complex;

/// Describes the width and height of an integral plane that is assumed
/// to start at 0,0.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<f64>, pub Complex<f64>);

/// Column and row of a pixel, in that (x, y) order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

// The default window: a narrow strip of the seahorse valley, whose
// real extent grows with the image's aspect ratio.
const DEFAULT_ORIGIN: (f64, f64) = (-1.10, -0.35);
const DEFAULT_HEIGHT_SPAN: f64 = 0.1;
const DEFAULT_ASPECT_SCALE: f64 = 0.1;

/// Contains the definitions of two planes: an integral cartesian plane,
/// and a complex cartesian plane.  Maps pixels in one to points in the
/// other.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// The far corner of the integral plane; the near one is 0,0.
    pub integral_plane: IntegralPlane,
    /// The two corners of the complex window, left-lower and
    /// right-upper.
    pub complex_plane: ComplexPlane,
    // Complex units per pixel, horizontally and vertically.
    steps: (f64, f64),
}

impl PlaneMapper {
    /// Map a `width x height` image onto the window between `leftlower`
    /// and `rightupper`.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions {
                channels: 1,
                height,
                width,
            });
        }
        if !(rightupper.re > leftlower.re) {
            return Err(RenderError::InvalidWindow(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            ));
        }
        if !(rightupper.im > leftlower.im) {
            return Err(RenderError::InvalidWindow(
                "The left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        let steps = (
            (rightupper.re - leftlower.re) / (width as f64),
            (rightupper.im - leftlower.im) / (height as f64),
        );

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
            steps,
        })
    }

    /// The standard window for an image of this shape: the real extent
    /// is a tenth of the aspect ratio, the imaginary extent a fixed 0.1.
    pub fn with_aspect(width: usize, height: usize) -> Result<PlaneMapper> {
        let aspect = width as f64 / height.max(1) as f64;
        let leftlower = Complex::new(DEFAULT_ORIGIN.0, DEFAULT_ORIGIN.1);
        let rightupper = Complex::new(
            DEFAULT_ORIGIN.0 + aspect * DEFAULT_ASPECT_SCALE,
            DEFAULT_ORIGIN.1 + DEFAULT_HEIGHT_SPAN,
        );
        PlaneMapper::new(width, height, leftlower, rightupper)
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Given a pixel on the integral cartesian plane, find the point on
    /// the complex plane it stands for.
    #[inline]
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        Complex::new(
            (pixel.0 as f64) * self.steps.0 + self.complex_plane.0.re,
            (pixel.1 as f64) * self.steps.1 + self.complex_plane.0.im,
        )
    }
}
