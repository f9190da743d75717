// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel.  Take a point on the complex plane and
//! repeatedly square it and add it back to itself, counting how long
//! it takes to run away past the escape radius.  Points that never
//! run away within the iteration bound are "inside" the Mandelbrot
//! set.

use crate::error::{RenderError, Result};
use num::Complex;
use std::f64::consts::{E, LN_2};

/// Default iteration bound.
pub const DEFAULT_MAX_ITERATIONS: usize = 2048;
/// Default escape radius; the loop compares against its square.
pub const DEFAULT_ESCAPE_RADIUS: f64 = 4.0;

// ln(ln(|z|)) is only defined for |z| > 1.  Anything smaller is lifted
// to e, where the double log is exactly zero.
const MIN_SMOOTH_NORM_SQR: f64 = E * E;

/// What happened to one point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EscapeTime {
    /// Iterations performed before escaping or hitting the bound.
    pub iterations: usize,
    /// True if the orbit left the escape radius before the bound.
    pub escaped: bool,
    /// `re^2 + im^2` of the final `z`.
    pub norm_sqr: f64,
}

impl EscapeTime {
    /// Inside the set: the bound was reached without escaping.
    #[inline]
    pub fn inside(&self) -> bool {
        !self.escaped
    }
}

/// Iteration bound and escape radius, fixed for a whole render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FractalKernel {
    max_iterations: usize,
    escape_norm_sqr: f64,
}

impl FractalKernel {
    /// `max_iterations` must be positive and `escape_radius` at least 2
    /// (anything smaller misclassifies points that are still bounded).
    pub fn new(max_iterations: usize, escape_radius: f64) -> Result<FractalKernel> {
        if max_iterations == 0 {
            return Err(RenderError::InvalidIterations);
        }
        if !(escape_radius >= 2.0) || !escape_radius.is_finite() {
            return Err(RenderError::InvalidEscapeRadius(escape_radius));
        }
        Ok(FractalKernel {
            max_iterations,
            escape_norm_sqr: escape_radius * escape_radius,
        })
    }

    /// The iteration bound.
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// The squared escape radius.
    pub fn escape_norm_sqr(&self) -> f64 {
        self.escape_norm_sqr
    }

    /// Iterate `z <- z^2 + c` from zero until `|z|^2` exceeds the escape
    /// bound or the iteration bound is reached.
    pub fn iterate(&self, c: Complex<f64>) -> EscapeTime {
        let mut z = Complex {
            re: 0.0_f64,
            im: 0.0_f64,
        };
        let mut iterations = 0;
        // norm_sqr() is re^2 + im^2; no square root in the loop.
        while z.norm_sqr() <= self.escape_norm_sqr && iterations < self.max_iterations {
            z = z * z + c;
            iterations += 1;
        }
        EscapeTime {
            iterations,
            escaped: iterations < self.max_iterations,
            norm_sqr: z.norm_sqr(),
        }
    }

    /// The continuous colouring index
    /// `(n + 1 - log2(ln |z|)) / max_iterations`.  `|z|` is lifted to at
    /// least `e` first, so the result is always finite; inside points
    /// come out at `(max_iterations + 1) / max_iterations`.
    pub fn smooth_index(&self, escape: &EscapeTime) -> f64 {
        let norm_sqr = if escape.norm_sqr > MIN_SMOOTH_NORM_SQR {
            escape.norm_sqr
        } else {
            MIN_SMOOTH_NORM_SQR
        };
        // ln |z| == ln(|z|^2) / 2
        let log_modulus = 0.5 * norm_sqr.ln();
        let n = escape.iterations as f64 + 1.0 - log_modulus.ln() / LN_2;
        n / self.max_iterations as f64
    }
}

impl Default for FractalKernel {
    fn default() -> FractalKernel {
        FractalKernel {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            escape_norm_sqr: DEFAULT_ESCAPE_RADIUS * DEFAULT_ESCAPE_RADIUS,
        }
    }
}
