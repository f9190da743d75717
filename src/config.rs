// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Every tunable in one place.  `Config::default()` is the reference
//! render: 1536x1024 RGB, 2048 iterations, escape radius 4, the stock
//! four-segment gradient, then twenty steps of a 5x5 Gaussian with
//! sigma 0.37.  Nothing is computed until `validate` has passed.

use crate::buffer::Image;
use crate::error::{RenderError, Result};
use crate::fractal::{FractalKernel, DEFAULT_ESCAPE_RADIUS, DEFAULT_MAX_ITERATIONS};
use crate::gradient::{GradientMap, GradientSegment};
use crate::kernel::{KernelTable, DEFAULT_KERNEL_WIDTH, DEFAULT_SIGMA};
use crate::planes::PlaneMapper;
use crate::pool::TaskPool;
use crate::raster::Coloring;
use num::Complex;

/// Default image width.
pub const DEFAULT_WIDTH: usize = 1536;
/// Default image height.
pub const DEFAULT_HEIGHT: usize = 1024;
/// Default channel count.
pub const DEFAULT_CHANNELS: usize = 3;
/// Default number of filter steps.
pub const DEFAULT_STEPS: usize = 20;

/// The full set of parameters for one render.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Sample planes per pixel.
    pub channels: usize,
    /// Fractal iteration bound.
    pub max_iterations: usize,
    /// Escape radius; the kernel compares `|z|^2` with its square.
    pub escape_radius: f64,
    /// Colour map segments, in lookup order.
    pub gradients: Vec<GradientSegment>,
    /// How escape times become colours.
    pub coloring: Coloring,
    /// Explicit complex window (left-lower, right-upper).  `None` uses
    /// the aspect-ratio strip.
    pub window: Option<(Complex<f64>, Complex<f64>)>,
    /// Convolution kernel width; odd.
    pub kernel_width: usize,
    /// Gaussian spread.
    pub sigma: f64,
    /// Rescale the kernel to unit sum before filtering.
    pub normalize_kernel: bool,
    /// Number of filter steps.
    pub steps: usize,
    /// Worker threads.
    pub workers: usize,
    /// Image rows per task.
    pub rows_per_task: usize,
}

impl Default for Config {
    fn default() -> Config {
        let pool = TaskPool::default();
        Config {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            channels: DEFAULT_CHANNELS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            escape_radius: DEFAULT_ESCAPE_RADIUS,
            gradients: GradientMap::default().segments().to_vec(),
            coloring: Coloring::Smooth,
            window: None,
            kernel_width: DEFAULT_KERNEL_WIDTH,
            sigma: DEFAULT_SIGMA,
            normalize_kernel: false,
            steps: DEFAULT_STEPS,
            workers: pool.workers(),
            rows_per_task: pool.rows_per_task(),
        }
    }
}

impl Config {
    /// Check every parameter.  The first problem found is returned.
    pub fn validate(&self) -> Result<()> {
        Image::sample_count(self.channels, self.height, self.width)?;
        self.plane()?;
        self.fractal_kernel()?;
        self.gradient_map()?;
        self.kernel_table()?;
        if self.steps == 0 {
            return Err(RenderError::InvalidSteps);
        }
        self.pool()?;
        Ok(())
    }

    /// The pixel-to-point mapping.
    pub fn plane(&self) -> Result<PlaneMapper> {
        match self.window {
            Some((leftlower, rightupper)) => {
                PlaneMapper::new(self.width, self.height, leftlower, rightupper)
            }
            None => PlaneMapper::with_aspect(self.width, self.height),
        }
    }

    /// The escape-time kernel.
    pub fn fractal_kernel(&self) -> Result<FractalKernel> {
        FractalKernel::new(self.max_iterations, self.escape_radius)
    }

    /// The validated colour map.
    pub fn gradient_map(&self) -> Result<GradientMap> {
        GradientMap::new(self.gradients.clone())
    }

    /// The convolution weights, normalized if requested.
    pub fn kernel_table(&self) -> Result<KernelTable> {
        let table = KernelTable::gaussian(self.kernel_width, self.sigma)?;
        Ok(if self.normalize_kernel {
            table.normalized()
        } else {
            table
        })
    }

    /// The worker pool.
    pub fn pool(&self) -> Result<TaskPool> {
        TaskPool::new(self.workers, self.rows_per_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Config::default().validate(), Ok(()));
    }

    #[test]
    fn each_bad_parameter_is_caught() {
        let bad = vec![
            Config {
                width: 0,
                ..Config::default()
            },
            Config {
                channels: 0,
                ..Config::default()
            },
            Config {
                width: 1 << (usize::max_value().count_ones() / 2),
                height: 1 << (usize::max_value().count_ones() / 2),
                ..Config::default()
            },
            Config {
                max_iterations: 0,
                ..Config::default()
            },
            Config {
                escape_radius: 1.0,
                ..Config::default()
            },
            Config {
                gradients: vec![],
                ..Config::default()
            },
            Config {
                kernel_width: 4,
                ..Config::default()
            },
            Config {
                sigma: -0.5,
                ..Config::default()
            },
            Config {
                steps: 0,
                ..Config::default()
            },
            Config {
                workers: 0,
                ..Config::default()
            },
            Config {
                rows_per_task: 0,
                ..Config::default()
            },
            Config {
                window: Some((Complex::new(1.0, 0.0), Complex::new(-1.0, 1.0))),
                ..Config::default()
            },
        ];
        for config in bad {
            let err = config.validate().unwrap_err();
            assert!(err.is_configuration(), "{:?} is not a configuration error", err);
        }
    }

    #[test]
    fn any_positive_band_height_is_usable() {
        let config = Config {
            width: 24,
            height: 6,
            rows_per_task: usize::max_value(),
            ..Config::default()
        };
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.pool().unwrap().rows_per_task(), usize::max_value());
    }

    #[test]
    fn kernel_normalization_is_optional() {
        let plain = Config::default().kernel_table().unwrap();
        let config = Config {
            normalize_kernel: true,
            ..Config::default()
        };
        let scaled = config.kernel_table().unwrap();
        assert!(plain.sum() > 1.0);
        assert!((scaled.sum() - 1.0).abs() < 1e-12);
    }
}
