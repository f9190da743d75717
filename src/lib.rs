#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot renderer with an iterated blur
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which `z <- z^2 + c`, started at zero, never runs off to infinity.
//! Points outside the set are coloured by how quickly they run away,
//! smoothed so the colour varies continuously instead of in bands;
//! points inside are counted.
//!
//! The rendered field is then blurred by repeatedly convolving it with
//! a small Gaussian table, reading one buffer and writing the other,
//! then swapping them.
//!
//! Both stages split their work into row-sized tasks run on a fixed
//! pool of scoped threads.  Each task is handed exclusive slices of the
//! rows it writes, so no task can see another's partial output and no
//! lock is needed; the pool's join is the only barrier.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;
extern crate num_cpus;

pub mod buffer;
pub mod config;
pub mod convolution;
pub mod error;
pub mod fractal;
pub mod gradient;
pub mod kernel;
pub mod output;
pub mod pipeline;
pub mod planes;
pub mod pool;
pub mod raster;

pub use buffer::Image;
pub use config::Config;
pub use convolution::{convolve, ConvolutionBackend, SequentialBackend, TaskBackend};
pub use error::{RenderError, Result};
pub use fractal::{EscapeTime, FractalKernel};
pub use gradient::{GradientMap, GradientSegment, Rgb};
pub use kernel::KernelTable;
pub use pipeline::{Pipeline, Rendering};
pub use planes::{Pixel, PlaneMapper};
pub use pool::TaskPool;
pub use raster::{Coloring, Rasterizer};
