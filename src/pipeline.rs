// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rasterize, then filter.  A `Pipeline` is built from a validated
//! `Config` and owns everything the two stages share: the pool, the
//! rasterizer and the kernel table.

use crate::buffer::Image;
use crate::config::Config;
use crate::convolution::{ConvolutionBackend, SequentialBackend, TaskBackend};
use crate::error::Result;
use crate::kernel::KernelTable;
use crate::pool::TaskPool;
use crate::raster::Rasterizer;
use std::time::{Duration, Instant};

/// The products of one run.
#[derive(Clone, Debug)]
pub struct Rendering {
    /// The fractal before filtering.
    pub raw: Image,
    /// The fractal after the last filter step.
    pub filtered: Image,
    /// Pixels inside the set.
    pub inside: usize,
    /// Time spent rasterizing.
    pub raster_time: Duration,
    /// Time spent filtering.
    pub filter_time: Duration,
}

/// A ready-to-run render.
pub struct Pipeline {
    channels: usize,
    steps: usize,
    pool: TaskPool,
    rasterizer: Rasterizer,
    kernel: KernelTable,
    backend: Box<dyn ConvolutionBackend + Send + Sync>,
}

impl Pipeline {
    /// Validate `config` and build every component from it.
    pub fn from_config(config: &Config) -> Result<Pipeline> {
        config.validate()?;
        let pool = config.pool()?;
        let rasterizer = Rasterizer::new(
            config.fractal_kernel()?,
            config.gradient_map()?,
            config.plane()?,
            config.coloring,
        );
        let kernel = config.kernel_table()?;
        debug!(
            "kernel {}x{} sigma {} sums to {:.4}",
            kernel.width(),
            kernel.width(),
            config.sigma,
            kernel.sum()
        );
        Ok(Pipeline {
            channels: config.channels,
            steps: config.steps,
            pool,
            rasterizer,
            kernel,
            backend: Box::new(TaskBackend::new(pool)),
        })
    }

    /// Swap in a different filter backend.
    pub fn with_backend<B>(mut self, backend: B) -> Pipeline
    where
        B: ConvolutionBackend + Send + Sync + 'static,
    {
        self.backend = Box::new(backend);
        self
    }

    /// Run both stages.
    pub fn run(&self) -> Result<Rendering> {
        let plane = self.rasterizer.plane();
        let (width, height) = (plane.integral_plane.0, plane.integral_plane.1);
        info!(
            "rendering {}x{} on {} workers, {} rows per task",
            width,
            height,
            self.pool.workers(),
            self.pool.rows_per_task()
        );

        let mut image = Image::new(self.channels, height, width)?;
        let started = Instant::now();
        let inside = self.rasterizer.render(&mut image, &self.pool)?;
        let raster_time = started.elapsed();
        info!("Mandelbrot time: {:?}", raster_time);
        info!("Total Mandelbrot pixels: {}", inside);

        let raw = image.clone();
        let mut filtered = Image::new(self.channels, height, width)?;
        let started = Instant::now();
        self.backend
            .convolve(&mut image, &mut filtered, &self.kernel, self.steps)?;
        let filter_time = started.elapsed();
        info!(
            "Convolution time ({} steps, {} backend): {:?}",
            self.steps,
            self.backend.name(),
            filter_time
        );

        Ok(Rendering {
            raw,
            filtered,
            inside,
            raster_time,
            filter_time,
        })
    }

    /// Filter `rendering.raw` again on a single thread and report
    /// whether it matches `rendering.filtered`.
    pub fn verify(&self, rendering: &Rendering) -> Result<bool> {
        let (channels, height, width) = rendering.raw.shape();
        let mut src = rendering.raw.clone();
        let mut dst = Image::new(channels, height, width)?;
        let started = Instant::now();
        SequentialBackend.convolve(&mut src, &mut dst, &self.kernel, self.steps)?;
        info!("Sequential convolution time: {:?}", started.elapsed());
        let matches = dst == rendering.filtered;
        if !matches {
            warn!("{} backend disagrees with the sequential filter", self.backend.name());
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convolution::SequentialBackend;

    fn small() -> Config {
        Config {
            width: 48,
            height: 32,
            steps: 3,
            workers: 3,
            ..Config::default()
        }
    }

    #[test]
    fn pipeline_produces_both_images() {
        let rendering = Pipeline::from_config(&small()).unwrap().run().unwrap();
        assert_eq!(rendering.raw.shape(), (3, 32, 48));
        assert_eq!(rendering.filtered.shape(), (3, 32, 48));
        assert_ne!(rendering.raw, rendering.filtered);
    }

    #[test]
    fn backend_choice_does_not_change_the_result() {
        let config = small();
        let parallel = Pipeline::from_config(&config).unwrap().run().unwrap();
        let sequential = Pipeline::from_config(&config)
            .unwrap()
            .with_backend(SequentialBackend)
            .run()
            .unwrap();
        assert_eq!(parallel.filtered, sequential.filtered);
        assert_eq!(parallel.inside, sequential.inside);
    }

    #[test]
    fn verify_compares_against_the_sequential_filter() {
        let pipeline = Pipeline::from_config(&small()).unwrap();
        let mut rendering = pipeline.run().unwrap();
        assert_eq!(pipeline.verify(&rendering), Ok(true));
        rendering.filtered = rendering.raw.clone();
        assert_eq!(pipeline.verify(&rendering), Ok(false));
    }

    #[test]
    fn invalid_config_fails_before_rendering() {
        let config = Config {
            steps: 0,
            ..small()
        };
        assert!(Pipeline::from_config(&config).is_err());
    }
}
