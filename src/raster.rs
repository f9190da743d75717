// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Paints the fractal.  The image is cut into bands of rows (one row
//! per band unless the pool says otherwise) and each band becomes one
//! task.  A task owns its rows of every channel and its rows of a
//! classification grid that records which pixels were inside the set,
//! so tasks never touch each other's memory.  Once the pool has joined,
//! the grid is summed on the calling thread to count the inside
//! pixels.

use crate::buffer::{Band, Image};
use crate::error::{RenderError, Result};
use crate::fractal::{EscapeTime, FractalKernel};
use crate::gradient::{GradientMap, Rgb};
use crate::planes::{Pixel, PlaneMapper};
use crate::pool::TaskPool;

/// How escape times become colours.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Coloring {
    /// Continuous colouring from the smoothed escape index.
    Smooth,
    /// Stepped colouring from the raw iteration count.
    Banded,
}

/// Everything needed to turn a pixel into a colour.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    kernel: FractalKernel,
    gradients: GradientMap,
    plane: PlaneMapper,
    coloring: Coloring,
}

// One task: a band of image rows plus the same rows of the
// classification grid.
struct RowTask<'a> {
    band: Band<'a>,
    inside: &'a mut [u8],
}

impl Rasterizer {
    /// Combine a kernel, a colour map and a pixel-to-point mapping.
    pub fn new(
        kernel: FractalKernel,
        gradients: GradientMap,
        plane: PlaneMapper,
        coloring: Coloring,
    ) -> Rasterizer {
        Rasterizer {
            kernel,
            gradients,
            plane,
            coloring,
        }
    }

    /// The pixel-to-point mapping in use.
    pub fn plane(&self) -> &PlaneMapper {
        &self.plane
    }

    /// Escape time and colour of a single pixel.
    pub fn shade(&self, pixel: &Pixel) -> (EscapeTime, Rgb) {
        let c = self.plane.pixel_to_point(pixel);
        let escape = self.kernel.iterate(c);
        let color = match self.coloring {
            Coloring::Smooth => self.gradients.color(self.kernel.smooth_index(&escape)),
            Coloring::Banded => self.gradients.color_for_iterations(escape.iterations),
        };
        (escape, color)
    }

    fn check_shape(&self, image: &Image) -> Result<()> {
        let (width, height) = (self.plane.integral_plane.0, self.plane.integral_plane.1);
        if image.width() != width || image.height() != height {
            return Err(RenderError::DimensionMismatch(
                image.shape(),
                (image.channels(), height, width),
            ));
        }
        Ok(())
    }

    // Fill one band.  Channel `ch` receives colour component `ch % 3`.
    fn render_band(&self, task: RowTask<'_>) {
        let width = self.plane.integral_plane.0;
        let RowTask { mut band, inside } = task;
        for (offset, flag) in inside.iter_mut().enumerate() {
            let pixel = Pixel(offset % width, band.first_row + offset / width);
            let (escape, color) = self.shade(&pixel);
            *flag = escape.inside() as u8;
            for (ch, samples) in band.channels.iter_mut().enumerate() {
                samples[offset] = i32::from(color[ch % 3]);
            }
        }
    }

    fn tasks<'a>(image: &'a mut Image, inside: &'a mut [u8], rows: usize) -> Vec<RowTask<'a>> {
        let rows = image.band_rows(rows);
        let band_len = rows * image.width();
        image
            .bands_mut(rows)
            .into_iter()
            .zip(inside.chunks_mut(band_len))
            .map(|(band, inside)| RowTask { band, inside })
            .collect()
    }

    /// Render into `image` on the pool and return how many pixels are
    /// inside the set.  The count is taken only after every task has
    /// finished.
    pub fn render(&self, image: &mut Image, pool: &TaskPool) -> Result<usize> {
        self.check_shape(image)?;
        let mut inside = vec![0u8; self.plane.len()];
        {
            let tasks = Rasterizer::tasks(image, &mut inside, pool.rows_per_task());
            debug!(
                "rasterizing {} row tasks on {} workers",
                tasks.len(),
                pool.workers()
            );
            pool.run(tasks, |task| self.render_band(task))?;
        }
        Ok(count_inside(&inside))
    }

    /// The same computation, one row at a time in order on the calling
    /// thread.
    pub fn render_sequential(&self, image: &mut Image) -> Result<usize> {
        self.check_shape(image)?;
        let mut inside = vec![0u8; self.plane.len()];
        for task in Rasterizer::tasks(image, &mut inside, 1) {
            self.render_band(task);
        }
        Ok(count_inside(&inside))
    }
}

fn count_inside(grid: &[u8]) -> usize {
    grid.iter().map(|&flag| flag as usize).sum()
}
