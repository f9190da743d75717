// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The iterated blur.  Every step centres the kernel table on every
//! sample of every channel, sums the weighted neighbours that lie
//! inside the image (the window is simply cut off at the borders, and
//! the surviving weights are not rescaled), rounds, clamps to
//! [0, 255] and writes the destination.  Between steps the two buffers
//! trade places so the next step reads what the last one wrote.
//!
//! In the parallel engine one task covers one band of rows of one
//! channel.  The pool's join at the end of each step is the barrier
//! that keeps step `t + 1` from reading a half-written step `t`.

use crate::buffer::{clamp_sample, ChannelBand, Image};
use crate::error::{RenderError, Result};
use crate::kernel::KernelTable;
use crate::pool::TaskPool;
use std::mem;

/// Anything that can run the filter.  Every implementation must produce
/// exactly what the sequential one does: same border truncation, same
/// rounding, same swap semantics.  On success `dst` holds the result
/// of the last step and `src` the result of the one before it (or the
/// untouched input after a single step).
pub trait ConvolutionBackend {
    /// A short name for logs.
    fn name(&self) -> &'static str;

    /// Run `steps` filter steps from `src` into `dst`.
    fn convolve(
        &self,
        src: &mut Image,
        dst: &mut Image,
        kernel: &KernelTable,
        steps: usize,
    ) -> Result<()>;
}

/// The worker-pool engine.
#[derive(Copy, Clone, Debug)]
pub struct TaskBackend {
    pool: TaskPool,
}

impl TaskBackend {
    /// Filter on the given pool.
    pub fn new(pool: TaskPool) -> TaskBackend {
        TaskBackend { pool }
    }
}

impl ConvolutionBackend for TaskBackend {
    fn name(&self) -> &'static str {
        "tasks"
    }

    fn convolve(
        &self,
        src: &mut Image,
        dst: &mut Image,
        kernel: &KernelTable,
        steps: usize,
    ) -> Result<()> {
        convolve(src, dst, kernel, steps, &self.pool)
    }
}

/// A single-threaded reference engine.
#[derive(Copy, Clone, Debug, Default)]
pub struct SequentialBackend;

impl ConvolutionBackend for SequentialBackend {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn convolve(
        &self,
        src: &mut Image,
        dst: &mut Image,
        kernel: &KernelTable,
        steps: usize,
    ) -> Result<()> {
        check(src, dst, steps)?;
        for step in 0..steps {
            {
                let source: &Image = src;
                for band in dst.channel_bands_mut(source.height()) {
                    filter_band(source, kernel, band);
                }
            }
            if step + 1 < steps {
                mem::swap(src, dst);
            }
        }
        Ok(())
    }
}

fn check(src: &Image, dst: &Image, steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(RenderError::InvalidSteps);
    }
    if src.shape() != dst.shape() {
        return Err(RenderError::DimensionMismatch(src.shape(), dst.shape()));
    }
    Ok(())
}

/// Run `steps` filter steps on `pool`.  See `ConvolutionBackend` for
/// where the result ends up.
pub fn convolve(
    src: &mut Image,
    dst: &mut Image,
    kernel: &KernelTable,
    steps: usize,
    pool: &TaskPool,
) -> Result<()> {
    check(src, dst, steps)?;
    for step in 0..steps {
        {
            let source: &Image = src;
            let tasks = dst.channel_bands_mut(pool.rows_per_task());
            trace!("convolution step {} of {}: {} tasks", step + 1, steps, tasks.len());
            pool.run(tasks, |band| filter_band(source, kernel, band))?;
        }
        if step + 1 < steps {
            mem::swap(src, dst);
        }
    }
    Ok(())
}

/// The flattened-field form of the filter: one row-major `Vec` per
/// channel in, one per channel out, computed by `backend`.
pub fn convolve_planes<B: ConvolutionBackend + ?Sized>(
    backend: &B,
    planes: &[Vec<i32>],
    height: usize,
    width: usize,
    kernel: &KernelTable,
    steps: usize,
) -> Result<Vec<Vec<i32>>> {
    let mut src = Image::from_planes(height, width, planes)?;
    let mut dst = Image::new(src.channels(), height, width)?;
    backend.convolve(&mut src, &mut dst, kernel, steps)?;
    Ok(dst.planes())
}

// Filter the rows of one channel band from the matching channel of
// `source`.
fn filter_band(source: &Image, kernel: &KernelTable, band: ChannelBand<'_>) {
    let (height, width) = (source.height(), source.width());
    let plane = source.plane(band.channel);
    let d = kernel.displacement();
    for (offset, out) in band.samples.iter_mut().enumerate() {
        let i = band.first_row + offset / width;
        let j = offset % width;
        // Clip the window to the image instead of testing each tap.
        let k_start = i.min(d);
        let k_end = d.min(height - 1 - i);
        let l_start = j.min(d);
        let l_end = d.min(width - 1 - j);
        let mut val = 0.0;
        for row in (i - k_start)..=(i + k_end) {
            let weights = kernel.row(row + d - i);
            let samples = &plane[row * width..(row + 1) * width];
            for column in (j - l_start)..=(j + l_end) {
                val += weights[column + d - j] * f64::from(samples[column]);
            }
        }
        *out = clamp_sample(val.round() as i32);
    }
}
