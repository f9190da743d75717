// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The things that can go wrong.  Configuration problems are all
//! caught by `Config::validate` before any pixel is computed; the
//! bounds errors should be unreachable given the row partitioning,
//! and exist so that a broken caller fails loudly instead of being
//! silently clamped.

/// Every failure the renderer reports.
#[derive(Debug, Fail, PartialEq)]
pub enum RenderError {
    /// Width, height or channel count of zero.
    #[fail(
        display = "image dimensions must be positive, got {}x{} with {} channels",
        width, height, channels
    )]
    InvalidDimensions {
        /// Requested number of channels.
        channels: usize,
        /// Requested height.
        height: usize,
        /// Requested width.
        width: usize,
    },

    /// The fractal iteration bound was zero.
    #[fail(display = "the maximum iteration count must be positive")]
    InvalidIterations,

    /// Escape radius below 2 (or not a number).
    #[fail(display = "escape radius must be at least 2.0, got {}", _0)]
    InvalidEscapeRadius(f64),

    /// Kernel width was even or zero, or its weights were malformed.
    #[fail(display = "invalid convolution kernel: {}", _0)]
    InvalidKernel(String),

    /// Gaussian spread was not strictly positive.
    #[fail(display = "sigma must be positive, got {}", _0)]
    InvalidSigma(f64),

    /// The filter was asked to run zero steps.
    #[fail(display = "the convolution step count must be positive")]
    InvalidSteps,

    /// The worker pool was given zero workers or zero rows per task.
    #[fail(display = "invalid task pool: {}", _0)]
    InvalidWorkers(String),

    /// Gradient segments out of order, overlapping or not covering [0, 1].
    #[fail(display = "malformed gradient: {}", _0)]
    MalformedGradient(String),

    /// The complex window is empty or inverted.
    #[fail(display = "invalid complex window: {}", _0)]
    InvalidWindow(String),

    /// A pixel access outside the image.
    #[fail(
        display = "pixel ({}, {}, {}) is outside a {}x{}x{} image",
        channel, row, column, channels, height, width
    )]
    OutOfBounds {
        /// Requested channel.
        channel: usize,
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
        /// Channels in the image.
        channels: usize,
        /// Rows in the image.
        height: usize,
        /// Columns in the image.
        width: usize,
    },

    /// Two buffers that must agree in shape do not.
    #[fail(display = "image shapes differ: {:?} vs {:?}", _0, _1)]
    DimensionMismatch((usize, usize, usize), (usize, usize, usize)),

    /// One of the pool's workers panicked before the join.
    #[fail(display = "a worker thread panicked")]
    WorkerPanic,

    /// The output file could not be written.
    #[fail(display = "could not write {}: {}", path, reason)]
    Output {
        /// Destination path.
        path: String,
        /// What the writer reported.
        reason: String,
    },
}

impl RenderError {
    /// True for errors that `Config::validate` reports at startup.
    pub fn is_configuration(&self) -> bool {
        match self {
            RenderError::InvalidDimensions { .. }
            | RenderError::InvalidIterations
            | RenderError::InvalidEscapeRadius(_)
            | RenderError::InvalidKernel(_)
            | RenderError::InvalidSigma(_)
            | RenderError::InvalidSteps
            | RenderError::InvalidWorkers(_)
            | RenderError::MalformedGradient(_)
            | RenderError::InvalidWindow(_) => true,
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RenderError>;
