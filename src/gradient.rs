// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colouring.  A gradient is an ordered list of segments that together
//! cover [0, 1]; each segment blends linearly from one colour to
//! another across its own threshold range.  The fractal kernel's
//! smoothed escape value is looked up here to produce an RGB triple.

use crate::error::{RenderError, Result};
use num::clamp;

/// An RGB triple.
pub type Rgb = [u8; 3];

// Thresholds that differ by less than this are treated as touching.
const THRESHOLD_EPSILON: f64 = 1e-9;

/// One stretch of the colour map.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GradientSegment {
    /// Colour at `start`.
    pub start_color: Rgb,
    /// Colour at `end`.
    pub end_color: Rgb,
    /// Lower threshold, in [0, 1].
    pub start: f64,
    /// Upper threshold, in [0, 1].
    pub end: f64,
    /// Iteration count that maps to 1.0 when colouring raw counts.
    pub max_iterations: usize,
}

impl GradientSegment {
    /// Describe a segment.  Nothing is checked until the segment is
    /// placed in a `GradientMap`.
    pub fn new(
        start_color: Rgb,
        end_color: Rgb,
        start: f64,
        end: f64,
        max_iterations: usize,
    ) -> GradientSegment {
        GradientSegment {
            start_color,
            end_color,
            start,
            end,
            max_iterations,
        }
    }

    /// Does `q` fall inside this segment's (closed) range?
    #[inline]
    pub fn contains(&self, q: f64) -> bool {
        q >= self.start && q <= self.end
    }

    /// How far along the segment `q` is, clamped to [0, 1].  A
    /// zero-width segment answers 1.
    pub fn fraction(&self, q: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return 1.0;
        }
        let t = (q - self.start) / span;
        if t.is_nan() {
            1.0
        } else {
            clamp(t, 0.0, 1.0)
        }
    }

    /// Blend the segment's colours for `q`.
    pub fn interpolate(&self, q: f64) -> Rgb {
        let t = self.fraction(q);
        let mut rgb = [0u8; 3];
        for (i, out) in rgb.iter_mut().enumerate() {
            let from = f64::from(self.start_color[i]);
            let to = f64::from(self.end_color[i]);
            *out = clamp((from + t * (to - from)).round(), 0.0, 255.0) as u8;
        }
        rgb
    }

    /// Convert a raw iteration count into [0, 1] using this segment's
    /// normalization constant.
    pub fn normalize(&self, iterations: usize) -> f64 {
        clamp(iterations as f64 / self.max_iterations as f64, 0.0, 1.0)
    }
}

/// A validated, ordered list of segments covering [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct GradientMap {
    segments: Vec<GradientSegment>,
}

impl GradientMap {
    /// Check that the segments are increasing, contiguous and together
    /// cover [0, 1].
    pub fn new(segments: Vec<GradientSegment>) -> Result<GradientMap> {
        let malformed = |why: String| Err(RenderError::MalformedGradient(why));
        let (first, last) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return malformed("no segments".to_string()),
        };
        if first.start.abs() > THRESHOLD_EPSILON {
            return malformed(format!("first segment starts at {}, not 0", first.start));
        }
        if (last.end - 1.0).abs() > THRESHOLD_EPSILON {
            return malformed(format!("last segment ends at {}, not 1", last.end));
        }
        for (i, segment) in segments.iter().enumerate() {
            if !(segment.start <= segment.end) {
                return malformed(format!(
                    "segment {} runs backwards ({} > {})",
                    i, segment.start, segment.end
                ));
            }
            if segment.max_iterations == 0 {
                return malformed(format!("segment {} has a zero iteration scale", i));
            }
        }
        for (i, pair) in segments.windows(2).enumerate() {
            if (pair[1].start - pair[0].end).abs() > THRESHOLD_EPSILON {
                return malformed(format!(
                    "segment {} ends at {} but segment {} starts at {}",
                    i,
                    pair[0].end,
                    i + 1,
                    pair[1].start
                ));
            }
        }
        Ok(GradientMap { segments })
    }

    /// The segments, in lookup order.
    pub fn segments(&self) -> &[GradientSegment] {
        &self.segments
    }

    /// The first segment whose range holds `q`; anything outside every
    /// range (including NaN) goes to the last one.
    pub fn segment_for(&self, q: f64) -> &GradientSegment {
        let last = &self.segments[self.segments.len() - 1];
        self.segments
            .iter()
            .find(|segment| segment.contains(q))
            .unwrap_or(last)
    }

    /// Colour for a smoothed escape value.
    pub fn color(&self, q: f64) -> Rgb {
        self.segment_for(q).interpolate(q)
    }

    /// Colour for a raw iteration count, normalized by the first
    /// segment's scale and then looked up like a smoothed value.
    pub fn color_for_iterations(&self, iterations: usize) -> Rgb {
        let q = self.segments[0].normalize(iterations);
        self.color(q)
    }
}

impl Default for GradientMap {
    /// Deep violet rising to white, then falling back to black.
    fn default() -> GradientMap {
        GradientMap {
            segments: vec![
                GradientSegment::new([0, 0, 0], [76, 57, 125], 0.0, 0.010, 2000),
                GradientSegment::new([76, 57, 125], [255, 255, 255], 0.010, 0.020, 2000),
                GradientSegment::new([255, 255, 255], [0, 0, 0], 0.020, 0.050, 2000),
                GradientSegment::new([0, 0, 0], [0, 0, 0], 0.050, 1.0, 2000),
            ],
        }
    }
}
