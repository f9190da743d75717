// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Writing pictures out.  `.ppm` files are plain-text pixmaps, one
//! pixel per line; `.pnm` files are binary pixmaps; anything else is
//! handed to the `image` crate, which picks a format from the
//! extension.

use crate::buffer::Image;
use crate::error::{RenderError, Result};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write `image` as a plain (P3) pixmap: a `P3` line, `<width>
/// <height>`, `255`, then one `R G B` line per pixel, row-major from the
/// top left.
pub fn write_ppm<W: Write>(out: W, image: &Image) -> io::Result<()> {
    let mut out = BufWriter::new(out);
    writeln!(out, "P3")?;
    writeln!(out, "{} {}", image.width(), image.height())?;
    writeln!(out, "255")?;
    for rgb in image.to_rgb8().chunks(3) {
        writeln!(out, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }
    out.flush()
}

fn write_pnm(path: &Path, image: &Image) -> io::Result<()> {
    let output = File::create(path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(
        &image.to_rgb8()[..],
        image.width() as u32,
        image.height() as u32,
        ColorType::RGB(8),
    )
}

/// Save `image` to `path`, choosing the format from the extension.
pub fn save<P: AsRef<Path>>(path: P, image: &Image) -> Result<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let written = match extension.as_ref().map(|e| e.as_str()) {
        Some("ppm") => File::create(path).and_then(|file| write_ppm(file, image)),
        Some("pnm") => write_pnm(path, image),
        _ => image::save_buffer(
            path,
            &image.to_rgb8(),
            image.width() as u32,
            image.height() as u32,
            ColorType::RGB(8),
        )
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string())),
    };
    written.map_err(|e| RenderError::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    info!("wrote {}", path.display());
    Ok(())
}
