// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate mandelblur;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelblur::{output, Coloring, Config, GradientSegment, Pipeline, Rgb};
use num::Complex;
use std::str::FromStr;

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn parse_color(s: &str) -> Option<Rgb> {
    let parts: Vec<u8> = s
        .split(',')
        .map(u8::from_str)
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [r, g, b] => Some([*r, *g, *b]),
        _ => None,
    }
}

/// A gradient segment written `r,g,b:r,g,b:start:end`, optionally
/// followed by `:scale` for the iteration normalization constant.
fn parse_gradient(s: &str, default_scale: usize) -> Option<GradientSegment> {
    let fields: Vec<&str> = s.split(':').collect();
    if fields.len() != 4 && fields.len() != 5 {
        return None;
    }
    let scale = match fields.get(4) {
        Some(scale) => usize::from_str(scale).ok()?,
        None => default_scale,
    };
    Some(GradientSegment::new(
        parse_color(fields[0])?,
        parse_color(fields[1])?,
        f64::from_str(fields[2]).ok()?,
        f64::from_str(fields[3]).ok()?,
        scale,
    ))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const RAW: &str = "raw";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ROWS: &str = "rows-per-task";
const ITERATIONS: &str = "iterations";
const RADIUS: &str = "escape-radius";
const GRADIENT: &str = "gradient";
const BANDED: &str = "banded";
const KERNEL: &str = "kernel-width";
const SIGMA: &str = "sigma";
const NORMALIZE: &str = "normalize-kernel";
const STEPS: &str = "steps";
const VERIFY: &str = "verify";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get().max(mandelblur::pool::DEFAULT_WORKER_CAP);

    App::new("mandelblur")
        .version("0.1.0")
        .about("Renders a Mandelbrot field and blurs it, on a pool of worker threads")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (.ppm for plain text, .pnm for binary, or any image format)"),
        )
        .arg(
            Arg::with_name(RAW)
                .long(RAW)
                .takes_value(true)
                .help("Also write the unfiltered fractal to this file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1536x1024")
                .validator(|s| validate_pair::<usize>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .requires(RIGHTUPPER)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the complex window (default: aspect-ratio strip)"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .requires(LEFTLOWER)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the complex window"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads (default: one per core, at most 16)"),
        )
        .arg(
            Arg::with_name(ROWS)
                .long(ROWS)
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse rows per task",
                        "Rows per task must be positive",
                    )
                })
                .help("Image rows handed to each task"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("2048")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum fractal iterations per pixel"),
        )
        .arg(
            Arg::with_name(RADIUS)
                .long(RADIUS)
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        2.0,
                        std::f64::MAX,
                        "Could not parse escape radius",
                        "Escape radius must be at least 2",
                    )
                })
                .help("Escape radius"),
        )
        .arg(
            Arg::with_name(GRADIENT)
                .long(GRADIENT)
                .short("g")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .validator(|s| match parse_gradient(&s, 1) {
                    Some(_) => Ok(()),
                    None => Err("Gradient segments look like r,g,b:r,g,b:start:end[:scale]".to_string()),
                })
                .help("A gradient segment; repeat in order to replace the default palette"),
        )
        .arg(
            Arg::with_name(BANDED)
                .long(BANDED)
                .help("Colour by raw iteration count instead of the smoothed index"),
        )
        .arg(
            Arg::with_name(KERNEL)
                .long(KERNEL)
                .short("k")
                .takes_value(true)
                .default_value("5")
                .validator(|s| match usize::from_str(&s) {
                    Ok(k) if k % 2 == 1 => Ok(()),
                    _ => Err("Kernel width must be a positive odd number".to_string()),
                })
                .help("Width of the square convolution kernel"),
        )
        .arg(
            Arg::with_name(SIGMA)
                .long(SIGMA)
                .takes_value(true)
                .default_value("0.37")
                .validator(|s| match f64::from_str(&s) {
                    Ok(sigma) if sigma > 0.0 => Ok(()),
                    _ => Err("Sigma must be a positive number".to_string()),
                })
                .help("Spread of the Gaussian kernel"),
        )
        .arg(
            Arg::with_name(NORMALIZE)
                .long(NORMALIZE)
                .help("Scale the kernel so its weights sum to one"),
        )
        .arg(
            Arg::with_name(STEPS)
                .long(STEPS)
                .short("n")
                .takes_value(true)
                .default_value("20")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse step count",
                        "Step count must be positive",
                    )
                })
                .help("Number of convolution steps"),
        )
        .arg(
            Arg::with_name(VERIFY)
                .long(VERIFY)
                .help("Repeat the filter on one thread and check both results agree"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| failure::err_msg(format!("missing --{}", name)))?;
    T::from_str(raw).map_err(|_| failure::err_msg(format!("could not parse --{} {}", name, raw)))
}

fn config(matches: &ArgMatches) -> Result<Config, failure::Error> {
    let mut config = Config::default();
    let (width, height) = parse_pair(matches.value_of(SIZE).unwrap_or_default(), 'x')
        .ok_or_else(|| failure::err_msg("could not parse image dimensions"))?;
    config.width = width;
    config.height = height;
    config.max_iterations = value(matches, ITERATIONS)?;
    config.escape_radius = value(matches, RADIUS)?;
    config.kernel_width = value(matches, KERNEL)?;
    config.sigma = value(matches, SIGMA)?;
    config.steps = value(matches, STEPS)?;
    config.rows_per_task = value(matches, ROWS)?;
    if matches.is_present(THREADS) {
        config.workers = value(matches, THREADS)?;
    }
    config.normalize_kernel = matches.is_present(NORMALIZE);
    if matches.is_present(BANDED) {
        config.coloring = Coloring::Banded;
    }
    if let (Some(ll), Some(ru)) = (matches.value_of(LEFTLOWER), matches.value_of(RIGHTUPPER)) {
        let leftlower =
            parse_complex(ll).ok_or_else(|| failure::err_msg("could not parse left lower corner"))?;
        let rightupper = parse_complex(ru)
            .ok_or_else(|| failure::err_msg("could not parse right upper corner"))?;
        config.window = Some((leftlower, rightupper));
    }
    if let Some(segments) = matches.values_of(GRADIENT) {
        let scale = config.max_iterations;
        config.gradients = segments
            .map(|s| {
                parse_gradient(s, scale)
                    .ok_or_else(|| failure::err_msg(format!("could not parse gradient {}", s)))
            })
            .collect::<Result<_, _>>()?;
    }
    config.validate()?;
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    let config = config(matches)?;
    let pipeline = Pipeline::from_config(&config)?;
    let rendering = pipeline.run()?;
    println!("Total Mandelbrot pixels: {}", rendering.inside);
    if matches.is_present(VERIFY) {
        let same = pipeline.verify(&rendering)?;
        println!("Sequential and parallel results match: {}", same);
        if !same {
            return Err(failure::err_msg("parallel filter output differs from sequential"));
        }
    }
    if let Some(raw) = matches.value_of(RAW) {
        output::save(raw, &rendering.raw)?;
    }
    if let Some(path) = matches.value_of(OUTPUT) {
        output::save(path, &rendering.filtered)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
