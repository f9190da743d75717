extern crate mandelblur;
extern crate num;
extern crate rand;

use mandelblur::convolution::convolve_planes;
use mandelblur::{
    convolve, Coloring, ConvolutionBackend, FractalKernel, GradientMap, Image, KernelTable,
    PlaneMapper, Rasterizer, SequentialBackend, TaskBackend, TaskPool,
};
use num::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seahorse(width: usize, height: usize) -> Rasterizer {
    Rasterizer::new(
        FractalKernel::default(),
        GradientMap::default(),
        PlaneMapper::with_aspect(width, height).unwrap(),
        Coloring::Smooth,
    )
}

fn noise(channels: usize, height: usize, width: usize, seed: u64) -> Image {
    let mut rng = StdRng::seed_from_u64(seed);
    let planes: Vec<Vec<i32>> = (0..channels)
        .map(|_| (0..height * width).map(|_| rng.gen_range(0, 256)).collect())
        .collect();
    Image::from_planes(height, width, &planes).unwrap()
}

#[test]
fn parallel_and_sequential_rasterization_agree() {
    let r = seahorse(96, 64);
    let mut sequential = Image::new(3, 64, 96).unwrap();
    let expected = r.render_sequential(&mut sequential).unwrap();

    for &(workers, rows) in &[(1, 1), (4, 1), (7, 3), (16, 64)] {
        let mut parallel = Image::new(3, 64, 96).unwrap();
        let pool = TaskPool::new(workers, rows).unwrap();
        let inside = r.render(&mut parallel, &pool).unwrap();
        assert_eq!(inside, expected, "{} workers, {} rows", workers, rows);
        assert_eq!(parallel, sequential, "{} workers, {} rows", workers, rows);
    }
}

#[test]
fn banded_coloring_is_deterministic_too() {
    let r = Rasterizer::new(
        FractalKernel::new(600, 2.0).unwrap(),
        GradientMap::default(),
        PlaneMapper::new(50, 40, Complex::new(-2.0, -1.2), Complex::new(0.6, 1.2)).unwrap(),
        Coloring::Banded,
    );
    let mut a = Image::new(3, 40, 50).unwrap();
    let mut b = Image::new(3, 40, 50).unwrap();
    assert_eq!(
        r.render(&mut a, &TaskPool::new(5, 2).unwrap()).unwrap(),
        r.render_sequential(&mut b).unwrap()
    );
    assert_eq!(a, b);
}

#[test]
fn origin_is_inside_for_any_bound() {
    for &bound in &[1, 2, 100, 2048, 50_000] {
        let escape = FractalKernel::new(bound, 4.0)
            .unwrap()
            .iterate(Complex::new(0.0, 0.0));
        assert!(escape.inside());
        assert_eq!(escape.iterations, bound);
    }
}

#[test]
fn two_plus_zero_i_is_outside_immediately() {
    let kernel = FractalKernel::default();
    let escape = kernel.iterate(Complex::new(2.0, 0.0));
    assert!(escape.escaped);
    assert!(escape.iterations <= 2);
    assert!(kernel.smooth_index(&escape).is_finite());
}

#[test]
fn box_filter_on_a_constant_image() {
    let kernel = KernelTable::from_weights(3, vec![1.0 / 9.0; 9]).unwrap();
    let mut src = Image::from_planes(4, 4, &[vec![100; 16]]).unwrap();
    let mut dst = Image::new(1, 4, 4).unwrap();
    convolve(&mut src, &mut dst, &kernel, 1, &TaskPool::new(4, 1).unwrap()).unwrap();

    assert_eq!(dst.get(0, 1, 1), Ok(100));
    assert_eq!(dst.get(0, 2, 2), Ok(100));
    // Corners keep only the 2x2 part of the window: 4 * 100 / 9.
    for &(row, column) in &[(0, 0), (0, 3), (3, 0), (3, 3)] {
        assert_eq!(dst.get(0, row, column), Ok(44));
    }
    // Edges keep 2x3: 6 * 100 / 9.
    assert_eq!(dst.get(0, 0, 1), Ok(67));
}

#[test]
fn unit_kernel_is_the_identity() {
    let input = noise(3, 17, 23, 11);
    for &steps in &[1, 2, 5] {
        let mut src = input.clone();
        let mut dst = Image::new(3, 17, 23).unwrap();
        convolve(
            &mut src,
            &mut dst,
            &KernelTable::identity(),
            steps,
            &TaskPool::new(4, 2).unwrap(),
        )
        .unwrap();
        assert_eq!(dst, input, "{} steps", steps);
    }
}

#[test]
fn output_stays_in_range() {
    let heavy = KernelTable::from_weights(3, vec![5.0; 9]).unwrap();
    let gaussian = KernelTable::gaussian(5, 0.37).unwrap();
    for kernel in &[heavy, gaussian] {
        for seed in 0..4 {
            let mut src = noise(2, 12, 9, seed);
            let mut dst = Image::new(2, 12, 9).unwrap();
            convolve(&mut src, &mut dst, kernel, 3, &TaskPool::new(3, 1).unwrap()).unwrap();
            for plane in dst.planes() {
                assert!(plane.iter().all(|&s| s >= 0 && s <= 255));
            }
        }
    }
}

#[test]
fn three_steps_equal_three_single_steps() {
    let kernel = KernelTable::gaussian(5, 0.37).unwrap();
    let pool = TaskPool::new(6, 1).unwrap();
    let mut input = Image::new(3, 32, 48).unwrap();
    seahorse(48, 32).render(&mut input, &pool).unwrap();

    let mut src = input.clone();
    let mut dst = Image::new(3, 32, 48).unwrap();
    convolve(&mut src, &mut dst, &kernel, 3, &pool).unwrap();

    let mut a = input.clone();
    let mut b = Image::new(3, 32, 48).unwrap();
    convolve(&mut a, &mut b, &kernel, 1, &pool).unwrap();
    convolve(&mut b, &mut a, &kernel, 1, &pool).unwrap();
    convolve(&mut a, &mut b, &kernel, 1, &pool).unwrap();

    assert_eq!(dst, b);
    assert_ne!(dst, input);
}

#[test]
fn backends_honour_the_same_contract() {
    let kernel = KernelTable::gaussian(3, 0.9).unwrap();
    let input = noise(3, 10, 14, 99);
    let backends: Vec<Box<dyn ConvolutionBackend>> = vec![
        Box::new(SequentialBackend),
        Box::new(TaskBackend::new(TaskPool::new(8, 2).unwrap())),
    ];
    let outputs: Vec<Vec<Vec<i32>>> = backends
        .iter()
        .map(|b| convolve_planes(b.as_ref(), &input.planes(), 10, 14, &kernel, 4).unwrap())
        .collect();
    assert_eq!(outputs[0], outputs[1]);
}
