use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

/// Simple structure for Cartesian coordinates with single precision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl From<[f32; 3]> for Point {
    fn from(value: [f32; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

/// Size of an encoded point in bytes.
pub const POINT_SIZE: usize = 12;

/// Encodes points as packed little endian single precision XYZ triples.
///
/// There is no length prefix or separator.
/// NaN and infinite values are copied bit by bit.
pub fn encode_points(points: &[Point]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(points.len() * POINT_SIZE);
    for p in points {
        buffer.extend_from_slice(&p.x.to_le_bytes());
        buffer.extend_from_slice(&p.y.to_le_bytes());
        buffer.extend_from_slice(&p.z.to_le_bytes());
    }
    buffer
}

/// Bounding ranges for generated points.
#[derive(Clone, Debug, PartialEq)]
pub struct PointBounds {
    pub x: Range<f32>,
    pub y: Range<f32>,
    pub z: Range<f32>,
}

impl Default for PointBounds {
    fn default() -> Self {
        Self {
            x: -1000.0..1000.0,
            y: -1000.0..1000.0,
            z: 0.0..100.0,
        }
    }
}

/// Generates reproducible pseudo random points, the same seed always yields the same points.
pub fn random_points(count: usize, seed: u64, bounds: &PointBounds) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut sample = |range: &Range<f32>| range.start + rng.gen::<f32>() * (range.end - range.start);
    (0..count)
        .map(|_| {
            let x = sample(&bounds.x);
            let y = sample(&bounds.y);
            let z = sample(&bounds.z);
            Point::new(x, y, z)
        })
        .collect()
}
