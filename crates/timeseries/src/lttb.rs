//! Largest-Triangle-Three-Buckets downsampling.
//!
//! Reduces a point sequence to `threshold` points while keeping the visual
//! shape: the first and last points are always kept and every interior
//! bucket contributes the point forming the largest triangle with the
//! previously kept point and the next bucket's centroid.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Downsample `data` to exactly `threshold` points.
///
/// Returns the input unchanged when it already fits or `threshold < 3`.
pub fn downsample(data: &[Point], threshold: usize) -> Vec<Point> {
    if data.len() <= threshold || threshold < 3 {
        return data.to_vec();
    }
    select_indices(data, threshold)
        .into_iter()
        .map(|i| data[i])
        .collect()
}

/// Indices of the points [`downsample`] keeps, ascending.
pub fn select_indices(data: &[Point], threshold: usize) -> Vec<usize> {
    let n = data.len();
    if n <= threshold || threshold < 3 {
        return (0..n).collect();
    }

    let bucket_size = (n - 2) as f64 / (threshold - 2) as f64;
    let boundary = |i: usize| (i as f64 * bucket_size).floor() as usize + 1;

    let mut selected = Vec::with_capacity(threshold);
    selected.push(0);
    let mut prev = 0usize;

    for i in 0..threshold - 2 {
        let start = boundary(i);
        let end = boundary(i + 1).min(n - 1).max(start + 1);

        let next_start = boundary(i + 1).min(n - 1);
        let mut next_end = boundary(i + 2).min(n);
        if next_end <= next_start {
            next_end = next_start + 1;
        }
        let (avg_x, avg_y) = centroid(&data[next_start..next_end]);

        let a = data[prev];
        let mut max_area = -1.0;
        let mut max_index = start;
        for (j, p) in data.iter().enumerate().take(end).skip(start) {
            let area = ((a.x - avg_x) * (p.y - a.y) - (a.x - p.x) * (avg_y - a.y)).abs() * 0.5;
            if area > max_area {
                max_area = area;
                max_index = j;
            }
        }

        selected.push(max_index);
        prev = max_index;
    }

    selected.push(n - 1);
    selected
}

fn centroid(points: &[Point]) -> (f64, f64) {
    let count = points.len().max(1) as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    (sx / count, sy / count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<Point> {
        (0..n).map(|i| Point::new(i as f64, i as f64 * 0.5 + 10.0)).collect()
    }

    #[test]
    fn test_short_input_unchanged() {
        let data = line(50);
        assert_eq!(downsample(&data, 50), data);
        assert_eq!(downsample(&data, 100), data);
    }

    #[test]
    fn test_small_threshold_is_noop() {
        let data = line(50);
        assert_eq!(downsample(&data, 2), data);
        assert_eq!(downsample(&data, 0), data);
    }

    #[test]
    fn test_monotonic_ten_thousand_to_hundred() {
        let data = line(10_000);
        let out = downsample(&data, 100);
        assert_eq!(out.len(), 100);
        assert_eq!(out[0], data[0]);
        assert_eq!(out[99], data[9_999]);
    }

    #[test]
    fn test_exact_threshold_count_and_order() {
        for (n, t) in [(11, 10), (101, 3), (1000, 7), (2500, 2000), (37, 36)] {
            let data: Vec<Point> = (0..n)
                .map(|i| Point::new(i as f64, ((i * 37) % 11) as f64))
                .collect();
            let idx = select_indices(&data, t);
            assert_eq!(idx.len(), t, "n={n} t={t}");
            assert_eq!(idx[0], 0);
            assert_eq!(idx[t - 1], n - 1);
            assert!(idx.windows(2).all(|w| w[0] < w[1]), "n={n} t={t}");
        }
    }

    #[test]
    fn test_spike_is_preserved() {
        let mut data = line(1000);
        data[500].y = 10_000.0;
        let out = downsample(&data, 20);
        assert!(out.iter().any(|p| p.y == 10_000.0));
    }

    #[test]
    fn test_threshold_three_picks_extreme_interior() {
        let data = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 8.0),
            Point::new(3.0, 2.0),
            Point::new(4.0, 0.0),
        ];
        let out = downsample(&data, 3);
        assert_eq!(out, vec![data[0], data[2], data[4]]);
    }
}
