use std::collections::BTreeSet;

use crate::lttb::{select_indices, Point};

/// Downsample each channel on its own (x = sample index) and return the
/// sorted union of the kept indices.
///
/// Re-slicing parallel arrays by the result gives aligned series of at most
/// `channels.len() * threshold` points that share one axis.
pub fn merged_indices(channels: &[&[f64]], threshold: usize) -> Vec<usize> {
    let mut keep = BTreeSet::new();
    for values in channels {
        let points: Vec<Point> = values
            .iter()
            .enumerate()
            .map(|(i, &y)| Point::new(i as f64, y))
            .collect();
        keep.extend(select_indices(&points, threshold));
    }
    keep.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_of_channel_selections() {
        let n = 5_000;
        let oil: Vec<f64> = (0..n).map(|i| 70.0 + ((i as f64) / 40.0).sin() * 10.0).collect();
        let risk: Vec<f64> = (0..n).map(|i| ((i * 7919) % 100) as f64).collect();

        let idx = merged_indices(&[&oil, &risk], 200);
        assert!(idx.len() >= 200);
        assert!(idx.len() <= 400);
        assert_eq!(idx[0], 0);
        assert_eq!(*idx.last().unwrap(), n - 1);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));

        let oil_only = merged_indices(&[&oil], 200);
        assert!(oil_only.iter().all(|i| idx.contains(i)));
    }

    #[test]
    fn test_short_channels_keep_everything() {
        let a = [1.0, 2.0, 3.0];
        let b = [3.0, 2.0, 1.0];
        assert_eq!(merged_indices(&[&a, &b], 10), vec![0, 1, 2]);
    }
}
