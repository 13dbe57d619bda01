//! Order statistics for pixel normalization

/// Sort finite values ascending, dropping NaN and infinities
pub fn sorted_finite(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Value at fraction `q` (0..=1) of an ascending slice, nearest-rank
///
/// Returns `None` for an empty slice. `q` is clamped into [0, 1].
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let index = ((sorted.len() - 1) as f64 * q).round() as usize;
    sorted.get(index).copied()
}

/// `num` points evenly spaced on a log10 scale between `start` and `stop`
///
/// Both bounds must be positive; the end points are exact.
pub fn logspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let (a, b) = (start.log10(), stop.log10());
            let step = (b - a) / (num - 1) as f64;
            (0..num)
                .map(|i| {
                    if i == num - 1 {
                        stop
                    } else {
                        10f64.powf(a + step * i as f64)
                    }
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sorted_finite_drops_nan() {
        let sorted = sorted_finite([3.0, f64::NAN, 1.0, f64::INFINITY, 2.0]);
        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_quantile_bounds() {
        let sorted: Vec<f64> = (0..=100).map(|v| v as f64).collect();
        assert_eq!(quantile_sorted(&sorted, 0.0), Some(0.0));
        assert_eq!(quantile_sorted(&sorted, 1.0), Some(100.0));
        assert_eq!(quantile_sorted(&sorted, 0.5), Some(50.0));
        assert_eq!(quantile_sorted(&sorted, 2.0), Some(100.0));
        assert_eq!(quantile_sorted(&[], 0.5), None);
    }

    #[test]
    fn test_logspace_decade() {
        let points = logspace(1.0, 1000.0, 4);
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(points[1], 10.0, epsilon = 1e-9);
        assert_relative_eq!(points[2], 100.0, epsilon = 1e-9);
        assert_eq!(points[3], 1000.0);
    }
}
