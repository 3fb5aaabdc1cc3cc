//! Rolling-window helpers over optional and plain series.

/// Simple rolling mean over the last `window` values.
///
/// A mean is only produced when every value in the window is present.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut result = vec![None; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        let sum: Option<f64> = slice.iter().copied().sum();
        result[i] = sum.map(|s| s / window as f64);
    }

    result
}

/// Highest value of the `window` values ending at index `end` (inclusive).
///
/// `None` when the window does not fit inside the series.
pub fn window_max(values: &[f64], end: usize, window: usize) -> Option<f64> {
    window_slice(values, end, window).map(|s| s.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// Lowest value of the `window` values ending at index `end` (inclusive).
pub fn window_min(values: &[f64], end: usize, window: usize) -> Option<f64> {
    window_slice(values, end, window).map(|s| s.iter().copied().fold(f64::INFINITY, f64::min))
}

fn window_slice(values: &[f64], end: usize, window: usize) -> Option<&[f64]> {
    if window == 0 || end >= values.len() || end + 1 < window {
        return None;
    }
    Some(&values[end + 1 - window..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_basic() {
        let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let result = rolling_mean(&values, 2);
        assert!(result[0].is_none());
        assert_approx(result[1], 1.5, DEFAULT_EPSILON);
        assert_approx(result[3], 3.5, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_skips_windows_with_gaps() {
        let values = vec![None, Some(2.0), Some(4.0), Some(6.0)];
        let result = rolling_mean(&values, 2);
        assert!(result[1].is_none());
        assert_approx(result[2], 3.0, DEFAULT_EPSILON);
        assert_approx(result[3], 5.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_window_longer_than_series() {
        let values = vec![Some(1.0); 3];
        assert!(rolling_mean(&values, 5).iter().all(Option::is_none));
        assert!(rolling_mean(&values, 0).iter().all(Option::is_none));
    }

    #[test]
    fn window_extremes() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0];
        assert_eq!(window_max(&values, 5, 3), Some(9.0));
        assert_eq!(window_min(&values, 4, 3), Some(1.0));
        assert_eq!(window_max(&values, 4, 5), Some(5.0));
        assert_eq!(window_max(&values, 1, 3), None);
        assert_eq!(window_min(&values, 6, 1), None);
    }
}
