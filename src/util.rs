//! Shared numeric helpers.
//!
//! Every ratio in the crate goes through these. An empty denominator yields
//! 0.0, never NaN.

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / total * 100`, rounded to two decimals; 0.0 when `total` is zero.
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

/// `part / total`, rounded to two decimals; 0.0 when `total` is zero.
pub(crate) fn ratio(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    round2(part / total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(1, 2), 50.0);
        assert_eq!(percentage(0, 5), 0.0);
    }

    #[test]
    fn test_zero_denominator_yields_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(ratio(4.0, 0.0), 0.0);
    }

    #[test]
    fn test_ratio_rounding() {
        assert_eq!(ratio(1.0, 3.0), 0.33);
        assert_eq!(ratio(5.0, 2.0), 2.5);
    }
}
