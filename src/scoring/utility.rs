/// Computes the median of a slice of values. Returns 0.0 for empty input.
///
/// Even-length input yields the mean of the two central elements.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds and clamps a value onto the 0-100 score scale.
pub(crate) fn to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_known_values() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[1.0, 3.0]), 2.0);
        assert_eq!(median(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_median_sorts_input() {
        assert_eq!(median(&[3000.0, 2000.0, 2500.0]), 2500.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[80.0, 80.0, 80.0]), 80.0);
        assert_eq!(average(&[1.0, 2.0]), 1.5);
    }

    #[test]
    fn test_to_score_clamps() {
        assert_eq!(to_score(-4.0), 0);
        assert_eq!(to_score(49.5), 50);
        assert_eq!(to_score(140.0), 100);
        assert_eq!(to_score(f64::NAN), 0);
    }
}
