/// Ratio of a landmark distance to a box dimension.
///
/// Returns `None` for a zero or negative scale, so a degenerate box never yields a flag.
pub fn normalized_ratio(delta: i32, scale: i32) -> Option<f64> {
    if scale <= 0 {
        return None;
    }
    Some(f64::from(delta) / f64::from(scale))
}

#[cfg(test)]
mod tests {
    use super::normalized_ratio;

    #[test]
    fn divides_by_scale() {
        assert_eq!(normalized_ratio(41, 100), Some(0.41));
        assert_eq!(normalized_ratio(-5, 10), Some(-0.5));
    }

    #[test]
    fn degenerate_scale_has_no_ratio() {
        assert_eq!(normalized_ratio(10, 0), None);
        assert_eq!(normalized_ratio(10, -4), None);
    }
}
