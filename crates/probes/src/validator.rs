/// Returns true when `observed` is within `tolerance` (a fraction, e.g. 0.05
/// for 5%) of `reference`. The boundary is inclusive. Non-positive inputs
/// are never considered accurate.
pub fn validate(observed: f64, reference: f64, tolerance: f64) -> bool {
    if observed <= 0.0 || reference <= 0.0 {
        return false;
    }
    // A hair of slack keeps an exactly-at-tolerance deviation inside the
    // boundary when the division picks up float rounding (1.05 vs 1.00 at
    // 5% computes to just over 0.05 in f64).
    (observed - reference).abs() / reference <= tolerance * (1.0 + 1e-9)
}

/// Signed percentage difference of `observed` from `reference`. Absent when
/// either input is non-positive, so a deviation is only ever reported
/// against a meaningful baseline.
pub fn deviation_pct(observed: f64, reference: f64) -> Option<f64> {
    if observed <= 0.0 || reference <= 0.0 {
        return None;
    }
    Some((observed - reference) / reference * 100.0)
}

/// Computes the accuracy verdict and deviation together, so an observation
/// either carries both or neither.
pub fn verdict(observed: f64, reference: f64, tolerance: f64) -> Option<(bool, f64)> {
    let deviation = deviation_pct(observed, reference)?;
    Some((validate(observed, reference, tolerance), deviation))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_boundary_is_inclusive() {
        // +5.0% at a 5% tolerance is accurate; +5.1% is not. The first pair
        // divides to just over 0.05 in f64 and must still pass.
        assert!(validate(1.05, 1.00, 0.05));
        assert!(!validate(1.051, 1.00, 0.05));
        // Lower boundary and an exactly-representable boundary.
        assert!(validate(0.95, 1.00, 0.05));
        assert!(validate(105.0, 100.0, 0.05));
    }

    #[test]
    fn boundary_verdict_survives_the_probe_path() {
        let (accurate, deviation) = verdict(1.05, 1.00, 0.05).unwrap();
        assert!(accurate);
        assert!((deviation - 5.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_inputs_are_invalid() {
        assert!(!validate(0.0, 1.0, 0.05));
        assert!(!validate(1.0, 0.0, 0.05));
        assert!(!validate(-1.0, 1.0, 0.05));
        assert_eq!(deviation_pct(0.0, 1.0), None);
        assert_eq!(deviation_pct(1.0, -2.0), None);
        assert_eq!(verdict(0.0, 1.0, 0.05), None);
    }

    #[test]
    fn deviation_is_signed() {
        assert_eq!(deviation_pct(1.05, 1.00), Some(5.000000000000004));
        let below = deviation_pct(0.98, 1.00).unwrap();
        assert!((below - -2.0).abs() < 1e-9);
    }

    #[test]
    fn validation_is_scale_invariant() {
        for scale in [0.001, 1.0, 250.0, 1e6] {
            assert_eq!(
                validate(1.04, 1.00, 0.05),
                validate(1.04 * scale, 1.00 * scale, 0.05)
            );
            assert_eq!(
                validate(1.07, 1.00, 0.05),
                validate(1.07 * scale, 1.00 * scale, 0.05)
            );
        }
    }

    #[test]
    fn deviation_round_trips_to_observed() {
        let observed = 1817.42;
        let reference = 1820.00;
        let deviation = deviation_pct(observed, reference).unwrap();
        let reconstructed = reference * (1.0 + deviation / 100.0);
        assert!((reconstructed - observed).abs() < 1e-9);
    }

    #[test]
    fn verdict_carries_both_or_neither() {
        let (accurate, deviation) = verdict(1.03, 1.00, 0.05).unwrap();
        assert!(accurate);
        assert!((deviation - 3.0).abs() < 1e-9);
    }
}
