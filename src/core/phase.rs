use std::f64::consts::{PI, TAU};

/// Reduce a phase value into [0, 2π) with a positive representative.
#[inline]
pub fn phase_mod(phase: f64) -> f64 {
    let reduced = phase.rem_euclid(TAU);
    // rem_euclid can land exactly on 2π when the input is a tiny negative.
    if reduced >= TAU { 0.0 } else { reduced }
}

/// The smallest value in [-π, π] to add to `source` so that it becomes
/// phase-coherent with `target`. Returns exactly 0.0 when the operands are
/// bitwise equal, so an already-aligned signal is never perturbed.
#[inline]
pub fn coherence_compensation(source: f64, target: f64) -> f64 {
    if source == target {
        return 0.0;
    }

    let source = phase_mod(source);
    let target = phase_mod(target);

    let mut difference = target - source;
    if difference > PI {
        difference -= TAU;
    } else if difference < -PI {
        difference += TAU;
    }

    debug_assert!((-PI..=PI).contains(&difference));
    difference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_mod_in_range() {
        let values = [
            -10.0 * TAU,
            -TAU,
            -PI,
            -0.1,
            -1e-300,
            0.0,
            PI,
            TAU,
            3.5 * TAU,
            1e9,
        ];
        for v in values {
            let w = phase_mod(v);
            assert!((0.0..TAU).contains(&w), "phase_mod out of range: {w}");
        }
    }

    #[test]
    fn phase_mod_identity_on_reduced_values() {
        for v in [0.0, 0.25 * PI, PI, 1.75 * PI] {
            assert_eq!(phase_mod(v), v);
        }
    }

    #[test]
    fn compensation_of_equal_operands_is_exactly_zero() {
        for v in [0.0, 1.0, 123.456, 9500.0 * PI] {
            assert_eq!(coherence_compensation(v, v), 0.0);
        }
    }

    #[test]
    fn compensation_lands_on_target() {
        let pairs = [
            (0.0, 0.0),
            (0.1, TAU - 0.1),
            (3.0 * PI, 0.5),
            (9500.0 * PI + 1e-3, 0.0),
            (1.5 * PI, 0.5 * PI),
        ];
        for (source, target) in pairs {
            let delta = coherence_compensation(source, target);
            assert!((-PI..=PI).contains(&delta), "delta out of range: {delta}");
            let aligned = phase_mod(source + delta);
            let err = coherence_compensation(aligned, target).abs();
            assert!(err < 1e-9, "source={source} target={target} err={err}");
        }
    }

    #[test]
    fn compensation_prefers_the_short_way_round() {
        // 0.1 rad below the target: compensation is +0.1, not -2π+0.1.
        let delta = coherence_compensation(1.0, 1.1);
        assert!((delta - 0.1).abs() < 1e-12);
        let delta = coherence_compensation(1.1, 1.0);
        assert!((delta + 0.1).abs() < 1e-12);
    }
}
