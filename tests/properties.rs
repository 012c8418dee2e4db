//! Property-based tests for membership functions and the inference pipeline

use fuzzy_control::config::EngineConfig;
use fuzzy_control::{Inputs, MembershipFunction};
use proptest::prelude::*;

fn pendulum() -> EngineConfig {
    EngineConfig::from_path(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/pendulum.toml")).unwrap()
}

/// Strictly increasing `(a, b, c)`
fn triangle_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
    (-100.0..100.0f64, 0.01..50.0f64, 0.01..50.0f64).prop_map(|(a, w1, w2)| (a, a + w1, a + w1 + w2))
}

/// Strictly increasing `(a, b, c, d)`
fn trapezoid_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-100.0..100.0f64, 0.01..50.0f64, 0.01..50.0f64, 0.01..50.0f64)
        .prop_map(|(a, w1, w2, w3)| (a, a + w1, a + w1 + w2, a + w1 + w2 + w3))
}

/// A pendulum state anywhere in (and a little beyond) the configured universes
fn state_strategy() -> impl Strategy<Value = [f64; 4]> {
    (-35.0..35.0f64, -7.0..7.0f64, -0.5..0.5f64, -1.2..1.2f64).prop_map(|(a, b, c, d)| [a, b, c, d])
}

const NAMES: [&str; 4] = ["angle", "angularVelocity", "cartPosition", "cartVelocity"];

#[cfg(test)]
mod membership_properties {
    use super::*;

    proptest! {
        #[test]
        fn triangular_anchor_points((a, b, c) in triangle_strategy()) {
            let mf = MembershipFunction::triangular(a, b, c).unwrap();

            prop_assert_eq!(mf.degree(a), 0.);
            prop_assert_eq!(mf.degree(b), 1.);
            prop_assert_eq!(mf.degree(c), 0.);
        }

        #[test]
        fn triangular_is_monotonic_on_each_side(
            (a, b, c) in triangle_strategy(),
            t1 in 0.0..=1.0f64,
            t2 in 0.0..=1.0f64,
        ) {
            let mf = MembershipFunction::triangular(a, b, c).unwrap();
            let (lo, hi) = (t1.min(t2), t1.max(t2));

            let up = |t: f64| (a + t * (b - a)).clamp(a, b);
            prop_assert!(mf.degree(up(lo)) <= mf.degree(up(hi)));

            let down = |t: f64| (b + t * (c - b)).clamp(b, c);
            prop_assert!(mf.degree(down(lo)) >= mf.degree(down(hi)));
        }

        #[test]
        fn trapezoidal_plateau((a, b, c, d) in trapezoid_strategy(), t in 0.0..=1.0f64) {
            let mf = MembershipFunction::trapezoidal(a, b, c, d).unwrap();
            let x = (b + t * (c - b)).clamp(b, c);

            prop_assert_eq!(mf.degree(x), 1.);
            prop_assert_eq!(mf.degree(a), 0.);
            prop_assert_eq!(mf.degree(d), 0.);
        }

        #[test]
        fn degree_is_bounded((a, b, c, d) in trapezoid_strategy(), x in -300.0..300.0f64) {
            let trap = MembershipFunction::trapezoidal(a, b, c, d).unwrap();
            let tri = MembershipFunction::triangular(a, b, c).unwrap();

            prop_assert!((0.0..=1.0).contains(&trap.degree(x)));
            prop_assert!((0.0..=1.0).contains(&tri.degree(x)));
        }
    }
}

#[cfg(test)]
mod inference_properties {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn fuzzification_ignores_input_order(state in state_strategy()) {
            let engine = pendulum().build().unwrap();

            let forward: Inputs = NAMES.iter().copied().zip(state).collect();
            let backward: Inputs = NAMES.iter().copied().zip(state).rev().collect();

            let lhs = engine.eval(&forward).unwrap();
            let rhs = engine.eval(&backward).unwrap();

            for name in NAMES {
                prop_assert_eq!(lhs.fuzzified(name), rhs.fuzzified(name));
            }
            prop_assert_eq!(lhs.value(), rhs.value());
        }

        #[test]
        fn aggregation_ignores_rule_order_and_repeats(state in state_strategy()) {
            let config = pendulum();
            let inputs: Inputs = NAMES.iter().copied().zip(state).collect();

            let mut permuted = config.clone();
            permuted.rules.reverse();
            permuted.rules.extend(config.rules.iter().cloned());

            let engine = config.build().unwrap();
            let other = permuted.build().unwrap();
            let lhs = engine.eval(&inputs).unwrap();
            let rhs = other.eval(&inputs).unwrap();

            // min and max are exact, so the sets match bit for bit
            prop_assert_eq!(lhs.aggregated().membership(), rhs.aggregated().membership());
            prop_assert_eq!(lhs.value(), rhs.value());
        }

        #[test]
        fn centroid_scales_with_output_universe(state in state_strategy(), k in 0.1..10.0f64) {
            let config = pendulum();
            let inputs: Inputs = NAMES.iter().copied().zip(state).collect();

            let mut scaled = config.clone();
            let universe = &mut scaled.output.universe;
            universe.min *= k;
            universe.max *= k;
            universe.step *= k;
            for term in &mut scaled.output.terms {
                for p in &mut term.points {
                    *p *= k;
                }
            }

            let base = config.build().unwrap().compute(&inputs).unwrap();
            let value = scaled.build().unwrap().compute(&inputs).unwrap();

            prop_assert!((value - k * base).abs() < 1e-6 * k.max(1.) * base.abs().max(1.));
        }
    }
}
