use num::Float;

/// Number of samples of a universe, `floor((max - min) / step) + 1`, or `None`
/// when the quotient is not finite or the count does not fit in a `usize`.
///
/// A span that is a whole number of steps can come out a hair short after
/// division (`0.8 / 0.05 = 15.999...`), so the quotient is nudged before flooring.
pub(crate) fn sample_count<F: Float>(min: F, max: F, step: F) -> Option<usize> {
    let quotient = (max - min) / step;

    if !quotient.is_finite() {
        return None;
    }

    let nudge = F::from(1e-9).unwrap_or_else(F::epsilon);
    let steps = (quotient + nudge).floor();

    steps.to_usize()?.checked_add(1)
}

/// Similar to `numpy.interp`: linear interpolation of `x` over the sorted
/// sample points `xp`, clamped to the end values.
pub(crate) fn interp<F: Float>(x: F, xp: &[F], fp: &[F]) -> F {
    debug_assert_eq!(xp.len(), fp.len());

    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return F::zero();
    };

    if x.is_nan() {
        return F::zero();
    }
    if x <= first {
        return fp[0];
    }
    if x >= last {
        return fp[fp.len() - 1];
    }

    // First sample strictly above x; x is inside (first, last) so 1 <= i < len
    let i = xp.partition_point(|&p| p <= x);
    let (x1, x2) = (xp[i - 1], xp[i]);
    let (y1, y2) = (fp[i - 1], fp[i]);

    if x2 == x1 {
        return y2;
    }

    y1 + (x - x1) * (y2 - y1) / (x2 - x1)
}

/// Discrete centroid `Σ x·μ / Σ μ`, or `None` when the set is empty.
pub(crate) fn weighted_mean<F: Float>(xs: &[F], weights: &[F]) -> Option<F> {
    let mut num = F::zero();
    let mut den = F::zero();

    for (&x, &w) in xs.iter().zip(weights) {
        num = num + x * w;
        den = den + w;
    }

    if den > F::zero() {
        Some(num / den)
    } else {
        None
    }
}

#[test]
fn test_sample_count() {
    assert_eq!(sample_count(-30., 30., 0.5), Some(121));
    assert_eq!(sample_count(-0.4, 0.4, 0.05), Some(17));
    assert_eq!(sample_count(-1., 1., 0.1), Some(21));
    assert_eq!(sample_count(0., 1., 0.3), Some(4));
    assert_eq!(sample_count(0f32, 10., 1.), Some(11));
    assert_eq!(sample_count(-100., 100., 1e-307), None);
    assert_eq!(sample_count(0., f64::MAX, f64::MIN_POSITIVE), None);
}

#[test]
fn test_interp() {
    let xp = [1., 2., 3.];
    let fp = [3., 2., 0.];

    let ys: Vec<f64> = [0., 1., 1.5, 2.72, 3.24].iter().map(|&x| interp(x, &xp, &fp)).collect();

    assert_eq!(ys[..3], [3., 3., 2.5]);
    assert!((ys[3] - 0.56).abs() < 1e-12);
    assert_eq!(ys[4], 0.);

    let xp = [0., 1., 2., 3., 4.5];
    let fp = [0., 2., 5., 3., 2.];

    assert_eq!(interp(2.5, &xp, &fp), 4.);
    assert_eq!(interp(-1., &xp, &fp), 0.);
    assert_eq!(interp(7.5, &xp, &fp), 2.);
}

#[test]
fn test_weighted_mean() {
    assert_eq!(weighted_mean(&[1., 2., 3.], &[0., 1., 1.]), Some(2.5));
    assert_eq!(weighted_mean(&[1., 2., 3.], &[0., 0., 0.]), None);
    assert_eq!(weighted_mean::<f64>(&[], &[]), None);
}
