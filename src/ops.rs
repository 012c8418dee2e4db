use num::Float;
use serde::{Deserialize, Serialize};

use crate::math::weighted_mean;

/// And operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AndOp {
    #[default]
    Min,
    Prod,
    BoundedProd,
}

impl AndOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Min => F::min(u, v),
            Self::Prod => u * v,
            Self::BoundedProd => F::max(F::zero(), u + v - F::one()),
        }
    }
}

/// Or operator method for combining the compositions of propositions
/// in a fuzzy rule premise.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrOp {
    #[default]
    Max,
    ProbOr,
    BoundedSum,
}

impl OrOp {
    pub fn call<F: Float>(self, u: F, v: F) -> F {
        match self {
            Self::Max => F::max(u, v),
            Self::ProbOr => u + v - u * v,
            Self::BoundedSum => F::min(F::one(), u + v),
        }
    }
}

/// Method for defuzzifcating the aggregated membership function.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefuzzificationOp {
    /// Discrete centroid over the universe samples, `Σ y·μ(y) / Σ μ(y)`
    #[default]
    Centroid,
    /// Center of gravity of the area under the piecewise-linear set, split
    /// into a rectangle and a triangle per sample interval
    AreaCentroid,
}

impl DefuzzificationOp {
    /// Returns `None` when the set is empty and there is nothing to defuzzify.
    pub fn call<F: Float>(self, universe: &[F], membership: &[F]) -> Option<F> {
        debug_assert_eq!(universe.len(), membership.len());

        match self {
            Self::Centroid => weighted_mean(universe, membership),
            Self::AreaCentroid => {
                if universe.len() < 2 {
                    return weighted_mean(universe, membership);
                }

                let two = F::one() + F::one();
                let three = two + F::one();
                let mut areas = Vec::with_capacity(universe.len() - 1);
                let mut centroids = Vec::with_capacity(universe.len() - 1);

                for (u, m) in universe.windows(2).zip(membership.windows(2)) {
                    let base = u[1] - u[0];
                    let area_rect = F::min(m[0], m[1]) * base;
                    let center_rect = u[0] + base / two;
                    let area_tria = base * F::abs(m[1] - m[0]) / two;
                    // The triangle's centroid sits a third of the base from its tall side
                    let center_tria = if m[1] > m[0] {
                        u[0] + two / three * base
                    } else {
                        u[0] + base / three
                    };
                    let area = area_rect + area_tria;
                    let center = if area == F::zero() {
                        F::zero()
                    } else {
                        (area_rect * center_rect + area_tria * center_tria) / area
                    };

                    areas.push(area);
                    centroids.push(center);
                }

                weighted_mean(&centroids, &areas)
            },
        }
    }
}

#[test]
fn test_connectives() {
    assert_eq!(AndOp::Min.call(0.3, 0.8), 0.3);
    assert_eq!(AndOp::Prod.call(0.5, 0.5), 0.25);
    assert_eq!(AndOp::BoundedProd.call(0.25, 0.5), 0.);
    assert_eq!(OrOp::Max.call(0.3, 0.8), 0.8);
    assert_eq!(OrOp::ProbOr.call(0.5, 0.5), 0.75);
    assert_eq!(OrOp::BoundedSum.call(0.75, 0.5), 1.);
}

#[test]
fn test_centroid() {
    let universe = [0., 1., 2., 3., 4.];
    let triangle = [0., 0.5, 1., 0.5, 0.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &triangle), Some(2.));

    let cog = DefuzzificationOp::AreaCentroid.call(&universe, &triangle).unwrap();

    assert!((cog - 2.).abs() < 1e-12);

    // Right-angled triangle: area centroid at two thirds of the base
    let universe = [0., 3.];
    let ramp = [0., 1.];
    let cog = DefuzzificationOp::AreaCentroid.call(&universe, &ramp).unwrap();

    assert!((cog - 2.).abs() < 1e-12);
    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &ramp), Some(3.));
}

#[test]
fn test_empty_set() {
    let universe = [0., 1., 2.];
    let empty = [0., 0., 0.];

    assert_eq!(DefuzzificationOp::Centroid.call(&universe, &empty), None);
    assert_eq!(DefuzzificationOp::AreaCentroid.call(&universe, &empty), None);
}
