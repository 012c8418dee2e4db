use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Shape tag used when membership functions are described by a point list.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangular,
    Trapezoidal,
}

impl Shape {
    pub fn point_count(self) -> usize {
        match self {
            Self::Triangular => 3,
            Self::Trapezoidal => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Triangular => "triangular",
            Self::Trapezoidal => "trapezoidal",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A piecewise-linear fuzzy set over a scalar domain.
///
/// Breakpoints are validated on construction, so `degree` cannot fail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MembershipFunction {
    Triangular([f64; 3]),
    Trapezoidal([f64; 4]),
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self, ConfigError> {
        check_breakpoints(&[a, b, c])?;

        Ok(Self::Triangular([a, b, c]))
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self, ConfigError> {
        check_breakpoints(&[a, b, c, d])?;

        Ok(Self::Trapezoidal([a, b, c, d]))
    }

    pub fn from_points(shape: Shape, points: &[f64]) -> Result<Self, ConfigError> {
        match (shape, points) {
            (Shape::Triangular, &[a, b, c]) => Self::triangular(a, b, c),
            (Shape::Trapezoidal, &[a, b, c, d]) => Self::trapezoidal(a, b, c, d),
            _ => Err(ConfigError::WrongPointCount {
                shape: shape.name(),
                expected: shape.point_count(),
                found: points.len(),
            }),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Self::Triangular(_) => Shape::Triangular,
            Self::Trapezoidal(_) => Shape::Trapezoidal,
        }
    }

    pub fn points(&self) -> &[f64] {
        match self {
            Self::Triangular(p) => p,
            Self::Trapezoidal(p) => p,
        }
    }

    /// Outermost breakpoints. The degree is zero outside this interval.
    pub fn support(&self) -> (f64, f64) {
        let points = self.points();

        (points[0], points[points.len() - 1])
    }

    /// Degree of membership of `x`, always in `[0, 1]`. NaN maps to 0.
    pub fn degree(&self, x: f64) -> f64 {
        match *self {
            // Peak is tested first so a degenerate edge (a == b or b == c) still reaches 1
            Self::Triangular([a, b, c]) => {
                if x == b {
                    1.
                } else if !(a < x && x < c) {
                    0.
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (c - x) / (c - b)
                }
            },
            Self::Trapezoidal([a, b, c, d]) => {
                if b <= x && x <= c {
                    1.
                } else if !(a < x && x < d) {
                    0.
                } else if x < b {
                    (x - a) / (b - a)
                } else {
                    (d - x) / (d - c)
                }
            },
        }
    }
}

fn check_breakpoints(points: &[f64]) -> Result<(), ConfigError> {
    let finite = points.iter().all(|p| p.is_finite());
    let sorted = points.windows(2).all(|w| w[0] <= w[1]);

    if finite && sorted {
        Ok(())
    } else {
        Err(ConfigError::InvalidBreakpoints {
            points: points.to_vec(),
        })
    }
}

#[test]
fn test_triangular() {
    let mf = MembershipFunction::triangular(-3., 0., 3.).unwrap();

    assert_eq!(mf.degree(-3.), 0.);
    assert_eq!(mf.degree(-1.5), 0.5);
    assert_eq!(mf.degree(0.), 1.);
    assert_eq!(mf.degree(1.5), 0.5);
    assert_eq!(mf.degree(3.), 0.);
    assert_eq!(mf.degree(-10.), 0.);
    assert_eq!(mf.degree(10.), 0.);
    assert_eq!(mf.degree(f64::NAN), 0.);
}

#[test]
fn test_trapezoidal_shoulders() {
    // Left shoulder, as used for the outermost labels of a variable
    let mf = MembershipFunction::trapezoidal(-30., -30., -18., -12.).unwrap();

    assert_eq!(mf.degree(-30.), 1.);
    assert_eq!(mf.degree(-24.), 1.);
    assert_eq!(mf.degree(-18.), 1.);
    assert_eq!(mf.degree(-15.), 0.5);
    assert_eq!(mf.degree(-12.), 0.);
    assert_eq!(mf.degree(-31.), 0.);

    let mf = MembershipFunction::trapezoidal(12., 18., 30., 30.).unwrap();

    assert_eq!(mf.degree(12.), 0.);
    assert_eq!(mf.degree(15.), 0.5);
    assert_eq!(mf.degree(30.), 1.);
    assert_eq!(mf.degree(30.5), 0.);
}

#[test]
fn test_degenerate_triangles() {
    let left = MembershipFunction::triangular(0., 0., 2.).unwrap();

    assert_eq!(left.degree(-0.1), 0.);
    assert_eq!(left.degree(0.), 1.);
    assert_eq!(left.degree(1.), 0.5);

    let right = MembershipFunction::triangular(-2., 0., 0.).unwrap();

    assert_eq!(right.degree(-1.), 0.5);
    assert_eq!(right.degree(0.), 1.);
    assert_eq!(right.degree(0.1), 0.);

    let spike = MembershipFunction::triangular(1., 1., 1.).unwrap();

    assert_eq!(spike.degree(1.), 1.);
    assert_eq!(spike.degree(1.0001), 0.);
}

#[test]
fn test_invalid_breakpoints() {
    assert_eq!(
        MembershipFunction::triangular(0., 2., 1.),
        Err(ConfigError::InvalidBreakpoints {
            points: vec![0., 2., 1.]
        })
    );
    assert!(MembershipFunction::trapezoidal(0., f64::NAN, 1., 2.).is_err());
    assert_eq!(
        MembershipFunction::from_points(Shape::Trapezoidal, &[0., 1., 2.]),
        Err(ConfigError::WrongPointCount {
            shape: "trapezoidal",
            expected: 4,
            found: 3
        })
    );
    assert_eq!(
        MembershipFunction::from_points(Shape::Triangular, &[0., 1., 2.]).map(|mf| mf.support()),
        Ok((0., 2.))
    );
}
