//! Mamdani fuzzy inference for control loops.
//!
//! Crisp inputs are fuzzified against labeled membership functions, rule
//! premises are combined with min/max, each rule clips its consequent at its
//! firing strength, the clipped sets are unioned and the union is reduced to a
//! crisp value by its centroid.
//!
//! ```
//! use fuzzy_control::{
//!     InferenceSettings, Inputs, LinguisticVariable, MamdaniInference, MembershipFunction as Mf, Rules,
//!     Universe, Variables,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut vars = Variables::new();
//! let angle = vars.add(
//!     LinguisticVariable::new("angle", Universe::new(-30., 30., 0.5)?)
//!         .with_term("N", Mf::trapezoidal(-30., -30., -6., 0.)?)?
//!         .with_term("ZO", Mf::triangular(-3., 0., 3.)?)?
//!         .with_term("P", Mf::trapezoidal(0., 6., 30., 30.)?)?,
//! )?;
//! let force = vars.add(
//!     LinguisticVariable::new("appliedForce", Universe::new(-10., 10., 0.1)?)
//!         .with_term("N", Mf::triangular(-10., -5., 0.)?)?
//!         .with_term("Z", Mf::triangular(-5., 0., 5.)?)?
//!         .with_term("P", Mf::triangular(0., 5., 10.)?)?,
//! )?;
//!
//! let mut rules = Rules::new();
//! rules.add(angle.is("N"), force.proposition("N"));
//! rules.add(angle.is("ZO"), force.proposition("Z"));
//! rules.add(angle.is("P"), force.proposition("P"));
//!
//! let engine = MamdaniInference::new(vars, rules, force, InferenceSettings::default())?;
//! let outputs = engine.eval(&Inputs::from([("angle", 12.)]))?;
//!
//! assert!(outputs.value().unwrap() > 4.);
//! # Ok(())
//! # }
//! ```

pub mod config;
mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
mod membership;
mod ops;
mod outputs;
mod rules;
mod variable;

pub use dsl::{Expr, Proposition};
pub use error::{ConfigError, Error, InputError, Result, UnresolvedReference};
pub use inference::{InferenceSettings, MamdaniInference};
pub use inputs::Inputs;
pub use linspace::Linspace;
pub use membership::{MembershipFunction, Shape};
pub use ops::{AndOp, DefuzzificationOp, OrOp};
pub use outputs::{FuzzySet, Outputs};
pub use rules::{Rule, Rules};
pub use variable::{LinguisticVariable, Universe, Variable, VariableKey, Variables, MAX_SAMPLES};
