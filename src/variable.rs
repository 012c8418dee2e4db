use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::error::ConfigError;
use crate::linspace::Linspace;
use crate::math::sample_count;
use crate::membership::MembershipFunction;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

/// Handle to a variable stored in [`Variables`]. Rules are written against it.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Variable(pub(crate) VariableKey);

/// Upper bound on the number of samples of one universe.
pub const MAX_SAMPLES: usize = 1 << 20;

/// Discretized domain of a variable.
///
/// The step only controls sampling granularity: centroid resolution for the
/// output variable and curve resolution for anyone plotting an input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    num: usize,
}

impl Universe {
    /// Fails unless `min < max`, `step > 0`, all three are finite and the
    /// universe has at most [`MAX_SAMPLES`] samples.
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, ConfigError> {
        let valid = min.is_finite() && max.is_finite() && step.is_finite() && min < max && step > 0.;
        let num = sample_count(min, max, step).filter(|&n| n <= MAX_SAMPLES);

        match num {
            Some(num) if valid => Ok(Self { min, max, step, num }),
            _ => Err(ConfigError::InvalidUniverse { min, max, step }),
        }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of samples, never zero.
    pub fn sample_count(&self) -> usize {
        self.num
    }

    /// Sample points, `min` first. `max` is included when the step divides the span.
    pub fn samples(&self) -> Linspace<f64> {
        let last = self.min + self.step * (self.num - 1) as f64;

        Linspace::new(self.min, last.min(self.max), self.num)
    }

    pub fn clamp(&self, x: f64) -> f64 {
        x.clamp(self.min, self.max)
    }

    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }
}

/// A named quantity partitioned into labeled, possibly overlapping fuzzy sets.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    universe: Universe,
    terms: Vec<(String, MembershipFunction)>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            universe,
            terms: Vec::new(),
        }
    }

    /// Adds a labeled term. Labels keep their insertion order.
    pub fn with_term(mut self, label: impl Into<String>, membership: MembershipFunction) -> Result<Self, ConfigError> {
        self.insert(label, membership)?;

        Ok(self)
    }

    pub fn insert(&mut self, label: impl Into<String>, membership: MembershipFunction) -> Result<(), ConfigError> {
        let label = label.into();

        if self.term_index(&label).is_some() {
            return Err(ConfigError::DuplicateLabel {
                variable: self.name.clone(),
                label,
            });
        }

        self.terms.push((label, membership));

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> impl ExactSizeIterator<Item = (&str, &MembershipFunction)> {
        self.terms.iter().map(|(label, mf)| (label.as_str(), mf))
    }

    pub fn labels(&self) -> impl ExactSizeIterator<Item = &str> {
        self.terms.iter().map(|(label, _)| label.as_str())
    }

    pub fn membership(&self, label: &str) -> Option<&MembershipFunction> {
        self.term_index(label).map(|i| &self.terms[i].1)
    }

    pub(crate) fn term_index(&self, label: &str) -> Option<usize> {
        self.terms.iter().position(|(l, _)| l == label)
    }

    /// Degree of `x` in every term, in label order. Not normalized.
    pub fn fuzzify(&self, x: f64) -> Vec<(&str, f64)> {
        self.terms
            .iter()
            .map(|(label, mf)| (label.as_str(), mf.degree(x)))
            .collect()
    }

    pub(crate) fn degrees(&self, x: f64) -> Vec<f64> {
        self.terms.iter().map(|(_, mf)| mf.degree(x)).collect()
    }

    /// Membership of `label` sampled over the universe.
    pub fn sampled(&self, label: &str) -> Option<Vec<f64>> {
        let mf = self.membership(label)?;

        Some(self.universe.samples().map(|u| mf.degree(u)).collect())
    }
}

/// Owns every linguistic variable of an engine, inputs and output alike.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    pub(crate) slots: SlotMap<VariableKey, LinguisticVariable>,
    pub(crate) by_name: HashMap<String, VariableKey>,
}

impl Variables {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            by_name: HashMap::new(),
        }
    }

    pub fn add(&mut self, variable: LinguisticVariable) -> Result<Variable, ConfigError> {
        if variable.terms.is_empty() {
            return Err(ConfigError::EmptyVariable(variable.name));
        }
        if self.by_name.contains_key(&variable.name) {
            return Err(ConfigError::DuplicateVariable(variable.name));
        }

        let name = variable.name.clone();
        let key = self.slots.insert(variable);

        self.by_name.insert(name, key);

        Ok(Variable(key))
    }

    pub fn get(&self, var: Variable) -> Option<&LinguisticVariable> {
        self.slots.get(var.0)
    }

    pub fn find(&self, name: &str) -> Option<Variable> {
        self.by_name.get(name).copied().map(Variable)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[test]
fn test_universe_samples() {
    let universe = Universe::new(-0.4, 0.4, 0.05).unwrap();
    let samples: Vec<_> = universe.samples().collect();

    assert_eq!(samples.len(), 17);
    assert_eq!(samples[0], -0.4);
    assert!((samples[16] - 0.4).abs() < 1e-12);

    // Step that does not divide the span stops short of max
    let universe = Universe::new(0., 1., 0.3).unwrap();
    let samples: Vec<_> = universe.samples().collect();

    assert_eq!(samples.len(), 4);
    assert!((samples[3] - 0.9).abs() < 1e-12);

    assert!(Universe::new(1., 1., 0.1).is_err());
    assert!(Universe::new(0., 1., 0.).is_err());
    assert!(Universe::new(0., f64::INFINITY, 0.1).is_err());
}

#[test]
fn test_universe_sample_cap() {
    assert_eq!(
        Universe::new(-100., 100., 1e-307).unwrap_err(),
        ConfigError::InvalidUniverse {
            min: -100.,
            max: 100.,
            step: 1e-307
        }
    );
    assert!(Universe::new(-100., 100., 1e-12).is_err());

    let span = (MAX_SAMPLES - 1) as f64;

    assert_eq!(Universe::new(0., span, 1.).map(|u| u.sample_count()), Ok(MAX_SAMPLES));
    assert!(Universe::new(0., span + 1., 1.).is_err());
}

#[test]
fn test_fuzzify() {
    let var = LinguisticVariable::new("cartVelocity", Universe::new(-1., 1., 0.1).unwrap())
        .with_term("NEG", MembershipFunction::trapezoidal(-1., -1., -0.1, 0.).unwrap())
        .and_then(|v| v.with_term("ZERO", MembershipFunction::triangular(-0.1, 0., 0.1).unwrap()))
        .and_then(|v| v.with_term("POS", MembershipFunction::trapezoidal(0., 0.1, 1., 1.).unwrap()))
        .unwrap();

    assert_eq!(var.labels().collect::<Vec<_>>(), ["NEG", "ZERO", "POS"]);
    assert_eq!(var.fuzzify(0.), vec![("NEG", 0.), ("ZERO", 1.), ("POS", 0.)]);

    let degrees = var.fuzzify(-0.05);

    assert_eq!(degrees[0], ("NEG", 0.5));
    assert_eq!(degrees[2], ("POS", 0.));
    assert!((degrees[1].1 - 0.5).abs() < 1e-12);
    assert_eq!(var.sampled("ZERO").map(|s| s.len()), Some(21));
    assert!(var.membership("HUGE").is_none());
}

#[test]
fn test_duplicates() {
    let universe = Universe::new(0., 1., 0.1).unwrap();
    let mf = MembershipFunction::triangular(0., 0.5, 1.).unwrap();
    let var = LinguisticVariable::new("x", universe).with_term("A", mf).unwrap();

    assert_eq!(
        var.clone().with_term("A", mf).unwrap_err(),
        ConfigError::DuplicateLabel {
            variable: "x".into(),
            label: "A".into()
        }
    );

    let mut vars = Variables::new();

    assert!(vars.add(var.clone()).is_ok());
    assert_eq!(vars.add(var).unwrap_err(), ConfigError::DuplicateVariable("x".into()));
    assert_eq!(
        vars.add(LinguisticVariable::new("y", universe)).unwrap_err(),
        ConfigError::EmptyVariable("y".into())
    );
    assert_eq!(vars.len(), 1);
    assert!(vars.find("x").is_some());
}
