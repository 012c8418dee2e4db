use slotmap::SecondaryMap;

use crate::math::interp;
use crate::variable::{VariableKey, Variables};

/// A fuzzy set sampled over a universe, such as the aggregated output of one call.
#[derive(Clone, Debug, PartialEq)]
pub struct FuzzySet<'u> {
    universe: &'u [f64],
    membership: Vec<f64>,
}

impl<'u> FuzzySet<'u> {
    pub(crate) fn new(universe: &'u [f64], membership: Vec<f64>) -> Self {
        debug_assert_eq!(universe.len(), membership.len());

        Self { universe, membership }
    }

    pub fn samples(&self) -> &'u [f64] {
        self.universe
    }

    pub fn membership(&self) -> &[f64] {
        &self.membership
    }

    /// Sample points paired with their degree, ready for plotting.
    pub fn points(&self) -> impl ExactSizeIterator<Item = (f64, f64)> + '_ {
        self.universe.iter().copied().zip(self.membership.iter().copied())
    }

    /// Degree at `y`, interpolated linearly between samples.
    pub fn degree(&self, y: f64) -> f64 {
        interp(y, self.universe, &self.membership)
    }

    /// Largest degree over all samples.
    pub fn height(&self) -> f64 {
        self.membership.iter().copied().fold(0., f64::max)
    }

    pub fn is_empty(&self) -> bool {
        self.membership.iter().all(|&m| m == 0.)
    }
}

/// Result of one inference call.
///
/// Besides the crisp value it carries what a visualizer needs to redraw the
/// call: input degrees, rule strengths and the aggregated output set.
#[derive(Debug)]
pub struct Outputs<'e> {
    value: Option<f64>,
    firing_strengths: Vec<f64>,
    fuzzified: SecondaryMap<VariableKey, Vec<f64>>,
    aggregated: FuzzySet<'e>,
    variables: &'e Variables,
}

impl<'e> Outputs<'e> {
    pub(crate) fn new(
        value: Option<f64>,
        firing_strengths: Vec<f64>,
        fuzzified: SecondaryMap<VariableKey, Vec<f64>>,
        aggregated: FuzzySet<'e>,
        variables: &'e Variables,
    ) -> Self {
        Self {
            value,
            firing_strengths,
            fuzzified,
            aggregated,
            variables,
        }
    }

    /// The crisp output, or `None` when no rule fired.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn fired(&self) -> bool {
        self.value.is_some()
    }

    /// Firing strength of every rule, in rule order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }

    pub fn aggregated(&self) -> &FuzzySet<'e> {
        &self.aggregated
    }

    /// Degree of the crisp input of `variable` in `label`.
    pub fn degree(&self, variable: &str, label: &str) -> Option<f64> {
        let key = *self.variables.by_name.get(variable)?;
        let term = self.variables.slots.get(key)?.term_index(label)?;

        self.fuzzified.get(key).map(|degrees| degrees[term])
    }

    /// Degrees of every label of an input variable, in label order.
    pub fn fuzzified(&self, variable: &str) -> Option<Vec<(&'e str, f64)>> {
        let variables: &'e Variables = self.variables;
        let key = *variables.by_name.get(variable)?;
        let var = variables.slots.get(key)?;
        let degrees = self.fuzzified.get(key)?;

        Some(var.labels().zip(degrees.iter().copied()).collect())
    }
}
