use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use tracing::{debug, trace, warn};

use crate::dsl::{Expr, Proposition};
use crate::error::{ConfigError, Error, InputError, UnresolvedReference};
use crate::inputs::Inputs;
use crate::ops::{AndOp, DefuzzificationOp, OrOp};
use crate::outputs::{FuzzySet, Outputs};
use crate::rules::Rules;
use crate::variable::{LinguisticVariable, Variable, VariableKey, Variables};

/// Tunables of the Mamdani pipeline. Implication is always min and
/// aggregation always max.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InferenceSettings {
    pub and_op: AndOp,
    pub or_op: OrOp,
    pub defuzzification: DefuzzificationOp,
    /// Clamp crisp inputs into their variable's universe before fuzzification
    pub clip_to_bounds: bool,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            and_op: AndOp::Min,
            or_op: OrOp::Max,
            defuzzification: DefuzzificationOp::Centroid,
            clip_to_bounds: true,
        }
    }
}

/// Rule premise with every proposition resolved to a term index.
#[derive(Clone, Debug)]
enum Antecedent {
    Term { var: VariableKey, term: usize },
    And(Box<Antecedent>, Box<Antecedent>),
    Or(Box<Antecedent>, Box<Antecedent>),
}

#[derive(Clone, Debug)]
struct CompiledRule {
    premise: Antecedent,
    /// Term index into the output variable
    consequence: usize,
}

/// A validated, immutable Mamdani inference system.
///
/// `eval` takes `&self` and keeps all scratch state on the call, so one
/// engine can serve any number of threads.
#[derive(Clone, Debug)]
pub struct MamdaniInference {
    variables: Variables,
    rules: Rules,
    compiled: Vec<CompiledRule>,
    /// Input keys sorted by variable name
    inputs: Vec<VariableKey>,
    output: VariableKey,
    universe: Vec<f64>,
    /// Output terms sampled over `universe`, indexed like the output's terms
    consequents: Vec<Vec<f64>>,
    settings: InferenceSettings,
}

impl MamdaniInference {
    /// Validates the configuration and precomputes the sampled consequent sets.
    ///
    /// Every variable other than `output` is an input.
    pub fn new(
        variables: Variables,
        rules: Rules,
        output: Variable,
        settings: InferenceSettings,
    ) -> Result<Self, ConfigError> {
        let output = output.0;
        let output_var = variables.slots.get(output).ok_or(ConfigError::UnknownOutput(None))?;

        let mut inputs: Vec<_> = variables.slots.keys().filter(|&key| key != output).collect();

        if inputs.is_empty() {
            return Err(ConfigError::NoInputs);
        }
        if rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        inputs.sort_by(|&a, &b| variables.slots[a].name().cmp(variables.slots[b].name()));

        let mut unresolved = Vec::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for (i, rule) in rules.iter().enumerate() {
            let premise = resolve(&rule.premise, i, &variables, output, &mut unresolved)?;
            let consequence = resolve_consequence(&rule.consequence, i, &variables, output, &mut unresolved)?;

            if let (Some(premise), Some(consequence)) = (premise, consequence) {
                compiled.push(CompiledRule { premise, consequence });
            }
        }

        if !unresolved.is_empty() {
            return Err(ConfigError::Unresolved(unresolved));
        }

        let universe: Vec<f64> = output_var.universe().samples().collect();
        let consequents = output_var
            .terms()
            .map(|(_, mf)| universe.iter().map(|&y| mf.degree(y)).collect())
            .collect();

        debug!(
            inputs = inputs.len(),
            rules = compiled.len(),
            output = output_var.name(),
            output_samples = universe.len(),
            "built mamdani inference"
        );

        Ok(Self {
            variables,
            rules,
            compiled,
            inputs,
            output,
            universe,
            consequents,
            settings,
        })
    }

    /// Runs fuzzify, evaluate, aggregate and defuzzify for one set of crisp inputs.
    ///
    /// Inputs must name exactly the declared input variables. A call in which no
    /// rule fires is not an error: `Outputs::value` is `None`.
    pub fn eval(&self, inputs: &Inputs) -> Result<Outputs<'_>, InputError> {
        let values = self.validate(inputs)?;

        // Fuzzify
        let mut fuzzified = SecondaryMap::with_capacity(self.inputs.len());

        for (&key, &raw) in self.inputs.iter().zip(&values) {
            let var = &self.variables.slots[key];
            let universe = var.universe();
            let x = if self.settings.clip_to_bounds && !universe.contains(raw) {
                let clamped = universe.clamp(raw);
                warn!(variable = var.name(), value = raw, clamped, "input outside universe");
                clamped
            } else {
                raw
            };

            fuzzified.insert(key, var.degrees(x));
        }

        // Evaluate premises, in rule order
        let firing_strengths: Vec<f64> = self
            .compiled
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let strength = self.strength(&rule.premise, &fuzzified);
                trace!(rule = i, strength, "rule evaluated");
                strength
            })
            .collect();

        // Implicate (min) and aggregate (max)
        let mut aggregated = vec![0.; self.universe.len()];

        for (rule, &strength) in self.compiled.iter().zip(&firing_strengths) {
            if strength <= 0. {
                continue;
            }

            let consequent = &self.consequents[rule.consequence];

            for (agg, &mu) in aggregated.iter_mut().zip(consequent) {
                *agg = f64::max(*agg, f64::min(mu, strength));
            }
        }

        // Defuzzificate
        let value = self.settings.defuzzification.call(&self.universe, &aggregated);

        if value.is_none() {
            debug!(output = self.output().name(), "no rule fired");
        }

        Ok(Outputs::new(
            value,
            firing_strengths,
            fuzzified,
            FuzzySet::new(&self.universe, aggregated),
            &self.variables,
        ))
    }

    /// Like [`eval`](Self::eval) but only returns the crisp value, with
    /// [`Error::NoRuleFired`] when nothing fired.
    pub fn compute(&self, inputs: &Inputs) -> Result<f64, Error> {
        self.eval(inputs)?.value().ok_or(Error::NoRuleFired)
    }

    /// Returns the input values in `self.inputs` order.
    fn validate(&self, inputs: &Inputs) -> Result<Vec<f64>, InputError> {
        let mut unexpected: Vec<_> = inputs
            .0
            .keys()
            .filter(|name| {
                self.variables
                    .by_name
                    .get(name.as_str())
                    .map_or(true, |&key| key == self.output)
            })
            .collect();

        unexpected.sort();

        if let Some(name) = unexpected.first() {
            return Err(InputError::UnexpectedInput((*name).clone()));
        }

        self.inputs
            .iter()
            .map(|&key| {
                let name = self.variables.slots[key].name();

                match inputs.get(name) {
                    None => Err(InputError::MissingInput(name.to_owned())),
                    Some(x) if !x.is_finite() => Err(InputError::NotFinite(name.to_owned())),
                    Some(x) => Ok(x),
                }
            })
            .collect()
    }

    fn strength(&self, premise: &Antecedent, fuzzified: &SecondaryMap<VariableKey, Vec<f64>>) -> f64 {
        match premise {
            Antecedent::Term { var, term } => fuzzified[*var][*term],
            Antecedent::And(lhs, rhs) => {
                let left = self.strength(lhs, fuzzified);
                let right = self.strength(rhs, fuzzified);

                self.settings.and_op.call(left, right)
            },
            Antecedent::Or(lhs, rhs) => {
                let left = self.strength(lhs, fuzzified);
                let right = self.strength(rhs, fuzzified);

                self.settings.or_op.call(left, right)
            },
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&LinguisticVariable> {
        self.variables.find(name).and_then(|var| self.variables.get(var))
    }

    /// Input variables, sorted by name.
    pub fn inputs(&self) -> impl ExactSizeIterator<Item = &LinguisticVariable> {
        self.inputs.iter().map(|&key| &self.variables.slots[key])
    }

    pub fn output(&self) -> &LinguisticVariable {
        &self.variables.slots[self.output]
    }

    /// Sample points of the output universe, the centroid grid.
    pub fn output_samples(&self) -> &[f64] {
        &self.universe
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn settings(&self) -> &InferenceSettings {
        &self.settings
    }

    /// Upper bound on implication work per call, `rules * output samples`.
    pub fn max_cost(&self) -> usize {
        self.compiled.len() * self.universe.len()
    }
}

fn resolve(
    expr: &Expr,
    rule: usize,
    variables: &Variables,
    output: VariableKey,
    unresolved: &mut Vec<UnresolvedReference>,
) -> Result<Option<Antecedent>, ConfigError> {
    let (lhs, rhs) = match expr {
        Expr::Is(prop) => {
            let Some(var) = variables.slots.get(prop.var) else {
                unresolved.push(UnresolvedReference::Variable { rule, name: None });
                return Ok(None);
            };

            if prop.var == output {
                return Err(ConfigError::OutputInAntecedent {
                    rule,
                    variable: var.name().to_owned(),
                });
            }

            let Some(term) = var.term_index(&prop.label) else {
                unresolved.push(UnresolvedReference::Label {
                    rule,
                    variable: var.name().to_owned(),
                    label: prop.label.clone(),
                });
                return Ok(None);
            };

            return Ok(Some(Antecedent::Term { var: prop.var, term }));
        },
        Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => (lhs, rhs),
    };

    // Resolve both sides so every dangling reference is reported at once
    let left = resolve(lhs, rule, variables, output, unresolved)?;
    let right = resolve(rhs, rule, variables, output, unresolved)?;
    let (Some(left), Some(right)) = (left, right) else {
        return Ok(None);
    };
    let (left, right) = (Box::new(left), Box::new(right));

    Ok(Some(match expr {
        Expr::And(..) => Antecedent::And(left, right),
        _ => Antecedent::Or(left, right),
    }))
}

fn resolve_consequence(
    prop: &Proposition,
    rule: usize,
    variables: &Variables,
    output: VariableKey,
    unresolved: &mut Vec<UnresolvedReference>,
) -> Result<Option<usize>, ConfigError> {
    let Some(var) = variables.slots.get(prop.var) else {
        unresolved.push(UnresolvedReference::Variable { rule, name: None });
        return Ok(None);
    };

    if prop.var != output {
        return Err(ConfigError::ConsequentNotOutput {
            rule,
            variable: var.name().to_owned(),
        });
    }

    match var.term_index(&prop.label) {
        Some(term) => Ok(Some(term)),
        None => {
            unresolved.push(UnresolvedReference::Label {
                rule,
                variable: var.name().to_owned(),
                label: prop.label.clone(),
            });
            Ok(None)
        },
    }
}

#[cfg(test)]
fn tipping() -> (Variables, Variable, Variable, Variable) {
    use crate::membership::MembershipFunction as Mf;
    use crate::variable::Universe;

    let mut vars = Variables::new();
    let service = vars
        .add(
            LinguisticVariable::new("service", Universe::new(0., 10., 0.5).unwrap())
                .with_term("poor", Mf::trapezoidal(0., 0., 2., 5.).unwrap())
                .and_then(|v| v.with_term("good", Mf::triangular(2., 5., 8.).unwrap()))
                .and_then(|v| v.with_term("excellent", Mf::trapezoidal(5., 8., 10., 10.).unwrap()))
                .unwrap(),
        )
        .unwrap();
    let food = vars
        .add(
            LinguisticVariable::new("food", Universe::new(0., 10., 0.5).unwrap())
                .with_term("rancid", Mf::trapezoidal(0., 0., 1., 4.).unwrap())
                .and_then(|v| v.with_term("delicious", Mf::trapezoidal(6., 9., 10., 10.).unwrap()))
                .unwrap(),
        )
        .unwrap();
    let tip = vars
        .add(
            LinguisticVariable::new("tip", Universe::new(0., 30., 0.5).unwrap())
                .with_term("low", Mf::triangular(0., 5., 10.).unwrap())
                .and_then(|v| v.with_term("medium", Mf::triangular(10., 15., 20.).unwrap()))
                .and_then(|v| v.with_term("high", Mf::triangular(20., 25., 30.).unwrap()))
                .unwrap(),
        )
        .unwrap();

    (vars, service, food, tip)
}

#[test]
fn test_tipping() {
    let (vars, service, food, tip) = tipping();
    let mut rules = Rules::new();

    rules.add(service.is("poor").or(food.is("rancid")), tip.proposition("low"));
    rules.add(service.is("good"), tip.proposition("medium"));
    rules.add(service.is("excellent").or(food.is("delicious")), tip.proposition("high"));

    let engine = MamdaniInference::new(vars, rules, tip, InferenceSettings::default()).unwrap();

    assert_eq!(engine.max_cost(), 3 * 61);
    assert_eq!(engine.inputs().map(|v| v.name()).collect::<Vec<_>>(), ["food", "service"]);

    let outputs = engine.eval(&Inputs::from([("service", 5.), ("food", 5.)])).unwrap();

    // Only "good" service fires, so the centroid sits on the medium peak
    assert_eq!(outputs.firing_strengths(), [0., 1., 0.]);
    assert!((outputs.value().unwrap() - 15.).abs() < 1e-9);
    assert_eq!(outputs.degree("service", "good"), Some(1.));
    assert_eq!(outputs.degree("food", "delicious"), Some(0.));
    assert_eq!(outputs.aggregated().height(), 1.);

    let outputs = engine.eval(&Inputs::from([("service", 3.5), ("food", 9.)])).unwrap();

    // poor = 0.5, good = 0.5, delicious = 1
    assert_eq!(outputs.firing_strengths(), [0.5, 0.5, 1.]);
    assert!(outputs.value().unwrap() > 15.);
}

#[test]
fn test_input_validation() {
    let (vars, service, food, tip) = tipping();
    let mut rules = Rules::new();

    rules.add(service.is("good").and(food.is("rancid")), tip.proposition("low"));

    let engine = MamdaniInference::new(vars, rules, tip, InferenceSettings::default()).unwrap();

    assert_eq!(
        engine.eval(&Inputs::from([("service", 5.)])).unwrap_err(),
        InputError::MissingInput("food".into())
    );
    assert_eq!(
        engine
            .eval(&Inputs::from([("service", 5.), ("food", 5.), ("ambience", 1.)]))
            .unwrap_err(),
        InputError::UnexpectedInput("ambience".into())
    );
    assert_eq!(
        engine
            .eval(&Inputs::from([("service", 5.), ("food", 5.), ("tip", 1.)]))
            .unwrap_err(),
        InputError::UnexpectedInput("tip".into())
    );
    assert_eq!(
        engine.eval(&Inputs::from([("service", f64::NAN), ("food", 5.)])).unwrap_err(),
        InputError::NotFinite("service".into())
    );
    assert!(matches!(
        engine.compute(&Inputs::from([("service", 5.), ("food", 5.)])),
        Err(Error::NoRuleFired)
    ));
}

#[test]
fn test_unresolved_references() {
    let (vars, service, food, tip) = tipping();
    let mut rules = Rules::new();

    rules.add(service.is("good"), tip.proposition("medium"));
    rules.add(service.is("great").and(food.is("bland")), tip.proposition("huge"));

    let err = MamdaniInference::new(vars, rules, tip, InferenceSettings::default()).unwrap_err();

    assert_eq!(
        err,
        ConfigError::Unresolved(vec![
            UnresolvedReference::Label {
                rule: 1,
                variable: "service".into(),
                label: "great".into()
            },
            UnresolvedReference::Label {
                rule: 1,
                variable: "food".into(),
                label: "bland".into()
            },
            UnresolvedReference::Label {
                rule: 1,
                variable: "tip".into(),
                label: "huge".into()
            },
        ])
    );
}

#[test]
fn test_structural_errors() {
    let (vars, service, food, tip) = tipping();

    let mut rules = Rules::new();
    rules.add(tip.is("low"), tip.proposition("low"));
    assert_eq!(
        MamdaniInference::new(vars.clone(), rules, tip, InferenceSettings::default()).unwrap_err(),
        ConfigError::OutputInAntecedent {
            rule: 0,
            variable: "tip".into()
        }
    );

    let mut rules = Rules::new();
    rules.add(service.is("good"), food.proposition("rancid"));
    assert_eq!(
        MamdaniInference::new(vars.clone(), rules, tip, InferenceSettings::default()).unwrap_err(),
        ConfigError::ConsequentNotOutput {
            rule: 0,
            variable: "food".into()
        }
    );

    assert_eq!(
        MamdaniInference::new(vars, Rules::new(), tip, InferenceSettings::default()).unwrap_err(),
        ConfigError::NoRules
    );

    // A handle from a different store does not resolve
    let mut rules = Rules::new();
    rules.add(service.is("good"), tip.proposition("low"));

    assert_eq!(
        MamdaniInference::new(Variables::new(), rules, tip, InferenceSettings::default()).unwrap_err(),
        ConfigError::UnknownOutput(None)
    );
}

#[test]
fn test_clip_to_bounds() {
    let (vars, service, _, tip) = tipping();
    let mut rules = Rules::new();

    rules.add(service.is("excellent"), tip.proposition("high"));
    rules.add(service.is("poor"), tip.proposition("low"));

    let inputs = Inputs::from([("service", 12.), ("food", -3.)]);
    let clipped = MamdaniInference::new(vars.clone(), rules.clone(), tip, InferenceSettings::default()).unwrap();

    assert_eq!(clipped.eval(&inputs).unwrap().degree("service", "excellent"), Some(1.));

    let raw = MamdaniInference::new(
        vars,
        rules,
        tip,
        InferenceSettings {
            clip_to_bounds: false,
            ..Default::default()
        },
    )
    .unwrap();
    let outputs = raw.eval(&inputs).unwrap();

    assert_eq!(outputs.degree("service", "excellent"), Some(0.));
    assert_eq!(outputs.value(), None);
}

#[test]
fn test_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<MamdaniInference>();

    let (vars, service, food, tip) = tipping();
    let mut rules = Rules::new();

    rules.add(service.is("poor").or(food.is("rancid")), tip.proposition("low"));
    rules.add(service.is("excellent").and(food.is("delicious")), tip.proposition("high"));

    let engine = MamdaniInference::new(vars, rules, tip, InferenceSettings::default()).unwrap();
    let expected = engine.compute(&Inputs::from([("service", 1.), ("food", 2.)])).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.compute(&Inputs::from([("service", 1.), ("food", 2.)])).unwrap()))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
