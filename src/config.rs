//! Serializable description of a whole inference system.
//!
//! A configuration names its variables and labels with strings; [`EngineConfig::build`]
//! resolves them and returns a validated [`MamdaniInference`]. Rule premises use
//! n-ary `and`/`or` lists, folded left into binary nodes:
//!
//! ```toml
//! [[rules]]
//! if = { and = [{ variable = "angle", is = "ZO" }, { variable = "angularVelocity", is = "ZO" }] }
//! then = "Z"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dsl::Expr;
use crate::error::{ConfigError, Error, Result, UnresolvedReference};
use crate::inference::{InferenceSettings, MamdaniInference};
use crate::membership::{MembershipFunction, Shape};
use crate::rules::Rules;
use crate::variable::{LinguisticVariable, Universe, Variables};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub settings: InferenceSettings,
    pub inputs: Vec<VariableConfig>,
    pub output: VariableConfig,
    pub rules: Vec<RuleConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VariableConfig {
    pub name: String,
    pub universe: UniverseConfig,
    pub terms: Vec<TermConfig>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UniverseConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TermConfig {
    pub label: String,
    pub shape: Shape,
    pub points: Vec<f64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    #[serde(rename = "if")]
    pub premise: ExprConfig,
    /// Output label
    #[serde(rename = "then")]
    pub consequence: String,
}

/// A premise node. Each form takes exactly its own keys, so a node mixing
/// `variable`/`is` with `and` or `or` is rejected.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum ExprConfig {
    Is { variable: String, is: String },
    And { and: Vec<ExprConfig> },
    Or { or: Vec<ExprConfig> },
}

impl ExprConfig {
    pub fn is(variable: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Is {
            variable: variable.into(),
            is: label.into(),
        }
    }

    fn to_expr(
        &self,
        rule: usize,
        vars: &Variables,
        unresolved: &mut Vec<UnresolvedReference>,
    ) -> std::result::Result<Option<Expr>, ConfigError> {
        let (operands, and) = match self {
            Self::Is { variable, is } => {
                let Some(var) = vars.find(variable) else {
                    unresolved.push(UnresolvedReference::Variable {
                        rule,
                        name: Some(variable.clone()),
                    });
                    return Ok(None);
                };

                if vars.get(var).and_then(|v| v.membership(is)).is_none() {
                    unresolved.push(UnresolvedReference::Label {
                        rule,
                        variable: variable.clone(),
                        label: is.clone(),
                    });
                    return Ok(None);
                }

                return Ok(Some(var.is(is.as_str())));
            },
            Self::And { and } => (and, true),
            Self::Or { or } => (or, false),
        };

        if operands.is_empty() {
            return Err(ConfigError::EmptyExpression);
        }

        let mut folded: Option<Option<Expr>> = None;

        for operand in operands {
            let rhs = operand.to_expr(rule, vars, unresolved)?;

            folded = Some(match (folded, rhs) {
                (None, rhs) => rhs,
                (Some(Some(lhs)), Some(rhs)) if and => Some(lhs.and(rhs)),
                (Some(Some(lhs)), Some(rhs)) => Some(lhs.or(rhs)),
                _ => None,
            });
        }

        Ok(folded.flatten())
    }
}

impl VariableConfig {
    pub fn to_variable(&self) -> std::result::Result<LinguisticVariable, ConfigError> {
        let UniverseConfig { min, max, step } = self.universe;
        let mut var = LinguisticVariable::new(&self.name, Universe::new(min, max, step)?);

        for term in &self.terms {
            var.insert(&term.label, MembershipFunction::from_points(term.shape, &term.points)?)?;
        }

        Ok(var)
    }
}

impl From<&LinguisticVariable> for VariableConfig {
    fn from(var: &LinguisticVariable) -> Self {
        let universe = var.universe();

        Self {
            name: var.name().to_owned(),
            universe: UniverseConfig {
                min: universe.min(),
                max: universe.max(),
                step: universe.step(),
            },
            terms: var
                .terms()
                .map(|(label, mf)| TermConfig {
                    label: label.to_owned(),
                    shape: mf.shape(),
                    points: mf.points().to_vec(),
                })
                .collect(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads a `.toml` or `.json` file, picking the format from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();

        match ext.to_ascii_lowercase().as_str() {
            "toml" => Self::from_toml_str(&std::fs::read_to_string(path)?),
            "json" => Self::from_json_str(&std::fs::read_to_string(path)?),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves every name and validates the system. All dangling references
    /// are reported together.
    pub fn build(&self) -> std::result::Result<MamdaniInference, ConfigError> {
        let mut vars = Variables::new();

        for input in &self.inputs {
            vars.add(input.to_variable()?)?;
        }

        let output = vars.add(self.output.to_variable()?)?;
        let output_var = vars.get(output).ok_or(ConfigError::UnknownOutput(Some(self.output.name.clone())))?;
        let mut rules = Rules::with_capacity(self.rules.len());
        let mut unresolved = Vec::new();

        for (i, rule) in self.rules.iter().enumerate() {
            let premise = rule.premise.to_expr(i, &vars, &mut unresolved)?;

            if output_var.membership(&rule.consequence).is_none() {
                unresolved.push(UnresolvedReference::Label {
                    rule: i,
                    variable: self.output.name.clone(),
                    label: rule.consequence.clone(),
                });
            }

            if let Some(premise) = premise {
                rules.add(premise, output.proposition(rule.consequence.as_str()));
            }
        }

        if !unresolved.is_empty() {
            return Err(ConfigError::Unresolved(unresolved));
        }

        MamdaniInference::new(vars, rules, output, self.settings)
    }
}

#[cfg(test)]
const TIPPING: &str = r#"
[settings]
defuzzification = "area_centroid"

[[inputs]]
name = "service"
universe = { min = 0.0, max = 10.0, step = 0.5 }
terms = [
    { label = "poor", shape = "trapezoidal", points = [0.0, 0.0, 2.0, 5.0] },
    { label = "good", shape = "triangular", points = [2.0, 5.0, 8.0] },
]

[output]
name = "tip"
universe = { min = 0.0, max = 30.0, step = 0.5 }
terms = [
    { label = "low", shape = "triangular", points = [0.0, 5.0, 10.0] },
    { label = "medium", shape = "triangular", points = [10.0, 15.0, 20.0] },
]

[[rules]]
if = { variable = "service", is = "poor" }
then = "low"

[[rules]]
if = { or = [{ variable = "service", is = "good" }] }
then = "medium"
"#;

#[test]
fn test_parse_toml() {
    let config = EngineConfig::from_toml_str(TIPPING).unwrap();

    assert_eq!(config.settings.defuzzification, crate::ops::DefuzzificationOp::AreaCentroid);
    assert!(config.settings.clip_to_bounds);
    assert_eq!(config.inputs[0].terms[1].shape, Shape::Triangular);
    assert_eq!(config.rules[0].premise, ExprConfig::is("service", "poor"));

    let engine = config.build().unwrap();

    assert_eq!(engine.rules().len(), 2);
    assert_eq!(engine.variable("service").map(|v| v.labels().count()), Some(2));

    let tip = engine.compute(&[("service", 5.)].into()).unwrap();

    assert!((tip - 15.).abs() < 1e-9);
}

#[test]
fn test_json_round_trip() {
    let config = EngineConfig::from_toml_str(TIPPING).unwrap();
    let json = config.to_json_string().unwrap();

    assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);

    let toml = config.to_toml_string().unwrap();

    assert_eq!(EngineConfig::from_toml_str(&toml).unwrap(), config);
}

#[test]
fn test_variable_round_trip() {
    let config = EngineConfig::from_toml_str(TIPPING).unwrap();
    let var = config.output.to_variable().unwrap();

    assert_eq!(VariableConfig::from(&var), config.output);
}

#[test]
fn test_all_references_reported() {
    let mut config = EngineConfig::from_toml_str(TIPPING).unwrap();

    config.rules.push(RuleConfig {
        premise: ExprConfig::And {
            and: vec![ExprConfig::is("food", "rancid"), ExprConfig::is("service", "bad")],
        },
        consequence: "huge".into(),
    });

    assert_eq!(
        config.build().unwrap_err(),
        ConfigError::Unresolved(vec![
            UnresolvedReference::Variable {
                rule: 2,
                name: Some("food".into())
            },
            UnresolvedReference::Label {
                rule: 2,
                variable: "service".into(),
                label: "bad".into()
            },
            UnresolvedReference::Label {
                rule: 2,
                variable: "tip".into(),
                label: "huge".into()
            },
        ])
    );
}

#[test]
fn test_malformed_terms() {
    let mut config = EngineConfig::from_toml_str(TIPPING).unwrap();

    config.rules.push(RuleConfig {
        premise: ExprConfig::Or { or: vec![] },
        consequence: "low".into(),
    });
    assert_eq!(config.build().unwrap_err(), ConfigError::EmptyExpression);

    let mut config = EngineConfig::from_toml_str(TIPPING).unwrap();

    config.inputs[0].terms[0].points = vec![0., 2., 5.];
    config.inputs[0].terms[1].points = vec![5., 2., 8.];
    assert_eq!(
        config.build().unwrap_err(),
        ConfigError::WrongPointCount {
            shape: "trapezoidal",
            expected: 4,
            found: 3
        }
    );

    config.inputs[0].terms[0].shape = Shape::Triangular;
    assert_eq!(
        config.build().unwrap_err(),
        ConfigError::InvalidBreakpoints {
            points: vec![5., 2., 8.]
        }
    );

    assert!(matches!(
        EngineConfig::from_path("pendulum.yaml"),
        Err(Error::UnsupportedFormat(_))
    ));

    let mut config = EngineConfig::from_toml_str(TIPPING).unwrap();

    config.output.universe.step = 1e-307;
    assert!(matches!(config.build(), Err(ConfigError::InvalidUniverse { .. })));
}

#[test]
fn test_unknown_keys_rejected() {
    let mixed = TIPPING.replace(
        r#"if = { variable = "service", is = "poor" }"#,
        r#"if = { variable = "service", is = "poor", and = [{ variable = "service", is = "good" }] }"#,
    );

    assert_ne!(mixed, TIPPING);
    assert!(matches!(EngineConfig::from_toml_str(&mixed), Err(Error::Toml(_))));

    let negated = TIPPING.replace(
        r#"{ label = "good", shape = "triangular", points = [2.0, 5.0, 8.0] }"#,
        r#"{ label = "good", shape = "triangular", points = [2.0, 5.0, 8.0], not = true }"#,
    );

    assert_ne!(negated, TIPPING);
    assert!(matches!(EngineConfig::from_toml_str(&negated), Err(Error::Toml(_))));

    let json = r#"{ "variable": "service", "is": "poor", "or": [] }"#;

    assert!(serde_json::from_str::<ExprConfig>(json).is_err());
    assert_eq!(
        serde_json::from_str::<ExprConfig>(r#"{ "variable": "service", "is": "poor" }"#).unwrap(),
        ExprConfig::is("service", "poor")
    );
}
