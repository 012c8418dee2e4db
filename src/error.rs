use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A reference from a rule to a variable or label that does not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UnresolvedReference {
    /// The variable is not declared. `name` is `None` for a handle from another store.
    Variable { rule: usize, name: Option<String> },
    Label {
        rule: usize,
        variable: String,
        label: String,
    },
}

impl UnresolvedReference {
    /// Index of the offending rule, in insertion order
    pub fn rule(&self) -> usize {
        match self {
            Self::Variable { rule, .. } | Self::Label { rule, .. } => *rule,
        }
    }
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable { rule, name: Some(name) } => write!(f, "rule #{rule}: variable {name:?}"),
            Self::Variable { rule, name: None } => write!(f, "rule #{rule}: foreign variable handle"),
            Self::Label { rule, variable, label } => write!(f, "rule #{rule}: {variable}[{label:?}]"),
        }
    }
}

struct Refs<'a>(&'a [UnresolvedReference]);

impl fmt::Display for Refs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, r) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{r}")?;
        }
        Ok(())
    }
}

/// Errors detected while building an engine. These are never raised by `eval`.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("breakpoints {points:?} must be finite and non-decreasing")]
    InvalidBreakpoints { points: Vec<f64> },

    #[error("{shape} membership expects {expected} points, got {found}")]
    WrongPointCount {
        shape: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid universe (min {min}, max {max}, step {step})")]
    InvalidUniverse { min: f64, max: f64, step: f64 },

    #[error("variable {0:?} declared more than once")]
    DuplicateVariable(String),

    #[error("label {label:?} declared more than once in variable {variable:?}")]
    DuplicateLabel { variable: String, label: String },

    #[error("variable {0:?} has no terms")]
    EmptyVariable(String),

    #[error("at least one input variable is required")]
    NoInputs,

    #[error("at least one rule is required")]
    NoRules,

    /// `None` when the output handle came from another `Variables` store.
    #[error("output variable {} is not declared", .0.as_deref().unwrap_or("<foreign handle>"))]
    UnknownOutput(Option<String>),

    #[error("rule #{rule} references the output variable {variable:?} in its antecedent")]
    OutputInAntecedent { rule: usize, variable: String },

    #[error("rule #{rule} concludes on {variable:?}, which is not the output variable")]
    ConsequentNotOutput { rule: usize, variable: String },

    #[error("empty `and`/`or` expression")]
    EmptyExpression,

    #[error("unresolved references: {}", Refs(.0))]
    Unresolved(Vec<UnresolvedReference>),
}

/// Rejections of a single simulation call, raised before any computation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("missing input for variable {0:?}")]
    MissingInput(String),

    #[error("unexpected input {0:?}, no such input variable")]
    UnexpectedInput(String),

    #[error("input {0:?} is not a finite number")]
    NotFinite(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    /// The aggregated output set is zero at every sample.
    #[error("no rule fired for the given inputs")]
    NoRuleFired,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to serialize TOML configuration: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("failed to parse JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported configuration format {0:?}, expected .toml or .json")]
    UnsupportedFormat(String),
}

#[test]
fn test_unresolved_display() {
    let err = ConfigError::Unresolved(vec![
        UnresolvedReference::Label {
            rule: 0,
            variable: "angle".into(),
            label: "HUGE".into(),
        },
        UnresolvedReference::Variable {
            rule: 3,
            name: Some("pole".into()),
        },
    ]);

    assert_eq!(
        err.to_string(),
        "unresolved references: rule #0: angle[\"HUGE\"], rule #3: variable \"pole\""
    );
}
