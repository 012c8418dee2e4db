use crate::variable::{Variable, VariableKey};

/// `variable is label`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposition {
    pub(crate) var: VariableKey,
    pub(crate) label: String,
}

impl Proposition {
    pub fn variable(&self) -> Variable {
        Variable(self.var)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Rule premise. The tree shape is the only precedence: `a.and(b).or(c)` is `(a AND b) OR c`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Is(Proposition),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    /// Every proposition in the tree, left to right.
    pub fn propositions(&self) -> Vec<&Proposition> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Expr, out: &mut Vec<&'p Proposition>) {
            match expr {
                Expr::Is(prop) => out.push(prop),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    parse(lhs, out);
                    parse(rhs, out);
                },
            }
        }

        parse(self, &mut props);

        props
    }
}

impl Variable {
    pub fn is(self, label: impl Into<String>) -> Expr {
        Expr::Is(self.proposition(label))
    }

    /// Consequent form of [`Variable::is`].
    pub fn proposition(self, label: impl Into<String>) -> Proposition {
        Proposition {
            var: self.0,
            label: label.into(),
        }
    }
}

#[test]
fn test_tree_shape() {
    use crate::membership::MembershipFunction;
    use crate::variable::{LinguisticVariable, Universe, Variables};

    let mut vars = Variables::new();
    let mf = MembershipFunction::triangular(0., 0.5, 1.).unwrap();
    let universe = Universe::new(0., 1., 0.1).unwrap();
    let x = vars.add(LinguisticVariable::new("x", universe).with_term("A", mf).unwrap()).unwrap();
    let y = vars.add(LinguisticVariable::new("y", universe).with_term("B", mf).unwrap()).unwrap();

    let expr = x.is("A").and(y.is("B")).or(x.is("C"));

    match &expr {
        Expr::Or(lhs, rhs) => {
            assert!(matches!(**lhs, Expr::And(..)));
            assert_eq!(**rhs, x.is("C"));
        },
        _ => panic!("expected an Or at the root"),
    }

    let labels: Vec<_> = expr.propositions().into_iter().map(Proposition::label).collect();

    assert_eq!(labels, ["A", "B", "C"]);
}
