use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::polynomial::{Monomial, Notation, Polynomial};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RightHandSide {
    Zero,
    One,
    ZeroOrOne,
}

impl RightHandSide {
    /// True if no assignment in `[0, 1]` makes `left` equal to this side:
    /// `0 = 1`, `1 + ... = 0`, or any sum with two constant terms.
    pub fn rejects(&self, left: &Polynomial) -> bool {
        match self {
            RightHandSide::Zero => left.has_constant(),
            RightHandSide::One => left.is_zero() || left.constant_count() > 1,
            RightHandSide::ZeroOrOne => left.constant_count() > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub left: Polynomial,
    pub right: RightHandSide,
}

impl Equation {
    pub fn new<L: Into<Polynomial>>(left: L, right: RightHandSide) -> Self {
        Self {
            left: left.into(),
            right,
        }
    }

    pub fn zero(monomial: Monomial) -> Self {
        Self::new(monomial, RightHandSide::Zero)
    }

    pub fn is_unsatisfiable(&self) -> bool {
        self.right.rejects(&self.left)
    }

    pub fn display(&self, notation: Notation) -> EquationDisplay<'_> {
        EquationDisplay {
            equation: self,
            notation,
        }
    }
}

pub struct EquationDisplay<'a> {
    equation: &'a Equation,
    notation: Notation,
}

impl Display for EquationDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = self.equation.left.display(self.notation);
        match (self.notation, self.equation.right) {
            (Notation::Wolfram, RightHandSide::Zero) => write!(f, "{left} == 0"),
            (Notation::Wolfram, RightHandSide::One) => write!(f, "{left} == 1"),
            (Notation::Wolfram, RightHandSide::ZeroOrOne) => {
                write!(f, "({left} == 0 || {left} == 1)")
            }
            (_, RightHandSide::Zero) => write!(f, "{left} = 0"),
            (_, RightHandSide::One) => write!(f, "{left} = 1"),
            (Notation::Latex, RightHandSide::ZeroOrOne) => {
                write!(f, "{left} = 0 \\text{{ or }} 1")
            }
            (_, RightHandSide::ZeroOrOne) => write!(f, "{left} = 0 or 1"),
        }
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(Notation::PlainText).fmt(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_sum_equal_to_one_is_unsatisfiable() {
        assert!(Equation::new(Polynomial::new(), RightHandSide::One).is_unsatisfiable());
        assert!(!Equation::new(Polynomial::new(), RightHandSide::ZeroOrOne).is_unsatisfiable());
    }

    #[test]
    fn two_constants_are_unsatisfiable() {
        let left = Polynomial::from_iter([Monomial::ONE, Monomial::new(1, 0), Monomial::ONE]);
        assert!(Equation::new(left.clone(), RightHandSide::One).is_unsatisfiable());
        assert!(Equation::new(left, RightHandSide::ZeroOrOne).is_unsatisfiable());
    }

    #[test]
    fn single_constant_is_satisfiable_unless_zero() {
        let left = Polynomial::from_iter([Monomial::ONE, Monomial::new(1, 2)]);
        assert!(!Equation::new(left.clone(), RightHandSide::One).is_unsatisfiable());
        assert!(Equation::new(left, RightHandSide::Zero).is_unsatisfiable());
    }

    #[test]
    fn equation_notations() {
        let equation = Equation::new(
            Polynomial::from_iter([Monomial::new(1, 0), Monomial::new(2, 1)]),
            RightHandSide::ZeroOrOne,
        );
        assert_eq!(equation.to_string(), "p_1 + p_2 * q_1 = 0 or 1");
        assert_eq!(
            equation.display(Notation::Latex).to_string(),
            "p_{1} + p_{2} q_{1} = 0 \\text{ or } 1"
        );
        assert_eq!(
            Equation::zero(Monomial::new(1, 1))
                .display(Notation::Wolfram)
                .to_string(),
            "p[1] q[1] == 0"
        );
    }
}
