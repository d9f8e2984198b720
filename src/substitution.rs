use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::polynomial::{Monomial, Notation, Polynomial, Variable, VariableIndex};

/// A batch of variables `p_i`, `q_j` and quadratic terms `p_i q_j` that are
/// all set to zero at once.
///
/// When `t_1 + ... + t_n = 0` with every `t_k` in `[0, 1]`, each `t_k`
/// vanishes, so the whole sum is collected here and removed from every other
/// equation of a system in a single pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZeroSubstitution {
    zeroed_ps: BTreeSet<VariableIndex>,
    zeroed_qs: BTreeSet<VariableIndex>,
    zeroed_terms: BTreeSet<Monomial>,
}

impl ZeroSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.zeroed_ps.is_empty() && self.zeroed_qs.is_empty() && self.zeroed_terms.is_empty()
    }

    pub fn set_variable_zero(&mut self, variable: Variable) {
        match variable {
            Variable::P(index) => self.zeroed_ps.insert(index),
            Variable::Q(index) => self.zeroed_qs.insert(index),
        };
    }

    /// Constants cannot vanish and are ignored; the caller detects `1 = 0`
    /// before building a substitution.
    pub fn set_zero(&mut self, monomial: Monomial) {
        if monomial.is_quadratic() {
            self.zeroed_terms.insert(monomial);
        } else if let Some(variable) = monomial.variables().next() {
            self.set_variable_zero(variable);
        }
    }

    pub fn set_polynomial_zero(&mut self, polynomial: &Polynomial) {
        self.extend(polynomial.monomials());
    }

    pub fn zeroes_variable(&self, variable: Variable) -> bool {
        match variable {
            Variable::P(index) => self.zeroed_ps.contains(&index),
            Variable::Q(index) => self.zeroed_qs.contains(&index),
        }
    }

    pub fn is_zeroed(&self, monomial: &Monomial) -> bool {
        monomial
            .variables()
            .any(|variable| self.zeroes_variable(variable))
            || self.zeroed_terms.contains(monomial)
    }

    pub fn zeroed_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.zeroed_ps
            .iter()
            .map(|index| Variable::P(*index))
            .chain(self.zeroed_qs.iter().map(|index| Variable::Q(*index)))
    }

    /// Quadratic terms whose factors are not already zeroed on their own.
    pub fn independent_terms(&self) -> impl Iterator<Item = Monomial> + '_ {
        self.zeroed_terms.iter().copied().filter(|term| {
            !term
                .variables()
                .any(|variable| self.zeroes_variable(variable))
        })
    }

    /// Writes `p_{1} = q_{2} = p_{3} q_{1} = 0`, optionally leaving out the
    /// quadratic terms.
    pub fn display(&self, notation: Notation, with_terms: bool) -> SubstitutionDisplay<'_> {
        SubstitutionDisplay {
            substitution: self,
            notation,
            with_terms,
        }
    }
}

impl Extend<Monomial> for ZeroSubstitution {
    fn extend<T: IntoIterator<Item = Monomial>>(&mut self, iter: T) {
        for monomial in iter {
            self.set_zero(monomial);
        }
    }
}

impl FromIterator<Monomial> for ZeroSubstitution {
    fn from_iter<T: IntoIterator<Item = Monomial>>(iter: T) -> Self {
        let mut substitution = Self::new();
        substitution.extend(iter);
        substitution
    }
}

impl FromIterator<Variable> for ZeroSubstitution {
    fn from_iter<T: IntoIterator<Item = Variable>>(iter: T) -> Self {
        let mut substitution = Self::new();
        for variable in iter {
            substitution.set_variable_zero(variable);
        }
        substitution
    }
}

pub struct SubstitutionDisplay<'a> {
    substitution: &'a ZeroSubstitution,
    notation: Notation,
    with_terms: bool,
}

impl Display for SubstitutionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for variable in self.substitution.zeroed_variables() {
            write!(f, "{} = ", variable.display(self.notation))?;
        }
        if self.with_terms {
            for term in &self.substitution.zeroed_terms {
                write!(f, "{} = ", term.display(self.notation))?;
            }
        }
        write!(f, "0")
    }
}
