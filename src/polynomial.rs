use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::multiset::Multiset;

pub type VariableIndex = u16;

/// Largest degree accepted for either factor polynomial.
pub const MAX_DEGREE: VariableIndex = i16::MAX as VariableIndex;

/// How monomials, equations and systems are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Notation {
    /// `p_1 * q_2`, as read back by the leaf file parser.
    #[default]
    PlainText,
    /// `p_{1} q_{2}`
    Latex,
    /// `p[1] q[2]`
    Wolfram,
}

/// One of the unknown coefficients `p_i` of `P` or `q_j` of `Q`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variable {
    P(VariableIndex),
    Q(VariableIndex),
}

impl Variable {
    pub fn index(&self) -> VariableIndex {
        match self {
            Variable::P(index) | Variable::Q(index) => *index,
        }
    }

    pub fn display(&self, notation: Notation) -> VariableDisplay {
        VariableDisplay {
            variable: *self,
            notation,
        }
    }
}

pub struct VariableDisplay {
    variable: Variable,
    notation: Notation,
}

impl Display for VariableDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.variable {
            Variable::P(_) => 'p',
            Variable::Q(_) => 'q',
        };
        let index = self.variable.index();
        match self.notation {
            Notation::PlainText => write!(f, "{name}_{index}"),
            Notation::Latex => write!(f, "{name}_{{{index}}}"),
            Notation::Wolfram => write!(f, "{name}[{index}]"),
        }
    }
}

impl Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(Notation::PlainText).fmt(f)
    }
}

/// A monomial of the form `1`, `p_i`, `q_j` or `p_i q_j`.
///
/// Index `0` marks an absent variable, so subscripts always start at `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Monomial {
    p_index: VariableIndex,
    q_index: VariableIndex,
}

impl Monomial {
    pub const ONE: Self = Self {
        p_index: 0,
        q_index: 0,
    };

    pub const fn new(p_index: VariableIndex, q_index: VariableIndex) -> Self {
        Self { p_index, q_index }
    }

    pub const fn p_index(&self) -> VariableIndex {
        self.p_index
    }

    pub const fn q_index(&self) -> VariableIndex {
        self.q_index
    }

    pub const fn has_p(&self) -> bool {
        self.p_index != 0
    }

    pub const fn has_q(&self) -> bool {
        self.q_index != 0
    }

    pub const fn is_constant(&self) -> bool {
        !(self.has_p() || self.has_q())
    }

    pub const fn is_linear(&self) -> bool {
        self.has_p() ^ self.has_q()
    }

    pub const fn is_quadratic(&self) -> bool {
        self.has_p() && self.has_q()
    }

    pub fn p_variable(&self) -> Option<Variable> {
        self.has_p().then_some(Variable::P(self.p_index))
    }

    pub fn q_variable(&self) -> Option<Variable> {
        self.has_q().then_some(Variable::Q(self.q_index))
    }

    /// The variables of this monomial, `p` before `q`.
    pub fn variables(&self) -> impl Iterator<Item = Variable> {
        self.p_variable().into_iter().chain(self.q_variable())
    }

    pub fn has_variable(&self, variable: Variable) -> bool {
        match variable {
            Variable::P(index) => self.has_p() && self.p_index == index,
            Variable::Q(index) => self.has_q() && self.q_index == index,
        }
    }

    /// The co-factor left after setting `variable` to one.
    pub fn without_variable(self, variable: Variable) -> Self {
        if !self.has_variable(variable) {
            return self;
        }
        match variable {
            Variable::P(_) => Self { p_index: 0, ..self },
            Variable::Q(_) => Self { q_index: 0, ..self },
        }
    }

    pub fn display(&self, notation: Notation) -> MonomialDisplay {
        MonomialDisplay {
            monomial: *self,
            notation,
        }
    }
}

impl From<Variable> for Monomial {
    fn from(variable: Variable) -> Self {
        match variable {
            Variable::P(index) => Monomial::new(index, 0),
            Variable::Q(index) => Monomial::new(0, index),
        }
    }
}

pub struct MonomialDisplay {
    monomial: Monomial,
    notation: Notation,
}

impl Display for MonomialDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = match self.notation {
            Notation::PlainText => " * ",
            Notation::Latex | Notation::Wolfram => " ",
        };
        match (self.monomial.p_variable(), self.monomial.q_variable()) {
            (Some(p), Some(q)) => write!(
                f,
                "{}{separator}{}",
                p.display(self.notation),
                q.display(self.notation)
            ),
            (Some(v), None) | (None, Some(v)) => v.display(self.notation).fmt(f),
            (None, None) => write!(f, "1"),
        }
    }
}

impl Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(Notation::PlainText).fmt(f)
    }
}

/// A sum of monomials; the left-hand side of an equation.
///
/// Monomials are kept with multiplicity so that a repeated constant term,
/// which makes an equation unsatisfiable, stays visible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Polynomial(Multiset<Monomial>);

impl Polynomial {
    pub fn new() -> Self {
        Self(Multiset::new())
    }

    /// Number of monomials, counted with multiplicity.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.sole_monomial() == Some(Monomial::ONE)
    }

    pub fn is_zero_or_one(&self) -> bool {
        self.is_zero() || self.is_one()
    }

    pub fn constant_count(&self) -> u32 {
        self.0.amount(&Monomial::ONE)
    }

    pub fn has_constant(&self) -> bool {
        self.constant_count() > 0
    }

    pub fn contains(&self, monomial: &Monomial) -> bool {
        self.0.contains(monomial)
    }

    /// The only monomial of a one-term polynomial.
    pub fn sole_monomial(&self) -> Option<Monomial> {
        if self.len() == 1 {
            self.0.support().next().copied()
        } else {
            None
        }
    }

    /// Monomials with multiplicity, in insertion order.
    pub fn monomials(&self) -> impl Iterator<Item = Monomial> + '_ {
        self.0.iter().copied()
    }

    pub fn has_variable(&self, variable: Variable) -> bool {
        self.0.support().any(|monomial| monomial.has_variable(variable))
    }

    pub(crate) fn without(&self, zeroed: impl Fn(&Monomial) -> bool) -> Self {
        let mut monomials = self.0.clone();
        monomials.retain(|monomial| !zeroed(monomial));
        Self(monomials)
    }

    pub(crate) fn map_monomials(&self, f: impl Fn(Monomial) -> Monomial) -> Self {
        self.monomials().map(f).collect()
    }

    pub fn display(&self, notation: Notation) -> PolynomialDisplay<'_> {
        PolynomialDisplay {
            polynomial: self,
            notation,
        }
    }
}

impl FromIterator<Monomial> for Polynomial {
    fn from_iter<T: IntoIterator<Item = Monomial>>(iter: T) -> Self {
        Self(iter.into_iter().map(|monomial| (monomial, 1)).collect())
    }
}

impl From<Monomial> for Polynomial {
    fn from(monomial: Monomial) -> Self {
        Self::from_iter([monomial])
    }
}

pub struct PolynomialDisplay<'a> {
    polynomial: &'a Polynomial,
    notation: Notation,
}

impl Display for PolynomialDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polynomial.is_zero() {
            return write!(f, "0");
        }
        for (k, monomial) in self.polynomial.monomials().enumerate() {
            if k > 0 {
                write!(f, " + ")?;
            }
            monomial.display(self.notation).fmt(f)?;
        }
        Ok(())
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(Notation::PlainText).fmt(f)
    }
}
