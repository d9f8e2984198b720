use std::collections::BTreeSet;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{
    config::DegreePair,
    equation::{Equation, RightHandSide},
    error::{Error, Result},
    polynomial::{Monomial, Notation, Polynomial, Variable, VariableIndex},
    substitution::ZeroSubstitution,
};

/// A system of equations in the variables `p_i`, `q_j`, each constrained to
/// `[0, 1]`.
///
/// Every transformation returns a new system and leaves `self` untouched, so
/// sibling cases of the search never share state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationSystem {
    active_ps: Vec<VariableIndex>,
    active_qs: Vec<VariableIndex>,
    /// Quadratic terms known to vanish.
    zeros: Vec<Monomial>,
    /// Left-hand sides of equations `... = 1`.
    ones: Vec<Polynomial>,
    /// Left-hand sides of equations `... = 0 or 1`.
    unknown: Vec<Polynomial>,
}

impl EquationSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The coefficient equations of `P(x) Q(x)` where
    /// `P(x) = 1 + p_1 x + ... + p_{i-1} x^{i-1} + x^i` and likewise for `Q`.
    ///
    /// One `0 or 1` equation per degree `1..i+j`; the constant and leading
    /// coefficients of the product are identically `1` and are omitted.
    pub fn initial(degrees: DegreePair) -> Self {
        let p_degree = degrees.p_degree();
        let q_degree = degrees.q_degree();
        let mut coefficients: Vec<Vec<Monomial>> =
            vec![Vec::new(); usize::from(p_degree) + usize::from(q_degree) - 1];

        for p in 0..=p_degree {
            for q in 0..=q_degree {
                if (p, q) == (0, 0) || (p, q) == (p_degree, q_degree) {
                    continue;
                }
                let monomial = Monomial::new(
                    if p == p_degree { 0 } else { p },
                    if q == q_degree { 0 } else { q },
                );
                coefficients[usize::from(p) + usize::from(q) - 1].push(monomial);
            }
        }

        Self {
            active_ps: (1..p_degree).collect(),
            active_qs: (1..q_degree).collect(),
            zeros: Vec::new(),
            ones: Vec::new(),
            unknown: coefficients.into_iter().map(Polynomial::from_iter).collect(),
        }
    }

    pub fn from_parts(
        active_ps: Vec<VariableIndex>,
        active_qs: Vec<VariableIndex>,
        zeros: Vec<Monomial>,
        ones: Vec<Polynomial>,
        unknown: Vec<Polynomial>,
    ) -> Self {
        Self {
            active_ps,
            active_qs,
            zeros,
            ones,
            unknown,
        }
    }

    pub fn active_ps(&self) -> &[VariableIndex] {
        &self.active_ps
    }

    pub fn active_qs(&self) -> &[VariableIndex] {
        &self.active_qs
    }

    pub fn zeros(&self) -> &[Monomial] {
        &self.zeros
    }

    pub fn ones(&self) -> &[Polynomial] {
        &self.ones
    }

    pub fn unknown(&self) -> &[Polynomial] {
        &self.unknown
    }

    pub fn active_variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.active_ps
            .iter()
            .map(|index| Variable::P(*index))
            .chain(self.active_qs.iter().map(|index| Variable::Q(*index)))
    }

    pub fn active_variable_count(&self) -> usize {
        self.active_ps.len() + self.active_qs.len()
    }

    pub fn is_active(&self, variable: Variable) -> bool {
        match variable {
            Variable::P(index) => self.active_ps.contains(&index),
            Variable::Q(index) => self.active_qs.contains(&index),
        }
    }

    /// Every relation of the system: zeros, then ones, then unknown.
    pub fn equations(&self) -> impl Iterator<Item = Equation> + '_ {
        let zeros = self.zeros.iter().map(|monomial| Equation::zero(*monomial));
        let ones = self
            .ones
            .iter()
            .map(|polynomial| Equation::new(polynomial.clone(), RightHandSide::One));
        let unknown = self
            .unknown
            .iter()
            .map(|polynomial| Equation::new(polynomial.clone(), RightHandSide::ZeroOrOne));
        zeros.chain(ones).chain(unknown)
    }

    /// True if this system has no active variables and no equations left.
    pub fn is_empty(&self) -> bool {
        self.active_ps.is_empty()
            && self.active_qs.is_empty()
            && self.zeros.is_empty()
            && self.ones.is_empty()
            && self.unknown.is_empty()
    }

    /// True if some equation reads `0 = 1` or has two constant terms.
    pub fn has_unsatisfiable_equation(&self) -> bool {
        self.ones
            .iter()
            .any(|polynomial| RightHandSide::One.rejects(polynomial))
            || self
                .unknown
                .iter()
                .any(|polynomial| RightHandSide::ZeroOrOne.rejects(polynomial))
    }

    /// Drops `1 = 1` and the equations `0 = 0 or 1`, `1 = 0 or 1`, which
    /// constrain nothing.
    pub fn without_settled(self) -> Self {
        let Self {
            active_ps,
            active_qs,
            zeros,
            mut ones,
            mut unknown,
        } = self;
        ones.retain(|polynomial| !polynomial.is_one());
        unknown.retain(|polynomial| !polynomial.is_zero_or_one());
        Self {
            active_ps,
            active_qs,
            zeros,
            ones,
            unknown,
        }
    }

    /// True if every active variable is directly constrained to `{0, 1}`,
    /// either by a one-term equation `m = 1` or by `v = 0 or 1`.
    pub fn is_solved(&self) -> bool {
        let mut solved = BTreeSet::new();
        for polynomial in &self.ones {
            if let Some(monomial) = polynomial.sole_monomial() {
                solved.extend(monomial.variables());
            }
        }
        for polynomial in &self.unknown {
            if let Some(monomial) = polynomial.sole_monomial().filter(Monomial::is_linear) {
                solved.extend(monomial.variables());
            }
        }
        self.active_variables()
            .all(|variable| solved.contains(&variable))
    }

    /// Removes every monomial the substitution zeroes and resolves the
    /// equations this settles. A `ones` equation that becomes empty is kept
    /// so the contradiction is reported by the next check.
    pub fn apply(&self, substitution: &ZeroSubstitution) -> Self {
        let zeroed = |monomial: &Monomial| substitution.is_zeroed(monomial);
        Self {
            active_ps: self
                .active_ps
                .iter()
                .copied()
                .filter(|index| !substitution.zeroes_variable(Variable::P(*index)))
                .collect(),
            active_qs: self
                .active_qs
                .iter()
                .copied()
                .filter(|index| !substitution.zeroes_variable(Variable::Q(*index)))
                .collect(),
            zeros: self
                .zeros
                .iter()
                .copied()
                .filter(|monomial| !zeroed(monomial))
                .chain(substitution.independent_terms())
                .collect(),
            ones: self
                .ones
                .iter()
                .map(|polynomial| polynomial.without(zeroed))
                .filter(|polynomial| !polynomial.is_one())
                .collect(),
            unknown: self
                .unknown
                .iter()
                .map(|polynomial| polynomial.without(zeroed))
                .filter(|polynomial| !polynomial.is_zero_or_one())
                .collect(),
        }
    }

    pub fn set_zero(&self, variable: Variable) -> Self {
        self.apply(&ZeroSubstitution::from_iter([variable]))
    }

    /// Sets `variable` to one: every monomial containing it is replaced by
    /// its co-factor, and each vanishing product `variable * v` forces `v`
    /// to zero.
    pub fn set_one(&self, variable: Variable) -> Self {
        let mut implied = ZeroSubstitution::new();
        let mut zeros = Vec::with_capacity(self.zeros.len());
        for monomial in &self.zeros {
            if monomial.has_variable(variable) {
                implied.set_zero(monomial.without_variable(variable));
            } else {
                zeros.push(*monomial);
            }
        }

        let substitute = |monomial: Monomial| monomial.without_variable(variable);
        let pinned = Self {
            active_ps: self
                .active_ps
                .iter()
                .copied()
                .filter(|index| Variable::P(*index) != variable)
                .collect(),
            active_qs: self
                .active_qs
                .iter()
                .copied()
                .filter(|index| Variable::Q(*index) != variable)
                .collect(),
            zeros,
            ones: self
                .ones
                .iter()
                .map(|polynomial| polynomial.map_monomials(substitute))
                .filter(|polynomial| !polynomial.is_one())
                .collect(),
            unknown: self
                .unknown
                .iter()
                .map(|polynomial| polynomial.map_monomials(substitute))
                .filter(|polynomial| !polynomial.is_zero_or_one())
                .collect(),
        };

        pinned.apply(&implied)
    }

    pub fn constrains(&self, variable: Variable) -> bool {
        self.zeros
            .iter()
            .any(|monomial| monomial.has_variable(variable))
            || self
                .ones
                .iter()
                .chain(&self.unknown)
                .any(|polynomial| polynomial.has_variable(variable))
    }

    /// Active variables that no equation mentions any more.
    pub fn free_variables(&self) -> Vec<Variable> {
        self.active_variables()
            .filter(|variable| !self.constrains(*variable))
            .collect()
    }

    /// The first one-term equation `m = 1` with `m` not constant.
    pub fn forced_one(&self) -> Option<Monomial> {
        self.ones
            .iter()
            .filter_map(Polynomial::sole_monomial)
            .find(|monomial| !monomial.is_constant())
    }

    /// The variable of the first equation `v = 0 or 1`.
    pub fn find_unknown_variable(&self) -> Option<Variable> {
        self.unknown
            .iter()
            .filter_map(Polynomial::sole_monomial)
            .find(Monomial::is_linear)
            .and_then(|monomial| monomial.variables().next())
    }

    /// Index of the unknown equation with the fewest monomials, the first
    /// one on ties.
    pub fn shortest_unknown(&self) -> Option<usize> {
        let shortest = self.unknown.iter().map(Polynomial::len).min()?;
        self.unknown
            .iter()
            .position(|polynomial| polynomial.len() == shortest)
    }

    /// Decides the unknown equation at `index` to be `= 0`, which zeroes
    /// every one of its monomials.
    pub fn move_unknown_to_zero(&self, index: usize, paranoid: bool) -> Result<Self> {
        let equation = self.unknown.get(index).ok_or(Error::UnknownEquationOutOfRange {
            index,
            len: self.unknown.len(),
        })?;
        if paranoid && equation.has_constant() {
            return Err(Error::ConstantInZeroedEquation {
                equation: equation.clone(),
            });
        }
        let mut substitution = ZeroSubstitution::new();
        substitution.set_polynomial_zero(equation);
        Ok(self.apply(&substitution))
    }

    /// Decides the unknown equation at `index` to be `= 1`.
    pub fn move_unknown_to_one(&self, index: usize) -> Result<Self> {
        if index >= self.unknown.len() {
            return Err(Error::UnknownEquationOutOfRange {
                index,
                len: self.unknown.len(),
            });
        }
        let mut result = self.clone();
        let equation = result.unknown.remove(index);
        result.ones.push(equation);
        Ok(result)
    }

    /// Checks that every monomial names only active variables and that every
    /// zero-pinned monomial is quadratic.
    pub fn ensure_variable_validity(&self) -> Result<()> {
        for monomial in &self.zeros {
            if !monomial.is_quadratic() {
                return Err(Error::LinearZeroPin {
                    monomial: *monomial,
                });
            }
        }
        let monomials = self.zeros.iter().copied().chain(
            self.ones
                .iter()
                .chain(&self.unknown)
                .flat_map(Polynomial::monomials),
        );
        for monomial in monomials {
            if let Some(variable) = monomial.variables().find(|v| !self.is_active(*v)) {
                return Err(Error::InactiveVariable { variable, monomial });
            }
        }
        Ok(())
    }

    /// Compares the two systems as sets, ignoring the order and repetition
    /// of variables, zeros and equations.
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        fn same_elements<T: PartialEq>(left: &[T], right: &[T]) -> bool {
            left.iter().all(|x| right.contains(x)) && right.iter().all(|x| left.contains(x))
        }

        same_elements(&self.active_ps, &other.active_ps)
            && same_elements(&self.active_qs, &other.active_qs)
            && same_elements(&self.zeros, &other.zeros)
            && same_elements(&self.ones, &other.ones)
            && same_elements(&self.unknown, &other.unknown)
    }

    pub fn display(&self, notation: Notation) -> SystemDisplay<'_> {
        SystemDisplay {
            system: self,
            notation,
        }
    }
}

/// What a split needs from a system: where to branch, and the two cases.
///
/// Implemented by the persistent `EquationSystem`; a packed representation
/// only has to provide these to reuse the branching rules.
pub trait Branching: Sized {
    fn find_unknown_variable(&self) -> Option<Variable>;

    fn zeros(&self) -> &[Monomial];

    fn unknown(&self) -> &[Polynomial];

    fn shortest_unknown(&self) -> Option<usize>;

    fn set_zero(&self, variable: Variable) -> Self;

    fn set_one(&self, variable: Variable) -> Self;

    fn move_unknown_to_zero(&self, index: usize, paranoid: bool) -> Result<Self>;

    fn move_unknown_to_one(&self, index: usize) -> Result<Self>;
}

impl Branching for EquationSystem {
    fn find_unknown_variable(&self) -> Option<Variable> {
        EquationSystem::find_unknown_variable(self)
    }

    fn zeros(&self) -> &[Monomial] {
        EquationSystem::zeros(self)
    }

    fn unknown(&self) -> &[Polynomial] {
        EquationSystem::unknown(self)
    }

    fn shortest_unknown(&self) -> Option<usize> {
        EquationSystem::shortest_unknown(self)
    }

    fn set_zero(&self, variable: Variable) -> Self {
        EquationSystem::set_zero(self, variable)
    }

    fn set_one(&self, variable: Variable) -> Self {
        EquationSystem::set_one(self, variable)
    }

    fn move_unknown_to_zero(&self, index: usize, paranoid: bool) -> Result<Self> {
        EquationSystem::move_unknown_to_zero(self, index, paranoid)
    }

    fn move_unknown_to_one(&self, index: usize) -> Result<Self> {
        EquationSystem::move_unknown_to_one(self, index)
    }
}

/// Plain text and Wolfram put one relation per line. LaTeX writes an
/// `align*` block whose first line comments the active variables.
pub struct SystemDisplay<'a> {
    system: &'a EquationSystem,
    notation: Notation,
}

impl SystemDisplay<'_> {
    fn fmt_latex(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\begin{{align*}}")?;
        for (k, variable) in self.system.active_variables().enumerate() {
            if k == 0 {
                write!(f, " %")?;
            }
            write!(f, " {}", variable.display(Notation::Latex))?;
        }
        for (k, equation) in self.system.equations().enumerate() {
            if k > 0 {
                write!(f, " \\\\")?;
            }
            let aligned = equation
                .display(Notation::Latex)
                .to_string()
                .replacen(" = ", " &= ", 1);
            write!(f, "\n    {aligned}")?;
        }
        writeln!(f, "\n\\end{{align*}}")
    }
}

impl Display for SystemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.notation == Notation::Latex {
            return self.fmt_latex(f);
        }
        for equation in self.system.equations() {
            writeln!(f, "{}", equation.display(self.notation))?;
        }
        Ok(())
    }
}

/// A 0/1 assignment of variables.
#[cfg(test)]
pub(crate) type Assignment = std::collections::BTreeMap<Variable, bool>;

/// Every 0/1 assignment of `variables`.
#[cfg(test)]
pub(crate) fn assignments(variables: Vec<Variable>) -> impl Iterator<Item = Assignment> {
    (0u64..1 << variables.len()).map(move |mask| {
        variables
            .iter()
            .enumerate()
            .map(|(bit, variable)| (*variable, mask >> bit & 1 == 1))
            .collect()
    })
}

#[cfg(test)]
pub(crate) fn evaluate(polynomial: &Polynomial, assignment: &Assignment) -> usize {
    polynomial
        .monomials()
        .filter(|monomial| {
            monomial
                .variables()
                .all(|variable| assignment.get(&variable).copied().unwrap_or(false))
        })
        .count()
}

#[cfg(test)]
impl EquationSystem {
    pub(crate) fn is_satisfied_by(&self, assignment: &Assignment) -> bool {
        self.zeros
            .iter()
            .all(|monomial| evaluate(&Polynomial::from(*monomial), assignment) == 0)
            && self
                .ones
                .iter()
                .all(|polynomial| evaluate(polynomial, assignment) == 1)
            && self
                .unknown
                .iter()
                .all(|polynomial| evaluate(polynomial, assignment) <= 1)
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn polynomial(monomials: &[(VariableIndex, VariableIndex)]) -> Polynomial {
        monomials
            .iter()
            .map(|(p, q)| Monomial::new(*p, *q))
            .collect()
    }

    fn degrees(i: u64, j: u64) -> DegreePair {
        DegreePair::new(i, j).unwrap()
    }

    fn degree_pairs() -> impl Strategy<Value = DegreePair> {
        (2u64..8).prop_flat_map(|i| (Just(i), 1..i)).prop_map(|(i, j)| degrees(i, j))
    }

    #[test]
    fn initial_system_for_two_two() {
        let system = EquationSystem::initial(degrees(2, 2));

        assert_eq!(system.active_ps(), &[1]);
        assert_eq!(system.active_qs(), &[1]);
        assert!(system.zeros().is_empty());
        assert!(system.ones().is_empty());
        assert_eq!(
            system.unknown(),
            &[
                polynomial(&[(1, 0), (0, 1)]),
                polynomial(&[(0, 0), (1, 1), (0, 0)]),
                polynomial(&[(1, 0), (0, 1)]),
            ]
        );
        assert_eq!(system.unknown()[1].constant_count(), 2);
        assert!(system.has_unsatisfiable_equation());
    }

    #[test]
    fn initial_system_for_four_two() {
        let system = EquationSystem::initial(degrees(4, 2));

        assert_eq!(system.active_ps(), &[1, 2, 3]);
        assert_eq!(system.active_qs(), &[1]);
        assert_eq!(
            system.unknown(),
            &[
                polynomial(&[(0, 1), (1, 0)]),
                polynomial(&[(0, 0), (1, 1), (2, 0)]),
                polynomial(&[(1, 0), (2, 1), (3, 0)]),
                polynomial(&[(2, 0), (3, 1), (0, 0)]),
                polynomial(&[(3, 0), (0, 1)]),
            ]
        );
        assert!(!system.has_unsatisfiable_equation());
        assert!(!system.is_solved());
    }

    #[test]
    fn initial_system_for_one_one_has_a_doubled_constant() {
        let system = EquationSystem::initial(degrees(1, 1));

        assert_eq!(system.active_variable_count(), 0);
        assert_eq!(system.unknown(), &[polynomial(&[(0, 0), (0, 0)])]);
        assert!(system.has_unsatisfiable_equation());
    }

    #[test]
    fn empty_ones_equation_is_unsatisfiable() {
        let system =
            EquationSystem::from_parts(vec![1], vec![], vec![], vec![Polynomial::new()], vec![]);
        assert!(system.has_unsatisfiable_equation());
    }

    #[test]
    fn unsatisfiable_systems_have_an_unsatisfiable_equation() {
        let one = polynomial(&[(0, 0)]);
        let doubled = polynomial(&[(0, 0), (0, 0), (1, 0)]);
        let linear = polynomial(&[(1, 0)]);
        let cases = [
            (vec![Polynomial::new()], vec![]),
            (vec![], vec![Polynomial::new()]),
            (vec![one.clone()], vec![one.clone()]),
            (vec![doubled.clone()], vec![]),
            (vec![], vec![doubled]),
            (vec![linear.clone()], vec![linear]),
        ];
        for (ones, unknown) in cases {
            let system = EquationSystem::from_parts(vec![1], vec![], vec![], ones, unknown);
            let expected = system
                .equations()
                .any(|equation| equation.is_unsatisfiable());
            assert_eq!(system.has_unsatisfiable_equation(), expected, "{system:?}");
        }
    }

    #[test]
    fn settled_equations_are_dropped() {
        let one = polynomial(&[(0, 0)]);
        let open = polynomial(&[(1, 0), (0, 1)]);
        let system = EquationSystem::from_parts(
            vec![1],
            vec![1],
            vec![Monomial::new(1, 1)],
            vec![one.clone(), Polynomial::new(), open.clone()],
            vec![Polynomial::new(), one, open.clone()],
        );
        let settled = system.clone().without_settled();
        assert_eq!(settled.zeros(), system.zeros());
        assert_eq!(settled.ones(), [Polynomial::new(), open.clone()]);
        assert_eq!(settled.unknown(), [open]);
        assert!(settled.has_unsatisfiable_equation());
    }

    #[test]
    fn apply_resolves_settled_equations() {
        let system = EquationSystem::from_parts(
            vec![1, 2],
            vec![1],
            vec![Monomial::new(2, 1)],
            vec![polynomial(&[(1, 0), (2, 0)]), polynomial(&[(1, 0)])],
            vec![polynomial(&[(1, 0), (0, 1)]), polynomial(&[(1, 0), (0, 0)])],
        );
        let substitution = ZeroSubstitution::from_iter([Monomial::new(1, 0), Monomial::new(2, 1)]);
        let result = system.apply(&substitution);

        assert_eq!(result.active_ps(), &[2]);
        assert_eq!(result.active_qs(), &[1]);
        assert_eq!(result.zeros(), &[Monomial::new(2, 1)]);
        // p_1 = 1 became 0 = 1 and stays to be reported as a contradiction
        assert_eq!(result.ones(), &[polynomial(&[(2, 0)]), Polynomial::new()]);
        assert_eq!(result.unknown(), &[polynomial(&[(0, 1)])]);
        assert!(result.has_unsatisfiable_equation());
    }

    #[test]
    fn set_one_replaces_monomials_by_co_factors() {
        let system = EquationSystem::from_parts(
            vec![1, 2],
            vec![1, 2],
            vec![Monomial::new(1, 2)],
            vec![polynomial(&[(1, 1), (2, 0)])],
            vec![polynomial(&[(1, 0), (2, 2)]), polynomial(&[(1, 0)])],
        );
        let result = system.set_one(Variable::P(1));

        assert_eq!(result.active_ps(), &[2]);
        // p_1 q_2 = 0 with p_1 = 1 forces q_2 = 0
        assert_eq!(result.active_qs(), &[1]);
        assert!(result.zeros().is_empty());
        assert_eq!(result.ones(), &[polynomial(&[(0, 1), (2, 0)])]);
        // 1 + p_2 q_2 loses p_2 q_2 to q_2 = 0 and becomes the constant 1
        assert!(result.unknown().is_empty());
    }

    #[test]
    fn set_zero_drops_the_variable_everywhere() {
        let system = EquationSystem::initial(degrees(4, 2));
        let result = system.set_zero(Variable::Q(1));

        assert_eq!(result.active_qs(), &[] as &[VariableIndex]);
        assert!(!result.constrains(Variable::Q(1)));
        assert_eq!(result.unknown()[0], polynomial(&[(1, 0)]));
    }

    #[test]
    fn is_solved_accepts_linear_unknowns_and_single_ones() {
        let system = EquationSystem::from_parts(
            vec![1, 2],
            vec![1],
            vec![],
            vec![polynomial(&[(2, 1)])],
            vec![polynomial(&[(1, 0)]), polynomial(&[(1, 0), (0, 1)])],
        );
        assert!(system.is_solved());

        let quadratic_unknown = EquationSystem::from_parts(
            vec![1],
            vec![1],
            vec![],
            vec![],
            vec![polynomial(&[(1, 1)])],
        );
        assert!(!quadratic_unknown.is_solved());
    }

    #[test]
    fn find_unknown_variable_skips_quadratic_equations() {
        let system = EquationSystem::from_parts(
            vec![1],
            vec![1, 2],
            vec![],
            vec![],
            vec![polynomial(&[(1, 1)]), polynomial(&[(0, 2)])],
        );
        assert_eq!(system.find_unknown_variable(), Some(Variable::Q(2)));
    }

    #[test]
    fn shortest_unknown_prefers_first_on_ties() {
        let system = EquationSystem::from_parts(
            vec![1, 2, 3],
            vec![1],
            vec![],
            vec![],
            vec![
                polynomial(&[(1, 0), (2, 0), (3, 0)]),
                polynomial(&[(1, 1), (2, 0)]),
                polynomial(&[(3, 1), (0, 1)]),
            ],
        );
        assert_eq!(system.shortest_unknown(), Some(1));
        assert_eq!(EquationSystem::new().shortest_unknown(), None);
    }

    #[test]
    fn move_unknown_rejects_out_of_range_index() {
        let system = EquationSystem::initial(degrees(4, 2));
        assert!(matches!(
            system.move_unknown_to_one(5),
            Err(Error::UnknownEquationOutOfRange { index: 5, len: 5 })
        ));
        assert!(matches!(
            system.move_unknown_to_zero(7, false),
            Err(Error::UnknownEquationOutOfRange { index: 7, len: 5 })
        ));
    }

    #[test]
    fn move_unknown_to_zero_checks_constants_when_paranoid() {
        let system = EquationSystem::initial(degrees(4, 2));
        assert!(matches!(
            system.move_unknown_to_zero(1, true),
            Err(Error::ConstantInZeroedEquation { .. })
        ));
        assert!(system.move_unknown_to_zero(1, false).is_ok());
    }

    #[test]
    fn move_unknown_to_one_moves_exactly_one_equation() {
        let system = EquationSystem::initial(degrees(4, 2));
        let result = system.move_unknown_to_one(4).unwrap();
        assert_eq!(result.ones(), &[polynomial(&[(3, 0), (0, 1)])]);
        assert_eq!(result.unknown(), &system.unknown()[..4]);
    }

    #[test]
    fn validity_check_reports_inactive_variables() {
        let system = EquationSystem::from_parts(
            vec![1],
            vec![],
            vec![],
            vec![polynomial(&[(1, 2)])],
            vec![],
        );
        assert!(matches!(
            system.ensure_variable_validity(),
            Err(Error::InactiveVariable {
                variable: Variable::Q(2),
                ..
            })
        ));
    }

    #[test]
    fn validity_check_reports_linear_zero_pins() {
        let system =
            EquationSystem::from_parts(vec![1], vec![], vec![Monomial::new(1, 0)], vec![], vec![]);
        assert!(matches!(
            system.ensure_variable_validity(),
            Err(Error::LinearZeroPin { .. })
        ));
    }

    #[test]
    fn free_variables_are_active_but_unmentioned() {
        let system = EquationSystem::from_parts(
            vec![1, 2],
            vec![1],
            vec![],
            vec![polynomial(&[(1, 1)])],
            vec![],
        );
        assert_eq!(system.free_variables(), vec![Variable::P(2)]);
    }

    #[test]
    fn latex_display_aligns_relations() {
        let system = EquationSystem::from_parts(
            vec![1],
            vec![2],
            vec![Monomial::new(1, 2)],
            vec![polynomial(&[(1, 0), (0, 2)])],
            vec![polynomial(&[(0, 2)])],
        );
        assert_eq!(
            system.display(Notation::Latex).to_string(),
            "\\begin{align*} % p_{1} q_{2}\n    \
             p_{1} q_{2} &= 0 \\\\\n    \
             p_{1} + q_{2} &= 1 \\\\\n    \
             q_{2} &= 0 \\text{ or } 1\n\
             \\end{align*}\n"
        );
    }

    #[test]
    fn pins_keep_every_matching_assignment() {
        let system = EquationSystem::initial(degrees(4, 2));
        for variable in system.active_variables() {
            for assignment in assignments(system.active_variables().collect()) {
                if !system.is_satisfied_by(&assignment) {
                    continue;
                }
                let pinned = if assignment[&variable] {
                    system.set_one(variable)
                } else {
                    system.set_zero(variable)
                };
                assert!(pinned.is_satisfied_by(&assignment));
            }
        }
    }

    proptest! {
        #[test]
        fn initial_system_is_valid(degrees in degree_pairs()) {
            let system = EquationSystem::initial(degrees);
            prop_assert!(system.ensure_variable_validity().is_ok());
            prop_assert_eq!(system.unknown().len(), degrees.total() as usize - 1);
            prop_assert_eq!(
                system.active_variable_count(),
                usize::from(degrees.p_degree()) + usize::from(degrees.q_degree()) - 2
            );
        }

        #[test]
        fn pinning_an_active_variable_deactivates_it(degrees in degree_pairs()) {
            let system = EquationSystem::initial(degrees);
            for variable in system.active_variables() {
                let zero = system.set_zero(variable);
                let one = system.set_one(variable);
                prop_assert!(!zero.is_active(variable));
                prop_assert!(!one.is_active(variable));
                prop_assert!(zero.active_variable_count() < system.active_variable_count());
                prop_assert!(one.active_variable_count() < system.active_variable_count());
                prop_assert!(!zero.constrains(variable));
                prop_assert!(!one.constrains(variable));
            }
        }
    }
}
