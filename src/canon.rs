use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{self, Display};

use crate::polynomial::{Polynomial, Variable};

/// A variable of a leaf system before or after canonical renaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    P(u32),
    Q(u32),
    X(u32),
}

impl From<Variable> for Symbol {
    fn from(variable: Variable) -> Self {
        match variable {
            Variable::P(index) => Symbol::P(index.into()),
            Variable::Q(index) => Symbol::Q(index.into()),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::P(index) => write!(f, "p_{index}"),
            Symbol::Q(index) => write!(f, "q_{index}"),
            Symbol::X(index) => write!(f, "x_{index}"),
        }
    }
}

type Term = Vec<Symbol>;
type Equation = Vec<Term>;

/// Leaf equations `... = 1` with variables renamed to `x_1, x_2, ...` so
/// that systems differing only by a renaming of variables compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalSystem(Vec<Equation>);

impl CanonicalSystem {
    pub fn from_equations<'a>(equations: impl IntoIterator<Item = &'a Polynomial>) -> Self {
        let system = equations
            .into_iter()
            .map(|polynomial| {
                polynomial
                    .monomials()
                    .map(|monomial| monomial.variables().map(Symbol::from).collect())
                    .collect()
            })
            .collect();
        Self(system).canonize()
    }

    /// Sorting terms and equations, then renaming variables by first
    /// appearance, repeated until nothing changes. A renaming cycle settles
    /// on the smallest system of the cycle.
    fn canonize(self) -> Self {
        let mut system = self.sorted().renamed().sorted();
        let mut seen = HashSet::new();
        loop {
            let next = system.renamed().sorted();
            if next == system {
                return system;
            }
            if !seen.insert(system.clone()) {
                return system.cycle_minimum();
            }
            system = next;
        }
    }

    fn cycle_minimum(self) -> Self {
        let mut smallest = self.clone();
        let mut current = self.renamed().sorted();
        while current != self {
            if current < smallest {
                smallest = current.clone();
            }
            current = current.renamed().sorted();
        }
        smallest
    }

    /// Linear terms first, then quadratic terms, each term and each group in
    /// order; equations ordered by their number of quadratic and linear
    /// terms, then by their terms.
    fn sorted(&self) -> Self {
        let mut tagged: Vec<((usize, usize), Equation)> = self
            .0
            .iter()
            .map(|equation| {
                let mut linear: Vec<Term> = Vec::new();
                let mut quadratic: Vec<Term> = Vec::new();
                for term in equation {
                    let mut term = term.clone();
                    term.sort();
                    if term.len() == 2 {
                        quadratic.push(term);
                    } else {
                        linear.push(term);
                    }
                }
                linear.sort();
                quadratic.sort();
                let tag = (quadratic.len(), linear.len());
                linear.extend(quadratic);
                (tag, linear)
            })
            .collect();
        tagged.sort();
        Self(tagged.into_iter().map(|(_, equation)| equation).collect())
    }

    fn renamed(&self) -> Self {
        let mut names: BTreeMap<Symbol, Symbol> = BTreeMap::new();
        for symbol in self.symbols_in_order() {
            let next = names.len() as u32 + 1;
            names.entry(symbol).or_insert(Symbol::X(next));
        }
        Self(
            self.0
                .iter()
                .map(|equation| {
                    equation
                        .iter()
                        .map(|term| term.iter().map(|symbol| names[symbol]).collect())
                        .collect()
                })
                .collect(),
        )
    }

    fn symbols_in_order(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().flatten().flatten().copied()
    }

    pub fn variables(&self) -> BTreeSet<Symbol> {
        self.symbols_in_order().collect()
    }

    /// A Macaulay2 script printing `0` exactly when the equations have no
    /// common complex solution.
    pub fn macaulay_script(&self) -> String {
        let variables = self
            .variables()
            .iter()
            .map(Symbol::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let ideal = self
            .0
            .iter()
            .map(|equation| {
                let sum = equation
                    .iter()
                    .map(|term| match &term[..] {
                        [] => "1".to_string(),
                        symbols => symbols
                            .iter()
                            .map(Symbol::to_string)
                            .collect::<Vec<_>>()
                            .join("*"),
                    })
                    .collect::<Vec<_>>()
                    .join(" + ");
                format!("{sum} - 1")
            })
            .collect::<Vec<_>>()
            .join(", ");
        format!("R = QQ[{variables}]\nI = ideal({ideal})\nprint(1 % I)\n")
    }
}

/// Canonizes each system and keeps the first occurrence of every class.
pub fn deduplicate(systems: impl IntoIterator<Item = Vec<Polynomial>>) -> Vec<CanonicalSystem> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for system in systems {
        let canonical = CanonicalSystem::from_equations(&system);
        if seen.insert(canonical.clone()) {
            unique.push(canonical);
        }
    }
    unique
}

#[cfg(test)]
mod test {
    use super::*;

    fn system(lines: &[&str]) -> Vec<Polynomial> {
        lines.iter().map(|line| line.parse().unwrap()).collect()
    }

    #[test]
    fn renaming_follows_first_appearance_after_sorting() {
        let canonical = CanonicalSystem::from_equations(&system(&["p_3 * q_2 + p_5", "q_2"]));
        assert_eq!(
            canonical,
            CanonicalSystem(vec![
                vec![vec![Symbol::X(1)]],
                vec![vec![Symbol::X(2)], vec![Symbol::X(1), Symbol::X(3)]],
            ])
        );
    }

    #[test]
    fn renamed_systems_are_equal() {
        let left = CanonicalSystem::from_equations(&system(&["p_1 + q_1", "p_1 * q_2 + p_2"]));
        let right = CanonicalSystem::from_equations(&system(&["p_2 * q_1 + p_3", "p_2 + q_4"]));
        assert_eq!(left, right);
    }

    #[test]
    fn different_shapes_stay_apart() {
        let left = CanonicalSystem::from_equations(&system(&["p_1 + q_1"]));
        let right = CanonicalSystem::from_equations(&system(&["p_1 * q_1"]));
        assert_ne!(left, right);
    }

    #[test]
    fn canonizing_twice_changes_nothing() {
        let canonical = CanonicalSystem::from_equations(&system(&[
            "p_1 * q_2 + p_3 * q_1 + q_3",
            "p_1 + p_3 * q_2",
            "q_1 + q_2 + q_3",
        ]));
        assert_eq!(canonical.clone().canonize(), canonical);
    }

    #[test]
    fn deduplicate_keeps_first_of_each_class() {
        let systems = vec![
            system(&["p_1 + q_1"]),
            system(&["p_2 + q_3"]),
            system(&["p_1 * q_1"]),
        ];
        let unique = deduplicate(systems);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0], CanonicalSystem::from_equations(&system(&["p_4 + q_4"])));
    }

    #[test]
    fn macaulay_script_lists_variables_and_ideal() {
        let canonical = CanonicalSystem::from_equations(&system(&["p_3 * q_2 + p_5", "q_2"]));
        assert_eq!(
            canonical.macaulay_script(),
            "R = QQ[x_1, x_2, x_3]\nI = ideal(x_1 - 1, x_2 + x_1*x_3 - 1)\nprint(1 % I)\n"
        );
    }
}
