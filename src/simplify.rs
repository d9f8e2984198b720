use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::SolverConfig,
    equation::Equation,
    error::{Error, Result},
    polynomial::{Monomial, Notation},
    substitution::ZeroSubstitution,
    system::EquationSystem,
};

/// Where simplification of a system ends up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Some equation has no solution in `[0, 1]`.
    Inconsistent,
    /// Every remaining solution is `{0, 1}`-valued.
    Solved,
    /// No rule applies any more.
    Open(EquationSystem),
}

/// A single rewrite performed by the simplifier, kept for narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Inconsistent,
    /// Every active variable is constrained to `{0, 1}` directly.
    Constrained,
    /// The equation `monomial = 1` pinned each of its variables to one.
    PinnedToOne {
        monomial: Monomial,
        system: EquationSystem,
    },
    /// Every equation holding a constant term had its other monomials zeroed.
    ZeroedByConstant {
        equations: Vec<Equation>,
        substitution: ZeroSubstitution,
        system: EquationSystem,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simplification {
    pub outcome: Outcome,
    /// Empty unless narration is enabled.
    pub steps: Vec<Step>,
}

/// Rewrites a system to a fixed point.
///
/// Rules are tried in a fixed order on every round: contradiction, fully
/// constrained, forced one, constant elimination. The first one that applies
/// is performed and the round restarts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Simplifier {
    config: SolverConfig,
}

impl Simplifier {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn simplify(&self, mut system: EquationSystem) -> Result<Simplification> {
        let mut steps = Vec::new();

        let outcome = loop {
            system = system.without_settled();
            if self.config.paranoid {
                system.ensure_variable_validity()?;
            }

            if system.has_unsatisfiable_equation() {
                trace!("inconsistent system");
                self.record(&mut steps, || Step::Inconsistent);
                break Outcome::Inconsistent;
            }

            if system.is_solved() {
                trace!("every variable constrained to 0 or 1");
                self.record(&mut steps, || Step::Constrained);
                break Outcome::Solved;
            }

            if let Some(monomial) = system.forced_one() {
                let result = monomial
                    .variables()
                    .fold(system, |pinned, variable| pinned.set_one(variable));
                trace!(%monomial, "pinned to one");
                self.record(&mut steps, || Step::PinnedToOne {
                    monomial,
                    system: result.clone(),
                });
                if result.is_empty() {
                    break Outcome::Solved;
                }
                system = result;
                continue;
            }

            let mut substitution = ZeroSubstitution::new();
            let mut equations = Vec::new();
            for equation in system.equations().filter(|e| e.left.has_constant()) {
                if self.config.paranoid && equation.left.constant_count() > 1 {
                    return Err(Error::MultipleConstantTerms {
                        equation: equation.left,
                    });
                }
                substitution.set_polynomial_zero(&equation.left);
                equations.push(equation);
            }

            if substitution.is_empty() {
                break Outcome::Open(system);
            }

            let result = system.apply(&substitution);
            trace!(
                substitution = %substitution.display(Notation::PlainText, true),
                "zeroed by constant terms"
            );
            self.record(&mut steps, || Step::ZeroedByConstant {
                equations,
                substitution,
                system: result.clone(),
            });
            if result.is_empty() {
                break Outcome::Solved;
            }
            system = result;
        };

        Ok(Simplification { outcome, steps })
    }

    fn record(&self, steps: &mut Vec<Step>, step: impl FnOnce() -> Step) {
        if self.config.narrate {
            steps.push(step());
        }
    }
}
