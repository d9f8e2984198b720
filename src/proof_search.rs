use std::fmt::{self, Display};

use genawaiter::rc::{Co, Gen};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    config::{DegreePair, SolverConfig},
    error::{Error, Result},
    polynomial::{Monomial, Polynomial, Variable},
    simplify::{Outcome, Simplification, Simplifier, Step},
    system::{Branching, EquationSystem},
};

/// Position of a case in the search tree: the branch taken at every
/// ancestor split, `false` for the first case and `true` for the second.
///
/// Displayed as a dotted sequence of `1` and `2`, e.g. `1.2.2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(Vec<bool>);

impl CaseId {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, second: bool) -> Self {
        let mut path = self.0.clone();
        path.push(second);
        Self(path)
    }

    pub fn parent(&self) -> Option<Self> {
        let (_, path) = self.0.split_last()?;
        Some(Self(path.to_vec()))
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, second) in self.0.iter().enumerate() {
            if k > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", if *second { '2' } else { '1' })?;
        }
        Ok(())
    }
}

/// What a split branches on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Branch {
    /// `v = 0 or 1`: first case `v = 0`, second case `v = 1`.
    Variable(Variable),
    /// `p_i q_j = 0`: first case `p_i = 0`, second case `q_j = 0`. Both
    /// cases hold when both factors vanish.
    ZeroProduct(Monomial),
    /// Unknown equation at `index`: first case `= 0`, second case `= 1`.
    Equation { index: usize, equation: Polynomial },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<S = EquationSystem> {
    pub branch: Branch,
    pub cases: [S; 2],
}

/// Chooses how to split a simplified system, or `None` if it is a leaf.
///
/// Candidates in order: the variable of the first equation `v = 0 or 1`,
/// the first vanishing product, the shortest unknown equation.
pub fn split<S: Branching>(system: &S, paranoid: bool) -> Result<Option<Split<S>>> {
    if let Some(variable) = system.find_unknown_variable() {
        return Ok(Some(Split {
            branch: Branch::Variable(variable),
            cases: [system.set_zero(variable), system.set_one(variable)],
        }));
    }

    if let Some(term) = system.zeros().first() {
        let (Some(p), Some(q)) = (term.p_variable(), term.q_variable()) else {
            return Err(Error::LinearZeroPin { monomial: *term });
        };
        return Ok(Some(Split {
            branch: Branch::ZeroProduct(*term),
            cases: [system.set_zero(p), system.set_zero(q)],
        }));
    }

    if let Some(index) = system.shortest_unknown() {
        let cases = [
            system.move_unknown_to_zero(index, paranoid)?,
            system.move_unknown_to_one(index)?,
        ];
        return Ok(Some(Split {
            branch: Branch::Equation {
                index,
                equation: system.unknown()[index].clone(),
            },
            cases,
        }));
    }

    Ok(None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Closure {
    /// Nothing was left to decide.
    Trivial,
    Inconsistent,
    Solved,
}

/// A system that neither simplification nor splitting can reduce further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafSystem {
    pub case: CaseId,
    pub system: EquationSystem,
}

impl LeafSystem {
    /// The equations `... = 1` an external solver has to refute.
    pub fn ones(&self) -> &[Polynomial] {
        self.system.ones()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// A case is entered. Only emitted when narrating.
    Visit { case: CaseId, system: EquationSystem },
    /// A rewrite inside a case. Only emitted when narrating.
    Step { case: CaseId, step: Step },
    Split { case: CaseId, branch: Branch },
    Closed { case: CaseId, closure: Closure },
    Leaf(LeafSystem),
}

/// Explores every case below `system` depth first, first case before second.
///
/// The search is lazy: each call to `next` runs until the following event.
/// An error is yielded as the last item.
pub fn search(
    system: EquationSystem,
    config: SolverConfig,
) -> impl Iterator<Item = Result<SearchEvent>> {
    Gen::new(move |co: Co<Result<SearchEvent>>| async move {
        if let Err(error) = explore(system, config, &co).await {
            co.yield_(Err(error)).await;
        }
    })
    .into_iter()
}

pub fn search_degrees(
    degrees: DegreePair,
    config: SolverConfig,
) -> impl Iterator<Item = Result<SearchEvent>> {
    search(EquationSystem::initial(degrees), config)
}

async fn explore(
    system: EquationSystem,
    config: SolverConfig,
    co: &Co<Result<SearchEvent>>,
) -> Result<()> {
    let simplifier = Simplifier::new(config);
    let mut pending = vec![(CaseId::root(), system)];

    while let Some((case, system)) = pending.pop() {
        if config.narrate {
            co.yield_(Ok(SearchEvent::Visit {
                case: case.clone(),
                system: system.clone(),
            }))
            .await;
        }

        if system.is_empty() {
            co.yield_(Ok(SearchEvent::Closed {
                case,
                closure: Closure::Trivial,
            }))
            .await;
            continue;
        }

        let Simplification { outcome, steps } = simplifier.simplify(system)?;
        for step in steps {
            co.yield_(Ok(SearchEvent::Step {
                case: case.clone(),
                step,
            }))
            .await;
        }

        let system = match outcome {
            Outcome::Inconsistent => {
                co.yield_(Ok(SearchEvent::Closed {
                    case,
                    closure: Closure::Inconsistent,
                }))
                .await;
                continue;
            }
            Outcome::Solved => {
                co.yield_(Ok(SearchEvent::Closed {
                    case,
                    closure: Closure::Solved,
                }))
                .await;
                continue;
            }
            Outcome::Open(system) => system,
        };

        match split(&system, config.paranoid)? {
            Some(Split {
                branch,
                cases: [first, second],
            }) => {
                trace!(%case, ?branch, "split");
                pending.push((case.child(true), second));
                pending.push((case.child(false), first));
                co.yield_(Ok(SearchEvent::Split { case, branch })).await;
            }
            None => {
                let free = system.free_variables();
                if !free.is_empty() {
                    warn!(%case, ?free, "leaf system has unconstrained variables");
                }
                debug!(%case, equations = system.ones().len(), "leaf system");
                co.yield_(Ok(SearchEvent::Leaf(LeafSystem { case, system })))
                    .await;
            }
        }
    }

    Ok(())
}

/// Counts of how the cases of a search were closed, and its leaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub splits: usize,
    pub trivial: usize,
    pub inconsistent: usize,
    pub solved: usize,
    pub leaves: Vec<LeafSystem>,
}

impl SearchSummary {
    pub fn record(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Split { .. } => self.splits += 1,
            SearchEvent::Closed { closure, .. } => match closure {
                Closure::Trivial => self.trivial += 1,
                Closure::Inconsistent => self.inconsistent += 1,
                Closure::Solved => self.solved += 1,
            },
            SearchEvent::Leaf(leaf) => self.leaves.push(leaf),
            SearchEvent::Visit { .. } | SearchEvent::Step { .. } => {}
        }
    }

    /// True if every case was closed without a leaf.
    pub fn is_proof(&self) -> bool {
        self.leaves.is_empty()
    }
}

pub fn collect_leaves(
    events: impl IntoIterator<Item = Result<SearchEvent>>,
) -> Result<SearchSummary> {
    let mut summary = SearchSummary::default();
    for event in events {
        summary.record(event?);
    }
    Ok(summary)
}
