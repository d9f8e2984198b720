//! Case analysis for the 0-1 Polynomial Conjecture.
//!
//! For degrees `(i, j)` the coefficients of `P(x) Q(x)` give a system of
//! equations in the unknown coefficients `p_k` of `P` and `q_k` of `Q`.
//! [`search`](proof_search::search) simplifies and splits that system until
//! every case is either contradictory, constrained to `{0, 1}`, or a leaf
//! left to a Groebner basis computation.

pub mod batch;
pub mod canon;
pub mod config;
pub mod equation;
pub mod error;
mod log;
mod multiset;
pub mod parse;
pub mod persist;
pub mod polynomial;
pub mod proof;
pub mod proof_search;
pub mod report;
pub mod simplify;
pub mod substitution;
pub mod system;

pub use config::{DegreePair, SolverConfig};
pub use error::{Error, Result};
pub use polynomial::{Monomial, Notation, Polynomial, Variable};
pub use proof_search::{search, search_degrees, SearchEvent, SearchSummary};
pub use report::{render, solve_to_path, OutputFormat};
pub use simplify::{Outcome, Simplifier};
pub use system::EquationSystem;
