use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    polynomial::{VariableIndex, MAX_DEGREE},
};

/// Degrees `(deg P, deg Q)` of the two factor polynomials, both in
/// `1..=MAX_DEGREE`. Decoding checks the range as `new` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(
    try_from = "(VariableIndex, VariableIndex)",
    into = "(VariableIndex, VariableIndex)"
)]
pub struct DegreePair {
    p_degree: VariableIndex,
    q_degree: VariableIndex,
}

impl DegreePair {
    pub fn new(p_degree: u64, q_degree: u64) -> Result<Self> {
        Ok(Self {
            p_degree: Self::validate(p_degree)?,
            q_degree: Self::validate(q_degree)?,
        })
    }

    fn validate(degree: u64) -> Result<VariableIndex> {
        VariableIndex::try_from(degree)
            .ok()
            .filter(|degree| (1..=MAX_DEGREE).contains(degree))
            .ok_or(Error::DegreeOutOfRange {
                value: degree,
                max: MAX_DEGREE,
            })
    }

    pub fn p_degree(&self) -> VariableIndex {
        self.p_degree
    }

    pub fn q_degree(&self) -> VariableIndex {
        self.q_degree
    }

    pub fn total(&self) -> u32 {
        u32::from(self.p_degree) + u32::from(self.q_degree)
    }
}

impl TryFrom<(VariableIndex, VariableIndex)> for DegreePair {
    type Error = Error;

    fn try_from((p_degree, q_degree): (VariableIndex, VariableIndex)) -> Result<Self> {
        Self::new(u64::from(p_degree), u64::from(q_degree))
    }
}

impl From<DegreePair> for (VariableIndex, VariableIndex) {
    fn from(degrees: DegreePair) -> Self {
        (degrees.p_degree, degrees.q_degree)
    }
}

impl Display for DegreePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.p_degree, self.q_degree)
    }
}

/// Switches threaded through the simplifier and the search driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Record every visited system and rewrite step for the typeset proof.
    pub narrate: bool,
    /// Check variable and constant-term invariants on every system; any
    /// violation aborts the search.
    pub paranoid: bool,
}

impl SolverConfig {
    pub fn with_narration(self, narrate: bool) -> Self {
        Self { narrate, ..self }
    }

    pub fn with_paranoia(self, paranoid: bool) -> Self {
        Self { paranoid, ..self }
    }
}
