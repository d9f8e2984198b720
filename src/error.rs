use std::io;

use thiserror::Error;

use crate::{
    parse::ParseError,
    polynomial::{Monomial, Polynomial, Variable, VariableIndex},
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("degree {value} is out of range, expected 1..={max}")]
    DegreeOutOfRange { value: u64, max: VariableIndex },

    #[error("unknown equation {index} is out of bounds for a system with {len} unknown equations")]
    UnknownEquationOutOfRange { index: usize, len: usize },

    #[error("system contains inactive variable {variable} in {monomial}")]
    InactiveVariable { variable: Variable, monomial: Monomial },

    #[error("found multiple constant terms in a single equation: {equation}")]
    MultipleConstantTerms { equation: Polynomial },

    #[error("zero-pinned monomial {monomial} is not quadratic")]
    LinearZeroPin { monomial: Monomial },

    #[error("equation to set to zero has a constant term: {equation}")]
    ConstantInZeroedEquation { equation: Polynomial },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),

    #[error("parse error on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },

    #[error("leaf archive has an unknown header")]
    IncompatibleArchive,
}

pub type Result<T> = std::result::Result<T, Error>;
