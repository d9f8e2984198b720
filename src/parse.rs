use std::{iter::Peekable, str::FromStr};

use thiserror::Error;

use crate::{
    error::{self, Error as CrateError},
    polynomial::{Monomial, Polynomial, Variable, VariableIndex, MAX_DEGREE},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("variable index {0} is out of range")]
    IndexOutOfRange(u64),
    #[error("monomial {0} has two variables of the same family")]
    SameFamily(String),
}

impl FromStr for Polynomial {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        new_parser(tokens(s)?).polynomial()
    }
}

impl FromStr for Monomial {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = new_parser(tokens(s)?);
        let monomial = parser.monomial()?;
        parser.end()?;
        Ok(monomial)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token {
    P,
    Q,
    Underscore,
    Number(u64),
    Star,
    Plus,
    Whitespace,
}

fn tokens(input: &str) -> Result<impl Iterator<Item = Token>, ParseError> {
    let mut tokens = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            'p' => Token::P,
            'q' => Token::Q,
            '_' => Token::Underscore,
            '*' => Token::Star,
            '+' => Token::Plus,
            '0'..='9' => {
                let mut value = u64::from(c as u8 - b'0');
                while let Some(digit) = chars.peek().and_then(|d| d.to_digit(10)) {
                    chars.next();
                    value = value.saturating_mul(10).saturating_add(u64::from(digit));
                }
                Token::Number(value)
            }
            c if c.is_whitespace() => Token::Whitespace,
            c => return Err(ParseError::InvalidCharacter(c)),
        });
    }
    Ok(tokens.into_iter())
}

struct PolynomialParser<I>
where
    I: Iterator<Item = Token>,
{
    tokens: Peekable<I>,
}

fn new_parser<J: Iterator<Item = Token>>(
    iter: J,
) -> PolynomialParser<impl Iterator<Item = Token>> {
    PolynomialParser {
        tokens: iter.filter(|t| t != &Token::Whitespace).peekable(),
    }
}

impl<I> PolynomialParser<I>
where
    I: Iterator<Item = Token>,
{
    fn polynomial(&mut self) -> Result<Polynomial, ParseError> {
        let mut monomials = vec![self.monomial()?];
        while self.tokens.next_if_eq(&Token::Plus).is_some() {
            monomials.push(self.monomial()?);
        }
        self.end()?;
        Ok(Polynomial::from_iter(monomials))
    }

    fn end(&mut self) -> Result<(), ParseError> {
        match self.tokens.next() {
            None => Ok(()),
            Some(token) => Err(ParseError::UnexpectedToken(format!("{token:?}"))),
        }
    }

    fn monomial(&mut self) -> Result<Monomial, ParseError> {
        let mut monomial = self.factor()?;
        while self.tokens.next_if_eq(&Token::Star).is_some() {
            let factor = self.factor()?;
            let clash =
                (monomial.has_p() && factor.has_p()) || (monomial.has_q() && factor.has_q());
            if clash {
                return Err(ParseError::SameFamily(format!("{monomial} * {factor}")));
            }
            monomial = Monomial::new(
                monomial.p_index().max(factor.p_index()),
                monomial.q_index().max(factor.q_index()),
            );
        }
        Ok(monomial)
    }

    fn factor(&mut self) -> Result<Monomial, ParseError> {
        match self.tokens.next() {
            Some(Token::Number(1)) => Ok(Monomial::ONE),
            Some(Token::P) => Ok(Variable::P(self.index()?).into()),
            Some(Token::Q) => Ok(Variable::Q(self.index()?).into()),
            Some(token) => Err(ParseError::UnexpectedToken(format!("{token:?}"))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn index(&mut self) -> Result<VariableIndex, ParseError> {
        match self.tokens.next() {
            Some(Token::Underscore) => {}
            Some(token) => return Err(ParseError::UnexpectedToken(format!("{token:?}"))),
            None => return Err(ParseError::UnexpectedEnd),
        }
        match self.tokens.next() {
            Some(Token::Number(n)) => VariableIndex::try_from(n)
                .ok()
                .filter(|index| (1..=MAX_DEGREE).contains(index))
                .ok_or(ParseError::IndexOutOfRange(n)),
            Some(token) => Err(ParseError::UnexpectedToken(format!("{token:?}"))),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

/// Reads leaf systems written in plain text: one equation `... = 1` per
/// line, every system terminated by a blank line.
pub fn parse_leaf_blocks(text: &str) -> error::Result<Vec<Vec<Polynomial>>> {
    let mut blocks = Vec::new();
    let mut block = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            blocks.push(std::mem::take(&mut block));
            continue;
        }
        let polynomial: Polynomial = line.parse().map_err(|source| CrateError::Parse {
            line: number + 1,
            source,
        })?;
        block.push(polynomial);
    }
    if !block.is_empty() {
        blocks.push(block);
    }
    Ok(blocks)
}
