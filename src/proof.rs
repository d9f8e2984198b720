use std::io::Write;

use crate::{
    config::DegreePair,
    equation::{Equation, RightHandSide},
    error::Result,
    polynomial::{Monomial, Notation, Variable},
    proof_search::{Branch, CaseId, SearchEvent, SearchSummary},
    simplify::Step,
    system::EquationSystem,
};

const ZERO_ONE_VALUED: &str = "$\\{0, 1\\}$-valued solutions";

/// Typesets a search as a LaTeX proof of the conjecture for `degrees`.
///
/// The events must come from a narrating search of the initial system for
/// `degrees`; the document is complete even when leaves remain, each one
/// marked as left to a Groebner basis calculation.
pub fn write_proof<W: Write>(
    out: &mut W,
    degrees: DegreePair,
    events: impl IntoIterator<Item = Result<SearchEvent>>,
) -> Result<SearchSummary> {
    ProofWriter { out }.write(degrees, events)
}

struct ProofWriter<'a, W: Write> {
    out: &'a mut W,
}

impl<W: Write> ProofWriter<'_, W> {
    fn write(
        &mut self,
        degrees: DegreePair,
        events: impl IntoIterator<Item = Result<SearchEvent>>,
    ) -> Result<SearchSummary> {
        self.preamble(degrees)?;
        let mut summary = SearchSummary::default();
        for event in events {
            let event = event?;
            self.event(&event)?;
            summary.record(event);
        }
        writeln!(self.out, "\n\\end{{document}}")?;
        Ok(summary)
    }

    fn preamble(&mut self, degrees: DegreePair) -> Result<()> {
        let (i, j) = (degrees.p_degree(), degrees.q_degree());
        writeln!(self.out, "\\documentclass{{article}}\n")?;
        writeln!(self.out, "\\usepackage{{amsmath}}")?;
        writeln!(self.out, "\\usepackage[margin=0.5in, includefoot]{{geometry}}")?;
        writeln!(self.out, "\\usepackage{{parskip}}\n")?;
        writeln!(self.out, "\\begin{{document}}\n")?;
        writeln!(
            self.out,
            "\\textbf{{Theorem:}} The 0--1 Polynomial Conjecture holds \
             when $(\\deg P, \\deg Q) = ({i}, {j})$.\n"
        )?;
        write!(self.out, "\\textit{{Proof:}} Let $P(x) = 1")?;
        for k in 1..i {
            write!(self.out, " + p_{{{k}}} x^{{{k}}}")?;
        }
        write!(self.out, " + x^{{{i}}}$ and $Q(x) = 1")?;
        for k in 1..j {
            write!(self.out, " + q_{{{k}}} x^{{{k}}}")?;
        }
        writeln!(
            self.out,
            " + x^{{{j}}}$. If $P(x) Q(x)$ is a 0--1 polynomial, \
             then the following system of equations holds:"
        )?;
        self.system(&EquationSystem::initial(degrees))?;
        writeln!(
            self.out,
            "We must show that all nonnegative solutions of this \
             system of equations are $\\{{0, 1\\}}$-valued.\n"
        )?;
        Ok(())
    }

    fn system(&mut self, system: &EquationSystem) -> Result<()> {
        write!(self.out, "{}", system.display(Notation::Latex))?;
        Ok(())
    }

    fn event(&mut self, event: &SearchEvent) -> Result<()> {
        match event {
            // the initial system is part of the preamble
            SearchEvent::Visit { case, .. } if case.is_root() => {}
            SearchEvent::Visit { case, system } => {
                write!(self.out, "\n\\textbf{{Case {case}:}}")?;
                if system.is_empty() {
                    writeln!(self.out, " This case is trivial.")?;
                } else {
                    writeln!(
                        self.out,
                        " In this case, we have the following system of equations:"
                    )?;
                    self.system(system)?;
                }
            }
            SearchEvent::Step { step, .. } => self.step(step)?,
            SearchEvent::Split { case, branch } => self.split(case, branch)?,
            SearchEvent::Closed { .. } => {}
            SearchEvent::Leaf(_) => writeln!(
                self.out,
                "It remains to be shown via a Groebner basis calculation \
                 that this system of equations has no solutions."
            )?,
        }
        Ok(())
    }

    fn step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Inconsistent => writeln!(
                self.out,
                "This system of equations is inconsistent and has no solutions."
            )?,
            Step::Constrained => writeln!(
                self.out,
                "Every variable in this system of equations is directly \
                 constrained to values in $\\{{0, 1\\}}$."
            )?,
            Step::PinnedToOne { monomial, system } => self.pinned_to_one(*monomial, system)?,
            Step::ZeroedByConstant {
                equations,
                substitution,
                system,
            } => {
                self.equation_list(equations)?;
                write!(
                    self.out,
                    ", we may conclude that ${}$.",
                    substitution.display(Notation::Latex, !system.is_empty())
                )?;
                if system.is_empty() {
                    writeln!(
                        self.out,
                        " This is the unique solution of this system of equations."
                    )?;
                } else {
                    writeln!(
                        self.out,
                        " This simplifies the preceding system of equations to the following:"
                    )?;
                    self.system(system)?;
                }
            }
        }
        Ok(())
    }

    fn pinned_to_one(&mut self, monomial: Monomial, system: &EquationSystem) -> Result<()> {
        let latex = |variable: Variable| variable.display(Notation::Latex);
        match (monomial.p_variable(), monomial.q_variable()) {
            (Some(p), Some(q)) => {
                write!(
                    self.out,
                    "From the equation ${} = 1$, we may conclude that ${} = 1$ and ${} = 1$.",
                    monomial.display(Notation::Latex),
                    latex(p),
                    latex(q)
                )?;
                if system.is_empty() {
                    writeln!(
                        self.out,
                        " After performing these substitutions, it is straightforward \
                         to verify that the resulting system of equations only admits \
                         {ZERO_ONE_VALUED}."
                    )?;
                } else {
                    writeln!(
                        self.out,
                        " Performing these substitutions yields the following system of equations:"
                    )?;
                    self.system(system)?;
                }
            }
            (Some(v), None) | (None, Some(v)) => {
                if system.is_empty() {
                    writeln!(
                        self.out,
                        "After performing the substitution ${} = 1$, it is straightforward \
                         to verify that the resulting system of equations only admits \
                         {ZERO_ONE_VALUED}.",
                        latex(v)
                    )?;
                } else {
                    writeln!(
                        self.out,
                        "Performing the substitution ${} = 1$ yields the following \
                         system of equations:",
                        latex(v)
                    )?;
                    self.system(system)?;
                }
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// `From the equation $a$`, `From the equations $a$ and $b$` or
    /// `From the equations $a$, $b$, and $c$`.
    fn equation_list(&mut self, equations: &[Equation]) -> Result<()> {
        let noun = if equations.len() == 1 { "equation" } else { "equations" };
        write!(self.out, "From the {noun} ")?;
        for (k, equation) in equations.iter().enumerate() {
            if k > 0 {
                let separator = match (equations.len(), k + 1 == equations.len()) {
                    (2, _) => " and ",
                    (_, true) => ", and ",
                    (_, false) => ", ",
                };
                write!(self.out, "{separator}")?;
            }
            write!(self.out, "${}$", equation.display(Notation::Latex))?;
        }
        Ok(())
    }

    fn split(&mut self, case: &CaseId, branch: &Branch) -> Result<()> {
        let (condition, first, second) = match branch {
            Branch::Variable(variable) => {
                let equation = Equation::new(Monomial::from(*variable), RightHandSide::ZeroOrOne);
                let variable = variable.display(Notation::Latex);
                (
                    equation.display(Notation::Latex).to_string(),
                    format!("{variable} = 0"),
                    format!("{variable} = 1"),
                )
            }
            Branch::ZeroProduct(term) => {
                let factor = |variable: Option<Variable>| {
                    variable.map_or_else(String::new, |v| v.display(Notation::Latex).to_string())
                };
                (
                    Equation::zero(*term).display(Notation::Latex).to_string(),
                    format!("{} = 0", factor(term.p_variable())),
                    format!("{} = 0", factor(term.q_variable())),
                )
            }
            Branch::Equation { equation, .. } => {
                let left = equation.display(Notation::Latex);
                (
                    Equation::new(equation.clone(), RightHandSide::ZeroOrOne)
                        .display(Notation::Latex)
                        .to_string(),
                    format!("{left} = 0"),
                    format!("{left} = 1"),
                )
            }
        };
        writeln!(
            self.out,
            "We consider two cases based on the equation ${condition}$, which implies \
             ${first}$ (Case {}) or ${second}$ (Case {}).",
            case.child(false),
            case.child(true)
        )?;
        Ok(())
    }
}
