use std::io::Write;
use std::path::Path;

use crate::{
    config::{DegreePair, SolverConfig},
    error::Result,
    log::measure,
    persist::{write_atomic, LeafArchive},
    polynomial::Notation,
    proof::write_proof,
    proof_search::{collect_leaves, search_degrees, SearchEvent, SearchSummary},
};

/// What `render` writes for a degree pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Leaf equations `p_1 * q_2 + q_3`, one per line, a blank line after
    /// every leaf system.
    #[default]
    PlainText,
    /// Leaf equations as `p[1] q[2] + q[3]`, laid out like plain text.
    Wolfram,
    /// A typeset proof.
    Latex,
    /// A bincode `LeafArchive`.
    Binary,
}

impl OutputFormat {
    pub fn narrates(&self) -> bool {
        *self == OutputFormat::Latex
    }

    pub fn notation(&self) -> Notation {
        match self {
            OutputFormat::Wolfram => Notation::Wolfram,
            OutputFormat::Latex => Notation::Latex,
            OutputFormat::PlainText | OutputFormat::Binary => Notation::PlainText,
        }
    }
}

/// Searches the initial system for `degrees` and writes the result to `out`.
pub fn render<W: Write>(
    out: &mut W,
    degrees: DegreePair,
    format: OutputFormat,
    paranoid: bool,
) -> Result<SearchSummary> {
    let config = SolverConfig::default()
        .with_narration(format.narrates())
        .with_paranoia(paranoid);
    let events = search_degrees(degrees, config);

    let summary = match format {
        OutputFormat::Latex => write_proof(out, degrees, events)?,
        OutputFormat::Binary => {
            let summary = collect_leaves(events)?;
            LeafArchive::new(degrees, summary.leaves.clone()).write_to(out)?;
            summary
        }
        OutputFormat::PlainText | OutputFormat::Wolfram => {
            write_leaves(out, format.notation(), events)?
        }
    };

    tracing::debug!(
        %degrees,
        splits = summary.splits,
        leaves = summary.leaves.len(),
        "search finished"
    );
    Ok(summary)
}

/// Writes the "ones" equations of each leaf as soon as the search reaches it.
pub fn write_leaves<W: Write>(
    out: &mut W,
    notation: Notation,
    events: impl IntoIterator<Item = Result<SearchEvent>>,
) -> Result<SearchSummary> {
    let mut summary = SearchSummary::default();
    for event in events {
        let event = event?;
        if let SearchEvent::Leaf(leaf) = &event {
            for equation in leaf.ones() {
                writeln!(out, "{}", equation.display(notation))?;
            }
            writeln!(out)?;
        }
        summary.record(event);
    }
    Ok(summary)
}

/// Renders into memory and replaces `path` only once the search succeeded.
pub fn solve_to_path(
    path: &Path,
    degrees: DegreePair,
    format: OutputFormat,
    paranoid: bool,
) -> Result<SearchSummary> {
    let mut buffer = Vec::new();
    let summary = measure!(render(&mut buffer, degrees, format, paranoid))?;
    write_atomic(path, &buffer)?;
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        parse::parse_leaf_blocks, polynomial::Polynomial, proof_search::search,
        system::EquationSystem,
    };

    /// Two leaves, both `p_2 + q_1 = 1`.
    fn two_leaves() -> EquationSystem {
        EquationSystem::from_parts(
            vec![1, 2],
            vec![1],
            vec![],
            vec![],
            vec!["p_1".parse().unwrap(), "p_2 + q_1".parse().unwrap()],
        )
    }

    fn leaves_text(notation: Notation) -> String {
        let mut out = Vec::new();
        let events = search(two_leaves(), SolverConfig::default());
        let summary = write_leaves(&mut out, notation, events).unwrap();
        assert_eq!(summary.leaves.len(), 2);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_text_leaves_end_with_blank_lines() {
        assert_eq!(leaves_text(Notation::PlainText), "p_2 + q_1\n\np_2 + q_1\n\n");
    }

    #[test]
    fn wolfram_leaves_use_brackets() {
        assert_eq!(leaves_text(Notation::Wolfram), "p[2] + q[1]\n\np[2] + q[1]\n\n");
    }

    #[test]
    fn plain_text_leaves_parse_back() {
        let blocks = parse_leaf_blocks(&leaves_text(Notation::PlainText)).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], vec!["p_2 + q_1".parse::<Polynomial>().unwrap()]);
    }

    #[test]
    fn proofs_without_leaves_print_nothing_in_plain_text() {
        let mut out = Vec::new();
        let degrees = DegreePair::new(4, 2).unwrap();
        let summary = render(&mut out, degrees, OutputFormat::PlainText, true).unwrap();
        assert!(summary.is_proof());
        assert_eq!(summary.splits, 1);
        assert!(out.is_empty());
    }

    #[test]
    fn latex_renders_a_document() {
        let mut out = Vec::new();
        let degrees = DegreePair::new(3, 2).unwrap();
        render(&mut out, degrees, OutputFormat::Latex, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("\\documentclass{article}"));
        assert!(text.contains("\\begin{align*}"));
    }

    #[test]
    fn binary_renders_a_loadable_archive() {
        let mut out = Vec::new();
        let degrees = DegreePair::new(4, 2).unwrap();
        let summary = render(&mut out, degrees, OutputFormat::Binary, false).unwrap();
        let archive = LeafArchive::from_bytes(&out).unwrap();
        assert_eq!(archive.degrees, degrees);
        assert_eq!(archive.leaves, summary.leaves);
    }

    #[test]
    fn solve_to_path_writes_the_rendered_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proof.tex");
        let degrees = DegreePair::new(2, 2).unwrap();

        solve_to_path(&path, degrees, OutputFormat::Latex, true).unwrap();

        let mut expected = Vec::new();
        render(&mut expected, degrees, OutputFormat::Latex, true).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn only_latex_narrates() {
        assert!(OutputFormat::Latex.narrates());
        assert!(!OutputFormat::PlainText.narrates());
        assert_eq!(OutputFormat::Wolfram.notation(), Notation::Wolfram);
        assert_eq!(OutputFormat::default(), OutputFormat::PlainText);
    }
}
