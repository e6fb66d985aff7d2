//! Handles all user-facing output for the CLI.
//!
//! Every printer writes to a [`WriteColor`] so the same code drives the
//! terminal and in-memory buffers.

use std::io::{self, Write};

use difference::{Changeset, Difference};
use miette::Report;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::macros::ExpansionStep;
use crate::SpliceError;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints each expansion step as a diff from the call site to its replacement.
pub fn print_trace<W: WriteColor>(out: &mut W, trace: &[ExpansionStep]) -> io::Result<()> {
    if trace.is_empty() {
        writeln!(out, "(no macro calls)")?;
        return Ok(());
    }
    for (i, step) in trace.iter().enumerate() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
        writeln!(out, "--- Step {}: {} ---", i, step.key)?;
        out.reset()?;
        let call_site = format!("{}({})", step.key, step.arguments.join(", "));
        print_diff(out, &call_site, &step.output)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Prints a line diff from `before` to `after`.
pub fn print_diff<W: WriteColor>(out: &mut W, before: &str, after: &str) -> io::Result<()> {
    let changeset = Changeset::new(before, after, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(ref x) => {
                out.reset()?;
                write_lines(out, ' ', x)?;
            }
            Difference::Add(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                write_lines(out, '+', x)?;
            }
            Difference::Rem(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                write_lines(out, '-', x)?;
            }
        }
    }
    out.reset()
}

pub fn print_list<W: Write>(out: &mut W, items: &[String]) -> io::Result<()> {
    if items.is_empty() {
        writeln!(out, "  No items found.")?;
    }
    for item in items {
        writeln!(out, "  {}", item)?;
    }
    Ok(())
}

pub fn print_error(error: SpliceError) {
    let report = Report::new(error);
    eprintln!("{report:?}");
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

// A diff chunk may span several lines; mark each one.
fn write_lines<W: Write>(out: &mut W, mark: char, chunk: &str) -> io::Result<()> {
    for line in chunk.lines() {
        writeln!(out, "{}{}", mark, line)?;
    }
    Ok(())
}
