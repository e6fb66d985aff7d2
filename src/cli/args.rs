//! Command-line arguments and subcommands for the `splice` binary.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "splice",
    version,
    about = "Lisp-style macros for a host language, applied by rewriting its syntax tree."
)]
pub struct SpliceArgs {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the fully macro-expanded source of a file.
    Expand {
        #[arg(required = true)]
        file: PathBuf,
        /// Show a line diff between the input and the expansion.
        #[arg(long)]
        diff: bool,
        /// Write the expansion to PATH instead of stdout.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Expand every source file under a directory into prefixed siblings.
    ExpandDir {
        #[arg(required = true)]
        dir: PathBuf,
        /// Source extension to look for; defaults to the configured one.
        #[arg(long)]
        ext: Option<String>,
    },
    /// Show each macro invocation with a diff of call site and replacement.
    Trace {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Show the syntax tree of a file.
    Ast {
        #[arg(required = true)]
        file: PathBuf,
        /// Emit the tree as JSON instead of an s-expression.
        #[arg(long)]
        json: bool,
    },
    /// Encode the syntax tree of a file as markup.
    Encode {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Decode a markup tree and print it as source.
    Decode {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// List every registered macro key.
    Macros,
}
