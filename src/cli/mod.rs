//! The Splice Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions. The binary expands with the standard macro
//! library ([`StdMacros`]).

use std::fs;
use std::path::Path;
use std::process;

use clap::Parser;
use log::LevelFilter;
use termcolor::{ColorChoice, StandardStream};

use crate::cli::args::{Command, SpliceArgs};
use crate::codec;
use crate::config::EngineConfig;
use crate::engine::{discover_sources, MacroEngine};
use crate::macros::{MacroRegistry, RegistryBuilder, StdMacros};
use crate::syntax::Syntax;
use crate::{err_msg, SpliceError};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = SpliceArgs::parse();
    init_logging(args.verbose);

    if let Err(e) = dispatch(args) {
        output::print_error(e);
        process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

fn std_registry() -> MacroRegistry {
    RegistryBuilder::new().provider(StdMacros).build()
}

fn dispatch(args: SpliceArgs) -> Result<(), SpliceError> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut engine = MacroEngine::new(std_registry()).with_config(config);
    let color = if atty::is(atty::Stream::Stdout) {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(color);

    match args.command {
        Command::Expand { file, diff, output: target } => {
            let expanded = engine.expand_file(&file)?;
            if diff {
                let source = read_file(&file)?;
                output::print_diff(&mut stdout, &source, &expanded).map_err(stdout_error)?;
            }
            match target {
                Some(path) => {
                    fs::write(&path, with_newline(&expanded))
                        .map_err(|e| SpliceError::io("write", &path, e))?;
                    log::info!("wrote {}", path.display());
                }
                None if !diff => println!("{}", expanded),
                None => {}
            }
        }

        Command::ExpandDir { dir, ext } => {
            let ext = ext.unwrap_or_else(|| engine.config().extension.clone());
            let prefix = engine.config().expanded_prefix.clone();
            let files = discover_sources(&dir, &ext, &prefix)?;
            for file in &files {
                let (target, _) = engine.write_expanded(file)?;
                println!("{} -> {}", file.display(), target.display());
            }
            println!("expanded {} file(s)", files.len());
        }

        Command::Trace { file } => {
            engine.expand_file(&file)?;
            output::print_trace(&mut stdout, engine.trace()).map_err(stdout_error)?;
        }

        Command::Ast { file, json } => {
            let source = read_file(&file)?;
            let tree = engine
                .syntax()
                .parse_named(&file.display().to_string(), &source)?;
            if json {
                let text = serde_json::to_string_pretty(&tree)
                    .map_err(|e| err_msg!(Internal, "cannot serialize tree").with_cause(e))?;
                println!("{}", text);
            } else {
                println!("{}", tree.pretty());
            }
        }

        Command::Encode { file } => {
            let source = read_file(&file)?;
            let tree = engine
                .syntax()
                .parse_named(&file.display().to_string(), &source)?;
            println!("{}", codec::encode(&tree));
        }

        Command::Decode { file } => {
            let markup = read_file(&file)?;
            let tree = codec::decode(&markup)?;
            println!("{}", engine.syntax().unparse(&tree)?);
        }

        Command::Macros => {
            let keys: Vec<String> = engine
                .registry()
                .keys()
                .into_iter()
                .map(|key| key.to_string())
                .collect();
            output::print_list(&mut stdout, &keys).map_err(stdout_error)?;
        }
    }
    Ok(())
}

// ============================================================================
// HELPER FUNCTIONS - Common patterns extracted
// ============================================================================

fn read_file(path: &Path) -> Result<String, SpliceError> {
    fs::read_to_string(path).map_err(|e| SpliceError::io("read", path, e))
}

fn with_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

fn stdout_error(e: std::io::Error) -> SpliceError {
    err_msg!(Io, "failed to write to stdout").with_cause(e)
}
