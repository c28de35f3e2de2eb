//! Command-line interface for merging OpenStreetMap building data.
#![forbid(unsafe_code)]

use std::io::{self, Write};

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use log::info;
use osm_merge_data::XmlElement;

mod error;
mod filter;
mod replace;
mod tag;

pub use error::CliError;

use filter::{FilterArgs, run_filter_with};
use replace::{ReplaceArgs, run_replace_with};
use tag::{TagBuildingsArgs, run_tag_buildings_with};

const ARG_INPUT: &str = "input";
const ARG_OUTPUT: &str = "output";
const ARG_SIMILARITY: &str = "similarity";
const ARG_CANDIDATES: &str = "candidates";
const ARG_CAPACITY: &str = "capacity";
const ARG_MIN_EXTENT: &str = "min-extent";
const ARG_DIFF: &str = "diff";
const ARG_CONTEXT: &str = "context";
const ARG_REGION: &str = "region";
const ENV_REPLACE_INPUT: &str = "OSM_MERGE_CMDS_REPLACE_INPUT";
const ENV_REPLACE_SIMILARITY: &str = "OSM_MERGE_CMDS_REPLACE_SIMILARITY";
const ENV_REPLACE_CANDIDATES: &str = "OSM_MERGE_CMDS_REPLACE_CANDIDATES";
const ENV_FILTER_DIFF: &str = "OSM_MERGE_CMDS_FILTER_DIFF";
const ENV_FILTER_REGION: &str = "OSM_MERGE_CMDS_FILTER_REGION";
const ENV_TAG_INPUT: &str = "OSM_MERGE_CMDS_TAG_BUILDINGS_INPUT";

/// Run the osm-merge CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments are invalid, an input cannot be read,
/// or a command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = io::stdout().lock();
    run_command(cli.command, &mut stdout)
}

fn run_command(command: Command, stdout: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Replace(args) => run_replace_with(args, stdout),
        Command::Filter(args) => run_filter_with(args, stdout),
        Command::TagBuildings(args) => run_tag_buildings_with(args, stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "osm-merge",
    about = "Merge independently surveyed building footprints into OpenStreetMap",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace matching existing buildings with surveyed ones.
    Replace(ReplaceArgs),
    /// Keep the part of a changeset that touches given regions.
    Filter(FilterArgs),
    /// Translate municipal building attributes into OSM tags.
    TagBuildings(TagBuildingsArgs),
}

fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    if path.is_file() {
        Ok(())
    } else if path.exists() {
        Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        })
    } else {
        Err(CliError::MissingSourceFile {
            field,
            path: path.to_path_buf(),
        })
    }
}

/// Write `root` to `output`, or to `stdout` when no output path is set.
fn write_document(
    root: &XmlElement,
    output: Option<&Utf8Path>,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    match output {
        Some(path) => {
            root.write_file(path)?;
            info!("wrote {path}");
        }
        None => {
            root.write_to(&mut *stdout)?;
            writeln!(stdout).map_err(CliError::WriteOutput)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
