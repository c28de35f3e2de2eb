//! Filter command implementation for the osm-merge CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm_merge_data::{changeset_to_xml, read_changeset, read_region};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CONTEXT, ARG_DIFF, ARG_OUTPUT, ARG_REGION, CliError, ENV_FILTER_DIFF, ENV_FILTER_REGION,
    require_existing, write_document,
};

/// CLI arguments for the `filter` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "filter",
    long_about = "Read an osmChange file, resolving node coordinates from \
                 the context extracts, and keep only the entities that touch \
                 at least one of the regions given as WKT files.",
    about = "Keep the part of a changeset that touches given regions"
)]
#[ortho_config(prefix = "OSM_MERGE")]
pub(crate) struct FilterArgs {
    /// The osmChange file to filter.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) diff: Option<Utf8PathBuf>,
    /// OSM extracts supplying node coordinates; earlier files win.
    #[arg(long = ARG_CONTEXT, value_name = "path")]
    #[serde(default)]
    pub(crate) context: Option<Vec<Utf8PathBuf>>,
    /// WKT files, each holding one region polygon.
    #[arg(long = ARG_REGION, value_name = "path")]
    #[serde(default)]
    pub(crate) region: Option<Vec<Utf8PathBuf>>,
    /// Where to write the filtered changeset; standard output when omitted.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl FilterArgs {
    pub(crate) fn into_config(self) -> Result<FilterConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FilterConfig::try_from(merged)
    }
}

/// Resolved `filter` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilterConfig {
    pub(crate) diff: Utf8PathBuf,
    pub(crate) contexts: Vec<Utf8PathBuf>,
    pub(crate) regions: Vec<Utf8PathBuf>,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl FilterConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.diff, ARG_DIFF)?;
        for context in &self.contexts {
            require_existing(context, ARG_CONTEXT)?;
        }
        for region in &self.regions {
            require_existing(region, ARG_REGION)?;
        }
        Ok(())
    }
}

impl TryFrom<FilterArgs> for FilterConfig {
    type Error = CliError;

    fn try_from(args: FilterArgs) -> Result<Self, Self::Error> {
        let diff = args.diff.ok_or(CliError::MissingArgument {
            field: ARG_DIFF,
            env: ENV_FILTER_DIFF,
        })?;
        let regions = args
            .region
            .filter(|paths| !paths.is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_REGION,
                env: ENV_FILTER_REGION,
            })?;
        Ok(Self {
            diff,
            contexts: args.context.unwrap_or_default(),
            regions,
            output: args.output,
        })
    }
}

pub(crate) fn run_filter_with(args: FilterArgs, stdout: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_filter(&config, stdout)
}

pub(crate) fn execute_filter(config: &FilterConfig, stdout: &mut dyn Write) -> Result<(), CliError> {
    config.validate_sources()?;
    let changeset = read_changeset(&config.diff, &config.contexts)?;
    let mut regions = Vec::new();
    for path in &config.regions {
        regions.extend(read_region(path)?);
    }
    let filtered = changeset.intersecting(&regions);
    info!(
        "{} of {} entities touch the {} regions",
        filtered.len(),
        changeset.len(),
        regions.len()
    );
    write_document(&changeset_to_xml(&filtered), config.output.as_deref(), stdout)
}
