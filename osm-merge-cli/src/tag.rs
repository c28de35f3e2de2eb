//! Tag-buildings command implementation for the osm-merge CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm_merge_data::{XmlElement, tag_buildings};
use serde::{Deserialize, Serialize};

use crate::{ARG_INPUT, CliError, ENV_TAG_INPUT, require_existing, write_document};

/// CLI arguments for the `tag-buildings` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "tag-buildings",
    long_about = "Add OSM tags derived from municipal building attributes \
                 (BldgName, BldgAddres, City, Zip) to every way and relation \
                 of an OSM file.",
    about = "Translate municipal building attributes into OSM tags"
)]
#[ortho_config(prefix = "OSM_MERGE")]
pub(crate) struct TagBuildingsArgs {
    /// OSM file to tag.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Where to write the tagged file; standard output when omitted.
    #[arg(long = crate::ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TagBuildingsArgs {
    pub(crate) fn into_config(self) -> Result<TagBuildingsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TagBuildingsConfig::try_from(merged)
    }
}

/// Resolved `tag-buildings` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TagBuildingsConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<TagBuildingsArgs> for TagBuildingsConfig {
    type Error = CliError;

    fn try_from(args: TagBuildingsArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_TAG_INPUT,
        })?;
        Ok(Self {
            input,
            output: args.output,
        })
    }
}

pub(crate) fn run_tag_buildings_with(
    args: TagBuildingsArgs,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_tag_buildings(&config, stdout)
}

pub(crate) fn execute_tag_buildings(
    config: &TagBuildingsConfig,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    require_existing(&config.input, ARG_INPUT)?;
    let mut document = XmlElement::read_file(&config.input)?;
    let tagged = tag_buildings(&mut document)?;
    info!("tagged {tagged} elements of {}", config.input);
    write_document(&document, config.output.as_deref(), stdout)
}
