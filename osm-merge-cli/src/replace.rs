//! Replace command implementation for the osm-merge CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use osm_merge_core::{CancellationToken, SubdivideOptions, Threshold};
use osm_merge_data::{
    DocumentSource, OsmDocument, ReplaceOptions, XmlElement, edit_document_to_xml,
    replace_buildings,
};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_CANDIDATES, ARG_CAPACITY, ARG_INPUT, ARG_MIN_EXTENT, ARG_OUTPUT, ARG_SIMILARITY, CliError,
    ENV_REPLACE_CANDIDATES, ENV_REPLACE_INPUT, ENV_REPLACE_SIMILARITY, require_existing,
    write_document,
};

/// Largest number of elements a single candidate query may return, matching
/// the node limit of the OSM map API.
pub(crate) const DEFAULT_CAPACITY: usize = 50_000;

/// CLI arguments for the `replace` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "replace",
    long_about = "Pair every surveyed building with the nearest existing \
                 building, delete the existing one when their footprints \
                 overlap enough, and relink relations to the replacement. \
                 The result is a JOSM edit file.",
    about = "Replace matching existing buildings with surveyed ones"
)]
#[ortho_config(prefix = "OSM_MERGE")]
pub(crate) struct ReplaceArgs {
    /// OSM file holding the surveyed buildings.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Minimum footprint overlap, in percent, for two buildings to match.
    #[arg(long = ARG_SIMILARITY, value_name = "percent")]
    #[serde(default)]
    pub(crate) similarity: Option<u32>,
    /// OSM files holding the existing buildings; repeat for several.
    #[arg(long = ARG_CANDIDATES, value_name = "path")]
    #[serde(default)]
    pub(crate) candidates: Option<Vec<Utf8PathBuf>>,
    /// Largest number of elements one candidate query may return.
    #[arg(long = ARG_CAPACITY, value_name = "count")]
    #[serde(default)]
    pub(crate) capacity: Option<usize>,
    /// Smallest query area side, in degrees, before giving up on splitting.
    #[arg(long = ARG_MIN_EXTENT, value_name = "degrees")]
    #[serde(default)]
    pub(crate) min_extent: Option<f64>,
    /// Where to write the edit file; standard output when omitted.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ReplaceArgs {
    pub(crate) fn into_config(self) -> Result<ReplaceConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ReplaceConfig::try_from(merged)
    }
}

/// Resolved `replace` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReplaceConfig {
    pub(crate) input: Utf8PathBuf,
    pub(crate) candidates: Vec<Utf8PathBuf>,
    pub(crate) options: ReplaceOptions,
    pub(crate) capacity: usize,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ReplaceConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.input, ARG_INPUT)?;
        for candidate in &self.candidates {
            require_existing(candidate, ARG_CANDIDATES)?;
        }
        Ok(())
    }
}

impl TryFrom<ReplaceArgs> for ReplaceConfig {
    type Error = CliError;

    fn try_from(args: ReplaceArgs) -> Result<Self, Self::Error> {
        let input = args.input.ok_or(CliError::MissingArgument {
            field: ARG_INPUT,
            env: ENV_REPLACE_INPUT,
        })?;
        let similarity = args.similarity.ok_or(CliError::MissingArgument {
            field: ARG_SIMILARITY,
            env: ENV_REPLACE_SIMILARITY,
        })?;
        let candidates = args
            .candidates
            .filter(|paths| !paths.is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_CANDIDATES,
                env: ENV_REPLACE_CANDIDATES,
            })?;
        let capacity = args.capacity.unwrap_or(DEFAULT_CAPACITY);
        if capacity == 0 {
            return Err(CliError::NotPositive {
                field: ARG_CAPACITY,
            });
        }
        let subdivide = args
            .min_extent
            .map(SubdivideOptions::new)
            .transpose()
            .map_err(|_| CliError::NotPositive {
                field: ARG_MIN_EXTENT,
            })?
            .unwrap_or_default();
        Ok(Self {
            input,
            candidates,
            options: ReplaceOptions {
                threshold: Threshold::new(similarity)?,
                subdivide,
            },
            capacity,
            output: args.output,
        })
    }
}

pub(crate) fn run_replace_with(args: ReplaceArgs, stdout: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    execute_replace(&config, stdout)
}

pub(crate) fn execute_replace(
    config: &ReplaceConfig,
    stdout: &mut dyn Write,
) -> Result<(), CliError> {
    config.validate_sources()?;
    let ours = OsmDocument::read_file(&config.input)?;
    let candidates = config
        .candidates
        .iter()
        .map(|path| XmlElement::read_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    info!(
        "loaded {} with {} candidate files",
        config.input,
        candidates.len()
    );
    let source = DocumentSource::merged(candidates, config.capacity);
    let document =
        replace_buildings(&ours, &source, &config.options, &CancellationToken::new())?;
    write_document(
        &edit_document_to_xml(&document),
        config.output.as_deref(),
        stdout,
    )
}
