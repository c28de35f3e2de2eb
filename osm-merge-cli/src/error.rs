//! Error types emitted by the osm-merge CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use osm_merge_core::ThresholdError;
use osm_merge_data::{DocumentError, PipelineError, RegionError};
use thiserror::Error;

/// Errors emitted by the osm-merge CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// The similarity threshold is out of range.
    #[error("invalid --similarity: {0}")]
    InvalidThreshold(#[from] ThresholdError),
    /// A numeric option must be strictly positive.
    #[error("--{field} must be greater than zero")]
    NotPositive { field: &'static str },
    /// An OSM document could not be read or written.
    #[error(transparent)]
    Document(#[from] DocumentError),
    /// A region file could not be read.
    #[error(transparent)]
    Region(#[from] RegionError),
    /// The replacement pipeline failed.
    #[error("replacement failed: {0}")]
    Pipeline(#[from] PipelineError),
    /// Writing to standard output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
