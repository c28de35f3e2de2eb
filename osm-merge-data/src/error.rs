//! Errors raised while reading and writing OSM documents.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading, interpreting or writing an OSM document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be opened or read.
    #[error("failed to read OSM document at {path}")]
    Read {
        /// Location of the document.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The document could not be written.
    #[error("failed to write OSM document to {path}")]
    Write {
        /// Destination of the document.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The bytes are not well-formed XML.
    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// The XML is well formed but does not describe valid OSM data.
    #[error("malformed {element}: {reason}")]
    Malformed {
        /// Description of the offending element, e.g. `node 12`.
        element: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl DocumentError {
    pub(crate) fn malformed(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            element: element.into(),
            reason: reason.into(),
        }
    }
}
