//! OSM XML input and output for osm-merge.
//!
//! Responsibilities:
//! - Read OSM and `osmChange` documents into the entity graph and write them
//!   back.
//! - Render edit documents as JOSM files.
//! - Plan candidate queries against size-limited data sources.
//! - Read region shapes and translate municipal building attributes.
//! - Run the building replacement end to end.
//!
//! Boundaries:
//! - Matching, classification and edit rules live in `osm-merge-core`.
//! - All I/O is blocking and happens on the caller's thread.

#![forbid(unsafe_code)]

mod changeset;
mod error;
mod josm;
mod osm;
mod pipeline;
mod regions;
mod source;
mod xml;

pub use changeset::{changeset_to_xml, parse_changeset, read_changeset};
pub use error::DocumentError;
pub use josm::edit_document_to_xml;
pub use osm::{
    OsmDocument, entity_to_element, is_building, parse_node, parse_relation, parse_tags,
    parse_way, record_to_element, tag_buildings, translate_building_tags,
};
pub use pipeline::{PipelineError, ReplaceOptions, replace_buildings};
pub use regions::{RegionError, parse_region, read_region};
pub use source::{CandidateSource, DocumentSource, FetchError, fetch_candidates};
pub use xml::XmlElement;

/// Name written into the `generator` attribute of every document produced.
pub const GENERATOR: &str = "osm-merge";
