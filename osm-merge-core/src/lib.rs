//! Core model for merging independently sourced OpenStreetMap data.
//!
//! The crate holds the entity graph (nodes, ways and relations sharing
//! children through [`std::sync::Arc`]), the create/modify/delete changeset
//! model, nearest-neighbour matching, Jaccard similarity classification,
//! replacement edit generation and adaptive query-area subdivision.
//!
//! Everything here is synchronous and free of I/O; reading and writing OSM
//! documents lives in `osm-merge-data`.

#![forbid(unsafe_code)]

mod bbox;
mod changeset;
mod edit;
mod entity;
mod geometry;
mod matcher;
mod refs;
mod similarity;
mod subdivide;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use bbox::BoundingBox;
pub use changeset::{Action, Changeset};
pub use edit::{EditDocument, EditEntry, EditError, EditFileGenerator, MatchPair, match_ways};
pub use entity::{
    ElementId, ElementKind, ElementRef, Entity, EntityError, Member, MemberRecord, Metadata, Node,
    Record, Relation, RelationRecord, SpatialEntity, Tags, UnknownElementKind, Way, WayRecord,
};
pub use geometry::{GeometryError, jaccard};
pub use matcher::{MatchError, SpatialMatcher};
pub use refs::{MemoryReferenceStore, ReferenceNotFound, ReferenceStore};
pub use similarity::{Similarity, Threshold, ThresholdError, Verdict, classify};
pub use subdivide::{
    MinExtentError, ProbeError, SubdivideOptions, SubdivisionError, subdivide,
};
pub use tokio_util::sync::CancellationToken;
