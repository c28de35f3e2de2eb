//! Facade crate for osm-merge.
//!
//! This crate re-exports the core merge model and, behind the default `data`
//! feature, the OSM XML readers, writers and the replacement pipeline.

#![forbid(unsafe_code)]

pub use osm_merge_core::{
    Action, BoundingBox, CancellationToken, Changeset, EditDocument, EditEntry, EditError,
    EditFileGenerator, ElementId, ElementKind, ElementRef, Entity, MatchError, MatchPair,
    MemoryReferenceStore, MinExtentError, Node, ReferenceStore, Relation, RelationRecord,
    Similarity, SpatialEntity, SpatialMatcher, SubdivideOptions, SubdivisionError, Tags,
    Threshold, ThresholdError, Verdict, Way, WayRecord, classify, jaccard, match_ways, subdivide,
};

#[cfg(feature = "test-support")]
pub use osm_merge_core::test_support;

#[cfg(feature = "data")]
pub use osm_merge_data::{
    CandidateSource, DocumentError, DocumentSource, OsmDocument, PipelineError, RegionError,
    ReplaceOptions, XmlElement, changeset_to_xml, edit_document_to_xml, read_changeset,
    read_region, replace_buildings, tag_buildings,
};
