//! Candidate data sources and query planning.
//!
//! Map APIs refuse queries that would return too much data. A
//! [`CandidateSource`] reports that refusal as
//! [`FetchError::CapacityExceeded`], and [`fetch_candidates`] answers it by
//! subdividing the query area until every query succeeds.

use std::collections::HashSet;

use log::{debug, info};
use osm_merge_core::{
    BoundingBox, CancellationToken, ElementId, ElementKind, ProbeError, SubdivideOptions, subdivide,
};
use thiserror::Error;

use crate::{
    DocumentError, OsmDocument, PipelineError, XmlElement,
    osm::{parse_node, parse_relation, parse_way},
};

/// Errors a [`CandidateSource`] may return.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The query would return more elements than the source allows. The
    /// caller should retry with smaller areas.
    #[error("query for {bbox} matches {elements} elements, more than the limit of {limit}")]
    CapacityExceeded {
        /// Area that was queried.
        bbox: BoundingBox,
        /// Number of elements the query would return.
        elements: usize,
        /// Largest number of elements the source returns.
        limit: usize,
    },
    /// The source data could not be read.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Anything that answers bounding-box queries with OSM documents.
pub trait CandidateSource {
    /// Every element relevant to `bbox`, as an `osm` root element.
    ///
    /// # Errors
    /// Returns [`FetchError::CapacityExceeded`] when the answer is too large
    /// and [`FetchError::Document`] when the data cannot be read.
    fn fetch(&self, bbox: &BoundingBox) -> Result<XmlElement, FetchError>;
}

/// In-memory [`CandidateSource`] over a loaded OSM document.
///
/// Answers follow the OSM map API: nodes inside the box, ways using any of
/// them together with all of their nodes, and relations with a selected node
/// or way as a member.
#[derive(Debug, Clone)]
pub struct DocumentSource {
    root: XmlElement,
    limit: usize,
}

impl DocumentSource {
    /// Serve `root`, refusing answers with more than `limit` elements.
    pub const fn new(root: XmlElement, limit: usize) -> Self {
        Self { root, limit }
    }

    /// Serve the elements of several documents as one, in the order given.
    pub fn merged<I>(roots: I, limit: usize) -> Self
    where
        I: IntoIterator<Item = XmlElement>,
    {
        let mut root = XmlElement::new("osm").with_attribute("version", "0.6");
        for document in roots {
            root.children.extend(document.children);
        }
        Self::new(root, limit)
    }

    /// Largest answer served.
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl CandidateSource for DocumentSource {
    fn fetch(&self, bbox: &BoundingBox) -> Result<XmlElement, FetchError> {
        let mut nodes: HashSet<ElementId> = HashSet::new();
        for element in self.root.children_named("node") {
            let node = parse_node(element)?;
            if bbox.contains(&BoundingBox::from_coord(node.coord())) {
                nodes.insert(node.id);
            }
        }
        let mut ways: HashSet<ElementId> = HashSet::new();
        for element in self.root.children_named("way") {
            let way = parse_way(element)?;
            if way.node_refs.iter().any(|node| nodes.contains(node)) {
                ways.insert(way.id);
                nodes.extend(way.node_refs);
            }
        }
        let mut relations: HashSet<ElementId> = HashSet::new();
        for element in self.root.children_named("relation") {
            let relation = parse_relation(element)?;
            let selected = relation.members.iter().any(|member| match member.kind {
                ElementKind::Node => nodes.contains(&member.id),
                ElementKind::Way => ways.contains(&member.id),
                ElementKind::Relation => false,
            });
            if selected {
                relations.insert(relation.id);
            }
        }

        let elements = nodes.len() + ways.len() + relations.len();
        if elements > self.limit {
            return Err(FetchError::CapacityExceeded {
                bbox: *bbox,
                elements,
                limit: self.limit,
            });
        }
        let mut answer = XmlElement::new("osm").with_attribute("version", "0.6");
        for (name, selected) in [("node", &nodes), ("way", &ways), ("relation", &relations)] {
            answer.children.extend(
                self.root
                    .children_named(name)
                    .filter(|element| element_id(element).is_some_and(|id| selected.contains(&id)))
                    .cloned(),
            );
        }
        Ok(answer)
    }
}

fn element_id(element: &XmlElement) -> Option<ElementId> {
    element.attribute("id").and_then(|raw| raw.parse().ok())
}

/// Query `source` over `area`, subdividing until every query fits.
///
/// Only quadrants that intersect one of `interest` are queried. The answers
/// are merged with the first copy of each element kept, nodes first, and
/// resolved into one document.
///
/// # Errors
/// Returns [`PipelineError::Subdivision`] when an area cannot be made small
/// enough, a query fails, or `cancel` fires, and [`PipelineError::Document`]
/// when the merged answer cannot be resolved.
pub fn fetch_candidates<S>(
    source: &S,
    area: BoundingBox,
    interest: &[BoundingBox],
    options: &SubdivideOptions,
    cancel: &CancellationToken,
) -> Result<OsmDocument, PipelineError>
where
    S: CandidateSource + ?Sized,
{
    let mut answers = Vec::new();
    let leaves = subdivide(
        area,
        options,
        |bbox| match source.fetch(bbox) {
            Ok(answer) => {
                answers.push(answer);
                Ok(true)
            }
            Err(FetchError::CapacityExceeded { elements, limit, .. }) => {
                debug!("area {bbox} holds {elements} elements, limit {limit}");
                Ok(false)
            }
            Err(err) => Err(ProbeError::from(err)),
        },
        |bbox| interest.iter().any(|wanted| wanted.intersects(bbox)),
        cancel,
    )?;
    info!("fetched candidates with {} queries", leaves.len());
    Ok(OsmDocument::from_element(&merge_answers(answers))?)
}

fn merge_answers(answers: Vec<XmlElement>) -> XmlElement {
    let mut merged = XmlElement::new("osm").with_attribute("version", "0.6");
    let mut seen: HashSet<(String, ElementId)> = HashSet::new();
    for name in ["node", "way", "relation"] {
        for answer in &answers {
            for element in answer.children_named(name) {
                let Some(id) = element_id(element) else {
                    continue;
                };
                if seen.insert((name.to_owned(), id)) {
                    merged.children.push(element.clone());
                }
            }
        }
    }
    merged
}
