//! Replacement edit documents.
//!
//! An edit document recreates every source way under fresh negative ids and,
//! for each source way whose nearest candidate was accepted as the same
//! feature, deletes the candidate and points relations that referenced it at
//! the replacement.

mod claims;
mod ids;

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::{debug, info, warn};
use thiserror::Error;

use claims::{claim_candidates, protected_nodes};
use ids::IdAllocator;

use crate::{
    Action, BoundingBox, CancellationToken, ElementId, GeometryError, MatchError, Metadata, Node,
    Record, RelationRecord, Similarity, SpatialEntity, SpatialMatcher, Threshold, Way, WayRecord,
    classify,
};

/// A source way with its nearest candidate and the similarity verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPair {
    /// Way to be created.
    pub source: Arc<Way>,
    /// Nearest candidate way, if any candidate was indexed.
    pub candidate: Option<Arc<Way>>,
    /// Similarity between source and candidate.
    pub similarity: Option<Similarity>,
    /// Relations that reference the accepted candidate.
    pub relations: Vec<RelationRecord>,
}

impl MatchPair {
    /// A source way with no candidate.
    pub const fn unmatched(source: Arc<Way>) -> Self {
        Self {
            source,
            candidate: None,
            similarity: None,
            relations: Vec::new(),
        }
    }

    /// A source way paired with a classified candidate.
    pub const fn classified(source: Arc<Way>, candidate: Arc<Way>, similarity: Similarity) -> Self {
        Self {
            source,
            candidate: Some(candidate),
            similarity: Some(similarity),
            relations: Vec::new(),
        }
    }

    /// The candidate, when it was accepted as the same feature.
    pub fn accepted_candidate(&self) -> Option<&Arc<Way>> {
        self.candidate
            .as_ref()
            .filter(|_| self.similarity.is_some_and(|similarity| similarity.is_accepted()))
    }

    /// Collect every relation in `relations` that references the accepted
    /// candidate. Returns the number collected.
    ///
    /// Relations may come from several documents, so this can be called once
    /// per document. Pairs without an accepted candidate collect nothing.
    pub fn link_relations<'a, I>(&mut self, relations: I) -> usize
    where
        I: IntoIterator<Item = &'a RelationRecord>,
    {
        let Some(candidate) = self.accepted_candidate().map(|way| way.id) else {
            return 0;
        };
        let before = self.relations.len();
        self.relations.extend(
            relations
                .into_iter()
                .filter(|relation| relation.references_way(candidate))
                .cloned(),
        );
        self.relations.len() - before
    }
}

/// Pair each source way with its nearest candidate and classify the pair.
///
/// Pairs whose footprints are degenerate are excluded with a warning.
///
/// # Errors
/// Returns [`MatchError::Cancelled`] when `cancel` fires mid-pass.
pub fn match_ways(
    ours: &[Arc<Way>],
    matcher: &SpatialMatcher<Arc<Way>>,
    threshold: Threshold,
    cancel: &CancellationToken,
) -> Result<Vec<MatchPair>, MatchError> {
    let mut pairs = Vec::with_capacity(ours.len());
    for (source, candidate) in matcher.pair_all(ours, cancel)? {
        let Some(candidate) = candidate else {
            pairs.push(MatchPair::unmatched(Arc::clone(source)));
            continue;
        };
        match classify(source, candidate, threshold) {
            Ok(similarity) => {
                debug!(
                    "way {} vs way {}: jaccard {:.3} {:?}",
                    source.id, candidate.id, similarity.jaccard, similarity.verdict
                );
                pairs.push(MatchPair::classified(
                    Arc::clone(source),
                    Arc::clone(candidate),
                    similarity,
                ));
            }
            Err(err) => warn!("excluding way {}: {err}", source.id),
        }
    }
    Ok(pairs)
}

/// One line of an edit document.
#[derive(Debug, Clone, PartialEq)]
pub struct EditEntry {
    /// What to do with the element.
    pub action: Action,
    /// The element as it should be written.
    pub record: Record,
}

/// A complete replacement edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDocument {
    /// Smallest box covering every source way, before renumbering.
    pub bounds: BoundingBox,
    /// Entries in emission order.
    pub entries: Vec<EditEntry>,
}

impl EditDocument {
    /// Entries whose action is `action`.
    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &EditEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.action == action)
    }
}

/// Errors raised by [`EditFileGenerator::generate`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EditError {
    /// No pairs were supplied.
    #[error("nothing to process")]
    NothingToProcess,
    /// A source way has no bounds.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Builds [`EditDocument`]s from match pairs.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use osm_merge_core::{Action, EditFileGenerator, MatchPair, Node, Way};
///
/// let nodes = vec![
///     Arc::new(Node::new(1, 0.0, 0.0)),
///     Arc::new(Node::new(2, 1.0, 1.0)),
/// ];
/// let way = Arc::new(Way::new(10, nodes)?);
/// let document = EditFileGenerator::default().generate(&[MatchPair::unmatched(way)])?;
/// let ids: Vec<_> = document.entries.iter().map(|entry| entry.record.id()).collect();
/// assert_eq!(ids, vec![-1, -2, -3]);
/// assert!(document.entries.iter().all(|entry| entry.action == Action::Create));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EditFileGenerator {
    context_ways: Vec<Arc<Way>>,
}

impl EditFileGenerator {
    /// Generator with no knowledge of other candidate ways.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every loaded candidate way.
    ///
    /// Nodes of a replaced candidate that also belong to one of these ways
    /// are left in place unless that way is being replaced as well.
    #[must_use]
    pub fn with_context_ways<I>(mut self, ways: I) -> Self
    where
        I: IntoIterator<Item = Arc<Way>>,
    {
        self.context_ways.extend(ways);
        self
    }

    /// Produce the edit document for `pairs`.
    ///
    /// Every source way and its nodes are created under ids counting down
    /// from `-1` in encounter order; source nodes shared between ways are
    /// created once. A candidate accepted by more than one pair is replaced
    /// by the first; later pairs only create. Relations collected by the
    /// pairs are emitted once each, after all ways, with every rewrite
    /// applied.
    ///
    /// # Errors
    /// Returns [`EditError::NothingToProcess`] for an empty input and
    /// [`EditError::Geometry`] when a source way has no bounds.
    pub fn generate(&self, pairs: &[MatchPair]) -> Result<EditDocument, EditError> {
        let bounds = BoundingBox::union_all(
            pairs
                .iter()
                .map(|pair| pair.source.bounds())
                .collect::<Result<Vec<_>, _>>()?,
        )
        .ok_or(EditError::NothingToProcess)?;

        let claims = claim_candidates(pairs);
        let protected = protected_nodes(&self.context_ways, claims.keys().copied());

        let mut ids = IdAllocator::new();
        let mut created_nodes: HashMap<ElementId, ElementId> = HashMap::new();
        let mut deleted_nodes: HashSet<ElementId> = HashSet::new();
        let mut relinks: Vec<(ElementId, ElementId)> = Vec::new();
        let mut relations: Vec<RelationRecord> = Vec::new();
        let mut entries = Vec::new();

        for (index, pair) in pairs.iter().enumerate() {
            let way_id = create_way(&pair.source, &mut ids, &mut created_nodes, &mut entries);
            let Some(candidate) = pair.accepted_candidate() else {
                continue;
            };
            if claims.get(&candidate.id) != Some(&index) {
                warn!(
                    "way {} was already replaced; way {} is only created",
                    candidate.id, pair.source.id
                );
                continue;
            }
            for node in candidate.nodes() {
                if protected.contains(&node.id) {
                    debug!("keeping node {} used by another way", node.id);
                } else if deleted_nodes.insert(node.id) {
                    entries.push(EditEntry {
                        action: Action::Delete,
                        record: Record::Node(Node::clone(node)),
                    });
                }
            }
            entries.push(EditEntry {
                action: Action::Delete,
                record: Record::Way(candidate.to_record()),
            });
            relinks.push((candidate.id, way_id));
            for relation in &pair.relations {
                if relations.iter().all(|seen| seen.id != relation.id) {
                    relations.push(relation.clone());
                }
            }
        }

        for relation in &mut relations {
            for &(from, to) in &relinks {
                relation.relink(from, to);
            }
            entries.push(EditEntry {
                action: Action::Modify,
                record: Record::Relation(relation.clone()),
            });
        }
        info!(
            "edit covers {} source ways, {} replacements, {} relations",
            pairs.len(),
            relinks.len(),
            relations.len()
        );
        Ok(EditDocument { bounds, entries })
    }
}

/// Emit creations for `way` and its not-yet-created nodes; returns the new
/// way id.
fn create_way(
    way: &Way,
    ids: &mut IdAllocator,
    created_nodes: &mut HashMap<ElementId, ElementId>,
    entries: &mut Vec<EditEntry>,
) -> ElementId {
    let mut node_refs = Vec::with_capacity(way.nodes().len());
    for node in way.nodes() {
        let new_id = if let Some(&existing) = created_nodes.get(&node.id) {
            existing
        } else {
            let new_id = ids.allocate();
            created_nodes.insert(node.id, new_id);
            let created = Node::new(new_id, node.lon, node.lat).with_tags(node.tags.clone());
            entries.push(EditEntry {
                action: Action::Create,
                record: Record::Node(created),
            });
            new_id
        };
        node_refs.push(new_id);
    }
    let way_id = ids.allocate();
    entries.push(EditEntry {
        action: Action::Create,
        record: Record::Way(WayRecord {
            id: way_id,
            node_refs,
            metadata: Metadata::default(),
            tags: way.tags.clone(),
        }),
    });
    way_id
}

#[cfg(test)]
mod tests;
