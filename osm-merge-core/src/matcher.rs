//! Nearest-neighbour pairing between two sets of entities.
//!
//! Candidates are indexed by their representative point in an R\*-tree.
//! Distances are planar Euclidean on `(longitude, latitude)` degrees. That is
//! an approximation: it distorts with latitude and across large areas, and is
//! only meant for compact extents such as a single campus or town.

use log::warn;
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use thiserror::Error;

use crate::{CancellationToken, GeometryError, SpatialEntity};

/// Errors raised by [`SpatialMatcher::pair_all`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MatchError {
    /// The caller cancelled the pass.
    #[error("matching cancelled after {paired} entities")]
    Cancelled {
        /// Entities paired before cancellation was observed.
        paired: usize,
    },
}

/// Position of one candidate inside the index.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexedCandidate {
    slot: usize,
    point: [f64; 2],
}

impl RTreeObject for IndexedCandidate {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for IndexedCandidate {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [x, y] = self.point;
        let [px, py] = *point;
        (x - px).powi(2) + (y - py).powi(2)
    }
}

/// Spatial index over candidate entities.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use osm_merge_core::{Node, SpatialMatcher};
///
/// let candidates = vec![
///     Arc::new(Node::new(1, 0.0, 0.0)),
///     Arc::new(Node::new(2, 5.0, 5.0)),
/// ];
/// let matcher = SpatialMatcher::new(candidates);
/// let nearest = matcher.nearest(&Node::new(99, 4.0, 4.5))?;
/// assert_eq!(nearest.map(|node| node.id), Some(2));
/// # Ok::<(), osm_merge_core::GeometryError>(())
/// ```
#[derive(Debug)]
pub struct SpatialMatcher<T> {
    candidates: Vec<T>,
    index: RTree<IndexedCandidate>,
}

impl<T: SpatialEntity> SpatialMatcher<T> {
    /// Index `candidates` by representative point.
    ///
    /// Candidates without a representative point cannot be matched; they are
    /// skipped with a warning.
    pub fn new(candidates: Vec<T>) -> Self {
        let mut kept = Vec::with_capacity(candidates.len());
        let mut entries = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            match candidate.representative_point() {
                Ok(point) => {
                    entries.push(IndexedCandidate {
                        slot: kept.len(),
                        point: [point.x, point.y],
                    });
                    kept.push(candidate);
                }
                Err(err) => warn!("skipping candidate {}: {err}", candidate.element()),
            }
        }
        Self {
            candidates: kept,
            index: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether no candidate was indexed.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Indexed candidates in insertion order.
    pub fn candidates(&self) -> &[T] {
        &self.candidates
    }

    /// Closest candidate to `entity`, or `None` when the index is empty.
    ///
    /// There is no distance cut-off; the similarity classifier decides
    /// whether the nearest candidate is a real match.
    ///
    /// # Errors
    /// Returns [`GeometryError::EmptyGeometry`] when `entity` has no
    /// representative point.
    pub fn nearest<E>(&self, entity: &E) -> Result<Option<&T>, GeometryError>
    where
        E: SpatialEntity + ?Sized,
    {
        let point = entity.representative_point()?;
        Ok(self
            .index
            .nearest_neighbor(&[point.x, point.y])
            .and_then(|entry| self.candidates.get(entry.slot)))
    }

    /// Pair every entity in `ours` with its nearest candidate.
    ///
    /// Entities without a representative point are paired with `None` and
    /// logged. The token is checked before each entity.
    ///
    /// # Errors
    /// Returns [`MatchError::Cancelled`] when `cancel` fires mid-pass.
    pub fn pair_all<'a, E>(
        &self,
        ours: &'a [E],
        cancel: &CancellationToken,
    ) -> Result<Vec<(&'a E, Option<&T>)>, MatchError>
    where
        E: SpatialEntity,
    {
        let mut pairs = Vec::with_capacity(ours.len());
        for entity in ours {
            if cancel.is_cancelled() {
                return Err(MatchError::Cancelled {
                    paired: pairs.len(),
                });
            }
            let candidate = self.nearest(entity).unwrap_or_else(|err| {
                warn!("cannot match {}: {err}", entity.element());
                None
            });
            pairs.push((entity, candidate));
        }
        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{ElementId, Node, Way};
    use rstest::{fixture, rstest};

    fn way(id: ElementId, corners: &[(f64, f64)]) -> Arc<Way> {
        let nodes = corners
            .iter()
            .zip(id * 10..)
            .map(|(&(lon, lat), node_id)| Arc::new(Node::new(node_id, lon, lat)))
            .collect();
        Arc::new(Way::new(id, nodes).expect("way"))
    }

    #[fixture]
    fn matcher() -> SpatialMatcher<Arc<Way>> {
        SpatialMatcher::new(vec![
            way(1, &[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]),
            way(2, &[(10.0, 10.0), (10.0, 11.0), (11.0, 11.0), (11.0, 10.0)]),
        ])
    }

    #[rstest]
    fn nearest_picks_closest_centroid(matcher: SpatialMatcher<Arc<Way>>) {
        let probe = way(7, &[(9.0, 9.0), (9.5, 9.5)]);
        let nearest = matcher.nearest(&probe).expect("point").expect("candidate");
        assert_eq!(nearest.id, 2);
    }

    #[rstest]
    fn nearest_has_no_distance_cut_off(matcher: SpatialMatcher<Arc<Way>>) {
        let probe = Node::new(7, -500.0, -500.0);
        let nearest = matcher.nearest(&probe).expect("point").expect("candidate");
        assert_eq!(nearest.id, 1);
    }

    #[rstest]
    fn empty_index_yields_none() {
        let matcher: SpatialMatcher<Arc<Way>> = SpatialMatcher::new(Vec::new());
        assert!(matcher.is_empty());
        assert_eq!(matcher.nearest(&Node::new(1, 0.0, 0.0)), Ok(None));
    }

    #[rstest]
    fn pair_all_keeps_input_order(matcher: SpatialMatcher<Arc<Way>>) {
        let ours = vec![way(7, &[(10.2, 10.2)]), way(8, &[(0.2, 0.2)])];
        let pairs = matcher
            .pair_all(&ours, &CancellationToken::new())
            .expect("pairs");
        let ids: Vec<_> = pairs
            .iter()
            .map(|(source, candidate)| (source.id, candidate.map(|c| c.id)))
            .collect();
        assert_eq!(ids, vec![(7, Some(2)), (8, Some(1))]);
    }

    #[rstest]
    fn pair_all_stops_when_cancelled(matcher: SpatialMatcher<Arc<Way>>) {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = matcher
            .pair_all(&[way(7, &[(0.0, 0.0)])], &cancel)
            .expect_err("cancelled");
        assert_eq!(err, MatchError::Cancelled { paired: 0 });
    }
}
