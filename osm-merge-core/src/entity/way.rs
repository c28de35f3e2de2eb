//! Ways: ordered node lists and their closed-ring footprints.

use std::{collections::HashSet, sync::Arc};

use geo::{BoundingRect, Coord, Geometry, LineString, MultiPolygon, Polygon};
use log::debug;

use super::{
    ElementId, ElementKind, ElementRef, EntityError, Metadata, Node, SpatialEntity, Tags,
    WayRecord, mean_coord,
};
use crate::{BoundingBox, GeometryError, ReferenceStore};

/// An ordered list of nodes describing a line or a closed ring.
///
/// A way always holds at least one node; [`Way::new`] and [`Way::resolve`]
/// refuse to build an empty one.
#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    /// OSM identifier.
    pub id: ElementId,
    nodes: Vec<Arc<Node>>,
    /// Version, timestamp and passthrough attributes.
    pub metadata: Metadata,
    /// OSM tags.
    pub tags: Tags,
    shape: Option<Geometry<f64>>,
}

impl Way {
    /// Build a way from already-resolved nodes.
    ///
    /// # Errors
    /// Returns [`EntityError::NoResolvedNodes`] when `nodes` is empty.
    pub fn new(id: ElementId, nodes: Vec<Arc<Node>>) -> Result<Self, EntityError> {
        if nodes.is_empty() {
            return Err(EntityError::NoResolvedNodes { id });
        }
        Ok(Self {
            id,
            nodes,
            metadata: Metadata::default(),
            tags: Tags::new(),
            shape: None,
        })
    }

    /// Build a way from its serialised form, resolving node references
    /// through `store`.
    ///
    /// References that do not resolve are dropped; upstream extracts often
    /// reference nodes outside the loaded window.
    ///
    /// # Errors
    /// Returns [`EntityError::NoResolvedNodes`] when no reference resolves.
    pub fn resolve<S>(record: &WayRecord, store: &S) -> Result<Self, EntityError>
    where
        S: ReferenceStore + ?Sized,
    {
        let nodes: Vec<Arc<Node>> = record
            .node_refs
            .iter()
            .filter_map(|node_id| {
                let node = store.node(*node_id);
                if node.is_none() {
                    debug!("way {} dropped unresolved node {node_id}", record.id);
                }
                node
            })
            .collect();
        let mut way = Self::new(record.id, nodes)?;
        way.metadata = record.metadata.clone();
        way.tags = record.tags.clone();
        Ok(way)
    }

    /// Replace the way's tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Replace the way's metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Attach a cached shape used for bounds and footprint.
    #[must_use]
    pub fn with_shape(mut self, shape: Geometry<f64>) -> Self {
        self.shape = Some(shape);
        self
    }

    /// Member nodes in order.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    /// Cached shape, if one was attached.
    pub const fn shape(&self) -> Option<&Geometry<f64>> {
        self.shape.as_ref()
    }

    /// Whether the first and last node are the same node.
    pub fn is_closed(&self) -> bool {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => self.nodes.len() > 1 && first.id == last.id,
            _ => false,
        }
    }

    /// Node coordinates in order.
    pub fn line_string(&self) -> LineString<f64> {
        self.nodes.iter().map(|node| node.coord()).collect()
    }

    /// Serialised form with node references by id.
    pub fn to_record(&self) -> WayRecord {
        WayRecord {
            id: self.id,
            node_refs: self.nodes.iter().map(|node| node.id).collect(),
            metadata: self.metadata.clone(),
            tags: self.tags.clone(),
        }
    }

    /// Add this way's not-yet-seen node coordinates to `coords`.
    pub(crate) fn collect_coords(&self, seen: &mut HashSet<ElementId>, coords: &mut Vec<Coord<f64>>) {
        for node in &self.nodes {
            if seen.insert(node.id) {
                coords.push(node.coord());
            }
        }
    }
}

impl SpatialEntity for Way {
    fn element(&self) -> ElementRef {
        ElementRef::new(ElementKind::Way, self.id)
    }

    fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        let cached = self
            .shape
            .as_ref()
            .and_then(|shape| shape.bounding_rect())
            .map(BoundingBox::from);
        cached
            .or_else(|| {
                BoundingBox::union_all(
                    self.nodes
                        .iter()
                        .map(|node| BoundingBox::from_coord(node.coord())),
                )
            })
            .ok_or(GeometryError::EmptyGeometry {
                element: self.element(),
            })
    }

    fn representative_point(&self) -> Result<Coord<f64>, GeometryError> {
        let mut coords = Vec::with_capacity(self.nodes.len());
        self.collect_coords(&mut HashSet::new(), &mut coords);
        mean_coord(&coords).ok_or(GeometryError::EmptyGeometry {
            element: self.element(),
        })
    }

    fn footprint_polygon(&self) -> MultiPolygon<f64> {
        match &self.shape {
            Some(Geometry::Polygon(polygon)) => MultiPolygon::new(vec![polygon.clone()]),
            Some(Geometry::MultiPolygon(polygons)) => polygons.clone(),
            _ => MultiPolygon::new(vec![Polygon::new(self.line_string(), Vec::new())]),
        }
    }
}
