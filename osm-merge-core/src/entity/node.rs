//! Nodes: points carrying coordinates, tags and metadata.

use geo::{Coord, MultiPolygon};

use super::{ElementId, ElementKind, ElementRef, Metadata, SpatialEntity, Tags};
use crate::{BoundingBox, GeometryError};

/// A single coordinate with tags.
///
/// # Examples
/// ```
/// use osm_merge_core::{BoundingBox, Node, SpatialEntity};
///
/// let node = Node::new(7, -74.43, 40.48);
/// assert_eq!(node.bounds()?, BoundingBox::new(-74.43, 40.48, -74.43, 40.48));
/// # Ok::<(), osm_merge_core::GeometryError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// OSM identifier.
    pub id: ElementId,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Version, timestamp and passthrough attributes.
    pub metadata: Metadata,
    /// OSM tags.
    pub tags: Tags,
}

impl Node {
    /// Construct an untagged node at `(lon, lat)`.
    pub fn new(id: ElementId, lon: f64, lat: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            metadata: Metadata::default(),
            tags: Tags::new(),
        }
    }

    /// Replace the node's tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Replace the node's metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Position as a `geo` coordinate.
    pub const fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

impl SpatialEntity for Node {
    fn element(&self) -> ElementRef {
        ElementRef::new(ElementKind::Node, self.id)
    }

    fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        Ok(BoundingBox::from_coord(self.coord()))
    }

    fn representative_point(&self) -> Result<Coord<f64>, GeometryError> {
        Ok(self.coord())
    }

    fn footprint_polygon(&self) -> MultiPolygon<f64> {
        MultiPolygon::new(Vec::new())
    }
}
