//! The in-memory entity graph: nodes, ways and relations.
//!
//! Ways and relations hold shared [`Arc`] handles to their children rather
//! than copies, so the same node or way instance is visible from every parent
//! that references it. Children are resolved through a
//! [`ReferenceStore`](crate::ReferenceStore); a child that cannot be resolved
//! is dropped, and a parent with no resolvable children cannot be built.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use geo::{Coord, MultiPolygon};
use thiserror::Error;

use crate::{BoundingBox, GeometryError};

mod node;
mod record;
mod relation;
mod way;

pub use node::Node;
pub use record::{MemberRecord, Record, RelationRecord, WayRecord};
pub use relation::{Member, Relation};
pub use way::Way;

/// OpenStreetMap identifier.
///
/// Positive values identify entities that already exist upstream; negative
/// values identify entities created by an edit document.
pub type ElementId = i64;

/// Free-form OpenStreetMap key/value tags.
pub type Tags = BTreeMap<String, String>;

/// The three OpenStreetMap element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementKind {
    /// A single coordinate.
    Node,
    /// An ordered list of nodes.
    Way,
    /// An ordered list of role-tagged members of any kind.
    Relation,
}

impl ElementKind {
    /// Name used for the kind in OSM documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown element kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown element kind {0:?}")]
pub struct UnknownElementKind(pub String);

impl FromStr for ElementKind {
    type Err = UnknownElementKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "node" => Ok(Self::Node),
            "way" => Ok(Self::Way),
            "relation" => Ok(Self::Relation),
            other => Err(UnknownElementKind(other.to_owned())),
        }
    }
}

/// A `(kind, id)` pair naming one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementRef {
    /// Element kind.
    pub kind: ElementKind,
    /// Element identifier.
    pub id: ElementId,
}

impl ElementRef {
    /// Pair a kind with an identifier.
    pub const fn new(kind: ElementKind, id: ElementId) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Element attributes other than identity and geometry.
///
/// `version` and `timestamp` are surfaced explicitly; everything else found
/// on the element (`user`, `uid`, `changeset`, `visible`, ...) is kept in
/// `attributes` so it survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Upstream version counter.
    pub version: Option<u32>,
    /// Upstream edit timestamp, kept verbatim.
    pub timestamp: Option<String>,
    /// Any other attributes, keyed by attribute name.
    pub attributes: BTreeMap<String, String>,
}

/// Errors raised when constructing ways and relations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// None of the way's node references resolved.
    #[error("way {id} has no resolvable nodes")]
    NoResolvedNodes {
        /// Identifier of the rejected way.
        id: ElementId,
    },
    /// None of the relation's members resolved.
    #[error("relation {id} has no resolvable members")]
    NoResolvedMembers {
        /// Identifier of the rejected relation.
        id: ElementId,
    },
}

/// Spatial view of an entity shared by matching and classification.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
pub trait SpatialEntity {
    /// Kind and identifier of the entity.
    fn element(&self) -> ElementRef;

    /// Smallest box covering the entity.
    ///
    /// # Errors
    /// Returns [`GeometryError::EmptyGeometry`] when the entity has no
    /// children and no cached shape.
    fn bounds(&self) -> Result<BoundingBox, GeometryError>;

    /// Arithmetic mean of the entity's distinct node coordinates.
    ///
    /// # Errors
    /// Returns [`GeometryError::EmptyGeometry`] when no node coordinate is
    /// reachable from the entity.
    fn representative_point(&self) -> Result<Coord<f64>, GeometryError>;

    /// Polygonal footprint used for overlap comparisons.
    ///
    /// Nodes have an empty footprint.
    fn footprint_polygon(&self) -> MultiPolygon<f64>;
}

impl<T: SpatialEntity + ?Sized> SpatialEntity for Arc<T> {
    fn element(&self) -> ElementRef {
        (**self).element()
    }

    fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        (**self).bounds()
    }

    fn representative_point(&self) -> Result<Coord<f64>, GeometryError> {
        (**self).representative_point()
    }

    fn footprint_polygon(&self) -> MultiPolygon<f64> {
        (**self).footprint_polygon()
    }
}

/// Any one of the three element kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    /// A node.
    Node(Arc<Node>),
    /// A way.
    Way(Arc<Way>),
    /// A relation.
    Relation(Arc<Relation>),
}

impl Entity {
    /// Element kind of the wrapped entity.
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Way(_) => ElementKind::Way,
            Self::Relation(_) => ElementKind::Relation,
        }
    }

    /// Identifier of the wrapped entity.
    pub fn id(&self) -> ElementId {
        match self {
            Self::Node(node) => node.id,
            Self::Way(way) => way.id,
            Self::Relation(relation) => relation.id,
        }
    }

    /// Tags of the wrapped entity.
    pub fn tags(&self) -> &Tags {
        match self {
            Self::Node(node) => &node.tags,
            Self::Way(way) => &way.tags,
            Self::Relation(relation) => &relation.tags,
        }
    }

    /// Flatten the entity into its id-based serialised form.
    pub fn to_record(&self) -> Record {
        match self {
            Self::Node(node) => Record::Node(Node::clone(node)),
            Self::Way(way) => Record::Way(way.to_record()),
            Self::Relation(relation) => Record::Relation(relation.to_record()),
        }
    }

    /// Borrow the wrapped way, if this is one.
    pub const fn as_way(&self) -> Option<&Arc<Way>> {
        match self {
            Self::Way(way) => Some(way),
            Self::Node(_) | Self::Relation(_) => None,
        }
    }
}

impl SpatialEntity for Entity {
    fn element(&self) -> ElementRef {
        ElementRef::new(self.kind(), self.id())
    }

    fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        match self {
            Self::Node(node) => node.bounds(),
            Self::Way(way) => way.bounds(),
            Self::Relation(relation) => relation.bounds(),
        }
    }

    fn representative_point(&self) -> Result<Coord<f64>, GeometryError> {
        match self {
            Self::Node(node) => node.representative_point(),
            Self::Way(way) => way.representative_point(),
            Self::Relation(relation) => relation.representative_point(),
        }
    }

    fn footprint_polygon(&self) -> MultiPolygon<f64> {
        match self {
            Self::Node(node) => node.footprint_polygon(),
            Self::Way(way) => way.footprint_polygon(),
            Self::Relation(relation) => relation.footprint_polygon(),
        }
    }
}

impl From<Arc<Node>> for Entity {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<Arc<Way>> for Entity {
    fn from(way: Arc<Way>) -> Self {
        Self::Way(way)
    }
}

impl From<Arc<Relation>> for Entity {
    fn from(relation: Arc<Relation>) -> Self {
        Self::Relation(relation)
    }
}

/// Mean of `coords`, or `None` when empty.
pub(crate) fn mean_coord(coords: &[Coord<f64>]) -> Option<Coord<f64>> {
    if coords.is_empty() {
        return None;
    }
    let count = coords.len() as f64;
    let sum = coords
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, coord| Coord {
            x: acc.x + coord.x,
            y: acc.y + coord.y,
        });
    Some(Coord {
        x: sum.x / count,
        y: sum.y / count,
    })
}
