//! Relations: typed members with roles, traversed without revisiting.

use std::collections::HashSet;

use geo::{BooleanOps, Coord, MultiPolygon};
use log::debug;

use super::{
    ElementId, ElementKind, ElementRef, Entity, EntityError, MemberRecord, Metadata,
    RelationRecord, SpatialEntity, Tags, mean_coord,
};
use crate::{BoundingBox, GeometryError, ReferenceStore};

/// Role used by multipolygon relations for holes.
const INNER_ROLE: &str = "inner";

/// One role-tagged member of a relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The referenced entity, shared with the graph.
    pub entity: Entity,
    /// Member role, possibly empty.
    pub role: String,
}

impl Member {
    /// Pair an entity with a role.
    pub fn new(entity: impl Into<Entity>, role: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            role: role.into(),
        }
    }
}

/// An ordered, role-tagged collection of nodes, ways and relations.
///
/// Relations may contain other relations. Every traversal keeps a set of
/// visited relation ids, so repeated or self-referencing membership is
/// visited once instead of looping.
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    /// OSM identifier.
    pub id: ElementId,
    members: Vec<Member>,
    /// Version, timestamp and passthrough attributes.
    pub metadata: Metadata,
    /// OSM tags.
    pub tags: Tags,
}

impl Relation {
    /// Build a relation from already-resolved members.
    ///
    /// # Errors
    /// Returns [`EntityError::NoResolvedMembers`] when `members` is empty.
    pub fn new(id: ElementId, members: Vec<Member>) -> Result<Self, EntityError> {
        if members.is_empty() {
            return Err(EntityError::NoResolvedMembers { id });
        }
        Ok(Self {
            id,
            members,
            metadata: Metadata::default(),
            tags: Tags::new(),
        })
    }

    /// Build a relation from its serialised form, resolving members through
    /// `store`. Unresolvable members are dropped.
    ///
    /// # Errors
    /// Returns [`EntityError::NoResolvedMembers`] when no member resolves.
    pub fn resolve<S>(record: &RelationRecord, store: &S) -> Result<Self, EntityError>
    where
        S: ReferenceStore + ?Sized,
    {
        let members = record
            .members
            .iter()
            .filter_map(|member| match store.resolve(member.kind, member.id) {
                Ok(entity) => Some(Member {
                    entity,
                    role: member.role.clone(),
                }),
                Err(missing) => {
                    debug!("relation {} dropped member: {missing}", record.id);
                    None
                }
            })
            .collect();
        let mut relation = Self::new(record.id, members)?;
        relation.metadata = record.metadata.clone();
        relation.tags = record.tags.clone();
        Ok(relation)
    }

    /// Replace the relation's tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    /// Members in order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Serialised form with members referenced by kind and id.
    pub fn to_record(&self) -> RelationRecord {
        RelationRecord {
            id: self.id,
            members: self
                .members
                .iter()
                .map(|member| MemberRecord {
                    kind: member.entity.kind(),
                    id: member.entity.id(),
                    role: member.role.clone(),
                })
                .collect(),
            metadata: self.metadata.clone(),
            tags: self.tags.clone(),
        }
    }

    fn fold_bounds(&self, visited: &mut HashSet<ElementId>) -> Option<BoundingBox> {
        if !visited.insert(self.id) {
            return None;
        }
        let mut acc: Option<BoundingBox> = None;
        for member in &self.members {
            let bounds = match &member.entity {
                Entity::Node(node) => node.bounds().ok(),
                Entity::Way(way) => way.bounds().ok(),
                Entity::Relation(relation) => relation.fold_bounds(visited),
            };
            acc = match (acc, bounds) {
                (Some(current), Some(next)) => Some(current.union(&next)),
                (current, next) => current.or(next),
            };
        }
        acc
    }

    fn collect_coords(
        &self,
        visited: &mut HashSet<ElementId>,
        seen_nodes: &mut HashSet<ElementId>,
        coords: &mut Vec<Coord<f64>>,
    ) {
        if !visited.insert(self.id) {
            return;
        }
        for member in &self.members {
            match &member.entity {
                Entity::Node(node) => {
                    if seen_nodes.insert(node.id) {
                        coords.push(node.coord());
                    }
                }
                Entity::Way(way) => way.collect_coords(seen_nodes, coords),
                Entity::Relation(relation) => {
                    relation.collect_coords(visited, seen_nodes, coords);
                }
            }
        }
    }

    fn fold_footprint(&self, visited: &mut HashSet<ElementId>) -> MultiPolygon<f64> {
        let empty = MultiPolygon::new(Vec::new());
        if !visited.insert(self.id) {
            return empty;
        }
        let mut outer = empty.clone();
        let mut inner = empty;
        for member in &self.members {
            let footprint = match &member.entity {
                Entity::Node(_) => continue,
                Entity::Way(way) => way.footprint_polygon(),
                Entity::Relation(relation) => relation.fold_footprint(visited),
            };
            if member.role == INNER_ROLE {
                inner = inner.union(&footprint);
            } else {
                outer = outer.union(&footprint);
            }
        }
        outer.difference(&inner)
    }
}

impl SpatialEntity for Relation {
    fn element(&self) -> ElementRef {
        ElementRef::new(ElementKind::Relation, self.id)
    }

    fn bounds(&self) -> Result<BoundingBox, GeometryError> {
        self.fold_bounds(&mut HashSet::new())
            .ok_or(GeometryError::EmptyGeometry {
                element: self.element(),
            })
    }

    fn representative_point(&self) -> Result<Coord<f64>, GeometryError> {
        let mut coords = Vec::new();
        self.collect_coords(&mut HashSet::new(), &mut HashSet::new(), &mut coords);
        mean_coord(&coords).ok_or(GeometryError::EmptyGeometry {
            element: self.element(),
        })
    }

    fn footprint_polygon(&self) -> MultiPolygon<f64> {
        self.fold_footprint(&mut HashSet::new())
    }
}
