//! Reference resolution between entities.
//!
//! A [`ReferenceStore`] maps identifiers to shared entity handles. Loading a
//! document populates the store as it goes so that later elements can refer
//! to earlier ones; the first entity stored under an id wins.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use thiserror::Error;

use crate::{ElementId, ElementKind, ElementRef, Entity, Node, Relation, Way};

/// A `(kind, id)` reference that has no entity behind it.
///
/// Callers treat this as "drop the reference" rather than as a failure.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{element} is not loaded")]
pub struct ReferenceNotFound {
    /// The missing element.
    pub element: ElementRef,
}

/// Lookup table from identifiers to entities, one namespace per kind.
///
/// Implementations must keep the first entity stored under an id; the
/// `populate_*` methods report whether they inserted.
pub trait ReferenceStore {
    /// Node stored under `id`.
    fn node(&self, id: ElementId) -> Option<Arc<Node>>;

    /// Way stored under `id`.
    fn way(&self, id: ElementId) -> Option<Arc<Way>>;

    /// Relation stored under `id`.
    fn relation(&self, id: ElementId) -> Option<Arc<Relation>>;

    /// Store `node` unless its id is already present.
    fn populate_node(&mut self, node: Arc<Node>) -> bool;

    /// Store `way` unless its id is already present.
    fn populate_way(&mut self, way: Arc<Way>) -> bool;

    /// Store `relation` unless its id is already present.
    fn populate_relation(&mut self, relation: Arc<Relation>) -> bool;

    /// Entity of any kind stored under `(kind, id)`.
    ///
    /// # Errors
    /// Returns [`ReferenceNotFound`] when nothing is stored under the pair.
    fn resolve(&self, kind: ElementKind, id: ElementId) -> Result<Entity, ReferenceNotFound> {
        let entity = match kind {
            ElementKind::Node => self.node(id).map(Entity::Node),
            ElementKind::Way => self.way(id).map(Entity::Way),
            ElementKind::Relation => self.relation(id).map(Entity::Relation),
        };
        entity.ok_or(ReferenceNotFound {
            element: ElementRef::new(kind, id),
        })
    }

    /// Store an entity of any kind unless its id is already present.
    fn populate(&mut self, entity: Entity) -> bool {
        match entity {
            Entity::Node(node) => self.populate_node(node),
            Entity::Way(way) => self.populate_way(way),
            Entity::Relation(relation) => self.populate_relation(relation),
        }
    }
}

/// [`ReferenceStore`] backed by in-memory hash maps.
#[derive(Debug, Clone, Default)]
pub struct MemoryReferenceStore {
    nodes: HashMap<ElementId, Arc<Node>>,
    ways: HashMap<ElementId, Arc<Way>>,
    relations: HashMap<ElementId, Arc<Relation>>,
}

impl MemoryReferenceStore {
    /// Number of stored nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of stored ways.
    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// Number of stored relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}

fn insert_first<T>(map: &mut HashMap<ElementId, Arc<T>>, id: ElementId, value: Arc<T>) -> bool {
    match map.entry(id) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(value);
            true
        }
    }
}

impl ReferenceStore for MemoryReferenceStore {
    fn node(&self, id: ElementId) -> Option<Arc<Node>> {
        self.nodes.get(&id).cloned()
    }

    fn way(&self, id: ElementId) -> Option<Arc<Way>> {
        self.ways.get(&id).cloned()
    }

    fn relation(&self, id: ElementId) -> Option<Arc<Relation>> {
        self.relations.get(&id).cloned()
    }

    fn populate_node(&mut self, node: Arc<Node>) -> bool {
        let id = node.id;
        insert_first(&mut self.nodes, id, node)
    }

    fn populate_way(&mut self, way: Arc<Way>) -> bool {
        let id = way.id;
        insert_first(&mut self.ways, id, way)
    }

    fn populate_relation(&mut self, relation: Arc<Relation>) -> bool {
        let id = relation.id;
        insert_first(&mut self.relations, id, relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn first_populated_node_wins() {
        let mut store = MemoryReferenceStore::default();
        assert!(store.populate_node(Arc::new(Node::new(1, 0.0, 0.0))));
        assert!(!store.populate_node(Arc::new(Node::new(1, 5.0, 5.0))));
        let node = store.node(1).expect("node");
        assert_eq!((node.lon, node.lat), (0.0, 0.0));
        assert_eq!(store.node_count(), 1);
    }

    #[rstest]
    fn resolve_reports_missing_references() {
        let store = MemoryReferenceStore::default();
        let err = store.resolve(ElementKind::Way, 12).expect_err("missing");
        assert_eq!(err.element, ElementRef::new(ElementKind::Way, 12));
        assert_eq!(err.to_string(), "way 12 is not loaded");
    }

    #[rstest]
    fn namespaces_are_separate_per_kind() {
        let mut store = MemoryReferenceStore::default();
        let node = Arc::new(Node::new(1, 0.0, 0.0));
        store.populate(Entity::Node(Arc::clone(&node)));
        let way = Arc::new(Way::new(1, vec![node]).expect("way"));
        assert!(store.populate(Entity::Way(way)));
        assert_eq!(store.resolve(ElementKind::Node, 1).map(|e| e.kind()), Ok(ElementKind::Node));
        assert_eq!(store.resolve(ElementKind::Way, 1).map(|e| e.kind()), Ok(ElementKind::Way));
        assert!(store.resolve(ElementKind::Relation, 1).is_err());
    }
}
