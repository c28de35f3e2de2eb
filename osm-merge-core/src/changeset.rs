//! The create/modify/delete change model.

use std::{collections::BTreeMap, fmt};

use geo::{Geometry, Intersects, Polygon};
use log::warn;

use crate::{ElementRef, Entity, SpatialEntity};

/// Which bucket of a changeset an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    /// Entity is new.
    Create,
    /// Entity replaces an existing version.
    Modify,
    /// Entity is removed.
    Delete,
}

impl Action {
    /// All actions in serialisation order.
    pub const ALL: [Self; 3] = [Self::Create, Self::Modify, Self::Delete];

    /// Group name used in `osmChange` documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }

    /// Action for an `osmChange` group name, if it is one.
    pub fn from_group_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three ordered buckets of entities.
///
/// A well-formed changeset mentions each element in at most one bucket. The
/// model does not enforce this; [`Changeset::duplicate_entries`] reports
/// violations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    /// Entities to create.
    pub create: Vec<Entity>,
    /// Entities to modify.
    pub modify: Vec<Entity>,
    /// Entities to delete.
    pub delete: Vec<Entity>,
}

impl Changeset {
    /// Entities in the bucket for `action`.
    pub fn bucket(&self, action: Action) -> &[Entity] {
        match action {
            Action::Create => &self.create,
            Action::Modify => &self.modify,
            Action::Delete => &self.delete,
        }
    }

    /// Mutable bucket for `action`.
    pub fn bucket_mut(&mut self, action: Action) -> &mut Vec<Entity> {
        match action {
            Action::Create => &mut self.create,
            Action::Modify => &mut self.modify,
            Action::Delete => &mut self.delete,
        }
    }

    /// Append `entity` to the bucket for `action`.
    pub fn push(&mut self, action: Action, entity: Entity) {
        self.bucket_mut(action).push(entity);
    }

    /// Every entity with its action, buckets in [`Action::ALL`] order.
    pub fn entries(&self) -> impl Iterator<Item = (Action, &Entity)> {
        Action::ALL.into_iter().flat_map(move |action| {
            self.bucket(action).iter().map(move |entity| (action, entity))
        })
    }

    /// Total number of entities across buckets.
    pub fn len(&self) -> usize {
        self.create.len() + self.modify.len() + self.delete.len()
    }

    /// Whether every bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements that appear in more than one bucket, sorted.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use osm_merge_core::{Action, Changeset, ElementKind, ElementRef, Node};
    ///
    /// let node = Arc::new(Node::new(1, 0.0, 0.0));
    /// let mut changeset = Changeset::default();
    /// changeset.push(Action::Create, Arc::clone(&node).into());
    /// changeset.push(Action::Delete, node.into());
    /// assert_eq!(
    ///     changeset.duplicate_entries(),
    ///     vec![ElementRef::new(ElementKind::Node, 1)]
    /// );
    /// ```
    pub fn duplicate_entries(&self) -> Vec<ElementRef> {
        let mut seen: BTreeMap<ElementRef, Vec<Action>> = BTreeMap::new();
        for (action, entity) in self.entries() {
            let actions = seen.entry(entity.element()).or_default();
            if !actions.contains(&action) {
                actions.push(action);
            }
        }
        seen.into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .map(|(element, _)| element)
            .collect()
    }

    /// Subset of the changeset whose entities touch at least one region.
    ///
    /// Each entity is tested through the shape of its bounding box, so a
    /// single node is tested as a point. Entities without bounds are dropped
    /// with a warning. Bucket membership and order are preserved.
    #[must_use]
    pub fn intersecting(&self, regions: &[Polygon<f64>]) -> Self {
        let mut filtered = Self::default();
        for (action, entity) in self.entries() {
            let bounds = match entity.bounds() {
                Ok(bounds) => bounds,
                Err(err) => {
                    warn!("skipping {} from region filter: {err}", entity.element());
                    continue;
                }
            };
            let shape = bounds.shape();
            if regions.iter().any(|region| touches(region, &shape)) {
                filtered.push(action, entity.clone());
            }
        }
        filtered
    }
}

fn touches(region: &Polygon<f64>, shape: &Geometry<f64>) -> bool {
    match shape {
        Geometry::Point(point) => region.intersects(point),
        Geometry::Line(line) => region.intersects(line),
        Geometry::Polygon(polygon) => region.intersects(polygon),
        // Box shapes are only ever points, lines or polygons.
        _ => false,
    }
}
