//! Loading OSM documents into the entity graph.
//!
//! Elements are read in document order. Nodes precede the ways that use them
//! in OSM files, so each element is resolved against what has been loaded so
//! far; references that point outside the document are dropped.

use std::sync::Arc;

use camino::Utf8Path;
use log::{debug, warn};
use osm_merge_core::{
    BoundingBox, ElementId, MemoryReferenceStore, Node, ReferenceStore, Relation, RelationRecord,
    SpatialEntity, Way,
};

use crate::{DocumentError, XmlElement};

mod codec;
mod tags;

pub use codec::{
    entity_to_element, parse_node, parse_relation, parse_tags, parse_way, record_to_element,
};
pub use tags::{is_building, tag_buildings, translate_building_tags};

/// An OSM document resolved into shared entities.
///
/// Every relation is kept in record form as well, because relations often
/// reference members outside the loaded area and must be re-emitted without
/// losing them.
///
/// # Examples
/// ```
/// use osm_merge_data::OsmDocument;
///
/// let document = OsmDocument::parse_str(
///     r#"<osm version="0.6">
///          <node id="1" lat="0" lon="0"/>
///          <node id="2" lat="0" lon="1"/>
///          <node id="3" lat="1" lon="1"/>
///          <way id="10"><nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="1"/>
///            <tag k="building" v="yes"/></way>
///        </osm>"#,
/// )?;
/// assert_eq!(document.buildings().len(), 1);
/// # Ok::<(), osm_merge_data::DocumentError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct OsmDocument {
    store: MemoryReferenceStore,
    nodes: Vec<Arc<Node>>,
    ways: Vec<Arc<Way>>,
    relations: Vec<Arc<Relation>>,
    relation_records: Vec<RelationRecord>,
}

impl OsmDocument {
    /// Resolve the children of an `osm` root element.
    ///
    /// Ways and relations with no resolvable children are skipped with a
    /// warning. `bounds` elements are ignored.
    ///
    /// # Errors
    /// Returns [`DocumentError::Malformed`] when an element cannot be read.
    pub fn from_element(root: &XmlElement) -> Result<Self, DocumentError> {
        let mut document = Self::default();
        for element in &root.children {
            document.load_element(element)?;
        }
        debug!(
            "loaded {} nodes, {} ways and {} relations",
            document.nodes.len(),
            document.ways.len(),
            document.relation_records.len()
        );
        Ok(document)
    }

    /// Parse and resolve a document held in memory.
    ///
    /// # Errors
    /// See [`XmlElement::parse_str`] and [`OsmDocument::from_element`].
    pub fn parse_str(xml: &str) -> Result<Self, DocumentError> {
        Self::from_element(&XmlElement::parse_str(xml)?)
    }

    /// Read and resolve the document at `path`.
    ///
    /// # Errors
    /// See [`XmlElement::read_file`] and [`OsmDocument::from_element`].
    pub fn read_file(path: &Utf8Path) -> Result<Self, DocumentError> {
        Self::from_element(&XmlElement::read_file(path)?)
    }

    fn load_element(&mut self, element: &XmlElement) -> Result<(), DocumentError> {
        match element.name.as_str() {
            "node" => {
                let node = Arc::new(parse_node(element)?);
                if self.store.populate_node(Arc::clone(&node)) {
                    self.nodes.push(node);
                } else {
                    debug!("ignoring repeated node {}", node.id);
                }
            }
            "way" => {
                let record = parse_way(element)?;
                match Way::resolve(&record, &self.store) {
                    Ok(way) => {
                        let way = Arc::new(way);
                        if self.store.populate_way(Arc::clone(&way)) {
                            self.ways.push(way);
                        } else {
                            debug!("ignoring repeated way {}", way.id);
                        }
                    }
                    Err(err) => warn!("skipping {err}"),
                }
            }
            "relation" => {
                let record = parse_relation(element)?;
                match Relation::resolve(&record, &self.store) {
                    Ok(relation) => {
                        let relation = Arc::new(relation);
                        if self.store.populate_relation(Arc::clone(&relation)) {
                            self.relations.push(relation);
                        }
                    }
                    Err(err) => debug!("relation kept as record only: {err}"),
                }
                if self.relation_records.iter().all(|kept| kept.id != record.id) {
                    self.relation_records.push(record);
                }
            }
            "bounds" => debug!("ignoring document bounds"),
            other => debug!("ignoring <{other}> element"),
        }
        Ok(())
    }

    /// Store holding every resolved entity.
    pub fn store(&self) -> &MemoryReferenceStore {
        &self.store
    }

    /// Nodes in document order.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    /// Resolved ways in document order.
    pub fn ways(&self) -> &[Arc<Way>] {
        &self.ways
    }

    /// Relations with at least one resolved member, in document order.
    pub fn relations(&self) -> &[Arc<Relation>] {
        &self.relations
    }

    /// Every relation in record form, one per id, in document order.
    pub fn relation_records(&self) -> &[RelationRecord] {
        &self.relation_records
    }

    /// Ways tagged `building=yes`.
    pub fn buildings(&self) -> Vec<Arc<Way>> {
        self.ways
            .iter()
            .filter(|way| is_building(&way.tags))
            .cloned()
            .collect()
    }

    /// Number of loaded elements of all kinds.
    pub fn element_count(&self) -> usize {
        self.nodes.len() + self.ways.len() + self.relation_records.len()
    }

    /// Way stored under `id`.
    pub fn way(&self, id: ElementId) -> Option<Arc<Way>> {
        self.store.way(id)
    }

    /// Smallest box covering every node, or `None` for a document without
    /// nodes.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::union_all(self.nodes.iter().filter_map(|node| node.bounds().ok()))
    }
}
