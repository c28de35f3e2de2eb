//! Builders for small entity graphs used by unit and behaviour tests.

use std::sync::Arc;

use crate::{
    ElementId, ElementKind, MemberRecord, Metadata, Node, RelationRecord, Tags, Way,
};

/// Tags marking a way as a building.
pub fn building_tags() -> Tags {
    Tags::from([("building".to_owned(), "yes".to_owned())])
}

/// Way through `coords`, with node ids counting up from `first_node`.
///
/// # Panics
/// Panics when `coords` is empty.
pub fn way_from_coords(id: ElementId, first_node: ElementId, coords: &[(f64, f64)]) -> Arc<Way> {
    let nodes = coords
        .iter()
        .zip(first_node..)
        .map(|(&(lon, lat), node_id)| Arc::new(Node::new(node_id, lon, lat)))
        .collect();
    #[expect(clippy::expect_used, reason = "test builder")]
    let way = Way::new(id, nodes).expect("at least one coordinate");
    Arc::new(way.with_tags(building_tags()))
}

/// Closed axis-aligned square building of side `size` anchored at
/// `(x, y)`.
///
/// The ring reuses its first node, so it holds four distinct nodes with ids
/// counting up from `first_node`.
pub fn square_building(
    id: ElementId,
    first_node: ElementId,
    (x, y): (f64, f64),
    size: f64,
) -> Arc<Way> {
    let corners = [(x, y), (x, y + size), (x + size, y + size), (x + size, y)];
    let mut nodes: Vec<Arc<Node>> = corners
        .iter()
        .zip(first_node..)
        .map(|(&(lon, lat), node_id)| Arc::new(Node::new(node_id, lon, lat)))
        .collect();
    if let Some(first) = nodes.first().cloned() {
        nodes.push(first);
    }
    #[expect(clippy::expect_used, reason = "test builder")]
    let way = Way::new(id, nodes).expect("four corners");
    Arc::new(way.with_tags(building_tags()))
}

/// Relation whose members are the given ways, each with `role`.
pub fn relation_over_ways(id: ElementId, ways: &[ElementId], role: &str) -> RelationRecord {
    RelationRecord {
        id,
        members: ways
            .iter()
            .map(|&way| MemberRecord {
                kind: ElementKind::Way,
                id: way,
                role: role.to_owned(),
            })
            .collect(),
        metadata: Metadata::default(),
        tags: Tags::from([("type".to_owned(), "site".to_owned())]),
    }
}
