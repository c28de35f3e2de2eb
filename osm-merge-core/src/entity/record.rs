//! Flat, id-based forms of the element kinds.

use super::{ElementId, ElementKind, Metadata, Node, Tags};

/// A relation member referenced by kind and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// Member kind.
    pub kind: ElementKind,
    /// Member identifier.
    pub id: ElementId,
    /// Member role, possibly empty.
    pub role: String,
}

/// A way whose nodes are referenced by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WayRecord {
    /// OSM identifier.
    pub id: ElementId,
    /// Node references in order.
    pub node_refs: Vec<ElementId>,
    /// Version, timestamp and passthrough attributes.
    pub metadata: Metadata,
    /// OSM tags.
    pub tags: Tags,
}

/// A relation whose members are referenced by kind and id.
///
/// Unlike [`Relation`](super::Relation), a record keeps members that lie
/// outside the loaded window, so re-emitting it loses nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    /// OSM identifier.
    pub id: ElementId,
    /// Members in order.
    pub members: Vec<MemberRecord>,
    /// Version, timestamp and passthrough attributes.
    pub metadata: Metadata,
    /// OSM tags.
    pub tags: Tags,
}

impl RelationRecord {
    /// Whether any way member points at `way`.
    pub fn references_way(&self, way: ElementId) -> bool {
        self.members
            .iter()
            .any(|member| member.kind == ElementKind::Way && member.id == way)
    }

    /// Point every way member referencing `from` at `to` instead.
    ///
    /// Position and role are preserved. Returns the number of rewritten
    /// members.
    ///
    /// # Examples
    /// ```
    /// use osm_merge_core::{ElementKind, MemberRecord, Metadata, RelationRecord, Tags};
    ///
    /// let mut relation = RelationRecord {
    ///     id: 9,
    ///     members: vec![MemberRecord { kind: ElementKind::Way, id: 20, role: "outer".into() }],
    ///     metadata: Metadata::default(),
    ///     tags: Tags::new(),
    /// };
    /// assert_eq!(relation.relink(20, -4), 1);
    /// assert_eq!(relation.members[0].id, -4);
    /// assert_eq!(relation.members[0].role, "outer");
    /// ```
    pub fn relink(&mut self, from: ElementId, to: ElementId) -> usize {
        let mut rewritten = 0;
        for member in &mut self.members {
            if member.kind == ElementKind::Way && member.id == from {
                member.id = to;
                rewritten += 1;
            }
        }
        rewritten
    }
}

/// Serialised form of any element.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Nodes carry no references, so the record is the node itself.
    Node(Node),
    /// A way record.
    Way(WayRecord),
    /// A relation record.
    Relation(RelationRecord),
}

impl Record {
    /// Element kind of the record.
    pub const fn kind(&self) -> ElementKind {
        match self {
            Self::Node(_) => ElementKind::Node,
            Self::Way(_) => ElementKind::Way,
            Self::Relation(_) => ElementKind::Relation,
        }
    }

    /// Identifier of the record.
    pub const fn id(&self) -> ElementId {
        match self {
            Self::Node(node) => node.id,
            Self::Way(way) => way.id,
            Self::Relation(relation) => relation.id,
        }
    }

    /// Tags of the record.
    pub const fn tags(&self) -> &Tags {
        match self {
            Self::Node(node) => &node.tags,
            Self::Way(way) => &way.tags,
            Self::Relation(relation) => &relation.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn member(kind: ElementKind, id: ElementId, role: &str) -> MemberRecord {
        MemberRecord {
            kind,
            id,
            role: role.into(),
        }
    }

    #[rstest]
    fn relink_only_touches_way_members() {
        let mut relation = RelationRecord {
            id: 1,
            members: vec![
                member(ElementKind::Node, 20, "label"),
                member(ElementKind::Way, 20, "outer"),
                member(ElementKind::Way, 21, "inner"),
                member(ElementKind::Relation, 20, "sub"),
            ],
            metadata: Metadata::default(),
            tags: Tags::new(),
        };
        assert_eq!(relation.relink(20, -7), 1);
        assert_eq!(
            relation.members,
            vec![
                member(ElementKind::Node, 20, "label"),
                member(ElementKind::Way, -7, "outer"),
                member(ElementKind::Way, 21, "inner"),
                member(ElementKind::Relation, 20, "sub"),
            ]
        );
        assert!(!relation.references_way(20));
        assert!(relation.references_way(-7));
    }

    #[rstest]
    fn record_exposes_kind_and_id() {
        let record = Record::Node(Node::new(3, 1.0, 2.0));
        assert_eq!(record.kind(), ElementKind::Node);
        assert_eq!(record.id(), 3);
    }
}
