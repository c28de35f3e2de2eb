//! Unit tests for replacement edit generation.

use super::*;
use crate::{ElementKind, MemberRecord, Tags, Verdict};
use rstest::{fixture, rstest};

fn way(id: ElementId, nodes: &[(ElementId, f64, f64)]) -> Arc<Way> {
    let nodes = nodes
        .iter()
        .map(|&(node_id, lon, lat)| Arc::new(Node::new(node_id, lon, lat)))
        .collect();
    Arc::new(Way::new(id, nodes).expect("way"))
}

fn accepted(source: &Arc<Way>, candidate: &Arc<Way>) -> MatchPair {
    MatchPair::classified(
        Arc::clone(source),
        Arc::clone(candidate),
        Similarity {
            jaccard: 1.0,
            verdict: Verdict::Accept,
        },
    )
}

fn relation(id: ElementId, ways: &[ElementId]) -> RelationRecord {
    RelationRecord {
        id,
        members: ways
            .iter()
            .map(|&way| MemberRecord {
                kind: ElementKind::Way,
                id: way,
                role: "outer".into(),
            })
            .collect(),
        metadata: Metadata::default(),
        tags: Tags::new(),
    }
}

fn summary(document: &EditDocument) -> Vec<(Action, ElementKind, ElementId)> {
    document
        .entries
        .iter()
        .map(|entry| (entry.action, entry.record.kind(), entry.record.id()))
        .collect()
}

#[fixture]
fn source() -> Arc<Way> {
    way(5, &[(1, 0.0, 0.0), (2, 0.0, 1.0), (3, 1.0, 1.0), (1, 0.0, 0.0)])
}

#[fixture]
fn candidate() -> Arc<Way> {
    way(20, &[(101, 0.0, 0.0), (102, 0.0, 1.0), (103, 1.0, 1.0), (101, 0.0, 0.0)])
}

#[rstest]
fn accepted_pair_creates_deletes_and_relinks(source: Arc<Way>, candidate: Arc<Way>) {
    let mut pair = accepted(&source, &candidate);
    assert_eq!(pair.link_relations(&[relation(9, &[20]), relation(8, &[21])]), 1);
    let document = EditFileGenerator::new().generate(&[pair]).expect("document");
    assert_eq!(
        summary(&document),
        vec![
            (Action::Create, ElementKind::Node, -1),
            (Action::Create, ElementKind::Node, -2),
            (Action::Create, ElementKind::Node, -3),
            (Action::Create, ElementKind::Way, -4),
            (Action::Delete, ElementKind::Node, 101),
            (Action::Delete, ElementKind::Node, 102),
            (Action::Delete, ElementKind::Node, 103),
            (Action::Delete, ElementKind::Way, 20),
            (Action::Modify, ElementKind::Relation, 9),
        ]
    );
    let Some(Record::Relation(relinked)) = document.entries.last().map(|e| &e.record) else {
        panic!("expected a relation last");
    };
    assert_eq!(relinked.members.len(), 1);
    assert_eq!(relinked.members.first().map(|m| (m.id, m.role.as_str())), Some((-4, "outer")));
}

#[rstest]
fn closed_ring_reuses_its_first_node(source: Arc<Way>) {
    let document = EditFileGenerator::new()
        .generate(&[MatchPair::unmatched(source)])
        .expect("document");
    let Some(Record::Way(created)) = document.entries.last().map(|e| &e.record) else {
        panic!("expected a way last");
    };
    assert_eq!(created.node_refs, vec![-1, -2, -3, -1]);
}

#[rstest]
fn rejected_pair_only_creates(source: Arc<Way>, candidate: Arc<Way>) {
    let mut pair = MatchPair::classified(
        source,
        candidate,
        Similarity {
            jaccard: 0.2,
            verdict: Verdict::Reject,
        },
    );
    assert_eq!(pair.link_relations(&[relation(9, &[20])]), 0);
    let document = EditFileGenerator::new().generate(&[pair]).expect("document");
    assert!(document.with_action(Action::Delete).next().is_none());
    assert!(document.with_action(Action::Modify).next().is_none());
    assert_eq!(document.with_action(Action::Create).count(), 4);
}

#[rstest]
fn bounds_cover_every_source_way(source: Arc<Way>) {
    let other = way(6, &[(7, 3.0, -2.0), (8, 4.0, -1.0)]);
    let document = EditFileGenerator::new()
        .generate(&[MatchPair::unmatched(source), MatchPair::unmatched(other)])
        .expect("document");
    assert_eq!(document.bounds, BoundingBox::new(0.0, -2.0, 4.0, 1.0));
}

#[rstest]
fn shared_relation_is_emitted_once_with_both_rewrites(source: Arc<Way>, candidate: Arc<Way>) {
    let second_source = way(6, &[(7, 5.0, 5.0), (8, 5.0, 6.0), (9, 6.0, 6.0)]);
    let second_candidate = way(21, &[(201, 5.0, 5.0), (202, 5.0, 6.0), (203, 6.0, 6.0)]);
    let site = relation(9, &[20, 21]);
    let mut first = accepted(&source, &candidate);
    let mut second = accepted(&second_source, &second_candidate);
    first.link_relations([&site]);
    second.link_relations([&site]);
    let document = EditFileGenerator::new()
        .generate(&[first, second])
        .expect("document");
    let relations: Vec<_> = document
        .entries
        .iter()
        .filter_map(|entry| match &entry.record {
            Record::Relation(relation) => Some(relation),
            _ => None,
        })
        .collect();
    assert_eq!(relations.len(), 1);
    let member_ids: Vec<_> = relations
        .iter()
        .flat_map(|relation| relation.members.iter().map(|member| member.id))
        .collect();
    assert_eq!(member_ids, vec![-4, -8]);
}

#[rstest]
fn contested_candidate_is_replaced_once(source: Arc<Way>, candidate: Arc<Way>) {
    let rival = way(6, &[(7, 0.1, 0.1), (8, 0.1, 0.9), (9, 0.9, 0.9)]);
    let document = EditFileGenerator::new()
        .generate(&[accepted(&source, &candidate), accepted(&rival, &candidate)])
        .expect("document");
    let deleted_ways = document
        .with_action(Action::Delete)
        .filter(|entry| entry.record.kind() == ElementKind::Way)
        .count();
    assert_eq!(deleted_ways, 1);
    assert_eq!(document.with_action(Action::Create).count(), 8);
}

#[rstest]
fn nodes_of_untouched_ways_are_kept(source: Arc<Way>, candidate: Arc<Way>) {
    let neighbour = way(22, &[(103, 1.0, 1.0), (104, 2.0, 1.0)]);
    let document = EditFileGenerator::new()
        .with_context_ways([Arc::clone(&candidate), neighbour])
        .generate(&[accepted(&source, &candidate)])
        .expect("document");
    let deleted_nodes: Vec<_> = document
        .with_action(Action::Delete)
        .filter(|entry| entry.record.kind() == ElementKind::Node)
        .map(|entry| entry.record.id())
        .collect();
    assert_eq!(deleted_nodes, vec![101, 102]);
}

#[rstest]
fn empty_input_is_nothing_to_process() {
    assert_eq!(
        EditFileGenerator::new().generate(&[]),
        Err(EditError::NothingToProcess)
    );
}
