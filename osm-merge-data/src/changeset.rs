//! Reading and writing `osmChange` documents.

use std::sync::Arc;

use camino::Utf8Path;
use log::{debug, warn};
use osm_merge_core::{
    Action, Changeset, Entity, MemoryReferenceStore, ReferenceStore, Relation, Way,
};

use crate::{
    DocumentError, XmlElement,
    osm::{entity_to_element, parse_node, parse_relation, parse_way},
};

/// Build a [`Changeset`] from an `osmChange` root element.
///
/// Each context document only contributes node coordinates; contexts are
/// read in order, so earlier ones win, and reading a context stops at its
/// first way or relation. Children of the `create`, `modify` and `delete`
/// groups land in the matching bucket. `bounds` elements are ignored and
/// unknown groups or elements are skipped with a warning. Every entity built
/// is stored so later elements can reference it.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when an element cannot be read.
///
/// # Examples
/// ```
/// use osm_merge_core::Action;
/// use osm_merge_data::{XmlElement, parse_changeset};
///
/// let context = XmlElement::parse_str(
///     r#"<osm><node id="1" lat="0" lon="0"/><node id="2" lat="1" lon="1"/></osm>"#,
/// )?;
/// let diff = XmlElement::parse_str(
///     r#"<osmChange version="0.6">
///          <modify><way id="5"><nd ref="1"/><nd ref="2"/></way></modify>
///        </osmChange>"#,
/// )?;
/// let changeset = parse_changeset(&diff, &[context])?;
/// assert_eq!(changeset.bucket(Action::Modify).len(), 1);
/// # Ok::<(), osm_merge_data::DocumentError>(())
/// ```
pub fn parse_changeset(
    document: &XmlElement,
    contexts: &[XmlElement],
) -> Result<Changeset, DocumentError> {
    let mut store = MemoryReferenceStore::default();
    for context in contexts {
        load_context_nodes(&mut store, context)?;
    }
    let mut changeset = Changeset::default();
    for group in &document.children {
        if group.name == "bounds" {
            debug!("ignoring changeset bounds");
            continue;
        }
        let Some(action) = Action::from_group_name(&group.name) else {
            warn!("skipping unknown changeset group <{}>", group.name);
            continue;
        };
        for element in &group.children {
            if let Some(entity) = build_entity(&mut store, element)? {
                changeset.push(action, entity);
            }
        }
    }
    debug!(
        "parsed changeset: {} create, {} modify, {} delete",
        changeset.create.len(),
        changeset.modify.len(),
        changeset.delete.len()
    );
    Ok(changeset)
}

/// Read a changeset and its contexts from disk.
///
/// # Errors
/// Returns [`DocumentError::Read`] when a file cannot be read, and the errors
/// of [`parse_changeset`] otherwise.
pub fn read_changeset<P>(path: &Utf8Path, contexts: &[P]) -> Result<Changeset, DocumentError>
where
    P: AsRef<Utf8Path>,
{
    let contexts = contexts
        .iter()
        .map(|context| XmlElement::read_file(context.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    parse_changeset(&XmlElement::read_file(path)?, &contexts)
}

fn load_context_nodes(
    store: &mut MemoryReferenceStore,
    context: &XmlElement,
) -> Result<(), DocumentError> {
    for element in &context.children {
        match element.name.as_str() {
            "node" => {
                store.populate_node(Arc::new(parse_node(element)?));
            }
            "way" | "relation" => break,
            _ => {}
        }
    }
    Ok(())
}

fn build_entity(
    store: &mut MemoryReferenceStore,
    element: &XmlElement,
) -> Result<Option<Entity>, DocumentError> {
    let entity = match element.name.as_str() {
        "node" => Entity::Node(Arc::new(parse_node(element)?)),
        "way" => match Way::resolve(&parse_way(element)?, store) {
            Ok(way) => Entity::Way(Arc::new(way)),
            Err(err) => {
                warn!("skipping {err}");
                return Ok(None);
            }
        },
        "relation" => match Relation::resolve(&parse_relation(element)?, store) {
            Ok(relation) => Entity::Relation(Arc::new(relation)),
            Err(err) => {
                warn!("skipping {err}");
                return Ok(None);
            }
        },
        "bounds" => {
            debug!("ignoring changeset bounds");
            return Ok(None);
        }
        other => {
            warn!("skipping unknown changeset element <{other}>");
            return Ok(None);
        }
    };
    store.populate(entity.clone());
    Ok(Some(entity))
}

/// Render a changeset as an `osmChange` root element.
///
/// The root always holds `create`, `modify` and `delete` in that order, even
/// when a bucket is empty.
pub fn changeset_to_xml(changeset: &Changeset) -> XmlElement {
    let mut root = XmlElement::new("osmChange")
        .with_attribute("version", "0.6")
        .with_attribute("generator", crate::GENERATOR);
    for action in Action::ALL {
        let mut group = XmlElement::new(action.as_str());
        group
            .children
            .extend(changeset.bucket(action).iter().map(entity_to_element));
        root.children.push(group);
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use osm_merge_core::{ElementKind, ElementRef, SpatialEntity};
    use rstest::rstest;

    fn parse(xml: &str) -> XmlElement {
        XmlElement::parse_str(xml).expect("xml")
    }

    #[rstest]
    fn earlier_contexts_win_and_scanning_stops_at_first_way() {
        let first = parse(
            r#"<osm>
                 <node id="1" lat="0" lon="0"/>
                 <way id="50"><nd ref="1"/></way>
                 <node id="2" lat="9" lon="9"/>
               </osm>"#,
        );
        let second = parse(
            r#"<osm><node id="1" lat="5" lon="5"/><node id="2" lat="1" lon="1"/></osm>"#,
        );
        let diff = parse(
            r#"<osmChange><modify><way id="7"><nd ref="1"/><nd ref="2"/></way></modify></osmChange>"#,
        );
        let changeset = parse_changeset(&diff, &[first, second]).expect("changeset");
        let way = changeset.modify[0].as_way().expect("way");
        let coords: Vec<_> = way.nodes().iter().map(|node| (node.lon, node.lat)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (1.0, 1.0)]);
    }

    #[rstest]
    fn elements_see_earlier_elements_of_the_same_document() {
        let diff = parse(
            r#"<osmChange>
                 <bounds minlat="0" minlon="0" maxlat="1" maxlon="1"/>
                 <create>
                   <bounds minlat="0" minlon="0" maxlat="1" maxlon="1"/>
                   <node id="-1" lat="0" lon="0"/>
                   <node id="-2" lat="2" lon="3"/>
                   <way id="-3"><nd ref="-1"/><nd ref="-2"/></way>
                 </create>
                 <modify>
                   <relation id="4"><member type="way" ref="-3" role="outer"/></relation>
                 </modify>
                 <review><node id="8" lat="0" lon="0"/></review>
               </osmChange>"#,
        );
        let changeset = parse_changeset(&diff, &[]).expect("changeset");
        assert_eq!(changeset.create.len(), 3);
        assert_eq!(changeset.modify.len(), 1);
        assert!(changeset.delete.is_empty());
        let relation = &changeset.modify[0];
        assert_eq!(
            relation.bounds().expect("bounds"),
            osm_merge_core::BoundingBox::new(0.0, 0.0, 3.0, 2.0)
        );
    }

    #[rstest]
    fn ways_without_known_nodes_are_skipped() {
        let diff = parse(
            r#"<osmChange><delete><way id="7"><nd ref="1"/></way><node id="3" lat="0" lon="0"/></delete></osmChange>"#,
        );
        let changeset = parse_changeset(&diff, &[]).expect("changeset");
        let elements: Vec<_> = changeset.delete.iter().map(SpatialEntity::element).collect();
        assert_eq!(elements, vec![ElementRef::new(ElementKind::Node, 3)]);
    }

    #[rstest]
    fn serialised_groups_are_always_present_in_order() {
        let root = changeset_to_xml(&Changeset::default());
        assert_eq!(root.name, "osmChange");
        assert_eq!(root.attribute("version"), Some("0.6"));
        let groups: Vec<_> = root.children.iter().map(|group| group.name.as_str()).collect();
        assert_eq!(groups, vec!["create", "modify", "delete"]);
    }
}
