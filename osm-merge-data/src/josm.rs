//! JOSM edit files.
//!
//! JOSM reads a plain `osm` document in which new elements carry negative
//! ids and changes to existing ones are marked with an `action` attribute.

use osm_merge_core::{Action, BoundingBox, EditDocument};

use crate::{GENERATOR, XmlElement, osm::record_to_element};

/// Render an edit document as a JOSM `osm` root element.
///
/// The `bounds` element comes first. Created entries are written as is,
/// deleted entries get `action="delete"` and modified ones
/// `action="modify"`. Entry order is preserved.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use osm_merge_core::{EditFileGenerator, MatchPair, Node, Way};
/// use osm_merge_data::edit_document_to_xml;
///
/// let way = Way::new(10, vec![Arc::new(Node::new(1, 0.0, 0.0)), Arc::new(Node::new(2, 1.0, 1.0))])?;
/// let document = EditFileGenerator::default().generate(&[MatchPair::unmatched(Arc::new(way))])?;
/// let root = edit_document_to_xml(&document);
/// assert_eq!(root.children[0].name, "bounds");
/// assert_eq!(root.children.len(), 4);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn edit_document_to_xml(document: &EditDocument) -> XmlElement {
    let mut root = XmlElement::new("osm")
        .with_attribute("version", "0.6")
        .with_attribute("generator", GENERATOR)
        .with_child(bounds_element(&document.bounds));
    for entry in &document.entries {
        let mut element = record_to_element(&entry.record);
        match entry.action {
            Action::Create => {}
            Action::Modify | Action::Delete => {
                element.set_attribute("action", entry.action.as_str());
            }
        }
        root.children.push(element);
    }
    root
}

fn bounds_element(bounds: &BoundingBox) -> XmlElement {
    let (min, max) = (bounds.min(), bounds.max());
    XmlElement::new("bounds")
        .with_attribute("minlat", min.y.to_string())
        .with_attribute("minlon", min.x.to_string())
        .with_attribute("maxlat", max.y.to_string())
        .with_attribute("maxlon", max.x.to_string())
        .with_attribute("origin", GENERATOR)
}
