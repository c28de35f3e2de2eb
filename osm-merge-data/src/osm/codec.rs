//! Conversion between OSM XML elements and entity records.

use std::str::FromStr;

use osm_merge_core::{
    ElementId, ElementKind, ElementRef, Entity, MemberRecord, Metadata, Node, Record,
    RelationRecord, Tags, WayRecord,
};

use crate::{DocumentError, XmlElement};

const IDENTITY_ATTRIBUTES: [&str; 5] = ["id", "lat", "lon", "version", "timestamp"];

/// Read a `node` element.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when `id`, `lat` or `lon` is missing
/// or not a number, when a coordinate is not finite or lies outside
/// `-90..=90` latitude or `-180..=180` longitude, or when a tag lacks its key.
pub fn parse_node(element: &XmlElement) -> Result<Node, DocumentError> {
    let id = parse_id(element)?;
    let label = ElementRef::new(ElementKind::Node, id);
    let lat = coordinate(element, "lat", 90.0, &label)?;
    let lon = coordinate(element, "lon", 180.0, &label)?;
    Ok(Node::new(id, lon, lat)
        .with_metadata(parse_metadata(element, &label)?)
        .with_tags(parse_tags(element, &label)?))
}

/// Read a `way` element. Node references stay ids.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when the id or a `nd ref` is missing
/// or not an integer.
pub fn parse_way(element: &XmlElement) -> Result<WayRecord, DocumentError> {
    let id = parse_id(element)?;
    let label = ElementRef::new(ElementKind::Way, id);
    let node_refs = element
        .children_named("nd")
        .map(|nd| required_number::<ElementId>(nd, "ref", &label))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WayRecord {
        id,
        node_refs,
        metadata: parse_metadata(element, &label)?,
        tags: parse_tags(element, &label)?,
    })
}

/// Read a `relation` element. Members stay `(kind, id, role)` triples.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when the id is missing or a member
/// has an unknown type or a bad reference.
pub fn parse_relation(element: &XmlElement) -> Result<RelationRecord, DocumentError> {
    let id = parse_id(element)?;
    let label = ElementRef::new(ElementKind::Relation, id);
    let members = element
        .children_named("member")
        .map(|member| -> Result<MemberRecord, DocumentError> {
            let kind = member
                .attribute("type")
                .ok_or_else(|| DocumentError::malformed(label.to_string(), "member without type"))?
                .parse::<ElementKind>()
                .map_err(|err| DocumentError::malformed(label.to_string(), err.to_string()))?;
            Ok(MemberRecord {
                kind,
                id: required_number(member, "ref", &label)?,
                role: member.attribute("role").unwrap_or_default().to_owned(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RelationRecord {
        id,
        members,
        metadata: parse_metadata(element, &label)?,
        tags: parse_tags(element, &label)?,
    })
}

/// Tags held in `tag` children.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when a tag has no `k`.
pub fn parse_tags(element: &XmlElement, label: &ElementRef) -> Result<Tags, DocumentError> {
    element
        .children_named("tag")
        .map(|tag| -> Result<(String, String), DocumentError> {
            let key = tag
                .attribute("k")
                .ok_or_else(|| DocumentError::malformed(label.to_string(), "tag without key"))?;
            let value = tag.attribute("v").unwrap_or_default();
            Ok((key.to_owned(), value.to_owned()))
        })
        .collect()
}

fn parse_metadata(element: &XmlElement, label: &ElementRef) -> Result<Metadata, DocumentError> {
    let version = element
        .attribute("version")
        .map(|raw| {
            raw.parse::<u32>().map_err(|_| {
                DocumentError::malformed(label.to_string(), format!("bad version {raw:?}"))
            })
        })
        .transpose()?;
    Ok(Metadata {
        version,
        timestamp: element.attribute("timestamp").map(str::to_owned),
        attributes: element
            .attributes
            .iter()
            .filter(|(key, _)| !IDENTITY_ATTRIBUTES.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    })
}

fn parse_id(element: &XmlElement) -> Result<ElementId, DocumentError> {
    let raw = element
        .attribute("id")
        .ok_or_else(|| DocumentError::malformed(element.name.clone(), "missing id"))?;
    raw.parse()
        .map_err(|_| DocumentError::malformed(element.name.clone(), format!("bad id {raw:?}")))
}

fn required_number<T: FromStr>(
    element: &XmlElement,
    key: &str,
    label: &ElementRef,
) -> Result<T, DocumentError> {
    let raw = element.attribute(key).ok_or_else(|| {
        DocumentError::malformed(label.to_string(), format!("missing {key}"))
    })?;
    raw.parse().map_err(|_| {
        DocumentError::malformed(label.to_string(), format!("bad {key} {raw:?}"))
    })
}

fn coordinate(
    element: &XmlElement,
    key: &str,
    limit: f64,
    label: &ElementRef,
) -> Result<f64, DocumentError> {
    let value: f64 = required_number(element, key, label)?;
    if value.is_finite() && value.abs() <= limit {
        Ok(value)
    } else {
        Err(DocumentError::malformed(
            label.to_string(),
            format!("{key} {value} outside -{limit}..={limit}"),
        ))
    }
}

/// Render a record as an OSM XML element.
///
/// Attributes are written as `id`, `version`, `timestamp`, the passthrough
/// attributes, then `lat`/`lon` for nodes.
pub fn record_to_element(record: &Record) -> XmlElement {
    match record {
        Record::Node(node) => {
            let mut element = identity_element("node", node.id, &node.metadata);
            element.set_attribute("lat", node.lat.to_string());
            element.set_attribute("lon", node.lon.to_string());
            push_tags(element, &node.tags)
        }
        Record::Way(way) => {
            let mut element = identity_element("way", way.id, &way.metadata);
            for node_ref in &way.node_refs {
                element
                    .children
                    .push(XmlElement::new("nd").with_attribute("ref", node_ref.to_string()));
            }
            push_tags(element, &way.tags)
        }
        Record::Relation(relation) => {
            let mut element = identity_element("relation", relation.id, &relation.metadata);
            for member in &relation.members {
                element.children.push(
                    XmlElement::new("member")
                        .with_attribute("type", member.kind.as_str())
                        .with_attribute("ref", member.id.to_string())
                        .with_attribute("role", member.role.as_str()),
                );
            }
            push_tags(element, &relation.tags)
        }
    }
}

/// Render an entity through its record form.
pub fn entity_to_element(entity: &Entity) -> XmlElement {
    record_to_element(&entity.to_record())
}

fn identity_element(name: &str, id: ElementId, metadata: &Metadata) -> XmlElement {
    let mut element = XmlElement::new(name).with_attribute("id", id.to_string());
    if let Some(version) = metadata.version {
        element.set_attribute("version", version.to_string());
    }
    if let Some(timestamp) = &metadata.timestamp {
        element.set_attribute("timestamp", timestamp.as_str());
    }
    for (key, value) in &metadata.attributes {
        element.set_attribute(key.as_str(), value.as_str());
    }
    element
}

fn push_tags(mut element: XmlElement, tags: &Tags) -> XmlElement {
    for (key, value) in tags {
        element.children.push(
            XmlElement::new("tag")
                .with_attribute("k", key.as_str())
                .with_attribute("v", value.as_str()),
        );
    }
    element
}
