//! Tag conventions for building footprints.

use osm_merge_core::{ElementKind, ElementRef, Tags};

use super::codec::parse_tags;
use crate::{DocumentError, XmlElement};

/// Whether the tags mark a building that takes part in matching.
pub fn is_building(tags: &Tags) -> bool {
    tags.get("building").is_some_and(|value| value == "yes")
}

/// Add OSM tags derived from municipal building attributes.
///
/// `BldgName` becomes `name` plus `building=yes`, `BldgAddres` becomes
/// `addr:street`, `City` becomes `addr:city` and `Zip` becomes
/// `addr:postcode`. Street and city names are title-cased. Source tags are
/// kept.
///
/// # Examples
/// ```
/// use osm_merge_core::Tags;
/// use osm_merge_data::translate_building_tags;
///
/// let tags = Tags::from([("BldgAddres".to_owned(), "1 COLLEGE AVE".to_owned())]);
/// let translated = translate_building_tags(&tags);
/// assert_eq!(translated["addr:street"], "1 College Ave");
/// assert_eq!(translated["BldgAddres"], "1 COLLEGE AVE");
/// ```
pub fn translate_building_tags(tags: &Tags) -> Tags {
    let mut translated = tags.clone();
    for (key, value) in tags {
        match key.as_str() {
            "BldgName" => {
                translated.insert("name".to_owned(), value.clone());
                translated.insert("building".to_owned(), "yes".to_owned());
            }
            "BldgAddres" => {
                translated.insert("addr:street".to_owned(), title_case(value));
            }
            "City" => {
                translated.insert("addr:city".to_owned(), title_case(value));
            }
            "Zip" => {
                translated.insert("addr:postcode".to_owned(), value.clone());
            }
            _ => {}
        }
    }
    translated
}

/// Apply [`translate_building_tags`] to every way and relation of an OSM
/// document in place. Returns the number of elements whose tags changed.
///
/// Only `tag` children are touched; existing tags keep their position and
/// new ones are appended.
///
/// # Errors
/// Returns [`DocumentError::Malformed`] when an element has a tag without a
/// key.
pub fn tag_buildings(document: &mut XmlElement) -> Result<usize, DocumentError> {
    let mut changed = 0;
    for element in &mut document.children {
        let kind = match element.name.as_str() {
            "way" => ElementKind::Way,
            "relation" => ElementKind::Relation,
            _ => continue,
        };
        let id = element
            .attribute("id")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        let existing = parse_tags(element, &ElementRef::new(kind, id))?;
        let translated = translate_building_tags(&existing);
        if translated == existing {
            continue;
        }
        for (key, value) in translated {
            if existing.get(&key) == Some(&value) {
                continue;
            }
            let slot = element
                .children
                .iter_mut()
                .find(|child| child.name == "tag" && child.attribute("k") == Some(key.as_str()));
            match slot {
                Some(tag) => tag.set_attribute("v", value),
                None => element.children.push(
                    XmlElement::new("tag")
                        .with_attribute("k", key)
                        .with_attribute("v", value),
                ),
            }
        }
        changed += 1;
    }
    Ok(changed)
}

/// Capitalise the first letter of every run of letters and lowercase the
/// rest.
fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                titled.extend(ch.to_lowercase());
            } else {
                titled.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            titled.push(ch);
            in_word = false;
        }
    }
    titled
}
