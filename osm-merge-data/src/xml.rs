//! A small owned XML element tree.
//!
//! OSM documents are shallow and attribute-heavy, so they are read fully
//! into [`XmlElement`]s with `quick-xml` and written back the same way. Text
//! content is not significant in OSM XML and is dropped.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    str,
};

use camino::Utf8Path;
use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};

use crate::DocumentError;

/// One element with its attributes and child elements.
///
/// Attribute order is preserved.
///
/// # Examples
/// ```
/// use osm_merge_data::XmlElement;
///
/// let root = XmlElement::parse_str(r#"<osm version="0.6"><node id="1" lat="2" lon="3"/></osm>"#)?;
/// assert_eq!(root.attribute("version"), Some("0.6"));
/// assert_eq!(root.children_named("node").count(), 1);
/// # Ok::<(), osm_merge_data::DocumentError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(key, value);
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Value of attribute `key`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Replace attribute `key`, or append it when absent.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(name, _)| *name == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Children named `name`.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Self> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Parse a document held in memory.
    ///
    /// # Errors
    /// Returns [`DocumentError::Xml`] for malformed XML and
    /// [`DocumentError::Malformed`] when there is no root element.
    pub fn parse_str(xml: &str) -> Result<Self, DocumentError> {
        Self::from_reader(xml.as_bytes())
    }

    /// Parse a document from any buffered reader.
    ///
    /// # Errors
    /// See [`XmlElement::parse_str`].
    pub fn from_reader<R: BufRead>(source: R) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        let mut buf = Vec::new();
        let mut open: Vec<Self> = Vec::new();
        let mut root = None;
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => open.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = open
                        .pop()
                        .ok_or_else(|| DocumentError::malformed("document", "unbalanced end tag"))?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        if let Some(unclosed) = open.last() {
            return Err(DocumentError::malformed(
                unclosed.name.clone(),
                "element is never closed",
            ));
        }
        root.ok_or_else(|| DocumentError::malformed("document", "no root element"))
    }

    /// Read and parse the file at `path`.
    ///
    /// # Errors
    /// Returns [`DocumentError::Read`] when the file cannot be opened, and
    /// the errors of [`XmlElement::parse_str`] otherwise.
    pub fn read_file(path: &Utf8Path) -> Result<Self, DocumentError> {
        let file = File::open(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Write the element as an indented document with an XML declaration.
    ///
    /// # Errors
    /// Returns [`DocumentError::Xml`] when the sink fails.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<(), DocumentError> {
        let mut writer = Writer::new_with_indent(sink, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        write_element(&mut writer, self)?;
        Ok(())
    }

    /// Render the element as an indented document.
    ///
    /// # Errors
    /// See [`XmlElement::write_to`].
    pub fn to_xml_string(&self) -> Result<String, DocumentError> {
        let mut bytes = Vec::new();
        self.write_to(&mut bytes)?;
        String::from_utf8(bytes)
            .map_err(|err| DocumentError::Xml(quick_xml::Error::from(err.utf8_error())))
    }

    /// Write the element to the file at `path`, replacing it.
    ///
    /// # Errors
    /// Returns [`DocumentError::Write`] when the file cannot be created or
    /// flushed.
    pub fn write_file(&self, path: &Utf8Path) -> Result<(), DocumentError> {
        let write_error = |source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        let mut sink = BufWriter::new(file);
        self.write_to(&mut sink)?;
        sink.write_all(b"\n").map_err(write_error)?;
        sink.flush().map_err(write_error)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, DocumentError> {
    let name = str::from_utf8(start.name().as_ref())
        .map_err(quick_xml::Error::from)?
        .to_owned();
    let mut element = XmlElement::new(name);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = str::from_utf8(attribute.key.as_ref()).map_err(quick_xml::Error::from)?;
        let value = attribute.unescape_value()?;
        element
            .attributes
            .push((key.to_owned(), value.into_owned()));
    }
    Ok(element)
}

fn attach(
    open: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), DocumentError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(DocumentError::malformed(
            element.name,
            "second root element",
        ));
    }
    *root = Some(element);
    Ok(())
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}
