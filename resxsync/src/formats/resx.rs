//! Support for .NET `.resx` resource files.
//!
//! The document is kept as a lossless node tree so that a rewrite only touches the
//! `<value>` texts that changed. Comments, processing instructions, attributes, CDATA
//! sections and entity references survive byte-for-byte. On write, the XML declaration
//! is normalized to UTF-8 and content made only of child elements is re-indented
//! with two spaces. Leaf content is written as it was read.
use quick_xml::{
    Reader, Writer,
    escape::{partial_escape, unescape},
    events::{BytesCData, BytesDecl, BytesStart, BytesText, Event},
};
use std::io::{BufRead, Read, Write};
use std::{borrow::Cow, fs::File, path::Path};

use crate::{error::Error, traits::Parser};

const INDENT_SIZE: usize = 2;

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Text(BytesText<'static>),
    CData(BytesCData<'static>),
    /// Comments, processing instructions and doctypes, written back untouched.
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    self_closing: bool,
    /// `name` attribute, only captured for `<data>` elements.
    key: Option<String>,
}

impl Element {
    fn new(start: BytesStart<'static>, self_closing: bool) -> Result<Self, Error> {
        let key = if start.name().as_ref() == b"data" {
            parse_name_attribute(&start)?
        } else {
            None
        };
        Ok(Element {
            start,
            children: Vec::new(),
            self_closing,
            key,
        })
    }

    fn is(&self, name: &[u8]) -> bool {
        self.start.name().as_ref() == name
    }

    fn child(&self, name: &[u8]) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if e.is(name) => Some(e),
            _ => None,
        })
    }

    fn child_mut(&mut self, name: &[u8]) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(e) if e.is(name) => Some(e),
            _ => None,
        })
    }

    /// Text before the first child element.
    fn text(&self) -> Result<String, Error> {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Text(t) => {
                    let raw = String::from_utf8_lossy(t);
                    let normalized = normalize_line_ends(&raw);
                    let unescaped = unescape(&normalized).map_err(quick_xml::Error::from)?;
                    text.push_str(&unescaped);
                }
                Node::CData(c) => text.push_str(&normalize_line_ends(&String::from_utf8_lossy(c))),
                Node::Element(_) => break,
                Node::Other(_) => {}
            }
        }
        Ok(text)
    }

    /// Replaces the text before the first child element, keeping everything else.
    fn set_text(&mut self, value: &str) {
        let first_element = self
            .children
            .iter()
            .position(|node| matches!(node, Node::Element(_)))
            .unwrap_or(self.children.len());
        let tail = self.children.split_off(first_element);
        self.children.retain(|node| matches!(node, Node::Other(_)));
        self.children.insert(
            0,
            Node::Text(BytesText::from_escaped(partial_escape(value)).into_owned()),
        );
        self.children.extend(tail);

        if self.self_closing {
            // `<value />` becomes `<value>...</value>`, without the space left before `/>`.
            let content = String::from_utf8_lossy(&self.start).trim_end().to_string();
            let name_len = self.start.name().as_ref().len();
            self.start = BytesStart::from_content(content, name_len);
            self.self_closing = false;
        }
    }
}

/// A parsed `.resx` document.
#[derive(Debug, Clone)]
pub struct Format {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

/// Read-only view of one `<data>` entry.
#[derive(Debug, Clone, Copy)]
pub struct DataEntry<'a> {
    element: &'a Element,
}

impl DataEntry<'_> {
    pub fn name(&self) -> Option<&str> {
        self.element.key.as_deref()
    }

    /// Current `<value>` text, `None` when the entry has no `<value>` child.
    pub fn value(&self) -> Result<Option<String>, Error> {
        self.element.child(b"value").map(Element::text).transpose()
    }
}

/// Mutable view of one `<data>` entry.
#[derive(Debug)]
pub struct DataEntryMut<'a> {
    element: &'a mut Element,
}

impl DataEntryMut<'_> {
    pub fn name(&self) -> Option<&str> {
        self.element.key.as_deref()
    }

    pub fn value(&self) -> Result<Option<String>, Error> {
        self.element.child(b"value").map(Element::text).transpose()
    }

    /// Sets the `<value>` text. Returns `false` if the entry has no `<value>` child,
    /// in which case nothing is changed.
    pub fn set_value(&mut self, value: &str) -> bool {
        match self.element.child_mut(b"value") {
            Some(value_element) => {
                value_element.set_text(value);
                true
            }
            None => false,
        }
    }
}

impl Format {
    /// `<data>` elements directly under the root, in document order.
    pub fn entries(&self) -> impl Iterator<Item = DataEntry<'_>> {
        self.root.children.iter().filter_map(|node| match node {
            Node::Element(e) if e.is(b"data") => Some(DataEntry { element: e }),
            _ => None,
        })
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = DataEntryMut<'_>> {
        self.root.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) if e.is(b"data") => Some(DataEntryMut { element: e }),
            _ => None,
        })
    }

    /// Value of the first entry named `key`.
    pub fn value(&self, key: &str) -> Result<Option<String>, Error> {
        match self.entries().find(|entry| entry.name() == Some(key)) {
            Some(entry) => entry.value(),
            None => Ok(None),
        }
    }

    pub fn root_name(&self) -> String {
        String::from_utf8_lossy(self.root.start.name().as_ref()).into_owned()
    }
}

impl Parser for Format {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().check_end_names = true;

        let mut buf = Vec::new();
        let mut tree = TreeBuilder::default();

        loop {
            match xml_reader.read_event_into(&mut buf)?.into_owned() {
                Event::Start(start) => tree.open.push(Element::new(start, false)?),
                Event::End(_) => {
                    let element = tree.open.pop().ok_or_else(|| {
                        Error::InvalidResource("unexpected closing tag".to_string())
                    })?;
                    tree.attach(Node::Element(element))?;
                }
                Event::Empty(start) => tree.attach(Node::Element(Element::new(start, true)?))?,
                Event::Text(text) => tree.attach(Node::Text(text))?,
                Event::CData(cdata) => tree.attach(Node::CData(cdata))?,
                // The declaration is rewritten as UTF-8 on output.
                Event::Decl(_) => {}
                Event::Eof => break,
                other => tree.attach(Node::Other(other))?,
            }
            buf.clear();
        }

        tree.finish()
    }

    /// Override default file reading to support BOM-aware decoding.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .strip_bom(true)
            .build(file);

        let mut decoded = Vec::new();
        decoder.read_to_end(&mut decoded).map_err(Error::Io)?;

        Self::from_bytes(&decoded)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(writer, b' ', INDENT_SIZE);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        for node in &self.prolog {
            write_node(&mut xml_writer, node, true)?;
        }
        write_element(&mut xml_writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut xml_writer, node, true)?;
        }
        xml_writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

#[derive(Default)]
struct TreeBuilder {
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn attach(&mut self, node: Node) -> Result<(), Error> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        match node {
            Node::Element(element) => {
                if self.root.is_some() {
                    return Err(Error::InvalidResource(
                        "document has more than one root element".to_string(),
                    ));
                }
                self.root = Some(element);
            }
            Node::Text(text) if is_blank(&text) => {}
            Node::Text(_) | Node::CData(_) => {
                return Err(Error::InvalidResource(
                    "text outside of the root element".to_string(),
                ));
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self) -> Result<Format, Error> {
        if let Some(unclosed) = self.open.last() {
            return Err(Error::InvalidResource(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(unclosed.start.name().as_ref())
            )));
        }
        let root = self
            .root
            .ok_or_else(|| Error::InvalidResource("document has no root element".to_string()))?;
        Ok(Format {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn parse_name_attribute(start: &BytesStart) -> Result<Option<String>, Error> {
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::InvalidResource(e.to_string()))?;
        if attr.key.as_ref() == b"name" {
            let raw = String::from_utf8_lossy(&attr.value);
            let normalized = normalize_line_ends(&raw);
            let value = unescape(&normalized).map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// XML end-of-line handling: `\r\n` and lone `\r` read as `\n`. Character
/// references such as `&#13;` are unescaped afterwards and stay intact.
fn normalize_line_ends(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

fn is_blank(text: &BytesText) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn write_node<W: Write>(
    xml_writer: &mut Writer<W>,
    node: &Node,
    reindent: bool,
) -> Result<(), Error> {
    match node {
        Node::Element(element) => write_element(xml_writer, element)?,
        Node::Text(text) if reindent && is_blank(text) => {}
        Node::Text(text) => xml_writer.write_event(Event::Text(text.clone()))?,
        Node::CData(cdata) => xml_writer.write_event(Event::CData(cdata.clone()))?,
        Node::Other(event) => xml_writer.write_event(event.clone())?,
    }
    Ok(())
}

fn write_element<W: Write>(xml_writer: &mut Writer<W>, element: &Element) -> Result<(), Error> {
    if element.self_closing && element.children.is_empty() {
        xml_writer.write_event(Event::Empty(element.start.clone()))?;
        return Ok(());
    }

    xml_writer.write_event(Event::Start(element.start.clone()))?;

    let has_child_elements = element
        .children
        .iter()
        .any(|node| matches!(node, Node::Element(_)));
    if has_child_elements {
        // Whitespace between child elements is only indentation.
        for child in &element.children {
            write_node(xml_writer, child, true)?;
        }
    } else {
        // Leaf content, comments included, is written as-is. The empty text event
        // keeps the closing tag on the same line.
        xml_writer.write_event(Event::Text(BytesText::from_escaped("")))?;
        let mut leaf_writer = Writer::new(xml_writer.get_mut() as &mut dyn Write);
        for child in &element.children {
            write_node(&mut leaf_writer, child, false)?;
        }
    }

    xml_writer.write_event(Event::End(element.start.to_end()))?;
    Ok(())
}
