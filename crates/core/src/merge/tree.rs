//! Minimal owned XML tree built on quick-xml events
//!
//! Markup is kept as the raw (still escaped) source text so that untouched
//! elements serialize back with the same attributes, entities and text.

use std::fmt::Write as _;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::merger::MergeError;

const INDENT: &str = "  ";

/// Node inside an element or around the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    /// Escaped character data exactly as it appeared in the source.
    Text(String),
    CData(String),
    Comment(String),
    /// Processing instruction body without `<?` and `?>`.
    Instruction(String),
}

/// Element with its raw start-tag content (`name attr="v"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    raw_start: String,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn new(name: String, raw_start: String) -> Self {
        Self { name, raw_start, children: Vec::new() }
    }

    /// Paths (child index chains below `self`) of every outermost descendant
    /// named `tag`, in document order.
    #[must_use]
    pub fn find_paths(&self, tag: &str) -> Vec<Vec<usize>> {
        let mut paths = Vec::new();
        let mut prefix = Vec::new();
        self.collect_paths(tag, &mut prefix, &mut paths);
        paths
    }

    fn collect_paths(&self, tag: &str, prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (index, child) in self.children.iter().enumerate() {
            if let XmlNode::Element(element) = child {
                prefix.push(index);
                if element.name == tag {
                    out.push(prefix.clone());
                } else {
                    element.collect_paths(tag, prefix, out);
                }
                prefix.pop();
            }
        }
    }

    /// Element at `path`, if the path still points at one.
    #[must_use]
    pub fn element_at(&self, path: &[usize]) -> Option<&XmlElement> {
        let (first, rest) = path.split_first()?;
        match self.children.get(*first)? {
            XmlNode::Element(element) if rest.is_empty() => Some(element),
            XmlNode::Element(element) => element.element_at(rest),
            _ => None,
        }
    }

    /// Replace the node at `path`. Returns `false` when the path is stale.
    pub fn replace_at(&mut self, path: &[usize], node: XmlNode) -> bool {
        match self.parent_mut(path) {
            Some((parent, index)) if index < parent.children.len() => {
                parent.children[index] = node;
                true
            }
            _ => false,
        }
    }

    /// Remove the node at `path`. Returns `false` when the path is stale.
    pub fn remove_at(&mut self, path: &[usize]) -> bool {
        match self.parent_mut(path) {
            Some((parent, index)) if index < parent.children.len() => {
                parent.children.remove(index);
                true
            }
            _ => false,
        }
    }

    fn parent_mut(&mut self, path: &[usize]) -> Option<(&mut XmlElement, usize)> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for index in parents {
            current = match current.children.get_mut(*index)? {
                XmlNode::Element(element) => element,
                _ => return None,
            };
        }
        Some((current, *last))
    }

    fn has_structure(&self) -> bool {
        self.children.iter().any(|child| {
            matches!(child, XmlNode::Element(_) | XmlNode::Comment(_) | XmlNode::Instruction(_))
        })
    }

    fn write(&self, out: &mut String, depth: usize) {
        let indent = INDENT.repeat(depth);

        if self.children.is_empty() {
            let _ = writeln!(out, "{indent}<{}/>", self.raw_start);
            return;
        }

        if !self.has_structure() {
            let _ = write!(out, "{indent}<{}>", self.raw_start);
            for child in &self.children {
                write_inline(out, child);
            }
            let _ = writeln!(out, "</{}>", self.name);
            return;
        }

        let _ = writeln!(out, "{indent}<{}>", self.raw_start);
        for child in &self.children {
            write_block(out, child, depth + 1);
        }
        let _ = writeln!(out, "{indent}</{}>", self.name);
    }
}

/// Parsed document: prolog, single root element, epilog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    declaration: Option<String>,
    doctype: Option<String>,
    prolog: Vec<XmlNode>,
    pub root: XmlElement,
    epilog: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse `xml` into an owned tree.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ParseFailed`] with the byte position of the
    /// first syntax error, or when the document has no root element.
    pub fn parse(xml: &str) -> Result<Self, MergeError> {
        let mut reader = Reader::from_str(xml);
        // Leaf text keeps its surrounding whitespace; block layout is re-indented on output.
        reader.config_mut().trim_text(false);

        let mut declaration = None;
        let mut doctype = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut buf = Vec::new();

        loop {
            let position = reader.buffer_position();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = utf8(e.name().as_ref())?;
                    let element = XmlElement::new(name, utf8(e)?);
                    if stack.is_empty() && root.is_some() {
                        return Err(MergeError::ParseFailed("multiple root elements".into()));
                    }
                    stack.push(element);
                }
                Ok(Event::Empty(ref e)) => {
                    let name = utf8(e.name().as_ref())?;
                    let element = XmlElement::new(name, utf8(e)?);
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| MergeError::ParseFailed("unexpected closing tag".into()))?;
                    attach(&mut stack, &mut root, XmlNode::Element(element))?;
                }
                Ok(Event::Text(ref e)) => {
                    let text = utf8(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text)),
                        None if text.trim().is_empty() => {}
                        None => {
                            return Err(MergeError::ParseFailed(
                                "text outside the root element".into(),
                            ))
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    let node = XmlNode::CData(utf8(e)?);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => {
                            return Err(MergeError::ParseFailed(
                                "CDATA outside the root element".into(),
                            ))
                        }
                    }
                }
                Ok(Event::Comment(ref e)) => {
                    let node = XmlNode::Comment(utf8(e)?);
                    push_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Ok(Event::PI(ref e)) => {
                    let node = XmlNode::Instruction(utf8(e)?);
                    push_misc(&mut stack, &root, &mut prolog, &mut epilog, node);
                }
                Ok(Event::Decl(ref e)) => declaration = Some(utf8(e)?),
                Ok(Event::DocType(ref e)) => doctype = Some(utf8(e)?.trim().to_string()),
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(MergeError::ParseFailed(format!("near byte {position}: {e}")))
                }
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(MergeError::ParseFailed(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        let root = root.ok_or_else(|| MergeError::ParseFailed("document has no root".into()))?;
        Ok(Self { declaration, doctype, prolog, root, epilog })
    }

    /// Serialize with two-space indentation and a trailing newline.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        if let Some(declaration) = &self.declaration {
            let _ = writeln!(out, "<?{declaration}?>");
        }
        if let Some(doctype) = &self.doctype {
            let _ = writeln!(out, "<!DOCTYPE {doctype}>");
        }
        for node in &self.prolog {
            write_block(&mut out, node, 0);
        }
        self.root.write(&mut out, 0);
        for node in &self.epilog {
            write_block(&mut out, node, 0);
        }
        out
    }
}

fn utf8(bytes: &[u8]) -> Result<String, MergeError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| MergeError::ParseFailed(format!("invalid utf-8: {e}")))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    node: XmlNode,
) -> Result<(), MergeError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }

    match (node, root.is_some()) {
        (XmlNode::Element(element), false) => {
            *root = Some(element);
            Ok(())
        }
        _ => Err(MergeError::ParseFailed("multiple root elements".into())),
    }
}

fn push_misc(
    stack: &mut [XmlElement],
    root: &Option<XmlElement>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
    node: XmlNode,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

fn write_inline(out: &mut String, node: &XmlNode) {
    match node {
        XmlNode::Text(text) => out.push_str(text),
        XmlNode::CData(data) => {
            let _ = write!(out, "<![CDATA[{data}]]>");
        }
        // Inline content never contains structural nodes.
        XmlNode::Element(_) | XmlNode::Comment(_) | XmlNode::Instruction(_) => {}
    }
}

fn write_block(out: &mut String, node: &XmlNode, depth: usize) {
    let indent = INDENT.repeat(depth);
    match node {
        XmlNode::Element(element) => element.write(out, depth),
        XmlNode::Text(text) => {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                let _ = writeln!(out, "{indent}{trimmed}");
            }
        }
        XmlNode::CData(data) => {
            let _ = writeln!(out, "{indent}<![CDATA[{data}]]>");
        }
        XmlNode::Comment(comment) => {
            let _ = writeln!(out, "{indent}<!--{comment}-->");
        }
        XmlNode::Instruction(body) => {
            let _ = writeln!(out, "{indent}<?{body}?>");
        }
    }
}
