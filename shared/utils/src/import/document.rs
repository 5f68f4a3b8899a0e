//! Owned XML element tree
//!
//! Built in one pass over `quick-xml` events. Lookups mirror CSS
//! `querySelector(name)`: first matching descendant in document order.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::error::ImportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.child_elements().find(|element| element.name == name)
    }

    /// First descendant (depth-first, document order) with the given tag name.
    pub fn descendant(&self, name: &str) -> Option<&XmlElement> {
        for element in self.child_elements() {
            if element.name == name {
                return Some(element);
            }
            if let Some(found) = element.descendant(name) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => element.collect_text(out),
            }
        }
    }
}

/// A parsed document with exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, ImportError> {
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                ImportError::malformed(format!("{} (at byte {})", e, position))
            })?;

            match event {
                Event::Start(start) => {
                    let name = String::from_utf8_lossy(start.name().as_ref()).to_string();
                    if stack.is_empty() && root.is_some() {
                        return Err(ImportError::malformed(format!(
                            "second root element <{}> (at byte {})",
                            name, position
                        )));
                    }
                    stack.push(XmlElement::new(name));
                }
                Event::Empty(empty) => {
                    let element = XmlElement::new(String::from_utf8_lossy(empty.name().as_ref()).to_string());
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::End(_) => {
                    // quick-xml has already checked that the end tag matches.
                    let element = stack.pop().ok_or_else(|| {
                        ImportError::malformed(format!("unexpected closing tag (at byte {})", position))
                    })?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| ImportError::malformed(format!("{} (at byte {})", e, position)))?;
                    push_text(&mut stack, &value, position)?;
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data.into_inner()).to_string();
                    push_text(&mut stack, &value, position)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ImportError::malformed(format!(
                "element <{}> is never closed",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| ImportError::malformed("document has no root element"))
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: usize,
) -> Result<(), ImportError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(ImportError::malformed(format!(
            "second root element <{}> (at byte {})",
            element.name, position
        ))),
    }
}

fn push_text(stack: &mut [XmlElement], value: &str, position: usize) -> Result<(), ImportError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Text(value.to_string()));
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(ImportError::malformed(format!(
            "text outside the root element (at byte {})",
            position
        ))),
    }
}
