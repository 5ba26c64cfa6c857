//! XML documents as nested JSON values.
//!
//! # Design
//! Follows the common "xml to dict" layout so callers can walk the result
//! the same way as a JSON body:
//! - the document is an object holding the root element under its name;
//! - attributes become `@name` keys, listed before child elements;
//! - an element with only text becomes a string, with nothing at all `null`;
//! - text next to attributes or children lands under `#text`;
//! - a child name seen more than once becomes an array, in document order.

use quick_xml::escape::EscapeError;
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XmlError {
    #[error(transparent)]
    Syntax(#[from] quick_xml::Error),

    #[error(transparent)]
    Attribute(#[from] AttrError),

    #[error(transparent)]
    Escape(#[from] EscapeError),

    #[error("no element found")]
    NoElement,

    #[error("unclosed element <{0}>")]
    Unclosed(String),

    #[error("junk after document element")]
    TrailingContent,

    #[error("syntax error: text outside of the document element")]
    StrayText,
}

struct Frame {
    name: String,
    attributes: Map<String, Value>,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut attributes = Map::new();
        for attribute in start.attributes() {
            let attribute = attribute?;
            let key = format!("@{}", String::from_utf8_lossy(attribute.key.as_ref()));
            let value = attribute.unescape_value()?.into_owned();
            attributes.insert(key, Value::String(value));
        }
        Ok(Frame {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            attributes,
            children: Map::new(),
            text: String::new(),
        })
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.children.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.children.insert(name, value);
            }
        }
    }

    fn into_value(self) -> Value {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return if text.is_empty() {
                Value::Null
            } else {
                Value::String(text.to_string())
            };
        }

        let mut object = self.attributes;
        object.extend(self.children);
        if !text.is_empty() {
            object.insert("#text".to_string(), Value::String(text.to_string()));
        }
        Value::Object(object)
    }
}

/// Parse `text` into the layout described in the module docs.
pub fn parse(text: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Frame> = Vec::new();
    let mut document: Option<Value> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if stack.is_empty() && document.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                stack.push(Frame::open(&start)?);
            }
            Event::Empty(start) => {
                if stack.is_empty() && document.is_some() {
                    return Err(XmlError::TrailingContent);
                }
                let frame = Frame::open(&start)?;
                close(frame, &mut stack, &mut document);
            }
            Event::End(_) => {
                // quick-xml already rejects mismatched end tags.
                let frame = stack.pop().ok_or(XmlError::StrayText)?;
                close(frame, &mut stack, &mut document);
            }
            Event::Text(content) => {
                let content = content.unescape()?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&content),
                    None if content.trim().is_empty() => {}
                    None => return Err(XmlError::StrayText),
                }
            }
            Event::CData(content) => {
                let content = String::from_utf8_lossy(&content);
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&content),
                    None => return Err(XmlError::StrayText),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(frame) = stack.last() {
        return Err(XmlError::Unclosed(frame.name.clone()));
    }
    document.ok_or(XmlError::NoElement)
}

fn close(frame: Frame, stack: &mut [Frame], document: &mut Option<Value>) {
    let name = frame.name.clone();
    let value = frame.into_value();
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None => {
            let mut root = Map::new();
            root.insert(name, value);
            *document = Some(Value::Object(root));
        }
    }
}
