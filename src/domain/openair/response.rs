//! Reply parsing for the OpenAir XML API.
//!
//! Replies are turned into a generic [`serde_json::Value`] tree so callers can
//! address any field by path without a schema:
//!
//! - each element becomes a key under its parent object
//! - attributes become `@name` keys
//! - element text becomes `#text`, or the plain string value when the element
//!   has no attributes or children
//! - an element with nothing inside becomes `null`
//! - repeated sibling elements are collected into an array
//! - whitespace-only text is dropped
//!
//! ```text
//! <response><Auth status="0"/><Read status="0"><Task><id>7</id></Task></Read></response>
//!
//! {"response": {"Auth": {"@status": "0"},
//!               "Read": {"@status": "0", "Task": {"id": "7"}}}}
//! ```

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};
use std::fmt::Display;

use crate::domain::gateway::GatewayError;

/// Parses a reply document into a nested value tree.
///
/// # Errors
///
/// Returns [`GatewayError::Parse`] for malformed XML, mismatched tags, an
/// empty document, or more than one root element.
pub fn parse_tree(raw: &str) -> Result<Value, GatewayError> {
    let mut reader = Reader::from_str(raw);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| GatewayError::Parse("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape().map_err(parse_error)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(GatewayError::Parse(format!(
            "document ended inside <{}>",
            open.name
        )));
    }

    let root = root.ok_or_else(|| GatewayError::Parse("empty document".to_string()))?;
    let mut tree = Map::new();
    tree.insert(root.name.clone(), root.into_value());
    Ok(Value::Object(tree))
}

/// Reads the `Auth` status attribute from a parsed reply.
///
/// Looks at `response → Auth → @status`. When `Auth` repeats, the first one
/// wins. Returns `None` if any step is missing or the status is not a string.
pub fn auth_status(tree: &Value) -> Option<&str> {
    let auth = tree.get("response")?.get("Auth")?;
    let auth = match auth {
        Value::Array(items) => items.first()?,
        single => single,
    };
    auth.get("@status")?.as_str()
}

fn parse_error(e: impl Display) -> GatewayError {
    GatewayError::Parse(e.to_string())
}

struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, GatewayError> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut fields = Map::new();

        for attr in start.attributes() {
            let attr = attr.map_err(parse_error)?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr.unescape_value().map_err(parse_error)?.into_owned();
            fields.insert(key, Value::String(value));
        }

        Ok(Self {
            name,
            fields,
            text: String::new(),
        })
    }

    fn into_value(mut self) -> Value {
        if self.fields.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            if !self.text.is_empty() {
                self.fields.insert("#text".to_string(), Value::String(self.text));
            }
            Value::Object(self.fields)
        }
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), GatewayError> {
    match stack.last_mut() {
        Some(parent) => {
            let name = element.name.clone();
            insert_child(&mut parent.fields, name, element.into_value());
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(GatewayError::Parse(
            "more than one root element".to_string(),
        )),
    }
}

fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}
