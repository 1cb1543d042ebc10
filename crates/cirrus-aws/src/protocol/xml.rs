//! Minimal XML tree and its JSON rendering.
//!
//! Attributes and namespaces are dropped; only element names (local part),
//! text and nesting survive. That is all the S3, IAM and STS response
//! shapes carry.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::AwsError;
use crate::operations::XmlShape;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search below this element.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find_map(|c| if c.name == name { Some(c) } else { c.find(name) })
    }

    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name)
            .map(|e| e.text.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Parse a document and return its root element.
pub fn parse(xml: &str) -> Result<Element, AwsError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    loop {
        let event = reader.read_event().map_err(|e| {
            AwsError::Parse(format!(
                "invalid XML at position {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Start(e) => stack.push(Element::named(e.local_name().as_ref())),
            Event::Empty(e) => {
                let element = Element::named(e.local_name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| AwsError::Parse(format!("invalid XML text: {e}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| AwsError::Parse("unbalanced XML end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => return Ok(element),
                }
            }
            Event::Eof => return Err(AwsError::Parse("XML document has no root element".into())),
            _ => {}
        }
    }
}

/// Render a whole document. A root without children becomes `{root: text}`.
pub fn document_to_json(root: &Element, shape: &XmlShape) -> Map<String, Value> {
    let mut out = Map::new();
    if root.children.is_empty() {
        out.insert(root.name.clone(), Value::String(root.text.clone()));
        return out;
    }
    match element_to_json(root, shape) {
        Value::Object(map) if !shape.keep_root => map,
        other => {
            out.insert(root.name.clone(), other);
            out
        }
    }
}

/// Render an element's children as an object, even when it has none.
pub fn object_to_json(element: &Element, shape: &XmlShape) -> Map<String, Value> {
    match element_to_json(element, shape) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Leaves become strings. An element whose children are all `<member>` is a
/// list (awsQuery). Otherwise children become fields; repeated names and
/// names in `shape.flattened` collect into arrays.
pub fn element_to_json(element: &Element, shape: &XmlShape) -> Value {
    if element.children.is_empty() {
        return Value::String(element.text.clone());
    }
    if element.children.iter().all(|c| c.name == "member") {
        return Value::Array(
            element
                .children
                .iter()
                .map(|c| element_to_json(c, shape))
                .collect(),
        );
    }

    let mut groups: Vec<(&str, Vec<Value>)> = Vec::new();
    for child in &element.children {
        let value = if shape.wrapped.contains(&child.name.as_str()) {
            Value::Array(
                child
                    .children
                    .iter()
                    .map(|c| element_to_json(c, shape))
                    .collect(),
            )
        } else {
            element_to_json(child, shape)
        };
        match groups.iter_mut().find(|(name, _)| *name == child.name) {
            Some((_, values)) => values.push(value),
            None => groups.push((child.name.as_str(), vec![value])),
        }
    }

    let mut map = Map::new();
    for (name, mut values) in groups {
        let value = if values.len() == 1 && !shape.flattened.contains(&name) {
            values.remove(0)
        } else {
            Value::Array(values)
        };
        map.insert(name.to_string(), value);
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const LIST_BUCKETS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc</ID><DisplayName>me</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>a</Name><CreationDate>2024-01-01T00:00:00.000Z</CreationDate></Bucket>
    <Bucket><Name>b &amp; c</Name><CreationDate>2024-02-01T00:00:00.000Z</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;

    #[test]
    fn parses_nested_elements_and_entities() {
        let root = parse(LIST_BUCKETS).unwrap();
        assert_eq!(root.name, "ListAllMyBucketsResult");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.find_text("DisplayName"), Some("me"));
        let buckets = root.child("Buckets").unwrap();
        assert_eq!(buckets.children[1].child("Name").unwrap().text, "b & c");
    }

    #[test]
    fn wrapped_list_becomes_array() {
        let root = parse(LIST_BUCKETS).unwrap();
        let json = Value::Object(document_to_json(&root, &XmlShape::wrapped(&["Buckets"])));
        assert_eq!(json["Owner"]["ID"], "abc");
        assert_eq!(json["Buckets"][0]["Name"], "a");
        assert_eq!(json["Buckets"][1]["Name"], "b & c");
    }

    #[test]
    fn empty_wrapped_list_is_empty_array() {
        let root = parse("<ListAllMyBucketsResult><Buckets/><Owner><ID>x</ID></Owner></ListAllMyBucketsResult>").unwrap();
        let json = Value::Object(document_to_json(&root, &XmlShape::wrapped(&["Buckets"])));
        assert_eq!(json["Buckets"], json!([]));
    }

    #[test]
    fn flattened_single_entry_is_still_array() {
        let root = parse(
            "<ListBucketResult><Name>b</Name><KeyCount>1</KeyCount>\
             <Contents><Key>x.txt</Key><Size>3</Size></Contents></ListBucketResult>",
        )
        .unwrap();
        let json = Value::Object(document_to_json(
            &root,
            &XmlShape::flattened(&["Contents", "CommonPrefixes"]),
        ));
        assert_eq!(json["Contents"], json!([{"Key": "x.txt", "Size": "3"}]));
        assert!(json.get("CommonPrefixes").is_none());
    }

    #[test]
    fn repeated_elements_collect_without_hint() {
        let root = parse("<R><Item>1</Item><Item>2</Item><Other>x</Other></R>").unwrap();
        let json = Value::Object(document_to_json(&root, &XmlShape::PLAIN));
        assert_eq!(json, json!({"Item": ["1", "2"], "Other": "x"}));
    }

    #[test]
    fn member_lists_become_arrays() {
        let root = parse(
            "<ListRolesResult><IsTruncated>false</IsTruncated><Roles>\
             <member><RoleName>a</RoleName></member><member><RoleName>b</RoleName></member>\
             </Roles></ListRolesResult>",
        )
        .unwrap();
        let json = Value::Object(object_to_json(&root, &XmlShape::PLAIN));
        assert_eq!(json["Roles"][1]["RoleName"], "b");
        assert_eq!(json["IsTruncated"], "false");
    }

    #[test]
    fn childless_root_keeps_its_name() {
        let root = parse(r#"<LocationConstraint xmlns="x">eu-west-1</LocationConstraint>"#).unwrap();
        assert_eq!(
            Value::Object(document_to_json(&root, &XmlShape::PLAIN)),
            json!({"LocationConstraint": "eu-west-1"})
        );
        let empty = parse(r#"<LocationConstraint xmlns="x"/>"#).unwrap();
        assert_eq!(
            Value::Object(document_to_json(&empty, &XmlShape::PLAIN)),
            json!({"LocationConstraint": ""})
        );
    }

    #[test]
    fn keep_root_nests_under_document_element() {
        let root = parse("<CopyObjectResult><ETag>\"e\"</ETag></CopyObjectResult>").unwrap();
        let json = Value::Object(document_to_json(&root, &XmlShape::keep_root()));
        assert_eq!(json["CopyObjectResult"]["ETag"], "\"e\"");
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(parse("<a><b></a>"), Err(AwsError::Parse(_))));
        assert!(matches!(parse(""), Err(AwsError::Parse(_))));
    }
}
