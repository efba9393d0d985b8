use super::{DecodeError, ResponseFormat, Result};
use crate::tree::{Mapping, Node};
use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Prefix for attribute keys when attributes are decoded.
pub const ATTRIBUTE_PREFIX: char = '@';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlOptions {
    /// Decode attributes as `@name` entries. Elements that carry attributes
    /// and text then keep the text under `#text`.
    pub attributes: bool,
}

struct Frame {
    name: String,
    attributes: Vec<(String, String)>,
    children: IndexMap<String, Vec<Node>>,
    text: String,
}

impl Frame {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            children: IndexMap::new(),
            text: String::new(),
        }
    }

    fn into_node(self) -> (String, Node) {
        let mut map = Mapping::new();
        for (key, value) in self.attributes {
            map.insert(format!("{}{}", ATTRIBUTE_PREFIX, key), Node::text(value));
        }

        let node = if self.children.is_empty() {
            let blank = self.text.trim().is_empty();
            let content = if blank {
                Node::List(vec![Node::text(self.text)])
            } else {
                Node::text(self.text.trim())
            };
            if map.is_empty() {
                content
            } else {
                if !blank {
                    map.insert("#text".to_string(), content);
                }
                Node::Map(map)
            }
        } else {
            for (key, mut nodes) in self.children {
                let value = if nodes.len() == 1 {
                    nodes.remove(0)
                } else {
                    Node::List(nodes)
                };
                map.insert(key, value);
            }
            Node::Map(map)
        };
        (self.name, node)
    }
}

pub(super) fn decode(body: &str, options: XmlOptions) -> Result<Node> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    let xml_error = |reader: &Reader<&[u8]>, message: String| DecodeError::Xml {
        position: reader.buffer_position() as u64,
        message,
    };

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(&reader, e.to_string()))?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(xml_error(&reader, "content after the root element".into()));
                }
                let frame = open_frame(&start, options).map_err(|m| xml_error(&reader, m))?;
                stack.push(frame);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(xml_error(&reader, "content after the root element".into()));
                }
                let frame = open_frame(&start, options).map_err(|m| xml_error(&reader, m))?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::End(end) => {
                let frame = stack.pop().ok_or_else(|| {
                    DecodeError::UnbalancedXml(format!(
                        "closing tag </{}> without an open element",
                        String::from_utf8_lossy(end.name().as_ref())
                    ))
                })?;
                close_frame(frame, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| xml_error(&reader, e.to_string()))?;
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(xml_error(&reader, "text outside the root element".into()));
                    }
                }
            }
            Event::CData(data) => {
                let data = data.into_inner();
                match stack.last_mut() {
                    Some(frame) => frame.text.push_str(&String::from_utf8_lossy(&data)),
                    None => {
                        return Err(xml_error(&reader, "CDATA outside the root element".into()));
                    }
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DecodeError::UnbalancedXml(format!(
            "element <{}> is never closed",
            open.name
        )));
    }

    let (name, node) = root.ok_or(DecodeError::EmptyDocument(ResponseFormat::Xml))?;
    let mut top = Mapping::new();
    top.insert(name, node);
    Ok(Node::Map(top))
}

fn open_frame(start: &BytesStart<'_>, options: XmlOptions) -> std::result::Result<Frame, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    if options.attributes {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| e.to_string())?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| e.to_string())?;
            attributes.push((key, value.into_owned()));
        }
    }
    Ok(Frame::new(name, attributes))
}

fn close_frame(frame: Frame, stack: &mut [Frame], root: &mut Option<(String, Node)>) {
    let (name, node) = frame.into_node();
    match stack.last_mut() {
        Some(parent) => parent.children.entry(name).or_default().push(node),
        None => *root = Some((name, node)),
    }
}
