//! Markup parsing into [`Node`] trees
//!
//! Built on quick-xml's pull reader. Element names are reduced to their local
//! part (`p:FatturaElettronica` becomes `FatturaElettronica`), attributes are
//! dropped and only the text of childless elements is kept.

use crate::error::{FlattenError, Result};
use crate::tree::Node;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// An element whose end tag has not been seen yet
struct OpenElement {
    tag: String,
    text: String,
    children: Vec<Node>,
}

impl OpenElement {
    fn new(start: &BytesStart) -> Self {
        OpenElement {
            tag: local_name(start),
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn finish(self) -> Node {
        if self.children.is_empty() {
            Node::leaf(self.tag, self.text)
        } else {
            // Text interleaved with child elements is not a leaf value
            Node::Branch {
                tag: self.tag,
                children: self.children,
            }
        }
    }
}

/// Parse raw document bytes into the tree of its root element.
///
/// `document` names the document in error messages.
pub fn parse_document(document: &str, bytes: &[u8]) -> Result<Node> {
    let content = std::str::from_utf8(bytes).map_err(|_| FlattenError::Encoding {
        document: document.to_string(),
    })?;
    // A UTF-8 byte order mark is not markup
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = Reader::from_str(content);
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if stack.is_empty() && root.is_some() {
                    return Err(FlattenError::parse(document, "multiple root elements"));
                }
                stack.push(OpenElement::new(e));
            }
            Ok(Event::Empty(ref e)) => {
                let node = Node::leaf(local_name(e), "");
                attach(document, node, &mut stack, &mut root)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().map_err(|err| FlattenError::parse(document, err))?;
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(FlattenError::parse(
                            document,
                            "text outside of the root element",
                        ))
                    }
                }
            }
            Ok(Event::CData(ref e)) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(e));
                }
            }
            Ok(Event::End(_)) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| FlattenError::parse(document, "unexpected closing tag"))?;
                attach(document, open.finish(), &mut stack, &mut root)?;
            }
            Ok(Event::Eof) => break,
            Err(err) => {
                return Err(FlattenError::parse(
                    document,
                    format!("error at position {}: {}", reader.error_position(), err),
                ))
            }
            // Declaration, comments, processing instructions, doctype
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FlattenError::parse(
            document,
            format!("element '{}' is never closed", open.tag),
        ));
    }

    root.ok_or_else(|| FlattenError::parse(document, "no root element"))
}

/// Hang a finished node under its parent, or make it the root
fn attach(
    document: &str,
    node: Node,
    stack: &mut [OpenElement],
    root: &mut Option<Node>,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        return Err(FlattenError::parse(document, "multiple root elements"));
    } else {
        *root = Some(node);
    }
    Ok(())
}

fn local_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.local_name().as_ref()).into_owned()
}
