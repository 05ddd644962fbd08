use serde::{Deserialize, Serialize};

/// One element of a parsed document.
///
/// An element either has child elements (`Branch`) or carries a single text
/// value (`Leaf`). Attributes and text mixed in between child elements are
/// not represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Branch { tag: String, children: Vec<Node> },
    Leaf { tag: String, text: String },
}

impl Node {
    /// Build a branch node. Without children the node degrades to an empty leaf.
    pub fn branch(tag: impl Into<String>, children: Vec<Node>) -> Self {
        let tag = tag.into();
        if children.is_empty() {
            Node::Leaf {
                tag,
                text: String::new(),
            }
        } else {
            Node::Branch { tag, children }
        }
    }

    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Node::Leaf {
            tag: tag.into(),
            text: text.into(),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Node::Branch { tag, .. } | Node::Leaf { tag, .. } => tag,
        }
    }

    /// Child nodes in document order (empty for leaves)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Branch { children, .. } => children,
            Node::Leaf { .. } => &[],
        }
    }

    /// Text value (None for branches)
    pub fn text(&self) -> Option<&str> {
        match self {
            Node::Branch { .. } => None,
            Node::Leaf { text, .. } => Some(text),
        }
    }

    /// Number of leaves below (and including) this node
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Branch { children, .. } => children.iter().map(Node::leaf_count).sum(),
            Node::Leaf { .. } => 1,
        }
    }

    /// First leaf in document order whose text satisfies `predicate`
    pub fn find_leaf<F: Fn(&str) -> bool>(&self, predicate: F) -> Option<&Node> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Node::Leaf { text, .. } if predicate(text) => return Some(node),
                Node::Leaf { .. } => {}
                Node::Branch { children, .. } => pending.extend(children.iter().rev()),
            }
        }
        None
    }
}
