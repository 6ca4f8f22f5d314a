//! Minimal Markdown node model.
//!
//! Memo content is parsed line by line into a sequence of top-level nodes,
//! one or more per source line. Block nodes (headings, list items,
//! paragraphs, fenced code blocks) own their inline `text`/`code` children;
//! [`InlineLayout`] decides whether a plain text line is wrapped in a
//! paragraph or emitted as bare inline nodes. [`restore`] turns a node
//! sequence back into text. The pair is not byte-exact (indentation and
//! task markers are normalised) but restoring is idempotent:
//!
//! ```
//! use memos_core::markdown::{parse, restore};
//!
//! let doc = "# Plan\n\n- [X] write\n   - review `diff`";
//! let once = restore(&parse(doc));
//! assert_eq!(once, "# Plan\n\n- [x] write\n  - review `diff`");
//! assert_eq!(restore(&parse(&once)), once);
//! ```
//!
//! The JSON form of a node is `{"type": <kind>, ...attributes}` with
//! camelCase kinds, matching what clients send and receive.

mod parse;
mod restore;
pub mod rules;

pub use parse::{parse, parse_with};
pub use restore::restore;

use serde::{Deserialize, Serialize};

/// How inline nodes of a plain text line are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InlineLayout {
    /// Wrap each text line's inline nodes in a `paragraph`.
    #[default]
    Nested,
    /// Emit a text line's inline nodes at top level, terminated by a
    /// `lineBreak`.
    Flat,
}

/// Parser configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOptions {
    #[serde(default)]
    pub layout: InlineLayout,
}

impl ParseOptions {
    pub fn flat() -> Self {
        Self {
            layout: InlineLayout::Flat,
        }
    }
}

/// One unit of parsed document structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    /// Inline literal text.
    Text { content: String },
    /// Inline code span, without its backticks.
    Code { content: String },
    LineBreak,
    Paragraph { children: Vec<Node> },
    Heading { level: u8, children: Vec<Node> },
    UnorderedListItem { indent: usize, children: Vec<Node> },
    OrderedListItem {
        indent: usize,
        /// Numbering text exactly as written.
        number: String,
        children: Vec<Node>,
    },
    TaskListItem {
        indent: usize,
        complete: bool,
        children: Vec<Node>,
    },
    CodeBlock { language: String, content: String },
    /// A node of a kind this codec does not know, received over the wire.
    /// Never produced by the parser.
    #[serde(skip_deserializing)]
    Unknown {
        kind: String,
        content: Option<String>,
    },
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn code(content: impl Into<String>) -> Self {
        Self::Code {
            content: content.into(),
        }
    }

    /// Kind name as it appears in the JSON `type` field.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Code { .. } => "code",
            Self::LineBreak => "lineBreak",
            Self::Paragraph { .. } => "paragraph",
            Self::Heading { .. } => "heading",
            Self::UnorderedListItem { .. } => "unorderedListItem",
            Self::OrderedListItem { .. } => "orderedListItem",
            Self::TaskListItem { .. } => "taskListItem",
            Self::CodeBlock { .. } => "codeBlock",
            Self::Unknown { kind, .. } => kind,
        }
    }

    /// Whether this is an inline (`text` or `code`) node.
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::Code { .. })
    }

    /// Inline children of a block node; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::UnorderedListItem { children, .. }
            | Self::OrderedListItem { children, .. }
            | Self::TaskListItem { children, .. } => children,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Paragraph { children }
            | Self::Heading { children, .. }
            | Self::UnorderedListItem { children, .. }
            | Self::OrderedListItem { children, .. }
            | Self::TaskListItem { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Decode a node received as JSON.
    ///
    /// Values that do not decode as a known kind become [`Node::Unknown`],
    /// keeping the `type` name and any string `content` field. Children are
    /// decoded one by one, so an unknown child degrades on its own and its
    /// known parent and siblings survive. Heading levels are clamped to 1..=6.
    pub fn from_value(value: serde_json::Value) -> Self {
        let serde_json::Value::Object(mut fields) = value else {
            tracing::debug!("non-object node kept as unknown");
            return Self::Unknown {
                kind: String::new(),
                content: None,
            };
        };

        let kind = fields
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        let content = fields
            .get("content")
            .and_then(serde_json::Value::as_str)
            .map(String::from);

        let children = match fields.get_mut("children") {
            Some(serde_json::Value::Array(items)) => Some(
                std::mem::take(items)
                    .into_iter()
                    .map(Node::from_value)
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        };

        match serde_json::from_value::<Node>(serde_json::Value::Object(fields)) {
            Ok(mut node) => {
                if let (Some(decoded), Some(slot)) = (children, node.children_mut()) {
                    *slot = decoded;
                }
                if let Self::Heading { level, .. } = &mut node {
                    *level = (*level).clamp(1, 6);
                }
                node
            }
            Err(e) => {
                tracing::debug!(kind = %kind, error = %e, "unrecognised node kept as unknown");
                Self::Unknown { kind, content }
            }
        }
    }
}
