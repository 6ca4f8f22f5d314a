//! Single-line rules, in precedence order.
//!
//! Each rule inspects one line and either declines (`None`) or produces the
//! nodes for that line. The parser tries [`LINE_RULES`] top to bottom and
//! takes the first match. Fenced code blocks span several lines and are
//! handled by the parser before the table is consulted; see
//! [`fence_open`] and [`is_fence_close`].

use once_cell::sync::Lazy;
use regex::Regex;

use super::{InlineLayout, Node};

static TASK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)- \[([ xX])\](?: (.*))?$").expect("valid task regex"));
static UNORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)- (.*)$").expect("valid unordered list regex"));
static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(\d+)\. (.*)$").expect("valid ordered list regex"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6}) (.*)$").expect("valid heading regex"));
static INLINE_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));
static FENCE_OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```\s*([^`\s]*)\s*$").expect("valid fence regex"));
static FENCE_CLOSE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```\s*$").expect("valid fence close regex"));

/// One entry of the rule table.
#[derive(Clone, Copy)]
pub struct LineRule {
    /// Node kind the rule produces, for tracing and tests.
    pub name: &'static str,
    pub apply: fn(&str, InlineLayout) -> Option<Vec<Node>>,
}

impl std::fmt::Debug for LineRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRule").field("name", &self.name).finish()
    }
}

/// The rule table. Order is precedence.
pub static LINE_RULES: [LineRule; 7] = [
    LineRule {
        name: "taskListItem",
        apply: task_list_item,
    },
    LineRule {
        name: "unorderedListItem",
        apply: unordered_list_item,
    },
    LineRule {
        name: "orderedListItem",
        apply: ordered_list_item,
    },
    LineRule {
        name: "heading",
        apply: heading,
    },
    LineRule {
        name: "inlineCode",
        apply: inline_code_line,
    },
    LineRule {
        name: "text",
        apply: plain_text,
    },
    LineRule {
        name: "lineBreak",
        apply: blank_line,
    },
];

/// Look up a rule by name.
pub fn rule(name: &str) -> Option<&'static LineRule> {
    LINE_RULES.iter().find(|r| r.name == name)
}

/// Language tag if `line` opens a fenced code block.
pub fn fence_open(line: &str) -> Option<&str> {
    FENCE_OPEN_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn is_fence_close(line: &str) -> bool {
    FENCE_CLOSE_RE.is_match(line)
}

/// Nesting depth from leading whitespace: two characters per level.
pub fn indent_of(leading: &str) -> usize {
    leading.chars().count() / 2
}

/// Split text into `code` spans and the non-empty `text` fragments between
/// them.
pub fn split_inline(content: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;

    for caps in INLINE_CODE_RE.captures_iter(content) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            nodes.push(Node::text(&content[last..whole.start()]));
        }
        nodes.push(Node::code(inner.as_str()));
        last = whole.end();
    }

    if last < content.len() {
        nodes.push(Node::text(&content[last..]));
    }

    nodes
}

fn task_list_item(line: &str, _layout: InlineLayout) -> Option<Vec<Node>> {
    let caps = TASK_RE.captures(line)?;
    let content = caps.get(3).map_or("", |m| m.as_str());
    Some(vec![Node::TaskListItem {
        indent: indent_of(&caps[1]),
        complete: caps[2].eq_ignore_ascii_case("x"),
        children: split_inline(content),
    }])
}

fn unordered_list_item(line: &str, _layout: InlineLayout) -> Option<Vec<Node>> {
    let caps = UNORDERED_RE.captures(line)?;
    Some(vec![Node::UnorderedListItem {
        indent: indent_of(&caps[1]),
        children: split_inline(&caps[2]),
    }])
}

fn ordered_list_item(line: &str, _layout: InlineLayout) -> Option<Vec<Node>> {
    let caps = ORDERED_RE.captures(line)?;
    Some(vec![Node::OrderedListItem {
        indent: indent_of(&caps[1]),
        number: caps[2].to_string(),
        children: split_inline(&caps[3]),
    }])
}

fn heading(line: &str, _layout: InlineLayout) -> Option<Vec<Node>> {
    let caps = HEADING_RE.captures(line)?;
    Some(vec![Node::Heading {
        // At most six '#' by construction.
        level: caps[1].len() as u8,
        children: split_inline(&caps[2]),
    }])
}

fn inline_code_line(line: &str, layout: InlineLayout) -> Option<Vec<Node>> {
    if !INLINE_CODE_RE.is_match(line) {
        return None;
    }
    Some(text_line(split_inline(line), layout))
}

fn plain_text(line: &str, layout: InlineLayout) -> Option<Vec<Node>> {
    if line.trim().is_empty() {
        return None;
    }
    Some(text_line(vec![Node::text(line)], layout))
}

fn blank_line(line: &str, _layout: InlineLayout) -> Option<Vec<Node>> {
    line.trim().is_empty().then(|| vec![Node::LineBreak])
}

fn text_line(inline: Vec<Node>, layout: InlineLayout) -> Vec<Node> {
    match layout {
        InlineLayout::Nested => vec![Node::Paragraph { children: inline }],
        InlineLayout::Flat => {
            let mut nodes = inline;
            nodes.push(Node::LineBreak);
            nodes
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(name: &str, line: &str) -> Option<Vec<Node>> {
        (rule(name).unwrap().apply)(line, InlineLayout::Nested)
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = LINE_RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "taskListItem",
                "unorderedListItem",
                "orderedListItem",
                "heading",
                "inlineCode",
                "text",
                "lineBreak"
            ]
        );
    }

    #[test]
    fn test_task_rule() {
        assert_eq!(
            apply("taskListItem", "    - [X] ship it"),
            Some(vec![Node::TaskListItem {
                indent: 2,
                complete: true,
                children: vec![Node::text("ship it")],
            }])
        );
        assert_eq!(
            apply("taskListItem", "- [ ]"),
            Some(vec![Node::TaskListItem {
                indent: 0,
                complete: false,
                children: vec![],
            }])
        );
        assert_eq!(apply("taskListItem", "- [y] nope"), None);
        assert_eq!(apply("taskListItem", "- [x]nospace"), None);
    }

    #[test]
    fn test_unordered_rule() {
        assert_eq!(
            apply("unorderedListItem", "   - item"),
            Some(vec![Node::UnorderedListItem {
                indent: 1,
                children: vec![Node::text("item")],
            }])
        );
        assert_eq!(apply("unorderedListItem", "-item"), None);
        assert_eq!(apply("unorderedListItem", "* item"), None);
    }

    #[test]
    fn test_ordered_rule_keeps_numbering_text() {
        assert_eq!(
            apply("orderedListItem", "  007. bond"),
            Some(vec![Node::OrderedListItem {
                indent: 1,
                number: "007".into(),
                children: vec![Node::text("bond")],
            }])
        );
        assert_eq!(apply("orderedListItem", "1.no space"), None);
    }

    #[test]
    fn test_heading_rule() {
        assert_eq!(
            apply("heading", "### Three"),
            Some(vec![Node::Heading {
                level: 3,
                children: vec![Node::text("Three")],
            }])
        );
        assert_eq!(apply("heading", "####### seven"), None);
        assert_eq!(apply("heading", "#nospace"), None);
    }

    #[test]
    fn test_inline_code_rule_layouts() {
        let nested = apply("inlineCode", "run `cargo` now");
        assert_eq!(
            nested,
            Some(vec![Node::Paragraph {
                children: vec![Node::text("run "), Node::code("cargo"), Node::text(" now")],
            }])
        );

        let flat = (rule("inlineCode").unwrap().apply)("`a``b`", InlineLayout::Flat);
        assert_eq!(
            flat,
            Some(vec![Node::code("a"), Node::code("b"), Node::LineBreak])
        );

        assert_eq!(apply("inlineCode", "no code ``here"), None);
    }

    #[test]
    fn test_plain_and_blank_rules() {
        assert_eq!(
            apply("text", "  just words"),
            Some(vec![Node::Paragraph {
                children: vec![Node::text("  just words")],
            }])
        );
        assert_eq!(apply("text", " \t "), None);
        assert_eq!(apply("lineBreak", " \t "), Some(vec![Node::LineBreak]));
        assert_eq!(apply("lineBreak", "x"), None);
    }

    #[test]
    fn test_fence_detection() {
        assert_eq!(fence_open("```rust"), Some("rust"));
        assert_eq!(fence_open("  ```"), Some(""));
        assert_eq!(fence_open("``` js "), Some("js"));
        assert_eq!(fence_open("```a```"), None);
        assert!(is_fence_close("```"));
        assert!(is_fence_close("  ```  "));
        assert!(!is_fence_close("```js"));
    }

    #[test]
    fn test_split_inline_unmatched_backtick() {
        assert_eq!(
            split_inline("a ``b`` c"),
            vec![Node::text("a `"), Node::code("b"), Node::text("` c")]
        );
        assert!(split_inline("").is_empty());
    }
}
