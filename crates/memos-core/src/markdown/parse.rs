use super::rules::{self, LINE_RULES};
use super::{Node, ParseOptions};

/// Parse a document with the default (nested) layout.
pub fn parse(document: &str) -> Vec<Node> {
    parse_with(document, ParseOptions::default())
}

/// Parse a document line by line in a single forward pass.
///
/// Never fails: every line maps to at least one node, and a line no rule
/// recognises becomes plain text.
pub fn parse_with(document: &str, options: ParseOptions) -> Vec<Node> {
    if document.is_empty() {
        return Vec::new();
    }

    let mut nodes = Vec::new();
    let mut lines = document
        .split('\n')
        .map(|line| line.trim_end_matches('\r'));

    while let Some(line) = lines.next() {
        if let Some(language) = rules::fence_open(line) {
            let mut body: Vec<&str> = Vec::new();
            let mut closed = false;
            for inner in lines.by_ref() {
                if rules::is_fence_close(inner) {
                    closed = true;
                    break;
                }
                body.push(inner);
            }
            if !closed {
                tracing::debug!(language, "unterminated code fence runs to end of input");
            }
            nodes.push(Node::CodeBlock {
                language: language.to_string(),
                content: body.join("\n"),
            });
            continue;
        }

        match LINE_RULES
            .iter()
            .find_map(|rule| (rule.apply)(line, options.layout))
        {
            Some(produced) => nodes.extend(produced),
            None => {
                // The table ends with catch-alls for text and blank lines, so
                // this only guards against a future table edit.
                tracing::debug!(line, "no rule matched, degrading to text");
                nodes.push(Node::Paragraph {
                    children: vec![Node::text(line)],
                });
            }
        }
    }

    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_heading() {
        assert_eq!(
            parse("# Hello"),
            vec![Node::Heading {
                level: 1,
                children: vec![Node::text("Hello")],
            }]
        );
    }

    #[test]
    fn test_task_items_in_order() {
        assert_eq!(
            parse("- [x] done\n- [ ] todo"),
            vec![
                Node::TaskListItem {
                    indent: 0,
                    complete: true,
                    children: vec![Node::text("done")],
                },
                Node::TaskListItem {
                    indent: 0,
                    complete: false,
                    children: vec![Node::text("todo")],
                },
            ]
        );
    }

    #[test]
    fn test_fenced_block() {
        assert_eq!(
            parse("```js\ncode\n```"),
            vec![Node::CodeBlock {
                language: "js".into(),
                content: "code".into(),
            }]
        );
    }

    #[test]
    fn test_fence_consumes_lines_verbatim() {
        let doc = "```\n# not a heading\n- not a list\n\n```\nafter";
        assert_eq!(
            parse(doc),
            vec![
                Node::CodeBlock {
                    language: String::new(),
                    content: "# not a heading\n- not a list\n".into(),
                },
                Node::Paragraph {
                    children: vec![Node::text("after")],
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        assert_eq!(
            parse("  ```py\nprint(1)\nprint(2)"),
            vec![Node::CodeBlock {
                language: "py".into(),
                content: "print(1)\nprint(2)".into(),
            }]
        );
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        assert_eq!(
            parse("a\r\n\r\nb\n"),
            vec![
                Node::Paragraph {
                    children: vec![Node::text("a")],
                },
                Node::LineBreak,
                Node::Paragraph {
                    children: vec![Node::text("b")],
                },
                Node::LineBreak,
            ]
        );
    }

    #[test]
    fn test_repeated_carriage_returns_are_dropped() {
        assert_eq!(
            parse("a\r\r"),
            vec![Node::Paragraph {
                children: vec![Node::text("a")],
            }]
        );
        assert_eq!(
            parse("```\ncode\r\r\n```"),
            vec![Node::CodeBlock {
                language: String::new(),
                content: "code".into(),
            }]
        );
    }

    #[test]
    fn test_nested_list_indent() {
        let nodes = parse("- a\n  - b\n    1. c");
        let indents: Vec<usize> = nodes
            .iter()
            .map(|n| match n {
                Node::UnorderedListItem { indent, .. } | Node::OrderedListItem { indent, .. } => {
                    *indent
                }
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(indents, vec![0, 1, 2]);
    }

    #[test]
    fn test_flat_layout() {
        let nodes = parse_with("see `x`\nplain\n# H", ParseOptions::flat());
        assert_eq!(
            nodes,
            vec![
                Node::text("see "),
                Node::code("x"),
                Node::LineBreak,
                Node::text("plain"),
                Node::LineBreak,
                Node::Heading {
                    level: 1,
                    children: vec![Node::text("H")],
                },
            ]
        );
    }

    #[test]
    fn test_pathological_input_terminates() {
        let doc = "`".repeat(1000) + &"\n".repeat(100) + &"#".repeat(500);
        let nodes = parse(&doc);
        // one text line, 99 blank lines, one text line
        assert_eq!(nodes.len(), 101);
    }
}
