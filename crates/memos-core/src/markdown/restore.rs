use super::Node;

/// Restore text from a node sequence.
///
/// Block nodes each produce one line (a code block produces its fence and
/// body lines). Top-level inline nodes accumulate into the current line
/// until a `lineBreak` or a block node ends it; a `lineBreak` with nothing
/// pending is an empty line. Lines are joined with `\n`.
pub fn restore(nodes: &[Node]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut pending: Option<String> = None;

    for node in nodes {
        if node.is_inline() {
            push_inline(pending.get_or_insert_with(String::new), node);
            continue;
        }

        match node {
            Node::LineBreak => lines.push(pending.take().unwrap_or_default()),
            block => {
                if let Some(line) = pending.take() {
                    lines.push(line);
                }
                restore_block(block, &mut lines);
            }
        }
    }

    if let Some(line) = pending {
        lines.push(line);
    }

    lines.join("\n")
}

fn restore_block(node: &Node, lines: &mut Vec<String>) {
    match node {
        Node::Paragraph { children } => lines.push(inline_text(children)),
        Node::Heading { level, children } => lines.push(format!(
            "{} {}",
            "#".repeat(usize::from((*level).clamp(1, 6))),
            inline_text(children)
        )),
        Node::UnorderedListItem { indent, children } => {
            lines.push(format!("{}- {}", pad(*indent), inline_text(children)))
        }
        Node::OrderedListItem {
            indent,
            number,
            children,
        } => lines.push(format!(
            "{}{}. {}",
            pad(*indent),
            number,
            inline_text(children)
        )),
        Node::TaskListItem {
            indent,
            complete,
            children,
        } => lines.push(format!(
            "{}- [{}] {}",
            pad(*indent),
            if *complete { 'x' } else { ' ' },
            inline_text(children)
        )),
        Node::CodeBlock { language, content } => {
            lines.push(format!("```{}", language));
            if !content.is_empty() {
                lines.extend(content.split('\n').map(String::from));
            }
            lines.push("```".to_string());
        }
        Node::Unknown { kind, content } => {
            tracing::debug!(kind = %kind, "restoring unknown node from literal content");
            lines.push(content.clone().unwrap_or_default());
        }
        // Inline nodes and line breaks are handled by the caller.
        Node::Text { .. } | Node::Code { .. } | Node::LineBreak => {}
    }
}

fn inline_text(children: &[Node]) -> String {
    let mut out = String::new();
    for child in children {
        push_inline(&mut out, child);
    }
    out
}

fn push_inline(out: &mut String, node: &Node) {
    match node {
        Node::Text { content } => out.push_str(content),
        Node::Code { content } => {
            out.push('`');
            out.push_str(content);
            out.push('`');
        }
        Node::Unknown {
            content: Some(content),
            ..
        } => out.push_str(content),
        _ => {}
    }
}

fn pad(indent: usize) -> String {
    "  ".repeat(indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{ParseOptions, parse, parse_with};

    #[test]
    fn test_empty() {
        assert_eq!(restore(&[]), "");
    }

    #[test]
    fn test_heading_round_trip() {
        assert_eq!(restore(&parse("# Hello")), "# Hello");
    }

    #[test]
    fn test_block_templates() {
        let nodes = vec![
            Node::TaskListItem {
                indent: 0,
                complete: true,
                children: vec![Node::text("done")],
            },
            Node::TaskListItem {
                indent: 1,
                complete: false,
                children: vec![Node::text("todo")],
            },
            Node::UnorderedListItem {
                indent: 0,
                children: vec![Node::text("use "), Node::code("cargo")],
            },
            Node::OrderedListItem {
                indent: 2,
                number: "3".into(),
                children: vec![Node::text("third")],
            },
            Node::Heading {
                level: 4,
                children: vec![Node::text("H4")],
            },
            Node::LineBreak,
            Node::Paragraph {
                children: vec![Node::text("plain")],
            },
        ];
        assert_eq!(
            restore(&nodes),
            "- [x] done\n  - [ ] todo\n- use `cargo`\n    3. third\n#### H4\n\nplain"
        );
    }

    #[test]
    fn test_heading_level_out_of_range() {
        let heading = |level| Node::Heading {
            level,
            children: vec![Node::text("t")],
        };
        assert_eq!(restore(&[heading(0)]), "# t");
        assert_eq!(restore(&[heading(7)]), "###### t");
        assert_eq!(restore(&parse(&restore(&[heading(200)]))), "###### t");
    }

    #[test]
    fn test_code_block() {
        let nodes = parse("```js\ncode\n```");
        assert_eq!(restore(&nodes), "```js\ncode\n```");

        let empty = Node::CodeBlock {
            language: String::new(),
            content: String::new(),
        };
        assert_eq!(restore(&[empty]), "```\n```");
    }

    #[test]
    fn test_unterminated_fence_gets_closed() {
        assert_eq!(restore(&parse("```\nx")), "```\nx\n```");
    }

    #[test]
    fn test_flat_layout_rejoins_lines() {
        let doc = "see `x` here\n\nplain\n- item";
        assert_eq!(restore(&parse_with(doc, ParseOptions::flat())), doc);
    }

    #[test]
    fn test_unknown_nodes_fall_back() {
        let nodes = vec![
            Node::Unknown {
                kind: "table".into(),
                content: Some("| a |".into()),
            },
            Node::Unknown {
                kind: "embed".into(),
                content: None,
            },
            Node::Paragraph {
                children: vec![Node::text("end")],
            },
        ];
        assert_eq!(restore(&nodes), "| a |\n\nend");
    }

    #[test]
    fn test_trailing_inline_run_is_flushed() {
        let nodes = vec![Node::text("a"), Node::code("b")];
        assert_eq!(restore(&nodes), "a`b`");
    }

    #[test]
    fn test_normalisation() {
        assert_eq!(
            restore(&parse("- [X] Done\n     - five spaces")),
            "- [x] Done\n    - five spaces"
        );
    }
}
