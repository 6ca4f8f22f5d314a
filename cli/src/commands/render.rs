//! RENDER command - Parse a Markdown file locally.
//!
//! Prints the node sequence and the restored text. No server is involved.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use memos_core::{Node, ParseOptions, parse_with, restore};
use serde::Serialize;

use super::{HumanReadable, output, read_content};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Markdown file (`-` for stdin)
    pub file: PathBuf,

    /// Emit inline nodes at top level instead of wrapping them in paragraphs
    #[arg(long)]
    pub flat: bool,
}

#[derive(Debug, Serialize)]
pub struct Rendered {
    pub nodes: Vec<Node>,
    pub markdown: String,
}

fn describe(node: &Node) -> String {
    match node {
        Node::Text { content } | Node::Code { content } => {
            format!("{} {:?}", node.kind(), content)
        }
        Node::Heading { level, .. } => format!("heading h{}", level),
        Node::UnorderedListItem { indent, .. } => format!("unorderedListItem indent={}", indent),
        Node::OrderedListItem { indent, number, .. } => {
            format!("orderedListItem {}. indent={}", number, indent)
        }
        Node::TaskListItem {
            indent, complete, ..
        } => format!(
            "taskListItem [{}] indent={}",
            if *complete { "x" } else { " " },
            indent
        ),
        Node::CodeBlock { language, content } => format!(
            "codeBlock {} ({} lines)",
            if language.is_empty() { "-" } else { language.as_str() },
            content.lines().count()
        ),
        other => other.kind().to_string(),
    }
}

impl HumanReadable for Rendered {
    fn print_human(&self) {
        println!("{}", "Nodes".green().bold());
        for node in &self.nodes {
            println!("  {}", describe(node));
            for child in node.children() {
                println!("    {}", describe(child).dimmed());
            }
        }
        println!();
        println!("{}", "Restored".green().bold());
        println!("{}", self.markdown);
    }
}

/// Execute the render command.
pub fn execute(human: bool, args: RenderArgs) -> Result<()> {
    let Some(document) = read_content(None, Some(args.file.as_path()))? else {
        bail!("no input");
    };

    let options = if args.flat {
        ParseOptions::flat()
    } else {
        ParseOptions::default()
    };
    let nodes = parse_with(&document, options);
    let markdown = restore(&nodes);

    output(&Rendered { nodes, markdown }, human)
}
