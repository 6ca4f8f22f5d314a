//! LIST command - List memos visible to the caller.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use memos_core::Visibility;
use serde::Serialize;

use super::{HumanReadable, format_timestamp, make_request, output, truncate};
use crate::view::{MemoView, RestMemo};

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Only memos carrying this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Only memos by this user id
    #[arg(long)]
    pub creator: Option<i64>,

    /// Only memos with this visibility (PRIVATE, PROTECTED, PUBLIC)
    #[arg(long, value_parser = parse_visibility)]
    pub visibility: Option<Visibility>,

    /// List archived memos instead
    #[arg(long)]
    pub archived: bool,

    #[arg(long, default_value_t = 50)]
    pub limit: i64,

    #[arg(long, default_value_t = 0)]
    pub offset: i64,
}

pub(crate) fn parse_visibility(s: &str) -> Result<Visibility, String> {
    s.to_ascii_uppercase().parse().map_err(|e| format!("{}", e))
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct MemoList(pub Vec<MemoView>);

impl HumanReadable for MemoList {
    fn print_human(&self) {
        println!("{}", "Memos".green().bold());
        println!("{}", "=".repeat(80));
        println!();

        if self.0.is_empty() {
            println!("  {}", "(No memos)".dimmed());
            return;
        }

        for memo in &self.0 {
            let id = memo.id().map(|id| format!("#{}", id)).unwrap_or_default();
            let marker = if memo.is_archived() {
                "archived".red()
            } else {
                memo.visibility.to_string().normal()
            };
            println!(
                "  {} {} {}",
                id.bold(),
                format_timestamp(&memo.display_time).dimmed(),
                marker
            );
            println!("    {}", truncate(&memo.snippet.replace('\n', " "), 76));
            if !memo.tags.is_empty() {
                let tags: Vec<String> = memo.tags.iter().map(|t| format!("#{}", t)).collect();
                println!("    {}", tags.join(" ").cyan());
            }
            println!();
        }

        println!("  {} {}", "Total:".cyan(), self.0.len());
    }
}

/// Execute the list command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ListArgs,
) -> Result<()> {
    let url = format!("{}/api/memo", base_url);

    let mut query: Vec<(&str, String)> = vec![
        ("limit", args.limit.to_string()),
        ("offset", args.offset.to_string()),
    ];
    if args.archived {
        query.push(("rowStatus", "ARCHIVED".to_string()));
    }
    if let Some(tag) = args.tag {
        query.push(("tag", tag));
    }
    if let Some(creator) = args.creator {
        query.push(("creatorId", creator.to_string()));
    }
    if let Some(visibility) = args.visibility {
        query.push(("visibility", visibility.to_string()));
    }

    let memos: Vec<RestMemo> = make_request(client.get(&url).query(&query)).await?;

    output(&MemoList(memos.into_iter().map(MemoView::from).collect()), human)
}
