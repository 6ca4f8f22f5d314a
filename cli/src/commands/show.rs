//! SHOW command - Show a single memo with its parsed structure.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{HumanReadable, format_timestamp, make_request, output};
use crate::view::{MemoView, RestMemo};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// Memo ID
    pub id: i64,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct MemoDetail(pub MemoView);

impl HumanReadable for MemoDetail {
    fn print_human(&self) {
        let memo = &self.0;
        println!("{}", memo.name.green().bold());
        println!();
        println!("  {} {}", "Creator:".cyan(), memo.creator);
        println!("  {} {}", "Visibility:".cyan(), memo.visibility);
        println!("  {} {}", "State:".cyan(), memo.state);
        println!(
            "  {} {}",
            "Created:".cyan(),
            format_timestamp(&memo.create_time)
        );
        println!(
            "  {} {}",
            "Updated:".cyan(),
            format_timestamp(&memo.update_time)
        );
        if !memo.tags.is_empty() {
            println!("  {} {}", "Tags:".cyan(), memo.tags.join(", "));
        }
        if !memo.resources.is_empty() {
            let ids: Vec<String> = memo.resources.iter().map(|id| id.to_string()).collect();
            println!("  {} {}", "Resources:".cyan(), ids.join(", "));
        }
        println!();
        println!("{}", "-".repeat(80));
        println!("{}", memo.content);
        println!("{}", "-".repeat(80));
        println!("  {} {} nodes", "Structure:".cyan(), memo.nodes.len());
    }
}

/// Execute the show command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ShowArgs,
) -> Result<()> {
    let url = format!("{}/api/memo/{}", base_url, args.id);

    let memo: RestMemo = make_request(client.get(&url)).await?;

    output(&MemoDetail(memo.into()), human)
}
