//! TAGS command - List the caller's tags with memo counts.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the tags command.
#[derive(Args)]
pub struct TagsArgs {}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub memo_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct TagList(pub Vec<TagSummary>);

impl HumanReadable for TagList {
    fn print_human(&self) {
        println!("{}", "Tags".green().bold());
        println!("{}", "=".repeat(40));

        if self.0.is_empty() {
            println!("  {}", "(No tags)".dimmed());
            return;
        }

        let width = self.0.iter().map(|t| t.name.chars().count()).max().unwrap_or(0) + 1;
        for tag in &self.0 {
            let name = format!("{:<width$}", format!("#{}", tag.name), width = width);
            println!("  {} {}", name.cyan(), tag.memo_count);
        }
    }
}

/// Execute the tags command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: TagsArgs,
) -> Result<()> {
    let url = format!("{}/api/tag", base_url);

    let tags: Vec<TagSummary> = make_request(client.get(&url)).await?;

    output(&TagList(tags), human)
}
