//! DELETE command - Archive a memo.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{HumanReadable, make_request, output};
use crate::view::{MemoView, RestMemo};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// Memo ID to archive
    pub id: i64,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Archived(pub MemoView);

impl HumanReadable for Archived {
    fn print_human(&self) {
        println!("{}", "Memo archived.".green().bold());
        println!();
        println!("  {} {}", "Name:".cyan(), self.0.name);
    }
}

/// Execute the delete command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteArgs,
) -> Result<()> {
    // Confirmation prompt for interactive use
    if human && !args.yes {
        eprint!(
            "{} Archive memo {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.id
        );

        use std::io::Write;
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let url = format!("{}/api/memo/{}", base_url, args.id);

    let memo: RestMemo = make_request(client.delete(&url)).await?;

    output(&Archived(memo.into()), human)
}
