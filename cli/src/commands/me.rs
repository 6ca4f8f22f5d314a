//! ME command - Show the signed-in user.

use anyhow::Result;
use chrono::DateTime;
use clap::Args;
use colored::Colorize;
use memos_core::User;
use serde::Serialize;

use super::{HumanReadable, format_timestamp, make_request, output};

/// Arguments for the me command.
#[derive(Args)]
pub struct MeArgs {}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct Profile(pub User);

impl HumanReadable for Profile {
    fn print_human(&self) {
        let user = &self.0;
        println!("{}", user.username.green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), user.id);
        println!("  {} users/{}", "Name:".cyan(), user.uid);
        println!("  {} {}", "Role:".cyan(), user.role);
        if let Some(ref nickname) = user.nickname {
            println!("  {} {}", "Nickname:".cyan(), nickname);
        }
        if let Some(ref email) = user.email {
            println!("  {} {}", "Email:".cyan(), email);
        }
        if let Some(created) = DateTime::from_timestamp(user.created_ts, 0) {
            println!("  {} {}", "Joined:".cyan(), format_timestamp(&created));
        }
    }
}

/// Execute the me command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    _args: MeArgs,
) -> Result<()> {
    let url = format!("{}/api/user/me", base_url);

    let user: User = make_request(client.get(&url)).await?;

    output(&Profile(user), human)
}
