//! SIGNIN command - Exchange credentials for an access token.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use memos_core::User;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{HumanReadable, make_request, output};

/// Arguments for the signin command.
#[derive(Args)]
pub struct SigninArgs {
    /// Username
    pub username: String,

    /// Password
    #[arg(long, short = 'p', env = "MEMOS_PASSWORD")]
    pub password: String,
}

/// Response from signin and signup.
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: User,
}

impl HumanReadable for AuthResponse {
    fn print_human(&self) {
        println!(
            "{} {} ({})",
            "Signed in as".green().bold(),
            self.user.username.bold(),
            self.user.role
        );
        println!();
        println!("  {}", "Use this token for further commands:".dimmed());
        println!("  export MEMOS_TOKEN={}", self.access_token);
    }
}

/// Execute the signin command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: SigninArgs,
) -> Result<()> {
    let url = format!("{}/api/auth/signin", base_url);
    let body = json!({"username": args.username, "password": args.password});

    let response: AuthResponse = make_request(client.post(&url).json(&body)).await?;

    output(&response, human)
}
