//! SIGNUP command - Create the host account on a fresh instance.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::signin::AuthResponse;
use super::{make_request, output};

/// Arguments for the signup command.
#[derive(Args)]
pub struct SignupArgs {
    /// Username for the host account
    pub username: String,

    /// Password
    #[arg(long, short = 'p', env = "MEMOS_PASSWORD")]
    pub password: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub nickname: Option<String>,
}

/// Execute the signup command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: SignupArgs,
) -> Result<()> {
    let url = format!("{}/api/auth/signup", base_url);
    let body = json!({
        "username": args.username,
        "password": args.password,
        "email": args.email,
        "nickname": args.nickname,
    });

    let response: AuthResponse = make_request(client.post(&url).json(&body)).await?;

    output(&response, human)
}
