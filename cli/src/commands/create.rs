//! CREATE command - Create a memo.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use memos_core::Visibility;
use serde_json::json;

use super::list::parse_visibility;
use super::show::MemoDetail;
use super::{make_request, output, read_content};
use crate::view::RestMemo;

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Memo content
    pub content: Option<String>,

    /// Read content from a file (`-` for stdin)
    #[arg(long, short = 'f', conflicts_with = "content")]
    pub file: Option<PathBuf>,

    /// PRIVATE, PROTECTED or PUBLIC
    #[arg(long, value_parser = parse_visibility)]
    pub visibility: Option<Visibility>,

    /// Attach uploaded resources by id
    #[arg(long = "resource")]
    pub resources: Vec<i64>,
}

/// Execute the create command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CreateArgs,
) -> Result<()> {
    let Some(content) = read_content(args.content, args.file.as_deref())? else {
        bail!("memo content is required (argument, --file, or --file -)");
    };

    let url = format!("{}/api/memo", base_url);
    let mut body = json!({
        "content": content,
        "resourceIdList": args.resources,
    });
    if let Some(visibility) = args.visibility {
        body["visibility"] = json!(visibility);
    }

    let memo: RestMemo = make_request(client.post(&url).json(&body)).await?;

    output(&MemoDetail(memo.into()), human)
}
