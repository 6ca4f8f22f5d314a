//! EDIT command - Update a memo's content or visibility.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use memos_core::Visibility;
use serde_json::{Map, Value, json};

use super::list::parse_visibility;
use super::show::MemoDetail;
use super::{make_request, output, read_content};
use crate::view::RestMemo;

/// Arguments for the edit command.
#[derive(Args)]
pub struct EditArgs {
    /// Memo ID
    pub id: i64,

    /// New content
    #[arg(long, short = 'c')]
    pub content: Option<String>,

    /// Read new content from a file (`-` for stdin)
    #[arg(long, short = 'f', conflicts_with = "content")]
    pub file: Option<PathBuf>,

    #[arg(long, value_parser = parse_visibility)]
    pub visibility: Option<Visibility>,
}

/// Execute the edit command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: EditArgs,
) -> Result<()> {
    let mut patch = Map::new();
    if let Some(content) = read_content(args.content, args.file.as_deref())? {
        patch.insert("content".to_string(), Value::String(content));
    }
    if let Some(visibility) = args.visibility {
        patch.insert("visibility".to_string(), json!(visibility));
    }
    if patch.is_empty() {
        bail!("nothing to change: pass --content, --file or --visibility");
    }

    let url = format!("{}/api/memo/{}", base_url, args.id);

    let memo: RestMemo = make_request(client.patch(&url).json(&patch)).await?;

    output(&MemoDetail(memo.into()), human)
}
