//! Markdown codec endpoints.

use axum::{Json, Router, routing::post};
use memos_core::{InlineLayout, Node, ParseOptions, parse_with, restore};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub markdown: Option<String>,
    #[serde(default)]
    pub layout: InlineLayout,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub nodes: Vec<Node>,
}

/// Nodes arrive as raw JSON so that unknown kinds degrade instead of
/// failing the whole request.
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub nodes: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub markdown: String,
}

/// POST /api/markdown/parse
async fn parse_markdown(Json(request): Json<ParseRequest>) -> ApiResult<Json<ParseResponse>> {
    let markdown = request
        .markdown
        .ok_or_else(|| ApiError::BadRequest("markdown is required".to_string()))?;

    let nodes = parse_with(
        &markdown,
        ParseOptions {
            layout: request.layout,
        },
    );

    Ok(Json(ParseResponse { nodes }))
}

/// POST /api/markdown/restore
async fn restore_markdown(
    Json(request): Json<RestoreRequest>,
) -> ApiResult<Json<RestoreResponse>> {
    let nodes: Vec<Node> = request
        .nodes
        .ok_or_else(|| ApiError::BadRequest("nodes is required".to_string()))?
        .into_iter()
        .map(Node::from_value)
        .collect();

    Ok(Json(RestoreResponse {
        markdown: restore(&nodes),
    }))
}

/// Build markdown routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/markdown/parse", post(parse_markdown))
        .route("/api/markdown/restore", post(restore_markdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_then_restore() {
        let Json(parsed) = parse_markdown(Json(ParseRequest {
            markdown: Some("# Title\n- [ ] item".to_string()),
            layout: InlineLayout::Nested,
        }))
        .await
        .unwrap();
        assert_eq!(parsed.nodes.len(), 2);

        let wire: Vec<Value> = parsed
            .nodes
            .iter()
            .map(|n| serde_json::to_value(n).unwrap())
            .collect();
        let Json(restored) = restore_markdown(Json(RestoreRequest { nodes: Some(wire) }))
            .await
            .unwrap();
        assert_eq!(restored.markdown, "# Title\n- [ ] item");
    }

    #[tokio::test]
    async fn test_restore_unknown_kind() {
        let nodes = vec![
            json!({"type": "table", "content": "| a |"}),
            json!({"type": "text", "content": "tail"}),
        ];
        let Json(restored) = restore_markdown(Json(RestoreRequest { nodes: Some(nodes) }))
            .await
            .unwrap();
        assert_eq!(restored.markdown, "| a |\ntail");
    }

    #[tokio::test]
    async fn test_missing_markdown_is_bad_request() {
        let result = parse_markdown(Json(ParseRequest {
            markdown: None,
            layout: InlineLayout::Flat,
        }))
        .await;
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
