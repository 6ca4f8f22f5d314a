//! Route definitions for the HTTP API.

pub mod auth;
pub mod health;
pub mod markdown;
pub mod memo;
pub mod resource;
pub mod tag;
pub mod user;
pub mod workspace;

use axum::Router;

use crate::state::AppState;

/// Largest page a list endpoint returns.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(user::routes())
        .merge(memo::routes())
        .merge(tag::routes())
        .merge(resource::routes())
        .merge(workspace::routes())
        .merge(markdown::routes())
        .with_state(state)
}

/// Normalise `limit`/`offset` query parameters.
pub(crate) fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(memos_store::DEFAULT_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_bounds() {
        assert_eq!(page(None, None), (50, 0));
        assert_eq!(page(Some(0), Some(-4)), (1, 0));
        assert_eq!(page(Some(10_000), Some(20)), (MAX_PAGE_SIZE, 20));
    }
}
