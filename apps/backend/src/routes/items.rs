//! Item endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::db::ItemRepository;
use crate::error::{ApiError, Result};
use crate::models::*;
use crate::AppState;

/// POST /api/items
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ReviewItem>)> {
    if request.payload.target.trim().is_empty() {
        return Err(ApiError::BadRequest("payload.target must not be empty".to_string()));
    }

    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let item = ReviewItem::new(
        id,
        request.kind,
        request.payload,
        request.level,
        request.difficulty.unwrap_or(1),
        Utc::now(),
    )
    .with_tags(request.tags);

    {
        let repo = state.repository()?;
        if repo.get_item(&item.id)?.is_some() {
            return Err(ApiError::BadRequest(format!("Item {} already exists", item.id)));
        }
        repo.upsert_item(&item)?;
    }

    tracing::info!(item_id = %item.id, kind = item.kind.as_str(), "Item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/items/due
pub async fn due(
    State(state): State<AppState>,
    Query(query): Query<DueItemsQuery>,
) -> Result<Json<DueItemsResponse>> {
    let limit = query.limit.unwrap_or(state.session_limit);
    let items = state.repository()?.get_due_items(Utc::now(), limit)?;

    Ok(Json(DueItemsResponse {
        count: items.len(),
        items,
    }))
}

/// GET /api/items/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReviewItem>> {
    let item = state
        .repository()?
        .get_item(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("Item {}", id)))?;
    Ok(Json(item))
}
