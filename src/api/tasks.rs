//! Task endpoints.
//!
//! Every identifier-taking route goes through the same validation helper and
//! every returned task through the same renderer, so the whole surface shares
//! one shape: 400 for bad input, 404 for an absent task, 500 (logged) for a
//! store failure.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::task;

use super::routes::AppState;

/// Task routes, mounted at the router root.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/add-task", post(create_task))
        .route("/browse-tasks", get(list_tasks))
        .route("/browse-tasks/:id", get(get_task))
        .route("/featured-tasks", get(featured_tasks))
        .route("/my-posted-task", get(my_posted_tasks))
        .route(
            "/tasks/:id",
            get(get_task).put(replace_task).delete(delete_task),
        )
        .route("/tasks/:id/bid", post(place_bid))
        .route("/tasks/:id/bids", get(get_bid_count))
}

type ApiError = (StatusCode, String);

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Validate a path identifier before any store call.
fn parse_id(id: &str) -> Result<ObjectId, ApiError> {
    task::parse_task_id(id)
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("Invalid task id: {}", id)))
}

fn invalid_body() -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        "Task body must be a JSON object".to_string(),
    )
}

fn not_found(id: &ObjectId) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        format!("Task {} not found", id.to_hex()),
    )
}

/// Log the store failure, hand the client a generic message.
fn store_error(err: mongodb::error::Error) -> ApiError {
    tracing::error!("Store operation failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Store operation failed".to_string(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /add-task - Insert a new task document.
///
/// The body is stored as-is apart from `_id`, which is always generated.
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let document = task::document_from_body(&body).ok_or_else(invalid_body)?;

    let id = state.store.insert(document).await.map_err(store_error)?;
    tracing::info!("Created task {}", id.to_hex());

    Ok(Json(json!({
        "acknowledged": true,
        "insertedId": id.to_hex(),
    })))
}

/// GET /browse-tasks - Every task, in the store's natural order.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Value>>, ApiError> {
    let tasks = state.store.list().await.map_err(store_error)?;
    Ok(Json(tasks.into_iter().map(task::render_task).collect()))
}

/// GET /featured-tasks - At most six tasks, earliest deadline first.
async fn featured_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Value>>, ApiError> {
    let tasks = state.store.featured().await.map_err(store_error)?;
    Ok(Json(tasks.into_iter().map(task::render_task).collect()))
}

#[derive(Debug, Deserialize)]
pub struct MyPostedQuery {
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
}

/// GET /my-posted-task - Tasks posted by one user, latest deadline first.
async fn my_posted_tasks(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MyPostedQuery>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let user_email = params
        .user_email
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Missing user email".to_string()))?;

    let tasks = state
        .store
        .posted_by(&user_email)
        .await
        .map_err(store_error)?;
    Ok(Json(tasks.into_iter().map(task::render_task).collect()))
}

/// GET /browse-tasks/:id and GET /tasks/:id - Fetch one task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let document = state.store.find_by_id(id).await.map_err(store_error)?;
    document
        .map(task::render_task)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// POST /tasks/:id/bid - Atomically bump the bid counter, return the updated
/// task.
async fn place_bid(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let updated = state.store.increment_bids(id).await.map_err(store_error)?;
    updated
        .map(task::render_task)
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// GET /tasks/:id/bids - Read the bid counter; a task never bid on reports
/// zero.
async fn get_bid_count(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let document = state
        .store
        .find_by_id(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| not_found(&id))?;

    Ok(Json(json!({ "bids": task::bid_count(&document) })))
}

/// PUT /tasks/:id - Overwrite the given top-level fields.
///
/// `_id` is dropped from the body, so the stored identifier can never change
/// through this route. Nested objects are replaced whole, not merged.
async fn replace_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let fields = task::document_from_body(&body).ok_or_else(invalid_body)?;
    if fields.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "No fields to update".to_string()));
    }

    let outcome = state
        .store
        .replace_fields(id, fields)
        .await
        .map_err(store_error)?;
    if outcome.matched == 0 {
        return Err(not_found(&id));
    }

    Ok(Json(json!({
        "acknowledged": true,
        "matchedCount": outcome.matched,
        "modifiedCount": outcome.modified,
    })))
}

/// DELETE /tasks/:id - Remove one task. A repeat delete is a plain 404.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    if state.store.delete(id).await.map_err(store_error)? {
        tracing::info!("Deleted task {}", id.to_hex());
        Ok(Json(json!({ "acknowledged": true, "deletedCount": 1 })))
    } else {
        Err(not_found(&id))
    }
}
