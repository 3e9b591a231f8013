//! Warehouse CRUD endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::WarehouseId;
use inventory_store::{InventoryStore, Warehouse, WarehouseDetail, WarehouseFilter};
use serde::Serialize;

use super::AppState;
use super::payload::{self, WAREHOUSE_QUERY, json_body, path_id};
use crate::error::ApiError;

/// Body returned by the delete-many endpoints.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// GET /api/warehouses — list warehouses matching a body or query filter.
#[tracing::instrument(skip(state, body))]
pub async fn list<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Vec<WarehouseDetail>>, ApiError> {
    let filter: WarehouseFilter = payload::filter(json_body(&body)?, &query, &WAREHOUSE_QUERY)?;
    Ok(Json(state.store.find_warehouses(filter).await?))
}

/// POST /api/warehouses — create a warehouse.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Warehouse>), ApiError> {
    let new = payload::new_warehouse(json_body(&body)?)?;
    let warehouse = state.store.create_warehouse(new).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// DELETE /api/warehouses — delete every warehouse matching the filter.
#[tracing::instrument(skip(state, body))]
pub async fn delete_many<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<CountResponse>, ApiError> {
    let filter: WarehouseFilter = payload::filter(json_body(&body)?, &query, &WAREHOUSE_QUERY)?;
    let count = state.store.delete_warehouses(filter).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/warehouses/{id} — a warehouse with its bin locations.
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<WarehouseDetail>, ApiError> {
    let id = WarehouseId::new(path_id(&id)?);
    Ok(Json(state.store.get_warehouse(id).await?))
}

/// POST /api/warehouses/{id} — create with the path id; fields from the body or query.
#[tracing::instrument(skip(state, body))]
pub async fn create_with_id<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Warehouse>), ApiError> {
    let fields = payload::body_or_query(json_body(&body)?, &query, &WAREHOUSE_QUERY);
    let new = payload::new_warehouse(payload::with_id(fields, path_id(&id)?)?)?;
    let warehouse = state.store.create_warehouse(new).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// PUT /api/warehouses/{id} — update the warehouse, creating it if absent.
#[tracing::instrument(skip(state, body))]
pub async fn upsert<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Warehouse>, ApiError> {
    let id = WarehouseId::new(path_id(&id)?);
    let fields = payload::body_or_query(json_body(&body)?, &query, &WAREHOUSE_QUERY);
    let changes = payload::warehouse_changes(fields)?;
    Ok(Json(state.store.upsert_warehouse(id, changes).await?))
}

/// PUT /api/warehouses — upsert keyed by the `id` in the body.
#[tracing::instrument(skip(state, body))]
pub async fn upsert_from_body<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<Warehouse>, ApiError> {
    let (id, rest) = payload::upsert_key(json_body(&body)?)?;
    let changes = payload::warehouse_changes(rest)?;
    let id = WarehouseId::new(id);
    Ok(Json(state.store.upsert_warehouse(id, changes).await?))
}

/// DELETE /api/warehouses/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Warehouse>, ApiError> {
    let id = WarehouseId::new(path_id(&id)?);
    Ok(Json(state.store.delete_warehouse(id).await?))
}
