//! Bin location CRUD and relationship endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{BinLocationId, WarehouseId};
use inventory_store::{
    BinLocation, BinLocationDetail, BinLocationFilter, InventoryStore, StockItemDetail,
};

use super::AppState;
use super::payload::{self, BIN_LOCATION_QUERY, json_body, path_id};
use super::warehouses::CountResponse;
use crate::error::ApiError;

/// GET /api/binlocations
#[tracing::instrument(skip(state, body))]
pub async fn list<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Vec<BinLocationDetail>>, ApiError> {
    let filter: BinLocationFilter =
        payload::filter(json_body(&body)?, &query, &BIN_LOCATION_QUERY)?;
    Ok(Json(state.store.find_bin_locations(filter).await?))
}

/// POST /api/binlocations — create a bin location attached to a warehouse.
#[tracing::instrument(skip(state, body))]
pub async fn create<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<BinLocation>), ApiError> {
    let new = payload::new_bin_location(json_body(&body)?)?;
    let bin_location = state.store.create_bin_location(new).await?;
    Ok((StatusCode::CREATED, Json(bin_location)))
}

/// DELETE /api/binlocations
#[tracing::instrument(skip(state, body))]
pub async fn delete_many<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<CountResponse>, ApiError> {
    let filter: BinLocationFilter =
        payload::filter(json_body(&body)?, &query, &BIN_LOCATION_QUERY)?;
    let count = state.store.delete_bin_locations(filter).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/binlocations/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<BinLocationDetail>, ApiError> {
    let id = BinLocationId::new(path_id(&id)?);
    Ok(Json(state.store.get_bin_location(id).await?))
}

/// POST /api/binlocations/{id} — create with the path id; fields from the body or query.
#[tracing::instrument(skip(state, body))]
pub async fn create_with_id<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<(StatusCode, Json<BinLocation>), ApiError> {
    let fields = payload::body_or_query(json_body(&body)?, &query, &BIN_LOCATION_QUERY);
    let new = payload::new_bin_location(payload::with_id(fields, path_id(&id)?)?)?;
    let bin_location = state.store.create_bin_location(new).await?;
    Ok((StatusCode::CREATED, Json(bin_location)))
}

/// PUT /api/binlocations/{id}
#[tracing::instrument(skip(state, body))]
pub async fn upsert<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<BinLocation>, ApiError> {
    let id = BinLocationId::new(path_id(&id)?);
    let fields = payload::body_or_query(json_body(&body)?, &query, &BIN_LOCATION_QUERY);
    let changes = payload::bin_location_changes(fields)?;
    Ok(Json(state.store.upsert_bin_location(id, changes).await?))
}

/// PUT /api/binlocations — upsert keyed by the `id` in the body.
#[tracing::instrument(skip(state, body))]
pub async fn upsert_from_body<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<BinLocation>, ApiError> {
    let (id, rest) = payload::upsert_key(json_body(&body)?)?;
    let changes = payload::bin_location_changes(rest)?;
    let id = BinLocationId::new(id);
    Ok(Json(state.store.upsert_bin_location(id, changes).await?))
}

/// DELETE /api/binlocations/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<BinLocation>, ApiError> {
    let id = BinLocationId::new(path_id(&id)?);
    Ok(Json(state.store.delete_bin_location(id).await?))
}

/// GET /api/binlocations/warehouseid/{id} — bin locations of one warehouse.
#[tracing::instrument(skip(state))]
pub async fn by_warehouse<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BinLocationDetail>>, ApiError> {
    let warehouse_id = WarehouseId::new(path_id(&id)?);
    state.store.get_warehouse(warehouse_id).await?;
    let filter = BinLocationFilter::for_warehouse(warehouse_id);
    Ok(Json(state.store.find_bin_locations(filter).await?))
}

/// GET /api/binlocations/stockItems/{id} — stock items held at a bin location.
#[tracing::instrument(skip(state))]
pub async fn stock_items<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StockItemDetail>>, ApiError> {
    let id = BinLocationId::new(path_id(&id)?);
    Ok(Json(state.store.stock_items_at_bin_location(id).await?))
}
