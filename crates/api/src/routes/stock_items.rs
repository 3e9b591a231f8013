//! Stock item CRUD and relationship endpoints.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::StockItemId;
use inventory_store::{
    BinLocationDetail, InventoryStore, StockItem, StockItemDetail, StockItemFilter,
};

use super::AppState;
use super::payload::{self, STOCK_ITEM_QUERY, json_body, path_id};
use super::warehouses::CountResponse;
use crate::error::ApiError;

/// GET /api/stockitems
#[tracing::instrument(skip(state, body))]
pub async fn list<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<Vec<StockItemDetail>>, ApiError> {
    let filter: StockItemFilter = payload::filter(json_body(&body)?, &query, &STOCK_ITEM_QUERY)?;
    Ok(Json(state.store.find_stock_items(filter).await?))
}

/// POST /api/stockitems
#[tracing::instrument(skip(state, body))]
pub async fn create<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StockItem>), ApiError> {
    let new = payload::new_stock_item(json_body(&body)?)?;
    let stock_item = state.store.create_stock_item(new).await?;
    Ok((StatusCode::CREATED, Json(stock_item)))
}

/// DELETE /api/stockitems
#[tracing::instrument(skip(state, body))]
pub async fn delete_many<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<CountResponse>, ApiError> {
    let filter: StockItemFilter = payload::filter(json_body(&body)?, &query, &STOCK_ITEM_QUERY)?;
    let count = state.store.delete_stock_items(filter).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /api/stockitems/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<StockItemDetail>, ApiError> {
    let id = StockItemId::new(path_id(&id)?);
    Ok(Json(state.store.get_stock_item(id).await?))
}

/// POST /api/stockitems/{id} — create with the path id; fields from the body or query.
#[tracing::instrument(skip(state, body))]
pub async fn create_with_id<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StockItem>), ApiError> {
    let fields = payload::body_or_query(json_body(&body)?, &query, &STOCK_ITEM_QUERY);
    let new = payload::new_stock_item(payload::with_id(fields, path_id(&id)?)?)?;
    let stock_item = state.store.create_stock_item(new).await?;
    Ok((StatusCode::CREATED, Json(stock_item)))
}

/// PUT /api/stockitems/{id}
#[tracing::instrument(skip(state, body))]
pub async fn upsert<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Json<StockItem>, ApiError> {
    let id = StockItemId::new(path_id(&id)?);
    let fields = payload::body_or_query(json_body(&body)?, &query, &STOCK_ITEM_QUERY);
    let changes = payload::stock_item_changes(fields)?;
    Ok(Json(state.store.upsert_stock_item(id, changes).await?))
}

/// PUT /api/stockitems — upsert keyed by the `id` in the body.
#[tracing::instrument(skip(state, body))]
pub async fn upsert_from_body<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<StockItem>, ApiError> {
    let (id, rest) = payload::upsert_key(json_body(&body)?)?;
    let changes = payload::stock_item_changes(rest)?;
    let id = StockItemId::new(id);
    Ok(Json(state.store.upsert_stock_item(id, changes).await?))
}

/// DELETE /api/stockitems/{id}
#[tracing::instrument(skip(state))]
pub async fn delete<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<StockItem>, ApiError> {
    let id = StockItemId::new(path_id(&id)?);
    Ok(Json(state.store.delete_stock_item(id).await?))
}

/// GET /api/stockitems/binLocations/{id} — bin locations holding a stock item.
#[tracing::instrument(skip(state))]
pub async fn bin_locations<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<BinLocationDetail>>, ApiError> {
    let id = StockItemId::new(path_id(&id)?);
    Ok(Json(state.store.bin_locations_for_stock_item(id).await?))
}
