//! Stock adjustment and stock count endpoints.
//!
//! Each operation is reachable in two shapes: a JSON body carrying every
//! field, or the stock item in the path with the rest in the query string.
//! Both produce the same canonical request for the stock-level engine.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use domain::{StockAdjustmentRequest, StockCountRequest};
use inventory_store::{InventoryStore, StockLevel};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::AppState;
use super::payload::json_body;
use crate::error::ApiError;

fn body_request<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    match json_body(body)? {
        Value::Null => Ok(T::default()),
        value @ Value::Object(_) => serde_json::from_value(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}"))),
        other => Err(ApiError::BadRequest(format!(
            "Request body must be a JSON object, got {other}"
        ))),
    }
}

fn query_value(query: &HashMap<String, String>, key: &str) -> Option<Value> {
    query.get(key).map(|v| Value::String(v.clone()))
}

/// A `stockItem` query key wins over the path segment.
fn stock_item_value(query: &HashMap<String, String>, path: String) -> Option<Value> {
    query_value(query, "stockItem").or(Some(Value::String(path)))
}

/// POST /api/stockadjustment — body `{ stockItem, binLocation, adjustment }`.
#[tracing::instrument(skip(state, body))]
pub async fn adjust<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StockLevel>), ApiError> {
    let request: StockAdjustmentRequest = body_request(&body)?;
    let level = state.stock_levels.adjust(&request).await?;
    Ok((StatusCode::CREATED, Json(level)))
}

/// POST /api/stockadjustment/{stockItem}?binLocation=&adjustment=[&stockItem=]
#[tracing::instrument(skip(state))]
pub async fn adjust_item<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(stock_item): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<StockLevel>), ApiError> {
    let request = StockAdjustmentRequest {
        stock_item: stock_item_value(&query, stock_item),
        bin_location: query_value(&query, "binLocation"),
        adjustment: query_value(&query, "adjustment"),
    };
    let level = state.stock_levels.adjust(&request).await?;
    Ok((StatusCode::CREATED, Json(level)))
}

/// POST /api/stockcount — body `{ stockItem, binLocation, count }`.
#[tracing::instrument(skip(state, body))]
pub async fn count<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<(StatusCode, Json<StockLevel>), ApiError> {
    let request: StockCountRequest = body_request(&body)?;
    let level = state.stock_levels.count(&request).await?;
    Ok((StatusCode::CREATED, Json(level)))
}

/// POST /api/stockcount/{stockItem}?binLocation=&count=[&stockItem=]
#[tracing::instrument(skip(state))]
pub async fn count_item<S: InventoryStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(stock_item): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<(StatusCode, Json<StockLevel>), ApiError> {
    let request = StockCountRequest {
        stock_item: stock_item_value(&query, stock_item),
        bin_location: query_value(&query, "binLocation"),
        count: query_value(&query, "count"),
    };
    let level = state.stock_levels.count(&request).await?;
    Ok((StatusCode::CREATED, Json(level)))
}
