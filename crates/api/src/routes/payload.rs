//! Mapping of request bodies, path segments and query strings onto store
//! and engine inputs.
//!
//! Identifiers may arrive as JSON numbers or strings and are coerced to
//! integers here. Query-string filters only honour the keys listed for each
//! record kind; anything else in the query string is ignored.

use std::collections::HashMap;

use axum::body::Bytes;
use common::{BinLocationId, StockItemId, WarehouseId, coerce_integer, parse_integer};
use domain::DomainError;
use inventory_store::{
    BinLocationChanges, BinLocationFields, Filter, NewBinLocation, NewStockItem, NewWarehouse,
    StockItemFields, WarehouseFields, WarehouseLink,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Query-string keys accepted as filter columns.
pub struct QueryKeys {
    pub text: &'static [&'static str],
    pub integer: &'static [&'static str],
}

pub const WAREHOUSE_QUERY: QueryKeys = QueryKeys {
    text: &[
        "description",
        "address1",
        "address2",
        "address3",
        "addressTown",
        "addressCounty",
        "addressCountry",
        "postcode",
    ],
    integer: &[],
};

pub const BIN_LOCATION_QUERY: QueryKeys = QueryKeys {
    text: &["description", "aisle", "shelf"],
    integer: &["warehouseId"],
};

pub const STOCK_ITEM_QUERY: QueryKeys = QueryKeys {
    text: &["description", "ean", "upc"],
    integer: &[],
};

/// Parses a JSON body. An empty body reads as `null`.
pub fn json_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed JSON body: {e}")))
}

/// Coerces an identifier taken from the request path.
pub fn path_id(raw: &str) -> Result<i32, ApiError> {
    parse_integer(raw).map_err(|reason| DomainError::invalid("id", reason).into())
}

/// Builds a filter from the body, or from the query string when the body is empty.
pub fn filter<F: Filter>(
    body: Value,
    query: &HashMap<String, String>,
    keys: &QueryKeys,
) -> Result<F, ApiError> {
    if !body.is_null() {
        return Ok(F::from_json(body)?);
    }

    let mut conditions = Map::new();
    for key in keys.text {
        if let Some(value) = query.get(*key) {
            conditions.insert(key.to_string(), Value::String(value.clone()));
        }
    }
    for key in keys.integer {
        if let Some(value) = query.get(*key) {
            let n = parse_integer(value).map_err(|reason| DomainError::invalid(*key, reason))?;
            conditions.insert(key.to_string(), Value::from(n));
        }
    }
    Ok(F::from_json(Value::Object(conditions))?)
}

/// Entity fields from the body, or from the listed query keys when the body
/// is empty. Query values stay strings; ids among them are coerced later.
pub fn body_or_query(body: Value, query: &HashMap<String, String>, keys: &QueryKeys) -> Value {
    if !body.is_null() {
        return body;
    }
    let object: Map<String, Value> = keys
        .text
        .iter()
        .chain(keys.integer.iter())
        .filter_map(|key| {
            query
                .get(*key)
                .map(|value| (key.to_string(), Value::String(value.clone())))
        })
        .collect();
    Value::Object(object)
}

/// Sets `id` from the path, replacing any `id` in the payload.
pub fn with_id(payload: Value, id: i32) -> Result<Value, ApiError> {
    let mut object = into_object(payload)?;
    object.insert("id".to_string(), Value::from(id));
    Ok(Value::Object(object))
}

/// Splits the required `id` off a body-keyed upsert.
pub fn upsert_key(body: Value) -> Result<(i32, Value), ApiError> {
    let mut object = into_object(body)?;
    let id = object.remove("id").unwrap_or(Value::Null);
    let id = integer("id", &id)?;
    Ok((id, Value::Object(object)))
}

pub fn new_warehouse(body: Value) -> Result<NewWarehouse, ApiError> {
    let mut object = into_object(body)?;
    Ok(NewWarehouse {
        id: take_id(&mut object)?.map(WarehouseId::new),
        fields: fields(object)?,
    })
}

/// Column changes for a warehouse upsert. An `id` in the body is ignored in
/// favour of the path.
pub fn warehouse_changes(body: Value) -> Result<WarehouseFields, ApiError> {
    let mut object = into_object(body)?;
    object.remove("id");
    fields(object)
}

pub fn new_bin_location(body: Value) -> Result<NewBinLocation, ApiError> {
    let mut object = into_object(body)?;
    Ok(NewBinLocation {
        id: take_id(&mut object)?.map(BinLocationId::new),
        warehouse: warehouse_link(&mut object)?,
        fields: fields::<BinLocationFields>(object)?,
    })
}

pub fn bin_location_changes(body: Value) -> Result<BinLocationChanges, ApiError> {
    let mut object = into_object(body)?;
    object.remove("id");
    Ok(BinLocationChanges {
        warehouse: warehouse_link(&mut object)?,
        fields: fields(object)?,
    })
}

pub fn new_stock_item(body: Value) -> Result<NewStockItem, ApiError> {
    let mut object = into_object(body)?;
    Ok(NewStockItem {
        id: take_id(&mut object)?.map(StockItemId::new),
        fields: fields(object)?,
    })
}

pub fn stock_item_changes(body: Value) -> Result<StockItemFields, ApiError> {
    let mut object = into_object(body)?;
    object.remove("id");
    fields(object)
}

fn into_object(body: Value) -> Result<Map<String, Value>, ApiError> {
    match body {
        Value::Object(object) => Ok(object),
        Value::Null => Ok(Map::new()),
        other => Err(ApiError::BadRequest(format!(
            "Request body must be a JSON object, got {other}"
        ))),
    }
}

fn take_id(object: &mut Map<String, Value>) -> Result<Option<i32>, ApiError> {
    match object.remove("id") {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integer("id", &value).map(Some),
    }
}

fn integer(field: &'static str, value: &Value) -> Result<i32, ApiError> {
    coerce_integer(Some(value)).map_err(|reason| DomainError::invalid(field, reason).into())
}

fn fields<T: DeserializeOwned>(object: Map<String, Value>) -> Result<T, ApiError> {
    serde_json::from_value(Value::Object(object)).map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Reads `warehouse: { connect: { id } }`, `warehouse: { create: {...} }` or
/// a plain `warehouseId`.
fn warehouse_link(object: &mut Map<String, Value>) -> Result<Option<WarehouseLink>, ApiError> {
    if let Some(id) = object.remove("warehouseId").filter(|v| !v.is_null()) {
        let id = integer("warehouseId", &id)?;
        return Ok(Some(WarehouseLink::Connect(WarehouseId::new(id))));
    }

    let Some(link) = object.remove("warehouse").filter(|v| !v.is_null()) else {
        return Ok(None);
    };
    let mut link = into_object(link)?;

    if let Some(connect) = link.remove("connect") {
        let mut connect = into_object(connect)?;
        let id = connect.remove("id").unwrap_or(Value::Null);
        let id = integer("warehouse.connect.id", &id)?;
        return Ok(Some(WarehouseLink::Connect(WarehouseId::new(id))));
    }
    if let Some(create) = link.remove("create") {
        return Ok(Some(WarehouseLink::Create(fields(into_object(create)?)?)));
    }

    Err(ApiError::BadRequest(
        "warehouse must contain either connect or create".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::ErrorKind;
    use inventory_store::{BinLocationFilter, WarehouseFilter};
    use serde_json::json;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(json_body(&Bytes::from_static(b"")).unwrap(), Value::Null);
        assert_eq!(json_body(&Bytes::from_static(b" \n")).unwrap(), Value::Null);
    }

    #[test]
    fn malformed_body_is_invalid_argument() {
        let err = json_body(&Bytes::from_static(b"{\"stockItem\": ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn path_ids_accept_zero_and_reject_text() {
        assert_eq!(path_id("0").unwrap(), 0);
        assert_eq!(path_id("42").unwrap(), 42);
        assert_eq!(path_id("abc").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn query_filter_ignores_unlisted_keys() {
        let query = HashMap::from([
            ("aisle".to_string(), "B".to_string()),
            ("warehouseId".to_string(), "3".to_string()),
            ("sort".to_string(), "desc".to_string()),
        ]);

        let filter: BinLocationFilter = filter(Value::Null, &query, &BIN_LOCATION_QUERY).unwrap();

        assert_eq!(filter.aisle.as_deref(), Some("B"));
        assert_eq!(filter.warehouse_id, Some(WarehouseId::new(3)));
    }

    #[test]
    fn body_filter_takes_precedence_over_query() {
        let query = HashMap::from([("postcode".to_string(), "F92".to_string())]);

        let filter: WarehouseFilter =
            filter(json!({ "addressTown": "Letterkenny" }), &query, &WAREHOUSE_QUERY).unwrap();

        assert_eq!(filter.address_town.as_deref(), Some("Letterkenny"));
        assert_eq!(filter.postcode, None);
    }

    #[test]
    fn body_filter_with_unknown_column_is_rejected() {
        let err = filter::<WarehouseFilter>(
            json!({ "colour": "red" }),
            &HashMap::new(),
            &WAREHOUSE_QUERY,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn new_warehouse_coerces_string_id() {
        let new = new_warehouse(json!({ "id": "7", "description": "Overflow" })).unwrap();
        assert_eq!(new.id, Some(WarehouseId::new(7)));
        assert_eq!(new.fields.description.as_deref(), Some("Overflow"));
    }

    #[test]
    fn bin_location_warehouse_link_forms() {
        let connect = new_bin_location(json!({ "warehouse": { "connect": { "id": 2 } } })).unwrap();
        assert_eq!(
            connect.warehouse,
            Some(WarehouseLink::Connect(WarehouseId::new(2)))
        );

        let plain = new_bin_location(json!({ "aisle": "A", "warehouseId": "5" })).unwrap();
        assert_eq!(plain.warehouse, Some(WarehouseLink::Connect(WarehouseId::new(5))));
        assert_eq!(plain.fields.aisle.as_deref(), Some("A"));

        let create =
            new_bin_location(json!({ "warehouse": { "create": { "postcode": "F92" } } })).unwrap();
        match create.warehouse {
            Some(WarehouseLink::Create(fields)) => assert_eq!(fields.postcode.as_deref(), Some("F92")),
            other => panic!("expected inline create, got {other:?}"),
        }

        let missing = new_bin_location(json!({ "shelf": "2" })).unwrap();
        assert_eq!(missing.warehouse, None);
    }

    #[test]
    fn query_fields_fill_an_empty_body() {
        let query = HashMap::from([
            ("aisle".to_string(), "C".to_string()),
            ("warehouseId".to_string(), "4".to_string()),
            ("page".to_string(), "2".to_string()),
        ]);

        let payload = with_id(body_or_query(Value::Null, &query, &BIN_LOCATION_QUERY), 9).unwrap();
        let new = new_bin_location(payload).unwrap();

        assert_eq!(new.id, Some(BinLocationId::new(9)));
        assert_eq!(new.fields.aisle.as_deref(), Some("C"));
        assert_eq!(new.warehouse, Some(WarehouseLink::Connect(WarehouseId::new(4))));
    }

    #[test]
    fn body_is_preferred_over_query_fields() {
        let query = HashMap::from([("ean".to_string(), "123".to_string())]);

        let payload = body_or_query(json!({ "upc": "456" }), &query, &STOCK_ITEM_QUERY);
        let changes = stock_item_changes(payload).unwrap();

        assert_eq!(changes.upc.as_deref(), Some("456"));
        assert_eq!(changes.ean, None);
    }

    #[test]
    fn path_id_replaces_body_id() {
        let payload = with_id(json!({ "id": 3, "postcode": "F92" }), 7).unwrap();
        assert_eq!(new_warehouse(payload).unwrap().id, Some(WarehouseId::new(7)));
    }

    #[test]
    fn body_upsert_requires_an_id() {
        let (id, rest) = upsert_key(json!({ "id": "7", "description": "Overflow" })).unwrap();
        assert_eq!(id, 7);
        assert_eq!(rest, json!({ "description": "Overflow" }));

        let err = upsert_key(json!({ "description": "Overflow" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn unknown_entity_field_is_rejected() {
        let err = new_stock_item(json!({ "sku": "x" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(new_stock_item(json!([1, 2])).is_err());
    }
}
