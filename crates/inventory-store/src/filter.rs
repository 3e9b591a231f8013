//! Equality filters for the find-many and delete-many operations.
//!
//! A filter names any subset of a record's columns; a row matches when every
//! named column equals the given value. An empty filter matches every row.

use common::{BinLocationId, StockItemId, WarehouseId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::records::{BinLocation, StockItem, Warehouse};
use crate::{Result, StoreError};

/// A single column condition, in storage column naming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Int(&'static str, i32),
    Text(&'static str, String),
}

/// Common behaviour of the per-record filters.
pub trait Filter: DeserializeOwned + Default {
    /// Column conditions in the order they were declared.
    fn conditions(&self) -> Vec<Condition>;

    /// Parses a JSON filter payload. `null` and `{}` match everything.
    fn from_json(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        if !value.is_object() {
            return Err(StoreError::Validation(format!(
                "filter must be a JSON object, got {value}"
            )));
        }
        serde_json::from_value(value).map_err(|e| StoreError::Validation(e.to_string()))
    }

    fn is_empty(&self) -> bool {
        self.conditions().is_empty()
    }
}

fn push_text(out: &mut Vec<Condition>, column: &'static str, value: &Option<String>) {
    if let Some(v) = value {
        out.push(Condition::Text(column, v.clone()));
    }
}

fn text_matches(filter: &Option<String>, value: &Option<String>) -> bool {
    filter.as_ref().is_none_or(|f| value.as_ref() == Some(f))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WarehouseFilter {
    pub id: Option<WarehouseId>,
    pub description: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address_town: Option<String>,
    pub address_county: Option<String>,
    pub address_country: Option<String>,
    pub postcode: Option<String>,
}

impl Filter for WarehouseFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        if let Some(id) = self.id {
            out.push(Condition::Int("id", id.as_i32()));
        }
        push_text(&mut out, "description", &self.description);
        push_text(&mut out, "address1", &self.address1);
        push_text(&mut out, "address2", &self.address2);
        push_text(&mut out, "address3", &self.address3);
        push_text(&mut out, "address_town", &self.address_town);
        push_text(&mut out, "address_county", &self.address_county);
        push_text(&mut out, "address_country", &self.address_country);
        push_text(&mut out, "postcode", &self.postcode);
        out
    }
}

impl WarehouseFilter {
    pub fn matches(&self, warehouse: &Warehouse) -> bool {
        let f = &warehouse.fields;
        self.id.is_none_or(|id| id == warehouse.id)
            && text_matches(&self.description, &f.description)
            && text_matches(&self.address1, &f.address1)
            && text_matches(&self.address2, &f.address2)
            && text_matches(&self.address3, &f.address3)
            && text_matches(&self.address_town, &f.address_town)
            && text_matches(&self.address_county, &f.address_county)
            && text_matches(&self.address_country, &f.address_country)
            && text_matches(&self.postcode, &f.postcode)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BinLocationFilter {
    pub id: Option<BinLocationId>,
    pub description: Option<String>,
    pub aisle: Option<String>,
    pub shelf: Option<String>,
    pub warehouse_id: Option<WarehouseId>,
}

impl Filter for BinLocationFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        if let Some(id) = self.id {
            out.push(Condition::Int("id", id.as_i32()));
        }
        push_text(&mut out, "description", &self.description);
        push_text(&mut out, "aisle", &self.aisle);
        push_text(&mut out, "shelf", &self.shelf);
        if let Some(warehouse_id) = self.warehouse_id {
            out.push(Condition::Int("warehouse_id", warehouse_id.as_i32()));
        }
        out
    }
}

impl BinLocationFilter {
    /// Matches every bin location of one warehouse.
    pub fn for_warehouse(warehouse_id: WarehouseId) -> Self {
        Self {
            warehouse_id: Some(warehouse_id),
            ..Default::default()
        }
    }

    pub fn matches(&self, bin_location: &BinLocation) -> bool {
        let f = &bin_location.fields;
        self.id.is_none_or(|id| id == bin_location.id)
            && text_matches(&self.description, &f.description)
            && text_matches(&self.aisle, &f.aisle)
            && text_matches(&self.shelf, &f.shelf)
            && self
                .warehouse_id
                .is_none_or(|w| w == bin_location.warehouse_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StockItemFilter {
    pub id: Option<StockItemId>,
    pub description: Option<String>,
    pub ean: Option<String>,
    pub upc: Option<String>,
}

impl Filter for StockItemFilter {
    fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        if let Some(id) = self.id {
            out.push(Condition::Int("id", id.as_i32()));
        }
        push_text(&mut out, "description", &self.description);
        push_text(&mut out, "ean", &self.ean);
        push_text(&mut out, "upc", &self.upc);
        out
    }
}

impl StockItemFilter {
    pub fn matches(&self, stock_item: &StockItem) -> bool {
        let f = &stock_item.fields;
        self.id.is_none_or(|id| id == stock_item.id)
            && text_matches(&self.description, &f.description)
            && text_matches(&self.ean, &f.ean)
            && text_matches(&self.upc, &f.upc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_empty_object_match_everything() {
        assert!(WarehouseFilter::from_json(Value::Null).unwrap().is_empty());
        assert!(WarehouseFilter::from_json(json!({})).unwrap().is_empty());
    }

    #[test]
    fn unknown_columns_are_a_validation_error() {
        let err = StockItemFilter::from_json(json!({ "colour": "red" })).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn non_object_payload_is_a_validation_error() {
        let err = BinLocationFilter::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn conditions_use_column_names() {
        let filter =
            BinLocationFilter::from_json(json!({ "aisle": "A1", "warehouseId": 4 })).unwrap();
        assert_eq!(
            filter.conditions(),
            vec![
                Condition::Text("aisle", "A1".to_string()),
                Condition::Int("warehouse_id", 4),
            ]
        );
    }

    #[test]
    fn string_id_is_rejected_in_filters() {
        assert!(WarehouseFilter::from_json(json!({ "id": "abc" })).is_err());
    }
}
