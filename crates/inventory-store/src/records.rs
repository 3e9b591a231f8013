//! Rows stored by the inventory store and the payloads used to write them.

use chrono::{DateTime, Utc};
use common::{BinLocationId, StockItemId, WarehouseId};
use serde::{Deserialize, Serialize};

/// Descriptive warehouse columns.
///
/// Used both as the stored values and as a partial update: `None` leaves a
/// column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WarehouseFields {
    pub description: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub address3: Option<String>,
    pub address_town: Option<String>,
    pub address_county: Option<String>,
    pub address_country: Option<String>,
    pub postcode: Option<String>,
}

impl WarehouseFields {
    /// Overwrites every column that `changes` provides.
    pub fn apply(&mut self, changes: WarehouseFields) {
        overlay(&mut self.description, changes.description);
        overlay(&mut self.address1, changes.address1);
        overlay(&mut self.address2, changes.address2);
        overlay(&mut self.address3, changes.address3);
        overlay(&mut self.address_town, changes.address_town);
        overlay(&mut self.address_county, changes.address_county);
        overlay(&mut self.address_country, changes.address_country);
        overlay(&mut self.postcode, changes.postcode);
    }
}

/// Descriptive bin location columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BinLocationFields {
    pub description: Option<String>,
    pub aisle: Option<String>,
    pub shelf: Option<String>,
}

impl BinLocationFields {
    /// Overwrites every column that `changes` provides.
    pub fn apply(&mut self, changes: BinLocationFields) {
        overlay(&mut self.description, changes.description);
        overlay(&mut self.aisle, changes.aisle);
        overlay(&mut self.shelf, changes.shelf);
    }
}

/// Descriptive stock item columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StockItemFields {
    pub description: Option<String>,
    pub ean: Option<String>,
    pub upc: Option<String>,
}

impl StockItemFields {
    /// Overwrites every column that `changes` provides.
    pub fn apply(&mut self, changes: StockItemFields) {
        overlay(&mut self.description, changes.description);
        overlay(&mut self.ean, changes.ean);
        overlay(&mut self.upc, changes.upc);
    }
}

fn overlay(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: WarehouseId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: WarehouseFields,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinLocation {
    pub id: BinLocationId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: BinLocationFields,
    pub warehouse_id: WarehouseId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: StockItemId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: StockItemFields,
}

/// Quantity of one stock item held at one bin location.
///
/// At most one row exists per `(bin_location_id, stock_item_id)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockLevel {
    pub bin_location_id: BinLocationId,
    pub stock_item_id: StockItemId,
    #[serde(rename = "stockItemCount")]
    pub count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A warehouse together with its bin locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseDetail {
    #[serde(flatten)]
    pub warehouse: Warehouse,
    pub bin_locations: Vec<BinLocation>,
}

/// A bin location together with the stock levels recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinLocationDetail {
    #[serde(flatten)]
    pub bin_location: BinLocation,
    pub stock_item_counts: Vec<StockLevel>,
}

/// A stock item together with the stock levels recorded against it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItemDetail {
    #[serde(flatten)]
    pub stock_item: StockItem,
    pub stock_item_counts: Vec<StockLevel>,
}

/// How a bin location is attached to its warehouse when written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarehouseLink {
    /// Attach to an existing warehouse.
    Connect(WarehouseId),
    /// Create a new warehouse in the same transaction and attach to it.
    Create(WarehouseFields),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewWarehouse {
    /// Client-supplied identifier; generated when absent.
    pub id: Option<WarehouseId>,
    pub fields: WarehouseFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBinLocation {
    /// Client-supplied identifier; generated when absent.
    pub id: Option<BinLocationId>,
    pub fields: BinLocationFields,
    /// Required. A bin location cannot exist without a warehouse.
    pub warehouse: Option<WarehouseLink>,
}

/// Changes applied by a bin location upsert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinLocationChanges {
    pub fields: BinLocationFields,
    /// Moves the bin location on update; required when the row is created.
    pub warehouse: Option<WarehouseLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStockItem {
    /// Client-supplied identifier; generated when absent.
    pub id: Option<StockItemId>,
    pub fields: StockItemFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_only_overwrites_provided_columns() {
        let mut fields = WarehouseFields {
            description: Some("LYIT".to_string()),
            postcode: Some("F92FC93".to_string()),
            ..Default::default()
        };
        fields.apply(WarehouseFields {
            postcode: Some("F92 FC93".to_string()),
            ..Default::default()
        });

        assert_eq!(fields.description.as_deref(), Some("LYIT"));
        assert_eq!(fields.postcode.as_deref(), Some("F92 FC93"));
    }

    #[test]
    fn fields_reject_unknown_columns() {
        let result: std::result::Result<StockItemFields, _> =
            serde_json::from_value(serde_json::json!({ "description": "x", "sku": "y" }));
        assert!(result.is_err());
    }

    #[test]
    fn stock_level_serializes_count_as_stock_item_count() {
        let now = Utc::now();
        let level = StockLevel {
            bin_location_id: BinLocationId::new(1),
            stock_item_id: StockItemId::new(2),
            count: 99,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&level).unwrap();
        assert_eq!(json["stockItemCount"], 99);
        assert_eq!(json["binLocationId"], 1);
        assert_eq!(json["stockItemId"], 2);
    }

    #[test]
    fn warehouse_flattens_descriptive_fields() {
        let now = Utc::now();
        let warehouse = Warehouse {
            id: WarehouseId::new(3),
            created_at: now,
            updated_at: now,
            fields: WarehouseFields {
                address_town: Some("Letterkenny".to_string()),
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&warehouse).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["addressTown"], "Letterkenny");
        assert!(json["postcode"].is_null());
    }
}
