//! Stock movement commands.
//!
//! The HTTP layer accepts identifiers and quantities as numbers or strings, so
//! the canonical requests keep them as raw JSON values. `validate` coerces
//! them into the typed commands the service executes.

use common::{BinLocationId, StockItemId, coerce_integer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DomainError, Result};

/// Command to apply a signed delta to a stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub stock_item_id: StockItemId,
    pub bin_location_id: BinLocationId,
    pub delta: i32,
}

impl StockAdjustment {
    pub fn new(stock_item_id: StockItemId, bin_location_id: BinLocationId, delta: i32) -> Self {
        Self {
            stock_item_id,
            bin_location_id,
            delta,
        }
    }
}

/// Command to overwrite a stock level with a counted quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockCount {
    pub stock_item_id: StockItemId,
    pub bin_location_id: BinLocationId,
    pub count: i32,
}

impl StockCount {
    pub fn new(stock_item_id: StockItemId, bin_location_id: BinLocationId, count: i32) -> Self {
        Self {
            stock_item_id,
            bin_location_id,
            count,
        }
    }
}

/// Unvalidated stock adjustment, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentRequest {
    pub stock_item: Option<Value>,
    pub bin_location: Option<Value>,
    pub adjustment: Option<Value>,
}

impl StockAdjustmentRequest {
    /// Coerces every field, reporting the first one that is not an integer.
    pub fn validate(&self) -> Result<StockAdjustment> {
        Ok(StockAdjustment {
            stock_item_id: StockItemId::new(integer("stockItem", &self.stock_item)?),
            bin_location_id: BinLocationId::new(integer("binLocation", &self.bin_location)?),
            delta: integer("adjustment", &self.adjustment)?,
        })
    }
}

/// Unvalidated stock count, as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCountRequest {
    pub stock_item: Option<Value>,
    pub bin_location: Option<Value>,
    pub count: Option<Value>,
}

impl StockCountRequest {
    /// Coerces every field, reporting the first one that is not an integer.
    pub fn validate(&self) -> Result<StockCount> {
        Ok(StockCount {
            stock_item_id: StockItemId::new(integer("stockItem", &self.stock_item)?),
            bin_location_id: BinLocationId::new(integer("binLocation", &self.bin_location)?),
            count: integer("count", &self.count)?,
        })
    }
}

fn integer(field: &'static str, value: &Option<Value>) -> Result<i32> {
    coerce_integer(value.as_ref()).map_err(|reason| DomainError::invalid(field, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn adjustment_accepts_numbers_and_numeric_strings() {
        let request: StockAdjustmentRequest = serde_json::from_value(json!({
            "stockItem": "1",
            "binLocation": 2,
            "adjustment": " -10 ",
        }))
        .unwrap();

        assert_eq!(
            request.validate().unwrap(),
            StockAdjustment::new(StockItemId::new(1), BinLocationId::new(2), -10)
        );
    }

    #[test]
    fn zero_is_a_valid_count() {
        let request: StockCountRequest = serde_json::from_value(json!({
            "stockItem": 1,
            "binLocation": 1,
            "count": 0,
        }))
        .unwrap();

        assert_eq!(request.validate().unwrap().count, 0);
    }

    #[test]
    fn non_integer_adjustment_is_invalid_argument() {
        let request: StockAdjustmentRequest = serde_json::from_value(json!({
            "stockItem": 1,
            "binLocation": 1,
            "adjustment": "abc",
        }))
        .unwrap();

        let err = request.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(matches!(
            err,
            DomainError::InvalidArgument {
                field: "adjustment",
                ..
            }
        ));
    }

    #[test]
    fn missing_and_null_fields_are_invalid() {
        let request: StockCountRequest =
            serde_json::from_value(json!({ "stockItem": 1, "binLocation": null })).unwrap();

        let err = request.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidArgument {
                field: "binLocation",
                ..
            }
        ));
    }

    #[test]
    fn fractional_and_boolean_values_are_rejected() {
        for value in [json!(1.5), json!(true), json!({ "id": 1 })] {
            let request = StockCountRequest {
                stock_item: Some(json!(1)),
                bin_location: Some(json!(1)),
                count: Some(value),
            };
            assert!(request.validate().is_err());
        }
    }
}
