//! Shared types for the inventory service.
//!
//! - Integer identifier newtypes for warehouses, bin locations and stock items
//! - Coercion of loosely-typed request values into integers

pub mod coerce;
pub mod types;

pub use coerce::{CoercionError, coerce_integer, parse_integer};
pub use types::{BinLocationId, StockItemId, WarehouseId};
