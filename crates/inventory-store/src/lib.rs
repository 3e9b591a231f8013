//! Storage gateway for the inventory service.
//!
//! Exposes one trait per record family plus a PostgreSQL implementation and
//! an in-memory implementation used by tests and benches.

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;

pub use common::{BinLocationId, StockItemId, WarehouseId};
pub use error::{Result, StoreError};
pub use filter::{BinLocationFilter, Condition, Filter, StockItemFilter, WarehouseFilter};
pub use memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;
pub use records::{
    BinLocation, BinLocationChanges, BinLocationDetail, BinLocationFields, NewBinLocation,
    NewStockItem, NewWarehouse, StockItem, StockItemDetail, StockItemFields, StockLevel,
    Warehouse, WarehouseDetail, WarehouseFields, WarehouseLink,
};
pub use store::{
    BinLocationStore, InventoryStore, StockItemStore, StockLevelStore, WarehouseStore,
};
