use async_trait::async_trait;
use common::{BinLocationId, StockItemId, WarehouseId};

use crate::Result;
use crate::filter::{BinLocationFilter, StockItemFilter, WarehouseFilter};
use crate::records::{
    BinLocation, BinLocationChanges, BinLocationDetail, NewBinLocation, NewStockItem,
    NewWarehouse, StockItem, StockItemDetail, StockItemFields, StockLevel, Warehouse,
    WarehouseDetail, WarehouseFields,
};

/// Persistence for warehouses.
#[async_trait]
pub trait WarehouseStore: Send + Sync {
    /// Loads a warehouse and its bin locations.
    ///
    /// Fails with `NotFound` if no warehouse has this id.
    async fn get_warehouse(&self, id: WarehouseId) -> Result<WarehouseDetail>;

    /// Lists warehouses matching the filter, ordered by id.
    async fn find_warehouses(&self, filter: WarehouseFilter) -> Result<Vec<WarehouseDetail>>;

    /// Inserts a warehouse. A duplicate id fails with `UniqueViolation`.
    async fn create_warehouse(&self, new: NewWarehouse) -> Result<Warehouse>;

    /// Updates the given columns if the warehouse exists, otherwise creates it
    /// with this id.
    async fn upsert_warehouse(&self, id: WarehouseId, changes: WarehouseFields)
    -> Result<Warehouse>;

    /// Removes a warehouse, cascading to its bin locations and their stock levels.
    async fn delete_warehouse(&self, id: WarehouseId) -> Result<Warehouse>;

    /// Removes every matching warehouse and returns how many were removed.
    async fn delete_warehouses(&self, filter: WarehouseFilter) -> Result<u64>;
}

/// Persistence for bin locations.
#[async_trait]
pub trait BinLocationStore: Send + Sync {
    /// Loads a bin location and the stock levels recorded against it.
    async fn get_bin_location(&self, id: BinLocationId) -> Result<BinLocationDetail>;

    /// Lists bin locations matching the filter, ordered by id.
    async fn find_bin_locations(&self, filter: BinLocationFilter)
    -> Result<Vec<BinLocationDetail>>;

    /// Inserts a bin location.
    ///
    /// A missing warehouse link fails with `RequiredField`; a link to an
    /// unknown warehouse fails with `ForeignKeyViolation`.
    async fn create_bin_location(&self, new: NewBinLocation) -> Result<BinLocation>;

    /// Updates the bin location if it exists, otherwise creates it with this id.
    async fn upsert_bin_location(
        &self,
        id: BinLocationId,
        changes: BinLocationChanges,
    ) -> Result<BinLocation>;

    /// Removes a bin location, cascading to its stock levels.
    async fn delete_bin_location(&self, id: BinLocationId) -> Result<BinLocation>;

    /// Removes every matching bin location and returns how many were removed.
    async fn delete_bin_locations(&self, filter: BinLocationFilter) -> Result<u64>;

    /// Stock items that have a stock level at this bin location.
    async fn stock_items_at_bin_location(&self, id: BinLocationId)
    -> Result<Vec<StockItemDetail>>;
}

/// Persistence for stock items.
#[async_trait]
pub trait StockItemStore: Send + Sync {
    /// Loads a stock item and the stock levels recorded against it.
    async fn get_stock_item(&self, id: StockItemId) -> Result<StockItemDetail>;

    /// Lists stock items matching the filter, ordered by id.
    async fn find_stock_items(&self, filter: StockItemFilter) -> Result<Vec<StockItemDetail>>;

    /// Inserts a stock item. A duplicate id fails with `UniqueViolation`.
    async fn create_stock_item(&self, new: NewStockItem) -> Result<StockItem>;

    /// Updates the given columns if the stock item exists, otherwise creates it
    /// with this id.
    async fn upsert_stock_item(&self, id: StockItemId, changes: StockItemFields)
    -> Result<StockItem>;

    /// Removes a stock item, cascading to its stock levels.
    async fn delete_stock_item(&self, id: StockItemId) -> Result<StockItem>;

    /// Removes every matching stock item and returns how many were removed.
    async fn delete_stock_items(&self, filter: StockItemFilter) -> Result<u64>;

    /// Bin locations that hold a stock level for this stock item.
    async fn bin_locations_for_stock_item(&self, id: StockItemId)
    -> Result<Vec<BinLocationDetail>>;
}

/// Persistence for the stock item / bin location join rows.
#[async_trait]
pub trait StockLevelStore: Send + Sync {
    /// Loads the stock level for a pair. Fails with `NotFound` if the pair
    /// has never been counted or adjusted.
    async fn get_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
    ) -> Result<StockLevel>;

    /// Adds `delta` to the pair's count in one atomic step, treating a
    /// missing row as zero.
    ///
    /// Fails with `ForeignKeyViolation`, writing nothing, if either the stock
    /// item or the bin location does not exist.
    async fn adjust_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        delta: i32,
    ) -> Result<StockLevel>;

    /// Sets the pair's count, creating the row if needed. Last write wins.
    async fn set_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        count: i32,
    ) -> Result<StockLevel>;
}

/// The complete storage gateway.
///
/// Implementations are cheap to clone and share one underlying connection
/// pool or dataset between clones.
pub trait InventoryStore:
    WarehouseStore + BinLocationStore + StockItemStore + StockLevelStore + Clone + 'static
{
}

impl<T> InventoryStore for T where
    T: WarehouseStore + BinLocationStore + StockItemStore + StockLevelStore + Clone + 'static
{
}
