pub mod bin_locations;
pub mod health;
pub mod metrics;
pub mod payload;
pub mod stock;
pub mod stock_items;
pub mod warehouses;

use domain::StockLevelService;
use inventory_store::InventoryStore;

/// Shared application state accessible from all handlers.
pub struct AppState<S: InventoryStore> {
    pub store: S,
    pub stock_levels: StockLevelService<S>,
}

impl<S: InventoryStore> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            stock_levels: StockLevelService::new(store.clone()),
            store,
        }
    }
}
