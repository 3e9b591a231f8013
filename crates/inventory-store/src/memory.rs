use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{BinLocationId, StockItemId, WarehouseId};
use tokio::sync::RwLock;

use crate::error::NUMERIC_VALUE_OUT_OF_RANGE;
use crate::filter::{BinLocationFilter, StockItemFilter, WarehouseFilter};
use crate::records::{
    BinLocation, BinLocationChanges, BinLocationDetail, NewBinLocation, NewStockItem,
    NewWarehouse, StockItem, StockItemDetail, StockItemFields, StockLevel, Warehouse,
    WarehouseDetail, WarehouseFields, WarehouseLink,
};
use crate::store::{BinLocationStore, StockItemStore, StockLevelStore, WarehouseStore};
use crate::{Result, StoreError};

#[derive(Debug, Default)]
struct InventoryData {
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    bin_locations: BTreeMap<BinLocationId, BinLocation>,
    stock_items: BTreeMap<StockItemId, StockItem>,
    stock_levels: BTreeMap<(BinLocationId, StockItemId), StockLevel>,
    warehouse_seq: i32,
    bin_location_seq: i32,
    stock_item_seq: i32,
}

impl InventoryData {
    fn warehouse_detail(&self, warehouse: &Warehouse) -> WarehouseDetail {
        WarehouseDetail {
            warehouse: warehouse.clone(),
            bin_locations: self
                .bin_locations
                .values()
                .filter(|b| b.warehouse_id == warehouse.id)
                .cloned()
                .collect(),
        }
    }

    fn bin_location_detail(&self, bin_location: &BinLocation) -> BinLocationDetail {
        BinLocationDetail {
            bin_location: bin_location.clone(),
            stock_item_counts: self
                .stock_levels
                .values()
                .filter(|l| l.bin_location_id == bin_location.id)
                .cloned()
                .collect(),
        }
    }

    fn stock_item_detail(&self, stock_item: &StockItem) -> StockItemDetail {
        StockItemDetail {
            stock_item: stock_item.clone(),
            stock_item_counts: self
                .stock_levels
                .values()
                .filter(|l| l.stock_item_id == stock_item.id)
                .cloned()
                .collect(),
        }
    }

    fn insert_warehouse(
        &mut self,
        id: Option<WarehouseId>,
        fields: WarehouseFields,
    ) -> Result<Warehouse> {
        let id = match id {
            Some(id) => id,
            None => {
                self.warehouse_seq += 1;
                WarehouseId::new(self.warehouse_seq)
            }
        };
        if self.warehouses.contains_key(&id) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("warehouses_pkey".to_string()),
            });
        }

        let now = Utc::now();
        let warehouse = Warehouse {
            id,
            created_at: now,
            updated_at: now,
            fields,
        };
        self.warehouses.insert(id, warehouse.clone());
        Ok(warehouse)
    }

    fn insert_bin_location(&mut self, new: NewBinLocation) -> Result<BinLocation> {
        let link = new.warehouse.ok_or_else(|| StoreError::RequiredField {
            column: "warehouse_id".to_string(),
        })?;
        let id = match new.id {
            Some(id) => id,
            None => {
                self.bin_location_seq += 1;
                BinLocationId::new(self.bin_location_seq)
            }
        };
        if self.bin_locations.contains_key(&id) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("bin_locations_pkey".to_string()),
            });
        }
        let warehouse_id = self.resolve_link(link)?;

        let now = Utc::now();
        let bin_location = BinLocation {
            id,
            created_at: now,
            updated_at: now,
            fields: new.fields,
            warehouse_id,
        };
        self.bin_locations.insert(id, bin_location.clone());
        Ok(bin_location)
    }

    fn insert_stock_item(&mut self, new: NewStockItem) -> Result<StockItem> {
        let id = match new.id {
            Some(id) => id,
            None => {
                self.stock_item_seq += 1;
                StockItemId::new(self.stock_item_seq)
            }
        };
        if self.stock_items.contains_key(&id) {
            return Err(StoreError::UniqueViolation {
                constraint: Some("stock_items_pkey".to_string()),
            });
        }

        let now = Utc::now();
        let stock_item = StockItem {
            id,
            created_at: now,
            updated_at: now,
            fields: new.fields,
        };
        self.stock_items.insert(id, stock_item.clone());
        Ok(stock_item)
    }

    /// Resolves a warehouse link, creating the warehouse when asked to.
    ///
    /// Runs before any other mutation of the caller so a failure leaves the
    /// data untouched.
    fn resolve_link(&mut self, link: WarehouseLink) -> Result<WarehouseId> {
        match link {
            WarehouseLink::Connect(id) if self.warehouses.contains_key(&id) => Ok(id),
            WarehouseLink::Connect(_) => Err(StoreError::ForeignKeyViolation {
                constraint: Some("bin_locations_warehouse_id_fkey".to_string()),
            }),
            WarehouseLink::Create(fields) => Ok(self.insert_warehouse(None, fields)?.id),
        }
    }

    fn remove_bin_location(&mut self, id: BinLocationId) -> Option<BinLocation> {
        let removed = self.bin_locations.remove(&id)?;
        self.stock_levels.retain(|(bin, _), _| *bin != id);
        Some(removed)
    }

    fn remove_warehouse(&mut self, id: WarehouseId) -> Option<Warehouse> {
        let removed = self.warehouses.remove(&id)?;
        let bins: Vec<BinLocationId> = self
            .bin_locations
            .values()
            .filter(|b| b.warehouse_id == id)
            .map(|b| b.id)
            .collect();
        for bin in bins {
            self.remove_bin_location(bin);
        }
        Some(removed)
    }

    fn remove_stock_item(&mut self, id: StockItemId) -> Option<StockItem> {
        let removed = self.stock_items.remove(&id)?;
        self.stock_levels.retain(|(_, item), _| *item != id);
        Some(removed)
    }

    fn check_stock_level_references(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
    ) -> Result<()> {
        if !self.bin_locations.contains_key(&bin_location_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: Some("stock_levels_bin_location_id_fkey".to_string()),
            });
        }
        if !self.stock_items.contains_key(&stock_item_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: Some("stock_levels_stock_item_id_fkey".to_string()),
            });
        }
        Ok(())
    }

    fn write_stock_level(
        &mut self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        count: i32,
    ) -> StockLevel {
        let now = Utc::now();
        let level = self
            .stock_levels
            .entry((bin_location_id, stock_item_id))
            .and_modify(|l| {
                l.count = count;
                l.updated_at = now;
            })
            .or_insert_with(|| StockLevel {
                bin_location_id,
                stock_item_id,
                count,
                created_at: now,
                updated_at: now,
            });
        level.clone()
    }
}

/// In-memory inventory store implementation for testing.
///
/// Enforces the same uniqueness, foreign key and required-field rules as the
/// PostgreSQL schema and reports violations with the same constraint names.
#[derive(Clone, Default)]
pub struct InMemoryInventoryStore {
    data: Arc<RwLock<InventoryData>>,
}

impl InMemoryInventoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stock level rows.
    pub async fn stock_level_count(&self) -> usize {
        self.data.read().await.stock_levels.len()
    }
}

#[async_trait]
impl WarehouseStore for InMemoryInventoryStore {
    async fn get_warehouse(&self, id: WarehouseId) -> Result<WarehouseDetail> {
        let data = self.data.read().await;
        let warehouse = data
            .warehouses
            .get(&id)
            .ok_or_else(|| StoreError::not_found("Warehouse", id))?;
        Ok(data.warehouse_detail(warehouse))
    }

    async fn find_warehouses(&self, filter: WarehouseFilter) -> Result<Vec<WarehouseDetail>> {
        let data = self.data.read().await;
        Ok(data
            .warehouses
            .values()
            .filter(|w| filter.matches(w))
            .map(|w| data.warehouse_detail(w))
            .collect())
    }

    async fn create_warehouse(&self, new: NewWarehouse) -> Result<Warehouse> {
        self.data.write().await.insert_warehouse(new.id, new.fields)
    }

    async fn upsert_warehouse(
        &self,
        id: WarehouseId,
        changes: WarehouseFields,
    ) -> Result<Warehouse> {
        let mut data = self.data.write().await;
        if let Some(existing) = data.warehouses.get_mut(&id) {
            existing.fields.apply(changes);
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        data.insert_warehouse(Some(id), changes)
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> Result<Warehouse> {
        self.data
            .write()
            .await
            .remove_warehouse(id)
            .ok_or_else(|| StoreError::not_found("Warehouse", id))
    }

    async fn delete_warehouses(&self, filter: WarehouseFilter) -> Result<u64> {
        let mut data = self.data.write().await;
        let ids: Vec<WarehouseId> = data
            .warehouses
            .values()
            .filter(|w| filter.matches(w))
            .map(|w| w.id)
            .collect();
        for id in &ids {
            data.remove_warehouse(*id);
        }
        Ok(ids.len() as u64)
    }
}

#[async_trait]
impl BinLocationStore for InMemoryInventoryStore {
    async fn get_bin_location(&self, id: BinLocationId) -> Result<BinLocationDetail> {
        let data = self.data.read().await;
        let bin_location = data
            .bin_locations
            .get(&id)
            .ok_or_else(|| StoreError::not_found("BinLocation", id))?;
        Ok(data.bin_location_detail(bin_location))
    }

    async fn find_bin_locations(
        &self,
        filter: BinLocationFilter,
    ) -> Result<Vec<BinLocationDetail>> {
        let data = self.data.read().await;
        Ok(data
            .bin_locations
            .values()
            .filter(|b| filter.matches(b))
            .map(|b| data.bin_location_detail(b))
            .collect())
    }

    async fn create_bin_location(&self, new: NewBinLocation) -> Result<BinLocation> {
        self.data.write().await.insert_bin_location(new)
    }

    async fn upsert_bin_location(
        &self,
        id: BinLocationId,
        changes: BinLocationChanges,
    ) -> Result<BinLocation> {
        let mut data = self.data.write().await;
        if !data.bin_locations.contains_key(&id) {
            return data.insert_bin_location(NewBinLocation {
                id: Some(id),
                fields: changes.fields,
                warehouse: changes.warehouse,
            });
        }

        let warehouse_id = match changes.warehouse {
            Some(link) => Some(data.resolve_link(link)?),
            None => None,
        };
        let existing = data
            .bin_locations
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("BinLocation", id))?;
        existing.fields.apply(changes.fields);
        if let Some(warehouse_id) = warehouse_id {
            existing.warehouse_id = warehouse_id;
        }
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    async fn delete_bin_location(&self, id: BinLocationId) -> Result<BinLocation> {
        self.data
            .write()
            .await
            .remove_bin_location(id)
            .ok_or_else(|| StoreError::not_found("BinLocation", id))
    }

    async fn delete_bin_locations(&self, filter: BinLocationFilter) -> Result<u64> {
        let mut data = self.data.write().await;
        let ids: Vec<BinLocationId> = data
            .bin_locations
            .values()
            .filter(|b| filter.matches(b))
            .map(|b| b.id)
            .collect();
        for id in &ids {
            data.remove_bin_location(*id);
        }
        Ok(ids.len() as u64)
    }

    async fn stock_items_at_bin_location(
        &self,
        id: BinLocationId,
    ) -> Result<Vec<StockItemDetail>> {
        let data = self.data.read().await;
        if !data.bin_locations.contains_key(&id) {
            return Err(StoreError::not_found("BinLocation", id));
        }
        Ok(data
            .stock_levels
            .keys()
            .filter(|(bin, _)| *bin == id)
            .filter_map(|(_, item)| data.stock_items.get(item))
            .map(|item| data.stock_item_detail(item))
            .collect())
    }
}

#[async_trait]
impl StockItemStore for InMemoryInventoryStore {
    async fn get_stock_item(&self, id: StockItemId) -> Result<StockItemDetail> {
        let data = self.data.read().await;
        let stock_item = data
            .stock_items
            .get(&id)
            .ok_or_else(|| StoreError::not_found("StockItem", id))?;
        Ok(data.stock_item_detail(stock_item))
    }

    async fn find_stock_items(&self, filter: StockItemFilter) -> Result<Vec<StockItemDetail>> {
        let data = self.data.read().await;
        Ok(data
            .stock_items
            .values()
            .filter(|i| filter.matches(i))
            .map(|i| data.stock_item_detail(i))
            .collect())
    }

    async fn create_stock_item(&self, new: NewStockItem) -> Result<StockItem> {
        self.data.write().await.insert_stock_item(new)
    }

    async fn upsert_stock_item(
        &self,
        id: StockItemId,
        changes: StockItemFields,
    ) -> Result<StockItem> {
        let mut data = self.data.write().await;
        if let Some(existing) = data.stock_items.get_mut(&id) {
            existing.fields.apply(changes);
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        data.insert_stock_item(NewStockItem {
            id: Some(id),
            fields: changes,
        })
    }

    async fn delete_stock_item(&self, id: StockItemId) -> Result<StockItem> {
        self.data
            .write()
            .await
            .remove_stock_item(id)
            .ok_or_else(|| StoreError::not_found("StockItem", id))
    }

    async fn delete_stock_items(&self, filter: StockItemFilter) -> Result<u64> {
        let mut data = self.data.write().await;
        let ids: Vec<StockItemId> = data
            .stock_items
            .values()
            .filter(|i| filter.matches(i))
            .map(|i| i.id)
            .collect();
        for id in &ids {
            data.remove_stock_item(*id);
        }
        Ok(ids.len() as u64)
    }

    async fn bin_locations_for_stock_item(
        &self,
        id: StockItemId,
    ) -> Result<Vec<BinLocationDetail>> {
        let data = self.data.read().await;
        if !data.stock_items.contains_key(&id) {
            return Err(StoreError::not_found("StockItem", id));
        }
        Ok(data
            .stock_levels
            .keys()
            .filter(|(_, item)| *item == id)
            .filter_map(|(bin, _)| data.bin_locations.get(bin))
            .map(|bin| data.bin_location_detail(bin))
            .collect())
    }
}

#[async_trait]
impl StockLevelStore for InMemoryInventoryStore {
    async fn get_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
    ) -> Result<StockLevel> {
        self.data
            .read()
            .await
            .stock_levels
            .get(&(bin_location_id, stock_item_id))
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(
                    "StockLevel",
                    format!("({bin_location_id}, {stock_item_id})"),
                )
            })
    }

    async fn adjust_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        delta: i32,
    ) -> Result<StockLevel> {
        // The write lock spans the read and the write, so concurrent
        // adjustments to one pair serialize.
        let mut data = self.data.write().await;
        data.check_stock_level_references(stock_item_id, bin_location_id)?;

        let current = data
            .stock_levels
            .get(&(bin_location_id, stock_item_id))
            .map_or(0, |l| l.count);
        let adjusted = current
            .checked_add(delta)
            .ok_or_else(|| StoreError::Database {
                code: Some(NUMERIC_VALUE_OUT_OF_RANGE.to_string()),
                message: "integer out of range".to_string(),
            })?;

        Ok(data.write_stock_level(stock_item_id, bin_location_id, adjusted))
    }

    async fn set_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        count: i32,
    ) -> Result<StockLevel> {
        let mut data = self.data.write().await;
        data.check_stock_level_references(stock_item_id, bin_location_id)?;
        Ok(data.write_stock_level(stock_item_id, bin_location_id, count))
    }
}
