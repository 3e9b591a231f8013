//! Stock level service applying adjustments and counts.

use std::time::Instant;

use common::{BinLocationId, StockItemId};
use inventory_store::{StockLevel, StockLevelStore};

use crate::error::Result;

use super::{StockAdjustment, StockAdjustmentRequest, StockCount, StockCountRequest};

/// Service for changing stock levels.
///
/// Adjustments are relative and accumulate; counts are absolute and
/// overwrite. Both create the stock level for a pair on first use, and both
/// fail without writing anything when the stock item or bin location does
/// not exist.
#[derive(Clone)]
pub struct StockLevelService<S: StockLevelStore> {
    store: S,
}

impl<S: StockLevelStore> StockLevelService<S> {
    /// Creates a new stock level service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Adds the delta to the pair's count. A pair with no stock level yet
    /// starts from zero.
    #[tracing::instrument(skip(self))]
    pub async fn apply_adjustment(&self, cmd: StockAdjustment) -> Result<StockLevel> {
        let start = Instant::now();
        let result = self
            .store
            .adjust_stock_level(cmd.stock_item_id, cmd.bin_location_id, cmd.delta)
            .await;
        record_duration("adjustment", start);

        let level = result?;
        metrics::counter!("stock_adjustments_total").increment(1);
        tracing::debug!(count = level.count, "stock adjusted");
        Ok(level)
    }

    /// Overwrites the pair's count. Last write wins.
    #[tracing::instrument(skip(self))]
    pub async fn set_count(&self, cmd: StockCount) -> Result<StockLevel> {
        let start = Instant::now();
        let result = self
            .store
            .set_stock_level(cmd.stock_item_id, cmd.bin_location_id, cmd.count)
            .await;
        record_duration("count", start);

        let level = result?;
        metrics::counter!("stock_counts_total").increment(1);
        tracing::debug!(count = level.count, "stock counted");
        Ok(level)
    }

    /// Validates an adjustment request and applies it.
    pub async fn adjust(&self, request: &StockAdjustmentRequest) -> Result<StockLevel> {
        let cmd = request.validate()?;
        self.apply_adjustment(cmd).await
    }

    /// Validates a count request and applies it.
    pub async fn count(&self, request: &StockCountRequest) -> Result<StockLevel> {
        let cmd = request.validate()?;
        self.set_count(cmd).await
    }

    /// Loads the current stock level for a pair.
    #[tracing::instrument(skip(self))]
    pub async fn get_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
    ) -> Result<StockLevel> {
        Ok(self
            .store
            .get_stock_level(stock_item_id, bin_location_id)
            .await?)
    }
}

fn record_duration(operation: &'static str, start: Instant) {
    metrics::histogram!("stock_operation_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
