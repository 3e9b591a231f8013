//! Integration tests for the stock-level engine.
//!
//! These tests drive `StockLevelService` against the in-memory inventory store,
//! which enforces the same key and reference rules as PostgreSQL.

use common::{BinLocationId, StockItemId, WarehouseId};
use domain::{
    DomainError, ErrorKind, StockAdjustment, StockAdjustmentRequest, StockCount,
    StockCountRequest, StockLevelService,
};
use inventory_store::{
    BinLocationStore, InMemoryInventoryStore, NewBinLocation, NewStockItem, NewWarehouse,
    StockItemStore, StoreError, WarehouseLink, WarehouseStore,
};
use serde_json::json;

/// Service over a store holding warehouse 1, bin location 1 and stock item 1.
async fn create_service() -> StockLevelService<InMemoryInventoryStore> {
    let store = InMemoryInventoryStore::new();
    store
        .create_warehouse(NewWarehouse {
            id: Some(WarehouseId::new(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .create_bin_location(NewBinLocation {
            id: Some(BinLocationId::new(1)),
            warehouse: Some(WarehouseLink::Connect(WarehouseId::new(1))),
            ..Default::default()
        })
        .await
        .unwrap();
    store
        .create_stock_item(NewStockItem {
            id: Some(StockItemId::new(1)),
            ..Default::default()
        })
        .await
        .unwrap();
    StockLevelService::new(store)
}

fn adjustment(item: i32, bin: i32, delta: i32) -> StockAdjustment {
    StockAdjustment::new(StockItemId::new(item), BinLocationId::new(bin), delta)
}

fn count(item: i32, bin: i32, count: i32) -> StockCount {
    StockCount::new(StockItemId::new(item), BinLocationId::new(bin), count)
}

mod adjustments {
    use super::*;

    #[tokio::test]
    async fn fresh_pair_starts_from_zero() {
        let service = create_service().await;

        let level = service.apply_adjustment(adjustment(1, 1, 99)).await.unwrap();

        assert_eq!(level.count, 99);
        assert_eq!(level.stock_item_id, StockItemId::new(1));
        assert_eq!(level.bin_location_id, BinLocationId::new(1));
    }

    #[tokio::test]
    async fn negative_delta_reduces_existing_count() {
        let service = create_service().await;
        service.apply_adjustment(adjustment(1, 1, 99)).await.unwrap();

        let level = service.apply_adjustment(adjustment(1, 1, -10)).await.unwrap();

        assert_eq!(level.count, 89);
    }

    #[tokio::test]
    async fn sequence_of_deltas_sums() {
        let service = create_service().await;
        let deltas = [5, -3, 12, 0, -20, 7];

        for delta in deltas {
            service.apply_adjustment(adjustment(1, 1, delta)).await.unwrap();
        }

        let level = service
            .get_stock_level(StockItemId::new(1), BinLocationId::new(1))
            .await
            .unwrap();
        assert_eq!(level.count, deltas.iter().sum::<i32>());
        assert_eq!(service.store().stock_level_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_adjustments_are_not_lost() {
        let service = create_service().await;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.apply_adjustment(adjustment(1, 1, 2)).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let level = service
            .get_stock_level(StockItemId::new(1), BinLocationId::new(1))
            .await
            .unwrap();
        assert_eq!(level.count, 100);
    }
}

mod counts {
    use super::*;

    #[tokio::test]
    async fn count_on_fresh_pair_creates_one_row() {
        let service = create_service().await;

        let level = service.set_count(count(1, 1, 456)).await.unwrap();

        assert_eq!(level.count, 456);
        assert_eq!(service.store().stock_level_count().await, 1);
    }

    #[tokio::test]
    async fn count_overwrites_history() {
        let service = create_service().await;
        service.apply_adjustment(adjustment(1, 1, 30)).await.unwrap();
        service.apply_adjustment(adjustment(1, 1, -4)).await.unwrap();

        let level = service.set_count(count(1, 1, 10)).await.unwrap();

        assert_eq!(level.count, 10);
    }

    #[tokio::test]
    async fn repeated_count_is_idempotent() {
        let service = create_service().await;

        let first = service.set_count(count(1, 1, 8)).await.unwrap();
        let second = service.set_count(count(1, 1, 8)).await.unwrap();

        assert_eq!(first.count, 8);
        assert_eq!(second.count, 8);
        assert_eq!(service.store().stock_level_count().await, 1);
    }

    #[tokio::test]
    async fn adjustment_after_count_accumulates_from_counted_value() {
        let service = create_service().await;
        service.set_count(count(1, 1, 50)).await.unwrap();

        let level = service.apply_adjustment(adjustment(1, 1, -15)).await.unwrap();

        assert_eq!(level.count, 35);
    }
}

mod references {
    use super::*;

    #[tokio::test]
    async fn unknown_stock_item_is_reference_not_found() {
        let service = create_service().await;

        let err = service
            .apply_adjustment(adjustment(9_999_999, 1, 5))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
        assert!(matches!(
            err,
            DomainError::Store(StoreError::ForeignKeyViolation { .. })
        ));
        assert_eq!(service.store().stock_level_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_bin_location_on_count_creates_nothing() {
        let service = create_service().await;

        let err = service.set_count(count(1, 42, 5)).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
        assert_eq!(service.store().stock_level_count().await, 0);
    }

    #[tokio::test]
    async fn reading_a_pair_never_touched_is_not_found() {
        let service = create_service().await;

        let err = service
            .get_stock_level(StockItemId::new(1), BinLocationId::new(1))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    }
}

mod requests {
    use super::*;

    #[tokio::test]
    async fn adjust_request_with_string_values() {
        let service = create_service().await;
        let request: StockAdjustmentRequest = serde_json::from_value(json!({
            "stockItem": "1",
            "binLocation": "1",
            "adjustment": "99",
        }))
        .unwrap();

        let level = service.adjust(&request).await.unwrap();

        assert_eq!(level.count, 99);
    }

    #[tokio::test]
    async fn non_integer_delta_leaves_store_untouched() {
        let service = create_service().await;
        service.set_count(count(1, 1, 3)).await.unwrap();
        let request: StockAdjustmentRequest = serde_json::from_value(json!({
            "stockItem": 1,
            "binLocation": 1,
            "adjustment": "abc",
        }))
        .unwrap();

        let err = service.adjust(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let level = service
            .get_stock_level(StockItemId::new(1), BinLocationId::new(1))
            .await
            .unwrap();
        assert_eq!(level.count, 3);
    }

    #[tokio::test]
    async fn count_request_rejects_missing_bin_location() {
        let service = create_service().await;
        let request: StockCountRequest =
            serde_json::from_value(json!({ "stockItem": 1, "count": 4 })).unwrap();

        let err = service.count(&request).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(service.store().stock_level_count().await, 0);
    }
}
