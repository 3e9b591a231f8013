use common::{BinLocationId, StockItemId, WarehouseId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{StockAdjustment, StockAdjustmentRequest, StockCount, StockLevelService};
use inventory_store::{
    BinLocationStore, InMemoryInventoryStore, NewBinLocation, NewStockItem, NewWarehouse,
    StockItemStore, WarehouseLink, WarehouseStore,
};

fn seeded_service(rt: &tokio::runtime::Runtime) -> StockLevelService<InMemoryInventoryStore> {
    let store = InMemoryInventoryStore::new();
    rt.block_on(async {
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
    });
    StockLevelService::new(store)
}

fn bench_apply_adjustment(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = seeded_service(&rt);
    let cmd = StockAdjustment::new(StockItemId::new(1), BinLocationId::new(1), 1);

    c.bench_function("stock_level/apply_adjustment", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.apply_adjustment(cmd).await.unwrap();
            });
        });
    });
}

fn bench_set_count(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = seeded_service(&rt);
    let cmd = StockCount::new(StockItemId::new(1), BinLocationId::new(1), 100);

    c.bench_function("stock_level/set_count", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.set_count(cmd).await.unwrap();
            });
        });
    });
}

fn bench_validate_request(c: &mut Criterion) {
    let request: StockAdjustmentRequest = serde_json::from_value(serde_json::json!({
        "stockItem": "1",
        "binLocation": " 1 ",
        "adjustment": -5,
    }))
    .unwrap();

    c.bench_function("stock_level/validate_request", |b| {
        b.iter(|| request.validate().unwrap());
    });
}

criterion_group!(
    benches,
    bench_apply_adjustment,
    bench_set_count,
    bench_validate_request
);
criterion_main!(benches);
