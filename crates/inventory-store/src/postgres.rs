use std::collections::HashMap;

use async_trait::async_trait;
use common::{BinLocationId, StockItemId, WarehouseId};
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::filter::{
    BinLocationFilter, Condition, Filter, StockItemFilter, WarehouseFilter,
};
use crate::records::{
    BinLocation, BinLocationChanges, BinLocationDetail, BinLocationFields, NewBinLocation,
    NewStockItem, NewWarehouse, StockItem, StockItemDetail, StockItemFields, StockLevel,
    Warehouse, WarehouseDetail, WarehouseFields, WarehouseLink,
};
use crate::store::{BinLocationStore, StockItemStore, StockLevelStore, WarehouseStore};
use crate::{Result, StoreError};

const WAREHOUSE_COLUMNS: &str = "id, created_at, updated_at, description, address1, address2, \
     address3, address_town, address_county, address_country, postcode";

const BIN_LOCATION_COLUMNS: &str =
    "id, created_at, updated_at, description, aisle, shelf, warehouse_id";

const STOCK_ITEM_COLUMNS: &str = "id, created_at, updated_at, description, ean, upc";

const STOCK_LEVEL_COLUMNS: &str =
    "bin_location_id, stock_item_id, stock_item_count, created_at, updated_at";

/// PostgreSQL-backed inventory store implementation.
#[derive(Clone)]
pub struct PostgresInventoryStore {
    pool: PgPool,
}

impl PostgresInventoryStore {
    /// Creates a new PostgreSQL inventory store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("inventory migrations applied");
        Ok(())
    }

    fn row_to_warehouse(row: &PgRow) -> Result<Warehouse> {
        Ok(Warehouse {
            id: WarehouseId::new(row.try_get("id")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            fields: WarehouseFields {
                description: row.try_get("description")?,
                address1: row.try_get("address1")?,
                address2: row.try_get("address2")?,
                address3: row.try_get("address3")?,
                address_town: row.try_get("address_town")?,
                address_county: row.try_get("address_county")?,
                address_country: row.try_get("address_country")?,
                postcode: row.try_get("postcode")?,
            },
        })
    }

    fn row_to_bin_location(row: &PgRow) -> Result<BinLocation> {
        Ok(BinLocation {
            id: BinLocationId::new(row.try_get("id")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            fields: BinLocationFields {
                description: row.try_get("description")?,
                aisle: row.try_get("aisle")?,
                shelf: row.try_get("shelf")?,
            },
            warehouse_id: WarehouseId::new(row.try_get("warehouse_id")?),
        })
    }

    fn row_to_stock_item(row: &PgRow) -> Result<StockItem> {
        Ok(StockItem {
            id: StockItemId::new(row.try_get("id")?),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            fields: StockItemFields {
                description: row.try_get("description")?,
                ean: row.try_get("ean")?,
                upc: row.try_get("upc")?,
            },
        })
    }

    fn row_to_stock_level(row: &PgRow) -> Result<StockLevel> {
        Ok(StockLevel {
            bin_location_id: BinLocationId::new(row.try_get("bin_location_id")?),
            stock_item_id: StockItemId::new(row.try_get("stock_item_id")?),
            count: row.try_get("stock_item_count")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn insert_warehouse<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Option<WarehouseId>,
        fields: WarehouseFields,
    ) -> Result<Warehouse> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO warehouses (");
        if id.is_some() {
            qb.push("id, ");
        }
        qb.push(
            "description, address1, address2, address3, address_town, address_county, \
             address_country, postcode) VALUES (",
        );
        {
            let mut values = qb.separated(", ");
            if let Some(id) = id {
                values.push_bind(id.as_i32());
            }
            values
                .push_bind(fields.description)
                .push_bind(fields.address1)
                .push_bind(fields.address2)
                .push_bind(fields.address3)
                .push_bind(fields.address_town)
                .push_bind(fields.address_county)
                .push_bind(fields.address_country)
                .push_bind(fields.postcode);
        }
        qb.push(") RETURNING ").push(WAREHOUSE_COLUMNS);

        let row = qb.build().fetch_one(executor).await?;
        Self::row_to_warehouse(&row)
    }

    async fn insert_bin_location<'e, E: PgExecutor<'e>>(
        executor: E,
        id: Option<BinLocationId>,
        fields: BinLocationFields,
        warehouse_id: Option<WarehouseId>,
    ) -> Result<BinLocation> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO bin_locations (");
        if id.is_some() {
            qb.push("id, ");
        }
        qb.push("description, aisle, shelf, warehouse_id) VALUES (");
        {
            let mut values = qb.separated(", ");
            if let Some(id) = id {
                values.push_bind(id.as_i32());
            }
            values
                .push_bind(fields.description)
                .push_bind(fields.aisle)
                .push_bind(fields.shelf)
                .push_bind(warehouse_id.map(|w| w.as_i32()));
        }
        qb.push(") RETURNING ").push(BIN_LOCATION_COLUMNS);

        let row = qb.build().fetch_one(executor).await?;
        Self::row_to_bin_location(&row)
    }

    /// Resolves a warehouse link inside the caller's transaction.
    ///
    /// A dangling `Connect` is left for the foreign key to reject.
    async fn resolve_link(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        link: Option<WarehouseLink>,
    ) -> Result<Option<WarehouseId>> {
        match link {
            None => Ok(None),
            Some(WarehouseLink::Connect(id)) => Ok(Some(id)),
            Some(WarehouseLink::Create(fields)) => {
                let warehouse = Self::insert_warehouse(&mut **tx, None, fields).await?;
                Ok(Some(warehouse.id))
            }
        }
    }

    async fn bin_locations_by_warehouse(
        &self,
        warehouse_ids: &[i32],
    ) -> Result<HashMap<WarehouseId, Vec<BinLocation>>> {
        let rows = sqlx::query(&format!(
            "SELECT {BIN_LOCATION_COLUMNS} FROM bin_locations WHERE warehouse_id = ANY($1) ORDER BY id"
        ))
        .bind(warehouse_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<WarehouseId, Vec<BinLocation>> = HashMap::new();
        for row in &rows {
            let bin = Self::row_to_bin_location(row)?;
            grouped.entry(bin.warehouse_id).or_default().push(bin);
        }
        Ok(grouped)
    }

    async fn stock_levels_where(&self, column: &str, ids: &[i32]) -> Result<Vec<StockLevel>> {
        let rows = sqlx::query(&format!(
            "SELECT {STOCK_LEVEL_COLUMNS} FROM stock_levels WHERE {column} = ANY($1) \
             ORDER BY bin_location_id, stock_item_id"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_stock_level).collect()
    }

    async fn attach_bin_location_levels(
        &self,
        bins: Vec<BinLocation>,
    ) -> Result<Vec<BinLocationDetail>> {
        let ids: Vec<i32> = bins.iter().map(|b| b.id.as_i32()).collect();
        let mut levels: HashMap<BinLocationId, Vec<StockLevel>> = HashMap::new();
        for level in self.stock_levels_where("bin_location_id", &ids).await? {
            levels.entry(level.bin_location_id).or_default().push(level);
        }

        Ok(bins
            .into_iter()
            .map(|bin_location| BinLocationDetail {
                stock_item_counts: levels.remove(&bin_location.id).unwrap_or_default(),
                bin_location,
            })
            .collect())
    }

    async fn attach_stock_item_levels(
        &self,
        items: Vec<StockItem>,
    ) -> Result<Vec<StockItemDetail>> {
        let ids: Vec<i32> = items.iter().map(|i| i.id.as_i32()).collect();
        let mut levels: HashMap<StockItemId, Vec<StockLevel>> = HashMap::new();
        for level in self.stock_levels_where("stock_item_id", &ids).await? {
            levels.entry(level.stock_item_id).or_default().push(level);
        }

        Ok(items
            .into_iter()
            .map(|stock_item| StockItemDetail {
                stock_item_counts: levels.remove(&stock_item.id).unwrap_or_default(),
                stock_item,
            })
            .collect())
    }

    async fn exists(&self, table: &str, id: i32) -> Result<bool> {
        let found: Option<i32> =
            sqlx::query_scalar(&format!("SELECT id FROM {table} WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }
}

/// Appends `WHERE a = $1 AND b = $2 ...` for the given conditions.
fn push_conditions(qb: &mut QueryBuilder<'_, Postgres>, conditions: Vec<Condition>) {
    for (i, condition) in conditions.into_iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match condition {
            Condition::Int(column, value) => {
                qb.push(column).push(" = ").push_bind(value);
            }
            Condition::Text(column, value) => {
                qb.push(column).push(" = ").push_bind(value);
            }
        }
    }
}

#[async_trait]
impl WarehouseStore for PostgresInventoryStore {
    async fn get_warehouse(&self, id: WarehouseId) -> Result<WarehouseDetail> {
        let row = sqlx::query(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Warehouse", id))?;

        let warehouse = Self::row_to_warehouse(&row)?;
        let bin_locations = self
            .bin_locations_by_warehouse(&[id.as_i32()])
            .await?
            .remove(&id)
            .unwrap_or_default();

        Ok(WarehouseDetail {
            warehouse,
            bin_locations,
        })
    }

    async fn find_warehouses(&self, filter: WarehouseFilter) -> Result<Vec<WarehouseDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses"
        ));
        push_conditions(&mut qb, filter.conditions());
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let warehouses: Vec<Warehouse> = rows
            .iter()
            .map(Self::row_to_warehouse)
            .collect::<Result<_>>()?;

        let ids: Vec<i32> = warehouses.iter().map(|w| w.id.as_i32()).collect();
        let mut bins = self.bin_locations_by_warehouse(&ids).await?;

        Ok(warehouses
            .into_iter()
            .map(|warehouse| WarehouseDetail {
                bin_locations: bins.remove(&warehouse.id).unwrap_or_default(),
                warehouse,
            })
            .collect())
    }

    async fn create_warehouse(&self, new: NewWarehouse) -> Result<Warehouse> {
        Self::insert_warehouse(&self.pool, new.id, new.fields).await
    }

    async fn upsert_warehouse(
        &self,
        id: WarehouseId,
        changes: WarehouseFields,
    ) -> Result<Warehouse> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO warehouses (id, description, address1, address2, address3,
                address_town, address_county, address_country, postcode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                description = COALESCE(EXCLUDED.description, warehouses.description),
                address1 = COALESCE(EXCLUDED.address1, warehouses.address1),
                address2 = COALESCE(EXCLUDED.address2, warehouses.address2),
                address3 = COALESCE(EXCLUDED.address3, warehouses.address3),
                address_town = COALESCE(EXCLUDED.address_town, warehouses.address_town),
                address_county = COALESCE(EXCLUDED.address_county, warehouses.address_county),
                address_country = COALESCE(EXCLUDED.address_country, warehouses.address_country),
                postcode = COALESCE(EXCLUDED.postcode, warehouses.postcode),
                updated_at = NOW()
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .bind(changes.description)
        .bind(changes.address1)
        .bind(changes.address2)
        .bind(changes.address3)
        .bind(changes.address_town)
        .bind(changes.address_county)
        .bind(changes.address_country)
        .bind(changes.postcode)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_warehouse(&row)
    }

    async fn delete_warehouse(&self, id: WarehouseId) -> Result<Warehouse> {
        let row = sqlx::query(&format!(
            "DELETE FROM warehouses WHERE id = $1 RETURNING {WAREHOUSE_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("Warehouse", id))?;

        Self::row_to_warehouse(&row)
    }

    async fn delete_warehouses(&self, filter: WarehouseFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM warehouses");
        push_conditions(&mut qb, filter.conditions());

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl BinLocationStore for PostgresInventoryStore {
    async fn get_bin_location(&self, id: BinLocationId) -> Result<BinLocationDetail> {
        let row = sqlx::query(&format!(
            "SELECT {BIN_LOCATION_COLUMNS} FROM bin_locations WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("BinLocation", id))?;

        let bin_location = Self::row_to_bin_location(&row)?;
        let mut details = self.attach_bin_location_levels(vec![bin_location]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::not_found("BinLocation", id))
    }

    async fn find_bin_locations(
        &self,
        filter: BinLocationFilter,
    ) -> Result<Vec<BinLocationDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BIN_LOCATION_COLUMNS} FROM bin_locations"
        ));
        push_conditions(&mut qb, filter.conditions());
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let bins = rows
            .iter()
            .map(Self::row_to_bin_location)
            .collect::<Result<Vec<_>>>()?;
        self.attach_bin_location_levels(bins).await
    }

    #[tracing::instrument(skip(self, new), fields(id = ?new.id))]
    async fn create_bin_location(&self, new: NewBinLocation) -> Result<BinLocation> {
        let mut tx = self.pool.begin().await?;
        let warehouse_id = Self::resolve_link(&mut tx, new.warehouse).await?;
        let bin_location =
            Self::insert_bin_location(&mut *tx, new.id, new.fields, warehouse_id).await?;
        tx.commit().await?;

        Ok(bin_location)
    }

    async fn upsert_bin_location(
        &self,
        id: BinLocationId,
        changes: BinLocationChanges,
    ) -> Result<BinLocation> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<i32> =
            sqlx::query_scalar("SELECT id FROM bin_locations WHERE id = $1 FOR UPDATE")
                .bind(id.as_i32())
                .fetch_optional(&mut *tx)
                .await?;

        let warehouse_id = Self::resolve_link(&mut tx, changes.warehouse).await?;

        let bin_location = if existing.is_some() {
            let row = sqlx::query(&format!(
                r#"
                UPDATE bin_locations SET
                    description = COALESCE($2, description),
                    aisle = COALESCE($3, aisle),
                    shelf = COALESCE($4, shelf),
                    warehouse_id = COALESCE($5, warehouse_id),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {BIN_LOCATION_COLUMNS}
                "#
            ))
            .bind(id.as_i32())
            .bind(changes.fields.description)
            .bind(changes.fields.aisle)
            .bind(changes.fields.shelf)
            .bind(warehouse_id.map(|w| w.as_i32()))
            .fetch_one(&mut *tx)
            .await?;
            Self::row_to_bin_location(&row)?
        } else {
            Self::insert_bin_location(&mut *tx, Some(id), changes.fields, warehouse_id).await?
        };

        tx.commit().await?;
        Ok(bin_location)
    }

    async fn delete_bin_location(&self, id: BinLocationId) -> Result<BinLocation> {
        let row = sqlx::query(&format!(
            "DELETE FROM bin_locations WHERE id = $1 RETURNING {BIN_LOCATION_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("BinLocation", id))?;

        Self::row_to_bin_location(&row)
    }

    async fn delete_bin_locations(&self, filter: BinLocationFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM bin_locations");
        push_conditions(&mut qb, filter.conditions());

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn stock_items_at_bin_location(
        &self,
        id: BinLocationId,
    ) -> Result<Vec<StockItemDetail>> {
        if !self.exists("bin_locations", id.as_i32()).await? {
            return Err(StoreError::not_found("BinLocation", id));
        }

        let rows = sqlx::query(
            r#"
            SELECT s.id, s.created_at, s.updated_at, s.description, s.ean, s.upc
            FROM stock_items s
            JOIN stock_levels l ON l.stock_item_id = s.id
            WHERE l.bin_location_id = $1
            ORDER BY s.id
            "#,
        )
        .bind(id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .iter()
            .map(Self::row_to_stock_item)
            .collect::<Result<Vec<_>>>()?;
        self.attach_stock_item_levels(items).await
    }
}

#[async_trait]
impl StockItemStore for PostgresInventoryStore {
    async fn get_stock_item(&self, id: StockItemId) -> Result<StockItemDetail> {
        let row = sqlx::query(&format!(
            "SELECT {STOCK_ITEM_COLUMNS} FROM stock_items WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("StockItem", id))?;

        let stock_item = Self::row_to_stock_item(&row)?;
        let mut details = self.attach_stock_item_levels(vec![stock_item]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::not_found("StockItem", id))
    }

    async fn find_stock_items(&self, filter: StockItemFilter) -> Result<Vec<StockItemDetail>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {STOCK_ITEM_COLUMNS} FROM stock_items"
        ));
        push_conditions(&mut qb, filter.conditions());
        qb.push(" ORDER BY id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        let items = rows
            .iter()
            .map(Self::row_to_stock_item)
            .collect::<Result<Vec<_>>>()?;
        self.attach_stock_item_levels(items).await
    }

    async fn create_stock_item(&self, new: NewStockItem) -> Result<StockItem> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO stock_items (");
        if new.id.is_some() {
            qb.push("id, ");
        }
        qb.push("description, ean, upc) VALUES (");
        {
            let mut values = qb.separated(", ");
            if let Some(id) = new.id {
                values.push_bind(id.as_i32());
            }
            values
                .push_bind(new.fields.description)
                .push_bind(new.fields.ean)
                .push_bind(new.fields.upc);
        }
        qb.push(") RETURNING ").push(STOCK_ITEM_COLUMNS);

        let row = qb.build().fetch_one(&self.pool).await?;
        Self::row_to_stock_item(&row)
    }

    async fn upsert_stock_item(
        &self,
        id: StockItemId,
        changes: StockItemFields,
    ) -> Result<StockItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO stock_items (id, description, ean, upc)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                description = COALESCE(EXCLUDED.description, stock_items.description),
                ean = COALESCE(EXCLUDED.ean, stock_items.ean),
                upc = COALESCE(EXCLUDED.upc, stock_items.upc),
                updated_at = NOW()
            RETURNING {STOCK_ITEM_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .bind(changes.description)
        .bind(changes.ean)
        .bind(changes.upc)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_stock_item(&row)
    }

    async fn delete_stock_item(&self, id: StockItemId) -> Result<StockItem> {
        let row = sqlx::query(&format!(
            "DELETE FROM stock_items WHERE id = $1 RETURNING {STOCK_ITEM_COLUMNS}"
        ))
        .bind(id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("StockItem", id))?;

        Self::row_to_stock_item(&row)
    }

    async fn delete_stock_items(&self, filter: StockItemFilter) -> Result<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("DELETE FROM stock_items");
        push_conditions(&mut qb, filter.conditions());

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn bin_locations_for_stock_item(
        &self,
        id: StockItemId,
    ) -> Result<Vec<BinLocationDetail>> {
        if !self.exists("stock_items", id.as_i32()).await? {
            return Err(StoreError::not_found("StockItem", id));
        }

        let rows = sqlx::query(
            r#"
            SELECT b.id, b.created_at, b.updated_at, b.description, b.aisle, b.shelf, b.warehouse_id
            FROM bin_locations b
            JOIN stock_levels l ON l.bin_location_id = b.id
            WHERE l.stock_item_id = $1
            ORDER BY b.id
            "#,
        )
        .bind(id.as_i32())
        .fetch_all(&self.pool)
        .await?;

        let bins = rows
            .iter()
            .map(Self::row_to_bin_location)
            .collect::<Result<Vec<_>>>()?;
        self.attach_bin_location_levels(bins).await
    }
}

#[async_trait]
impl StockLevelStore for PostgresInventoryStore {
    async fn get_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
    ) -> Result<StockLevel> {
        let row = sqlx::query(&format!(
            "SELECT {STOCK_LEVEL_COLUMNS} FROM stock_levels \
             WHERE bin_location_id = $1 AND stock_item_id = $2"
        ))
        .bind(bin_location_id.as_i32())
        .bind(stock_item_id.as_i32())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::not_found("StockLevel", format!("({bin_location_id}, {stock_item_id})"))
        })?;

        Self::row_to_stock_level(&row)
    }

    #[tracing::instrument(skip(self))]
    async fn adjust_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        delta: i32,
    ) -> Result<StockLevel> {
        // Single statement: the conflict arm reads the current count under
        // the row lock, so concurrent adjustments cannot lose an update.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO stock_levels (bin_location_id, stock_item_id, stock_item_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (bin_location_id, stock_item_id) DO UPDATE SET
                stock_item_count = stock_levels.stock_item_count + EXCLUDED.stock_item_count,
                updated_at = NOW()
            RETURNING {STOCK_LEVEL_COLUMNS}
            "#
        ))
        .bind(bin_location_id.as_i32())
        .bind(stock_item_id.as_i32())
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_stock_level(&row)
    }

    #[tracing::instrument(skip(self))]
    async fn set_stock_level(
        &self,
        stock_item_id: StockItemId,
        bin_location_id: BinLocationId,
        count: i32,
    ) -> Result<StockLevel> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO stock_levels (bin_location_id, stock_item_id, stock_item_count)
            VALUES ($1, $2, $3)
            ON CONFLICT (bin_location_id, stock_item_id) DO UPDATE SET
                stock_item_count = EXCLUDED.stock_item_count,
                updated_at = NOW()
            RETURNING {STOCK_LEVEL_COLUMNS}
            "#
        ))
        .bind(bin_location_id.as_i32())
        .bind(stock_item_id.as_i32())
        .bind(count)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_stock_level(&row)
    }
}
