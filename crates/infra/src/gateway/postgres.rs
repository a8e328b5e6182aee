//! Postgres-backed record store and identity directory.
//!
//! Schema lives in `migrations/0001_consignment.sql`; [`migrate`] applies it.
//!
//! ## Consistency
//!
//! Each call is a single statement. There is no transaction spanning several
//! records and no version column: concurrent edits to one record are
//! last-write-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use consign_auth::{PrincipalId, UserProfile};
use consign_core::ItemId;
use consign_inventory::{InventoryItem, ItemPatch, ItemStatus, NewItem};

use super::{GatewayError, GatewayResult, IdentityDirectory, RecordStore};

const SCHEMA: &str = include_str!("../../migrations/0001_consignment.sql");

/// Create tables if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> GatewayResult<()> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    Ok(())
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => GatewayError::NotFound,
            sqlx::Error::Database(db) if db.code().as_deref() == Some("42501") => {
                GatewayError::PermissionDenied(db.message().to_string())
            }
            _ => GatewayError::Transport(err.to_string()),
        }
    }
}

/// Inventory collection in the `inventory_items` table.
#[derive(Debug, Clone)]
pub struct PostgresRecordStore {
    pool: PgPool,
}

impl PostgresRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ITEM_COLUMNS: &str =
    "id, sku, name, price, quantity, consignor_name, status, date_added, image_url";

fn item_from_row(row: &PgRow) -> GatewayResult<InventoryItem> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<ItemStatus>()
        .map_err(|e| GatewayError::Transport(format!("stored record: {e}")))?;

    Ok(InventoryItem::restore(
        ItemId::from_uuid(row.try_get::<Uuid, _>("id")?),
        NewItem {
            sku: row.try_get("sku")?,
            name: row.try_get("name")?,
            price: row.try_get("price")?,
            quantity: row.try_get("quantity")?,
            consignor_name: row.try_get("consignor_name")?,
        },
        status,
        row.try_get("date_added")?,
        row.try_get("image_url")?,
    ))
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    async fn fetch_all(&self) -> GatewayResult<Vec<InventoryItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items ORDER BY seq"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn fetch_one(&self, id: ItemId) -> GatewayResult<InventoryItem> {
        let row = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        item_from_row(&row)
    }

    async fn insert(&self, new: NewItem, date_added: DateTime<Utc>) -> GatewayResult<ItemId> {
        let item = InventoryItem::create(ItemId::new(), new, date_added)?;

        sqlx::query(
            r#"
            INSERT INTO inventory_items
                (id, sku, name, price, quantity, consignor_name, status, date_added, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id_typed().as_uuid())
        .bind(item.sku())
        .bind(item.name())
        .bind(item.price())
        .bind(item.quantity())
        .bind(item.consignor_name())
        .bind(item.status().as_str())
        .bind(item.date_added())
        .bind(item.image_url())
        .execute(&self.pool)
        .await?;

        Ok(item.id_typed())
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> GatewayResult<()> {
        patch.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET
                sku            = COALESCE($2, sku),
                name           = COALESCE($3, name),
                price          = COALESCE($4, price),
                quantity       = COALESCE($5, quantity),
                consignor_name = COALESCE($6, consignor_name),
                status         = COALESCE($7, status),
                image_url      = COALESCE($8, image_url)
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.sku.as_deref())
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .bind(patch.quantity)
        .bind(patch.consignor_name.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.image_url.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> GatewayResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }
}

/// Profiles in the `user_profiles` table.
#[derive(Debug, Clone)]
pub struct PostgresIdentityDirectory {
    pool: PgPool,
}

impl PostgresIdentityDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn profile_from_row(row: &PgRow) -> GatewayResult<UserProfile> {
    Ok(UserProfile {
        id: PrincipalId::from_uuid(row.try_get::<Uuid, _>("id")?),
        email: row.try_get("email")?,
        is_admin: row.try_get("is_admin")?,
    })
}

#[async_trait]
impl IdentityDirectory for PostgresIdentityDirectory {
    async fn ensure_profile(&self, id: PrincipalId, email: &str) -> GatewayResult<UserProfile> {
        let row = sqlx::query(
            r#"
            WITH inserted AS (
                INSERT INTO user_profiles (id, email, is_admin)
                VALUES ($1, $2, FALSE)
                ON CONFLICT (id) DO NOTHING
                RETURNING id, email, is_admin
            )
            SELECT id, email, is_admin FROM inserted
            UNION ALL
            SELECT id, email, is_admin FROM user_profiles WHERE id = $1
            LIMIT 1
            "#,
        )
        .bind(id.as_uuid())
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        profile_from_row(&row)
    }

    async fn profile(&self, id: PrincipalId) -> GatewayResult<UserProfile> {
        let row = sqlx::query("SELECT id, email, is_admin FROM user_profiles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_one(&self.pool)
            .await?;

        profile_from_row(&row)
    }

    async fn list_profiles(&self) -> GatewayResult<Vec<UserProfile>> {
        let rows = sqlx::query("SELECT id, email, is_admin FROM user_profiles ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(profile_from_row).collect()
    }

    async fn set_privileged(&self, id: PrincipalId, privileged: bool) -> GatewayResult<()> {
        let result = sqlx::query("UPDATE user_profiles SET is_admin = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(privileged)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(GatewayError::NotFound);
        }
        Ok(())
    }
}
