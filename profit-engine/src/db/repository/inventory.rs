//! Inventory Repository

use super::{RepoError, RepoResult, validate_amount};
use shared::models::{InventoryItemCreate, InventorySnapshot};
use sqlx::SqlitePool;

const INVENTORY_SELECT: &str =
    "SELECT id, tenant_id, item_name, quantity, unit_price, category, expiry_date FROM inventory";

/// Current stock for a tenant
pub async fn find_by_tenant(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<InventorySnapshot>> {
    let rows = sqlx::query_as::<_, InventorySnapshot>(&format!(
        "{INVENTORY_SELECT} WHERE tenant_id = ? ORDER BY item_name, id"
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: InventoryItemCreate,
) -> RepoResult<InventorySnapshot> {
    validate_amount(data.quantity, "quantity")?;
    if let Some(price) = data.unit_price {
        validate_amount(price, "unit_price")?;
    }

    let id = sqlx::query(
        "INSERT INTO inventory (tenant_id, item_name, quantity, unit_price, category, expiry_date) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(&data.item_name)
    .bind(data.quantity)
    .bind(data.unit_price)
    .bind(&data.category)
    .bind(data.expiry_date)
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, InventorySnapshot>(&format!("{INVENTORY_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inventory item".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_and_find_by_tenant() {
        let pool = test_pool().await;
        let expiry = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        create(
            &pool,
            "t-1",
            InventoryItemCreate::new("Milk", 4.0)
                .with_price(1.5)
                .with_category("Dairy")
                .expiring(expiry),
        )
        .await
        .unwrap();
        create(&pool, "t-1", InventoryItemCreate::new("Flour", 20.0)).await.unwrap();
        create(&pool, "t-2", InventoryItemCreate::new("Eggs", 12.0)).await.unwrap();

        let rows = find_by_tenant(&pool, "t-1").await.unwrap();
        assert_eq!(rows.len(), 2);
        // ordered by item name
        assert_eq!(rows[0].item_name, "Flour");
        assert_eq!(rows[0].unit_price, None);
        assert_eq!(rows[1].expiry_date, Some(expiry));
        assert_eq!(rows[1].category.as_deref(), Some("Dairy"));
    }
}
