//! Waste Repository

use super::{RepoError, RepoResult, validate_amount};
use chrono::NaiveDate;
use shared::models::{WasteCreate, WasteRecord};
use sqlx::SqlitePool;

const WASTE_SELECT: &str =
    "SELECT id, tenant_id, waste_date, item_name, quantity, cost_value, reason FROM waste";

pub async fn find_by_range(
    pool: &SqlitePool,
    tenant_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<WasteRecord>> {
    let rows = sqlx::query_as::<_, WasteRecord>(&format!(
        "{WASTE_SELECT} WHERE tenant_id = ? AND waste_date BETWEEN ? AND ? ORDER BY waste_date, id"
    ))
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &SqlitePool, tenant_id: &str, data: WasteCreate) -> RepoResult<WasteRecord> {
    validate_amount(data.cost_value, "cost_value")?;
    validate_amount(data.quantity, "quantity")?;
    if data.item_name.trim().is_empty() {
        return Err(RepoError::Validation("item_name is required".into()));
    }

    let id = sqlx::query(
        "INSERT INTO waste (tenant_id, waste_date, item_name, quantity, cost_value, reason) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(data.waste_date)
    .bind(&data.item_name)
    .bind(data.quantity)
    .bind(data.cost_value)
    .bind(&data.reason)
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, WasteRecord>(&format!("{WASTE_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create waste record".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::test_pool;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_by_range() {
        let pool = test_pool().await;
        let created = create(
            &pool,
            "t-1",
            WasteCreate::new(d(4), "Lettuce", 42.5).with_reason("spoilage"),
        )
        .await
        .unwrap();
        assert_eq!(created.reason.as_deref(), Some("spoilage"));

        create(&pool, "t-2", WasteCreate::new(d(4), "Lettuce", 10.0)).await.unwrap();

        let rows = find_by_range(&pool, "t-1", d(4), d(4)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cost_value, 42.5);
    }

    #[tokio::test]
    async fn test_create_requires_item_name() {
        let pool = test_pool().await;
        let result = create(&pool, "t-1", WasteCreate::new(d(4), "  ", 1.0)).await;
        assert!(matches!(result, Err(RepoError::Validation(_))));
    }
}
