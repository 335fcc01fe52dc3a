//! Sale Repository

use super::{RepoError, RepoResult, validate_amount};
use chrono::NaiveDate;
use shared::models::{SaleCreate, SaleLineItem, SaleRecord};
use sqlx::SqlitePool;
use std::collections::HashMap;

const SALE_SELECT: &str =
    "SELECT id, tenant_id, sale_date, total_sales, total_transactions FROM sale";

pub async fn find_by_range(
    pool: &SqlitePool,
    tenant_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<SaleRecord>> {
    let mut sales = sqlx::query_as::<_, SaleRecord>(&format!(
        "{SALE_SELECT} WHERE tenant_id = ? AND sale_date BETWEEN ? AND ? ORDER BY sale_date, id"
    ))
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    if sales.is_empty() {
        return Ok(sales);
    }

    let items = sqlx::query_as::<_, SaleLineItem>(
        "SELECT si.id, si.sale_id, si.item_name, si.quantity, si.unit_price FROM sale_item si JOIN sale s ON s.id = si.sale_id WHERE s.tenant_id = ? AND s.sale_date BETWEEN ? AND ? ORDER BY si.id",
    )
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let mut by_sale: HashMap<i64, Vec<SaleLineItem>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(item);
    }
    for sale in sales.iter_mut() {
        sale.line_items = by_sale.remove(&sale.id).unwrap_or_default();
    }
    Ok(sales)
}

async fn find_by_id(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<Option<SaleRecord>> {
    let sale = sqlx::query_as::<_, SaleRecord>(&format!("{SALE_SELECT} WHERE tenant_id = ? AND id = ?"))
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    let Some(mut sale) = sale else {
        return Ok(None);
    };

    sale.line_items = sqlx::query_as::<_, SaleLineItem>(
        "SELECT id, sale_id, item_name, quantity, unit_price FROM sale_item WHERE sale_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(sale))
}

pub async fn create(pool: &SqlitePool, tenant_id: &str, data: SaleCreate) -> RepoResult<SaleRecord> {
    validate_amount(data.total_sales, "total_sales")?;
    if data.total_transactions < 0 {
        return Err(RepoError::Validation(
            "total_transactions must be non-negative".into(),
        ));
    }

    let mut tx = pool.begin().await?;

    let sale_id = sqlx::query(
        "INSERT INTO sale (tenant_id, sale_date, total_sales, total_transactions) VALUES (?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(data.sale_date)
    .bind(data.total_sales)
    .bind(data.total_transactions)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for item in &data.items {
        sqlx::query("INSERT INTO sale_item (sale_id, item_name, quantity, unit_price) VALUES (?, ?, ?, ?)")
            .bind(sale_id)
            .bind(&item.item_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_id(pool, tenant_id, sale_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create sale".into()))
}
