//! Purchase Repository

use super::{RepoError, RepoResult, validate_amount};
use chrono::NaiveDate;
use shared::models::{ItemCategory, PurchaseCreate, PurchaseLineItem, PurchaseRecord};
use sqlx::SqlitePool;
use std::collections::HashMap;

const PURCHASE_SELECT: &str =
    "SELECT id, tenant_id, purchase_date, vendor, invoice_number, total_amount FROM purchase";

/// Purchases in [start, end] with their line items
pub async fn find_by_range(
    pool: &SqlitePool,
    tenant_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> RepoResult<Vec<PurchaseRecord>> {
    let mut purchases = sqlx::query_as::<_, PurchaseRecord>(&format!(
        "{PURCHASE_SELECT} WHERE tenant_id = ? AND purchase_date BETWEEN ? AND ? ORDER BY purchase_date, id"
    ))
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    if purchases.is_empty() {
        return Ok(purchases);
    }

    let items = sqlx::query_as::<_, PurchaseLineItem>(
        "SELECT pi.id, pi.purchase_id, pi.item_name, pi.category, pi.quantity, pi.unit_price FROM purchase_item pi JOIN purchase p ON p.id = pi.purchase_id WHERE p.tenant_id = ? AND p.purchase_date BETWEEN ? AND ? ORDER BY pi.id",
    )
    .bind(tenant_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    attach_items(&mut purchases, items);
    Ok(purchases)
}

/// Smallest non-blank category per item name, across all purchase dates
pub async fn categories_by_item(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<ItemCategory>> {
    let rows = sqlx::query_as::<_, ItemCategory>(
        "SELECT pi.item_name AS item_name, MIN(TRIM(pi.category)) AS category FROM purchase_item pi JOIN purchase p ON p.id = pi.purchase_id WHERE p.tenant_id = ? AND pi.category IS NOT NULL AND TRIM(pi.category) != '' GROUP BY pi.item_name ORDER BY pi.item_name",
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<PurchaseRecord>> {
    let purchase = sqlx::query_as::<_, PurchaseRecord>(&format!(
        "{PURCHASE_SELECT} WHERE tenant_id = ? AND id = ?"
    ))
    .bind(tenant_id)
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut purchase) = purchase else {
        return Ok(None);
    };

    purchase.line_items = sqlx::query_as::<_, PurchaseLineItem>(
        "SELECT id, purchase_id, item_name, category, quantity, unit_price FROM purchase_item WHERE purchase_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(Some(purchase))
}

/// Insert a purchase and its line items in one transaction
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: PurchaseCreate,
) -> RepoResult<PurchaseRecord> {
    validate_amount(data.total_amount, "total_amount")?;
    for item in &data.items {
        validate_amount(item.quantity, "quantity")?;
        validate_amount(item.unit_price, "unit_price")?;
    }

    let mut tx = pool.begin().await?;

    let purchase_id = sqlx::query(
        "INSERT INTO purchase (tenant_id, purchase_date, vendor, invoice_number, total_amount) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(tenant_id)
    .bind(data.purchase_date)
    .bind(&data.vendor)
    .bind(&data.invoice_number)
    .bind(data.total_amount)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for item in &data.items {
        sqlx::query(
            "INSERT INTO purchase_item (purchase_id, item_name, category, quantity, unit_price) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(purchase_id)
        .bind(&item.item_name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(item.unit_price)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, tenant_id, purchase_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create purchase".into()))
}

fn attach_items(purchases: &mut [PurchaseRecord], items: Vec<PurchaseLineItem>) {
    let mut by_purchase: HashMap<i64, Vec<PurchaseLineItem>> = HashMap::new();
    for item in items {
        by_purchase.entry(item.purchase_id).or_default().push(item);
    }
    for purchase in purchases.iter_mut() {
        purchase.line_items = by_purchase.remove(&purchase.id).unwrap_or_default();
    }
}
