//! # Order Lookup Repository
//!
//! Bulk read access to order/customer/product data for webhook payload
//! enrichment.
//!
//! Every method here takes the whole set of changed shipment keys and
//! answers in ONE query (row-value IN lists via QueryBuilder), never one
//! query per shipment. The webhook dispatcher joins the maps by key.

use std::collections::HashMap;

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use parceltrack_core::ShipmentKey;

/// Customer contact fields for one order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderContact {
    pub order_id: String,
    pub account_code: String,
    pub shipping_phone: Option<String>,
    pub shipping_firstname: Option<String>,
    pub shipping_lastname: Option<String>,
}

/// Product/quantity rollup for one order.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderQuantities {
    pub order_id: String,
    pub account_code: String,
    /// Distinct product count on the order.
    pub number_of_product: i64,
    /// Summed quantity across all line items.
    pub number_of_quantity: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MessageStatusRow {
    order_id: String,
    account_code: String,
    message_status: String,
}

/// Repository for bulk order lookups.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Bulk-fetches customer contact fields for the given shipment keys.
    pub async fn contacts(
        &self,
        keys: &[ShipmentKey],
    ) -> DbResult<HashMap<ShipmentKey, OrderContact>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT order_id, account_code, shipping_phone, shipping_firstname, \
             shipping_lastname FROM orders WHERE (order_id, account_code) IN ",
        );
        push_key_tuples(&mut qb, keys);

        let rows: Vec<OrderContact> = qb.build_query_as().fetch_all(&self.pool).await?;
        debug!(requested = keys.len(), found = rows.len(), "Bulk contact lookup");

        Ok(rows
            .into_iter()
            .map(|r| (ShipmentKey::new(r.order_id.clone(), r.account_code.clone()), r))
            .collect())
    }

    /// Bulk-fetches distinct-product counts and summed quantities.
    pub async fn quantities(
        &self,
        keys: &[ShipmentKey],
    ) -> DbResult<HashMap<ShipmentKey, OrderQuantities>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT order_id, account_code, \
             COUNT(DISTINCT product_sku) AS number_of_product, \
             SUM(quantity) AS number_of_quantity \
             FROM order_items WHERE (order_id, account_code) IN ",
        );
        push_key_tuples(&mut qb, keys);
        qb.push(" GROUP BY order_id, account_code");

        let rows: Vec<OrderQuantities> = qb.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|r| (ShipmentKey::new(r.order_id.clone(), r.account_code.clone()), r))
            .collect())
    }

    /// Bulk-fetches the latest external message status per order.
    pub async fn latest_message_statuses(
        &self,
        keys: &[ShipmentKey],
    ) -> DbResult<HashMap<ShipmentKey, String>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT order_id, account_code, message_status \
             FROM message_log WHERE (order_id, account_code) IN ",
        );
        push_key_tuples(&mut qb, keys);
        // Oldest first; the map insert below keeps the last (latest) row.
        qb.push(" ORDER BY created_at");

        let rows: Vec<MessageStatusRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut latest = HashMap::new();
        for r in rows {
            latest.insert(
                ShipmentKey::new(r.order_id, r.account_code),
                r.message_status,
            );
        }
        Ok(latest)
    }
}

/// Appends `((?, ?), (?, ?), ...)` of shipment keys to a query.
fn push_key_tuples(qb: &mut QueryBuilder<'_, Sqlite>, keys: &[ShipmentKey]) {
    qb.push_tuples(keys, |mut b, key| {
        b.push_bind(key.order_id.clone());
        b.push_bind(key.account_code.clone());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn seed(db: &Database) {
        sqlx::query(
            "INSERT INTO orders (order_id, account_code, shipping_phone, shipping_firstname, shipping_lastname) \
             VALUES ('ORD-1', 'store-a', '555-0101', 'Ada', 'Lovelace')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        for (id, sku, qty) in [("i1", "SKU-A", 2), ("i2", "SKU-A", 1), ("i3", "SKU-B", 4)] {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, account_code, product_sku, quantity) \
                 VALUES (?1, 'ORD-1', 'store-a', ?2, ?3)",
            )
            .bind(id)
            .bind(sku)
            .bind(qty)
            .execute(db.pool())
            .await
            .unwrap();
        }

        for (id, status, ts) in [
            ("m1", "queued", "2026-01-10 08:00:00"),
            ("m2", "delivered", "2026-01-11 08:00:00"),
        ] {
            sqlx::query(
                "INSERT INTO message_log (id, order_id, account_code, message_status, created_at) \
                 VALUES (?1, 'ORD-1', 'store-a', ?2, ?3)",
            )
            .bind(id)
            .bind(status)
            .bind(ts)
            .execute(db.pool())
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_bulk_lookups() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed(&db).await;
        let repo = db.orders();
        let keys = vec![
            ShipmentKey::new("ORD-1", "store-a"),
            ShipmentKey::new("ORD-MISSING", "store-a"),
        ];

        let contacts = repo.contacts(&keys).await.unwrap();
        assert_eq!(contacts.len(), 1);
        let contact = &contacts[&keys[0]];
        assert_eq!(contact.shipping_firstname.as_deref(), Some("Ada"));

        let quantities = repo.quantities(&keys).await.unwrap();
        let q = &quantities[&keys[0]];
        assert_eq!(q.number_of_product, 2); // SKU-A, SKU-B
        assert_eq!(q.number_of_quantity, 7); // 2 + 1 + 4

        let statuses = repo.latest_message_statuses(&keys).await.unwrap();
        assert_eq!(statuses[&keys[0]], "delivered");
        assert!(!statuses.contains_key(&keys[1]));
    }

    #[tokio::test]
    async fn test_empty_key_set_short_circuits() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();
        assert!(repo.contacts(&[]).await.unwrap().is_empty());
        assert!(repo.quantities(&[]).await.unwrap().is_empty());
        assert!(repo.latest_message_statuses(&[]).await.unwrap().is_empty());
    }
}
