//! PostgreSQL-backed `OrderLineRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrderLineRepository, PersistenceError};
use crate::domain::{OrderId, OrderLine, OrderLineId};

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::OrderLineRow;
use super::pool::DbPool;
use super::schema::order_lines;

/// Diesel implementation of the `OrderLineRepository` port.
#[derive(Clone)]
pub struct DieselOrderLineRepository {
    pool: DbPool,
}

impl DieselOrderLineRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderLineRepository for DieselOrderLineRepository {
    async fn list(&self) -> Result<Vec<OrderLine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderLineRow> = order_lines::table
            .select(OrderLineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(OrderLineRow::into_domain).collect())
    }

    async fn list_for_order(&self, order: &OrderId) -> Result<Vec<OrderLine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderLineRow> = order_lines::table
            .filter(order_lines::order_id.eq(*order.as_uuid()))
            .select(OrderLineRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(OrderLineRow::into_domain).collect())
    }

    async fn find(&self, id: &OrderLineId) -> Result<Option<OrderLine>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<OrderLineRow> = order_lines::table
            .find(*id.as_uuid())
            .select(OrderLineRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(OrderLineRow::into_domain))
    }

    async fn insert(&self, line: &OrderLine) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(order_lines::table)
            .values(OrderLineRow::from_domain(line))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, line: &OrderLine) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = OrderLineRow::from_domain(line);
        let affected = diesel::update(order_lines::table.find(*line.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &OrderLineId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(order_lines::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }
}
