//! PostgreSQL-backed `CustomerRepository` using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CustomerRepository, PersistenceError};
use crate::domain::{Customer, CustomerId, Email};

use super::diesel_error::{map_diesel_error, map_pool_error};
use super::models::CustomerRow;
use super::pool::DbPool;
use super::schema::customers;

diesel::define_sql_function! {
    /// SQL `COALESCE` over a nullable text column.
    fn coalesce(
        value: diesel::sql_types::Nullable<diesel::sql_types::Text>,
        fallback: diesel::sql_types::Text,
    ) -> diesel::sql_types::Text;
}

/// Escape LIKE wildcards so a filter string matches literally.
fn escape_like(needle: &str) -> String {
    needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Diesel implementation of the `CustomerRepository` port.
#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    /// Create a repository over the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Customer>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = customers::table
            .select(CustomerRow::as_select())
            .into_boxed();
        if let Some(needle) = filter.map(str::trim).filter(|needle| !needle.is_empty()) {
            let pattern = format!("%{}%", escape_like(needle));
            query = query.filter(
                customers::name
                    .ilike(pattern.clone())
                    .or(customers::email.ilike(pattern.clone()))
                    .or(coalesce(customers::address, "").ilike(pattern.clone()))
                    .or(customers::phone.ilike(pattern)),
            );
        }
        let rows: Vec<CustomerRow> = query
            .order(customers::name.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(CustomerRow::into_domain).collect())
    }

    async fn find(&self, id: &CustomerId) -> Result<Option<Customer>, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CustomerRow> = customers::table
            .find(*id.as_uuid())
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(CustomerRow::into_domain))
    }

    async fn insert(&self, customer: &Customer) -> Result<(), PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(customers::table)
            .values(CustomerRow::from_domain(customer))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = CustomerRow::from_domain(customer);
        let affected = diesel::update(customers::table.find(*customer.id.as_uuid()))
            .set(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: &CustomerId) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(customers::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<&CustomerId>,
    ) -> Result<bool, PersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let by_email = customers::table.filter(customers::email.eq(email.as_str()));
        let matches: i64 = match exclude {
            Some(exclude) => {
                by_email
                    .filter(customers::id.ne(*exclude.as_uuid()))
                    .count()
                    .get_result(&mut conn)
                    .await
            }
            None => by_email.count().get_result(&mut conn).await,
        }
        .map_err(map_diesel_error)?;
        Ok(matches > 0)
    }
}
