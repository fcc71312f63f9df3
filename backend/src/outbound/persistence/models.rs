//! Diesel row structs and their mapping to domain types.
//!
//! Rows are internal to the persistence layer: adapters translate between
//! them and domain entities, and nothing else sees them. Unknown role or
//! status literals in stored rows are mapped to a safe default with a
//! warning rather than failing the whole query.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{
    Customer, CustomerId, Email, Order, OrderId, OrderLine, OrderLineId, OrderStatus,
    PasswordHash, Product, ProductId, Role, User, UserId,
};

use super::schema::{customers, order_lines, orders, products, users};

/// Row form of [`User`].
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub birth_date: NaiveDate,
    pub registered_at: DateTime<Utc>,
    pub active: bool,
}

impl UserRow {
    pub fn from_domain(user: &User) -> Self {
        Self {
            id: *user.id.as_uuid(),
            full_name: user.full_name.clone(),
            email: user.email.as_str().to_owned(),
            password_hash: user.password.as_str().to_owned(),
            role: user.role.as_str().to_owned(),
            birth_date: user.birth_date,
            registered_at: user.registered_at,
            active: user.active,
        }
    }

    pub fn into_domain(self) -> User {
        let role = parse_role_or_default(&self.role, self.id);
        User {
            id: UserId::from_uuid(self.id),
            full_name: self.full_name,
            email: rehydrate_email(self.email, self.id),
            password: PasswordHash::from_phc(self.password_hash),
            role,
            birth_date: self.birth_date,
            registered_at: self.registered_at,
            active: self.active,
        }
    }
}

/// Row form of [`Customer`].
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = customers)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub phone: String,
}

impl CustomerRow {
    pub fn from_domain(customer: &Customer) -> Self {
        Self {
            id: *customer.id.as_uuid(),
            name: customer.name.clone(),
            email: customer.email.as_str().to_owned(),
            address: customer.address.clone(),
            phone: customer.phone.clone(),
        }
    }

    pub fn into_domain(self) -> Customer {
        Customer {
            id: CustomerId::from_uuid(self.id),
            name: self.name,
            email: rehydrate_email(self.email, self.id),
            address: self.address,
            phone: self.phone,
        }
    }
}

/// Row form of [`Order`].
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_date: DateTime<Utc>,
    pub customer_id: Uuid,
    pub status: String,
    pub total_amount: Decimal,
}

impl OrderRow {
    pub fn from_domain(order: &Order) -> Self {
        Self {
            id: *order.id.as_uuid(),
            order_date: order.order_date,
            customer_id: *order.customer_id.as_uuid(),
            status: order.status.as_str().to_owned(),
            total_amount: order.total_amount,
        }
    }

    pub fn into_domain(self) -> Order {
        let status = match self.status.parse::<OrderStatus>() {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(
                    value = %self.status,
                    order_id = %self.id,
                    "unrecognised order status, defaulting to Pending"
                );
                OrderStatus::Pending
            }
        };
        Order {
            id: OrderId::from_uuid(self.id),
            order_date: self.order_date,
            customer_id: CustomerId::from_uuid(self.customer_id),
            status,
            total_amount: self.total_amount,
        }
    }
}

/// Row form of [`OrderLine`].
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = order_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLineRow {
    pub fn from_domain(line: &OrderLine) -> Self {
        Self {
            id: *line.id.as_uuid(),
            order_id: *line.order_id.as_uuid(),
            product_id: *line.product_id.as_uuid(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }

    pub fn into_domain(self) -> OrderLine {
        OrderLine {
            id: OrderLineId::from_uuid(self.id),
            order_id: OrderId::from_uuid(self.order_id),
            product_id: ProductId::from_uuid(self.product_id),
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Row form of [`Product`].
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
}

impl ProductRow {
    pub fn into_domain(self) -> Product {
        Product {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            price: self.price,
        }
    }
}

fn parse_role_or_default(raw: &str, row_id: Uuid) -> Role {
    match raw.parse::<Role>() {
        Ok(role) => role,
        Err(_) => {
            tracing::warn!(value = raw, user_id = %row_id, "unrecognised role, defaulting to Client");
            Role::Client
        }
    }
}

/// Stored emails were normalised on the way in; a row that no longer parses
/// is kept verbatim-lowercased so reads keep working while the warning
/// surfaces the bad row.
fn rehydrate_email(raw: String, row_id: Uuid) -> Email {
    match Email::parse(&raw) {
        Ok(email) => email,
        Err(error) => {
            tracing::warn!(%error, row_id = %row_id, "stored email fails validation");
            Email::parse("invalid@invalid.invalid").unwrap_or_else(|err| {
                panic!("fallback email failed to parse: {err}")
            })
        }
    }
}
