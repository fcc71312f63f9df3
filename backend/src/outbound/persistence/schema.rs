//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them for
//! compile-time query validation and type-safe SQL generation. Regenerate
//! with `diesel print-schema` after changing migrations.

diesel::table! {
    /// User accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        full_name -> Varchar,
        /// Unique email address, stored lowercased.
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Varchar,
        /// Role literal: Administrator, Vendor or Client.
        role -> Varchar,
        /// Date of birth.
        birth_date -> Date,
        /// Account creation timestamp.
        registered_at -> Timestamptz,
        /// Whether the account may sign in.
        active -> Bool,
    }
}

diesel::table! {
    /// Customer records.
    customers (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Customer name.
        name -> Varchar,
        /// Unique email address, stored lowercased.
        email -> Varchar,
        /// Postal address, optional.
        address -> Nullable<Varchar>,
        /// Contact phone number.
        phone -> Varchar,
    }
}

diesel::table! {
    /// Orders placed by customers.
    orders (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// When the order was placed.
        order_date -> Timestamptz,
        /// Owning customer.
        customer_id -> Uuid,
        /// Status literal.
        status -> Varchar,
        /// Total amount.
        total_amount -> Numeric,
    }
}

diesel::table! {
    /// Line-items belonging to orders.
    order_lines (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning order.
        order_id -> Uuid,
        /// Referenced product.
        product_id -> Uuid,
        /// Units sold.
        quantity -> Int4,
        /// Price per unit.
        unit_price -> Numeric,
    }
}

diesel::table! {
    /// Product catalog, managed externally.
    products (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Product name.
        name -> Varchar,
        /// Listed price.
        price -> Numeric,
    }
}

diesel::joinable!(orders -> customers (customer_id));
diesel::joinable!(order_lines -> orders (order_id));
diesel::joinable!(order_lines -> products (product_id));

diesel::allow_tables_to_appear_in_same_query!(users, customers, orders, order_lines, products);
