//! HTTP inbound adapter exposing the REST endpoints.

pub mod account;
pub mod customers;
pub mod error;
pub mod health;
pub mod order_lines;
pub mod orders;
pub mod products;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` service.
///
/// The `check-email` routes must precede the `{id}` routes so the literal
/// segment is not captured as an identifier.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(account::login)
        .service(account::logout)
        .service(account::register)
        .service(account::check_email)
        .service(account::flash)
        .service(users::check_email)
        .service(users::list)
        .service(users::create)
        .service(users::toggle_active)
        .service(users::change_password)
        .service(users::detail)
        .service(users::edit)
        .service(users::delete_confirmed)
        .service(customers::check_email)
        .service(customers::list)
        .service(customers::create)
        .service(customers::detail)
        .service(customers::edit)
        .service(customers::delete_confirmed)
        .service(orders::list)
        .service(orders::create)
        .service(orders::detail)
        .service(orders::edit)
        .service(orders::delete_confirmed)
        .service(order_lines::list)
        .service(order_lines::create)
        .service(order_lines::detail)
        .service(order_lines::edit)
        .service(order_lines::delete_confirmed)
        .service(products::list);
}
