//! Read-only product catalog handler, used to populate line-item selectors.

use actix_web::{HttpRequest, get, web};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, Product, ProductId};

use super::customers::MANAGE_ROLES;
use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// A product as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    /// Stable identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Listed price.
    pub price: Decimal,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
        }
    }
}

/// List the product catalog.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "Products", body = [ProductView]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Role not allowed", body = Error),
    ),
    tags = ["products"],
    operation_id = "listProducts"
)]
#[get("/products")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Vec<ProductView>>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let products = state.products.list().await?;
    Ok(web::Json(products.into_iter().map(ProductView::from).collect()))
}
