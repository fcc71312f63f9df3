//! Order line-item handlers.
//!
//! Same gates as orders: administrators and vendors manage lines, only
//! administrators delete them.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, OrderId, OrderLine, OrderLineDraft, OrderLineId, ProductId, validate_order_line_draft,
};

use super::account::RedirectResponse;
use super::customers::{DELETE_ROLES, MANAGE_ROLES};
use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// An order line as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    /// Stable identifier.
    pub id: OrderLineId,
    /// The owning order.
    pub order_id: OrderId,
    /// The product sold.
    pub product_id: ProductId,
    /// Units sold.
    pub quantity: i32,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl From<OrderLine> for OrderLineView {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            order_id: line.order_id,
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Incoming order line payload for create and edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    /// Must match the path id on edit; ignored on create.
    #[serde(default)]
    pub id: Option<OrderLineId>,
    /// The owning order.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// The product sold.
    #[serde(default)]
    pub product_id: Option<ProductId>,
    /// Units sold.
    #[serde(default)]
    pub quantity: Option<i32>,
    /// Price per unit.
    #[serde(default)]
    pub unit_price: Option<Decimal>,
}

fn to_draft(payload: &OrderLinePayload) -> OrderLineDraft {
    OrderLineDraft {
        order_id: payload.order_id,
        product_id: payload.product_id,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
    }
}

fn line_not_found() -> Error {
    Error::not_found("Order line not found.")
}

fn build_line(id: OrderLineId, draft: OrderLineDraft) -> ApiResult<OrderLine> {
    // The draft was validated; missing references cannot occur here.
    let order_id = draft
        .order_id
        .ok_or_else(|| Error::invalid_request("Order is required."))?;
    let product_id = draft
        .product_id
        .ok_or_else(|| Error::invalid_request("Product is required."))?;
    let quantity = draft
        .quantity
        .ok_or_else(|| Error::invalid_request("Quantity is required."))?;
    let unit_price = draft
        .unit_price
        .ok_or_else(|| Error::invalid_request("Unit price is required."))?;
    Ok(OrderLine {
        id,
        order_id,
        product_id,
        quantity,
        unit_price,
    })
}

/// List all order lines.
#[utoipa::path(
    get,
    path = "/api/v1/order-lines",
    responses((status = 200, description = "Order lines", body = [OrderLineView])),
    tags = ["order-lines"],
    operation_id = "listOrderLines"
)]
#[get("/order-lines")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Vec<OrderLineView>>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let lines = state.order_lines.list().await?;
    Ok(web::Json(lines.into_iter().map(OrderLineView::from).collect()))
}

/// Fetch one order line.
#[utoipa::path(
    get,
    path = "/api/v1/order-lines/{id}",
    responses(
        (status = 200, description = "The order line", body = OrderLineView),
        (status = 404, description = "No such order line", body = Error),
    ),
    tags = ["order-lines"],
    operation_id = "getOrderLine"
)]
#[get("/order-lines/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderLineId>,
) -> ApiResult<web::Json<OrderLineView>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let id = path.into_inner();
    let line = state
        .order_lines
        .find(&id)
        .await?
        .ok_or_else(line_not_found)?;
    Ok(web::Json(line.into()))
}

/// Create an order line.
#[utoipa::path(
    post,
    path = "/api/v1/order-lines",
    request_body = OrderLinePayload,
    responses(
        (status = 201, description = "Created", body = OrderLineView),
        (status = 400, description = "Validation failed", body = Error),
    ),
    tags = ["order-lines"],
    operation_id = "createOrderLine"
)]
#[post("/order-lines")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<OrderLinePayload>,
) -> ApiResult<HttpResponse> {
    session.authorize(&req, MANAGE_ROLES)?;

    let draft = to_draft(&payload);
    let report = validate_order_line_draft(&draft);
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let line = build_line(OrderLineId::random(), draft)?;
    state.order_lines.insert(&line).await?;

    session.set_flash("Order line created successfully.")?;
    Ok(HttpResponse::Created().json(OrderLineView::from(line)))
}

/// Edit an order line. The path id must match the payload id.
#[utoipa::path(
    put,
    path = "/api/v1/order-lines/{id}",
    request_body = OrderLinePayload,
    responses(
        (status = 200, description = "Updated", body = OrderLineView),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "No such line, or it vanished during the edit", body = Error),
    ),
    tags = ["order-lines"],
    operation_id = "editOrderLine"
)]
#[put("/order-lines/{id}")]
pub async fn edit(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderLineId>,
    payload: web::Json<OrderLinePayload>,
) -> ApiResult<web::Json<OrderLineView>> {
    session.authorize(&req, MANAGE_ROLES)?;

    let id = path.into_inner();
    if payload.id != Some(id) {
        return Err(line_not_found());
    }

    let draft = to_draft(&payload);
    let report = validate_order_line_draft(&draft);
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let line = build_line(id, draft)?;
    if !state.order_lines.update(&line).await? {
        return Err(line_not_found());
    }

    session.set_flash("Order line updated successfully.")?;
    Ok(web::Json(line.into()))
}

/// Delete an order line. Administrator only; an absent id is a no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/order-lines/{id}",
    responses(
        (status = 200, description = "Deleted (or already absent)", body = RedirectResponse),
        (status = 403, description = "Only administrators may delete", body = Error),
    ),
    tags = ["order-lines"],
    operation_id = "deleteOrderLine"
)]
#[delete("/order-lines/{id}")]
pub async fn delete_confirmed(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderLineId>,
) -> ApiResult<web::Json<RedirectResponse>> {
    session.authorize(&req, DELETE_ROLES)?;

    let id = path.into_inner();
    if state.order_lines.delete(&id).await? {
        session.set_flash("Order line deleted successfully.")?;
    }
    Ok(web::Json(RedirectResponse {
        redirect_to: "/order-lines".to_owned(),
    }))
}
