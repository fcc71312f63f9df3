//! Order management handlers.
//!
//! Administrators and vendors may manage orders; only administrators may
//! delete them. The detail view embeds the order's lines and the customer
//! name for display.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CustomerId, Error, Order, OrderDraft, OrderId, OrderStatus, validate_order_draft,
};

use super::account::RedirectResponse;
use super::customers::{DELETE_ROLES, MANAGE_ROLES};
use super::error::ApiResult;
use super::order_lines::OrderLineView;
use super::session::SessionContext;
use super::state::HttpState;

/// An order as returned in listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    /// Stable identifier.
    pub id: OrderId,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
    /// The customer who placed it.
    pub customer_id: CustomerId,
    /// Fulfilment status.
    pub status: OrderStatus,
    /// Total amount.
    pub total_amount: Decimal,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_date: order.order_date,
            customer_id: order.customer_id,
            status: order.status,
            total_amount: order.total_amount,
        }
    }
}

/// An order with its customer name and line-items, for the detail view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailView {
    /// The order itself.
    #[serde(flatten)]
    pub order: OrderView,
    /// Name of the referenced customer, when the row still exists.
    pub customer_name: Option<String>,
    /// The order's line-items.
    pub lines: Vec<OrderLineView>,
}

/// Incoming order payload for create and edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Must match the path id on edit; ignored on create.
    #[serde(default)]
    pub id: Option<OrderId>,
    /// When the order was placed.
    #[serde(default)]
    pub order_date: Option<DateTime<Utc>>,
    /// The customer who placed it.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    /// Status literal.
    pub status: String,
    /// Total amount.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
}

fn to_draft(payload: &OrderPayload) -> OrderDraft {
    OrderDraft {
        order_date: payload.order_date,
        customer_id: payload.customer_id,
        status: payload.status.clone(),
        total_amount: payload.total_amount,
    }
}

fn order_not_found() -> Error {
    Error::not_found("Order not found.")
}

fn build_order(id: OrderId, draft: OrderDraft) -> ApiResult<Order> {
    // The draft was validated; missing parts cannot occur here.
    let order_date = draft
        .order_date
        .ok_or_else(|| Error::invalid_request("Order date is required."))?;
    let customer_id = draft
        .customer_id
        .ok_or_else(|| Error::invalid_request("Customer is required."))?;
    let status: OrderStatus = draft.status.parse().map_err(|_| {
        Error::invalid_request("Status must be Pending, Processing, Shipped, Delivered or Cancelled.")
    })?;
    let total_amount = draft
        .total_amount
        .ok_or_else(|| Error::invalid_request("Total amount is required."))?;
    Ok(Order {
        id,
        order_date,
        customer_id,
        status,
        total_amount,
    })
}

/// List orders, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    responses(
        (status = 200, description = "Orders", body = [OrderView]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Role not allowed", body = Error),
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Vec<OrderView>>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let orders = state.orders.list().await?;
    Ok(web::Json(orders.into_iter().map(OrderView::from).collect()))
}

/// Fetch one order with its lines.
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    responses(
        (status = 200, description = "The order", body = OrderDetailView),
        (status = 404, description = "No such order", body = Error),
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderId>,
) -> ApiResult<web::Json<OrderDetailView>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let id = path.into_inner();
    let order = state.orders.find(&id).await?.ok_or_else(order_not_found)?;
    let customer_name = state
        .customers
        .find(&order.customer_id)
        .await?
        .map(|customer| customer.name);
    let lines = state.order_lines.list_for_order(&id).await?;
    Ok(web::Json(OrderDetailView {
        order: order.into(),
        customer_name,
        lines: lines.into_iter().map(OrderLineView::from).collect(),
    }))
}

/// Create an order.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = OrderPayload,
    responses(
        (status = 201, description = "Created", body = OrderView),
        (status = 400, description = "Validation failed", body = Error),
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<OrderPayload>,
) -> ApiResult<HttpResponse> {
    session.authorize(&req, MANAGE_ROLES)?;

    let draft = to_draft(&payload);
    let report = validate_order_draft(&draft);
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let order = build_order(OrderId::random(), draft)?;
    state.orders.insert(&order).await?;

    session.set_flash("Order created successfully.")?;
    Ok(HttpResponse::Created().json(OrderView::from(order)))
}

/// Edit an order. The path id must match the payload id.
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    request_body = OrderPayload,
    responses(
        (status = 200, description = "Updated", body = OrderView),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "No such order, or it vanished during the edit", body = Error),
    ),
    tags = ["orders"],
    operation_id = "editOrder"
)]
#[put("/orders/{id}")]
pub async fn edit(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderId>,
    payload: web::Json<OrderPayload>,
) -> ApiResult<web::Json<OrderView>> {
    session.authorize(&req, MANAGE_ROLES)?;

    let id = path.into_inner();
    if payload.id != Some(id) {
        return Err(order_not_found());
    }

    let draft = to_draft(&payload);
    let report = validate_order_draft(&draft);
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let order = build_order(id, draft)?;
    if !state.orders.update(&order).await? {
        // The row vanished between read and write.
        return Err(order_not_found());
    }

    session.set_flash("Order updated successfully.")?;
    Ok(web::Json(order.into()))
}

/// Delete an order. Administrator only; an absent id is a successful no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    responses(
        (status = 200, description = "Deleted (or already absent)", body = RedirectResponse),
        (status = 403, description = "Only administrators may delete", body = Error),
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{id}")]
pub async fn delete_confirmed(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<OrderId>,
) -> ApiResult<web::Json<RedirectResponse>> {
    session.authorize(&req, DELETE_ROLES)?;

    let id = path.into_inner();
    if state.orders.delete(&id).await? {
        session.set_flash("Order deleted successfully.")?;
    }
    Ok(web::Json(RedirectResponse {
        redirect_to: "/orders".to_owned(),
    }))
}
