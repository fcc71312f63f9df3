//! Customer management handlers.
//!
//! Administrators and vendors may manage customers; only administrators may
//! delete them.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Customer, CustomerDraft, CustomerId, Email, Error, Role, ValidationReport,
    validate_customer_draft,
};

use super::account::RedirectResponse;
use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// Roles allowed to manage customers.
pub(crate) const MANAGE_ROLES: &[Role] = &[Role::Administrator, Role::Vendor];
/// Roles allowed to delete customers.
pub(crate) const DELETE_ROLES: &[Role] = &[Role::Administrator];

/// A customer as returned to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    /// Stable identifier.
    pub id: CustomerId,
    /// Customer name.
    pub name: String,
    /// Normalised email address.
    pub email: String,
    /// Postal address, when known.
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: String,
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            email: customer.email.as_str().to_owned(),
            address: customer.address,
            phone: customer.phone,
        }
    }
}

/// Incoming customer payload for create and edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    /// Must match the path id on edit; ignored on create.
    #[serde(default)]
    pub id: Option<CustomerId>,
    /// Customer name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Postal address, optional.
    #[serde(default)]
    pub address: Option<String>,
    /// Contact phone number.
    pub phone: String,
}

/// List query: optional substring filter.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CustomerListQuery {
    /// Case-insensitive substring matched against name, email, address and
    /// phone.
    #[serde(default)]
    pub q: Option<String>,
}

/// Query for the customer email probe.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CustomerEmailQuery {
    /// Candidate email address.
    pub email: String,
    /// The customer being edited, excluded from the check.
    #[serde(default)]
    pub exclude: Option<CustomerId>,
}

fn to_draft(payload: &CustomerPayload) -> CustomerDraft {
    CustomerDraft {
        name: payload.name.clone(),
        email: payload.email.clone(),
        address: payload.address.clone(),
        phone: payload.phone.clone(),
    }
}

fn customer_not_found() -> Error {
    Error::not_found("Customer not found.")
}

/// List customers, optionally filtered.
#[utoipa::path(
    get,
    path = "/api/v1/customers",
    params(CustomerListQuery),
    responses(
        (status = 200, description = "Customers", body = [CustomerView]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Role not allowed", body = Error),
    ),
    tags = ["customers"],
    operation_id = "listCustomers"
)]
#[get("/customers")]
pub async fn list(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<CustomerListQuery>,
) -> ApiResult<web::Json<Vec<CustomerView>>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let customers = state.customers.list(query.q.as_deref()).await?;
    Ok(web::Json(
        customers.into_iter().map(CustomerView::from).collect(),
    ))
}

/// Fetch one customer.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    responses(
        (status = 200, description = "The customer", body = CustomerView),
        (status = 404, description = "No such customer", body = Error),
    ),
    tags = ["customers"],
    operation_id = "getCustomer"
)]
#[get("/customers/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<CustomerId>,
) -> ApiResult<web::Json<CustomerView>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let id = path.into_inner();
    let customer = state
        .customers
        .find(&id)
        .await?
        .ok_or_else(customer_not_found)?;
    Ok(web::Json(customer.into()))
}

async fn validated_email(
    state: &HttpState,
    report: &mut ValidationReport,
    raw: &str,
    exclude: Option<&CustomerId>,
    message: &str,
) -> ApiResult<Option<Email>> {
    match Email::parse(raw) {
        Ok(email) => {
            if state.customers.email_taken(&email, exclude).await? {
                report.add("email", message);
            }
            Ok(Some(email))
        }
        Err(_) => Ok(None),
    }
}

/// Create a customer.
#[utoipa::path(
    post,
    path = "/api/v1/customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Created", body = CustomerView),
        (status = 400, description = "Validation failed", body = Error),
    ),
    tags = ["customers"],
    operation_id = "createCustomer"
)]
#[post("/customers")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: web::Json<CustomerPayload>,
) -> ApiResult<HttpResponse> {
    session.authorize(&req, MANAGE_ROLES)?;

    let draft = to_draft(&payload);
    let mut report = validate_customer_draft(&draft);
    let email = validated_email(
        state.get_ref(),
        &mut report,
        &draft.email,
        None,
        "A customer with that email already exists.",
    )
    .await?;
    if !report.is_valid() {
        return Err(report.into_error());
    }
    let email = email.ok_or_else(|| Error::invalid_request("Invalid email format."))?;

    let customer = Customer {
        id: CustomerId::random(),
        name: draft.name,
        email,
        address: draft.address,
        phone: draft.phone,
    };
    state.customers.insert(&customer).await?;

    session.set_flash(format!("Customer '{}' created successfully.", customer.name))?;
    Ok(HttpResponse::Created().json(CustomerView::from(customer)))
}

/// Edit a customer. The path id must match the payload id.
#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    request_body = CustomerPayload,
    responses(
        (status = 200, description = "Updated", body = CustomerView),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "No such customer, or it vanished during the edit", body = Error),
    ),
    tags = ["customers"],
    operation_id = "editCustomer"
)]
#[put("/customers/{id}")]
pub async fn edit(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<CustomerId>,
    payload: web::Json<CustomerPayload>,
) -> ApiResult<web::Json<CustomerView>> {
    session.authorize(&req, MANAGE_ROLES)?;

    let id = path.into_inner();
    if payload.id != Some(id) {
        return Err(customer_not_found());
    }

    let draft = to_draft(&payload);
    let mut report = validate_customer_draft(&draft);
    let email = validated_email(
        state.get_ref(),
        &mut report,
        &draft.email,
        Some(&id),
        "Another customer with that email already exists.",
    )
    .await?;
    if !report.is_valid() {
        return Err(report.into_error());
    }
    let email = email.ok_or_else(|| Error::invalid_request("Invalid email format."))?;

    let customer = Customer {
        id,
        name: draft.name,
        email,
        address: draft.address,
        phone: draft.phone,
    };
    if !state.customers.update(&customer).await? {
        return Err(customer_not_found());
    }

    session.set_flash(format!("Customer '{}' updated successfully.", customer.name))?;
    Ok(web::Json(customer.into()))
}

/// Delete a customer. Administrator only; an absent id is a successful no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    responses(
        (status = 200, description = "Deleted (or already absent)", body = RedirectResponse),
        (status = 403, description = "Only administrators may delete", body = Error),
    ),
    tags = ["customers"],
    operation_id = "deleteCustomer"
)]
#[delete("/customers/{id}")]
pub async fn delete_confirmed(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    path: web::Path<CustomerId>,
) -> ApiResult<web::Json<RedirectResponse>> {
    session.authorize(&req, DELETE_ROLES)?;

    let id = path.into_inner();
    if let Some(customer) = state.customers.find(&id).await? {
        state.customers.delete(&id).await?;
        session.set_flash(format!("Customer '{}' deleted successfully.", customer.name))?;
    }
    Ok(web::Json(RedirectResponse {
        redirect_to: "/customers".to_owned(),
    }))
}

/// Advisory probe: is this email free for a customer, excluding the one
/// being edited?
#[utoipa::path(
    get,
    path = "/api/v1/customers/check-email",
    params(CustomerEmailQuery),
    responses((status = 200, description = "`true` or an explanatory message")),
    tags = ["customers"],
    operation_id = "checkCustomerEmail"
)]
#[get("/customers/check-email")]
pub async fn check_email(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    query: web::Query<CustomerEmailQuery>,
) -> ApiResult<web::Json<Value>> {
    session.authorize(&req, MANAGE_ROLES)?;
    let Ok(email) = Email::parse(&query.email) else {
        return Ok(web::Json(Value::Bool(true)));
    };
    if state
        .customers
        .email_taken(&email, query.exclude.as_ref())
        .await?
    {
        Ok(web::Json(Value::String(format!(
            "A customer with the email '{}' already exists.",
            query.email
        ))))
    } else {
        Ok(web::Json(Value::Bool(true)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;

    use crate::domain::ports::{CustomerRepository, UserRepository};
    use crate::inbound::http::test_utils::{
        TestBackend, seeded_user, sign_in, test_session_middleware,
    };

    fn test_app(
        backend: &TestBackend,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .wrap(test_session_middleware())
            .app_data(web::Data::new(backend.state()))
            .service(web::scope("/api/v1").configure(crate::inbound::http::configure))
    }

    async fn seed_role(backend: &TestBackend, role: Role) -> (&'static str, &'static str) {
        let email = match role {
            Role::Administrator => "admin@example.com",
            Role::Vendor => "vendor@example.com",
            Role::Client => "client@example.com",
        };
        backend
            .users
            .insert(&seeded_user(role, email, "Aa1!aa", true))
            .await
            .expect("seed user");
        (email, "Aa1!aa")
    }

    fn customer(name: &str, email: &str, phone: &str) -> Customer {
        Customer {
            id: CustomerId::random(),
            name: name.to_owned(),
            email: Email::parse(email).expect("valid email"),
            address: Some("12 Market Lane".to_owned()),
            phone: phone.to_owned(),
        }
    }

    #[actix_web::test]
    async fn unauthenticated_access_redirects_to_login() {
        let backend = TestBackend::new();
        let app = test::init_service(test_app(&backend)).await;
        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/customers").to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        assert_eq!(body["details"]["redirectTo"], "/account/login");
        assert_eq!(body["details"]["returnUrl"], "/api/v1/customers");
    }

    #[rstest]
    #[case(Role::Administrator, StatusCode::OK)]
    #[case(Role::Vendor, StatusCode::OK)]
    #[case(Role::Client, StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn the_list_is_gated_by_role(#[case] role: Role, #[case] expected: StatusCode) {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, role).await;
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/customers")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[case(Role::Administrator, StatusCode::OK)]
    #[case(Role::Vendor, StatusCode::FORBIDDEN)]
    #[actix_web::test]
    async fn only_administrators_may_delete(#[case] role: Role, #[case] expected: StatusCode) {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, role).await;
        let row = customer("Craft Corner", "shop@example.com", "600123456");
        backend.customers.insert(&row).await.expect("seed customer");
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        let response = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/customers/{}", row.id))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), expected);
        let remaining = backend.customers.list(None).await.expect("customer list");
        assert_eq!(remaining.is_empty(), expected == StatusCode::OK);
    }

    #[actix_web::test]
    async fn the_filter_matches_any_field_case_insensitively() {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, Role::Vendor).await;
        backend
            .customers
            .insert(&customer("Craft Corner", "shop@example.com", "600123456"))
            .await
            .expect("seed customer");
        backend
            .customers
            .insert(&customer("Bead Bazaar", "beads@example.com", "911222333"))
            .await
            .expect("seed customer");
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/customers?q=CRAFT")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        let rows = body.as_array().expect("array body");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Craft Corner");
    }

    #[actix_web::test]
    async fn create_rejects_a_taken_email() {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, Role::Vendor).await;
        backend
            .customers
            .insert(&customer("Craft Corner", "shop@example.com", "600123456"))
            .await
            .expect("seed customer");
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/customers")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "name": "Copy Shop",
                    "email": "SHOP@example.com",
                    "phone": "600999888",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        assert_eq!(
            body["details"]["fields"]["email"][0],
            "A customer with that email already exists."
        );
    }

    #[actix_web::test]
    async fn edit_excluding_self_keeps_the_same_email() {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, Role::Vendor).await;
        let row = customer("Craft Corner", "shop@example.com", "600123456");
        backend.customers.insert(&row).await.expect("seed customer");
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/customers/{}", row.id))
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "id": row.id,
                    "name": "Craft Corner Renamed",
                    "email": "shop@example.com",
                    "phone": "600123456",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stored = backend
            .customers
            .find(&row.id)
            .await
            .expect("lookup")
            .expect("still present");
        assert_eq!(stored.name, "Craft Corner Renamed");
    }

    #[actix_web::test]
    async fn edit_of_a_concurrently_deleted_customer_is_not_found() {
        let backend = TestBackend::new();
        let (email, password) = seed_role(&backend, Role::Vendor).await;
        let row = customer("Craft Corner", "shop@example.com", "600123456");
        backend.customers.insert(&row).await.expect("seed customer");
        let app = test::init_service(test_app(&backend)).await;
        let cookie = sign_in(&app, email, password).await;

        backend
            .customers
            .delete(&row.id)
            .await
            .expect("concurrent delete");

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/customers/{}", row.id))
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "id": row.id,
                    "name": "Craft Corner",
                    "email": "shop@example.com",
                    "phone": "600123456",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
