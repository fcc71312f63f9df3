//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API: every
//! endpoint of the inbound layer, the shared schemas, and the session cookie
//! security scheme. Swagger UI serves the result in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::account::{FlashResponse, LoginRequest, RedirectResponse, RegisterRequest};
use crate::inbound::http::customers::{CustomerPayload, CustomerView};
use crate::inbound::http::order_lines::{OrderLinePayload, OrderLineView};
use crate::inbound::http::orders::{OrderDetailView, OrderPayload, OrderView};
use crate::inbound::http::products::ProductView;
use crate::inbound::http::users::{PasswordChangeRequest, UserPayload, UserView};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/account/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Crafts back-office API",
        description = "Session-authenticated management of users, customers, orders and order lines."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::account::login,
        crate::inbound::http::account::logout,
        crate::inbound::http::account::register,
        crate::inbound::http::account::check_email,
        crate::inbound::http::account::flash,
        crate::inbound::http::users::list,
        crate::inbound::http::users::detail,
        crate::inbound::http::users::create,
        crate::inbound::http::users::edit,
        crate::inbound::http::users::delete_confirmed,
        crate::inbound::http::users::toggle_active,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::check_email,
        crate::inbound::http::customers::list,
        crate::inbound::http::customers::detail,
        crate::inbound::http::customers::create,
        crate::inbound::http::customers::edit,
        crate::inbound::http::customers::delete_confirmed,
        crate::inbound::http::customers::check_email,
        crate::inbound::http::orders::list,
        crate::inbound::http::orders::detail,
        crate::inbound::http::orders::create,
        crate::inbound::http::orders::edit,
        crate::inbound::http::orders::delete_confirmed,
        crate::inbound::http::order_lines::list,
        crate::inbound::http::order_lines::detail,
        crate::inbound::http::order_lines::create,
        crate::inbound::http::order_lines::edit,
        crate::inbound::http::order_lines::delete_confirmed,
        crate::inbound::http::products::list,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        LoginRequest,
        RegisterRequest,
        RedirectResponse,
        FlashResponse,
        UserView,
        UserPayload,
        PasswordChangeRequest,
        CustomerView,
        CustomerPayload,
        OrderView,
        OrderDetailView,
        OrderPayload,
        OrderLineView,
        OrderLinePayload,
        ProductView,
    ))
)]
pub struct ApiDoc;
