//! Account handlers: login, logout, self-registration, the registration
//! email probe, and the pending flash message.

use std::sync::OnceLock;

use actix_web::{HttpResponse, get, post, web};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Claims, Email, Error, LoginError, PasswordHash, RegisterDraft, Role, User, UserId,
    ValidationReport, validate_register_draft,
};
use crate::domain::validation::{email_format, required};

use super::error::ApiResult;
use super::session::{LOGIN_PATH, SessionContext};
use super::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Account email address.
    pub email: String,
    /// Plaintext password, verified against the stored hash.
    pub password: String,
    /// Extends the session from two hours to seven days.
    #[serde(default)]
    pub remember_me: bool,
    /// Path to return to after login; honoured only when same-origin.
    #[serde(default)]
    pub return_url: Option<String>,
}

/// Self-registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Display name.
    pub full_name: String,
    /// Email address; must not already be registered.
    pub email: String,
    /// Plaintext password, subject to the complexity policy.
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
    /// Date of birth; the account holder must be at least 18.
    pub birth_date: Option<NaiveDate>,
}

/// Where the client should navigate next.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedirectResponse {
    /// Target path.
    pub redirect_to: String,
}

/// Query for the registration email probe.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RegisterEmailQuery {
    /// Candidate email address.
    pub email: String,
}

/// Pending flash message, cleared by this read.
#[derive(Debug, Serialize, ToSchema)]
pub struct FlashResponse {
    /// The message, when one was pending.
    pub message: Option<String>,
}

static LOCAL_BASE: OnceLock<Url> = OnceLock::new();

fn local_base() -> &'static Url {
    LOCAL_BASE.get_or_init(|| {
        Url::parse("http://localhost")
            .unwrap_or_else(|error| panic!("base url failed to parse: {error}"))
    })
}

fn is_local_path(candidate: &str) -> bool {
    if !candidate.starts_with('/') || candidate.starts_with("//") || candidate.contains('\\') {
        return false;
    }
    match local_base().join(candidate) {
        Ok(joined) => joined.origin() == local_base().origin(),
        Err(_) => false,
    }
}

/// Resolve the post-login redirect: a same-origin relative path is honoured,
/// anything else falls back to the landing page.
pub(crate) fn resolve_return_url(candidate: Option<&str>) -> String {
    match candidate {
        Some(path) if is_local_path(path) => path.to_owned(),
        _ => "/".to_owned(),
    }
}

/// Authenticate and establish a cookie session.
#[utoipa::path(
    post,
    path = "/api/v1/account/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = RedirectResponse,
         headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing or malformed fields", body = Error),
        (status = 401, description = "Credentials denied", body = Error),
    ),
    tags = ["account"],
    operation_id = "login",
    security([])
)]
#[post("/account/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();

    let mut report = ValidationReport::new();
    report.check(
        "email",
        &request.email,
        &[required("Email is required."), email_format("Invalid email format.")],
    );
    report.check("password", &request.password, &[required("Password is required.")]);
    if !report.is_valid() {
        return Err(report.into_error());
    }

    match state.auth.login(&request.email, &request.password).await {
        Ok(user) => {
            let claims = Claims::issue(&user, request.remember_me, Utc::now());
            session.sign_in(&claims)?;
            Ok(HttpResponse::Ok().json(RedirectResponse {
                redirect_to: resolve_return_url(request.return_url.as_deref()),
            }))
        }
        Err(LoginError::Repository(error)) => Err(error.into()),
        // Form-level denial: echo the submitted email and return target so
        // the client can re-render the form.
        Err(denial) => Err(Error::unauthorized(denial.to_string()).with_details(json!({
            "email": request.email,
            "returnUrl": request.return_url,
        }))),
    }
}

/// Drop the session unconditionally.
#[utoipa::path(
    post,
    path = "/api/v1/account/logout",
    responses((status = 200, description = "Signed out", body = RedirectResponse)),
    tags = ["account"],
    operation_id = "logout"
)]
#[post("/account/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.sign_out();
    Ok(HttpResponse::Ok().json(RedirectResponse {
        redirect_to: "/".to_owned(),
    }))
}

/// Register a new account with the default `Client` role.
#[utoipa::path(
    post,
    path = "/api/v1/account/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RedirectResponse),
        (status = 400, description = "Validation failed", body = Error),
    ),
    tags = ["account"],
    operation_id = "register",
    security([])
)]
#[post("/account/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let request = payload.into_inner();
    let draft = RegisterDraft {
        full_name: request.full_name.clone(),
        email: request.email.clone(),
        password: request.password.clone(),
        confirm_password: request.confirm_password.clone(),
        birth_date: request.birth_date,
    };

    let mut report = validate_register_draft(&draft, Utc::now().date_naive());
    let email = match Email::parse(&draft.email) {
        Ok(email) => {
            if state.users.email_taken(&email, None).await? {
                report.add("email", "A user with that email already exists.");
            }
            Some(email)
        }
        // Shape problems are already recorded by the field rules.
        Err(_) => None,
    };
    if !report.is_valid() {
        return Err(report.into_error());
    }
    let email = email.ok_or_else(|| Error::invalid_request("Invalid email format."))?;
    let birth_date = draft
        .birth_date
        .ok_or_else(|| Error::invalid_request("Birth date is required."))?;

    let password = PasswordHash::derive(&draft.password)
        .map_err(|error| Error::internal(error.to_string()))?;
    let user = User {
        id: UserId::random(),
        full_name: draft.full_name,
        email,
        password,
        role: Role::Client,
        birth_date,
        registered_at: Utc::now(),
        active: true,
    };
    state.users.insert(&user).await?;

    session.set_flash("Registration complete. You can now sign in.")?;
    Ok(HttpResponse::Created().json(RedirectResponse {
        redirect_to: LOGIN_PATH.to_owned(),
    }))
}

/// Advisory probe: is this email free to register?
///
/// Returns `true` when available, or a human-readable message when taken.
/// The register action re-checks server-side; this endpoint only feeds
/// inline form feedback.
#[utoipa::path(
    get,
    path = "/api/v1/account/check-email",
    params(RegisterEmailQuery),
    responses((status = 200, description = "`true` or an explanatory message")),
    tags = ["account"],
    operation_id = "checkRegistrationEmail",
    security([])
)]
#[get("/account/check-email")]
pub async fn check_email(
    state: web::Data<HttpState>,
    query: web::Query<RegisterEmailQuery>,
) -> ApiResult<web::Json<Value>> {
    let Ok(email) = Email::parse(&query.email) else {
        // A malformed address matches no account; shape errors belong to the
        // email field rules, not this probe.
        return Ok(web::Json(Value::Bool(true)));
    };
    if state.users.email_taken(&email, None).await? {
        Ok(web::Json(Value::String(format!(
            "The email '{}' is already registered.",
            query.email
        ))))
    } else {
        Ok(web::Json(Value::Bool(true)))
    }
}

/// Take the pending flash message, if any.
#[utoipa::path(
    get,
    path = "/api/v1/flash",
    responses((status = 200, description = "Pending message, now cleared", body = FlashResponse)),
    tags = ["account"],
    operation_id = "takeFlash",
    security([])
)]
#[get("/flash")]
pub async fn flash(session: SessionContext) -> ApiResult<web::Json<FlashResponse>> {
    Ok(web::Json(FlashResponse {
        message: session.take_flash(),
    }))
}
