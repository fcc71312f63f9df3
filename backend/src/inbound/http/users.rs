//! User management handlers.
//!
//! These routes carry no role gate today, unlike the customer and order
//! surfaces.
// TODO: decide whether user management should require the Administrator role.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::password::PASSWORD_MIN;
use crate::domain::{
    Email, Error, PasswordHash, Role, User, UserDraft, UserId, ValidationReport,
    validate_user_draft,
};

use super::account::RedirectResponse;
use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// A user as returned to clients. The password hash never leaves the server.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Normalised email address.
    pub email: String,
    /// Authorization role.
    pub role: Role,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// When the account was created.
    pub registered_at: DateTime<Utc>,
    /// Whether the account may sign in.
    pub active: bool,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email.as_str().to_owned(),
            role: user.role,
            birth_date: user.birth_date,
            registered_at: user.registered_at,
            active: user.active,
        }
    }
}

/// Incoming user payload for create and edit.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// Must match the path id on edit; ignored on create.
    #[serde(default)]
    pub id: Option<UserId>,
    /// Display name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plaintext password; optional on edit (absent keeps the stored hash).
    #[serde(default)]
    pub password: Option<String>,
    /// Role literal.
    pub role: String,
    /// Date of birth.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Whether the account may sign in.
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

/// Password-change request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PasswordChangeRequest {
    /// The new plaintext password, at least six characters.
    pub password: String,
}

/// Query for the user email probe.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UserEmailQuery {
    /// Candidate email address.
    pub email: String,
    /// The user being edited, excluded from the check.
    #[serde(default)]
    pub exclude: Option<UserId>,
}

fn to_draft(payload: &UserPayload) -> UserDraft {
    UserDraft {
        full_name: payload.full_name.clone(),
        email: payload.email.clone(),
        password: payload.password.clone(),
        role: payload.role.clone(),
        birth_date: payload.birth_date,
        active: payload.active,
    }
}

fn user_not_found() -> Error {
    Error::not_found("User not found.")
}

async fn validated_email(
    state: &HttpState,
    report: &mut ValidationReport,
    raw: &str,
    exclude: Option<&UserId>,
) -> ApiResult<Option<Email>> {
    match Email::parse(raw) {
        Ok(email) => {
            if state.users.email_taken(&email, exclude).await? {
                report.add("email", "A user with that email already exists.");
            }
            Ok(Some(email))
        }
        // Shape problems are already recorded by the field rules.
        Err(_) => Ok(None),
    }
}

/// List users, newest registration first.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    responses((status = 200, description = "Users", body = [UserView])),
    tags = ["users"],
    operation_id = "listUsers",
    security([])
)]
#[get("/users")]
pub async fn list(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<UserView>>> {
    let users = state.users.list().await?;
    Ok(web::Json(users.into_iter().map(UserView::from).collect()))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "The user", body = UserView),
        (status = 404, description = "No such user", body = Error),
    ),
    tags = ["users"],
    operation_id = "getUser",
    security([])
)]
#[get("/users/{id}")]
pub async fn detail(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<UserView>> {
    let id = path.into_inner();
    let user = state.users.find(&id).await?.ok_or_else(user_not_found)?;
    Ok(web::Json(user.into()))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "Created", body = UserView),
        (status = 400, description = "Validation failed", body = Error),
    ),
    tags = ["users"],
    operation_id = "createUser",
    security([])
)]
#[post("/users")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserPayload>,
) -> ApiResult<HttpResponse> {
    let draft = to_draft(&payload);
    let mut report = validate_user_draft(&draft, true, Utc::now().date_naive());
    let email = validated_email(state.get_ref(), &mut report, &draft.email, None).await?;
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let email = email.ok_or_else(|| Error::invalid_request("Invalid email format."))?;
    let plaintext = draft
        .password
        .as_deref()
        .ok_or_else(|| Error::invalid_request("Password is required."))?;
    let password =
        PasswordHash::derive(plaintext).map_err(|error| Error::internal(error.to_string()))?;
    let role: Role = draft
        .role
        .parse()
        .map_err(|_| Error::invalid_request("Role must be Administrator, Vendor or Client."))?;
    let birth_date = draft
        .birth_date
        .ok_or_else(|| Error::invalid_request("Birth date is required."))?;

    let user = User {
        id: UserId::random(),
        full_name: draft.full_name,
        email,
        password,
        role,
        birth_date,
        registered_at: Utc::now(),
        active: draft.active,
    };
    state.users.insert(&user).await?;

    session.set_flash(format!("User '{}' created successfully.", user.full_name))?;
    Ok(HttpResponse::Created().json(UserView::from(user)))
}

/// Edit a user. The path id must match the payload id.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UserPayload,
    responses(
        (status = 200, description = "Updated", body = UserView),
        (status = 400, description = "Validation failed", body = Error),
        (status = 404, description = "No such user, or it vanished during the edit", body = Error),
    ),
    tags = ["users"],
    operation_id = "editUser",
    security([])
)]
#[put("/users/{id}")]
pub async fn edit(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
    payload: web::Json<UserPayload>,
) -> ApiResult<web::Json<UserView>> {
    let id = path.into_inner();
    if payload.id != Some(id) {
        return Err(user_not_found());
    }
    let existing = state.users.find(&id).await?.ok_or_else(user_not_found)?;

    let draft = to_draft(&payload);
    let mut report = validate_user_draft(&draft, false, Utc::now().date_naive());
    let email = validated_email(state.get_ref(), &mut report, &draft.email, Some(&id)).await?;
    if !report.is_valid() {
        return Err(report.into_error());
    }

    let email = email.ok_or_else(|| Error::invalid_request("Invalid email format."))?;
    let password = match draft.password.as_deref() {
        Some(plaintext) => {
            PasswordHash::derive(plaintext).map_err(|error| Error::internal(error.to_string()))?
        }
        None => existing.password.clone(),
    };
    let role: Role = draft
        .role
        .parse()
        .map_err(|_| Error::invalid_request("Role must be Administrator, Vendor or Client."))?;
    let birth_date = draft
        .birth_date
        .ok_or_else(|| Error::invalid_request("Birth date is required."))?;

    let user = User {
        id,
        full_name: draft.full_name,
        email,
        password,
        role,
        birth_date,
        registered_at: existing.registered_at,
        active: draft.active,
    };
    if !state.users.update(&user).await? {
        // The row vanished between read and write.
        return Err(user_not_found());
    }

    session.set_flash(format!("User '{}' updated successfully.", user.full_name))?;
    Ok(web::Json(user.into()))
}

/// Delete a user. Deleting an already-absent id is a successful no-op.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    responses((status = 200, description = "Deleted (or already absent)", body = RedirectResponse)),
    tags = ["users"],
    operation_id = "deleteUser",
    security([])
)]
#[delete("/users/{id}")]
pub async fn delete_confirmed(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<RedirectResponse>> {
    let id = path.into_inner();
    if let Some(user) = state.users.find(&id).await? {
        state.users.delete(&id).await?;
        session.set_flash(format!("User '{}' deleted successfully.", user.full_name))?;
    }
    Ok(web::Json(RedirectResponse {
        redirect_to: "/users".to_owned(),
    }))
}

/// Flip a user's active flag.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/toggle-active",
    responses(
        (status = 200, description = "Toggled", body = UserView),
        (status = 404, description = "No such user", body = Error),
    ),
    tags = ["users"],
    operation_id = "toggleUserActive",
    security([])
)]
#[post("/users/{id}/toggle-active")]
pub async fn toggle_active(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<UserView>> {
    let id = path.into_inner();
    let mut user = state.users.find(&id).await?.ok_or_else(user_not_found)?;
    user.active = !user.active;
    if !state.users.update(&user).await? {
        return Err(user_not_found());
    }

    let verb = if user.active { "activated" } else { "deactivated" };
    session.set_flash(format!("User '{}' {verb} successfully.", user.full_name))?;
    Ok(web::Json(user.into()))
}

/// Replace a user's password. Only the minimum length is enforced here.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/password",
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password replaced", body = RedirectResponse),
        (status = 400, description = "Password too short", body = Error),
        (status = 404, description = "No such user", body = Error),
    ),
    tags = ["users"],
    operation_id = "changeUserPassword",
    security([])
)]
#[post("/users/{id}/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
    payload: web::Json<PasswordChangeRequest>,
) -> ApiResult<web::Json<RedirectResponse>> {
    let id = path.into_inner();
    let mut user = state.users.find(&id).await?.ok_or_else(user_not_found)?;

    let candidate = payload.password.as_str();
    if candidate.trim().is_empty() || candidate.chars().count() < PASSWORD_MIN {
        let mut report = ValidationReport::new();
        report.add(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters."),
        );
        return Err(report.into_error());
    }

    user.password =
        PasswordHash::derive(candidate).map_err(|error| Error::internal(error.to_string()))?;
    if !state.users.update(&user).await? {
        return Err(user_not_found());
    }

    session.set_flash("Password updated successfully.")?;
    Ok(web::Json(RedirectResponse {
        redirect_to: "/users".to_owned(),
    }))
}

/// Advisory probe: is this email free for a user, excluding the one being
/// edited? The create and edit actions re-check server-side.
#[utoipa::path(
    get,
    path = "/api/v1/users/check-email",
    params(UserEmailQuery),
    responses((status = 200, description = "`true` or an explanatory message")),
    tags = ["users"],
    operation_id = "checkUserEmail",
    security([])
)]
#[get("/users/check-email")]
pub async fn check_email(
    state: web::Data<HttpState>,
    query: web::Query<UserEmailQuery>,
) -> ApiResult<web::Json<Value>> {
    let Ok(email) = Email::parse(&query.email) else {
        return Ok(web::Json(Value::Bool(true)));
    };
    if state
        .users
        .email_taken(&email, query.exclude.as_ref())
        .await?
    {
        Ok(web::Json(Value::String(format!(
            "The email '{}' is already registered in the system.",
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

    use crate::domain::ports::UserRepository;
    use crate::inbound::http::test_utils::{TestBackend, seeded_user, test_session_middleware};

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

    fn payload(id: Option<UserId>, email: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "fullName": "Crafts Clerk",
            "email": email,
            "password": "Aa1!aa",
            "role": "Vendor",
            "birthDate": "1990-01-01",
            "active": true,
        })
    }

    #[actix_web::test]
    async fn create_rejects_a_taken_email() {
        let backend = TestBackend::new();
        backend
            .users
            .insert(&seeded_user(Role::Vendor, "clerk@example.com", "Aa1!aa", true))
            .await
            .expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(payload(None, "Clerk@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        assert_eq!(
            body["details"]["fields"]["email"][0],
            "A user with that email already exists."
        );
    }

    #[actix_web::test]
    async fn create_then_detail_round_trips() {
        let backend = TestBackend::new();
        let app = test::init_service(test_app(&backend)).await;

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/users")
                .set_json(payload(None, "clerk@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let created: serde_json::Value =
            serde_json::from_slice(&test::read_body(created).await).expect("json body");
        assert!(created.get("password").is_none(), "hash must not be exposed");

        let id = created["id"].as_str().expect("created id");
        let detail_response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/users/{id}"))
                .to_request(),
        )
        .await;
        assert_eq!(detail_response.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn edit_requires_matching_ids() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Vendor, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/users/{}", user.id))
                .set_json(payload(Some(UserId::random()), "clerk@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn edit_of_a_concurrently_deleted_user_is_not_found() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Vendor, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        // Another actor deletes the row between the client's read and write.
        backend.users.delete(&user.id).await.expect("concurrent delete");

        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/users/{}", user.id))
                .set_json(payload(Some(user.id), "clerk@example.com"))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(backend.users.list().await.expect("user list").is_empty());
    }

    #[actix_web::test]
    async fn edit_without_a_password_keeps_the_stored_hash() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Vendor, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let mut body = payload(Some(user.id), "clerk@example.com");
        body.as_object_mut().expect("object body").remove("password");
        let response = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/users/{}", user.id))
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let stored = backend
            .users
            .find(&user.id)
            .await
            .expect("lookup")
            .expect("still present");
        assert!(stored.password.verify("Aa1!aa"));
    }

    #[actix_web::test]
    async fn delete_is_idempotent() {
        let backend = TestBackend::new();
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri(&format!("/api/v1/users/{}", UserId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        assert_eq!(body["redirectTo"], "/users");
    }

    #[actix_web::test]
    async fn detail_of_an_absent_user_is_not_found() {
        let backend = TestBackend::new();
        let app = test::init_service(test_app(&backend)).await;
        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/api/v1/users/{}", UserId::random()))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn toggle_active_flips_the_flag() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Client, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/toggle-active", user.id))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stored = backend
            .users
            .find(&user.id)
            .await
            .expect("lookup")
            .expect("still present");
        assert!(!stored.active);
    }

    #[actix_web::test]
    async fn short_replacement_passwords_are_rejected() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Client, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/password", user.id))
                .set_json(serde_json::json!({ "password": "abc" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(response).await).expect("json body");
        assert_eq!(
            body["details"]["fields"]["password"][0],
            "Password must be at least 6 characters."
        );
        let stored = backend
            .users
            .find(&user.id)
            .await
            .expect("lookup")
            .expect("still present");
        assert!(stored.password.verify("Aa1!aa"), "password must be unchanged");
    }

    #[actix_web::test]
    async fn change_password_rehashes_the_new_value() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Client, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let response = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/api/v1/users/{}/password", user.id))
                .set_json(serde_json::json!({ "password": "brand-new" }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stored = backend
            .users
            .find(&user.id)
            .await
            .expect("lookup")
            .expect("still present");
        assert!(stored.password.verify("brand-new"));
        assert_ne!(stored.password.as_str(), "brand-new", "must be stored hashed");
    }

    #[actix_web::test]
    async fn the_email_probe_excludes_the_record_under_edit() {
        let backend = TestBackend::new();
        let user = seeded_user(Role::Client, "clerk@example.com", "Aa1!aa", true);
        backend.users.insert(&user).await.expect("seed user");
        let app = test::init_service(test_app(&backend)).await;

        let same_record = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!(
                    "/api/v1/users/check-email?email=clerk@example.com&exclude={}",
                    user.id
                ))
                .to_request(),
        )
        .await;
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(same_record).await).expect("json body");
        assert_eq!(body, serde_json::json!(true));

        let other_record = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/users/check-email?email=clerk@example.com")
                .to_request(),
        )
        .await;
        let body: serde_json::Value =
            serde_json::from_slice(&test::read_body(other_record).await).expect("json body");
        assert_eq!(
            body,
            serde_json::json!("The email 'clerk@example.com' is already registered in the system.")
        );
    }
}
