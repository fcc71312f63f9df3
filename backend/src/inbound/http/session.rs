//! Cookie session helpers: identity claims, role gates, and flash messages.
//!
//! Wraps the Actix session so handlers only deal with domain-level
//! operations. Expiry lives inside the stored [`Claims`]; an expired or
//! unreadable identity is treated as signed-out and the session is purged.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use serde_json::json;

use crate::domain::{Claims, Error, Role};

pub(crate) const IDENTITY_KEY: &str = "identity";
pub(crate) const FLASH_KEY: &str = "flash";

/// Path clients are sent to when authentication is missing.
pub const LOGIN_PATH: &str = "/account/login";
/// Path clients are sent to when their role is insufficient.
pub const ACCESS_DENIED_PATH: &str = "/account/access-denied";

/// Newtype wrapper exposing identity and flash operations over the session.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store the authenticated identity in the session cookie.
    pub fn sign_in(&self, claims: &Claims) -> Result<(), Error> {
        self.0
            .insert(IDENTITY_KEY, claims)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Drop the session unconditionally, expiring the cookie.
    pub fn sign_out(&self) {
        self.0.purge();
    }

    /// Fetch the current identity, if present and unexpired.
    pub fn identity(&self) -> Option<Claims> {
        let claims = match self.0.get::<Claims>(IDENTITY_KEY) {
            Ok(claims) => claims,
            Err(error) => {
                tracing::warn!(%error, "unreadable identity in session cookie");
                self.0.purge();
                return None;
            }
        };
        match claims {
            Some(claims) if claims.is_expired(Utc::now()) => {
                self.0.purge();
                None
            }
            other => other,
        }
    }

    /// Require an authenticated identity, or fail with a login redirect that
    /// preserves the originally requested path.
    pub fn require_identity(&self, req: &HttpRequest) -> Result<Claims, Error> {
        self.identity().ok_or_else(|| login_required(req.path()))
    }

    /// Require an authenticated identity whose role appears in `allowed`.
    pub fn authorize(&self, req: &HttpRequest, allowed: &[Role]) -> Result<Claims, Error> {
        let claims = self.require_identity(req)?;
        if claims.role.is_one_of(allowed) {
            Ok(claims)
        } else {
            Err(access_denied())
        }
    }

    /// Store a transient success message, surfaced once and then cleared.
    pub fn set_flash(&self, message: impl Into<String>) -> Result<(), Error> {
        self.0
            .insert(FLASH_KEY, message.into())
            .map_err(|error| Error::internal(format!("failed to store flash message: {error}")))
    }

    /// Take the pending flash message, clearing it.
    pub fn take_flash(&self) -> Option<String> {
        let message = self.0.get::<String>(FLASH_KEY).unwrap_or_default();
        if message.is_some() {
            self.0.remove(FLASH_KEY);
        }
        message
    }
}

fn login_required(return_url: &str) -> Error {
    Error::unauthorized("Sign in to continue.").with_details(json!({
        "redirectTo": LOGIN_PATH,
        "returnUrl": return_url,
    }))
}

fn access_denied() -> Error {
    Error::forbidden("You do not have permission to perform this action.")
        .with_details(json!({ "redirectTo": ACCESS_DENIED_PATH }))
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
