//! Test helpers for inbound HTTP components: a session middleware with a
//! throwaway key, deterministic in-memory repositories, and a small harness
//! for driving handlers through a real Actix test service.

use std::sync::{Arc, Mutex};

use actix_http::Request;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::domain::ports::{
    CustomerRepository, OrderLineRepository, OrderRepository, PersistenceError, ProductCatalog,
    UserRepository,
};
use crate::domain::{
    Customer, CustomerId, Email, Order, OrderId, OrderLine, OrderLineId, PasswordHash, Product,
    ProductId, Role, User, UserId,
};

use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// In-memory `UserRepository`.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn list(&self) -> Result<Vec<User>, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock").clone();
        rows.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(rows)
    }

    async fn find(&self, id: &UserId) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.email == *email)
            .cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), PersistenceError> {
        self.rows.lock().expect("rows lock").push(user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        match rows.iter_mut().find(|row| row.id == user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id != *id);
        Ok(rows.len() < before)
    }

    async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<&UserId>,
    ) -> Result<bool, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .any(|row| row.email == *email && Some(&row.id) != exclude))
    }
}

/// In-memory `CustomerRepository`.
#[derive(Default)]
pub struct InMemoryCustomers {
    rows: Mutex<Vec<Customer>>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl CustomerRepository for InMemoryCustomers {
    async fn list(&self, filter: Option<&str>) -> Result<Vec<Customer>, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock").clone();
        if let Some(needle) = filter.map(str::trim).filter(|needle| !needle.is_empty()) {
            rows.retain(|row| {
                contains_ci(&row.name, needle)
                    || contains_ci(row.email.as_str(), needle)
                    || row
                        .address
                        .as_deref()
                        .is_some_and(|address| contains_ci(address, needle))
                    || contains_ci(&row.phone, needle)
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find(&self, id: &CustomerId) -> Result<Option<Customer>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    async fn insert(&self, customer: &Customer) -> Result<(), PersistenceError> {
        self.rows.lock().expect("rows lock").push(customer.clone());
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        match rows.iter_mut().find(|row| row.id == customer.id) {
            Some(row) => {
                *row = customer.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &CustomerId) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id != *id);
        Ok(rows.len() < before)
    }

    async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<&CustomerId>,
    ) -> Result<bool, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .any(|row| row.email == *email && Some(&row.id) != exclude))
    }
}

/// In-memory `OrderRepository`.
#[derive(Default)]
pub struct InMemoryOrders {
    rows: Mutex<Vec<Order>>,
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn list(&self) -> Result<Vec<Order>, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock").clone();
        rows.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(rows)
    }

    async fn find(&self, id: &OrderId) -> Result<Option<Order>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    async fn insert(&self, order: &Order) -> Result<(), PersistenceError> {
        self.rows.lock().expect("rows lock").push(order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        match rows.iter_mut().find(|row| row.id == order.id) {
            Some(row) => {
                *row = order.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &OrderId) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id != *id);
        Ok(rows.len() < before)
    }
}

/// In-memory `OrderLineRepository`.
#[derive(Default)]
pub struct InMemoryOrderLines {
    rows: Mutex<Vec<OrderLine>>,
}

#[async_trait]
impl OrderLineRepository for InMemoryOrderLines {
    async fn list(&self) -> Result<Vec<OrderLine>, PersistenceError> {
        Ok(self.rows.lock().expect("rows lock").clone())
    }

    async fn list_for_order(&self, order: &OrderId) -> Result<Vec<OrderLine>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .filter(|row| row.order_id == *order)
            .cloned()
            .collect())
    }

    async fn find(&self, id: &OrderLineId) -> Result<Option<OrderLine>, PersistenceError> {
        Ok(self
            .rows
            .lock()
            .expect("rows lock")
            .iter()
            .find(|row| row.id == *id)
            .cloned())
    }

    async fn insert(&self, line: &OrderLine) -> Result<(), PersistenceError> {
        self.rows.lock().expect("rows lock").push(line.clone());
        Ok(())
    }

    async fn update(&self, line: &OrderLine) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        match rows.iter_mut().find(|row| row.id == line.id) {
            Some(row) => {
                *row = line.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &OrderLineId) -> Result<bool, PersistenceError> {
        let mut rows = self.rows.lock().expect("rows lock");
        let before = rows.len();
        rows.retain(|row| row.id != *id);
        Ok(rows.len() < before)
    }
}

/// Fixed product catalog for tests.
pub struct FixtureProducts {
    rows: Vec<Product>,
}

impl Default for FixtureProducts {
    fn default() -> Self {
        Self {
            rows: vec![
                Product {
                    id: ProductId::random(),
                    name: "Ceramic mug".to_owned(),
                    price: Decimal::new(1450, 2),
                },
                Product {
                    id: ProductId::random(),
                    name: "Woven basket".to_owned(),
                    price: Decimal::new(3200, 2),
                },
            ],
        }
    }
}

#[async_trait]
impl ProductCatalog for FixtureProducts {
    async fn list(&self) -> Result<Vec<Product>, PersistenceError> {
        Ok(self.rows.clone())
    }
}

/// The full set of in-memory repositories behind one [`HttpState`].
pub struct TestBackend {
    /// User rows.
    pub users: Arc<InMemoryUsers>,
    /// Customer rows.
    pub customers: Arc<InMemoryCustomers>,
    /// Order rows.
    pub orders: Arc<InMemoryOrders>,
    /// Order line rows.
    pub order_lines: Arc<InMemoryOrderLines>,
    /// Product fixtures.
    pub products: Arc<FixtureProducts>,
}

impl TestBackend {
    /// Empty repositories.
    pub fn new() -> Self {
        Self {
            users: Arc::new(InMemoryUsers::default()),
            customers: Arc::new(InMemoryCustomers::default()),
            orders: Arc::new(InMemoryOrders::default()),
            order_lines: Arc::new(InMemoryOrderLines::default()),
            products: Arc::new(FixtureProducts::default()),
        }
    }

    /// Handler state over these repositories.
    pub fn state(&self) -> HttpState {
        HttpState::new(
            self.users.clone(),
            self.customers.clone(),
            self.orders.clone(),
            self.order_lines.clone(),
            self.products.clone(),
        )
    }
}

/// A user with a real (hashed) password, ready to be inserted and signed in.
pub fn seeded_user(role: Role, email: &str, password: &str, active: bool) -> User {
    User {
        id: UserId::random(),
        full_name: "Seeded Account".to_owned(),
        email: Email::parse(email).expect("valid seed email"),
        password: PasswordHash::derive(password).expect("hashable seed password"),
        role,
        birth_date: NaiveDate::from_ymd_opt(1985, 5, 5).expect("valid seed date"),
        registered_at: Utc::now(),
        active,
    }
}

/// Sign in through the real login endpoint and return the session cookie.
pub async fn sign_in<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/account/login")
            .set_json(serde_json::json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "login failed with {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie issued")
        .into_owned()
}
