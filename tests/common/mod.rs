#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use restaurant_hunt::{
    AppConfig, AppState, InMemoryRepository, MockPaymentGateway, PaymentState, RepositoryState,
    TokenService, create_router,
    models::{CreateUserRequest, MenuItemRequest, NewCartEntry},
    repository::Repository,
    token::IdentityClaims,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// A router over the in-memory store and mock gateway, plus handles to both.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub payments: MockPaymentGateway,
    pub tokens: TokenService,
}

pub fn spawn_app() -> TestApp {
    spawn_app_with_gateway(MockPaymentGateway::new())
}

/// Like `spawn_app`, with a caller-supplied payment gateway.
pub fn spawn_app_with_gateway(payments: MockPaymentGateway) -> TestApp {
    let repo = Arc::new(InMemoryRepository::new());

    let state = AppState::new(
        repo.clone() as RepositoryState,
        Arc::new(payments.clone()) as PaymentState,
        AppConfig::default(),
    );
    let tokens = state.tokens.clone();

    TestApp {
        router: create_router(state),
        repo,
        payments,
        tokens,
    }
}

impl TestApp {
    pub fn token_for(&self, email: &str) -> String {
        self.tokens
            .issue(IdentityClaims::for_email(email))
            .expect("token signing")
    }

    /// Registers `email`, returning its id.
    pub async fn seed_user(&self, email: &str) -> Uuid {
        self.repo
            .create_user(CreateUserRequest {
                email: email.to_string(),
                name: None,
            })
            .await
            .unwrap()
            .inserted_id
            .expect("fresh user")
    }

    /// Registers `email` as an admin and returns a bearer token for it.
    pub async fn seed_admin(&self, email: &str) -> String {
        let id = self.seed_user(email).await;
        self.repo.make_admin(id).await.unwrap();
        self.token_for(email)
    }

    pub async fn seed_menu_item(&self, name: &str, category: &str, price: f64) -> Uuid {
        self.repo
            .create_menu_item(MenuItemRequest {
                name: name.to_string(),
                recipe: format!("{name} recipe"),
                image: format!("https://img.example/{name}.jpg"),
                category: category.to_string(),
                price,
            })
            .await
            .unwrap()
            .inserted_id
            .unwrap()
    }

    pub async fn seed_cart_entry(&self, email: &str, menu_id: Uuid, price: f64) -> Uuid {
        self.repo
            .create_cart_entry(NewCartEntry {
                email: email.to_string(),
                menu_id,
                name: "cart item".to_string(),
                image: String::new(),
                price,
            })
            .await
            .unwrap()
            .inserted_id
            .unwrap()
    }

    /// Sends a request through the full router, returning status and JSON body.
    /// Non-JSON bodies come back as a JSON string.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token, None)
}
