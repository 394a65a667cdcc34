use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a token: browsing, carts, checkout and
/// registration.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Welcome banner.
        .route("/", get(handlers::root))
        // GET /health
        // Load balancer probe.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Signs an identity payload into a five day bearer token.
        .route("/jwt", post(handlers::issue_token))
        // --- Menu & Reviews (read-only here) ---
        .route("/menu", get(handlers::list_menu))
        .route("/menu/{id}", get(handlers::get_menu_item))
        .route("/reviews", get(handlers::list_reviews))
        // --- Carts ---
        // GET /carts?email=... lists one customer's cart.
        .route(
            "/carts",
            get(handlers::list_cart_entries).post(handlers::create_cart_entry),
        )
        // DELETE /carts/{id}
        // Deletes by id without checking who owns the entry.
        .route("/carts/{id}", delete(handlers::delete_cart_entry))
        // GET /order-stats
        // Category revenue breakdown.
        .route("/order-stats", get(handlers::get_order_stats))
        // --- Checkout ---
        // POST /payments stores the payment and clears the paid cart entries.
        .route("/payments", post(handlers::record_payment))
        // POST /create-payment-intent returns the provider's client secret.
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
        // POST /users
        // First sign-in registration, idempotent by email.
        .route("/users", post(handlers::create_user))
}
