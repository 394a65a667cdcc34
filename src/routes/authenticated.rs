use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that need a verified identity but no particular role. Both handlers
/// additionally require the path email to equal the token's email.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /payments/{email}
        // The caller's own payment history.
        .route("/payments/{email}", get(handlers::list_payments))
        // GET /users/admin/{user}
        // `{user}` is the email here; the admin router's PATCH on the same path
        // takes an id, and both must share one parameter name.
        .route("/users/admin/{user}", get(handlers::get_admin_status))
}
