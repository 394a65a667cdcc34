use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Admin Router Module
///
/// Routes restricted to stored users with `role = "admin"`. `create_router`
/// wraps this router in the identity gate and then the admin gate, so none of
/// these handlers runs for anyone else.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Menu management ---
        .route("/menu", post(handlers::create_menu_item))
        .route(
            "/menu/{id}",
            patch(handlers::update_menu_item).delete(handlers::delete_menu_item),
        )
        // GET /admin-stats
        // Dashboard counters and total revenue.
        .route("/admin-stats", get(handlers::get_admin_stats))
        // --- User management ---
        .route("/users", get(handlers::list_users))
        .route("/users/admin/{user}", patch(handlers::make_admin))
        .route("/users/{id}", delete(handlers::delete_user))
}
