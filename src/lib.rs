use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod reporting;
pub mod repository;
pub mod token;

// Routers grouped by the gates in front of them (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use payments::{MockPaymentGateway, PaymentState, StripeGateway};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use token::TokenService;

/// ApiDoc
///
/// OpenAPI document for every documented handler and schema, served at
/// `/api-docs/openapi.json` and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::issue_token,
        handlers::list_menu, handlers::get_menu_item, handlers::create_menu_item,
        handlers::update_menu_item, handlers::delete_menu_item,
        handlers::list_reviews,
        handlers::create_cart_entry, handlers::list_cart_entries, handlers::delete_cart_entry,
        handlers::get_admin_stats, handlers::get_order_stats,
        handlers::list_payments, handlers::record_payment, handlers::create_payment_intent,
        handlers::list_users, handlers::create_user, handlers::get_admin_status,
        handlers::make_admin, handlers::delete_user
    ),
    components(
        schemas(
            models::User, models::MenuItem, models::Review, models::CartEntry, models::Payment,
            models::CreateUserRequest, models::MenuItemRequest, models::CreateCartEntryRequest,
            models::RecordPaymentRequest, models::PaymentIntentRequest,
            models::InsertResult, models::UpdateResult, models::DeleteResult,
            models::RecordPaymentResponse, models::PaymentIntentResponse, models::TokenResponse,
            models::AdminStatus, models::AdminStats, models::CategoryStats,
            error::ErrorBody,
        )
    ),
    tags(
        (name = "restaurant-hunt", description = "Restaurant Hunt ordering API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of every service the handlers need. External
/// clients (database pool, payment provider) are built once in `main` and
/// injected here, so tests swap in the in-memory store and mock gateway.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for all resource collections.
    pub repo: RepositoryState,
    /// Payment provider client.
    pub payments: PaymentState,
    /// Identity token signer/verifier.
    pub tokens: TokenService,
    /// Settings loaded from the environment at startup.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the state, deriving the token service from the configured secret.
    pub fn new(repo: RepositoryState, payments: PaymentState, config: AppConfig) -> Self {
        Self {
            repo,
            payments,
            tokens: TokenService::new(&config.jwt_secret),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(app_state: &AppState) -> PaymentState {
        app_state.payments.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> TokenService {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routing structure, applies the auth gates and the
/// observability stack, and registers the application state.
///
/// `route_layer` calls wrap outside-in: the last one added runs first. Admin
/// routes therefore pass the identity gate before the admin gate, and either
/// gate's rejection ends the request.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_identity,
            )),
        )
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::require_admin,
                ))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::require_identity,
                )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying method, uri and the `x-request-id`, so every log
/// line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
