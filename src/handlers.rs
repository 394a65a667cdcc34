use crate::{
    AppState,
    auth::{AuthUser, ensure_same_email},
    error::{AppError, ErrorBody, parse_id},
    models::{
        AdminStats, AdminStatus, CartEntry, CartFilter, CategoryStats, CreateCartEntryRequest,
        CreateUserRequest, DeleteResult, InsertResult, MenuItem, MenuItemRequest, NewCartEntry,
        NewPayment, Payment, PaymentIntentRequest, PaymentIntentResponse, RecordPaymentRequest,
        RecordPaymentResponse, Review, TokenResponse, UpdateResult, User,
    },
    payments::amount_in_cents,
    reporting,
    token::IdentityClaims,
};
use axum::{
    Json,
    extract::{FromRequest, Path, Query, State},
};

// --- Extractors ---

/// ApiJson
///
/// `axum::Json` with body rejections mapped to `AppError::BadRequest`, so a
/// malformed payload gets the same `{ "message" }` shape as every other error.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

// --- Validation ---

fn ensure_price(price: f64) -> Result<(), AppError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("invalid price: {price}")))
    }
}

fn ensure_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        Err(AppError::BadRequest("email is required".to_string()))
    } else {
        Ok(())
    }
}

fn parse_ids(raw: &[String]) -> Result<Vec<uuid::Uuid>, AppError> {
    raw.iter().map(|id| parse_id(id)).collect()
}

// --- Handlers ---

/// root
///
/// [Public Route] Liveness banner.
pub async fn root() -> &'static str {
    "Welcome to Restaurant Hunt"
}

/// issue_token
///
/// [Public Route] Signs the posted identity payload into a five day bearer token.
#[utoipa::path(
    post,
    path = "/jwt",
    responses(
        (status = 200, description = "Signed token", body = TokenResponse),
        (status = 400, description = "Payload without an email", body = ErrorBody)
    )
)]
pub async fn issue_token(
    State(state): State<AppState>,
    ApiJson(identity): ApiJson<IdentityClaims>,
) -> Result<Json<TokenResponse>, AppError> {
    ensure_email(&identity.email)?;
    let token = state.tokens.issue(identity)?;
    Ok(Json(TokenResponse { token }))
}

// --- Menu ---

/// list_menu
///
/// [Public Route] Every menu item.
#[utoipa::path(
    get,
    path = "/menu",
    responses((status = 200, description = "Menu", body = [MenuItem]))
)]
pub async fn list_menu(State(state): State<AppState>) -> Result<Json<Vec<MenuItem>>, AppError> {
    Ok(Json(state.repo.list_menu().await?))
}

/// get_menu_item
///
/// [Public Route] A single menu item. Malformed ids are a 400, unknown ids a 404.
#[utoipa::path(
    get,
    path = "/menu/{id}",
    params(("id" = String, Path, description = "Menu item ID")),
    responses(
        (status = 200, description = "Found", body = MenuItem),
        (status = 400, description = "Malformed ID", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MenuItem>, AppError> {
    let id = parse_id(&id)?;
    state
        .repo
        .get_menu_item(id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// create_menu_item
///
/// [Admin Route] Adds a menu item.
#[utoipa::path(
    post,
    path = "/menu",
    request_body = MenuItemRequest,
    responses(
        (status = 200, description = "Created", body = InsertResult),
        (status = 401, description = "No or invalid token", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn create_menu_item(
    State(state): State<AppState>,
    ApiJson(item): ApiJson<MenuItemRequest>,
) -> Result<Json<InsertResult>, AppError> {
    ensure_price(item.price)?;
    Ok(Json(state.repo.create_menu_item(item).await?))
}

/// update_menu_item
///
/// [Admin Route] Overwrites name, price, category, recipe and image.
#[utoipa::path(
    patch,
    path = "/menu/{id}",
    params(("id" = String, Path, description = "Menu item ID")),
    request_body = MenuItemRequest,
    responses((status = 200, description = "Updated", body = UpdateResult))
)]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(item): ApiJson<MenuItemRequest>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = parse_id(&id)?;
    ensure_price(item.price)?;
    Ok(Json(state.repo.update_menu_item(id, item).await?))
}

/// delete_menu_item
///
/// [Admin Route] Removes a menu item. Past payments keep referencing it but it
/// no longer counts in the order stats.
#[utoipa::path(
    delete,
    path = "/menu/{id}",
    params(("id" = String, Path, description = "Menu item ID")),
    responses((status = 200, description = "Deleted", body = DeleteResult))
)]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.repo.delete_menu_item(id).await?))
}

// --- Reviews ---

/// list_reviews
///
/// [Public Route] Every review.
#[utoipa::path(
    get,
    path = "/reviews",
    responses((status = 200, description = "Reviews", body = [Review]))
)]
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, AppError> {
    Ok(Json(state.repo.list_reviews().await?))
}

// --- Carts ---

/// create_cart_entry
///
/// [Public Route] Adds an item to the cart of `email`.
#[utoipa::path(
    post,
    path = "/carts",
    request_body = CreateCartEntryRequest,
    responses((status = 200, description = "Added", body = InsertResult))
)]
pub async fn create_cart_entry(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCartEntryRequest>,
) -> Result<Json<InsertResult>, AppError> {
    ensure_email(&payload.email)?;
    ensure_price(payload.price)?;
    let entry = NewCartEntry {
        menu_id: parse_id(&payload.menu_id)?,
        email: payload.email,
        name: payload.name,
        image: payload.image,
        price: payload.price,
    };
    Ok(Json(state.repo.create_cart_entry(entry).await?))
}

/// list_cart_entries
///
/// [Public Route] Cart entries owned by `?email=`. Without an email nothing matches.
#[utoipa::path(
    get,
    path = "/carts",
    params(CartFilter),
    responses((status = 200, description = "Cart", body = [CartEntry]))
)]
pub async fn list_cart_entries(
    State(state): State<AppState>,
    Query(filter): Query<CartFilter>,
) -> Result<Json<Vec<CartEntry>>, AppError> {
    let Some(email) = filter.email else {
        return Ok(Json(Vec::new()));
    };
    Ok(Json(state.repo.list_cart_entries(&email).await?))
}

/// delete_cart_entry
///
/// [Public Route] Removes a cart entry by id. There is no ownership check.
#[utoipa::path(
    delete,
    path = "/carts/{id}",
    params(("id" = String, Path, description = "Cart entry ID")),
    responses((status = 200, description = "Deleted", body = DeleteResult))
)]
pub async fn delete_cart_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.repo.delete_cart_entry(id).await?))
}

// --- Reporting ---

/// get_admin_stats
///
/// [Admin Route] User count, menu size and total revenue.
#[utoipa::path(
    get,
    path = "/admin-stats",
    responses((status = 200, description = "Stats", body = AdminStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>, AppError> {
    Ok(Json(reporting::admin_summary(state.repo.as_ref()).await?))
}

/// get_order_stats
///
/// [Public Route] Purchased quantity and revenue per menu category.
#[utoipa::path(
    get,
    path = "/order-stats",
    responses((status = 200, description = "Category breakdown", body = [CategoryStats]))
)]
pub async fn get_order_stats(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryStats>>, AppError> {
    Ok(Json(reporting::order_stats(state.repo.as_ref()).await?))
}

// --- Payments ---

/// list_payments
///
/// [Authenticated Route] Payment history of the caller. Asking for anybody
/// else's email is a 403.
#[utoipa::path(
    get,
    path = "/payments/{email}",
    params(("email" = String, Path, description = "Payer email")),
    responses(
        (status = 200, description = "Payments", body = [Payment]),
        (status = 403, description = "Not your email", body = ErrorBody)
    )
)]
pub async fn list_payments(
    user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Payment>>, AppError> {
    ensure_same_email(&user, &email)?;
    Ok(Json(state.repo.list_payments(&email).await?))
}

/// record_payment
///
/// [Public Route] Stores a completed checkout and clears the paid cart entries.
/// The response carries both write summaries.
#[utoipa::path(
    post,
    path = "/payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Recorded", body = RecordPaymentResponse),
        (status = 400, description = "Malformed or unknown cart identifiers", body = ErrorBody)
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RecordPaymentRequest>,
) -> Result<Json<RecordPaymentResponse>, AppError> {
    ensure_email(&payload.email)?;
    ensure_price(payload.price)?;

    let payment = NewPayment {
        cart_ids: parse_ids(&payload.cart_ids)?,
        menu_ids: parse_ids(&payload.menu_ids)?,
        email: payload.email,
        price: payload.price,
        transaction_id: payload.transaction_id,
        status: payload.status.unwrap_or_else(|| "pending".to_string()),
    };

    let result = state.repo.record_payment(payment).await?;
    tracing::info!(
        payment_id = ?result.payment_result.inserted_id,
        carts_cleared = result.delete_result.deleted_count,
        "payment recorded"
    );
    Ok(Json(result))
}

/// create_payment_intent
///
/// [Public Route] Opens a card payment with the provider and hands back the
/// client secret. Nothing is stored locally.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret", body = PaymentIntentResponse),
        (status = 400, description = "Invalid price", body = ErrorBody)
    )
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let amount = amount_in_cents(payload.price)?;
    let intent = state
        .payments
        .create_payment_intent(amount, &state.config.currency)
        .await?;
    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

// --- Users ---

/// list_users
///
/// [Admin Route] Every user.
#[utoipa::path(
    get,
    path = "/users",
    responses((status = 200, description = "Users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.repo.list_users().await?))
}

/// create_user
///
/// [Public Route] Registers a user on first sign-in. Repeating an email is a
/// no-op answered with `{ message: "User already exists", insertedId: null }`.
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses((status = 200, description = "Created or already present", body = InsertResult))
)]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> Result<Json<InsertResult>, AppError> {
    ensure_email(&payload.email)?;
    Ok(Json(state.repo.create_user(payload).await?))
}

/// get_admin_status
///
/// [Authenticated Route] Whether the caller is an admin. Only the caller's own
/// email may be asked about.
#[utoipa::path(
    get,
    path = "/users/admin/{user}",
    params(("user" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Admin flag", body = AdminStatus),
        (status = 403, description = "Not your email", body = ErrorBody)
    )
)]
pub async fn get_admin_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    ensure_same_email(&user, &email)?;
    let admin = state
        .repo
        .find_user_by_email(&email)
        .await?
        .is_some_and(|stored| stored.is_admin());
    Ok(Json(AdminStatus { admin }))
}

/// make_admin
///
/// [Admin Route] Promotes a user to the admin role.
#[utoipa::path(
    patch,
    path = "/users/admin/{user}",
    params(("user" = String, Path, description = "User ID")),
    responses((status = 200, description = "Promoted", body = UpdateResult))
)]
pub async fn make_admin(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateResult>, AppError> {
    let id = parse_id(&id)?;
    let result = state.repo.make_admin(id).await?;
    tracing::info!(by = %user.email, user_id = %id, matched = result.matched_count, "user promoted to admin");
    Ok(Json(result))
}

/// delete_user
///
/// [Admin Route] Removes a user.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses((status = 200, description = "Deleted", body = DeleteResult))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResult>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.repo.delete_user(id).await?))
}
