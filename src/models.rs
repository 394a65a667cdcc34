use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Stored Documents (Mapped to Database) ---
//
// JSON shapes keep the document-store conventions the web client speaks:
// camelCase keys and the identifier exposed as `_id`.

/// User
///
/// An account keyed by email. `role` is either `"admin"` or absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// The only role value with meaning.
pub const ADMIN_ROLE: &str = "admin";

/// MenuItem
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub recipe: String,
    pub image: String,
    pub category: String,
    pub price: f64,
}

/// Review
///
/// Read-only: reviews are seeded out of band.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    // Reviewer display name.
    pub name: String,
    pub details: String,
    pub rating: f64,
    pub menu_id: Option<Uuid>,
}

/// CartEntry
///
/// One menu item in a customer's cart. `email` identifies the owner.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartEntry {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub menu_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: f64,
}

/// Payment
///
/// Immutable record of one checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub email: String,
    pub price: f64,
    pub transaction_id: Option<String>,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
    pub cart_ids: Vec<Uuid>,
    pub menu_ids: Vec<Uuid>,
    pub status: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreateUserRequest
///
/// Sign-in registration. Creating an email that already exists is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: Option<String>,
}

/// MenuItemRequest
///
/// Full menu item body for both create (POST /menu) and update (PATCH /menu/{id}).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItemRequest {
    pub name: String,
    pub recipe: String,
    pub image: String,
    pub category: String,
    pub price: f64,
}

/// CreateCartEntryRequest
///
/// `menuId` arrives as a string and is validated before it reaches the store.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateCartEntryRequest {
    pub email: String,
    pub menu_id: String,
    pub name: String,
    pub image: String,
    pub price: f64,
}

/// NewCartEntry
///
/// Validated cart entry handed to the repository.
#[derive(Debug, Clone)]
pub struct NewCartEntry {
    pub email: String,
    pub menu_id: Uuid,
    pub name: String,
    pub image: String,
    pub price: f64,
}

/// RecordPaymentRequest
///
/// Checkout body (POST /payments). Identifier lists arrive as strings.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecordPaymentRequest {
    pub email: String,
    pub price: f64,
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub cart_ids: Vec<String>,
    #[serde(default, alias = "menuItemIds")]
    pub menu_ids: Vec<String>,
    pub status: Option<String>,
}

/// NewPayment
///
/// Validated payment handed to the repository.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub email: String,
    pub price: f64,
    pub transaction_id: Option<String>,
    pub cart_ids: Vec<Uuid>,
    pub menu_ids: Vec<Uuid>,
    pub status: String,
}

/// PaymentIntentRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

/// CartFilter
///
/// Query parameters for GET /carts.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CartFilter {
    pub email: Option<String>,
}

// --- Write Summaries ---
//
// Mirror the document store's acknowledgement shapes so clients can detect
// no-op and partial writes.

/// InsertResult
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InsertResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
    pub inserted_id: Option<Uuid>,
}

impl InsertResult {
    pub fn inserted(id: Uuid) -> Self {
        Self {
            message: None,
            acknowledged: true,
            inserted_id: Some(id),
        }
    }
}

/// UpdateResult
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateResult {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub matched_count: u64,
    #[ts(type = "number")]
    pub modified_count: u64,
}

impl UpdateResult {
    pub fn affected(rows: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count: rows,
            modified_count: rows,
        }
    }
}

/// DeleteResult
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteResult {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub deleted_count: u64,
}

impl DeleteResult {
    pub fn deleted(rows: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count: rows,
        }
    }
}

// --- Response Schemas (Output) ---

/// RecordPaymentResponse
///
/// Both write summaries of a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RecordPaymentResponse {
    pub payment_result: InsertResult,
    pub delete_result: DeleteResult,
}

/// PaymentIntentResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// TokenResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// AdminStatus
///
/// Answer of GET /users/admin/{email}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminStatus {
    pub admin: bool,
}

/// AdminStats
///
/// Dashboard summary (GET /admin-stats). Counts are estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminStats {
    #[ts(type = "number")]
    pub user_count: i64,
    #[ts(type = "number")]
    pub menu_item_count: i64,
    pub total_revenue: f64,
}

/// CategoryStats
///
/// One row of GET /order-stats. `total_revenue` uses current menu prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryStats {
    pub category: String,
    #[ts(type = "number")]
    pub quantity: i64,
    pub total_revenue: f64,
}
