use crate::{
    error::AppError,
    models::{
        CartEntry, CategoryStats, CreateUserRequest, DeleteResult, InsertResult, MenuItem,
        MenuItemRequest, NewCartEntry, NewPayment, Payment, RecordPaymentResponse, Review,
        UpdateResult, User,
    },
};
use async_trait::async_trait;
use std::{collections::HashSet, sync::Arc};
use uuid::Uuid;

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Result of every store operation. Failures are infrastructure failures.
pub type RepoResult<T> = Result<T, AppError>;

/// Repository Trait
///
/// The persistence contract for every resource collection: menu, reviews,
/// carts, users and payments, plus the read-only aggregations the reporting
/// endpoints need. Handlers and gates only ever see `Arc<dyn Repository>`, so
/// the Postgres store and the in-memory store are interchangeable.
///
/// Lookups return `Ok(None)` for a missing document; mapping that to a 404 is the
/// caller's decision.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Menu ---
    async fn list_menu(&self) -> RepoResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: Uuid) -> RepoResult<Option<MenuItem>>;
    async fn create_menu_item(&self, item: MenuItemRequest) -> RepoResult<InsertResult>;
    // Overwrites name, price, category, recipe and image.
    async fn update_menu_item(&self, id: Uuid, item: MenuItemRequest) -> RepoResult<UpdateResult>;
    async fn delete_menu_item(&self, id: Uuid) -> RepoResult<DeleteResult>;

    // --- Reviews ---
    async fn list_reviews(&self) -> RepoResult<Vec<Review>>;

    // --- Carts ---
    async fn create_cart_entry(&self, entry: NewCartEntry) -> RepoResult<InsertResult>;
    async fn list_cart_entries(&self, email: &str) -> RepoResult<Vec<CartEntry>>;
    // No ownership check: any caller may delete any entry by id.
    async fn delete_cart_entry(&self, id: Uuid) -> RepoResult<DeleteResult>;

    // --- Users ---
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    /// Idempotent by email: an existing email yields
    /// `{ message: "User already exists", insertedId: null }`.
    async fn create_user(&self, user: CreateUserRequest) -> RepoResult<InsertResult>;
    async fn make_admin(&self, id: Uuid) -> RepoResult<UpdateResult>;
    async fn delete_user(&self, id: Uuid) -> RepoResult<DeleteResult>;

    // --- Payments ---
    async fn list_payments(&self, email: &str) -> RepoResult<Vec<Payment>>;
    /// Inserts the payment and deletes every cart entry named in `cart_ids`.
    /// Both writes commit together or not at all. If any named cart entry does
    /// not exist, nothing is written and the call fails with `BadRequest`.
    async fn record_payment(&self, payment: NewPayment) -> RepoResult<RecordPaymentResponse>;

    // --- Reporting ---
    async fn estimated_user_count(&self) -> RepoResult<i64>;
    async fn estimated_menu_item_count(&self) -> RepoResult<i64>;
    /// Sum of `price` over all payments, 0 when there are none.
    async fn total_revenue(&self) -> RepoResult<f64>;
    /// Unwinds each payment's menu ids, joins them to the current menu and groups
    /// by category. Ids with no matching menu item are dropped.
    async fn order_stats(&self) -> RepoResult<Vec<CategoryStats>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Number of distinct ids in `ids`; repeats name the same cart entry.
pub(crate) fn distinct_count(ids: &[Uuid]) -> u64 {
    ids.iter().collect::<HashSet<_>>().len() as u64
}

pub(crate) fn unknown_cart_entries() -> AppError {
    AppError::BadRequest("payment references cart entries that do not exist".to_string())
}

/// Message returned when a user registers with an email already on file.
pub const USER_EXISTS_MESSAGE: &str = "User already exists";

pub(crate) fn user_exists() -> InsertResult {
    InsertResult {
        message: Some(USER_EXISTS_MESSAGE.to_string()),
        acknowledged: true,
        inserted_id: None,
    }
}
