use super::{RepoResult, Repository, distinct_count, unknown_cart_entries, user_exists};
use crate::{
    models::{
        CartEntry, CategoryStats, CreateUserRequest, DeleteResult, InsertResult, MenuItem,
        MenuItemRequest, NewCartEntry, NewPayment, Payment, RecordPaymentResponse, Review,
        UpdateResult, User, ADMIN_ROLE,
    },
    reporting,
};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Collections {
    menu: Vec<MenuItem>,
    reviews: Vec<Review>,
    carts: Vec<CartEntry>,
    users: Vec<User>,
    payments: Vec<Payment>,
}

/// InMemoryRepository
///
/// A complete `Repository` kept in process memory. Used by the test suite and
/// for running the API without a database. Collections keep insertion order.
///
/// A single lock guards all collections, so `record_payment` is atomic here too.
#[derive(Default)]
pub struct InMemoryRepository {
    data: RwLock<Collections>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reviews have no write endpoint; tests and demos seed them directly.
    pub async fn insert_review(&self, review: Review) {
        self.data.write().await.reviews.push(review);
    }
}

/// Retains everything except `doomed`, returning how many were removed.
fn remove_where<T>(items: &mut Vec<T>, doomed: impl Fn(&T) -> bool) -> u64 {
    let before = items.len();
    items.retain(|item| !doomed(item));
    (before - items.len()) as u64
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn list_menu(&self) -> RepoResult<Vec<MenuItem>> {
        Ok(self.data.read().await.menu.clone())
    }

    async fn get_menu_item(&self, id: Uuid) -> RepoResult<Option<MenuItem>> {
        let data = self.data.read().await;
        Ok(data.menu.iter().find(|m| m.id == id).cloned())
    }

    async fn create_menu_item(&self, item: MenuItemRequest) -> RepoResult<InsertResult> {
        let id = Uuid::new_v4();
        self.data.write().await.menu.push(MenuItem {
            id,
            name: item.name,
            recipe: item.recipe,
            image: item.image,
            category: item.category,
            price: item.price,
        });
        Ok(InsertResult::inserted(id))
    }

    async fn update_menu_item(&self, id: Uuid, item: MenuItemRequest) -> RepoResult<UpdateResult> {
        let mut data = self.data.write().await;
        let Some(existing) = data.menu.iter_mut().find(|m| m.id == id) else {
            return Ok(UpdateResult::affected(0));
        };
        existing.name = item.name;
        existing.price = item.price;
        existing.category = item.category;
        existing.recipe = item.recipe;
        existing.image = item.image;
        Ok(UpdateResult::affected(1))
    }

    async fn delete_menu_item(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let mut data = self.data.write().await;
        Ok(DeleteResult::deleted(remove_where(&mut data.menu, |m| m.id == id)))
    }

    async fn list_reviews(&self) -> RepoResult<Vec<Review>> {
        Ok(self.data.read().await.reviews.clone())
    }

    async fn create_cart_entry(&self, entry: NewCartEntry) -> RepoResult<InsertResult> {
        let id = Uuid::new_v4();
        self.data.write().await.carts.push(CartEntry {
            id,
            email: entry.email,
            menu_id: entry.menu_id,
            name: entry.name,
            image: entry.image,
            price: entry.price,
        });
        Ok(InsertResult::inserted(id))
    }

    async fn list_cart_entries(&self, email: &str) -> RepoResult<Vec<CartEntry>> {
        let data = self.data.read().await;
        Ok(data.carts.iter().filter(|c| c.email == email).cloned().collect())
    }

    async fn delete_cart_entry(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let mut data = self.data.write().await;
        Ok(DeleteResult::deleted(remove_where(&mut data.carts, |c| c.id == id)))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.data.read().await.users.clone())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: CreateUserRequest) -> RepoResult<InsertResult> {
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Ok(user_exists());
        }
        let id = Uuid::new_v4();
        data.users.push(User {
            id,
            email: user.email,
            name: user.name,
            role: None,
        });
        Ok(InsertResult::inserted(id))
    }

    async fn make_admin(&self, id: Uuid) -> RepoResult<UpdateResult> {
        let mut data = self.data.write().await;
        let Some(user) = data.users.iter_mut().find(|u| u.id == id) else {
            return Ok(UpdateResult::affected(0));
        };
        user.role = Some(ADMIN_ROLE.to_string());
        Ok(UpdateResult::affected(1))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let mut data = self.data.write().await;
        Ok(DeleteResult::deleted(remove_where(&mut data.users, |u| u.id == id)))
    }

    async fn list_payments(&self, email: &str) -> RepoResult<Vec<Payment>> {
        let data = self.data.read().await;
        Ok(data.payments.iter().filter(|p| p.email == email).cloned().collect())
    }

    async fn record_payment(&self, payment: NewPayment) -> RepoResult<RecordPaymentResponse> {
        let mut data = self.data.write().await;

        let present = data
            .carts
            .iter()
            .filter(|c| payment.cart_ids.contains(&c.id))
            .count() as u64;
        if present != distinct_count(&payment.cart_ids) {
            return Err(unknown_cart_entries());
        }

        let id = Uuid::new_v4();
        let deleted = remove_where(&mut data.carts, |c| payment.cart_ids.contains(&c.id));
        data.payments.push(Payment {
            id,
            email: payment.email,
            price: payment.price,
            transaction_id: payment.transaction_id,
            date: Utc::now(),
            cart_ids: payment.cart_ids,
            menu_ids: payment.menu_ids,
            status: payment.status,
        });

        Ok(RecordPaymentResponse {
            payment_result: InsertResult::inserted(id),
            delete_result: DeleteResult::deleted(deleted),
        })
    }

    async fn estimated_user_count(&self) -> RepoResult<i64> {
        Ok(self.data.read().await.users.len() as i64)
    }

    async fn estimated_menu_item_count(&self) -> RepoResult<i64> {
        Ok(self.data.read().await.menu.len() as i64)
    }

    async fn total_revenue(&self) -> RepoResult<f64> {
        Ok(self.data.read().await.payments.iter().map(|p| p.price).sum())
    }

    async fn order_stats(&self) -> RepoResult<Vec<CategoryStats>> {
        let data = self.data.read().await;
        Ok(reporting::category_breakdown(&data.payments, &data.menu))
    }
}
