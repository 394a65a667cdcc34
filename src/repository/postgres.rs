use super::{RepoResult, Repository, distinct_count, unknown_cart_entries, user_exists};
use crate::models::{
    CartEntry, CategoryStats, CreateUserRequest, DeleteResult, InsertResult, MenuItem,
    MenuItemRequest, NewCartEntry, NewPayment, Payment, RecordPaymentResponse, Review,
    UpdateResult, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// PostgresRepository
///
/// The production `Repository`, one table per collection (see `migrations/`).
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Planner estimate of a table's row count. `reltuples` is -1 until the table
    /// has been vacuumed or analyzed, in which case we pay for an exact count.
    async fn estimated_count(&self, table: &'static str) -> RepoResult<i64> {
        let sql = format!(
            "SELECT CASE WHEN c.reltuples < 0 THEN (SELECT COUNT(*) FROM {table}) \
             ELSE c.reltuples::BIGINT END \
             FROM pg_class c WHERE c.oid = '{table}'::regclass"
        );
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- MENU ---

    async fn list_menu(&self) -> RepoResult<Vec<MenuItem>> {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT id, name, recipe, image, category, price FROM menu",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_menu_item(&self, id: Uuid) -> RepoResult<Option<MenuItem>> {
        let item = sqlx::query_as::<_, MenuItem>(
            "SELECT id, name, recipe, image, category, price FROM menu WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    async fn create_menu_item(&self, item: MenuItemRequest) -> RepoResult<InsertResult> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO menu (name, recipe, image, category, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(item.name)
        .bind(item.recipe)
        .bind(item.image)
        .bind(item.category)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(InsertResult::inserted(id))
    }

    async fn update_menu_item(&self, id: Uuid, item: MenuItemRequest) -> RepoResult<UpdateResult> {
        let result = sqlx::query(
            "UPDATE menu SET name = $2, price = $3, category = $4, recipe = $5, image = $6 \
             WHERE id = $1",
        )
        .bind(id)
        .bind(item.name)
        .bind(item.price)
        .bind(item.category)
        .bind(item.recipe)
        .bind(item.image)
        .execute(&self.pool)
        .await?;
        Ok(UpdateResult::affected(result.rows_affected()))
    }

    async fn delete_menu_item(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM menu WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::deleted(result.rows_affected()))
    }

    // --- REVIEWS ---

    async fn list_reviews(&self) -> RepoResult<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT id, name, details, rating, menu_id FROM reviews",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    // --- CARTS ---

    async fn create_cart_entry(&self, entry: NewCartEntry) -> RepoResult<InsertResult> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO carts (email, menu_id, name, image, price) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(entry.email)
        .bind(entry.menu_id)
        .bind(entry.name)
        .bind(entry.image)
        .bind(entry.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(InsertResult::inserted(id))
    }

    async fn list_cart_entries(&self, email: &str) -> RepoResult<Vec<CartEntry>> {
        let entries = sqlx::query_as::<_, CartEntry>(
            "SELECT id, email, menu_id, name, image, price FROM carts WHERE email = $1",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    async fn delete_cart_entry(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::deleted(result.rows_affected()))
    }

    // --- USERS ---

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, email, name, role FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// The unique index on `email` makes the existence check and the insert a
    /// single race-free statement.
    async fn create_user(&self, user: CreateUserRequest) -> RepoResult<InsertResult> {
        let id: Option<Uuid> = sqlx::query_scalar(
            "INSERT INTO users (email, name) VALUES ($1, $2) \
             ON CONFLICT (email) DO NOTHING RETURNING id",
        )
        .bind(user.email)
        .bind(user.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match id {
            Some(id) => InsertResult::inserted(id),
            None => user_exists(),
        })
    }

    async fn make_admin(&self, id: Uuid) -> RepoResult<UpdateResult> {
        let result = sqlx::query("UPDATE users SET role = 'admin' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(UpdateResult::affected(result.rows_affected()))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::deleted(result.rows_affected()))
    }

    // --- PAYMENTS ---

    async fn list_payments(&self, email: &str) -> RepoResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT id, email, price, transaction_id, date, cart_ids, menu_ids, status \
             FROM payments WHERE email = $1 ORDER BY date DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    async fn record_payment(&self, payment: NewPayment) -> RepoResult<RecordPaymentResponse> {
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO payments (email, price, transaction_id, cart_ids, menu_ids, status) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(&payment.email)
        .bind(payment.price)
        .bind(&payment.transaction_id)
        .bind(&payment.cart_ids)
        .bind(&payment.menu_ids)
        .bind(&payment.status)
        .fetch_one(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM carts WHERE id = ANY($1)")
            .bind(&payment.cart_ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Dropping the transaction rolls the payment insert back.
        if deleted != distinct_count(&payment.cart_ids) {
            return Err(unknown_cart_entries());
        }

        tx.commit().await?;

        Ok(RecordPaymentResponse {
            payment_result: InsertResult::inserted(id),
            delete_result: DeleteResult::deleted(deleted),
        })
    }

    // --- REPORTING ---

    async fn estimated_user_count(&self) -> RepoResult<i64> {
        self.estimated_count("users").await
    }

    async fn estimated_menu_item_count(&self) -> RepoResult<i64> {
        self.estimated_count("menu").await
    }

    async fn total_revenue(&self) -> RepoResult<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(price), 0)::DOUBLE PRECISION FROM payments",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    /// Prices come from the menu as it is now, not from the payment.
    async fn order_stats(&self) -> RepoResult<Vec<CategoryStats>> {
        let stats = sqlx::query_as::<_, CategoryStats>(
            r#"
            SELECT m.category      AS category,
                   COUNT(*)        AS quantity,
                   SUM(m.price)    AS total_revenue
            FROM payments p
            CROSS JOIN LATERAL UNNEST(p.menu_ids) AS line(menu_id)
            JOIN menu m ON m.id = line.menu_id
            GROUP BY m.category
            ORDER BY m.category COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }
}
