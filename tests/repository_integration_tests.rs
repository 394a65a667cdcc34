//! Runs the Postgres store against a live database. Each test works on its
//! own emails and categories so runs can share one database.

use restaurant_hunt::{
    AppError, PostgresRepository,
    models::{CreateUserRequest, MenuItemRequest, NewCartEntry, NewPayment},
    repository::{Repository, USER_EXISTS_MESSAGE},
};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn connect() -> PostgresRepository {
    dotenv::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    PostgresRepository::new(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

async fn seed_item(repo: &PostgresRepository, category: &str, price: f64) -> Uuid {
    repo.create_menu_item(MenuItemRequest {
        name: unique("dish"),
        recipe: String::new(),
        image: String::new(),
        category: category.to_string(),
        price,
    })
    .await
    .unwrap()
    .inserted_id
    .unwrap()
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_create_user_once_per_email() {
    let repo = connect().await;
    let email = format!("{}@example.com", unique("user"));
    let request = CreateUserRequest {
        email: email.clone(),
        name: Some("Dee".to_string()),
    };

    let first = repo.create_user(request.clone()).await.unwrap();
    let second = repo.create_user(request).await.unwrap();

    assert!(first.inserted_id.is_some());
    assert!(second.inserted_id.is_none());
    assert_eq!(second.message.as_deref(), Some(USER_EXISTS_MESSAGE));

    let stored = repo.find_user_by_email(&email).await.unwrap().unwrap();
    assert!(!stored.is_admin());

    let promoted = repo.make_admin(stored.id).await.unwrap();
    assert_eq!(promoted.matched_count, 1);
    assert!(repo.find_user_by_email(&email).await.unwrap().unwrap().is_admin());

    assert_eq!(repo.delete_user(stored.id).await.unwrap().deleted_count, 1);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_record_payment_deletes_only_listed_cart_entries() {
    let repo = connect().await;
    let email = format!("{}@example.com", unique("buyer"));
    let item = seed_item(&repo, &unique("cat"), 4.0).await;

    let mut carts = Vec::new();
    for _ in 0..3 {
        let id = repo
            .create_cart_entry(NewCartEntry {
                email: email.clone(),
                menu_id: item,
                name: "dish".to_string(),
                image: String::new(),
                price: 4.0,
            })
            .await
            .unwrap()
            .inserted_id
            .unwrap();
        carts.push(id);
    }

    let result = repo
        .record_payment(NewPayment {
            email: email.clone(),
            price: 8.0,
            transaction_id: Some(unique("pi")),
            cart_ids: carts[..2].to_vec(),
            menu_ids: vec![item, item],
            status: "pending".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(result.delete_result.deleted_count, 2);
    let remaining = repo.list_cart_entries(&email).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, carts[2]);

    let payments = repo.list_payments(&email).await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].cart_ids, carts[..2].to_vec());
    assert_eq!(payments[0].status, "pending");
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_order_stats_join_current_menu() {
    let repo = connect().await;
    let category = unique("cat");
    let first = seed_item(&repo, &category, 3.0).await;
    let second = seed_item(&repo, &category, 5.0).await;

    repo.record_payment(NewPayment {
        email: format!("{}@example.com", unique("buyer")),
        price: 11.0,
        transaction_id: None,
        cart_ids: vec![],
        menu_ids: vec![first, first, second, Uuid::new_v4()],
        status: "pending".to_string(),
    })
    .await
    .unwrap();

    let stats = repo.order_stats().await.unwrap();
    let row = stats
        .iter()
        .find(|row| row.category == category)
        .expect("category row");

    assert_eq!(row.quantity, 3);
    assert_eq!(row.total_revenue, 11.0);
    assert!(repo.total_revenue().await.unwrap() >= 11.0);
    assert!(repo.estimated_menu_item_count().await.unwrap() >= 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_menu_item_missing_after_delete() {
    let repo = connect().await;
    let id = seed_item(&repo, &unique("cat"), 2.5).await;

    assert_eq!(repo.get_menu_item(id).await.unwrap().unwrap().price, 2.5);
    assert_eq!(repo.delete_menu_item(id).await.unwrap().deleted_count, 1);
    assert!(repo.get_menu_item(id).await.unwrap().is_none());
    assert_eq!(repo.delete_menu_item(id).await.unwrap().deleted_count, 0);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_record_payment_with_unknown_cart_rolls_back() {
    let repo = connect().await;
    let email = format!("{}@example.com", unique("buyer"));
    let item = seed_item(&repo, &unique("cat"), 4.0).await;
    let real = repo
        .create_cart_entry(NewCartEntry {
            email: email.clone(),
            menu_id: item,
            name: "dish".to_string(),
            image: String::new(),
            price: 4.0,
        })
        .await
        .unwrap()
        .inserted_id
        .unwrap();

    let err = repo
        .record_payment(NewPayment {
            email: email.clone(),
            price: 8.0,
            transaction_id: None,
            cart_ids: vec![real, Uuid::new_v4()],
            menu_ids: vec![item],
            status: "pending".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(repo.list_payments(&email).await.unwrap().is_empty());
    assert_eq!(repo.list_cart_entries(&email).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "requires a running Postgres (DATABASE_URL)"]
async fn test_order_stats_sort_categories_bytewise() {
    let repo = connect().await;
    let suffix = Uuid::new_v4().simple().to_string();
    let lower = format!("zz-{suffix}");
    let upper = format!("ZZ-{suffix}");
    let lower_item = seed_item(&repo, &lower, 1.0).await;
    let upper_item = seed_item(&repo, &upper, 1.0).await;

    repo.record_payment(NewPayment {
        email: format!("{}@example.com", unique("buyer")),
        price: 2.0,
        transaction_id: None,
        cart_ids: vec![],
        menu_ids: vec![lower_item, upper_item],
        status: "pending".to_string(),
    })
    .await
    .unwrap();

    let stats = repo.order_stats().await.unwrap();
    let position = |category: &str| stats.iter().position(|row| row.category == category);

    assert!(position(&upper).unwrap() < position(&lower).unwrap());
}
