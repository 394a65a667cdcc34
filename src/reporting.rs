//! Read-only reports for the admin dashboard and the order breakdown.
//!
//! Both are recomputed from the stores on every call.

use crate::{
    models::{AdminStats, CategoryStats, MenuItem, Payment},
    repository::{RepoResult, Repository},
};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// User and menu counts (estimates) plus revenue over every payment.
pub async fn admin_summary(repo: &dyn Repository) -> RepoResult<AdminStats> {
    let user_count = repo.estimated_user_count().await?;
    let menu_item_count = repo.estimated_menu_item_count().await?;
    let total_revenue = repo.total_revenue().await?;

    Ok(AdminStats {
        user_count,
        menu_item_count,
        total_revenue,
    })
}

/// Per-category quantity and revenue of purchased line items.
pub async fn order_stats(repo: &dyn Repository) -> RepoResult<Vec<CategoryStats>> {
    repo.order_stats().await
}

/// The order-stats pipeline over in-memory documents:
/// unwind `menu_ids`, join each id against `menu`, drop misses, group by category.
///
/// `quantity` counts line items, so the same item bought twice counts twice.
/// Revenue uses the menu's current price. Output is sorted by category.
pub fn category_breakdown(payments: &[Payment], menu: &[MenuItem]) -> Vec<CategoryStats> {
    let by_id: HashMap<Uuid, &MenuItem> = menu.iter().map(|item| (item.id, item)).collect();
    let mut groups: BTreeMap<&str, (i64, f64)> = BTreeMap::new();

    for item in payments
        .iter()
        .flat_map(|payment| payment.menu_ids.iter())
        .filter_map(|id| by_id.get(id))
    {
        let entry = groups.entry(item.category.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += item.price;
    }

    groups
        .into_iter()
        .map(|(category, (quantity, total_revenue))| CategoryStats {
            category: category.to_string(),
            quantity,
            total_revenue,
        })
        .collect()
}
