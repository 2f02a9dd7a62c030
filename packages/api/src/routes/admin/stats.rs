//! The dashboard-stats report: month-over-month movement, six-month trends,
//! inventory and demographic splits, and the latest transactions.

use axum::{Json, extract::State};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{self, GrowthRate, MonthRange, fill_series},
    cache::{cached, keys},
    entity::{order, product, sea_orm_active_enums::OrderStatus, user},
    error::ApiError,
    state::AppState,
};

use super::{GenderCount, OrderCountPoint, RevenuePoint};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMonth {
    pub total_value: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMonth {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderMonth {
    pub count: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSnapshot {
    pub new_products: ProductMonth,
    pub new_users: UserMonth,
    pub orders: OrderMonth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub name: String,
    pub product_percentage: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub total_price: f64,
    pub discount: f64,
    pub status: OrderStatus,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeStats {
    pub total_users: i64,
    pub total_products: i64,
    pub total_revenue: f64,
    pub total_orders: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Periods {
    pub current_month: String,
    pub previous_month: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthFigures {
    pub products: GrowthRate,
    pub users: GrowthRate,
    pub orders: GrowthRate,
    pub revenue: GrowthRate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRatios {
    pub products: f64,
    pub users: f64,
    pub orders: f64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub current_month: MonthSnapshot,
    pub previous_month: MonthSnapshot,
    pub six_month_revenue_trend: Vec<RevenuePoint>,
    pub six_month_order_trend: Vec<OrderCountPoint>,
    pub inventory: Vec<CategoryShare>,
    pub gender: Vec<GenderCount>,
    pub first_five_transactions: Vec<Transaction>,
    pub lifetime_stats: LifetimeStats,
    pub periods: Periods,
    pub growth_percentage: GrowthFigures,
    pub growth_rate: GrowthRatios,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

fn in_range<'a, T>(
    docs: &'a [T],
    range: &'a MonthRange,
    timestamp: impl Fn(&T) -> chrono::NaiveDateTime + 'a,
) -> impl Iterator<Item = &'a T> {
    docs.iter().filter(move |doc| {
        let at = timestamp(doc);
        at >= range.start && at <= range.end
    })
}

fn snapshot(
    range: &MonthRange,
    products: &[product::Model],
    users: &[user::Model],
    orders: &[order::Model],
) -> MonthSnapshot {
    let month_products: Vec<&product::Model> =
        in_range(products, range, |p| p.created_at).collect();
    let month_orders: Vec<&order::Model> = in_range(orders, range, |o| o.created_at).collect();

    MonthSnapshot {
        new_products: ProductMonth {
            total_value: month_products.iter().map(|p| p.price).sum(),
            count: month_products.len() as i64,
        },
        new_users: UserMonth {
            count: in_range(users, range, |u| u.created_at).count() as i64,
        },
        orders: OrderMonth {
            count: month_orders.len() as i64,
            revenue: month_orders.iter().map(|o| o.total_price).sum(),
        },
    }
}

fn gender_counts(users: &[user::Model]) -> Vec<GenderCount> {
    use crate::entity::sea_orm_active_enums::Gender;

    [Gender::Male, Gender::Female]
        .into_iter()
        .map(|gender| GenderCount {
            gender: match gender {
                Gender::Male => "male".to_string(),
                Gender::Female => "female".to_string(),
            },
            count: users.iter().filter(|u| u.gender == gender).count() as i64,
        })
        .collect()
}

fn build_stats(
    now: chrono::NaiveDateTime,
    products: Vec<product::Model>,
    users: Vec<user::Model>,
    orders: Vec<order::Model>,
) -> DashboardStats {
    let ranges = analytics::month_ranges(now, 6);

    let current = snapshot(&ranges[0], &products, &users, &orders);
    let previous = snapshot(&ranges[1], &products, &users, &orders);

    let revenue_series = fill_series(&ranges, &orders, |o| o.created_at, |o| o.total_price);
    let order_series = fill_series(&ranges, &orders, |o| o.created_at, |_| 1.0);

    let six_month_revenue_trend = ranges
        .iter()
        .zip(&revenue_series)
        .map(|(range, revenue)| RevenuePoint {
            month: range.month_name.to_string(),
            year: range.year,
            revenue: *revenue,
        })
        .collect();
    let six_month_order_trend = ranges
        .iter()
        .zip(&order_series)
        .map(|(range, count)| OrderCountPoint {
            month: range.month_name.to_string(),
            year: range.year,
            order_count: *count as i64,
        })
        .collect();

    let total_products = products.len() as i64;
    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    let inventory = categories
        .into_iter()
        .map(|name| {
            let count = products.iter().filter(|p| p.category == name).count() as i64;
            CategoryShare {
                name,
                product_percentage: if total_products == 0 {
                    0
                } else {
                    ((count as f64 / total_products as f64) * 100.0).round() as i64
                },
            }
        })
        .collect();

    let mut newest: Vec<&order::Model> = orders.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let mut first_five_transactions: Vec<Transaction> = newest
        .into_iter()
        .take(5)
        .map(|o| Transaction {
            id: o.id.clone(),
            total_price: o.total_price.round(),
            discount: o.discount.round(),
            status: o.status,
            quantity: o.order_items.0.iter().map(|i| i64::from(i.quantity)).sum(),
        })
        .collect();
    first_five_transactions.sort_by(|a, b| {
        b.total_price
            .partial_cmp(&a.total_price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let growth_percentage = GrowthFigures {
        products: analytics::growth_rate(
            current.new_products.count as f64,
            previous.new_products.count as f64,
            "products",
        ),
        users: analytics::growth_rate(
            current.new_users.count as f64,
            previous.new_users.count as f64,
            "users",
        ),
        orders: analytics::growth_rate(
            current.orders.count as f64,
            previous.orders.count as f64,
            "orders",
        ),
        revenue: analytics::growth_rate(current.orders.revenue, previous.orders.revenue, "revenue"),
    };
    let growth_rate = GrowthRatios {
        products: analytics::percentage_of(
            current.new_products.count as f64,
            previous.new_products.count as f64,
        ),
        users: analytics::percentage_of(
            current.new_users.count as f64,
            previous.new_users.count as f64,
        ),
        orders: analytics::percentage_of(
            current.orders.count as f64,
            previous.orders.count as f64,
        ),
        revenue: analytics::percentage_of(current.orders.revenue, previous.orders.revenue),
    };

    DashboardStats {
        lifetime_stats: LifetimeStats {
            total_users: users.len() as i64,
            total_products,
            total_revenue: orders.iter().map(|o| o.total_price).sum(),
            total_orders: orders.len() as i64,
        },
        gender: gender_counts(&users),
        periods: Periods {
            current_month: ranges[0].month_name.to_string(),
            previous_month: ranges[1].month_name.to_string(),
        },
        current_month: current,
        previous_month: previous,
        six_month_revenue_trend,
        six_month_order_trend,
        inventory,
        first_five_transactions,
        growth_percentage,
        growth_rate,
    }
}

/// GET /admin/stats - cached with an explicit TTL
#[tracing::instrument(name = "GET /admin/stats", skip(state))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let ttl = state.settings.admin_stats_ttl;
    let stats: DashboardStats = cached(&state.cache, keys::ADMIN_STATS, Some(ttl), || async {
        let products = product::Entity::find().all(&state.db).await?;
        let users = user::Entity::find().all(&state.db).await?;
        let orders = order::Entity::find().all(&state.db).await?;
        Ok(build_stats(analytics::now_naive(), products, users, orders))
    })
    .await?;

    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::order::{OrderItem, OrderItems, ShippingAddress};
    use crate::entity::product::ProductImages;
    use crate::entity::sea_orm_active_enums::{Gender, UserRole};
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn product(category: &str, price: f64, created_at: chrono::NaiveDateTime) -> product::Model {
        product::Model {
            id: storefront_types::create_id(),
            name: "Item".into(),
            price,
            description: "".into(),
            images: ProductImages::default(),
            stock: 1,
            category: category.into(),
            ratings: 0.0,
            num_of_reviews: 0,
            created_at,
            updated_at: created_at,
        }
    }

    fn a_user(gender: Gender, created_at: chrono::NaiveDateTime) -> user::Model {
        user::Model {
            id: storefront_types::create_id(),
            username: "shopper".into(),
            email: format!("{}@example.com", storefront_types::create_id()),
            photo: "p".into(),
            gender,
            dob: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            role: UserRole::User,
            is_active: true,
            last_login: None,
            created_at,
            updated_at: created_at,
        }
    }

    fn an_order(total: f64, quantity: i32, created_at: chrono::NaiveDateTime) -> order::Model {
        order::Model {
            id: storefront_types::create_id(),
            user_id: "u1".into(),
            order_items: OrderItems(vec![OrderItem {
                product: "p1".into(),
                name: "Item".into(),
                price: total,
                image: "i".into(),
                quantity,
            }]),
            shipping_address: ShippingAddress {
                address: "a".into(),
                city: "c".into(),
                state: "s".into(),
                country: "in".into(),
                pin_code: "1".into(),
            },
            sub_total: total,
            shipping_price: 0.0,
            tax_price: 0.0,
            discount: 0.0,
            total_price: total,
            delivery: false,
            status: OrderStatus::Pending,
            is_delivered: false,
            delivered_at: None,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn month_snapshots_split_current_and_previous() {
        let now = at(2026, 2, 14);
        let stats = build_stats(
            now,
            vec![product("pens", 10.0, at(2026, 2, 2)), product("pens", 20.0, at(2026, 1, 5))],
            vec![a_user(Gender::Male, at(2026, 2, 1))],
            vec![an_order(100.0, 1, at(2026, 2, 3)), an_order(40.0, 1, at(2026, 1, 20))],
        );

        assert_eq!(stats.current_month.new_products.count, 1);
        assert_eq!(stats.current_month.new_products.total_value, 10.0);
        assert_eq!(stats.previous_month.new_products.count, 1);
        assert_eq!(stats.current_month.orders.revenue, 100.0);
        assert_eq!(stats.previous_month.orders.revenue, 40.0);
        assert_eq!(stats.current_month.new_users.count, 1);
        assert_eq!(stats.previous_month.new_users.count, 0);
    }

    #[test]
    fn trends_are_six_buckets_with_zero_fill() {
        let now = at(2026, 2, 14);
        let stats = build_stats(now, vec![], vec![], vec![an_order(50.0, 1, at(2025, 12, 25))]);

        assert_eq!(stats.six_month_revenue_trend.len(), 6);
        assert_eq!(stats.six_month_revenue_trend[0].revenue, 0.0);
        assert_eq!(stats.six_month_revenue_trend[2].month, "December");
        assert_eq!(stats.six_month_revenue_trend[2].revenue, 50.0);
        assert_eq!(stats.six_month_order_trend[2].order_count, 1);
    }

    #[test]
    fn inventory_shares_sum_over_categories() {
        let now = at(2026, 2, 14);
        let stats = build_stats(
            now,
            vec![
                product("pens", 1.0, at(2026, 2, 1)),
                product("pens", 1.0, at(2026, 2, 1)),
                product("paper", 1.0, at(2026, 2, 1)),
                product("ink", 1.0, at(2026, 2, 1)),
            ],
            vec![],
            vec![],
        );

        let pens = stats.inventory.iter().find(|c| c.name == "pens").unwrap();
        assert_eq!(pens.product_percentage, 50);
        assert_eq!(stats.inventory.len(), 3);
    }

    #[test]
    fn latest_transactions_are_capped_and_sorted_by_total() {
        let now = at(2026, 2, 14);
        let orders: Vec<order::Model> = (1..=7)
            .map(|i| an_order(f64::from(i) * 10.0, i, at(2026, 2, i as u32)))
            .collect();
        let stats = build_stats(now, vec![], vec![], orders);

        assert_eq!(stats.first_five_transactions.len(), 5);
        // The five newest (totals 30..=70), richest first
        assert_eq!(stats.first_five_transactions[0].total_price, 70.0);
        assert_eq!(stats.first_five_transactions[4].total_price, 30.0);
    }

    #[test]
    fn growth_handles_an_empty_previous_month() {
        let now = at(2026, 2, 14);
        let stats = build_stats(now, vec![], vec![], vec![an_order(75.0, 1, at(2026, 2, 5))]);

        assert_eq!(stats.growth_percentage.orders.rate, 100.0);
        assert_eq!(stats.growth_percentage.revenue.change, 75.0);
        assert_eq!(stats.growth_rate.orders, 100.0);
    }
}
