//! The bar, pie and line chart reports.

use axum::{Json, extract::State};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};

use crate::{
    analytics::{self, MonthRange, fill_series},
    cache::{cached, keys},
    entity::{
        order, product,
        sea_orm_active_enums::{Gender, OrderStatus, UserRole},
        user,
    },
    error::ApiError,
    state::AppState,
};

use super::{DiscountPoint, GenderCount, OrderCountPoint, ProductCountPoint, RevenuePoint, UserCountPoint};

fn revenue_points(ranges: &[MonthRange], orders: &[order::Model]) -> Vec<RevenuePoint> {
    let series = fill_series(ranges, orders, |o| o.created_at, |o| o.total_price);
    ranges
        .iter()
        .zip(series)
        .map(|(range, revenue)| RevenuePoint {
            month: range.month_name.to_string(),
            year: range.year,
            revenue,
        })
        .collect()
}

fn order_count_points(ranges: &[MonthRange], orders: &[order::Model]) -> Vec<OrderCountPoint> {
    let series = fill_series(ranges, orders, |o| o.created_at, |_| 1.0);
    ranges
        .iter()
        .zip(series)
        .map(|(range, count)| OrderCountPoint {
            month: range.month_name.to_string(),
            year: range.year,
            order_count: count as i64,
        })
        .collect()
}

fn product_count_points(
    ranges: &[MonthRange],
    products: &[product::Model],
) -> Vec<ProductCountPoint> {
    let series = fill_series(ranges, products, |p| p.created_at, |_| 1.0);
    ranges
        .iter()
        .zip(series)
        .map(|(range, count)| ProductCountPoint {
            month: range.month_name.to_string(),
            year: range.year,
            product_count: count as i64,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BarChart {
    pub six_month_orders: Vec<RevenuePoint>,
    pub six_month_products: Vec<ProductCountPoint>,
    pub six_month_users: Vec<UserCountPoint>,
    pub twelve_month_orders: Vec<OrderCountPoint>,
}

#[derive(Debug, Serialize)]
pub struct BarChartResponse {
    pub success: bool,
    pub chart: BarChart,
}

/// GET /admin/bar
#[tracing::instrument(name = "GET /admin/bar", skip(state))]
pub async fn bar_chart(State(state): State<AppState>) -> Result<Json<BarChartResponse>, ApiError> {
    let chart: BarChart = cached(&state.cache, keys::ADMIN_BAR_CHART, None, || async {
        let orders = order::Entity::find().all(&state.db).await?;
        let products = product::Entity::find().all(&state.db).await?;
        let users = user::Entity::find().all(&state.db).await?;

        let now = analytics::now_naive();
        let six = analytics::month_ranges(now, 6);
        let twelve = analytics::month_ranges(now, 12);

        let user_series = fill_series(&six, &users, |u| u.created_at, |_| 1.0);
        let six_month_users = six
            .iter()
            .zip(user_series)
            .map(|(range, count)| UserCountPoint {
                month: range.month_name.to_string(),
                year: range.year,
                user_count: count as i64,
            })
            .collect();

        Ok(BarChart {
            six_month_orders: revenue_points(&six, &orders),
            six_month_products: product_count_points(&six, &products),
            six_month_users,
            twelve_month_orders: order_count_points(&twelve, &orders),
        })
    })
    .await?;

    Ok(Json(BarChartResponse {
        success: true,
        chart,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAvailability {
    pub in_stock: i64,
    pub out_of_stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueDistribution {
    pub gross_income: f64,
    pub total_discount: f64,
    pub total_shipping: f64,
    pub total_tax: f64,
    pub marketing_cost: f64,
    pub net_income: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeDistribution {
    #[serde(rename = "18-24")]
    pub from_18_to_24: i64,
    #[serde(rename = "25-34")]
    pub from_25_to_34: i64,
    #[serde(rename = "35-44")]
    pub from_35_to_44: i64,
    #[serde(rename = "45-54")]
    pub from_45_to_54: i64,
    #[serde(rename = "55-64")]
    pub from_55_to_64: i64,
    #[serde(rename = "65+")]
    pub over_65: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieChart {
    pub users: Vec<GenderCount>,
    pub stock_availability: StockAvailability,
    pub status: Vec<StatusCount>,
    pub categories: Vec<String>,
    pub revenue_distribution: RevenueDistribution,
    pub admin_count: i64,
    pub user_count: i64,
    pub age_distribution: AgeDistribution,
}

#[derive(Debug, Serialize)]
pub struct PieChartResponse {
    pub success: bool,
    pub chart: PieChart,
}

const MARKETING_COST_PERCENT: f64 = 30.0;

fn age_distribution(users: &[user::Model], today: chrono::NaiveDate) -> AgeDistribution {
    let ages: Vec<i32> = users.iter().map(|u| u.age_at(today)).collect();
    let bucket = |lo: i32, hi: i32| ages.iter().filter(|a| **a >= lo && **a < hi).count() as i64;

    AgeDistribution {
        from_18_to_24: bucket(18, 25),
        from_25_to_34: bucket(25, 35),
        from_35_to_44: bucket(35, 45),
        from_45_to_54: bucket(45, 55),
        from_55_to_64: bucket(55, 65),
        over_65: ages.iter().filter(|a| **a >= 65).count() as i64,
    }
}

fn build_pie_chart(
    products: &[product::Model],
    users: &[user::Model],
    orders: &[order::Model],
    today: chrono::NaiveDate,
) -> PieChart {
    let gross_income: f64 = orders.iter().map(|o| o.total_price).sum::<f64>().round();
    let total_discount: f64 = orders.iter().map(|o| o.discount).sum::<f64>().round();
    let total_shipping: f64 = orders.iter().map(|o| o.shipping_price).sum::<f64>().round();
    let total_tax: f64 = orders.iter().map(|o| o.tax_price).sum::<f64>().round();
    let marketing_cost = (gross_income * (MARKETING_COST_PERCENT / 100.0)).round();
    let net_income = gross_income - total_discount - total_shipping - total_tax;

    let out_of_stock = products.iter().filter(|p| p.stock == 0).count() as i64;

    let status = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ]
    .into_iter()
    .map(|status| StatusCount {
        status,
        count: orders.iter().filter(|o| o.status == status).count() as i64,
    })
    .collect();

    let mut categories: Vec<String> = products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();

    let users_by_gender = [Gender::Male, Gender::Female]
        .into_iter()
        .map(|gender| GenderCount {
            gender: match gender {
                Gender::Male => "male".to_string(),
                Gender::Female => "female".to_string(),
            },
            count: users.iter().filter(|u| u.gender == gender).count() as i64,
        })
        .collect();

    PieChart {
        users: users_by_gender,
        stock_availability: StockAvailability {
            in_stock: products.len() as i64 - out_of_stock,
            out_of_stock,
        },
        status,
        categories,
        revenue_distribution: RevenueDistribution {
            gross_income,
            total_discount,
            total_shipping,
            total_tax,
            marketing_cost,
            net_income,
        },
        admin_count: users.iter().filter(|u| u.role == UserRole::Admin).count() as i64,
        user_count: users.iter().filter(|u| u.role == UserRole::User).count() as i64,
        age_distribution: age_distribution(users, today),
    }
}

/// GET /admin/pie
#[tracing::instrument(name = "GET /admin/pie", skip(state))]
pub async fn pie_chart(State(state): State<AppState>) -> Result<Json<PieChartResponse>, ApiError> {
    let chart: PieChart = cached(&state.cache, keys::ADMIN_PIE_CHART, None, || async {
        let products = product::Entity::find().all(&state.db).await?;
        let users = user::Entity::find().all(&state.db).await?;
        let orders = order::Entity::find().all(&state.db).await?;
        Ok(build_pie_chart(
            &products,
            &users,
            &orders,
            chrono::Utc::now().date_naive(),
        ))
    })
    .await?;

    Ok(Json(PieChartResponse {
        success: true,
        chart,
    }))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineChart {
    pub orders: Vec<OrderCountPoint>,
    pub products: Vec<ProductCountPoint>,
    pub discounts: Vec<DiscountPoint>,
    pub revenue: Vec<RevenuePoint>,
}

#[derive(Debug, Serialize)]
pub struct LineChartResponse {
    pub success: bool,
    pub chart: LineChart,
}

/// GET /admin/line - twelve trailing months
#[tracing::instrument(name = "GET /admin/line", skip(state))]
pub async fn line_chart(
    State(state): State<AppState>,
) -> Result<Json<LineChartResponse>, ApiError> {
    let chart: LineChart = cached(&state.cache, keys::ADMIN_LINE_CHART, None, || async {
        let orders = order::Entity::find().all(&state.db).await?;
        let products = product::Entity::find().all(&state.db).await?;

        let ranges = analytics::month_ranges(analytics::now_naive(), 12);

        let discount_series = fill_series(&ranges, &orders, |o| o.created_at, |o| o.discount);
        let discounts = ranges
            .iter()
            .zip(discount_series)
            .map(|(range, discount)| DiscountPoint {
                month: range.month_name.to_string(),
                year: range.year,
                discount,
            })
            .collect();

        Ok(LineChart {
            orders: order_count_points(&ranges, &orders),
            products: product_count_points(&ranges, &products),
            discounts,
            revenue: revenue_points(&ranges, &orders),
        })
    })
    .await?;

    Ok(Json(LineChartResponse {
        success: true,
        chart,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::order::{OrderItems, ShippingAddress};
    use crate::entity::product::ProductImages;
    use chrono::NaiveDate;

    fn at(year: i32, month: u32, day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn product(stock: i32, category: &str) -> product::Model {
        product::Model {
            id: storefront_types::create_id(),
            name: "Item".into(),
            price: 10.0,
            description: "".into(),
            images: ProductImages::default(),
            stock,
            category: category.into(),
            ratings: 0.0,
            num_of_reviews: 0,
            created_at: at(2026, 1, 1),
            updated_at: at(2026, 1, 1),
        }
    }

    fn a_user(gender: Gender, role: UserRole, dob: NaiveDate) -> user::Model {
        user::Model {
            id: storefront_types::create_id(),
            username: "shopper".into(),
            email: format!("{}@example.com", storefront_types::create_id()),
            photo: "p".into(),
            gender,
            dob,
            role,
            is_active: true,
            last_login: None,
            created_at: at(2026, 1, 1),
            updated_at: at(2026, 1, 1),
        }
    }

    fn an_order(
        total: f64,
        discount: f64,
        shipping: f64,
        tax: f64,
        status: OrderStatus,
    ) -> order::Model {
        order::Model {
            id: storefront_types::create_id(),
            user_id: "u1".into(),
            order_items: OrderItems(vec![]),
            shipping_address: ShippingAddress {
                address: "a".into(),
                city: "c".into(),
                state: "s".into(),
                country: "in".into(),
                pin_code: "1".into(),
            },
            sub_total: total,
            shipping_price: shipping,
            tax_price: tax,
            discount,
            total_price: total,
            delivery: false,
            status,
            is_delivered: false,
            delivered_at: None,
            created_at: at(2026, 1, 10),
            updated_at: at(2026, 1, 10),
        }
    }

    #[test]
    fn revenue_distribution_nets_out_costs() {
        let orders = vec![
            an_order(100.0, 10.0, 5.0, 18.0, OrderStatus::Pending),
            an_order(200.0, 0.0, 5.0, 36.0, OrderStatus::Delivered),
        ];
        let chart = build_pie_chart(&[], &[], &orders, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        let revenue = &chart.revenue_distribution;
        assert_eq!(revenue.gross_income, 300.0);
        assert_eq!(revenue.total_discount, 10.0);
        assert_eq!(revenue.total_shipping, 10.0);
        assert_eq!(revenue.total_tax, 54.0);
        assert_eq!(revenue.marketing_cost, 90.0);
        assert_eq!(revenue.net_income, 300.0 - 10.0 - 10.0 - 54.0);
    }

    #[test]
    fn stock_availability_splits_on_zero_stock() {
        let products = vec![product(3, "pens"), product(0, "pens"), product(0, "ink")];
        let chart =
            build_pie_chart(&products, &[], &[], NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        assert_eq!(chart.stock_availability.in_stock, 1);
        assert_eq!(chart.stock_availability.out_of_stock, 2);
        assert_eq!(chart.categories, vec!["ink".to_string(), "pens".to_string()]);
    }

    #[test]
    fn status_distribution_counts_every_state() {
        let orders = vec![
            an_order(1.0, 0.0, 0.0, 0.0, OrderStatus::Pending),
            an_order(1.0, 0.0, 0.0, 0.0, OrderStatus::Pending),
            an_order(1.0, 0.0, 0.0, 0.0, OrderStatus::Shipped),
        ];
        let chart = build_pie_chart(&[], &[], &orders, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        let count_of = |status: OrderStatus| {
            chart
                .status
                .iter()
                .find(|s| s.status == status)
                .map(|s| s.count)
                .unwrap()
        };
        assert_eq!(count_of(OrderStatus::Pending), 2);
        assert_eq!(count_of(OrderStatus::Shipped), 1);
        assert_eq!(count_of(OrderStatus::Cancelled), 0);
    }

    #[test]
    fn age_buckets_follow_the_dashboard_ranges() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let users = vec![
            a_user(Gender::Male, UserRole::User, NaiveDate::from_ymd_opt(2006, 1, 1).unwrap()),
            a_user(Gender::Female, UserRole::User, NaiveDate::from_ymd_opt(1996, 1, 1).unwrap()),
            a_user(Gender::Male, UserRole::Admin, NaiveDate::from_ymd_opt(1950, 1, 1).unwrap()),
        ];
        let chart = build_pie_chart(&[], &users, &[], today);

        assert_eq!(chart.age_distribution.from_18_to_24, 1);
        assert_eq!(chart.age_distribution.from_25_to_34, 1);
        assert_eq!(chart.age_distribution.over_65, 1);
        assert_eq!(chart.admin_count, 1);
        assert_eq!(chart.user_count, 2);
    }

    #[test]
    fn gender_split_counts_both_groups() {
        let users = vec![
            a_user(Gender::Male, UserRole::User, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
            a_user(Gender::Female, UserRole::User, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
            a_user(Gender::Female, UserRole::User, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap()),
        ];
        let chart = build_pie_chart(&[], &users, &[], NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());

        assert_eq!(chart.users[0].gender, "male");
        assert_eq!(chart.users[0].count, 1);
        assert_eq!(chart.users[1].gender, "female");
        assert_eq!(chart.users[1].count, 2);
    }
}
