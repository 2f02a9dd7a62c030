//! Product listings. The fixed lists are cache-aside; the faceted search is
//! always computed because its parameter space is unbounded.

use axum::{
    Json,
    extract::{Query, State},
};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::{
    cache::{cached, keys},
    entity::product,
    error::ApiError,
    state::AppState,
};

use super::{ProductDto, ProductsResponse};

/// GET /product/latest - five newest products, cached
#[tracing::instrument(name = "GET /product/latest", skip(state))]
pub async fn latest_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products: Vec<ProductDto> =
        cached(&state.cache, keys::LATEST_PRODUCTS, None, || async {
            let products = product::Entity::find()
                .order_by_desc(product::Column::CreatedAt)
                .limit(5)
                .all(&state.db)
                .await?;
            Ok(products.into_iter().map(Into::into).collect())
        })
        .await?;

    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub success: bool,
    pub category: Vec<String>,
}

/// GET /product/category - distinct categories, cached
#[tracing::instrument(name = "GET /product/category", skip(state))]
pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let category: Vec<String> = cached(&state.cache, keys::ALL_CATEGORIES, None, || async {
        let categories = product::Entity::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .into_tuple::<String>()
            .all(&state.db)
            .await?;
        Ok(categories)
    })
    .await?;

    Ok(Json(CategoriesResponse {
        success: true,
        category,
    }))
}

async fn full_catalog(state: &AppState, key: &str) -> Result<Vec<ProductDto>, ApiError> {
    cached(&state.cache, key, None, || async {
        let products = product::Entity::find().all(&state.db).await?;
        Ok(products.into_iter().map(Into::into).collect())
    })
    .await
}

/// GET /product/products - storefront catalog, cached
#[tracing::instrument(name = "GET /product/products", skip(state))]
pub async fn all_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = full_catalog(&state, keys::ALL_PRODUCTS).await?;
    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

/// GET /product/admin-product - admin catalog view, separately cached
#[tracing::instrument(name = "GET /product/admin-product", skip(state))]
pub async fn admin_products(
    State(state): State<AppState>,
) -> Result<Json<ProductsResponse>, ApiError> {
    let products = full_catalog(&state, keys::ADMIN_PRODUCTS).await?;
    Ok(Json(ProductsResponse {
        success: true,
        products,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    /// Upper price bound
    pub price: Option<f64>,
    pub category: Option<String>,
    /// `asc` or `desc` by price
    pub sort: Option<String>,
    pub page: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_products: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub prev_page: Option<u64>,
    pub next_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub products: Vec<ProductDto>,
    pub pagination: Pagination,
}

const SEARCH_PAGE_SIZE: u64 = 10;

/// GET /product/all - faceted search with page pagination, uncached
#[tracing::instrument(name = "GET /product/all", skip(state))]
pub async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);

    let mut select = product::Entity::find();

    if let Some(search) = &query.search {
        select = select.filter(
            Condition::any()
                .add(product::Column::Name.contains(search))
                .add(product::Column::Description.contains(search)),
        );
    }
    if let Some(price) = query.price {
        select = select.filter(product::Column::Price.lte(price));
    }
    if let Some(category) = &query.category {
        select = select.filter(product::Column::Category.eq(category.to_lowercase()));
    }
    if let Some(sort) = &query.sort {
        select = if sort == "asc" {
            select.order_by_asc(product::Column::Price)
        } else {
            select.order_by_desc(product::Column::Price)
        };
    }

    let paginator = select.paginate(&state.db, SEARCH_PAGE_SIZE);
    let total_products = paginator.num_items().await?;
    let total_pages = total_products.div_ceil(SEARCH_PAGE_SIZE);
    let products = paginator.fetch_page(page - 1).await?;

    Ok(Json(SearchResponse {
        success: true,
        products: products.into_iter().map(Into::into).collect(),
        pagination: Pagination {
            total_products,
            total_pages,
            current_page: page,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
            prev_page: (page > 1).then(|| page - 1),
            next_page: (page < total_pages).then(|| page + 1),
        },
    }))
}
