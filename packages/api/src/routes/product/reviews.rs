//! Product reviews. One review per (user, product); writing again
//! overwrites. The product's rating average and review count are recomputed
//! from the full review set on every mutation.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use storefront_types::create_id;

use crate::{
    cache::EntityMutation,
    entity::{product, review, user},
    error::ApiError,
    state::AppState,
};

const MAX_COMMENT_CHARS: usize = 500;

/// Average and count over a review set. The average of an empty set is zero,
/// matching a product that has never been reviewed.
pub fn rating_summary(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i32 = ratings.iter().sum();
    (f64::from(sum) / ratings.len() as f64, ratings.len() as i32)
}

async fn recompute_product_rating(state: &AppState, product_id: &str) -> Result<(), ApiError> {
    let ratings: Vec<i32> = review::Entity::find()
        .filter(review::Column::ProductId.eq(product_id))
        .select_only()
        .column(review::Column::Rating)
        .into_tuple()
        .all(&state.db)
        .await?;

    let (average, count) = rating_summary(&ratings);

    let product = product::Entity::find_by_id(product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let mut active: product::ActiveModel = product.into();
    active.ratings = Set(average);
    active.num_of_reviews = Set(count);
    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

impl From<review::Model> for ReviewDto {
    fn from(model: review::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            product_id: model.product_id,
            rating: model.rating,
            comment: model.comment,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteReviewRequest {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteReviewResponse {
    pub success: bool,
    pub message: String,
    pub review: ReviewDto,
}

/// POST /product/review/new - insert, or overwrite the caller's existing
/// review of the product
#[tracing::instrument(name = "POST /product/review/new", skip(state, body))]
pub async fn write_review(
    State(state): State<AppState>,
    Json(body): Json<WriteReviewRequest>,
) -> Result<Json<WriteReviewResponse>, ApiError> {
    let (Some(user_id), Some(product_id), Some(rating)) =
        (body.user_id, body.product_id, body.rating)
    else {
        return Err(ApiError::bad_request(
            "userId, productId and rating are required",
        ));
    };

    if !(1..=5).contains(&rating) {
        return Err(ApiError::bad_request(
            "Please enter a rating between 1 and 5",
        ));
    }
    if let Some(comment) = &body.comment {
        if comment.chars().count() > MAX_COMMENT_CHARS {
            return Err(ApiError::bad_request("Comment cannot exceed 500 characters"));
        }
    }

    user::Entity::find_by_id(&user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    product::Entity::find_by_id(&product_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let existing = review::Entity::find()
        .filter(review::Column::UserId.eq(&user_id))
        .filter(review::Column::ProductId.eq(&product_id))
        .one(&state.db)
        .await?;

    let now = Utc::now().naive_utc();
    let (saved, message) = match existing {
        Some(previous) => {
            let mut active: review::ActiveModel = previous.into();
            active.rating = Set(rating);
            active.comment = Set(body.comment);
            active.updated_at = Set(now);
            (active.update(&state.db).await?, "Review updated")
        }
        None => {
            let created = review::ActiveModel {
                id: Set(create_id()),
                user_id: Set(user_id),
                product_id: Set(product_id.clone()),
                rating: Set(rating),
                comment: Set(body.comment),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&state.db)
            .await?;
            (created, "Review created")
        }
    };

    recompute_product_rating(&state, &product_id).await?;
    state.invalidate(EntityMutation::ReviewWritten).await?;

    Ok(Json(WriteReviewResponse {
        success: true,
        message: message.to_string(),
        review: saved.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /product/review/{id}
#[tracing::instrument(name = "DELETE /product/review/{id}", skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let review = review::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;

    let product_id = review.product_id.clone();
    review.delete(&state.db).await?;

    recompute_product_rating(&state, &product_id).await?;
    state.invalidate(EntityMutation::ReviewDeleted).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Review deleted successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewsQuery {
    pub product_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub success: bool,
    pub reviews: Vec<ReviewDto>,
    pub count: usize,
}

/// GET /product/reviews?productId=...
#[tracing::instrument(name = "GET /product/reviews", skip(state))]
pub async fn product_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let reviews = review::Entity::find()
        .filter(review::Column::ProductId.eq(&query.product_id))
        .order_by_desc(review::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let reviews: Vec<ReviewDto> = reviews.into_iter().map(Into::into).collect();
    let count = reviews.len();

    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
        count,
    }))
}

/// GET /product/top-reviews - the five best-rated recent reviews
#[tracing::instrument(name = "GET /product/top-reviews", skip(state))]
pub async fn top_reviews(
    State(state): State<AppState>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let reviews = review::Entity::find()
        .order_by_desc(review::Column::Rating)
        .order_by_desc(review::Column::CreatedAt)
        .limit(5)
        .all(&state.db)
        .await?;

    let reviews: Vec<ReviewDto> = reviews.into_iter().map(Into::into).collect();
    let count = reviews.len();

    Ok(Json(ReviewsResponse {
        success: true,
        reviews,
        count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_review_set_averages_to_zero() {
        assert_eq!(rating_summary(&[]), (0.0, 0));
    }

    #[test]
    fn average_reflects_all_ratings() {
        let (average, count) = rating_summary(&[5, 4, 3]);
        assert_eq!(count, 3);
        assert!((average - 4.0).abs() < 1e-9);
    }

    #[test]
    fn overwriting_a_rating_keeps_the_count_stable() {
        // One user reviewed 2, another 4 -> overwrite the 2 with a 5.
        let before = rating_summary(&[2, 4]);
        let after = rating_summary(&[5, 4]);

        assert_eq!(before.1, after.1);
        assert!((after.0 - 4.5).abs() < 1e-9);
    }
}
