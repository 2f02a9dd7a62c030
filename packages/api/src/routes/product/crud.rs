//! Admin product CRUD. Create and update accept multipart bodies (text
//! fields plus image files); deletion releases the hosted images before the
//! document goes away.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, ModelTrait};
use serde::Serialize;
use storefront_types::create_id;

use crate::{
    cache::EntityMutation,
    entity::product::{self, ProductImages},
    error::ApiError,
    images::upload_all,
    state::AppState,
};

use super::ProductDto;

#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    price: Option<f64>,
    description: Option<String>,
    stock: Option<i32>,
    category: Option<String>,
    files: Vec<(String, Vec<u8>)>,
}

async fn read_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid image upload: {e}")))?;
                form.files.push((filename, bytes.to_vec()));
            }
            text_field => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("invalid field value: {e}")))?;
                match text_field {
                    "name" => form.name = Some(value),
                    "price" => {
                        form.price = Some(value.parse().map_err(|_| {
                            ApiError::bad_request(format!("invalid price: {value}"))
                        })?);
                    }
                    "description" => form.description = Some(value),
                    "stock" => {
                        form.stock = Some(value.parse().map_err(|_| {
                            ApiError::bad_request(format!("invalid stock: {value}"))
                        })?);
                    }
                    "category" => form.category = Some(value.to_lowercase()),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}

#[derive(Debug, Serialize)]
pub struct CreateProductResponse {
    pub success: bool,
    pub message: String,
    pub product: ProductDto,
}

/// POST /product/create - admin, multipart
#[tracing::instrument(name = "POST /product/create", skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CreateProductResponse>, ApiError> {
    let form = read_form(multipart).await?;

    let (Some(name), Some(price), Some(description), Some(stock), Some(category)) = (
        form.name,
        form.price,
        form.description,
        form.stock,
        form.category,
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    if form.files.is_empty() {
        return Err(ApiError::bad_request("Please upload an image"));
    }
    if price <= 0.0 {
        return Err(ApiError::bad_request("Product price must be positive"));
    }
    if stock < 0 {
        return Err(ApiError::bad_request("Product stock cannot be negative"));
    }

    let images = upload_all(&state.image_host, form.files)
        .await
        .map_err(|err| {
            tracing::error!("image upload failed: {}", err);
            ApiError::internal("Error uploading images")
        })?;

    let now = Utc::now().naive_utc();
    let created = product::ActiveModel {
        id: Set(create_id()),
        name: Set(name),
        price: Set(price),
        description: Set(description),
        images: Set(ProductImages(images)),
        stock: Set(stock),
        category: Set(category),
        ratings: Set(0.0),
        num_of_reviews: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    state.invalidate(EntityMutation::ProductCreated).await?;

    tracing::info!(product_id = %created.id, "Product created");

    Ok(Json(CreateProductResponse {
        success: true,
        message: "Product created successfully".to_string(),
        product: created.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub success: bool,
    pub product: ProductDto,
}

/// GET /product/{id}
#[tracing::instrument(name = "GET /product/{id}", skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = product::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    Ok(Json(ProductResponse {
        success: true,
        product: product.into(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductResponse {
    pub success: bool,
    pub message: String,
    pub updated_fields: Vec<String>,
}

/// PUT /product/{id} - admin, multipart, whitelisted fields only
#[tracing::instrument(name = "PUT /product/{id}", skip(state, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<UpdateProductResponse>, ApiError> {
    let form = read_form(multipart).await?;

    let existing = product::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    let previous_images = existing.images.0.clone();
    let mut active: product::ActiveModel = existing.into();
    let mut updated_fields = Vec::new();

    if !form.files.is_empty() {
        let images = upload_all(&state.image_host, form.files)
            .await
            .map_err(|err| {
                tracing::error!("image upload failed: {}", err);
                ApiError::internal("Error uploading images")
            })?;
        active.images = Set(ProductImages(images));
        updated_fields.push("image".to_string());
    }

    if let Some(name) = form.name {
        active.name = Set(name);
        updated_fields.push("name".to_string());
    }
    if let Some(price) = form.price {
        if price <= 0.0 {
            return Err(ApiError::bad_request("Product price must be positive"));
        }
        active.price = Set(price);
        updated_fields.push("price".to_string());
    }
    if let Some(description) = form.description {
        active.description = Set(description);
        updated_fields.push("description".to_string());
    }
    if let Some(stock) = form.stock {
        if stock < 0 {
            return Err(ApiError::bad_request("Product stock cannot be negative"));
        }
        active.stock = Set(stock);
        updated_fields.push("stock".to_string());
    }
    if let Some(category) = form.category {
        active.category = Set(category);
        updated_fields.push("category".to_string());
    }

    if updated_fields.is_empty() {
        return Ok(Json(UpdateProductResponse {
            success: true,
            message: "No fields updated".to_string(),
            updated_fields,
        }));
    }

    active.updated_at = Set(Utc::now().naive_utc());
    active.update(&state.db).await?;

    // The replaced images are released only after the document points at
    // the new ones.
    if updated_fields.iter().any(|f| f == "image") {
        for image in previous_images {
            if let Err(err) = state.image_host.delete(&image.public_id).await {
                tracing::warn!(public_id = %image.public_id, "failed to release replaced image: {}", err);
            }
        }
    }

    state.invalidate(EntityMutation::ProductUpdated).await?;

    tracing::info!(product_id = %id, ?updated_fields, "Product updated");

    Ok(Json(UpdateProductResponse {
        success: true,
        message: "Product updated successfully".to_string(),
        updated_fields,
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /product/{id} - admin; releases hosted images first
#[tracing::instrument(name = "DELETE /product/{id}", skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let product = product::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))?;

    for image in &product.images.0 {
        state
            .image_host
            .delete(&image.public_id)
            .await
            .map_err(|err| {
                tracing::error!("image delete failed: {}", err);
                ApiError::internal("Error deleting images")
            })?;
    }

    product.delete(&state.db).await?;
    state.invalidate(EntityMutation::ProductDeleted).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "Product deleted successfully".to_string(),
    }))
}
