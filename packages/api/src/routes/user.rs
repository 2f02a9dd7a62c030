//! Account routes: idempotent creation plus admin-gated administration.

use axum::{
    Json, Router,
    extract::{Path, State},
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait, ModelTrait};
use serde::{Deserialize, Serialize};

use crate::{
    cache::EntityMutation,
    entity::{
        sea_orm_active_enums::{Gender, UserRole},
        user,
    },
    error::ApiError,
    middleware::admin::admin_only,
    state::AppState,
};

pub fn routes(state: &AppState) -> Router<AppState> {
    let admin_gate = || from_fn_with_state(state.clone(), admin_only);

    Router::new()
        .route("/new", post(new_user))
        .route("/all", get(all_users).layer(admin_gate()))
        .route(
            "/{id}",
            get(get_user).delete(delete_user.layer(admin_gate())),
        )
}

/// Wire shape of an account, with the age derived from `dob` at read time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub photo: String,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub age: i32,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<chrono::NaiveDateTime>,
    pub created_at: chrono::NaiveDateTime,
}

impl From<user::Model> for UserDto {
    fn from(model: user::Model) -> Self {
        let age = model.age_at(Utc::now().date_naive());
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            photo: model.photo,
            gender: model.gender,
            dob: model.dob,
            age,
            role: model.role,
            is_active: model.is_active,
            last_login: model.last_login,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewUserResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserDto>,
}

fn parse_gender(raw: &str) -> Result<Gender, ApiError> {
    match raw {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        other => Err(ApiError::bad_request(format!("invalid gender: {other}"))),
    }
}

/// POST /user/new - create-or-welcome-back by externally issued id
#[tracing::instrument(name = "POST /user/new", skip(state, body))]
pub async fn new_user(
    State(state): State<AppState>,
    Json(body): Json<NewUserRequest>,
) -> Result<Json<NewUserResponse>, ApiError> {
    let (Some(id), Some(username), Some(email), Some(gender), Some(dob), Some(photo)) = (
        body.id, body.username, body.email, body.gender, body.dob, body.photo,
    ) else {
        return Err(ApiError::bad_request("all fields are required"));
    };

    if let Some(existing) = user::Entity::find_by_id(&id).one(&state.db).await? {
        // Idempotent: the account already exists, greet and refresh the
        // login timestamp.
        let username = existing.username.clone();
        let mut active: user::ActiveModel = existing.into();
        active.last_login = Set(Some(Utc::now().naive_utc()));
        active.update(&state.db).await?;

        return Ok(Json(NewUserResponse {
            success: true,
            message: format!("welcome back {username}"),
            user: None,
        }));
    }

    let gender = parse_gender(&gender)?;
    let dob = NaiveDate::parse_from_str(&dob, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("invalid date of birth: {dob}")))?;

    if username.len() < 3 || username.len() > 50 {
        return Err(ApiError::bad_request(
            "username must be between 3 and 50 characters",
        ));
    }

    let now = Utc::now().naive_utc();
    let created = user::ActiveModel {
        id: Set(id),
        username: Set(username),
        email: Set(email),
        photo: Set(photo),
        gender: Set(gender),
        dob: Set(dob),
        role: Set(UserRole::User),
        is_active: Set(true),
        last_login: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    state.invalidate(EntityMutation::UserCreated).await?;

    tracing::info!(user_id = %created.id, "User created");

    Ok(Json(NewUserResponse {
        success: true,
        message: "User created successfully".to_string(),
        user: Some(created.into()),
    }))
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub users: Vec<UserDto>,
}

/// GET /user/all - admin listing
#[tracing::instrument(name = "GET /user/all", skip(state))]
pub async fn all_users(State(state): State<AppState>) -> Result<Json<UsersResponse>, ApiError> {
    let users = user::Entity::find().all(&state.db).await?;
    Ok(Json(UsersResponse {
        success: true,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserDto,
}

/// GET /user/{id}
#[tracing::instrument(name = "GET /user/{id}", skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = user::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    Ok(Json(UserResponse {
        success: true,
        user: user.into(),
    }))
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// DELETE /user/{id} - admin removal
#[tracing::instrument(name = "DELETE /user/{id}", skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = user::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("invalid user id"))?;

    user.delete(&state.db).await?;
    state.invalidate(EntityMutation::UserRemoved).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "user deleted successfully".to_string(),
    }))
}
