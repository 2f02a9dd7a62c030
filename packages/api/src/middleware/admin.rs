//! Admin gate.
//!
//! Callers identify themselves through the `id` query parameter (the token
//! layer in front of this service resolves credentials to that id). The gate
//! loads the account and rejects non-admins before the handler runs.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;

use crate::{
    entity::{sea_orm_active_enums::UserRole, user},
    error::ApiError,
    state::AppState,
};

/// The authenticated admin, exposed to gated handlers as an extension.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: String,
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}

pub async fn admin_only(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(id) = query_param(req.uri().query(), "id") else {
        return Err(ApiError::unauthorized("login first"));
    };

    let user = user::Entity::find_by_id(&id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if user.role != UserRole::Admin {
        return Err(ApiError::forbidden(
            "You are not authorized to access this route",
        ));
    }

    req.extensions_mut().insert(AdminUser { id });
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_finds_the_named_pair() {
        assert_eq!(
            query_param(Some("id=u1&active=true"), "id"),
            Some("u1".to_string())
        );
        assert_eq!(
            query_param(Some("active=true&id=u1"), "id"),
            Some("u1".to_string())
        );
    }

    #[test]
    fn query_param_rejects_missing_or_empty_values() {
        assert_eq!(query_param(None, "id"), None);
        assert_eq!(query_param(Some("active=true"), "id"), None);
        assert_eq!(query_param(Some("id="), "id"), None);
    }
}
