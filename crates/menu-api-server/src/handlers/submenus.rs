use crate::database::{EntityChanges, Repository, Submenu};
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::menus::DeleteResponse;

#[derive(Debug, Deserialize)]
pub struct CreateSubmenuRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubmenuRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmenuResponse {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: i64,
}

impl From<Submenu> for SubmenuResponse {
    fn from(submenu: Submenu) -> Self {
        Self {
            id: submenu.id,
            menu_id: submenu.menu_id,
            title: submenu.title,
            description: submenu.description,
            dishes_count: submenu.dishes_count,
        }
    }
}

pub async fn list_submenus(
    Extension(repository): Extension<Arc<Repository>>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<Vec<SubmenuResponse>>, ApiError> {
    let submenus = repository
        .list_submenus(menu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(
        submenus.into_iter().map(SubmenuResponse::from).collect(),
    ))
}

pub async fn get_submenu(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<SubmenuResponse>, ApiError> {
    let submenu = repository
        .find_submenu(menu_id, submenu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("submenu not found".to_string()))?;

    Ok(Json(submenu.into()))
}

pub async fn create_submenu(
    Extension(repository): Extension<Arc<Repository>>,
    Path(menu_id): Path<Uuid>,
    Json(request): Json<CreateSubmenuRequest>,
) -> Result<(StatusCode, Json<SubmenuResponse>), ApiError> {
    // Parent check first so the client sees 404, not a constraint violation
    let menu_exists = repository
        .menu_exists(menu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    if !menu_exists {
        return Err(ApiError::NotFound("menu not found".to_string()));
    }

    let submenu = repository
        .insert_submenu(menu_id, &request.title, &request.description)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!("Created submenu {} under menu {}", submenu.id, menu_id);

    Ok((StatusCode::CREATED, Json(submenu.into())))
}

pub async fn update_submenu(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateSubmenuRequest>,
) -> Result<Json<SubmenuResponse>, ApiError> {
    let changes = EntityChanges {
        title: request.title,
        description: request.description,
    };

    let updated = repository
        .update_submenu(menu_id, submenu_id, &changes)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !updated {
        return Err(ApiError::NotFound("submenu not found".to_string()));
    }

    let submenu = repository
        .find_submenu(menu_id, submenu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("submenu not found".to_string()))?;

    Ok(Json(submenu.into()))
}

pub async fn delete_submenu(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = repository
        .delete_submenu(menu_id, submenu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::NotFound("submenu not found".to_string()));
    }

    info!("Deleted submenu {} with its dishes", submenu_id);

    Ok(Json(DeleteResponse {
        status: true,
        message: "The submenu has been deleted".to_string(),
    }))
}
