use crate::database::{EntityChanges, Menu, Repository};
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

#[derive(Debug, Deserialize)]
pub struct CreateMenuRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenuRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus_count: i64,
    pub dishes_count: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: bool,
    pub message: String,
}

impl From<Menu> for MenuResponse {
    fn from(menu: Menu) -> Self {
        Self {
            id: menu.id,
            title: menu.title,
            description: menu.description,
            submenus_count: menu.submenus_count,
            dishes_count: menu.dishes_count,
        }
    }
}

pub async fn list_menus(
    Extension(repository): Extension<Arc<Repository>>,
) -> Result<Json<Vec<MenuResponse>>, ApiError> {
    let menus = repository
        .list_menus()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(menus.into_iter().map(MenuResponse::from).collect()))
}

pub async fn get_menu(
    Extension(repository): Extension<Arc<Repository>>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<MenuResponse>, ApiError> {
    let menu = repository
        .find_menu(menu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("menu not found".to_string()))?;

    Ok(Json(menu.into()))
}

pub async fn create_menu(
    Extension(repository): Extension<Arc<Repository>>,
    Json(request): Json<CreateMenuRequest>,
) -> Result<(StatusCode, Json<MenuResponse>), ApiError> {
    let menu = repository
        .insert_menu(&request.title, &request.description)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!("Created menu {}", menu.id);

    Ok((StatusCode::CREATED, Json(menu.into())))
}

pub async fn update_menu(
    Extension(repository): Extension<Arc<Repository>>,
    Path(menu_id): Path<Uuid>,
    Json(request): Json<UpdateMenuRequest>,
) -> Result<Json<MenuResponse>, ApiError> {
    let changes = EntityChanges {
        title: request.title,
        description: request.description,
    };

    let updated = repository
        .update_menu(menu_id, &changes)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !updated {
        return Err(ApiError::NotFound("menu not found".to_string()));
    }

    let menu = repository
        .find_menu(menu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("menu not found".to_string()))?;

    Ok(Json(menu.into()))
}

pub async fn delete_menu(
    Extension(repository): Extension<Arc<Repository>>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = repository
        .delete_menu(menu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::NotFound("menu not found".to_string()));
    }

    info!("Deleted menu {} with its submenus and dishes", menu_id);

    Ok(Json(DeleteResponse {
        status: true,
        message: "The menu has been deleted".to_string(),
    }))
}
