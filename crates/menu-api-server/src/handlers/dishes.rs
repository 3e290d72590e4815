use crate::database::{Dish, DishChanges, Repository};
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
pub struct CreateDishRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDishRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct DishResponse {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
}

impl From<Dish> for DishResponse {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            submenu_id: dish.submenu_id,
            title: dish.title,
            description: dish.description,
            price: dish.price,
        }
    }
}

pub async fn list_dishes(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<DishResponse>>, ApiError> {
    let dishes = repository
        .list_dishes(menu_id, submenu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(dishes.into_iter().map(DishResponse::from).collect()))
}

pub async fn get_dish(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<DishResponse>, ApiError> {
    let dish = repository
        .find_dish(menu_id, submenu_id, dish_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("dish not found".to_string()))?;

    Ok(Json(dish.into()))
}

pub async fn create_dish(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<DishResponse>), ApiError> {
    let submenu_exists = repository
        .submenu_exists(menu_id, submenu_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
    if !submenu_exists {
        return Err(ApiError::NotFound("submenu not found".to_string()));
    }

    let dish = repository
        .insert_dish(submenu_id, &request.title, &request.description, request.price)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!("Created dish {} under submenu {}", dish.id, submenu_id);

    Ok((StatusCode::CREATED, Json(dish.into())))
}

pub async fn update_dish(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(request): Json<UpdateDishRequest>,
) -> Result<Json<DishResponse>, ApiError> {
    let changes = DishChanges {
        title: request.title,
        description: request.description,
        price: request.price,
    };

    let updated = repository
        .update_dish(menu_id, submenu_id, dish_id, &changes)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !updated {
        return Err(ApiError::NotFound("dish not found".to_string()));
    }

    let dish = repository
        .find_dish(menu_id, submenu_id, dish_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound("dish not found".to_string()))?;

    Ok(Json(dish.into()))
}

pub async fn delete_dish(
    Extension(repository): Extension<Arc<Repository>>,
    Path((menu_id, submenu_id, dish_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let deleted = repository
        .delete_dish(menu_id, submenu_id, dish_id)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    if !deleted {
        return Err(ApiError::NotFound("dish not found".to_string()));
    }

    info!("Deleted dish {}", dish_id);

    Ok(Json(DeleteResponse {
        status: true,
        message: "The dish has been deleted".to_string(),
    }))
}
