use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Menu row with counts computed at read time.
#[derive(Debug, Clone, FromRow)]
pub struct Menu {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub submenus_count: i64,
    pub dishes_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Submenu {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
    pub dishes_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Dish {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
}

/// Partial update payload applied with COALESCE: `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct EntityChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DishChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}
