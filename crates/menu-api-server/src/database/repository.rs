use super::models::{Dish, DishChanges, EntityChanges, Menu, Submenu};
use super::DbPool;
use anyhow::Result;
use tracing::debug;
use uuid::Uuid;

pub struct Repository {
    pub pool: DbPool,
}

impl Repository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // ------------------------------------------------------------------
    // Menus
    // ------------------------------------------------------------------

    /// All menus with submenu/dish counts, no pagination.
    pub async fn list_menus(&self) -> Result<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>(
            r#"SELECT
                m.id,
                m.title,
                m.description,
                (SELECT COUNT(*) FROM submenus s WHERE s.menu_id = m.id) AS submenus_count,
                (SELECT COUNT(*)
                   FROM dishes d
                   JOIN submenus s ON s.id = d.submenu_id
                  WHERE s.menu_id = m.id) AS dishes_count,
                m.created_at
               FROM menus m
               ORDER BY m.created_at"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(menus)
    }

    pub async fn find_menu(&self, menu_id: Uuid) -> Result<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(
            r#"SELECT
                m.id,
                m.title,
                m.description,
                (SELECT COUNT(*) FROM submenus s WHERE s.menu_id = m.id) AS submenus_count,
                (SELECT COUNT(*)
                   FROM dishes d
                   JOIN submenus s ON s.id = d.submenu_id
                  WHERE s.menu_id = m.id) AS dishes_count,
                m.created_at
               FROM menus m
               WHERE m.id = $1"#,
        )
        .bind(menu_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(menu)
    }

    pub async fn menu_exists(&self, menu_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM menus WHERE id = $1)",
        )
        .bind(menu_id)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok(exists)
    }

    /// Inserts a menu; the id is generated here and immutable afterwards.
    pub async fn insert_menu(&self, title: &str, description: &str) -> Result<Menu> {
        let menu = sqlx::query_as::<_, Menu>(
            r#"INSERT INTO menus (id, title, description)
               VALUES ($1, $2, $3)
               RETURNING
                   id,
                   title,
                   description,
                   0::BIGINT AS submenus_count,
                   0::BIGINT AS dishes_count,
                   created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(description)
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!("Inserted menu {}", menu.id);

        Ok(menu)
    }

    /// Returns false when no row matched the id.
    pub async fn update_menu(&self, menu_id: Uuid, changes: &EntityChanges) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE menus
               SET title = COALESCE($2, title),
                   description = COALESCE($3, description)
               WHERE id = $1"#,
        )
        .bind(menu_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cascades to submenus and dishes via foreign keys.
    pub async fn delete_menu(&self, menu_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(menu_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Submenus
    // ------------------------------------------------------------------

    pub async fn list_submenus(&self, menu_id: Uuid) -> Result<Vec<Submenu>> {
        let submenus = sqlx::query_as::<_, Submenu>(
            r#"SELECT
                s.id,
                s.menu_id,
                s.title,
                s.description,
                (SELECT COUNT(*) FROM dishes d WHERE d.submenu_id = s.id) AS dishes_count,
                s.created_at
               FROM submenus s
               WHERE s.menu_id = $1
               ORDER BY s.created_at"#,
        )
        .bind(menu_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(submenus)
    }

    /// Scoped lookup: a submenu under a different menu is treated as absent.
    pub async fn find_submenu(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<Option<Submenu>> {
        let submenu = sqlx::query_as::<_, Submenu>(
            r#"SELECT
                s.id,
                s.menu_id,
                s.title,
                s.description,
                (SELECT COUNT(*) FROM dishes d WHERE d.submenu_id = s.id) AS dishes_count,
                s.created_at
               FROM submenus s
               WHERE s.id = $1 AND s.menu_id = $2"#,
        )
        .bind(submenu_id)
        .bind(menu_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(submenu)
    }

    pub async fn submenu_exists(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM submenus WHERE id = $1 AND menu_id = $2)",
        )
        .bind(submenu_id)
        .bind(menu_id)
        .fetch_one(self.pool.get_pool())
        .await?;

        Ok(exists)
    }

    pub async fn insert_submenu(
        &self,
        menu_id: Uuid,
        title: &str,
        description: &str,
    ) -> Result<Submenu> {
        let submenu = sqlx::query_as::<_, Submenu>(
            r#"INSERT INTO submenus (id, menu_id, title, description)
               VALUES ($1, $2, $3, $4)
               RETURNING
                   id,
                   menu_id,
                   title,
                   description,
                   0::BIGINT AS dishes_count,
                   created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(menu_id)
        .bind(title)
        .bind(description)
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!("Inserted submenu {} under menu {}", submenu.id, menu_id);

        Ok(submenu)
    }

    pub async fn update_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        changes: &EntityChanges,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE submenus
               SET title = COALESCE($3, title),
                   description = COALESCE($4, description)
               WHERE id = $1 AND menu_id = $2"#,
        )
        .bind(submenu_id)
        .bind(menu_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Cascades to dishes via foreign key.
    pub async fn delete_submenu(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM submenus WHERE id = $1 AND menu_id = $2")
            .bind(submenu_id)
            .bind(menu_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Dishes
    // ------------------------------------------------------------------

    pub async fn list_dishes(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<Vec<Dish>> {
        let dishes = sqlx::query_as::<_, Dish>(
            r#"SELECT d.id, d.submenu_id, d.title, d.description, d.price, d.created_at
               FROM dishes d
               JOIN submenus s ON s.id = d.submenu_id
               WHERE d.submenu_id = $1 AND s.menu_id = $2
               ORDER BY d.created_at"#,
        )
        .bind(submenu_id)
        .bind(menu_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(dishes)
    }

    pub async fn find_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<Option<Dish>> {
        let dish = sqlx::query_as::<_, Dish>(
            r#"SELECT d.id, d.submenu_id, d.title, d.description, d.price, d.created_at
               FROM dishes d
               JOIN submenus s ON s.id = d.submenu_id
               WHERE d.id = $1 AND d.submenu_id = $2 AND s.menu_id = $3"#,
        )
        .bind(dish_id)
        .bind(submenu_id)
        .bind(menu_id)
        .fetch_optional(self.pool.get_pool())
        .await?;

        Ok(dish)
    }

    pub async fn insert_dish(
        &self,
        submenu_id: Uuid,
        title: &str,
        description: &str,
        price: f64,
    ) -> Result<Dish> {
        let dish = sqlx::query_as::<_, Dish>(
            r#"INSERT INTO dishes (id, submenu_id, title, description, price)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, submenu_id, title, description, price, created_at"#,
        )
        .bind(Uuid::new_v4())
        .bind(submenu_id)
        .bind(title)
        .bind(description)
        .bind(price)
        .fetch_one(self.pool.get_pool())
        .await?;

        debug!("Inserted dish {} under submenu {}", dish.id, submenu_id);

        Ok(dish)
    }

    pub async fn update_dish(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        changes: &DishChanges,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE dishes d
               SET title = COALESCE($4, d.title),
                   description = COALESCE($5, d.description),
                   price = COALESCE($6, d.price)
               FROM submenus s
               WHERE d.id = $1 AND d.submenu_id = $2
                 AND s.id = d.submenu_id AND s.menu_id = $3"#,
        )
        .bind(dish_id)
        .bind(submenu_id)
        .bind(menu_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_dish(&self, menu_id: Uuid, submenu_id: Uuid, dish_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"DELETE FROM dishes d
               USING submenus s
               WHERE d.id = $1 AND d.submenu_id = $2
                 AND s.id = d.submenu_id AND s.menu_id = $3"#,
        )
        .bind(dish_id)
        .bind(submenu_id)
        .bind(menu_id)
        .execute(self.pool.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Every submenu in the catalog, parent-ordered; used by the exporter.
    pub async fn all_submenus(&self) -> Result<Vec<Submenu>> {
        let submenus = sqlx::query_as::<_, Submenu>(
            r#"SELECT
                s.id,
                s.menu_id,
                s.title,
                s.description,
                (SELECT COUNT(*) FROM dishes d WHERE d.submenu_id = s.id) AS dishes_count,
                s.created_at
               FROM submenus s
               ORDER BY s.menu_id, s.created_at"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(submenus)
    }

    pub async fn all_dishes(&self) -> Result<Vec<Dish>> {
        let dishes = sqlx::query_as::<_, Dish>(
            r#"SELECT d.id, d.submenu_id, d.title, d.description, d.price, d.created_at
               FROM dishes d
               ORDER BY d.submenu_id, d.created_at"#,
        )
        .fetch_all(self.pool.get_pool())
        .await?;

        Ok(dishes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn repo(pool: PgPool) -> Repository {
        Repository::new(pool.into())
    }

    #[sqlx::test]
    async fn read_after_create_returns_identical_fields(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let submenu = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();

        let fetched = repo
            .find_submenu(menu.id, submenu.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fetched.id, submenu.id);
        assert_eq!(fetched.title, "s1");
        assert_eq!(fetched.description, "sd1");
        assert_eq!(fetched.dishes_count, 0);
    }

    #[sqlx::test]
    async fn partial_update_keeps_unspecified_fields(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();

        let changes = EntityChanges {
            title: Some("t2".to_string()),
            description: None,
        };
        assert!(repo.update_menu(menu.id, &changes).await.unwrap());

        let updated = repo.find_menu(menu.id).await.unwrap().unwrap();
        assert_eq!(updated.title, "t2");
        assert_eq!(updated.description, "d1");
    }

    #[sqlx::test]
    async fn scoped_lookup_misses_submenu_of_other_menu(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let other_menu = repo.insert_menu("t2", "d2").await.unwrap();
        let submenu = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();

        assert!(repo
            .find_submenu(other_menu.id, submenu.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_submenu(menu.id, submenu.id)
            .await
            .unwrap()
            .is_some());
    }

    #[sqlx::test]
    async fn listing_returns_exactly_the_set_under_the_parent(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let other_menu = repo.insert_menu("t2", "d2").await.unwrap();
        let s1 = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();
        let s2 = repo.insert_submenu(menu.id, "s2", "sd2").await.unwrap();
        repo.insert_submenu(other_menu.id, "s3", "sd3").await.unwrap();

        let listed = repo.list_submenus(menu.id).await.unwrap();

        let mut ids: Vec<_> = listed.iter().map(|s| s.id).collect();
        ids.sort();
        let mut expected = vec![s1.id, s2.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[sqlx::test]
    async fn counts_are_computed_from_children(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let submenu = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();
        repo.insert_dish(submenu.id, "dish1", "dd1", 1.5).await.unwrap();
        repo.insert_dish(submenu.id, "dish2", "dd2", 2.5).await.unwrap();

        let fetched_menu = repo.find_menu(menu.id).await.unwrap().unwrap();
        assert_eq!(fetched_menu.submenus_count, 1);
        assert_eq!(fetched_menu.dishes_count, 2);

        let fetched_submenu = repo
            .find_submenu(menu.id, submenu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched_submenu.dishes_count, 2);
    }

    #[sqlx::test]
    async fn deleting_menu_cascades_to_children(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let submenu = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();
        let dish = repo
            .insert_dish(submenu.id, "dish1", "dd1", 1.5)
            .await
            .unwrap();

        assert!(repo.delete_menu(menu.id).await.unwrap());

        assert!(repo
            .find_submenu(menu.id, submenu.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo
            .find_dish(menu.id, submenu.id, dish.id)
            .await
            .unwrap()
            .is_none());
        assert!(repo.all_dishes().await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn deleting_submenu_cascades_to_dishes_only(pool: PgPool) {
        let repo = repo(pool);
        let menu = repo.insert_menu("t1", "d1").await.unwrap();
        let submenu = repo.insert_submenu(menu.id, "s1", "sd1").await.unwrap();
        repo.insert_dish(submenu.id, "dish1", "dd1", 1.5).await.unwrap();

        assert!(repo.delete_submenu(menu.id, submenu.id).await.unwrap());

        assert!(repo.find_menu(menu.id).await.unwrap().is_some());
        assert!(repo.all_dishes().await.unwrap().is_empty());
    }

    #[sqlx::test]
    async fn update_of_absent_row_reports_no_match(pool: PgPool) {
        let repo = repo(pool);
        let changes = EntityChanges {
            title: Some("t".to_string()),
            description: None,
        };

        assert!(!repo.update_menu(Uuid::new_v4(), &changes).await.unwrap());
        assert!(!repo.delete_menu(Uuid::new_v4()).await.unwrap());
    }
}
