use crate::database::{Dish, Menu, Repository, Submenu};
use crate::utils::error::ApiError;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Generates .xlsx snapshots of the whole catalog, one file per request,
/// keyed by a fresh file id. Files are never expired.
pub struct ExcelService {
    repository: Arc<Repository>,
    export_dir: PathBuf,
}

/// Catalog hierarchy flattened for the worksheet writer.
#[derive(Debug, Clone)]
pub struct ExportMenu {
    pub title: String,
    pub description: String,
    pub submenus: Vec<ExportSubmenu>,
}

#[derive(Debug, Clone)]
pub struct ExportSubmenu {
    pub title: String,
    pub description: String,
    pub dishes: Vec<ExportDish>,
}

#[derive(Debug, Clone)]
pub struct ExportDish {
    pub title: String,
    pub description: String,
    pub price: f64,
}

impl ExcelService {
    pub fn new(repository: Arc<Repository>, export_dir: PathBuf) -> Self {
        Self {
            repository,
            export_dir,
        }
    }

    /// Snapshots the catalog and writes it to `{export_dir}/{file_id}.xlsx`.
    pub async fn generate(&self) -> Result<Uuid, ApiError> {
        let menus = self
            .repository
            .list_menus()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let submenus = self
            .repository
            .all_submenus()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let dishes = self
            .repository
            .all_dishes()
            .await
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let export = group_catalog(menus, submenus, dishes);

        let file_id = Uuid::new_v4();
        let path = self.file_path(file_id);

        tokio::fs::create_dir_all(&self.export_dir)
            .await
            .map_err(|e| ApiError::InternalError(format!("export dir: {e}")))?;

        // rust_xlsxwriter is synchronous file IO
        let write_path = path.clone();
        tokio::task::spawn_blocking(move || write_workbook(&write_path, &export))
            .await
            .map_err(|e| ApiError::InternalError(e.to_string()))?
            .map_err(|e| ApiError::InternalError(format!("xlsx write: {e}")))?;

        info!("Generated catalog export {}", path.display());

        Ok(file_id)
    }

    pub fn file_path(&self, file_id: Uuid) -> PathBuf {
        self.export_dir.join(format!("{file_id}.xlsx"))
    }
}

fn group_catalog(menus: Vec<Menu>, submenus: Vec<Submenu>, dishes: Vec<Dish>) -> Vec<ExportMenu> {
    let mut dishes_by_submenu: HashMap<Uuid, Vec<ExportDish>> = HashMap::new();
    for dish in dishes {
        dishes_by_submenu
            .entry(dish.submenu_id)
            .or_default()
            .push(ExportDish {
                title: dish.title,
                description: dish.description,
                price: dish.price,
            });
    }

    let mut submenus_by_menu: HashMap<Uuid, Vec<ExportSubmenu>> = HashMap::new();
    for submenu in submenus {
        let dishes = dishes_by_submenu.remove(&submenu.id).unwrap_or_default();
        submenus_by_menu
            .entry(submenu.menu_id)
            .or_default()
            .push(ExportSubmenu {
                title: submenu.title,
                description: submenu.description,
                dishes,
            });
    }

    menus
        .into_iter()
        .map(|menu| ExportMenu {
            submenus: submenus_by_menu.remove(&menu.id).unwrap_or_default(),
            title: menu.title,
            description: menu.description,
        })
        .collect()
}

/// One sheet, hierarchy expressed by column offset: menus in column A,
/// submenus indented one column, dishes two, price in the last column.
fn write_workbook(path: &Path, menus: &[ExportMenu]) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name("Menu")?;

    let mut row: u32 = 0;
    for (menu_idx, menu) in menus.iter().enumerate() {
        worksheet.write_number(row, 0, (menu_idx + 1) as f64)?;
        worksheet.write_string(row, 1, &menu.title)?;
        worksheet.write_string(row, 2, &menu.description)?;
        row += 1;

        for (submenu_idx, submenu) in menu.submenus.iter().enumerate() {
            worksheet.write_number(row, 1, (submenu_idx + 1) as f64)?;
            worksheet.write_string(row, 2, &submenu.title)?;
            worksheet.write_string(row, 3, &submenu.description)?;
            row += 1;

            for (dish_idx, dish) in submenu.dishes.iter().enumerate() {
                worksheet.write_number(row, 2, (dish_idx + 1) as f64)?;
                worksheet.write_string(row, 3, &dish.title)?;
                worksheet.write_string(row, 4, &dish.description)?;
                worksheet.write_number(row, 5, dish.price)?;
                row += 1;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_export() -> Vec<ExportMenu> {
        vec![ExportMenu {
            title: "Drinks".to_string(),
            description: "Hot and cold".to_string(),
            submenus: vec![ExportSubmenu {
                title: "Coffee".to_string(),
                description: "Espresso based".to_string(),
                dishes: vec![ExportDish {
                    title: "Latte".to_string(),
                    description: "With milk".to_string(),
                    price: 4.5,
                }],
            }],
        }]
    }

    #[test]
    fn grouping_attaches_children_to_their_parents() {
        use chrono::Utc;

        let menu_id = Uuid::new_v4();
        let other_menu_id = Uuid::new_v4();
        let submenu_id = Uuid::new_v4();
        let now = Utc::now();

        let menus = vec![
            Menu {
                id: menu_id,
                title: "m1".to_string(),
                description: "d1".to_string(),
                submenus_count: 1,
                dishes_count: 1,
                created_at: now,
            },
            Menu {
                id: other_menu_id,
                title: "m2".to_string(),
                description: "d2".to_string(),
                submenus_count: 0,
                dishes_count: 0,
                created_at: now,
            },
        ];
        let submenus = vec![Submenu {
            id: submenu_id,
            menu_id,
            title: "s1".to_string(),
            description: "sd1".to_string(),
            dishes_count: 1,
            created_at: now,
        }];
        let dishes = vec![Dish {
            id: Uuid::new_v4(),
            submenu_id,
            title: "dish".to_string(),
            description: "dd".to_string(),
            price: 9.99,
            created_at: now,
        }];

        let export = group_catalog(menus, submenus, dishes);

        assert_eq!(export.len(), 2);
        assert_eq!(export[0].submenus.len(), 1);
        assert_eq!(export[0].submenus[0].dishes.len(), 1);
        assert_eq!(export[0].submenus[0].dishes[0].price, 9.99);
        assert!(export[1].submenus.is_empty());
    }

    #[test]
    fn writes_workbook_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.xlsx");

        write_workbook(&path, &sample_export()).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn empty_catalog_still_produces_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        write_workbook(&path, &[]).unwrap();

        assert!(path.exists());
    }
}
