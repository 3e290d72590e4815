use crate::database::Repository;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Nested fixture shape consumed by the fill endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedMenu {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub submenus: Vec<SeedSubmenu>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSubmenu {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub dishes: Vec<SeedDish>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedDish {
    pub title: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub menus: usize,
    pub submenus: usize,
    pub dishes: usize,
}

pub fn load_fixture(path: &Path) -> Result<Vec<SeedMenu>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading fixture {}", path.display()))?;
    let menus: Vec<SeedMenu> =
        serde_json::from_str(&raw).with_context(|| format!("parsing fixture {}", path.display()))?;
    Ok(menus)
}

/// Inserts the fixture hierarchy top-down so foreign keys always resolve.
pub async fn seed_catalog(repository: &Repository, fixture: Vec<SeedMenu>) -> Result<SeedReport> {
    let mut report = SeedReport {
        menus: 0,
        submenus: 0,
        dishes: 0,
    };

    for menu in fixture {
        let inserted_menu = repository.insert_menu(&menu.title, &menu.description).await?;
        report.menus += 1;

        for submenu in menu.submenus {
            let inserted_submenu = repository
                .insert_submenu(inserted_menu.id, &submenu.title, &submenu.description)
                .await?;
            report.submenus += 1;

            for dish in submenu.dishes {
                repository
                    .insert_dish(inserted_submenu.id, &dish.title, &dish.description, dish.price)
                    .await?;
                report.dishes += 1;
            }
        }
    }

    info!(
        "Seeded catalog: {} menus, {} submenus, {} dishes",
        report.menus, report.submenus, report.dishes
    );

    Ok(report)
}
