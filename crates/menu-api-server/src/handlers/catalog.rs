use crate::config::Settings;
use crate::database::Repository;
use crate::services::seed::{self, SeedReport};
use crate::services::ExcelService;
use crate::utils::error::ApiError;
use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Serialize)]
pub struct GenExcelResponse {
    pub file_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct GetExcelQuery {
    pub file_id: Uuid,
}

/// Seeds the catalog from the configured JSON fixture.
pub async fn fill_catalog(
    Extension(repository): Extension<Arc<Repository>>,
    Extension(settings): Extension<Arc<Settings>>,
) -> Result<(StatusCode, Json<SeedReport>), ApiError> {
    let fixture_path = PathBuf::from(&settings.catalog.fixture_path);

    let fixture = tokio::task::spawn_blocking(move || seed::load_fixture(&fixture_path))
        .await
        .map_err(|e| ApiError::InternalError(e.to_string()))?
        .map_err(|e| ApiError::InternalError(e.to_string()))?;

    let report = seed::seed_catalog(&repository, fixture)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(report)))
}

/// Writes a catalog snapshot to disk and hands back the id used to fetch it.
pub async fn gen_excel(
    Extension(excel_service): Extension<Arc<ExcelService>>,
) -> Result<(StatusCode, Json<GenExcelResponse>), ApiError> {
    let file_id = excel_service.generate().await?;

    info!("Catalog export ready, file_id={}", file_id);

    Ok((StatusCode::ACCEPTED, Json(GenExcelResponse { file_id })))
}

pub async fn get_excel(
    Extension(excel_service): Extension<Arc<ExcelService>>,
    Query(query): Query<GetExcelQuery>,
) -> Result<Response, ApiError> {
    let path = excel_service.file_path(query.file_id);

    let contents = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("file not found".to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"Menu.xlsx\"".to_string(),
        ),
    ];

    Ok((headers, contents).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_excel_query_rejects_non_uuid() {
        let result: Result<GetExcelQuery, _> =
            serde_json::from_str(r#"{"file_id": "not-a-uuid"}"#);

        assert!(result.is_err());
    }

    #[test]
    fn gen_excel_response_serializes_file_id() {
        let file_id = Uuid::new_v4();
        let body = serde_json::to_value(GenExcelResponse { file_id }).unwrap();

        assert_eq!(body["file_id"], serde_json::json!(file_id.to_string()));
    }
}
