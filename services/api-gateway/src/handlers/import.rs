use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use orderdesk_models::{OrderRecord, Session};
use orderdesk_utils::OrderDeskError;
use serde::Serialize;

use crate::{middleware::ApiError, AppState};

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub order: OrderRecord,
    pub message: String,
}

/// Upload one XML order file as multipart field `file`.
pub async fn import_order(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<ImportResponse>), ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload
        .ok_or_else(|| OrderDeskError::validation("file", "Multipart field 'file' is required"))?;

    let order = state.imports.import(&session, &filename, &data).await?;
    let message = format!("Order \"{}\" imported successfully", order.order_number);

    Ok((StatusCode::CREATED, Json(ImportResponse { order, message })))
}
