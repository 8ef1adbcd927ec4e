//! Tag automation endpoint.
//!
//! Accepts a master product CSV and a ZIP of collection exports as
//! `multipart/form-data` and answers with the updated CSV as a download.

use axum::{
    Json, Router,
    body::Bytes,
    extract::Multipart,
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use shop_console_core::codec::{CsvCodec, ZipArchiveReader};
use shop_console_core::tagging::{
    DEFAULT_TAG_PREFIX, OUTPUT_FILE_NAME, RowGate, RunReport, TagAutomation, TagRunError,
    TagRunInput,
};
use tracing::instrument;

use super::method_not_allowed;
use crate::error::AppError;
use crate::state::AppState;

/// Response header carrying the run identifier.
pub const RUN_ID_HEADER: HeaderName = HeaderName::from_static("x-run-id");

/// Response header carrying the number of rows whose tags changed.
pub const UPDATED_ROWS_HEADER: HeaderName = HeaderName::from_static("x-updated-rows");

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/tag-automation",
        post(tag_automation).fallback(method_not_allowed),
    )
}

/// Form fields of a tag automation request.
#[derive(Debug, Default)]
struct TagForm {
    master: Option<Bytes>,
    archive: Option<Bytes>,
    prefix: Option<String>,
    tag_all_rows: bool,
}

impl TagForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let invalid = |e: axum::extract::multipart::MultipartError| {
                AppError::BadRequest(format!("Invalid form field {name}: {e}"))
            };
            match name.as_str() {
                "master" => form.master = Some(field.bytes().await.map_err(invalid)?),
                "archive" => form.archive = Some(field.bytes().await.map_err(invalid)?),
                "prefix" => form.prefix = Some(field.text().await.map_err(invalid)?),
                "tag_all_rows" => {
                    form.tag_all_rows = is_truthy(&field.text().await.map_err(invalid)?);
                }
                other => tracing::debug!(field = other, "Ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    const fn gate(&self) -> RowGate {
        if self.tag_all_rows {
            RowGate::AnyRow
        } else {
            RowGate::TitleOrTags
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim(), "true" | "1" | "on" | "yes")
}

/// Run tag automation on uploaded files.
///
/// POST /tag-automation
#[instrument(skip(multipart))]
async fn tag_automation(multipart: Multipart) -> Result<Response, AppError> {
    let form = TagForm::read(multipart).await?;
    let automation = TagAutomation::new(CsvCodec, ZipArchiveReader).with_gate(form.gate());

    let report = tokio::task::spawn_blocking(move || {
        let prefix = form.prefix.as_deref().unwrap_or(DEFAULT_TAG_PREFIX);
        automation.run(TagRunInput {
            master: form.master.as_deref(),
            archive: form.archive.as_deref(),
            prefix,
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("Tag automation task failed: {e}")))?;

    Ok(report_response(report))
}

/// Turn a finished run into a CSV download or a JSON failure.
fn report_response(report: RunReport) -> Response {
    let run_id = report.run_id.to_string();
    match report.output {
        Some(output) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{OUTPUT_FILE_NAME}\""),
                ),
                (RUN_ID_HEADER, run_id),
                (UPDATED_ROWS_HEADER, output.updated_count.to_string()),
            ],
            output.csv,
        )
            .into_response(),
        None => {
            let status = report
                .error
                .as_ref()
                .map_or(StatusCode::INTERNAL_SERVER_ERROR, failure_status);
            let message = report
                .error
                .as_ref()
                .map_or_else(|| "Tag automation failed".to_string(), ToString::to_string);
            (
                status,
                [(RUN_ID_HEADER, run_id)],
                Json(json!({
                    "error": message,
                    "phase": report.phase,
                    "log": report.log,
                })),
            )
                .into_response()
        }
    }
}

const fn failure_status(error: &TagRunError) -> StatusCode {
    if error.is_input_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_decode_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
