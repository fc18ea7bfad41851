use super::error::ApiError;
use super::tags::{parse_tag_query, query_values};
use super::AppState;
use crate::dicom::{DicomFile, ElementLookup};
use axum::body::Body;
use axum::extract::{Multipart, Path, RawQuery, State};
use axum::response::{IntoResponse, Json, Response};
use http::header;
use image::ImageFormat;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Cursor;

const UPLOAD_FIELD: &str = "file";

#[derive(Serialize)]
pub struct ListResponse {
    #[serde(rename = "fileIds")]
    pub file_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct CreateResponse {
    #[serde(rename = "fileId")]
    pub file_id: String,
}

#[derive(Serialize)]
pub struct AttributesResponse {
    #[serde(rename = "elementsByTag")]
    pub elements_by_tag: Map<String, Value>,
}

/// `GET /api/v1/files`
pub async fn list_files(State(state): State<AppState>) -> Result<Json<ListResponse>, ApiError> {
    let file_ids = state.store.list().await?;
    Ok(Json(ListResponse { file_ids }))
}

/// `POST /api/v1/files` with a multipart `file` field
pub async fn create_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CreateResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        let file_id = uuid::Uuid::new_v4().to_string();
        let file = DicomFile::new(file_id.clone(), content.len() as u64, content);
        state.store.create(&file).await?;

        tracing::info!("stored file {} ({} bytes)", file_id, file.size());
        return Ok(Json(CreateResponse { file_id }));
    }

    Err(ApiError::BadRequest(format!(
        "multipart field '{}' is missing",
        UPLOAD_FIELD
    )))
}

/// `GET /api/v1/files/{id}` returns the file as uploaded
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.store.get(&id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/dicom".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.id()),
            ),
        ],
        Body::from(file.content()),
    )
        .into_response())
}

/// `GET /api/v1/files/{id}/png?remap=<bool>`
///
/// `remap` defaults to true when absent or unparseable.
pub async fn get_png(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let remap = query_values(query.as_deref(), "remap")
        .first()
        .and_then(|v| parse_bool(v))
        .unwrap_or(true);

    let file = state.store.get(&id).await?;

    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let image = file.image(remap)?;
        let mut buf = Cursor::new(Vec::new());
        image
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| ApiError::Internal(format!("png encode: {}", e)))?;
        Ok(buf.into_inner())
    })
    .await??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

/// `GET /api/v1/files/{id}/attributes?tag=(gggg,eeee)&tag=...`
///
/// Without tags every element is returned.
pub async fn search_attributes(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<AttributesResponse>, ApiError> {
    let tags = parse_tag_query(query.as_deref()).map_err(ApiError::BadRequest)?;
    let file = state.store.get(&id).await?;

    let elements_by_tag = tokio::task::spawn_blocking(move || -> Result<_, ApiError> {
        let lookup = if tags.is_empty() {
            file.all_elements()?
        } else {
            file.find_elements(&tags)?
        };
        lookup_to_json(&lookup)
    })
    .await??;

    Ok(Json(AttributesResponse { elements_by_tag }))
}

fn lookup_to_json(lookup: &ElementLookup) -> Result<Map<String, Value>, ApiError> {
    lookup
        .iter()
        .map(|(tag, element)| {
            let value = match element {
                Some(element) => dicom_json_tool::element_to_json_value(element)
                    .map_err(|e| ApiError::Internal(e.to_string()))?,
                None => Value::Null,
            };
            Ok((tag.clone(), value))
        })
        .collect()
}

/// `1`, `t`, `true` and `0`, `f`, `false`, in lower, upper or title case
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
