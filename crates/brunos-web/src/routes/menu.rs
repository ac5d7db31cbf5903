//! Menu image handlers.
//!
//! The menu is a single image on disk; uploading a new one tells every
//! display to reload it.

use std::path::Path;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::state::AppState;

pub const MENU_IMAGE: &str = "menu.jpg";

#[derive(Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub success: bool,
}

impl UploadResponse {
    fn new(message: impl Into<String>, success: bool) -> Json<Self> {
        Json(Self {
            message: message.into(),
            success,
        })
    }
}

fn content_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// GET /api/menu/image
pub async fn get_image(State(state): State<AppState>) -> Response {
    let path = state.upload_dir.join(MENU_IMAGE);
    debug!(path = %path.display(), "Fetching menu image");

    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, content_type_for(&path).to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", MENU_IMAGE),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Menu image not found");
            StatusCode::NOT_FOUND.into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read menu image");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// POST /api/menu/upload - multipart field `image`.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let mut image = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("image") => {
                info!(file_name = ?field.file_name(), "Uploading menu image");
                match field.bytes().await {
                    Ok(bytes) => image = Some(bytes),
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            UploadResponse::new(format!("Upload failed: {}", e), false),
                        )
                    }
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    UploadResponse::new(format!("Upload failed: {}", e), false),
                )
            }
        }
    }

    let Some(image) = image.filter(|b| !b.is_empty()) else {
        return (StatusCode::BAD_REQUEST, UploadResponse::new("Missing file", false));
    };

    if let Err(e) = store_image(&state.upload_dir, &image).await {
        warn!(error = %e, "Menu image upload failed");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            UploadResponse::new(format!("Upload failed: {}", e), false),
        );
    }

    state.orders.menu_updated().await;
    (StatusCode::OK, UploadResponse::new("Upload succeeded", true))
}

async fn store_image(upload_dir: &Path, image: &[u8]) -> std::io::Result<()> {
    if !tokio::fs::try_exists(upload_dir).await? {
        info!(path = %upload_dir.display(), "Creating upload directory");
        tokio::fs::create_dir_all(upload_dir).await?;
    }
    tokio::fs::write(upload_dir.join(MENU_IMAGE), image).await
}
