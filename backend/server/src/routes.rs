use std::{sync::Arc, time::Instant};

use axum::{
    Json,
    extract::{
        FromRequest, Multipart, Request, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
};
use model::{DetectedObject, Source};
use serde::Serialize;
use serde_json::Value;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

use crate::{
    error::AppError,
    state::AppState,
    utils::{contact_submission, is_multipart, live_source, upload_filename},
};

pub const VIDEO_FIELD: &str = "video";

#[derive(Serialize)]
pub struct AnalysisResponse {
    pub detected_objects: Vec<DetectedObject>,
    #[serde(rename = "audioDescription")]
    pub audio_description: String,
    pub meta: Meta,
}

#[derive(Serialize)]
pub struct Meta {
    pub processing_time_ms: u64,
    pub source: &'static str,
    pub filename: Option<String>,
    pub timestamp: String,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Serialize)]
pub struct ContactResponse {
    pub status: Status,
    pub info: String,
}

pub async fn video_analysis_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = Instant::now();

    let source = if is_multipart(request.headers()) {
        upload_source(request).await?
    } else {
        let payload = Json::<Value>::from_request(request, &()).await;

        live_source(&json_or_empty(payload))
    };

    let kind = source.as_str();
    let filename = match &source {
        Source::Upload { filename } => filename.clone(),
        _ => None,
    };

    let analyzer = state.analyzer;
    let analysis = spawn_blocking(move || analyzer.analyze(&source))
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    info!(source = kind, processing_time_ms, "Video analysis served");

    #[cfg(feature = "verbose")]
    tracing::debug!(?analysis, "Analysis payload");

    Ok(Json(AnalysisResponse {
        detected_objects: analysis.detected_objects,
        audio_description: analysis.audio_description,
        meta: Meta {
            processing_time_ms,
            source: kind,
            filename,
            timestamp: analysis.timestamp,
        },
    }))
}

/// Only the name of the `video` part is kept, its bytes are read and discarded.
async fn upload_source(request: Request) -> Result<Source, AppError> {
    let mut multipart = Multipart::from_request(request, &()).await.map_err(|e| {
        warn!("Rejected multipart request: {e}");
        AppError::MalformedPayload
    })?;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }

        let Some(original) = field.file_name() else {
            continue;
        };
        let filename = upload_filename(original);

        // drained so the upload cap applies to the whole part
        while field.chunk().await.map_err(multipart_error)?.is_some() {}

        return Ok(Source::Upload {
            filename: Some(filename),
        });
    }

    Ok(Source::None)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload over the size limit: {e}");
        AppError::PayloadTooLarge
    } else {
        warn!("Malformed multipart body: {e}");
        AppError::MalformedPayload
    }
}

/// Non-JSON content types and unparsable bodies read as `{}`.
fn json_or_empty(payload: Result<Json<Value>, JsonRejection>) -> Value {
    match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            debug!("Treating body as empty: {rejection}");
            Value::Object(Default::default())
        }
    }
}

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let submission = contact_submission(&json_or_empty(payload));

    let desk = state.contact_desk;
    let outcome = spawn_blocking(move || desk.submit(&submission))
        .await
        .map_err(|e| AppError::InternalError(e.into()))?;

    let response = match outcome {
        Ok(info) => (
            StatusCode::OK,
            Json(ContactResponse {
                status: Status::Success,
                info,
            }),
        ),
        Err(rejection) => {
            info!(%rejection, "Contact rejected");

            (
                StatusCode::BAD_REQUEST,
                Json(ContactResponse {
                    status: Status::Error,
                    info: rejection.to_string(),
                }),
            )
        }
    };

    Ok(response)
}
