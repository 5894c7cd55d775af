use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection}, DefaultBodyLimit, Multipart,
        State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::{ApiError, PredictError},
    labels,
    model::Classifier,
    preprocess::preprocess_image,
    translations::Translations,
};

/// Everything a request needs, built once at startup and never mutated.
pub struct AppState {
    pub classifier: Box<dyn Classifier>,
    pub translations: Translations,
    pub labels: &'static [&'static str],
}

#[derive(Serialize, Debug)]
pub struct PredictResponse {
    class: String,
    translations: Map<String, Value>,
}

pub fn router(state: Arc<AppState>, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Pulls the bytes of the `file` part out of the form.
async fn read_upload(multipart: Result<Multipart, MultipartRejection>) -> Result<Vec<u8>, ApiError> {
    let Ok(mut multipart) = multipart else {
        tracing::warn!("No file part in request");
        return Err(ApiError::NoFileUploaded);
    };

    let malformed = |err: MultipartError| {
        tracing::warn!("Malformed multipart request: {}", err);
        ApiError::MalformedUpload(err.to_string())
    };

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        // Parts without a filename are plain form values, not uploads.
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if file_name.is_empty() {
            tracing::warn!("Empty filename");
            return Err(ApiError::NoSelectedFile);
        }

        tracing::info!("File received: {}", file_name);
        return Ok(field.bytes().await.map_err(malformed)?.to_vec());
    }

    tracing::warn!("No file part in request");
    Err(ApiError::NoFileUploaded)
}

fn classify_upload(state: &AppState, image_data: &[u8]) -> Result<&'static str, PredictError> {
    let input = preprocess_image(image_data)?;
    let scores = state.classifier.classify(&input)?;
    labels::resolve(&scores, state.labels)
}

async fn predict_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    tracing::info!("Received request at /predict");

    let image_data = read_upload(multipart).await?;

    let worker_state = Arc::clone(&state);
    let predicted_class =
        tokio::task::spawn_blocking(move || classify_upload(&worker_state, &image_data))
            .await
            .map_err(|err| {
                tracing::error!("Prediction worker failed: {:?}", err);
                ApiError::Worker(err.to_string())
            })?
            .map_err(|err| {
                tracing::error!("Error in /predict: {:?}", err);
                ApiError::from(err)
            })?;

    tracing::info!("Predicted class: {}", predicted_class);

    let translations = state.translations.get(predicted_class);
    tracing::debug!("Translations fetched: {:?}", translations);

    Ok(Json(PredictResponse {
        class: predicted_class.to_string(),
        translations,
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
