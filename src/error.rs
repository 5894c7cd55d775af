use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of one stage of the prediction pipeline.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Invalid image format or corrupted file.")]
    InvalidImage,

    #[error("Inference failed: {0}")]
    Inference(String),

    /// The model produced more classes than the label table knows about.
    #[error("predicted index {index} is out of bounds for {labels} class labels")]
    IndexOutOfBounds { index: usize, labels: usize },
}

/// Everything `/predict` can answer with besides a prediction.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Malformed multipart request: {0}")]
    MalformedUpload(String),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("prediction worker failed: {0}")]
    Worker(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::NoFileUploaded | ApiError::NoSelectedFile | ApiError::MalformedUpload(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::Predict(PredictError::IndexOutOfBounds { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Predicted index out of bounds.",
                    "details": self.to_string(),
                }),
            ),
            ApiError::Predict(_) | ApiError::Worker(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": "Internal Server Error",
                    "details": self.to_string(),
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("model file {0} not found")]
    NotFound(String),

    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("tensorflow: {0}")]
    TensorFlow(String),
}

impl From<tensorflow::Status> for ModelError {
    fn from(status: tensorflow::Status) -> Self {
        ModelError::TensorFlow(status.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download of {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid GITHUB_TOKEN header value")]
    InvalidToken,
}
