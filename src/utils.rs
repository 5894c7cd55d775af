use std::path::Path;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use crate::{config::Config, error::FetchError};

async fn download_file(url: &str, path: &Path, token: Option<&str>) -> Result<(), FetchError> {
    tracing::info!("Downloading {} from {}", path.display(), url);

    let mut header_map = HeaderMap::new();
    if let Some(token) = token {
        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| FetchError::InvalidToken)?;
        header_map.insert(AUTHORIZATION, auth_value);
    }
    header_map.insert(ACCEPT, HeaderValue::from_static("application/octet-stream"));

    let request_error = |source| FetchError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .headers(header_map)
        .send()
        .await
        .map_err(request_error)?;

    if !response.status().is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: response.status(),
        });
    }

    let bytes = response.bytes().await.map_err(request_error)?;

    let write_error = |source| FetchError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(path, bytes).await.map_err(write_error)?;

    Ok(())
}

/// Fetches the model and translation files when they are missing locally and a
/// download URL is configured. A failed model download is an error; a failed
/// translations download only degrades to an empty translation set.
pub async fn ensure_files_exist(config: &Config) -> Result<(), FetchError> {
    tracing::info!("Checking model...");
    if !config.model_path.exists() {
        if let Some(model_url) = &config.model_url {
            download_file(model_url, &config.model_path, config.github_token.as_deref()).await?;
        }
    }

    if !config.translations_path.exists() {
        if let Some(translations_url) = &config.translations_url {
            if let Err(err) = download_file(
                translations_url,
                &config.translations_path,
                config.github_token.as_deref(),
            )
            .await
            {
                tracing::warn!("Could not fetch translations: {}", err);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn present_files_are_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.pb");
        let translations_path = dir.path().join("translations.json");
        std::fs::write(&model_path, b"graph").unwrap();
        std::fs::write(&translations_path, b"{}").unwrap();

        let mut config = Config::from_lookup(|_| None).unwrap();
        config.model_path = model_path.clone();
        config.translations_path = translations_path;
        // Unroutable URL: any download attempt would fail.
        config.model_url = Some("http://127.0.0.1:9/model.pb".into());

        ensure_files_exist(&config).await.unwrap();
        assert_eq!(std::fs::read(model_path).unwrap(), b"graph");
    }

    #[tokio::test]
    async fn missing_files_without_urls_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.model_path = dir.path().join("absent.pb");
        config.translations_path = dir.path().join("absent.json");

        ensure_files_exist(&config).await.unwrap();
        assert!(!config.model_path.exists());
    }

    #[tokio::test]
    async fn failed_model_download_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.model_path = dir.path().join("absent.pb");
        config.translations_path = dir.path().join("absent.json");
        config.model_url = Some("http://127.0.0.1:9/model.pb".into());

        let err = ensure_files_exist(&config).await.unwrap_err();
        assert!(matches!(err, FetchError::Request { .. }));
    }
}
