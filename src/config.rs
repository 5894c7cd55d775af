use std::{env, path::PathBuf};

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BODY_LIMIT_MB: usize = 5;
const DEFAULT_MODEL_PATH: &str = "./model/coffee_disease_model.pb";
const DEFAULT_TRANSLATIONS_PATH: &str = "./translations.json";

/// Startup settings, read once from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub body_limit_bytes: usize,
    pub model_path: PathBuf,
    pub model_input_op: String,
    pub model_output_op: String,
    pub translations_path: PathBuf,
    pub model_url: Option<String>,
    pub translations_url: Option<String>,
    pub github_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let body_limit_bytes = match lookup("BODY_LIMIT_MB") {
            Some(value) => {
                let invalid = |value| ConfigError::Invalid {
                    name: "BODY_LIMIT_MB",
                    expected: "a valid integer number of megabytes",
                    value,
                };
                match value.parse::<usize>() {
                    Ok(mb) => mb
                        .checked_mul(1024 * 1024)
                        .ok_or_else(|| invalid(value))?,
                    Err(_) => return Err(invalid(value)),
                }
            }
            None => DEFAULT_BODY_LIMIT_MB * 1024 * 1024,
        };

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid number between 0 and 65535",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Ok(Config {
            port,
            body_limit_bytes,
            model_path: non_empty("MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.into())
                .into(),
            model_input_op: non_empty("MODEL_INPUT_OP").unwrap_or_else(|| "x".into()),
            model_output_op: non_empty("MODEL_OUTPUT_OP").unwrap_or_else(|| "Identity".into()),
            translations_path: non_empty("TRANSLATIONS_PATH")
                .unwrap_or_else(|| DEFAULT_TRANSLATIONS_PATH.into())
                .into(),
            model_url: non_empty("MODEL_URL"),
            translations_url: non_empty("TRANSLATIONS_URL"),
            github_token: non_empty("GITHUB_TOKEN"),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.body_limit_bytes, 5 * 1024 * 1024);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.model_input_op, "x");
        assert_eq!(config.model_output_op, "Identity");
        assert_eq!(config.translations_path, PathBuf::from("./translations.json"));
        assert!(config.model_url.is_none());
        assert!(config.github_token.is_none());
    }

    #[test]
    fn overrides_are_honoured() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("BODY_LIMIT_MB", "12"),
            ("MODEL_PATH", "/models/leaf.pb"),
            ("MODEL_URL", "https://example.com/leaf.pb"),
            ("TRANSLATIONS_URL", "  "),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.body_limit_bytes, 12 * 1024 * 1024);
        assert_eq!(config.model_path, PathBuf::from("/models/leaf.pb"));
        assert_eq!(config.model_url.as_deref(), Some("https://example.com/leaf.pb"));
        assert!(config.translations_url.is_none());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = config_from(&[("PORT", "70000")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = config_from(&[("BODY_LIMIT_MB", "five")]).unwrap_err();
        assert!(err.to_string().contains("BODY_LIMIT_MB"));
    }

    #[test]
    fn body_limit_that_overflows_is_rejected() {
        let huge = usize::MAX.to_string();
        let err = config_from(&[("BODY_LIMIT_MB", huge.as_str())]).unwrap_err();
        assert!(err.to_string().contains("BODY_LIMIT_MB"));
    }
}
