use crate::core::fetcher::{ApiKey, DEFAULT_TIMEOUT_SECONDS};
use crate::domain::model::{EndpointConfig, ResponseDescriptor, TranscribeMode};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://api.walmartlabs.com/v1";
pub const DEFAULT_API_KEY_PARAM: &str = "apiKey";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub fetch: FetchConfig,
    pub transcribe: TranscribeConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    pub base_url: Option<String>,
    pub output_dir: String,
    pub api_key: Option<String>,
    pub api_key_param: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    pub input_dir: String,
    pub workbook: String,
    #[serde(default)]
    pub responses: Vec<ResponseDescriptor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl CatalogConfig {
    /// Loads and parses a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration document after `${VAR}` substitution.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CatalogError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written so validation can name them.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = env_var_pattern()?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn base_url(&self) -> &str {
        self.fetch.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// Configured endpoints, or the four demo queries under `base_url`.
    pub fn endpoints(&self) -> Vec<EndpointConfig> {
        if self.fetch.endpoints.is_empty() {
            EndpointConfig::builtins(self.base_url())
        } else {
            self.fetch.endpoints.clone()
        }
    }

    /// Configured response layouts, or the four demo layouts.
    pub fn responses(&self) -> Vec<ResponseDescriptor> {
        if self.transcribe.responses.is_empty() {
            ResponseDescriptor::builtins()
        } else {
            self.transcribe.responses.clone()
        }
    }

    pub fn api_key(&self) -> Option<ApiKey> {
        let value = self.fetch.api_key.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        Some(ApiKey {
            param: self
                .fetch
                .api_key_param
                .clone()
                .unwrap_or_else(|| DEFAULT_API_KEY_PARAM.to_string()),
            value: value.to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    pub fn output_dir(&self) -> &str {
        &self.fetch.output_dir
    }

    pub fn input_dir(&self) -> &str {
        &self.transcribe.input_dir
    }

    pub fn workbook_path(&self) -> PathBuf {
        PathBuf::from(&self.transcribe.workbook)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// Checks everything the fetch phase needs.
    pub fn validate_fetch(&self) -> Result<()> {
        validation::validate_path("fetch.output_dir", &self.fetch.output_dir)?;

        if let Some(base_url) = &self.fetch.base_url {
            validation::validate_url("fetch.base_url", base_url)?;
        }

        if let Some(timeout) = self.fetch.timeout_seconds {
            validation::validate_range("fetch.timeout_seconds", timeout, 1, 600)?;
        }

        if let Some(param) = &self.fetch.api_key_param {
            validation::validate_non_empty_string("fetch.api_key_param", param)?;
        }

        if let Some(key) = &self.fetch.api_key {
            if let Some(var) = unresolved_var(key)? {
                return Err(CatalogError::MissingConfigError {
                    field: format!("fetch.api_key (environment variable {} is not set)", var),
                });
            }
        }

        let endpoints = self.endpoints();
        for (index, endpoint) in endpoints.iter().enumerate() {
            validation::validate_url(&format!("fetch.endpoints[{}].url", index), &endpoint.url)?;
            validation::validate_non_empty_string(
                &format!("fetch.endpoints[{}].file_name", index),
                &endpoint.file_name,
            )?;
            for (name, value) in &endpoint.parameters {
                if crate::domain::model::scalar_to_query(value).is_none() {
                    return Err(CatalogError::InvalidConfigValueError {
                        field: format!("fetch.endpoints[{}].parameters.{}", index, name),
                        value: value.to_string(),
                        reason: "Query parameters must be scalars".to_string(),
                    });
                }
            }
        }
        validation::validate_unique(
            "fetch.endpoints.file_name",
            endpoints.iter().map(|e| e.file_name.as_str()),
        )?;

        Ok(())
    }

    /// Checks everything the transcription phase needs.
    pub fn validate_transcribe(&self) -> Result<()> {
        validation::validate_path("transcribe.input_dir", &self.transcribe.input_dir)?;
        validation::validate_path("transcribe.workbook", &self.transcribe.workbook)?;
        validation::validate_file_extension(
            "transcribe.workbook",
            &self.transcribe.workbook,
            &["xlsx", "xlsm"],
        )?;

        let responses = self.responses();
        for (index, response) in responses.iter().enumerate() {
            let field = |name: &str| format!("transcribe.responses[{}].{}", index, name);

            validation::validate_non_empty_string(&field("file_name"), &response.file_name)?;
            validation::validate_non_empty_string(&field("sheet_name"), &response.sheet_name)?;
            validation::validate_positive_number(
                &field("start_row"),
                u64::from(response.start_row),
                1,
            )?;

            let header_rows = response.header_attributes.len() as u64;
            if u64::from(response.start_row) <= header_rows {
                return Err(CatalogError::InvalidConfigValueError {
                    field: field("start_row"),
                    value: response.start_row.to_string(),
                    reason: format!(
                        "Body would overlap the {} header attribute rows; use at least {}",
                        header_rows,
                        header_rows + 1
                    ),
                });
            }

            if response.mode == TranscribeMode::Walk && response.dump_key.is_some() {
                return Err(CatalogError::InvalidConfigValueError {
                    field: field("dump_key"),
                    value: response.dump_key.clone().unwrap_or_default(),
                    reason: "dump_key only applies to dump mode".to_string(),
                });
            }
        }

        validation::validate_unique(
            "transcribe.responses.sheet_name",
            responses.iter().map(|r| r.sheet_name.as_str()),
        )?;

        Ok(())
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        self.validate_fetch()?;
        self.validate_transcribe()
    }
}

fn env_var_pattern() -> Result<Regex> {
    Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigValidationError {
        field: "environment".to_string(),
        message: e.to_string(),
    })
}

fn unresolved_var(value: &str) -> Result<Option<String>> {
    Ok(env_var_pattern()?
        .captures(value)
        .map(|caps| caps[1].to_string()))
}
