// src/utils/config.rs

use crate::api::client::GeminiSettings;
use crate::api::config::{BASE_URL, DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_MODEL};
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

/// Overrides the location of `config.toml`.
pub const CONFIG_PATH_ENV: &str = "FRAME2CODE_CONFIG";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub log_level: String,
    pub output_directory: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_key: None,
            log_level: "off".to_string(),
            output_directory: "./".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout_secs: 300,
        }
    }
}

impl Config {
    /// Settings for the Gemini client derived from this config.
    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: BASE_URL.to_string(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf, AppError> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let mut path = get_executable_dir()?;
    path.push("config.toml");
    Ok(path)
}

/// Validate config to prevent obviously wrong or missing values.
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    if config.model.trim().is_empty() {
        return Err(AppError::InvalidInput("Model cannot be empty".to_string()));
    }
    if config.temperature < 0.0 || config.temperature > 2.0 {
        return Err(AppError::InvalidInput(
            "Temperature must be between 0.0 and 2.0".to_string(),
        ));
    }
    if config.max_output_tokens == 0 {
        return Err(AppError::InvalidInput(
            "Max output tokens cannot be zero".to_string(),
        ));
    }
    if config.timeout_secs == 0 {
        return Err(AppError::InvalidInput(
            "Timeout cannot be zero".to_string(),
        ));
    }
    if !Path::new(&config.output_directory).is_dir() {
        return Err(AppError::InvalidInput(format!(
            "Output directory does not exist: {}",
            config.output_directory
        )));
    }
    Ok(())
}

/// Read config from file, and create a default config if none exists.
pub fn read_config() -> Result<Config, AppError> {
    read_config_from(&get_config_path()?)
}

pub fn read_config_from(config_path: &Path) -> Result<Config, AppError> {
    if !config_path.exists() {
        write_config_to(&Config::default(), config_path)?;
    }
    let config_str = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&config_str)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn write_config(config: &Config) -> Result<(), AppError> {
    write_config_to(config, &get_config_path()?)
}

pub fn write_config_to(config: &Config, config_path: &Path) -> Result<(), AppError> {
    let config_str = toml::to_string(config)?;
    fs::write(config_path, config_str)?;
    Ok(())
}

fn get_executable_dir() -> Result<PathBuf, AppError> {
    let exe = env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        AppError::InvalidInput(format!("Executable has no parent: {}", exe.display()))
    })
}
