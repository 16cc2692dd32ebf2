//! Vision locator configuration

use std::env;

use crate::errors::{OverlayError, Result};

/// Available vision models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisionModel {
    /// Gemini 2.5 Flash - fast enough for interactive highlighting
    Gemini25Flash,
    /// Gemini 2.5 Pro - more capable, slower
    Gemini25Pro,
}

impl VisionModel {
    /// Get the model name for API requests
    pub fn model_name(&self) -> &'static str {
        match self {
            VisionModel::Gemini25Flash => "gemini-2.5-flash",
            VisionModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }

    /// Get the full endpoint path for the model
    pub fn endpoint(&self) -> String {
        format!("models/{}:generateContent", self.model_name())
    }
}

impl std::fmt::Display for VisionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model_name())
    }
}

/// Vision locator configuration
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// API key for Google AI
    pub api_key: String,
    /// Model to use for element location
    pub model: VisionModel,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Maximum number of retries
    pub max_retries: u32,
    /// Rate limit in requests per minute
    pub rate_limit_rpm: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: VisionModel::Gemini25Flash,
            timeout_seconds: 30,
            max_retries: 3,
            rate_limit_rpm: 60,
        }
    }
}

impl VisionConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| OverlayError::Configuration("GEMINI_API_KEY not set".to_string()))?;

        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let model = Self::parse_model(&model)?;

        let timeout_seconds = env::var("GEMINI_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|_| {
                OverlayError::Configuration("Invalid GEMINI_TIMEOUT_SECONDS".to_string())
            })?;

        let max_retries = env::var("GEMINI_MAX_RETRIES")
            .unwrap_or_else(|_| "3".to_string())
            .parse()
            .map_err(|_| OverlayError::Configuration("Invalid GEMINI_MAX_RETRIES".to_string()))?;

        let rate_limit_rpm = env::var("GEMINI_RATE_LIMIT_RPM")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|_| {
                OverlayError::Configuration("Invalid GEMINI_RATE_LIMIT_RPM".to_string())
            })?;

        Ok(Self {
            api_key,
            model,
            timeout_seconds,
            max_retries,
            rate_limit_rpm,
        })
    }

    /// Parse a model string to the VisionModel enum
    fn parse_model(model_str: &str) -> Result<VisionModel> {
        match model_str {
            "gemini-2.5-flash" => Ok(VisionModel::Gemini25Flash),
            "gemini-2.5-pro" => Ok(VisionModel::Gemini25Pro),
            _ => Err(OverlayError::Configuration(format!(
                "Unknown vision model: {model_str}. Supported models: gemini-2.5-flash, gemini-2.5-pro"
            ))),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(OverlayError::Configuration(
                "API key cannot be empty".to_string(),
            ));
        }

        if !self.api_key.starts_with("AIza") {
            return Err(OverlayError::Configuration(
                "Invalid API key format (should start with 'AIza')".to_string(),
            ));
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(OverlayError::Configuration(
                "Timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(OverlayError::Configuration(
                "Max retries must be between 1 and 10".to_string(),
            ));
        }

        if self.rate_limit_rpm == 0 || self.rate_limit_rpm > 1000 {
            return Err(OverlayError::Configuration(
                "Rate limit must be between 1 and 1000 RPM".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the base URL for the API
    pub fn base_url(&self) -> &'static str {
        "https://generativelanguage.googleapis.com/v1beta"
    }

    /// Get the full URL for an endpoint
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}?key={}", self.base_url(), endpoint, self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_sane_config() {
        let config = VisionConfig {
            api_key: "AIzaValidKey".to_string(),
            ..VisionConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_key_and_bounds() {
        let mut config = VisionConfig {
            api_key: "InvalidKey".to_string(),
            ..VisionConfig::default()
        };
        assert!(config.validate().is_err());

        config.api_key = "AIzaValidKey".to_string();
        config.timeout_seconds = 0;
        assert!(config.validate().is_err());

        config.timeout_seconds = 30;
        config.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_model_endpoint() {
        assert_eq!(
            VisionModel::Gemini25Flash.endpoint(),
            "models/gemini-2.5-flash:generateContent"
        );
    }
}
