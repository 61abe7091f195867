// ABOUTME: Configuration module for the darsy application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::generator::GeneratorConfig;
use crate::pptx::PptxConfig;
use crate::render::PrintConfig;
use std::env;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 60000;
const DEFAULT_STORE_DIR: &str = ".darsy";

/// Global configuration for the application
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub request_timeout_ms: u64,
    pub store_dir: PathBuf,
    pub browser_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            store_dir: PathBuf::from(DEFAULT_STORE_DIR),
            browser_path: None,
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_base = env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let request_timeout_ms = env::var("REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let store_dir = env::var("DARSY_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_DIR));
        let browser_path = env::var("BROWSER_PATH").ok().filter(|p| !p.is_empty());

        Self {
            api_key,
            model,
            api_base,
            request_timeout_ms,
            store_dir,
            browser_path,
        }
    }

    /// Get a generator configuration, with an optional model override
    pub fn get_generator_config(&self, model: Option<String>) -> GeneratorConfig {
        GeneratorConfig {
            api_key: self.api_key.clone(),
            model: model.unwrap_or_else(|| self.model.clone()),
            api_base: self.api_base.clone(),
            timeout_ms: self.request_timeout_ms,
        }
    }

    /// Get a PPTX configuration with defaults
    pub fn get_pptx_config(&self, aspect_ratio: Option<String>) -> PptxConfig {
        PptxConfig {
            aspect_ratio: aspect_ratio.unwrap_or_else(|| "16:9".to_string()),
            timeout_ms: self.request_timeout_ms,
        }
    }

    /// Get a print configuration for document or certificate export
    pub fn get_print_config(&self, landscape: bool) -> PrintConfig {
        PrintConfig {
            landscape,
            timeout_ms: self.request_timeout_ms,
            browser_path: self.browser_path.clone(),
        }
    }
}
