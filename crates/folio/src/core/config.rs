//! Configuration loading and management.
//!
//! [`ExtractionConfig`] can be loaded from TOML, YAML or JSON files, discovered
//! from a `folio.toml` in the current directory or any parent, or built in code.

use crate::pdf::PageRenderOptions;
use crate::{FolioError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the default plaintext cache directory.
pub const CACHE_DIR_ENV: &str = "FOLIO_CACHE_DIR";
/// Overrides the default OCR model directory.
pub const MODEL_DIR_ENV: &str = "FOLIO_MODEL_DIR";

const CONFIG_FILE_NAME: &str = "folio.toml";

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use folio::core::config::{ExtractionConfig, ExtractionStrategy};
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.strategy, ExtractionStrategy::Standard);
///
/// // let config = ExtractionConfig::from_toml_file("folio.toml")?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// How pages are turned into text
    #[serde(default)]
    pub strategy: ExtractionStrategy,

    /// OCR fallback configuration (None = blank pages are kept as-is)
    #[serde(default = "default_ocr")]
    pub ocr: Option<OcrConfig>,

    /// Plaintext cache configuration (None = no cache lookups or write-back)
    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Rasterization options for OCR pages
    #[serde(default)]
    pub render: PageRenderOptions,

    /// Upper bound for a whole extraction on the async entry point
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Page extraction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Native text layer first, OCR only for blank pages
    #[default]
    Standard,
    /// Every page goes through OCR
    OcrOnly,
}

/// OCR fallback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Set to false to disable OCR from a config file
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Language codes passed to the OCR engine
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,

    /// Directory holding model artifacts (None = `FOLIO_MODEL_DIR` or `.folio/models`)
    #[serde(default)]
    pub model_dir: Option<PathBuf>,

    /// Detection model file inside `model_dir` (None = the directory itself)
    #[serde(default)]
    pub detection_model_file: Option<String>,

    /// Upper bound for one OCR call
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Plaintext cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory (None = `FOLIO_CACHE_DIR` or `.folio/plaintext`)
    #[serde(default)]
    pub dir: Option<PathBuf>,

    /// Store the extracted text under the cache key after a miss
    #[serde(default = "default_true")]
    pub write_back: bool,

    /// Entries older than this are treated as misses
    #[serde(default)]
    pub max_age_days: Option<f64>,
}

fn default_true() -> bool {
    true
}
fn default_languages() -> Vec<String> {
    vec!["zh".to_string()]
}
fn default_ocr() -> Option<OcrConfig> {
    Some(OcrConfig::default())
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).filter(|value| !value.is_empty()).map(PathBuf::from)
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::Standard,
            ocr: default_ocr(),
            cache: None,
            render: PageRenderOptions::default(),
            timeout_secs: None,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            languages: default_languages(),
            model_dir: None,
            detection_model_file: None,
            timeout_secs: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            write_back: true,
            max_age_days: None,
        }
    }
}

impl OcrConfig {
    /// Model directory: explicit setting, then `FOLIO_MODEL_DIR`, then
    /// `.folio/models` under the working directory.
    pub fn resolved_model_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.model_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = env_dir(MODEL_DIR_ENV) {
            return Ok(dir);
        }
        Ok(std::env::current_dir()?.join(".folio").join("models"))
    }

    /// Path handed to `OcrBackend::load_detection_model`.
    pub fn detection_model_path(&self) -> Result<PathBuf> {
        let dir = self.resolved_model_dir()?;
        Ok(match &self.detection_model_file {
            Some(file) => dir.join(file),
            None => dir,
        })
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl CacheConfig {
    /// Cache directory: explicit setting, then `FOLIO_CACHE_DIR`, then
    /// `.folio/plaintext` under the working directory.
    pub fn resolved_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = env_dir(CACHE_DIR_ENV) {
            return Ok(dir);
        }
        Ok(std::env::current_dir()?.join(".folio").join("plaintext"))
    }
}

impl ExtractionConfig {
    /// The OCR configuration, if OCR is enabled.
    pub fn ocr_config(&self) -> Option<&OcrConfig> {
        self.ocr.as_ref().filter(|ocr| ocr.enabled)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Check option combinations that cannot work at extraction time.
    pub fn validate(&self) -> Result<()> {
        if self.strategy == ExtractionStrategy::OcrOnly && self.ocr_config().is_none() {
            return Err(FolioError::validation(
                "The ocr_only strategy requires OCR to be enabled",
            ));
        }
        if let Some(ocr) = self.ocr_config()
            && ocr.languages.is_empty()
        {
            return Err(FolioError::validation("OCR languages must not be empty"));
        }
        if let Some(ocr) = self.ocr_config()
            && ocr.timeout_secs == Some(0)
        {
            return Err(FolioError::validation("ocr.timeout_secs must be greater than zero"));
        }
        if self.timeout_secs == Some(0) {
            return Err(FolioError::validation("timeout_secs must be greater than zero"));
        }
        if self.render.min_dpi > self.render.max_dpi {
            return Err(FolioError::validation(format!(
                "render.min_dpi ({}) exceeds render.max_dpi ({})",
                self.render.min_dpi, self.render.max_dpi
            )));
        }
        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Validation` if the file can't be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FolioError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FolioError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            FolioError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| FolioError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration picking the format from the file extension (TOML by default).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Search for `folio.toml` in the current directory and its parents.
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(FolioError::Io)?;

        loop {
            let folio_toml = current.join(CONFIG_FILE_NAME);
            if folio_toml.exists() {
                return Ok(Some(Self::from_toml_file(folio_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ExtractionConfig::default();
        assert_eq!(config.strategy, ExtractionStrategy::Standard);
        let ocr = config.ocr_config().unwrap();
        assert_eq!(ocr.languages, vec!["zh".to_string()]);
        assert!(config.cache.is_none());
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(
            &config_path,
            r#"
strategy = "ocr_only"
timeout_secs = 120

[ocr]
languages = ["en", "de"]
model_dir = "/opt/models"
detection_model_file = "det.onnx"
timeout_secs = 30

[cache]
dir = "/var/cache/folio"
write_back = false

[render]
target_dpi = 200
"#,
        )
        .unwrap();

        let config = ExtractionConfig::from_toml_file(&config_path).unwrap();
        assert_eq!(config.strategy, ExtractionStrategy::OcrOnly);
        assert_eq!(config.timeout(), Some(Duration::from_secs(120)));

        let ocr = config.ocr_config().unwrap();
        assert_eq!(ocr.languages, vec!["en".to_string(), "de".to_string()]);
        assert_eq!(ocr.detection_model_path().unwrap(), PathBuf::from("/opt/models/det.onnx"));
        assert_eq!(ocr.timeout(), Some(Duration::from_secs(30)));

        let cache = config.cache.as_ref().unwrap();
        assert!(!cache.write_back);
        assert_eq!(cache.resolved_dir().unwrap(), PathBuf::from("/var/cache/folio"));

        assert_eq!(config.render.target_dpi, 200);
        assert_eq!(config.render.max_dpi, 600);
    }

    #[test]
    fn test_ocr_can_be_disabled_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(&config_path, "[ocr]\nenabled = false\n").unwrap();

        let config = ExtractionConfig::from_toml_file(&config_path).unwrap();
        assert!(config.ocr_config().is_none());
    }

    #[test]
    fn test_from_yaml_and_json_files() {
        let dir = tempdir().unwrap();

        let yaml_path = dir.path().join("folio.yaml");
        fs::write(&yaml_path, "cache:\n  max_age_days: 7.5\n").unwrap();
        let config = ExtractionConfig::from_file(&yaml_path).unwrap();
        let cache = config.cache.unwrap();
        assert!(cache.write_back);
        assert_eq!(cache.max_age_days, Some(7.5));

        let json_path = dir.path().join("folio.json");
        fs::write(&json_path, r#"{"ocr": {"languages": ["ja"]}}"#).unwrap();
        let config = ExtractionConfig::from_file(&json_path).unwrap();
        assert_eq!(config.ocr_config().unwrap().languages, vec!["ja".to_string()]);
    }

    #[test]
    fn test_invalid_toml_is_validation_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("folio.toml");
        fs::write(&config_path, "strategy = [").unwrap();

        let err = ExtractionConfig::from_toml_file(&config_path).unwrap_err();
        assert!(matches!(err, FolioError::Validation { .. }));
    }

    #[test]
    fn test_missing_file_is_validation_error() {
        let err = ExtractionConfig::from_toml_file("/nonexistent/folio.toml").unwrap_err();
        assert!(matches!(err, FolioError::Validation { .. }));
    }

    #[test]
    fn test_validate_ocr_only_without_ocr() {
        let config = ExtractionConfig {
            strategy: ExtractionStrategy::OcrOnly,
            ocr: None,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FolioError::Validation { .. })));
    }

    #[test]
    fn test_validate_empty_languages() {
        let config = ExtractionConfig {
            ocr: Some(OcrConfig {
                languages: vec![],
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_dpi_bounds() {
        let mut config = ExtractionConfig::default();
        config.render.min_dpi = 700;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let config = ExtractionConfig {
            ocr: Some(OcrConfig {
                timeout_secs: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ocr.timeout_secs"));

        let config = ExtractionConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FolioError::Validation { .. })));

        let config = ExtractionConfig {
            timeout_secs: Some(30),
            ocr: Some(OcrConfig {
                timeout_secs: Some(5),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_env_overrides_default_dirs() {
        let dir = tempdir().unwrap();
        unsafe {
            std::env::set_var(CACHE_DIR_ENV, dir.path().join("cache"));
            std::env::set_var(MODEL_DIR_ENV, dir.path().join("models"));
        }

        let cache_dir = CacheConfig::default().resolved_dir().unwrap();
        let model_dir = OcrConfig::default().resolved_model_dir().unwrap();

        unsafe {
            std::env::remove_var(CACHE_DIR_ENV);
            std::env::remove_var(MODEL_DIR_ENV);
        }

        assert_eq!(cache_dir, dir.path().join("cache"));
        assert_eq!(model_dir, dir.path().join("models"));
    }

    #[test]
    #[serial]
    fn test_explicit_dir_beats_env() {
        unsafe {
            std::env::set_var(CACHE_DIR_ENV, "/from/env");
        }
        let config = CacheConfig {
            dir: Some(PathBuf::from("/from/config")),
            ..Default::default()
        };
        let resolved = config.resolved_dir().unwrap();
        unsafe {
            std::env::remove_var(CACHE_DIR_ENV);
        }
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }

    #[test]
    #[serial]
    fn test_default_dirs_under_working_directory() {
        if env_dir(CACHE_DIR_ENV).is_some() || env_dir(MODEL_DIR_ENV).is_some() {
            return;
        }
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            CacheConfig::default().resolved_dir().unwrap(),
            cwd.join(".folio").join("plaintext")
        );
        assert_eq!(
            OcrConfig::default().resolved_model_dir().unwrap(),
            cwd.join(".folio").join("models")
        );
    }

    #[test]
    #[serial]
    fn test_discover_config() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("folio.toml"), "strategy = \"ocr_only\"\n").unwrap();

        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&nested).unwrap();
        let discovered = ExtractionConfig::discover();
        std::env::set_current_dir(&original_dir).unwrap();

        let config = discovered.unwrap().unwrap();
        assert_eq!(config.strategy, ExtractionStrategy::OcrOnly);
    }
}
