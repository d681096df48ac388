//! Application configuration for wordroots.
//!
//! User config lives at `~/.wordroots/wordroots.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WordrootsError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wordroots.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wordroots";

/// Public Scrabble word list used when no source is configured.
pub const DEFAULT_VOCABULARY_SOURCE: &str =
    "https://raw.githubusercontent.com/redbo/scrabble/master/dictionary.txt";

// ---------------------------------------------------------------------------
// Config structs (matching wordroots.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Where the legal vocabulary comes from.
    #[serde(default)]
    pub vocabulary: VocabularyConfig,

    /// Markup extraction settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Fixed-point propagation settings.
    #[serde(default)]
    pub propagation: PropagationSettings,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Knowledge base JSON file read at start and written at the end of a run.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
        }
    }
}

fn default_output_path() -> String {
    "etymology.json".into()
}

/// `[vocabulary]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Local path or `http(s)://` URL of a newline-separated word list.
    #[serde(default = "default_vocabulary_source")]
    pub source: String,

    /// HTTP timeout when the source is a URL.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            source: default_vocabulary_source(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_vocabulary_source() -> String {
    DEFAULT_VOCABULARY_SOURCE.into()
}
fn default_timeout_secs() -> u64 {
    60
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Name used in the top-level section heading (`==English==`).
    #[serde(default = "default_language")]
    pub language: String,

    /// Code used as the target language inside templates (`{{der|en|...}}`).
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Ancestor codes too far upstream to be useful as roots.
    #[serde(default = "default_excluded_codes")]
    pub excluded_codes: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            language_code: default_language_code(),
            excluded_codes: default_excluded_codes(),
        }
    }
}

fn default_language() -> String {
    "English".into()
}
fn default_language_code() -> String {
    "en".into()
}
fn default_excluded_codes() -> Vec<String> {
    vec!["ine-pro".into(), "ine-bsl-pro".into(), "gem-pro".into()]
}

/// `[propagation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationSettings {
    /// Safety cap on inflection sweeps.
    #[serde(default = "default_max_sweeps")]
    pub max_sweeps: u32,
}

impl Default for PropagationSettings {
    fn default() -> Self {
        Self {
            max_sweeps: default_max_sweeps(),
        }
    }
}

fn default_max_sweeps() -> u32 {
    10
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Top-level section heading name.
    pub language: String,
    /// Template target-language code.
    pub language_code: String,
    /// Source-language codes that never produce a descriptor.
    pub excluded_codes: Vec<String>,
}

impl From<&AppConfig> for ExtractConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            language: config.extraction.language.clone(),
            language_code: config.extraction.language_code.clone(),
            excluded_codes: config.extraction.excluded_codes.clone(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Runtime propagation configuration.
#[derive(Debug, Clone, Copy)]
pub struct PropagationConfig {
    /// Maximum number of inflection sweeps before giving up on convergence.
    pub max_sweeps: u32,
}

impl From<&AppConfig> for PropagationConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_sweeps: config.propagation.max_sweeps,
        }
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wordroots/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WordrootsError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wordroots/wordroots.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WordrootsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WordrootsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WordrootsError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| WordrootsError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WordrootsError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings the pipeline cannot run with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^[a-z]+(?:-[a-z]+)*$").expect("valid regex"));

    if config.propagation.max_sweeps == 0 {
        return Err(WordrootsError::config("propagation.max_sweeps must be at least 1"));
    }
    if config.extraction.language.trim().is_empty() {
        return Err(WordrootsError::config("extraction.language must not be empty"));
    }
    if !CODE_RE.is_match(&config.extraction.language_code) {
        return Err(WordrootsError::config(format!(
            "extraction.language_code '{}' is not a lower-case language code",
            config.extraction.language_code
        )));
    }
    if config.vocabulary.source.trim().is_empty() {
        return Err(WordrootsError::config("vocabulary.source must not be empty"));
    }
    Ok(())
}
