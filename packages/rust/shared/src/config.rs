//! Application configuration for the land-bank pipeline.
//!
//! User config lives at `~/.landbank/landbank.toml`.
//! CLI flags override config file values, which override defaults.
//!
//! The AIS gatekeeper key is never stored in the file: the config names
//! the environment variable that holds it, and the key is resolved
//! explicitly at startup and injected into the enrichment client.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LandbankError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "landbank.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".landbank";

// ---------------------------------------------------------------------------
// Config structs (matching landbank.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Agenda source settings.
    #[serde(default)]
    pub agenda: AgendaConfig,

    /// AIS lookup-service settings.
    #[serde(default)]
    pub ais: AisSettings,

    /// Output destinations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[agenda]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Board listing page to scrape for agenda links.
    #[serde(default = "default_board_url")]
    pub board_url: String,

    /// User-Agent header for listing/PDF requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Bullet markers that delimit agenda entries. PDF text extraction
    /// mis-encodes U+2022 on some sources, so both the glyph and its
    /// common mojibake form are matched by default.
    #[serde(default = "default_bullet_markers")]
    pub bullet_markers: Vec<String>,

    /// HTTP timeout in seconds for listing and PDF fetches.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            board_url: default_board_url(),
            user_agent: default_user_agent(),
            bullet_markers: default_bullet_markers(),
            timeout_secs: default_fetch_timeout(),
        }
    }
}

fn default_board_url() -> String {
    "https://phillylandbank.org/philadelphia-land-bank-board/".into()
}
fn default_user_agent() -> String {
    concat!("landbank/", env!("CARGO_PKG_VERSION")).into()
}
fn default_bullet_markers() -> Vec<String> {
    vec!["\u{2022}".into(), "â€¢".into()]
}
fn default_fetch_timeout() -> u64 {
    30
}

/// `[ais]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AisSettings {
    /// AIS search endpoint base, joined with the encoded address.
    #[serde(default = "default_ais_base_url")]
    pub base_url: String,

    /// Name of the env var holding the gatekeeper key (never the key itself).
    #[serde(default = "default_gatekeeper_key_env")]
    pub gatekeeper_key_env: String,

    /// HTTP timeout in seconds per lookup request.
    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,

    /// Backoff in seconds after a 429 before the single retry.
    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for AisSettings {
    fn default() -> Self {
        Self {
            base_url: default_ais_base_url(),
            gatekeeper_key_env: default_gatekeeper_key_env(),
            timeout_secs: default_lookup_timeout(),
            backoff_secs: default_backoff(),
        }
    }
}

fn default_ais_base_url() -> String {
    "https://api.phila.gov/ais_doc/v1/search".into()
}
fn default_gatekeeper_key_env() -> String {
    "AIS_GATEKEEPER_KEY".into()
}
fn default_lookup_timeout() -> u64 {
    30
}
fn default_backoff() -> u64 {
    60
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for the current and archive tables.
    #[serde(default = "default_output_dir")]
    pub dir: String,

    /// Path to the previously-seen agenda URL list.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            state_file: default_state_file(),
        }
    }
}

fn default_output_dir() -> String {
    ".".into()
}
fn default_state_file() -> String {
    "parsed_urls.json".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.landbank/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LandbankError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.landbank/landbank.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| LandbankError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LandbankError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LandbankError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LandbankError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LandbankError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the AIS gatekeeper key from the configured env var.
pub fn resolve_gatekeeper_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.ais.gatekeeper_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(LandbankError::config(format!(
            "AIS gatekeeper key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("board_url"));
        assert!(toml_str.contains("AIS_GATEKEEPER_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.ais.backoff_secs, 60);
        assert_eq!(parsed.ais.gatekeeper_key_env, "AIS_GATEKEEPER_KEY");
        assert_eq!(parsed.agenda.bullet_markers.len(), 2);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[output]
dir = "/var/landbank"

[ais]
backoff_secs = 5
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.output.dir, "/var/landbank");
        assert_eq!(config.output.state_file, "parsed_urls.json");
        assert_eq!(config.ais.backoff_secs, 5);
        assert!(config.agenda.board_url.contains("phillylandbank"));
    }

    #[test]
    fn gatekeeper_key_resolution() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.ais.gatekeeper_key_env = "LANDBANK_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_gatekeeper_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("key not found"));
    }
}
