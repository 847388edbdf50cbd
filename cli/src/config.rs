//! CLI configuration and keypair management

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use cpamm_pool::pool_model::Address;

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/cpamm/config.toml";
pub const DEFAULT_STATE_PATH: &str = "~/.config/cpamm/pools.json";
pub const DEFAULT_KEYPAIR_PATH: &str = "~/.config/solana/id.json";
pub const DEFAULT_PROGRAM_ID: &str = "dzNzzrsSmcDckACqwdkwhsb4ZN2pumEMUhVKj6x3q1b";
pub const DEFAULT_EXPIRY_SECS: i64 = 600;

/// Contents of the TOML config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Program id pool addresses are derived under
    pub program_id: String,
    /// Where the pool book is persisted
    pub state_path: String,
    pub keypair_path: String,
    /// Deadline applied to deposit/swap/withdraw when none is given
    pub default_expiry_secs: i64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID.to_string(),
            state_path: DEFAULT_STATE_PATH.to_string(),
            keypair_path: DEFAULT_KEYPAIR_PATH.to_string(),
            default_expiry_secs: DEFAULT_EXPIRY_SECS,
        }
    }
}

impl FileConfig {
    /// Read `path`, or fall back to defaults when the default location is absent
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (expand_path(DEFAULT_CONFIG_PATH)?, false),
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Everything a command needs: caller identity, program id, book location
pub struct CliConfig {
    pub program_id: Pubkey,
    pub state_path: PathBuf,
    pub keypair: Keypair,
    pub keypair_path: PathBuf,
    pub default_expiry_secs: i64,
}

impl CliConfig {
    pub fn new(
        config_path: Option<PathBuf>,
        state_path: Option<PathBuf>,
        keypair_path: Option<PathBuf>,
    ) -> Result<Self> {
        let file = FileConfig::load(config_path.as_deref())?;

        let program_id = Pubkey::from_str(&file.program_id)
            .with_context(|| format!("Invalid program id in config: {}", file.program_id))?;

        if file.default_expiry_secs <= 0 {
            anyhow::bail!(
                "default_expiry_secs must be positive, got {}",
                file.default_expiry_secs
            );
        }

        let state_path = match state_path {
            Some(path) => path,
            None => expand_path(&file.state_path)?,
        };
        let keypair_path = match keypair_path {
            Some(path) => path,
            None => expand_path(&file.keypair_path)?,
        };

        let keypair = load_keypair(&keypair_path)?;

        Ok(Self {
            program_id,
            state_path,
            keypair,
            keypair_path,
            default_expiry_secs: file.default_expiry_secs,
        })
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Caller identity as the pool model sees it
    pub fn caller(&self) -> Address {
        self.pubkey().to_bytes()
    }

    /// Absolute deadline `secs` from now, or the configured default
    pub fn expiry(&self, secs: Option<i64>) -> i64 {
        Utc::now()
            .timestamp()
            .saturating_add(secs.unwrap_or(self.default_expiry_secs))
    }
}

/// Expand `~` and environment variables in a path
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Parse a base58 address argument
pub fn parse_address(value: &str) -> Result<Address> {
    let key = Pubkey::from_str(value).with_context(|| format!("Invalid address: {}", value))?;
    Ok(key.to_bytes())
}

/// Load a keypair from a JSON file
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    if !path.exists() {
        anyhow::bail!(
            "Keypair file not found: {}\n\
             Create one with: solana-keygen new --outfile {}",
            path.display(),
            path.display()
        );
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

    let bytes: Vec<u8> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse keypair JSON: {}", path.display()))?;

    Keypair::from_bytes(&bytes)
        .with_context(|| format!("Invalid keypair data in: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_keypair(dir: &Path) -> (PathBuf, Keypair) {
        let keypair = Keypair::new();
        let path = dir.join("id.json");
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        fs::write(&path, json).unwrap();
        (path, keypair)
    }

    #[test]
    fn test_default_program_id_parses() {
        assert!(Pubkey::from_str(DEFAULT_PROGRAM_ID).is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let file: FileConfig = toml::from_str("default_expiry_secs = 60\n").unwrap();
        assert_eq!(file.default_expiry_secs, 60);
        assert_eq!(file.program_id, DEFAULT_PROGRAM_ID);
        assert_eq!(file.state_path, DEFAULT_STATE_PATH);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_load_keypair_roundtrip() {
        let dir = tempdir().unwrap();
        let (path, keypair) = write_keypair(dir.path());
        assert_eq!(load_keypair(&path).unwrap().pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_missing_keypair_reports_path() {
        let dir = tempdir().unwrap();
        let err = load_keypair(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("Keypair file not found"));
    }

    #[test]
    fn test_cli_flags_override_file() {
        let dir = tempdir().unwrap();
        let (keypair_path, keypair) = write_keypair(dir.path());
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "state_path = \"/nonexistent/pools.json\"\ndefault_expiry_secs = 30\n",
        )
        .unwrap();
        let state_path = dir.path().join("book.json");

        let config = CliConfig::new(
            Some(config_path),
            Some(state_path.clone()),
            Some(keypair_path),
        )
        .unwrap();

        assert_eq!(config.state_path, state_path);
        assert_eq!(config.pubkey(), keypair.pubkey());
        assert_eq!(config.default_expiry_secs, 30);
        assert!(config.expiry(None) >= Utc::now().timestamp() + 29);
    }

    #[test]
    fn test_parse_address() {
        let key = Pubkey::new_unique();
        assert_eq!(parse_address(&key.to_string()).unwrap(), key.to_bytes());
        assert!(parse_address("not-a-key").is_err());
    }
}
