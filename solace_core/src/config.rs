use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use iroh::SecretKey;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{crypto::PiiCipher, error::ConfigError};

static DATA_DIR_NAME: &str = "solace";
static SOLACE_DB_NAME: &str = "solace_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// data_dir_path
// |- solace
//    |- solace_db.sqlite
//    |- config.json

fn default_secret_key() -> SecretKey {
    SecretKey::generate(&mut rand::rng())
}

fn default_pii_key() -> String {
    let mut key = [0u8; 32];
    rand::rng().fill(&mut key);
    STANDARD.encode(key)
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SolaceConfig {
    /// Secret key for the local node/instance.
    #[serde(default = "default_secret_key")]
    pub(crate) secret_key: SecretKey,

    /// Secret key used by the local UI client, separate from the node key.
    #[serde(default = "default_secret_key")]
    pub(crate) client_secret_key: SecretKey,

    pub(crate) database_path: PathBuf,

    /// Server-held key for sealing profile PII. Never derived from a user id.
    #[serde(default = "default_pii_key")]
    pub(crate) pii_key: String,
}

impl SolaceConfig {
    fn new(data_dir: &Path) -> Self {
        SolaceConfig {
            secret_key: default_secret_key(),
            client_secret_key: default_secret_key(),
            database_path: data_dir.join(SOLACE_DB_NAME),
            pii_key: default_pii_key(),
        }
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database_path.display())
    }

    pub fn pii_cipher(&self) -> Result<PiiCipher, crate::crypto::PiiError> {
        PiiCipher::from_base64(&self.pii_key)
    }
}

/// Gets the existing config from the platform data directory, creating it on first run.
pub async fn get_or_init() -> Result<SolaceConfig, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    load_or_create(&data_dir.join(DATA_DIR_NAME)).await
}

pub async fn load_or_create(solace_dir: &Path) -> Result<SolaceConfig, ConfigError> {
    let config_path = solace_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(solace_dir).await?;

    if config_path.exists() {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let stored: serde_json::Value = serde_json::from_str(&contents)?;
        let config: SolaceConfig = serde_json::from_value(stored.clone())?;

        // Keys filled in by serde defaults only live in memory until written back.
        if serde_json::to_value(&config)? != stored {
            save(&config_path, &config).await?;
            tracing::info!(path = %config_path.display(), "filled in missing config keys");
        } else {
            tracing::debug!(path = %config_path.display(), "loaded config");
        }
        Ok(config)
    } else {
        let config = SolaceConfig::new(solace_dir);
        save(&config_path, &config).await?;

        tracing::info!(path = %config_path.display(), "created new config");
        Ok(config)
    }
}

async fn save(config_path: &Path, config: &SolaceConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    let mut file = fs::File::create(config_path).await?;
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}
