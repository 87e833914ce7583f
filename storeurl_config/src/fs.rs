use std::path::{Path, PathBuf};

use anyhow::{Context as _, bail};

use crate::StoreUrlConfig;

const CONFIG_DIR_NAME: &str = "storeurl";
const CONFIG_FILE_NAMES: &[&str] = &["config.yaml", "config.yml", "config.json"];

/// Where a [`LoadedConfig`] came from.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// No config file was found, the built-in defaults apply.
    Default,
    File(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "<default>"),
            ConfigSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LoadedConfig {
    pub source: ConfigSource,
    pub config: StoreUrlConfig,
}

fn default_config_dir() -> Result<PathBuf, anyhow::Error> {
    let home = std::env::home_dir().context("Could not determine home directory")?;

    let dir = home.join(".config").join(CONFIG_DIR_NAME);

    Ok(dir)
}

fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// The first existing `~/.config/storeurl/config.{yaml,yml,json}`.
pub fn default_config_path() -> Result<Option<PathBuf>, anyhow::Error> {
    Ok(find_config_file(&default_config_dir()?))
}

/// Parse a config file, with the format chosen by the file extension.
pub fn parse_config(path: &Path, contents: &str) -> Result<StoreUrlConfig, anyhow::Error> {
    let ext = path
        .extension()
        .context("config file does not have an extension")?
        .to_str()
        .context("config file extension is not valid UTF-8")?;
    let config = match ext {
        "json" => serde_json::from_str(contents).context("Failed to parse JSON config")?,
        "yaml" | "yml" => {
            // An empty YAML document means "no settings".
            if contents.trim().is_empty() {
                StoreUrlConfig::default()
            } else {
                serde_yaml::from_str(contents).context("Failed to parse YAML config")?
            }
        }
        _ => bail!("Unsupported file extension: '{}'", ext),
    };
    Ok(config)
}

fn load_file(path: &Path) -> Result<LoadedConfig, anyhow::Error> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: '{}'", path.display()))?;
    let config = parse_config(path, &contents)
        .with_context(|| format!("Invalid config file: '{}'", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        rewrites = config.rewrites.len(),
        grammars = config.grammars.len(),
        strict = config.strict,
        "loaded config"
    );
    Ok(LoadedConfig {
        source: ConfigSource::File(path.to_owned()),
        config,
    })
}

/// Load the config.
///
/// An explicit path must exist. Without one, the default location is tried
/// (see [`default_config_path`]), and a missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, anyhow::Error> {
    if let Some(path) = path {
        return load_file(path);
    }

    match default_config_path()? {
        Some(path) => load_file(&path),
        None => {
            tracing::debug!("no config file, using defaults");
            Ok(LoadedConfig {
                source: ConfigSource::Default,
                config: StoreUrlConfig::default(),
            })
        }
    }
}

/// [`load_config`] on the blocking thread pool.
#[cfg(feature = "tokio")]
pub async fn load_config_async(path: Option<PathBuf>) -> Result<LoadedConfig, anyhow::Error> {
    tokio::task::spawn_blocking(move || load_config(path.as_deref()))
        .await
        .context("Failed to load config")?
}
