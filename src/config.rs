use std::fmt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::ImageQuality;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub manga: Vec<TrackedManga>,
    pub komga: Option<KomgaCredentials>,
}

/// A title to keep up to date.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedManga {
    pub id: i64,
    /// Overrides the upstream title name when naming directories.
    pub title: Option<String>,
    pub download_dir: Option<PathBuf>,
    pub quality: ImageQuality,
    pub komga_id: Option<String>,
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KomgaCredentials {
    pub username: String,
    pub password: String,
    pub base_url: String,
}

impl fmt::Debug for KomgaCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KomgaCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    manga: Option<Vec<RawManga>>,
    #[serde(default)]
    komga: Option<KomgaCredentials>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManga {
    id: i64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    download_dir: Option<String>,
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    komga_id: Option<String>,
}

impl TryFrom<RawManga> for TrackedManga {
    type Error = ConfigError;

    fn try_from(raw: RawManga) -> Result<Self, Self::Error> {
        let quality = match raw.quality {
            Some(q) => q.parse()?,
            None => ImageQuality::default(),
        };
        Ok(Self {
            id: raw.id,
            title: raw.title,
            download_dir: raw.download_dir.map(PathBuf::from),
            quality,
            komga_id: raw.komga_id,
        })
    }
}

impl Config {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<RawConfig> = serde_yaml::from_str(text)?;
        let raw = raw.unwrap_or_default();
        let manga = raw
            .manga
            .unwrap_or_default()
            .into_iter()
            .map(TrackedManga::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { manga, komga: raw.komga })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text)
    }

    /// `<config dir>/clocktower/config.yaml` for the current user.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "clocktower").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.yaml"))
    }
}
