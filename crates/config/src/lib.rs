//! Layered configuration for the indexer.
//!
//! Values are merged in order, later sources winning:
//!
//! 1. built-in defaults ([`Config::default`])
//! 2. an optional file (`.toml`, `.yaml`/`.yml` or `.json`), either given
//!    explicitly or found at [`Config::default_path`]
//! 3. environment variables prefixed `UA_`, with `__` separating nested keys
//!    (`UA_INDEX__CONCURRENCY=8`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ua_archive::DEFAULT_MAX_ENTRY_SIZE;

/// Directory layout of written attachments, relative to the store root.
pub const DEFAULT_ATTACHMENT_TEMPLATE: &str = "{{ game|slug }}/{{ type|slug }}/{{ name|slug }}";
const ENV_PREFIX: &str = "UA_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub attachments: AttachmentsConfig,
    pub archive: ArchiveConfig,
    pub index: IndexConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentsConfig {
    /// Root directory attachments are written under.
    pub root: PathBuf,
    /// Path template for each record's attachment directory. Variables:
    /// `game`, `type`, `name`, `gametype`.
    pub template: String,
}

impl Default for AttachmentsConfig {
    fn default() -> Self {
        let root = project_dirs()
            .map(|dirs| dirs.data_dir().join("attachments"))
            .unwrap_or_else(|| PathBuf::from("attachments"));
        Self { root, template: DEFAULT_ATTACHMENT_TEMPLATE.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Largest uncompressed entry, in bytes, that will be unpacked.
    pub max_entry_size: u64,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { max_entry_size: DEFAULT_MAX_ENTRY_SIZE }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Attach image files found loose in the archive as well as images
    /// extracted from packages.
    pub loose_images: bool,
    /// Submissions indexed in parallel by batch runs.
    pub concurrency: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { loose_images: true, concurrency: 4 }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "Unreal Archive", "unreal-archive")
}

impl Config {
    /// `config.toml` in the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Builds the layered provider without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.display().to_string())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Loads and validates configuration. Without an explicit file, the
    /// default path is used when it exists.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = file.map(Path::to_path_buf).or_else(|| Self::default_path().filter(|p| p.is_file()));
        tracing::debug!(file = ?file, "Loading configuration");
        Self::from_figment(Self::figment(file.as_deref())?)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.attachments.template.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "attachments.template", reason: "must not be empty".to_string() });
        }
        if self.index.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid { field: "index.concurrency", reason: "must be at least 1".to_string() });
        }
        if self.archive.max_entry_size == 0 {
            exn::bail!(ErrorKind::Invalid {
                field: "archive.max_entry_size",
                reason: "must be greater than zero".to_string()
            });
        }
        Ok(())
    }
}
