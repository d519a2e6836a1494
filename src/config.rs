use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::paths;

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "DDE_DAEMON_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default)]
    pub accounts: AccountsConfig,

    #[serde(default)]
    pub system_info: SystemInfoConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsConfig {
    #[serde(default = "default_locale_file")]
    pub locale_file: PathBuf,

    #[serde(default = "default_lang")]
    pub default_lang: String,

    /// Prefixes searched in order for skeleton directories
    #[serde(default = "default_skel_search_path")]
    pub skel_search_path: Vec<PathBuf>,

    #[serde(default = "default_skel_common")]
    pub skel_common: String,

    #[serde(default = "default_skel_lang_prefix")]
    pub skel_lang_prefix: String,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            locale_file: default_locale_file(),
            default_lang: default_lang(),
            skel_search_path: default_skel_search_path(),
            skel_common: default_skel_common(),
            skel_lang_prefix: default_skel_lang_prefix(),
        }
    }
}

fn default_locale_file() -> PathBuf {
    paths::LOCALE_FILE.into()
}

fn default_lang() -> String {
    paths::DEFAULT_LANG.into()
}

fn default_skel_search_path() -> Vec<PathBuf> {
    paths::SKEL_SEARCH_PATH.iter().map(PathBuf::from).collect()
}

fn default_skel_common() -> String {
    paths::SKEL_COMMON.into()
}

fn default_skel_lang_prefix() -> String {
    paths::SKEL_LANG_PREFIX.into()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfoConfig {
    #[serde(default = "default_deepin_version")]
    pub deepin_version: PathBuf,

    #[serde(default = "default_lsb_release")]
    pub lsb_release: PathBuf,

    #[serde(default = "default_cpuinfo")]
    pub cpuinfo: PathBuf,

    #[serde(default = "default_meminfo")]
    pub meminfo: PathBuf,

    /// Command whose output is the machine hardware name
    #[serde(default = "default_uname_command")]
    pub uname_command: Vec<String>,

    /// Bus the UDisks2 daemon is reachable on
    #[serde(default)]
    pub udisks_bus: BusKind,

    #[serde(default = "default_udisks_destination")]
    pub udisks_destination: String,

    #[serde(default = "default_udisks_path")]
    pub udisks_path: String,

    /// Well-known name requested for the published object
    #[serde(default = "default_bus_name")]
    pub bus_name: String,

    #[serde(default = "default_object_path")]
    pub object_path: String,
}

impl Default for SystemInfoConfig {
    fn default() -> Self {
        Self {
            deepin_version: default_deepin_version(),
            lsb_release: default_lsb_release(),
            cpuinfo: default_cpuinfo(),
            meminfo: default_meminfo(),
            uname_command: default_uname_command(),
            udisks_bus: BusKind::default(),
            udisks_destination: default_udisks_destination(),
            udisks_path: default_udisks_path(),
            bus_name: default_bus_name(),
            object_path: default_object_path(),
        }
    }
}

fn default_deepin_version() -> PathBuf {
    paths::DEEPIN_VERSION.into()
}

fn default_lsb_release() -> PathBuf {
    paths::LSB_RELEASE.into()
}

fn default_cpuinfo() -> PathBuf {
    paths::CPUINFO.into()
}

fn default_meminfo() -> PathBuf {
    paths::MEMINFO.into()
}

fn default_uname_command() -> Vec<String> {
    vec!["/bin/sh".into(), "-c".into(), "/bin/uname -m".into()]
}

fn default_udisks_destination() -> String {
    paths::UDISKS2_DEST.into()
}

fn default_udisks_path() -> String {
    paths::UDISKS2_PATH.into()
}

fn default_bus_name() -> String {
    paths::SYSTEM_INFO_NAME.into()
}

fn default_object_path() -> String {
    paths::SYSTEM_INFO_PATH.into()
}

impl DaemonConfig {
    /// Load from `path`, else from `$DDE_DAEMON_CONFIG`, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        };

        match path {
            Some(p) => Self::from_file(&p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
        let config = Self::parse(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.accounts.skel_search_path.is_empty() {
            return Err(Error::Config("accounts.skel_search_path is empty".into()));
        }
        if let Some(p) = self
            .accounts
            .skel_search_path
            .iter()
            .find(|p| !p.is_absolute())
        {
            return Err(Error::Config(format!(
                "skeleton prefix {} is not absolute",
                p.display()
            )));
        }
        if self.system_info.uname_command.is_empty() {
            return Err(Error::Config("system_info.uname_command is empty".into()));
        }
        Ok(())
    }
}
