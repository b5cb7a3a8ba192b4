//! Database locations and the environment they are read from.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing::warn;

pub const NDS_DB_ENV: &str = "NDS_DB_PATH";
pub const EXFOR_DB_ENV: &str = "NDS_EXFOR_DB_PATH";

const DATA_DIR: &str = ".nds-mcp";

/// Source of environment-style overrides.
///
/// Values are raw OS strings so a path that is not valid UTF-8 is still seen
/// as set.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<OsString>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<OsString> {
        std::env::var_os(name)
    }
}

impl EnvSource for HashMap<String, OsString> {
    fn var(&self, name: &str) -> Option<OsString> {
        self.get(name).cloned()
    }
}

/// Where one optional database lives and how to tell the user to set it up
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub env_name: String,
    /// `None` when no default location could be determined
    pub default_path: Option<PathBuf>,
    pub how_to: String,
}

impl DbConfig {
    pub fn new(
        env_name: impl Into<String>,
        default_path: impl Into<PathBuf>,
        how_to: impl Into<String>,
    ) -> Self {
        DbConfig {
            env_name: env_name.into(),
            default_path: Some(default_path.into()),
            how_to: how_to.into(),
        }
    }

    /// A database that can only be configured through its override
    pub fn override_only(env_name: impl Into<String>, how_to: impl Into<String>) -> Self {
        DbConfig {
            env_name: env_name.into(),
            default_path: None,
            how_to: how_to.into(),
        }
    }
}

/// Databases known to the server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Main database holding the `reactions` table
    pub nds: DbConfig,
    /// EXFOR experimental data, reported in `nds_info` only
    pub exfor: DbConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let Some(data_dir) = data_dir() else {
            warn!("home directory unknown; databases can only be set through overrides");
            return ServerConfig {
                nds: DbConfig::override_only(
                    NDS_DB_ENV,
                    format!("Set {NDS_DB_ENV} to the absolute path of nds.sqlite"),
                ),
                exfor: DbConfig::override_only(
                    EXFOR_DB_ENV,
                    format!("Set {EXFOR_DB_ENV} to the absolute path of exfor.sqlite"),
                ),
            };
        };

        ServerConfig {
            nds: DbConfig::new(
                NDS_DB_ENV,
                data_dir.join("nds.sqlite"),
                format!(
                    "Place nds.sqlite in {} or set {NDS_DB_ENV} to its absolute path",
                    data_dir.display()
                ),
            ),
            exfor: DbConfig::new(
                EXFOR_DB_ENV,
                data_dir.join("exfor.sqlite"),
                format!(
                    "Build exfor.sqlite from the x4i3 index into {} or set {EXFOR_DB_ENV} to its absolute path",
                    data_dir.join("exfor.sqlite").display()
                ),
            ),
        }
    }
}

fn data_dir() -> Option<PathBuf> {
    dirs::home_dir()
        .filter(|home| home.is_absolute())
        .map(|home| home.join(DATA_DIR))
}
