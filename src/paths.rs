//! Locating and describing the optional database files.
//!
//! An override comes from a named environment variable and must be an
//! absolute path to a regular file. Without an override the configured
//! default is used; a missing default simply means "not configured".

use crate::config::{DbConfig, EnvSource, ProcessEnv, ServerConfig};
use crate::error::{InvalidParamsDetails, NdsError, Result};
use crate::models::{DbStatus, InfoResponse, ResolvedPath};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use tracing::debug;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Resolves database paths from overrides and defaults
#[derive(Debug, Clone, Default)]
pub struct PathResolver<E = ProcessEnv> {
    env: E,
}

impl<E: EnvSource> PathResolver<E> {
    pub fn new(env: E) -> Self {
        PathResolver { env }
    }

    /// Resolve the override in `env_name`.
    ///
    /// Returns `Ok(None)` when the variable is unset or blank.
    pub fn resolve_path_from_env(&self, env_name: &str) -> Result<Option<ResolvedPath>> {
        let raw = match self.env.var(env_name) {
            Some(raw) if !trim_os(&raw).is_empty() => raw,
            _ => {
                debug!(env = env_name, "override not set");
                return Ok(None);
            }
        };
        let candidate = Path::new(trim_os(&raw));

        if !candidate.is_absolute() {
            let value = candidate.to_string_lossy();
            return Err(NdsError::invalid_params(
                format!("{env_name} must be an absolute path, got '{value}'"),
                InvalidParamsDetails {
                    env: Some(env_name.to_string()),
                    value: Some(value.into_owned()),
                    ..Default::default()
                },
            ));
        }

        let is_file = fs::metadata(candidate)
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(NdsError::invalid_params(
                format!(
                    "{env_name} points to '{}', which is not an existing regular file",
                    candidate.display()
                ),
                InvalidParamsDetails {
                    env: Some(env_name.to_string()),
                    path: Some(candidate.display().to_string()),
                    ..Default::default()
                },
            ));
        }

        let resolved = fs::canonicalize(candidate)?;
        debug!(env = env_name, path = %resolved.display(), "using override");
        Ok(Some(ResolvedPath::new(resolved)))
    }

    /// Resolve the override, falling back to `default_path`.
    ///
    /// Override validation errors propagate. A missing default is not an
    /// error, but a default that exists and is not a regular file is.
    pub fn resolve_optional_db_path(
        &self,
        env_name: &str,
        default_path: &Path,
    ) -> Result<Option<ResolvedPath>> {
        if let Some(path) = self.resolve_path_from_env(env_name)? {
            return Ok(Some(path));
        }

        if !default_path.try_exists()? {
            debug!(path = %default_path.display(), "default database not present");
            return Ok(None);
        }

        if !fs::metadata(default_path)?.is_file() {
            return Err(NdsError::invalid_params(
                format!(
                    "Default database path '{}' exists but is not a regular file",
                    default_path.display()
                ),
                InvalidParamsDetails {
                    path: Some(default_path.display().to_string()),
                    ..Default::default()
                },
            ));
        }

        let resolved = fs::canonicalize(default_path)?;
        debug!(path = %resolved.display(), "using default database");
        Ok(Some(ResolvedPath::new(resolved)))
    }

    pub fn resolve(&self, config: &DbConfig) -> Result<Option<ResolvedPath>> {
        match &config.default_path {
            Some(default_path) => self.resolve_optional_db_path(&config.env_name, default_path),
            None => self.resolve_path_from_env(&config.env_name),
        }
    }

    /// Like [`resolve`](Self::resolve), but an unconfigured database is an error
    pub fn require(&self, config: &DbConfig) -> Result<ResolvedPath> {
        self.resolve(config)?.ok_or_else(|| not_configured(config))
    }

    pub fn describe(&self, config: &DbConfig) -> Result<DbStatus> {
        let path = self.resolve(config)?;
        describe_optional_db(path.as_ref().map(ResolvedPath::as_path), &config.how_to)
    }

    /// Status of every database in `config`, resolved now
    pub fn describe_all(&self, config: &ServerConfig) -> Result<InfoResponse> {
        Ok(InfoResponse {
            nds: self.describe(&config.nds)?,
            exfor: self.describe(&config.exfor)?,
        })
    }
}

// Surrounding whitespace is ignored; non-UTF-8 values keep their raw bytes
fn trim_os(value: &OsStr) -> &OsStr {
    match value.to_str() {
        Some(text) => OsStr::new(text.trim()),
        None => trim_raw(value),
    }
}

#[cfg(unix)]
fn trim_raw(value: &OsStr) -> &OsStr {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(value.as_bytes().trim_ascii())
}

#[cfg(not(unix))]
fn trim_raw(value: &OsStr) -> &OsStr {
    value
}

/// Summarize a (possibly absent) database for diagnostics.
///
/// The file size is read now; if the file disappeared after resolution the
/// I/O error is returned as is.
pub fn describe_optional_db(path: Option<&Path>, how_to: &str) -> Result<DbStatus> {
    let Some(path) = path else {
        return Ok(DbStatus::NotConfigured {
            how_to: how_to.to_string(),
        });
    };

    let bytes = fs::metadata(path)?.len();
    Ok(DbStatus::Ok {
        path: path.display().to_string(),
        size_mb: round3(bytes as f64 / BYTES_PER_MB),
        how_to: how_to.to_string(),
    })
}

fn not_configured(config: &DbConfig) -> NdsError {
    NdsError::invalid_params(
        format!("Database is not configured. {}", config.how_to),
        InvalidParamsDetails {
            env: Some(config.env_name.clone()),
            how_to: Some(config.how_to.clone()),
            ..Default::default()
        },
    )
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::ffi::OsString;
    use tempfile::TempDir;

    const ENV: &str = "NDS_TEST_DB";

    fn resolver(value: Option<&str>) -> PathResolver<HashMap<String, OsString>> {
        resolver_os(value.map(OsString::from))
    }

    fn resolver_os(value: Option<OsString>) -> PathResolver<HashMap<String, OsString>> {
        let mut env = HashMap::new();
        if let Some(value) = value {
            env.insert(ENV.to_string(), value);
        }
        PathResolver::new(env)
    }

    fn setup() -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("nds.sqlite");
        fs::write(&file, b"sqlite").unwrap();
        (temp, file)
    }

    #[test]
    fn test_unset_and_blank_are_none() {
        for value in [None, Some(""), Some("   "), Some("\t\n")] {
            let result = resolver(value).resolve_path_from_env(ENV).unwrap();
            assert!(result.is_none(), "{value:?} should be unset");
        }
    }

    #[test]
    fn test_relative_path_rejected() {
        // Cargo.toml exists relative to the test working directory
        for value in ["Cargo.toml", "data/nds.sqlite", "./nds.sqlite"] {
            let err = resolver(Some(value)).resolve_path_from_env(ENV).unwrap_err();
            match err {
                NdsError::InvalidParams { details, .. } => {
                    assert_eq!(details.env.as_deref(), Some(ENV));
                    assert_eq!(details.value.as_deref(), Some(value));
                }
                other => panic!("expected InvalidParams, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_override_rejected() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.sqlite");
        let err = resolver(Some(missing.to_str().unwrap()))
            .resolve_path_from_env(ENV)
            .unwrap_err();
        match err {
            NdsError::InvalidParams { details, .. } => {
                assert_eq!(details.env.as_deref(), Some(ENV));
                assert_eq!(details.path, Some(missing.display().to_string()));
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn test_directory_override_rejected() {
        let temp = TempDir::new().unwrap();
        let err = resolver(Some(temp.path().to_str().unwrap()))
            .resolve_path_from_env(ENV)
            .unwrap_err();
        assert!(err.is_invalid_params());
    }

    #[test]
    fn test_valid_override_canonicalized() {
        let (_temp, file) = setup();
        let padded = format!("  {}  ", file.display());
        let resolved = resolver(Some(&padded))
            .resolve_path_from_env(ENV)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_override_resolves_to_target() {
        let (temp, file) = setup();
        let link = temp.path().join("link.sqlite");
        std::os::unix::fs::symlink(&file, &link).unwrap();
        let resolved = resolver(Some(link.to_str().unwrap()))
            .resolve_path_from_env(ENV)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_override_preferred_over_default() {
        let (temp, file) = setup();
        let default = temp.path().join("default.sqlite");
        fs::write(&default, b"other").unwrap();

        let resolved = resolver(Some(file.to_str().unwrap()))
            .resolve_optional_db_path(ENV, &default)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_override_error_not_swallowed() {
        let (_temp, file) = setup();
        let err = resolver(Some("relative.sqlite"))
            .resolve_optional_db_path(ENV, &file)
            .unwrap_err();
        assert!(err.is_invalid_params());
    }

    #[test]
    fn test_missing_default_is_unset() {
        let temp = TempDir::new().unwrap();
        let result = resolver(None)
            .resolve_optional_db_path(ENV, &temp.path().join("absent.sqlite"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_default_directory_is_error() {
        let temp = TempDir::new().unwrap();
        let err = resolver(Some(" "))
            .resolve_optional_db_path(ENV, temp.path())
            .unwrap_err();
        match err {
            NdsError::InvalidParams { details, .. } => {
                assert_eq!(details.path, Some(temp.path().display().to_string()));
                assert!(details.env.is_none());
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }

    #[test]
    fn test_existing_default_used() {
        let (_temp, file) = setup();
        let resolved = resolver(None)
            .resolve_optional_db_path(ENV, &file)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_describe_not_configured() {
        let status = describe_optional_db(None, "X").unwrap();
        assert_eq!(
            status,
            DbStatus::NotConfigured {
                how_to: "X".to_string()
            }
        );
    }

    #[test]
    fn test_describe_reports_size_in_mb() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("nds.sqlite");
        fs::write(&file, vec![0u8; 1_234_567]).unwrap();

        match describe_optional_db(Some(&file), "X").unwrap() {
            DbStatus::Ok {
                path,
                size_mb,
                how_to,
            } => {
                assert_eq!(path, file.display().to_string());
                assert_eq!(size_mb, 1.177);
                assert_eq!(how_to, "X");
            }
            other => panic!("expected ok status, got {other:?}"),
        }
    }

    #[test]
    fn test_describe_vanished_file_is_io_error() {
        let (_temp, file) = setup();
        fs::remove_file(&file).unwrap();
        let err = describe_optional_db(Some(&file), "X").unwrap_err();
        assert!(matches!(err, NdsError::Io(_)));
    }

    #[test]
    fn test_describe_config() {
        let (temp, file) = setup();
        let config = DbConfig::new(ENV, temp.path().join("absent.sqlite"), "help");
        let status = resolver(None).describe(&config).unwrap();
        assert!(matches!(status, DbStatus::NotConfigured { .. }));

        let status = resolver(Some(file.to_str().unwrap()))
            .describe(&config)
            .unwrap();
        assert!(matches!(status, DbStatus::Ok { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_override_is_validated() {
        use std::os::unix::ffi::OsStrExt;

        let value = OsStr::from_bytes(b"  /nonexistent/\xff.sqlite ").to_os_string();
        let err = resolver_os(Some(value))
            .resolve_path_from_env(ENV)
            .unwrap_err();
        match err {
            NdsError::InvalidParams { details, .. } => {
                assert_eq!(details.env.as_deref(), Some(ENV));
                assert!(details.path.unwrap().starts_with("/nonexistent/"));
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }

        let relative = OsStr::from_bytes(b"data/\xff.sqlite").to_os_string();
        let err = resolver_os(Some(relative))
            .resolve_path_from_env(ENV)
            .unwrap_err();
        assert!(err.is_invalid_params());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_override_resolves() {
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let mut raw = temp.path().as_os_str().as_bytes().to_vec();
        raw.extend_from_slice(b"/nds-\xff.sqlite");
        let file = std::path::PathBuf::from(OsStr::from_bytes(&raw));
        fs::write(&file, b"sqlite").unwrap();

        let resolved = resolver_os(Some(file.clone().into_os_string()))
            .resolve_path_from_env(ENV)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_no_default_uses_override_only() {
        let (_temp, file) = setup();
        let config = DbConfig::override_only(ENV, "help");
        assert!(resolver(None).resolve(&config).unwrap().is_none());
        assert!(resolver(Some("relative.sqlite")).resolve(&config).is_err());

        let resolved = resolver(Some(file.to_str().unwrap()))
            .resolve(&config)
            .unwrap()
            .unwrap();
        assert_eq!(resolved.as_path(), fs::canonicalize(&file).unwrap());
    }

    #[test]
    fn test_describe_all() {
        let (temp, file) = setup();
        let config = ServerConfig {
            nds: DbConfig::new(ENV, &file, "nds help"),
            exfor: DbConfig::new(
                "NDS_TEST_EXFOR",
                temp.path().join("absent.sqlite"),
                "exfor help",
            ),
        };
        let info = resolver(None).describe_all(&config).unwrap();
        assert!(matches!(info.nds, DbStatus::Ok { .. }));
        assert_eq!(
            info.exfor,
            DbStatus::NotConfigured {
                how_to: "exfor help".to_string()
            }
        );
    }

    #[test]
    fn test_require_unconfigured() {
        let temp = TempDir::new().unwrap();
        let config = DbConfig::new(ENV, temp.path().join("absent.sqlite"), "help");
        match resolver(None).require(&config).unwrap_err() {
            NdsError::InvalidParams { message, details } => {
                assert!(message.ends_with("help"));
                assert_eq!(details.env.as_deref(), Some(ENV));
                assert_eq!(details.how_to.as_deref(), Some("help"));
            }
            other => panic!("expected InvalidParams, got {other:?}"),
        }
    }
}
