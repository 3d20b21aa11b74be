use anyhow::{Context, Result};
use std::path::PathBuf;

pub(crate) const DB_ENV: &str = "BUDGETWATCH_DB";
pub(crate) const DATA_DIR_ENV: &str = "BUDGETWATCH_DATA_DIR";
pub(crate) const LOG_ENV: &str = "BUDGETWATCH_LOG";
const DEFAULT_LOG_FILTER: &str = "budgetwatch=warn";

/// Runtime settings resolved from the environment, falling back to the
/// platform data directory.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    pub(crate) data_dir: PathBuf,
    pub(crate) db_path: PathBuf,
    pub(crate) log_filter: String,
}

impl Config {
    pub(crate) fn load() -> Result<Self> {
        let config = Self::resolve(|key| std::env::var(key).ok(), default_data_dir)?;
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                config.data_dir.display()
            )
        })?;
        Ok(config)
    }

    fn resolve(
        env: impl Fn(&str) -> Option<String>,
        fallback_dir: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_dir = match non_empty(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(crate::run::shellexpand(&dir)),
            None => fallback_dir()?,
        };
        let db_path = non_empty(DB_ENV)
            .map(|p| PathBuf::from(crate::run::shellexpand(&p)))
            .unwrap_or_else(|| data_dir.join("budgetwatch.db"));
        let log_filter = non_empty(LOG_ENV).unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            data_dir,
            db_path,
            log_filter,
        })
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.data_dir.join("budgetwatch.log")
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "budgetwatch", "budgetwatch")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::collections::HashMap;

    fn resolve_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::resolve(|k| vars.get(k).cloned(), || Ok(PathBuf::from("/data"))).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = resolve_with(&[]);
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.db_path, PathBuf::from("/data/budgetwatch.db"));
        assert_eq!(config.log_filter, "budgetwatch=warn");
        assert_eq!(config.log_path(), PathBuf::from("/data/budgetwatch.log"));
    }

    #[test]
    fn test_env_overrides() {
        let config = resolve_with(&[
            (DATA_DIR_ENV, "/tmp/bw"),
            (DB_ENV, "/tmp/other.db"),
            (LOG_ENV, "budgetwatch=debug"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/bw"));
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.log_filter, "budgetwatch=debug");
    }

    #[test]
    fn test_db_follows_data_dir() {
        let config = resolve_with(&[(DATA_DIR_ENV, "/srv/budget")]);
        assert_eq!(config.db_path, PathBuf::from("/srv/budget/budgetwatch.db"));
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = resolve_with(&[(DB_ENV, "  "), (LOG_ENV, "")]);
        assert_eq!(config.db_path, PathBuf::from("/data/budgetwatch.db"));
        assert_eq!(config.log_filter, "budgetwatch=warn");
    }
}
