//! Runtime configuration.
//!
//! Precedence, lowest first: built-in defaults, `.env` / process environment,
//! command-line flags.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::loader::DataSource;

pub const DEFAULT_DATA_PATH: &str = "Allcountries_export_WITS.xlsx";
pub const DEFAULT_SHEET: &str = "By-HS6Product";
pub const DEFAULT_PORT: u16 = 3000;

pub const ENV_DATA: &str = "PETMAP_DATA";
pub const ENV_SHEET: &str = "PETMAP_SHEET";
pub const ENV_PORT: &str = "PETMAP_PORT";
pub const ENV_STATIC_DIR: &str = "PETMAP_STATIC_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub sheet: String,
    pub port: u16,
    /// Built frontend to serve; `None` runs the API alone.
    pub static_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            sheet: DEFAULT_SHEET.to_string(),
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `.env` and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_DATA) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(sheet) = get(ENV_SHEET) {
            config.sheet = sheet;
        }
        if let Some(port) = get(ENV_PORT) {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_PORT.to_string(),
                value: port,
            })?;
        }
        if let Some(dir) = get(ENV_STATIC_DIR) {
            config.static_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_overrides(
        mut self,
        data_path: Option<PathBuf>,
        sheet: Option<String>,
        port: Option<u16>,
        static_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = data_path {
            self.data_path = path;
        }
        if let Some(sheet) = sheet {
            self.sheet = sheet;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if static_dir.is_some() {
            self.static_dir = static_dir;
        }
        self
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::new(self.data_path.clone(), self.sheet.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.data_path, PathBuf::from("Allcountries_export_WITS.xlsx"));
        assert_eq!(config.sheet, "By-HS6Product");
        assert_eq!(config.port, 3000);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA, "data/trade.csv"),
            (ENV_SHEET, " Sheet1 "),
            (ENV_PORT, "8080"),
            (ENV_STATIC_DIR, "frontend/dist"),
        ]))
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("data/trade.csv"));
        assert_eq!(config.sheet, "Sheet1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, Some(PathBuf::from("frontend/dist")));
    }

    #[test]
    fn test_blank_env_ignored() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_SHEET, "  ")])).unwrap();
        assert_eq!(config.sheet, DEFAULT_SHEET);
    }

    #[test]
    fn test_invalid_port() {
        let err = AppConfig::from_lookup(lookup(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PETMAP_PORT"));
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_PORT, "8080")]))
            .unwrap()
            .with_overrides(Some("x.xlsx".into()), None, Some(9000), None);

        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("x.xlsx"));
        assert_eq!(config.sheet, DEFAULT_SHEET);

        let source = config.data_source();
        assert_eq!(source.sheet, DEFAULT_SHEET);
    }
}
