use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration du processus, résolue une fois au démarrage puis immuable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub rac_path: PathBuf,
    pub ras_host: String,
    pub ras_port: u16,
    pub cluster_uuid: Option<String>,
    /// secondes, fractions acceptées
    pub request_timeout: f64,
    pub fake_data_dir: Option<PathBuf>,
    pub bind: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rac_path: PathBuf::from("/opt/1cv8/x86_64/8.3.27.1719/rac"),
            ras_host: "localhost".into(),
            ras_port: 1545,
            cluster_uuid: None,
            request_timeout: DEFAULT_TIMEOUT.as_secs_f64(),
            fake_data_dir: None,
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

/// Source d'acquisition retenue pour ce processus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMode {
    Process,
    Fixture(PathBuf),
}

impl Settings {
    /// `host:port` du serveur RAS, dernier argument de chaque invocation rac.
    pub fn ras_address(&self) -> String {
        format!("{}:{}", self.ras_host, self.ras_port)
    }

    /// Timeout par invocation rac. Une valeur hors plage (réglée à la main) retombe sur le défaut.
    pub fn timeout(&self) -> Duration {
        timeout_from_secs(self.request_timeout).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn client_mode(&self) -> ClientMode {
        match &self.fake_data_dir {
            Some(dir) => ClientMode::Fixture(dir.clone()),
            None => ClientMode::Process,
        }
    }

    /// Charge le fichier YAML optionnel puis applique les variables d'environnement.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("RASMON_CONFIG").unwrap_or_else(|_| "rasmon.yaml".into());
        let base = Self::from_file(Path::new(&path))?;
        base.with_overrides(|var| std::env::var(var).ok())
    }

    /// Fichier absent ou vide = valeurs par défaut.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(&txt).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        check_timeout(settings.request_timeout, "request_timeout")?;
        Ok(settings)
    }

    /// Applique les surcharges `RAC_PATH`, `RAS_HOST`, `RAS_PORT`, `CLUSTER_UUID`,
    /// `RAC_TIMEOUT`, `RAS_FAKE_DATA`, `RASMON_BIND` lues via `lookup`.
    /// Une valeur vide pour `CLUSTER_UUID` / `RAS_FAKE_DATA` les désactive.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RAC_PATH") {
            self.rac_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("RAS_HOST") {
            self.ras_host = v;
        }
        if let Some(v) = lookup("RAS_PORT") {
            self.ras_port = parse_var("RAS_PORT", &v)?;
        }
        if let Some(v) = lookup("CLUSTER_UUID") {
            self.cluster_uuid = Some(v).filter(|v| !v.trim().is_empty());
        }
        if let Some(v) = lookup("RAC_TIMEOUT") {
            self.request_timeout = check_timeout(parse_var("RAC_TIMEOUT", &v)?, "RAC_TIMEOUT")?;
        }
        if let Some(v) = lookup("RAS_FAKE_DATA") {
            self.fake_data_dir = Some(v).filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        }
        if let Some(v) = lookup("RASMON_BIND") {
            self.bind = parse_var("RASMON_BIND", &v)?;
        }
        Ok(self)
    }
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Strictement positif et représentable en `Duration`.
fn timeout_from_secs(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|d| !d.is_zero())
}

fn check_timeout(seconds: f64, var: &'static str) -> Result<f64, ConfigError> {
    match timeout_from_secs(seconds) {
        Some(_) => Ok(seconds),
        None => Err(ConfigError::InvalidValue { var, value: seconds.to_string() }),
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ras_address(), "localhost:1545");
        assert_eq!(settings.timeout(), Duration::from_secs(10));
        assert_eq!(settings.client_mode(), ClientMode::Process);
    }

    #[test]
    fn test_env_overrides() {
        let settings = Settings::default()
            .with_overrides(env(&[
                ("RAS_HOST", "srv1c"),
                ("RAS_PORT", "2545"),
                ("CLUSTER_UUID", "c-1"),
                ("RAC_TIMEOUT", "2.5"),
                ("RAS_FAKE_DATA", "/tmp/captures"),
            ]))
            .unwrap();
        assert_eq!(settings.ras_address(), "srv1c:2545");
        assert_eq!(settings.cluster_uuid.as_deref(), Some("c-1"));
        assert_eq!(settings.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.client_mode(), ClientMode::Fixture(PathBuf::from("/tmp/captures")));
    }

    #[test]
    fn test_empty_values_disable_optional_settings() {
        let settings = Settings {
            cluster_uuid: Some("x".into()),
            ..Settings::default()
        }
        .with_overrides(env(&[("CLUSTER_UUID", ""), ("RAS_FAKE_DATA", "")]))
        .unwrap();
        assert_eq!(settings.cluster_uuid, None);
        assert_eq!(settings.fake_data_dir, None);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = Settings::default()
            .with_overrides(env(&[("RAS_PORT", "port")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "RAS_PORT", .. }));

        let err = Settings::default()
            .with_overrides(env(&[("RAC_TIMEOUT", "-1")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "RAC_TIMEOUT", .. }));
    }

    #[test]
    fn test_unrepresentable_timeout_is_rejected() {
        for value in ["1e30", "0", "NaN", "inf"] {
            let err = Settings::default()
                .with_overrides(env(&[("RAC_TIMEOUT", value)]))
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { var: "RAC_TIMEOUT", .. }),
                "value {value}"
            );
        }
    }

    #[test]
    fn test_hand_built_timeout_does_not_panic() {
        let settings = Settings {
            request_timeout: 1e30,
            ..Settings::default()
        };
        assert_eq!(settings.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rasmon.yaml");
        std::fs::write(&path, "ras_host: srv1c\nrequest_timeout: 3\ncluster_uuid: abc\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.ras_host, "srv1c");
        assert_eq!(settings.request_timeout, 3.0);
        assert_eq!(settings.cluster_uuid.as_deref(), Some("abc"));
        assert_eq!(settings.ras_port, 1545);
    }

    #[test]
    fn test_yaml_negative_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rasmon.yaml");
        std::fs::write(&path, "request_timeout: -2\n").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "request_timeout", .. }));
    }

    #[test]
    fn test_missing_yaml_file_gives_defaults() {
        let settings = Settings::from_file(Path::new("/nonexistent/rasmon.yaml")).unwrap();
        assert_eq!(settings, Settings::default());
    }
}
