//! Configuration and environment selection.
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// CIS environment selection for service endpoints.
///
/// - Demo: the test service operated for integration testing; also the only
///   environment offering the `provjera` (check) operation.
/// - Production: the live fiscalization service.
///
/// # Examples
/// ```rust
/// use std::str::FromStr;
/// use fiskal_core::config::Environment;
///
/// let env = Environment::from_str("demo")?;
/// assert_eq!(env, Environment::Demo);
/// # Ok::<(), fiskal_core::config::EnvironmentParseError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Demo,
    Production,
}

/// Error returned when parsing an [`Environment`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentParseError {
    #[error("invalid environment: {input}")]
    Invalid { input: String },
}

impl FromStr for Environment {
    type Err = EnvironmentParseError;

    fn from_str(env: &str) -> Result<Environment, EnvironmentParseError> {
        match env.to_ascii_lowercase().as_str() {
            "demo" => Ok(Environment::Demo),
            "production" => Ok(Environment::Production),
            _ => Err(EnvironmentParseError::Invalid {
                input: env.to_string(),
            }),
        }
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Demo => "demo",
            Environment::Production => "production",
        }
    }

    pub fn endpoint_url(&self) -> &'static str {
        match self {
            Environment::Demo => "https://cistest.apis-it.hr:8449/FiskalizacijaServiceTest",
            Environment::Production => "https://cis.porezna-uprava.hr:8449/FiskalizacijaService",
        }
    }
}

/// Errors raised while loading configuration, key, or certificate material.
///
/// All material is validated eagerly at construction time so a broken
/// deployment fails at startup, not on the first invoice.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{description} not found: {path}")]
    FileNotFound {
        description: &'static str,
        path: PathBuf,
    },
    #[error("cannot read {description} {path}: {source}")]
    Io {
        description: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot load {description} {path}: {reason}")]
    InvalidMaterial {
        description: &'static str,
        path: PathBuf,
        reason: String,
    },
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client configuration: target environment and the CA bundle used to trust
/// the service's TLS endpoint.
///
/// # Examples
/// ```rust,no_run
/// use fiskal_core::config::{Config, Environment};
///
/// let config = Config::new(Environment::Demo, "certs/fina_ca.pem")?;
/// # let _ = config;
/// # Ok::<(), fiskal_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    env: Environment,
    tls_ca_bundle: PathBuf,
    endpoint_override: Option<String>,
}

impl Config {
    /// Create a configuration, eagerly checking that the TLS CA bundle exists.
    ///
    /// # Errors
    /// Returns [`ConfigError::FileNotFound`] if the bundle path is missing.
    pub fn new(env: Environment, tls_ca_bundle: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let tls_ca_bundle = tls_ca_bundle.into();
        if !tls_ca_bundle.exists() {
            return Err(ConfigError::FileNotFound {
                description: "TLS CA bundle",
                path: tls_ca_bundle,
            });
        }
        Ok(Self {
            env,
            tls_ca_bundle,
            endpoint_override: None,
        })
    }

    /// Override the service endpoint URL, e.g. to point at a local mock.
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_override = Some(url.into());
        self
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn tls_ca_bundle(&self) -> &Path {
        &self.tls_ca_bundle
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint_override
            .as_deref()
            .unwrap_or_else(|| self.env.endpoint_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_known_names() {
        assert_eq!("demo".parse::<Environment>().unwrap(), Environment::Demo);
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("sandbox".parse::<Environment>().is_err());
    }

    #[test]
    fn config_requires_existing_ca_bundle() {
        let err = Config::new(Environment::Demo, "/nonexistent/ca.pem").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn endpoint_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("ca.pem");
        std::fs::write(&bundle, "x").unwrap();

        let config = Config::new(Environment::Demo, &bundle).unwrap();
        assert_eq!(config.endpoint(), Environment::Demo.endpoint_url());

        let config = config.with_endpoint("http://127.0.0.1:9/");
        assert_eq!(config.endpoint(), "http://127.0.0.1:9/");
    }
}
