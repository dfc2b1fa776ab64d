//! Base URL resolution for [`LogApiClient`](crate::LogApiClient).
//!
//! The environment is read once by bootstrap code and turned into a
//! [`ClientConfig`]. The client itself never consults ambient state.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;

/// Environment variable carrying the deployment environment signal.
pub const ENVIRONMENT_ENV: &str = "DUO_UI_ENV";

/// Environment variable carrying the deployment origin used in production.
pub const ORIGIN_ENV: &str = "DUO_UI_ORIGIN";

/// Origin of the log backend during local development.
pub const DEVELOPMENT_ORIGIN: &str = "http://localhost:3000";

/// Deployment environment selecting the API base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    /// Served alongside the backend: requests go to `/` of the deployment origin.
    Production,
    /// Local development against [`DEVELOPMENT_ORIGIN`].
    #[default]
    Development,
}

impl Environment {
    /// Read [`ENVIRONMENT_ENV`]. Anything other than `production` selects
    /// development.
    pub fn from_env() -> Self {
        env::var(ENVIRONMENT_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("production") {
            Ok(Self::Production)
        } else {
            Ok(Self::Development)
        }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    /// Use `base_url` verbatim, after validation. A trailing `/` is added
    /// when missing so relative API paths nest beneath it.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self { base_url })
    }

    /// Select the base URL for `environment`.
    ///
    /// Production resolves the root-relative path `/` against
    /// `deployment_origin`; development ignores the origin.
    pub fn for_environment(environment: Environment, deployment_origin: Option<&str>) -> Result<Self> {
        match environment {
            Environment::Development => Self::new(DEVELOPMENT_ORIGIN),
            Environment::Production => {
                let origin = deployment_origin
                    .ok_or_else(|| anyhow!("a deployment origin is required in production"))?;
                let origin = normalize_base_url(origin)?;
                let root = origin.join("/").context("resolve root path against deployment origin")?;
                Ok(Self { base_url: root })
            }
        }
    }

    /// Bootstrap helper reading [`ENVIRONMENT_ENV`] and, in production,
    /// [`ORIGIN_ENV`].
    pub fn from_env() -> Result<Self> {
        let environment = Environment::from_env();
        let origin = env::var(ORIGIN_ENV).ok();
        Self::for_environment(environment, origin.as_deref())
            .with_context(|| format!("resolve API base URL for {environment:?}"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

fn normalize_base_url(base: &str) -> Result<Url> {
    let mut parsed = Url::parse(base.trim()).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base, e))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!(
            "API base URL must use http or https; got '{}://'",
            parsed.scheme()
        ));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(anyhow!("API base URL must include a host"));
    }

    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    parsed.set_query(None);
    parsed.set_fragment(None);
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_uses_fixed_origin() {
        let config = ClientConfig::for_environment(Environment::Development, Some("https://logs.example.com")).unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:3000/");
    }

    #[test]
    fn production_is_root_of_deployment_origin() {
        let config =
            ClientConfig::for_environment(Environment::Production, Some("https://logs.example.com/ui/search")).unwrap();
        assert_eq!(config.base_url().as_str(), "https://logs.example.com/");

        assert!(ClientConfig::for_environment(Environment::Production, None).is_err());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let config = ClientConfig::new("http://127.0.0.1:8080/duo?x=1").unwrap();
        assert_eq!(config.base_url().as_str(), "http://127.0.0.1:8080/duo/");
    }

    #[test]
    fn rejects_unsupported_base_urls() {
        assert!(ClientConfig::new("ftp://logs.example.com").is_err());
        assert!(ClientConfig::new("not a url").is_err());
    }

    #[test]
    fn environment_signal_parsing() {
        assert_eq!("production".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!(" Production ".parse::<Environment>().unwrap(), Environment::Production);
        assert_eq!("staging".parse::<Environment>().unwrap(), Environment::Development);
    }

    #[test]
    fn from_env_reads_signal_and_origin() {
        temp_env::with_vars(
            [(ENVIRONMENT_ENV, Some("production")), (ORIGIN_ENV, Some("https://logs.example.com"))],
            || {
                let config = ClientConfig::from_env().unwrap();
                assert_eq!(config.base_url().as_str(), "https://logs.example.com/");
            },
        );
        temp_env::with_vars([(ENVIRONMENT_ENV, None::<&str>), (ORIGIN_ENV, None)], || {
            let config = ClientConfig::from_env().unwrap();
            assert_eq!(config.base_url().as_str(), "http://localhost:3000/");
        });
    }
}
