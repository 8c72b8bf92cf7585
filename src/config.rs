use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::session::DEFAULT_TOKEN_PARAM;
use crate::storage::DEFAULT_STORAGE_KEY;

const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Portal configuration.
///
/// The API base URL is a constructor parameter; everything else has a default.
///
/// Use [`from_env()`](PortalConfig::from_env) for convention-based setup,
/// or [`new()`](PortalConfig::new) with `with_*` methods for full control.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct PortalConfig {
    pub(crate) api_url: Url,
    pub(crate) api_timeout: Duration,
    pub(crate) token_param: String,
    pub(crate) storage_key: String,
    pub(crate) cache_ttl: Duration,
    pub(crate) default_language: String,
    pub(crate) secure_cookies: bool,
}

impl PortalConfig {
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            api_timeout: DEFAULT_API_TIMEOUT,
            token_param: DEFAULT_TOKEN_PARAM.into(),
            storage_key: DEFAULT_STORAGE_KEY.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            default_language: "en".into(),
            secure_cookies: true,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `PORTAL_API_URL`: base URL of the settings API
    ///
    /// # Optional env vars
    /// - `PORTAL_API_TIMEOUT_SECS`: per-request timeout (default 15)
    /// - `PORTAL_TOKEN_PARAM`: query parameter carrying fresh tokens (default `token`)
    /// - `PORTAL_TOKEN_STORAGE_KEY`: storage slot / cookie name (default `access_token`)
    /// - `PORTAL_CACHE_TTL_SECS`: cache TTL, `0` disables expiry (default 300)
    /// - `PORTAL_DEFAULT_LANGUAGE`: fallback interface language (default `en`)
    /// - `PORTAL_SECURE_COOKIES`: `"0"` or `"false"` to allow plain-HTTP cookies
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the API URL is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let api_url_str = lookup("PORTAL_API_URL")
            .ok_or_else(|| Error::Config("PORTAL_API_URL is required".into()))?;
        let api_url: Url = api_url_str
            .parse()
            .map_err(|e| Error::Config(format!("PORTAL_API_URL: {e}")))?;

        let mut config = Self::new(api_url);

        if let Some(secs) = lookup("PORTAL_API_TIMEOUT_SECS") {
            config = config.with_api_timeout(Duration::from_secs(parse_secs(
                "PORTAL_API_TIMEOUT_SECS",
                &secs,
            )?));
        }
        if let Some(param) = lookup("PORTAL_TOKEN_PARAM") {
            config = config.with_token_param(param);
        }
        if let Some(key) = lookup("PORTAL_TOKEN_STORAGE_KEY") {
            config = config.with_storage_key(key);
        }
        if let Some(secs) = lookup("PORTAL_CACHE_TTL_SECS") {
            config = config.with_cache_ttl(Duration::from_secs(parse_secs(
                "PORTAL_CACHE_TTL_SECS",
                &secs,
            )?));
        }
        if let Some(lang) = lookup("PORTAL_DEFAULT_LANGUAGE") {
            config = config.with_default_language(lang);
        }
        if let Some(secure) = lookup("PORTAL_SECURE_COOKIES") {
            config = config.with_secure_cookies(!matches!(secure.as_str(), "0" | "false"));
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_api_timeout(mut self, timeout: Duration) -> Self {
        self.api_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token_param(mut self, param: impl Into<String>) -> Self {
        self.token_param = param.into();
        self
    }

    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// `Duration::ZERO` keeps cached entries until explicitly invalidated.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        self.api_timeout
    }

    #[must_use]
    pub fn token_param(&self) -> &str {
        &self.token_param
    }

    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    #[must_use]
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Cache TTL as a `time::Duration`, as the caches expect.
    #[must_use]
    pub fn cache_ttl_time(&self) -> time::Duration {
        time::Duration::try_from(self.cache_ttl).unwrap_or(time::Duration::MAX)
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.secure_cookies
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, Error> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = PortalConfig::new("https://api.example.com/".parse().unwrap());
        assert_eq!(config.token_param(), "token");
        assert_eq!(config.storage_key(), "access_token");
        assert_eq!(config.api_timeout(), Duration::from_secs(15));
        assert_eq!(config.default_language(), "en");
        assert!(config.secure_cookies());
    }

    #[test]
    fn api_url_required() {
        let err = PortalConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("PORTAL_API_URL")));
    }

    #[test]
    fn overrides_from_env() {
        let config = PortalConfig::from_lookup(lookup(&[
            ("PORTAL_API_URL", "https://api.example.com/v1/"),
            ("PORTAL_API_TIMEOUT_SECS", "5"),
            ("PORTAL_CACHE_TTL_SECS", "0"),
            ("PORTAL_DEFAULT_LANGUAGE", "uk"),
            ("PORTAL_SECURE_COOKIES", "false"),
        ]))
        .unwrap();
        assert_eq!(config.api_url().as_str(), "https://api.example.com/v1/");
        assert_eq!(config.api_timeout(), Duration::from_secs(5));
        assert_eq!(config.cache_ttl_time(), time::Duration::ZERO);
        assert_eq!(config.default_language(), "uk");
        assert!(!config.secure_cookies());
    }

    #[test]
    fn invalid_number_rejected() {
        let err = PortalConfig::from_lookup(lookup(&[
            ("PORTAL_API_URL", "https://api.example.com/"),
            ("PORTAL_API_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.starts_with("PORTAL_API_TIMEOUT_SECS")));
    }
}
