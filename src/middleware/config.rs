use std::sync::Arc;

use axum_extra::extract::cookie::Key;

use super::state::SessionLayerState;
use crate::clock::{Clock, SystemClock};
use crate::config::PortalConfig;
use crate::error::Error;
use crate::i18n::Translator;

/// Cookie and query settings shared by config and runtime state.
#[derive(Clone)]
pub(crate) struct SessionSettings {
    pub(crate) cookie_key: Key,
    pub(crate) cookie_name: String,
    pub(crate) token_param: String,
    pub(crate) secure_cookies: bool,
}

/// Session layer configuration.
///
/// Built from a [`PortalConfig`]; the cookie key defaults to an ephemeral
/// random key, which logs every tab out on restart.
pub struct SessionLayerConfig {
    pub(super) settings: SessionSettings,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) translator: Arc<Translator>,
}

impl SessionLayerConfig {
    #[must_use]
    pub fn new(portal: &PortalConfig) -> Self {
        Self {
            settings: SessionSettings {
                cookie_key: Key::generate(),
                cookie_name: portal.storage_key().to_owned(),
                token_param: portal.token_param().to_owned(),
                secure_cookies: portal.secure_cookies(),
            },
            clock: Arc::new(SystemClock),
            translator: Arc::new(Translator::new(portal.default_language())),
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads everything [`PortalConfig::from_env`] reads, plus
    /// `COOKIE_KEY`: cookie encryption key bytes (at least 64).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the portal config is invalid or
    /// `COOKIE_KEY` is set but too short.
    pub fn from_env() -> Result<Self, Error> {
        let portal = PortalConfig::from_env()?;
        let config = Self::new(&portal);
        match std::env::var("COOKIE_KEY") {
            Ok(k) => {
                let key = Key::try_from(k.as_bytes()).map_err(|_| {
                    Error::Config(
                        "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                         Remove the env var to use an ephemeral key, or provide a valid key."
                            .into(),
                    )
                })?;
                Ok(config.with_cookie_key(key))
            }
            Err(_) => {
                tracing::warn!("COOKIE_KEY not set, sessions will not survive a restart");
                Ok(config)
            }
        }
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Translator whose languages [`PageLanguage`](super::PageLanguage) recognises.
    #[must_use]
    pub fn with_translator(mut self, translator: Translator) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    #[must_use]
    pub(super) fn into_state(self) -> SessionLayerState {
        SessionLayerState {
            settings: self.settings,
            clock: self.clock,
            translator: self.translator,
        }
    }
}
