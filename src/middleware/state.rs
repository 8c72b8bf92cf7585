use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::SessionSettings;
use crate::clock::Clock;
use crate::i18n::Translator;

/// Shared state of the session layer.
#[derive(Clone)]
pub struct SessionLayerState {
    pub(super) settings: SessionSettings,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) translator: Arc<Translator>,
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<SessionLayerState> for Key {
    fn from_ref(state: &SessionLayerState) -> Self {
        state.settings.cookie_key.clone()
    }
}
