use crate::api::ApiClient;
use crate::cache::PortalCaches;
use crate::clock::{Clock, SystemClock};
use crate::config::PortalConfig;
use crate::error::Error;
use crate::models::{ChatSummary, Purchase, Sponsorship, UsageRecord, UserSettings};
use crate::session::SessionState;
use crate::token::{AccessClaims, DecodedToken};
use crate::types::{SponsorId, UserId};

type Caches<C> = PortalCaches<UserSettings, Vec<ChatSummary>, Vec<Sponsorship>, C>;

/// Portal data access for the signed-in user.
///
/// Settings, chats and sponsorships are served from per-user caches when
/// present; writes refresh the cached copy. Usage and purchase history
/// always hit the API.
#[derive(Debug)]
pub struct PortalService<C = SystemClock> {
    client: ApiClient,
    caches: Caches<C>,
}

impl PortalService {
    #[must_use]
    pub fn new(config: &PortalConfig) -> Self {
        Self::with_clock(ApiClient::new(config), config, SystemClock)
    }
}

impl<C: Clock + Clone> PortalService<C> {
    #[must_use]
    pub fn with_clock(client: ApiClient, config: &PortalConfig, clock: C) -> Self {
        Self {
            client,
            caches: PortalCaches::new(config.cache_ttl_time(), clock),
        }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn caches(&self) -> &Caches<C> {
        &self.caches
    }

    /// # Errors
    ///
    /// API errors from [`ApiClient::get_settings`].
    pub async fn settings(&self, session: &Session<'_>) -> Result<UserSettings, Error> {
        if let Some(cached) = self.caches.settings.get(session.user()) {
            return Ok(cached);
        }
        let settings = self.client.get_settings(session.raw(), session.user()).await?;
        self.caches.settings.set(session.user().clone(), settings.clone());
        Ok(settings)
    }

    /// Saves settings and caches the server's copy.
    ///
    /// # Errors
    ///
    /// API errors from [`ApiClient::update_settings`]. The cache is left as it was.
    pub async fn save_settings(
        &self,
        session: &Session<'_>,
        settings: &UserSettings,
    ) -> Result<UserSettings, Error> {
        let saved = self
            .client
            .update_settings(session.raw(), session.user(), settings)
            .await?;
        self.caches.settings.set(session.user().clone(), saved.clone());
        Ok(saved)
    }

    /// # Errors
    ///
    /// API errors from [`ApiClient::list_chats`].
    pub async fn chats(&self, session: &Session<'_>) -> Result<Vec<ChatSummary>, Error> {
        if let Some(cached) = self.caches.chats.get(session.user()) {
            return Ok(cached);
        }
        let chats = self.client.list_chats(session.raw(), session.user()).await?;
        self.caches.chats.set(session.user().clone(), chats.clone());
        Ok(chats)
    }

    /// # Errors
    ///
    /// API errors from [`ApiClient::list_sponsorships`].
    pub async fn sponsorships(&self, session: &Session<'_>) -> Result<Vec<Sponsorship>, Error> {
        if let Some(cached) = self.caches.sponsorships.get(session.user()) {
            return Ok(cached);
        }
        let sponsorships = self
            .client
            .list_sponsorships(session.raw(), session.user())
            .await?;
        self.caches
            .sponsorships
            .set(session.user().clone(), sponsorships.clone());
        Ok(sponsorships)
    }

    /// Revokes a sponsorship and drops the cached list.
    ///
    /// # Errors
    ///
    /// API errors from [`ApiClient::revoke_sponsorship`].
    pub async fn revoke_sponsorship(
        &self,
        session: &Session<'_>,
        sponsor: &SponsorId,
    ) -> Result<(), Error> {
        self.client
            .revoke_sponsorship(session.raw(), session.user(), sponsor)
            .await?;
        self.caches.sponsorships.clear(session.user());
        Ok(())
    }

    /// # Errors
    ///
    /// API errors from [`ApiClient::list_usage`].
    pub async fn usage(&self, session: &Session<'_>) -> Result<Vec<UsageRecord>, Error> {
        self.client.list_usage(session.raw(), session.user()).await
    }

    /// # Errors
    ///
    /// API errors from [`ApiClient::list_purchases`].
    pub async fn purchases(&self, session: &Session<'_>) -> Result<Vec<Purchase>, Error> {
        self.client.list_purchases(session.raw(), session.user()).await
    }

    /// Drops every cached value for the user (manual reload).
    pub fn refresh(&self, user: &UserId) {
        self.caches.forget_user(user);
    }
}

/// A valid session borrowed from a [`SessionState`].
#[derive(Debug, Clone, Copy)]
pub struct Session<'a> {
    token: &'a DecodedToken<AccessClaims>,
}

impl<'a> Session<'a> {
    #[must_use]
    pub fn new(token: &'a DecodedToken<AccessClaims>) -> Self {
        Self { token }
    }

    /// `None` unless the state is valid.
    #[must_use]
    pub fn from_state(state: &'a SessionState) -> Option<Self> {
        state.token().map(Self::new)
    }

    #[must_use]
    pub fn raw(&self) -> &'a str {
        self.token.raw()
    }

    #[must_use]
    pub fn user(&self) -> &'a UserId {
        &self.token.claims().sub
    }

    #[must_use]
    pub fn claims(&self) -> &'a AccessClaims {
        self.token.claims()
    }
}
