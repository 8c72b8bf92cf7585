use std::future::Future;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::PortalConfig;
use crate::error::Error;
use crate::models::{ApiErrorBody, ChatSummary, Purchase, Sponsorship, UsageRecord, UserSettings};
use crate::types::{SponsorId, UserId};

/// HTTP client for the settings API.
///
/// Every request carries the caller's bearer token and a JSON content type,
/// and is abandoned with [`Error::Timeout`] after the configured timeout.
/// Nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    timeout: Duration,
    http: reqwest::Client,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            timeout: config.api_timeout,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch the user's settings.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn get_settings(&self, token: &str, user: &UserId) -> Result<UserSettings, Error> {
        let path = ["users", user.as_str(), "settings"];
        self.send(Method::GET, &path, token, None::<&()>, "settings request")
            .await
    }

    /// Replace the user's settings; returns the stored document.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn update_settings(
        &self,
        token: &str,
        user: &UserId,
        settings: &UserSettings,
    ) -> Result<UserSettings, Error> {
        let path = ["users", user.as_str(), "settings"];
        self.send(Method::PUT, &path, token, Some(settings), "settings update")
            .await
    }

    /// List the chats the user can configure.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn list_chats(&self, token: &str, user: &UserId) -> Result<Vec<ChatSummary>, Error> {
        let path = ["users", user.as_str(), "chats"];
        self.send(Method::GET, &path, token, None::<&()>, "chats request")
            .await
    }

    /// List sponsorships given and received by the user.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn list_sponsorships(
        &self,
        token: &str,
        user: &UserId,
    ) -> Result<Vec<Sponsorship>, Error> {
        let path = ["users", user.as_str(), "sponsorships"];
        self.send(Method::GET, &path, token, None::<&()>, "sponsorships request")
            .await
    }

    /// Revoke the sponsorship `sponsor` gives to `user`.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn revoke_sponsorship(
        &self,
        token: &str,
        user: &UserId,
        sponsor: &SponsorId,
    ) -> Result<(), Error> {
        let path = ["users", user.as_str(), "sponsorships", sponsor.as_str()];
        let url = self.url(&path)?;
        let request = self.request(Method::DELETE, url, token);
        self.with_timeout("sponsorship revoke", async {
            let response = request.send().await?;
            Self::ensure_success(response, "sponsorship revoke").await?;
            Ok(())
        })
        .await
    }

    /// Usage history.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn list_usage(&self, token: &str, user: &UserId) -> Result<Vec<UsageRecord>, Error> {
        let path = ["users", user.as_str(), "usage"];
        self.send(Method::GET, &path, token, None::<&()>, "usage request")
            .await
    }

    /// Purchase history.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Http`] or [`Error::Api`].
    pub async fn list_purchases(&self, token: &str, user: &UserId) -> Result<Vec<Purchase>, Error> {
        let path = ["users", user.as_str(), "purchases"];
        self.send(Method::GET, &path, token, None::<&()>, "purchases request")
            .await
    }

    /// Sends a JSON request to the endpoint under the base URL named by
    /// `path` and decodes the JSON response.
    ///
    /// Each element of `path` is one percent-encoded segment, so ids may
    /// contain `/`, `?` or `#` without leaving their segment.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] if the whole exchange does not finish in time,
    /// [`Error::Http`] on connection or decode failure, [`Error::Api`] on a
    /// non-success status, [`Error::InvalidPathSegment`] for an empty, `.`
    /// or `..` segment.
    pub async fn send<B, T>(
        &self,
        method: Method,
        path: &[&str],
        token: &str,
        body: Option<&B>,
        operation: &'static str,
    ) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path)?;
        let mut request = self.request(method, url, token);
        if let Some(body) = body {
            request = request.json(body);
        }

        self.with_timeout(operation, async {
            let response = request.send().await?;
            let response = Self::ensure_success(response, operation).await?;
            response.json::<T>().await.map_err(Into::into)
        })
        .await
    }

    fn url(&self, path: &[&str]) -> Result<Url, Error> {
        // `extend` escapes each segment but silently drops `.` and `..`
        if let Some(bad) = path.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(Error::InvalidPathSegment((*bad).to_owned()));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Config(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout_secs = self.timeout.as_secs(), "API request timed out");
                Err(Error::Timeout {
                    operation,
                    after: self.timeout,
                })
            }
        }
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<ApiErrorBody>(&body).ok();
        let code = parsed.as_ref().and_then(|b| b.code);
        let detail = parsed.and_then(|b| b.message).unwrap_or(body);
        tracing::debug!(operation, status, ?code, "API request failed");
        Err(Error::Api {
            operation,
            status,
            code,
            detail,
        })
    }
}
