//! Session handling for portal pages served with Axum.
//!
//! The layer resolves the page session on every request: it captures a
//! fresh token from the URL into an encrypted browser-session cookie,
//! redirects to the clean URL, and exposes the outcome to handlers.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use bot_settings_portal::middleware::{PageSession, SessionLayerConfig, with_session};
//!
//! // 1. Configure from environment
//! let config = SessionLayerConfig::from_env()?;
//!
//! // 2. Wrap the page router
//! let app = with_session(
//!     axum::Router::new().route("/{lang}/settings", get(settings_page)),
//!     config,
//! );
//!
//! // 3. Require a valid session in handlers
//! async fn settings_page(PageSession(token): PageSession) -> impl IntoResponse { ... }
//! ```

mod config;
mod cookies;
mod error;
mod extractor;
mod layer;
mod state;

pub use config::SessionLayerConfig;
pub use error::SessionRejection;
pub use extractor::{PageLanguage, PageSession};
pub use layer::{session_layer, with_session};
pub use state::SessionLayerState;

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
