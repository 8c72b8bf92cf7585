#![doc = include_str!("../README.md")]

#[cfg(feature = "api")]
pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod i18n;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod models;
pub mod notice;
#[cfg(feature = "api")]
pub mod service;
pub mod session;
pub mod storage;
pub mod token;
pub mod types;

// Re-exports for convenient access
#[cfg(feature = "api")]
pub use api::ApiClient;
pub use cache::{PortalCaches, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::PortalConfig;
pub use error::Error;
pub use i18n::{ResolveOptions, TranslationError, Translator};
pub use notice::{Notice, Severity};
#[cfg(feature = "api")]
pub use service::{PortalService, Session};
pub use session::{Resolution, SessionResolver, SessionState, strip_token_param};
pub use storage::{MemoryTokenStorage, TokenStorage, UnavailableTokenStorage};
pub use token::{AccessClaims, DecodedToken, LegacyClaims, TokenError};
pub use types::{Platform, SponsorId, UserId};
