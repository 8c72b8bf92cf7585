use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Platform user identifier (token `sub` claim).
///
/// Opaque to the portal. Used as the key for every per-user cache.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Identifier of the user paying for another user's usage (`sponsored_by` claim).
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct SponsorId(pub String);

impl SponsorId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Messaging platform the token was issued for.
///
/// Unrecognised values decode as [`Platform::Unknown`] instead of failing the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Platform {
    #[display("telegram")]
    Telegram,
    #[display("whatsapp")]
    Whatsapp,
    #[display("background")]
    Background,
    #[display("github")]
    Github,
    #[default]
    #[serde(other)]
    #[display("unknown")]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_known_values() {
        let p: Platform = serde_json::from_str("\"telegram\"").unwrap();
        assert_eq!(p, Platform::Telegram);
        let p: Platform = serde_json::from_str("\"github\"").unwrap();
        assert_eq!(p, Platform::Github);
    }

    #[test]
    fn platform_unrecognised_is_unknown() {
        let p: Platform = serde_json::from_str("\"signal\"").unwrap();
        assert_eq!(p, Platform::Unknown);
    }

    #[test]
    fn platform_display_matches_wire_name() {
        assert_eq!(Platform::Whatsapp.to_string(), "whatsapp");
        assert_eq!(
            serde_json::to_string(&Platform::Whatsapp).unwrap(),
            "\"whatsapp\""
        );
    }

    #[test]
    fn user_id_serde_transparent() {
        let id = UserId::from("u-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"u-42\"");
        assert_eq!(id.to_string(), "u-42");
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_user_id(_: &UserId) {}
        fn takes_sponsor_id(_: &SponsorId) {}

        takes_user_id(&UserId::from("id"));
        takes_sponsor_id(&SponsorId::from("id".to_string()));
    }
}
