//! User-facing presentation of session problems.

use serde::Serialize;

/// How a notice interacts with the rest of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Replaces the actionable UI; the user cannot continue.
    Blocking,
    /// Shown above the page; the user may close it.
    Dismissible,
}

/// A banner the page renders instead of (or above) its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Translation key of the message.
    pub key: &'static str,
    pub severity: Severity,
    /// Append the generic "how to get a new link" help text.
    pub with_help: bool,
}

impl Notice {
    #[must_use]
    pub const fn blocking(key: &'static str) -> Self {
        Self {
            key,
            severity: Severity::Blocking,
            with_help: false,
        }
    }

    #[must_use]
    pub const fn dismissible(key: &'static str) -> Self {
        Self {
            key,
            severity: Severity::Dismissible,
            with_help: false,
        }
    }

    #[must_use]
    pub const fn with_help(mut self) -> Self {
        self.with_help = true;
        self
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}
