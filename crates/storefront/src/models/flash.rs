//! One-shot notices shown on the next rendered page.
//!
//! A handler pushes a [`Flash`] before redirecting; the page context takes it
//! out of the session when the next page renders, so each notice appears once.
//! A newer notice replaces an unread one.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Notice severity, mapped to a CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// CSS class suffix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub severity: Severity,
}

impl Flash {
    /// Build a notice.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// CSS class for the template.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        self.severity.as_str()
    }
}

/// Store a notice for the next rendered page.
///
/// Failures are logged and swallowed: losing a notice must not fail the
/// request that produced it.
pub async fn push_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(keys::FLASH, &flash).await {
        tracing::error!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending notice, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        }
    }
}
