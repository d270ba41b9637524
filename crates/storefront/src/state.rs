//! Application state shared across sessions.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::notify::{HttpNotifier, Notifier, NotifyError};
use crate::session::{CartSession, SessionConfig};

/// Configuration and notifier shared by every cart session.
///
/// This struct is cheaply cloneable via `Arc`.
pub struct AppState<N> {
    inner: Arc<AppStateInner<N>>,
}

struct AppStateInner<N> {
    config: StorefrontConfig,
    notifier: Arc<N>,
}

impl<N> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N> std::fmt::Debug for AppState<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl AppState<HttpNotifier> {
    /// Create state that dispatches to the configured HTTP endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, NotifyError> {
        let notifier = HttpNotifier::new(&config.notify)?;
        Ok(Self::new(config, notifier))
    }
}

impl<N: Notifier> AppState<N> {
    #[must_use]
    pub fn new(config: StorefrontConfig, notifier: N) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                notifier: Arc::new(notifier),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn notifier(&self) -> &Arc<N> {
        &self.inner.notifier
    }

    /// Start a new cart session using this state's settings.
    #[must_use]
    pub fn new_session(&self) -> CartSession<N> {
        CartSession::new(
            Arc::clone(&self.inner.notifier),
            SessionConfig::from(&self.inner.config),
        )
    }
}
