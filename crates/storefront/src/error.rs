//! Error types and Sentry helpers.
//!
//! The cart core itself has no user-visible error path: invalid mutations
//! are ignored and notification failures are logged. [`AppError`] covers the
//! fallible edges around it (configuration, client construction) so binaries
//! can bubble them up with `?`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::notify::NotifyError;

/// Application-level error type for the storefront cart core.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Notifier could not be built.
    #[error("Notifier error: {0}")]
    Notify(#[from] NotifyError),

    /// Bad input from a caller (e.g. a malformed replay script).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the signed-in customer.
///
/// Call this on sign-in so dispatch failures are associated with the customer.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for cart activity.
///
/// Breadcrumbs appear in Sentry reports to show the trail of cart changes
/// leading up to a failed dispatch.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
