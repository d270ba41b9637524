//! Signed-in customer identity.

use aurora_core::{CustomerId, Email, PhoneNumber};
use serde::{Deserialize, Serialize};

/// The customer attached to a cart session.
///
/// A session with a customer is "authenticated" for abandonment purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer ID from the accounts backend.
    pub id: CustomerId,
    /// Contact email, used by the email tier.
    pub email: Email,
    /// Display name as entered at sign-up.
    pub name: String,
    /// WhatsApp destination; the WhatsApp tier needs one.
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
}

impl Customer {
    /// The first word of the display name, for greetings.
    ///
    /// Falls back to the email's local part when the name is blank.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or_else(|| {
            self.email
                .as_str()
                .split_once('@')
                .map_or("", |(local, _)| local)
        })
    }
}
