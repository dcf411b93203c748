//! Customer email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an email address was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// Blank after trimming.
    #[error("email cannot be empty")]
    Empty,
    /// Longer than [`Email::MAX_LENGTH`].
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Not a single `@` between a non-empty name and domain.
    #[error("email must look like name@domain")]
    Malformed,
}

/// A trimmed email address with a non-empty name and domain around one `@`.
///
/// Stored user documents are checked on load as well, so a record with a
/// broken address reads as corrupt instead of as a user nobody can sign in as.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 limit.
    pub const MAX_LENGTH: usize = 254;

    /// Parse and trim an address.
    ///
    /// # Errors
    ///
    /// Returns an `EmailError` if the address is blank, too long, or not of
    /// the form `name@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((name, domain))
                if !name.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// The address as entered, minus surrounding whitespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether two addresses belong to the same account.
    #[must_use]
    pub fn same_account(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_common_shapes() {
        for raw in ["ama@example.com", "ama.mensah+shop@mail.example.gh", "a@b"] {
            assert_eq!(Email::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_parse_trims() {
        let email = Email::parse("  buyer@flawless.gh \n").unwrap();
        assert_eq!(email.to_string(), "buyer@flawless.gh");
    }

    #[test]
    fn test_parse_rejects() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("no-at-sign"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@flawless.gh"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ama@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("ama@x@y"), Err(EmailError::Malformed));

        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong { max: 254 })
        );
    }

    #[test]
    fn test_same_account_ignores_case() {
        let a = Email::parse("Ama@Example.com").unwrap();
        let b = Email::parse("ama@example.COM").unwrap();
        assert!(a.same_account(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_stored_addresses_are_validated() {
        let email: Email = serde_json::from_str("\"ama@example.com\"").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"ama@example.com\"");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
