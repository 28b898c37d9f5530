use std::fmt;

use serde::{Deserialize, Serialize};

/// A syntactically valid email address.
///
/// Validation is structural only: bounded length, exactly one non-empty
/// local part and domain around an `@`. Proving the address is deliverable
/// is the OTP flow's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

/// RFC 5321 length limit.
const MAX_LENGTH: usize = 254;

impl Email {
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("email cannot be empty".to_string());
        }
        if s.len() > MAX_LENGTH {
            return Err(format!("email must be at most {} characters", MAX_LENGTH));
        }

        let at_pos = s
            .find('@')
            .ok_or_else(|| "email must contain an @ symbol".to_string())?;

        if at_pos == 0 {
            return Err("email local part cannot be empty".to_string());
        }
        if at_pos == s.len() - 1 {
            return Err("email domain cannot be empty".to_string());
        }
        if !s[at_pos + 1..].contains('.') {
            return Err("email domain must contain a dot".to_string());
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("alice@x.com").is_ok());
        assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
        assert!(Email::parse("user@subdomain.example.com").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(Email::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_at() {
        assert!(Email::parse("no-at-symbol").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_local_part() {
        assert!(Email::parse("@domain.com").is_err());
    }

    #[test]
    fn test_parse_rejects_empty_domain() {
        assert!(Email::parse("user@").is_err());
        assert!(Email::parse("user@nodot").is_err());
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(Email::parse(&long).is_err());
    }

    #[test]
    fn test_display_and_as_str() {
        let email = Email::parse("alice@x.com").unwrap();
        assert_eq!(email.as_str(), "alice@x.com");
        assert_eq!(format!("{}", email), "alice@x.com");
    }
}
