//! Bearer credential value type.
//!
//! Keep raw token parsing at the edges: adapters and the CLI hand strings to
//! [`Credential::new`] before anything is stored or sent.

use std::fmt;

use zeroize::Zeroizing;

/// Domain error returned when a token string cannot become a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Token was empty once trimmed.
    EmptyToken,
    /// Token contained whitespace or control characters.
    MalformedToken,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "token must not be empty"),
            Self::MalformedToken => {
                write!(f, "token must not contain whitespace or control characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Opaque bearer token authorizing backend calls.
///
/// ## Invariants
/// - The token is non-empty after trimming surrounding whitespace.
/// - The token contains no inner whitespace or control characters, so it is
///   always a valid `Authorization` header value.
/// - The token is zeroed on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use bloodbank_console::domain::Credential;
///
/// let credential = Credential::new("  eyJhbGciOi.payload.sig \n").unwrap();
/// assert_eq!(credential.expose(), "eyJhbGciOi.payload.sig");
/// assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
/// assert!(Credential::new("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: Zeroizing<String>,
}

impl Credential {
    /// Validate and wrap a raw token.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        let token = raw.trim();
        if token.is_empty() {
            return Err(CredentialValidationError::EmptyToken);
        }
        if token
            .chars()
            .any(|ch| ch.is_whitespace() || ch.is_control())
        {
            return Err(CredentialValidationError::MalformedToken);
        }
        Ok(Self {
            token: Zeroizing::new(token.to_owned()),
        })
    }

    /// Raw token text for transport adapters and storage.
    pub fn expose(&self) -> &str {
        self.token.as_str()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", CredentialValidationError::EmptyToken)]
    #[case("   ", CredentialValidationError::EmptyToken)]
    #[case("abc def", CredentialValidationError::MalformedToken)]
    #[case("abc\u{7}def", CredentialValidationError::MalformedToken)]
    fn invalid_tokens(#[case] raw: &str, #[case] expected: CredentialValidationError) {
        let err = Credential::new(raw).expect_err("invalid token must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("token", "token")]
    #[case("\ttoken.with.dots\n", "token.with.dots")]
    fn valid_tokens_are_trimmed(#[case] raw: &str, #[case] expected: &str) {
        let credential = Credential::new(raw).expect("valid token");
        assert_eq!(credential.expose(), expected);
    }

    #[test]
    fn debug_output_redacts_token() {
        let credential = Credential::new("super-secret").expect("valid token");
        assert!(!format!("{credential:?}").contains("super-secret"));
    }
}
