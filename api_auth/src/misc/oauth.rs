use std::fmt;

use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum OAuthProvider {
    GitHub,
    Google,
}

impl OAuthProvider {
    /// Returns the OAuth provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::GitHub => "github",
            OAuthProvider::Google => "google",
        }
    }

    /// Creates an OAuth provider from a string.
    pub fn from_str(s: &str) -> Res<Self> {
        match s {
            "github" => Ok(OAuthProvider::GitHub),
            "google" => Ok(OAuthProvider::Google),
            ps => Err(AppError::BadRequest(format!("Invalid OAuth provider: {}", ps))),
        }
    }

    /// Returns the scopes for the OAuth provider.
    pub fn get_scopes(&self) -> Vec<&'static str> {
        match self {
            OAuthProvider::GitHub => vec!["user:email"],
            OAuthProvider::Google => vec!["email profile"],
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        for name in ["github", "google"] {
            assert_eq!(OAuthProvider::from_str(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn unknown_provider_is_a_bad_request() {
        assert!(matches!(
            OAuthProvider::from_str("myspace"),
            Err(AppError::BadRequest(_))
        ));
    }
}
