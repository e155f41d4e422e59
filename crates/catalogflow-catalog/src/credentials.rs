//! Access credentials
//!
//! The library never resolves credentials on its own: every operation takes
//! an explicit [`Credentials`]. [`load_default_credentials`] is a convenience
//! for front ends that want the standard AWS provider chain.

use crate::error::{CatalogError, Result};
use aws_credential_types::provider::ProvideCredentials;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::SystemTime;

const PROVIDER_NAME: &str = "catalogflow";

/// Time-scoped access credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
            expires_at: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Read `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` / `AWS_SESSION_TOKEN`
    pub fn from_env() -> Option<Self> {
        let access_key_id = std::env::var("AWS_ACCESS_KEY_ID").ok()?;
        let secret_access_key = std::env::var("AWS_SECRET_ACCESS_KEY").ok()?;
        let mut credentials = Self::new(access_key_id, secret_access_key);
        if let Ok(token) = std::env::var("AWS_SESSION_TOKEN") {
            credentials.session_token = Some(token);
        }
        Some(credentials)
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Reject credentials that cannot possibly be accepted by the remote API
    pub fn check(&self, operation: &'static str) -> Result<()> {
        if self.access_key_id.trim().is_empty() || self.secret_access_key.trim().is_empty() {
            return Err(CatalogError::missing_credentials(
                operation,
                "access key id and secret access key are required",
            ));
        }
        if self.is_expired_at(Utc::now()) {
            return Err(CatalogError::missing_credentials(
                operation,
                format!(
                    "credentials for {} expired at {}",
                    self.access_key_id,
                    self.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default()
                ),
            ));
        }
        Ok(())
    }

    pub(crate) fn to_sdk(&self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.clone(),
            self.session_token.clone(),
            self.expires_at.map(SystemTime::from),
            PROVIDER_NAME,
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl From<aws_credential_types::Credentials> for Credentials {
    fn from(creds: aws_credential_types::Credentials) -> Self {
        Self {
            access_key_id: creds.access_key_id().to_string(),
            secret_access_key: creds.secret_access_key().to_string(),
            session_token: creds.session_token().map(str::to_string),
            expires_at: creds.expiry().map(DateTime::<Utc>::from),
        }
    }
}

/// Resolve credentials through the AWS default provider chain
/// (environment, shared profile, SSO, container and instance metadata)
pub async fn load_default_credentials() -> Result<Credentials> {
    const OPERATION: &str = "load_default_credentials";

    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let provider = sdk_config.credentials_provider().ok_or_else(|| {
        CatalogError::missing_credentials(OPERATION, "no credentials provider configured")
    })?;

    let credentials = provider
        .provide_credentials()
        .await
        .map_err(|e| CatalogError::missing_credentials(OPERATION, e.to_string()))?;

    tracing::debug!(
        access_key_id = credentials.access_key_id(),
        "resolved credentials from the default chain"
    );
    Ok(credentials.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_empty_credentials_are_rejected() {
        let err = Credentials::new("", "secret").check("search_products").unwrap_err();
        assert!(err.is_authentication());
        assert_eq!(err.operation(), Some("search_products"));
        assert_eq!(err.call(), None);
    }

    #[test]
    fn test_expired_credentials_are_rejected() {
        let creds =
            Credentials::new("AKID", "secret").with_expiry(Utc::now() - Duration::minutes(5));
        assert!(creds.check("search_products").unwrap_err().is_authentication());

        let creds =
            Credentials::new("AKID", "secret").with_expiry(Utc::now() + Duration::minutes(5));
        assert!(creds.check("search_products").is_ok());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("AKID", "very-secret").with_session_token("session");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("session\""));
    }

    #[test]
    fn test_sdk_round_trip_keeps_session_token() {
        let creds = Credentials::new("AKID", "secret").with_session_token("tok");
        let back = Credentials::from(creds.to_sdk());
        assert_eq!(back, creds);
    }
}
