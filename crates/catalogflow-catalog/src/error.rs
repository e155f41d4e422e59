//! Catalog error types

use crate::api::ApiCall;
use std::fmt;
use thiserror::Error;

/// Error codes the remote API uses when it refuses the caller's identity
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDeniedException",
    "ExpiredToken",
    "ExpiredTokenException",
    "IncompleteSignature",
    "InvalidClientTokenId",
    "InvalidSignatureException",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Errors raised by the catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Authentication failed in {operation}: {message}")]
    Authentication {
        operation: &'static str,
        call: Option<ApiCall>,
        message: String,
    },

    #[error("Catalog query {operation} failed: {call} rejected{context}: {source}")]
    Query {
        operation: &'static str,
        call: ApiCall,
        context: ErrorContext,
        #[source]
        source: RemoteError,
    },

    #[error("Catalog mutation {operation} failed: {call} rejected{context}: {source}")]
    Mutation {
        operation: &'static str,
        call: ApiCall,
        context: ErrorContext,
        #[source]
        source: RemoteError,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CatalogError {
    /// Wrap a rejected read call. Identity rejections become `Authentication`.
    pub fn query(
        operation: &'static str,
        call: ApiCall,
        context: ErrorContext,
        source: RemoteError,
    ) -> Self {
        if source.kind == RemoteErrorKind::Auth {
            return Self::authentication(operation, call, source);
        }
        Self::Query {
            operation,
            call,
            context,
            source,
        }
    }

    /// Wrap a rejected write call. Identity rejections become `Authentication`.
    pub fn mutation(
        operation: &'static str,
        call: ApiCall,
        context: ErrorContext,
        source: RemoteError,
    ) -> Self {
        if source.kind == RemoteErrorKind::Auth {
            return Self::authentication(operation, call, source);
        }
        Self::Mutation {
            operation,
            call,
            context,
            source,
        }
    }

    /// Local credential rejection, raised before any remote call
    pub fn missing_credentials(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Authentication {
            operation,
            call: None,
            message: message.into(),
        }
    }

    fn authentication(operation: &'static str, call: ApiCall, source: RemoteError) -> Self {
        Self::Authentication {
            operation,
            call: Some(call),
            message: format!("{call} rejected the credentials: {source}"),
        }
    }

    /// The logical operation that failed, if any
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Authentication { operation, .. }
            | Self::Query { operation, .. }
            | Self::Mutation { operation, .. } => Some(*operation),
            Self::InvalidConfig(_) => None,
        }
    }

    /// The remote call that failed, if the failure came from the remote API
    pub fn call(&self) -> Option<ApiCall> {
        match self {
            Self::Authentication { call, .. } => *call,
            Self::Query { call, .. } | Self::Mutation { call, .. } => Some(*call),
            Self::InvalidConfig(_) => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Identifiers attached to a failed call, rendered as ` (Key=value, ...)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext(Vec<(&'static str, String)>);

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.0.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return Ok(());
        }
        let pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, " ({})", pairs.join(", "))
    }
}

/// Classification of a failure reported by a [`CatalogApi`](crate::CatalogApi)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// The remote API refused the caller's credentials
    Auth,
    /// The remote API rejected the request (bad identifiers, invalid parameters, ...)
    Rejected,
    /// The request never produced a service response
    Transport,
    /// The response was missing data the contract requires
    InvalidResponse,
}

/// Failure reported by the remote API seam
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub code: Option<String>,
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[{}] {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for RemoteError {}

impl RemoteError {
    /// Classify a service error code
    pub fn from_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let kind = if AUTH_ERROR_CODES.contains(&code.as_str()) {
            RemoteErrorKind::Auth
        } else {
            RemoteErrorKind::Rejected
        };
        Self {
            kind,
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Transport,
            code: None,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::InvalidResponse,
            code: None,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_codes_are_classified() {
        let err = RemoteError::from_code("ExpiredTokenException", "token expired");
        assert_eq!(err.kind, RemoteErrorKind::Auth);

        let err = RemoteError::from_code("ResourceNotFoundException", "no such product");
        assert_eq!(err.kind, RemoteErrorKind::Rejected);
    }

    #[test]
    fn test_query_with_auth_source_becomes_authentication() {
        let err = CatalogError::query(
            "search_products",
            ApiCall::SearchProducts,
            ErrorContext::new(),
            RemoteError::from_code("UnrecognizedClientException", "bad key"),
        );
        assert!(err.is_authentication());
        assert_eq!(err.call(), Some(ApiCall::SearchProducts));
    }

    #[test]
    fn test_error_message_carries_context() {
        let err = CatalogError::query(
            "search_products",
            ApiCall::DescribeProduct,
            ErrorContext::new().with("ProductId", "p1"),
            RemoteError::from_code("ResourceNotFoundException", "gone"),
        );
        assert_eq!(
            err.to_string(),
            "Catalog query search_products failed: DescribeProduct rejected (ProductId=p1): \
             [ResourceNotFoundException] gone"
        );
    }

    #[test]
    fn test_empty_context_renders_nothing() {
        assert_eq!(ErrorContext::new().to_string(), "");
        assert_eq!(
            ErrorContext::new().with("Id", "r1").with("PageToken", "2").to_string(),
            " (Id=r1, PageToken=2)"
        );
    }
}
