//! Injected bearer-credential source.
//!
//! The token source is an explicit dependency passed to
//! [`ReportsApi`](crate::api::ReportsApi), never global state.  Token
//! storage and refresh are out of scope; whoever constructs the
//! provider owns that.

/// Supplies the bearer token attached to every backend request.
///
/// Returning `None` means there is no usable credential right now; the
/// client surfaces that as `AuthMissing` without issuing the request.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Fixed token provider, used by the watcher daemon and in tests.
pub struct StaticCredentials {
    token: String,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>) -> StaticCredentials {
        StaticCredentials {
            token: token.into(),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        Some(self.token.clone())
    }
}
