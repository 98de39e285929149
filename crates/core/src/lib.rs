use thiserror::Error;

pub mod code;
pub mod credentials;

pub use code::AuthorizationCode;
pub use credentials::Credentials;

/// Errors that can occur while obtaining an authorization code.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Transport or connection failure on one of the requests. The message
    /// is scrubbed of URLs so credentials and query strings never leak.
    #[error("network error: {0}")]
    Network(String),

    /// The login endpoint rejected the credentials, either with a
    /// non-success status or by bouncing to an error URL.
    #[error("login was rejected by the provider")]
    AuthenticationFailed,

    /// The login response did not contain the hidden oauth_token field,
    /// which usually means the login page was served again.
    #[error("no oauth_token field in the login response")]
    TokenNotFound,

    /// The consent step finished without a `code` query parameter.
    #[error("authorization was denied by the provider: {params:?}")]
    AuthorizationDenied {
        /// Query parameters of the final redirect URL, e.g.
        /// `error=access_denied`.
        params: Vec<(String, String)>,
    },

    /// A configured endpoint URL could not be parsed.
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Defines the behavior that any authorization-code provider must implement.
#[async_trait::async_trait]
pub trait AuthCodeProvider {
    /// Short provider name, used in logs.
    fn name(&self) -> &'static str;

    /// Runs the provider's login and consent flow and returns the
    /// authorization code from the final redirect.
    async fn obtain_code(&self, credentials: &Credentials) -> Result<AuthorizationCode, AuthError>;
}
