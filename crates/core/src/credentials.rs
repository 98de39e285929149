use serde::Deserialize;

/// Credentials for a provider's login form plus the registered OAuth
/// client. Read once at startup and never mutated.
///
/// `Debug` redacts the secret fields so the struct can appear in logs and
/// error context without leaking anything.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub login_id: String,
    pub login_password: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        login_id: impl Into<String>,
        login_password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            login_id: login_id.into(),
            login_password: login_password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("login_id", &self.login_id)
            .field("login_password", &"<redacted>")
            .finish()
    }
}
