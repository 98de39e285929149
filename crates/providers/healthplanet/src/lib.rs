use std::time::Duration;

use auth_core::{AuthCodeProvider, AuthError, AuthorizationCode, Credentials};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

mod scrape;

const LOGIN_URL: &str = "https://www.healthplanet.jp/login_oauth.do";
const AUTHORIZE_URL: &str = "https://www.healthplanet.jp/oauth/auth.do";
const APPROVAL_URL: &str = "https://www.healthplanet.jp/oauth/approval.do";
const REDIRECT_URL: &str = "https://www.healthplanet.jp/success.html";

const SCOPE: &str = "innerscan";
const RESPONSE_TYPE: &str = "code";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The four Health Planet URLs the flow touches. `Default` points at the
/// production service; tests point it at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    pub login: String,
    pub authorize: String,
    pub approval: String,
    pub redirect: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            login: LOGIN_URL.to_string(),
            authorize: AUTHORIZE_URL.to_string(),
            approval: APPROVAL_URL.to_string(),
            redirect: REDIRECT_URL.to_string(),
        }
    }
}

/// Health Planet exposes no login API, so the authorization code has to be
/// fetched the way a browser would: POST the credentials to the login form,
/// scrape the transient `oauth_token` out of the consent page, then approve
/// the grant and read `code` off the final redirect. All three requests run
/// on one cookie-bearing session; the server recognizes the login in the
/// approval step through cookie continuity alone.
pub struct HealthPlanetProvider {
    endpoints: Endpoints,
}

impl HealthPlanetProvider {
    pub fn new() -> Self {
        HealthPlanetProvider {
            endpoints: Endpoints::default(),
        }
    }

    pub fn with_endpoints(endpoints: Endpoints) -> Self {
        HealthPlanetProvider { endpoints }
    }

    /// One session per flow: a fresh cookie jar, redirects followed, and a
    /// bounded timeout on every request so a stalled provider cannot hang
    /// the caller indefinitely.
    fn session() -> Result<Client, AuthError> {
        Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Client(e.without_url().to_string()))
    }

    /// Stage 1: submit the login form together with the embedded OAuth
    /// authorization request and return the consent page HTML. On success
    /// the session's cookie jar now holds the authenticated cookie.
    async fn login(&self, session: &Client, credentials: &Credentials) -> Result<String, AuthError> {
        let authorize = Url::parse_with_params(
            &self.endpoints.authorize,
            &[
                ("redirect_uri", self.endpoints.redirect.as_str()),
                ("response_type", RESPONSE_TYPE),
                ("client_id", credentials.client_id.as_str()),
                ("scope", SCOPE),
            ],
        )
        .map_err(|e| AuthError::InvalidEndpoint(e.to_string()))?;

        let login = Url::parse(&self.endpoints.login)
            .map_err(|e| AuthError::InvalidEndpoint(e.to_string()))?;

        let response = session
            .post(login)
            .form(&[
                ("loginId", credentials.login_id.as_str()),
                ("passwd", credentials.login_password.as_str()),
                ("send", "1"),
                ("url", authorize.as_str()),
            ])
            .send()
            .await
            .map_err(network)?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "login endpoint returned non-success");
            return Err(AuthError::AuthenticationFailed);
        }

        // Bad credentials don't get a distinct status; the provider bounces
        // to a URL carrying an `error` query parameter instead.
        if response.url().query_pairs().any(|(key, _)| key == "error") {
            tracing::warn!("login bounced to an error URL");
            return Err(AuthError::AuthenticationFailed);
        }

        response.text().await.map_err(network)
    }

    /// Stage 3: approve the grant with the scraped token on the same
    /// session and pull the authorization code off the final redirect URL.
    async fn approve(
        &self,
        session: &Client,
        oauth_token: &str,
    ) -> Result<AuthorizationCode, AuthError> {
        let approval = Url::parse(&self.endpoints.approval)
            .map_err(|e| AuthError::InvalidEndpoint(e.to_string()))?;

        let response = session
            .post(approval)
            .form(&[("approval", "true"), ("oauth_token", oauth_token)])
            .send()
            .await
            .map_err(network)?;

        code_from_redirect(response.url())
    }
}

impl Default for HealthPlanetProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl AuthCodeProvider for HealthPlanetProvider {
    fn name(&self) -> &'static str {
        "healthplanet"
    }

    async fn obtain_code(&self, credentials: &Credentials) -> Result<AuthorizationCode, AuthError> {
        let session = Self::session()?;

        let html = self.login(&session, credentials).await?;
        tracing::debug!(html_len = html.len(), "login succeeded, scraping consent page");

        let oauth_token = scrape::oauth_token(&html)?;

        let code = self.approve(&session, &oauth_token).await?;
        tracing::debug!(code_len = code.as_str().len(), "obtained authorization code");

        Ok(code)
    }
}

fn network(err: reqwest::Error) -> AuthError {
    // without_url keeps query strings (and anything in them) out of the
    // error message.
    AuthError::Network(err.without_url().to_string())
}

/// Extracts the `code` query parameter from the final redirect URL. A
/// redirect without one means the grant was denied; the URL's parameters
/// (e.g. `error=access_denied`) ride along on the error.
fn code_from_redirect(url: &Url) -> Result<AuthorizationCode, AuthError> {
    match url.query_pairs().find(|(key, _)| key == "code") {
        Some((_, code)) => Ok(AuthorizationCode::new(code.into_owned())),
        None => Err(AuthError::AuthorizationDenied {
            params: url
                .query_pairs()
                .map(|(key, value)| (key.into_owned(), value.into_owned()))
                .collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_extracted_from_redirect() {
        let url =
            Url::parse("https://www.healthplanet.jp/success.html?code=ABC123&state=xyz").unwrap();

        let code = code_from_redirect(&url).unwrap();

        assert_eq!(code.as_str(), "ABC123");
    }

    #[test]
    fn test_denied_redirect_carries_params() {
        let url =
            Url::parse("https://www.healthplanet.jp/success.html?error=access_denied").unwrap();

        let err = code_from_redirect(&url).unwrap_err();

        match err {
            AuthError::AuthorizationDenied { params } => {
                assert_eq!(
                    params,
                    vec![("error".to_string(), "access_denied".to_string())]
                );
            }
            other => panic!("expected AuthorizationDenied, got {other:?}"),
        }
    }

    #[test]
    fn test_redirect_without_query_is_denied() {
        let url = Url::parse("https://www.healthplanet.jp/success.html").unwrap();

        let err = code_from_redirect(&url).unwrap_err();

        assert!(matches!(
            err,
            AuthError::AuthorizationDenied { params } if params.is_empty()
        ));
    }

    #[test]
    fn test_default_endpoints_point_at_production() {
        let endpoints = Endpoints::default();

        assert_eq!(endpoints.login, "https://www.healthplanet.jp/login_oauth.do");
        assert_eq!(endpoints.authorize, "https://www.healthplanet.jp/oauth/auth.do");
        assert_eq!(endpoints.approval, "https://www.healthplanet.jp/oauth/approval.do");
        assert_eq!(endpoints.redirect, "https://www.healthplanet.jp/success.html");
    }
}
