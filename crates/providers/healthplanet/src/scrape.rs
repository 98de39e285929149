//! Consent-page scraping.

use auth_core::AuthError;
use scraper::{Html, Selector};

/// Stage 2: pull the transient `oauth_token` value out of the login
/// response HTML. The page is parsed leniently; Health Planet's markup is
/// nowhere near well-formed XML.
pub fn oauth_token(html: &str) -> Result<String, AuthError> {
    let document = Html::parse_document(html);
    let token_selector =
        Selector::parse("input[name='oauth_token']").expect("Invalid token selector");

    let token = document
        .select(&token_selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_owned);

    match token {
        Some(token) => {
            tracing::debug!(token_len = token.len(), "found oauth_token field");
            Ok(token)
        }
        None => {
            // Typically the login form was served again because the
            // credentials were wrong.
            tracing::warn!("login response has no oauth_token input");
            Err(AuthError::TokenNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_token_value() {
        let html = r#"
            <html><body>
              <form action="/oauth/approval.do" method="post">
                <input type="hidden" name="oauth_token" value="T">
                <input type="submit" name="approval" value="OK">
              </form>
            </body></html>
        "#;

        assert_eq!(oauth_token(html).unwrap(), "T");
    }

    #[test]
    fn test_first_matching_input_wins() {
        let html = r#"
            <input name="oauth_token" value="first">
            <input name="oauth_token" value="second">
        "#;

        assert_eq!(oauth_token(html).unwrap(), "first");
    }

    #[test]
    fn test_missing_token_is_an_error_not_a_panic() {
        let html = r#"
            <html><body>
              <form action="/login_oauth.do" method="post">
                <input type="text" name="loginId">
                <input type="password" name="passwd">
              </form>
            </body></html>
        "#;

        assert!(matches!(oauth_token(html), Err(AuthError::TokenNotFound)));
    }

    #[test]
    fn test_token_survives_malformed_markup() {
        // Unclosed tags and stray attributes must not trip the parser.
        let html = r#"<html><body><div><input name="oauth_token" value="tok-42"><p>unclosed"#;

        assert_eq!(oauth_token(html).unwrap(), "tok-42");
    }
}
