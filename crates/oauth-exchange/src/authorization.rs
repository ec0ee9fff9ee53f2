//! Authorization URL for the out-of-band consent step

use credential_core::{CredentialError, OAuthSettings, Result};
use url::Url;

/// Build the browser-facing consent URL.
///
/// Scopes are space-joined and percent-encoded (`%20`, not `+`).
/// `access_type=offline` together with `prompt=consent` makes the provider
/// issue a refresh token even when the user consented before.
pub fn authorization_url(settings: &OAuthSettings, client_id: &str) -> Result<String> {
    let mut url = Url::parse(&settings.authorize_url).map_err(|e| {
        CredentialError::ParseError(format!(
            "authorize URL {:?}: {}",
            settings.authorize_url, e
        ))
    })?;

    let scope = settings.scopes.join(" ");
    let params = [
        ("client_id", client_id),
        ("redirect_uri", settings.redirect_uri.as_str()),
        ("scope", scope.as_str()),
        ("response_type", "code"),
        ("access_type", "offline"),
        ("prompt", "consent"),
    ];

    let query = params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    url.set_query(Some(&query));

    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_carries_all_parameters() {
        let url = authorization_url(&OAuthSettings::default(), "123.apps.googleusercontent.com").unwrap();

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("client_id=123.apps.googleusercontent.com"));
        assert!(url.contains("redirect_uri=urn%3Aietf%3Awg%3Aoauth%3A2.0%3Aoob"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
    }

    #[test]
    fn test_scopes_are_space_joined_and_encoded() {
        let settings = OAuthSettings {
            scopes: vec![
                "https://www.googleapis.com/auth/gmail.send".to_string(),
                "https://www.googleapis.com/auth/spreadsheets".to_string(),
            ],
            ..OAuthSettings::default()
        };
        let url = authorization_url(&settings, "client").unwrap();

        assert!(url.contains(
            "scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fgmail.send%20https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fspreadsheets"
        ));
        assert!(!url.contains('+'));
    }

    #[test]
    fn test_invalid_authorize_url() {
        let settings = OAuthSettings {
            authorize_url: "not a url".to_string(),
            ..OAuthSettings::default()
        };
        assert!(matches!(
            authorization_url(&settings, "client"),
            Err(CredentialError::ParseError(_))
        ));
    }
}
