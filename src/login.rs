// Account login request
//
// Builds the OAuth authorize URL used to sign the extension back in after the
// identifiers were rotated. PKCE with S256: the verifier is the unpadded
// base64url SHA-256 of 16 random UUID bytes, the challenge is the unpadded
// base64url SHA-256 of the verifier.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::constants::{
    AUTH_AUTHORIZE_URL, AUTH_CHALLENGE_METHOD, AUTH_CLIENT_ID, AUTH_PROMPT, AUTH_REDIRECT_URI,
    AUTH_SCOPE,
};
use crate::error::{MaintenanceError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub code_verifier: String,
    pub code_challenge: String,
    pub state: String,
    pub url: String,
}

pub fn generate_code_verifier() -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

pub fn code_challenge(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Authorize URL for a given challenge and state. Parameters are form-encoded.
pub fn authorize_url(challenge: &str, state: &str) -> Result<Url> {
    Url::parse_with_params(
        AUTH_AUTHORIZE_URL,
        &[
            ("response_type", "code"),
            ("code_challenge", challenge),
            ("code_challenge_method", AUTH_CHALLENGE_METHOD),
            ("client_id", AUTH_CLIENT_ID),
            ("redirect_uri", AUTH_REDIRECT_URI),
            ("state", state),
            ("scope", AUTH_SCOPE),
            ("prompt", AUTH_PROMPT),
        ],
    )
    .map_err(|e| MaintenanceError::InvalidInput(format!("authorize URL: {}", e)))
}

/// Fresh verifier, challenge and state, with the URL built from them.
pub fn build_login_request() -> Result<LoginRequest> {
    let code_verifier = generate_code_verifier();
    let code_challenge = code_challenge(&code_verifier);
    let state = Uuid::new_v4().to_string();
    let url = authorize_url(&code_challenge, &state)?.to_string();

    Ok(LoginRequest {
        code_verifier,
        code_challenge,
        state,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_challenge_matches_rfc7636_vector() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWzbMUVY"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_verifier_shape() {
        let verifier = generate_code_verifier();
        // 32 digest bytes, unpadded base64url
        assert_eq!(verifier.len(), 43);
        assert!(verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_ne!(verifier, generate_code_verifier());
    }

    #[test]
    fn test_authorize_url_parameters() {
        let url = authorize_url("abc-_123", "state-1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str(), Some("auth.augmentcode.com"));
        assert_eq!(url.path(), "/authorize");

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params.len(), 8);
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["code_challenge"], "abc-_123");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["client_id"], "augment-vscode-extension");
        assert_eq!(params["redirect_uri"], "vscode://augment.vscode-augment/auth/result");
        assert_eq!(params["state"], "state-1");
        assert_eq!(params["scope"], "email");
        assert_eq!(params["prompt"], "login");
    }

    #[test]
    fn test_redirect_uri_is_percent_encoded() {
        let url = authorize_url("c", "s").unwrap();
        assert!(url
            .as_str()
            .contains("redirect_uri=vscode%3A%2F%2Faugment.vscode-augment%2Fauth%2Fresult"));
    }

    #[test]
    fn test_login_request_is_consistent() {
        let request = build_login_request().unwrap();
        assert_eq!(request.code_challenge, code_challenge(&request.code_verifier));
        assert!(Uuid::parse_str(&request.state).is_ok());

        let url = Url::parse(&request.url).unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["code_challenge"], request.code_challenge);
        assert_eq!(params["state"], request.state);
    }
}
