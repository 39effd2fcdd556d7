//! Token endpoint: trade an authorization code for tokens.

use serde::Deserialize;
use std::time::Duration;

use super::FlowError;
use crate::token::ProviderError;

/// Form fields for the `authorization_code` grant.
#[derive(Debug, Clone)]
pub struct CodeExchange<'a> {
    pub token_uri: &'a str,
    pub client_id: &'a str,
    /// `None` for public clients.
    pub client_secret: Option<&'a str>,
    pub code: &'a str,
    pub redirect_uri: &'a str,
    pub code_verifier: &'a str,
    pub scope: Option<&'a str>,
}

/// Raw token endpoint body. Success and error share one shape on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenReply {
    Granted {
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<u64>,
    },
    Rejected(ProviderError),
}

impl TokenBody {
    /// Classify a parsed body. `None` when it is neither a grant nor an OAuth error.
    pub fn into_reply(self) -> Option<TokenReply> {
        if let Some(access_token) = self.access_token {
            return Some(TokenReply::Granted {
                access_token,
                refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
                expires_in: self.expires_in,
            });
        }
        self.error
            .map(|error| TokenReply::Rejected(ProviderError::new(error, self.error_description)))
    }
}

pub fn default_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(30))
        .build()
}

pub fn exchange_code(agent: &ureq::Agent, req: &CodeExchange<'_>) -> Result<TokenReply, FlowError> {
    let mut form: Vec<(&str, &str)> = vec![
        ("grant_type", "authorization_code"),
        ("code", req.code),
        ("redirect_uri", req.redirect_uri),
        ("client_id", req.client_id),
        ("code_verifier", req.code_verifier),
    ];
    if let Some(secret) = req.client_secret {
        form.push(("client_secret", secret));
    }
    if let Some(scope) = req.scope {
        form.push(("scope", scope));
    }

    tracing::debug!(token_uri = req.token_uri, "exchanging authorization code");

    let (status, body) = match agent.post(req.token_uri).send_form(&form) {
        Ok(response) => (response.status(), response.into_string()?),
        Err(ureq::Error::Status(status, response)) => (status, response.into_string()?),
        Err(ureq::Error::Transport(t)) => return Err(FlowError::Http(t.to_string())),
    };

    parse_token_response(status, &body)
}

/// Interpret a token endpoint response.
pub fn parse_token_response(status: u16, body: &str) -> Result<TokenReply, FlowError> {
    let parsed: Option<TokenBody> = serde_json::from_str(body).ok();
    if let Some(reply) = parsed.and_then(TokenBody::into_reply) {
        if status >= 400 {
            tracing::debug!(status, "token endpoint returned an error");
        }
        return Ok(reply);
    }

    let snippet: String = body.chars().take(200).collect();
    Err(FlowError::InvalidResponse(format!("status={} body={}", status, snippet)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grant() {
        let reply = parse_token_response(
            200,
            r#"{"access_token":"AT","refresh_token":"RT","expires_in":3599,"token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(
            reply,
            TokenReply::Granted {
                access_token: "AT".to_string(),
                refresh_token: Some("RT".to_string()),
                expires_in: Some(3599),
            }
        );
    }

    #[test]
    fn test_parse_grant_without_refresh_token() {
        let reply = parse_token_response(200, r#"{"access_token":"AT"}"#).unwrap();
        assert_eq!(
            reply,
            TokenReply::Granted {
                access_token: "AT".to_string(),
                refresh_token: None,
                expires_in: None,
            }
        );
    }

    #[test]
    fn test_parse_oauth_error() {
        let reply = parse_token_response(
            400,
            r#"{"error":"invalid_client","error_description":"bad id"}"#,
        )
        .unwrap();
        assert_eq!(
            reply,
            TokenReply::Rejected(ProviderError::new("invalid_client", Some("bad id".to_string())))
        );
    }

    #[test]
    fn test_parse_garbage_is_invalid_response() {
        let err = parse_token_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FlowError::InvalidResponse(ref m) if m.contains("502")));
    }

    #[test]
    fn test_parse_empty_object_is_invalid_response() {
        assert!(parse_token_response(200, "{}").is_err());
    }
}
