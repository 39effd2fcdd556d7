//! Public-client flow against the Microsoft identity platform (Outlook).
//!
//! No client secret is sent. Provider-side rejections (an `error` on the
//! redirect, an OAuth error body from the token endpoint) come back as
//! `TokenResult::Failed` so the caller can print the provider's diagnosis.

use std::io::Write;

use super::callback::CallbackListener;
use super::exchange::{self, CodeExchange, TokenReply};
use super::pkce::{generate_pkce_pair, random_state};
use super::{
    AuthorizationFlow, BrowserLauncher, ClientConfig, FlowError, LoopbackOptions,
    present_authorization_url, system_browser,
};
use crate::provider::{
    MICROSOFT_AUTHORITY_HOST, authority_url, microsoft_authorize_url, microsoft_token_url,
    resolve_tenant,
};
use crate::token::{Expiry, TokenGrant, TokenResult};
use crate::util::with_query;

pub struct PublicClientFlow {
    authority_host: String,
    options: LoopbackOptions,
    launcher: BrowserLauncher,
    agent: ureq::Agent,
}

impl PublicClientFlow {
    pub fn new(options: LoopbackOptions) -> Self {
        Self {
            authority_host: MICROSOFT_AUTHORITY_HOST.to_string(),
            options,
            launcher: system_browser(),
            agent: exchange::default_agent(),
        }
    }

    /// Point the flow at another identity host (sovereign clouds, tests).
    pub fn with_authority_host(mut self, host: &str) -> Self {
        self.authority_host = host.to_string();
        self
    }

    pub fn with_launcher(mut self, launcher: BrowserLauncher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn authority(&self, config: &ClientConfig) -> String {
        let tenant = resolve_tenant(config.tenant_id.as_deref().unwrap_or_default());
        authority_url(&self.authority_host, &tenant)
    }
}

impl AuthorizationFlow for PublicClientFlow {
    fn acquire(
        &mut self,
        scopes: &[&str],
        config: &ClientConfig,
        out: &mut dyn Write,
    ) -> Result<TokenResult, FlowError> {
        let authority = self.authority(config);
        tracing::debug!(%authority, "starting public client flow");

        let listener = CallbackListener::bind(self.options.port)?;
        let redirect_uri = format!("http://localhost:{}", listener.port());
        let pkce = generate_pkce_pair();
        let state = random_state();
        let scope = scopes.join(" ");

        let url = with_query(
            &microsoft_authorize_url(&authority),
            &[
                ("client_id", config.client_id.as_str()),
                ("response_type", "code"),
                ("response_mode", "query"),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
                ("code_challenge", pkce.code_challenge.as_str()),
                ("code_challenge_method", "S256"),
            ],
        );
        present_authorization_url(&url, &self.options, &mut self.launcher, out)?;

        let payload = listener.wait(&state, self.options.timeout)?;
        drop(listener);
        let code = match payload.into_code() {
            Ok(code) => code,
            Err(rejection) => return Ok(TokenResult::Failed(rejection)),
        };

        let token_uri = microsoft_token_url(&authority);
        let reply = exchange::exchange_code(
            &self.agent,
            &CodeExchange {
                token_uri: &token_uri,
                client_id: &config.client_id,
                client_secret: None,
                code: &code,
                redirect_uri: &redirect_uri,
                code_verifier: &pkce.code_verifier,
                scope: Some(scope.as_str()),
            },
        )?;

        Ok(match reply {
            TokenReply::Granted {
                access_token,
                refresh_token,
                expires_in,
            } => TokenResult::Succeeded(TokenGrant {
                access_token,
                refresh_token,
                expiry: expires_in.map(Expiry::In).unwrap_or(Expiry::Unknown),
            }),
            TokenReply::Rejected(err) => TokenResult::Failed(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_defaults_to_common() {
        let flow = PublicClientFlow::new(LoopbackOptions::default());
        let config = ClientConfig {
            tenant_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(flow.authority(&config), "https://login.microsoftonline.com/common");
        assert_eq!(
            flow.authority(&ClientConfig::default()),
            "https://login.microsoftonline.com/common"
        );
    }

    #[test]
    fn test_authority_uses_tenant() {
        let flow = PublicClientFlow::new(LoopbackOptions::default())
            .with_authority_host("http://127.0.0.1:8080");
        let config = ClientConfig {
            tenant_id: Some("contoso".to_string()),
            ..Default::default()
        };
        assert_eq!(flow.authority(&config), "http://127.0.0.1:8080/contoso");
    }
}
