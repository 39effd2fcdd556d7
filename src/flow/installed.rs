//! Installed-application flow (Gmail).
//!
//! Confidential desktop client: the client secret goes to the token
//! endpoint. Every failure is an error; this flow never reports a soft
//! `TokenResult::Failed`.

use chrono::{TimeDelta, Utc};
use std::io::Write;

use super::callback::CallbackListener;
use super::exchange::{self, CodeExchange, TokenReply};
use super::pkce::{generate_pkce_pair, random_state};
use super::{
    AuthorizationFlow, BrowserLauncher, ClientConfig, FlowError, LoopbackOptions,
    present_authorization_url, system_browser,
};
use crate::provider::{GMAIL_AUTH_URI, GMAIL_REDIRECT_URI, GMAIL_TOKEN_URI};
use crate::token::{Expiry, TokenGrant, TokenResult};
use crate::util::with_query;

pub struct InstalledAppFlow {
    auth_uri: String,
    token_uri: String,
    redirect_uri: String,
    options: LoopbackOptions,
    launcher: BrowserLauncher,
    agent: ureq::Agent,
}

impl InstalledAppFlow {
    pub fn new(options: LoopbackOptions) -> Self {
        Self {
            auth_uri: GMAIL_AUTH_URI.to_string(),
            token_uri: GMAIL_TOKEN_URI.to_string(),
            redirect_uri: GMAIL_REDIRECT_URI.to_string(),
            options,
            launcher: system_browser(),
            agent: exchange::default_agent(),
        }
    }

    pub fn with_endpoints(mut self, auth_uri: &str, token_uri: &str) -> Self {
        self.auth_uri = auth_uri.to_string();
        self.token_uri = token_uri.to_string();
        self
    }

    pub fn with_launcher(mut self, launcher: BrowserLauncher) -> Self {
        self.launcher = launcher;
        self
    }
}

impl AuthorizationFlow for InstalledAppFlow {
    fn acquire(
        &mut self,
        scopes: &[&str],
        config: &ClientConfig,
        out: &mut dyn Write,
    ) -> Result<TokenResult, FlowError> {
        let listener = CallbackListener::bind(self.options.port)?;
        let redirect_uri = format!("{}:{}/", self.redirect_uri, listener.port());
        let pkce = generate_pkce_pair();
        let state = random_state();
        let scope = scopes.join(" ");

        let url = with_query(
            &self.auth_uri,
            &[
                ("response_type", "code"),
                ("client_id", config.client_id.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state.as_str()),
                ("code_challenge", pkce.code_challenge.as_str()),
                ("code_challenge_method", "S256"),
                ("access_type", "offline"),
            ],
        );
        present_authorization_url(&url, &self.options, &mut self.launcher, out)?;

        let code = listener
            .wait(&state, self.options.timeout)?
            .into_code()
            .map_err(FlowError::Authorization)?;
        drop(listener);

        let reply = exchange::exchange_code(
            &self.agent,
            &CodeExchange {
                token_uri: &self.token_uri,
                client_id: &config.client_id,
                client_secret: Some(config.client_secret.as_str()),
                code: &code,
                redirect_uri: &redirect_uri,
                code_verifier: &pkce.code_verifier,
                scope: None,
            },
        )?;

        match reply {
            TokenReply::Granted {
                access_token,
                refresh_token,
                expires_in,
            } => Ok(TokenResult::Succeeded(TokenGrant {
                access_token,
                refresh_token,
                expiry: absolute_expiry(expires_in),
            })),
            TokenReply::Rejected(err) => Err(FlowError::TokenEndpoint(err)),
        }
    }
}

fn absolute_expiry(expires_in: Option<u64>) -> Expiry {
    expires_in
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .map(Expiry::At)
        .unwrap_or(Expiry::Unknown)
}
