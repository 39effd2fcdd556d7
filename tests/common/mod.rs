//! Shared test fixtures: a fake flow and a scripted browser.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use pop3_oauth_token::flow::{AuthorizationFlow, BrowserLauncher, ClientConfig, FlowError};
use pop3_oauth_token::token::{Expiry, ProviderError, TokenGrant, TokenResult};
use pop3_oauth_token::util::parse_query;

/// What a fake flow was asked to do.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub scopes: Vec<String>,
    pub config: Option<ClientConfig>,
}

/// Flow that returns a canned result and records its inputs.
pub struct FakeFlow {
    result: Option<Result<TokenResult, FlowError>>,
    pub recorded: Arc<Mutex<Recorded>>,
}

impl FakeFlow {
    pub fn returning(result: Result<TokenResult, FlowError>) -> Self {
        Self {
            result: Some(result),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn granting(access: &str, refresh: Option<&str>, expiry: Expiry) -> Self {
        Self::returning(Ok(TokenResult::Succeeded(TokenGrant {
            access_token: access.to_string(),
            refresh_token: refresh.map(str::to_string),
            expiry,
        })))
    }

    pub fn rejecting(error: &str, description: Option<&str>) -> Self {
        Self::returning(Ok(TokenResult::Failed(ProviderError::new(
            error,
            description.map(str::to_string),
        ))))
    }

    pub fn was_called(&self) -> bool {
        self.recorded.lock().unwrap().config.is_some()
    }
}

impl AuthorizationFlow for FakeFlow {
    fn acquire(
        &mut self,
        scopes: &[&str],
        config: &ClientConfig,
        _out: &mut dyn Write,
    ) -> Result<TokenResult, FlowError> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.scopes = scopes.iter().map(|s| s.to_string()).collect();
        recorded.config = Some(config.clone());
        self.result.take().expect("fake flow called twice")
    }
}

/// Operator input, one answer per line.
pub fn answers(lines: &[&str]) -> Cursor<Vec<u8>> {
    let mut text = lines.join("\n");
    text.push('\n');
    Cursor::new(text.into_bytes())
}

/// Behaviour of the scripted browser after reading the authorization URL.
#[derive(Debug, Clone)]
pub enum Redirect {
    /// Follow the redirect with this code and the state from the URL.
    Code(String),
    /// Follow the redirect with a provider error.
    Error(String, String),
    /// Follow the redirect with a forged state.
    WrongState,
}

/// Launcher that plays the browser: it reads `redirect_uri` and `state`
/// from the authorization URL and hits the loopback listener.
///
/// The authorization URL it saw is stored in the returned handle.
pub fn scripted_browser(redirect: Redirect) -> (BrowserLauncher, Arc<Mutex<Option<String>>>) {
    let seen = Arc::new(Mutex::new(None));
    let seen_clone = seen.clone();
    let launcher: BrowserLauncher = Box::new(move |url: &str| {
        *seen_clone.lock().unwrap() = Some(url.to_string());
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or("");
        let params = parse_query(query);
        let get = |name: &str| {
            params
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let redirect_uri = get("redirect_uri");
        let state = get("state");
        let target = match &redirect {
            Redirect::Code(code) => format!("{}?code={}&state={}", redirect_uri, code, state),
            Redirect::Error(error, description) => format!(
                "{}?error={}&error_description={}&state={}",
                redirect_uri,
                error,
                urlencoding::encode(description),
                state
            ),
            Redirect::WrongState => format!("{}?code=abc&state=forged", redirect_uri),
        };
        std::thread::spawn(move || {
            let _ = ureq::get(&target).call();
        });
        Ok(())
    });
    (launcher, seen)
}

/// Query parameter from a URL, decoded.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    parse_query(query)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}
