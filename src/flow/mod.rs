//! Interactive OAuth2 authorization-code flows.
//!
//! Both providers run the same loopback dance: bind a listener on
//! localhost, send the operator's browser to the authorization URL, wait for
//! the redirect carrying `code` and `state`, then trade the code (plus the
//! PKCE verifier) at the token endpoint. They differ in endpoints, client
//! type, and in how a provider-side rejection is surfaced.

pub mod callback;
pub mod exchange;
pub mod installed;
pub mod pkce;
pub mod public_client;

use std::io::Write;
use std::time::Duration;
use thiserror::Error;

use crate::token::{ProviderError, TokenResult};

pub use installed::InstalledAppFlow;
pub use public_client::PublicClientFlow;

/// Credentials collected from the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: Option<String>,
}

/// One interactive authorization against a provider.
///
/// Operator-facing text (the authorization URL) goes to `out`.
pub trait AuthorizationFlow {
    fn acquire(
        &mut self,
        scopes: &[&str],
        config: &ClientConfig,
        out: &mut dyn Write,
    ) -> Result<TokenResult, FlowError>;
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("cancelled by user")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not start local callback server on localhost:{port}: {message}")]
    Bind { port: u16, message: String },

    #[error("malformed authorization callback: {0}")]
    Callback(String),

    #[error("authorization failed: {0}")]
    Authorization(ProviderError),

    #[error("state mismatch in authorization callback")]
    StateMismatch,

    #[error("timed out after {0}s waiting for the browser redirect")]
    Timeout(u64),

    #[error("token request failed: {0}")]
    Http(String),

    #[error("token endpoint rejected the request: {0}")]
    TokenEndpoint(ProviderError),

    #[error("unexpected token endpoint response: {0}")]
    InvalidResponse(String),
}

/// Opens a URL for the operator. Swappable so tests can play the browser.
pub type BrowserLauncher = Box<dyn FnMut(&str) -> std::io::Result<()> + Send>;

pub fn system_browser() -> BrowserLauncher {
    Box::new(|url: &str| open::that(url))
}

#[derive(Debug, Clone)]
pub struct LoopbackOptions {
    /// 0 lets the OS pick a free port.
    pub port: u16,
    pub timeout: Option<Duration>,
    pub open_browser: bool,
}

impl Default for LoopbackOptions {
    fn default() -> Self {
        Self {
            port: 0,
            timeout: None,
            open_browser: true,
        }
    }
}

/// Print the authorization URL and try to open it.
///
/// A launcher failure is not fatal: the operator can paste the printed URL.
pub(crate) fn present_authorization_url(
    url: &str,
    options: &LoopbackOptions,
    launcher: &mut BrowserLauncher,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(out, "Please visit this URL to authorize this application: {}", url)?;
    out.flush()?;
    if !options.open_browser {
        return Ok(());
    }
    if let Err(e) = launcher(url) {
        tracing::warn!(error = %e, "failed to launch browser");
        writeln!(out, "Could not open a browser automatically. Open the URL above manually.")?;
        out.flush()?;
    }
    Ok(())
}
