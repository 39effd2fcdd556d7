//! Loopback listener that receives the authorization redirect.

use std::io::Cursor;
use std::time::{Duration, Instant};
use tiny_http::{Header, Request, Response, Server};

use super::FlowError;
use crate::token::ProviderError;
use crate::util::parse_query;

const SUCCESS_HTML: &str = "<!doctype html><html><body>\
<h2>Authorization complete.</h2><p>You may close this window and return to the terminal.</p>\
</body></html>";

const ERROR_HTML: &str = "<!doctype html><html><body>\
<h2>Authorization failed.</h2><p>Return to the terminal for details.</p>\
</body></html>";

/// Query parameters carried by the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackPayload {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackPayload {
    /// The authorization code, or the provider's rejection.
    pub fn into_code(self) -> Result<String, ProviderError> {
        if let Some(error) = self.error {
            return Err(ProviderError::new(error, self.error_description));
        }
        Ok(self.code.unwrap_or_default())
    }
}

/// Parse a request target such as `/?code=abc&state=xyz`.
///
/// Returns `None` for requests that are not the redirect (favicon, health checks).
pub fn parse_callback_target(target: &str) -> Option<CallbackPayload> {
    let (_, query) = target.split_once('?')?;

    let mut payload = CallbackPayload::default();
    for (key, value) in parse_query(query) {
        match key.as_str() {
            "code" => payload.code = Some(value),
            "state" => payload.state = Some(value),
            "error" => payload.error = Some(value),
            "error_description" => payload.error_description = Some(value),
            _ => {}
        }
    }

    if payload.code.is_none() && payload.error.is_none() {
        return None;
    }
    Some(payload)
}

pub struct CallbackListener {
    server: Server,
    port: u16,
}

impl CallbackListener {
    /// Bind on `localhost`, the host named in the redirect URI. Port 0 picks
    /// a free port.
    pub fn bind(port: u16) -> Result<Self, FlowError> {
        let server = Server::http(("localhost", port)).map_err(|e| FlowError::Bind {
            port,
            message: e.to_string(),
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| FlowError::Bind {
                port,
                message: "listener has no IP address".to_string(),
            })?;
        tracing::debug!(port, "callback listener bound");
        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Block until the redirect arrives and its `state` matches.
    pub fn wait(
        &self,
        expected_state: &str,
        timeout: Option<Duration>,
    ) -> Result<CallbackPayload, FlowError> {
        let deadline = timeout.map(|t| (Instant::now() + t, t.as_secs()));
        loop {
            let request = match deadline {
                Some((at, secs)) => {
                    let remaining = at.saturating_duration_since(Instant::now());
                    match self.server.recv_timeout(remaining)? {
                        Some(request) => request,
                        None => return Err(FlowError::Timeout(secs)),
                    }
                }
                None => self.server.recv()?,
            };

            let Some(payload) = parse_callback_target(request.url()) else {
                tracing::debug!(url = request.url(), "ignoring non-callback request");
                respond(request, 404, "Not found");
                continue;
            };

            if payload.state.as_deref() != Some(expected_state) {
                respond(request, 400, ERROR_HTML);
                return Err(FlowError::StateMismatch);
            }

            if payload.error.is_none() && payload.code.as_deref() == Some("") {
                respond(request, 400, ERROR_HTML);
                return Err(FlowError::Callback("empty authorization code".to_string()));
            }

            let is_error = payload.error.is_some();
            respond(
                request,
                if is_error { 400 } else { 200 },
                if is_error { ERROR_HTML } else { SUCCESS_HTML },
            );
            return Ok(payload);
        }
    }
}

fn respond(request: Request, status: u16, body: &str) {
    let mut response: Response<Cursor<Vec<u8>>> =
        Response::from_string(body).with_status_code(status);
    if let Ok(header) = "Content-Type: text/html; charset=utf-8".parse::<Header>() {
        response.add_header(header);
    }
    if let Err(e) = request.respond(response) {
        tracing::debug!(error = %e, "failed to answer callback request");
    }
}
