//! Line-oriented credential prompts.

use std::io::{BufRead, Write};

use crate::flow::{ClientConfig, FlowError};
use crate::provider::{Provider, resolve_tenant};

/// Values already supplied on the command line or in the environment.
#[derive(Debug, Clone, Default)]
pub struct Prefilled {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub tenant_id: Option<String>,
}

/// Print `label`, read one line, return it trimmed.
///
/// End of input (Ctrl-D, closed pipe) counts as cancellation.
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String, FlowError> {
    write!(out, "{}", label)?;
    out.flush()?;

    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => Err(FlowError::Cancelled),
        Ok(_) => Ok(line.trim().to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Collect the provider's credentials, prompting only for what is missing.
///
/// Empty client id/secret are passed through unchecked.
pub fn collect_credentials<R: BufRead, W: Write>(
    provider: Provider,
    prefilled: &Prefilled,
    input: &mut R,
    out: &mut W,
) -> Result<ClientConfig, FlowError> {
    let client_id = match &prefilled.client_id {
        Some(v) => v.trim().to_string(),
        None => ask(input, out, provider.client_id_prompt())?,
    };
    let client_secret = match &prefilled.client_secret {
        Some(v) => v.trim().to_string(),
        None => ask(input, out, provider.client_secret_prompt())?,
    };
    let tenant_id = match provider.tenant_prompt() {
        None => None,
        Some(label) => {
            let raw = match &prefilled.tenant_id {
                Some(v) => v.clone(),
                None => ask(input, out, label)?,
            };
            Some(resolve_tenant(&raw))
        }
    };

    Ok(ClientConfig {
        client_id,
        client_secret,
        tenant_id,
    })
}
