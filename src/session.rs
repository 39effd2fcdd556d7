//! One token-generator run: prompt, authorize, report.

use anyhow::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::env_file;
use crate::flow::{AuthorizationFlow, FlowError};
use crate::prompt::{self, Prefilled};
use crate::provider::Provider;
use crate::report;
use crate::token::TokenResult;

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub prefilled: Prefilled,
    pub write_env: Option<PathBuf>,
    pub open_browser: bool,
}

/// How a run ended. Every variant exits 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
    Cancelled,
    Errored,
}

/// Run the procedure and turn cancellation and errors into printed text.
pub fn run_session<R: BufRead, W: Write>(
    provider: Provider,
    flow: &mut dyn AuthorizationFlow,
    options: &SessionOptions,
    input: &mut R,
    out: &mut W,
) -> Outcome {
    match obtain(provider, flow, options, input, out) {
        Ok(outcome) => outcome,
        Err(e) => {
            let cancelled = matches!(e.downcast_ref::<FlowError>(), Some(FlowError::Cancelled));
            let printed = if cancelled {
                report::write_cancelled(out)
            } else {
                tracing::debug!(error = ?e, "token generation failed");
                report::write_error(out, &e)
            };
            if let Err(io) = printed {
                tracing::warn!(error = %io, "failed to write error report");
            }
            if cancelled {
                Outcome::Cancelled
            } else {
                Outcome::Errored
            }
        }
    }
}

/// Prompt → flow → report. Errors propagate to [`run_session`].
pub fn obtain<R: BufRead, W: Write>(
    provider: Provider,
    flow: &mut dyn AuthorizationFlow,
    options: &SessionOptions,
    input: &mut R,
    out: &mut W,
) -> Result<Outcome> {
    writeln!(out, "=== {} OAuth2 Token Generator ===\n", provider.title())?;

    let config = prompt::collect_credentials(provider, &options.prefilled, input, out)?;
    tracing::debug!(
        provider = provider.name(),
        tenant = config.tenant_id.as_deref(),
        "credentials collected"
    );

    writeln!(out, "\nStarting OAuth2 flow...")?;
    if options.open_browser {
        writeln!(out, "A browser window will open. Please authorize the application.\n")?;
    } else {
        writeln!(out, "Open the URL below in a browser and authorize the application.\n")?;
    }
    out.flush()?;

    match flow.acquire(provider.scopes(), &config, out)? {
        TokenResult::Succeeded(grant) => {
            report::write_success(out, provider, &config, &grant)?;
            if let Some(path) = &options.write_env {
                let entries = report::env_entries(provider, &config, &grant);
                let summary = env_file::write_env_file(path, &entries)?;
                writeln!(
                    out,
                    "Updated {} ({} replaced, {} added)",
                    path.display(),
                    summary.replaced,
                    summary.appended
                )?;
            }
            Ok(Outcome::Succeeded)
        }
        TokenResult::Failed(err) => {
            tracing::debug!(error = %err, "provider rejected authorization");
            report::write_failure(out, &err)?;
            Ok(Outcome::Failed)
        }
    }
}

/// Run interactively on the terminal. Ctrl-C cancels at any point.
#[tokio::main]
pub async fn run(
    provider: Provider,
    mut flow: Box<dyn AuthorizationFlow + Send>,
    options: SessionOptions,
) -> Result<()> {
    let task = tokio::task::spawn_blocking(move || {
        let mut input = std::io::stdin().lock();
        let mut out = std::io::stdout();
        run_session(provider, flow.as_mut(), &options, &mut input, &mut out)
    });

    tokio::select! {
        outcome = task => {
            let outcome = outcome?;
            tracing::debug!(?outcome, "session finished");
            Ok(())
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            let _ = report::write_cancelled(&mut std::io::stdout());
            // The blocking task may sit in read_line or the callback
            // listener and cannot be joined.
            std::process::exit(0);
        }
    }
}
