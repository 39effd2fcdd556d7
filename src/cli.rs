use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::flow::LoopbackOptions;
use crate::prompt::Prefilled;
use crate::session::SessionOptions;

#[derive(Parser)]
#[command(
    name = "pop3-oauth-token",
    version,
    about = "Generate OAuth2 refresh tokens for POP3 mail access (Gmail, Outlook/Office365)"
)]
pub struct Cli {
    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Gmail: installed-app flow with the https://mail.google.com/ scope
    Gmail {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Outlook/Office365: public-client flow with POP.AccessAsUser.All + offline_access
    Outlook {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory tenant ID ('common' for any organization or personal account)
        #[arg(long, env = "POP3_OAUTH2_TENANT_ID")]
        tenant_id: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// OAuth client ID (prompted for when omitted)
    #[arg(long, env = "POP3_OAUTH2_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth client secret (prompted for when omitted)
    #[arg(long, env = "POP3_OAUTH2_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Local port for the browser redirect (0 picks a free port)
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// Give up waiting for the browser redirect after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the authorization URL without opening a browser
    #[arg(long)]
    pub no_browser: bool,

    /// Merge the generated lines into this .env file
    #[arg(long, value_name = "PATH")]
    pub write_env: Option<PathBuf>,
}

impl CommonArgs {
    pub fn loopback(&self) -> LoopbackOptions {
        LoopbackOptions {
            port: self.port,
            timeout: self.timeout.map(Duration::from_secs),
            open_browser: !self.no_browser,
        }
    }

    pub fn session(&self, tenant_id: Option<String>) -> SessionOptions {
        SessionOptions {
            prefilled: Prefilled {
                client_id: self.client_id.clone(),
                client_secret: self.client_secret.clone(),
                tenant_id,
            },
            write_env: self.write_env.clone(),
            open_browser: !self.no_browser,
        }
    }
}
