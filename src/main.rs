use anyhow::Result;
use clap::Parser;

use pop3_oauth_token::cli::{Cli, Commands};
use pop3_oauth_token::flow::{InstalledAppFlow, PublicClientFlow};
use pop3_oauth_token::provider::Provider;

fn main() -> Result<()> {
    let cli = Cli::parse();
    pop3_oauth_token::logging::init(cli.verbose);

    match cli.command {
        Commands::Gmail { common } => pop3_oauth_token::session::run(
            Provider::Gmail,
            Box::new(InstalledAppFlow::new(common.loopback())),
            common.session(None),
        ),
        Commands::Outlook { common, tenant_id } => pop3_oauth_token::session::run(
            Provider::Outlook,
            Box::new(PublicClientFlow::new(common.loopback())),
            common.session(tenant_id),
        ),
    }
}
