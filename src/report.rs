//! Operator-facing result text.

use std::fmt::Display;
use std::io::{self, Write};

use crate::env_file::EnvEntry;
use crate::flow::ClientConfig;
use crate::provider::Provider;
use crate::token::{ProviderError, TokenGrant};
use crate::util::truncate_chars;

pub const PREVIEW_LEN: usize = 50;
pub const NOT_RECEIVED: &str = "<NOT_RECEIVED>";

fn rule() -> String {
    "=".repeat(60)
}

/// At most the first 50 characters of a token, then `...`.
pub fn token_preview(token: &str) -> String {
    format!("{}...", truncate_chars(token, PREVIEW_LEN))
}

/// The `.env` block for a successful run, in print order.
pub fn env_entries(provider: Provider, config: &ClientConfig, grant: &TokenGrant) -> Vec<EnvEntry> {
    let mut entries = vec![
        EnvEntry::new("POP3_PROVIDER", provider.name()),
        EnvEntry::placeholder("POP3_EMAIL", provider.placeholder_email()),
        EnvEntry::new("POP3_OAUTH2_CLIENT_ID", config.client_id.as_str()),
        EnvEntry::new("POP3_OAUTH2_CLIENT_SECRET", config.client_secret.as_str()),
    ];
    match &grant.refresh_token {
        Some(token) => entries.push(EnvEntry::new("POP3_OAUTH2_REFRESH_TOKEN", token.as_str())),
        None => entries.push(EnvEntry::placeholder("POP3_OAUTH2_REFRESH_TOKEN", NOT_RECEIVED)),
    }
    if let Some(tenant) = &config.tenant_id {
        entries.push(EnvEntry::new("POP3_OAUTH2_TENANT_ID", tenant.as_str()));
    }
    entries
}

pub fn write_success<W: Write>(
    out: &mut W,
    provider: Provider,
    config: &ClientConfig,
    grant: &TokenGrant,
) -> io::Result<()> {
    let rule = rule();
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "SUCCESS! OAuth2 credentials obtained")?;
    writeln!(out, "{}", rule)?;
    writeln!(out)?;
    writeln!(out, "Access Token: {}", token_preview(&grant.access_token))?;
    match &grant.refresh_token {
        Some(token) => writeln!(out, "Refresh Token: {}", token)?,
        None => {
            writeln!(out, "Refresh Token: NOT RECEIVED")?;
            writeln!(out, "{}", provider.missing_refresh_warning())?;
        }
    }
    writeln!(out, "Token Expiry: {}", grant.expiry)?;

    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Add these lines to your .env file:")?;
    writeln!(out, "{}", rule)?;
    for entry in env_entries(provider, config, grant) {
        writeln!(out, "{}", entry.line())?;
    }
    writeln!(out, "{}", rule)?;
    Ok(())
}

/// Only the public-client flow reports soft failures.
const FAILURE_CHECKLIST: [&str; 3] = [
    "Client ID and Client Secret are correct",
    "API permissions are granted in Azure Portal",
    "'offline_access' scope is included",
];

pub fn write_failure<W: Write>(out: &mut W, err: &ProviderError) -> io::Result<()> {
    let rule = rule();
    writeln!(out)?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "ERROR: Failed to obtain OAuth2 credentials")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Error: {}", err.error)?;
    writeln!(
        out,
        "Description: {}",
        err.error_description.as_deref().unwrap_or("None")
    )?;
    writeln!(out)?;
    writeln!(out, "Please check:")?;
    for (i, item) in FAILURE_CHECKLIST.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, item)?;
    }
    Ok(())
}

pub fn write_cancelled<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\n\nCancelled by user")
}

/// Top-level error text for anything that was not a soft provider failure.
pub fn write_error<W: Write>(out: &mut W, err: &dyn Display) -> io::Result<()> {
    writeln!(out, "\nError: {}", err)?;
    writeln!(out)?;
    writeln!(out, "Make sure that:")?;
    writeln!(out, "  - this machine can reach the provider over HTTPS")?;
    writeln!(out, "  - the OAuth client is registered as a desktop/public client")?;
    writeln!(out, "  - http://localhost is an allowed redirect URI for the client")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Expiry;

    fn grant(refresh: Option<&str>) -> TokenGrant {
        TokenGrant {
            access_token: "ya29.".to_string() + &"a".repeat(100),
            refresh_token: refresh.map(str::to_string),
            expiry: Expiry::In(3599),
        }
    }

    fn outlook_config() -> ClientConfig {
        ClientConfig {
            client_id: "cid".to_string(),
            client_secret: "csecret".to_string(),
            tenant_id: Some("common".to_string()),
        }
    }

    #[test]
    fn test_token_preview_truncates() {
        let preview = token_preview(&"b".repeat(80));
        assert_eq!(preview, format!("{}...", "b".repeat(50)));
    }

    #[test]
    fn test_token_preview_short_token() {
        assert_eq!(token_preview("AT"), "AT...");
    }

    #[test]
    fn test_env_entries_outlook_order() {
        let keys: Vec<&str> = env_entries(Provider::Outlook, &outlook_config(), &grant(Some("RT")))
            .iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                "POP3_PROVIDER",
                "POP3_EMAIL",
                "POP3_OAUTH2_CLIENT_ID",
                "POP3_OAUTH2_CLIENT_SECRET",
                "POP3_OAUTH2_REFRESH_TOKEN",
                "POP3_OAUTH2_TENANT_ID",
            ]
        );
    }

    #[test]
    fn test_env_entries_gmail_has_no_tenant() {
        let config = ClientConfig {
            tenant_id: None,
            ..outlook_config()
        };
        let entries = env_entries(Provider::Gmail, &config, &grant(Some("RT")));
        assert!(entries.iter().all(|e| e.key != "POP3_OAUTH2_TENANT_ID"));
    }

    #[test]
    fn test_success_never_prints_full_access_token() {
        let g = grant(Some("RT"));
        let mut out = Vec::new();
        write_success(&mut out, Provider::Outlook, &outlook_config(), &g).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains(&g.access_token));
        assert!(text.contains("Token Expiry: 3599 seconds"));
    }

    #[test]
    fn test_missing_refresh_token_placeholder() {
        let mut out = Vec::new();
        write_success(&mut out, Provider::Outlook, &outlook_config(), &grant(None)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Refresh Token: NOT RECEIVED"));
        assert!(text.contains("POP3_OAUTH2_REFRESH_TOKEN=<NOT_RECEIVED>"));
    }

    #[test]
    fn test_failure_without_description() {
        let mut out = Vec::new();
        write_failure(&mut out, &ProviderError::new("access_denied", None)).unwrap();
        let rule = "=".repeat(60);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            format!(
                "\n{rule}\nERROR: Failed to obtain OAuth2 credentials\n{rule}\n\
                 Error: access_denied\nDescription: None\n\n\
                 Please check:\n\
                 1. Client ID and Client Secret are correct\n\
                 2. API permissions are granted in Azure Portal\n\
                 3. 'offline_access' scope is included\n"
            )
        );
    }
}
