//! Provider presets: endpoints, scopes, prompts, and .env values.

/// Tenant that lets any organization or personal Microsoft account sign in.
pub const DEFAULT_TENANT: &str = "common";

pub const GMAIL_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GMAIL_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const GMAIL_REDIRECT_URI: &str = "http://localhost";
pub const GMAIL_SCOPES: &[&str] = &["https://mail.google.com/"];

pub const MICROSOFT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";
pub const OUTLOOK_SCOPES: &[&str] = &[
    "https://outlook.office365.com/POP.AccessAsUser.All",
    "offline_access",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gmail,
    Outlook,
}

impl Provider {
    /// Value for `POP3_PROVIDER`.
    pub fn name(self) -> &'static str {
        match self {
            Provider::Gmail => "gmail",
            Provider::Outlook => "outlook",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Provider::Gmail => "Gmail",
            Provider::Outlook => "Outlook/Office365",
        }
    }

    pub fn scopes(self) -> &'static [&'static str] {
        match self {
            Provider::Gmail => GMAIL_SCOPES,
            Provider::Outlook => OUTLOOK_SCOPES,
        }
    }

    pub fn placeholder_email(self) -> &'static str {
        match self {
            Provider::Gmail => "your.email@gmail.com",
            Provider::Outlook => "your.email@outlook.com",
        }
    }

    pub fn client_id_prompt(self) -> &'static str {
        match self {
            Provider::Gmail => "Enter your Client ID: ",
            Provider::Outlook => "Enter your Client ID (Application ID): ",
        }
    }

    pub fn client_secret_prompt(self) -> &'static str {
        "Enter your Client Secret: "
    }

    /// Only Outlook asks for a tenant.
    pub fn tenant_prompt(self) -> Option<&'static str> {
        match self {
            Provider::Gmail => None,
            Provider::Outlook => {
                Some("Enter your Tenant ID (or 'common' for personal accounts) [common]: ")
            }
        }
    }

    /// Printed under the token block when no refresh token came back.
    pub fn missing_refresh_warning(self) -> &'static str {
        match self {
            Provider::Gmail => {
                "WARNING: Google only issues a refresh token on first consent. \
                 Remove the app at https://myaccount.google.com/permissions and run again."
            }
            Provider::Outlook => "WARNING: Make sure 'offline_access' scope is included!",
        }
    }
}

/// Microsoft identity platform authority for a tenant.
pub fn authority_url(host: &str, tenant: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), tenant)
}

pub fn microsoft_authorize_url(authority: &str) -> String {
    format!("{}/oauth2/v2.0/authorize", authority)
}

pub fn microsoft_token_url(authority: &str) -> String {
    format!("{}/oauth2/v2.0/token", authority)
}

/// Empty or whitespace-only tenant input means [`DEFAULT_TENANT`].
pub fn resolve_tenant(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        DEFAULT_TENANT.to_string()
    } else {
        trimmed.to_string()
    }
}
