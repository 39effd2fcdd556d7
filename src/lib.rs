//! Obtain OAuth2 refresh tokens for POP3 mail access and print the `.env`
//! lines a mail bridge needs.

pub mod cli;
pub mod env_file;
pub mod flow;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod report;
pub mod session;
pub mod token;
pub mod util;
