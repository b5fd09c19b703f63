#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Token credentials for Azure Resource Manager.
//!
//! Every credential implements [`TokenCredential`]. The ARM pipeline asks it
//! for a token scoped to `{audience}/.default` before each attempt and calls
//! [`TokenCredential::invalidate`] when the service rejects a token.
//!
//! - [`ClientSecretCredential`]: service principal with a client secret,
//!   refreshed in the background
//! - [`EnvironmentCredential`]: the same, configured from `AZURE_*` variables
//! - [`StaticTokenCredential`]: a token obtained elsewhere

mod client_secret;
mod config;
mod credential;
mod environment;
mod error;
mod secret;
mod source;
mod static_token;

pub use client_secret::ClientSecretCredential;
pub use config::{ClientSecretConfig, DEFAULT_AUTHORITY_HOST};
pub use credential::{AccessToken, TokenCredential, TokenRequestOptions};
pub use environment::{
    AZURE_AUTHORITY_HOST, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET, AZURE_TENANT_ID,
    EnvironmentCredential,
};
pub use error::CredentialError;
pub use secret::SecretString;
pub use static_token::StaticTokenCredential;
