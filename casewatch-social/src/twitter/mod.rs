//! Twitter/X v1.1 integration surface.
//!
//! Submodules provide the OAuth 1.0a signer, the HTTP client wrapper, and
//! the typed response models. The v1.1 endpoints are the ones that accept
//! the four static credential strings this bot is provisioned with.

pub mod client;
pub mod oauth;
pub mod types;

pub use client::{PublishError, TwitterApi};
pub use oauth::OauthCredentials;
