//! Social publishing client used by casewatch.
//!
//! Only the Twitter/X v1.1 pipeline is implemented: OAuth 1.0a request
//! signing, credential verification, media upload, and the status post.

pub mod twitter;

pub use twitter::{OauthCredentials, PublishError, TwitterApi};
