//! Publishing client for the Twitter/X v1.1 endpoints.
//!
//! Authentication failures are fatal: a run that cannot verify its
//! credentials does not attempt the upload or the post.

use std::path::Path;

use casewatch_http::{Auth, HttpClient, HttpError, RequestOpts};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use thiserror::Error;

use crate::twitter::oauth::{authorization_header, OauthCredentials};
use crate::twitter::types::{MediaUpload, PostedStatus, VerifiedAccount};

const API_BASE: &str = "https://api.twitter.com";
const UPLOAD_BASE: &str = "https://upload.twitter.com";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("media upload failed: {0}")]
    Upload(String),
    #[error("status post failed: {0}")]
    Post(String),
}

pub struct TwitterApi {
    api: HttpClient,
    upload: HttpClient,
    creds: OauthCredentials,
}

impl TwitterApi {
    pub fn new(creds: OauthCredentials) -> Result<Self, PublishError> {
        let client = |base: &str| {
            HttpClient::new(base).map_err(|e| PublishError::Auth(e.to_string()))
        };
        Ok(Self {
            api: client(API_BASE)?,
            upload: client(UPLOAD_BASE)?,
            creds,
        })
    }

    fn signed_opts(
        &self,
        method: &str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<RequestOpts<'static>, PublishError> {
        let header = authorization_header(&self.creds, method, url, params);
        let value = HeaderValue::from_str(&header)
            .map_err(|e| PublishError::Auth(format!("invalid Authorization header: {e}")))?;
        Ok(RequestOpts {
            auth: Some(Auth::Header {
                name: AUTHORIZATION,
                value,
            }),
            ..Default::default()
        })
    }

    /// Check the four credential strings before doing anything else.
    pub async fn verify_credentials(&self) -> Result<VerifiedAccount, PublishError> {
        let url = format!("{API_BASE}/1.1/account/verify_credentials.json");
        let opts = self.signed_opts("GET", &url, &[])?;
        let account: VerifiedAccount = self
            .api
            .get_json("1.1/account/verify_credentials.json", opts)
            .await
            .map_err(|e| PublishError::Auth(e.to_string()))?;
        tracing::info!(screen_name = %account.screen_name, "twitter.auth.ok");
        Ok(account)
    }

    /// Upload a chart image, returning the media object whose id the status
    /// post references. The multipart body is excluded from the OAuth
    /// signature.
    pub async fn upload_media(&self, path: &Path) -> Result<MediaUpload, PublishError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| PublishError::Upload(format!("read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media.png".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/png")
            .map_err(|e| PublishError::Upload(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("media", part);

        let url = format!("{UPLOAD_BASE}/1.1/media/upload.json");
        let opts = self.signed_opts("POST", &url, &[])?;
        let media: MediaUpload = self
            .upload
            .post_multipart("1.1/media/upload.json", form, opts)
            .await
            .map_err(classify_upload)?;
        tracing::info!(media_id = %media.media_id_string, "twitter.media.uploaded");
        Ok(media)
    }

    /// Post the composed text with the uploaded media attached.
    pub async fn post_status(
        &self,
        text: &str,
        media_ids: &[&str],
    ) -> Result<PostedStatus, PublishError> {
        let joined = media_ids.join(",");
        let params: Vec<(&str, &str)> = vec![("status", text), ("media_ids", &joined)];

        let url = format!("{API_BASE}/1.1/statuses/update.json");
        let opts = self.signed_opts("POST", &url, &params)?;
        let status: PostedStatus = self
            .api
            .post_form("1.1/statuses/update.json", &params, opts)
            .await
            .map_err(classify_post)?;
        tracing::info!(status_id = %status.id_str, "twitter.status.posted");
        Ok(status)
    }
}

fn classify_upload(e: HttpError) -> PublishError {
    if e.is_auth_failure() {
        PublishError::Auth(e.to_string())
    } else {
        PublishError::Upload(e.to_string())
    }
}

fn classify_post(e: HttpError) -> PublishError {
    if e.is_auth_failure() {
        PublishError::Auth(e.to_string())
    } else {
        PublishError::Post(e.to_string())
    }
}
