use serde::{Deserialize, Serialize};

/// Response to `media/upload.json`. Only the id is needed downstream; the
/// string form is what `statuses/update.json` expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaUpload {
    pub media_id: u64,
    pub media_id_string: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub expires_after_secs: Option<u64>,
}

/// Response to `statuses/update.json`, reduced to the fields we log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedStatus {
    pub id_str: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response to `account/verify_credentials.json`, reduced to the fields we
/// log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedAccount {
    pub id_str: String,
    pub screen_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_upload_decodes_without_optional_fields() {
        let body = r#"{"media_id":710511363345354753,"media_id_string":"710511363345354753"}"#;
        let media: MediaUpload = serde_json::from_str(body).unwrap();
        assert_eq!(media.media_id, 710511363345354753);
        assert_eq!(media.media_id_string, "710511363345354753");
        assert_eq!(media.expires_after_secs, None);
    }

    #[test]
    fn posted_status_decodes() {
        let body = r#"{"id_str":"1","text":"Hull:","created_at":"Sat Mar 20 09:00:00 +0000 2021"}"#;
        let status: PostedStatus = serde_json::from_str(body).unwrap();
        assert_eq!(status.id_str, "1");
        assert!(status.created_at.is_some());
    }
}
