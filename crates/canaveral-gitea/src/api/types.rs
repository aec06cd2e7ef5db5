//! Wire types of the Gitea release API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a create or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePayload {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// Release as returned by the forge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResponse {
    /// Release ID, used for asset uploads
    pub id: u64,

    /// Web URL of the release
    #[serde(default)]
    pub html_url: String,

    #[serde(default)]
    pub tag_name: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub body: Option<String>,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub prerelease: bool,

    /// API URL of the release
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
}

/// Attachment as returned by the forge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetResponse {
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub browser_download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_response_minimal() {
        let release: ReleaseResponse = serde_json::from_str(
            r#"{"id": 1, "html_url": "https://gitea.example.com/o/r/releases/tag/v1.0.0"}"#,
        )
        .unwrap();
        assert_eq!(release.id, 1);
        assert!(release.html_url.ends_with("/v1.0.0"));
        assert!(release.created_at.is_none());
    }

    #[test]
    fn test_release_response_full() {
        let release: ReleaseResponse = serde_json::from_str(
            r#"{
                "id": 42,
                "tag_name": "v2.0.0",
                "name": "v2.0.0",
                "body": "notes",
                "url": "https://gitea.example.com/api/v1/repos/o/r/releases/42",
                "html_url": "https://gitea.example.com/o/r/releases/tag/v2.0.0",
                "draft": false,
                "prerelease": true,
                "created_at": "2024-01-15T10:30:00Z",
                "published_at": "2024-01-15T10:30:05+00:00",
                "assets": []
            }"#,
        )
        .unwrap();
        assert_eq!(release.tag_name, "v2.0.0");
        assert!(release.prerelease);
        assert_eq!(
            release.created_at.map(|t| t.to_rfc3339()),
            Some("2024-01-15T10:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_payload_field_names() {
        let payload = ReleasePayload {
            tag_name: "v1.0.0".to_string(),
            name: "v1.0.0".to_string(),
            body: "changes".to_string(),
            draft: false,
            prerelease: true,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["tag_name"], "v1.0.0");
        assert_eq!(json["prerelease"], true);
    }
}
