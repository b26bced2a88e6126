//! # Request Payloads
//!
//! Caller-facing inputs to the idea and user operations. Missing sequence,
//! flag and text fields deserialize to their empty values.

use serde::{Deserialize, Serialize};

/// Input for creating an idea.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIdea {
    pub author_email: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub media_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Full replacement of an idea's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaEdit {
    pub requester_user_email: String,
    /// Reporter address; absent or empty records no issue report.
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub media_types: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub bad_flag: bool,
    #[serde(default)]
    pub enabled: bool,
}

/// Filter for listing ideas. Zero and empty fields are "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeaQuery {
    pub idea_id: String,
    pub media_type: String,
    pub min_popularity: i64,
    pub max_popularity: i64,
    pub top_popular_number: i64,
    pub include_media: bool,
    pub include_summary: bool,
    pub include_content: bool,
    pub page_size: i64,
    pub page_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteRequest {
    pub idea_id: String,
    pub requester_user_email: String,
}

/// Input for creating a user on behalf of `requester_user_email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub requester_user_email: String,
    pub email_address: String,
    /// Kept as text so unknown roles surface as a permission failure.
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

/// Externally requested profile change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEdit {
    pub requester_user_email: String,
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub requester_user_email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_fields_default_to_unset() {
        let query: IdeaQuery = serde_json::from_str(r#"{"page_size": 5}"#).unwrap();
        assert_eq!(query.page_size, 5);
        assert_eq!(query.top_popular_number, 0);
        assert!(query.idea_id.is_empty());
        assert!(!query.include_media);
    }

    #[test]
    fn edit_ip_is_optional() {
        let edit: IdeaEdit =
            serde_json::from_str(r#"{"requester_user_email": "a@x.com", "enabled": true}"#).unwrap();
        assert_eq!(edit.ip, None);
        assert!(edit.enabled);
        assert!(edit.tags.is_empty());
    }

    #[test]
    fn new_user_requires_role() {
        let missing = serde_json::from_str::<NewUser>(
            r#"{"requester_user_email": "a@x.com", "email_address": "b@x.com"}"#,
        );
        assert!(missing.is_err());
    }
}
