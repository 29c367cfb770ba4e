//! Request/response types for the console REST API.
//!
//! Shapes mirror the backend handlers one to one; the client sends these
//! verbatim and never post-processes what comes back.

use serde::{Deserialize, Serialize};

use crate::{ChatGroup, ChatMember, ChatType, Direction, MatchMode, MessageSource};

// =========================================================
// Auth
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

// =========================================================
// Messages
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub receive_id: String,
    pub receive_id_type: String,
    pub msg_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyMessageRequest {
    pub message_id: String,
    pub msg_type: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: String,
}

// =========================================================
// Auto-reply rules / scheduled tasks
// =========================================================

/// Create and update share one body; the backend fills defaults
/// (`match_mode` = contains, `enabled` = true) for absent fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertAutoReplyRule {
    pub keyword: String,
    pub reply_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_mode: Option<MatchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertScheduledTask {
    pub name: String,
    pub cron_expr: String,
    pub chat_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg_type: Option<String>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

// =========================================================
// Users
// =========================================================

/// An empty `open_ids` list asks the backend to sync every known user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncUsersRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub open_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncResult {
    pub total: i64,
    pub synced: i64,
    pub skipped: i64,
    pub failed: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_ids: Vec<String>,
}

// =========================================================
// Queries
// =========================================================

/// Plain page/page_size pagination. Unset fields are omitted from the URL
/// so the backend applies its own defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            page_size: None,
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        pairs
    }
}

/// Filterable message log listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub chat_id: Option<String>,
    pub chat_type: Option<ChatType>,
    pub direction: Option<Direction>,
    pub source: Option<MessageSource>,
}

impl MessageLogQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        if let Some(chat_id) = &self.chat_id {
            pairs.push(("chat_id", chat_id.clone()));
        }
        if let Some(chat_type) = self.chat_type {
            pairs.push(("chat_type", chat_type.as_str().to_string()));
        }
        if let Some(direction) = self.direction {
            pairs.push(("direction", direction.as_str().to_string()));
        }
        if let Some(source) = self.source {
            pairs.push(("source", source.as_str().to_string()));
        }
        pairs
    }
}

/// User listing with keyword search and sorting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub keyword: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl UserQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        if let Some(sort_by) = &self.sort_by {
            pairs.push(("sort_by", sort_by.clone()));
        }
        if let Some(sort_dir) = &self.sort_dir {
            pairs.push(("sort_dir", sort_dir.clone()));
        }
        pairs
    }
}

/// Cursor pagination used by the member list (IM platform style).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberQuery {
    pub page_token: Option<String>,
    pub page_size: Option<u32>,
}

impl MemberQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(token) = &self.page_token {
            pairs.push(("page_token", token.clone()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("page_size", size.to_string()));
        }
        pairs
    }
}

// =========================================================
// Response envelopes
// =========================================================

/// `{ "data": [...], "total": n, "page": n? }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

/// `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// `{ "message": "..." }` acknowledgement with no payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncChatsResponse {
    pub data: Vec<ChatGroup>,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMembersPage {
    #[serde(default)]
    pub data: Vec<ChatMember>,
    #[serde(default)]
    pub page_token: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageResponse {
    pub image_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub file_key: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: String,
}

/// `{ "error": "..." }` body the backend attaches to non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChatType, Direction, MatchMode, MessageSource};

    #[test]
    fn enums_print_wire_names() {
        assert_eq!(Direction::In.as_str(), "in");
        assert_eq!(Direction::Out.as_str(), "out");
        assert_eq!(ChatType::P2p.as_str(), "p2p");
        assert_eq!(MessageSource::Scheduled.as_str(), "scheduled");
        assert_eq!(MatchMode::default().as_str(), "contains");
    }

    #[test]
    fn enum_serde_matches_as_str() {
        assert_eq!(
            serde_json::to_string(&Direction::In).unwrap(),
            "\"in\""
        );
        assert_eq!(
            serde_json::to_string(&ChatType::Group).unwrap(),
            "\"group\""
        );
        assert_eq!(
            serde_json::to_string(&MatchMode::Prefix).unwrap(),
            "\"prefix\""
        );
        let source: MessageSource = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(source, MessageSource::Manual);
    }

    #[test]
    fn page_query_omits_unset_fields() {
        assert!(PageQuery::default().to_query_pairs().is_empty());
        assert_eq!(
            PageQuery::page(1).to_query_pairs(),
            vec![("page", "1".to_string())]
        );
    }

    #[test]
    fn message_log_query_includes_only_set_filters() {
        let query = MessageLogQuery {
            page: Some(2),
            chat_id: Some("oc_123".to_string()),
            direction: Some(Direction::Out),
            ..Default::default()
        };
        assert_eq!(
            query.to_query_pairs(),
            vec![
                ("page", "2".to_string()),
                ("chat_id", "oc_123".to_string()),
                ("direction", "out".to_string()),
            ]
        );
    }

    #[test]
    fn upsert_rule_skips_absent_optionals() {
        let body = UpsertAutoReplyRule {
            keyword: "报修".to_string(),
            reply_text: "已收到".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&body).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("match_mode"));
        assert!(!object.contains_key("chat_id"));
        assert!(!object.contains_key("enabled"));
    }

    #[test]
    fn sync_users_request_skips_empty_list() {
        let json = serde_json::to_value(&SyncUsersRequest::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
        let some = SyncUsersRequest {
            open_ids: vec!["ou_1".to_string()],
        };
        let json = serde_json::to_value(&some).unwrap();
        assert_eq!(json, serde_json::json!({ "open_ids": ["ou_1"] }));
    }
}
