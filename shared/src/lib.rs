use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod protocol;

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 携带凭据的请求头名称
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// SSE 等无法设置请求头的场景下，凭据所在的查询参数名
pub const QUERY_TOKEN: &str = "token";

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

/// 机器人基本信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotInfo {
    pub name: String,
    pub open_id: String,
    pub avatar_url: String,
}

/// 控制台首页的统计数据
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub group_count: i64,
    pub messages_today: i64,
    pub task_count: i64,
    pub rule_count: i64,
    pub user_count: i64,
}

/// 机器人已加入的群聊
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatGroup {
    pub id: u64,
    pub chat_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub chat_mode: String,
    #[serde(default)]
    pub chat_type: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub member_count: i64,
    #[serde(default)]
    pub external: bool,
    pub synced_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 群成员（来自 IM 开放平台，不落库）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMember {
    pub member_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// 消息方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// 会话类型：单聊或群聊
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    P2p,
    Group,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::P2p => "p2p",
            ChatType::Group => "group",
        }
    }
}

/// 消息来源：事件回调、定时任务或手动发送
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    Event,
    Scheduled,
    Manual,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageSource::Event => "event",
            MessageSource::Scheduled => "scheduled",
            MessageSource::Manual => "manual",
        }
    }
}

/// 消息流水记录
///
/// `msg_type` 是开放集合（text / post / image / interactive ...），
/// 由 IM 平台定义，保持字符串不做枚举。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageLog {
    pub id: u64,
    pub message_id: String,
    pub chat_id: String,
    pub chat_type: ChatType,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    pub direction: Direction,
    #[serde(default)]
    pub msg_type: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub handled_by: String,
    pub source: MessageSource,
    #[serde(default)]
    pub recalled: bool,
    pub created_at: DateTime<Utc>,
}

/// 最近会话（按 chat_id 聚合的消息流水）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub chat_id: String,
    pub chat_type: ChatType,
    #[serde(default)]
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: String,
    #[serde(default)]
    pub last_content: String,
    // 聚合查询产物，后端直接以字符串返回
    #[serde(default)]
    pub last_time: String,
    #[serde(default)]
    pub msg_count: i64,
}

/// 已同步的用户档案（字段宽松，缺省即空）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub open_id: String,
    pub name: String,
    pub en_name: String,
    pub avatar: String,
    pub email: String,
    pub city: String,
    pub job_title: String,
    pub employee_no: String,
    pub msg_count: i64,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 关键词匹配方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Exact,
    Contains,
    Prefix,
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Contains
    }
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Contains => "contains",
            MatchMode::Prefix => "prefix",
        }
    }
}

/// 关键词自动回复规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoReplyRule {
    pub id: u64,
    pub keyword: String,
    pub reply_text: String,
    #[serde(default)]
    pub match_mode: MatchMode,
    // 为空表示对所有会话生效
    #[serde(default)]
    pub chat_id: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 定时消息任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub id: u64,
    pub name: String,
    pub cron_expr: String,
    pub chat_id: String,
    #[serde(default)]
    pub msg_type: String,
    pub content: String,
    pub enabled: bool,
    #[serde(default)]
    pub last_run_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
