//! API 客户端模块
//!
//! 全局唯一的 HTTP 客户端：固定 `/api` 前缀与默认超时，
//! 每个 REST 端点对应一个薄方法，不做任何重试或缓存。
//! 两个拦截行为是具名步骤：出站的 [`ConsoleApi::credential_header`]
//! （存在凭据才附加 `Authorization: Bearer`）和入站的
//! [`ConsoleApi::handle_unauthorized`]（401 清除会话，错误照常抛出）。

use std::sync::Arc;

use gloo_net::http::{Method, RequestBuilder, Response};
use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;
use web_sys::{AbortController, AbortSignal, File, FormData};

use crate::auth::SessionStore;
use crate::web::console;
use larkdeck_shared::protocol::{
    Ack, ChatMembersPage, DataEnvelope, LoginRequest, LoginResponse, MemberQuery,
    MessageLogQuery, PageQuery, Paged, ReplyMessageRequest, SendMessageRequest,
    SendMessageResponse, SyncChatsResponse, SyncResult, SyncUsersRequest,
    UpsertAutoReplyRule, UpsertScheduledTask, UploadFileResponse, UploadImageResponse,
    UserQuery,
};
use larkdeck_shared::{
    AutoReplyRule, BotInfo, ChatGroup, Conversation, DashboardStats, HEADER_AUTHORIZATION,
    MessageLog, QUERY_TOKEN, ScheduledTask, User,
};

/// 后端 API 前缀（与控制台同源部署）
const API_BASE: &str = "/api";

/// 普通请求超时
const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// 上传请求超时
const UPLOAD_TIMEOUT_MS: u32 = 60_000;

pub type ApiResult<T> = Result<T, ApiError>;

/// API 调用错误
///
/// 401 之外的失败不做本地处理，原样抛给调用方。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 请求构建失败
    Request(String),
    /// 网络请求失败
    Network(String),
    /// 请求超时被中止
    Timeout,
    /// 凭据缺失或已过期 (HTTP 401)
    Unauthorized,
    /// 其余非 2xx 状态
    Status { status: u16, message: String },
    /// 响应解析失败
    Decode(String),
}

impl core::fmt::Display for ApiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ApiError::Request(msg) => write!(f, "请求构建失败: {}", msg),
            ApiError::Network(msg) => write!(f, "网络错误: {}", msg),
            ApiError::Timeout => write!(f, "请求超时"),
            ApiError::Unauthorized => write!(f, "未登录或登录已过期"),
            ApiError::Status { status, message } => {
                write!(f, "请求失败 ({}): {}", status, message)
            }
            ApiError::Decode(msg) => write!(f, "响应解析失败: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// `Bearer <token>` 请求头值
fn bearer_value(token: &str) -> String {
    format!("Bearer {token}")
}

/// 请求超时守卫
///
/// 到期时中止关联的请求；守卫被 drop 时取消定时器。
struct AbortGuard {
    controller: AbortController,
    _timer: Timeout,
}

impl AbortGuard {
    fn schedule(timeout_ms: u32) -> Option<Self> {
        let controller = AbortController::new().ok()?;
        let handle = controller.clone();
        let timer = Timeout::new(timeout_ms, move || handle.abort());
        Some(Self {
            controller,
            _timer: timer,
        })
    }

    fn signal(&self) -> AbortSignal {
        self.controller.signal()
    }

    fn fired(&self) -> bool {
        self.controller.signal().aborted()
    }
}

/// 控制台 API 客户端
///
/// 整个应用共享一个实例（Clone 代价只是一次引用计数）。
/// 会话存取通过注入的 [`SessionStore`] 完成。
#[derive(Clone)]
pub struct ConsoleApi {
    base_url: String,
    session: Arc<dyn SessionStore>,
}

/// 从 Context 获取共享的 API 客户端
pub fn use_api() -> ConsoleApi {
    use_context::<ConsoleApi>().expect("ConsoleApi should be provided")
}

impl ConsoleApi {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self::with_base_url(API_BASE, session)
    }

    pub fn with_base_url(base_url: impl Into<String>, session: Arc<dyn SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, session }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // =========================================================
    // 请求管线
    // =========================================================

    /// 出站拦截：存在凭据时返回要附加的认证头；缺失不算错误
    fn credential_header(&self) -> Option<(&'static str, String)> {
        self.session
            .token()
            .map(|token| (HEADER_AUTHORIZATION, bearer_value(&token)))
    }

    /// 入站拦截：收到 401 时清除会话凭据
    ///
    /// 只负责清除；跳转由路由服务对认证信号的监听完成（已在登录页时
    /// 不会重复跳转）。错误仍然原样抛给调用方。
    fn handle_unauthorized(&self) {
        console::warn("[Api] 收到 401，清除本地凭据");
        self.session.clear();
    }

    fn prepare(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        timeout_ms: u32,
    ) -> (RequestBuilder, Option<AbortGuard>) {
        let mut builder = RequestBuilder::new(&self.url(path)).method(method);
        if !query.is_empty() {
            builder = builder.query(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        if let Some((name, value)) = self.credential_header() {
            builder = builder.header(name, &value);
        }
        let guard = AbortGuard::schedule(timeout_ms);
        if let Some(g) = &guard {
            builder = builder.abort_signal(Some(&g.signal()));
        }
        (builder, guard)
    }

    async fn execute(
        &self,
        request: Result<gloo_net::http::Request, gloo_net::Error>,
        guard: Option<AbortGuard>,
    ) -> ApiResult<Response> {
        let request = request.map_err(|e| ApiError::Request(e.to_string()))?;
        let result = request.send().await;
        let timed_out = guard.as_ref().is_some_and(AbortGuard::fired);
        drop(guard);

        let response = match result {
            Ok(response) => response,
            Err(_) if timed_out => return Err(ApiError::Timeout),
            Err(e) => return Err(ApiError::Network(e.to_string())),
        };

        if response.status() == 401 {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        if !response.ok() {
            return Err(Self::status_error(response).await);
        }
        Ok(response)
    }

    /// 非 2xx 响应：尽量取后端 `{"error": ...}` 里的描述
    async fn status_error(response: Response) -> ApiError {
        let status = response.status();
        let message = match response
            .json::<larkdeck_shared::protocol::ErrorResponse>()
            .await
        {
            Ok(body) => body.error,
            Err(_) => response.status_text(),
        };
        ApiError::Status { status, message }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ApiResult<T> {
        let (builder, guard) = self.prepare(method, path, query, DEFAULT_TIMEOUT_MS);
        let response = self.execute(builder.build(), guard).await?;
        Self::decode(response).await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let (builder, guard) = self.prepare(method, path, &[], DEFAULT_TIMEOUT_MS);
        let response = self.execute(builder.json(body), guard).await?;
        Self::decode(response).await
    }

    /// 上传走 multipart 表单与更长的超时
    async fn send_form<T: DeserializeOwned>(&self, path: &str, form: FormData) -> ApiResult<T> {
        let (builder, guard) = self.prepare(Method::POST, path, &[], UPLOAD_TIMEOUT_MS);
        let response = self.execute(builder.body(form), guard).await?;
        Self::decode(response).await
    }

    // =========================================================
    // 认证
    // =========================================================

    /// 登录换取凭据（唯一不要求已认证的端点）
    pub async fn login(&self, body: &LoginRequest) -> ApiResult<LoginResponse> {
        self.send_json(Method::POST, "/login", body).await
    }

    // =========================================================
    // 机器人与统计
    // =========================================================

    /// 获取机器人基本信息
    pub async fn bot_info(&self) -> ApiResult<BotInfo> {
        self.fetch_json(Method::GET, "/bot/info", &[]).await
    }

    /// 获取控制面板统计数据
    pub async fn dashboard_stats(&self) -> ApiResult<DashboardStats> {
        self.fetch_json(Method::GET, "/dashboard/stats", &[]).await
    }

    // =========================================================
    // 消息
    // =========================================================

    /// 主动发送消息
    pub async fn send_message(&self, body: &SendMessageRequest) -> ApiResult<SendMessageResponse> {
        self.send_json(Method::POST, "/messages/send", body).await
    }

    /// 回复指定消息
    pub async fn reply_message(
        &self,
        body: &ReplyMessageRequest,
    ) -> ApiResult<SendMessageResponse> {
        self.send_json(Method::POST, "/messages/reply", body).await
    }

    /// 撤回/删除消息
    pub async fn delete_message(&self, message_id: &str) -> ApiResult<Ack> {
        self.fetch_json(Method::DELETE, &format!("/messages/{message_id}"), &[])
            .await
    }

    /// 分页查询消息记录
    pub async fn message_logs(&self, query: &MessageLogQuery) -> ApiResult<Paged<MessageLog>> {
        self.fetch_json(Method::GET, "/messages/logs", &query.to_query_pairs())
            .await
    }

    /// 最近会话列表
    pub async fn conversations(&self) -> ApiResult<Vec<Conversation>> {
        let envelope: DataEnvelope<Vec<Conversation>> = self
            .fetch_json(Method::GET, "/messages/conversations", &[])
            .await?;
        Ok(envelope.data)
    }

    /// 实时消息流的 SSE 地址
    ///
    /// EventSource 无法设置请求头，凭据改走查询参数；
    /// `chat_id` 为空表示订阅全部消息。
    pub fn message_stream_url(&self, chat_id: Option<&str>) -> String {
        let mut params = Vec::new();
        if let Some(chat_id) = chat_id {
            params.push(format!("chat_id={}", urlencoding::encode(chat_id)));
        }
        if let Some(token) = self.session.token() {
            params.push(format!("{}={}", QUERY_TOKEN, urlencoding::encode(&token)));
        }
        let mut url = self.url("/messages/stream");
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }
        url
    }

    /// 消息内图片的直链（`<img>` 同样无法设置请求头）
    pub fn image_url(&self, message_id: &str, file_key: &str) -> String {
        let mut url = self.url(&format!(
            "/images/{}/{}",
            urlencoding::encode(message_id),
            urlencoding::encode(file_key)
        ));
        if let Some(token) = self.session.token() {
            url.push_str(&format!("?{}={}", QUERY_TOKEN, urlencoding::encode(&token)));
        }
        url
    }

    // =========================================================
    // 群聊
    // =========================================================

    /// 分页获取群聊列表
    pub async fn chats(&self, query: &PageQuery) -> ApiResult<Paged<ChatGroup>> {
        self.fetch_json(Method::GET, "/chats", &query.to_query_pairs())
            .await
    }

    /// 从 IM 平台同步群聊
    pub async fn sync_chats(&self) -> ApiResult<SyncChatsResponse> {
        self.fetch_json(Method::POST, "/chats/sync", &[]).await
    }

    /// 机器人退出群聊
    pub async fn leave_chat(&self, chat_id: &str) -> ApiResult<Ack> {
        self.fetch_json(Method::POST, &format!("/chats/{chat_id}/leave"), &[])
            .await
    }

    /// 群成员列表（游标分页）
    pub async fn chat_members(
        &self,
        chat_id: &str,
        query: &MemberQuery,
    ) -> ApiResult<ChatMembersPage> {
        self.fetch_json(
            Method::GET,
            &format!("/chats/{chat_id}/members"),
            &query.to_query_pairs(),
        )
        .await
    }

    // =========================================================
    // 自动回复规则
    // =========================================================

    /// 分页获取自动回复规则
    pub async fn auto_reply_rules(&self, query: &PageQuery) -> ApiResult<Paged<AutoReplyRule>> {
        self.fetch_json(Method::GET, "/auto-reply-rules", &query.to_query_pairs())
            .await
    }

    /// 按 ID 获取规则
    pub async fn auto_reply_rule(&self, id: u64) -> ApiResult<AutoReplyRule> {
        let envelope: DataEnvelope<AutoReplyRule> = self
            .fetch_json(Method::GET, &format!("/auto-reply-rules/{id}"), &[])
            .await?;
        Ok(envelope.data)
    }

    /// 创建规则
    pub async fn create_auto_reply_rule(
        &self,
        body: &UpsertAutoReplyRule,
    ) -> ApiResult<AutoReplyRule> {
        let envelope: DataEnvelope<AutoReplyRule> = self
            .send_json(Method::POST, "/auto-reply-rules", body)
            .await?;
        Ok(envelope.data)
    }

    /// 更新规则
    pub async fn update_auto_reply_rule(
        &self,
        id: u64,
        body: &UpsertAutoReplyRule,
    ) -> ApiResult<AutoReplyRule> {
        let envelope: DataEnvelope<AutoReplyRule> = self
            .send_json(Method::PUT, &format!("/auto-reply-rules/{id}"), body)
            .await?;
        Ok(envelope.data)
    }

    /// 删除规则
    pub async fn delete_auto_reply_rule(&self, id: u64) -> ApiResult<Ack> {
        self.fetch_json(Method::DELETE, &format!("/auto-reply-rules/{id}"), &[])
            .await
    }

    /// 启用/停用规则
    pub async fn toggle_auto_reply_rule(&self, id: u64) -> ApiResult<Ack> {
        self.fetch_json(Method::POST, &format!("/auto-reply-rules/{id}/toggle"), &[])
            .await
    }

    // =========================================================
    // 用户
    // =========================================================

    /// 分页获取用户列表（支持关键词与排序）
    pub async fn users(&self, query: &UserQuery) -> ApiResult<Paged<User>> {
        self.fetch_json(Method::GET, "/users", &query.to_query_pairs())
            .await
    }

    /// 从 IM 平台同步用户；`open_ids` 为空同步全部
    pub async fn sync_users(&self, body: &SyncUsersRequest) -> ApiResult<SyncResult> {
        self.send_json(Method::POST, "/users/sync", body).await
    }

    /// 按 open_id 获取用户
    pub async fn user_by_open_id(&self, open_id: &str) -> ApiResult<User> {
        let envelope: DataEnvelope<User> = self
            .fetch_json(Method::GET, &format!("/users/{open_id}"), &[])
            .await?;
        Ok(envelope.data)
    }

    // =========================================================
    // 定时任务
    // =========================================================

    /// 分页获取定时任务
    pub async fn scheduled_tasks(&self, query: &PageQuery) -> ApiResult<Paged<ScheduledTask>> {
        self.fetch_json(Method::GET, "/scheduled-tasks", &query.to_query_pairs())
            .await
    }

    /// 按 ID 获取定时任务
    pub async fn scheduled_task(&self, id: u64) -> ApiResult<ScheduledTask> {
        let envelope: DataEnvelope<ScheduledTask> = self
            .fetch_json(Method::GET, &format!("/scheduled-tasks/{id}"), &[])
            .await?;
        Ok(envelope.data)
    }

    /// 创建定时任务
    pub async fn create_scheduled_task(
        &self,
        body: &UpsertScheduledTask,
    ) -> ApiResult<ScheduledTask> {
        let envelope: DataEnvelope<ScheduledTask> = self
            .send_json(Method::POST, "/scheduled-tasks", body)
            .await?;
        Ok(envelope.data)
    }

    /// 更新定时任务
    pub async fn update_scheduled_task(
        &self,
        id: u64,
        body: &UpsertScheduledTask,
    ) -> ApiResult<ScheduledTask> {
        let envelope: DataEnvelope<ScheduledTask> = self
            .send_json(Method::PUT, &format!("/scheduled-tasks/{id}"), body)
            .await?;
        Ok(envelope.data)
    }

    /// 删除定时任务
    pub async fn delete_scheduled_task(&self, id: u64) -> ApiResult<Ack> {
        self.fetch_json(Method::DELETE, &format!("/scheduled-tasks/{id}"), &[])
            .await
    }

    /// 启用/停用定时任务
    pub async fn toggle_scheduled_task(&self, id: u64) -> ApiResult<Ack> {
        self.fetch_json(Method::POST, &format!("/scheduled-tasks/{id}/toggle"), &[])
            .await
    }

    /// 立即执行一次定时任务
    pub async fn run_scheduled_task(&self, id: u64) -> ApiResult<Ack> {
        self.fetch_json(Method::POST, &format!("/scheduled-tasks/{id}/run"), &[])
            .await
    }

    // =========================================================
    // 上传
    // =========================================================

    /// 上传图片，返回 image_key
    pub async fn upload_image(&self, file: &File) -> ApiResult<UploadImageResponse> {
        let form = multipart_file(file, None)?;
        self.send_form("/upload/image", form).await
    }

    /// 上传文件，返回 file_key；`file_type` 缺省由后端按扩展名推断
    pub async fn upload_file(
        &self,
        file: &File,
        file_type: Option<&str>,
    ) -> ApiResult<UploadFileResponse> {
        let form = multipart_file(file, file_type)?;
        self.send_form("/upload/file", form).await
    }
}

/// 构建单文件 multipart 表单
fn multipart_file(file: &File, file_type: Option<&str>) -> Result<FormData, ApiError> {
    let form = FormData::new().map_err(|e| ApiError::Request(format!("构建表单失败: {e:?}")))?;
    form.append_with_blob_and_filename("file", file, &file.name())
        .map_err(|e| ApiError::Request(format!("附加文件失败: {e:?}")))?;
    if let Some(kind) = file_type {
        let _ = form.append_with_str("file_type", kind);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // =========================================================
    // Mock session store
    // =========================================================

    /// In-memory session used to drive the interceptor steps in tests.
    struct MemorySession {
        token: Mutex<Option<String>>,
        clear_calls: Mutex<u32>,
    }

    impl MemorySession {
        fn with_token(token: &str) -> Arc<Self> {
            Arc::new(Self {
                token: Mutex::new(Some(token.to_string())),
                clear_calls: Mutex::new(0),
            })
        }

        fn empty() -> Arc<Self> {
            Arc::new(Self {
                token: Mutex::new(None),
                clear_calls: Mutex::new(0),
            })
        }

        fn clear_count(&self) -> u32 {
            *self.clear_calls.lock().unwrap()
        }
    }

    impl SessionStore for MemorySession {
        fn token(&self) -> Option<String> {
            self.token.lock().unwrap().clone()
        }

        fn store(&self, token: &str) {
            *self.token.lock().unwrap() = Some(token.to_string());
        }

        fn clear(&self) {
            *self.token.lock().unwrap() = None;
            *self.clear_calls.lock().unwrap() += 1;
        }
    }

    fn api_with(session: Arc<MemorySession>) -> ConsoleApi {
        ConsoleApi::with_base_url("/api", session)
    }

    // =========================================================
    // Outbound interceptor
    // =========================================================

    #[test]
    fn credential_header_present_iff_token_stored() {
        let api = api_with(MemorySession::with_token("tok-123"));
        assert_eq!(
            api.credential_header(),
            Some(("Authorization", "Bearer tok-123".to_string()))
        );

        let api = api_with(MemorySession::empty());
        assert_eq!(api.credential_header(), None);
    }

    #[test]
    fn bearer_value_formats_scheme() {
        assert_eq!(bearer_value("abc"), "Bearer abc");
    }

    // =========================================================
    // Inbound interceptor
    // =========================================================

    #[test]
    fn unauthorized_clears_session_exactly_once_per_response() {
        let session = MemorySession::with_token("tok-123");
        let api = api_with(session.clone());

        api.handle_unauthorized();
        assert_eq!(session.clear_count(), 1);
        assert_eq!(session.token(), None);

        // A second 401 clears an already-empty store; still a harmless no-op.
        api.handle_unauthorized();
        assert_eq!(session.clear_count(), 2);
        assert_eq!(session.token(), None);
    }

    // =========================================================
    // URL building
    // =========================================================

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let api = ConsoleApi::with_base_url("/api/", MemorySession::empty());
        assert_eq!(api.url("/chats"), "/api/chats");
        assert_eq!(api.url("chats"), "/api/chats");
    }

    #[test]
    fn stream_url_carries_token_and_chat_filter() {
        let api = api_with(MemorySession::with_token("tok 123"));
        let url = api.message_stream_url(Some("oc_abc"));
        assert_eq!(url, "/api/messages/stream?chat_id=oc_abc&token=tok%20123");

        // 无凭据时不附带 token 参数
        let api = api_with(MemorySession::empty());
        assert_eq!(api.message_stream_url(None), "/api/messages/stream");
    }

    #[test]
    fn image_url_encodes_segments() {
        let api = api_with(MemorySession::with_token("t"));
        assert_eq!(
            api.image_url("om_1", "img key"),
            "/api/images/om_1/img%20key?token=t"
        );
    }
}
