//! 路由定义模块 - 领域模型
//!
//! 纯业务逻辑层，不依赖 DOM 或 web_sys。
//! 路由表在启动时确定，运行期从不变更。

use std::fmt::Display;

/// 应用路由枚举
///
/// `/` 是 `/dashboard` 的别名（与后端 SPA 回退行为一致）。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面（唯一的公开路由）
    Login,
    /// 控制面板
    #[default]
    Dashboard,
    /// 群聊管理
    Groups,
    /// 自动回复规则
    AutoReply,
    /// 定时任务
    ScheduledTasks,
    /// 发送消息
    SendMessage,
    /// 消息记录
    MessageLogs,
    /// 会话列表
    Chat,
    /// 指定会话窗口
    ChatWindow { chat_id: String },
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    ///
    /// 未知路径归入 [`AppRoute::NotFound`]，由守卫按非公开路由处理。
    pub fn from_path(path: &str) -> Self {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };

        match trimmed {
            "/" | "/dashboard" => Self::Dashboard,
            "/login" => Self::Login,
            "/groups" => Self::Groups,
            "/auto-reply" => Self::AutoReply,
            "/scheduled-tasks" => Self::ScheduledTasks,
            "/send-message" => Self::SendMessage,
            "/message-logs" => Self::MessageLogs,
            "/chat" => Self::Chat,
            other => match other.strip_prefix("/chat/") {
                Some(raw) if !raw.is_empty() && !raw.contains('/') => {
                    let chat_id = urlencoding::decode(raw)
                        .map(|s| s.into_owned())
                        .unwrap_or_else(|_| raw.to_string());
                    Self::ChatWindow { chat_id }
                }
                _ => Self::NotFound,
            },
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Groups => "/groups".to_string(),
            Self::AutoReply => "/auto-reply".to_string(),
            Self::ScheduledTasks => "/scheduled-tasks".to_string(),
            Self::SendMessage => "/send-message".to_string(),
            Self::MessageLogs => "/message-logs".to_string(),
            Self::Chat => "/chat".to_string(),
            Self::ChatWindow { chat_id } => {
                format!("/chat/{}", urlencoding::encode(chat_id))
            }
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 该路由是否无需凭据即可访问
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 守卫拒绝访问时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 登录成功后离开登录页的目标
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::AppRoute;

    #[test]
    fn root_is_dashboard_alias() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Dashboard);
        assert_eq!(AppRoute::from_path("/dashboard"), AppRoute::Dashboard);
    }

    #[test]
    fn static_table_round_trips() {
        for path in [
            "/login",
            "/dashboard",
            "/groups",
            "/auto-reply",
            "/scheduled-tasks",
            "/send-message",
            "/message-logs",
            "/chat",
        ] {
            let route = AppRoute::from_path(path);
            assert_ne!(route, AppRoute::NotFound, "{path} should be routable");
            assert_eq!(route.to_path(), path);
        }
    }

    #[test]
    fn chat_window_carries_decoded_id() {
        assert_eq!(
            AppRoute::from_path("/chat/oc_abc123"),
            AppRoute::ChatWindow {
                chat_id: "oc_abc123".to_string()
            }
        );
        // 编码字符往返保持一致
        let route = AppRoute::ChatWindow {
            chat_id: "oc/有空格 id".to_string(),
        };
        assert_eq!(AppRoute::from_path(&route.to_path()), route);
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/chat/a/b"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path("/chat/"), AppRoute::Chat);
    }

    #[test]
    fn only_login_is_public() {
        assert!(AppRoute::Login.is_public());
        for route in [
            AppRoute::Dashboard,
            AppRoute::Groups,
            AppRoute::AutoReply,
            AppRoute::ScheduledTasks,
            AppRoute::SendMessage,
            AppRoute::MessageLogs,
            AppRoute::Chat,
            AppRoute::ChatWindow {
                chat_id: "oc_x".to_string(),
            },
            AppRoute::NotFound,
        ] {
            assert!(!route.is_public(), "{route} should require auth");
        }
    }
}
