//! LarkDeck 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义（领域模型）
//! - `web::router`: 路由服务（核心引擎，含导航守卫）
//! - `auth`: 会话凭据与认证状态
//! - `api`: REST 客户端（出站附加凭据、入站拦截 401）
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    pub mod auto_reply;
    pub mod chat;
    pub mod dashboard;
    pub mod groups;
    pub mod login;
    pub mod message_logs;
    mod nav;
    pub mod scheduled_tasks;
    pub mod send_message;
}

use std::sync::Arc;

use leptos::prelude::*;

use crate::api::ConsoleApi;
use crate::auth::{AuthContext, BrowserSession};
use crate::components::auto_reply::AutoReplyPage;
use crate::components::chat::ChatPage;
use crate::components::dashboard::DashboardPage;
use crate::components::groups::GroupsPage;
use crate::components::login::LoginPage;
use crate::components::message_logs::MessageLogsPage;
use crate::components::scheduled_tasks::ScheduledTasksPage;
use crate::components::send_message::SendMessagePage;

// 原生 Web API 封装模块
pub(crate) mod web {
    pub mod console;
    pub mod route;
    pub mod router;
    pub mod sse;
    mod storage;

    pub use storage::LocalStorage;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Dashboard => view! { <DashboardPage /> }.into_any(),
        AppRoute::Groups => view! { <GroupsPage /> }.into_any(),
        AppRoute::AutoReply => view! { <AutoReplyPage /> }.into_any(),
        AppRoute::ScheduledTasks => view! { <ScheduledTasksPage /> }.into_any(),
        AppRoute::SendMessage => view! { <SendMessagePage /> }.into_any(),
        AppRoute::MessageLogs => view! { <MessageLogsPage /> }.into_any(),
        AppRoute::Chat => view! { <ChatPage /> }.into_any(),
        AppRoute::ChatWindow { chat_id } => {
            view! { <ChatPage chat_id=chat_id /> }.into_any()
        }
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建会话并提供认证上下文
    let session = BrowserSession::new();
    provide_context(AuthContext { session });

    // 2. 全局唯一的 API 客户端，注入同一份会话存取
    let api = ConsoleApi::new(Arc::new(session));
    provide_context(api);

    // 3. 认证信号注入路由服务实现守卫（解耦！）
    let is_authenticated = session.authed_signal();

    view! {
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
