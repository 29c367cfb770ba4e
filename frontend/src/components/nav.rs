//! 顶部导航栏：路由入口与注销按钮

use leptos::prelude::*;

use crate::auth::{logout, use_auth};
use crate::web::router::use_router;

/// 导航项：path 与路由表一一对应
const NAV_ITEMS: [(&str, &str); 7] = [
    ("/dashboard", "概览"),
    ("/groups", "群聊"),
    ("/auto-reply", "自动回复"),
    ("/scheduled-tasks", "定时任务"),
    ("/send-message", "发送消息"),
    ("/message-logs", "消息记录"),
    ("/chat", "会话"),
];

#[component]
pub fn NavBar() -> impl IntoView {
    let router = use_router();
    let auth = use_auth();

    let on_logout = move |_| {
        // 注销后路由服务会自动跳回登录页
        logout(&auth.session);
    };

    view! {
        <div class="navbar bg-base-100 rounded-box shadow-xl mb-6">
            <div class="flex-1 gap-1 flex-wrap">
                <a class="btn btn-ghost text-xl">"LarkDeck"</a>
                {NAV_ITEMS
                    .into_iter()
                    .map(|(path, label)| {
                        let is_active =
                            move || router.current_route().get().to_path() == path;
                        view! {
                            <button
                                class="btn btn-ghost btn-sm"
                                class=("btn-active", is_active)
                                on:click=move |_| router.navigate(path)
                            >
                                {label}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <div class="flex-none">
                <button on:click=on_logout class="btn btn-outline btn-error btn-sm">
                    "注销"
                </button>
            </div>
        </div>
    }
}
