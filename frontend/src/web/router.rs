//! 路由服务模块 - 核心引擎
//!
//! 封装 History API，实现"请求 -> 守卫 -> 处理 -> 加载"的导航流程。
//! 守卫判定是纯函数（[`evaluate`]），导航、popstate 回退和认证状态
//! 变化三个入口共用同一套判定，保证每次导航恰好被解析一次。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::console;
use super::route::AppRoute;

/// 守卫判定结果：放行或重定向到登录页
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectLogin,
}

/// **核心守卫逻辑**
///
/// 公开路由一律放行；其余路由要求存在凭据，否则重定向登录页。
pub fn evaluate(route: &AppRoute, authenticated: bool) -> GuardDecision {
    if route.is_public() || authenticated {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectLogin
    }
}

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（用于重定向，不留下回退记录）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 当前路由通过 Signal 驱动界面更新；认证状态是注入的信号，
/// 路由层不直接接触凭据存储。
#[derive(Clone, Copy)]
pub struct RouterService {
    current_route: ReadSignal<AppRoute>,
    set_route: WriteSignal<AppRoute>,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(is_authenticated: Signal<bool>) -> Self {
        // 首次加载的路由同样过守卫，受保护页面不会在重定向前挂载
        let requested = AppRoute::from_path(&current_path());
        let initial_route = match evaluate(&requested, is_authenticated.get_untracked()) {
            GuardDecision::Allow => requested,
            GuardDecision::RedirectLogin => {
                let redirect = AppRoute::auth_failure_redirect();
                replace_history_state(&redirect.to_path());
                redirect
            }
        };
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    /// 当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// 按路径导航（守卫在目标视图挂载前同步执行）
    pub fn navigate(&self, path: &str) {
        self.navigate_to_route(AppRoute::from_path(path), true);
    }

    /// 按路由导航
    pub fn navigate_route(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    fn navigate_to_route(&self, target: AppRoute, use_push: bool) {
        let resolved = match evaluate(&target, self.is_authenticated.get_untracked()) {
            GuardDecision::Allow => target,
            GuardDecision::RedirectLogin => {
                console::log("[Router] 未携带凭据，重定向到登录页");
                AppRoute::auth_failure_redirect()
            }
        };

        if use_push {
            push_history_state(&resolved.to_path());
        } else {
            replace_history_state(&resolved.to_path());
        }
        self.set_route.set(resolved);
    }

    /// 监听浏览器前进/后退，popstate 同样过守卫
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            match evaluate(&target, is_authenticated.get_untracked()) {
                GuardDecision::Allow => set_route.set(target),
                GuardDecision::RedirectLogin => {
                    // 回退到受保护页面：改写历史，不允许绕过守卫
                    let redirect = AppRoute::auth_failure_redirect();
                    replace_history_state(&redirect.to_path());
                    set_route.set(redirect);
                }
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 认证状态变化时的自动重定向
    ///
    /// 这是 401 清除凭据后跳转登录页的唯一通道；当前已在登录页时
    /// 路由是公开的，不会产生多余跳转。
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            let route = current_route.get_untracked();

            if !is_auth && !route.is_public() {
                console::log("[Router] 凭据已失效，重定向到登录页");
                let redirect = AppRoute::auth_failure_redirect();
                replace_history_state(&redirect.to_path());
                set_route.set(redirect);
            } else if is_auth && route == AppRoute::Login {
                let redirect = AppRoute::auth_success_redirect();
                push_history_state(&redirect.to_path());
                set_route.set(redirect);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件，应在 App 根部使用
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件：根据当前路由渲染对应视图
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

#[cfg(test)]
mod tests {
    use super::{GuardDecision, evaluate};
    use crate::web::route::AppRoute;

    #[test]
    fn public_route_allowed_without_credential() {
        assert_eq!(evaluate(&AppRoute::Login, false), GuardDecision::Allow);
        assert_eq!(evaluate(&AppRoute::Login, true), GuardDecision::Allow);
    }

    #[test]
    fn protected_routes_require_credential() {
        let protected = [
            AppRoute::Dashboard,
            AppRoute::Groups,
            AppRoute::AutoReply,
            AppRoute::ScheduledTasks,
            AppRoute::SendMessage,
            AppRoute::MessageLogs,
            AppRoute::Chat,
            AppRoute::ChatWindow {
                chat_id: "oc_1".to_string(),
            },
            AppRoute::NotFound,
        ];
        for route in &protected {
            assert_eq!(evaluate(route, false), GuardDecision::RedirectLogin);
            assert_eq!(evaluate(route, true), GuardDecision::Allow);
        }
    }

    #[test]
    fn missing_credential_on_dashboard_redirects_to_login() {
        // 场景：凭据缺失时访问 /dashboard
        let target = AppRoute::from_path("/dashboard");
        assert_eq!(evaluate(&target, false), GuardDecision::RedirectLogin);
        assert_eq!(AppRoute::auth_failure_redirect(), AppRoute::Login);
    }
}
