//! 认证模块
//!
//! 管理登录凭据与认证状态，与路由系统解耦。
//! 凭据是不透明的 Bearer Token：登录时写入 LocalStorage，
//! 注销或收到 401 时清除，客户端从不解析其内容。
//! 请求管线与导航守卫都通过注入的 [`SessionStore`] / 认证信号访问
//! 凭据，避免散落的全局读取。

use leptos::prelude::*;

use crate::api::{ApiError, ConsoleApi};
use crate::web::LocalStorage;
use larkdeck_shared::protocol::LoginRequest;

/// LocalStorage 中保存凭据的键名
const TOKEN_KEY: &str = "larkdeck_token";

/// 会话凭据存取接口
///
/// 注入请求管线（附加请求头、401 清除）；实现必须保证清除是幂等的。
pub trait SessionStore: Send + Sync {
    /// 当前凭据；空串视同不存在
    fn token(&self) -> Option<String>;
    /// 写入新凭据
    fn store(&self, token: &str);
    /// 清除凭据；重复清除是无害的空操作
    fn clear(&self);
}

/// 浏览器会话：LocalStorage 持久化 + 认证信号
///
/// 信号与存储保持同步：`authed_signal()` 为真当且仅当存在非空凭据。
/// 路由守卫只消费该信号。
#[derive(Clone, Copy)]
pub struct BrowserSession {
    authed: RwSignal<bool>,
}

impl BrowserSession {
    /// 创建会话，初始状态取决于 LocalStorage 中是否已有凭据
    pub fn new() -> Self {
        Self {
            authed: RwSignal::new(read_token().is_some()),
        }
    }

    /// 供路由守卫注入的认证状态信号
    pub fn authed_signal(&self) -> Signal<bool> {
        let authed = self.authed;
        Signal::derive(move || authed.get())
    }
}

impl Default for BrowserSession {
    fn default() -> Self {
        Self::new()
    }
}

fn read_token() -> Option<String> {
    LocalStorage::get(TOKEN_KEY).filter(|token| !token.is_empty())
}

impl SessionStore for BrowserSession {
    fn token(&self) -> Option<String> {
        read_token()
    }

    fn store(&self, token: &str) {
        LocalStorage::set(TOKEN_KEY, token);
        self.authed.set(!token.is_empty());
    }

    fn clear(&self) {
        LocalStorage::remove(TOKEN_KEY);
        self.authed.set(false);
    }
}

/// 认证上下文，通过 Context 在组件间共享
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub session: BrowserSession,
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录：用用户名密码换取凭据并写入会话
///
/// 路由服务监听认证信号，成功后会自动离开登录页。
pub async fn login(
    api: &ConsoleApi,
    session: &BrowserSession,
    username: String,
    password: String,
) -> Result<(), ApiError> {
    let resp = api.login(&LoginRequest { username, password }).await?;
    session.store(&resp.token);
    Ok(())
}

/// 注销并清除凭据
///
/// 不手动导航：路由服务监听认证状态变化并自动重定向。
pub fn logout(session: &BrowserSession) {
    session.clear();
}
