//! SSE 事件流封装模块
//!
//! 封装 `EventSource`，用于接收后端的实时消息推送。
//! 凭据通过查询参数携带（EventSource 无法设置请求头）。

use wasm_bindgen::prelude::*;
use web_sys::{EventSource, MessageEvent};

use super::console;

/// 服务端推送事件流
///
/// 持有回调闭包保持其存活；`EventStream` 被 drop 时自动关闭连接。
pub struct EventStream {
    source: EventSource,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_error: Closure<dyn FnMut(web_sys::Event)>,
}

impl EventStream {
    /// 建立连接，每条消息的文本负载交给 `on_message`
    ///
    /// 心跳注释行（`: ping`）由浏览器消化，不会进入回调。
    pub fn connect<F>(url: &str, on_message: F) -> Result<Self, String>
    where
        F: Fn(String) + 'static,
    {
        let source =
            EventSource::new(url).map_err(|e| format!("EventSource 创建失败: {e:?}"))?;

        let message_closure =
            Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                if let Some(text) = event.data().as_string() {
                    on_message(text);
                }
            });
        source.set_onmessage(Some(message_closure.as_ref().unchecked_ref()));

        let error_closure = Closure::<dyn FnMut(web_sys::Event)>::new(|_: web_sys::Event| {
            console::warn("[Sse] 连接中断，等待浏览器自动重连");
        });
        source.set_onerror(Some(error_closure.as_ref().unchecked_ref()));

        Ok(Self {
            source,
            _on_message: message_closure,
            _on_error: error_closure,
        })
    }

    /// 主动关闭连接
    ///
    /// 通常不需要手动调用，drop 时会自动关闭。
    pub fn close(&self) {
        self.source.close();
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.close();
    }
}
