use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use crate::web::sse::EventStream;
use larkdeck_shared::protocol::{MessageLogQuery, ReplyMessageRequest, SendMessageRequest};
use larkdeck_shared::{Conversation, Direction, MessageLog};

/// 取消息的可读文本；content 是平台 JSON，解析失败时原样展示
fn content_preview(log: &MessageLog) -> String {
    serde_json::from_str::<serde_json::Value>(&log.content)
        .ok()
        .and_then(|value| {
            value
                .get("text")
                .and_then(|text| text.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| log.content.clone())
}

/// 图片消息的 image_key（用于拼接直链）
fn image_key(log: &MessageLog) -> Option<String> {
    if log.msg_type != "image" {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(&log.content)
        .ok()?
        .get("image_key")?
        .as_str()
        .map(str::to_string)
}

#[component]
pub fn ChatPage(#[prop(optional)] chat_id: Option<String>) -> impl IntoView {
    let api = use_api();
    let router = use_router();

    let (conversations, set_conversations) = signal(Vec::<Conversation>::new());
    let (messages, set_messages) = signal(Vec::<MessageLog>::new());
    let (draft, set_draft) = signal(String::new());
    let (reply_to, set_reply_to) = signal(Option::<String>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 会话列表
    {
        let api = api.clone();
        spawn_local(async move {
            match api.conversations().await {
                Ok(list) => set_conversations.set(list),
                Err(e) => set_error_msg.set(Some(format!("加载会话失败: {e}"))),
            }
        });
    }

    // 选中会话：拉历史记录并订阅实时推送
    let selected = chat_id.clone();
    if let Some(current) = selected.clone() {
        let api_logs = api.clone();
        let history_id = current.clone();
        spawn_local(async move {
            let query = MessageLogQuery {
                page: Some(1),
                page_size: Some(50),
                chat_id: Some(history_id),
                ..Default::default()
            };
            match api_logs.message_logs(&query).await {
                Ok(mut result) => {
                    // 后端按时间倒序返回，聊天窗口按时间正序展示
                    result.data.reverse();
                    set_messages.set(result.data);
                }
                Err(e) => set_error_msg.set(Some(format!("加载消息失败: {e}"))),
            }
        });
    }

    // EventStream 由 StoredValue 持有，组件销毁时关闭连接
    let _stream = StoredValue::new_local(selected.clone().and_then(|current| {
        let url = api.message_stream_url(Some(&current));
        EventStream::connect(&url, move |payload| {
            if let Ok(log) = serde_json::from_str::<MessageLog>(&payload) {
                set_messages.update(|list| list.push(log));
            }
        })
        .ok()
    }));

    let on_submit = {
        let api = api.clone();
        let selected = selected.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            let Some(target) = selected.clone() else {
                return;
            };
            let content = draft.get_untracked();
            if content.is_empty() {
                return;
            }
            let api = api.clone();
            let body_content = serde_json::json!({ "text": content }).to_string();
            let replying = reply_to.get_untracked();
            spawn_local(async move {
                let result = match replying {
                    Some(message_id) => {
                        api.reply_message(&ReplyMessageRequest {
                            message_id,
                            msg_type: "text".to_string(),
                            content: body_content,
                        })
                        .await
                    }
                    None => {
                        api.send_message(&SendMessageRequest {
                            receive_id: target,
                            receive_id_type: "chat_id".to_string(),
                            msg_type: "text".to_string(),
                            content: body_content,
                        })
                        .await
                    }
                };
                match result {
                    Ok(_) => {
                        set_draft.set(String::new());
                        set_reply_to.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(format!("发送失败: {e}"))),
                }
            });
        }
    };

    let api_recall = api.clone();
    let on_recall = move |message_id: String| {
        let api = api_recall.clone();
        spawn_local(async move {
            match api.delete_message(&message_id).await {
                Ok(_) => set_messages.update(|list| {
                    if let Some(log) = list.iter_mut().find(|l| l.message_id == message_id) {
                        log.recalled = true;
                    }
                }),
                Err(e) => set_error_msg.set(Some(format!("撤回失败: {e}"))),
            }
        });
    };

    let api_images = api.clone();
    let has_selection = selected.is_some();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-7xl mx-auto">
                <NavBar />

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error mb-4">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
                    // 会话侧栏
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body p-4">
                            <h3 class="card-title text-base">"最近会话"</h3>
                            <ul class="menu p-0">
                                <For
                                    each=move || conversations.get()
                                    key=|c| c.chat_id.clone()
                                    children=move |conv: Conversation| {
                                        let target = conv.chat_id.clone();
                                        let title = if conv.sender_name.is_empty() {
                                            conv.chat_id.clone()
                                        } else {
                                            conv.sender_name.clone()
                                        };
                                        view! {
                                            <li>
                                                <a on:click=move |_| {
                                                    router
                                                        .navigate_route(AppRoute::ChatWindow {
                                                            chat_id: target.clone(),
                                                        })
                                                }>
                                                    <div class="flex flex-col items-start">
                                                        <span class="font-bold">{title}</span>
                                                        <span class="text-xs opacity-60 truncate max-w-[180px]">
                                                            {conv.last_content.clone()}
                                                        </span>
                                                    </div>
                                                    <span class="badge badge-ghost badge-sm ml-auto">
                                                        {conv.msg_count}
                                                    </span>
                                                </a>
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </div>
                    </div>

                    // 消息窗口
                    <div class="card bg-base-100 shadow-xl md:col-span-2">
                        <div class="card-body p-4 flex flex-col">
                            <Show
                                when=move || has_selection
                                fallback=|| {
                                    view! {
                                        <div class="flex-1 flex items-center justify-center opacity-50">
                                            "从左侧选择一个会话"
                                        </div>
                                    }
                                }
                            >
                                <div class="flex-1 overflow-y-auto space-y-2 max-h-[60vh]">
                                    <For
                                        each=move || messages.get()
                                        key=|m| (m.id, m.recalled)
                                        children={
                                            let on_recall = on_recall.clone();
                                            let api = api_images.clone();
                                            move |log: MessageLog| {
                                                let on_recall = on_recall.clone();
                                                let message_id = log.message_id.clone();
                                                let outgoing = log.direction == Direction::Out;
                                                let bubble = if outgoing {
                                                    "chat chat-end"
                                                } else {
                                                    "chat chat-start"
                                                };
                                                let image = image_key(&log)
                                                    .map(|key| api.image_url(&log.message_id, &key));
                                                let reply_id = log.message_id.clone();
                                                view! {
                                                    <div class=bubble>
                                                        <div class="chat-header text-xs opacity-60">
                                                            {log.sender_name.clone()}
                                                            " · "
                                                            {log.created_at.format("%H:%M:%S").to_string()}
                                                        </div>
                                                        <div
                                                            class="chat-bubble"
                                                            class=("opacity-50", log.recalled)
                                                            on:click=move |_| set_reply_to.set(Some(reply_id.clone()))
                                                        >
                                                            {match image {
                                                                Some(src) => view! {
                                                                    <img class="max-w-[240px] rounded" src=src />
                                                                }
                                                                    .into_any(),
                                                                None => {
                                                                    let text = if log.recalled {
                                                                        "（已撤回）".to_string()
                                                                    } else {
                                                                        content_preview(&log)
                                                                    };
                                                                    view! { <span>{text}</span> }.into_any()
                                                                }
                                                            }}
                                                        </div>
                                                        <Show when=move || outgoing && !log.recalled>
                                                            <div class="chat-footer">
                                                                <button
                                                                    class="btn btn-ghost btn-xs text-error"
                                                                    on:click={
                                                                        let on_recall = on_recall.clone();
                                                                        let message_id = message_id.clone();
                                                                        move |_| on_recall(message_id.clone())
                                                                    }
                                                                >
                                                                    "撤回"
                                                                </button>
                                                            </div>
                                                        </Show>
                                                    </div>
                                                }
                                            }
                                        }
                                    />
                                </div>

                                <form class="flex gap-2 mt-4" on:submit=on_submit.clone()>
                                    <Show when=move || reply_to.get().is_some()>
                                        <button
                                            type="button"
                                            class="btn btn-ghost btn-sm"
                                            on:click=move |_| set_reply_to.set(None)
                                        >
                                            "回复中 ✕"
                                        </button>
                                    </Show>
                                    <input
                                        type="text"
                                        class="input input-bordered flex-1"
                                        placeholder="输入消息..."
                                        prop:value=draft
                                        on:input=move |ev| set_draft.set(event_target_value(&ev))
                                    />
                                    <button class="btn btn-primary">"发送"</button>
                                </form>
                            </Show>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
