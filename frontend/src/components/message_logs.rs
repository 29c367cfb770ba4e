use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::protocol::MessageLogQuery;
use larkdeck_shared::{ChatType, Direction, MessageLog, MessageSource};

const PAGE_SIZE: u32 = 20;

fn parse_chat_type(value: &str) -> Option<ChatType> {
    match value {
        "p2p" => Some(ChatType::P2p),
        "group" => Some(ChatType::Group),
        _ => None,
    }
}

fn parse_direction(value: &str) -> Option<Direction> {
    match value {
        "in" => Some(Direction::In),
        "out" => Some(Direction::Out),
        _ => None,
    }
}

fn parse_source(value: &str) -> Option<MessageSource> {
    match value {
        "event" => Some(MessageSource::Event),
        "scheduled" => Some(MessageSource::Scheduled),
        "manual" => Some(MessageSource::Manual),
        _ => None,
    }
}

#[component]
pub fn MessageLogsPage() -> impl IntoView {
    let api = use_api();

    let (page, set_page) = signal(1u32);
    let (logs, set_logs) = signal(Vec::<MessageLog>::new());
    let (total, set_total) = signal(0i64);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    // 筛选条件（字符串形式保存，查询时解析）
    let (chat_id, set_chat_id) = signal(String::new());
    let (chat_type, set_chat_type) = signal(String::new());
    let (direction, set_direction) = signal(String::new());
    let (source, set_source) = signal(String::new());

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                let chat_id = chat_id.get_untracked();
                let query = MessageLogQuery {
                    page: Some(page.get_untracked()),
                    page_size: Some(PAGE_SIZE),
                    chat_id: (!chat_id.is_empty()).then_some(chat_id),
                    chat_type: parse_chat_type(&chat_type.get_untracked()),
                    direction: parse_direction(&direction.get_untracked()),
                    source: parse_source(&source.get_untracked()),
                };
                match api.message_logs(&query).await {
                    Ok(result) => {
                        set_logs.set(result.data);
                        set_total.set(result.total);
                        set_error_msg.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(format!("加载消息记录失败: {e}"))),
                }
            });
        }
    };

    // 翻页或筛选变化时重新加载
    {
        let load = load.clone();
        Effect::new(move |_| {
            let _ = page.get();
            let _ = chat_type.get();
            let _ = direction.get();
            let _ = source.get();
            load();
        });
    }

    // 回到第一页；信号变化会触发上面的加载 Effect
    let apply_filter = move |_| set_page.set(1);

    let page_count = move || {
        ((total.get() + PAGE_SIZE as i64 - 1) / PAGE_SIZE as i64).max(1) as u32
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-7xl mx-auto">
                <NavBar />

                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error mb-4">
                        <span>{move || error_msg.get().unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex flex-col md:flex-row gap-2 items-end">
                            <h3 class="card-title flex-1">"消息记录 (" {total} ")"</h3>
                            <input
                                type="text"
                                class="input input-bordered input-sm font-mono"
                                placeholder="按会话 ID 过滤"
                                prop:value=chat_id
                                on:input=move |ev| set_chat_id.set(event_target_value(&ev))
                            />
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_chat_type.set(event_target_value(&ev))
                            >
                                <option value="" selected>"全部类型"</option>
                                <option value="p2p">"单聊"</option>
                                <option value="group">"群聊"</option>
                            </select>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_direction.set(event_target_value(&ev))
                            >
                                <option value="" selected>"收发方向"</option>
                                <option value="in">"收到"</option>
                                <option value="out">"发出"</option>
                            </select>
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_source.set(event_target_value(&ev))
                            >
                                <option value="" selected>"全部来源"</option>
                                <option value="event">"事件"</option>
                                <option value="scheduled">"定时"</option>
                                <option value="manual">"手动"</option>
                            </select>
                            <button class="btn btn-sm" on:click=apply_filter>"查询"</button>
                        </div>

                        <div class="overflow-x-auto">
                            <table class="table table-zebra table-sm w-full">
                                <thead>
                                    <tr>
                                        <th>"时间"</th>
                                        <th>"方向"</th>
                                        <th>"发送者"</th>
                                        <th class="hidden md:table-cell">"类型"</th>
                                        <th>"内容"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || logs.get()
                                        key=|log| log.id
                                        children=|log: MessageLog| {
                                            let badge = match log.direction {
                                                Direction::In => "badge badge-info badge-sm",
                                                Direction::Out => "badge badge-success badge-sm",
                                            };
                                            view! {
                                                <tr>
                                                    <td class="text-xs opacity-70 whitespace-nowrap">
                                                        {log.created_at.format("%m-%d %H:%M:%S").to_string()}
                                                    </td>
                                                    <td>
                                                        <span class=badge>{log.direction.as_str()}</span>
                                                    </td>
                                                    <td>{log.sender_name.clone()}</td>
                                                    <td class="hidden md:table-cell">
                                                        <span class="badge badge-outline badge-sm">
                                                            {log.msg_type.clone()}
                                                        </span>
                                                    </td>
                                                    <td class="truncate max-w-md text-sm">
                                                        {log.content.clone()}
                                                    </td>
                                                </tr>
                                            }
                                        }
                                    />
                                </tbody>
                            </table>
                        </div>

                        <div class="join justify-center mt-2">
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || page.get() <= 1
                                on:click=move |_| set_page.update(|p| *p -= 1)
                            >
                                "«"
                            </button>
                            <button class="join-item btn btn-sm">
                                {move || format!("{} / {}", page.get(), page_count())}
                            </button>
                            <button
                                class="join-item btn btn-sm"
                                disabled=move || page.get() >= page_count()
                                on:click=move |_| set_page.update(|p| *p += 1)
                            >
                                "»"
                            </button>
                        </div>
                    </div>
                </div>
            </div>
        </div>
    }
}
