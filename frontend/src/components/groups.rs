use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::protocol::{MemberQuery, PageQuery};
use larkdeck_shared::{ChatGroup, ChatMember};

const PAGE_SIZE: u32 = 10;

#[component]
pub fn GroupsPage() -> impl IntoView {
    let api = use_api();

    let (page, set_page) = signal(1u32);
    let (groups, set_groups) = signal(Vec::<ChatGroup>::new());
    let (total, set_total) = signal(0i64);
    let (syncing, set_syncing) = signal(false);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);
    // 当前展开成员列表的群及其成员
    let (members, set_members) = signal(Option::<(String, Vec<ChatMember>)>::None);

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                let query = PageQuery {
                    page: Some(page.get_untracked()),
                    page_size: Some(PAGE_SIZE),
                };
                match api.chats(&query).await {
                    Ok(result) => {
                        set_groups.set(result.data);
                        set_total.set(result.total);
                    }
                    Err(e) => set_notice.set(Some((format!("加载群聊失败: {e}"), true))),
                }
            });
        }
    };

    // 翻页时重新加载（首次渲染同样触发）
    {
        let load = load.clone();
        Effect::new(move |_| {
            let _ = page.get();
            load();
        });
    }

    let on_sync = {
        let api = api.clone();
        let load = load.clone();
        move |_| {
            let api = api.clone();
            let load = load.clone();
            set_syncing.set(true);
            spawn_local(async move {
                match api.sync_chats().await {
                    Ok(resp) => {
                        set_notice.set(Some((
                            format!("同步完成，共 {} 个群聊", resp.data.len()),
                            false,
                        )));
                        load();
                    }
                    Err(e) => set_notice.set(Some((format!("同步失败: {e}"), true))),
                }
                set_syncing.set(false);
            });
        }
    };

    let api_leave = api.clone();
    let load_after_leave = load.clone();
    let on_leave = move |chat_id: String| {
        let api = api_leave.clone();
        let load = load_after_leave.clone();
        spawn_local(async move {
            match api.leave_chat(&chat_id).await {
                Ok(ack) => {
                    set_notice.set(Some((ack.message, false)));
                    load();
                }
                Err(e) => set_notice.set(Some((format!("退出群聊失败: {e}"), true))),
            }
        });
    };

    let api_members = api.clone();
    let on_members = move |chat_id: String, name: String| {
        let api = api_members.clone();
        spawn_local(async move {
            let query = MemberQuery {
                page_size: Some(20),
                ..Default::default()
            };
            match api.chat_members(&chat_id, &query).await {
                Ok(result) => set_members.set(Some((name, result.data))),
                Err(e) => set_notice.set(Some((format!("加载成员失败: {e}"), true))),
            }
        });
    };

    let page_count = move || {
        let total = total.get();
        ((total + PAGE_SIZE as i64 - 1) / PAGE_SIZE as i64).max(1) as u32
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-7xl mx-auto">
                <NavBar />

                <Show when=move || notice.get().is_some()>
                    <div
                        role="alert"
                        class=move || {
                            if notice.get().map(|(_, err)| err).unwrap_or(false) {
                                "alert alert-error mb-4"
                            } else {
                                "alert alert-success mb-4"
                            }
                        }
                    >
                        <span>{move || notice.get().map(|(msg, _)| msg).unwrap_or_default()}</span>
                    </div>
                </Show>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <div class="flex items-center justify-between">
                            <h3 class="card-title">"群聊管理 (" {total} ")"</h3>
                            <button class="btn btn-primary btn-sm" disabled=syncing on:click=on_sync>
                                <Show when=move || syncing.get() fallback=|| "从平台同步">
                                    <span class="loading loading-spinner loading-sm"></span>
                                    " 同步中..."
                                </Show>
                            </button>
                        </div>

                        <div class="overflow-x-auto">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"名称"</th>
                                        <th class="hidden md:table-cell">"群 ID"</th>
                                        <th>"成员数"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || groups.get()
                                        key=|g| g.chat_id.clone()
                                        children={
                                            let on_leave = on_leave.clone();
                                            let on_members = on_members.clone();
                                            move |group: ChatGroup| {
                                                let leave_id = group.chat_id.clone();
                                                let member_id = group.chat_id.clone();
                                                let member_name = group.name.clone();
                                                let on_leave = on_leave.clone();
                                                let on_members = on_members.clone();
                                                view! {
                                                    <tr>
                                                        <td class="font-bold">{group.name.clone()}</td>
                                                        <td class="hidden md:table-cell font-mono text-xs opacity-50">
                                                            {group.chat_id.clone()}
                                                        </td>
                                                        <td>{group.member_count}</td>
                                                        <td class="flex gap-1 justify-end">
                                                            <button
                                                                class="btn btn-ghost btn-xs"
                                                                on:click=move |_| on_members(
                                                                    member_id.clone(),
                                                                    member_name.clone(),
                                                                )
                                                            >
                                                                "成员"
                                                            </button>
                                                            <button
                                                                class="btn btn-ghost btn-xs text-error"
                                                                on:click=move |_| on_leave(leave_id.clone())
                                                            >
                                                                "退出"
                                                            </button>
                                                        </td>
                                                    </tr>
                                                }
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

                <Show when=move || members.get().is_some()>
                    <div class="card bg-base-100 shadow-xl mt-4">
                        <div class="card-body">
                            <div class="flex items-center justify-between">
                                <h3 class="card-title text-base">
                                    {move || members.get().map(|(name, _)| name).unwrap_or_default()}
                                    " 的成员"
                                </h3>
                                <button
                                    class="btn btn-ghost btn-xs"
                                    on:click=move |_| set_members.set(None)
                                >
                                    "收起"
                                </button>
                            </div>
                            <div class="flex flex-wrap gap-2">
                                <For
                                    each=move || members.get().map(|(_, m)| m).unwrap_or_default()
                                    key=|m| m.member_id.clone()
                                    children=|member: ChatMember| {
                                        view! {
                                            <span class="badge badge-outline">{member.name}</span>
                                        }
                                    }
                                />
                            </div>
                        </div>
                    </div>
                </Show>
            </div>
        </div>
    }
}
