use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::protocol::{PageQuery, UpsertAutoReplyRule};
use larkdeck_shared::{AutoReplyRule, MatchMode};

#[component]
pub fn AutoReplyPage() -> impl IntoView {
    let api = use_api();

    let (rules, set_rules) = signal(Vec::<AutoReplyRule>::new());
    let (total, set_total) = signal(0i64);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let (keyword, set_keyword) = signal(String::new());
    let (reply_text, set_reply_text) = signal(String::new());
    let (match_mode, set_match_mode) = signal("contains".to_string());

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                match api.auto_reply_rules(&PageQuery::page(1)).await {
                    Ok(result) => {
                        set_rules.set(result.data);
                        set_total.set(result.total);
                    }
                    Err(e) => set_notice.set(Some((format!("加载规则失败: {e}"), true))),
                }
            });
        }
    };
    load();

    let on_create = {
        let api = api.clone();
        let load = load.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            if keyword.get().is_empty() || reply_text.get().is_empty() {
                set_notice.set(Some(("关键词和回复内容不能为空".to_string(), true)));
                return;
            }
            let mode = match match_mode.get_untracked().as_str() {
                "exact" => MatchMode::Exact,
                "prefix" => MatchMode::Prefix,
                _ => MatchMode::Contains,
            };
            let body = UpsertAutoReplyRule {
                keyword: keyword.get_untracked(),
                reply_text: reply_text.get_untracked(),
                match_mode: Some(mode),
                ..Default::default()
            };
            let api = api.clone();
            let load = load.clone();
            spawn_local(async move {
                match api.create_auto_reply_rule(&body).await {
                    Ok(_) => {
                        set_notice.set(Some(("规则已创建".to_string(), false)));
                        set_keyword.set(String::new());
                        set_reply_text.set(String::new());
                        load();
                    }
                    Err(e) => set_notice.set(Some((format!("创建失败: {e}"), true))),
                }
            });
        }
    };

    let api_toggle = api.clone();
    let load_toggle = load.clone();
    let on_toggle = move |id: u64| {
        let api = api_toggle.clone();
        let load = load_toggle.clone();
        spawn_local(async move {
            match api.toggle_auto_reply_rule(id).await {
                Ok(_) => load(),
                Err(e) => set_notice.set(Some((format!("切换失败: {e}"), true))),
            }
        });
    };

    let api_delete = api.clone();
    let load_delete = load.clone();
    let on_delete = move |id: u64| {
        let api = api_delete.clone();
        let load = load_delete.clone();
        spawn_local(async move {
            match api.delete_auto_reply_rule(id).await {
                Ok(_) => {
                    set_notice.set(Some(("规则已删除".to_string(), false)));
                    load();
                }
                Err(e) => set_notice.set(Some((format!("删除失败: {e}"), true))),
            }
        });
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

                <div class="card bg-base-100 shadow-xl mb-4">
                    <form class="card-body" on:submit=on_create>
                        <h3 class="card-title text-base">"新建自动回复规则"</h3>
                        <div class="flex flex-col md:flex-row gap-2">
                            <input
                                type="text"
                                class="input input-bordered input-sm flex-1"
                                placeholder="关键词"
                                prop:value=keyword
                                on:input=move |ev| set_keyword.set(event_target_value(&ev))
                            />
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_match_mode.set(event_target_value(&ev))
                            >
                                <option value="contains" selected>"包含"</option>
                                <option value="exact">"完全匹配"</option>
                                <option value="prefix">"前缀匹配"</option>
                            </select>
                            <input
                                type="text"
                                class="input input-bordered input-sm flex-[2]"
                                placeholder="回复内容"
                                prop:value=reply_text
                                on:input=move |ev| set_reply_text.set(event_target_value(&ev))
                            />
                            <button class="btn btn-primary btn-sm">"创建"</button>
                        </div>
                    </form>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"自动回复规则 (" {total} ")"</h3>
                        <div class="overflow-x-auto">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"关键词"</th>
                                        <th>"匹配方式"</th>
                                        <th class="hidden md:table-cell">"回复内容"</th>
                                        <th>"状态"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || rules.get()
                                        key=|r| (r.id, r.enabled, r.updated_at)
                                        children={
                                            let on_toggle = on_toggle.clone();
                                            let on_delete = on_delete.clone();
                                            move |rule: AutoReplyRule| {
                                                let on_toggle = on_toggle.clone();
                                                let on_delete = on_delete.clone();
                                                let id = rule.id;
                                                view! {
                                                    <tr>
                                                        <td class="font-bold">{rule.keyword.clone()}</td>
                                                        <td>
                                                            <span class="badge badge-outline">
                                                                {rule.match_mode.as_str()}
                                                            </span>
                                                        </td>
                                                        <td class="hidden md:table-cell truncate max-w-xs">
                                                            {rule.reply_text.clone()}
                                                        </td>
                                                        <td>
                                                            <input
                                                                type="checkbox"
                                                                class="toggle toggle-success toggle-sm"
                                                                prop:checked=rule.enabled
                                                                on:change=move |_| on_toggle(id)
                                                            />
                                                        </td>
                                                        <td class="text-right">
                                                            <button
                                                                class="btn btn-ghost btn-xs text-error"
                                                                on:click=move |_| on_delete(id)
                                                            >
                                                                "删除"
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
                    </div>
                </div>
            </div>
        </div>
    }
}
