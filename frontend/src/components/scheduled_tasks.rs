use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::ScheduledTask;
use larkdeck_shared::protocol::{PageQuery, UpsertScheduledTask};

#[component]
pub fn ScheduledTasksPage() -> impl IntoView {
    let api = use_api();

    let (tasks, set_tasks) = signal(Vec::<ScheduledTask>::new());
    let (total, set_total) = signal(0i64);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let (name, set_name) = signal(String::new());
    let (cron_expr, set_cron_expr) = signal(String::new());
    let (chat_id, set_chat_id) = signal(String::new());
    let (content, set_content) = signal(String::new());

    let load = {
        let api = api.clone();
        move || {
            let api = api.clone();
            spawn_local(async move {
                match api.scheduled_tasks(&PageQuery::page(1)).await {
                    Ok(result) => {
                        set_tasks.set(result.data);
                        set_total.set(result.total);
                    }
                    Err(e) => set_notice.set(Some((format!("加载任务失败: {e}"), true))),
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
            if name.get().is_empty()
                || cron_expr.get().is_empty()
                || chat_id.get().is_empty()
                || content.get().is_empty()
            {
                set_notice.set(Some(("请完整填写任务信息".to_string(), true)));
                return;
            }
            let body = UpsertScheduledTask {
                name: name.get_untracked(),
                cron_expr: cron_expr.get_untracked(),
                chat_id: chat_id.get_untracked(),
                content: content.get_untracked(),
                ..Default::default()
            };
            let api = api.clone();
            let load = load.clone();
            spawn_local(async move {
                match api.create_scheduled_task(&body).await {
                    Ok(_) => {
                        set_notice.set(Some(("任务已创建".to_string(), false)));
                        set_name.set(String::new());
                        set_cron_expr.set(String::new());
                        set_content.set(String::new());
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
            match api.toggle_scheduled_task(id).await {
                Ok(_) => load(),
                Err(e) => set_notice.set(Some((format!("切换失败: {e}"), true))),
            }
        });
    };

    let api_run = api.clone();
    let load_run = load.clone();
    let on_run = move |id: u64| {
        let api = api_run.clone();
        let load = load_run.clone();
        spawn_local(async move {
            match api.run_scheduled_task(id).await {
                Ok(ack) => {
                    set_notice.set(Some((ack.message, false)));
                    load();
                }
                Err(e) => set_notice.set(Some((format!("执行失败: {e}"), true))),
            }
        });
    };

    let api_delete = api.clone();
    let load_delete = load.clone();
    let on_delete = move |id: u64| {
        let api = api_delete.clone();
        let load = load_delete.clone();
        spawn_local(async move {
            match api.delete_scheduled_task(id).await {
                Ok(_) => {
                    set_notice.set(Some(("任务已删除".to_string(), false)));
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
                        <h3 class="card-title text-base">"新建定时任务"</h3>
                        <div class="grid grid-cols-1 md:grid-cols-2 gap-2">
                            <input
                                type="text"
                                class="input input-bordered input-sm"
                                placeholder="任务名称"
                                prop:value=name
                                on:input=move |ev| set_name.set(event_target_value(&ev))
                            />
                            <input
                                type="text"
                                class="input input-bordered input-sm font-mono"
                                placeholder="Cron 表达式，如 0 9 * * 1-5"
                                prop:value=cron_expr
                                on:input=move |ev| set_cron_expr.set(event_target_value(&ev))
                            />
                            <input
                                type="text"
                                class="input input-bordered input-sm font-mono"
                                placeholder="目标群 ID (oc_...)"
                                prop:value=chat_id
                                on:input=move |ev| set_chat_id.set(event_target_value(&ev))
                            />
                            <input
                                type="text"
                                class="input input-bordered input-sm"
                                placeholder="消息内容"
                                prop:value=content
                                on:input=move |ev| set_content.set(event_target_value(&ev))
                            />
                        </div>
                        <div class="card-actions justify-end">
                            <button class="btn btn-primary btn-sm">"创建"</button>
                        </div>
                    </form>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"定时任务 (" {total} ")"</h3>
                        <div class="overflow-x-auto">
                            <table class="table table-zebra w-full">
                                <thead>
                                    <tr>
                                        <th>"名称"</th>
                                        <th class="font-mono">"Cron"</th>
                                        <th class="hidden md:table-cell">"下次执行"</th>
                                        <th>"状态"</th>
                                        <th></th>
                                    </tr>
                                </thead>
                                <tbody>
                                    <For
                                        each=move || tasks.get()
                                        key=|t| (t.id, t.enabled, t.updated_at)
                                        children={
                                            let on_toggle = on_toggle.clone();
                                            let on_run = on_run.clone();
                                            let on_delete = on_delete.clone();
                                            move |task: ScheduledTask| {
                                                let on_toggle = on_toggle.clone();
                                                let on_run = on_run.clone();
                                                let on_delete = on_delete.clone();
                                                let id = task.id;
                                                let next_run = task
                                                    .next_run_at
                                                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                                                    .unwrap_or_else(|| "-".to_string());
                                                view! {
                                                    <tr>
                                                        <td class="font-bold">{task.name.clone()}</td>
                                                        <td class="font-mono text-xs">{task.cron_expr.clone()}</td>
                                                        <td class="hidden md:table-cell text-xs opacity-70">
                                                            {next_run}
                                                        </td>
                                                        <td>
                                                            <input
                                                                type="checkbox"
                                                                class="toggle toggle-success toggle-sm"
                                                                prop:checked=task.enabled
                                                                on:change=move |_| on_toggle(id)
                                                            />
                                                        </td>
                                                        <td class="flex gap-1 justify-end">
                                                            <button
                                                                class="btn btn-ghost btn-xs"
                                                                on:click=move |_| on_run(id)
                                                            >
                                                                "立即执行"
                                                            </button>
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
