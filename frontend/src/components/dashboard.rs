use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::{BotInfo, DashboardStats};

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();

    let (stats, set_stats) = signal(DashboardStats::default());
    let (bot, set_bot) = signal(Option::<BotInfo>::None);
    let (loading, set_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let load_stats = {
        let api = api.clone();
        move || {
            let api = api.clone();
            set_loading.set(true);
            spawn_local(async move {
                match api.dashboard_stats().await {
                    Ok(data) => {
                        set_stats.set(data);
                        set_error_msg.set(None);
                    }
                    Err(e) => set_error_msg.set(Some(format!("加载统计失败: {e}"))),
                }
                set_loading.set(false);
            });
        }
    };

    // 机器人信息只在进入页面时拉一次
    {
        let api = api.clone();
        spawn_local(async move {
            if let Ok(info) = api.bot_info().await {
                set_bot.set(Some(info));
            }
        });
    }

    load_stats();
    let refresh = load_stats.clone();

    let tiles = move || {
        let data = stats.get();
        [
            ("群聊", data.group_count),
            ("今日消息", data.messages_today),
            ("定时任务", data.task_count),
            ("回复规则", data.rule_count),
            ("用户", data.user_count),
        ]
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

                <div class="flex items-center justify-between mb-4">
                    <div class="flex items-center gap-3">
                        <h2 class="text-2xl font-bold">"控制面板"</h2>
                        <Show when=move || bot.get().is_some()>
                            <span class="badge badge-neutral">
                                {move || bot.get().map(|b| b.name).unwrap_or_default()}
                            </span>
                        </Show>
                    </div>
                    <button
                        class="btn btn-ghost btn-sm"
                        disabled=loading
                        on:click=move |_| refresh()
                    >
                        <Show when=move || loading.get() fallback=|| "刷新">
                            <span class="loading loading-spinner loading-sm"></span>
                        </Show>
                    </button>
                </div>

                <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
                    <For
                        each=tiles
                        key=|(label, value)| (*label, *value)
                        children=|(label, value)| {
                            view! {
                                <div class="stat">
                                    <div class="stat-title">{label}</div>
                                    <div class="stat-value text-primary">{value}</div>
                                </div>
                            }
                        }
                    />
                </div>
            </div>
        </div>
    }
}
