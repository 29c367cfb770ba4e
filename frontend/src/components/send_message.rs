use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;

use crate::api::use_api;
use crate::components::nav::NavBar;
use larkdeck_shared::protocol::SendMessageRequest;

/// 按消息类型组装 content 字段（平台要求 JSON 字符串）
fn build_content(msg_type: &str, text: &str, media_key: Option<&str>) -> String {
    match msg_type {
        "image" => serde_json::json!({ "image_key": media_key.unwrap_or_default() }).to_string(),
        "file" => serde_json::json!({ "file_key": media_key.unwrap_or_default() }).to_string(),
        _ => serde_json::json!({ "text": text }).to_string(),
    }
}

#[component]
pub fn SendMessagePage() -> impl IntoView {
    let api = use_api();

    let (receive_id, set_receive_id) = signal(String::new());
    let (receive_id_type, set_receive_id_type) = signal("chat_id".to_string());
    let (msg_type, set_msg_type) = signal("text".to_string());
    let (text, set_text) = signal(String::new());
    let (media_key, set_media_key) = signal(Option::<String>::None);
    let (uploading, set_uploading) = signal(false);
    let (sending, set_sending) = signal(false);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let api_image = api.clone();
    let on_image_pick = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        let api = api_image.clone();
        set_uploading.set(true);
        spawn_local(async move {
            match api.upload_image(&file).await {
                Ok(resp) => {
                    set_msg_type.set("image".to_string());
                    set_media_key.set(Some(resp.image_key));
                    set_notice.set(Some(("图片已上传".to_string(), false)));
                }
                Err(e) => set_notice.set(Some((format!("图片上传失败: {e}"), true))),
            }
            set_uploading.set(false);
        });
    };

    let api_file = api.clone();
    let on_file_pick = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(file) = input.files().and_then(|list| list.get(0)) else {
            return;
        };
        let api = api_file.clone();
        set_uploading.set(true);
        spawn_local(async move {
            // file_type 交给后端按扩展名推断
            match api.upload_file(&file, None).await {
                Ok(resp) => {
                    set_msg_type.set("file".to_string());
                    set_media_key.set(Some(resp.file_key));
                    set_notice.set(Some((format!("文件 {} 已上传", resp.file_name), false)));
                }
                Err(e) => set_notice.set(Some((format!("文件上传失败: {e}"), true))),
            }
            set_uploading.set(false);
        });
    };

    let on_submit = {
        let api = api.clone();
        move |ev: web_sys::SubmitEvent| {
            ev.prevent_default();
            if receive_id.get().is_empty() {
                set_notice.set(Some(("请填写接收方 ID".to_string(), true)));
                return;
            }
            let kind = msg_type.get_untracked();
            let body = SendMessageRequest {
                receive_id: receive_id.get_untracked(),
                receive_id_type: receive_id_type.get_untracked(),
                msg_type: kind.clone(),
                content: build_content(
                    &kind,
                    &text.get_untracked(),
                    media_key.get_untracked().as_deref(),
                ),
            };
            let api = api.clone();
            set_sending.set(true);
            spawn_local(async move {
                match api.send_message(&body).await {
                    Ok(resp) => {
                        set_notice.set(Some((format!("已发送: {}", resp.message_id), false)));
                        set_text.set(String::new());
                        set_media_key.set(None);
                        set_msg_type.set("text".to_string());
                    }
                    Err(e) => set_notice.set(Some((format!("发送失败: {e}"), true))),
                }
                set_sending.set(false);
            });
        }
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-3xl mx-auto">
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
                    <form class="card-body" on:submit=on_submit>
                        <h3 class="card-title">"发送消息"</h3>

                        <div class="flex gap-2">
                            <select
                                class="select select-bordered select-sm"
                                on:change=move |ev| set_receive_id_type.set(event_target_value(&ev))
                            >
                                <option value="chat_id" selected>"群聊 (chat_id)"</option>
                                <option value="open_id">"用户 (open_id)"</option>
                                <option value="user_id">"用户 (user_id)"</option>
                                <option value="email">"邮箱"</option>
                            </select>
                            <input
                                type="text"
                                class="input input-bordered input-sm flex-1 font-mono"
                                placeholder="接收方 ID"
                                prop:value=receive_id
                                on:input=move |ev| set_receive_id.set(event_target_value(&ev))
                            />
                        </div>

                        <textarea
                            class="textarea textarea-bordered w-full"
                            rows="4"
                            placeholder="消息内容（文本消息）"
                            prop:value=text
                            on:input=move |ev| set_text.set(event_target_value(&ev))
                        ></textarea>

                        <div class="flex flex-col md:flex-row gap-2 items-start">
                            <label class="form-control">
                                <span class="label-text text-xs">"发送图片"</span>
                                <input
                                    type="file"
                                    accept="image/*"
                                    class="file-input file-input-bordered file-input-sm"
                                    on:change=on_image_pick
                                />
                            </label>
                            <label class="form-control">
                                <span class="label-text text-xs">"发送文件"</span>
                                <input
                                    type="file"
                                    class="file-input file-input-bordered file-input-sm"
                                    on:change=on_file_pick
                                />
                            </label>
                            <Show when=move || media_key.get().is_some()>
                                <span class="badge badge-info mt-6 font-mono text-xs">
                                    {move || media_key.get().unwrap_or_default()}
                                </span>
                            </Show>
                        </div>

                        <div class="card-actions justify-end">
                            <button
                                class="btn btn-primary"
                                disabled=move || sending.get() || uploading.get()
                            >
                                <Show when=move || sending.get() fallback=|| "发送">
                                    <span class="loading loading-spinner loading-sm"></span>
                                    " 发送中..."
                                </Show>
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::build_content;

    #[test]
    fn content_shape_follows_msg_type() {
        assert_eq!(build_content("text", "你好", None), r#"{"text":"你好"}"#);
        assert_eq!(
            build_content("image", "", Some("img_v2_abc")),
            r#"{"image_key":"img_v2_abc"}"#
        );
        assert_eq!(
            build_content("file", "", Some("file_v3_x")),
            r#"{"file_key":"file_v3_x"}"#
        );
    }
}
