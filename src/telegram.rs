use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use serde::Deserialize;

use crate::{
    BotConfig, DENIED_TEXT, DownloadOutcome, INVALID_URL_TEXT, LibraryPath, PROMPT_TEXT,
    ParseError, WELCOME_TEXT, auth_mode_text, env_optional, fault_text, outcome_text,
    parse_request, probe_dependencies, progress_text, run_download, status_text,
};

const NO_TIMEOUT_MS: u64 = u64::MAX;
const POLL_ERROR_BACKOFF_SECS: u64 = 2;
const MESSAGE_CHUNK_CHARS: usize = 3900;

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramUpdateResponse {
    pub(crate) ok: bool,
    #[serde(default)]
    pub(crate) result: Vec<TelegramUpdate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramUpdate {
    pub(crate) update_id: i64,
    #[serde(default)]
    pub(crate) message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramMessage {
    pub(crate) chat: TelegramChat,
    #[serde(default)]
    pub(crate) from: Option<TelegramUser>,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramChat {
    pub(crate) id: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelegramUser {
    pub(crate) id: i64,
}

pub(crate) fn split_text_chunks(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![text.to_string()];
    }
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0usize;
    for ch in text.chars() {
        if count >= max_chars {
            chunks.push(current);
            current = String::new();
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

pub(crate) fn telegram_send_message(
    agent: &ureq::Agent,
    base_url: &str,
    chat_id: i64,
    text: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let url = format!("{base_url}/sendMessage");
    for chunk in split_text_chunks(text, MESSAGE_CHUNK_CHARS) {
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": chunk
        });
        agent
            .post(&url)
            .set("content-type", "application/json")
            .send_json(payload)
            .map_err(|err| format!("Telegram send error: {err}"))?;
    }
    Ok(())
}

pub(crate) fn telegram_send_typing(agent: &ureq::Agent, base_url: &str, chat_id: i64) {
    let url = format!("{base_url}/sendChatAction");
    let payload = serde_json::json!({
        "chat_id": chat_id,
        "action": "typing"
    });
    let _ = agent
        .post(&url)
        .set("content-type", "application/json")
        .send_json(payload);
}

fn reply(agent: &ureq::Agent, base_url: &str, chat_id: i64, text: &str) {
    if let Err(err) = telegram_send_message(agent, base_url, chat_id, text) {
        error!("telegram send failed: {err}");
    }
}

/// Long-poll getUpdates and dispatch messages. `/start` and `/status` are
/// answered inline; each download request gets its own worker thread, so
/// nothing serializes concurrent downloads.
pub(crate) fn run_telegram_bridge(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = match env_optional("TELEGRAM_API_BASE") {
        Some(base) => format!("{base}/bot{}", config.token),
        None => format!("https://api.telegram.org/bot{}", config.token),
    };
    let http_agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_millis(NO_TIMEOUT_MS))
        .timeout_write(Duration::from_millis(NO_TIMEOUT_MS))
        .timeout_read(Duration::from_millis(NO_TIMEOUT_MS))
        .build();
    let config = Arc::new(config);
    let mut offset: Option<i64> = None;

    loop {
        let mut request = http_agent
            .get(&format!("{base_url}/getUpdates"))
            .query("limit", &config.poll_limit.to_string())
            .query("timeout", &config.poll_timeout.to_string());
        if let Some(last) = offset {
            request = request.query("offset", &(last + 1).to_string());
        }

        let payload = match request.call() {
            Ok(resp) => resp.into_json::<TelegramUpdateResponse>(),
            Err(err) => {
                error!("telegram poll error: {err}");
                thread::sleep(Duration::from_secs(POLL_ERROR_BACKOFF_SECS));
                continue;
            }
        };
        let update = match payload {
            Ok(update) => update,
            Err(err) => {
                error!("telegram decode error: {err}");
                thread::sleep(Duration::from_secs(POLL_ERROR_BACKOFF_SECS));
                continue;
            }
        };
        if !update.ok {
            error!("telegram API returned ok=false");
            thread::sleep(Duration::from_secs(POLL_ERROR_BACKOFF_SECS));
            continue;
        }

        for entry in update.result {
            offset = Some(entry.update_id);
            let Some(msg) = entry.message else { continue };
            let chat_id = msg.chat.id;
            let Some(text) = msg.text else { continue };
            let trimmed = text.trim();

            // Only /start and /status are registered commands; anything
            // else starting with a slash has no handler.
            if trimmed.starts_with('/') && trimmed != "/start" && trimmed != "/status" {
                continue;
            }

            let sender = msg.from.as_ref().map(|user| user.id);
            let allowed = sender.is_some_and(|id| config.allow_list.is_allowed(id));
            if !allowed {
                match sender {
                    Some(id) => warn!("unauthorized access attempt from user {id}"),
                    None => warn!("unauthorized access attempt without a sender id"),
                }
                reply(&http_agent, &base_url, chat_id, DENIED_TEXT);
                continue;
            }

            match trimmed {
                "/start" => reply(&http_agent, &base_url, chat_id, WELCOME_TEXT),
                "/status" => {
                    let report = probe_dependencies(&config.cookies_file);
                    reply(&http_agent, &base_url, chat_id, &status_text(&report));
                }
                _ => spawn_download_worker(
                    config.clone(),
                    http_agent.clone(),
                    base_url.clone(),
                    chat_id,
                    text,
                ),
            }
        }
    }
}

fn spawn_download_worker(
    config: Arc<BotConfig>,
    agent: ureq::Agent,
    base_url: String,
    chat_id: i64,
    text: String,
) {
    thread::spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            handle_download(&config, &agent, &base_url, chat_id, &text);
        }));
        // A panic is reported like any other bot error; the poll loop and
        // the other workers keep running.
        if let Err(panic_info) = result {
            let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "handler panicked".to_string()
            };
            error!("bot error: {message}");
            reply(&agent, &base_url, chat_id, &fault_text(&message));
        }
    });
}

fn handle_download(
    config: &BotConfig,
    agent: &ureq::Agent,
    base_url: &str,
    chat_id: i64,
    text: &str,
) {
    let request = match parse_request(text) {
        Ok(request) => request,
        Err(ParseError::Empty) => {
            warn!("empty download request from chat {chat_id}");
            reply(agent, base_url, chat_id, PROMPT_TEXT);
            return;
        }
        Err(ParseError::InvalidUrl) => {
            warn!("rejected download request without a recognized url from chat {chat_id}");
            reply(agent, base_url, chat_id, INVALID_URL_TEXT);
            return;
        }
    };

    let target = LibraryPath::for_request(&config.media_root, &request);
    if let Err(err) = target.ensure_directory() {
        error!("media directory {}: {err}", target.directory.display());
        reply(agent, base_url, chat_id, &fault_text(&err.to_string()));
        return;
    }

    telegram_send_typing(agent, base_url, chat_id);
    reply(agent, base_url, chat_id, &progress_text(&request, &target));

    let cookies_present = config.cookies_file.exists();
    reply(agent, base_url, chat_id, auth_mode_text(cookies_present));
    let cookies = cookies_present.then(|| config.cookies_file.as_path());

    let outcome = run_download(&request, &target, cookies);
    match &outcome {
        DownloadOutcome::Completed { .. } => {
            info!(
                "download completed: {} - {} - {}",
                request.artist, request.title, request.category
            );
        }
        DownloadOutcome::ToolFailure(diagnostic) => error!("download failed: {diagnostic}"),
        DownloadOutcome::TimedOut => error!("download timed out: {}", request.source_url),
        DownloadOutcome::Fault(message) => error!("bot error: {message}"),
    }
    reply(agent, base_url, chat_id, &outcome_text(&request, &outcome));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_preserve_every_character() {
        let text = "a".repeat(MESSAGE_CHUNK_CHARS * 2 + 17);
        let chunks = split_text_chunks(&text, MESSAGE_CHUNK_CHARS);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.iter().map(String::len).sum::<usize>(), text.len());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        assert_eq!(split_text_chunks("hello", 3900), vec!["hello".to_string()]);
    }

    #[test]
    fn empty_text_still_yields_one_chunk() {
        assert_eq!(split_text_chunks("", 3900), vec![String::new()]);
    }

    #[test]
    fn zero_limit_disables_chunking() {
        let text = "x".repeat(10_000);
        assert_eq!(split_text_chunks(&text, 0), vec![text.clone()]);
    }

    #[test]
    fn decodes_a_get_updates_payload() {
        let raw = r#"{
            "ok": true,
            "result": [{
                "update_id": 42,
                "message": {
                    "message_id": 7,
                    "chat": {"id": 100},
                    "from": {"id": 123456, "is_bot": false},
                    "text": "https://youtu.be/abc Queen"
                }
            }]
        }"#;
        let decoded: TelegramUpdateResponse = serde_json::from_str(raw).unwrap();
        assert!(decoded.ok);
        assert_eq!(decoded.result.len(), 1);
        let update = &decoded.result[0];
        assert_eq!(update.update_id, 42);
        let msg = update.message.as_ref().unwrap();
        assert_eq!(msg.chat.id, 100);
        assert_eq!(msg.from.as_ref().unwrap().id, 123456);
        assert_eq!(msg.text.as_deref(), Some("https://youtu.be/abc Queen"));
    }

    #[test]
    fn decodes_updates_without_messages() {
        let raw = r#"{"ok": true, "result": [{"update_id": 43}]}"#;
        let decoded: TelegramUpdateResponse = serde_json::from_str(raw).unwrap();
        assert!(decoded.result[0].message.is_none());
    }
}
