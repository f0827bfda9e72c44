//! Telegram Bot API adapter. Implements ChatGateway over HTTPS with reqwest.
//!
//! 429 answers are retried after the server's `retry_after`; 5xx and
//! transport failures with exponential backoff (see `shared::retry`).

use super::mapper::{self, ApiResponse, ApiUpdate};
use crate::domain::{DomainError, Keyboard, UpdateEnvelope};
use crate::ports::ChatGateway;
use crate::shared::retry::{RetryPolicy, retry_with_backoff};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const HTTP_GRACE: Duration = Duration::from_secs(15);

/// Fallback wait when Telegram answers 429 without `retry_after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

const PHOTO_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub struct BotApiGateway {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BotApiGateway {
    /// `api_url` is the Bot API root, e.g. `https://api.telegram.org`.
    pub fn new(api_url: &str, token: &str, poll_timeout_secs: u64) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs) + HTTP_GRACE)
            .build()
            .map_err(|e| DomainError::Gateway(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// One JSON call, retried on transient failures.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, DomainError> {
        let url = self.method_url(method);
        let (client, url) = (&self.client, url.as_str());
        retry_with_backoff(&self.retry, method, move || async move {
            let response = client
                .post(url)
                .json(body)
                .send()
                .await
                .map_err(|e| DomainError::Unavailable(format!("{} request failed: {}", method, e)))?;
            read_response(method, response).await
        })
        .await
    }

    /// Multipart upload of a local file. The form is rebuilt per attempt.
    async fn upload(
        &self,
        method: &str,
        field: &'static str,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), DomainError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::Asset(format!("read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        let url = self.method_url(method);

        retry_with_backoff(&self.retry, method, || {
            let mut form = Form::new()
                .text("chat_id", chat_id.to_string())
                .part(field, Part::bytes(bytes.clone()).file_name(file_name.clone()));
            if let Some(c) = caption {
                form = form.text("caption", c.to_string()).text("parse_mode", "HTML");
            }
            let request = self.client.post(&url).multipart(form);
            async move {
                let response = request
                    .send()
                    .await
                    .map_err(|e| DomainError::Unavailable(format!("{} upload failed: {}", method, e)))?;
                read_response::<Value>(method, response).await.map(|_| ())
            }
        })
        .await
    }
}

async fn read_response<T: DeserializeOwned>(
    method: &str,
    response: reqwest::Response,
) -> Result<T, DomainError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| DomainError::Unavailable(format!("{} read body: {}", method, e)))?;
    decode_response(method, status, &text)
}

/// Turn a Bot API answer into a result, classifying failures for retry.
fn decode_response<T: DeserializeOwned>(
    method: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, DomainError> {
    let parsed: Result<ApiResponse<T>, _> = serde_json::from_str(body);
    let api = match parsed {
        Ok(api) => api,
        Err(_) if status.is_server_error() => {
            return Err(DomainError::Unavailable(format!("{}: HTTP {}", method, status)));
        }
        Err(e) => {
            warn!(method, status = %status, error = %e, "unparseable Bot API response");
            return Err(DomainError::Gateway(format!(
                "{}: HTTP {}: {}",
                method,
                status,
                body.chars().take(200).collect::<String>()
            )));
        }
    };

    if api.ok {
        return api
            .result
            .ok_or_else(|| DomainError::Gateway(format!("{}: ok without result", method)));
    }

    let code = api.error_code.unwrap_or(status.as_u16());
    let description = api.description.unwrap_or_default();
    if code == StatusCode::TOO_MANY_REQUESTS.as_u16() {
        let seconds = api
            .parameters
            .and_then(|p| p.retry_after)
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(DomainError::RateLimited { seconds });
    }
    if code >= 500 {
        return Err(DomainError::Unavailable(format!("{}: {} {}", method, code, description)));
    }
    Err(DomainError::Gateway(format!("{}: {} {}", method, code, description)))
}

fn is_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PHOTO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

#[async_trait::async_trait]
impl ChatGateway for BotApiGateway {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<UpdateEnvelope>, DomainError> {
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        let raw: Vec<Value> = self.call("getUpdates", &body).await?;

        let mut out = Vec::with_capacity(raw.len());
        for value in raw {
            match serde_json::from_value::<ApiUpdate>(value.clone()) {
                Ok(update) => out.push(mapper::update_to_domain(update)),
                Err(e) => {
                    // Still acknowledge it so one bad update cannot stall polling.
                    if let Some(update_id) = value.get("update_id").and_then(Value::as_i64) {
                        warn!(update_id, error = %e, "skipping malformed update");
                        out.push(UpdateEnvelope {
                            update_id,
                            update: None,
                        });
                    }
                }
            }
        }
        if !out.is_empty() {
            debug!(count = out.len(), offset, "updates received");
        }
        Ok(out)
    }

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), DomainError> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        if let Some(k) = keyboard {
            body["reply_markup"] = mapper::keyboard_to_markup(k);
        }
        let _: Value = self.call("sendMessage", &body).await?;
        debug!(chat_id, len = text.len(), "message sent");
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: i64,
        path: &Path,
        caption: Option<&str>,
    ) -> Result<(), DomainError> {
        let (method, field) = if is_photo(path) {
            ("sendPhoto", "photo")
        } else {
            ("sendDocument", "document")
        };
        self.upload(method, field, chat_id, path, caption).await?;
        info!(chat_id, path = %path.display(), method, "file sent");
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        alert: bool,
    ) -> Result<(), DomainError> {
        let mut body = json!({
            "callback_query_id": callback_id,
            "show_alert": alert,
        });
        if let Some(t) = text {
            body["text"] = Value::String(t.to_string());
        }
        let _: Value = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ok() {
        let v: Vec<Value> = decode_response(
            "getUpdates",
            StatusCode::OK,
            r#"{"ok": true, "result": [{"update_id": 1}]}"#,
        )
        .unwrap();
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_decode_rate_limited() {
        let err = decode_response::<Value>(
            "sendMessage",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"ok": false, "error_code": 429, "description": "Too Many Requests",
                "parameters": {"retry_after": 17}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::RateLimited { seconds: 17 }));
    }

    #[test]
    fn test_decode_server_errors_are_transient() {
        let err = decode_response::<Value>("sendMessage", StatusCode::BAD_GATEWAY, "<html>")
            .unwrap_err();
        assert!(err.is_transient());

        let err = decode_response::<Value>(
            "sendMessage",
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"ok": false, "error_code": 500, "description": "Internal"}"#,
        )
        .unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_decode_client_error_is_permanent() {
        let err = decode_response::<Value>(
            "sendMessage",
            StatusCode::BAD_REQUEST,
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#,
        )
        .unwrap_err();
        assert!(!err.is_transient());
        assert!(err.to_string().contains("chat not found"));
    }

    #[test]
    fn test_photo_detection() {
        assert!(is_photo(Path::new("menus/menu_1.jpg")));
        assert!(is_photo(Path::new("menus/MENU.PNG")));
        assert!(!is_photo(Path::new("out/summary.svg")));
        assert!(!is_photo(Path::new("noext")));
    }

    #[test]
    fn test_method_url() {
        let gw = BotApiGateway::new("https://api.telegram.org/", "123:abc", 30).unwrap();
        assert_eq!(
            gw.method_url("getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }
}
