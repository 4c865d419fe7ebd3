use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use crate::api::error::ApiError;
use crate::api::models::{Contact, FollowUpUpdate, Message, MessageKind};
use crate::config::Config;
use crate::timeutil;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Outcome of a send: `delivered` tracks the webhook call only. A failed
/// history write leaves `delivered` true; from the user's side the message
/// went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    pub delivered: bool,
    pub logged: bool,
}

/// Runs `op` up to [`MAX_ATTEMPTS`] times with a fixed pause in between.
/// Only timeouts and transport failures are retried; an HTTP error status
/// comes back immediately.
pub(crate) async fn with_retry<T, F, Fut>(op_name: &str, mut op: F) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                warn!("{op_name}: attempt {attempt} failed ({err}), retrying");
                attempt += 1;
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn status_ok(resp: &reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    webhook_url: String,
    send_timeout: Duration,
}

impl ApiClient {
    pub fn new(cfg: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.backend_url.trim_end_matches('/').to_string(),
            webhook_url: cfg.webhook_url.trim().to_string(),
            send_timeout: Duration::from_secs(cfg.send_timeout_secs),
        })
    }

    /// Contacts, optionally narrowed server-side to open follow-ups. A
    /// failure comes back as an error so the session layer can both degrade
    /// to an empty list and tell the user.
    pub async fn list_contacts(&self, only_follow_up: bool) -> Result<Vec<Contact>, ApiError> {
        let url = format!("{}/contacts", self.base_url);
        let result = with_retry("list_contacts", || {
            let req = self
                .http
                .get(&url)
                .query(&[("only_follow_up", only_follow_up)]);
            async move {
                let resp = req.send().await?;
                status_ok(&resp)?;
                let contacts: Vec<Contact> = resp.json().await?;
                Ok(contacts)
            }
        })
        .await;
        if let Err(err) = &result {
            warn!("list_contacts failed: {err}");
        }
        result
    }

    /// One page of a conversation. The backend does not guarantee order
    /// across pages, so the page is re-sorted chronologically here. An empty
    /// page is a legitimate answer for an offset past the end; a backend
    /// failure is an error, distinct from "no messages".
    pub async fn get_conversation(
        &self,
        phone: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Message>, ApiError> {
        let url = format!("{}/conversation/{}", self.base_url, phone);
        let result = with_retry("get_conversation", || {
            let req = self
                .http
                .get(&url)
                .query(&[("limit", limit), ("offset", offset)]);
            async move {
                let resp = req.send().await?;
                status_ok(&resp)?;
                let messages: Vec<Message> = resp.json().await?;
                Ok(messages)
            }
        })
        .await;
        match result {
            Ok(mut messages) => {
                messages.sort_by_cached_key(|m| timeutil::normalize(&m.timestamp));
                Ok(messages)
            }
            Err(err) => {
                warn!("get_conversation for {phone} failed: {err}");
                Err(err)
            }
        }
    }

    pub async fn delete_conversation(&self, phone: &str) -> bool {
        let url = format!("{}/conversation/{}", self.base_url, phone);
        self.fire("delete_conversation", || self.http.delete(&url))
            .await
    }

    pub async fn delete_message(&self, id: i64) -> bool {
        let url = format!("{}/message/{}", self.base_url, id);
        self.fire("delete_message", || self.http.delete(&url)).await
    }

    pub async fn patch_message(&self, id: i64, update: &FollowUpUpdate) -> bool {
        let url = format!("{}/message/{}", self.base_url, id);
        self.fire("patch_message", || self.http.patch(&url).json(update))
            .await
    }

    pub async fn toggle_automation(&self, phone: &str, enable: bool) -> bool {
        let url = format!("{}/toggle_automation", self.base_url);
        let body = serde_json::json!({ "phone": phone, "automation_enabled": enable });
        self.fire("toggle_automation", || self.http.post(&url).json(&body))
            .await
    }

    /// Whether the automation bot answers this contact. Enabled is the safe
    /// default when the backend cannot be asked.
    pub async fn automation_status(&self, phone: &str) -> bool {
        let url = format!("{}/automation_status/{}", self.base_url, phone);
        let result = with_retry("automation_status", || {
            let req = self.http.get(&url);
            async move {
                let resp = req.send().await?;
                status_ok(&resp)?;
                let body: serde_json::Value = resp.json().await?;
                Ok(body
                    .get("automation_enabled")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true))
            }
        })
        .await;
        result.unwrap_or(true)
    }

    /// Hands the message to the delivery webhook, then records it in the
    /// backend's own store. The second step failing never turns the send
    /// into a failure; it only clears `logged`.
    pub async fn send_message(
        &self,
        phone: &str,
        text: &str,
        kind: MessageKind,
        template_name: Option<&str>,
    ) -> SendOutcome {
        if self.webhook_url.is_empty() {
            warn!("send_message: no webhook url configured");
            return SendOutcome {
                delivered: false,
                logged: false,
            };
        }
        let mut payload = serde_json::json!({
            "phone": phone,
            "message": text,
            "type": kind.as_str(),
            "source": "dashboard",
        });
        if let (MessageKind::Template, Some(name)) = (kind, template_name) {
            payload["template_name"] = serde_json::Value::String(name.to_string());
        }

        let result = with_retry("send_message", || {
            let req = self
                .http
                .post(&self.webhook_url)
                .timeout(self.send_timeout)
                .json(&payload);
            async move {
                let resp = req.send().await?;
                // The webhook acknowledges with 200/201/202 depending on the
                // automation scenario; anything else is a real refusal.
                match resp.status().as_u16() {
                    200 | 201 | 202 => Ok(()),
                    code => Err(ApiError::Status(code)),
                }
            }
        })
        .await;

        match result {
            Ok(()) => {
                debug!("webhook accepted message for {phone}");
                let logged = self.log_outgoing(phone, text, kind).await;
                SendOutcome {
                    delivered: true,
                    logged,
                }
            }
            Err(err) => {
                warn!("send_message to {phone} failed: {err}");
                SendOutcome {
                    delivered: false,
                    logged: false,
                }
            }
        }
    }

    async fn log_outgoing(&self, phone: &str, text: &str, kind: MessageKind) -> bool {
        let url = format!("{}/log_message", self.base_url);
        let body = serde_json::json!({
            "phone": phone,
            "message": text,
            "direction": "outgoing",
            "message_type": kind.as_str(),
            "timestamp": timeutil::now_ist().to_rfc3339(),
            "follow_up_needed": false,
            "notes": "",
            "handled_by": "Dashboard User",
            "source": "dashboard",
        });
        let result = with_retry("log_message", || {
            let req = self.http.post(&url).json(&body);
            async move {
                let resp = req.send().await?;
                status_ok(&resp)
            }
        })
        .await;
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("message sent but not recorded in history: {err}");
                false
            }
        }
    }

    /// Shared shape of the write endpoints that only answer yes or no.
    async fn fire<F>(&self, op_name: &str, build: F) -> bool
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let result = with_retry(op_name, || {
            let req = build();
            async move {
                let resp = req.send().await?;
                status_ok(&resp)
            }
        })
        .await;
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("{op_name} failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::serve;

    fn test_config(backend_url: String, webhook_url: String) -> Config {
        Config {
            backend_url,
            webhook_url,
            ..Config::default()
        }
    }

    fn client_for(backend_url: String, webhook_url: String) -> ApiClient {
        ApiClient::new(&test_config(backend_url, webhook_url)).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn retry_succeeds_on_third_attempt() {
        let mut calls = 0;
        let result = with_retry("op", || {
            calls += 1;
            let outcome = if calls < 3 {
                Err(ApiError::Timeout)
            } else {
                Ok(calls)
            };
            async move { outcome }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_gives_up_after_three_attempts() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry("op", || {
            calls += 1;
            async { Err(ApiError::Timeout) }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Timeout)));
        assert_eq!(calls, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn http_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = with_retry("op", || {
            calls += 1;
            async { Err(ApiError::Status(404)) }
        })
        .await;
        assert!(matches!(result, Err(ApiError::Status(404))));
        assert_eq!(calls, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_contacts_parses_backend_payload() {
        let base = serve(|_, path| {
            assert!(path.starts_with("/contacts"));
            (
                200,
                r#"[{"phone": "919900112233", "client_name": "Jane", "follow_up_open": true}]"#
                    .to_string(),
            )
        })
        .await;
        let client = client_for(base, String::new());
        let contacts = client.list_contacts(true).await.unwrap();
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].display_name(), "Jane");
        assert!(contacts[0].follow_up_open);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_contacts_surfaces_a_server_refusal() {
        let base = serve(|_, _| (500, String::new())).await;
        let client = client_for(base, String::new());
        let result = client.list_contacts(false).await;
        assert!(matches!(result, Err(ApiError::Status(500))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn conversation_page_is_resorted_ascending() {
        let base = serve(|_, path| {
            assert!(path.starts_with("/conversation/919900112233"));
            (
                200,
                r#"[
                    {"id": 2, "phone": "919900112233", "message": "later",
                     "direction": "bot", "timestamp": "2024-01-01T11:00:00"},
                    {"id": 1, "phone": "919900112233", "message": "earlier",
                     "direction": "user", "timestamp": "2024-01-01T10:00:00"}
                ]"#
                .to_string(),
            )
        })
        .await;
        let client = client_for(base, String::new());
        let page = client.get_conversation("919900112233", 20, 0).await.unwrap();
        let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn overrun_offset_yields_empty_page_not_error() {
        let base = serve(|_, _| (200, "[]".to_string())).await;
        let client = client_for(base, String::new());
        let page = client.get_conversation("919900112233", 20, 60).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn send_success_with_failed_logging_is_still_delivered() {
        let backend = serve(|_, path| {
            assert_eq!(path, "/log_message");
            (500, String::new())
        })
        .await;
        let webhook_base = serve(|_, _| (200, String::new())).await;
        let client = client_for(backend, format!("{webhook_base}/hook"));
        let outcome = client
            .send_message("919900112233", "hello", MessageKind::Text, None)
            .await;
        assert_eq!(
            outcome,
            SendOutcome {
                delivered: true,
                logged: false
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn webhook_refusal_is_not_delivered_and_not_logged() {
        let backend = serve(|_, path| {
            // a refused send must never reach the history log
            assert_ne!(path, "/log_message");
            (200, String::new())
        })
        .await;
        let webhook_base = serve(|_, _| (403, String::new())).await;
        let client = client_for(backend, format!("{webhook_base}/hook"));
        let outcome = client
            .send_message("919900112233", "hello", MessageKind::Text, None)
            .await;
        assert_eq!(
            outcome,
            SendOutcome {
                delivered: false,
                logged: false
            }
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn send_without_webhook_url_fails_fast() {
        let client = client_for("http://127.0.0.1:1".to_string(), String::new());
        let outcome = client
            .send_message("919900112233", "hello", MessageKind::Text, None)
            .await;
        assert!(!outcome.delivered);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn automation_status_defaults_to_enabled() {
        let base = serve(|_, _| (500, String::new())).await;
        let client = client_for(base, String::new());
        assert!(client.automation_status("919900112233").await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn patch_and_delete_report_backend_verdict() {
        let base = serve(|method, path| {
            match (method, path) {
                ("PATCH", "/message/7") => (200, String::new()),
                ("DELETE", "/message/7") => (404, String::new()),
                ("DELETE", "/conversation/919900112233") => (200, String::new()),
                _ => (500, String::new()),
            }
        })
        .await;
        let client = client_for(base, String::new());
        let update = FollowUpUpdate {
            follow_up_needed: true,
            notes: Some("call back".into()),
            handled_by: Some("Asha".into()),
        };
        assert!(client.patch_message(7, &update).await);
        assert!(!client.delete_message(7).await);
        assert!(client.delete_conversation("919900112233").await);
    }
}
