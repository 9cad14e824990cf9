use serde::Serialize;
use std::time::Duration;

use super::{RemoteError, RemoteResult, truncate_body};
use crate::http::HttpClient;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Pushes free-text messages through the Telegram bot API.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: HttpClient,
    token: String,
    base_url: String,
    default_chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub status: &'static str,
    pub chat_id: String,
}

impl TelegramNotifier {
    pub fn new(
        http: HttpClient,
        token: Option<String>,
        base_url: String,
        default_chat_id: String,
    ) -> RemoteResult<Self> {
        let token = token
            .filter(|v| !v.trim().is_empty())
            .ok_or(RemoteError::MissingCredential("TELEGRAM_TOKEN"))?;

        Ok(Self {
            http,
            token,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_chat_id,
        })
    }

    /// Sends `message` to `chat_id`, falling back to the configured default
    /// destination when none is given.
    pub async fn send(&self, message: &str, chat_id: Option<&str>) -> RemoteResult<Delivery> {
        let chat_id = chat_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(self.default_chat_id.as_str())
            .to_string();

        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let response = self
            .http
            .post_form(
                &url,
                &[("chat_id", chat_id.as_str()), ("text", message)],
                SEND_TIMEOUT,
            )
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        if response.status != 200 {
            return Err(RemoteError::HttpStatus {
                status: response.status,
                body: truncate_body(response.body),
            });
        }

        Ok(Delivery {
            status: "sent",
            chat_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TelegramNotifier;
    use crate::http::{HttpClient, HttpDebugConfig};
    use crate::remote::RemoteError;
    use reqwest::Client;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http() -> HttpClient {
        HttpClient::new(Client::new(), HttpDebugConfig::disabled())
    }

    fn notifier(base_url: String) -> TelegramNotifier {
        TelegramNotifier::new(
            http(),
            Some("123:abc".to_string()),
            base_url,
            "999".to_string(),
        )
        .expect("notifier")
    }

    #[tokio::test]
    async fn send_posts_form_fields_to_the_bot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(body_string_contains("chat_id=42"))
            .and(body_string_contains("text=nuevo+record"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let delivery = notifier(server.uri())
            .send("nuevo record", Some("42"))
            .await
            .expect("send");

        assert_eq!(delivery.status, "sent");
        assert_eq!(delivery.chat_id, "42");
    }

    #[tokio::test]
    async fn send_falls_back_to_default_chat_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("chat_id=999"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let delivery = notifier(server.uri())
            .send("hola", None)
            .await
            .expect("send");
        assert_eq!(delivery.chat_id, "999");

        let delivery = notifier(server.uri())
            .send("hola", Some("  "))
            .await
            .expect("blank chat id also falls back");
        assert_eq!(delivery.chat_id, "999");
    }

    #[tokio::test]
    async fn send_maps_http_error_status_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized bot"))
            .mount(&server)
            .await;

        let err = notifier(server.uri())
            .send("hola", None)
            .await
            .expect_err("should fail");

        match err {
            RemoteError::HttpStatus { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized bot"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn new_requires_token() {
        let err = TelegramNotifier::new(
            http(),
            None,
            "https://api.telegram.org".to_string(),
            "999".to_string(),
        )
        .expect_err("missing token should fail");
        assert_eq!(err, RemoteError::MissingCredential("TELEGRAM_TOKEN"));
    }
}
