//! Twilio REST client wrapper

use std::time::Duration;

use callguard::{DeliveryError, DomainError};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::TwilioConfig;

/// Message resource returned by `POST /Accounts/{sid}/Messages.json`
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResource {
    pub sid: String,
    pub status: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
}

/// Error body returned on 4xx/5xx
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<i64>,
    message: Option<String>,
}

/// Twilio API client
pub struct TwilioClient {
    http: Client,
    config: TwilioConfig,
}

impl TwilioClient {
    /// Create a new Twilio client
    pub fn new(config: &TwilioConfig) -> Result<Self, DomainError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::http_client("twilio", e))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &TwilioConfig {
        &self.config
    }

    /// Messages endpoint for the configured account
    pub fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.base_url, self.config.account_sid
        )
    }

    /// Create (send) a message
    pub async fn create_message(
        &self,
        from: &str,
        to: &str,
        body: &str,
    ) -> Result<MessageResource, DeliveryError> {
        debug!(to = %to, body_len = %body.len(), "Sending message via Twilio");

        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await
            .map_err(|e| map_transport_error(&e, self.config.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| map_transport_error(&e, self.config.timeout))?;

        if !status.is_success() {
            let err = map_http_error(status, &text);
            error!(status = %status, error = %err, "Twilio rejected message");
            return Err(err);
        }

        parse_message(&text)
    }
}

pub(crate) fn map_transport_error(err: &reqwest::Error, timeout: Duration) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::timeout(timeout)
    } else {
        DeliveryError::Transport {
            message: err.to_string(),
        }
    }
}

pub(crate) fn map_http_error(status: StatusCode, body: &str) -> DeliveryError {
    let parsed = serde_json::from_str::<ApiErrorBody>(body).ok();
    let code = parsed.as_ref().and_then(|b| b.code);
    let message = parsed
        .and_then(|b| b.message)
        .unwrap_or_else(|| match body.trim() {
            "" => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
            trimmed => trimmed.to_string(),
        });

    DeliveryError::Rejected {
        status: status.as_u16(),
        code,
        message,
    }
}

pub(crate) fn parse_message(body: &str) -> Result<MessageResource, DeliveryError> {
    let resource: MessageResource =
        serde_json::from_str(body).map_err(|e| DeliveryError::InvalidResponse {
            message: format!("Invalid message resource: {}", e),
        })?;

    if resource.sid.trim().is_empty() {
        return Err(DeliveryError::InvalidResponse {
            message: "Message resource has no sid".to_string(),
        });
    }

    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Accept connections and hold them open without ever answering
    async fn silent_server() -> (String, JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        (format!("http://{}", addr), handle)
    }

    /// Answer one request with a canned JSON body; the task yields the raw request
    async fn canned_server(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (format!("http://{}", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_messages_url() {
        let config = TwilioConfig::new("AC123", "secret", "+15005550006")
            .with_base_url("http://localhost:4010/2010-04-01/");
        let client = TwilioClient::new(&config).unwrap();
        assert_eq!(
            client.messages_url(),
            "http://localhost:4010/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn test_parse_message() {
        let body = r#"{
            "sid": "SM1234567890abcdef1234567890abcdef",
            "status": "queued",
            "to": "+923075861200",
            "error_code": null,
            "error_message": null
        }"#;
        let resource = parse_message(body).unwrap();
        assert_eq!(resource.sid, "SM1234567890abcdef1234567890abcdef");
        assert_eq!(resource.status.as_deref(), Some("queued"));
    }

    #[test]
    fn test_parse_message_without_sid() {
        assert!(matches!(
            parse_message(r#"{"sid": ""}"#),
            Err(DeliveryError::InvalidResponse { .. })
        ));
        assert!(matches!(
            parse_message("not json"),
            Err(DeliveryError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_map_http_error_reads_twilio_body() {
        let body = r#"{"code": 21211, "message": "The 'To' number +1 is not a valid phone number.", "status": 400}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err,
            DeliveryError::Rejected {
                status: 400,
                code: Some(21211),
                message: "The 'To' number +1 is not a valid phone number.".to_string(),
            }
        );
    }

    #[test]
    fn test_map_http_error_without_body() {
        let err = map_http_error(StatusCode::UNAUTHORIZED, "");
        assert_eq!(
            err,
            DeliveryError::Rejected {
                status: 401,
                code: None,
                message: "Unauthorized".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_message_times_out_as_timeout() {
        let (base_url, server) = silent_server().await;
        let config = TwilioConfig::new("AC123", "secret", "+15005550006")
            .with_base_url(base_url)
            .with_timeout(Duration::from_secs(1));
        let client = TwilioClient::new(&config).unwrap();

        let err = client
            .create_message("+15005550006", "+923075861200", "Hi")
            .await
            .unwrap_err();
        assert_eq!(err, DeliveryError::Timeout { secs: 1 });

        server.abort();
    }

    #[tokio::test]
    async fn test_create_message_posts_form_with_basic_auth() {
        let (base_url, server) = canned_server(
            "201 Created",
            r#"{"sid": "SM0123456789abcdef0123456789abcdef", "status": "queued"}"#,
        )
        .await;
        let config = TwilioConfig::new("AC123", "secret", "+15005550006")
            .with_base_url(format!("{}/2010-04-01", base_url));
        let client = TwilioClient::new(&config).unwrap();

        let resource = client
            .create_message("+15005550006", "+923075861200", "Hi there")
            .await
            .unwrap();
        assert_eq!(resource.sid, "SM0123456789abcdef0123456789abcdef");
        assert_eq!(resource.status.as_deref(), Some("queued"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /2010-04-01/Accounts/AC123/Messages.json "));
        assert!(request.to_lowercase().contains("authorization: basic "));
        assert!(request.contains("To=%2B923075861200"));
        assert!(request.contains("From=%2B15005550006"));
        assert!(request.contains("Body=Hi+there"));
    }

    #[tokio::test]
    async fn test_create_message_rejected() {
        let (base_url, server) = canned_server(
            "400 Bad Request",
            r#"{"code": 21211, "message": "Invalid 'To' Phone Number", "status": 400}"#,
        )
        .await;
        let config = TwilioConfig::new("AC123", "secret", "+15005550006").with_base_url(base_url);
        let client = TwilioClient::new(&config).unwrap();

        let err = client
            .create_message("+15005550006", "+1", "Hi")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DeliveryError::Rejected {
                status: 400,
                code: Some(21211),
                message: "Invalid 'To' Phone Number".to_string(),
            }
        );
        server.await.unwrap();
    }
}
