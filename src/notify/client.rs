use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::{CallId, DeliveryError, Notifier};
use crate::config::NotifyConfig;

/// Messaging and telephony providers reached over HTTP with bearer credentials.
#[derive(Clone)]
pub struct HttpNotifier {
    http: reqwest::Client,
    sms_url: String,
    sms_api_key: String,
    call_url: String,
    call_api_key: String,
    sender: String,
}

impl HttpNotifier {
    pub fn new(cfg: &NotifyConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build notifier http client")?;
        Ok(Self {
            http,
            sms_url: cfg.sms_url.clone(),
            sms_api_key: cfg.sms_api_key.clone(),
            call_url: cfg.call_url.clone(),
            call_api_key: cfg.call_api_key.clone(),
            sender: cfg.sender.clone(),
        })
    }

    async fn post<B: Serialize>(
        &self,
        url: &str,
        api_key: &str,
        body: &B,
    ) -> Result<reqwest::Response, DeliveryError> {
        let res = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryError::Unreachable(e.to_string()))?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            Err(DeliveryError::Rejected { status, body })
        }
    }
}

#[derive(Serialize)]
struct MessageBody<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
struct CallBody<'a> {
    from: &'a str,
    to: &'a str,
    script: &'a str,
}

#[derive(Deserialize)]
struct CallCreated {
    id: String,
}

#[async_trait]
impl Notifier for HttpNotifier {
    #[instrument(skip_all)]
    async fn notify_owner(&self, phone_number: &str, message: &str) -> Result<(), DeliveryError> {
        let body = MessageBody {
            from: &self.sender,
            to: phone_number,
            text: message,
        };
        self.post(&self.sms_url, &self.sms_api_key, &body).await?;
        info!("owner message sent");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn place_call(&self, phone_number: &str, script: &str) -> Result<CallId, DeliveryError> {
        let body = CallBody {
            from: &self.sender,
            to: phone_number,
            script,
        };
        let res = self.post(&self.call_url, &self.call_api_key, &body).await?;
        let created: CallCreated = res
            .json()
            .await
            .map_err(|e| DeliveryError::Unreachable(format!("unreadable call response: {e}")))?;
        info!(call_id = %created.id, "owner call placed");
        Ok(CallId(created.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{HeaderMap, StatusCode},
        Json, Router,
    };

    /// Serve every request with `status` and `body` on an ephemeral loopback port.
    async fn provider(status: StatusCode, body: serde_json::Value) -> String {
        let app = Router::new().fallback(move |headers: HeaderMap| {
            let body = body.clone();
            async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer k");
                if authorized {
                    (status, Json(body))
                } else {
                    (StatusCode::UNAUTHORIZED, Json(serde_json::Value::Null))
                }
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn config(url: &str) -> NotifyConfig {
        NotifyConfig {
            sms_url: url.into(),
            sms_api_key: "k".into(),
            call_url: url.into(),
            call_api_key: "k".into(),
            sender: "Parkside".into(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_delivery_failure() {
        // nothing listens on port 9 of the loopback interface
        let notifier = HttpNotifier::new(&config("http://127.0.0.1:9/messages")).unwrap();
        let err = notifier.notify_owner("+15550100", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Unreachable(_)));

        let err = notifier.place_call("+15550100", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Unreachable(_)));
    }

    #[test]
    fn message_body_uses_provider_field_names() {
        let body = MessageBody {
            from: "Parkside",
            to: "+15550100",
            text: "move",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"], "+15550100");
        assert_eq!(json["text"], "move");
    }

    #[tokio::test]
    async fn non_success_status_is_a_rejection() {
        let url = provider(
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({ "error": "busy" }),
        )
        .await;
        let notifier = HttpNotifier::new(&config(&url)).unwrap();

        let err = notifier.notify_owner("+15550100", "hi").await.unwrap_err();
        match err {
            DeliveryError::Rejected { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("busy"));
            }
            other => panic!("expected a rejection, got {other:?}"),
        }

        let err = notifier.place_call("+15550100", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 503, .. }));
    }

    #[tokio::test]
    async fn accepted_call_returns_provider_id() {
        let url = provider(StatusCode::OK, serde_json::json!({ "id": "c1" })).await;
        let notifier = HttpNotifier::new(&config(&url)).unwrap();

        let call = notifier.place_call("+15550100", "move your car").await.unwrap();
        assert_eq!(call, CallId("c1".into()));
        notifier.notify_owner("+15550100", "move your car").await.unwrap();
    }

    #[tokio::test]
    async fn wrong_credentials_are_rejected() {
        let url = provider(StatusCode::OK, serde_json::json!({ "id": "c1" })).await;
        let mut cfg = config(&url);
        cfg.call_api_key = "other".into();
        let notifier = HttpNotifier::new(&cfg).unwrap();

        let err = notifier.place_call("+15550100", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Rejected { status: 401, .. }));
    }
}
