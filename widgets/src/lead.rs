//! Lead submission: the payload we send, the webhook's reply shape, and the
//! retrying client that sits between the form and the network.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::cell::Cell;
use url::form_urlencoded;

use crate::config::WebhookConfig;
use crate::error::SubmitError;
use crate::timing::{self, Sleeper};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UtmParams {
    pub source: String,
    pub medium: String,
    pub campaign: String,
}

impl UtmParams {
    /// Reads the campaign tags from a location query string (with or
    /// without the leading `?`). Missing tags become empty strings.
    pub fn from_query(query: &str) -> Self {
        let mut utm = UtmParams::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "utm_source" => utm.source = value.into_owned(),
                "utm_medium" => utm.medium = value.into_owned(),
                "utm_campaign" => utm.campaign = value.into_owned(),
                _ => {}
            }
        }
        utm
    }
}

/// Where the visitor is when they submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub user_agent: String,
    pub path: String,
    pub referrer: String,
    pub utm: UtmParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadPayload {
    pub fields: Vec<(String, String)>,
    pub form_id: String,
    pub timestamp: DateTime<Utc>,
    pub honeypot_field: String,
    pub honeypot: String,
    pub meta: PageMeta,
}

impl LeadPayload {
    pub fn is_spam(&self) -> bool {
        !self.honeypot.trim().is_empty()
    }

    /// `application/x-www-form-urlencoded` body. Visitor fields first, then
    /// metadata in a fixed order. The honeypot always goes out empty.
    pub fn to_form_body(&self) -> String {
        let mut body = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.fields {
            body.append_pair(key, value);
        }
        body.append_pair("formId", &self.form_id)
            .append_pair(
                "timestamp",
                &self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            )
            .append_pair("userAgent", &self.meta.user_agent)
            .append_pair(&self.honeypot_field, "")
            .append_pair("page", &self.meta.path)
            .append_pair("ref", &self.meta.referrer)
            .append_pair("utm_source", &self.meta.utm.source)
            .append_pair("utm_medium", &self.meta.utm.medium)
            .append_pair("utm_campaign", &self.meta.utm.campaign);
        body.finish()
    }
}

/// `{ok, data?, message?}` as returned by the webhook for POST and GET.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl WebhookResponse {
    pub fn parse(raw: &str) -> Result<Self, SubmitError> {
        serde_json::from_str(raw).map_err(|e| SubmitError::MalformedResponse(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeadReceipt {
    pub data: Option<Value>,
    pub message: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait LeadSubmitter {
    async fn submit(&self, payload: &LeadPayload) -> Result<LeadReceipt, SubmitError>;
    async fn health_check(&self) -> bool;
}

/// One HTTP exchange with the webhook, no retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait(?Send)]
pub trait WebhookTransport {
    async fn post_form(&self, body: String) -> Result<WebhookResponse, SubmitError>;
    async fn get(&self) -> Result<WebhookResponse, SubmitError>;
}

pub struct WebhookClient<T, S> {
    transport: T,
    sleeper: S,
    config: WebhookConfig,
    healthy: Cell<Option<bool>>,
}

impl<T: WebhookTransport, S: Sleeper> WebhookClient<T, S> {
    pub fn new(transport: T, sleeper: S, config: WebhookConfig) -> Self {
        Self {
            transport,
            sleeper,
            config,
            healthy: Cell::new(None),
        }
    }

    /// Result of the last health check, `None` before the first one.
    pub fn is_healthy(&self) -> Option<bool> {
        self.healthy.get()
    }

    async fn attempt(&self, body: String) -> Result<WebhookResponse, SubmitError> {
        timing::timeout(
            &self.sleeper,
            self.config.timeout_ms,
            self.transport.post_form(body),
        )
        .await
        .unwrap_or(Err(SubmitError::Timeout))
    }

    async fn send_with_retry(&self, body: String) -> Result<WebhookResponse, SubmitError> {
        let mut attempt = 0;
        loop {
            let err = match self.attempt(body.clone()).await {
                Ok(response) if response.ok => return Ok(response),
                Ok(response) => SubmitError::Rejected(
                    response.message.unwrap_or_else(|| "Unknown error".to_string()),
                ),
                Err(e) => e,
            };
            if !err.is_retryable() || attempt >= self.config.retries {
                return Err(err);
            }
            let backoff = self.config.backoff_ms(attempt);
            attempt += 1;
            log::info!(
                "Lead submission failed ({}), retry {}/{} in {} ms",
                err,
                attempt,
                self.config.retries,
                backoff
            );
            self.sleeper.sleep(backoff).await;
        }
    }
}

#[async_trait(?Send)]
impl<T: WebhookTransport, S: Sleeper> LeadSubmitter for WebhookClient<T, S> {
    async fn submit(&self, payload: &LeadPayload) -> Result<LeadReceipt, SubmitError> {
        log::debug!("Submitting lead from form {}", payload.form_id);
        match self.send_with_retry(payload.to_form_body()).await {
            Ok(response) => Ok(LeadReceipt {
                data: response.data,
                message: response.message,
            }),
            Err(e) => {
                log::error!("Lead submission failed: {}", e);
                Err(e)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let check = timing::timeout(&self.sleeper, self.config.timeout_ms, self.transport.get());
        let healthy = match check.await {
            Some(Ok(response)) => response.ok,
            Some(Err(e)) => {
                log::warn!("Webhook health check failed: {}", e);
                false
            }
            None => {
                log::warn!("Webhook health check timed out");
                false
            }
        };
        self.healthy.set(Some(healthy));
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::testing::InstantSleeper;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn payload() -> LeadPayload {
        LeadPayload {
            fields: vec![
                ("name".into(), "Анна".into()),
                ("phone".into(), "+7 900 123 45 67".into()),
            ],
            form_id: "trial-lesson".into(),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
            honeypot_field: "website".into(),
            honeypot: String::new(),
            meta: PageMeta {
                user_agent: "Mozilla/5.0".into(),
                path: "/".into(),
                referrer: String::new(),
                utm: UtmParams::from_query("?utm_source=tg&utm_campaign=spring%20sale"),
            },
        }
    }

    fn ok(message: &str) -> WebhookResponse {
        WebhookResponse {
            ok: true,
            data: None,
            message: Some(message.to_string()),
        }
    }

    #[test]
    fn utm_params_are_extracted() {
        let utm = UtmParams::from_query("utm_medium=cpc&x=1&utm_source=ya");
        assert_eq!(utm.source, "ya");
        assert_eq!(utm.medium, "cpc");
        assert_eq!(utm.campaign, "");
    }

    #[test]
    fn form_body_is_encoded_in_stable_order() {
        let body = payload().to_form_body();
        assert!(body.starts_with("name=%D0%90%D0%BD%D0%BD%D0%B0&phone=%2B7+900+123+45+67&formId=trial-lesson"));
        assert!(body.contains("timestamp=2026-03-01T12%3A00%3A00.000Z"));
        assert!(body.contains("&website=&page=%2F&ref=&utm_source=tg&utm_medium=&utm_campaign=spring+sale"));
    }

    #[test]
    fn honeypot_never_leaves_filled() {
        let mut lead = payload();
        lead.honeypot = "http://spam.example".into();
        assert!(lead.is_spam());
        assert!(lead.to_form_body().contains("&website=&"));
    }

    #[test]
    fn response_parsing() {
        let parsed = WebhookResponse::parse(r#"{"ok":true,"data":{"id":5}}"#).unwrap();
        assert!(parsed.ok);
        assert_eq!(parsed.data, Some(serde_json::json!({"id": 5})));
        assert!(matches!(
            WebhookResponse::parse("<html>"),
            Err(SubmitError::MalformedResponse(_))
        ));
    }

    #[test]
    fn transient_failures_are_retried_with_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut transport = MockWebhookTransport::new();
        transport.expect_post_form().times(3).returning(move |_| {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(SubmitError::Http(503)),
                1 => Err(SubmitError::Network("reset".into())),
                _ => Ok(ok("saved")),
            }
        });
        let sleeper = InstantSleeper::default();
        let client = WebhookClient::new(transport, sleeper.clone(), WebhookConfig::default());

        let receipt = block_on(client.submit(&payload())).unwrap();
        assert_eq!(receipt.message.as_deref(), Some("saved"));
        // each attempt arms a 10 s timeout; backoffs are 1 s then 2 s
        assert_eq!(*sleeper.slept.borrow(), vec![10_000, 1000, 10_000, 2000, 10_000]);
    }

    #[test]
    fn gives_up_after_configured_retries() {
        let mut transport = MockWebhookTransport::new();
        transport
            .expect_post_form()
            .times(3)
            .returning(|_| Err(SubmitError::Timeout));
        let client = WebhookClient::new(transport, InstantSleeper::default(), WebhookConfig::default());
        assert_eq!(block_on(client.submit(&payload())), Err(SubmitError::Timeout));
    }

    #[test]
    fn rejection_is_not_retried() {
        let mut transport = MockWebhookTransport::new();
        transport.expect_post_form().times(1).returning(|_| {
            Ok(WebhookResponse {
                ok: false,
                data: None,
                message: Some("duplicate".into()),
            })
        });
        let client = WebhookClient::new(transport, InstantSleeper::default(), WebhookConfig::default());
        assert_eq!(
            block_on(client.submit(&payload())),
            Err(SubmitError::Rejected("duplicate".into()))
        );
    }

    #[test]
    fn health_check_is_cached() {
        let mut transport = MockWebhookTransport::new();
        transport.expect_get().times(1).returning(|| Ok(ok("alive")));
        let client = WebhookClient::new(transport, InstantSleeper::default(), WebhookConfig::default());
        assert_eq!(client.is_healthy(), None);
        assert!(block_on(client.health_check()));
        assert_eq!(client.is_healthy(), Some(true));
    }

    #[test]
    fn failed_health_check_reports_unhealthy() {
        let mut transport = MockWebhookTransport::new();
        transport.expect_get().returning(|| Err(SubmitError::Http(500)));
        let client = WebhookClient::new(transport, InstantSleeper::default(), WebhookConfig::default());
        assert!(!block_on(client.health_check()));
        assert_eq!(client.is_healthy(), Some(false));
    }
}
