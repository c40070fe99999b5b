use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use kingspeech_widgets::config::WebhookConfig;
use kingspeech_widgets::lead::{WebhookClient, WebhookResponse, WebhookTransport};
use kingspeech_widgets::timing::Sleeper;
use kingspeech_widgets::SubmitError;

/// Browser timers for the widget crate's async code.
#[derive(Clone, Copy, Default)]
pub struct GlooSleeper;

impl Sleeper for GlooSleeper {
    fn sleep(&self, ms: u32) -> LocalBoxFuture<'static, ()> {
        TimeoutFuture::new(ms).boxed_local()
    }
}

/// The lead webhook (a Google Apps Script deployment) over `fetch`.
pub struct WebhookApi {
    url: String,
}

impl WebhookApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

async fn read_reply(response: Response) -> Result<WebhookResponse, SubmitError> {
    if !response.ok() {
        return Err(SubmitError::Http(response.status()));
    }
    let text = response
        .text()
        .await
        .map_err(|e| SubmitError::Network(e.to_string()))?;
    WebhookResponse::parse(&text)
}

#[async_trait(?Send)]
impl WebhookTransport for WebhookApi {
    async fn post_form(&self, body: String) -> Result<WebhookResponse, SubmitError> {
        let response = Request::post(&self.url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        read_reply(response).await
    }

    async fn get(&self) -> Result<WebhookResponse, SubmitError> {
        let response = Request::get(&self.url)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;
        read_reply(response).await
    }
}

pub type LeadClient = WebhookClient<WebhookApi, GlooSleeper>;

pub fn lead_client(config: &WebhookConfig) -> LeadClient {
    WebhookClient::new(WebhookApi::new(config.url.clone()), GlooSleeper, config.clone())
}
