use kingspeech_widgets::config::WebhookConfig;
use kingspeech_widgets::PageConfig;

const CONFIG_ELEMENT_ID: &str = "page-config";

/// Webhook URL baked in at build time. Replaces the placeholder default but
/// never a URL set in the page config.
pub fn build_webhook_url() -> Option<&'static str> {
    option_env!("KINGSPEECH_WEBHOOK_URL").filter(|url| !url.is_empty())
}

/// Reads `<script type="application/json" id="page-config">`. Missing or
/// broken config is logged and replaced by the defaults.
pub fn load() -> PageConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|el| el.text_content());

    let mut config = match raw {
        None => {
            log::debug!("No #{} element, using default configuration", CONFIG_ELEMENT_ID);
            PageConfig::default()
        }
        Some(raw) => match PageConfig::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Invalid page configuration, using defaults: {}", e);
                PageConfig::default()
            }
        },
    };

    if config.webhook.url == WebhookConfig::default().url {
        if let Some(url) = build_webhook_url() {
            config.webhook.url = url.to_string();
        }
    }
    config
}
