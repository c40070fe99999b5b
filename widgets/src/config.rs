//! Typed page configuration.
//!
//! Every knob the widgets read lives here with an explicit default. The
//! frontend deserializes it once (from an embedded JSON block, if the page
//! ships one) and calls [`PageConfig::validate`] before handing pieces to the
//! controllers.

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageConfig {
    pub theme: ThemeConfig,
    pub carousel: CarouselConfig,
    pub animation: AnimationConfig,
    pub navigation: NavigationConfig,
    pub form: FormConfig,
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub storage_key: String,
    pub dark_meta_color: String,
    pub light_meta_color: String,
    pub transition_ms: u32,
    pub sunset_ms: u32,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "kingspeech-theme".to_string(),
            dark_meta_color: "#0F172A".to_string(),
            light_meta_color: "#FFFFFF".to_string(),
            transition_ms: 300,
            sunset_ms: 1200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarouselConfig {
    pub autoplay_ms: u32,
    pub cooldown_ms: u32,
    pub swipe_threshold_px: f64,
    pub announcement_ms: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_ms: 5000,
            cooldown_ms: 300,
            swipe_threshold_px: 50.0,
            announcement_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DispatchMode {
    /// Every task waits on its own timer.
    Concurrent,
    /// One FIFO drain loop; a task's delay holds back the ones behind it.
    Serial,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationConfig {
    pub root_margin: String,
    pub threshold: f64,
    pub default_duration_ms: u32,
    pub default_kind: String,
    pub dispatch: DispatchMode,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            root_margin: "0px 0px -10% 0px".to_string(),
            threshold: 0.1,
            default_duration_ms: 600,
            default_kind: "fadeInUp".to_string(),
            dispatch: DispatchMode::Concurrent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NavigationConfig {
    pub section_root_margin: String,
    pub scroll_offset_px: f64,
    pub mobile_breakpoint_px: f64,
    pub scroll_debounce_ms: u32,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            section_root_margin: "-20% 0px -20% 0px".to_string(),
            scroll_offset_px: 20.0,
            mobile_breakpoint_px: 768.0,
            scroll_debounce_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormConfig {
    pub banner_ms: u32,
    pub honeypot_field: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            banner_ms: 5000,
            honeypot_field: "website".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebhookConfig {
    pub url: String,
    pub timeout_ms: u32,
    pub retries: u32,
    pub backoff_base_ms: u32,
    pub backoff_factor: f64,
    pub backoff_cap_ms: u32,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: "https://script.google.com/macros/s/YOUR_SCRIPT_ID/exec".to_string(),
            timeout_ms: 10_000,
            retries: 2,
            backoff_base_ms: 1000,
            backoff_factor: 2.0,
            backoff_cap_ms: 8000,
        }
    }
}

impl WebhookConfig {
    /// Delay before retry number `attempt` (0-based).
    pub fn backoff_ms(&self, attempt: u32) -> u32 {
        let raw = f64::from(self.backoff_base_ms) * self.backoff_factor.powi(attempt as i32);
        raw.min(f64::from(self.backoff_cap_ms)) as u32
    }
}

impl PageConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: PageConfig =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("carousel.autoplayMs", self.carousel.autoplay_ms),
            ("carousel.cooldownMs", self.carousel.cooldown_ms),
            ("animation.defaultDurationMs", self.animation.default_duration_ms),
            ("webhook.timeoutMs", self.webhook.timeout_ms),
        ];
        for (field, value) in non_zero {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }

        if !(0.0..=1.0).contains(&self.animation.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "animation.threshold",
                value: self.animation.threshold.to_string(),
            });
        }
        if self.carousel.swipe_threshold_px <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "carousel.swipeThresholdPx",
                value: self.carousel.swipe_threshold_px.to_string(),
            });
        }
        if self.webhook.backoff_factor < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "webhook.backoffFactor",
                value: self.webhook.backoff_factor.to_string(),
            });
        }
        if self.form.honeypot_field.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "form.honeypotField",
                value: self.form.honeypot_field.clone(),
            });
        }

        let url = Url::parse(&self.webhook.url)
            .map_err(|e| ConfigError::WebhookUrl(format!("{}: {}", self.webhook.url, e)))?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::WebhookUrl(self.webhook.url.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PageConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = PageConfig::from_json(
            r#"{"carousel": {"autoplayMs": 7000}, "animation": {"dispatch": "serial"}}"#,
        )
        .unwrap();
        assert_eq!(config.carousel.autoplay_ms, 7000);
        assert_eq!(config.carousel.cooldown_ms, 300);
        assert_eq!(config.animation.dispatch, DispatchMode::Serial);
        assert_eq!(config.theme.storage_key, "kingspeech-theme");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = PageConfig::from_json(r#"{"carousel": {"autoplayMs": 0}}"#).unwrap_err();
        assert_eq!(err, ConfigError::Zero { field: "carousel.autoplayMs" });
    }

    #[test]
    fn webhook_url_must_be_http() {
        let err = PageConfig::from_json(r#"{"webhook": {"url": "ftp://example.com/hook"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::WebhookUrl(_)));

        let err = PageConfig::from_json(r#"{"webhook": {"url": "not a url"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::WebhookUrl(_)));
    }

    #[test]
    fn garbage_json_is_a_parse_error() {
        assert!(matches!(
            PageConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn backoff_grows_and_caps() {
        let webhook = WebhookConfig::default();
        assert_eq!(webhook.backoff_ms(0), 1000);
        assert_eq!(webhook.backoff_ms(1), 2000);
        assert_eq!(webhook.backoff_ms(2), 4000);
        assert_eq!(webhook.backoff_ms(5), 8000);
    }
}
