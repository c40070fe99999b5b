//! Page lifecycle events broadcast on `document` as bubbling `CustomEvent`s.

use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Ready,
    Resize { width: f64, height: f64 },
    Online,
    Offline,
    PageHidden,
    PageVisible,
    Error { message: String },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::Ready => "app:ready",
            AppEvent::Resize { .. } => "app:resize",
            AppEvent::Online => "app:online",
            AppEvent::Offline => "app:offline",
            AppEvent::PageHidden => "app:hidden",
            AppEvent::PageVisible => "app:visible",
            AppEvent::Error { .. } => "app:error",
        }
    }

    /// Event data plus a `timestamp` in ms since the epoch.
    pub fn detail(&self, timestamp_ms: i64) -> Value {
        let mut detail = Map::new();
        match self {
            AppEvent::Resize { width, height } => {
                detail.insert("width".into(), json!(width));
                detail.insert("height".into(), json!(height));
            }
            AppEvent::Error { message } => {
                detail.insert("error".into(), json!(message));
            }
            _ => {}
        }
        detail.insert("timestamp".into(), json!(timestamp_ms));
        Value::Object(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_app_prefix() {
        assert_eq!(AppEvent::Ready.name(), "app:ready");
        assert_eq!(AppEvent::Offline.name(), "app:offline");
        assert_eq!(
            AppEvent::Error {
                message: "boom".into()
            }
            .name(),
            "app:error"
        );
    }

    #[test]
    fn detail_carries_data_and_timestamp() {
        let resize = AppEvent::Resize {
            width: 1280.0,
            height: 720.0,
        };
        assert_eq!(
            resize.detail(1_700_000_000_000),
            json!({"width": 1280.0, "height": 720.0, "timestamp": 1_700_000_000_000i64})
        );
        assert_eq!(AppEvent::Online.detail(5), json!({"timestamp": 5}));
    }
}
