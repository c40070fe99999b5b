use kingspeech_widgets::events::AppEvent;
use kingspeech_widgets::lead::{PageMeta, UtmParams};
use kingspeech_widgets::theme::PreferenceStore;
use kingspeech_widgets::StorageError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{js_sys, CustomEvent, CustomEventInit, Document, Element, Event, EventTarget, HtmlElement, Storage};

/// An event listener that unregisters itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, callback: F) -> Option<Self>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        match target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()) {
            Ok(()) => Some(Self {
                target: target.clone(),
                event,
                callback,
            }),
            Err(e) => {
                log::warn!("Could not listen for {}: {:?}", event, e);
                None
            }
        }
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

pub fn document() -> Option<Document> {
    web_sys::window().and_then(|w| w.document())
}

pub fn root_element() -> Option<Element> {
    document().and_then(|doc| doc.document_element())
}

pub fn media_matches(query: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.match_media(query).ok().flatten())
        .map(|list| list.matches())
        .unwrap_or(false)
}

pub fn prefers_dark() -> bool {
    media_matches("(prefers-color-scheme: dark)")
}

pub fn viewport_size() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    (width, height)
}

pub fn set_style(element: &Element, property: &str, value: &str) {
    if let Some(el) = element.dyn_ref::<HtmlElement>() {
        if let Err(e) = el.style().set_property(property, value) {
            log::debug!("Could not set {} on element: {:?}", property, e);
        }
    }
}

/// `overflow: hidden` on `<body>` while any overlay holds the scroll lock.
pub fn set_body_scroll_locked(locked: bool) {
    if let Some(body) = document().and_then(|doc| doc.body()) {
        let _ = body
            .style()
            .set_property("overflow", if locked { "hidden" } else { "" });
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Fires the event as a bubbling `CustomEvent` on `document`.
pub fn dispatch_app_event(event: &AppEvent) {
    let Some(doc) = document() else { return };
    let detail = js_sys::JSON::parse(&event.detail(now_ms()).to_string()).unwrap_or(JsValue::NULL);
    let mut init = CustomEventInit::new();
    init.bubbles(true).detail(&detail);
    match CustomEvent::new_with_event_init_dict(event.name(), &init) {
        Ok(custom) => {
            let _ = doc.dispatch_event(&custom);
        }
        Err(e) => log::warn!("Could not create {} event: {:?}", event.name(), e),
    }
}

pub fn page_meta() -> PageMeta {
    let Some(window) = web_sys::window() else {
        return PageMeta::default();
    };
    let location = window.location();
    PageMeta {
        user_agent: window.navigator().user_agent().unwrap_or_default(),
        path: location.pathname().unwrap_or_default(),
        referrer: window.document().map(|d| d.referrer()).unwrap_or_default(),
        utm: UtmParams::from_query(&location.search().unwrap_or_default()),
    }
}

pub fn location_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

/// Puts `#fragment` in the address bar without adding a history entry.
pub fn replace_fragment(fragment: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let url = format!("#{}", fragment);
        if let Err(e) = history.replace_state_with_url(&JsValue::NULL, "", Some(&url)) {
            log::debug!("replaceState failed: {:?}", e);
        }
    }
}

/// Theme preference in `localStorage`.
pub struct LocalPreferenceStore;

impl LocalPreferenceStore {
    fn storage() -> Result<Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }
}

impl PreferenceStore for LocalPreferenceStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|_| StorageError::Unavailable)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| StorageError::WriteRejected(format!("{:?}", e)))
    }
}
