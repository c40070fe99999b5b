use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{js_sys, Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// An `IntersectionObserver` that disconnects when dropped. The callback
/// gets each entry that is currently intersecting.
pub struct Observer {
    inner: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array)>,
}

impl Observer {
    pub fn new<F>(root_margin: &str, threshold: f64, mut on_enter: F) -> Option<Self>
    where
        F: FnMut(Element) + 'static,
    {
        let callback = Closure::<dyn FnMut(js_sys::Array)>::new(move |entries: js_sys::Array| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if entry.is_intersecting() {
                    on_enter(entry.target());
                }
            }
        });
        let mut options = IntersectionObserverInit::new();
        options
            .root_margin(root_margin)
            .threshold(&JsValue::from_f64(threshold));
        match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options) {
            Ok(inner) => Some(Self {
                inner,
                _callback: callback,
            }),
            Err(e) => {
                log::debug!("IntersectionObserver unavailable: {:?}", e);
                None
            }
        }
    }

    pub fn observe(&self, target: &Element) {
        self.inner.observe(target);
    }

    pub fn unobserve(&self, target: &Element) {
        self.inner.unobserve(target);
    }
}

impl Drop for Observer {
    fn drop(&mut self) {
        self.inner.disconnect();
    }
}
