use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use kingspeech_widgets::events::AppEvent;
use kingspeech_widgets::theme::Theme;
use kingspeech_widgets::timing::Debouncer;
use kingspeech_widgets::{PageConfig, PageContext};
use wasm_bindgen::JsCast;
use web_sys::{ErrorEvent, PromiseRejectionEvent};
use yew::prelude::*;

use crate::config;
use crate::pages::landing::Landing;
use crate::utils::dom::{self, Listener};

const RESIZE_DEBOUNCE_MS: u32 = 250;

/// Everything the page-level components share: the scroll-lock/theme
/// context, the configuration and the page lifecycle state.
#[derive(Clone, PartialEq)]
pub struct Shell {
    pub page: Rc<PageContext>,
    pub config: Rc<PageConfig>,
    pub hidden: bool,
    pub viewport: (f64, f64),
}

impl Shell {
    fn detached() -> Self {
        log::debug!("Component mounted outside the app shell, using a private context");
        Self {
            page: Rc::new(PageContext::new(Theme::default())),
            config: Rc::new(PageConfig::default()),
            hidden: false,
            viewport: dom::viewport_size(),
        }
    }
}

#[hook]
pub fn use_shell() -> Shell {
    use_context::<Shell>().unwrap_or_else(Shell::detached)
}

fn page_hidden() -> bool {
    dom::document().map(|d| d.hidden()).unwrap_or(false)
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo(|_| config::load(), ());
    let page = use_memo(
        |_| {
            let page = PageContext::new(Theme::default());
            page.on_scroll_lock_change(dom::set_body_scroll_locked);
            page
        },
        (),
    );
    let hidden = use_state(page_hidden);
    let viewport = use_state(dom::viewport_size);

    {
        let hidden = hidden.clone();
        let viewport = viewport.clone();
        use_effect_with_deps(
            move |_| {
                let mut listeners = Vec::new();
                let debouncer = Rc::new(RefCell::new(Debouncer::default()));

                if let Some(window) = web_sys::window() {
                    listeners.extend(Listener::new(&window, "resize", move |_| {
                        let generation = debouncer.borrow_mut().arm();
                        let debouncer = debouncer.clone();
                        let viewport = viewport.clone();
                        Timeout::new(RESIZE_DEBOUNCE_MS, move || {
                            if !debouncer.borrow().is_current(generation) {
                                return;
                            }
                            let (width, height) = dom::viewport_size();
                            viewport.set((width, height));
                            dom::dispatch_app_event(&AppEvent::Resize { width, height });
                        })
                        .forget();
                    }));
                    listeners.extend(Listener::new(&window, "online", |_| {
                        log::info!("Back online");
                        dom::dispatch_app_event(&AppEvent::Online);
                    }));
                    listeners.extend(Listener::new(&window, "offline", |_| {
                        log::warn!("Connection lost");
                        dom::dispatch_app_event(&AppEvent::Offline);
                    }));
                    listeners.extend(Listener::new(&window, "error", |event| {
                        let message = event
                            .dyn_ref::<ErrorEvent>()
                            .map(|e| e.message())
                            .unwrap_or_else(|| "Unknown error".to_string());
                        log::error!("Unhandled error: {}", message);
                        dom::dispatch_app_event(&AppEvent::Error { message });
                    }));
                    listeners.extend(Listener::new(&window, "unhandledrejection", |event| {
                        let message = event
                            .dyn_ref::<PromiseRejectionEvent>()
                            .map(|e| format!("{:?}", e.reason()))
                            .unwrap_or_else(|| "Unhandled rejection".to_string());
                        log::error!("Unhandled promise rejection: {}", message);
                        dom::dispatch_app_event(&AppEvent::Error { message });
                    }));
                }

                if let Some(doc) = dom::document() {
                    listeners.extend(Listener::new(&doc, "visibilitychange", move |_| {
                        let now_hidden = page_hidden();
                        hidden.set(now_hidden);
                        let event = if now_hidden {
                            AppEvent::PageHidden
                        } else {
                            AppEvent::PageVisible
                        };
                        dom::dispatch_app_event(&event);
                    }));
                }

                log::info!("App shell ready");
                dom::dispatch_app_event(&AppEvent::Ready);
                move || drop(listeners)
            },
            (),
        );
    }

    let shell = Shell {
        page: page.clone(),
        config: config.clone(),
        hidden: *hidden,
        viewport: *viewport,
    };

    html! {
        <ContextProvider<Shell> context={shell}>
            <Landing />
        </ContextProvider<Shell>>
    }
}
