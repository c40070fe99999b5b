use gloo_timers::callback::Timeout;
use kingspeech_widgets::config::ThemeConfig;
use kingspeech_widgets::theme::{ThemeApply, ThemeController};
use kingspeech_widgets::PageContext;
use wasm_bindgen::JsCast;
use web_sys::MediaQueryListEvent;
use yew::prelude::*;

use crate::app::use_shell;
use crate::utils::dom::{self, LocalPreferenceStore, Listener};

const TRANSITION_CLASS: &str = "theme-transitioning";

/// The pre-init script may already have marked the document dark.
fn ambient_dark() -> bool {
    dom::root_element()
        .map(|root| root.class_list().contains("dark"))
        .unwrap_or(false)
}

fn apply_to_document(effect: &ThemeApply, config: &ThemeConfig, page: &PageContext, animate: bool) {
    page.publish_theme(effect.theme);
    let Some(root) = dom::root_element() else {
        return;
    };
    let classes = root.class_list();
    if animate {
        let _ = classes.add_1(TRANSITION_CLASS);
        let root = root.clone();
        Timeout::new(config.transition_ms, move || {
            let _ = root.class_list().remove_1(TRANSITION_CLASS);
        })
        .forget();
    }
    let _ = classes.remove_1(effect.remove_class);
    let _ = classes.add_1(effect.add_class);
    dom::set_style(&root, "color-scheme", effect.color_scheme);

    match dom::document().and_then(|doc| doc.query_selector("meta[name=\"theme-color\"]").ok().flatten()) {
        Some(meta) => {
            let _ = meta.set_attribute("content", &effect.meta_color);
        }
        None => log::debug!("No theme-color meta tag"),
    }
}

#[function_component(ThemeToggle)]
pub fn theme_toggle() -> Html {
    let shell = use_shell();
    let controller = {
        let config = shell.config.theme.clone();
        use_mut_ref(move || {
            ThemeController::init(LocalPreferenceStore, config, ambient_dark(), dom::prefers_dark())
        })
    };
    let effect = use_state(|| controller.borrow().current());
    let sunset = use_state(|| false);

    {
        let controller = controller.clone();
        let effect = effect.clone();
        let shell = shell.clone();
        use_effect_with_deps(
            move |_| {
                let initial = controller.borrow().current();
                apply_to_document(&initial, &shell.config.theme, &shell.page, false);
                if !controller.borrow().is_persistent() {
                    log::info!("Theme preference will not survive a reload");
                }

                let query = web_sys::window()
                    .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten());
                let listener = query.and_then(|query| {
                    Listener::new(&query, "change", move |event| {
                        let dark = event
                            .dyn_ref::<MediaQueryListEvent>()
                            .map(|e| e.matches())
                            .unwrap_or_else(dom::prefers_dark);
                        let change = controller.borrow_mut().on_system_change(dark);
                        if let Some(change) = change {
                            apply_to_document(&change, &shell.config.theme, &shell.page, true);
                            effect.set(change);
                        }
                    })
                });
                move || drop(listener)
            },
            (),
        );
    }

    let onclick = {
        let controller = controller.clone();
        let effect = effect.clone();
        let sunset = sunset.clone();
        let shell = shell.clone();
        Callback::from(move |_: MouseEvent| {
            let change = controller.borrow_mut().toggle();
            log::debug!("Theme switched to {}", change.theme.as_str());
            apply_to_document(&change, &shell.config.theme, &shell.page, true);
            if change.play_sunset {
                sunset.set(true);
                let sunset = sunset.clone();
                Timeout::new(shell.config.theme.sunset_ms, move || sunset.set(false)).forget();
            }
            effect.set(change);
        })
    };

    html! {
        <button
            type="button"
            class={classes!("theme-toggle", if effect.toggle_pressed { "theme-dark" } else { "theme-light" })}
            aria-label={effect.toggle_label}
            title={effect.toggle_label}
            aria-pressed={effect.toggle_pressed.to_string()}
            {onclick}
        >
            <span class={classes!("theme-sky", sunset.then_some("sunset-active"))} aria-hidden="true"></span>
        </button>
    }
}
