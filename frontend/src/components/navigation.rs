use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use kingspeech_widgets::navigation::{fragment_target, FocusTarget, MenuChange, Navigation};
use kingspeech_widgets::timing::Debouncer;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent, Node, ScrollBehavior, ScrollToOptions};
use yew::prelude::*;

use crate::app::use_shell;
use crate::components::announcer::{use_announcer, LiveRegion};
use crate::components::theme_toggle::ThemeToggle;
use crate::content::NAV_LINKS;
use crate::utils::dom::{self, Listener};
use crate::utils::observer::Observer;

const ANNOUNCEMENT_MS: u32 = 1000;

fn focus(node: &NodeRef) {
    if let Some(el) = node.cast::<HtmlElement>() {
        let _ = el.focus();
    }
}

fn contains(node: &NodeRef, target: Option<&Node>) -> bool {
    node.get().map(|n| n.contains(target)).unwrap_or(false)
}

#[function_component(Header)]
pub fn header() -> Html {
    let shell = use_shell();
    let nav = use_mut_ref(|| Navigation::new(shell.config.navigation.clone()));
    let menu_open = use_state(|| false);
    let toggle_label = use_state(|| "Open menu");
    let refresh = use_force_update();
    let announcer = use_announcer(ANNOUNCEMENT_MS);

    let header_ref = use_node_ref();
    let menu_ref = use_node_ref();
    let toggle_ref = use_node_ref();
    let first_link_ref = use_node_ref();

    let apply: Rc<dyn Fn(Option<MenuChange>)> = {
        let menu_open = menu_open.clone();
        let toggle_label = toggle_label.clone();
        let announce = announcer.announce.clone();
        let toggle_ref = toggle_ref.clone();
        let first_link_ref = first_link_ref.clone();
        Rc::new(move |change: Option<MenuChange>| {
            let Some(change) = change else { return };
            menu_open.set(change.open);
            toggle_label.set(change.toggle_label);
            match change.focus {
                FocusTarget::FirstLink => focus(&first_link_ref),
                FocusTarget::Toggle => focus(&toggle_ref),
            }
            announce.emit(change.announcement.to_string());
        })
    };

    // outside clicks, Escape, and debounced scroll for the active link
    {
        let nav = nav.clone();
        let apply = apply.clone();
        let menu_ref = menu_ref.clone();
        let toggle_ref = toggle_ref.clone();
        let refresh = refresh.clone();
        let debounce_ms = shell.config.navigation.scroll_debounce_ms;
        use_effect_with_deps(
            move |_| {
                let mut listeners = Vec::new();
                if let Some(doc) = dom::document() {
                    let nav_click = nav.clone();
                    let apply_click = apply.clone();
                    listeners.extend(Listener::new(&doc, "click", move |event| {
                        if !nav_click.borrow().is_menu_open() {
                            return;
                        }
                        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
                        let inside = contains(&menu_ref, target.as_ref())
                            || contains(&toggle_ref, target.as_ref());
                        let change = nav_click.borrow_mut().on_outside_click(inside);
                        apply_click(change);
                    }));
                    listeners.extend(Listener::new(&doc, "keydown", move |event| {
                        let is_escape = event
                            .dyn_ref::<KeyboardEvent>()
                            .map(|e| e.key() == "Escape")
                            .unwrap_or(false);
                        if is_escape {
                            let change = nav.borrow_mut().on_escape();
                            apply(change);
                        }
                    }));
                }
                if let Some(window) = web_sys::window() {
                    let debouncer = Rc::new(RefCell::new(Debouncer::default()));
                    listeners.extend(Listener::new(&window, "scroll", move |_| {
                        let generation = debouncer.borrow_mut().arm();
                        let debouncer = debouncer.clone();
                        let refresh = refresh.clone();
                        Timeout::new(debounce_ms, move || {
                            if debouncer.borrow().is_current(generation) {
                                refresh.force_update();
                            }
                        })
                        .forget();
                    }));
                }
                move || drop(listeners)
            },
            (),
        );
    }

    // active section
    {
        let nav = nav.clone();
        let root_margin = shell.config.navigation.section_root_margin.clone();
        use_effect_with_deps(
            move |_| {
                let observer = Observer::new(&root_margin, 0.0, move |section| {
                    let id = section.id();
                    if !id.is_empty() && nav.borrow_mut().on_section_intersect(&id) {
                        log::debug!("Active section: {}", id);
                    }
                });
                if let (Some(observer), Some(doc)) = (observer.as_ref(), dom::document()) {
                    if let Ok(sections) = doc.query_selector_all("section[id]") {
                        for i in 0..sections.length() {
                            if let Some(el) = sections.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                                observer.observe(&el);
                            }
                        }
                    }
                }
                move || drop(observer)
            },
            (),
        );
    }

    // closing the menu when the viewport grows past the breakpoint
    {
        let nav = nav.clone();
        let apply = apply.clone();
        let width = shell.viewport.0;
        use_effect_with_deps(
            move |_| {
                let change = nav.borrow_mut().on_resize(width);
                apply(change);
                || ()
            },
            width.to_bits(),
        );
    }

    let on_toggle = {
        let nav = nav.clone();
        let apply = apply.clone();
        let page = shell.page.clone();
        Callback::from(move |_: MouseEvent| {
            let change = nav.borrow_mut().toggle_menu(&page);
            apply(change);
        })
    };

    let links = NAV_LINKS.iter().enumerate().map(|(i, (href, label))| {
        let active = nav.borrow().is_link_active(href);
        let onclick = {
            let nav = nav.clone();
            let apply = apply.clone();
            let header_ref = header_ref.clone();
            let href = *href;
            Callback::from(move |e: MouseEvent| {
                let Some(id) = fragment_target(href) else { return };
                let Some(section) = dom::document().and_then(|d| d.get_element_by_id(id)) else {
                    return;
                };
                e.prevent_default();
                let change = nav.borrow_mut().close_menu();
                apply(change);

                let Some(window) = web_sys::window() else { return };
                let header_height = header_ref
                    .cast::<HtmlElement>()
                    .map(|h| f64::from(h.offset_height()))
                    .unwrap_or(0.0);
                let top = section.get_bounding_client_rect().top() + window.scroll_y().unwrap_or(0.0);
                let mut options = ScrollToOptions::new();
                options
                    .top(nav.borrow().scroll_target(top, header_height))
                    .behavior(ScrollBehavior::Smooth);
                window.scroll_to_with_scroll_to_options(&options);
                dom::replace_fragment(id);
            })
        };
        let link_ref = if i == 0 { first_link_ref.clone() } else { NodeRef::default() };
        html! {
            <li>
                <a
                    href={*href}
                    ref={link_ref}
                    class={classes!("nav__link", active.then_some("nav__link--active"))}
                    aria-current={active.then_some("page")}
                    {onclick}
                >
                    {*label}
                </a>
            </li>
        }
    });

    html! {
        <header class={classes!("header", menu_open.then_some("header--menu-open"))} ref={header_ref.clone()}>
            <a class="header__logo" href="#top">{"KingSpeech"}</a>
            <nav class="nav" id="site-nav" ref={menu_ref} aria-label="Main">
                <ul class="nav__list">{ for links }</ul>
            </nav>
            <ThemeToggle />
            <button
                type="button"
                class="nav__toggle"
                ref={toggle_ref}
                aria-controls="site-nav"
                aria-expanded={menu_open.to_string()}
                aria-label={*toggle_label}
                onclick={on_toggle}
            >
                <span class="nav__burger" aria-hidden="true"></span>
            </button>
            <LiveRegion message={announcer.message.clone()} />
        </header>
    }
}
