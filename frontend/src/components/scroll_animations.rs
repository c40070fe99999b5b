use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use kingspeech_widgets::animation::{
    AnimationKind, AnimationSink, AnimationSpec, Animator, Phase, Spawner, TrackId,
};
use kingspeech_widgets::config::AnimationConfig;
use kingspeech_widgets::scroll_effects::{parallax_speed, parallax_transform, scroll_progress, FrameGate, ProgressStyle};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Element;
use yew::prelude::*;

use crate::app::use_shell;
use crate::utils::api::GlooSleeper;
use crate::utils::dom::{self, Listener};
use crate::utils::observer::Observer;

const ALL_KINDS: [AnimationKind; 7] = [
    AnimationKind::FadeIn,
    AnimationKind::FadeInUp,
    AnimationKind::SlideUp,
    AnimationKind::SlideLeft,
    AnimationKind::SlideRight,
    AnimationKind::ScaleIn,
    AnimationKind::RotateIn,
];

type ObserverSlot = Rc<RefCell<Option<Observer>>>;

struct DomSink {
    observer: ObserverSlot,
}

impl AnimationSink<Element> for DomSink {
    fn is_live(&self, target: &Element) -> bool {
        target.is_connected()
    }

    fn apply(&self, target: &Element, class: &'static str, duration_ms: u32) {
        dom::set_style(target, "--animation-duration", &format!("{}ms", duration_ms));
        let _ = target.class_list().add_2(class, "animated");
        let _ = target.set_attribute("data-animated", "true");
    }

    fn complete(&self, target: &Element, class: &'static str) {
        let classes = target.class_list();
        let _ = classes.remove_1(class);
        let _ = classes.add_1("animation-complete");
    }

    fn unobserve(&self, target: &Element) {
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer.unobserve(target);
        }
    }

    fn reset(&self, target: &Element) {
        let classes = target.class_list();
        let _ = classes.remove_2("animated", "animation-complete");
        for kind in ALL_KINDS {
            let _ = classes.remove_1(kind.class());
        }
        let _ = target.remove_attribute("data-animated");
        if let Some(observer) = self.observer.borrow().as_ref() {
            observer.observe(target);
        }
    }

    fn set_play_state(&self, running: bool) {
        if let Some(root) = dom::root_element() {
            dom::set_style(&root, "--animation-play-state", if running { "running" } else { "paused" });
        }
    }
}

type DomAnimator = Animator<Element, DomSink, GlooSleeper>;

struct Tracker {
    animator: Rc<DomAnimator>,
    observer: ObserverSlot,
    tracked: Rc<RefCell<Vec<(Element, TrackId)>>>,
    config: AnimationConfig,
}

impl Tracker {
    fn start(config: AnimationConfig) -> Option<Self> {
        let observer: ObserverSlot = Rc::new(RefCell::new(None));
        let spawn: Spawner =
            Box::new(|fut: LocalBoxFuture<'static, ()>| wasm_bindgen_futures::spawn_local(fut));
        let animator = Animator::new(
            DomSink {
                observer: observer.clone(),
            },
            GlooSleeper,
            config.dispatch,
            spawn,
        );
        let tracked: Rc<RefCell<Vec<(Element, TrackId)>>> = Rc::new(RefCell::new(Vec::new()));

        let on_enter = {
            let animator = animator.clone();
            let tracked = tracked.clone();
            move |element: Element| {
                let id = tracked
                    .borrow()
                    .iter()
                    .find(|(el, _)| *el == element)
                    .map(|(_, id)| *id);
                if let Some(id) = id {
                    animator.intersected(id);
                }
            }
        };
        // without an observer the elements simply stay in their resting state
        let inner = Observer::new(&config.root_margin, config.threshold, on_enter)?;
        *observer.borrow_mut() = Some(inner);

        let tracker = Self {
            animator,
            observer,
            tracked,
            config,
        };
        tracker.scan();
        Some(tracker)
    }

    /// Picks up `[data-animate]` elements that are not tracked yet.
    fn scan(&self) {
        let Some(doc) = dom::document() else { return };
        let Ok(nodes) = doc.query_selector_all("[data-animate]") else {
            return;
        };
        let mut added = 0;
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            if self.tracked.borrow().iter().any(|(el, _)| *el == element) {
                continue;
            }
            let spec = AnimationSpec::from_attributes(
                element.get_attribute("data-animate").as_deref(),
                element.get_attribute("data-delay").as_deref(),
                element.get_attribute("data-duration").as_deref(),
                &self.config,
            );
            let id = self.animator.track(element.clone(), spec);
            if let Some(observer) = self.observer.borrow().as_ref() {
                observer.observe(&element);
            }
            self.tracked.borrow_mut().push((element, id));
            added += 1;
        }
        if added > 0 {
            log::debug!("Tracking {} animated elements", added);
        }
    }

    /// Layout changed: finished elements go back to waiting for the viewport.
    fn recalculate(&self) {
        let finished: Vec<TrackId> = self
            .tracked
            .borrow()
            .iter()
            .map(|(_, id)| *id)
            .filter(|id| self.animator.phase(*id) == Some(Phase::Done))
            .collect();
        if !finished.is_empty() {
            log::debug!("Re-arming {} animations after resize", finished.len());
        }
        for id in finished {
            self.animator.reset(id);
        }
    }

    fn stop(&self) {
        self.animator.clear();
        self.tracked.borrow_mut().clear();
        // the observer closure owns the animator; dropping it breaks the cycle
        self.observer.borrow_mut().take();
    }
}

fn update_scroll_effects() {
    let Some(window) = web_sys::window() else { return };
    let Some(doc) = window.document() else { return };
    let scroll_y = window.scroll_y().unwrap_or(0.0);

    if let Ok(layers) = doc.query_selector_all("[data-parallax]") {
        for i in 0..layers.length() {
            if let Some(el) = layers.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                let speed = parallax_speed(el.get_attribute("data-parallax").as_deref());
                dom::set_style(&el, "transform", &parallax_transform(scroll_y, speed));
            }
        }
    }

    if let Ok(bars) = doc.query_selector_all("[data-scroll-progress]") {
        let doc_height = doc
            .document_element()
            .map(|root| f64::from(root.scroll_height()))
            .unwrap_or(0.0);
        let (_, viewport_height) = dom::viewport_size();
        let percent = scroll_progress(scroll_y, doc_height, viewport_height);
        for i in 0..bars.length() {
            let Some(el) = bars.item(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let style = el
                .get_attribute("data-scroll-progress")
                .as_deref()
                .and_then(ProgressStyle::parse);
            if let Some(style) = style {
                let (property, value) = style.declaration(percent);
                dom::set_style(&el, property, &value);
            }
        }
    }
}

/// Drives `[data-animate]`, `[data-parallax]` and `[data-scroll-progress]`
/// for the whole page. Renders nothing.
#[function_component(ScrollAnimations)]
pub fn scroll_animations() -> Html {
    let shell = use_shell();
    let tracker = use_mut_ref(|| None::<Tracker>);

    {
        let tracker = tracker.clone();
        let config = shell.config.animation.clone();
        use_effect_with_deps(
            move |_| {
                *tracker.borrow_mut() = Tracker::start(config);
                if tracker.borrow().is_none() {
                    log::debug!("Scroll animations disabled");
                }

                let gate = Rc::new(RefCell::new(FrameGate::default()));
                let scroll = web_sys::window().and_then(|window| {
                    Listener::new(&window, "scroll", move |_| {
                        if !gate.borrow_mut().request() {
                            return;
                        }
                        let gate = gate.clone();
                        let frame = Closure::once_into_js(move || {
                            gate.borrow_mut().frame_ran();
                            update_scroll_effects();
                        });
                        if let Some(window) = web_sys::window() {
                            let _ = window.request_animation_frame(frame.unchecked_ref());
                        }
                    })
                });
                update_scroll_effects();

                move || {
                    drop(scroll);
                    if let Some(tracker) = tracker.borrow_mut().take() {
                        tracker.stop();
                    }
                }
            },
            (),
        );
    }

    {
        let tracker = tracker.clone();
        use_effect_with_deps(
            move |hidden| {
                if let Some(tracker) = tracker.borrow().as_ref() {
                    if *hidden {
                        tracker.animator.pause();
                    } else {
                        tracker.animator.resume();
                    }
                }
                || ()
            },
            shell.hidden,
        );
    }

    {
        let tracker = tracker.clone();
        let seen_viewport = use_mut_ref(|| false);
        let (width, height) = shell.viewport;
        use_effect_with_deps(
            move |_| {
                if let Some(tracker) = tracker.borrow().as_ref() {
                    if seen_viewport.replace(true) {
                        tracker.recalculate();
                    }
                    tracker.scan();
                }
                || ()
            },
            (width.to_bits(), height.to_bits()),
        );
    }

    html! {}
}
