use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use kingspeech_widgets::carousel::{AutoplayCommand, Carousel, Key, PauseReason, Rejected, SlideChange, TouchPoint};
use kingspeech_widgets::modal::{focus_trap_target, Modal};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, KeyboardEvent, TouchEvent};
use yew::prelude::*;

use crate::app::use_shell;
use crate::components::announcer::{use_announcer, LiveRegion};
use crate::content::TESTIMONIALS;
use crate::utils::dom::{self, Listener};

const FOCUSABLE: &str = "button, [href], input, select, textarea, [tabindex]:not([tabindex=\"-1\"])";

fn focusable_children(container: &Element) -> Vec<Element> {
    let Ok(nodes) = container.query_selector_all(FOCUSABLE) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()))
        .collect()
}

fn touch_point(event: &TouchEvent) -> Option<TouchPoint> {
    let touch = event.changed_touches().get(0)?;
    Some(TouchPoint {
        x: f64::from(touch.client_x()),
        y: f64::from(touch.client_y()),
    })
}

/// Fully inside the viewport, the only time arrow keys drive the carousel.
fn fully_visible(node: &NodeRef) -> bool {
    let Some(el) = node.cast::<HtmlElement>() else {
        return false;
    };
    let (width, height) = dom::viewport_size();
    let rect = el.get_bounding_client_rect();
    rect.top() >= 0.0 && rect.left() >= 0.0 && rect.bottom() <= height && rect.right() <= width
}

#[function_component(Testimonials)]
pub fn testimonials() -> Html {
    let shell = use_shell();
    let carousel = use_mut_ref(|| Carousel::new(TESTIMONIALS.len(), shell.config.carousel.clone()));
    let autoplay = use_mut_ref(|| None::<Interval>);
    let cooldown = use_mut_ref(|| None::<Timeout>);
    let touch_start = use_mut_ref(|| None::<TouchPoint>);
    let modal = use_mut_ref(|| Modal::new(TESTIMONIALS.len()));
    let dialog_index = use_state(|| None::<usize>);
    let refresh = use_force_update();
    let announcer = use_announcer(shell.config.carousel.announcement_ms);
    let root_ref = use_node_ref();

    let on_change: Rc<dyn Fn(Result<SlideChange, Rejected>)> = {
        let carousel = carousel.clone();
        let cooldown = cooldown.clone();
        let refresh = refresh.clone();
        let announce = announcer.announce.clone();
        Rc::new(move |result: Result<SlideChange, Rejected>| match result {
            Ok(change) => {
                let carousel = carousel.clone();
                *cooldown.borrow_mut() = Some(Timeout::new(change.cooldown_ms, move || {
                    carousel.borrow_mut().finish_transition();
                }));
                let quote = TESTIMONIALS.get(change.current).map(|t| t.short).unwrap_or("");
                announce.emit(format!("{} {}", change.announcement, quote));
                refresh.force_update();
            }
            Err(rejected) => log::debug!("Slide change rejected: {:?}", rejected),
        })
    };

    let run_autoplay: Rc<dyn Fn(Option<AutoplayCommand>)> = {
        let carousel = carousel.clone();
        let on_change = on_change.clone();
        Rc::new(move |command: Option<AutoplayCommand>| match command {
            Some(AutoplayCommand::Start { interval_ms }) => {
                let carousel = carousel.clone();
                let on_change = on_change.clone();
                *autoplay.borrow_mut() = Some(Interval::new(interval_ms, move || {
                    let result = carousel.borrow_mut().next();
                    on_change(result);
                }));
            }
            Some(AutoplayCommand::Stop) => {
                autoplay.borrow_mut().take();
            }
            None => {}
        })
    };

    {
        let carousel = carousel.clone();
        let run_autoplay = run_autoplay.clone();
        let on_change = on_change.clone();
        let root_ref = root_ref.clone();
        let modal = modal.clone();
        use_effect_with_deps(
            move |_| {
                let command = carousel.borrow_mut().start_autoplay();
                run_autoplay(command);

                let keys = dom::document().and_then(|doc| {
                    let carousel = carousel.clone();
                    Listener::new(&doc, "keydown", move |event| {
                        let Some(key) = event
                            .dyn_ref::<KeyboardEvent>()
                            .and_then(|e| Key::from_key_name(&e.key()))
                        else {
                            return;
                        };
                        // the dialog owns the keyboard while it is open
                        if modal.borrow().is_open() || !fully_visible(&root_ref) {
                            return;
                        }
                        event.prevent_default();
                        let result = carousel.borrow_mut().key(key);
                        on_change(result);
                    })
                });

                move || {
                    drop(keys);
                    let command = carousel.borrow_mut().stop();
                    run_autoplay(command);
                }
            },
            (),
        );
    }

    {
        let carousel = carousel.clone();
        let run_autoplay = run_autoplay.clone();
        use_effect_with_deps(
            move |hidden| {
                let command = if *hidden {
                    carousel.borrow_mut().pause_autoplay(PauseReason::Hidden)
                } else {
                    carousel.borrow_mut().resume_autoplay(PauseReason::Hidden)
                };
                run_autoplay(command);
                || ()
            },
            shell.hidden,
        );
    }

    let step = |delta: isize| {
        let carousel = carousel.clone();
        let on_change = on_change.clone();
        Callback::from(move |_: MouseEvent| {
            let result = if delta < 0 {
                carousel.borrow_mut().previous()
            } else {
                carousel.borrow_mut().next()
            };
            on_change(result);
        })
    };

    let hover = |pause: bool| {
        let carousel = carousel.clone();
        let run_autoplay = run_autoplay.clone();
        Callback::from(move |_: MouseEvent| {
            let command = if pause {
                carousel.borrow_mut().pause_autoplay(PauseReason::Hover)
            } else {
                carousel.borrow_mut().resume_autoplay(PauseReason::Hover)
            };
            run_autoplay(command);
        })
    };

    let ontouchstart = {
        let touch_start = touch_start.clone();
        Callback::from(move |e: TouchEvent| {
            *touch_start.borrow_mut() = touch_point(&e);
        })
    };

    let ontouchend = {
        let carousel = carousel.clone();
        let on_change = on_change.clone();
        Callback::from(move |e: TouchEvent| {
            let (Some(start), Some(end)) = (touch_start.borrow_mut().take(), touch_point(&e)) else {
                return;
            };
            let swiped = carousel.borrow_mut().swipe(start, end);
            if let Some(result) = swiped {
                on_change(result);
            }
        })
    };

    let open_dialog = {
        let modal = modal.clone();
        let dialog_index = dialog_index.clone();
        let page = shell.page.clone();
        Callback::from(move |index: isize| {
            let shown = modal.borrow_mut().open_at(index, &page);
            dialog_index.set(shown);
        })
    };

    let navigate_dialog = {
        let modal = modal.clone();
        let dialog_index = dialog_index.clone();
        let page = shell.page.clone();
        Callback::from(move |delta: isize| {
            let shown = modal.borrow_mut().navigate(delta, &page);
            dialog_index.set(shown);
        })
    };

    let close_dialog = {
        let modal = modal.clone();
        let dialog_index = dialog_index.clone();
        Callback::from(move |cause: CloseCause| {
            let mut modal = modal.borrow_mut();
            let closed = match cause {
                CloseCause::Escape => modal.key("Escape"),
                CloseCause::Backdrop => modal.backdrop_click(),
                CloseCause::Button => modal.close(),
            };
            if closed {
                dialog_index.set(None);
            }
        })
    };

    let current = carousel.borrow().current();
    let slides = TESTIMONIALS.iter().enumerate().map(|(i, t)| {
        let onclick = {
            let open_dialog = open_dialog.clone();
            Callback::from(move |e: MouseEvent| {
                e.prevent_default();
                open_dialog.emit(i as isize);
            })
        };
        let onkeydown = {
            let open_dialog = open_dialog.clone();
            Callback::from(move |e: KeyboardEvent| {
                if e.key() == "Enter" || e.key() == " " {
                    e.prevent_default();
                    open_dialog.emit(i as isize);
                }
            })
        };
        html! {
            <article
                class={classes!("testimonial", (i == current).then_some("active"))}
                tabindex="0"
                aria-roledescription="slide"
                aria-label={format!("{} of {}", i + 1, TESTIMONIALS.len())}
                {onclick}
                {onkeydown}
            >
                <p class="testimonial-quote">{t.short}</p>
                <p class="testimonial-name">{t.name}</p>
                <p class="testimonial-role">{t.role}</p>
            </article>
        }
    });

    let indicators = (0..TESTIMONIALS.len()).map(|i| {
        let active = carousel.borrow().indicator_active(i);
        let onclick = {
            let carousel = carousel.clone();
            let on_change = on_change.clone();
            Callback::from(move |_: MouseEvent| {
                let result = carousel.borrow_mut().go_to(i);
                on_change(result);
            })
        };
        html! {
            <button
                type="button"
                class={classes!("carousel-indicator", active.then_some("carousel-indicator--active"))}
                aria-label={format!("Go to slide {}", i + 1)}
                aria-current={active.then_some("true")}
                {onclick}
            />
        }
    });

    let track_style = format!("transform: translateX(-{}%);", current * 100);

    html! {
        <section id="testimonials" class="testimonials" data-animate="fadeInUp">
            <h2>{"What our students say"}</h2>
            <div
                class="carousel"
                ref={root_ref}
                aria-roledescription="carousel"
                onmouseenter={hover(true)}
                onmouseleave={hover(false)}
                {ontouchstart}
                {ontouchend}
            >
                <div class="carousel__track" style={track_style}>
                    { for slides }
                </div>
                <button type="button" class="carousel__prev" aria-label="Previous slide" onclick={step(-1)}>{"‹"}</button>
                <button type="button" class="carousel__next" aria-label="Next slide" onclick={step(1)}>{"›"}</button>
                <div class="carousel__indicators">{ for indicators }</div>
            </div>
            <LiveRegion message={announcer.message.clone()} />
            if let Some(index) = *dialog_index {
                <TestimonialDialog
                    {index}
                    on_navigate={navigate_dialog}
                    on_close={close_dialog}
                />
            }
        </section>
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CloseCause {
    Escape,
    Backdrop,
    Button,
}

#[derive(Properties, PartialEq)]
pub struct TestimonialDialogProps {
    pub index: usize,
    pub on_navigate: Callback<isize>,
    pub on_close: Callback<CloseCause>,
}

#[function_component(TestimonialDialog)]
pub fn testimonial_dialog(props: &TestimonialDialogProps) -> Html {
    let dialog_ref = use_node_ref();

    // focus goes back to whatever opened the dialog
    use_effect_with_deps(
        |_| {
            let opener = dom::document()
                .and_then(|doc| doc.active_element())
                .and_then(|el| el.dyn_into::<HtmlElement>().ok());
            move || {
                if let Some(opener) = opener {
                    let _ = opener.focus();
                }
            }
        },
        (),
    );

    {
        let dialog_ref = dialog_ref.clone();
        use_effect_with_deps(
            move |_| {
                if let Some(dialog) = dialog_ref.cast::<HtmlElement>() {
                    let _ = dialog.focus();
                }
                || ()
            },
            props.index,
        );
    }

    {
        let on_close = props.on_close.clone();
        use_effect_with_deps(
            move |_| {
                let escape = dom::document().and_then(|doc| {
                    Listener::new(&doc, "keydown", move |event| {
                        let is_escape = event
                            .dyn_ref::<KeyboardEvent>()
                            .map(|e| e.key() == "Escape")
                            .unwrap_or(false);
                        if is_escape {
                            on_close.emit(CloseCause::Escape);
                        }
                    })
                });
                move || drop(escape)
            },
            (),
        );
    }

    let Some(testimonial) = TESTIMONIALS.get(props.index) else {
        return html! {};
    };
    let backdrop = props.on_close.reform(|_: MouseEvent| CloseCause::Backdrop);
    let close = props.on_close.reform(|_: MouseEvent| CloseCause::Button);
    let trap_focus = {
        let dialog_ref = dialog_ref.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() != "Tab" {
                return;
            }
            let Some(dialog) = dialog_ref.cast::<Element>() else {
                return;
            };
            let focusable = focusable_children(&dialog);
            let active = dom::document().and_then(|doc| doc.active_element());
            let current = active.and_then(|active| focusable.iter().position(|el| *el == active));
            if let Some(target) = focus_trap_target(focusable.len(), current, e.shift_key()) {
                e.prevent_default();
                if let Some(el) = focusable[target].dyn_ref::<HtmlElement>() {
                    let _ = el.focus();
                }
            }
        })
    };
    let prev = props.on_navigate.reform(|_: MouseEvent| -1);
    let next = props.on_navigate.reform(|_: MouseEvent| 1);

    html! {
        <div class="modal" id="reviewModal" aria-hidden="false">
            <div class="modal__backdrop" onclick={backdrop}></div>
            <div
                class="modal__dialog"
                role="dialog"
                aria-modal="true"
                aria-labelledby="reviewTitle"
                tabindex="-1"
                ref={dialog_ref}
                onkeydown={trap_focus}
            >
                <button type="button" class="modal__close" aria-label="Close" onclick={close}>{"×"}</button>
                <h3 id="reviewTitle">{testimonial.name}</h3>
                <blockquote class="modal__quote">{testimonial.full_text()}</blockquote>
                <button type="button" class="modal__prev" aria-label="Previous review" onclick={prev}>{"‹"}</button>
                <button type="button" class="modal__next" aria-label="Next review" onclick={next}>{"›"}</button>
            </div>
        </div>
    }
}
