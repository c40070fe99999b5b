use gloo_timers::callback::Timeout;
use kingspeech_widgets::faq::Accordion;
use yew::prelude::*;

use crate::content::FAQ;
use crate::utils::dom::{self, Listener};

/// Opens the question named by the URL hash and scrolls it into view once
/// the answer has expanded.
fn open_from_location(accordion: &mut Accordion) -> bool {
    let hash = dom::location_hash();
    let Some(index) = accordion.open_from_hash(&hash) else {
        return false;
    };
    let anchor = Accordion::anchor(index);
    Timeout::new(100, move || {
        if let Some(item) = dom::document().and_then(|doc| doc.get_element_by_id(&anchor)) {
            item.scroll_into_view_with_bool(true);
        }
    })
    .forget();
    true
}

#[function_component(FaqSection)]
pub fn faq_section() -> Html {
    let accordion = use_mut_ref(|| Accordion::new(FAQ.len()));
    let refresh = use_force_update();

    {
        let accordion = accordion.clone();
        let refresh = refresh.clone();
        use_effect_with_deps(
            move |_| {
                if open_from_location(&mut accordion.borrow_mut()) {
                    refresh.force_update();
                }
                let listener = web_sys::window().and_then(|window| {
                    Listener::new(&window, "hashchange", move |_| {
                        if open_from_location(&mut accordion.borrow_mut()) {
                            refresh.force_update();
                        }
                    })
                });
                move || drop(listener)
            },
            (),
        );
    }

    let items = FAQ.iter().enumerate().map(|(i, entry)| {
        let is_open = accordion.borrow().is_open(i);
        let toggle = {
            let accordion = accordion.clone();
            let refresh = refresh.clone();
            Callback::from(move |e: MouseEvent| {
                e.prevent_default();
                accordion.borrow_mut().toggle(i);
                refresh.force_update();
            })
        };
        let anchor = Accordion::anchor(i);
        let answer_id = format!("{}-answer", anchor);
        html! {
            <div id={anchor} class={classes!("faq", is_open.then_some("open"))}>
                <button
                    class="faq__question"
                    aria-expanded={is_open.to_string()}
                    aria-controls={answer_id.clone()}
                    onclick={toggle}
                >
                    <span class="question-text">{entry.question}</span>
                    <span class="toggle-icon" aria-hidden="true">{if is_open { "−" } else { "+" }}</span>
                </button>
                <div id={answer_id} class="faq__answer" hidden={!is_open}>
                    <p>{entry.answer}</p>
                </div>
            </div>
        }
    });

    html! {
        <section id="faq" class="faq-section" data-animate="fadeIn">
            <h2>{"Frequently asked questions"}</h2>
            { for items }
        </section>
    }
}
