use yew::prelude::*;

use crate::components::lead_form::LeadForm;
use crate::components::navigation::Header;
use crate::components::scroll_animations::ScrollAnimations;
use crate::components::testimonials::Testimonials;
use crate::pages::faq::FaqSection;
use crate::utils::dom::Listener;

const DIM_DISTANCE: f64 = 600.0;
const DIM_MAX: f64 = 0.5;

fn hero_dim(scroll_y: f64) -> f64 {
    (scroll_y / DIM_DISTANCE).clamp(0.0, 1.0) * DIM_MAX
}

const PROGRAM: &[(&str, &str)] = &[
    ("Speaking clubs", "Weekly small-group conversations on topics you actually care about."),
    ("Personal lessons", "One-on-one sessions built around your goals and schedule."),
    ("Business English", "Meetings, presentations and negotiations without the panic."),
];

#[function_component(Landing)]
pub fn landing() -> Html {
    let dim_opacity = use_state(|| 0.0);

    // hero overlay darkens as the page scrolls away from it
    {
        let dim_opacity = dim_opacity.clone();
        use_effect_with_deps(
            move |_| {
                let listener = web_sys::window().and_then(|window| {
                    if let Ok(scroll_y) = window.scroll_y() {
                        dim_opacity.set(hero_dim(scroll_y));
                    }
                    let dim_opacity = dim_opacity.clone();
                    Listener::new(&window, "scroll", move |_| {
                        if let Some(scroll_y) = web_sys::window().and_then(|w| w.scroll_y().ok()) {
                            dim_opacity.set(hero_dim(scroll_y));
                        }
                    })
                });
                move || drop(listener)
            },
            (),
        );
    }

    let program = PROGRAM.iter().enumerate().map(|(i, (title, text))| {
        html! {
            <article class="program-card" data-animate="fadeInUp" data-delay={(i * 150).to_string()}>
                <h3>{*title}</h3>
                <p>{*text}</p>
            </article>
        }
    });

    html! {
        <>
            <div class="scroll-progress" aria-hidden="true">
                <div class="scroll-progress__bar" data-scroll-progress="width"></div>
            </div>
            <Header />
            <main id="top">
                <section id="hero" class="hero">
                    <div class="hero__background" data-parallax="0.4" aria-hidden="true"></div>
                    <div class="hero__dim" style={format!("opacity: {};", *dim_opacity)} aria-hidden="true"></div>
                    <div class="hero__content">
                        <h1 data-animate="fadeInUp">{"Speak English with confidence"}</h1>
                        <p data-animate="fadeIn" data-delay="200">
                            {"Live conversation practice with teachers who listen. Your first lesson is on us."}
                        </p>
                        <a class="btn btn-primary" href="#contact" data-animate="scaleIn" data-delay="400">
                            {"Book a free lesson"}
                        </a>
                    </div>
                </section>

                <section id="about" class="about">
                    <h2 data-animate="slideLeft">{"About KingSpeech"}</h2>
                    <p data-animate="slideRight" data-delay="100">
                        {"We are a small online school focused on one thing: getting you talking. \
                          No endless grammar drills, just real conversations with real feedback."}
                    </p>
                </section>

                <section id="program" class="program">
                    <h2 data-animate="fadeIn">{"Programs"}</h2>
                    <div class="program__grid">{ for program }</div>
                </section>

                <Testimonials />
                <FaqSection />

                <section id="contact" class="contact">
                    <h2 data-animate="fadeInUp">{"Book your trial lesson"}</h2>
                    <p data-animate="fadeIn" data-delay="100">
                        {"Leave your details and we will get back to you within a day."}
                    </p>
                    <LeadForm />
                </section>
            </main>
            <footer class="footer">
                <p>{"© KingSpeech"}</p>
            </footer>
            <ScrollAnimations />
        </>
    }
}

