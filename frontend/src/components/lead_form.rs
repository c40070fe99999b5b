use gloo_timers::callback::Timeout;
use kingspeech_widgets::forms::{self, BannerKind, FormController, SubmitOutcome};
use kingspeech_widgets::lead::LeadSubmitter;
use kingspeech_widgets::validation::{FieldSpec, FieldState, InputKind};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;

use crate::app::use_shell;
use crate::content::{trial_form_fields, LEVELS, TRIAL_FORM_ID};
use crate::utils::api::lead_client;
use crate::utils::dom;

fn event_value(event: &Event) -> Option<String> {
    let target = event.target()?;
    if let Some(input) = target.dyn_ref::<HtmlInputElement>() {
        return Some(input.value());
    }
    if let Some(select) = target.dyn_ref::<HtmlSelectElement>() {
        return Some(select.value());
    }
    target.dyn_ref::<HtmlTextAreaElement>().map(|area| area.value())
}

fn input_type(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Email => "email",
        InputKind::Tel => "tel",
        _ => "text",
    }
}

fn focus_field(form_id: &str, name: &str) {
    let selector = format!("#{} [name=\"{}\"]", form_id, name);
    let field = dom::document()
        .and_then(|doc| doc.query_selector(&selector).ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlElement>().ok());
    if let Some(field) = field {
        let _ = field.focus();
    }
}

#[derive(Properties, PartialEq)]
struct FieldProps {
    spec: FieldSpec,
    state: FieldState,
    disabled: bool,
    on_input: Callback<(String, String)>,
    on_blur: Callback<String>,
}

#[function_component(FormField)]
fn form_field(props: &FieldProps) -> Html {
    let name = props.spec.name.clone();
    let oninput = {
        let name = name.clone();
        props.on_input.reform(move |e: InputEvent| {
            let value = event_value(&e).unwrap_or_default();
            (name.clone(), value)
        })
    };
    let onchange = {
        let name = name.clone();
        props.on_input.reform(move |e: Event| {
            let value = event_value(&e).unwrap_or_default();
            (name.clone(), value)
        })
    };
    let onblur = {
        let name = name.clone();
        props.on_blur.reform(move |_: FocusEvent| name.clone())
    };

    let id = format!("{}-{}", TRIAL_FORM_ID, name);
    let error_id = format!("{}-error", id);
    let invalid = props.state.error.is_some();
    let class = classes!("form-field", invalid.then_some("form-field--error"));
    let described = invalid.then(|| error_id.clone());
    let value = props.state.value.clone();

    let control = match props.spec.kind {
        InputKind::Select => html! {
            <select
                id={id.clone()}
                name={name.clone()}
                disabled={props.disabled}
                aria-invalid={invalid.to_string()}
                aria-describedby={described.clone()}
                {onchange}
                {onblur}
            >
                <option value="" selected={value.is_empty()}>{"Not sure yet"}</option>
                { for LEVELS.iter().map(|level| html! {
                    <option value={*level} selected={value == *level}>{*level}</option>
                }) }
            </select>
        },
        InputKind::TextArea => html! {
            <textarea
                id={id.clone()}
                name={name.clone()}
                rows="4"
                maxlength={props.spec.max_length.map(|n| n.to_string())}
                disabled={props.disabled}
                aria-invalid={invalid.to_string()}
                aria-describedby={described.clone()}
                value={value}
                {oninput}
                {onblur}
            />
        },
        kind => html! {
            <input
                id={id.clone()}
                name={name.clone()}
                type={input_type(kind)}
                required={props.spec.required}
                disabled={props.disabled}
                aria-required={props.spec.required.to_string()}
                aria-invalid={invalid.to_string()}
                aria-describedby={described.clone()}
                value={value}
                {oninput}
                {onblur}
            />
        },
    };

    html! {
        <div {class}>
            <label for={id}>
                {props.spec.label.clone()}
                if props.spec.required {
                    <span class="form-field__required" aria-hidden="true">{" *"}</span>
                }
            </label>
            {control}
            if let Some(error) = props.state.error.clone() {
                <span id={error_id} class="form-error" role="alert">{error}</span>
            }
        </div>
    }
}

/// The trial-lesson request form. Submissions go to the lead webhook.
#[function_component(LeadForm)]
pub fn lead_form() -> Html {
    let shell = use_shell();
    let form = {
        let config = shell.config.form.clone();
        use_mut_ref(move || FormController::new(TRIAL_FORM_ID, trial_form_fields(), config))
    };
    let client = {
        let webhook = shell.config.webhook.clone();
        use_memo(move |_| lead_client(&webhook), ())
    };
    let sending = use_state(|| false);
    let banner_timer = use_mut_ref(|| None::<Timeout>);
    let refresh = use_force_update();

    {
        let client = client.clone();
        use_effect_with_deps(
            move |_| {
                spawn_local(async move {
                    if client.health_check().await {
                        log::debug!("Lead webhook reachable");
                    } else {
                        log::warn!("Lead webhook did not answer the health check");
                    }
                });
                || ()
            },
            (),
        );
    }

    let on_input = {
        let form = form.clone();
        let refresh = refresh.clone();
        Callback::from(move |(name, value): (String, String)| {
            form.borrow_mut().set_value(&name, &value);
            refresh.force_update();
        })
    };

    let on_blur = {
        let form = form.clone();
        let refresh = refresh.clone();
        Callback::from(move |name: String| {
            form.borrow_mut().blur(&name);
            refresh.force_update();
        })
    };

    let on_honeypot = {
        let form = form.clone();
        let field = shell.config.form.honeypot_field.clone();
        Callback::from(move |e: InputEvent| {
            let value = event_value(&e).unwrap_or_default();
            form.borrow_mut().set_value(&field, &value);
        })
    };

    let dismiss = {
        let form = form.clone();
        let banner_timer = banner_timer.clone();
        let refresh = refresh.clone();
        Callback::from(move |_: MouseEvent| {
            banner_timer.borrow_mut().take();
            form.borrow_mut().dismiss_banner();
            refresh.force_update();
        })
    };

    let onsubmit = {
        let form = form.clone();
        let client = client.clone();
        let sending = sending.clone();
        let refresh = refresh.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *sending {
                return;
            }
            sending.set(true);
            let form = form.clone();
            let client = client.clone();
            let sending = sending.clone();
            let banner_timer = banner_timer.clone();
            let refresh = refresh.clone();
            spawn_local(async move {
                let outcome =
                    forms::submit(&form, &*client, dom::page_meta(), chrono::Utc::now()).await;
                sending.set(false);
                match outcome {
                    SubmitOutcome::Invalid { first_invalid } => {
                        focus_field(TRIAL_FORM_ID, &first_invalid);
                    }
                    SubmitOutcome::Busy => log::debug!("Submission already in flight"),
                    SubmitOutcome::Sent | SubmitOutcome::Failed => {
                        if outcome == SubmitOutcome::Failed {
                            gloo_console::error!("Trial lesson request could not be delivered");
                        }
                        let dismiss_after = form.borrow().banner().map(|b| b.dismiss_after_ms);
                        if let Some(ms) = dismiss_after {
                            let form = form.clone();
                            let refresh = refresh.clone();
                            *banner_timer.borrow_mut() = Some(Timeout::new(ms, move || {
                                form.borrow_mut().dismiss_banner();
                                refresh.force_update();
                            }));
                        }
                    }
                }
                refresh.force_update();
            });
        })
    };

    let controller = form.borrow();
    let busy = *sending || controller.is_loading();
    let progress = controller.progress();
    let fields = controller.fields().map(|(spec, state)| {
        html! {
            <FormField
                key={spec.name.clone()}
                spec={spec.clone()}
                state={state.clone()}
                disabled={busy}
                on_input={on_input.clone()}
                on_blur={on_blur.clone()}
            />
        }
    });
    let banner = controller.banner().map(|banner| {
        let class = match banner.kind {
            BannerKind::Success => "form-banner form-banner--success",
            BannerKind::Error => "form-banner form-banner--error",
        };
        html! {
            <div {class} role="status">
                <span>{banner.message.clone()}</span>
                <button type="button" class="form-banner__close" aria-label="Dismiss" onclick={dismiss.clone()}>{"×"}</button>
            </div>
        }
    });

    html! {
        <form id={TRIAL_FORM_ID} class="lead-form" novalidate=true {onsubmit}>
            <div class="form-progress" aria-hidden="true">
                <div class="form-progress__bar" style={format!("width: {}%;", progress.percent)}></div>
            </div>
            <p class={classes!("form-progress__hint", progress.is_complete().then_some("form-progress__hint--done"))}>
                {progress.hint.clone()}
            </p>
            { for fields }
            <div class="form-honeypot" aria-hidden="true">
                <input
                    type="text"
                    name={shell.config.form.honeypot_field.clone()}
                    tabindex="-1"
                    autocomplete="off"
                    oninput={on_honeypot}
                />
            </div>
            { for banner }
            <button
                type="submit"
                class={classes!("btn", "btn-primary", busy.then_some("btn--loading"))}
                disabled={busy || !controller.can_submit()}
                aria-busy={busy.to_string()}
            >
                { if busy { "Sending..." } else { "Book a free lesson" } }
            </button>
        </form>
    }
}
