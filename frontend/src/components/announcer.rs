use gloo_timers::callback::Timeout;
use yew::prelude::*;

pub struct Announcer {
    pub message: Option<AttrValue>,
    pub announce: Callback<String>,
}

/// Screen-reader announcements that clear themselves after `lifetime_ms`.
#[hook]
pub fn use_announcer(lifetime_ms: u32) -> Announcer {
    let message = use_state(|| None::<AttrValue>);
    let timer = use_mut_ref(|| None::<Timeout>);

    let announce = {
        let message = message.clone();
        Callback::from(move |text: String| {
            message.set(Some(text.into()));
            let message = message.clone();
            // replacing the handle cancels the previous clear
            *timer.borrow_mut() = Some(Timeout::new(lifetime_ms, move || message.set(None)));
        })
    };

    Announcer {
        message: (*message).clone(),
        announce,
    }
}

#[derive(Properties, PartialEq)]
pub struct LiveRegionProps {
    pub message: Option<AttrValue>,
}

#[function_component(LiveRegion)]
pub fn live_region(props: &LiveRegionProps) -> Html {
    html! {
        <div class="sr-only" aria-live="polite" aria-atomic="true">
            { props.message.as_deref().unwrap_or("") }
        </div>
    }
}
