mod app;
mod components;
mod config;
mod content;
mod pages;
mod utils;

fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("KingSpeech landing starting");
    yew::Renderer::<app::App>::new().render();
}
