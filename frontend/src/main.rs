mod app;
mod components;
mod config;
mod hooks;
mod pages;
mod services;

use app::{App, AppProps};
use config::AppConfig;

fn main() {
    let config = AppConfig::from_document();
    services::logging::init(config.log_level);
    log::info!(target: "app", "starting page {:?}", config.page);

    yew::Renderer::<App>::with_props(AppProps { config }).render();
}
