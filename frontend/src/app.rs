use yew::prelude::*;

use crate::components::header::Header;
use crate::components::toast::ToastProvider;
use crate::config::AppConfig;
use crate::pages::{Page, PageProps};
use crate::services::api::ApiClient;

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: AppConfig,
}

/// Shared chrome plus the one page named by the document
#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let config = props.config.clone();
    let api_client = use_memo(config.api_base.clone(), |base| ApiClient::with_base_url(base.clone()));
    let refresh = use_state(|| 0u32);

    let page = config.page.as_deref().and_then(Page::from_identifier);
    if page.is_none() {
        log::warn!(target: "app", "no page controller for {:?}", config.page);
    }

    let on_refresh = {
        let refresh = refresh.clone();
        Callback::from(move |_: ()| refresh.set(refresh.wrapping_add(1)))
    };

    let content = match page {
        Some(page) => page.render(PageProps {
            api_client: (*api_client).clone(),
            refresh: *refresh,
        }),
        None => html! {},
    };

    html! {
        <ContextProvider<AppConfig> context={config.clone()}>
            <ToastProvider duration_ms={config.toast_ms}>
                <Header current_page={page} {on_refresh} />
                <main class="container">
                    {content}
                </main>
            </ToastProvider>
        </ContextProvider<AppConfig>>
    }
}
