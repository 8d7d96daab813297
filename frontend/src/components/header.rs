use yew::prelude::*;

use crate::pages::Page;
use crate::services::theme::{apply_theme, current_theme};

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub current_page: Option<Page>,
    pub on_refresh: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let theme = use_state(current_theme);

    // Apply once on mount so the document matches the stored choice
    use_effect_with((), {
        let theme = *theme;
        move |_| {
            apply_theme(theme);
            || ()
        }
    });

    let on_toggle_theme = {
        let theme = theme.clone();
        Callback::from(move |_: MouseEvent| {
            let next = theme.toggled();
            apply_theme(next);
            theme.set(next);
        })
    };

    let on_refresh = {
        let on_refresh = props.on_refresh.clone();
        Callback::from(move |_: MouseEvent| on_refresh.emit(()))
    };

    html! {
        <header class="header">
            <div class="container">
                <h1>{"Rabbit Tracker"}</h1>
                <nav class="nav">
                    {for Page::ALL.iter().map(|page| {
                        let class = if props.current_page == Some(*page) { "active" } else { "" };
                        html! { <a href={page.path()} {class}>{page.title()}</a> }
                    })}
                </nav>
                <div class="header-right">
                    if props.current_page.is_some() {
                        <button id="refreshBtn" class="secondary" onclick={on_refresh}>{"Refresh"}</button>
                    }
                    <button id="themeToggle" class="icon-button" title={theme.toggle_title()} onclick={on_toggle_theme}>
                        {theme.toggle_icon()}
                    </button>
                </div>
            </div>
        </header>
    }
}
