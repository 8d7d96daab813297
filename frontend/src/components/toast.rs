//! Transient notifications. One toast is visible at a time; a newer toast
//! replaces the older one and restarts the hide timer.

use std::cell::Cell;
use std::rc::Rc;

use gloo::timers::future::TimeoutFuture;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

pub const DEFAULT_TOAST_MS: u32 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Ok,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Ok,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: ToastKind::Bad,
        }
    }

    pub fn class(&self) -> &'static str {
        match self.kind {
            ToastKind::Ok => "toast ok",
            ToastKind::Bad => "toast bad",
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProviderProps {
    #[prop_or(DEFAULT_TOAST_MS)]
    pub duration_ms: u32,
    #[prop_or_default]
    pub children: Html,
}

/// Renders the toast slot and provides a `Callback<Toast>` to everything below it
#[function_component(ToastProvider)]
pub fn toast_provider(props: &ToastProviderProps) -> Html {
    let current = use_state(|| Option::<Toast>::None);
    let shown: Rc<Cell<u64>> = use_memo((), |_| Cell::new(0));

    let notify = {
        let current = current.clone();
        let shown = shown.clone();
        use_callback(props.duration_ms, move |toast: Toast, duration_ms| {
            if toast.kind == ToastKind::Bad {
                log::warn!(target: "toast", "{}", toast.message);
            }
            let id = shown.get() + 1;
            shown.set(id);
            current.set(Some(toast));

            let current = current.clone();
            let shown = shown.clone();
            let duration_ms = *duration_ms;
            spawn_local(async move {
                TimeoutFuture::new(duration_ms).await;
                if shown.get() == id {
                    current.set(None);
                }
            });
        })
    };

    html! {
        <ContextProvider<Callback<Toast>> context={notify}>
            {props.children.clone()}
            {match &*current {
                Some(toast) => html! {
                    <div id="toast" class={toast.class()} role="status">{&toast.message}</div>
                },
                None => html! {},
            }}
        </ContextProvider<Callback<Toast>>>
    }
}

/// Callback that shows a toast; a no-op outside a `ToastProvider`
#[hook]
pub fn use_toast() -> Callback<Toast> {
    use_context::<Callback<Toast>>().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::ApiError;

    #[test]
    fn test_toast_classes() {
        assert_eq!(Toast::ok("Saved").class(), "toast ok");
        assert_eq!(Toast::error("Nope").class(), "toast bad");
    }

    #[test]
    fn test_error_toast_carries_api_detail() {
        let err = ApiError::Status {
            status: 400,
            message: "tattoo required".to_string(),
        };
        let toast = Toast::error(String::from(err));
        assert_eq!(toast.message, "tattoo required");
        assert_eq!(toast.kind, ToastKind::Bad);
    }
}
