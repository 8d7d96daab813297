use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct EditModalProps {
    pub is_open: bool,
    pub title: AttrValue,
    pub on_close: Callback<()>,
    pub on_save: Callback<()>,
    #[prop_or_default]
    pub saving: bool,
    #[prop_or_default]
    pub children: Html,
}

/// Edit dialog shell. Escape, the backdrop and the Cancel button close it;
/// submitting the form saves.
#[function_component(EditModal)]
pub fn edit_modal(props: &EditModalProps) -> Html {
    // The keydown listener lives only while the modal is open
    use_effect_with((props.is_open, props.on_close.clone()), |(is_open, on_close)| {
        let listener = is_open.then(|| {
            let on_close = on_close.clone();
            EventListener::new(&gloo::utils::document(), "keydown", move |event| {
                if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                    if key.key() == "Escape" {
                        on_close.emit(());
                    }
                }
            })
        });
        move || drop(listener)
    });

    if !props.is_open {
        return html! {};
    }

    let on_backdrop = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_cancel = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_submit = {
        let on_save = props.on_save.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_save.emit(());
        })
    };

    html! {
        <div class="modal-backdrop" onclick={on_backdrop}>
            <div class="modal" role="dialog" aria-modal="true"
                onclick={Callback::from(|e: MouseEvent| e.stop_propagation())}>
                <h3>{props.title.clone()}</h3>
                <form class="modal-form" onsubmit={on_submit}>
                    {props.children.clone()}
                    <div class="modal-actions">
                        <button type="button" class="secondary" onclick={on_cancel}>{"Cancel"}</button>
                        <button type="submit" disabled={props.saving}>
                            {if props.saving { "Saving..." } else { "Save" }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}
