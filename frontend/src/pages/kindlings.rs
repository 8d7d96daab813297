use async_trait::async_trait;
use shared::{Litter, LitterCreate, LitterUpdate, OptionItem};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, RowAction, TableRow};
use crate::components::form::{
    bind_input, bind_select, input_value, non_empty, parse_date, parse_int, parse_opt_date, parse_opt_int,
    selected_id,
};
use crate::components::modal::EditModal;
use crate::components::select::{populate_options, SelectField};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;

pub const LITTER_COLUMNS: [&str; 6] = [
    "litter_id",
    "breeding_id",
    "kindling_date",
    "born_alive",
    "born_dead",
    "weaned_count",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct KindlingsData {
    pub breeding_options: Vec<OptionItem>,
    pub litters: Vec<Litter>,
}

#[async_trait(?Send)]
impl PageState for KindlingsData {
    type Params = ();
    const TARGET: &'static str = "kindlings";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (breeding_options, litters) =
            futures::try_join!(api.breeding_options(), api.list_litters())?;
        Ok(Self {
            breeding_options,
            litters,
        })
    }
}

impl KindlingsData {
    pub fn litter_rows(&self, query: &str) -> Vec<TableRow> {
        table_rows(
            filter_rows(&self.litters, query, &LITTER_COLUMNS),
            &LITTER_COLUMNS,
            None,
        )
    }
}

/// Create form, as typed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LitterForm {
    pub breeding_id: String,
    pub kindling_date: String,
    pub born_alive: String,
    pub born_dead: String,
    pub weaned_count: String,
    pub notes: String,
}

impl LitterForm {
    /// A blank weaned count stays `null`; it is recorded later at weaning
    pub fn to_payload(&self) -> Result<LitterCreate, String> {
        let breeding_id = selected_id(&self.breeding_id).ok_or("Select a breeding")?;
        Ok(LitterCreate {
            breeding_id,
            kindling_date: parse_date("Kindling date", &self.kindling_date)?,
            born_alive: parse_int("Born alive", &self.born_alive)?,
            born_dead: parse_opt_int("Born dead", &self.born_dead)?.unwrap_or(0),
            weaned_count: parse_opt_int("Weaned count", &self.weaned_count)?,
            notes: non_empty(&self.notes),
        })
    }
}

/// Edit modal fields, copied from the row being edited
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LitterEdit {
    pub litter_id: i64,
    pub kindling_date: String,
    pub born_alive: String,
    pub born_dead: String,
    pub weaned_count: String,
    pub notes: String,
}

impl LitterEdit {
    pub fn from_litter(litter: &Litter) -> Self {
        Self {
            litter_id: litter.litter_id,
            kindling_date: litter.kindling_date.to_string(),
            born_alive: litter.born_alive.to_string(),
            born_dead: litter.born_dead.to_string(),
            weaned_count: litter.weaned_count.map(|v| v.to_string()).unwrap_or_default(),
            notes: litter.notes.clone().unwrap_or_default(),
        }
    }

    /// Blank fields are left out of the update; blank notes clear the notes
    pub fn to_update(&self) -> Result<LitterUpdate, String> {
        Ok(LitterUpdate {
            kindling_date: parse_opt_date("Kindling date", &self.kindling_date)?,
            born_alive: parse_opt_int("Born alive", &self.born_alive)?,
            born_dead: parse_opt_int("Born dead", &self.born_dead)?,
            weaned_count: parse_opt_int("Weaned count", &self.weaned_count)?,
            notes: non_empty(&self.notes),
        })
    }
}

pub async fn create_litter(api: &ApiClient, form: &LitterForm) -> Result<Litter, String> {
    let payload = form.to_payload()?;
    Ok(api.create_litter(&payload).await?)
}

pub async fn save_litter(api: &ApiClient, edit: &LitterEdit) -> Result<Litter, String> {
    let update = edit.to_update()?;
    Ok(api.update_litter(edit.litter_id, &update).await?)
}

#[function_component(KindlingsPage)]
pub fn kindlings_page(props: &PageProps) -> Html {
    let page = use_page_data::<KindlingsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(LitterForm::default);
    let query = use_state(String::new);
    let edit = use_state(LitterEdit::default);
    let modal_open = use_state(|| false);

    let empty = KindlingsData::default();
    let data = page.data.get().unwrap_or(&empty);

    let on_submit = {
        let api = props.api_client.clone();
        let form = form.clone();
        let toast = toast.clone();
        let reload = page.actions.reload.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let api = api.clone();
            let values = (*form).clone();
            let form = form.clone();
            let notify = toast.clone();
            let reload = reload.clone();
            spawn_action(
                async move { create_litter(&api, &values).await },
                toast.clone(),
                move |litter| {
                    notify.emit(Toast::ok(format!("Litter saved (ID {})", litter.litter_id)));
                    form.set(LitterForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_edit = {
        let litters = data.litters.clone();
        let edit = edit.clone();
        let modal_open = modal_open.clone();
        Callback::from(move |litter_id: i64| {
            if let Some(litter) = litters.iter().find(|l| l.litter_id == litter_id) {
                edit.set(LitterEdit::from_litter(litter));
                modal_open.set(true);
            }
        })
    };

    let on_close = {
        let modal_open = modal_open.clone();
        Callback::from(move |_: ()| modal_open.set(false))
    };

    let on_save = {
        let api = props.api_client.clone();
        let edit = edit.clone();
        let modal_open = modal_open.clone();
        let toast = toast.clone();
        let reload = page.actions.reload.clone();
        Callback::from(move |_: ()| {
            let api = api.clone();
            let values = (*edit).clone();
            let modal_open = modal_open.clone();
            let notify = toast.clone();
            let reload = reload.clone();
            spawn_action(
                async move { save_litter(&api, &values).await },
                toast.clone(),
                move |_| {
                    notify.emit(Toast::ok("Litter updated"));
                    modal_open.set(false);
                    reload.emit(());
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let headers: Vec<AttrValue> = ["ID", "Breeding", "Kindled", "Born alive", "Born dead", "Weaned"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page kindlings">
            <div class="card">
                <h2>{"Record a kindling"}</h2>
                <form id="litterForm" class="form-grid" onsubmit={on_submit}>
                    <label>{"Breeding"}
                        <SelectField name="breeding_id" id="breedingForLitter"
                            model={populate_options(&data.breeding_options, "Select breeding…", &form.breeding_id)}
                            onchange={bind_select(&form, |f, v| f.breeding_id = v)} />
                    </label>
                    <label>{"Kindling date"}
                        <input type="date" name="kindling_date" value={form.kindling_date.clone()}
                            oninput={bind_input(&form, |f, v| f.kindling_date = v)} />
                    </label>
                    <label>{"Born alive"}
                        <input type="number" min="0" name="born_alive" value={form.born_alive.clone()}
                            oninput={bind_input(&form, |f, v| f.born_alive = v)} />
                    </label>
                    <label>{"Born dead"}
                        <input type="number" min="0" name="born_dead" value={form.born_dead.clone()}
                            oninput={bind_input(&form, |f, v| f.born_dead = v)} />
                    </label>
                    <label>{"Weaned count"}
                        <input type="number" min="0" name="weaned_count" value={form.weaned_count.clone()}
                            oninput={bind_input(&form, |f, v| f.weaned_count = v)} />
                    </label>
                    <label class="wide">{"Notes"}
                        <textarea name="notes" value={form.notes.clone()}
                            oninput={bind_input(&form, |f, v| f.notes = v)} />
                    </label>
                    <button type="submit">{"Save litter"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Litters"}</h2>
                    <input id="litterFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                </div>
                <DataTable id="littersTable" {headers} rows={data.litter_rows(&query)}
                    action={RowAction {
                        label: "Edit".into(),
                        title: "Edit litter".into(),
                        class: "btn-edit".into(),
                        on_click: on_edit,
                    }} />
            </div>

            <EditModal is_open={*modal_open} title={format!("Edit litter L{}", edit.litter_id)} {on_close} {on_save}>
                <label>{"Kindling date"}
                    <input type="date" value={edit.kindling_date.clone()}
                        oninput={bind_input(&edit, |f, v| f.kindling_date = v)} />
                </label>
                <label>{"Born alive"}
                    <input type="number" min="0" value={edit.born_alive.clone()}
                        oninput={bind_input(&edit, |f, v| f.born_alive = v)} />
                </label>
                <label>{"Born dead"}
                    <input type="number" min="0" value={edit.born_dead.clone()}
                        oninput={bind_input(&edit, |f, v| f.born_dead = v)} />
                </label>
                <label>{"Weaned count"}
                    <input type="number" min="0" value={edit.weaned_count.clone()}
                        oninput={bind_input(&edit, |f, v| f.weaned_count = v)} />
                </label>
                <label>{"Notes"}
                    <textarea value={edit.notes.clone()}
                        oninput={bind_input(&edit, |f, v| f.notes = v)} />
                </label>
            </EditModal>
        </section>
    }
}
