use async_trait::async_trait;
use shared::{Harvest, HarvestCreate, HarvestUpdate, OptionItem};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, RowAction, TableRow};
use crate::components::form::{
    bind_input, bind_select, input_value, non_empty, parse_date, parse_opt_date, parse_opt_int, selected_id,
};
use crate::components::modal::EditModal;
use crate::components::select::{populate_options, SelectField};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;

pub const HARVEST_COLUMNS: [&str; 5] = [
    "harvest_id",
    "animal_id",
    "harvest_date",
    "live_weight_grams",
    "carcass_weight_grams",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestsData {
    /// Growouts that can still be harvested
    pub animal_options: Vec<OptionItem>,
    pub harvests: Vec<Harvest>,
}

#[async_trait(?Send)]
impl PageState for HarvestsData {
    type Params = ();
    const TARGET: &'static str = "harvests";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (animal_options, harvests) =
            futures::try_join!(api.animal_options(Some("growout")), api.list_harvests())?;
        Ok(Self {
            animal_options,
            harvests,
        })
    }
}

impl HarvestsData {
    pub fn harvest_rows(&self, query: &str) -> Vec<TableRow> {
        table_rows(
            filter_rows(&self.harvests, query, &HARVEST_COLUMNS),
            &HARVEST_COLUMNS,
            None,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestForm {
    pub animal_id: String,
    pub harvest_date: String,
    pub live_weight_grams: String,
    pub carcass_weight_grams: String,
    pub notes: String,
}

impl HarvestForm {
    pub fn to_payload(&self) -> Result<HarvestCreate, String> {
        let animal_id = selected_id(&self.animal_id).ok_or("Select an animal")?;
        Ok(HarvestCreate {
            animal_id,
            harvest_date: parse_date("Harvest date", &self.harvest_date)?,
            live_weight_grams: parse_opt_int("Live weight", &self.live_weight_grams)?,
            carcass_weight_grams: parse_opt_int("Carcass weight", &self.carcass_weight_grams)?,
            notes: non_empty(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarvestEdit {
    pub harvest_id: i64,
    pub harvest_date: String,
    pub live_weight_grams: String,
    pub carcass_weight_grams: String,
    pub notes: String,
}

impl HarvestEdit {
    pub fn from_harvest(harvest: &Harvest) -> Self {
        let text = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
        Self {
            harvest_id: harvest.harvest_id,
            harvest_date: harvest.harvest_date.to_string(),
            live_weight_grams: text(harvest.live_weight_grams),
            carcass_weight_grams: text(harvest.carcass_weight_grams),
            notes: harvest.notes.clone().unwrap_or_default(),
        }
    }

    pub fn to_update(&self) -> Result<HarvestUpdate, String> {
        Ok(HarvestUpdate {
            harvest_date: parse_opt_date("Harvest date", &self.harvest_date)?,
            live_weight_grams: parse_opt_int("Live weight", &self.live_weight_grams)?,
            carcass_weight_grams: parse_opt_int("Carcass weight", &self.carcass_weight_grams)?,
            notes: non_empty(&self.notes),
        })
    }
}

pub async fn create_harvest(api: &ApiClient, form: &HarvestForm) -> Result<Harvest, String> {
    let payload = form.to_payload()?;
    Ok(api.create_harvest(&payload).await?)
}

pub async fn save_harvest(api: &ApiClient, edit: &HarvestEdit) -> Result<Harvest, String> {
    let update = edit.to_update()?;
    Ok(api.update_harvest(edit.harvest_id, &update).await?)
}

#[function_component(HarvestsPage)]
pub fn harvests_page(props: &PageProps) -> Html {
    let page = use_page_data::<HarvestsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(HarvestForm::default);
    let query = use_state(String::new);
    let edit = use_state(HarvestEdit::default);
    let modal_open = use_state(|| false);

    let empty = HarvestsData::default();
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
                async move { create_harvest(&api, &values).await },
                toast.clone(),
                move |harvest| {
                    notify.emit(Toast::ok(format!("Harvest saved (ID {})", harvest.harvest_id)));
                    form.set(HarvestForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_edit = {
        let harvests = data.harvests.clone();
        let edit = edit.clone();
        let modal_open = modal_open.clone();
        Callback::from(move |harvest_id: i64| {
            if let Some(harvest) = harvests.iter().find(|h| h.harvest_id == harvest_id) {
                edit.set(HarvestEdit::from_harvest(harvest));
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
                async move { save_harvest(&api, &values).await },
                toast.clone(),
                move |_| {
                    notify.emit(Toast::ok("Harvest updated"));
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

    let headers: Vec<AttrValue> = ["ID", "Animal", "Date", "Live (g)", "Carcass (g)"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page harvests">
            <div class="card">
                <h2>{"Record a harvest"}</h2>
                <form id="harvestForm" class="form-grid" onsubmit={on_submit}>
                    <label>{"Animal"}
                        <SelectField name="animal_id" id="animalForHarvest"
                            model={populate_options(&data.animal_options, "Select animal…", &form.animal_id)}
                            onchange={bind_select(&form, |f, v| f.animal_id = v)} />
                    </label>
                    <label>{"Harvest date"}
                        <input type="date" name="harvest_date" value={form.harvest_date.clone()}
                            oninput={bind_input(&form, |f, v| f.harvest_date = v)} />
                    </label>
                    <label>{"Live weight (g)"}
                        <input type="number" min="0" name="live_weight_grams" value={form.live_weight_grams.clone()}
                            oninput={bind_input(&form, |f, v| f.live_weight_grams = v)} />
                    </label>
                    <label>{"Carcass weight (g)"}
                        <input type="number" min="0" name="carcass_weight_grams" value={form.carcass_weight_grams.clone()}
                            oninput={bind_input(&form, |f, v| f.carcass_weight_grams = v)} />
                    </label>
                    <label class="wide">{"Notes"}
                        <textarea name="notes" value={form.notes.clone()}
                            oninput={bind_input(&form, |f, v| f.notes = v)} />
                    </label>
                    <button type="submit">{"Save harvest"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Harvests"}</h2>
                    <input id="harvestFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                </div>
                <DataTable id="harvestsTable" {headers} rows={data.harvest_rows(&query)}
                    action={RowAction {
                        label: "Edit".into(),
                        title: "Edit harvest".into(),
                        class: "btn-edit".into(),
                        on_click: on_edit,
                    }} />
            </div>

            <EditModal is_open={*modal_open} title={format!("Edit harvest #{}", edit.harvest_id)} {on_close} {on_save}>
                <label>{"Harvest date"}
                    <input type="date" value={edit.harvest_date.clone()}
                        oninput={bind_input(&edit, |f, v| f.harvest_date = v)} />
                </label>
                <label>{"Live weight (g)"}
                    <input type="number" min="0" value={edit.live_weight_grams.clone()}
                        oninput={bind_input(&edit, |f, v| f.live_weight_grams = v)} />
                </label>
                <label>{"Carcass weight (g)"}
                    <input type="number" min="0" value={edit.carcass_weight_grams.clone()}
                        oninput={bind_input(&edit, |f, v| f.carcass_weight_grams = v)} />
                </label>
                <label>{"Notes"}
                    <textarea value={edit.notes.clone()}
                        oninput={bind_input(&edit, |f, v| f.notes = v)} />
                </label>
            </EditModal>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::HttpMethod;
    use crate::services::testing::MockTransport;
    use futures::executor::block_on;
    use serde_json::json;

    fn harvest() -> Harvest {
        serde_json::from_value(json!({
            "harvest_id": 4,
            "animal_id": 21,
            "harvest_date": "2024-07-10",
            "live_weight_grams": 2400,
            "carcass_weight_grams": 1300,
            "notes": "clean"
        }))
        .unwrap()
    }

    #[test]
    fn test_load_asks_for_growout_options() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Get, "/options/animals?status=growout", 200, json!([{"id": 21, "label": "G21"}]));
        mock.respond(HttpMethod::Get, "/harvests/", 200, json!([serde_json::to_value(harvest()).unwrap()]));
        let api = mock.client();

        let data = block_on(HarvestsData::load(&api, &())).unwrap();
        assert_eq!(data.animal_options.len(), 1);
        assert_eq!(data.harvest_rows("")[0].cells, vec!["4", "21", "2024-07-10", "2400", "1300"]);
        assert!(data.harvest_rows("2399").is_empty());
    }

    #[test]
    fn test_create_requires_animal() {
        let form = HarvestForm {
            harvest_date: "2024-07-10".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(), Err("Select an animal".to_string()));
    }

    #[test]
    fn test_create_sends_null_weights_when_blank() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Post, "/harvests/", 201, serde_json::to_value(harvest()).unwrap());
        let api = mock.client();
        let form = HarvestForm {
            animal_id: "21".to_string(),
            harvest_date: "2024-07-10".to_string(),
            ..Default::default()
        };

        block_on(create_harvest(&api, &form)).unwrap();
        assert_eq!(
            mock.bodies(HttpMethod::Post, "/harvests/"),
            vec![json!({
                "animal_id": 21,
                "harvest_date": "2024-07-10",
                "live_weight_grams": null,
                "carcass_weight_grams": null,
                "notes": null
            })]
        );
    }

    #[test]
    fn test_edit_payload_keeps_only_filled_fields() {
        let mut edit = HarvestEdit::from_harvest(&harvest());
        edit.carcass_weight_grams.clear();
        edit.notes = "  ".to_string();
        edit.live_weight_grams = "2500".to_string();

        let body = serde_json::to_value(edit.to_update().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({"harvest_date": "2024-07-10", "live_weight_grams": 2500, "notes": null})
        );
    }
}
