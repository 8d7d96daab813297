use std::collections::HashMap;

use async_trait::async_trait;
use shared::{Animal, Breeding, BreedingCreate, BreedingUpdate, OptionItem, Sex};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, TableRow};
use crate::components::form::{bind_input, bind_select, input_value, non_empty, parse_date, selected_id};
use crate::components::select::{options_by_sex, populate_options, SelectField, SelectModel, SelectOption};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;

pub const BREEDING_COLUMNS: [&str; 7] = [
    "breeding_id",
    "doe_id",
    "buck_id",
    "bred_date",
    "expected_kindling",
    "result",
    "notes",
];

/// Outcomes the API accepts for a breeding
pub const RESULTS: [&str; 3] = ["pending", "successful", "missed"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreedingsData {
    pub animals: Vec<Animal>,
    pub breedings: Vec<Breeding>,
}

#[async_trait(?Send)]
impl PageState for BreedingsData {
    type Params = ();
    const TARGET: &'static str = "breedings";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (animals, breedings) = futures::try_join!(api.list_animals(), api.list_breedings())?;
        Ok(Self { animals, breedings })
    }
}

impl BreedingsData {
    pub fn does(&self) -> Vec<OptionItem> {
        options_by_sex(&self.animals, Sex::F)
    }

    pub fn bucks(&self) -> Vec<OptionItem> {
        options_by_sex(&self.animals, Sex::M)
    }

    /// `#id DOE x BUCK (date) — result`, with raw ids for animals not loaded
    pub fn breeding_choices(&self) -> Vec<OptionItem> {
        let tattoos: HashMap<i64, &str> = self
            .animals
            .iter()
            .map(|a| (a.animal_id, a.tattoo.as_str()))
            .collect();
        let name = |id: i64| tattoos.get(&id).map(|t| t.to_string()).unwrap_or_else(|| id.to_string());

        self.breedings
            .iter()
            .map(|b| OptionItem {
                id: b.breeding_id,
                label: format!(
                    "#{} {} x {} ({}) — {}",
                    b.breeding_id,
                    name(b.doe_id),
                    name(b.buck_id),
                    b.bred_date,
                    b.result
                ),
            })
            .collect()
    }

    pub fn rows(&self, query: &str) -> Vec<TableRow> {
        table_rows(
            filter_rows(&self.breedings, query, &BREEDING_COLUMNS),
            &BREEDING_COLUMNS,
            None,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreedingForm {
    pub doe_id: String,
    pub buck_id: String,
    pub bred_date: String,
}

impl BreedingForm {
    pub fn to_payload(&self) -> Result<BreedingCreate, String> {
        let (Some(doe_id), Some(buck_id)) = (selected_id(&self.doe_id), selected_id(&self.buck_id)) else {
            return Err("Select both a doe and a buck".to_string());
        };
        Ok(BreedingCreate {
            doe_id,
            buck_id,
            bred_date: parse_date("Bred date", &self.bred_date)?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreedingResultForm {
    pub breeding_id: String,
    pub result: String,
    pub notes: String,
}

impl BreedingResultForm {
    pub fn to_payload(&self) -> Result<(i64, BreedingUpdate), String> {
        let breeding_id = selected_id(&self.breeding_id).ok_or("Select a breeding")?;
        let result = non_empty(&self.result).ok_or("Select a result")?;
        Ok((
            breeding_id,
            BreedingUpdate {
                result: Some(result),
                notes: non_empty(&self.notes),
            },
        ))
    }
}

pub async fn create_breeding(api: &ApiClient, form: &BreedingForm) -> Result<Breeding, String> {
    let payload = form.to_payload()?;
    Ok(api.create_breeding(&payload).await?)
}

pub async fn update_result(api: &ApiClient, form: &BreedingResultForm) -> Result<Breeding, String> {
    let (breeding_id, update) = form.to_payload()?;
    Ok(api.update_breeding(breeding_id, &update).await?)
}

fn result_select(selected: &str) -> SelectModel {
    let mut options = vec![SelectOption {
        value: String::new(),
        label: "Select result…".to_string(),
    }];
    options.extend(RESULTS.iter().map(|r| SelectOption {
        value: r.to_string(),
        label: r.to_string(),
    }));
    SelectModel {
        options,
        selected: selected.to_string(),
    }
}

#[function_component(BreedingsPage)]
pub fn breedings_page(props: &PageProps) -> Html {
    let page = use_page_data::<BreedingsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(BreedingForm::default);
    let result_form = use_state(BreedingResultForm::default);
    let query = use_state(String::new);

    let empty = BreedingsData::default();
    let data = page.data.get().unwrap_or(&empty);

    let on_create = {
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
                async move { create_breeding(&api, &values).await },
                toast.clone(),
                move |breeding| {
                    notify.emit(Toast::ok(format!("Breeding saved (ID {})", breeding.breeding_id)));
                    form.set(BreedingForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_update = {
        let api = props.api_client.clone();
        let result_form = result_form.clone();
        let toast = toast.clone();
        let reload = page.actions.reload.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let api = api.clone();
            let values = (*result_form).clone();
            let result_form = result_form.clone();
            let notify = toast.clone();
            let reload = reload.clone();
            spawn_action(
                async move { update_result(&api, &values).await },
                toast.clone(),
                move |breeding| {
                    notify.emit(Toast::ok(format!(
                        "Breeding #{} updated to \"{}\"",
                        breeding.breeding_id, breeding.result
                    )));
                    result_form.set(BreedingResultForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let headers: Vec<AttrValue> = ["ID", "Doe", "Buck", "Bred", "Expected kindling", "Result", "Notes"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page breedings">
            <div class="card">
                <h2>{"New breeding"}</h2>
                <form id="breedingForm" class="form-grid" onsubmit={on_create}>
                    <label>{"Doe"}
                        <SelectField name="doe_id" model={populate_options(&data.does(), "Select doe…", &form.doe_id)}
                            onchange={bind_select(&form, |f, v| f.doe_id = v)} />
                    </label>
                    <label>{"Buck"}
                        <SelectField name="buck_id" model={populate_options(&data.bucks(), "Select buck…", &form.buck_id)}
                            onchange={bind_select(&form, |f, v| f.buck_id = v)} />
                    </label>
                    <label>{"Bred date"}
                        <input type="date" name="bred_date" value={form.bred_date.clone()}
                            oninput={bind_input(&form, |f, v| f.bred_date = v)} />
                    </label>
                    <button type="submit">{"Save breeding"}</button>
                </form>
            </div>

            <div class="card">
                <h2>{"Record result"}</h2>
                <form id="breedingUpdateForm" class="form-grid" onsubmit={on_update}>
                    <label>{"Breeding"}
                        <SelectField name="breeding_id" id="breedingSelect"
                            model={populate_options(&data.breeding_choices(), "Select breeding…", &result_form.breeding_id)}
                            onchange={bind_select(&result_form, |f, v| f.breeding_id = v)} />
                    </label>
                    <label>{"Result"}
                        <SelectField name="result" model={result_select(&result_form.result)}
                            onchange={bind_select(&result_form, |f, v| f.result = v)} />
                    </label>
                    <label class="wide">{"Notes"}
                        <input type="text" name="notes" value={result_form.notes.clone()}
                            oninput={bind_input(&result_form, |f, v| f.notes = v)} />
                    </label>
                    <button type="submit">{"Update"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Breedings"}</h2>
                    <input id="breedingFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                </div>
                <DataTable id="breedingsTable" {headers} rows={data.rows(&query)} />
            </div>
        </section>
    }
}
