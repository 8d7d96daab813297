use async_trait::async_trait;
use shared::{Animal, AnimalStatus, GenerateKitsRequest, GenerateKitsResponse, OptionItem};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, TableRow};
use crate::components::form::{bind_input, bind_select, input_value, non_empty, parse_int, parse_opt_int, selected_id};
use crate::components::select::{populate_options, SelectField};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;

pub const GROWOUT_COLUMNS: [&str; 6] = ["animal_id", "tattoo", "sex", "status", "birth_date", "litter_id"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaningsData {
    pub litter_options: Vec<OptionItem>,
    pub growouts: Vec<Animal>,
}

#[async_trait(?Send)]
impl PageState for WeaningsData {
    type Params = ();
    const TARGET: &'static str = "weanings";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (litter_options, animals) = futures::try_join!(api.litter_options(false), api.list_animals())?;
        Ok(Self {
            litter_options,
            growouts: animals
                .into_iter()
                .filter(|a| a.status == AnimalStatus::Growout)
                .collect(),
        })
    }
}

impl WeaningsData {
    pub fn rows(&self, query: &str) -> Vec<TableRow> {
        table_rows(
            filter_rows(&self.growouts, query, &GROWOUT_COLUMNS),
            &GROWOUT_COLUMNS,
            None,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateKitsForm {
    pub litter_id: String,
    pub weaned_count: String,
    pub male_count: String,
    pub female_count: String,
    pub tattoo_prefix: String,
}

impl GenerateKitsForm {
    pub fn to_payload(&self) -> Result<(i64, GenerateKitsRequest), String> {
        let litter_id = selected_id(&self.litter_id).ok_or("Select a litter")?;
        Ok((
            litter_id,
            GenerateKitsRequest {
                weaned_count: parse_int("Weaned count", &self.weaned_count)?,
                male_count: parse_opt_int("Male count", &self.male_count)?,
                female_count: parse_opt_int("Female count", &self.female_count)?,
                tattoo_prefix: non_empty(&self.tattoo_prefix),
            },
        ))
    }
}

pub async fn generate_kits(api: &ApiClient, form: &GenerateKitsForm) -> Result<GenerateKitsResponse, String> {
    let (litter_id, payload) = form.to_payload()?;
    Ok(api.generate_kits(litter_id, &payload).await?)
}

#[function_component(WeaningsPage)]
pub fn weanings_page(props: &PageProps) -> Html {
    let page = use_page_data::<WeaningsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(GenerateKitsForm::default);
    let query = use_state(String::new);

    let empty = WeaningsData::default();
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
                async move { generate_kits(&api, &values).await },
                toast.clone(),
                move |generated| {
                    log::info!(target: "weanings", "litter {} -> {:?}", generated.litter_id, generated.tattoos);
                    notify.emit(Toast::ok(format!("Generated {} kits", generated.created)));
                    form.set(GenerateKitsForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let headers: Vec<AttrValue> = ["ID", "Tattoo", "Sex", "Status", "Born", "Litter"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page weanings">
            <div class="card">
                <h2>{"Wean a litter"}</h2>
                <form id="generateKitsForm" class="form-grid" onsubmit={on_submit}>
                    <label>{"Litter"}
                        <SelectField name="litter_id" id="litterForWeaning"
                            model={populate_options(&data.litter_options, "Select litter…", &form.litter_id)}
                            onchange={bind_select(&form, |f, v| f.litter_id = v)} />
                    </label>
                    <label>{"Weaned"}
                        <input type="number" min="0" name="weaned_count" value={form.weaned_count.clone()}
                            oninput={bind_input(&form, |f, v| f.weaned_count = v)} />
                    </label>
                    <label>{"Males"}
                        <input type="number" min="0" name="male_count" value={form.male_count.clone()}
                            oninput={bind_input(&form, |f, v| f.male_count = v)} />
                    </label>
                    <label>{"Females"}
                        <input type="number" min="0" name="female_count" value={form.female_count.clone()}
                            oninput={bind_input(&form, |f, v| f.female_count = v)} />
                    </label>
                    <label>{"Tattoo prefix"}
                        <input type="text" name="tattoo_prefix" value={form.tattoo_prefix.clone()}
                            oninput={bind_input(&form, |f, v| f.tattoo_prefix = v)} />
                    </label>
                    <button type="submit">{"Generate kits"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Growouts"}</h2>
                    <input id="growoutFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                </div>
                <DataTable id="growoutsTable" {headers} rows={data.rows(&query)} />
            </div>
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

    #[test]
    fn test_load_keeps_only_growouts() {
        let mock = MockTransport::new();
        mock.respond(
            HttpMethod::Get,
            "/options/litters?only_not_weaned=false",
            200,
            json!([{"id": 4, "label": "L4 (2024-04-01)"}]),
        );
        mock.respond(
            HttpMethod::Get,
            "/animals/",
            200,
            json!([
                {"animal_id": 1, "tattoo": "DZ", "sex": "F", "status": "breeder"},
                {"animal_id": 11, "tattoo": "K11", "sex": "M", "status": "growout", "litter_id": 4},
                {"animal_id": 12, "tattoo": "K12", "sex": "U", "status": "growout", "litter_id": 4}
            ]),
        );

        let data = block_on(WeaningsData::load(&mock.client(), &())).unwrap();
        assert_eq!(data.litter_options.len(), 1);
        assert_eq!(data.growouts.len(), 2);
        assert_eq!(data.rows("").len(), 2);
        assert_eq!(data.rows("k12")[0].cells[..3], ["12", "K12", "U"]);
    }

    #[test]
    fn test_generate_requires_litter_and_count() {
        let form = GenerateKitsForm {
            weaned_count: "5".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(), Err("Select a litter".to_string()));

        let form = GenerateKitsForm {
            litter_id: "4".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(), Err("Weaned count is required".to_string()));
    }

    #[test]
    fn test_generate_posts_optional_fields_as_null() {
        let mock = MockTransport::new();
        mock.respond(
            HttpMethod::Post,
            "/litters/4/generate-kits",
            200,
            json!({"litter_id": 4, "created": 5, "animal_ids": [11, 12, 13, 14, 15]}),
        );
        let api = mock.client();

        let form = GenerateKitsForm {
            litter_id: "4".to_string(),
            weaned_count: "5".to_string(),
            male_count: "2".to_string(),
            ..Default::default()
        };
        let generated = block_on(generate_kits(&api, &form)).unwrap();
        assert_eq!(generated.created, 5);
        assert!(generated.tattoos.is_empty());
        assert_eq!(
            mock.bodies(HttpMethod::Post, "/litters/4/generate-kits"),
            vec![json!({"weaned_count": 5, "male_count": 2, "female_count": null, "tattoo_prefix": null})]
        );
    }
}
