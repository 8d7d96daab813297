use async_trait::async_trait;
use shared::{Animal, AnimalCreate, AnimalStatus, AnimalStatusUpdate, OptionItem};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, TableRow};
use crate::components::form::{
    bind_input, bind_select, input_value, non_empty, parse_opt_date, selected_id,
};
use crate::components::select::{populate_options, SelectField, SelectModel, SelectOption};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;

pub const ANIMAL_COLUMNS: [&str; 7] = [
    "animal_id",
    "tattoo",
    "sex",
    "status",
    "birth_date",
    "breed",
    "litter_id",
];

const FILTER_COLUMNS: [&str; 8] = [
    "animal_id",
    "tattoo",
    "sex",
    "status",
    "birth_date",
    "breed",
    "color",
    "litter_id",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalsData {
    pub animals: Vec<Animal>,
}

#[async_trait(?Send)]
impl PageState for AnimalsData {
    type Params = ();
    const TARGET: &'static str = "animals";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        Ok(Self {
            animals: api.list_animals().await?,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimalCounts {
    pub total: usize,
    pub breeder: usize,
    pub growout: usize,
    pub sold: usize,
    pub harvested: usize,
    pub deceased: usize,
}

impl AnimalsData {
    /// Animals in the active tab (`None` is "all") matching the filter text
    pub fn visible(&self, status: Option<&AnimalStatus>, query: &str) -> Vec<&Animal> {
        filter_rows(&self.animals, query, &FILTER_COLUMNS)
            .into_iter()
            .filter(|a| status.map_or(true, |s| &a.status == s))
            .collect()
    }

    pub fn rows(&self, status: Option<&AnimalStatus>, query: &str) -> Vec<TableRow> {
        table_rows(self.visible(status, query), &ANIMAL_COLUMNS, None)
    }

    pub fn counts(&self) -> AnimalCounts {
        let by = |status: AnimalStatus| self.animals.iter().filter(|a| a.status == status).count();
        AnimalCounts {
            total: self.animals.len(),
            breeder: by(AnimalStatus::Breeder),
            growout: by(AnimalStatus::Growout),
            sold: by(AnimalStatus::Sold),
            harvested: by(AnimalStatus::Harvested),
            deceased: by(AnimalStatus::Deceased),
        }
    }

    pub fn counts_text(&self, status: Option<&AnimalStatus>, query: &str) -> String {
        let c = self.counts();
        let label = status.map(|s| s.as_str()).unwrap_or("all");
        format!(
            "Showing {} ({}). Totals — all {}, breeders {}, growouts {}, sold {}, harvested {}, deceased {}.",
            self.visible(status, query).len(),
            label,
            c.total,
            c.breeder,
            c.growout,
            c.sold,
            c.harvested,
            c.deceased
        )
    }

    /// Animals that can still be marked deceased, by tattoo
    pub fn mortality_choices(&self) -> Vec<OptionItem> {
        let mut eligible: Vec<&Animal> = self.animals.iter().filter(|a| !a.status.is_terminal()).collect();
        eligible.sort_by(|a, b| a.tattoo.cmp(&b.tattoo));
        eligible
            .into_iter()
            .map(|a| OptionItem {
                id: a.animal_id,
                label: format!("{} (ID {}, {}, {})", a.tattoo, a.animal_id, a.sex, a.status),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimalForm {
    pub tattoo: String,
    pub sex: String,
    pub status: String,
    pub breed: String,
    pub color: String,
    pub birth_date: String,
    pub source: String,
    pub notes: String,
}

impl Default for AnimalForm {
    fn default() -> Self {
        Self {
            tattoo: String::new(),
            sex: "F".to_string(),
            status: AnimalStatus::Breeder.as_str().to_string(),
            breed: String::new(),
            color: String::new(),
            birth_date: String::new(),
            source: String::new(),
            notes: String::new(),
        }
    }
}

impl AnimalForm {
    /// The tattoo is passed through untouched; the API decides whether it is valid
    pub fn to_payload(&self) -> Result<AnimalCreate, String> {
        Ok(AnimalCreate {
            tattoo: self.tattoo.trim().to_string(),
            sex: self.sex.clone(),
            status: self.status.clone(),
            breed: non_empty(&self.breed),
            color: non_empty(&self.color),
            birth_date: parse_opt_date("Birth date", &self.birth_date)?,
            source: non_empty(&self.source),
            litter_id: None,
            notes: non_empty(&self.notes),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MortalityForm {
    pub animal_id: String,
    pub death_date: String,
    pub death_reason: String,
}

impl MortalityForm {
    pub fn to_payload(&self) -> Result<(i64, AnimalStatusUpdate), String> {
        let animal_id = selected_id(&self.animal_id).ok_or("Select an animal")?;
        Ok((
            animal_id,
            AnimalStatusUpdate {
                status: AnimalStatus::Deceased.as_str().to_string(),
                death_date: parse_opt_date("Death date", &self.death_date)?,
                death_reason: non_empty(&self.death_reason),
            },
        ))
    }
}

pub async fn create_animal(api: &ApiClient, form: &AnimalForm) -> Result<Animal, String> {
    let payload = form.to_payload()?;
    Ok(api.create_animal(&payload).await?)
}

pub async fn record_death(api: &ApiClient, form: &MortalityForm) -> Result<Animal, String> {
    let (animal_id, update) = form.to_payload()?;
    Ok(api.update_animal_status(animal_id, &update).await?)
}

fn fixed_select(choices: &[(&str, &str)], selected: &str) -> SelectModel {
    SelectModel {
        options: choices
            .iter()
            .map(|(value, label)| SelectOption {
                value: value.to_string(),
                label: label.to_string(),
            })
            .collect(),
        selected: selected.to_string(),
    }
}

#[function_component(AnimalsPage)]
pub fn animals_page(props: &PageProps) -> Html {
    let page = use_page_data::<AnimalsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let tab = use_state(|| Option::<AnimalStatus>::None);
    let query = use_state(String::new);
    let form = use_state(AnimalForm::default);
    let mortality = use_state(MortalityForm::default);

    let empty = AnimalsData::default();
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
                async move { create_animal(&api, &values).await },
                toast.clone(),
                move |animal| {
                    notify.emit(Toast::ok(format!("Animal saved (ID {})", animal.animal_id)));
                    form.set(AnimalForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_mortality = {
        let api = props.api_client.clone();
        let mortality = mortality.clone();
        let toast = toast.clone();
        let reload = page.actions.reload.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let api = api.clone();
            let values = (*mortality).clone();
            let mortality = mortality.clone();
            let notify = toast.clone();
            let reload = reload.clone();
            spawn_action(
                async move { record_death(&api, &values).await },
                toast.clone(),
                move |_| {
                    notify.emit(Toast::ok("Animal marked deceased"));
                    mortality.set(MortalityForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let tabs: Vec<(Option<AnimalStatus>, &str)> = std::iter::once((None, "All"))
        .chain(AnimalStatus::KNOWN.into_iter().map(|s| {
            let label = match s {
                AnimalStatus::Breeder => "Breeders",
                AnimalStatus::Growout => "Growouts",
                AnimalStatus::Sold => "Sold",
                AnimalStatus::Harvested => "Harvested",
                _ => "Deceased",
            };
            (Some(s), label)
        }))
        .collect();

    let headers: Vec<AttrValue> = ["ID", "Tattoo", "Sex", "Status", "Born", "Breed", "Litter"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page animals">
            <div class="card">
                <div id="animalStatusTabs" class="tabs">
                    {for tabs.into_iter().map(|(status, label)| {
                        let class = if *tab == status { "active" } else { "" };
                        let onclick = {
                            let tab = tab.clone();
                            let status = status.clone();
                            Callback::from(move |_: MouseEvent| tab.set(status.clone()))
                        };
                        html! { <button type="button" {class} {onclick}>{label}</button> }
                    })}
                </div>
                <div class="card-header">
                    <input id="animalFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                    <span id="animalCounts" class="muted">{data.counts_text((*tab).as_ref(), &query)}</span>
                </div>
                <DataTable id="animalsTable" {headers} rows={data.rows((*tab).as_ref(), &query)} />
            </div>

            <div class="card">
                <h2>{"Add animal"}</h2>
                <form id="animalForm" class="form-grid" onsubmit={on_create}>
                    <label>{"Tattoo"}
                        <input type="text" name="tattoo" value={form.tattoo.clone()}
                            oninput={bind_input(&form, |f, v| f.tattoo = v)} />
                    </label>
                    <label>{"Sex"}
                        <SelectField name="sex" model={fixed_select(&[("F", "Doe (F)"), ("M", "Buck (M)")], &form.sex)}
                            onchange={bind_select(&form, |f, v| f.sex = v)} />
                    </label>
                    <label>{"Status"}
                        <SelectField name="status"
                            model={fixed_select(&[
                                ("breeder", "Breeder"), ("growout", "Growout"), ("sold", "Sold"),
                                ("harvested", "Harvested"), ("deceased", "Deceased"),
                            ], &form.status)}
                            onchange={bind_select(&form, |f, v| f.status = v)} />
                    </label>
                    <label>{"Breed"}
                        <input type="text" name="breed" value={form.breed.clone()}
                            oninput={bind_input(&form, |f, v| f.breed = v)} />
                    </label>
                    <label>{"Color"}
                        <input type="text" name="color" value={form.color.clone()}
                            oninput={bind_input(&form, |f, v| f.color = v)} />
                    </label>
                    <label>{"Birth date"}
                        <input type="date" name="birth_date" value={form.birth_date.clone()}
                            oninput={bind_input(&form, |f, v| f.birth_date = v)} />
                    </label>
                    <label>{"Source"}
                        <input type="text" name="source" value={form.source.clone()}
                            oninput={bind_input(&form, |f, v| f.source = v)} />
                    </label>
                    <label class="wide">{"Notes"}
                        <textarea name="notes" value={form.notes.clone()}
                            oninput={bind_input(&form, |f, v| f.notes = v)} />
                    </label>
                    <button type="submit">{"Save animal"}</button>
                </form>
            </div>

            <div class="card">
                <h2>{"Record a death"}</h2>
                <form id="mortalityForm" class="form-grid" onsubmit={on_mortality}>
                    <label>{"Animal"}
                        <SelectField name="animal_id" id="mortalityAnimal"
                            model={populate_options(&data.mortality_choices(), "Select animal…", &mortality.animal_id)}
                            onchange={bind_select(&mortality, |f, v| f.animal_id = v)} />
                    </label>
                    <label>{"Date"}
                        <input type="date" name="death_date" value={mortality.death_date.clone()}
                            oninput={bind_input(&mortality, |f, v| f.death_date = v)} />
                    </label>
                    <label class="wide">{"Reason"}
                        <input type="text" name="death_reason" value={mortality.death_reason.clone()}
                            oninput={bind_input(&mortality, |f, v| f.death_reason = v)} />
                    </label>
                    <button type="submit">{"Mark deceased"}</button>
                </form>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::use_page_data::run_action;
    use crate::services::api::HttpMethod;
    use crate::services::testing::MockTransport;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn data() -> AnimalsData {
        let animals = serde_json::from_value(json!([
            {"animal_id": 1, "tattoo": "D1", "sex": "F", "status": "breeder", "breed": "New Zealand", "color": "white"},
            {"animal_id": 2, "tattoo": "B1", "sex": "M", "status": "breeder", "breed": "Californian"},
            {"animal_id": 3, "tattoo": "G7", "sex": "U", "status": "growout", "litter_id": 5},
            {"animal_id": 4, "tattoo": "A2", "sex": "M", "status": "harvested"},
            {"animal_id": 5, "tattoo": "C3", "sex": "F", "status": "deceased"}
        ]))
        .unwrap();
        AnimalsData { animals }
    }

    #[test]
    fn test_tabs_and_filter_combine() {
        let data = data();
        assert_eq!(data.visible(None, "").len(), 5);
        assert_eq!(data.visible(Some(&AnimalStatus::Breeder), "").len(), 2);
        assert_eq!(data.visible(Some(&AnimalStatus::Breeder), "WHITE").len(), 1);
        assert_eq!(data.visible(None, "5").iter().map(|a| a.animal_id).collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_counts_text() {
        let data = data();
        assert_eq!(
            data.counts_text(Some(&AnimalStatus::Breeder), ""),
            "Showing 2 (breeder). Totals — all 5, breeders 2, growouts 1, sold 0, harvested 1, deceased 1."
        );
        assert!(data.counts_text(None, "zzz").starts_with("Showing 0 (all)."));
    }

    #[test]
    fn test_mortality_choices_skip_terminal_animals() {
        let labels: Vec<String> = data().mortality_choices().into_iter().map(|o| o.label).collect();
        assert_eq!(
            labels,
            vec!["B1 (ID 2, M, breeder)", "D1 (ID 1, F, breeder)", "G7 (ID 3, U, growout)"]
        );
    }

    #[test]
    fn test_failed_create_keeps_form_and_reports_detail() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Post, "/animals/", 400, json!({"detail": "tattoo required"}));
        let api = mock.client();

        let typed = AnimalForm {
            breed: "Rex".to_string(),
            birth_date: "2024-02-01".to_string(),
            ..Default::default()
        };
        let form = Rc::new(RefCell::new(typed.clone()));
        let toasts = Rc::new(RefCell::new(Vec::<Toast>::new()));
        let toast = {
            let toasts = toasts.clone();
            Callback::from(move |t: Toast| toasts.borrow_mut().push(t))
        };

        let values = form.borrow().clone();
        let reset = form.clone();
        block_on(run_action(create_animal(&api, &values), toast, move |_| {
            *reset.borrow_mut() = AnimalForm::default();
        }));

        assert_eq!(*form.borrow(), typed);
        let toasts = toasts.borrow();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].class(), "toast bad");
        assert!(toasts[0].message.contains("tattoo required"));

        let sent = mock.bodies(HttpMethod::Post, "/animals/");
        assert_eq!(sent[0]["tattoo"], "");
        assert_eq!(sent[0]["breed"], "Rex");
        assert_eq!(sent[0]["litter_id"], serde_json::Value::Null);
    }

    #[test]
    fn test_record_death_patches_status() {
        let mock = MockTransport::new();
        mock.respond(
            HttpMethod::Patch,
            "/animals/3",
            200,
            json!({"animal_id": 3, "tattoo": "G7", "sex": "U", "status": "deceased", "death_date": "2024-06-01"}),
        );
        let api = mock.client();
        let form = MortalityForm {
            animal_id: "3".to_string(),
            death_date: "2024-06-01".to_string(),
            death_reason: String::new(),
        };

        let animal = block_on(record_death(&api, &form)).unwrap();
        assert_eq!(animal.status, AnimalStatus::Deceased);
        assert_eq!(
            mock.bodies(HttpMethod::Patch, "/animals/3"),
            vec![json!({"status": "deceased", "death_date": "2024-06-01", "death_reason": null})]
        );

        assert_eq!(MortalityForm::default().to_payload(), Err("Select an animal".to_string()));
    }
}
