use async_trait::async_trait;
use shared::{Animal, Breeding, DashboardTodo, Harvest, Litter, Metrics};
use yew::prelude::*;

use crate::components::data_table::{table_rows, DataTable, TableRow};
use crate::components::form::bind_input;
use crate::components::kpi::KpiTile;
use crate::components::todo_list::TodoList;
use crate::components::toast::{use_toast, Toast};
use crate::config::{AppConfig, TodoThresholds};
use crate::hooks::use_page_data::{use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::format::{fmt_count, fmt_opt, fmt_percent};

const ANIMAL_COLUMNS: [&str; 7] = ["animal_id", "tattoo", "sex", "status", "birth_date", "breed", "litter_id"];
const BREEDING_COLUMNS: [&str; 6] = ["breeding_id", "doe_id", "buck_id", "bred_date", "expected_kindling", "result"];
const LITTER_COLUMNS: [&str; 6] = ["litter_id", "breeding_id", "kindling_date", "born_alive", "born_dead", "weaned_count"];
const HARVEST_COLUMNS: [&str; 5] = ["harvest_id", "animal_id", "harvest_date", "live_weight_grams", "carcass_weight_grams"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardData {
    pub metrics: Metrics,
    pub animals: Vec<Animal>,
    pub breedings: Vec<Breeding>,
    pub litters: Vec<Litter>,
    pub harvests: Vec<Harvest>,
}

#[async_trait(?Send)]
impl PageState for DashboardData {
    type Params = ();
    const TARGET: &'static str = "dashboard";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (metrics, animals, breedings, litters, harvests) = futures::try_join!(
            api.metrics(),
            api.list_animals(),
            api.list_breedings(),
            api.list_litters(),
            api.list_harvests(),
        )?;
        Ok(Self {
            metrics,
            animals,
            breedings,
            litters,
            harvests,
        })
    }
}

/// Formatted metric tiles: (element id, label, value)
pub fn metric_tiles(m: &Metrics) -> Vec<(&'static str, &'static str, String)> {
    vec![
        ("m_total_litters", "Total litters", fmt_count(m.total_litters)),
        ("m_avg_litter_size", "Avg litter size", fmt_opt(m.average_litter_size)),
        ("m_survival", "Kit survival", fmt_percent(m.kit_survival_rate)),
        ("m_days_to_harvest", "Avg days to harvest", fmt_opt(m.average_days_to_harvest)),
        ("m_harvested", "Harvested", fmt_count(m.harvested_rabbits)),
    ]
}

impl DashboardData {
    /// Newest animals first
    pub fn animal_rows(&self, limit: usize) -> Vec<TableRow> {
        table_rows(self.animals.iter().rev(), &ANIMAL_COLUMNS, Some(limit))
    }

    pub fn breeding_rows(&self, limit: usize) -> Vec<TableRow> {
        table_rows(&self.breedings, &BREEDING_COLUMNS, Some(limit))
    }

    pub fn litter_rows(&self, limit: usize) -> Vec<TableRow> {
        table_rows(&self.litters, &LITTER_COLUMNS, Some(limit))
    }

    pub fn harvest_rows(&self, limit: usize) -> Vec<TableRow> {
        table_rows(&self.harvests, &HARVEST_COLUMNS, Some(limit))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TodoPanelData {
    pub todo: DashboardTodo,
}

#[async_trait(?Send)]
impl PageState for TodoPanelData {
    type Params = TodoThresholds;
    const TARGET: &'static str = "dashboard.todo";
    const ANNOUNCE_REFRESH: bool = false;

    async fn load(api: &ApiClient, thresholds: &TodoThresholds) -> Result<Self, ApiError> {
        Ok(Self {
            todo: api.dashboard_todo(thresholds).await?,
        })
    }
}

impl TodoPanelData {
    /// Echoes the thresholds the server applied, or the requested ones when
    /// the response leaves them out
    pub fn as_of_text(&self, requested: &TodoThresholds) -> String {
        let (k, w, h) = match &self.todo.params {
            Some(p) => (p.kindling_window_days, p.wean_age_days, p.harvest_age_days),
            None => (
                requested.kindling_window_days,
                requested.wean_age_days,
                requested.harvest_age_days,
            ),
        };
        format!(
            "As of {} • kindling window {}d • wean {}d • harvest {}d",
            self.todo.as_of, k, w, h
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdForm {
    pub kindling_window_days: String,
    pub wean_age_days: String,
    pub harvest_age_days: String,
}

impl From<TodoThresholds> for ThresholdForm {
    fn from(t: TodoThresholds) -> Self {
        Self {
            kindling_window_days: t.kindling_window_days.to_string(),
            wean_age_days: t.wean_age_days.to_string(),
            harvest_age_days: t.harvest_age_days.to_string(),
        }
    }
}

fn parse_days(label: &str, value: &str) -> Result<u32, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a whole number of days", label))
}

impl ThresholdForm {
    pub fn to_thresholds(&self) -> Result<TodoThresholds, String> {
        Ok(TodoThresholds {
            kindling_window_days: parse_days("Kindling window", &self.kindling_window_days)?,
            wean_age_days: parse_days("Wean age", &self.wean_age_days)?,
            harvest_age_days: parse_days("Harvest age", &self.harvest_age_days)?,
        })
    }
}

#[derive(Properties, PartialEq)]
pub struct TodoPanelProps {
    pub api_client: ApiClient,
    pub refresh: u32,
    pub initial: TodoThresholds,
}

#[function_component(TodoPanel)]
pub fn todo_panel(props: &TodoPanelProps) -> Html {
    let thresholds = use_state(|| props.initial);
    let form = use_state(|| ThresholdForm::from(props.initial));
    let panel = use_page_data::<TodoPanelData>(&props.api_client, props.refresh, *thresholds);
    let toast = use_toast();

    let on_apply = {
        let form = form.clone();
        let thresholds = thresholds.clone();
        let reload = panel.actions.reload.clone();
        let toast = toast.clone();
        Callback::from(move |_: MouseEvent| match form.to_thresholds() {
            // Unchanged thresholds do not retrigger the effect
            Ok(next) if next == *thresholds => reload.emit(()),
            Ok(next) => thresholds.set(next),
            Err(message) => toast.emit(Toast::error(message)),
        })
    };

    let (kindlings, weanings, harvest) = match panel.data.get() {
        Some(d) => (
            d.todo.kindlings_due.clone(),
            d.todo.weanings_due.clone(),
            d.todo.harvest_ready.clone(),
        ),
        None => Default::default(),
    };

    html! {
        <div class="card todo">
            <div class="card-header">
                <h2>{"To do"}</h2>
                <label>{"Kindling window (d)"}
                    <input id="todo_kindling_window" type="number" min="0" value={form.kindling_window_days.clone()}
                        oninput={bind_input(&form, |f, v| f.kindling_window_days = v)} />
                </label>
                <label>{"Wean age (d)"}
                    <input id="todo_wean_age" type="number" min="0" value={form.wean_age_days.clone()}
                        oninput={bind_input(&form, |f, v| f.wean_age_days = v)} />
                </label>
                <label>{"Harvest age (d)"}
                    <input id="todo_harvest_age" type="number" min="0" value={form.harvest_age_days.clone()}
                        oninput={bind_input(&form, |f, v| f.harvest_age_days = v)} />
                </label>
                <button id="todoApplyBtn" type="button" onclick={on_apply}>{"Apply"}</button>
            </div>
            <div class="todo-columns">
                <TodoList title="Kindlings due" items={kindlings} empty_text="No kindlings due." />
                <TodoList title="Weanings due" items={weanings} empty_text="No weanings due." />
                <TodoList title="Ready to harvest" items={harvest} empty_text="No harvest-ready growouts." />
            </div>
            if let Some(d) = panel.data.get() {
                <p id="todo_asof" class="muted">{d.as_of_text(&thresholds)}</p>
            }
        </div>
    }
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &PageProps) -> Html {
    let config = use_context::<AppConfig>().unwrap_or_default();
    let page = use_page_data::<DashboardData>(&props.api_client, props.refresh, ());

    let empty = DashboardData::default();
    let data = page.data.get().unwrap_or(&empty);
    let limit = config.preview_rows;

    let headers = |names: &[&'static str]| -> Vec<AttrValue> { names.iter().map(|n| AttrValue::from(*n)).collect() };

    html! {
        <section class={classes!("page", "dashboard", page.loading.then_some("loading"))}>
            <div class="kpis">
                {for metric_tiles(&data.metrics).into_iter().map(|(id, label, value)| html! {
                    <KpiTile {label} {id} {value} />
                })}
            </div>

            <TodoPanel api_client={props.api_client.clone()} refresh={props.refresh} initial={config.todo} />

            <div class="grid-2">
                <div class="card">
                    <h2><a href="/ranch/animals">{"Recent animals"}</a></h2>
                    <DataTable id="animalsTable" rows={data.animal_rows(limit)}
                        headers={headers(&["ID", "Tattoo", "Sex", "Status", "Born", "Breed", "Litter"])} />
                </div>
                <div class="card">
                    <h2><a href="/ranch/breedings">{"Breedings"}</a></h2>
                    <DataTable id="breedingsTable" rows={data.breeding_rows(limit)}
                        headers={headers(&["ID", "Doe", "Buck", "Bred", "Expected", "Result"])} />
                </div>
                <div class="card">
                    <h2><a href="/ranch/kindlings">{"Litters"}</a></h2>
                    <DataTable id="littersTable" rows={data.litter_rows(limit)}
                        headers={headers(&["ID", "Breeding", "Kindled", "Alive", "Dead", "Weaned"])} />
                </div>
                <div class="card">
                    <h2><a href="/ranch/harvests">{"Harvests"}</a></h2>
                    <DataTable id="harvestsTable" rows={data.harvest_rows(limit)}
                        headers={headers(&["ID", "Animal", "Date", "Live (g)", "Carcass (g)"])} />
                </div>
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::HttpMethod;
    use crate::services::format::PLACEHOLDER;
    use crate::services::testing::MockTransport;
    use futures::executor::block_on;
    use serde_json::json;

    fn mock_dashboard(animal_count: i64) -> MockTransport {
        let mock = mock_without_litters(animal_count);
        mock.respond(HttpMethod::Get, "/litters/", 200, json!([]));
        mock
    }

    fn mock_without_litters(animal_count: i64) -> MockTransport {
        let animals: Vec<_> = (1..=animal_count)
            .map(|i| json!({"animal_id": i, "tattoo": format!("T{}", i), "sex": "F", "status": "breeder"}))
            .collect();
        let mock = MockTransport::new();
        mock.respond(
            HttpMethod::Get,
            "/metrics",
            200,
            json!({"total_litters": 4, "average_litter_size": 7.25, "kit_survival_rate": 0.8125, "average_days_to_harvest": null, "harvested_rabbits": 12}),
        );
        mock.respond(HttpMethod::Get, "/animals/", 200, json!(animals));
        mock.respond(HttpMethod::Get, "/breedings/", 200, json!([]));
        mock.respond(HttpMethod::Get, "/harvests/", 200, json!([]));
        mock
    }

    #[test]
    fn test_metric_tiles_format() {
        let data = block_on(DashboardData::load(&mock_dashboard(1).client(), &())).unwrap();
        let values: Vec<String> = metric_tiles(&data.metrics).into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(values, vec!["4", "7.25", "81.3%", PLACEHOLDER, "12"]);
    }

    #[test]
    fn test_animal_preview_is_newest_first_and_capped() {
        let data = block_on(DashboardData::load(&mock_dashboard(14).client(), &())).unwrap();
        let rows = data.animal_rows(10);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].id, 14);
        assert_eq!(rows[9].id, 5);
        assert!(data.litter_rows(10).is_empty());
    }

    #[test]
    fn test_load_fails_when_any_resource_fails() {
        let mock = mock_without_litters(2);
        mock.respond(HttpMethod::Get, "/litters/", 500, json!({"detail": "boom"}));
        let err = block_on(DashboardData::load(&mock.client(), &())).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_todo_query_and_as_of_line() {
        let mock = MockTransport::new();
        mock.respond(
            HttpMethod::Get,
            "/dashboard/todo?kindling_window_days=10&wean_age_days=42&harvest_age_days=90",
            200,
            json!({
                "as_of": "2024-05-01",
                "params": {"kindling_window_days": 10, "wean_age_days": 42, "harvest_age_days": 90},
                "kindlings_due": [{"label": "Doe DZ due 2024-05-03", "link": "/ranch/kindlings"}]
            }),
        );
        let requested = TodoThresholds {
            kindling_window_days: 10,
            wean_age_days: 42,
            harvest_age_days: 90,
        };

        let panel = block_on(TodoPanelData::load(&mock.client(), &requested)).unwrap();
        assert_eq!(panel.todo.kindlings_due.len(), 1);
        assert!(panel.todo.harvest_ready.is_empty());
        assert_eq!(
            panel.as_of_text(&requested),
            "As of 2024-05-01 • kindling window 10d • wean 42d • harvest 90d"
        );
    }

    #[test]
    fn test_threshold_form() {
        let mut form = ThresholdForm::from(TodoThresholds::default());
        assert_eq!(form.to_thresholds(), Ok(TodoThresholds::default()));

        form.wean_age_days = "six weeks".to_string();
        assert_eq!(
            form.to_thresholds(),
            Err("Wean age must be a whole number of days".to_string())
        );
    }
}
