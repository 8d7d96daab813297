use async_trait::async_trait;
use shared::{FeedCost, FeedCostCreate};
use yew::prelude::*;

use crate::components::data_table::{DataTable, RowAction, TableRow};
use crate::components::form::{bind_input, input_value, non_empty, parse_amount, parse_date, parse_opt_amount};
use crate::components::kpi::KpiTile;
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageAction, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::filter_rows;
use crate::services::format::{fmt_currency, PLACEHOLDER};

const FILTER_COLUMNS: [&str; 4] = ["date", "description", "total_cost", "cost_per_unit"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedCostsData {
    pub feed_costs: Vec<FeedCost>,
}

#[async_trait(?Send)]
impl PageState for FeedCostsData {
    type Params = ();
    const TARGET: &'static str = "feed-costs";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        Ok(Self {
            feed_costs: api.list_feed_costs().await?,
        })
    }
}

impl FeedCostsData {
    pub fn filtered(&self, query: &str) -> Vec<&FeedCost> {
        filter_rows(&self.feed_costs, query, &FILTER_COLUMNS)
    }

    pub fn rows(&self, query: &str) -> Vec<TableRow> {
        self.filtered(query)
            .into_iter()
            .map(|fc| TableRow {
                id: fc.feed_cost_id,
                cells: vec![
                    fc.feed_cost_id.to_string(),
                    fc.date.to_string(),
                    fc.description.clone().unwrap_or_else(|| PLACEHOLDER.to_string()),
                    fmt_currency(fc.cost_per_unit),
                    fmt_currency(Some(fc.total_cost)),
                ],
            })
            .collect()
    }

    /// Sum over every entry, whatever the filter shows
    pub fn grand_total(&self) -> f64 {
        self.feed_costs.iter().map(|fc| fc.total_cost).sum()
    }

    pub fn count_text(&self, query: &str) -> String {
        format!("{} of {} entries", self.filtered(query).len(), self.feed_costs.len())
    }

    pub fn without(&self, feed_cost_id: i64) -> Self {
        Self {
            feed_costs: self
                .feed_costs
                .iter()
                .filter(|fc| fc.feed_cost_id != feed_cost_id)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedCostForm {
    pub date: String,
    pub description: String,
    pub cost_per_unit: String,
    pub total_cost: String,
}

impl FeedCostForm {
    pub fn to_payload(&self) -> Result<FeedCostCreate, String> {
        Ok(FeedCostCreate {
            date: parse_date("Date", &self.date)?,
            description: non_empty(&self.description),
            cost_per_unit: parse_opt_amount("Cost per unit", &self.cost_per_unit)?,
            total_cost: parse_amount("Total cost", &self.total_cost)?,
        })
    }
}

pub async fn create_feed_cost(api: &ApiClient, form: &FeedCostForm) -> Result<FeedCost, String> {
    let payload = form.to_payload()?;
    Ok(api.create_feed_cost(&payload).await?)
}

#[function_component(FeedCostsPage)]
pub fn feed_costs_page(props: &PageProps) -> Html {
    let page = use_page_data::<FeedCostsData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(FeedCostForm::default);
    let query = use_state(String::new);

    let empty = FeedCostsData::default();
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
                async move { create_feed_cost(&api, &values).await },
                toast.clone(),
                move |fc| {
                    notify.emit(Toast::ok(format!("Feed cost saved (ID {})", fc.feed_cost_id)));
                    form.set(FeedCostForm::default());
                    reload.emit(());
                },
            );
        })
    };

    let on_delete = {
        let api = props.api_client.clone();
        let data = page.data.clone();
        let toast = toast.clone();
        Callback::from(move |feed_cost_id: i64| {
            if !gloo::dialogs::confirm(&format!("Delete entry #{}?", feed_cost_id)) {
                return;
            }
            let api = api.clone();
            let data = data.clone();
            let notify = toast.clone();
            spawn_action(
                async move { api.delete_feed_cost(feed_cost_id).await.map_err(String::from) },
                toast.clone(),
                move |_| {
                    notify.emit(Toast::ok("Entry deleted"));
                    data.dispatch(PageAction::modify(move |current: &FeedCostsData| current.without(feed_cost_id)));
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let headers: Vec<AttrValue> = ["ID", "Date", "Description", "Cost / unit", "Total"]
        .into_iter()
        .map(AttrValue::from)
        .collect();

    html! {
        <section class="page feed-costs">
            <div class="kpis">
                <KpiTile label="Total feed cost" id="fc_total" value={fmt_currency(Some(data.grand_total()))} />
            </div>

            <div class="card">
                <h2>{"Add feed cost"}</h2>
                <form id="feedCostForm" class="form-grid" onsubmit={on_submit}>
                    <label>{"Date"}
                        <input type="date" name="date" value={form.date.clone()}
                            oninput={bind_input(&form, |f, v| f.date = v)} />
                    </label>
                    <label>{"Description"}
                        <input type="text" name="description" value={form.description.clone()}
                            oninput={bind_input(&form, |f, v| f.description = v)} />
                    </label>
                    <label>{"Cost per unit"}
                        <input type="number" step="0.01" min="0" name="cost_per_unit" value={form.cost_per_unit.clone()}
                            oninput={bind_input(&form, |f, v| f.cost_per_unit = v)} />
                    </label>
                    <label>{"Total cost"}
                        <input type="number" step="0.01" min="0" name="total_cost" value={form.total_cost.clone()}
                            oninput={bind_input(&form, |f, v| f.total_cost = v)} />
                    </label>
                    <button type="submit">{"Save"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Feed costs"}</h2>
                    <input id="feedCostFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                    <span id="feedCostCount" class="muted">{data.count_text(&query)}</span>
                </div>
                <DataTable id="feedCostsTable" {headers} rows={data.rows(&query)}
                    action={RowAction {
                        label: "✕".into(),
                        title: "Delete".into(),
                        class: "btn-delete".into(),
                        on_click: on_delete,
                    }} />
            </div>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::use_page_data::PageData;
    use crate::services::api::HttpMethod;
    use crate::services::testing::MockTransport;
    use futures::executor::block_on;
    use serde_json::json;
    use std::rc::Rc;

    fn data() -> FeedCostsData {
        serde_json::from_value::<Vec<FeedCost>>(json!([
            {"feed_cost_id": 1, "date": "2024-01-05", "description": "Pellets 50lb", "cost_per_unit": 0.5, "total_cost": 25.0},
            {"feed_cost_id": 2, "date": "2024-02-05", "description": null, "cost_per_unit": null, "total_cost": 12.25},
            {"feed_cost_id": 3, "date": "2024-03-05", "description": "Hay bale", "cost_per_unit": null, "total_cost": 8.0}
        ]))
        .map(|feed_costs| FeedCostsData { feed_costs })
        .unwrap()
    }

    #[test]
    fn test_rows_format_currency_and_placeholders() {
        let rows = data().rows("");
        assert_eq!(rows[0].cells, vec!["1", "2024-01-05", "Pellets 50lb", "$0.50", "$25.00"]);
        assert_eq!(rows[1].cells[2], PLACEHOLDER);
        assert_eq!(rows[1].cells[3], PLACEHOLDER);
    }

    #[test]
    fn test_total_ignores_filter_but_count_does_not() {
        let data = data();
        assert_eq!(data.grand_total(), 45.25);
        assert_eq!(data.count_text("hay"), "1 of 3 entries");
        assert_eq!(data.count_text(""), "3 of 3 entries");
        assert_eq!(data.rows("12.25").len(), 1);
    }

    #[test]
    fn test_delete_removes_entry_and_total() {
        let mock = MockTransport::new();
        mock.respond_raw(HttpMethod::Delete, "/feed-costs/2", 204, "No Content", "");
        let api = mock.client();

        block_on(api.delete_feed_cost(2)).unwrap();
        let after = data().without(2);
        assert_eq!(after.feed_costs.len(), 2);
        assert_eq!(after.grand_total(), 33.0);
        assert_eq!(after.count_text(""), "2 of 2 entries");
    }

    #[test]
    fn test_overlapping_deletes_both_stay_removed() {
        let state = Rc::new(PageData::default()).reduce(PageAction::Loaded(data()));

        let state = state
            .reduce(PageAction::modify(|current: &FeedCostsData| current.without(1)))
            .reduce(PageAction::modify(|current: &FeedCostsData| current.without(3)));

        let after = state.get().unwrap();
        assert_eq!(after.feed_costs.len(), 1);
        assert_eq!(after.feed_costs[0].feed_cost_id, 2);
        assert_eq!(after.grand_total(), 12.25);
    }

    #[test]
    fn test_form_requires_total() {
        let form = FeedCostForm {
            date: "2024-03-05".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_payload(), Err("Total cost is required".to_string()));

        let form = FeedCostForm {
            date: "2024-03-05".to_string(),
            total_cost: "8".to_string(),
            ..Default::default()
        };
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.total_cost, 8.0);
        assert_eq!(payload.cost_per_unit, None);
    }
}
