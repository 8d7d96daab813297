use async_trait::async_trait;
use shared::{ReportKpis, ReportRange, ReportSummary, Series};
use yew::prelude::*;

use crate::components::chart::{BarChart, LineChart};
use crate::components::form::{bind_input, parse_opt_date};
use crate::components::kpi::KpiTile;
use crate::components::toast::{use_toast, Toast};
use crate::config::AppConfig;
use crate::hooks::use_page_data::{use_page_data, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::format::{fmt_count, fmt_currency, fmt_fixed, fmt_percent, PLACEHOLDER};

/// CSV exports linked from the page: (export name, link text)
pub const EXPORTS: [(&str, &str); 4] = [
    ("breedings", "Breedings CSV"),
    ("litters", "Litters CSV"),
    ("harvests", "Harvests CSV"),
    ("feed-costs", "Feed costs CSV"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Line,
}

/// Charts in display order: (series key, fallback title, kind)
pub const CHARTS: [(&str, &str, ChartKind); 7] = [
    ("litters", "Litters", ChartKind::Bar),
    ("born_alive", "Born Alive", ChartKind::Bar),
    ("weaned", "Weaned", ChartKind::Bar),
    ("harvests", "Harvests", ChartKind::Bar),
    ("mortality", "Mortality", ChartKind::Bar),
    ("avg_yield", "Avg Yield", ChartKind::Line),
    ("feed_cost", "Feed Cost ($)", ChartKind::Bar),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportsData {
    pub summary: ReportSummary,
}

#[async_trait(?Send)]
impl PageState for ReportsData {
    type Params = ReportRange;
    const TARGET: &'static str = "reports";

    async fn load(api: &ApiClient, range: &ReportRange) -> Result<Self, ApiError> {
        Ok(Self {
            summary: api.report_summary(range).await?,
        })
    }
}

/// Formatted KPI tiles: (element id, label, value)
pub fn kpi_tiles(k: &ReportKpis) -> Vec<(&'static str, &'static str, String)> {
    vec![
        ("k_litters", "Litters", fmt_count(k.total_litters)),
        ("k_avg_litter", "Avg litter size", fmt_fixed(k.avg_litter_size, 2)),
        ("k_survival", "Survival to wean", fmt_percent(k.survival_to_wean)),
        ("k_harvests", "Harvested", fmt_count(k.harvested_count)),
        ("k_days", "Avg days to harvest", fmt_fixed(k.avg_days_to_harvest, 1)),
        ("k_yield", "Avg yield", fmt_percent(k.avg_yield)),
        ("k_mortality", "Mortality", fmt_count(k.mortality_count)),
        ("k_feed_total", "Feed cost", fmt_currency(k.total_feed_cost)),
        ("k_feed_per_month", "Feed / month", fmt_currency(k.avg_feed_cost_per_month)),
        ("k_feed_per_rabbit", "Feed / harvested rabbit", fmt_currency(k.cost_per_harvested_rabbit)),
    ]
}

impl ReportsData {
    pub fn range_text(&self) -> String {
        let bound = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string());
        format!(
            "Range: {} to {} (blank = all-time)",
            bound(self.summary.range.start_date),
            bound(self.summary.range.end_date)
        )
    }

    /// Every chart's series, substituting an empty titled one when absent
    pub fn charts(&self) -> Vec<(Series, ChartKind)> {
        CHARTS
            .iter()
            .map(|(key, fallback, kind)| (self.summary.series_or_empty(key, fallback), *kind))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeForm {
    pub start_date: String,
    pub end_date: String,
}

impl RangeForm {
    pub fn to_range(&self) -> Result<ReportRange, String> {
        Ok(ReportRange {
            start_date: parse_opt_date("Start date", &self.start_date)?,
            end_date: parse_opt_date("End date", &self.end_date)?,
        })
    }
}

#[function_component(ReportsPage)]
pub fn reports_page(props: &PageProps) -> Html {
    let config = use_context::<AppConfig>().unwrap_or_default();
    let range = use_state(ReportRange::default);
    let form = use_state(RangeForm::default);
    let page = use_page_data::<ReportsData>(&props.api_client, props.refresh, *range);
    let toast = use_toast();

    let empty = ReportsData::default();
    let data = page.data.get().unwrap_or(&empty);

    let on_submit = {
        let form = form.clone();
        let range = range.clone();
        let actions = page.actions.clone();
        let toast = toast.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match form.to_range() {
                Ok(next) => {
                    actions.announce.emit("Reports updated");
                    if next == *range {
                        actions.reload.emit(());
                    } else {
                        range.set(next);
                    }
                }
                Err(message) => toast.emit(Toast::error(message)),
            }
        })
    };

    html! {
        <section class={classes!("page", "reports", page.loading.then_some("loading"))}>
            <div class="card">
                <form id="visualReportsForm" class="form-inline" onsubmit={on_submit}>
                    <label>{"Start"}
                        <input id="vr_start" type="date" value={form.start_date.clone()}
                            oninput={bind_input(&form, |f, v| f.start_date = v)} />
                    </label>
                    <label>{"End"}
                        <input id="vr_end" type="date" value={form.end_date.clone()}
                            oninput={bind_input(&form, |f, v| f.end_date = v)} />
                    </label>
                    <button type="submit">{"Update"}</button>
                </form>
                <p id="vr_range" class="muted">{data.range_text()}</p>
            </div>

            <div class="kpis">
                {for kpi_tiles(&data.summary.kpis).into_iter().map(|(id, label, value)| html! {
                    <KpiTile {label} {id} {value} />
                })}
            </div>

            <div class="charts">
                {for data.charts().into_iter().map(|(series, kind)| html! {
                    <div class="card chart">
                        <h3>{series.name.clone()}</h3>
                        {match kind {
                            ChartKind::Bar => html! { <BarChart {series} max_points={config.chart_max_points} /> },
                            ChartKind::Line => html! { <LineChart {series} max_points={config.chart_max_points} /> },
                        }}
                    </div>
                })}
            </div>

            <div class="card">
                <h2>{"Exports"}</h2>
                <ul class="exports">
                    {for EXPORTS.iter().map(|(name, text)| html! {
                        <li><a href={props.api_client.export_url(name)} download="">{*text}</a></li>
                    })}
                </ul>
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

    fn summary() -> serde_json::Value {
        json!({
            "range": {"start_date": "2024-01-01", "end_date": null},
            "kpis": {
                "total_litters": 6,
                "avg_litter_size": 7.5,
                "survival_to_wean": 0.875,
                "harvested_count": 20,
                "avg_days_to_harvest": 83.24,
                "avg_yield": 0.561,
                "mortality_count": 0,
                "total_feed_cost": 410.0,
                "avg_feed_cost_per_month": null,
                "cost_per_harvested_rabbit": 20.5
            },
            "series": {
                "litters": {"name": "Litters / month", "points": [{"month": "2024-01", "value": 2}, {"month": "2024-02", "value": 4}]},
                "avg_yield": {"name": "Yield", "points": [{"label": "2024-02", "value": 0.56}]}
            }
        })
    }

    #[test]
    fn test_load_sends_only_set_bounds() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Get, "/reports/summary?start_date=2024-01-01", 200, summary());
        let range = RangeForm {
            start_date: "2024-01-01".to_string(),
            ..Default::default()
        }
        .to_range()
        .unwrap();

        let data = block_on(ReportsData::load(&mock.client(), &range)).unwrap();
        assert_eq!(data.range_text(), "Range: 2024-01-01 to — (blank = all-time)");
    }

    #[test]
    fn test_kpi_formatting() {
        let data = ReportsData {
            summary: serde_json::from_value(summary()).unwrap(),
        };
        let values: Vec<String> = kpi_tiles(&data.summary.kpis).into_iter().map(|(_, _, v)| v).collect();
        assert_eq!(
            values,
            vec!["6", "7.50", "87.5%", "20", "83.2", "56.1%", "0", "$410.00", PLACEHOLDER, "$20.50"]
        );
    }

    #[test]
    fn test_missing_series_fall_back_to_empty() {
        let data = ReportsData {
            summary: serde_json::from_value(summary()).unwrap(),
        };
        let charts = data.charts();
        assert_eq!(charts.len(), 7);
        assert_eq!(charts[0].0.name, "Litters / month");
        assert_eq!(charts[0].0.points[1].label, "2024-02");
        assert_eq!(charts[1].0.name, "Born Alive");
        assert!(charts[1].0.points.is_empty());
        assert_eq!(charts[5], (data.summary.series["avg_yield"].clone(), ChartKind::Line));
        assert_eq!(charts[6].0.name, "Feed Cost ($)");
    }

    #[test]
    fn test_empty_summary_renders_placeholders() {
        let data = ReportsData::default();
        assert_eq!(data.range_text(), "Range: — to — (blank = all-time)");
        assert!(kpi_tiles(&data.summary.kpis).iter().all(|(_, _, v)| v == PLACEHOLDER));
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let form = RangeForm {
            end_date: "soon".to_string(),
            ..Default::default()
        };
        assert_eq!(form.to_range(), Err("End date is not a valid date".to_string()));
    }

    #[test]
    fn test_export_links() {
        let api = ApiClient::with_transport("http://ranch.local/".to_string(), std::rc::Rc::new(MockTransport::new()));
        let links: Vec<String> = EXPORTS.iter().map(|(name, _)| api.export_url(name)).collect();
        assert_eq!(links[3], "http://ranch.local/reports/feed-costs.csv");
    }
}
