use std::collections::HashMap;

use async_trait::async_trait;
use shared::{Animal, Litter, OptionItem, Sale, SaleCreate, SaleSubject};
use yew::prelude::*;

use crate::components::data_table::{DataTable, RowAction, TableRow};
use crate::components::form::{
    bind_input, bind_select, input_value, non_empty, parse_amount, parse_date, selected_id,
};
use crate::components::kpi::KpiTile;
use crate::components::select::{populate_options, SelectField};
use crate::components::toast::{use_toast, Toast};
use crate::hooks::use_page_data::{spawn_action, use_page_data, PageAction, PageState};
use crate::pages::PageProps;
use crate::services::api::ApiClient;
use crate::services::error::ApiError;
use crate::services::filter::matches_any;
use crate::services::format::{fmt_currency, PLACEHOLDER};

pub const NO_BUYER: &str = "(no buyer recorded)";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesData {
    pub animals: Vec<Animal>,
    pub litters: Vec<Litter>,
    pub sales: Vec<Sale>,
}

#[async_trait(?Send)]
impl PageState for SalesData {
    type Params = ();
    const TARGET: &'static str = "sales";

    async fn load(api: &ApiClient, _: &()) -> Result<Self, ApiError> {
        let (animals, litters, sales) =
            futures::try_join!(api.list_animals(), api.list_litters(), api.list_sales())?;
        Ok(Self {
            animals,
            litters,
            sales,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesKpis {
    pub count: usize,
    pub revenue: f64,
    /// `None` when there are no sales
    pub average_price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuyerTotal {
    pub buyer: String,
    pub count: usize,
    pub revenue: f64,
}

impl SalesData {
    /// Animals that can still be sold, by tattoo
    pub fn animal_choices(&self) -> Vec<OptionItem> {
        let mut eligible: Vec<&Animal> = self.animals.iter().filter(|a| !a.status.is_terminal()).collect();
        eligible.sort_by(|a, b| a.tattoo.cmp(&b.tattoo));
        eligible
            .into_iter()
            .map(|a| OptionItem {
                id: a.animal_id,
                label: format!("{} ({}, {})", a.tattoo, a.sex, a.status),
            })
            .collect()
    }

    /// Litters, newest first
    pub fn litter_choices(&self) -> Vec<OptionItem> {
        let mut litters: Vec<&Litter> = self.litters.iter().collect();
        litters.sort_by(|a, b| b.litter_id.cmp(&a.litter_id));
        litters
            .into_iter()
            .map(|l| OptionItem {
                id: l.litter_id,
                label: format!("L{} (kindled {}, alive {})", l.litter_id, l.kindling_date, l.born_alive),
            })
            .collect()
    }

    /// What a sale was for, resolved against the loaded animals
    pub fn subject_label(&self, sale: &Sale) -> String {
        match sale.subject() {
            Some(SaleSubject::Animal(id)) => match self.animals.iter().find(|a| a.animal_id == id) {
                Some(animal) => format!("{} ({})", animal.tattoo, animal.sex),
                None => format!("Animal #{}", id),
            },
            Some(SaleSubject::Litter(id)) => format!("Litter L{}", id),
            None => PLACEHOLDER.to_string(),
        }
    }

    pub fn filtered(&self, query: &str) -> Vec<&Sale> {
        self.sales
            .iter()
            .filter(|s| {
                let values = [
                    s.buyer_name.clone().unwrap_or_default(),
                    s.buyer_contact.clone().unwrap_or_default(),
                    s.sale_date.to_string(),
                    self.subject_label(s),
                    s.notes.clone().unwrap_or_default(),
                ];
                matches_any(&values, query)
            })
            .collect()
    }

    pub fn rows(&self, query: &str) -> Vec<TableRow> {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
        self.filtered(query)
            .into_iter()
            .map(|s| TableRow {
                id: s.sale_id,
                cells: vec![
                    s.sale_id.to_string(),
                    s.sale_date.to_string(),
                    self.subject_label(s),
                    fmt_currency(Some(s.sale_price)),
                    text(&s.buyer_name),
                    text(&s.buyer_contact),
                    text(&s.notes),
                ],
            })
            .collect()
    }

    pub fn count_text(&self, query: &str) -> String {
        format!("{} of {} sales", self.filtered(query).len(), self.sales.len())
    }

    pub fn kpis(&self) -> SalesKpis {
        let count = self.sales.len();
        let revenue: f64 = self.sales.iter().map(|s| s.sale_price).sum();
        SalesKpis {
            count,
            revenue,
            average_price: (count > 0).then(|| revenue / count as f64),
        }
    }

    /// Revenue per buyer, highest first. Sales without a buyer share one bucket.
    pub fn buyer_summary(&self) -> Vec<BuyerTotal> {
        let mut totals: Vec<BuyerTotal> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for sale in &self.sales {
            let buyer = sale
                .buyer_name
                .as_deref()
                .filter(|b| !b.is_empty())
                .unwrap_or(NO_BUYER)
                .to_string();
            let slot = *index.entry(buyer.clone()).or_insert_with(|| {
                totals.push(BuyerTotal {
                    buyer,
                    count: 0,
                    revenue: 0.0,
                });
                totals.len() - 1
            });
            totals[slot].count += 1;
            totals[slot].revenue += sale.sale_price;
        }
        totals.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        totals
    }

    pub fn without(&self, sale_id: i64) -> Self {
        Self {
            animals: self.animals.clone(),
            litters: self.litters.clone(),
            sales: self.sales.iter().filter(|s| s.sale_id != sale_id).cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaleMode {
    #[default]
    Animal,
    Litter,
}

impl SaleMode {
    pub fn hint(&self) -> &'static str {
        match self {
            SaleMode::Animal => "Selling an individual animal marks it as sold.",
            SaleMode::Litter => "Selling a whole litter marks all kits in that litter as sold.",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleForm {
    pub mode: SaleMode,
    pub animal_id: String,
    pub litter_id: String,
    pub sale_date: String,
    pub sale_price: String,
    pub buyer_name: String,
    pub buyer_contact: String,
    pub notes: String,
}

impl SaleForm {
    pub fn to_payload(&self) -> Result<SaleCreate, String> {
        let subject = match self.mode {
            SaleMode::Animal => SaleSubject::Animal(selected_id(&self.animal_id).ok_or("Select an animal")?),
            SaleMode::Litter => SaleSubject::Litter(selected_id(&self.litter_id).ok_or("Select a litter")?),
        };
        Ok(SaleCreate::new(
            parse_date("Sale date", &self.sale_date)?,
            parse_amount("Sale price", &self.sale_price)?,
            subject,
            non_empty(&self.buyer_name),
            non_empty(&self.buyer_contact),
            non_empty(&self.notes),
        ))
    }
}

pub async fn create_sale(api: &ApiClient, form: &SaleForm) -> Result<Sale, String> {
    let payload = form.to_payload()?;
    Ok(api.create_sale(&payload).await?)
}

#[function_component(SalesPage)]
pub fn sales_page(props: &PageProps) -> Html {
    let page = use_page_data::<SalesData>(&props.api_client, props.refresh, ());
    let toast = use_toast();
    let form = use_state(SaleForm::default);
    let query = use_state(String::new);

    let empty = SalesData::default();
    let data = page.data.get().unwrap_or(&empty);
    let kpis = data.kpis();
    let buyers = data.buyer_summary();

    let set_mode = |mode: SaleMode| {
        let form = form.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*form).clone();
            next.mode = mode;
            form.set(next);
        })
    };

    let on_submit = {
        let api = props.api_client.clone();
        let form = form.clone();
        let toast = toast.clone();
        let reload = page.actions.reload.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let api = api.clone();
            let values = (*form).clone();
            let mode = values.mode;
            let form = form.clone();
            let notify = toast.clone();
            let reload = reload.clone();
            spawn_action(
                async move { create_sale(&api, &values).await },
                toast.clone(),
                move |sale| {
                    notify.emit(Toast::ok(format!("Sale #{} recorded", sale.sale_id)));
                    // Keep the mode so repeated litter sales stay quick
                    form.set(SaleForm {
                        mode,
                        ..SaleForm::default()
                    });
                    reload.emit(());
                },
            );
        })
    };

    let on_delete = {
        let api = props.api_client.clone();
        let data = page.data.clone();
        let toast = toast.clone();
        Callback::from(move |sale_id: i64| {
            let prompt = format!("Delete sale #{}? This will revert the animal's status.", sale_id);
            if !gloo::dialogs::confirm(&prompt) {
                return;
            }
            let api = api.clone();
            let data = data.clone();
            let notify = toast.clone();
            spawn_action(
                async move { api.delete_sale(sale_id).await.map_err(String::from) },
                toast.clone(),
                move |_| {
                    notify.emit(Toast::ok("Sale deleted"));
                    data.dispatch(PageAction::modify(move |current: &SalesData| current.without(sale_id)));
                },
            );
        })
    };

    let on_query = {
        let query = query.clone();
        Callback::from(move |e: InputEvent| query.set(input_value(&e)))
    };

    let headers: Vec<AttrValue> = ["ID", "Date", "Subject", "Price", "Buyer", "Contact", "Notes"]
        .into_iter()
        .map(AttrValue::from)
        .collect();
    let buyer_headers: Vec<AttrValue> = ["Buyer", "Sales", "Revenue"].into_iter().map(AttrValue::from).collect();
    let buyer_rows: Vec<TableRow> = buyers
        .iter()
        .enumerate()
        .map(|(i, b)| TableRow {
            id: i as i64,
            cells: vec![b.buyer.clone(), b.count.to_string(), fmt_currency(Some(b.revenue))],
        })
        .collect();

    let mode_class = |mode: SaleMode| if form.mode == mode { "active" } else { "" };

    html! {
        <section class="page sales">
            <div class="kpis">
                <KpiTile label="Sales" id="s_count" value={kpis.count.to_string()} />
                <KpiTile label="Revenue" id="s_revenue" value={fmt_currency(Some(kpis.revenue))} />
                <KpiTile label="Average price" id="s_avg" value={fmt_currency(kpis.average_price)} />
            </div>

            <div class="card">
                <h2>{"Record a sale"}</h2>
                <div id="saleModeToggle" class="tabs">
                    <button type="button" class={mode_class(SaleMode::Animal)} onclick={set_mode(SaleMode::Animal)}>{"Individual"}</button>
                    <button type="button" class={mode_class(SaleMode::Litter)} onclick={set_mode(SaleMode::Litter)}>{"Whole litter"}</button>
                </div>
                <p id="saleModeHint" class="muted">{form.mode.hint()}</p>
                <form id="saleForm" class="form-grid" onsubmit={on_submit}>
                    if form.mode == SaleMode::Animal {
                        <label>{"Animal"}
                            <SelectField name="animal_id" id="saleAnimalSelect"
                                model={populate_options(&data.animal_choices(), "Select animal…", &form.animal_id)}
                                onchange={bind_select(&form, |f, v| f.animal_id = v)} />
                        </label>
                    } else {
                        <label>{"Litter"}
                            <SelectField name="litter_id" id="saleLitterSelect"
                                model={populate_options(&data.litter_choices(), "Select litter…", &form.litter_id)}
                                onchange={bind_select(&form, |f, v| f.litter_id = v)} />
                        </label>
                    }
                    <label>{"Sale date"}
                        <input type="date" name="sale_date" value={form.sale_date.clone()}
                            oninput={bind_input(&form, |f, v| f.sale_date = v)} />
                    </label>
                    <label>{"Price"}
                        <input type="number" step="0.01" min="0" name="sale_price" value={form.sale_price.clone()}
                            oninput={bind_input(&form, |f, v| f.sale_price = v)} />
                    </label>
                    <label>{"Buyer"}
                        <input type="text" name="buyer_name" value={form.buyer_name.clone()}
                            oninput={bind_input(&form, |f, v| f.buyer_name = v)} />
                    </label>
                    <label>{"Contact"}
                        <input type="text" name="buyer_contact" value={form.buyer_contact.clone()}
                            oninput={bind_input(&form, |f, v| f.buyer_contact = v)} />
                    </label>
                    <label class="wide">{"Notes"}
                        <textarea name="notes" value={form.notes.clone()}
                            oninput={bind_input(&form, |f, v| f.notes = v)} />
                    </label>
                    <button type="submit">{"Record sale"}</button>
                </form>
            </div>

            <div class="card">
                <div class="card-header">
                    <h2>{"Sales"}</h2>
                    <input id="saleFilter" type="search" placeholder="Filter…" value={(*query).clone()} oninput={on_query} />
                    <span id="saleCount" class="muted">{data.count_text(&query)}</span>
                </div>
                <DataTable id="salesTable" {headers} rows={data.rows(&query)}
                    action={RowAction {
                        label: "✕".into(),
                        title: "Delete sale (reverts animal status)".into(),
                        class: "btn-delete".into(),
                        on_click: on_delete,
                    }} />
            </div>

            <div class="card">
                <h2>{"By buyer"}</h2>
                <DataTable id="buyerSummaryTable" headers={buyer_headers} rows={buyer_rows}
                    empty_text="No sales yet." />
            </div>
        </section>
    }
}
