use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column projection used by tables and filters.
///
/// `field` returns the display string of a named column, or `None` when the
/// value is null or the column is unknown for this record type.
pub trait Record {
    /// Stable identifier of the record (the entity's primary key)
    fn id(&self) -> i64;

    fn field(&self, key: &str) -> Option<String>;
}

/// Render a number the way a plain string conversion would: `3`, `12.5`
pub fn number_text(value: f64) -> String {
    format!("{}", value)
}

fn opt<T: ToString>(value: &Option<T>) -> Option<String> {
    value.as_ref().map(|v| v.to_string())
}

/// Animal sex as recorded by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    M,
    F,
    /// Unknown / not yet sexed
    U,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::U => "U",
        }
    }

    pub fn parse(value: &str) -> Option<Sex> {
        match value {
            "M" => Some(Sex::M),
            "F" => Some(Sex::F),
            "U" => Some(Sex::U),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of an animal.
///
/// Values the client does not know about are kept verbatim in `Other` so a
/// newer backend never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalStatus {
    Breeder,
    Growout,
    Sold,
    Harvested,
    Deceased,
    #[serde(untagged)]
    Other(String),
}

impl AnimalStatus {
    /// The five statuses shown as tabs, in display order
    pub const KNOWN: [AnimalStatus; 5] = [
        AnimalStatus::Breeder,
        AnimalStatus::Growout,
        AnimalStatus::Sold,
        AnimalStatus::Harvested,
        AnimalStatus::Deceased,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AnimalStatus::Breeder => "breeder",
            AnimalStatus::Growout => "growout",
            AnimalStatus::Sold => "sold",
            AnimalStatus::Harvested => "harvested",
            AnimalStatus::Deceased => "deceased",
            AnimalStatus::Other(s) => s,
        }
    }

    pub fn parse(value: &str) -> AnimalStatus {
        match value {
            "breeder" => AnimalStatus::Breeder,
            "growout" => AnimalStatus::Growout,
            "sold" => AnimalStatus::Sold,
            "harvested" => AnimalStatus::Harvested,
            "deceased" => AnimalStatus::Deceased,
            other => AnimalStatus::Other(other.to_string()),
        }
    }

    /// Harvested and deceased animals can no longer be sold or marked dead
    pub fn is_terminal(&self) -> bool {
        matches!(self, AnimalStatus::Harvested | AnimalStatus::Deceased)
    }
}

impl fmt::Display for AnimalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------
// Animals
// -----------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub animal_id: i64,
    /// Display identifier, not guaranteed unique
    pub tattoo: String,
    pub sex: Sex,
    pub status: AnimalStatus,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub litter_id: Option<i64>,
    #[serde(default)]
    pub death_date: Option<NaiveDate>,
    #[serde(default)]
    pub death_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Animal {
    fn id(&self) -> i64 {
        self.animal_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "animal_id" => Some(self.animal_id.to_string()),
            "tattoo" => Some(self.tattoo.clone()),
            "sex" => Some(self.sex.to_string()),
            "status" => Some(self.status.to_string()),
            "breed" => self.breed.clone(),
            "color" => self.color.clone(),
            "birth_date" => opt(&self.birth_date),
            "source" => self.source.clone(),
            "litter_id" => opt(&self.litter_id),
            "death_date" => opt(&self.death_date),
            "death_reason" => self.death_reason.clone(),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalCreate {
    pub tattoo: String,
    pub sex: String,
    pub status: String,
    pub breed: Option<String>,
    pub color: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub source: Option<String>,
    pub litter_id: Option<i64>,
    pub notes: Option<String>,
}

/// PATCH body for status transitions (sold / harvested / deceased)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalStatusUpdate {
    pub status: String,
    pub death_date: Option<NaiveDate>,
    pub death_reason: Option<String>,
}

// -----------------------------
// Breedings
// -----------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breeding {
    pub breeding_id: i64,
    pub doe_id: i64,
    pub buck_id: i64,
    pub bred_date: NaiveDate,
    #[serde(default)]
    pub expected_kindling: Option<NaiveDate>,
    /// pending / successful / missed, open-ended on the backend side
    pub result: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Breeding {
    fn id(&self) -> i64 {
        self.breeding_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "breeding_id" => Some(self.breeding_id.to_string()),
            "doe_id" => Some(self.doe_id.to_string()),
            "buck_id" => Some(self.buck_id.to_string()),
            "bred_date" => Some(self.bred_date.to_string()),
            "expected_kindling" => opt(&self.expected_kindling),
            "result" => Some(self.result.clone()),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingCreate {
    pub doe_id: i64,
    pub buck_id: i64,
    pub bred_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedingUpdate {
    pub result: Option<String>,
    pub notes: Option<String>,
}

// -----------------------------
// Litters
// -----------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Litter {
    pub litter_id: i64,
    pub breeding_id: i64,
    pub kindling_date: NaiveDate,
    pub born_alive: i64,
    #[serde(default)]
    pub born_dead: i64,
    /// Unknown until the weaning is recorded
    #[serde(default)]
    pub weaned_count: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Litter {
    fn id(&self) -> i64 {
        self.litter_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "litter_id" => Some(self.litter_id.to_string()),
            "breeding_id" => Some(self.breeding_id.to_string()),
            "kindling_date" => Some(self.kindling_date.to_string()),
            "born_alive" => Some(self.born_alive.to_string()),
            "born_dead" => Some(self.born_dead.to_string()),
            "weaned_count" => opt(&self.weaned_count),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LitterCreate {
    pub breeding_id: i64,
    pub kindling_date: NaiveDate,
    pub born_alive: i64,
    pub born_dead: i64,
    pub weaned_count: Option<i64>,
    pub notes: Option<String>,
}

/// Partial update: unset fields are omitted from the body, `notes` is
/// always sent so clearing it nulls it on the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LitterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kindling_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub born_alive: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub born_dead: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weaned_count: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateKitsRequest {
    pub weaned_count: i64,
    pub male_count: Option<i64>,
    pub female_count: Option<i64>,
    pub tattoo_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateKitsResponse {
    pub litter_id: i64,
    pub created: i64,
    #[serde(default)]
    pub animal_ids: Vec<i64>,
    #[serde(default)]
    pub tattoos: Vec<String>,
}

// -----------------------------
// Harvests
// -----------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvest {
    pub harvest_id: i64,
    pub animal_id: i64,
    pub harvest_date: NaiveDate,
    #[serde(default)]
    pub live_weight_grams: Option<i64>,
    #[serde(default)]
    pub carcass_weight_grams: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Harvest {
    fn id(&self) -> i64 {
        self.harvest_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "harvest_id" => Some(self.harvest_id.to_string()),
            "animal_id" => Some(self.animal_id.to_string()),
            "harvest_date" => Some(self.harvest_date.to_string()),
            "live_weight_grams" => opt(&self.live_weight_grams),
            "carcass_weight_grams" => opt(&self.carcass_weight_grams),
            "notes" => self.notes.clone(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestCreate {
    pub animal_id: i64,
    pub harvest_date: NaiveDate,
    pub live_weight_grams: Option<i64>,
    pub carcass_weight_grams: Option<i64>,
    pub notes: Option<String>,
}

/// Partial update, same rules as [`LitterUpdate`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HarvestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harvest_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_weight_grams: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carcass_weight_grams: Option<i64>,
    pub notes: Option<String>,
}

// -----------------------------
// Feed costs
// -----------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCost {
    pub feed_cost_id: i64,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost_per_unit: Option<f64>,
    pub total_cost: f64,
}

impl Record for FeedCost {
    fn id(&self) -> i64 {
        self.feed_cost_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "feed_cost_id" => Some(self.feed_cost_id.to_string()),
            "date" => Some(self.date.to_string()),
            "description" => self.description.clone(),
            "cost_per_unit" => self.cost_per_unit.map(number_text),
            "total_cost" => Some(number_text(self.total_cost)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCostCreate {
    pub date: NaiveDate,
    pub description: Option<String>,
    pub cost_per_unit: Option<f64>,
    pub total_cost: f64,
}

// -----------------------------
// Sales
// -----------------------------

/// What a sale refers to: one animal or a whole litter, never both
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleSubject {
    Animal(i64),
    Litter(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub sale_id: i64,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub buyer_contact: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub animal_id: Option<i64>,
    #[serde(default)]
    pub litter_id: Option<i64>,
}

impl Sale {
    pub fn subject(&self) -> Option<SaleSubject> {
        match (self.animal_id, self.litter_id) {
            (Some(id), _) => Some(SaleSubject::Animal(id)),
            (None, Some(id)) => Some(SaleSubject::Litter(id)),
            (None, None) => None,
        }
    }
}

impl Record for Sale {
    fn id(&self) -> i64 {
        self.sale_id
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "sale_id" => Some(self.sale_id.to_string()),
            "sale_date" => Some(self.sale_date.to_string()),
            "sale_price" => Some(number_text(self.sale_price)),
            "buyer_name" => self.buyer_name.clone(),
            "buyer_contact" => self.buyer_contact.clone(),
            "notes" => self.notes.clone(),
            "animal_id" => opt(&self.animal_id),
            "litter_id" => opt(&self.litter_id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleCreate {
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    pub buyer_name: Option<String>,
    pub buyer_contact: Option<String>,
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animal_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub litter_id: Option<i64>,
}

impl SaleCreate {
    pub fn new(
        sale_date: NaiveDate,
        sale_price: f64,
        subject: SaleSubject,
        buyer_name: Option<String>,
        buyer_contact: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let (animal_id, litter_id) = match subject {
            SaleSubject::Animal(id) => (Some(id), None),
            SaleSubject::Litter(id) => (None, Some(id)),
        };
        Self {
            sale_date,
            sale_price,
            buyer_name,
            buyer_contact,
            notes,
            animal_id,
            litter_id,
        }
    }
}

// -----------------------------
// Options, metrics, dashboard
// -----------------------------

/// Dropdown entry served by the `/options/*` endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionItem {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub total_litters: Option<i64>,
    #[serde(default)]
    pub average_litter_size: Option<f64>,
    /// Ratio in 0..=1
    #[serde(default)]
    pub kit_survival_rate: Option<f64>,
    #[serde(default)]
    pub average_days_to_harvest: Option<f64>,
    #[serde(default)]
    pub harvested_rabbits: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoParams {
    pub kindling_window_days: u32,
    pub wean_age_days: u32,
    pub harvest_age_days: u32,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoItem {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardTodo {
    pub as_of: NaiveDate,
    #[serde(default)]
    pub params: Option<TodoParams>,
    #[serde(default)]
    pub kindlings_due: Vec<TodoItem>,
    #[serde(default)]
    pub weanings_due: Vec<TodoItem>,
    #[serde(default)]
    pub harvest_ready: Vec<TodoItem>,
}

// -----------------------------
// Reports
// -----------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRange {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportKpis {
    #[serde(default)]
    pub total_litters: Option<i64>,
    #[serde(default)]
    pub avg_litter_size: Option<f64>,
    #[serde(default)]
    pub survival_to_wean: Option<f64>,
    #[serde(default)]
    pub harvested_count: Option<i64>,
    #[serde(default)]
    pub avg_days_to_harvest: Option<f64>,
    #[serde(default)]
    pub avg_yield: Option<f64>,
    #[serde(default)]
    pub mortality_count: Option<i64>,
    #[serde(default)]
    pub total_feed_cost: Option<f64>,
    #[serde(default)]
    pub avg_feed_cost_per_month: Option<f64>,
    #[serde(default)]
    pub cost_per_harvested_rabbit: Option<f64>,
}

/// One point of a chronological series; the backend keys the label `month`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(alias = "month")]
    pub label: String,
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(default)]
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(default)]
    pub range: ReportRange,
    #[serde(default)]
    pub kpis: ReportKpis,
    #[serde(default)]
    pub series: BTreeMap<String, Series>,
}

impl ReportSummary {
    /// Named series, or an empty one titled `fallback_name` when absent
    pub fn series_or_empty(&self, key: &str, fallback_name: &str) -> Series {
        self.series
            .get(key)
            .cloned()
            .unwrap_or_else(|| Series::empty(fallback_name))
    }
}
