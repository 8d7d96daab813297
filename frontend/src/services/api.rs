use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use gloo::net::http::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared::{
    Animal, AnimalCreate, AnimalStatusUpdate, Breeding, BreedingCreate, BreedingUpdate,
    DashboardTodo, FeedCost, FeedCostCreate, GenerateKitsRequest, GenerateKitsResponse, Harvest,
    HarvestCreate, HarvestUpdate, Litter, LitterCreate, LitterUpdate, Metrics, OptionItem,
    ReportRange, ReportSummary, Sale, SaleCreate,
};

use crate::config::TodoThresholds;
use crate::services::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        })
    }
}

/// A fully resolved request handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network seam. The browser build uses [`GlooTransport`]; tests swap in
/// an in-memory implementation.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// `fetch`-backed transport built on gloo-net
pub struct GlooTransport;

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match request.method {
            HttpMethod::Get => Request::get(&request.url),
            HttpMethod::Post => Request::post(&request.url),
            HttpMethod::Patch => Request::patch(&request.url),
            HttpMethod::Delete => Request::delete(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let sent = match request.body {
            Some(body) => builder
                .body(body)
                .map_err(|e| ApiError::Encode(e.to_string()))?
                .send()
                .await,
            None => builder.send().await,
        };
        let response = sent.map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            // An unreadable body is treated the same as an empty one
            body: response.text().await.unwrap_or_default(),
        })
    }
}

/// Per-call options. Headers given here replace the defaults by name.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// API client for the ranch backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Rc<dyn Transport>,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        self.base_url == other.base_url && Rc::ptr_eq(&self.transport, &other.transport)
    }
}

impl ApiClient {
    /// An empty base talks to the page's own origin
    pub fn with_base_url(base_url: String) -> Self {
        Self::with_transport(base_url, Rc::new(GlooTransport))
    }

    pub fn with_transport(base_url: String, transport: Rc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// The body is parsed whatever the status; an unparseable or empty body
    /// becomes `Value::Null`. A non-success status turns into
    /// [`ApiError::Status`] carrying the body's `detail` when there is one.
    pub async fn call(
        &self,
        method: HttpMethod,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        for (name, value) in options.headers {
            headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            headers.push((name, value));
        }

        let request = HttpRequest {
            method,
            url: self.url(path),
            headers,
            body: options.body,
        };
        log::debug!(target: "api", "{} {}", request.method, request.url);

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!(target: "api", "{} {} failed: {}", method, path, e);
            e
        })?;

        let data: Value = serde_json::from_str(&response.body).unwrap_or(Value::Null);
        if !response.ok() {
            let err = ApiError::from_status(response.status, &response.status_text, &data);
            log::warn!(target: "api", "{} {} -> {}: {}", method, path, response.status, err);
            return Err(err);
        }
        Ok(data)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let data = self.call(HttpMethod::Get, path, RequestOptions::default()).await?;
        decode(data)
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let data = self.call(HttpMethod::Post, path, json_body(body)?).await?;
        decode(data)
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let data = self.call(HttpMethod::Patch, path, json_body(body)?).await?;
        decode(data)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.call(HttpMethod::Delete, path, RequestOptions::default())
            .await
            .map(|_| ())
    }

    // Animals

    pub async fn list_animals(&self) -> Result<Vec<Animal>, ApiError> {
        self.get("/animals/").await
    }

    pub async fn create_animal(&self, payload: &AnimalCreate) -> Result<Animal, ApiError> {
        self.post("/animals/", payload).await
    }

    pub async fn update_animal_status(
        &self,
        animal_id: i64,
        payload: &AnimalStatusUpdate,
    ) -> Result<Animal, ApiError> {
        self.patch(&format!("/animals/{}", animal_id), payload).await
    }

    // Breedings

    pub async fn list_breedings(&self) -> Result<Vec<Breeding>, ApiError> {
        self.get("/breedings/").await
    }

    pub async fn create_breeding(&self, payload: &BreedingCreate) -> Result<Breeding, ApiError> {
        self.post("/breedings/", payload).await
    }

    pub async fn update_breeding(
        &self,
        breeding_id: i64,
        payload: &BreedingUpdate,
    ) -> Result<Breeding, ApiError> {
        self.patch(&format!("/breedings/{}", breeding_id), payload).await
    }

    // Litters

    pub async fn list_litters(&self) -> Result<Vec<Litter>, ApiError> {
        self.get("/litters/").await
    }

    pub async fn create_litter(&self, payload: &LitterCreate) -> Result<Litter, ApiError> {
        self.post("/litters/", payload).await
    }

    pub async fn update_litter(
        &self,
        litter_id: i64,
        payload: &LitterUpdate,
    ) -> Result<Litter, ApiError> {
        self.patch(&format!("/litters/{}", litter_id), payload).await
    }

    pub async fn generate_kits(
        &self,
        litter_id: i64,
        payload: &GenerateKitsRequest,
    ) -> Result<GenerateKitsResponse, ApiError> {
        self.post(&format!("/litters/{}/generate-kits", litter_id), payload)
            .await
    }

    // Harvests

    pub async fn list_harvests(&self) -> Result<Vec<Harvest>, ApiError> {
        self.get("/harvests/").await
    }

    pub async fn create_harvest(&self, payload: &HarvestCreate) -> Result<Harvest, ApiError> {
        self.post("/harvests/", payload).await
    }

    pub async fn update_harvest(
        &self,
        harvest_id: i64,
        payload: &HarvestUpdate,
    ) -> Result<Harvest, ApiError> {
        self.patch(&format!("/harvests/{}", harvest_id), payload).await
    }

    // Feed costs

    pub async fn list_feed_costs(&self) -> Result<Vec<FeedCost>, ApiError> {
        self.get("/feed-costs/").await
    }

    pub async fn create_feed_cost(&self, payload: &FeedCostCreate) -> Result<FeedCost, ApiError> {
        self.post("/feed-costs/", payload).await
    }

    pub async fn delete_feed_cost(&self, feed_cost_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/feed-costs/{}", feed_cost_id)).await
    }

    // Sales

    pub async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.get("/sales/").await
    }

    pub async fn create_sale(&self, payload: &SaleCreate) -> Result<Sale, ApiError> {
        self.post("/sales/", payload).await
    }

    /// Server side, this also reverts the sold animal(s) to their prior status
    pub async fn delete_sale(&self, sale_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/sales/{}", sale_id)).await
    }

    // Dropdown options

    pub async fn breeding_options(&self) -> Result<Vec<OptionItem>, ApiError> {
        self.get("/options/breedings").await
    }

    pub async fn litter_options(&self, only_not_weaned: bool) -> Result<Vec<OptionItem>, ApiError> {
        self.get(&format!("/options/litters?only_not_weaned={}", only_not_weaned))
            .await
    }

    pub async fn animal_options(&self, status: Option<&str>) -> Result<Vec<OptionItem>, ApiError> {
        match status {
            Some(status) => self.get(&format!("/options/animals?status={}", status)).await,
            None => self.get("/options/animals").await,
        }
    }

    // Dashboard and reports

    pub async fn metrics(&self) -> Result<Metrics, ApiError> {
        self.get("/metrics").await
    }

    pub async fn dashboard_todo(&self, thresholds: &TodoThresholds) -> Result<DashboardTodo, ApiError> {
        self.get(&format!(
            "/dashboard/todo?kindling_window_days={}&wean_age_days={}&harvest_age_days={}",
            thresholds.kindling_window_days, thresholds.wean_age_days, thresholds.harvest_age_days
        ))
        .await
    }

    pub async fn report_summary(&self, range: &ReportRange) -> Result<ReportSummary, ApiError> {
        self.get(&report_summary_path(range)).await
    }

    /// Absolute link to one of the CSV exports (`breedings`, `litters`, ...)
    pub fn export_url(&self, name: &str) -> String {
        self.url(&format!("/reports/{}.csv", name))
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<RequestOptions, ApiError> {
    let body = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
    Ok(RequestOptions {
        headers: Vec::new(),
        body: Some(body),
    })
}

fn decode<T: DeserializeOwned>(data: Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `/reports/summary` with only the bounds that are set
pub fn report_summary_path(range: &ReportRange) -> String {
    let mut params = Vec::new();
    if let Some(start) = range.start_date {
        params.push(format!("start_date={}", start));
    }
    if let Some(end) = range.end_date {
        params.push(format!("end_date={}", end));
    }
    if params.is_empty() {
        "/reports/summary".to_string()
    } else {
        format!("/reports/summary?{}", params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::MockTransport;
    use chrono::NaiveDate;
    use futures::executor::block_on;
    use serde_json::json;

    #[test]
    fn test_call_sends_json_content_type() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Get, "/metrics", 200, json!({ "total_litters": 2 }));
        let api = mock.client();

        let metrics = block_on(api.metrics()).unwrap();
        assert_eq!(metrics.total_litters, Some(2));

        let sent = mock.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn test_caller_header_overrides_default() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Get, "/metrics", 200, json!({}));
        let api = mock.client();

        let options = RequestOptions {
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: None,
        };
        block_on(api.call(HttpMethod::Get, "/metrics", options)).unwrap();

        assert_eq!(
            mock.requests()[0].headers,
            vec![("content-type".to_string(), "text/plain".to_string())]
        );
    }

    #[test]
    fn test_unparseable_body_is_null_not_an_error() {
        let mock = MockTransport::new();
        mock.respond_raw(HttpMethod::Delete, "/sales/3", 204, "No Content", "");
        let api = mock.client();

        assert_eq!(block_on(api.delete_sale(3)), Ok(()));
    }

    #[test]
    fn test_error_status_uses_detail_then_status_text() {
        let mock = MockTransport::new();
        mock.respond(HttpMethod::Get, "/animals/", 404, json!({ "detail": "Animal not found" }));
        mock.respond_raw(HttpMethod::Get, "/litters/", 500, "Internal Server Error", "<html>");
        let api = mock.client();

        let err = block_on(api.list_animals()).unwrap_err();
        assert_eq!(err.to_string(), "Animal not found");

        let err = block_on(api.list_litters()).unwrap_err();
        assert_eq!(err.to_string(), "Internal Server Error");
    }

    #[test]
    fn test_network_failure_surfaces_immediately() {
        let mock = MockTransport::new();
        mock.fail(HttpMethod::Get, "/sales/", "connection refused");
        let api = mock.client();

        let err = block_on(api.list_sales()).unwrap_err();
        assert_eq!(err, ApiError::Network("connection refused".to_string()));
        assert_eq!(mock.requests().len(), 1);
    }

    #[test]
    fn test_report_summary_path_includes_only_set_bounds() {
        let none = ReportRange::default();
        assert_eq!(report_summary_path(&none), "/reports/summary");

        let start_only = ReportRange {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: None,
        };
        assert_eq!(report_summary_path(&start_only), "/reports/summary?start_date=2024-01-01");

        let both = ReportRange {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        };
        assert_eq!(
            report_summary_path(&both),
            "/reports/summary?start_date=2024-01-01&end_date=2024-06-30"
        );
    }

    #[test]
    fn test_base_url_is_prefixed_without_double_slash() {
        let api = ApiClient::with_transport("http://ranch.local/".to_string(), Rc::new(MockTransport::new()));
        assert_eq!(api.url("/animals/"), "http://ranch.local/animals/");
        assert_eq!(api.export_url("litters"), "http://ranch.local/reports/litters.csv");
    }
}
