//! In-memory transport for driving the API client and page controllers in tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use serde_json::Value;

use crate::services::api::{ApiClient, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::services::error::ApiError;

type Reply = Result<HttpResponse, ApiError>;

#[derive(Default)]
struct Inner {
    routes: HashMap<(HttpMethod, String), VecDeque<Reply>>,
    requests: Vec<HttpRequest>,
}

/// Scripted transport. Replies queue up per `(method, path)`; the last reply
/// for a route keeps answering once the queue is down to one.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Rc<RefCell<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::with_transport(String::new(), Rc::new(self.clone()))
    }

    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        let status_text = if (200..300).contains(&status) { "OK" } else { "Error" };
        self.respond_raw(method, path, status, status_text, &body.to_string());
    }

    pub fn respond_raw(&self, method: HttpMethod, path: &str, status: u16, status_text: &str, body: &str) {
        self.push(
            method,
            path,
            Ok(HttpResponse {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }),
        );
    }

    pub fn fail(&self, method: HttpMethod, path: &str, message: &str) {
        self.push(method, path, Err(ApiError::Network(message.to_string())));
    }

    /// Every request sent so far, in order
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.borrow().requests.clone()
    }

    /// JSON bodies of the requests sent with `method` to `path`
    pub fn bodies(&self, method: HttpMethod, path: &str) -> Vec<Value> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.url == path)
            .filter_map(|r| r.body)
            .map(|b| serde_json::from_str(&b).unwrap_or(Value::Null))
            .collect()
    }

    fn push(&self, method: HttpMethod, path: &str, reply: Reply) {
        self.inner
            .borrow_mut()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut inner = self.inner.borrow_mut();
        inner.requests.push(request.clone());

        let key = (request.method, request.url.clone());
        match inner.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| unreachable_reply(&request)),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| unreachable_reply(&request)),
            None => unreachable_reply(&request),
        }
    }
}

fn unreachable_reply(request: &HttpRequest) -> Reply {
    Err(ApiError::Network(format!(
        "no scripted reply for {} {}",
        request.method, request.url
    )))
}
