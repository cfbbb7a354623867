// Test doubles for the transport and summarizer seams.
//
// Routes are matched in insertion order, so register specific routes before
// general ones.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::summarizer::Summarizer;
use crate::transport::Transport;
use crate::{HarvestError, Result};

/// One upstream call captured by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    /// Value of a query parameter, if sent
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn matches(&self, url_prefix: Option<&str>, params: &[(String, String)]) -> bool {
        url_prefix.is_none_or(|prefix| self.url.starts_with(prefix))
            && params.iter().all(|(k, v)| self.param(k) == Some(v.as_str()))
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Json(Value),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Route {
    url_prefix: Option<String>,
    params: Vec<(String, String)>,
    response: MockResponse,
}

/// In-memory [`Transport`] returning canned JSON and recording every call
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

fn owned_params(params: &[(&str, &str)]) -> Vec<(String, String)> {
    params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer calls carrying all of `params` with `body`
    pub fn on(mut self, params: &[(&str, &str)], body: Value) -> Self {
        self.routes.push(Route { url_prefix: None, params: owned_params(params), response: MockResponse::Json(body) });
        self
    }

    /// Answer calls whose URL starts with `prefix` with `body`
    pub fn on_url(mut self, prefix: &str, body: Value) -> Self {
        self.routes.push(Route {
            url_prefix: Some(prefix.to_string()),
            params: Vec::new(),
            response: MockResponse::Json(body),
        });
        self
    }

    /// Fail calls carrying all of `params`
    pub fn fail_on(mut self, params: &[(&str, &str)], message: &str) -> Self {
        self.routes.push(Route {
            url_prefix: None,
            params: owned_params(params),
            response: MockResponse::Fail(message.to_string()),
        });
        self
    }

    /// Fail calls whose URL starts with `prefix`
    pub fn fail_on_url(mut self, prefix: &str, message: &str) -> Self {
        self.routes.push(Route {
            url_prefix: Some(prefix.to_string()),
            params: Vec::new(),
            response: MockResponse::Fail(message.to_string()),
        });
        self
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Number of calls carrying all of `params`
    pub fn count(&self, params: &[(&str, &str)]) -> usize {
        let params = owned_params(params);
        self.calls().iter().filter(|call| call.matches(None, &params)).count()
    }

    /// Number of calls whose URL starts with `prefix`
    pub fn count_url(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.matches(Some(prefix), &[])).count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get_json(&self, url: &str, params: &[(&'static str, String)]) -> Result<Value> {
        let call = RecordedCall {
            url: url.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        };

        let route = self
            .routes
            .iter()
            .find(|route| call.matches(route.url_prefix.as_deref(), &route.params))
            .cloned();

        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }

        match route.map(|r| r.response) {
            Some(MockResponse::Json(body)) => Ok(body),
            Some(MockResponse::Fail(message)) => Err(HarvestError::UpstreamStatus { status: 500, url: message }),
            None => Err(HarvestError::MalformedResponse(format!("no mock route for {}", url))),
        }
    }
}

/// [`Summarizer`] returning a fixed paragraph, or failing when built with `failing`
#[derive(Debug, Clone, Default)]
pub struct StaticSummarizer {
    reply: Option<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticSummarizer {
    pub fn new(reply: &str) -> Self {
        Self { reply: Some(reply.to_string()), calls: Arc::default() }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    /// Titles summarized so far
    pub fn titles(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Summarizer for StaticSummarizer {
    async fn summarize(&self, title: &str, _summary: &str, _categories: &[String]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(title.to_string());
        }
        self.reply
            .clone()
            .ok_or_else(|| HarvestError::Summarizer("no model configured".to_string()))
    }
}
