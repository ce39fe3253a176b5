//! In-memory transport for tests and offline development.
//!
//! Serves canned responses keyed by a URL fragment and records every request,
//! so tests can assert both what the client produced and what it asked for.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::transport::{Transport, TransportError, TransportResponse};

#[derive(Debug, Clone)]
enum Canned {
    Response(TransportResponse),
    Failure(String),
}

/// One request seen by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport answering from a fixed table.
///
/// The first registered fragment contained in the requested URL wins.
/// Unmatched URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Vec<(String, Canned)>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs containing `fragment` with a status and body.
    pub fn with_response(
        mut self,
        fragment: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.routes.push((
            fragment.into(),
            Canned::Response(TransportResponse::new(status, body)),
        ));
        self
    }

    /// Answer URLs containing `fragment` with 200 and a JSON body.
    pub fn with_json(self, fragment: impl Into<String>, body: &serde_json::Value) -> Self {
        self.with_response(fragment, 200, body.to_string())
    }

    /// Fail URLs containing `fragment` at the network level.
    pub fn with_failure(mut self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes
            .push((fragment.into(), Canned::Failure(message.into())));
        self
    }

    /// Every request seen so far, oldest first.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse, TransportError> {
        self.requests.write().await.push(RecordedRequest {
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(n, v)| ((*n).to_string(), (*v).to_string()))
                .collect(),
        });

        let canned = self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, canned)| canned);

        match canned {
            Some(Canned::Response(response)) => Ok(response.clone()),
            Some(Canned::Failure(message)) => Err(TransportError::Unavailable(message.clone())),
            None => Ok(TransportResponse::new(
                404,
                format!("no mock response for {url}"),
            )),
        }
    }
}
