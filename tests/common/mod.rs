//! Shared helpers for the integration tests
//!
//! Mirrors the crate's internal `MockTransport`, which is compiled only into
//! the unit tests and so cannot be reached from here.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use bandcamp::client::{HttpResponse, Transport};
use bandcamp::{ApiError, BandcampClient, ClientConfig};

/// Canned-response transport that records the URLs it was asked for
#[derive(Clone, Default)]
pub struct RecordingTransport {
    routes: Vec<(String, HttpResponse)>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers URLs containing `fragment` with a 200 and `body`
    pub fn respond(self, fragment: &str, body: &str) -> Self {
        self.respond_with_status(fragment, 200, body)
    }

    /// Answers URLs containing `fragment` with the given status and body
    pub fn respond_with_status(mut self, fragment: &str, status: u16, body: &str) -> Self {
        self.routes.push((
            fragment.to_string(),
            HttpResponse {
                status,
                body: body.as_bytes().to_vec(),
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for RecordingTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ApiError> {
        self.calls.borrow_mut().push(url.to_string());
        Ok(self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(HttpResponse {
                status: 404,
                body: Vec::new(),
            }))
    }
}

/// Client with a test key, caching into `cache_dir` when given
pub fn client_with(transport: &RecordingTransport, cache_dir: Option<&Path>) -> BandcampClient {
    let config = ClientConfig::new("integration-key");
    let config = match cache_dir {
        Some(dir) => config.with_cache_dir(dir),
        None => config.without_cache(),
    };
    BandcampClient::with_transport(config, transport.clone())
}
