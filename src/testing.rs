//! Test utilities shared by the unit tests
//!
//! `MockTransport` answers requests from canned bodies and records every URL
//! it was asked for, so tests can assert on what went over the wire.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::client::{BandcampClient, HttpResponse, Transport};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// In-memory transport with routes matched by URL substring
///
/// Routes are checked in the order they were added. Clones share the
/// recorded calls, so a test can keep one handle after giving another to the
/// client.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    routes: Vec<(String, HttpResponse)>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers URLs containing `fragment` with a 200 and the given body
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

    /// URLs requested so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ApiError> {
        self.calls.borrow_mut().push(url.to_string());

        let response = self
            .routes
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or(HttpResponse {
                status: 404,
                body: b"not found".to_vec(),
            });
        Ok(response)
    }
}

/// Builds a client with API key `test-key` around a clone of the transport
///
/// Caching is enabled only when a directory is given.
pub fn test_client(transport: &MockTransport, cache_dir: Option<&Path>) -> BandcampClient {
    let config = ClientConfig::new("test-key");
    let config = match cache_dir {
        Some(dir) => config.with_cache_dir(dir),
        None => config.without_cache(),
    };
    BandcampClient::with_transport(config, transport.clone())
}
