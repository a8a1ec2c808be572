//! HTTP transport used by the client
//!
//! The `Transport` trait is the seam between the request layer and the
//! network. `HttpTransport` is the reqwest implementation used in production.

use reqwest::blocking::Client;

use crate::error::ApiError;

/// User agent sent with every request
const USER_AGENT: &str = concat!("bandcamp-rs/", env!("CARGO_PKG_VERSION"));

/// Status code and body of an HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs blocking HTTP GET requests
pub trait Transport {
    /// Issues a GET for the given URL and returns the raw response
    fn get(&self, url: &str) -> Result<HttpResponse, ApiError>;
}

/// Transport backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport with default settings
    pub fn new() -> Result<Self, ApiError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Create a transport around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, ApiError> {
        let response = self.client.get(url).send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();
        Ok(HttpResponse { status, body })
    }
}
