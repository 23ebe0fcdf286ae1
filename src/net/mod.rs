//! Network boundary.
//!
//! The rest of the crate sees the remote API only through [`Transport`], an
//! async "GET this URL" seam, and [`ApiClient`], which knows the endpoint
//! paths. Tests substitute a scripted transport.

mod api;
mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use api::{ApiClient, Endpoint};
pub use http::HttpTransport;

use std::future::Future;

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A request did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("server unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("server answered HTTP {0}")]
    Status(u16),
}

/// Async HTTP GET.
pub trait Transport: Send + Sync {
    /// Fetch `url`. Any status code is a successful transport round trip.
    fn get(
        &self,
        url: &reqwest::Url,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}
