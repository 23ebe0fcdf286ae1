//! Endpoint paths of the summer school API.

use reqwest::Url;
use tracing::warn;

use super::{HttpResponse, Transport, TransportError};
use crate::error::{Error, Result};

/// One remote resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    GeneralInfo,
    Announcements,
    /// Calendar for the week `week` weeks from the current one.
    Events { week: i32 },
    LoginCode { code: String },
    Lecturers,
    SchoolInfo { school_id: String },
    ForumThreads,
    ForumComments { thread_id: String },
}

impl Endpoint {
    fn segments(&self) -> Vec<&str> {
        match self {
            Self::GeneralInfo => vec!["generalinfo", "item"],
            Self::Announcements => vec!["announcement", "item"],
            Self::Events { .. } => vec!["calendar", "event"],
            Self::LoginCode { .. } => vec!["loginCode"],
            Self::Lecturers => vec!["lecturer", "item"],
            Self::SchoolInfo { .. } => vec!["school", "item"],
            Self::ForumThreads => vec!["forum", "thread"],
            Self::ForumComments { thread_id } => vec!["forum", "thread", thread_id, "comment"],
        }
    }

    fn query(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Events { week } => Some(("week", week.to_string())),
            Self::LoginCode { code } => Some(("code", code.clone())),
            Self::SchoolInfo { school_id } => Some(("id", school_id.clone())),
            _ => None,
        }
    }
}

/// Typed access to the API rooted at `base_url`.
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
    base_url: Url,
}

impl<T: Transport> ApiClient<T> {
    /// Client rooted at `base_url` (e.g. `https://api.example.org/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `base_url` is not an absolute http(s) URL.
    pub fn new(transport: T, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!("API URL must be http(s): {base_url}")));
        }
        Ok(Self { transport, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL of `endpoint`.
    #[must_use]
    pub fn url(&self, endpoint: &Endpoint) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(endpoint.segments());
        }
        if let Some((key, value)) = endpoint.query() {
            url.query_pairs_mut().append_pair(key, &value);
        }
        url
    }

    /// GET `endpoint`, whatever the status.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response arrives.
    pub async fn fetch(&self, endpoint: &Endpoint) -> std::result::Result<HttpResponse, TransportError> {
        self.transport.get(&self.url(endpoint)).await
    }

    /// GET `endpoint` and return the body of a 2xx response.
    ///
    /// # Errors
    ///
    /// Non-2xx answers become [`TransportError::Status`].
    pub async fn fetch_ok(&self, endpoint: &Endpoint) -> std::result::Result<Vec<u8>, TransportError> {
        let response = self.fetch(endpoint).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            warn!(endpoint = ?endpoint, status = response.status, "Unexpected status");
            Err(TransportError::Status(response.status))
        }
    }

    /// GET a secondary resource such as an image.
    ///
    /// `path` is either absolute or relative to the API base.
    ///
    /// # Errors
    ///
    /// Fails on an unresolvable path, no response, or a non-2xx answer.
    pub async fn fetch_resource(&self, path: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let url = self.resource_url(path)?;
        let response = self.transport.get(&url).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(TransportError::Status(response.status))
        }
    }

    fn resource_url(&self, path: &str) -> std::result::Result<Url, TransportError> {
        if let Ok(url) = Url::parse(path) {
            return Ok(url);
        }
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::Unreachable(format!("bad resource path '{path}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::mock::MockTransport;

    fn client(base: &str) -> ApiClient<MockTransport> {
        ApiClient::new(MockTransport::new(), base).unwrap()
    }

    #[test]
    fn test_endpoint_urls() {
        let api = client("https://api.example.org/v1");

        assert_eq!(
            api.url(&Endpoint::GeneralInfo).as_str(),
            "https://api.example.org/v1/generalinfo/item"
        );
        assert_eq!(
            api.url(&Endpoint::Announcements).as_str(),
            "https://api.example.org/v1/announcement/item"
        );
        assert_eq!(
            api.url(&Endpoint::Events { week: -1 }).as_str(),
            "https://api.example.org/v1/calendar/event?week=-1"
        );
        assert_eq!(
            api.url(&Endpoint::LoginCode { code: "AB12CD34".into() }).as_str(),
            "https://api.example.org/v1/loginCode?code=AB12CD34"
        );
        assert_eq!(
            api.url(&Endpoint::SchoolInfo { school_id: "S1".into() }).as_str(),
            "https://api.example.org/v1/school/item?id=S1"
        );
        assert_eq!(
            api.url(&Endpoint::ForumComments { thread_id: "t 1".into() }).as_str(),
            "https://api.example.org/v1/forum/thread/t%201/comment"
        );
    }

    #[test]
    fn test_trailing_slash_base() {
        let api = client("https://api.example.org/");
        assert_eq!(
            api.url(&Endpoint::Lecturers).as_str(),
            "https://api.example.org/lecturer/item"
        );
    }

    #[test]
    fn test_rejects_non_http_base() {
        let err = ApiClient::new(MockTransport::new(), "file:///tmp").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(ApiClient::new(MockTransport::new(), "not a url").is_err());
    }

    #[test]
    fn test_resource_url_relative_and_absolute() {
        let api = client("https://api.example.org/v1");
        assert_eq!(
            api.resource_url("/images/ada.png").unwrap().as_str(),
            "https://api.example.org/v1/images/ada.png"
        );
        assert_eq!(
            api.resource_url("https://cdn.example.org/x.png").unwrap().as_str(),
            "https://cdn.example.org/x.png"
        );
    }

    #[tokio::test]
    async fn test_fetch_ok_maps_status() {
        let transport = MockTransport::new().reply("/v1/lecturer/item", 503, "down");
        let api = ApiClient::new(transport, "https://api.example.org/v1").unwrap();

        let err = api.fetch_ok(&Endpoint::Lecturers).await.unwrap_err();
        assert_eq!(err, TransportError::Status(503));

        let raw = api.fetch(&Endpoint::Lecturers).await.unwrap();
        assert_eq!(raw.status, 503);
    }
}
