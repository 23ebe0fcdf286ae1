//! Scripted transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{HttpResponse, Transport, TransportError};

#[derive(Debug, Clone)]
enum Scripted {
    Reply(HttpResponse),
    Fail(TransportError),
}

/// Answers requests from a table keyed by `path` or `path?query`.
///
/// Unscripted requests fail as unreachable. Every requested URL is
/// recorded.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, key: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.set_reply(key, status, body);
        self
    }

    pub fn fail(self, key: &str, error: TransportError) -> Self {
        self.set_failure(key, error);
        self
    }

    pub fn set_reply(&self, key: &str, status: u16, body: impl Into<Vec<u8>>) {
        let response = HttpResponse {
            status,
            body: body.into(),
        };
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), Scripted::Reply(response));
    }

    pub fn set_failure(&self, key: &str, error: TransportError) {
        self.replies
            .lock()
            .unwrap()
            .insert(key.to_string(), Scripted::Fail(error));
    }

    /// Requested URLs, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn get(&self, url: &reqwest::Url) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(url.to_string());

        let key = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let scripted = self.replies.lock().unwrap().get(&key).cloned();

        match scripted {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail(error)) => Err(error),
            None => Err(TransportError::Unreachable(format!("no scripted reply for {key}"))),
        }
    }
}
