use gloo_net::http::Request;
use zoon::Timer;
use zoon::futures_util::future::FutureExt;
use zoon::futures_util::select;

use crate::config::{ConfigFetcher, FetchError, Settings};

/// Fetches repository files from Gitiles over `fetch`, giving up after a timeout.
#[derive(Debug, Clone, Copy)]
pub struct GitilesFetcher {
    timeout_ms: u32,
}

impl GitilesFetcher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            timeout_ms: settings.fetch_timeout_ms,
        }
    }
}

impl ConfigFetcher for GitilesFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut request = Box::pin(get_text(url)).fuse();
        let mut timeout = Box::pin(Timer::sleep(self.timeout_ms)).fuse();
        select! {
            body = request => body,
            _ = timeout => Err(FetchError::TimedOut { after_ms: self.timeout_ms }),
        }
    }
}

async fn get_text(url: &str) -> Result<String, FetchError> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|error| FetchError::Network(error.to_string()))?;
    if !response.ok() {
        return Err(FetchError::Status(response.status()));
    }
    response
        .text()
        .await
        .map_err(|error| FetchError::Network(error.to_string()))
}
