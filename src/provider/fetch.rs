//! Remote asset download

use crate::{Error, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

/// Source of remote bytes
pub trait Fetch {
    /// Download `url`. Anything but a 200 response is an error.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP fetcher. One attempt per URL, no retries.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::fetch("<client>", e))?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().map_err(|e| Error::fetch(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::fetch(url, format!("status {}", status)));
        }

        let bytes = response.bytes().map_err(|e| Error::fetch(url, e))?;
        debug!(url, bytes = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}
