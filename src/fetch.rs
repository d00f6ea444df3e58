use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use crate::config;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("GET {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// A fetched page: status code plus body text.
#[derive(Debug)]
pub struct Page {
    pub status: StatusCode,
    pub body: String,
}

/// Sequential HTTP fetcher with browser-like headers.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(proxy: Option<&str>, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(config::ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(config::ACCEPT_LANGUAGE));

        let mut builder = Client::builder()
            .user_agent(config::USER_AGENT)
            .default_headers(headers)
            .timeout(timeout);
        if let Some(p) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(p)?);
        }
        Ok(Self { client: builder.build()? })
    }

    /// GET `url` and return the body, treating any non-2xx status as an error.
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let page = self.get_page(url, None).await?;
        if !page.status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: page.status.as_u16(),
            });
        }
        Ok(page.body)
    }

    /// GET `url` and return status + body without judging the status.
    pub async fn get_page(&self, url: &str, referer: Option<&str>) -> Result<Page, FetchError> {
        let mut req = self.client.get(url);
        if let Some(r) = referer {
            req = req.header(REFERER, r);
        }

        let start = Instant::now();
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = req.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;
        debug!(
            "GET {} -> {} ({} bytes, {}ms)",
            url,
            status.as_u16(),
            body.len(),
            start.elapsed().as_millis()
        );

        Ok(Page { status, body })
    }
}
