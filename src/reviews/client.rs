//! HTTP client for review pages using wreq for TLS fingerprint emulation.

use crate::config::{Config, RequestMethod};
use crate::reviews::error::FetchError;
use crate::reviews::parser::Parser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for fetching review pages - enables mocking for tests.
#[async_trait]
pub trait ReviewFetch: Send + Sync {
    /// Retrieves the raw HTML of one listing page.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Review page client with browser impersonation and anti-bot measures.
pub struct ReviewClient {
    client: Client,
    method: RequestMethod,
    accept_language: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl ReviewClient {
    /// Creates a new client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            method: config.method,
            accept_language: config.accept_language.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Adds a random delay to mimic human behavior.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl ReviewFetch for ReviewClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.delay().await;

        debug!("{} {}", self.method, url);

        let request = match self.method {
            RequestMethod::Get => self.client.get(url),
            RequestMethod::Post => self.client.post(url),
        };

        let response = request
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", self.accept_language.as_str())
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .map_err(|e| FetchError::Transport { url: url.to_string(), reason: e.to_string() })?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). Consider using a proxy or increasing delay.");
            return Err(FetchError::RateLimited { url: url.to_string() });
        }

        if !(200..300).contains(&status) {
            return Err(FetchError::Status { url: url.to_string(), status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body { url: url.to_string(), reason: e.to_string() })?;

        if Parser::new().is_blocked(&body) {
            warn!("CAPTCHA page returned for {}", url);
            return Err(FetchError::Blocked { url: url.to_string() });
        }

        Ok(body)
    }
}
