//! libcurl transport with a browser-like request profile.
//!
//! Some audio hosts reject requests that do not look like a browser, so every
//! GET carries a desktop User-Agent and the usual Accept headers.

use std::io::{self, Write};
use std::time::Duration;

use super::{FetchError, Transport};
use crate::config::PodfetchConfig;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const BROWSER_HEADERS: [&str; 4] = [
    "Accept: text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    "Accept-Language: zh-CN,zh;q=0.8,en-US;q=0.5,en;q=0.3",
    "Connection: keep-alive",
    "Upgrade-Insecure-Requests: 1",
];

const MAX_REDIRECTS: u32 = 10;

/// Blocking single-attempt GET via a fresh `curl::easy::Easy` per call.
///
/// `timeout` bounds connecting and any stall in the body (no bytes received for
/// that long). `total_timeout`, when set, caps the whole transfer so a server
/// trickling bytes cannot hold a worker forever.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    timeout: Duration,
    total_timeout: Option<Duration>,
    user_agent: String,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl CurlTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            total_timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn from_config(cfg: &PodfetchConfig) -> Self {
        let mut t = Self::new(Duration::from_secs(cfg.request_timeout_secs.max(1)));
        if cfg.transfer_timeout_secs > 0 {
            t.total_timeout = Some(Duration::from_secs(cfg.transfer_timeout_secs));
        }
        if let Some(ua) = &cfg.user_agent {
            t.user_agent = ua.clone();
        }
        t
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_total_timeout(mut self, total: Duration) -> Self {
        self.total_timeout = Some(total);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn total_timeout(&self) -> Option<Duration> {
        self.total_timeout
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.connect_timeout(self.timeout)?;
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.timeout)?;
        if let Some(total) = self.total_timeout {
            easy.timeout(total)?;
        }
        easy.useragent(&self.user_agent)?;
        // Sends Accept-Encoding and lets curl decode the body.
        easy.accept_encoding("gzip, deflate")?;

        let mut list = curl::easy::List::new();
        for h in BROWSER_HEADERS {
            list.append(h)?;
        }
        easy.http_headers(list)?;
        Ok(())
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64, FetchError> {
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url)?;

        let mut written = 0u64;
        let mut write_err: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(FetchError::Write(e));
        }
        performed?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        sink.flush().map_err(FetchError::Write)?;
        Ok(written)
    }
}
