// src/net.rs
// HTTP transport. The site fronts its pages with Cloudflare-style bot checks,
// so the client keeps a cookie jar and presents a desktop browser profile.

use std::error::Error;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

pub struct Client {
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self { http })
    }

    /// GET `url`, bounded by `timeout`. Non-2xx statuses are errors so callers
    /// can treat "page missing" and "transport died" the same way.
    pub fn get(&self, url: &str, timeout: Duration) -> Result<String, Box<dyn Error>> {
        let resp = self.http.get(url).timeout(timeout).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(format!("HTTP {status} for {url}").into());
        }
        Ok(resp.text()?)
    }
}

/// Scheme + host (+ port) of a URL, for resolving root-relative links and
/// building the servlet endpoints. Returns the input unchanged if it has no
/// path component.
pub fn origin_of(url: &str) -> String {
    let after_scheme = match url.find("://") {
        Some(i) => i + 3,
        None => 0,
    };
    match url[after_scheme..].find('/') {
        Some(i) => s!(&url[..after_scheme + i]),
        None => s!(url),
    }
}
