use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::time::{Duration, Instant};
use url::Url;

/// A received HTTP response, decoded into the pieces the pretty printer takes
#[derive(Debug, Clone)]
pub struct Response {
    /// Protocol version as it appears on the status line ("HTTP/1.1")
    pub version: String,

    /// HTTP status code (200, 404, etc.)
    pub status: u16,

    /// Human-readable status text ("OK", "Not Found", etc.)
    pub status_text: String,

    /// Response headers in the order the server sent them
    pub headers: Vec<(String, String)>,

    /// Raw response body, decoded as text
    pub body: String,

    /// Time taken to complete the request
    pub duration: Duration,
}

impl Response {
    /// Value of the `Content-Type` header, or an empty string
    pub fn content_type(&self) -> &str {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// One-line outcome for logging, e.g. `200 OK in 5 ms`
    pub fn summary(&self) -> String {
        format!(
            "{} {} in {} ms",
            self.status,
            self.status_text,
            self.duration.as_millis()
        )
    }

    /// Status line followed by one `Name: Value` line per header
    pub fn header_block(&self) -> String {
        let mut block = format!("{} {} {}", self.version, self.status, self.status_text);
        for (name, value) in &self.headers {
            block.push('\n');
            block.push_str(name);
            block.push_str(": ");
            block.push_str(value);
        }
        block
    }
}

/// Simple URL validation
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    Ok(())
}

/// Build a full URL with query parameters appended
pub fn build_url(base_url: &str, query_params: &[(String, String)]) -> Result<String, String> {
    let mut url = Url::parse(base_url).map_err(|e| format!("Invalid URL: {}", e))?;

    for (key, value) in query_params {
        url.query_pairs_mut().append_pair(key, value);
    }

    Ok(url.to_string())
}

/// Perform the request and collect the response
pub async fn execute_request(method: reqwest::Method, url: &str) -> Result<Response> {
    let client = reqwest::Client::new();

    // Start timing the request
    let start = Instant::now();

    let response = client
        .request(method.clone(), url)
        .send()
        .await
        .map_err(|e| eyre!("Request failed: {}", e))?;

    let duration = start.elapsed();
    tracing::debug!(%method, url, "response headers received");

    let version = format!("{:?}", response.version());
    let status = response.status().as_u16();
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown")
        .to_string();

    let headers = response
        .headers()
        .iter()
        .map(|(key, value)| {
            (
                key.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let body = response
        .text()
        .await
        .map_err(|e| eyre!("Failed to read response body: {}", e))?;

    Ok(Response {
        version,
        status,
        status_text,
        headers,
        body,
        duration,
    })
}
