//! HTTP client for scan-sharing services

use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

use fusion_core::ScanSettings;

/// Errors from remote scan fetching
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Failed to build scan client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Scan service returned status {0}")]
    Status(u16),

    #[error("Failed to parse scan: {0}")]
    Parse(String),
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client for scan services
pub fn create_scan_client(settings: &ScanSettings) -> Result<Client, ScanError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.timeout_secs))
        .user_agent(random_user_agent())
        .build()
        .map_err(|e| ScanError::ClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        assert!(create_scan_client(&ScanSettings::default()).is_ok());
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(ua.contains("Mozilla"));
    }
}
