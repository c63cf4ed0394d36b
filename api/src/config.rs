//! Runtime configuration, read from the environment. Every variable has a
//! default so the service starts without any external broker or result
//! backend configured — the in-memory implementations in the `broker`
//! crate stand in until a real transport is wired up.

use std::time::Duration;

const DEFAULT_HTTP_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_DEADLINE_MS: u64 = 3000;

#[derive(Debug, Clone)]
pub struct Settings {
  pub broker_url: Option<String>,
  pub result_backend_url: Option<String>,
  pub request_deadline: Duration,
  pub http_addr: String,
}

impl Settings {
  pub fn from_env() -> Self {
    Self {
      broker_url: std::env::var("BROKER_URL").ok(),
      result_backend_url: std::env::var("RESULT_BACKEND_URL").ok(),
      request_deadline: Duration::from_millis(
        std::env::var("REQUEST_DEADLINE_MS")
          .ok()
          .and_then(|v| v.parse().ok())
          .unwrap_or(DEFAULT_REQUEST_DEADLINE_MS),
      ),
      http_addr: std::env::var("HTTP_ADDR").unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_apply_when_nothing_is_set() {
    std::env::remove_var("REQUEST_DEADLINE_MS");
    std::env::remove_var("HTTP_ADDR");
    let settings = Settings::from_env();
    assert_eq!(settings.request_deadline, Duration::from_millis(3000));
    assert_eq!(settings.http_addr, "127.0.0.1:8080");
  }

  #[test]
  fn request_deadline_reads_from_the_environment() {
    std::env::set_var("REQUEST_DEADLINE_MS", "500");
    let settings = Settings::from_env();
    assert_eq!(settings.request_deadline, Duration::from_millis(500));
    std::env::remove_var("REQUEST_DEADLINE_MS");
  }
}
