//! Notification delivery seam.
//!
//! The scheduler persists every reminder as a `notifications` row itself;
//! the [`NotificationSink`] only covers the external push leg. Delivery is
//! fire-and-forget from the core's perspective: failures are logged by the
//! caller and never retried.

use std::time::Duration;

use async_trait::async_trait;

/// HTTP request timeout for a single push attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The push gateway returned a non-2xx status code.
    #[error("Push gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

/// External delivery channel for reminder pushes.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one push message to the device identified by `device_token`.
    async fn deliver(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<(), DeliveryError>;
}

// ---------------------------------------------------------------------------
// PushDelivery
// ---------------------------------------------------------------------------

/// Delivers pushes to an HTTP gateway (FCM-compatible relay).
pub struct PushDelivery {
    client: reqwest::Client,
    gateway_url: String,
}

impl PushDelivery {
    /// Create a delivery channel posting to the given gateway URL.
    pub fn new(gateway_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            gateway_url: gateway_url.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for PushDelivery {
    async fn deliver(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        let payload = serde_json::json!({
            "to": device_token,
            "notification": { "title": title, "body": body },
            "data": data,
        });

        let response = self
            .client
            .post(&self.gateway_url)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeliveryError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogSink
// ---------------------------------------------------------------------------

/// Sink that only logs. Used when no push gateway is configured, and as the
/// default in tests.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(
        &self,
        device_token: &str,
        title: &str,
        body: &str,
        _data: &serde_json::Value,
    ) -> Result<(), DeliveryError> {
        tracing::info!(device_token, title, body, "Push delivery (log only)");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_delivery_builds_client() {
        let _delivery = PushDelivery::new("http://localhost:9999/push");
    }

    #[tokio::test]
    async fn log_sink_always_succeeds() {
        let sink = LogSink;
        let result = sink
            .deliver("token-1", "Title", "Body", &serde_json::json!({}))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn delivery_error_display_http_status() {
        let err = DeliveryError::HttpStatus(502);
        assert_eq!(err.to_string(), "Push gateway returned HTTP 502");
    }
}
