//! HTTP client for the remote tailoring function.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::tailoring::{
    RetryPolicy, Tailor, TailorEnvelope, TailorError, TailorRequest, TailoredResume,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct TailorClient {
    client: Client,
    function_url: String,
    api_key: String,
    retry: RetryPolicy,
}

impl TailorClient {
    pub fn new(function_url: String, api_key: String, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            function_url,
            api_key,
            retry,
        })
    }
}

#[async_trait]
impl Tailor for TailorClient {
    /// Invokes the function, retrying 429/5xx and transport errors with
    /// exponential backoff. The last retryable error is returned once the
    /// attempts run out.
    async fn tailor(&self, request: &TailorRequest) -> Result<TailoredResume, TailorError> {
        let mut attempt = 0;

        loop {
            let response = self
                .client
                .post(&self.function_url)
                .bearer_auth(&self.api_key)
                .header("apikey", &self.api_key)
                .json(request)
                .send()
                .await;

            let retryable = match response {
                Err(e) => TailorError::Http(e),
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        warn!("Tailoring function returned {}: {}", status, body);
                        TailorError::Api {
                            status: status.as_u16(),
                            message: body,
                        }
                    } else {
                        let body = response.text().await?;

                        if !status.is_success() {
                            // Client errors usually still come wrapped in the envelope.
                            return Err(match serde_json::from_str::<TailorEnvelope>(&body) {
                                Ok(TailorEnvelope {
                                    error: Some(message),
                                    ..
                                }) => TailorError::Rejected(message),
                                _ => TailorError::Api {
                                    status: status.as_u16(),
                                    message: body,
                                },
                            });
                        }

                        let envelope: TailorEnvelope =
                            serde_json::from_str(&body).map_err(|e| {
                                warn!("Tailoring response is not a valid envelope: {e}");
                                TailorError::MalformedEnvelope
                            })?;

                        debug!("Tailoring succeeded for resume {}", request.resume_id);
                        return envelope.into_result();
                    }
                }
            };

            attempt += 1;
            if attempt >= self.retry.max_attempts {
                return Err(retryable);
            }

            let delay = self.retry.delay_before(attempt);
            warn!(
                "Tailoring attempt {} failed ({}), retrying after {}ms...",
                attempt,
                retryable,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
