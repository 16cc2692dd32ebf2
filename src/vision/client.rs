//! Vision locator HTTP client implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::errors::{OverlayError, Result};
use crate::types::{BoxSpec, ScreenFrame};
use crate::vision::models::{parse_locate_boxes, GenerateContentRequest, GenerateContentResponse};
use crate::vision::{ElementLocator, VisionConfig};

/// Sliding-window request budget
#[derive(Debug)]
struct RateLimit {
    max_rpm: u32,
    requests: u32,
    window_start: Instant,
}

impl RateLimit {
    fn new(max_rpm: u32) -> Self {
        Self {
            max_rpm,
            requests: 0,
            window_start: Instant::now(),
        }
    }

    fn allow(&mut self) -> bool {
        let now = Instant::now();
        if now.duration_since(self.window_start) >= Duration::from_secs(60) {
            self.requests = 0;
            self.window_start = now;
        }
        self.requests < self.max_rpm
    }

    fn record(&mut self) {
        self.requests += 1;
    }
}

/// HTTP client for the vision-locate API
pub struct VisionClient {
    config: VisionConfig,
    client: reqwest::Client,
    rate_limit: Arc<Mutex<RateLimit>>,
}

impl VisionClient {
    /// Create a new client from a validated configuration
    pub fn new(config: VisionConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("dotglow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OverlayError::Network(format!("Failed to create HTTP client: {e}")))?;

        let rate_limit = Arc::new(Mutex::new(RateLimit::new(config.rate_limit_rpm)));

        info!("vision client initialized with model: {}", config.model);

        Ok(Self {
            config,
            client,
            rate_limit,
        })
    }

    /// Make a request to the API with bounded retries
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let mut last_error = None;

        for attempt in 1..=self.config.max_retries {
            {
                let mut rate_limit = self.rate_limit.lock().await;
                if !rate_limit.allow() {
                    warn!("vision API rate limit exceeded, waiting...");
                    drop(rate_limit);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    continue;
                }
                rate_limit.record();
            }

            debug!(
                "vision API attempt {} of {}",
                attempt, self.config.max_retries
            );

            match self.make_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!("vision API attempt {} failed: {}", attempt, e);
                    last_error = Some(e);

                    if attempt < self.config.max_retries {
                        let delay = Duration::from_millis(1000 * u64::from(attempt));
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| OverlayError::Network("All vision API attempts failed".to_string())))
    }

    /// Make a single request to the API
    async fn make_request(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let endpoint = self.config.model.endpoint();
        let url = self.config.endpoint_url(&endpoint);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| OverlayError::Network(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            error!("vision API error {}: {}", status, error_text);
            return Err(OverlayError::Network(format!(
                "vision API error {status}: {error_text}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OverlayError::Serialization(format!("Failed to parse response: {e}")))?;

        if parsed.is_blocked() {
            warn!("vision response was blocked by safety filters");
            return Err(OverlayError::VisionApi(
                "Response blocked by safety filters".to_string(),
            ));
        }

        Ok(parsed)
    }

    /// Get the model being used
    pub fn model(&self) -> &str {
        self.config.model.model_name()
    }
}

#[async_trait]
impl ElementLocator for VisionClient {
    async fn locate(&self, query: &str, frame: &ScreenFrame) -> Result<Vec<BoxSpec>> {
        let request = GenerateContentRequest::new_locate(query, frame);
        debug!("locating {:?} with model {}", query, self.config.model);

        let response = self.generate_content(&request).await?;
        let text = response
            .get_text()
            .ok_or_else(|| OverlayError::VisionApi("Empty response from model".to_string()))?;

        let boxes = parse_locate_boxes(&text);
        info!("vision locate returned {} box(es)", boxes.len());
        Ok(boxes)
    }
}
