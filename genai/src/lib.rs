//! Client for the image-generation / chat-completions provider.
//!
//! Every outbound call to the provider goes through this crate; routes
//! never talk to the API directly. Provider failures are folded into the
//! fixed taxonomy in `common::error::GenerationErrorCode` so clients get a
//! stable `code` + `retryable` pair regardless of which upstream call
//! failed.

use std::time::Duration;

use common::error::{AppError, GenerationErrorCode, Res};
use serde::{Deserialize, Serialize};

/// Default model for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
/// Default image size accepted by the generation endpoint.
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";
/// Model used for gap analysis chat completions.
pub const CHAT_MODEL: &str = "gpt-4o-mini";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Bound on downloading a generated image from the provider's ephemeral
/// URL; replaces the original's AbortSignal-based fetch timeout.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageGenerationResponse {
    data: Vec<GeneratedImage>,
}

/// One generated image as returned by the provider: either an ephemeral
/// URL or inline base64, depending on the provider's response format.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratedImage {
    pub url: Option<String>,
    pub b64_json: Option<String>,
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl GenAiClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Generates a single image for the prompt. The returned URL (if any)
    /// is ephemeral on the provider side; callers persist via the save
    /// endpoint.
    pub async fn generate_image(
        &self,
        prompt: &str,
        model: &str,
        size: &str,
    ) -> Res<GeneratedImage> {
        let body = ImageGenerationRequest {
            model,
            prompt,
            n: 1,
            size,
        };

        let response = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_provider_status(response).await?;
        let parsed: ImageGenerationResponse = response.json().await.map_err(transport_error)?;

        parsed.data.into_iter().next().ok_or(AppError::Generation {
            code: GenerationErrorCode::Unknown,
            message: "Provider returned no image data".to_string(),
        })
    }

    /// Single-turn chat completion, returning the assistant text.
    pub async fn chat_completion(&self, model: &str, system: &str, user: &str) -> Res<String> {
        let body = ChatCompletionRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_provider_status(response).await?;
        let parsed: ChatCompletionResponse = response.json().await.map_err(transport_error)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(AppError::Generation {
                code: GenerationErrorCode::Unknown,
                message: "Provider returned empty completion".to_string(),
            })
    }

    /// Downloads a generated image from the provider's ephemeral URL,
    /// bounded by `DOWNLOAD_TIMEOUT`.
    pub async fn fetch_image_bytes(&self, url: &str) -> Res<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(AppError::Generation {
                code: GenerationErrorCode::NetworkError,
                message: format!("Image download failed with status {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }
}

/// Maps transport-level reqwest failures (timeouts, DNS, connection
/// resets) to the `network_error` tag.
fn transport_error(err: reqwest::Error) -> AppError {
    AppError::Generation {
        code: GenerationErrorCode::NetworkError,
        message: format!("Provider request failed: {}", err),
    }
}

/// Turns a non-success provider response into the taxonomy error,
/// consuming the body for the provider's message.
async fn check_provider_status(response: reqwest::Response) -> Res<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (message, provider_code) = match serde_json::from_str::<ProviderError>(&body) {
        Ok(parsed) => (parsed.error.message, parsed.error.code),
        Err(_) => (format!("Provider returned status {}", status), None),
    };

    Err(AppError::Generation {
        code: classify_provider_error(status.as_u16(), provider_code.as_deref(), &message),
        message,
    })
}

/// Maps a provider HTTP status (plus its error code, when present) onto
/// the fixed taxonomy.
fn classify_provider_error(
    status: u16,
    provider_code: Option<&str>,
    message: &str,
) -> GenerationErrorCode {
    if let Some(code) = provider_code {
        if code.contains("content_policy") || code.contains("moderation") {
            return GenerationErrorCode::ContentPolicy;
        }
        if code == "insufficient_quota" || code == "billing_hard_limit_reached" {
            return GenerationErrorCode::QuotaExceeded;
        }
    }

    match status {
        400 if message.to_lowercase().contains("safety")
            || message.to_lowercase().contains("content policy") =>
        {
            GenerationErrorCode::ContentPolicy
        }
        400 | 422 => GenerationErrorCode::InvalidPrompt,
        402 => GenerationErrorCode::QuotaExceeded,
        429 => GenerationErrorCode::RateLimit,
        500..=599 => GenerationErrorCode::NetworkError,
        _ => GenerationErrorCode::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_invalid_prompt() {
        assert_eq!(
            classify_provider_error(400, None, "prompt must not be empty"),
            GenerationErrorCode::InvalidPrompt
        );
    }

    #[test]
    fn safety_rejection_maps_to_content_policy() {
        assert_eq!(
            classify_provider_error(400, None, "Your request was rejected by the safety system"),
            GenerationErrorCode::ContentPolicy
        );
        assert_eq!(
            classify_provider_error(400, Some("content_policy_violation"), "rejected"),
            GenerationErrorCode::ContentPolicy
        );
    }

    #[test]
    fn quota_exhaustion_beats_rate_limit_status() {
        // OpenAI reports exhausted billing quota as a 429 with a dedicated
        // error code; it must not be classified as retryable rate limiting.
        assert_eq!(
            classify_provider_error(429, Some("insufficient_quota"), "quota exceeded"),
            GenerationErrorCode::QuotaExceeded
        );
        assert_eq!(
            classify_provider_error(429, None, "slow down"),
            GenerationErrorCode::RateLimit
        );
    }

    #[test]
    fn server_errors_map_to_network_error() {
        assert_eq!(
            classify_provider_error(503, None, "overloaded"),
            GenerationErrorCode::NetworkError
        );
    }

    #[test]
    fn unexpected_statuses_map_to_unknown() {
        assert_eq!(
            classify_provider_error(418, None, "teapot"),
            GenerationErrorCode::Unknown
        );
    }
}
