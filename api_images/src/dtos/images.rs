use db::models::image::Image;
use genai::GeneratedImage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Provider image size, e.g. "1024x1024". Defaults when omitted.
    pub size: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    /// The provider result: an ephemeral URL or inline base64. Persist it
    /// with the save endpoint before the provider expires it.
    pub image: GeneratedImage,
    pub gems_remaining: i64,
}

#[derive(Debug, Deserialize)]
pub struct SaveImageRequest {
    /// Provider URL to download from. Exactly one of `url` / `b64_json`
    /// must be present.
    pub url: Option<String>,
    /// Inline base64 image data.
    pub b64_json: Option<String>,
    pub prompt: String,
    pub attributes: Option<Value>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImagesResponse {
    pub images: Vec<Image>,
}
