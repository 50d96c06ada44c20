use async_trait::async_trait;
use serde_json::json;
use serde::Deserialize;
use reqwest::Client;
use tracing::{debug, info, error, warn};

use crate::config::GeminiConfig;
use crate::provider::{EditRequest, ImageEditor, ProviderError};

// Helper function to truncate base64 data in JSON for cleaner logging
fn truncate_base64_in_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if key == "data" {
                    if let serde_json::Value::String(s) = val {
                        if s.len() > 100 && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=') {
                            *val = serde_json::Value::String(format!("{}...[truncated {} chars]", &s[..50], s.len() - 50));
                        }
                    }
                } else {
                    truncate_base64_in_json(val);
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for val in arr.iter_mut() {
                truncate_base64_in_json(val);
            }
        }
        _ => {}
    }
}

fn preview(data: &str) -> String {
    if data.len() > 50 {
        format!("{}...[{} chars total]", &data[..50], data.len())
    } else {
        data.to_string()
    }
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    fn request_body(request: &EditRequest) -> serde_json::Value {
        let mut parts = vec![json!({
            "inlineData": { "data": request.base.data, "mimeType": request.base.mime_type }
        })];
        if let Some(reference) = &request.reference {
            parts.push(json!({
                "inlineData": { "data": reference.data, "mimeType": reference.mime_type }
            }));
        }
        parts.push(json!({ "text": request.instruction() }));

        json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "candidateCount": 1
            }
        })
    }

    async fn perform_api_call(&self, api_key: &str, request: &EditRequest) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        info!("🔗 Making request to: {}", url);

        let request_body = Self::request_body(request);
        let mut logged_body = request_body.clone();
        truncate_base64_in_json(&mut logged_body);
        info!("📤 Request body: {}", logged_body);

        let response = self.client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ProviderError::GenerationFailed(e.without_url().to_string()))?;

        let status = response.status();
        info!("📥 Response status: {}", status);

        let response_text = response.text().await
            .map_err(|e| ProviderError::GenerationFailed(e.without_url().to_string()))?;

        if !status.is_success() {
            error!("❌ API Error response: {}", response_text);
            return Err(ProviderError::GenerationFailed(format!("status={} body={}", status, response_text)));
        }

        let parsed: GeminiResponse = serde_json::from_str(&response_text)
            .map_err(|e| ProviderError::GenerationFailed(format!("parse error: {}", e)))?;

        match extract_first_image(&parsed) {
            Some(uri) => Ok(uri),
            None => {
                if let Ok(mut json_value) = serde_json::from_str::<serde_json::Value>(&response_text) {
                    truncate_base64_in_json(&mut json_value);
                    warn!("⚠️ No image data found in API response: {}", json_value);
                }
                Err(ProviderError::NoImageInResponse)
            }
        }
    }
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn edit_hairstyle(&self, request: &EditRequest) -> Result<String, ProviderError> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!("❌ GEMINI_API_KEY is not configured");
            return Err(ProviderError::MissingCredential);
        };

        info!(
            "✂️ Editing hairstyle with {} (reference image: {})",
            self.model,
            request.reference.is_some()
        );
        let result = self.perform_api_call(api_key, request).await;
        match &result {
            Ok(uri) => info!("✅ Successfully generated image: {}", preview(uri)),
            Err(e) => error!("❌ Failed to generate image: {}", e),
        }
        result
    }
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate { #[serde(default)] content: Content }

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData
    },
    Text { text: String },
    Other(serde_json::Value)
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(default)]
    data: String,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

/// First non-empty inline image across all candidates, as a data URI.
fn extract_first_image(resp: &GeminiResponse) -> Option<String> {
    for c in &resp.candidates {
        for p in &c.content.parts {
            match p {
                Part::Inline { inline_data } if !inline_data.data.is_empty() => {
                    let mime = if inline_data.mime_type.is_empty() { "image/png" } else { inline_data.mime_type.as_str() };
                    info!("🎯 Found image data with mime type: {}", mime);
                    return Some(format!("data:{};base64,{}", mime, inline_data.data));
                }
                Part::Text { text } => info!("💬 Model text: {}", text),
                Part::Other(value) => debug!("↪️ Skipping unrecognised part: {}", value),
                Part::Inline { .. } => {}
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::EncodedImage;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL: &str = "gemini-2.5-flash-image";

    fn config(base_url: &str, api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            base_url: base_url.to_string(),
            model: MODEL.to_string(),
        }
    }

    fn edit(reference: bool) -> EditRequest {
        EditRequest {
            base: EncodedImage { mime_type: "image/jpeg", data: "BASE".into() },
            reference: reference.then(|| EncodedImage { mime_type: "image/webp", data: "REF".into() }),
            style_description: "a long curly red ponytail".into(),
        }
    }

    fn generate_path() -> String {
        format!("/models/{}:generateContent", MODEL)
    }

    #[test]
    fn body_puts_images_before_instruction() {
        let body = GeminiClient::request_body(&edit(true));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "REF");
        assert!(parts[2]["text"].as_str().unwrap().contains("SECOND image"));

        let body = GeminiClient::request_body(&edit(false));
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert!(parts[1]["text"].as_str().unwrap().contains("a long curly red ponytail"));
    }

    #[test]
    fn extracts_first_inline_image_and_defaults_to_png() {
        let resp: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here you go" },
                { "inlineData": { "data": "" } },
                { "inlineData": { "data": "FIRST" } },
                { "inlineData": { "data": "SECOND", "mimeType": "image/jpeg" } }
            ]}}]
        })).unwrap();
        assert_eq!(extract_first_image(&resp).as_deref(), Some("data:image/png;base64,FIRST"));
    }

    #[test]
    fn truncates_long_data_fields_only() {
        let mut value = json!({ "a": { "data": "x".repeat(200), "text": "y".repeat(200) } });
        truncate_base64_in_json(&mut value);
        assert!(value["a"]["data"].as_str().unwrap().contains("[truncated 150 chars]"));
        assert_eq!(value["a"]["text"].as_str().unwrap().len(), 200);
    }

    #[tokio::test]
    async fn returns_data_uri_from_provider() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .and(query_param("key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [
                    { "inlineData": { "data": "RESULT", "mimeType": "image/png" } }
                ]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri(), Some("secret")));
        let uri = client.edit_hairstyle(&edit(false)).await.unwrap();
        assert_eq!(uri, "data:image/png;base64,RESULT");
    }

    #[tokio::test]
    async fn text_only_response_is_no_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "I cannot edit this photo." }]}}]
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri(), Some("secret")));
        let err = client.edit_hairstyle(&edit(false)).await.unwrap_err();
        assert!(matches!(err, ProviderError::NoImageInResponse));
    }

    #[tokio::test]
    async fn server_error_is_generation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(generate_path()))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri(), Some("secret")));
        let err = client.edit_hairstyle(&edit(true)).await.unwrap_err();
        assert!(matches!(err, ProviderError::GenerationFailed(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri(), None));
        let err = client.edit_hairstyle(&edit(false)).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingCredential));
    }
}
