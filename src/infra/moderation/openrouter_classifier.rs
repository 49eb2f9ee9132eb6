use crate::core::moderation::{ClassifierError, ClassifierResponse, ContentClassifier};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You moderate user posts for a social feed used by minors and adults. \
Decide whether the content contains profanity, slurs, sexual content or harassment. \
Reply with JSON only, no prose: {\"verdict\": \"safe\"} or \
{\"verdict\": \"unsafe\", \"rewritten\": \"<the text with every offending word replaced by ***>\"}. \
If the text cannot be salvaged, omit \"rewritten\".";

/// Content classifier backed by an OpenRouter chat model.
pub struct OpenRouterClassifier {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenRouterClassifier {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }

    fn build_payload(&self, text: &str, image_url: Option<&str>) -> Value {
        let mut parts = vec![json!({ "type": "text", "text": text })];
        if let Some(url) = image_url {
            parts.push(json!({ "type": "image_url", "image_url": { "url": url } }));
        }

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": parts },
            ],
            "temperature": 0.0,
            "max_tokens": 512,
        })
    }
}

/// Parse the model's reply. Models often wrap JSON in a markdown fence.
fn parse_verdict(content: &str) -> Result<ClassifierResponse, ClassifierError> {
    let trimmed = content.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| ClassifierError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl ContentClassifier for OpenRouterClassifier {
    async fn classify(
        &self,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<ClassifierResponse, ClassifierError> {
        let payload = self.build_payload(text, image_url);

        let response = self
            .client
            .post(OPENROUTER_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Unavailable(format!(
                "OpenRouter API error: {} - {}",
                status, text
            )));
        }

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                ClassifierError::InvalidResponse("Failed to parse response content".to_string())
            })?;

        parse_verdict(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::ClassifierVerdict;

    #[test]
    fn test_parse_plain_json() {
        let response = parse_verdict(r#"{"verdict": "safe"}"#).unwrap();
        assert_eq!(response, ClassifierResponse::safe());
    }

    #[test]
    fn test_parse_fenced_json_with_rewrite() {
        let content = "```json\n{\"verdict\": \"unsafe\", \"rewritten\": \"you ***\"}\n```";
        let response = parse_verdict(content).unwrap();
        assert_eq!(response.verdict, ClassifierVerdict::Unsafe);
        assert_eq!(response.rewritten.as_deref(), Some("you ***"));
    }

    #[test]
    fn test_parse_garbage_is_invalid_response() {
        assert!(matches!(
            parse_verdict("I think this is fine"),
            Err(ClassifierError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_payload_includes_image_part() {
        let classifier = OpenRouterClassifier::new("key".to_string(), "model-x".to_string());

        let with_image = classifier.build_payload("hello", Some("https://cdn/x.png"));
        let parts = with_image["messages"][1]["content"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["image_url"]["url"], "https://cdn/x.png");
        assert_eq!(with_image["model"], "model-x");

        let text_only = classifier.build_payload("hello", None);
        assert_eq!(
            text_only["messages"][1]["content"].as_array().unwrap().len(),
            1
        );
    }
}
